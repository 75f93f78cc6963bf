//! Adventures and the encounters inside them.
//!
//! An adventure is a named sequence of encounters; an encounter is the
//! monster lineup for one fight. Lineups are edited by group (so "3x
//! Goblin" reads and removes as one unit) and enforce the one-boss rule.

use crate::monster::{Challenge, Monster};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncounterError {
    #[error("Only one boss fits in an encounter")]
    MultipleBosses,
    #[error("This encounter already has a boss")]
    BossAlreadyPresent,
}

// ============================================================================
// Encounter
// ============================================================================

/// One fight's monster lineup, numbered by position in the adventure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Encounter {
    pub number: u32,
    pub monsters: Vec<Monster>,
}

impl Encounter {
    pub fn new(number: u32) -> Self {
        Encounter {
            number,
            monsters: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.monsters.is_empty()
    }

    /// Add `count` copies of a monster. Bosses are exclusive: asking for
    /// more than one, or adding one when the lineup already has a boss,
    /// is rejected and leaves the lineup untouched.
    pub fn add_monsters(&mut self, monster: &Monster, count: usize) -> Result<(), EncounterError> {
        if monster.challenge.is_boss() {
            if count > 1 {
                return Err(EncounterError::MultipleBosses);
            }
            if self.monsters.iter().any(|m| m.challenge.is_boss()) {
                return Err(EncounterError::BossAlreadyPresent);
            }
        }
        for _ in 0..count {
            self.monsters.push(monster.clone());
        }
        Ok(())
    }

    /// The lineup collapsed by name, in first-appearance order.
    pub fn grouped(&self) -> Vec<MonsterGroup> {
        let mut groups: Vec<MonsterGroup> = Vec::new();
        for monster in &self.monsters {
            match groups.iter_mut().find(|g| g.name == monster.name) {
                Some(group) => group.count += 1,
                None => groups.push(MonsterGroup {
                    name: monster.name.clone(),
                    challenge: monster.challenge,
                    count: 1,
                }),
            }
        }
        groups
    }

    /// Remove every monster of the group at `index` in
    /// [`grouped`](Encounter::grouped) order.
    pub fn remove_group(&mut self, index: usize) -> Option<MonsterGroup> {
        let group = self.grouped().into_iter().nth(index)?;
        self.monsters.retain(|m| m.name != group.name);
        Some(group)
    }

    pub fn all_slain(&self) -> bool {
        self.monsters.iter().all(|m| m.is_dead())
    }

    /// Total experience the lineup pays out on victory.
    pub fn experience_reward(&self) -> u32 {
        self.monsters.iter().map(|m| m.experience).sum()
    }
}

/// A same-named slice of an encounter's lineup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonsterGroup {
    pub name: String,
    pub challenge: Challenge,
    pub count: usize,
}

impl fmt::Display for MonsterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x {}", self.count, self.name)
    }
}

// ============================================================================
// Adventure
// ============================================================================

/// Unique identifier for an adventure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdventureId(pub Uuid);

impl AdventureId {
    pub fn new() -> Self {
        AdventureId(Uuid::new_v4())
    }
}

impl Default for AdventureId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AdventureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named sequence of encounters, played in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adventure {
    pub id: AdventureId,
    pub name: String,
    pub encounters: Vec<Encounter>,
}

impl Adventure {
    /// Create an adventure with `count` empty encounters, numbered from 1.
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Adventure {
            id: AdventureId::new(),
            name: name.into(),
            encounters: (1..=count).map(Encounter::new).collect(),
        }
    }

    pub fn encounter_mut(&mut self, index: usize) -> Option<&mut Encounter> {
        self.encounters.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_boss, sample_goblin};

    #[test]
    fn test_add_monsters_in_bulk() {
        let mut encounter = Encounter::new(1);
        encounter.add_monsters(&sample_goblin(), 3).unwrap();
        assert_eq!(encounter.monsters.len(), 3);
    }

    #[test]
    fn test_boss_count_above_one_is_rejected() {
        let mut encounter = Encounter::new(1);
        let err = encounter.add_monsters(&sample_boss(), 2).unwrap_err();
        assert_eq!(err, EncounterError::MultipleBosses);
        assert!(encounter.is_empty());
    }

    #[test]
    fn test_second_boss_is_rejected() {
        let mut encounter = Encounter::new(1);
        encounter.add_monsters(&sample_boss(), 1).unwrap();
        let err = encounter.add_monsters(&sample_boss(), 1).unwrap_err();
        assert_eq!(err, EncounterError::BossAlreadyPresent);
        assert_eq!(encounter.monsters.len(), 1);
    }

    #[test]
    fn test_boss_and_minions_may_mix() {
        let mut encounter = Encounter::new(1);
        encounter.add_monsters(&sample_boss(), 1).unwrap();
        encounter.add_monsters(&sample_goblin(), 2).unwrap();
        assert_eq!(encounter.monsters.len(), 3);
    }

    #[test]
    fn test_grouped_keeps_first_appearance_order() {
        let mut encounter = Encounter::new(1);
        encounter.add_monsters(&sample_goblin(), 2).unwrap();
        encounter.add_monsters(&sample_boss(), 1).unwrap();
        encounter.add_monsters(&sample_goblin(), 1).unwrap();

        let groups = encounter.grouped();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].to_string(), "3x Goblin");
        assert_eq!(groups[1].to_string(), "1x Young Dragon");
    }

    #[test]
    fn test_remove_group_sweeps_every_copy() {
        let mut encounter = Encounter::new(1);
        encounter.add_monsters(&sample_goblin(), 3).unwrap();
        encounter.add_monsters(&sample_boss(), 1).unwrap();

        let removed = encounter.remove_group(0).unwrap();
        assert_eq!(removed.name, "Goblin");
        assert_eq!(removed.count, 3);
        assert_eq!(encounter.monsters.len(), 1);
        assert!(encounter.remove_group(5).is_none());
    }

    #[test]
    fn test_experience_reward_sums_the_lineup() {
        let mut encounter = Encounter::new(1);
        encounter.add_monsters(&sample_goblin(), 2).unwrap();
        encounter.add_monsters(&sample_boss(), 1).unwrap();
        assert_eq!(encounter.experience_reward(), 120);
    }

    #[test]
    fn test_adventure_prefills_numbered_encounters() {
        let adventure = Adventure::new("Mines of Khazrun", 3);
        assert_eq!(adventure.encounters.len(), 3);
        assert_eq!(adventure.encounters[0].number, 1);
        assert_eq!(adventure.encounters[2].number, 3);
        assert!(adventure.encounters.iter().all(|e| e.is_empty()));
    }
}
