//! The party: who goes on the adventure.

use crate::character::{Character, ClassKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The smallest party that can start an adventure.
pub const MIN_PARTY_SIZE: usize = 3;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PartyError {
    #[error("A party needs at least {MIN_PARTY_SIZE} members, got {0}")]
    TooSmall(usize),
    #[error("The party is full at {0} members")]
    Full(usize),
}

/// A fixed-capacity group of characters.
///
/// Capacity is chosen up front and must admit at least [`MIN_PARTY_SIZE`]
/// members. Characters are refreshed on recruitment so everyone starts the
/// adventure at full health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    capacity: usize,
    pub members: Vec<Character>,
}

impl Party {
    pub fn new(capacity: usize) -> Result<Self, PartyError> {
        if capacity < MIN_PARTY_SIZE {
            return Err(PartyError::TooSmall(capacity));
        }
        Ok(Party {
            capacity,
            members: Vec::with_capacity(capacity),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Add a member at full health. Fails once the party is at capacity.
    pub fn recruit(&mut self, mut character: Character) -> Result<(), PartyError> {
        if self.members.len() >= self.capacity {
            return Err(PartyError::Full(self.capacity));
        }
        character.refresh();
        self.members.push(character);
        Ok(())
    }

    pub fn all_dead(&self) -> bool {
        self.members.iter().all(|m| m.is_dead())
    }

    /// A health line per member, in roster order.
    pub fn status(&self) -> Vec<PartyStatus> {
        self.members
            .iter()
            .map(|m| PartyStatus {
                name: m.name.clone(),
                hp: m.hp,
                hp_max: m.hp_max,
                shield: (m.class == ClassKind::Mage).then_some(m.shield),
            })
            .collect()
    }
}

/// One member's line in the party health readout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyStatus {
    pub name: String,
    pub hp: i32,
    pub hp_max: i32,
    /// Present only for mages.
    pub shield: Option<i32>,
}

impl fmt::Display for PartyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{} / {} hit points", self.name, self.hp, self.hp_max)?;
        if let Some(shield) = self.shield {
            write!(f, " (Shield: {})", shield)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::DamageKind;
    use crate::testing::{sample_adventurer, sample_cleric, sample_mage};

    #[test]
    fn test_capacity_below_minimum_is_rejected() {
        let err = Party::new(2).unwrap_err();
        assert_eq!(err, PartyError::TooSmall(2));
        assert_eq!(
            err.to_string(),
            "A party needs at least 3 members, got 2"
        );
    }

    #[test]
    fn test_recruit_refreshes_the_newcomer() {
        let mut wounded = sample_adventurer("Boro");
        wounded.receive_damage(5, DamageKind::Magical);
        wounded.shield = 7;

        let mut party = Party::new(3).unwrap();
        party.recruit(wounded).unwrap();

        let member = &party.members[0];
        assert_eq!(member.hp, member.hp_max);
        assert_eq!(member.shield, 0);
    }

    #[test]
    fn test_recruit_stops_at_capacity() {
        let mut party = Party::new(3).unwrap();
        party.recruit(sample_adventurer("Boro")).unwrap();
        party.recruit(sample_cleric("Mila")).unwrap();
        party.recruit(sample_mage("Irwen")).unwrap();

        let err = party.recruit(sample_adventurer("Edo")).unwrap_err();
        assert_eq!(err, PartyError::Full(3));
        assert_eq!(party.len(), 3);
    }

    #[test]
    fn test_all_dead_needs_every_member_down() {
        let mut party = Party::new(3).unwrap();
        party.recruit(sample_adventurer("Boro")).unwrap();
        party.recruit(sample_cleric("Mila")).unwrap();
        assert!(!party.all_dead());

        party.members[0].receive_damage(1000, DamageKind::Magical);
        assert!(!party.all_dead());
        party.members[1].receive_damage(1000, DamageKind::Magical);
        assert!(party.all_dead());
    }

    #[test]
    fn test_status_shows_shield_for_mages_only() {
        let mut party = Party::new(3).unwrap();
        party.recruit(sample_adventurer("Boro")).unwrap();
        party.recruit(sample_mage("Irwen")).unwrap();
        party.members[1].shield = 9;

        let status = party.status();
        assert_eq!(status[0].shield, None);
        assert_eq!(status[1].shield, Some(9));
        assert!(status[0].to_string().ends_with("hit points"));
        assert!(status[1].to_string().ends_with("(Shield: 9)"));
    }
}
