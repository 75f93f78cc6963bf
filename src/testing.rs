//! Deterministic test support: scripted dice, sample fixtures, and a
//! recording narration sink.

use crate::character::{Character, CharacterId, ClassKind, DamageKind};
use crate::dice::{DamageDie, DiceRoller};
use crate::engine::NarrationSink;
use crate::monster::{Challenge, Monster};
use crate::party::Party;
use crate::store::{CharacterStore, StorageUnavailable};

/// Dice that replay a fixed script.
///
/// Each `roll` or `pick` pops the next value in order; running dry or
/// scripting a value outside the requested range panics with the position,
/// so a drifted script fails loudly at the exact roll.
pub struct ScriptedDice {
    values: Vec<u32>,
    index: usize,
}

impl ScriptedDice {
    pub fn new(values: Vec<u32>) -> Self {
        ScriptedDice { values, index: 0 }
    }

    /// Values the script has left. Useful for asserting exact consumption.
    pub fn remaining(&self) -> usize {
        self.values.len() - self.index
    }

    fn next_value(&mut self) -> u32 {
        match self.values.get(self.index) {
            Some(&value) => {
                self.index += 1;
                value
            }
            None => panic!(
                "scripted dice ran dry after {} values",
                self.values.len()
            ),
        }
    }
}

impl DiceRoller for ScriptedDice {
    fn roll(&mut self, sides: u32) -> u32 {
        let position = self.index;
        let value = self.next_value();
        assert!(
            (1..=sides).contains(&value),
            "scripted value {} at position {} does not fit a d{}",
            value,
            position,
            sides
        );
        value
    }

    fn pick(&mut self, bound: usize) -> usize {
        let position = self.index;
        let value = self.next_value() as usize;
        assert!(
            value < bound,
            "scripted pick {} at position {} is outside bound {}",
            value,
            position,
            bound
        );
        value
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// Level-1 adventurer: body 2, mind 1, spirit 1, 12 hit points.
pub fn sample_adventurer(name: &str) -> Character {
    Character::new(name, "Sam", ClassKind::Adventurer, 0, 2, 1, 1)
}

/// Level-1 cleric: body 1, mind 2, spirit 1, 11 hit points.
pub fn sample_cleric(name: &str) -> Character {
    Character::new(name, "Sam", ClassKind::Cleric, 0, 1, 2, 1)
}

/// Level-1 mage: body 1, mind 3, spirit 1, 11 hit points.
pub fn sample_mage(name: &str) -> Character {
    Character::new(name, "Sam", ClassKind::Mage, 0, 1, 3, 1)
}

/// The standard three-member test party: Boro, Mila, Irwen.
pub fn sample_party() -> Party {
    let mut party = Party::new(3).expect("capacity is above the minimum");
    party
        .recruit(sample_adventurer("Boro"))
        .expect("room for Boro");
    party.recruit(sample_cleric("Mila")).expect("room for Mila");
    party.recruit(sample_mage("Irwen")).expect("room for Irwen");
    party
}

/// A goblin matching the built-in catalog entry.
pub fn sample_goblin() -> Monster {
    Monster {
        name: "Goblin".to_string(),
        challenge: Challenge::Normal,
        experience: 10,
        hit_points: 6,
        initiative: 12,
        damage_die: DamageDie::D6,
        damage_kind: DamageKind::Physical,
    }
}

/// A boss matching the built-in Young Dragon.
pub fn sample_boss() -> Monster {
    Monster {
        name: "Young Dragon".to_string(),
        challenge: Challenge::Boss,
        experience: 100,
        hit_points: 45,
        initiative: 15,
        damage_die: DamageDie::D12,
        damage_kind: DamageKind::Magical,
    }
}

// ============================================================================
// Sinks and stores
// ============================================================================

/// Narration sink that keeps every line for assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub lines: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NarrationSink for RecordingSink {
    fn narrate(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// Character store that refuses every request.
#[derive(Debug, Default)]
pub struct UnavailableCharacterStore;

impl CharacterStore for UnavailableCharacterStore {
    fn list(&self) -> Result<Vec<Character>, StorageUnavailable> {
        Err(StorageUnavailable::new("character store offline"))
    }

    fn create(&mut self, _character: &Character) -> Result<(), StorageUnavailable> {
        Err(StorageUnavailable::new("character store offline"))
    }

    fn update(&mut self, _character: &Character) -> Result<(), StorageUnavailable> {
        Err(StorageUnavailable::new("character store offline"))
    }

    fn delete(&mut self, _id: CharacterId) -> Result<(), StorageUnavailable> {
        Err(StorageUnavailable::new("character store offline"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_dice_replay_in_order() {
        let mut dice = ScriptedDice::new(vec![3, 1, 0]);
        assert_eq!(dice.roll(6), 3);
        assert_eq!(dice.roll(10), 1);
        assert_eq!(dice.pick(4), 0);
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    #[should_panic(expected = "ran dry")]
    fn test_scripted_dice_panic_when_dry() {
        let mut dice = ScriptedDice::new(vec![2]);
        dice.roll(6);
        dice.roll(6);
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn test_scripted_dice_reject_out_of_range_values() {
        let mut dice = ScriptedDice::new(vec![7]);
        dice.roll(6);
    }
}
