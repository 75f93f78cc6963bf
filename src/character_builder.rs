//! Character creation: stat rolls, name rules, starting experience.
//!
//! Stats come from two d6 each, pushed through a bucket table; the chosen
//! starting level converts to banked experience so the regular leveling
//! math applies from the first fight.

use crate::character::{Character, ClassKind};
use crate::dice::DiceRoller;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuilderError {
    #[error("Character names use letters only, got '{0}'")]
    InvalidName(String),
}

/// One stat's generation: the two d6 and the bucketed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatRoll {
    pub first: u32,
    pub second: u32,
    pub value: i32,
}

impl StatRoll {
    pub fn sum(&self) -> u32 {
        self.first + self.second
    }
}

/// The three stat rolls of a new character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatBlock {
    pub body: StatRoll,
    pub mind: StatRoll,
    pub spirit: StatRoll,
}

/// Bucket a two-d6 sum into a stat value. The lone bucket at sum 2 is
/// intentional.
fn stat_for_sum(sum: u32) -> i32 {
    match sum {
        2 => 1,
        3..=5 => 0,
        6..=9 => 1,
        10..=11 => 2,
        _ => 3,
    }
}

fn roll_stat(dice: &mut impl DiceRoller) -> StatRoll {
    let first = dice.roll(6);
    let second = dice.roll(6);
    StatRoll {
        first,
        second,
        value: stat_for_sum(first + second),
    }
}

/// Roll a full stat block, body then mind then spirit.
pub fn roll_stats(dice: &mut impl DiceRoller) -> StatBlock {
    StatBlock {
        body: roll_stat(dice),
        mind: roll_stat(dice),
        spirit: roll_stat(dice),
    }
}

/// Validate and normalize a character name: letters only, first upper,
/// rest lower.
pub fn normalize_name(name: &str) -> Result<String, BuilderError> {
    if name.is_empty() || !name.chars().all(|c| c.is_alphabetic()) {
        return Err(BuilderError::InvalidName(name.to_string()));
    }
    let mut chars = name.chars();
    let mut normalized = String::new();
    if let Some(first) = chars.next() {
        normalized.extend(first.to_uppercase());
    }
    normalized.extend(chars.flat_map(|c| c.to_lowercase()));
    Ok(normalized)
}

/// Experience banked for a chosen starting level. Levels 0 and 1 both mean
/// a fresh start.
pub fn starting_xp(level: u32) -> u32 {
    level.saturating_sub(1) * 100
}

/// Builds one character: name and stats are fixed up front, the class is
/// chosen at the end (and evolves to match the starting level).
#[derive(Debug, Clone)]
pub struct CharacterBuilder {
    name: String,
    player: String,
    level: u32,
    stats: StatBlock,
}

impl CharacterBuilder {
    /// Normalize the name and roll the stats. Rolls happen here so the
    /// caller can show them before the class is picked.
    pub fn new(
        name: &str,
        player: impl Into<String>,
        level: u32,
        dice: &mut impl DiceRoller,
    ) -> Result<Self, BuilderError> {
        Ok(CharacterBuilder {
            name: normalize_name(name)?,
            player: player.into(),
            level,
            stats: roll_stats(dice),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stats(&self) -> &StatBlock {
        &self.stats
    }

    pub fn build(self, class: ClassKind) -> Character {
        Character::new(
            self.name,
            self.player,
            class,
            starting_xp(self.level),
            self.stats.body.value,
            self.stats.mind.value,
            self.stats.spirit.value,
        )
    }
}
