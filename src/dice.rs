//! Dice rolling for the Tavernfall engine.
//!
//! Every random decision the engine makes flows through [`DiceRoller`]:
//! die throws and slot picks alike. Production code rolls with [`Dice`]
//! over a `rand` generator; tests script exact values instead.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for damage die notation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseDamageDieError {
    #[error("Invalid die notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidSides(u32),
}

/// Source of every random number the engine consumes.
pub trait DiceRoller {
    /// Roll a die with `sides` faces, uniform in `1..=sides`.
    fn roll(&mut self, sides: u32) -> u32;

    /// Pick a slot uniformly from `0..bound`. `bound` must be nonzero.
    fn pick(&mut self, bound: usize) -> usize;
}

/// Production roller backed by a [`rand`] generator.
#[derive(Debug)]
pub struct Dice<R: Rng> {
    rng: R,
}

impl Dice<StdRng> {
    /// Roller seeded from system entropy.
    pub fn new() -> Dice<StdRng> {
        Dice {
            rng: StdRng::from_entropy(),
        }
    }

    /// Roller with a fixed seed, for reproducible runs.
    pub fn seeded(seed: u64) -> Dice<StdRng> {
        Dice {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for Dice<StdRng> {
    fn default() -> Self {
        Dice::new()
    }
}

impl<R: Rng> Dice<R> {
    /// Roller over an arbitrary generator.
    pub fn from_rng(rng: R) -> Dice<R> {
        Dice { rng }
    }
}

impl<R: Rng> DiceRoller for Dice<R> {
    fn roll(&mut self, sides: u32) -> u32 {
        self.rng.gen_range(1..=sides)
    }

    fn pick(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }
}

/// A monster's damage die: one die, no modifier, written `dN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageDie(u32);

impl DamageDie {
    pub const D4: DamageDie = DamageDie(4);
    pub const D6: DamageDie = DamageDie(6);
    pub const D8: DamageDie = DamageDie(8);
    pub const D10: DamageDie = DamageDie(10);
    pub const D12: DamageDie = DamageDie(12);
    pub const D20: DamageDie = DamageDie(20);

    pub fn new(sides: u32) -> Result<DamageDie, ParseDamageDieError> {
        if sides < 2 {
            return Err(ParseDamageDieError::InvalidSides(sides));
        }
        Ok(DamageDie(sides))
    }

    pub fn sides(&self) -> u32 {
        self.0
    }

    /// Roll this die once.
    pub fn roll(&self, dice: &mut impl DiceRoller) -> u32 {
        dice.roll(self.0)
    }
}

impl FromStr for DamageDie {
    type Err = ParseDamageDieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let notation = s.trim();
        let sides_str = notation
            .strip_prefix('d')
            .or_else(|| notation.strip_prefix('D'))
            .ok_or_else(|| ParseDamageDieError::InvalidNotation(notation.to_string()))?;
        let sides: u32 = sides_str
            .parse()
            .map_err(|_| ParseDamageDieError::InvalidNotation(notation.to_string()))?;
        DamageDie::new(sides)
    }
}

impl fmt::Display for DamageDie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_notation() {
        let die: DamageDie = "d8".parse().unwrap();
        assert_eq!(die.sides(), 8);
        assert_eq!(die, DamageDie::D8);

        let die: DamageDie = " D12 ".parse().unwrap();
        assert_eq!(die, DamageDie::D12);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("8".parse::<DamageDie>().is_err());
        assert!("d".parse::<DamageDie>().is_err());
        assert!("dd6".parse::<DamageDie>().is_err());
        assert!(matches!(
            "d0".parse::<DamageDie>(),
            Err(ParseDamageDieError::InvalidSides(0))
        ));
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(DamageDie::D6.to_string(), "d6");
        assert_eq!("d20".parse::<DamageDie>().unwrap().to_string(), "d20");
    }

    #[test]
    fn test_roll_range() {
        let mut dice = Dice::seeded(7);
        for _ in 0..100 {
            let value = dice.roll(10);
            assert!((1..=10).contains(&value));
        }
    }

    #[test]
    fn test_pick_range() {
        let mut dice = Dice::seeded(7);
        for _ in 0..100 {
            assert!(dice.pick(4) < 4);
        }
    }

    #[test]
    fn test_seeded_rolls_repeat() {
        let mut a = Dice::seeded(42);
        let mut b = Dice::seeded(42);
        let first: Vec<u32> = (0..20).map(|_| a.roll(20)).collect();
        let second: Vec<u32> = (0..20).map(|_| b.roll(20)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_damage_die_roll_uses_sides() {
        let mut dice = Dice::seeded(3);
        for _ in 0..50 {
            let value = DamageDie::D4.roll(&mut dice);
            assert!((1..=4).contains(&value));
        }
    }
}
