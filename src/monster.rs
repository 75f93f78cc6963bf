//! Monsters and their combat behavior.

use crate::character::DamageKind;
use crate::dice::{DamageDie, DiceRoller};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How dangerous a monster is. Bosses get a dedicated turn routine and an
/// exclusive slot per encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Challenge {
    Normal,
    Boss,
}

impl Challenge {
    pub fn is_boss(&self) -> bool {
        matches!(self, Challenge::Boss)
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Challenge::Normal => write!(f, "normal"),
            Challenge::Boss => write!(f, "boss"),
        }
    }
}

/// A monster stat block.
///
/// Unlike characters, monsters are fully described by their fields: a fixed
/// initiative, a damage die, and the damage kind they both deal and resist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub name: String,
    pub challenge: Challenge,
    /// Experience the encounter pays out for this monster.
    pub experience: u32,
    pub hit_points: i32,
    pub initiative: i32,
    pub damage_die: DamageDie,
    pub damage_kind: DamageKind,
}

impl Monster {
    pub fn is_dead(&self) -> bool {
        self.hit_points < 1
    }

    /// Roll this monster's damage.
    pub fn attack_roll(&self, dice: &mut impl DiceRoller) -> i32 {
        self.damage_die.roll(dice) as i32
    }

    /// Apply incoming damage. A monster takes half damage from its own
    /// kind. Hit points floor at 0.
    pub fn receive_damage(&mut self, amount: i32, kind: DamageKind) {
        let amount = amount.max(0);
        let through = if kind == self.damage_kind {
            amount / 2
        } else {
            amount
        };
        self.hit_points = (self.hit_points - through).max(0);
    }
}
