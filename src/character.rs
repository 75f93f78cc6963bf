//! Characters and their class behavior.
//!
//! Six playable classes in three families share one capability set:
//! initiative, damage intake with per-family mitigation, healing, and
//! experience-driven leveling with tier evolution. The numbers in this
//! module are the game's balance table.

use crate::dice::DiceRoller;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identity
// ============================================================================

/// Unique identifier for a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        CharacterId(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Damage kinds
// ============================================================================

/// The three damage families.
///
/// Attunement mitigates: adventurers halve physical damage, paladins halve
/// psychical damage, monsters halve their own type, and mages bleed magical
/// damage through their level and shield instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageKind {
    Physical,
    Magical,
    Psychical,
}

impl DamageKind {
    pub fn name(&self) -> &'static str {
        match self {
            DamageKind::Physical => "physical",
            DamageKind::Magical => "magical",
            DamageKind::Psychical => "psychical",
        }
    }
}

impl fmt::Display for DamageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Classes
// ============================================================================

/// The playable classes: three tiers of adventurer, two of cleric, and the
/// mage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    Adventurer,
    Warrior,
    Champion,
    Cleric,
    Paladin,
    Mage,
}

/// Families group the tiers that share combat behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassFamily {
    Adventurer,
    Cleric,
    Mage,
}

impl ClassKind {
    pub fn name(&self) -> &'static str {
        match self {
            ClassKind::Adventurer => "Adventurer",
            ClassKind::Warrior => "Warrior",
            ClassKind::Champion => "Champion",
            ClassKind::Cleric => "Cleric",
            ClassKind::Paladin => "Paladin",
            ClassKind::Mage => "Mage",
        }
    }

    pub fn family(&self) -> ClassFamily {
        match self {
            ClassKind::Adventurer | ClassKind::Warrior | ClassKind::Champion => {
                ClassFamily::Adventurer
            }
            ClassKind::Cleric | ClassKind::Paladin => ClassFamily::Cleric,
            ClassKind::Mage => ClassFamily::Mage,
        }
    }

    /// Damage family of this class's attacks.
    pub fn damage_kind(&self) -> DamageKind {
        match self.family() {
            ClassFamily::Adventurer => DamageKind::Physical,
            ClassFamily::Cleric => DamageKind::Psychical,
            ClassFamily::Mage => DamageKind::Magical,
        }
    }

    /// The tier this class settles into at `level`.
    ///
    /// Checked at creation and after every level-up: adventurers become
    /// warriors above level 3 and champions above level 7, clerics become
    /// paladins above level 4. Champion, Paladin and Mage are terminal.
    pub fn evolved(self, level: u32) -> ClassKind {
        match self {
            ClassKind::Adventurer => {
                if level > 7 {
                    ClassKind::Champion
                } else if level > 3 {
                    ClassKind::Warrior
                } else {
                    ClassKind::Adventurer
                }
            }
            ClassKind::Warrior => {
                if level > 7 {
                    ClassKind::Champion
                } else {
                    ClassKind::Warrior
                }
            }
            ClassKind::Cleric => {
                if level > 4 {
                    ClassKind::Paladin
                } else {
                    ClassKind::Cleric
                }
            }
            ClassKind::Champion | ClassKind::Paladin | ClassKind::Mage => self,
        }
    }
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Character
// ============================================================================

/// A playable character.
///
/// `name` and `player` are identity and never change. Everything else
/// mutates over an adventure: preparation buffs raise spirit and mind,
/// damage and healing move `hp`, rewards move `xp`. Hit points stay inside
/// `0..=hp_max` through every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub player: String,
    pub class: ClassKind,
    pub xp: u32,
    pub body: i32,
    pub mind: i32,
    pub spirit: i32,
    pub hp: i32,
    pub hp_max: i32,
    /// Rolled once per encounter.
    pub initiative: i32,
    /// Mage damage buffer, recharged in the preparation stage. Always 0 for
    /// other classes.
    pub shield: i32,
}

impl Character {
    /// Create a character with the given stats and experience total.
    ///
    /// The class is evolved to the proper tier for the starting level, and
    /// hit points start full.
    pub fn new(
        name: impl Into<String>,
        player: impl Into<String>,
        class: ClassKind,
        xp: u32,
        body: i32,
        mind: i32,
        spirit: i32,
    ) -> Self {
        let mut character = Character {
            id: CharacterId::new(),
            name: name.into(),
            player: player.into(),
            class,
            xp,
            body,
            mind,
            spirit,
            hp: 0,
            hp_max: 0,
            initiative: 0,
            shield: 0,
        };
        character.class = character.class.evolved(character.level());
        character.refresh();
        character
    }

    /// Level derived from experience: one level per full 100 xp.
    pub fn level(&self) -> u32 {
        self.xp / 100 + 1
    }

    /// Recompute `hp_max` for the current class and level, restore to full
    /// health, and drop any shield. Applied at creation and again when the
    /// character joins a party.
    pub fn refresh(&mut self) {
        self.hp_max = self.max_hit_points();
        self.hp = self.hp_max;
        self.shield = 0;
    }

    /// `(10 + body) * level`; champions count body twice.
    fn max_hit_points(&self) -> i32 {
        let body = if self.class == ClassKind::Champion {
            self.body * 2
        } else {
            self.body
        };
        (10 + body) * self.level() as i32
    }

    /// The fallen stay down until a level-up restores them between
    /// encounters.
    pub fn is_dead(&self) -> bool {
        self.hp < 1
    }

    /// Below half health, the threshold healers react to.
    pub fn needs_healing(&self) -> bool {
        self.hp < self.hp_max / 2
    }

    /// Restore hit points, capped at `hp_max`. The dead cannot be healed.
    pub fn heal(&mut self, amount: i32) {
        if self.is_dead() {
            return;
        }
        self.hp = (self.hp + amount).min(self.hp_max);
    }

    /// Apply incoming damage after this class's mitigation.
    ///
    /// Adventurers halve physical damage, paladins halve psychical damage.
    /// Mages subtract their level from magical damage (floored at 0), and an
    /// active shield then absorbs as much of the remainder as it can,
    /// whatever the damage kind.
    pub fn receive_damage(&mut self, amount: i32, kind: DamageKind) {
        let amount = amount.max(0);
        let through = match self.class.family() {
            ClassFamily::Adventurer => {
                if kind == DamageKind::Physical {
                    amount / 2
                } else {
                    amount
                }
            }
            ClassFamily::Cleric => {
                if self.class == ClassKind::Paladin && kind == DamageKind::Psychical {
                    amount / 2
                } else {
                    amount
                }
            }
            ClassFamily::Mage => {
                let amount = if kind == DamageKind::Magical {
                    (amount - self.level() as i32).max(0)
                } else {
                    amount
                };
                let absorbed = amount.min(self.shield);
                self.shield -= absorbed;
                amount - absorbed
            }
        };
        self.hp = (self.hp - through).clamp(0, self.hp_max);
    }

    /// Add experience. If the total crosses the boundary for the level held
    /// before the gain, the character levels up exactly once: the class
    /// re-evolves, `hp_max` is recomputed, and health returns to full
    /// (which revives a fallen character). Returns whether a level-up
    /// happened.
    pub fn gain_xp(&mut self, amount: u32) -> bool {
        let previous_level = self.level();
        self.xp += amount;
        if self.xp >= previous_level * 100 {
            self.class = self.class.evolved(self.level());
            self.hp_max = self.max_hit_points();
            self.hp = self.hp_max;
            true
        } else {
            false
        }
    }

    /// Roll this encounter's initiative: adventurers d12+spirit, clerics
    /// d10+spirit, mages d20+mind.
    pub fn roll_initiative(&mut self, dice: &mut impl DiceRoller) -> i32 {
        self.initiative = match self.class.family() {
            ClassFamily::Adventurer => dice.roll(12) as i32 + self.spirit,
            ClassFamily::Cleric => dice.roll(10) as i32 + self.spirit,
            ClassFamily::Mage => dice.roll(20) as i32 + self.mind,
        };
        self.initiative
    }

    // ========================================================================
    // Abilities
    // ========================================================================

    /// Sword slash damage: d6+body at base tier, d10+body once evolved.
    pub fn sword_slash(&self, dice: &mut impl DiceRoller) -> i32 {
        match self.class {
            ClassKind::Adventurer => dice.roll(6) as i32 + self.body,
            _ => dice.roll(10) as i32 + self.body,
        }
    }

    /// Bandage up after a won encounter. Base tiers heal d8+mind (the
    /// returned amount is the roll, even when the cap restored less);
    /// champions restore to full and report the hit points regained.
    pub fn bandage_time(&mut self, dice: &mut impl DiceRoller) -> i32 {
        if self.class == ClassKind::Champion {
            let restored = self.hp_max - self.hp;
            self.hp = self.hp_max;
            restored
        } else {
            let amount = dice.roll(8) as i32 + self.mind;
            self.heal(amount);
            amount
        }
    }

    /// Healing prayer roll, d10+mind. The caller decides who receives it.
    pub fn heal_roll(&self, dice: &mut impl DiceRoller) -> i32 {
        dice.roll(10) as i32 + self.mind
    }

    /// Psychical strike: d4+spirit as a cleric, d8+spirit as a paladin.
    pub fn holy_strike(&self, dice: &mut impl DiceRoller) -> i32 {
        if self.class == ClassKind::Paladin {
            dice.roll(8) as i32 + self.spirit
        } else {
            dice.roll(4) as i32 + self.spirit
        }
    }

    /// Mind bonus of the good-luck blessing: a flat 1 as a cleric, d3 as a
    /// paladin.
    pub fn good_luck_bonus(&self, dice: &mut impl DiceRoller) -> i32 {
        if self.class == ClassKind::Paladin {
            dice.roll(3) as i32
        } else {
            1
        }
    }

    /// Recharge the mage shield to `(d6+mind) * level` and return the new
    /// value.
    pub fn recharge_shield(&mut self, dice: &mut impl DiceRoller) -> i32 {
        self.shield = (dice.roll(6) as i32 + self.mind) * self.level() as i32;
        self.shield
    }

    /// Fireball damage, d4+mind. Hits every living monster with one roll.
    pub fn fireball(&self, dice: &mut impl DiceRoller) -> i32 {
        dice.roll(4) as i32 + self.mind
    }

    /// Arcane missile damage, d6+mind, at a single target.
    pub fn arcane_missile(&self, dice: &mut impl DiceRoller) -> i32 {
        dice.roll(6) as i32 + self.mind
    }
}
