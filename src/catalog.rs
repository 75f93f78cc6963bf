//! The monster catalog: where encounters get their monsters from.
//!
//! [`BuiltinCatalog`] serves the compiled-in bestiary; a storage-backed
//! implementation can swap in behind the same trait.

use crate::character::DamageKind;
use crate::dice::DamageDie;
use crate::monster::{Challenge, Monster};
use crate::store::StorageUnavailable;
use lazy_static::lazy_static;

/// Source of monster stat blocks.
pub trait MonsterCatalog {
    /// Every monster this catalog knows, in presentation order.
    fn list(&self) -> Result<Vec<Monster>, StorageUnavailable>;

    /// The monster at `index` in [`list`](MonsterCatalog::list) order, if
    /// any.
    fn by_index(&self, index: usize) -> Result<Option<Monster>, StorageUnavailable> {
        Ok(self.list()?.into_iter().nth(index))
    }
}

lazy_static! {
    /// The built-in bestiary.
    pub static ref BESTIARY: Vec<Monster> = vec![
        Monster {
            name: "Kobold".to_string(),
            challenge: Challenge::Normal,
            experience: 5,
            hit_points: 4,
            initiative: 10,
            damage_die: DamageDie::D4,
            damage_kind: DamageKind::Physical,
        },
        Monster {
            name: "Goblin".to_string(),
            challenge: Challenge::Normal,
            experience: 10,
            hit_points: 6,
            initiative: 12,
            damage_die: DamageDie::D6,
            damage_kind: DamageKind::Physical,
        },
        Monster {
            name: "Imp".to_string(),
            challenge: Challenge::Normal,
            experience: 15,
            hit_points: 8,
            initiative: 14,
            damage_die: DamageDie::D6,
            damage_kind: DamageKind::Magical,
        },
        Monster {
            name: "Orc".to_string(),
            challenge: Challenge::Normal,
            experience: 25,
            hit_points: 14,
            initiative: 8,
            damage_die: DamageDie::D8,
            damage_kind: DamageKind::Physical,
        },
        Monster {
            name: "Banshee".to_string(),
            challenge: Challenge::Normal,
            experience: 30,
            hit_points: 12,
            initiative: 11,
            damage_die: DamageDie::D8,
            damage_kind: DamageKind::Psychical,
        },
        Monster {
            name: "Ogre".to_string(),
            challenge: Challenge::Normal,
            experience: 40,
            hit_points: 20,
            initiative: 6,
            damage_die: DamageDie::D10,
            damage_kind: DamageKind::Physical,
        },
        Monster {
            name: "Young Dragon".to_string(),
            challenge: Challenge::Boss,
            experience: 100,
            hit_points: 45,
            initiative: 15,
            damage_die: DamageDie::D12,
            damage_kind: DamageKind::Magical,
        },
        Monster {
            name: "Lich".to_string(),
            challenge: Challenge::Boss,
            experience: 150,
            hit_points: 60,
            initiative: 13,
            damage_die: DamageDie::D20,
            damage_kind: DamageKind::Psychical,
        },
    ];
}

/// Catalog over the compiled-in [`BESTIARY`]. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl MonsterCatalog for BuiltinCatalog {
    fn list(&self) -> Result<Vec<Monster>, StorageUnavailable> {
        Ok(BESTIARY.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bestiary_has_unique_names() {
        let mut names: Vec<&str> = BESTIARY.iter().map(|m| m.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), BESTIARY.len());
    }

    #[test]
    fn test_bestiary_covers_both_challenges() {
        assert!(BESTIARY.iter().any(|m| m.challenge.is_boss()));
        assert!(BESTIARY.iter().any(|m| !m.challenge.is_boss()));
    }

    #[test]
    fn test_bestiary_stat_blocks_are_positive() {
        for monster in BESTIARY.iter() {
            assert!(monster.hit_points > 0, "{} has no hit points", monster.name);
            assert!(monster.experience > 0, "{} pays no experience", monster.name);
        }
    }

    #[test]
    fn test_by_index_in_list_order() {
        let catalog = BuiltinCatalog;
        let first = catalog.by_index(0).unwrap().unwrap();
        assert_eq!(first.name, BESTIARY[0].name);
        assert!(catalog.by_index(BESTIARY.len()).unwrap().is_none());
    }
}
