//! Persistence seams for characters and adventures.
//!
//! The engine and any frontend talk to storage through these traits. The
//! in-memory implementations back tests and single-session play; durable
//! backends implement the same contracts.

use crate::character::{Character, CharacterId};
use crate::encounter::Adventure;
use thiserror::Error;

/// The storage backend could not serve the request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Storage unavailable: {reason}")]
pub struct StorageUnavailable {
    pub reason: String,
}

impl StorageUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        StorageUnavailable {
            reason: reason.into(),
        }
    }
}

/// Character roster storage.
pub trait CharacterStore {
    fn list(&self) -> Result<Vec<Character>, StorageUnavailable>;
    fn create(&mut self, character: &Character) -> Result<(), StorageUnavailable>;
    /// Persist the character's current state, matched by id.
    fn update(&mut self, character: &Character) -> Result<(), StorageUnavailable>;
    fn delete(&mut self, id: CharacterId) -> Result<(), StorageUnavailable>;
}

/// Adventure storage.
pub trait AdventureStore {
    fn list(&self) -> Result<Vec<Adventure>, StorageUnavailable>;
    fn save(&mut self, adventure: &Adventure) -> Result<(), StorageUnavailable>;
}

/// Roster filter: an empty query matches everyone, otherwise the player
/// name must contain the query.
pub fn filter_by_player(characters: &[Character], player: &str) -> Vec<Character> {
    characters
        .iter()
        .filter(|c| player.is_empty() || c.player.contains(player))
        .cloned()
        .collect()
}

// ============================================================================
// In-memory backends
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryCharacterStore {
    characters: Vec<Character>,
}

impl MemoryCharacterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CharacterStore for MemoryCharacterStore {
    fn list(&self) -> Result<Vec<Character>, StorageUnavailable> {
        Ok(self.characters.clone())
    }

    fn create(&mut self, character: &Character) -> Result<(), StorageUnavailable> {
        self.characters.push(character.clone());
        Ok(())
    }

    fn update(&mut self, character: &Character) -> Result<(), StorageUnavailable> {
        match self.characters.iter_mut().find(|c| c.id == character.id) {
            Some(slot) => *slot = character.clone(),
            None => self.characters.push(character.clone()),
        }
        Ok(())
    }

    fn delete(&mut self, id: CharacterId) -> Result<(), StorageUnavailable> {
        self.characters.retain(|c| c.id != id);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryAdventureStore {
    adventures: Vec<Adventure>,
}

impl MemoryAdventureStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AdventureStore for MemoryAdventureStore {
    fn list(&self) -> Result<Vec<Adventure>, StorageUnavailable> {
        Ok(self.adventures.clone())
    }

    fn save(&mut self, adventure: &Adventure) -> Result<(), StorageUnavailable> {
        match self.adventures.iter_mut().find(|a| a.id == adventure.id) {
            Some(slot) => *slot = adventure.clone(),
            None => self.adventures.push(adventure.clone()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_adventurer, sample_cleric};

    #[test]
    fn test_update_matches_by_id() {
        let mut store = MemoryCharacterStore::new();
        let mut hero = sample_adventurer("Boro");
        store.create(&hero).unwrap();

        hero.xp = 150;
        store.update(&hero).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].xp, 150);
    }

    #[test]
    fn test_update_of_unknown_character_inserts() {
        let mut store = MemoryCharacterStore::new();
        store.update(&sample_adventurer("Boro")).unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_removes_by_id() {
        let mut store = MemoryCharacterStore::new();
        let hero = sample_adventurer("Boro");
        let other = sample_cleric("Mila");
        store.create(&hero).unwrap();
        store.create(&other).unwrap();

        store.delete(hero.id).unwrap();
        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Mila");
    }

    #[test]
    fn test_filter_by_player_substring() {
        let mut anna = sample_adventurer("Boro");
        anna.player = "Anna".to_string();
        let mut joan = sample_cleric("Mila");
        joan.player = "Joan".to_string();
        let roster = vec![anna, joan];

        assert_eq!(filter_by_player(&roster, "").len(), 2);
        let hits = filter_by_player(&roster, "oa");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].player, "Joan");
        assert!(filter_by_player(&roster, "Pere").is_empty());
    }

    #[test]
    fn test_adventure_save_is_an_upsert() {
        let mut store = MemoryAdventureStore::new();
        let mut adventure = crate::encounter::Adventure::new("Mines", 2);
        store.save(&adventure).unwrap();

        adventure.name = "Deep Mines".to_string();
        store.save(&adventure).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Deep Mines");
    }
}
