//! Turn-based party combat and progression engine for Tavernfall.
//!
//! This crate is the rules core only: it owns characters, monsters,
//! adventures and the encounter loop, and reports everything that happens
//! as [`CombatEvent`]s. Frontends and durable storage live elsewhere and
//! talk to the core through the [`store`] traits and the [`NarrationSink`].
//!
//! - [`character`] / [`character_builder`]: the six classes, their combat
//!   math, and dice-driven creation.
//! - [`monster`] / [`catalog`]: monster stat blocks and the built-in
//!   bestiary.
//! - [`encounter`] / [`party`]: adventure composition and the roster.
//! - [`engine`]: preparation, initiative, rounds, rests, and rewards.
//! - [`dice`]: the randomness seam; [`testing`] ships a scripted
//!   implementation for deterministic runs.
//! - [`store`]: persistence contracts plus in-memory reference backends.
//!
//! # Quick Start
//!
//! ```ignore
//! use tavernfall_core::testing::RecordingSink;
//! use tavernfall_core::{
//!     Adventure, AdventureRun, BuiltinCatalog, Dice, MemoryCharacterStore,
//!     MonsterCatalog, Party,
//! };
//!
//! let catalog = BuiltinCatalog;
//! let goblin = catalog.by_index(1)?.unwrap();
//!
//! let mut adventure = Adventure::new("The Cellar", 1);
//! adventure.encounter_mut(0).unwrap().add_monsters(&goblin, 3)?;
//!
//! let mut party = Party::new(3)?;
//! // recruit at least three characters here
//!
//! let mut run = AdventureRun::new(adventure, party)?;
//! let mut dice = Dice::new();
//! let mut store = MemoryCharacterStore::new();
//! let mut sink = RecordingSink::new();
//! let outcome = run.run(&mut dice, &mut store, &mut sink)?;
//! for line in &sink.lines {
//!     println!("{line}");
//! }
//! println!("{outcome:?}");
//! ```

pub mod catalog;
pub mod character;
pub mod character_builder;
pub mod dice;
pub mod encounter;
pub mod engine;
pub mod monster;
pub mod party;
pub mod store;
pub mod testing;

pub use catalog::{BuiltinCatalog, MonsterCatalog, BESTIARY};
pub use character::{Character, CharacterId, ClassFamily, ClassKind, DamageKind};
pub use character_builder::{
    normalize_name, roll_stats, starting_xp, BuilderError, CharacterBuilder, StatBlock, StatRoll,
};
pub use dice::{DamageDie, Dice, DiceRoller, ParseDamageDieError};
pub use encounter::{Adventure, AdventureId, Encounter, EncounterError, MonsterGroup};
pub use engine::{
    AdventureOutcome, AdventureRun, AttackKind, CombatEvent, Combatant, EncounterOutcome,
    EngineError, NarrationSink, TurnSlot,
};
pub use monster::{Challenge, Monster};
pub use party::{Party, PartyError, PartyStatus, MIN_PARTY_SIZE};
pub use store::{
    filter_by_player, AdventureStore, CharacterStore, MemoryAdventureStore, MemoryCharacterStore,
    StorageUnavailable,
};
