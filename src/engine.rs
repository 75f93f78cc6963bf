//! The combat engine: stages, turns, and the adventure loop.
//!
//! An [`AdventureRun`] owns a party and an adventure and plays the
//! encounters in order. Each encounter moves through the same stages:
//! preparation buffs, initiative, combat rounds until one side falls, and
//! (on victory) the short rest where experience is paid out and persisted.
//! Every stage returns [`CombatEvent`]s; the orchestrating methods also
//! forward their rendered lines to a [`NarrationSink`].

use crate::character::{ClassFamily, ClassKind, DamageKind};
use crate::dice::DiceRoller;
use crate::encounter::{Adventure, Encounter};
use crate::party::{Party, PartyError, PartyStatus, MIN_PARTY_SIZE};
use crate::store::{CharacterStore, StorageUnavailable};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Encounter {number} has no monsters")]
    EmptyEncounter { number: u32 },
    #[error("Adventure '{name}' has no encounters")]
    EmptyAdventure { name: String },
    #[error("{0}")]
    Party(#[from] PartyError),
    #[error("{0}")]
    Storage(#[from] StorageUnavailable),
}

/// Write-only channel for rendered narration lines.
pub trait NarrationSink {
    fn narrate(&mut self, line: &str);
}

// ============================================================================
// Events
// ============================================================================

/// The named attacks characters declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackKind {
    SwordSlash,
    ImprovedSwordSlash,
    HolyStrike,
    ArcaneMissile,
    Fireball,
}

impl AttackKind {
    pub fn name(&self) -> &'static str {
        match self {
            AttackKind::SwordSlash => "Sword Slash",
            AttackKind::ImprovedSwordSlash => "Improved Sword Slash",
            AttackKind::HolyStrike => "Holy Strike",
            AttackKind::ArcaneMissile => "Arcane Missile",
            AttackKind::Fireball => "Fireball",
        }
    }
}

impl fmt::Display for AttackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Everything observable that happens during an encounter.
///
/// `Display` renders each event as one narration line; frontends that want
/// richer output can match on the structure instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CombatEvent {
    EncounterStarted { number: u32 },
    SelfMotivated { name: String },
    MotivationalSpeech { name: String },
    GoodLuckBlessing { name: String, bonus: i32 },
    ShieldRecharged { name: String, shield: i32 },
    InitiativeRolled { name: String, initiative: i32 },
    RoundStarted { round: u32 },
    AttackDeclared {
        attacker: String,
        targets: Vec<String>,
        /// `None` for monster attacks.
        ability: Option<AttackKind>,
    },
    AttackLanded { amount: i32, kind: DamageKind, critical: bool },
    AttackMissed,
    MonsterSlain { name: String },
    CharacterDown { name: String },
    HealingPrayer { healer: String, amount: i32, targets: Vec<String> },
    SelfHealingPrayer { healer: String, amount: i32 },
    Bandaged { name: String, amount: i32 },
    Unconscious { name: String },
    ExperienceGained { name: String, amount: u32 },
    LeveledUp { name: String, level: u32 },
}

fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [single] => single.clone(),
        [head @ .., last] => format!("{} and {}", head.join(", "), last),
    }
}

impl fmt::Display for CombatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombatEvent::EncounterStarted { number } => {
                write!(f, "Encounter {} begins!", number)
            }
            CombatEvent::SelfMotivated { name } => {
                write!(f, "{} gets psyched up (+1 spirit).", name)
            }
            CombatEvent::MotivationalSpeech { name } => {
                write!(f, "{} gives a rousing speech (+1 spirit to the party).", name)
            }
            CombatEvent::GoodLuckBlessing { name, bonus } => {
                write!(f, "{} blesses the party with good luck (+{} mind).", name, bonus)
            }
            CombatEvent::ShieldRecharged { name, shield } => {
                write!(f, "{} weaves a mystic shield ({} points).", name, shield)
            }
            CombatEvent::InitiativeRolled { name, initiative } => {
                write!(f, "{} acts at initiative {}.", name, initiative)
            }
            CombatEvent::RoundStarted { round } => write!(f, "Round {}!", round),
            CombatEvent::AttackDeclared { attacker, targets, ability } => match ability {
                Some(ability) => {
                    write!(f, "{} uses {} against {}.", attacker, ability, join_names(targets))
                }
                None => write!(f, "{} attacks {}.", attacker, join_names(targets)),
            },
            CombatEvent::AttackLanded { amount, kind, critical } => {
                if *critical {
                    write!(f, "Critical hit! {} {} damage.", amount, kind)
                } else {
                    write!(f, "It hits for {} {} damage.", amount, kind)
                }
            }
            CombatEvent::AttackMissed => write!(f, "The attack misses."),
            CombatEvent::MonsterSlain { name } => write!(f, "{} dies.", name),
            CombatEvent::CharacterDown { name } => write!(f, "{} falls unconscious.", name),
            CombatEvent::HealingPrayer { healer, amount, targets } => {
                write!(
                    f,
                    "{} prays, restoring {} hit points to {}.",
                    healer,
                    amount,
                    join_names(targets)
                )
            }
            CombatEvent::SelfHealingPrayer { healer, amount } => {
                write!(f, "{} prays, restoring {} hit points.", healer, amount)
            }
            CombatEvent::Bandaged { name, amount } => {
                write!(f, "{} patches up wounds for {} hit points.", name, amount)
            }
            CombatEvent::Unconscious { name } => {
                write!(f, "{} lies unconscious and skips the rest.", name)
            }
            CombatEvent::ExperienceGained { name, amount } => {
                write!(f, "{} gains {} experience.", name, amount)
            }
            CombatEvent::LeveledUp { name, level } => {
                write!(f, "{} reaches level {}!", name, level)
            }
        }
    }
}

// ============================================================================
// Outcomes and turn order
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterOutcome {
    Victory,
    Defeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdventureOutcome {
    Completed,
    Defeated { encounter: u32 },
}

/// Index into one side of the fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combatant {
    Hero(usize),
    Foe(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnSlot {
    pub combatant: Combatant,
    pub initiative: i32,
}

/// Attack-roll outcome on the d10: 1 misses, 10 doubles the damage.
enum ToHit {
    Miss,
    Hit,
    Critical,
}

fn to_hit(dice: &mut impl DiceRoller) -> ToHit {
    match dice.roll(10) {
        1 => ToHit::Miss,
        10 => ToHit::Critical,
        _ => ToHit::Hit,
    }
}

// ============================================================================
// Adventure run
// ============================================================================

/// A party playing through an adventure, one encounter at a time.
#[derive(Debug)]
pub struct AdventureRun {
    adventure: Adventure,
    party: Party,
    current: usize,
    round: u32,
    order: Vec<TurnSlot>,
}

impl AdventureRun {
    /// Start a run. The party must be at least [`MIN_PARTY_SIZE`] strong and
    /// every encounter must have monsters in it.
    pub fn new(adventure: Adventure, party: Party) -> Result<Self, EngineError> {
        if party.len() < MIN_PARTY_SIZE {
            return Err(PartyError::TooSmall(party.len()).into());
        }
        if adventure.encounters.is_empty() {
            return Err(EngineError::EmptyAdventure {
                name: adventure.name.clone(),
            });
        }
        if let Some(empty) = adventure.encounters.iter().find(|e| e.is_empty()) {
            return Err(EngineError::EmptyEncounter {
                number: empty.number,
            });
        }
        Ok(AdventureRun {
            adventure,
            party,
            current: 0,
            round: 0,
            order: Vec::new(),
        })
    }

    pub fn party(&self) -> &Party {
        &self.party
    }

    pub fn adventure(&self) -> &Adventure {
        &self.adventure
    }

    pub fn current_encounter(&self) -> &Encounter {
        &self.adventure.encounters[self.current]
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn turn_order(&self) -> &[TurnSlot] {
        &self.order
    }

    /// Health rows for the frontend's round header.
    pub fn party_status(&self) -> Vec<PartyStatus> {
        self.party.status()
    }

    pub fn into_parts(self) -> (Adventure, Party) {
        (self.adventure, self.party)
    }

    // ========================================================================
    // Stages
    // ========================================================================

    /// Every living member's preparation ability, in party order.
    pub fn preparation_stage(&mut self, dice: &mut impl DiceRoller) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        for index in 0..self.party.members.len() {
            if self.party.members[index].is_dead() {
                continue;
            }
            let name = self.party.members[index].name.clone();
            match self.party.members[index].class {
                ClassKind::Adventurer | ClassKind::Warrior => {
                    self.party.members[index].spirit += 1;
                    events.push(CombatEvent::SelfMotivated { name });
                }
                ClassKind::Champion => {
                    for member in self.party.members.iter_mut().filter(|m| !m.is_dead()) {
                        member.spirit += 1;
                    }
                    events.push(CombatEvent::MotivationalSpeech { name });
                }
                ClassKind::Cleric | ClassKind::Paladin => {
                    let bonus = self.party.members[index].good_luck_bonus(dice);
                    for member in self.party.members.iter_mut().filter(|m| !m.is_dead()) {
                        member.mind += bonus;
                    }
                    events.push(CombatEvent::GoodLuckBlessing { name, bonus });
                }
                ClassKind::Mage => {
                    let shield = self.party.members[index].recharge_shield(dice);
                    events.push(CombatEvent::ShieldRecharged { name, shield });
                }
            }
        }
        events
    }

    /// Roll the turn order for the current encounter.
    ///
    /// Every member rolls, dead ones included (they are skipped at turn
    /// time); monsters bring their fixed initiative. The sort is stable and
    /// descending, so ties keep party members ahead of monsters.
    pub fn roll_initiative(&mut self, dice: &mut impl DiceRoller) -> Vec<CombatEvent> {
        self.order.clear();
        for (index, member) in self.party.members.iter_mut().enumerate() {
            let initiative = member.roll_initiative(dice);
            self.order.push(TurnSlot {
                combatant: Combatant::Hero(index),
                initiative,
            });
        }
        for (index, monster) in self.adventure.encounters[self.current]
            .monsters
            .iter()
            .enumerate()
        {
            self.order.push(TurnSlot {
                combatant: Combatant::Foe(index),
                initiative: monster.initiative,
            });
        }
        self.order.sort_by(|a, b| b.initiative.cmp(&a.initiative));
        self.round = 0;
        self.order
            .iter()
            .map(|slot| CombatEvent::InitiativeRolled {
                name: self.combatant_name(slot.combatant),
                initiative: slot.initiative,
            })
            .collect()
    }

    fn combatant_name(&self, combatant: Combatant) -> String {
        match combatant {
            Combatant::Hero(index) => self.party.members[index].name.clone(),
            Combatant::Foe(index) => {
                self.adventure.encounters[self.current].monsters[index].name.clone()
            }
        }
    }

    /// Play one round: each slot in initiative order takes a turn. The dead
    /// are skipped, and the round cuts off as soon as a side is wiped out.
    pub fn play_round(&mut self, dice: &mut impl DiceRoller) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        self.round += 1;
        events.push(CombatEvent::RoundStarted { round: self.round });
        for slot in 0..self.order.len() {
            if self.party.all_dead() || self.adventure.encounters[self.current].all_slain() {
                break;
            }
            match self.order[slot].combatant {
                Combatant::Hero(index) => {
                    if self.party.members[index].is_dead() {
                        continue;
                    }
                    match self.party.members[index].class.family() {
                        ClassFamily::Adventurer => self.adventurer_turn(index, dice, &mut events),
                        ClassFamily::Cleric => self.cleric_turn(index, dice, &mut events),
                        ClassFamily::Mage => self.mage_turn(index, dice, &mut events),
                    }
                }
                Combatant::Foe(index) => {
                    if self.adventure.encounters[self.current].monsters[index].is_dead() {
                        continue;
                    }
                    if self.adventure.encounters[self.current].monsters[index]
                        .challenge
                        .is_boss()
                    {
                        self.boss_turn(index, dice, &mut events);
                    } else {
                        self.minion_turn(index, dice, &mut events);
                    }
                }
            }
        }
        events
    }

    /// How the current encounter stands: victory once every monster is
    /// dead, defeat once every member is.
    pub fn encounter_outcome(&self) -> Option<EncounterOutcome> {
        if self.adventure.encounters[self.current].all_slain() {
            Some(EncounterOutcome::Victory)
        } else if self.party.all_dead() {
            Some(EncounterOutcome::Defeat)
        } else {
            None
        }
    }

    /// The short rest after a won encounter.
    ///
    /// Rewards come first: every member, fallen ones included, gains the
    /// encounter's full experience and is persisted through the store, and
    /// level-ups (which revive) are reported. Then each living member takes
    /// their rest action in party order; the unconscious are called out,
    /// except mages, who have no rest action at all.
    pub fn short_rest(
        &mut self,
        dice: &mut impl DiceRoller,
        store: &mut dyn CharacterStore,
    ) -> Result<Vec<CombatEvent>, EngineError> {
        let mut events = Vec::new();
        let reward = self.adventure.encounters[self.current].experience_reward();
        for member in self.party.members.iter_mut() {
            events.push(CombatEvent::ExperienceGained {
                name: member.name.clone(),
                amount: reward,
            });
            let leveled = member.gain_xp(reward);
            store.update(member)?;
            if leveled {
                events.push(CombatEvent::LeveledUp {
                    name: member.name.clone(),
                    level: member.level(),
                });
            }
        }
        for index in 0..self.party.members.len() {
            let name = self.party.members[index].name.clone();
            match self.party.members[index].class {
                ClassKind::Adventurer | ClassKind::Warrior | ClassKind::Champion => {
                    if self.party.members[index].is_dead() {
                        events.push(CombatEvent::Unconscious { name });
                    } else {
                        let amount = self.party.members[index].bandage_time(dice);
                        events.push(CombatEvent::Bandaged { name, amount });
                    }
                }
                ClassKind::Cleric => {
                    if self.party.members[index].is_dead() {
                        events.push(CombatEvent::Unconscious { name });
                    } else {
                        let amount = self.party.members[index].heal_roll(dice);
                        self.party.members[index].heal(amount);
                        events.push(CombatEvent::SelfHealingPrayer {
                            healer: name,
                            amount,
                        });
                    }
                }
                ClassKind::Paladin => {
                    if self.party.members[index].is_dead() {
                        events.push(CombatEvent::Unconscious { name });
                    } else {
                        let amount = self.party.members[index].heal_roll(dice);
                        let mut targets = Vec::new();
                        for member in self.party.members.iter_mut().filter(|m| !m.is_dead()) {
                            member.heal(amount);
                            targets.push(member.name.clone());
                        }
                        events.push(CombatEvent::HealingPrayer {
                            healer: name,
                            amount,
                            targets,
                        });
                    }
                }
                ClassKind::Mage => {}
            }
        }
        Ok(events)
    }

    /// Move to the next encounter. False once the adventure is exhausted.
    pub fn advance(&mut self) -> bool {
        if self.current + 1 < self.adventure.encounters.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Play the current encounter start to finish, narrating every stage.
    pub fn play_encounter(
        &mut self,
        dice: &mut impl DiceRoller,
        store: &mut dyn CharacterStore,
        sink: &mut dyn NarrationSink,
    ) -> Result<EncounterOutcome, EngineError> {
        let number = self.adventure.encounters[self.current].number;
        narrate_all(sink, &[CombatEvent::EncounterStarted { number }]);
        let events = self.preparation_stage(dice);
        narrate_all(sink, &events);
        let events = self.roll_initiative(dice);
        narrate_all(sink, &events);
        let outcome = loop {
            let events = self.play_round(dice);
            narrate_all(sink, &events);
            if let Some(outcome) = self.encounter_outcome() {
                break outcome;
            }
        };
        if outcome == EncounterOutcome::Victory {
            let events = self.short_rest(dice, store)?;
            narrate_all(sink, &events);
        }
        Ok(outcome)
    }

    /// Play every remaining encounter until the adventure is completed or
    /// the party falls.
    pub fn run(
        &mut self,
        dice: &mut impl DiceRoller,
        store: &mut dyn CharacterStore,
        sink: &mut dyn NarrationSink,
    ) -> Result<AdventureOutcome, EngineError> {
        loop {
            match self.play_encounter(dice, store, sink)? {
                EncounterOutcome::Defeat => {
                    let number = self.adventure.encounters[self.current].number;
                    return Ok(AdventureOutcome::Defeated { encounter: number });
                }
                EncounterOutcome::Victory => {
                    if !self.advance() {
                        return Ok(AdventureOutcome::Completed);
                    }
                }
            }
        }
    }

    // ========================================================================
    // Turns
    // ========================================================================

    /// Random living target on the monster side: one pick over the whole
    /// lineup, probing forward past the dead.
    fn pick_living_monster(&self, dice: &mut impl DiceRoller) -> Option<usize> {
        let monsters = &self.adventure.encounters[self.current].monsters;
        if monsters.iter().all(|m| m.is_dead()) {
            return None;
        }
        let start = dice.pick(monsters.len());
        (0..monsters.len())
            .map(|offset| (start + offset) % monsters.len())
            .find(|&i| !monsters[i].is_dead())
    }

    /// Random living target on the party side, same probing scheme.
    fn pick_living_member(&self, dice: &mut impl DiceRoller) -> Option<usize> {
        let members = &self.party.members;
        if members.iter().all(|m| m.is_dead()) {
            return None;
        }
        let start = dice.pick(members.len());
        (0..members.len())
            .map(|offset| (start + offset) % members.len())
            .find(|&i| !members[i].is_dead())
    }

    fn adventurer_turn(
        &mut self,
        hero: usize,
        dice: &mut impl DiceRoller,
        events: &mut Vec<CombatEvent>,
    ) {
        let target = match self.pick_living_monster(dice) {
            Some(index) => index,
            None => return,
        };
        let ability = if self.party.members[hero].class == ClassKind::Adventurer {
            AttackKind::SwordSlash
        } else {
            AttackKind::ImprovedSwordSlash
        };
        let kind = self.party.members[hero].class.damage_kind();
        events.push(CombatEvent::AttackDeclared {
            attacker: self.party.members[hero].name.clone(),
            targets: vec![self.adventure.encounters[self.current].monsters[target].name.clone()],
            ability: Some(ability),
        });
        match to_hit(dice) {
            ToHit::Miss => events.push(CombatEvent::AttackMissed),
            outcome => {
                let critical = matches!(outcome, ToHit::Critical);
                let mut amount = self.party.members[hero].sword_slash(dice);
                if critical {
                    amount *= 2;
                }
                let monster = &mut self.adventure.encounters[self.current].monsters[target];
                monster.receive_damage(amount, kind);
                events.push(CombatEvent::AttackLanded { amount, kind, critical });
                if monster.is_dead() {
                    events.push(CombatEvent::MonsterSlain {
                        name: monster.name.clone(),
                    });
                }
            }
        }
    }

    fn cleric_turn(
        &mut self,
        hero: usize,
        dice: &mut impl DiceRoller,
        events: &mut Vec<CombatEvent>,
    ) {
        // The prayer is rolled before the cleric looks around; turning to
        // attack discards it.
        let prayer = self.party.members[hero].heal_roll(dice);
        let wounded: Vec<usize> = self
            .party
            .members
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.is_dead() && m.needs_healing())
            .map(|(i, _)| i)
            .collect();
        if !wounded.is_empty() {
            let healer = self.party.members[hero].name.clone();
            let chosen = if self.party.members[hero].class == ClassKind::Paladin {
                wounded
            } else {
                vec![wounded[0]]
            };
            let mut targets = Vec::new();
            for &index in &chosen {
                self.party.members[index].heal(prayer);
                targets.push(self.party.members[index].name.clone());
            }
            events.push(CombatEvent::HealingPrayer {
                healer,
                amount: prayer,
                targets,
            });
        } else {
            let target = match self.pick_living_monster(dice) {
                Some(index) => index,
                None => return,
            };
            let kind = self.party.members[hero].class.damage_kind();
            events.push(CombatEvent::AttackDeclared {
                attacker: self.party.members[hero].name.clone(),
                targets: vec![
                    self.adventure.encounters[self.current].monsters[target].name.clone(),
                ],
                ability: Some(AttackKind::HolyStrike),
            });
            let amount = self.party.members[hero].holy_strike(dice);
            let monster = &mut self.adventure.encounters[self.current].monsters[target];
            monster.receive_damage(amount, kind);
            events.push(CombatEvent::AttackLanded {
                amount,
                kind,
                critical: false,
            });
            if monster.is_dead() {
                events.push(CombatEvent::MonsterSlain {
                    name: monster.name.clone(),
                });
            }
        }
    }

    fn mage_turn(
        &mut self,
        hero: usize,
        dice: &mut impl DiceRoller,
        events: &mut Vec<CombatEvent>,
    ) {
        let living: Vec<usize> = self.adventure.encounters[self.current]
            .monsters
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.is_dead())
            .map(|(i, _)| i)
            .collect();
        if living.is_empty() {
            return;
        }
        let kind = self.party.members[hero].class.damage_kind();
        if living.len() < 3 {
            let target = match self.pick_living_monster(dice) {
                Some(index) => index,
                None => return,
            };
            events.push(CombatEvent::AttackDeclared {
                attacker: self.party.members[hero].name.clone(),
                targets: vec![
                    self.adventure.encounters[self.current].monsters[target].name.clone(),
                ],
                ability: Some(AttackKind::ArcaneMissile),
            });
            let amount = self.party.members[hero].arcane_missile(dice);
            let monster = &mut self.adventure.encounters[self.current].monsters[target];
            monster.receive_damage(amount, kind);
            events.push(CombatEvent::AttackLanded {
                amount,
                kind,
                critical: false,
            });
            if monster.is_dead() {
                events.push(CombatEvent::MonsterSlain {
                    name: monster.name.clone(),
                });
            }
        } else {
            let targets = living
                .iter()
                .map(|&i| self.adventure.encounters[self.current].monsters[i].name.clone())
                .collect();
            events.push(CombatEvent::AttackDeclared {
                attacker: self.party.members[hero].name.clone(),
                targets,
                ability: Some(AttackKind::Fireball),
            });
            let amount = self.party.members[hero].fireball(dice);
            events.push(CombatEvent::AttackLanded {
                amount,
                kind,
                critical: false,
            });
            for &index in &living {
                let monster = &mut self.adventure.encounters[self.current].monsters[index];
                monster.receive_damage(amount, kind);
                if monster.is_dead() {
                    events.push(CombatEvent::MonsterSlain {
                        name: monster.name.clone(),
                    });
                }
            }
        }
    }

    fn minion_turn(
        &mut self,
        foe: usize,
        dice: &mut impl DiceRoller,
        events: &mut Vec<CombatEvent>,
    ) {
        let target = match self.pick_living_member(dice) {
            Some(index) => index,
            None => return,
        };
        let kind = self.adventure.encounters[self.current].monsters[foe].damage_kind;
        events.push(CombatEvent::AttackDeclared {
            attacker: self.adventure.encounters[self.current].monsters[foe].name.clone(),
            targets: vec![self.party.members[target].name.clone()],
            ability: None,
        });
        match to_hit(dice) {
            ToHit::Miss => events.push(CombatEvent::AttackMissed),
            outcome => {
                let critical = matches!(outcome, ToHit::Critical);
                let mut amount =
                    self.adventure.encounters[self.current].monsters[foe].attack_roll(dice);
                if critical {
                    amount *= 2;
                }
                let member = &mut self.party.members[target];
                member.receive_damage(amount, kind);
                events.push(CombatEvent::AttackLanded { amount, kind, critical });
                if member.is_dead() {
                    events.push(CombatEvent::CharacterDown {
                        name: member.name.clone(),
                    });
                }
            }
        }
    }

    /// A boss hits the whole party: one to-hit roll, one damage roll,
    /// applied to every living member.
    fn boss_turn(
        &mut self,
        foe: usize,
        dice: &mut impl DiceRoller,
        events: &mut Vec<CombatEvent>,
    ) {
        let living: Vec<usize> = self
            .party
            .members
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.is_dead())
            .map(|(i, _)| i)
            .collect();
        if living.is_empty() {
            return;
        }
        let kind = self.adventure.encounters[self.current].monsters[foe].damage_kind;
        let targets = living
            .iter()
            .map(|&i| self.party.members[i].name.clone())
            .collect();
        events.push(CombatEvent::AttackDeclared {
            attacker: self.adventure.encounters[self.current].monsters[foe].name.clone(),
            targets,
            ability: None,
        });
        match to_hit(dice) {
            ToHit::Miss => events.push(CombatEvent::AttackMissed),
            outcome => {
                let critical = matches!(outcome, ToHit::Critical);
                let mut amount =
                    self.adventure.encounters[self.current].monsters[foe].attack_roll(dice);
                if critical {
                    amount *= 2;
                }
                events.push(CombatEvent::AttackLanded { amount, kind, critical });
                for &index in &living {
                    let member = &mut self.party.members[index];
                    member.receive_damage(amount, kind);
                    if member.is_dead() {
                        events.push(CombatEvent::CharacterDown {
                            name: member.name.clone(),
                        });
                    }
                }
            }
        }
    }
}

fn narrate_all(sink: &mut dyn NarrationSink, events: &[CombatEvent]) {
    for event in events {
        sink.narrate(&event.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Character, DamageKind};
    use crate::store::MemoryCharacterStore;
    use crate::testing::{
        sample_adventurer, sample_boss, sample_cleric, sample_goblin, sample_mage, sample_party,
        ScriptedDice,
    };

    fn one_goblin_adventure() -> Adventure {
        let mut adventure = Adventure::new("Cellar Rats", 1);
        adventure.encounters[0]
            .add_monsters(&sample_goblin(), 1)
            .unwrap();
        adventure
    }

    #[test]
    fn test_new_rejects_a_small_party() {
        let party = Party::new(3).unwrap();
        let err = AdventureRun::new(one_goblin_adventure(), party).unwrap_err();
        assert!(matches!(err, EngineError::Party(PartyError::TooSmall(0))));
    }

    #[test]
    fn test_new_rejects_an_adventure_without_encounters() {
        let err = AdventureRun::new(Adventure::new("Nothing", 0), sample_party()).unwrap_err();
        assert!(matches!(err, EngineError::EmptyAdventure { .. }));
    }

    #[test]
    fn test_new_rejects_an_empty_encounter() {
        let mut adventure = Adventure::new("Half Staffed", 2);
        adventure.encounters[0]
            .add_monsters(&sample_goblin(), 1)
            .unwrap();
        let err = AdventureRun::new(adventure, sample_party()).unwrap_err();
        assert!(matches!(err, EngineError::EmptyEncounter { number: 2 }));
    }

    #[test]
    fn test_initiative_ties_keep_party_first() {
        let mut run = AdventureRun::new(one_goblin_adventure(), sample_party()).unwrap();
        // Boro d12+1 = 12 ties the goblin's fixed 12; Mila d10+1 = 6;
        // Irwen d20+3 = 4.
        let mut dice = ScriptedDice::new(vec![11, 5, 1]);
        run.roll_initiative(&mut dice);

        let order: Vec<Combatant> = run.turn_order().iter().map(|s| s.combatant).collect();
        assert_eq!(
            order,
            vec![
                Combatant::Hero(0),
                Combatant::Foe(0),
                Combatant::Hero(1),
                Combatant::Hero(2),
            ]
        );
        assert_eq!(run.turn_order()[0].initiative, 12);
        assert_eq!(run.turn_order()[1].initiative, 12);
    }

    #[test]
    fn test_dead_members_still_roll_initiative() {
        let mut run = AdventureRun::new(one_goblin_adventure(), sample_party()).unwrap();
        run.party.members[1].receive_damage(1000, DamageKind::Magical);
        // The script still needs three member rolls.
        let mut dice = ScriptedDice::new(vec![4, 9, 17]);
        run.roll_initiative(&mut dice);
        assert_eq!(dice.remaining(), 0);
        assert_eq!(run.turn_order().len(), 4);
    }

    #[test]
    fn test_preparation_buffs_in_party_order() {
        let mut run = AdventureRun::new(one_goblin_adventure(), sample_party()).unwrap();
        // Boro motivates, Mila blesses (+1 mind, no roll), Irwen recharges
        // with the blessing already applied.
        let mut dice = ScriptedDice::new(vec![4]);
        let events = run.preparation_stage(&mut dice);

        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], CombatEvent::SelfMotivated { name } if name == "Boro"));
        assert!(
            matches!(&events[1], CombatEvent::GoodLuckBlessing { name, bonus: 1 } if name == "Mila")
        );
        assert!(
            matches!(&events[2], CombatEvent::ShieldRecharged { name, shield: 8 } if name == "Irwen")
        );
        assert_eq!(run.party().members[0].spirit, 2);
        assert_eq!(run.party().members[2].mind, 4);
        assert_eq!(run.party().members[2].shield, 8);
    }

    #[test]
    fn test_preparation_skips_the_dead() {
        let mut run = AdventureRun::new(one_goblin_adventure(), sample_party()).unwrap();
        run.party.members[2].receive_damage(1000, DamageKind::Physical);
        // An empty script proves the dead mage never rolls a recharge.
        let mut dice = ScriptedDice::new(vec![]);
        let events = run.preparation_stage(&mut dice);
        assert_eq!(events.len(), 2);
        assert_eq!(run.party().members[2].shield, 0);
    }

    #[test]
    fn test_champion_speech_lifts_the_living() {
        let mut party = Party::new(3).unwrap();
        party
            .recruit(Character::new("Edo", "Sam", ClassKind::Adventurer, 700, 2, 1, 1))
            .unwrap();
        party.recruit(sample_cleric("Mila")).unwrap();
        party.recruit(sample_mage("Irwen")).unwrap();
        let mut run = AdventureRun::new(one_goblin_adventure(), party).unwrap();
        run.party.members[1].receive_damage(1000, DamageKind::Magical);

        let mut dice = ScriptedDice::new(vec![4]);
        let events = run.preparation_stage(&mut dice);
        assert!(matches!(&events[0], CombatEvent::MotivationalSpeech { name } if name == "Edo"));
        assert_eq!(run.party().members[0].spirit, 2);
        assert_eq!(run.party().members[1].spirit, 1);
        assert_eq!(run.party().members[2].spirit, 2);
    }

    #[test]
    fn test_advance_walks_the_encounters() {
        let mut adventure = Adventure::new("Two Rooms", 2);
        adventure.encounters[0]
            .add_monsters(&sample_goblin(), 1)
            .unwrap();
        adventure.encounters[1]
            .add_monsters(&sample_goblin(), 2)
            .unwrap();
        let mut run = AdventureRun::new(adventure, sample_party()).unwrap();

        assert_eq!(run.current_encounter().number, 1);
        assert!(run.advance());
        assert_eq!(run.current_encounter().number, 2);
        assert!(!run.advance());
        assert_eq!(run.current_encounter().number, 2);
    }

    #[test]
    fn test_outcome_is_open_while_both_sides_stand() {
        let run = AdventureRun::new(one_goblin_adventure(), sample_party()).unwrap();
        assert_eq!(run.encounter_outcome(), None);
    }

    #[test]
    fn test_event_lines_read_as_narration() {
        assert_eq!(
            CombatEvent::RoundStarted { round: 2 }.to_string(),
            "Round 2!"
        );
        assert_eq!(
            CombatEvent::AttackDeclared {
                attacker: "Irwen".to_string(),
                targets: vec!["Goblin".to_string(), "Imp".to_string(), "Orc".to_string()],
                ability: Some(AttackKind::Fireball),
            }
            .to_string(),
            "Irwen uses Fireball against Goblin, Imp and Orc."
        );
        assert_eq!(
            CombatEvent::AttackDeclared {
                attacker: "Goblin".to_string(),
                targets: vec!["Boro".to_string()],
                ability: None,
            }
            .to_string(),
            "Goblin attacks Boro."
        );
        assert_eq!(
            CombatEvent::AttackLanded {
                amount: 9,
                kind: DamageKind::Magical,
                critical: true,
            }
            .to_string(),
            "Critical hit! 9 magical damage."
        );
        assert_eq!(
            CombatEvent::CharacterDown {
                name: "Mila".to_string()
            }
            .to_string(),
            "Mila falls unconscious."
        );
    }

    #[test]
    fn test_sample_adventurer_stats_back_the_scripts() {
        // The scripted tests lean on these exact numbers.
        let boro = sample_adventurer("Boro");
        assert_eq!((boro.body, boro.mind, boro.spirit), (2, 1, 1));
        assert_eq!(boro.hp_max, 12);
    }

    #[test]
    fn test_short_rest_revives_with_level_up() {
        let mut adventure = Adventure::new("Dragon Lair", 1);
        adventure.encounters[0]
            .add_monsters(&sample_boss(), 1)
            .unwrap();
        let mut run = AdventureRun::new(adventure, sample_party()).unwrap();
        run.party.members[0].receive_damage(1000, DamageKind::Magical);
        assert!(run.party.members[0].is_dead());

        // 100 xp pushes everyone to level 2; Boro comes back at full
        // strength and takes his rest action like the rest.
        let mut store = MemoryCharacterStore::new();
        let mut dice = ScriptedDice::new(vec![2, 5]);
        let events = run.short_rest(&mut dice, &mut store).unwrap();

        assert!(run.party.members.iter().all(|m| m.level() == 2));
        assert_eq!(run.party.members[0].hp, 24);
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::LeveledUp { name, level: 2 } if name == "Boro")));
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::Bandaged { name, .. } if name == "Boro")));
        assert!(!events
            .iter()
            .any(|e| matches!(e, CombatEvent::Unconscious { .. })));
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    fn test_short_rest_leaves_the_dead_down_without_level_up() {
        let mut run = AdventureRun::new(one_goblin_adventure(), sample_party()).unwrap();
        run.party.members[0].receive_damage(1000, DamageKind::Magical);

        // 10 xp is no level; Boro stays down and only Mila rolls a heal.
        let mut store = MemoryCharacterStore::new();
        let mut dice = ScriptedDice::new(vec![5]);
        let events = run.short_rest(&mut dice, &mut store).unwrap();

        assert!(run.party.members[0].is_dead());
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::Unconscious { name } if name == "Boro")));
        assert_eq!(dice.remaining(), 0);
        // The fallen are persisted all the same.
        assert_eq!(store.list().unwrap().len(), 3);
    }
}
