//! Roll a fresh party, build a two-encounter adventure from the bestiary,
//! and play it through with live narration.
//!
//! Run with: `cargo run --example playthrough`

use tavernfall_core::{
    Adventure, AdventureOutcome, AdventureRun, BuiltinCatalog, CharacterBuilder, ClassKind, Dice,
    MemoryCharacterStore, MonsterCatalog, NarrationSink, Party,
};

struct PrintSink;

impl NarrationSink for PrintSink {
    fn narrate(&mut self, line: &str) {
        println!("{line}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Seeded so the transcript reads the same on every run.
    let mut dice = Dice::seeded(7);

    println!("=== Rolling the party ===\n");
    let mut party = Party::new(3)?;
    for (name, class) in [
        ("boro", ClassKind::Adventurer),
        ("mila", ClassKind::Cleric),
        ("irwen", ClassKind::Mage),
    ] {
        let builder = CharacterBuilder::new(name, "Demo", 1, &mut dice)?;
        let stats = builder.stats();
        println!(
            "{} rolls body {}+{}, mind {}+{}, spirit {}+{}",
            builder.name(),
            stats.body.first,
            stats.body.second,
            stats.mind.first,
            stats.mind.second,
            stats.spirit.first,
            stats.spirit.second,
        );
        let member = builder.build(class);
        println!(
            "  {} the {} joins with {} hit points",
            member.name, member.class, member.hp_max
        );
        party.recruit(member)?;
    }

    println!("\n=== Stocking the cellar ===\n");
    let catalog = BuiltinCatalog;
    let kobold = catalog.by_index(0)?.ok_or("the bestiary lost its kobold")?;
    let goblin = catalog.by_index(1)?.ok_or("the bestiary lost its goblin")?;
    let orc = catalog.by_index(3)?.ok_or("the bestiary lost its orc")?;

    let mut adventure = Adventure::new("The Cellar Below the Tavern", 2);
    adventure.encounters[0].add_monsters(&kobold, 2)?;
    adventure.encounters[0].add_monsters(&goblin, 1)?;
    adventure.encounters[1].add_monsters(&orc, 1)?;
    for encounter in &adventure.encounters {
        let lineup: Vec<String> = encounter.grouped().iter().map(|g| g.to_string()).collect();
        println!("Encounter {}: {}", encounter.number, lineup.join(", "));
    }

    println!("\n=== Into the dark ===\n");
    let mut run = AdventureRun::new(adventure, party)?;
    let mut store = MemoryCharacterStore::new();
    let outcome = run.run(&mut dice, &mut store, &mut PrintSink)?;

    match outcome {
        AdventureOutcome::Completed => println!("\nThe party drinks free tonight."),
        AdventureOutcome::Defeated { encounter } => {
            println!("\nThe party fell in encounter {encounter}.")
        }
    }
    println!();
    for line in run.party_status() {
        println!("{line}");
    }
    Ok(())
}
