//! Summarize a records file.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use heatfield_event_model::event::expand_records;
use heatfield_event_model::record::load_records;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let records =
        load_records(&path).map_err(|e| anyhow::anyhow!("Failed to load records: {e}"))?;

    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    let mut subjects: BTreeSet<&str> = BTreeSet::new();
    let mut teams: BTreeSet<&str> = BTreeSet::new();
    for record in &records {
        *by_type.entry(record.kind.type_name()).or_default() += 1;
        for actor in record.actors() {
            subjects.insert(actor.subject());
            teams.insert(actor.team.as_str());
        }
    }

    println!("Records: {} ({})", records.len(), path.display());
    for (kind, count) in &by_type {
        println!("  {kind}: {count}");
    }

    let first = records.iter().map(|r| r.tick).min();
    let last = records.iter().map(|r| r.tick).max();
    if let (Some(first), Some(last)) = (first, last) {
        println!("  Ticks: {first} - {last}");
    }
    println!();

    println!("Subjects ({}):", subjects.len());
    for subject in &subjects {
        println!("  {subject}");
    }
    println!("Teams: {}", teams.into_iter().collect::<Vec<_>>().join(", "));
    println!();

    let (events, stats) = expand_records(&records);
    println!("Expansion:");
    println!("  Warmup records skipped: {}", stats.warmup_skipped);
    println!("  Contributions dropped: {}", stats.dropped);
    println!("  Events: {}", events.len());

    Ok(())
}
