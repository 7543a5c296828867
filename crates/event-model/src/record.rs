//! Parsed gameplay records handed over by the external ingestion step.
//!
//! Records arrive as JSONL, one object per line. Team tags are already
//! resolved per record; the engine never infers side switches itself.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::geometry::WorldPoint;

/// Source timestamp (demo tick). Only its ordering matters to the engine.
pub type Tick = u64;

/// A participant in a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Display name as recorded.
    pub name: String,
    /// Resolved team tag at the time of the record.
    pub team: String,
}

impl Actor {
    pub fn new(name: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            team: team.into(),
        }
    }

    /// Subject identifier: the first word of the display name.
    ///
    /// Clan tags and suffixes appended after a space are not part of
    /// the identity.
    pub fn subject(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }
}

/// Who a flashbang affected, relative to the thrower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashRelation {
    Enemy,
    Team,
    #[serde(rename = "self")]
    SelfHit,
}

/// One parsed record with its timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub tick: Tick,

    /// Round number; `Some(0)` marks warmup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,

    #[serde(flatten)]
    pub kind: RecordKind,
}

/// Record payloads the metric table knows how to read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordKind {
    /// A smoke grenade popped.
    SmokeDetonate { thrower: Actor, position: WorldPoint },

    /// A flashbang blinded somebody.
    FlashHit {
        thrower: Actor,
        victim: Actor,
        relation: FlashRelation,
        /// Where the flashbang went off.
        detonation: WorldPoint,
        /// Where the blinded player stood.
        victim_position: WorldPoint,
        /// Blind duration in seconds.
        blind_secs: f64,
    },

    /// A player died. `attacker` is absent for world damage.
    PlayerDeath {
        #[serde(default)]
        attacker: Option<Actor>,
        victim: Actor,
        #[serde(default)]
        attacker_position: Option<WorldPoint>,
        victim_position: WorldPoint,
    },
}

impl RecordKind {
    /// Wire name of this payload type.
    pub fn type_name(&self) -> &'static str {
        match self {
            RecordKind::SmokeDetonate { .. } => "smoke_detonate",
            RecordKind::FlashHit { .. } => "flash_hit",
            RecordKind::PlayerDeath { .. } => "player_death",
        }
    }
}

impl GameRecord {
    pub fn new(tick: Tick, kind: RecordKind) -> Self {
        Self {
            tick,
            round: None,
            kind,
        }
    }

    /// Set the round number.
    pub fn in_round(mut self, round: u32) -> Self {
        self.round = Some(round);
        self
    }

    /// Warmup rounds carry no meaningful positional data.
    pub fn is_warmup(&self) -> bool {
        self.round == Some(0)
    }

    /// Every actor mentioned by the record.
    pub fn actors(&self) -> Vec<&Actor> {
        match &self.kind {
            RecordKind::SmokeDetonate { thrower, .. } => vec![thrower],
            RecordKind::FlashHit {
                thrower, victim, ..
            } => vec![thrower, victim],
            RecordKind::PlayerDeath {
                attacker, victim, ..
            } => attacker.iter().chain(std::iter::once(victim)).collect(),
        }
    }
}

/// Errors that can occur when reading records.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error on line {line}: {source}")]
    ParseError {
        line: usize,
        source: serde_json::Error,
    },
}

/// Parse records from JSONL content (one JSON object per line).
///
/// Blank lines and lines starting with `#` are skipped. Line numbers in
/// errors are 1-based and count skipped lines.
pub fn parse_records(jsonl: &str) -> Result<Vec<GameRecord>, RecordError> {
    jsonl
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line_no, line)| {
            serde_json::from_str(line).map_err(|source| RecordError::ParseError {
                line: line_no,
                source,
            })
        })
        .collect()
}

/// Read and parse a JSONL records file.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<GameRecord>, RecordError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| RecordError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&content)
}

/// Serialize records to JSONL format.
pub fn serialize_records(records: &[GameRecord]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for record in records {
        output.push_str(&serde_json::to_string(record)?);
        output.push('\n');
    }
    Ok(output)
}
