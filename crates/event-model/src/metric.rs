//! The metric table: which heatmaps exist and how records feed them.
//!
//! Every heatmap is driven by one [`MetricKind`]. A kind knows its label,
//! the rule that turns a record into a weighted position for one subject,
//! and (optionally) the metric it is compared against in a ratio heatmap.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::WorldPoint;
use crate::record::{Actor, FlashRelation, GameRecord, RecordKind};

/// The base metrics the engine accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Where a player's smoke grenades landed.
    Smoke,
    /// Where a player's flashbangs went off, weighted by enemy blind time.
    FlashPop,
    /// Where the enemies a player blinded were standing.
    FlashHit,
    /// Where a player stood when scoring a kill.
    Kills,
    /// Where a player stood when dying.
    Deaths,
}

/// What a single record contributes to one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution<'a> {
    /// The actor the heatmap belongs to.
    pub actor: &'a Actor,
    /// Where the contribution lands.
    pub position: WorldPoint,
    /// Weight before decay.
    pub weight: f64,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Smoke,
        MetricKind::FlashPop,
        MetricKind::FlashHit,
        MetricKind::Kills,
        MetricKind::Deaths,
    ];

    /// Short machine name, used in file names and selectors.
    pub fn slug(&self) -> &'static str {
        match self {
            MetricKind::Smoke => "smoke",
            MetricKind::FlashPop => "flash_pop",
            MetricKind::FlashHit => "flash_hit",
            MetricKind::Kills => "kills",
            MetricKind::Deaths => "deaths",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Smoke => "Smoke throws",
            MetricKind::FlashPop => "FB detonations",
            MetricKind::FlashHit => "FB victims",
            MetricKind::Kills => "Kill positions",
            MetricKind::Deaths => "Death positions",
        }
    }

    /// The metric this one is compared against in a ratio heatmap.
    pub fn ratio_partner(&self) -> Option<MetricKind> {
        match self {
            MetricKind::Kills => Some(MetricKind::Deaths),
            _ => None,
        }
    }

    /// Look up a kind by its slug.
    pub fn from_slug(slug: &str) -> Option<MetricKind> {
        Self::ALL.into_iter().find(|kind| kind.slug() == slug)
    }

    /// Apply this metric's extraction rule to a record.
    ///
    /// Returns `None` when the record does not feed this metric: a different
    /// record type, flashes on self or team, or a kill without a distinct
    /// attacker.
    pub fn extract<'a>(&self, record: &'a GameRecord) -> Option<Contribution<'a>> {
        match (self, &record.kind) {
            (MetricKind::Smoke, RecordKind::SmokeDetonate { thrower, position }) => {
                Some(Contribution {
                    actor: thrower,
                    position: *position,
                    weight: 1.0,
                })
            }
            (
                MetricKind::FlashPop,
                RecordKind::FlashHit {
                    thrower,
                    relation: FlashRelation::Enemy,
                    detonation,
                    blind_secs,
                    ..
                },
            ) => Some(Contribution {
                actor: thrower,
                position: *detonation,
                weight: *blind_secs,
            }),
            (
                MetricKind::FlashHit,
                RecordKind::FlashHit {
                    thrower,
                    relation: FlashRelation::Enemy,
                    victim_position,
                    blind_secs,
                    ..
                },
            ) => Some(Contribution {
                actor: thrower,
                position: *victim_position,
                weight: *blind_secs,
            }),
            (
                MetricKind::Kills,
                RecordKind::PlayerDeath {
                    attacker: Some(attacker),
                    victim,
                    attacker_position: Some(position),
                    ..
                },
            ) if attacker.name != victim.name => Some(Contribution {
                actor: attacker,
                position: *position,
                weight: 1.0,
            }),
            (
                MetricKind::Deaths,
                RecordKind::PlayerDeath {
                    victim,
                    victim_position,
                    ..
                },
            ) => Some(Contribution {
                actor: victim,
                position: *victim_position,
                weight: 1.0,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Identity of the metric half of a heatmap key.
///
/// Base metrics come straight from records; ratio metrics are derived
/// after ingestion from a pair of base metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricId {
    Base(MetricKind),
    Ratio {
        numerator: MetricKind,
        denominator: MetricKind,
    },
}

impl MetricId {
    /// Whether heatmaps of this metric carry signed values.
    pub fn is_ratio(&self) -> bool {
        matches!(self, MetricId::Ratio { .. })
    }

    pub fn slug(&self) -> String {
        match self {
            MetricId::Base(kind) => kind.slug().to_string(),
            MetricId::Ratio {
                numerator,
                denominator,
            } => format!("{}_vs_{}", numerator.slug(), denominator.slug()),
        }
    }

    pub fn label(&self) -> String {
        match self {
            MetricId::Base(kind) => kind.label().to_string(),
            MetricId::Ratio {
                numerator,
                denominator,
            } => format!(
                "{} vs {}",
                numerator.label(),
                denominator.label().to_lowercase()
            ),
        }
    }
}

impl From<MetricKind> for MetricId {
    fn from(kind: MetricKind) -> Self {
        MetricId::Base(kind)
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.slug())
    }
}

/// A declared pairing of two base metrics for ratio heatmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RatioRelation {
    pub numerator: MetricKind,
    pub denominator: MetricKind,
}

impl RatioRelation {
    pub fn new(numerator: MetricKind, denominator: MetricKind) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Relations declared by the metric table itself.
    pub fn defaults() -> Vec<RatioRelation> {
        MetricKind::ALL
            .into_iter()
            .filter_map(|kind| kind.ratio_partner().map(|partner| Self::new(kind, partner)))
            .collect()
    }

    /// The metric id of the heatmaps this relation produces.
    pub fn target(&self) -> MetricId {
        MetricId::Ratio {
            numerator: self.numerator,
            denominator: self.denominator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flash(relation: FlashRelation) -> GameRecord {
        GameRecord::new(
            100,
            RecordKind::FlashHit {
                thrower: Actor::new("Rosuav", "T"),
                victim: Actor::new("Stephen", "C"),
                relation,
                detonation: WorldPoint::new(10.0, 20.0),
                victim_position: WorldPoint::new(30.0, 40.0),
                blind_secs: 3.25,
            },
        )
    }

    fn death(attacker: Option<&str>) -> GameRecord {
        GameRecord::new(
            200,
            RecordKind::PlayerDeath {
                attacker: attacker.map(|name| Actor::new(name, "T")),
                victim: Actor::new("Stephen", "C"),
                attacker_position: attacker.map(|_| WorldPoint::new(1.0, 2.0)),
                victim_position: WorldPoint::new(3.0, 4.0),
            },
        )
    }

    #[test]
    fn test_flash_metrics_split_positions() {
        let record = flash(FlashRelation::Enemy);

        let pop = MetricKind::FlashPop.extract(&record).unwrap();
        assert_eq!(pop.actor.subject(), "Rosuav");
        assert_eq!(pop.position, WorldPoint::new(10.0, 20.0));
        assert_eq!(pop.weight, 3.25);

        let hit = MetricKind::FlashHit.extract(&record).unwrap();
        assert_eq!(hit.actor.subject(), "Rosuav");
        assert_eq!(hit.position, WorldPoint::new(30.0, 40.0));
    }

    #[test]
    fn test_friendly_flashes_contribute_nothing() {
        for relation in [FlashRelation::Team, FlashRelation::SelfHit] {
            let record = flash(relation);
            assert!(MetricKind::FlashPop.extract(&record).is_none());
            assert!(MetricKind::FlashHit.extract(&record).is_none());
        }
    }

    #[test]
    fn test_kill_requires_distinct_attacker() {
        assert!(MetricKind::Kills.extract(&death(Some("Rosuav"))).is_some());
        assert!(MetricKind::Kills.extract(&death(Some("Stephen"))).is_none());
        assert!(MetricKind::Kills.extract(&death(None)).is_none());
    }

    #[test]
    fn test_deaths_always_count() {
        for record in [death(Some("Rosuav")), death(Some("Stephen")), death(None)] {
            let c = MetricKind::Deaths.extract(&record).unwrap();
            assert_eq!(c.actor.subject(), "Stephen");
            assert_eq!(c.position, WorldPoint::new(3.0, 4.0));
        }
    }

    #[test]
    fn test_kind_mismatch_yields_none() {
        assert!(MetricKind::Smoke.extract(&flash(FlashRelation::Enemy)).is_none());
        assert!(MetricKind::Deaths.extract(&flash(FlashRelation::Enemy)).is_none());
    }

    #[test]
    fn test_slugs_round_trip() {
        for kind in MetricKind::ALL {
            assert_eq!(MetricKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(MetricKind::from_slug("nope"), None);
    }

    #[test]
    fn test_default_relations() {
        let relations = RatioRelation::defaults();
        assert_eq!(
            relations,
            vec![RatioRelation::new(MetricKind::Kills, MetricKind::Deaths)]
        );
        let target = relations[0].target();
        assert!(target.is_ratio());
        assert_eq!(target.slug(), "kills_vs_deaths");
        assert_eq!(target.label(), "Kill positions vs death positions");
    }
}
