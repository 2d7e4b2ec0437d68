//! Composite scoring and nine-box placement.
//!
//! Everything here is pure: no I/O, no clock, no shared state.

mod domain;
mod grid;
mod rules;

pub use domain::{
    DataQualityIssue, DataQualityKind, Domain, DomainScores, Rating, Score, ScoreField, Totals,
};
pub use grid::{
    classify_nine_box, performance_level, performance_potential_position, Level,
    NineBoxPosition, PerformanceLevel, PerformancePotentialPosition, Potential,
};
pub use rules::{audit, compute_totals};

use serde::Serialize;
use tracing::warn;

/// Everything the scoring rules derive from one set of domain scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCard {
    #[serde(flatten)]
    pub totals: Totals,
    pub contribution_level: Level,
    pub growth_level: Level,
    pub nine_box: NineBoxPosition,
    pub performance_level: PerformanceLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_position: Option<PerformancePotentialPosition>,
    pub issues: Vec<DataQualityIssue>,
}

impl Totals {
    pub fn nine_box(&self) -> NineBoxPosition {
        classify_nine_box(self.total_contribution, self.total_growth, self.composite)
    }
}

pub fn score_card(scores: &DomainScores, potential: Option<Potential>) -> ScoreCard {
    let (totals, issues) = rules::tally(scores);
    for issue in &issues {
        warn!(domain = %issue.domain, %issue, "score data-quality issue");
    }

    ScoreCard {
        totals,
        contribution_level: Level::from_subtotal(totals.total_contribution),
        growth_level: Level::from_subtotal(totals.total_growth),
        nine_box: totals.nine_box(),
        performance_level: performance_level(totals.composite),
        performance_position: potential
            .map(|potential| performance_potential_position(totals.composite, potential)),
        issues,
    }
}
