use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

/// Bucket of a 0-6 subtotal on one nine-box axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Mid,
    High,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Low, Level::Mid, Level::High];

    pub const fn from_subtotal(score: u8) -> Self {
        match score {
            0..=2 => Level::Low,
            3..=4 => Level::Mid,
            _ => Level::High,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Mid => "mid",
            Level::High => "high",
        }
    }
}

/// Nine-box placement labels. Status Quo is the default placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NineBoxPosition {
    #[serde(rename = "Raw Talent")]
    RawTalent,
    #[serde(rename = "High Impact")]
    HighImpact,
    #[serde(rename = "Transformative Outcomes")]
    TransformativeOutcomes,
    #[serde(rename = "Narrow Contributor")]
    NarrowContributor,
    #[default]
    #[serde(rename = "Status Quo")]
    StatusQuo,
    #[serde(rename = "Developing Driver")]
    DevelopingDriver,
    #[serde(rename = "Critical Risk")]
    CriticalRisk,
    #[serde(rename = "Inconsistent")]
    Inconsistent,
    #[serde(rename = "Untapped Potential")]
    UntappedPotential,
}

impl NineBoxPosition {
    /// Composite at which a high/high placement becomes Transformative Outcomes.
    pub const TRANSFORMATIVE_COMPOSITE: u8 = 11;

    pub const fn label(self) -> &'static str {
        match self {
            NineBoxPosition::RawTalent => "Raw Talent",
            NineBoxPosition::HighImpact => "High Impact",
            NineBoxPosition::TransformativeOutcomes => "Transformative Outcomes",
            NineBoxPosition::NarrowContributor => "Narrow Contributor",
            NineBoxPosition::StatusQuo => "Status Quo",
            NineBoxPosition::DevelopingDriver => "Developing Driver",
            NineBoxPosition::CriticalRisk => "Critical Risk",
            NineBoxPosition::Inconsistent => "Inconsistent",
            NineBoxPosition::UntappedPotential => "Untapped Potential",
        }
    }

    /// Grid cell for a pair of axis levels, before the composite override.
    pub const fn for_levels(growth: Level, contribution: Level) -> Self {
        match (growth, contribution) {
            (Level::High, Level::Low) => NineBoxPosition::RawTalent,
            (Level::High, Level::Mid) => NineBoxPosition::HighImpact,
            (Level::High, Level::High) => NineBoxPosition::HighImpact,
            (Level::Mid, Level::Low) => NineBoxPosition::NarrowContributor,
            (Level::Mid, Level::Mid) => NineBoxPosition::StatusQuo,
            (Level::Mid, Level::High) => NineBoxPosition::DevelopingDriver,
            (Level::Low, Level::Low) => NineBoxPosition::CriticalRisk,
            (Level::Low, Level::Mid) => NineBoxPosition::Inconsistent,
            (Level::Low, Level::High) => NineBoxPosition::UntappedPotential,
        }
    }
}

impl fmt::Display for NineBoxPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Place a subject on the contribution x growth grid.
///
/// Both axes are bucketed first; the Transformative Outcomes override only
/// applies to a high/high cell whose composite reaches 11.
pub fn classify_nine_box(total_contribution: u8, total_growth: u8, composite: u8) -> NineBoxPosition {
    let contribution = Level::from_subtotal(total_contribution);
    let growth = Level::from_subtotal(total_growth);

    match NineBoxPosition::for_levels(growth, contribution) {
        NineBoxPosition::HighImpact
            if growth == Level::High
                && contribution == Level::High
                && composite >= NineBoxPosition::TRANSFORMATIVE_COMPOSITE =>
        {
            NineBoxPosition::TransformativeOutcomes
        }
        position => position,
    }
}

/// Performance axis of the performance/potential scheme, derived from the composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceLevel {
    Low,
    Mid,
    High,
}

impl PerformanceLevel {
    pub const fn from_composite(composite: u8) -> Self {
        match composite {
            0..=2 => PerformanceLevel::Low,
            3..=4 => PerformanceLevel::Mid,
            _ => PerformanceLevel::High,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PerformanceLevel::Low => "Low",
            PerformanceLevel::Mid => "Mid",
            PerformanceLevel::High => "High",
        }
    }
}

pub fn performance_level(composite: u8) -> PerformanceLevel {
    PerformanceLevel::from_composite(composite)
}

/// Reviewer-supplied potential rating. Never derived from scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Potential {
    #[serde(alias = "low")]
    Low,
    #[serde(alias = "mid", alias = "Medium", alias = "medium")]
    Mid,
    #[serde(alias = "high")]
    High,
}

impl Potential {
    pub const fn label(self) -> &'static str {
        match self {
            Potential::Low => "Low",
            Potential::Mid => "Mid",
            Potential::High => "High",
        }
    }
}

impl FromStr for Potential {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Potential::Low),
            "mid" | "medium" => Ok(Potential::Mid),
            "high" => Ok(Potential::High),
            other => Err(format!("unknown potential '{other}' (expected low, mid, or high)")),
        }
    }
}

/// "{performance} Performance / {potential} Potential".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformancePotentialPosition {
    pub performance: PerformanceLevel,
    pub potential: Potential,
}

impl fmt::Display for PerformancePotentialPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Performance / {} Potential",
            self.performance.label(),
            self.potential.label()
        )
    }
}

impl Serialize for PerformancePotentialPosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub fn performance_potential_position(
    composite: u8,
    potential: Potential,
) -> PerformancePotentialPosition {
    PerformancePotentialPosition {
        performance: performance_level(composite),
        potential,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtotal_buckets_split_at_three_and_five() {
        assert_eq!(Level::from_subtotal(0), Level::Low);
        assert_eq!(Level::from_subtotal(2), Level::Low);
        assert_eq!(Level::from_subtotal(3), Level::Mid);
        assert_eq!(Level::from_subtotal(4), Level::Mid);
        assert_eq!(Level::from_subtotal(5), Level::High);
        assert_eq!(Level::from_subtotal(6), Level::High);
    }

    #[test]
    fn grid_matches_reference_table() {
        let cases = [
            (6, 0, NineBoxPosition::RawTalent),
            (6, 3, NineBoxPosition::HighImpact),
            (5, 5, NineBoxPosition::HighImpact),
            (3, 1, NineBoxPosition::NarrowContributor),
            (4, 4, NineBoxPosition::StatusQuo),
            (3, 6, NineBoxPosition::DevelopingDriver),
            (0, 0, NineBoxPosition::CriticalRisk),
            (2, 3, NineBoxPosition::Inconsistent),
            (1, 5, NineBoxPosition::UntappedPotential),
        ];

        for (growth, contribution, expected) in cases {
            assert_eq!(
                classify_nine_box(contribution, growth, contribution + growth),
                expected,
                "growth {growth}, contribution {contribution}"
            );
        }
    }

    #[test]
    fn transformative_override_needs_composite_eleven() {
        assert_eq!(
            classify_nine_box(6, 6, 12),
            NineBoxPosition::TransformativeOutcomes
        );
        assert_eq!(
            classify_nine_box(6, 5, 11),
            NineBoxPosition::TransformativeOutcomes
        );
        assert_eq!(classify_nine_box(5, 5, 10), NineBoxPosition::HighImpact);
    }

    #[test]
    fn override_does_not_apply_outside_high_high() {
        // growth high, contribution mid: composite alone never triggers the override
        assert_eq!(classify_nine_box(4, 6, 11), NineBoxPosition::HighImpact);
    }

    #[test]
    fn performance_axis_uses_composite_thresholds() {
        assert_eq!(performance_level(0), PerformanceLevel::Low);
        assert_eq!(performance_level(2), PerformanceLevel::Low);
        assert_eq!(performance_level(3), PerformanceLevel::Mid);
        assert_eq!(performance_level(4), PerformanceLevel::Mid);
        assert_eq!(performance_level(5), PerformanceLevel::High);
        assert_eq!(performance_level(12), PerformanceLevel::High);
    }

    #[test]
    fn position_string_combines_both_axes() {
        let position = performance_potential_position(4, Potential::High);
        assert_eq!(position.to_string(), "Mid Performance / High Potential");
        assert_eq!(
            serde_json::to_value(position).expect("serializes"),
            serde_json::json!("Mid Performance / High Potential")
        );
    }

    #[test]
    fn potential_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Potential>(), Ok(Potential::High));
        assert_eq!("medium".parse::<Potential>(), Ok(Potential::Mid));
        assert!("stellar".parse::<Potential>().is_err());
    }
}
