use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The three fixed assessment domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Culture,
    Competencies,
    Execution,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Culture, Domain::Competencies, Domain::Execution];

    pub const fn label(self) -> &'static str {
        match self {
            Domain::Culture => "culture",
            Domain::Competencies => "competencies",
            Domain::Execution => "execution",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which half of a domain rating pair a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreField {
    Contribution,
    Growth,
}

impl ScoreField {
    pub const fn label(self) -> &'static str {
        match self {
            ScoreField::Contribution => "contribution",
            ScoreField::Growth => "growth",
        }
    }
}

/// A single rating as received from a caller.
///
/// Ratings are accepted leniently: anything that is not an integer is kept as
/// [`Rating::Malformed`] so the scoring rules can degrade it to zero and report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rating {
    Value(i64),
    #[default]
    Missing,
    Malformed,
}

impl Rating {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 2;

    /// Human readable name for a valid rating value.
    pub const fn describe(value: u8) -> &'static str {
        match value {
            0 => "Below Standard",
            1 => "Meets Standard",
            _ => "Exceeds Standard",
        }
    }
}

impl From<i64> for Rating {
    fn from(value: i64) -> Self {
        Rating::Value(value)
    }
}

impl From<i32> for Rating {
    fn from(value: i32) -> Self {
        Rating::Value(i64::from(value))
    }
}

impl From<u8> for Rating {
    fn from(value: u8) -> Self {
        Rating::Value(i64::from(value))
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rating::Value(value) => serializer.serialize_i64(*value),
            Rating::Missing | Rating::Malformed => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(match raw {
            serde_json::Value::Null => Rating::Missing,
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(value) => Rating::Value(value),
                None => match number.as_f64() {
                    Some(value) if value.fract() == 0.0 && value.abs() <= i64::MAX as f64 => {
                        Rating::Value(value as i64)
                    }
                    _ => Rating::Malformed,
                },
            },
            _ => Rating::Malformed,
        })
    }
}

/// A contribution/growth rating pair for one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    #[serde(default)]
    pub contribution: Rating,
    #[serde(default)]
    pub growth: Rating,
}

impl Score {
    pub fn new(contribution: impl Into<Rating>, growth: impl Into<Rating>) -> Self {
        Self {
            contribution: contribution.into(),
            growth: growth.into(),
        }
    }

    pub fn rating(&self, field: ScoreField) -> Rating {
        match field {
            ScoreField::Contribution => self.contribution,
            ScoreField::Growth => self.growth,
        }
    }
}

/// Ratings keyed by the fixed domains. Absent domains count as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DomainScores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competencies: Option<Score>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution: Option<Score>,
}

impl DomainScores {
    pub fn new(culture: Score, competencies: Score, execution: Score) -> Self {
        Self {
            culture: Some(culture),
            competencies: Some(competencies),
            execution: Some(execution),
        }
    }

    pub fn get(&self, domain: Domain) -> Option<&Score> {
        match domain {
            Domain::Culture => self.culture.as_ref(),
            Domain::Competencies => self.competencies.as_ref(),
            Domain::Execution => self.execution.as_ref(),
        }
    }

    pub fn with(mut self, domain: Domain, score: Score) -> Self {
        let slot = match domain {
            Domain::Culture => &mut self.culture,
            Domain::Competencies => &mut self.competencies,
            Domain::Execution => &mut self.execution,
        };
        *slot = Some(score);
        self
    }

    /// Copy with every domain present and every rating inside the valid range.
    pub fn normalized(&self) -> DomainScores {
        let mut normalized = DomainScores::default();
        for domain in Domain::ALL {
            let score = self.get(domain).copied().unwrap_or_default();
            let (contribution, _) = super::rules::resolve_rating(score.contribution);
            let (growth, _) = super::rules::resolve_rating(score.growth);
            normalized = normalized.with(domain, Score::new(contribution, growth));
        }
        normalized
    }
}

/// Subtotals derived from a [`DomainScores`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub total_contribution: u8,
    pub total_growth: u8,
    pub composite: u8,
}

impl Totals {
    pub fn new(total_contribution: u8, total_growth: u8) -> Self {
        Self {
            total_contribution,
            total_growth,
            composite: total_contribution.saturating_add(total_growth),
        }
    }
}

/// A data-quality defect found while scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityIssue {
    pub domain: Domain,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<ScoreField>,
    #[serde(flatten)]
    pub kind: DataQualityKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum DataQualityKind {
    MissingDomain,
    MissingValue,
    NonInteger,
    OutOfRange { value: i64, clamped_to: u8 },
}

impl fmt::Display for DataQualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match self.field {
            Some(field) => format!("{}.{}", self.domain, field.label()),
            None => self.domain.label().to_string(),
        };
        match self.kind {
            DataQualityKind::MissingDomain => write!(f, "{target} missing, scored as 0"),
            DataQualityKind::MissingValue => write!(f, "{target} missing, scored as 0"),
            DataQualityKind::NonInteger => write!(f, "{target} is not an integer, scored as 0"),
            DataQualityKind::OutOfRange { value, clamped_to } => {
                write!(f, "{target} value {value} outside 0-2, clamped to {clamped_to}")
            }
        }
    }
}
