use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cycle::ReviewCycle;
use super::scoring::{DomainScores, Potential};

/// Identifier wrapper for assessments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a published MSH record, `"{kind}-{published millis}"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MshId(pub String);

impl MshId {
    pub fn new(kind: AssessmentKind, published_at: DateTime<Utc>) -> Self {
        Self(format!("{}-{}", kind.label(), published_at.timestamp_millis()))
    }
}

impl fmt::Display for MshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssessmentKind {
    #[serde(rename = "1x1")]
    OneOnOne,
    #[serde(rename = "360")]
    ThreeSixty,
}

impl AssessmentKind {
    pub const fn label(self) -> &'static str {
        match self {
            AssessmentKind::OneOnOne => "1x1",
            AssessmentKind::ThreeSixty => "360",
        }
    }
}

/// Lifecycle position of an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Draft,
    Pending,
    Completed,
    NotAligned,
    HrpReviewed,
    Published,
}

impl AssessmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AssessmentStatus::Draft => "draft",
            AssessmentStatus::Pending => "pending",
            AssessmentStatus::Completed => "completed",
            AssessmentStatus::NotAligned => "not_aligned",
            AssessmentStatus::HrpReviewed => "hrp_reviewed",
            AssessmentStatus::Published => "published",
        }
    }

    /// Status reached by applying `action`, or `None` when the lifecycle forbids it.
    pub const fn after(self, action: LifecycleAction) -> Option<AssessmentStatus> {
        use AssessmentStatus::*;
        match (self, action) {
            (Draft, LifecycleAction::EditScores) => Some(Draft),
            (Draft, LifecycleAction::Submit) => Some(Pending),
            (Pending, LifecycleAction::Align) => Some(Completed),
            (Pending, LifecycleAction::Disagree) => Some(NotAligned),
            (Completed | NotAligned, LifecycleAction::HrpReview) => Some(HrpReviewed),
            (Completed | HrpReviewed, LifecycleAction::Publish) => Some(Published),
            _ => None,
        }
    }

    pub const fn is_open(self) -> bool {
        !matches!(self, AssessmentStatus::Published)
    }
}

impl fmt::Display for AssessmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Operations that move an assessment through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    EditScores,
    Submit,
    Align,
    Disagree,
    HrpReview,
    Publish,
}

impl LifecycleAction {
    pub const fn label(self) -> &'static str {
        match self {
            LifecycleAction::EditScores => "edit scores",
            LifecycleAction::Submit => "submit",
            LifecycleAction::Align => "align",
            LifecycleAction::Disagree => "mark not aligned",
            LifecycleAction::HrpReview => "hrp review",
            LifecycleAction::Publish => "publish",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Caller supplied fields for a new assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentDraft {
    pub kind: AssessmentKind,
    pub assessor: String,
    pub subject: String,
    pub cycle: ReviewCycle,
    #[serde(default)]
    pub scores: DomainScores,
    #[serde(default)]
    pub notes: String,
}

/// Outcome of the subject/supervisor alignment conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    pub aligned: bool,
    #[serde(default)]
    pub notes: String,
    pub recorded_at: DateTime<Utc>,
}

/// HR partner review applied to a completed or not-aligned assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrpReview {
    pub reviewer: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub potential: Option<Potential>,
    pub reviewed_at: DateTime<Utc>,
}

/// A stored assessment. Derived scoring values are never kept here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    pub kind: AssessmentKind,
    pub assessor: String,
    pub subject: String,
    pub cycle: ReviewCycle,
    pub status: AssessmentStatus,
    pub scores: DomainScores,
    pub notes: String,
    pub alignment: Option<Alignment>,
    pub hrp_review: Option<HrpReview>,
    pub msh_id: Option<MshId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assessment {
    pub fn potential(&self) -> Option<Potential> {
        self.hrp_review.as_ref().and_then(|review| review.potential)
    }
}

/// Published, finalized assessment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MshRecord {
    pub id: MshId,
    pub kind: AssessmentKind,
    pub subject: String,
    pub cycle: ReviewCycle,
    pub source_assessments: Vec<AssessmentId>,
    pub scores: DomainScores,
    pub potential: Option<Potential>,
    pub published_by: String,
    pub published_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn msh_id_uses_kind_and_millis() {
        let published_at = Utc
            .with_ymd_and_hms(2024, 10, 8, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        assert_eq!(
            MshId::new(AssessmentKind::OneOnOne, published_at).0,
            "1x1-1728345600000"
        );
        assert_eq!(
            MshId::new(AssessmentKind::ThreeSixty, published_at).0,
            "360-1728345600000"
        );
    }

    #[test]
    fn lifecycle_table() {
        use AssessmentStatus::*;
        use LifecycleAction::*;

        assert_eq!(Draft.after(Submit), Some(Pending));
        assert_eq!(Pending.after(Align), Some(Completed));
        assert_eq!(Pending.after(Disagree), Some(NotAligned));
        assert_eq!(NotAligned.after(HrpReview), Some(HrpReviewed));
        assert_eq!(Completed.after(HrpReview), Some(HrpReviewed));
        assert_eq!(Completed.after(Publish), Some(Published));
        assert_eq!(HrpReviewed.after(Publish), Some(Published));

        assert_eq!(NotAligned.after(Publish), None);
        assert_eq!(Pending.after(EditScores), None);
        assert_eq!(Published.after(HrpReview), None);
        assert_eq!(Draft.after(Publish), None);
    }

    #[test]
    fn kind_serializes_with_short_labels() {
        assert_eq!(
            serde_json::to_value(AssessmentKind::ThreeSixty).expect("serializes"),
            serde_json::json!("360")
        );
        let kind: AssessmentKind = serde_json::from_str("\"1x1\"").expect("parses");
        assert_eq!(kind, AssessmentKind::OneOnOne);
    }
}
