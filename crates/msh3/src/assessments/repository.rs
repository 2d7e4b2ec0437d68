use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::cycle::ReviewCycle;
use super::domain::{
    Alignment, Assessment, AssessmentId, AssessmentKind, AssessmentStatus, HrpReview, MshId,
    MshRecord,
};
use super::scoring::{
    score_card, DataQualityIssue, DomainScores, Level, NineBoxPosition, PerformanceLevel,
    PerformancePotentialPosition, Potential, Totals,
};

/// Storage abstraction for assessments. Every read returns an owned snapshot.
pub trait AssessmentRepository: Send + Sync {
    fn insert(&self, assessment: Assessment) -> Result<Assessment, RepositoryError>;
    fn update(&self, assessment: Assessment) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError>;
    fn list(&self, filter: &AssessmentFilter) -> Result<Vec<Assessment>, RepositoryError>;
}

/// Storage abstraction for published MSH records.
pub trait MshRepository: Send + Sync {
    fn insert(&self, record: MshRecord) -> Result<MshRecord, RepositoryError>;
    fn fetch(&self, id: &MshId) -> Result<Option<MshRecord>, RepositoryError>;
    fn remove(&self, id: &MshId) -> Result<(), RepositoryError>;
    fn for_subject(&self, subject: &str) -> Result<Vec<MshRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Optional constraints for listing assessments. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AssessmentFilter {
    #[serde(default)]
    pub status: Option<AssessmentStatus>,
    #[serde(default)]
    pub cycle: Option<ReviewCycle>,
    #[serde(default)]
    pub subject: Option<String>,
}

impl AssessmentFilter {
    pub fn matches(&self, assessment: &Assessment) -> bool {
        self.status.map_or(true, |status| assessment.status == status)
            && self.cycle.map_or(true, |cycle| assessment.cycle == cycle)
            && self
                .subject
                .as_deref()
                .map_or(true, |subject| assessment.subject == subject)
    }
}

/// Assessment as exposed to API callers, with scoring derived on read.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentView {
    pub id: AssessmentId,
    pub kind: AssessmentKind,
    pub assessor: String,
    pub subject: String,
    pub cycle: ReviewCycle,
    pub deadline: NaiveDate,
    pub status: &'static str,
    pub scores: DomainScores,
    #[serde(flatten)]
    pub totals: Totals,
    pub nine_box: NineBoxPosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_position: Option<PerformancePotentialPosition>,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hrp_review: Option<HrpReview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msh_id: Option<MshId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data_quality: Vec<DataQualityIssue>,
    pub updated_at: DateTime<Utc>,
}

impl Assessment {
    pub fn view(&self, grace_days: u16) -> AssessmentView {
        let card = score_card(&self.scores, self.potential());
        AssessmentView {
            id: self.id.clone(),
            kind: self.kind,
            assessor: self.assessor.clone(),
            subject: self.subject.clone(),
            cycle: self.cycle,
            deadline: self.cycle.deadline(grace_days),
            status: self.status.label(),
            scores: self.scores,
            totals: card.totals,
            nine_box: card.nine_box,
            performance_position: card.performance_position,
            notes: self.notes.clone(),
            alignment: self.alignment.clone(),
            hrp_review: self.hrp_review.clone(),
            msh_id: self.msh_id.clone(),
            data_quality: card.issues,
            updated_at: self.updated_at,
        }
    }
}

/// Published record as exposed to API callers. The nine-box label is recomputed here.
#[derive(Debug, Clone, Serialize)]
pub struct MshView {
    pub id: MshId,
    pub kind: AssessmentKind,
    pub subject: String,
    pub cycle: ReviewCycle,
    pub source_assessments: Vec<AssessmentId>,
    pub scores: DomainScores,
    #[serde(flatten)]
    pub totals: Totals,
    pub contribution_level: Level,
    pub growth_level: Level,
    pub nine_box: NineBoxPosition,
    pub performance_level: PerformanceLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential: Option<Potential>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_position: Option<PerformancePotentialPosition>,
    pub published_by: String,
    pub published_at: DateTime<Utc>,
}

impl MshRecord {
    pub fn view(&self) -> MshView {
        let card = score_card(&self.scores, self.potential);
        MshView {
            id: self.id.clone(),
            kind: self.kind,
            subject: self.subject.clone(),
            cycle: self.cycle,
            source_assessments: self.source_assessments.clone(),
            scores: self.scores,
            totals: card.totals,
            contribution_level: card.contribution_level,
            growth_level: card.growth_level,
            nine_box: card.nine_box,
            performance_level: card.performance_level,
            potential: self.potential,
            performance_position: card.performance_position,
            published_by: self.published_by.clone(),
            published_at: self.published_at,
        }
    }
}
