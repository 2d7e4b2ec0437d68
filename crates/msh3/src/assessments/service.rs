use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{error, info, warn};

use super::domain::{
    Alignment, Assessment, AssessmentDraft, AssessmentId, AssessmentStatus, HrpReview,
    LifecycleAction, MshId, MshRecord,
};
use super::repository::{AssessmentFilter, AssessmentRepository, MshRepository, RepositoryError};
use super::scoring::{audit, DataQualityIssue, DomainScores, Potential};
use crate::config::AssessmentConfig;

/// Service driving assessments through their lifecycle and publishing MSH records.
pub struct AssessmentService<R, P> {
    repository: Arc<R>,
    records: Arc<P>,
    config: AssessmentConfig,
    publishing: Mutex<()>,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!("asmt-{id:06}"))
}

/// An assessment after a score write, with the defects found in the submitted scores.
#[derive(Debug, Clone)]
pub struct ScoredAssessment {
    pub assessment: Assessment,
    pub issues: Vec<DataQualityIssue>,
}

/// HR partner input for a review. Scores, when present, replace the assessor's.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HrpReviewRequest {
    pub reviewer: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub potential: Option<Potential>,
    #[serde(default)]
    pub scores: Option<DomainScores>,
}

impl<R, P> AssessmentService<R, P>
where
    R: AssessmentRepository + 'static,
    P: MshRepository + 'static,
{
    pub fn new(repository: Arc<R>, records: Arc<P>, config: AssessmentConfig) -> Self {
        Self {
            repository,
            records,
            config,
            publishing: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &AssessmentConfig {
        &self.config
    }

    /// Store a new draft. Submitted scores are normalized before they are kept.
    pub fn create(&self, draft: AssessmentDraft) -> Result<ScoredAssessment, AssessmentServiceError> {
        let issues = audit(&draft.scores);
        log_issues(&issues);

        let now = Utc::now();
        let assessment = Assessment {
            id: next_assessment_id(),
            kind: draft.kind,
            assessor: draft.assessor,
            subject: draft.subject,
            cycle: draft.cycle,
            status: AssessmentStatus::Draft,
            scores: draft.scores.normalized(),
            notes: draft.notes,
            alignment: None,
            hrp_review: None,
            msh_id: None,
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(assessment)?;
        info!(assessment_id = %stored.id, cycle = %stored.cycle, "assessment drafted");
        Ok(ScoredAssessment {
            assessment: stored,
            issues,
        })
    }

    pub fn update_scores(
        &self,
        id: &AssessmentId,
        scores: DomainScores,
    ) -> Result<ScoredAssessment, AssessmentServiceError> {
        let mut assessment = self.load(id)?;
        transition(&assessment, LifecycleAction::EditScores)?;

        let issues = audit(&scores);
        log_issues(&issues);
        assessment.scores = scores.normalized();
        assessment.updated_at = Utc::now();

        self.repository.update(assessment.clone())?;
        Ok(ScoredAssessment { assessment, issues })
    }

    pub fn submit(&self, id: &AssessmentId) -> Result<Assessment, AssessmentServiceError> {
        let mut assessment = self.load(id)?;
        assessment.status = transition(&assessment, LifecycleAction::Submit)?;
        assessment.updated_at = Utc::now();

        self.repository.update(assessment.clone())?;
        info!(assessment_id = %assessment.id, "assessment submitted");
        Ok(assessment)
    }

    /// Record whether the subject agrees with the assessment.
    pub fn record_alignment(
        &self,
        id: &AssessmentId,
        aligned: bool,
        notes: impl Into<String>,
    ) -> Result<Assessment, AssessmentServiceError> {
        let mut assessment = self.load(id)?;
        let action = if aligned {
            LifecycleAction::Align
        } else {
            LifecycleAction::Disagree
        };
        assessment.status = transition(&assessment, action)?;

        let now = Utc::now();
        assessment.alignment = Some(Alignment {
            aligned,
            notes: notes.into(),
            recorded_at: now,
        });
        assessment.updated_at = now;

        self.repository.update(assessment.clone())?;
        info!(assessment_id = %assessment.id, status = %assessment.status, "alignment recorded");
        Ok(assessment)
    }

    pub fn hrp_review(
        &self,
        id: &AssessmentId,
        request: HrpReviewRequest,
    ) -> Result<ScoredAssessment, AssessmentServiceError> {
        let mut assessment = self.load(id)?;
        assessment.status = transition(&assessment, LifecycleAction::HrpReview)?;

        let issues = match &request.scores {
            Some(scores) => {
                let issues = audit(scores);
                log_issues(&issues);
                assessment.scores = scores.normalized();
                issues
            }
            None => Vec::new(),
        };

        let now = Utc::now();
        assessment.hrp_review = Some(HrpReview {
            reviewer: request.reviewer,
            notes: request.notes,
            potential: request.potential,
            reviewed_at: now,
        });
        assessment.updated_at = now;

        self.repository.update(assessment.clone())?;
        info!(assessment_id = %assessment.id, "hrp review recorded");
        Ok(ScoredAssessment { assessment, issues })
    }

    pub fn publish(
        &self,
        id: &AssessmentId,
        published_by: impl Into<String>,
    ) -> Result<MshRecord, AssessmentServiceError> {
        self.publish_at(id, published_by, Utc::now())
    }

    /// Publish with an explicit timestamp, which also determines the MSH id.
    ///
    /// Publications are serialized, and the stored record is withdrawn again when the
    /// assessment cannot be marked published, so one assessment yields at most one record.
    pub fn publish_at(
        &self,
        id: &AssessmentId,
        published_by: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Result<MshRecord, AssessmentServiceError> {
        let _publishing = self
            .publishing
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut assessment = self.load(id)?;
        let status = transition(&assessment, LifecycleAction::Publish)?;

        let record = MshRecord {
            id: MshId::new(assessment.kind, published_at),
            kind: assessment.kind,
            subject: assessment.subject.clone(),
            cycle: assessment.cycle,
            source_assessments: vec![assessment.id.clone()],
            scores: assessment.scores,
            potential: assessment.potential(),
            published_by: published_by.into(),
            published_at,
        };
        let stored = self.records.insert(record)?;

        assessment.status = status;
        assessment.msh_id = Some(stored.id.clone());
        assessment.updated_at = published_at;
        if let Err(update_error) = self.repository.update(assessment) {
            if let Err(remove_error) = self.records.remove(&stored.id) {
                error!(
                    msh_id = %stored.id,
                    assessment_id = %id,
                    error = %remove_error,
                    "failed to withdraw msh record after publish failure"
                );
            }
            return Err(update_error.into());
        }

        info!(msh_id = %stored.id, assessment_id = %id, "msh record published");
        Ok(stored)
    }

    pub fn get(&self, id: &AssessmentId) -> Result<Assessment, AssessmentServiceError> {
        self.load(id)
    }

    pub fn list(&self, filter: &AssessmentFilter) -> Result<Vec<Assessment>, AssessmentServiceError> {
        Ok(self.repository.list(filter)?)
    }

    /// Unpublished assessments whose cycle deadline has passed.
    pub fn overdue(&self, today: NaiveDate) -> Result<Vec<Assessment>, AssessmentServiceError> {
        let grace_days = self.config.review_grace_days;
        let overdue = self
            .repository
            .list(&AssessmentFilter::default())?
            .into_iter()
            .filter(|assessment| {
                assessment.status.is_open() && assessment.cycle.is_overdue(today, grace_days)
            })
            .collect();
        Ok(overdue)
    }

    pub fn get_msh(&self, id: &MshId) -> Result<MshRecord, AssessmentServiceError> {
        self.records
            .fetch(id)?
            .ok_or_else(|| AssessmentServiceError::MshNotFound(id.clone()))
    }

    pub fn msh_for_subject(&self, subject: &str) -> Result<Vec<MshRecord>, AssessmentServiceError> {
        Ok(self.records.for_subject(subject)?)
    }

    fn load(&self, id: &AssessmentId) -> Result<Assessment, AssessmentServiceError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| AssessmentServiceError::NotFound(id.clone()))
    }
}

fn transition(
    assessment: &Assessment,
    action: LifecycleAction,
) -> Result<AssessmentStatus, AssessmentServiceError> {
    assessment
        .status
        .after(action)
        .ok_or(AssessmentServiceError::InvalidTransition {
            from: assessment.status,
            action,
        })
}

fn log_issues(issues: &[DataQualityIssue]) {
    for issue in issues {
        warn!(domain = %issue.domain, %issue, "score data-quality issue");
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error("assessment {0} not found")]
    NotFound(AssessmentId),
    #[error("msh record {0} not found")]
    MshNotFound(MshId),
    #[error("cannot {action} an assessment that is {from}")]
    InvalidTransition {
        from: AssessmentStatus,
        action: LifecycleAction,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AssessmentServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AssessmentServiceError::NotFound(_) | AssessmentServiceError::MshNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AssessmentServiceError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AssessmentServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            AssessmentServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            AssessmentServiceError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
