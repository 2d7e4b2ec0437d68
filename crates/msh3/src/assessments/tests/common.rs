use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::assessments::cycle::ReviewCycle;
use crate::assessments::domain::{
    Assessment, AssessmentDraft, AssessmentId, AssessmentKind, MshId, MshRecord,
};
use crate::assessments::repository::{
    AssessmentFilter, AssessmentRepository, MshRepository, RepositoryError,
};
use crate::assessments::scoring::{DomainScores, Score};
use crate::assessments::{assessment_router, AssessmentService};
use crate::config::AssessmentConfig;

pub(super) fn cycle() -> ReviewCycle {
    ReviewCycle::new(2024, 4).expect("valid cycle")
}

/// Scores behind MSH 1x1-1728345600000 in the sample data.
pub(super) fn sample_scores() -> DomainScores {
    DomainScores::new(Score::new(2, 1), Score::new(2, 2), Score::new(1, 2))
}

pub(super) fn draft() -> AssessmentDraft {
    AssessmentDraft {
        kind: AssessmentKind::OneOnOne,
        assessor: "supervisor.ramos".to_string(),
        subject: "ic.nguyen".to_string(),
        cycle: cycle(),
        scores: sample_scores(),
        notes: "Strong quarter on delivery".to_string(),
    }
}

pub(super) fn published_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 8, 0, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) type TestService = AssessmentService<MemoryAssessments, MemoryMsh>;

pub(super) fn build_service() -> (TestService, Arc<MemoryAssessments>, Arc<MemoryMsh>) {
    let assessments = Arc::new(MemoryAssessments::default());
    let records = Arc::new(MemoryMsh::default());
    let service = AssessmentService::new(
        assessments.clone(),
        records.clone(),
        AssessmentConfig::default(),
    );
    (service, assessments, records)
}

/// Drive a fresh draft to `completed`.
pub(super) fn completed_assessment(service: &TestService) -> Assessment {
    let created = service.create(draft()).expect("draft stored");
    let id = created.assessment.id;
    service.submit(&id).expect("submitted");
    service
        .record_alignment(&id, true, "agreed in 1x1")
        .expect("aligned")
}

#[derive(Default, Clone)]
pub(super) struct MemoryAssessments {
    pub(super) records: Arc<Mutex<HashMap<AssessmentId, Assessment>>>,
}

impl AssessmentRepository for MemoryAssessments {
    fn insert(&self, assessment: Assessment) -> Result<Assessment, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&assessment.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(assessment.id.clone(), assessment.clone());
        Ok(assessment)
    }

    fn update(&self, assessment: Assessment) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(assessment.id.clone(), assessment);
        Ok(())
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self, filter: &AssessmentFilter) -> Result<Vec<Assessment>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut matching: Vec<Assessment> = guard
            .values()
            .filter(|assessment| filter.matches(assessment))
            .cloned()
            .collect();
        matching.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(matching)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryMsh {
    records: Arc<Mutex<HashMap<MshId, MshRecord>>>,
}

impl MemoryMsh {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("msh mutex poisoned").len()
    }
}

impl MshRepository for MemoryMsh {
    fn insert(&self, record: MshRecord) -> Result<MshRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("msh mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &MshId) -> Result<Option<MshRecord>, RepositoryError> {
        let guard = self.records.lock().expect("msh mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn remove(&self, id: &MshId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("msh mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn for_subject(&self, subject: &str) -> Result<Vec<MshRecord>, RepositoryError> {
        let guard = self.records.lock().expect("msh mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.subject == subject)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableAssessments;

impl AssessmentRepository for UnavailableAssessments {
    fn insert(&self, _assessment: Assessment) -> Result<Assessment, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _assessment: Assessment) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _filter: &AssessmentFilter) -> Result<Vec<Assessment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Delegates to [`MemoryAssessments`] but fails the next `update` once armed.
#[derive(Default)]
pub(super) struct FlakyAssessments {
    pub(super) inner: MemoryAssessments,
    fail_next_update: AtomicBool,
}

impl FlakyAssessments {
    pub(super) fn fail_next_update(&self) {
        self.fail_next_update.store(true, Ordering::SeqCst);
    }
}

impl AssessmentRepository for FlakyAssessments {
    fn insert(&self, assessment: Assessment) -> Result<Assessment, RepositoryError> {
        self.inner.insert(assessment)
    }

    fn update(&self, assessment: Assessment) -> Result<(), RepositoryError> {
        if self.fail_next_update.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("write timed out".to_string()));
        }
        self.inner.update(assessment)
    }

    fn fetch(&self, id: &AssessmentId) -> Result<Option<Assessment>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list(&self, filter: &AssessmentFilter) -> Result<Vec<Assessment>, RepositoryError> {
        self.inner.list(filter)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    assessment_router(Arc::new(service))
}
