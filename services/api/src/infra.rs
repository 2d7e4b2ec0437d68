use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use msh3::assessments::{
    Assessment, AssessmentFilter, AssessmentId, AssessmentRepository, MshId, MshRecord,
    MshRepository, RepositoryError, Score,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentRepository {
    records: Arc<Mutex<HashMap<AssessmentId, Assessment>>>,
}

impl AssessmentRepository for InMemoryAssessmentRepository {
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
        if guard.contains_key(&assessment.id) {
            guard.insert(assessment.id.clone(), assessment);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
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
pub(crate) struct InMemoryMshRepository {
    records: Arc<Mutex<HashMap<MshId, MshRecord>>>,
}

impl MshRepository for InMemoryMshRepository {
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
        let mut matching: Vec<MshRecord> = guard
            .values()
            .filter(|record| record.subject == subject)
            .cloned()
            .collect();
        matching.sort_by_key(|record| record.published_at);
        Ok(matching)
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Parse a `contribution,growth` pair such as `2,1`.
pub(crate) fn parse_score(raw: &str) -> Result<Score, String> {
    let (contribution, growth) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected CONTRIBUTION,GROWTH but got '{raw}'"))?;
    let contribution: i64 = contribution
        .trim()
        .parse()
        .map_err(|err| format!("invalid contribution '{contribution}' ({err})"))?;
    let growth: i64 = growth
        .trim()
        .parse()
        .map_err(|err| format!("invalid growth '{growth}' ({err})"))?;
    Ok(Score::new(contribution, growth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use msh3::assessments::{AssessmentKind, AssessmentStatus, ReviewCycle};

    #[test]
    fn parse_score_accepts_pairs() {
        assert_eq!(parse_score("2,1"), Ok(Score::new(2i64, 1i64)));
        assert_eq!(parse_score(" 0 , 2 "), Ok(Score::new(0i64, 2i64)));
        assert!(parse_score("2").is_err());
        assert!(parse_score("a,1").is_err());
    }

    #[test]
    fn update_requires_existing_record() {
        let now = chrono::Utc::now();
        let assessment = Assessment {
            id: AssessmentId("asmt-none".to_string()),
            kind: AssessmentKind::OneOnOne,
            assessor: "supervisor".to_string(),
            subject: "ic".to_string(),
            cycle: ReviewCycle::new(2024, 4).expect("valid cycle"),
            status: AssessmentStatus::Draft,
            scores: Default::default(),
            notes: String::new(),
            alignment: None,
            hrp_review: None,
            msh_id: None,
            created_at: now,
            updated_at: now,
        };
        let repository = InMemoryAssessmentRepository::default();

        assert!(matches!(
            repository.update(assessment.clone()),
            Err(RepositoryError::NotFound)
        ));
        repository.insert(assessment.clone()).expect("insert");
        assert!(repository.update(assessment).is_ok());
    }
}
