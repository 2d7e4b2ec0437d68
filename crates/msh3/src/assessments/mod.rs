//! Assessment scoring, review cycles, lifecycle, and MSH publication.

pub mod cycle;
pub mod domain;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use cycle::{CycleParseError, ReviewCycle};
pub use domain::{
    Alignment, Assessment, AssessmentDraft, AssessmentId, AssessmentKind, AssessmentStatus,
    HrpReview, LifecycleAction, MshId, MshRecord,
};
pub use repository::{
    AssessmentFilter, AssessmentRepository, AssessmentView, MshRepository, MshView,
    RepositoryError,
};
pub use router::assessment_router;
pub use scoring::{
    audit, classify_nine_box, compute_totals, performance_level, performance_potential_position,
    score_card, DomainScores, NineBoxPosition, Potential, Score, ScoreCard, Totals,
};
pub use service::{AssessmentService, AssessmentServiceError, HrpReviewRequest, ScoredAssessment};
