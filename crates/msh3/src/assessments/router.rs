use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AssessmentDraft, AssessmentId, MshId};
use super::repository::{AssessmentFilter, AssessmentRepository, AssessmentView, MshRepository};
use super::scoring::{score_card, DomainScores, Potential};
use super::service::{AssessmentService, AssessmentServiceError, HrpReviewRequest, ScoredAssessment};

type SharedService<R, P> = Arc<AssessmentService<R, P>>;

#[derive(Debug, Deserialize)]
pub(crate) struct EvaluateRequest {
    #[serde(default)]
    pub(crate) scores: DomainScores,
    #[serde(default)]
    pub(crate) potential: Option<Potential>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlignmentRequest {
    pub(crate) aligned: bool,
    #[serde(default)]
    pub(crate) notes: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PublishRequest {
    pub(crate) published_by: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OverdueQuery {
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

/// Router builder exposing the scoring and assessment lifecycle endpoints.
pub fn assessment_router<R, P>(service: SharedService<R, P>) -> Router
where
    R: AssessmentRepository + 'static,
    P: MshRepository + 'static,
{
    Router::new()
        .route("/api/v1/scoring/evaluate", post(evaluate_handler))
        .route(
            "/api/v1/assessments",
            post(create_handler::<R, P>).get(list_handler::<R, P>),
        )
        .route("/api/v1/assessments/overdue", get(overdue_handler::<R, P>))
        .route(
            "/api/v1/assessments/:assessment_id",
            get(fetch_handler::<R, P>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/scores",
            put(update_scores_handler::<R, P>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/submit",
            post(submit_handler::<R, P>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/alignment",
            post(alignment_handler::<R, P>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/hrp-review",
            post(hrp_review_handler::<R, P>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/publish",
            post(publish_handler::<R, P>),
        )
        .route("/api/v1/msh/:msh_id", get(msh_handler::<R, P>))
        .with_state(service)
}

pub(crate) async fn evaluate_handler(axum::Json(request): axum::Json<EvaluateRequest>) -> Response {
    let card = score_card(&request.scores, request.potential);
    (StatusCode::OK, axum::Json(card)).into_response()
}

pub(crate) async fn create_handler<R, P>(
    State(service): State<SharedService<R, P>>,
    axum::Json(draft): axum::Json<AssessmentDraft>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: MshRepository + 'static,
{
    match service.create(draft) {
        Ok(scored) => {
            let view = scored_view(&service, scored);
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R, P>(
    State(service): State<SharedService<R, P>>,
    Query(filter): Query<AssessmentFilter>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: MshRepository + 'static,
{
    match service.list(&filter) {
        Ok(assessments) => {
            let grace_days = service.config().review_grace_days;
            let views: Vec<AssessmentView> = assessments
                .iter()
                .map(|assessment| assessment.view(grace_days))
                .collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn overdue_handler<R, P>(
    State(service): State<SharedService<R, P>>,
    Query(query): Query<OverdueQuery>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: MshRepository + 'static,
{
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    match service.overdue(today) {
        Ok(assessments) => {
            let grace_days = service.config().review_grace_days;
            let views: Vec<AssessmentView> = assessments
                .iter()
                .map(|assessment| assessment.view(grace_days))
                .collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler<R, P>(
    State(service): State<SharedService<R, P>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: MshRepository + 'static,
{
    match service.get(&AssessmentId(assessment_id)) {
        Ok(assessment) => {
            let view = assessment.view(service.config().review_grace_days);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_scores_handler<R, P>(
    State(service): State<SharedService<R, P>>,
    Path(assessment_id): Path<String>,
    axum::Json(scores): axum::Json<DomainScores>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: MshRepository + 'static,
{
    match service.update_scores(&AssessmentId(assessment_id), scores) {
        Ok(scored) => {
            let view = scored_view(&service, scored);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R, P>(
    State(service): State<SharedService<R, P>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: MshRepository + 'static,
{
    match service.submit(&AssessmentId(assessment_id)) {
        Ok(assessment) => {
            let view = assessment.view(service.config().review_grace_days);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn alignment_handler<R, P>(
    State(service): State<SharedService<R, P>>,
    Path(assessment_id): Path<String>,
    axum::Json(request): axum::Json<AlignmentRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: MshRepository + 'static,
{
    match service.record_alignment(&AssessmentId(assessment_id), request.aligned, request.notes) {
        Ok(assessment) => {
            let view = assessment.view(service.config().review_grace_days);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn hrp_review_handler<R, P>(
    State(service): State<SharedService<R, P>>,
    Path(assessment_id): Path<String>,
    axum::Json(request): axum::Json<HrpReviewRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: MshRepository + 'static,
{
    match service.hrp_review(&AssessmentId(assessment_id), request) {
        Ok(scored) => {
            let view = scored_view(&service, scored);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn publish_handler<R, P>(
    State(service): State<SharedService<R, P>>,
    Path(assessment_id): Path<String>,
    axum::Json(request): axum::Json<PublishRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: MshRepository + 'static,
{
    match service.publish(&AssessmentId(assessment_id), request.published_by) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn msh_handler<R, P>(
    State(service): State<SharedService<R, P>>,
    Path(msh_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: MshRepository + 'static,
{
    match service.get_msh(&MshId(msh_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(error) => error_response(error),
    }
}

fn scored_view<R, P>(service: &AssessmentService<R, P>, scored: ScoredAssessment) -> AssessmentView
where
    R: AssessmentRepository + 'static,
    P: MshRepository + 'static,
{
    let mut view = scored.assessment.view(service.config().review_grace_days);
    view.data_quality = scored.issues;
    view
}

fn error_response(error: AssessmentServiceError) -> Response {
    let status = error.status_code();
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
