use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
    Extension,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

use crate::dto::exam_dto::{
    AttemptResultResponse, ExamSessionResponse, SubmitExamRequest, SubmitExamResponse,
};
use crate::middleware::auth::Claims;
use crate::utils::time::now;
use crate::AppState;

/// Starts the caller's attempt or resumes the one already in progress.
#[axum::debug_handler]
pub async fn start_exam(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(schedule_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let profile = state.account_service.get_profile(claims.user_id()?).await?;
    let mut rng = StdRng::from_entropy();
    let session = state
        .attempt_service
        .start_or_resume(&profile, schedule_id, now(), &mut rng)
        .await?;
    Ok(Json(ExamSessionResponse::from(session)).into_response())
}

#[axum::debug_handler]
pub async fn submit_exam(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(schedule_id): Path<Uuid>,
    Json(payload): Json<SubmitExamRequest>,
) -> crate::error::Result<Response> {
    let profile = state.account_service.get_profile(claims.user_id()?).await?;
    let outcome = state
        .attempt_service
        .submit(&profile, schedule_id, &payload.answers, now())
        .await?;
    Ok(Json(SubmitExamResponse::from(outcome)).into_response())
}

#[axum::debug_handler]
pub async fn view_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(attempt_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let profile = state.account_service.get_profile(claims.user_id()?).await?;
    let view = state
        .attempt_service
        .attempt_view(attempt_id, Some(profile.id))
        .await?;
    Ok(Json(AttemptResultResponse::from(view)).into_response())
}
