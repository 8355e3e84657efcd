use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::admin_dto::{
    CreateQuestionPayload, CreateSchedulePayload, CreateTechnologyPayload, DeclareResultResponse,
    ResultUpdatePayload, TechnologyFilter, UpdateQuestionPayload, UpdateSchedulePayload,
    UpdateTechnologyPayload,
};
use crate::dto::exam_dto::AttemptResultResponse;
use crate::middleware::auth::Claims;
use crate::models::employee_result::ResultUpdate;
use crate::utils::time::now;
use crate::AppState;

#[axum::debug_handler]
pub async fn dashboard(State(state): State<AppState>) -> crate::error::Result<Response> {
    let counts = state.report_service.admin_dashboard().await?;
    Ok(Json(counts).into_response())
}

#[axum::debug_handler]
pub async fn create_technology(
    State(state): State<AppState>,
    Json(payload): Json<CreateTechnologyPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let tech = state.catalog_service.create_technology(payload).await?;
    Ok((StatusCode::CREATED, Json(tech)).into_response())
}

#[axum::debug_handler]
pub async fn list_technologies(State(state): State<AppState>) -> crate::error::Result<Response> {
    let items = state.catalog_service.list_technologies().await?;
    Ok(Json(items).into_response())
}

#[axum::debug_handler]
pub async fn update_technology(
    State(state): State<AppState>,
    Path(technology_id): Path<Uuid>,
    Json(payload): Json<UpdateTechnologyPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let tech = state
        .catalog_service
        .update_technology(technology_id, payload)
        .await?;
    Ok(Json(tech).into_response())
}

#[axum::debug_handler]
pub async fn delete_technology(
    State(state): State<AppState>,
    Path(technology_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state.catalog_service.delete_technology(technology_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[axum::debug_handler]
pub async fn create_schedule(
    State(state): State<AppState>,
    Json(payload): Json<CreateSchedulePayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let schedule = state.catalog_service.create_schedule(payload).await?;
    Ok((StatusCode::CREATED, Json(schedule)).into_response())
}

#[axum::debug_handler]
pub async fn list_schedules(
    State(state): State<AppState>,
    Query(filter): Query<TechnologyFilter>,
) -> crate::error::Result<Response> {
    let items = state.catalog_service.list_schedules(filter.technology_id).await?;
    Ok(Json(items).into_response())
}

#[axum::debug_handler]
pub async fn update_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<Uuid>,
    Json(payload): Json<UpdateSchedulePayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let schedule = state
        .catalog_service
        .update_schedule(schedule_id, payload)
        .await?;
    Ok(Json(schedule).into_response())
}

#[axum::debug_handler]
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state.catalog_service.delete_schedule(schedule_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[axum::debug_handler]
pub async fn create_question(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuestionPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let question = state.catalog_service.create_question(payload).await?;
    Ok((StatusCode::CREATED, Json(question)).into_response())
}

#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    Query(filter): Query<TechnologyFilter>,
) -> crate::error::Result<Response> {
    let items = state.catalog_service.list_questions(filter.technology_id).await?;
    Ok(Json(items).into_response())
}

#[axum::debug_handler]
pub async fn update_question(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
    Json(payload): Json<UpdateQuestionPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let question = state
        .catalog_service
        .update_question(question_id, payload)
        .await?;
    Ok(Json(question).into_response())
}

#[axum::debug_handler]
pub async fn delete_question(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state.catalog_service.delete_question(question_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[axum::debug_handler]
pub async fn list_results(
    State(state): State<AppState>,
    Query(filter): Query<TechnologyFilter>,
) -> crate::error::Result<Response> {
    let items = state.report_service.list_results(filter.technology_id).await?;
    Ok(Json(items).into_response())
}

#[axum::debug_handler]
pub async fn get_result(
    State(state): State<AppState>,
    Path(result_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let detail = state.result_service.detail(result_id).await?;
    Ok(Json(detail).into_response())
}

#[axum::debug_handler]
pub async fn update_result(
    State(state): State<AppState>,
    Path(result_id): Path<Uuid>,
    Json(payload): Json<ResultUpdatePayload>,
) -> crate::error::Result<Response> {
    let result = state
        .result_service
        .update(result_id, ResultUpdate::from(payload))
        .await?;
    Ok(Json(result).into_response())
}

/// Declares the attempt's result. A non-empty body is applied as an edit
/// right after the declaration.
#[axum::debug_handler]
pub async fn declare_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(attempt_id): Path<Uuid>,
    body: Bytes,
) -> crate::error::Result<Response> {
    let edit: ResultUpdate = if body.iter().all(u8::is_ascii_whitespace) {
        ResultUpdate::default()
    } else {
        serde_json::from_slice::<ResultUpdatePayload>(&body)?.into()
    };

    let admin_id = claims.user_id()?;
    let declaration = state
        .result_service
        .declare_with_edit(attempt_id, admin_id, now(), edit)
        .await?;

    let status = if declaration.already_declared {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(DeclareResultResponse {
            result: declaration.result,
            already_declared: declaration.already_declared,
        }),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn list_attempts(
    State(state): State<AppState>,
    Query(filter): Query<TechnologyFilter>,
) -> crate::error::Result<Response> {
    let items = state
        .report_service
        .list_completed_attempts(filter.technology_id)
        .await?;
    Ok(Json(items).into_response())
}

#[axum::debug_handler]
pub async fn view_attempt(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let view = state.attempt_service.attempt_view(attempt_id, None).await?;
    Ok(Json(AttemptResultResponse::from(view)).into_response())
}
