use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use validator::Validate;

use crate::dto::auth_dto::{LoginPayload, RegisterPayload};
use crate::utils::time::now;
use crate::AppState;

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let registered = state.account_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(registered)).into_response())
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let token = state.account_service.login(payload, now()).await?;
    Ok(Json(token).into_response())
}
