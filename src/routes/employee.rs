use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    Extension,
};

use crate::middleware::auth::Claims;
use crate::utils::time::now;
use crate::AppState;

#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<Response> {
    let profile = state.account_service.get_profile(claims.user_id()?).await?;
    let dashboard = state.report_service.employee_dashboard(profile, now()).await?;
    Ok(Json(dashboard).into_response())
}
