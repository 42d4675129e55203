use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde_json::Value;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Holiday, HolidayUpdate};

use super::utils::{json_body, parse_id};

const RESOURCE: &str = "Holiday";
const NOT_FOUND: &str = "Holiday does not exist.";

/// GET /holidays/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Holiday> {
    let id = parse_id(&id, RESOURCE)?;

    let holiday = state
        .holidays()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    tracing::debug!(holiday_id = %id, "Holiday fetched");
    Ok(ApiResponse::ok("Holiday fetched successfully", holiday))
}

/// PUT /holidays/:id
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Holiday> {
    update(state, user, id, body).await
}

/// PATCH /holidays/:id - same checks as PUT (date validity, existence)
pub async fn patch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Holiday> {
    update(state, user, id, body).await
}

/// DELETE /holidays/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Holiday> {
    let id = parse_id(&id, RESOURCE)?;

    let deleted = state
        .holidays()
        .delete_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    tracing::info!(holiday_id = %id, subject = %user.subject, "Holiday deleted");
    Ok(ApiResponse::ok("Holiday deleted successfully", deleted))
}

pub async fn missing_id() -> ApiError {
    ApiError::bad_request("Holiday ID is required")
}

async fn update(
    state: AppState,
    user: AuthUser,
    id: String,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Holiday> {
    let id = parse_id(&id, RESOURCE)?;
    let body = json_body(body)?;
    let update = HolidayUpdate::from_body(&body)?;

    let holidays = state.holidays();
    if !holidays.exists(&id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    let holiday = holidays
        .update_by_id(&id, &update.into_changes(Utc::now()))
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    tracing::info!(holiday_id = %id, subject = %user.subject, "Holiday updated");
    Ok(ApiResponse::ok("Holiday updated successfully", holiday))
}
