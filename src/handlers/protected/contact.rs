use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde_json::Value;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Contact, ContactUpdate};

use super::utils::{json_body, parse_id};

const RESOURCE: &str = "Contact";
const NOT_FOUND: &str = "Contact does not exist";

/// GET /contact/:id - existence check, then fetch
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Contact> {
    let id = parse_id(&id, RESOURCE)?;
    let contacts = state.contacts();

    if !contacts.exists(&id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    let contact = contacts
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    tracing::debug!(contact_id = %id, "Contact fetched");
    Ok(ApiResponse::ok("Contact fetched successfully", contact))
}

/// PUT /contact/:id - replace the active sub-record
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Contact> {
    update(state, user, id, body).await
}

/// PATCH /contact/:id - same contract as PUT
pub async fn patch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Contact> {
    update(state, user, id, body).await
}

/// DELETE /contact/:id - permanent removal, returns the removed record
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Contact> {
    let id = parse_id(&id, RESOURCE)?;
    let contacts = state.contacts();

    if !contacts.exists(&id).await? {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    let deleted = contacts
        .delete_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    tracing::info!(contact_id = %id, subject = %user.subject, "Contact deleted");
    Ok(ApiResponse::ok("Contact deleted successfully", deleted))
}

/// Any verb on /contact or /contact/ with no id segment
pub async fn missing_id() -> ApiError {
    ApiError::bad_request("Contact ID is required")
}

/// Writes the sub-record named by `type` and clears the other one
async fn update(
    state: AppState,
    user: AuthUser,
    id: String,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Contact> {
    let id = parse_id(&id, RESOURCE)?;
    let body = json_body(body)?;
    let update = ContactUpdate::from_body(&body)?;
    let kind = update.kind();

    let contact = state
        .contacts()
        .update_by_id(&id, &update.into_changes(Utc::now()))
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    tracing::info!(contact_id = %id, kind = kind.as_str(), subject = %user.subject, "Contact updated");
    Ok(ApiResponse::ok("Contact details updated successfully.", contact))
}
