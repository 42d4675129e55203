use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::database::ObjectId;
use crate::error::ApiError;

/// Validate the `{id}` path segment for `resource` ("Contact", "Holiday")
pub fn parse_id(raw: &str, resource: &str) -> Result<ObjectId, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::bad_request(format!("{} ID is required", resource)));
    }
    ObjectId::parse(raw).map_err(|_| ApiError::bad_request(format!("Invalid {} ID", resource)))
}

/// Unwrap a JSON body, turning axum's rejection into our error envelope while
/// keeping the rejection's status (400, 413 or 415)
pub fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    let rejection = match body {
        Ok(Json(value)) => return Ok(value),
        Err(rejection) => rejection,
    };
    let message = rejection.body_text();
    Err(match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge(message),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ApiError::UnsupportedMediaType(message),
        _ => ApiError::invalid_json(message),
    })
}
