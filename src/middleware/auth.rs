use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use thiserror::Error;

use crate::app::AppState;
use crate::auth::{decode_jwt, Claims};
use crate::error::ApiError;

/// Caller identity extracted from a verified token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub subject: String,
    pub role: Option<String>,
    pub claims: Claims,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.subject().to_string(),
            role: claims.role.clone(),
            claims,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Token is Missing")]
    MissingToken,

    #[error("Token is Invalid or Expired.")]
    InvalidToken,

    #[error("Insufficient permissions for this operation.")]
    Forbidden,
}

/// Verifies the bearer token on every protected route and stores the caller
/// as an `AuthUser` request extension. Roles listed in
/// `security.read_only_roles` are limited to GET.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = verify_headers(request.headers(), &state.config.security.jwt_secret)?;
    authorize(&state, request.method(), &user)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Token Verifier: header lookup, optional "Bearer " prefix, signature check
pub fn verify_headers(headers: &HeaderMap, secret: &str) -> Result<AuthUser, AuthError> {
    let token = extract_token(headers)?;

    let claims = decode_jwt(&token, secret).map_err(|e| {
        tracing::warn!("Rejected token: {}", e);
        AuthError::InvalidToken
    })?;

    Ok(AuthUser::from(claims))
}

fn authorize(state: &AppState, method: &Method, user: &AuthUser) -> Result<(), AuthError> {
    if is_read_only(method) {
        return Ok(());
    }
    match user.role.as_deref() {
        Some(role) if state.config.is_read_only_role(role) => {
            tracing::warn!(subject = %user.subject, role, %method, "Write denied for read-only role");
            Err(AuthError::Forbidden)
        }
        _ => Ok(()),
    }
}

fn is_read_only(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Extract the raw token from the Authorization header. The "Bearer " prefix is
/// optional; a bare token is accepted as-is.
fn extract_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidToken)?.trim();

    let token = match auth_str.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest.trim(),
        _ => auth_str,
    };
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token.to_string())
}
