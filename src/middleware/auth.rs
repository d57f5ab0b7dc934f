//! Session authentication middleware.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use diesel::prelude::*;
use tracing::{debug, warn};

use crate::{
    auth::Principal,
    error::{get_db_conn, ApiError, DomainError},
    models::Account,
    schema::accounts,
    AppState,
};

fn unauthorized(message: &str, code: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(ApiError::new(message, code))).into_response()
}

/// Verifies the bearer token, re-loads the account and stores a [`Principal`]
/// in request extensions. A valid token for a deleted or deactivated account
/// is rejected.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| unauthorized("Missing authorization header", "MISSING_AUTH_HEADER"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Invalid authorization header format", "INVALID_AUTH_FORMAT"))?;

    let session = state.session.verify(token).map_err(|e| {
        debug!(error = %e, "Rejected session token");
        unauthorized("Invalid or expired token", "INVALID_TOKEN")
    })?;

    let mut conn = get_db_conn(&state.db_pool).map_err(IntoResponse::into_response)?;

    let account: Option<Account> = accounts::table
        .find(session.account_id)
        .select(Account::as_select())
        .first(&mut conn)
        .optional()
        .map_err(|e| crate::error::db_err(e).into_response())?;

    let account = match account {
        Some(account) => account,
        None => {
            warn!(account_id = %session.account_id, "Session for a missing account");
            return Err(<(StatusCode, Json<ApiError>)>::from(DomainError::InvalidCredentials)
                .into_response());
        }
    };

    if !account.is_active {
        warn!(account_id = %account.id, "Session for an inactive account");
        return Err(
            <(StatusCode, Json<ApiError>)>::from(DomainError::AccountInactive).into_response(),
        );
    }

    req.extensions_mut().insert(Principal::from(&account));
    Ok(next.run(req).await)
}
