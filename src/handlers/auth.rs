//! Authentication handlers.

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{password::PasswordService, Principal},
    error::{db_err, get_db_conn, ApiError, ApiResult, DomainError},
    helpers::{now, validate_payload},
    models::{account::normalize_email, required_text, Account, NewAccount},
    schema::accounts,
    telemetry::{record_auth_attempt, AuthOutcome},
    AppState,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(
        email(message = "Invalid email format"),
        length(max = 100, message = "Email must be at most 100 characters")
    )]
    #[schema(example = "juan.delacruz@plm.edu.ph")]
    pub email: String,
    #[schema(example = "securepassword123", min_length = 8)]
    pub password: String,
    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    #[schema(example = "Juan")]
    pub first_name: String,
    #[validate(length(max = 100, message = "Middle name must be at most 100 characters"))]
    #[serde(default)]
    pub middle_name: Option<String>,
    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    #[schema(example = "Dela Cruz")]
    pub last_name: String,
    #[validate(length(max = 100, message = "Faculty ID must be at most 100 characters"))]
    #[serde(default)]
    #[schema(example = "2019-00123")]
    pub faculty_id: Option<String>,
    #[validate(
        email(message = "Invalid PLM email format"),
        length(max = 100, message = "PLM email must be at most 100 characters")
    )]
    #[serde(default)]
    pub plm_email: Option<String>,
    #[serde(default)]
    pub college_id: Option<Uuid>,
    #[serde(default)]
    pub department_id: Option<Uuid>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 100, message = "Contact number must be at most 100 characters"))]
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "juan.delacruz@plm.edu.ph")]
    pub email: String,
    #[schema(example = "securepassword123")]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[schema(min_length = 8)]
    pub new_password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub account: AccountResponse,
    #[schema(example = "eyJhbGciOiJFZERTQSIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
}

/// Account as exposed over the API. The password hash never leaves the server.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    pub id: Uuid,
    #[schema(example = "juan.delacruz@plm.edu.ph")]
    pub email: String,
    #[schema(example = "Juan")]
    pub first_name: String,
    pub middle_name: String,
    #[schema(example = "Dela Cruz")]
    pub last_name: String,
    pub faculty_id: String,
    pub plm_email: String,
    pub college_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub date_of_birth: Option<NaiveDate>,
    pub contact_number: String,
    pub address: String,
    pub current_rank_history_id: Option<Uuid>,
    pub date_added: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            first_name: account.first_name,
            middle_name: account.middle_name,
            last_name: account.last_name,
            faculty_id: account.faculty_id,
            plm_email: account.plm_email,
            college_id: account.college_id,
            department_id: account.department_id,
            date_of_birth: account.date_of_birth,
            contact_number: account.contact_number,
            address: account.address,
            current_rank_history_id: account.current_rank_history_id,
            date_added: account.date_added,
            last_login: account.last_login,
            is_staff: account.permissions.is_staff,
            is_superuser: account.permissions.is_superuser,
            is_active: account.is_active,
        }
    }
}

fn hash_password(state: &AppState, password: &str) -> ApiResult<String> {
    PasswordService::hash_password_with_cost(password, state.password_hash_cost).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        ApiError::internal("Failed to process password", "PASSWORD_HASH_ERROR")
    })
}

fn issue_token(state: &AppState, account: &Account) -> ApiResult<String> {
    state
        .session
        .issue(account.id, &account.email, account.permissions.can_administer())
        .map_err(|e| {
            error!(error = %e, "Token generation failed");
            ApiError::internal("Token generation failed", "TOKEN_GENERATION_ERROR")
        })
}

fn password_matches(account: &Account, password: &str) -> bool {
    match PasswordService::verify_password(password, &account.password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            error!(error = %e, account_id = %account.id, "Stored password hash is unreadable");
            false
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registration successful", body = AuthResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 404, description = "College or department not found", body = ApiError),
        (status = 409, description = "Email already registered", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    payload.email = normalize_email(&payload.email);
    payload.plm_email = payload.plm_email.map(|e| normalize_email(&e));
    validate_payload(&payload)?;
    state
        .password_policy
        .validate(&payload.password)
        .map_err(DomainError::from)?;

    let new_account = NewAccount {
        email: payload.email,
        password_hash: hash_password(&state, &payload.password)?,
        first_name: required_text("first_name", &payload.first_name)?,
        middle_name: payload.middle_name.unwrap_or_default().trim().to_string(),
        last_name: required_text("last_name", &payload.last_name)?,
        faculty_id: payload.faculty_id.unwrap_or_default().trim().to_string(),
        plm_email: payload.plm_email.unwrap_or_default(),
        college_id: payload.college_id,
        department_id: payload.department_id,
        date_of_birth: payload.date_of_birth,
        contact_number: payload.contact_number.unwrap_or_default().trim().to_string(),
        address: payload.address.unwrap_or_default(),
        is_staff: false,
        is_superuser: false,
    };

    let mut conn = get_db_conn(&state.db_pool)?;

    let account: Account = diesel::insert_into(accounts::table)
        .values(&new_account)
        .returning(Account::as_returning())
        .get_result(&mut conn)
        .map_err(|e| {
            warn!(error = %e, email = %new_account.email, "Failed to register account");
            db_err(e)
        })?;

    let access_token = issue_token(&state, &account)?;

    info!(account_id = %account.id, email = %account.email, "Account registered");

    Ok(Json(AuthResponse {
        account: account.into(),
        access_token,
    }))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 401, description = "Invalid credentials", body = ApiError),
        (status = 403, description = "Account is inactive", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    payload.email = normalize_email(&payload.email);
    validate_payload(&payload)?;

    let email = payload.email;
    let mut conn = get_db_conn(&state.db_pool)?;

    let account: Option<Account> = accounts::table
        .filter(accounts::email.eq(&email))
        .select(Account::as_select())
        .first(&mut conn)
        .optional()
        .map_err(db_err)?;

    let account = match account {
        Some(account) if password_matches(&account, &payload.password) => account,
        _ => {
            record_auth_attempt("login", AuthOutcome::InvalidCredentials);
            warn!(email = %email, "Failed login attempt");
            return Err(DomainError::InvalidCredentials.into());
        }
    };

    if !account.is_active {
        record_auth_attempt("login", AuthOutcome::AccountInactive);
        warn!(account_id = %account.id, "Login attempt on inactive account");
        return Err(DomainError::AccountInactive.into());
    }

    let account: Account = diesel::update(accounts::table.find(account.id))
        .set(accounts::last_login.eq(Some(now())))
        .returning(Account::as_returning())
        .get_result(&mut conn)
        .map_err(db_err)?;

    let access_token = issue_token(&state, &account)?;

    record_auth_attempt("login", AuthOutcome::Success);
    info!(account_id = %account.id, "Account logged in");

    Ok(Json(AuthResponse {
        account: account.into(),
        access_token,
    }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "The authenticated account", body = AccountResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Account is inactive", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_current_account(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<AccountResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let account: Account = accounts::table
        .find(principal.account_id)
        .select(Account::as_select())
        .first(&mut conn)
        .map_err(db_err)?;

    Ok(Json(account.into()))
}

#[utoipa::path(
    put,
    path = "/auth/password",
    tag = "Authentication",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "New password violates the password policy", body = ApiError),
        (status = 401, description = "Current password is wrong", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let account: Account = accounts::table
        .find(principal.account_id)
        .select(Account::as_select())
        .first(&mut conn)
        .map_err(db_err)?;

    if !password_matches(&account, &payload.current_password) {
        record_auth_attempt("change_password", AuthOutcome::InvalidCredentials);
        warn!(account_id = %account.id, "Password change with wrong current password");
        return Err(DomainError::InvalidCredentials.into());
    }

    state
        .password_policy
        .validate(&payload.new_password)
        .map_err(DomainError::from)?;

    let password_hash = hash_password(&state, &payload.new_password)?;

    diesel::update(accounts::table.find(account.id))
        .set(accounts::password_hash.eq(password_hash))
        .execute(&mut conn)
        .map_err(db_err)?;

    record_auth_attempt("change_password", AuthOutcome::Success);
    info!(account_id = %account.id, "Password changed");

    Ok(StatusCode::NO_CONTENT)
}
