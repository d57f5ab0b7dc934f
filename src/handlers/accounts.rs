//! Account administration handlers (staff only).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::Principal,
    error::{db_err, get_db_conn, ApiError, ApiResult, DomainError},
    handlers::auth::AccountResponse,
    helpers::{contains_pattern, validate_payload},
    models::{account::normalize_email, optional_required_text, Account, AccountChangeset},
    pagination::{ListParams, PaginationMeta},
    schema::accounts,
    AppState,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AccountFilter {
    pub department_id: Option<Uuid>,
    pub college_id: Option<Uuid>,
    /// Case-insensitive match on names and email.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAccountRequest {
    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 100, message = "Middle name must be at most 100 characters"))]
    pub middle_name: Option<String>,
    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,
    #[validate(length(max = 100, message = "Faculty ID must be at most 100 characters"))]
    pub faculty_id: Option<String>,
    #[validate(email(message = "Invalid PLM email format"))]
    pub plm_email: Option<String>,
    pub college_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 100, message = "Contact number must be at most 100 characters"))]
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub is_staff: Option<bool>,
    /// Only a superuser may change this flag.
    pub is_superuser: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountsListResponse {
    pub data: Vec<AccountResponse>,
    pub pagination: PaginationMeta,
}

fn filtered<'a>(
    filter: &'a AccountFilter,
    active: Option<bool>,
) -> accounts::BoxedQuery<'a, Pg> {
    let mut query = accounts::table.into_boxed();

    if let Some(is_active) = active {
        query = query.filter(accounts::is_active.eq(is_active));
    }
    if let Some(department_id) = filter.department_id {
        query = query.filter(accounts::department_id.eq(department_id));
    }
    if let Some(college_id) = filter.college_id {
        query = query.filter(accounts::college_id.eq(college_id));
    }
    if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
        let pattern = contains_pattern(term);
        query = query.filter(
            accounts::email
                .ilike(pattern.clone())
                .or(accounts::first_name.ilike(pattern.clone()))
                .or(accounts::middle_name.ilike(pattern.clone()))
                .or(accounts::last_name.ilike(pattern)),
        );
    }

    query
}

#[utoipa::path(
    get,
    path = "/accounts",
    tag = "Accounts",
    params(ListParams, AccountFilter),
    responses(
        (status = 200, description = "Paginated list of accounts", body = AccountsListResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 403, description = "Staff only", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<ListParams>,
    Query(filter): Query<AccountFilter>,
) -> ApiResult<Json<AccountsListResponse>> {
    principal.ensure_admin()?;
    let mut conn = get_db_conn(&state.db_pool)?;
    let active = params.active_filter();

    let total_count: i64 = filtered(&filter, active)
        .count()
        .get_result(&mut conn)
        .map_err(db_err)?;

    let (limit, offset) = params.limit_offset();

    let accounts_list: Vec<Account> = filtered(&filter, active)
        .order((accounts::last_name.asc(), accounts::first_name.asc()))
        .limit(limit)
        .offset(offset)
        .select(Account::as_select())
        .load(&mut conn)
        .map_err(db_err)?;

    Ok(Json(AccountsListResponse {
        data: accounts_list.into_iter().map(AccountResponse::from).collect(),
        pagination: params.into_metadata(total_count),
    }))
}

#[utoipa::path(
    get,
    path = "/accounts/{account_id}",
    tag = "Accounts",
    params(("account_id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account", body = AccountResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Account not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_account(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(account_id): Path<Uuid>,
) -> ApiResult<Json<AccountResponse>> {
    principal.ensure_admin()?;
    let mut conn = get_db_conn(&state.db_pool)?;

    let account = find_account(&mut conn, account_id)?;
    Ok(Json(account.into()))
}

pub(crate) fn find_account(conn: &mut PgConnection, account_id: Uuid) -> Result<Account, DomainError> {
    accounts::table
        .find(account_id)
        .select(Account::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| DomainError::not_found("Account"))
}

#[utoipa::path(
    put,
    path = "/accounts/{account_id}",
    tag = "Accounts",
    params(("account_id" = Uuid, Path, description = "Account ID")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = AccountResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Account, college or department not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_account(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(account_id): Path<Uuid>,
    Json(mut payload): Json<UpdateAccountRequest>,
) -> ApiResult<Json<AccountResponse>> {
    principal.ensure_admin()?;
    payload.plm_email = payload.plm_email.map(|e| normalize_email(&e));
    validate_payload(&payload)?;

    if payload.is_superuser.is_some() && !principal.permissions.is_superuser {
        return Err(DomainError::Forbidden.into());
    }

    let changes = AccountChangeset {
        first_name: optional_required_text("first_name", payload.first_name)?,
        middle_name: payload.middle_name.map(|v| v.trim().to_string()),
        last_name: optional_required_text("last_name", payload.last_name)?,
        faculty_id: payload.faculty_id.map(|v| v.trim().to_string()),
        plm_email: payload.plm_email,
        college_id: payload.college_id,
        department_id: payload.department_id,
        date_of_birth: payload.date_of_birth,
        contact_number: payload.contact_number.map(|v| v.trim().to_string()),
        address: payload.address,
        is_staff: payload.is_staff,
        is_superuser: payload.is_superuser,
    };

    let mut conn = get_db_conn(&state.db_pool)?;

    let account: Account = if changes.is_empty() {
        find_account(&mut conn, account_id)?
    } else {
        diesel::update(accounts::table.find(account_id))
            .set(&changes)
            .returning(Account::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Account"))?
    };

    info!(account_id = %account.id, updated_by = %principal.account_id, "Account updated");

    Ok(Json(account.into()))
}

fn set_account_active(
    state: &AppState,
    principal: &Principal,
    account_id: Uuid,
    active: bool,
) -> ApiResult<Json<AccountResponse>> {
    principal.ensure_admin()?;

    if !active && account_id == principal.account_id {
        return Err(DomainError::conflict("You cannot deactivate your own account").into());
    }

    let mut conn = get_db_conn(&state.db_pool)?;

    let account: Account = diesel::update(accounts::table.find(account_id))
        .set(accounts::is_active.eq(active))
        .returning(Account::as_returning())
        .get_result(&mut conn)
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("Account"))?;

    info!(
        account_id = %account.id,
        is_active = active,
        updated_by = %principal.account_id,
        "Account active flag changed"
    );

    Ok(Json(account.into()))
}

#[utoipa::path(
    post,
    path = "/accounts/{account_id}/deactivate",
    tag = "Accounts",
    params(("account_id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account deactivated", body = AccountResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Account not found", body = ApiError),
        (status = 409, description = "Cannot deactivate yourself", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn deactivate_account(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(account_id): Path<Uuid>,
) -> ApiResult<Json<AccountResponse>> {
    set_account_active(&state, &principal, account_id, false)
}

#[utoipa::path(
    post,
    path = "/accounts/{account_id}/activate",
    tag = "Accounts",
    params(("account_id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account activated", body = AccountResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Account not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn activate_account(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(account_id): Path<Uuid>,
) -> ApiResult<Json<AccountResponse>> {
    set_account_active(&state, &principal, account_id, true)
}

/// Physical delete. Committee assignments, rank histories and evaluations
/// owned by the account go with it.
#[utoipa::path(
    delete,
    path = "/accounts/{account_id}",
    tag = "Accounts",
    params(("account_id" = Uuid, Path, description = "Account ID")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Account not found", body = ApiError),
        (status = 409, description = "Cannot delete yourself", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(account_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    principal.ensure_admin()?;

    if account_id == principal.account_id {
        return Err(DomainError::conflict("You cannot delete your own account").into());
    }

    let mut conn = get_db_conn(&state.db_pool)?;

    let deleted = diesel::delete(accounts::table.find(account_id))
        .execute(&mut conn)
        .map_err(db_err)?;

    if deleted == 0 {
        return Err(DomainError::not_found("Account").into());
    }

    info!(account_id = %account_id, deleted_by = %principal.account_id, "Account deleted");

    Ok(StatusCode::NO_CONTENT)
}
