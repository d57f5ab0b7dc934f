//! Committee assignment handlers.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    auth::Principal,
    error::{db_err, get_db_conn, ApiError, ApiResult, DomainError},
    helpers::now,
    models::{Committee, CommitteeChangeset, NewCommittee},
    pagination::{ListParams, PaginationMeta},
    schema::committees,
    AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignCommitteeRequest {
    pub account_id: Uuid,
    pub role_id: Uuid,
    pub college_id: Uuid,
    /// Omitted for college-wide roles.
    pub department_id: Option<Uuid>,
    #[serde(default)]
    pub has_credentials: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCommitteeRequest {
    pub role_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub has_credentials: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CommitteeFilter {
    pub account_id: Option<Uuid>,
    pub college_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommitteeResponse {
    pub committee: Committee,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommitteesListResponse {
    pub data: Vec<Committee>,
    pub pagination: PaginationMeta,
}

fn filtered(
    filter: &CommitteeFilter,
    account_id: Option<Uuid>,
    active: Option<bool>,
) -> committees::BoxedQuery<'static, Pg> {
    let mut query = committees::table.into_boxed();

    if let Some(is_active) = active {
        query = query.filter(committees::is_active.eq(is_active));
    }
    if let Some(account_id) = account_id {
        query = query.filter(committees::account_id.eq(account_id));
    }
    if let Some(college_id) = filter.college_id {
        query = query.filter(committees::college_id.eq(college_id));
    }
    if let Some(role_id) = filter.role_id {
        query = query.filter(committees::role_id.eq(role_id));
    }

    query
}

/// Whether the account holds an active, credentialed committee seat.
pub(crate) fn is_evaluator(conn: &mut PgConnection, account_id: Uuid) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(
        committees::table
            .filter(committees::account_id.eq(account_id))
            .filter(committees::is_active.eq(true))
            .filter(committees::has_credentials.eq(true)),
    ))
    .get_result(conn)
}

#[utoipa::path(
    post,
    path = "/committees",
    tag = "Committees",
    request_body = AssignCommitteeRequest,
    responses(
        (status = 200, description = "Committee assignment created", body = CommitteeResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Account, role, college or department not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn assign_committee(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<AssignCommitteeRequest>,
) -> ApiResult<Json<CommitteeResponse>> {
    principal.ensure_admin()?;

    let new_committee = NewCommittee {
        account_id: payload.account_id,
        role_id: payload.role_id,
        department_id: payload.department_id,
        college_id: payload.college_id,
        has_credentials: payload.has_credentials,
    };

    let mut conn = get_db_conn(&state.db_pool)?;

    let committee: Committee = diesel::insert_into(committees::table)
        .values(&new_committee)
        .returning(Committee::as_returning())
        .get_result(&mut conn)
        .map_err(db_err)?;

    info!(
        committee_id = %committee.id,
        account_id = %committee.account_id,
        role_id = %committee.role_id,
        college_id = %committee.college_id,
        assigned_by = %principal.account_id,
        "Committee assignment created"
    );

    Ok(Json(CommitteeResponse { committee }))
}

#[utoipa::path(
    get,
    path = "/committees",
    tag = "Committees",
    params(ListParams, CommitteeFilter),
    responses(
        (status = 200, description = "Committee assignments; non-staff see only their own", body = CommitteesListResponse),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_committees(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<ListParams>,
    Query(filter): Query<CommitteeFilter>,
) -> ApiResult<Json<CommitteesListResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;
    let active = params.active_filter();
    let account_id = principal.scope(filter.account_id);

    let total_count: i64 = filtered(&filter, account_id, active)
        .count()
        .get_result(&mut conn)
        .map_err(db_err)?;

    let (limit, offset) = params.limit_offset();

    let data: Vec<Committee> = filtered(&filter, account_id, active)
        .order(committees::date_modified.desc())
        .limit(limit)
        .offset(offset)
        .select(Committee::as_select())
        .load(&mut conn)
        .map_err(db_err)?;

    Ok(Json(CommitteesListResponse {
        data,
        pagination: params.into_metadata(total_count),
    }))
}

#[utoipa::path(
    get,
    path = "/committees/{committee_id}",
    tag = "Committees",
    params(("committee_id" = Uuid, Path, description = "Committee assignment ID")),
    responses(
        (status = 200, description = "Committee assignment", body = CommitteeResponse),
        (status = 404, description = "Committee assignment not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_committee(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(committee_id): Path<Uuid>,
) -> ApiResult<Json<CommitteeResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let committee: Committee = committees::table
        .find(committee_id)
        .select(Committee::as_select())
        .first(&mut conn)
        .optional()
        .map_err(db_err)?
        .filter(|c| principal.can_view(c.account_id))
        .ok_or_else(|| DomainError::not_found("Committee assignment"))?;

    Ok(Json(CommitteeResponse { committee }))
}

#[utoipa::path(
    put,
    path = "/committees/{committee_id}",
    tag = "Committees",
    params(("committee_id" = Uuid, Path, description = "Committee assignment ID")),
    request_body = UpdateCommitteeRequest,
    responses(
        (status = 200, description = "Committee assignment updated", body = CommitteeResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Committee assignment, role or department not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_committee(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(committee_id): Path<Uuid>,
    Json(payload): Json<UpdateCommitteeRequest>,
) -> ApiResult<Json<CommitteeResponse>> {
    principal.ensure_admin()?;

    let changes = CommitteeChangeset {
        role_id: payload.role_id,
        department_id: payload.department_id,
        has_credentials: payload.has_credentials,
    };

    let mut conn = get_db_conn(&state.db_pool)?;
    let modified = committees::date_modified.eq(now());

    let committee: Committee = if changes.is_empty() {
        diesel::update(committees::table.find(committee_id))
            .set(modified)
            .returning(Committee::as_returning())
            .get_result(&mut conn)
    } else {
        diesel::update(committees::table.find(committee_id))
            .set((&changes, modified))
            .returning(Committee::as_returning())
            .get_result(&mut conn)
    }
    .optional()
    .map_err(db_err)?
    .ok_or_else(|| DomainError::not_found("Committee assignment"))?;

    info!(
        committee_id = %committee.id,
        updated_by = %principal.account_id,
        "Committee assignment updated"
    );

    Ok(Json(CommitteeResponse { committee }))
}

/// Revoking an already revoked assignment succeeds and only refreshes `date_modified`.
#[utoipa::path(
    post,
    path = "/committees/{committee_id}/revoke",
    tag = "Committees",
    params(("committee_id" = Uuid, Path, description = "Committee assignment ID")),
    responses(
        (status = 200, description = "Committee assignment revoked", body = CommitteeResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Committee assignment not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn revoke_committee(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(committee_id): Path<Uuid>,
) -> ApiResult<Json<CommitteeResponse>> {
    principal.ensure_admin()?;
    let mut conn = get_db_conn(&state.db_pool)?;

    let committee: Committee = diesel::update(committees::table.find(committee_id))
        .set((
            committees::is_active.eq(false),
            committees::date_modified.eq(now()),
        ))
        .returning(Committee::as_returning())
        .get_result(&mut conn)
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("Committee assignment"))?;

    info!(
        committee_id = %committee.id,
        account_id = %committee.account_id,
        revoked_by = %principal.account_id,
        "Committee assignment revoked"
    );

    Ok(Json(CommitteeResponse { committee }))
}
