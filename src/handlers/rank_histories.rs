//! Faculty rank requests and their approval.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDateTime;
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
    models::{FacultyRankHistory, NewFacultyRankHistory, RequestStatus},
    pagination::{ListParams, PaginationMeta},
    schema::{accounts, faculty_rank_histories},
    telemetry::record_promotion_approved,
    AppState,
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateRankHistoryRequest {
    /// Defaults to the caller. Only staff may file for someone else.
    pub account_id: Option<Uuid>,
    /// Faculty rank currently held.
    pub current_rank_id: Option<Uuid>,
    /// Hiring nature currently held.
    pub current_nature_id: Option<Uuid>,
    /// Employment status currently held.
    pub current_status_id: Option<Uuid>,
    pub target_rank_id: Option<Uuid>,
    pub target_nature_id: Option<Uuid>,
    pub target_status_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ApproveRankHistoryRequest {
    /// Defaults to the time of approval.
    pub promotion_date: Option<NaiveDateTime>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RankHistoryFilter {
    pub account_id: Option<Uuid>,
    /// `pending`, `approved` or `withdrawn`. Takes precedence over `include_inactive`.
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RankHistoryResponse {
    pub rank_history: FacultyRankHistory,
    pub status: RequestStatus,
}

impl From<FacultyRankHistory> for RankHistoryResponse {
    fn from(rank_history: FacultyRankHistory) -> Self {
        Self {
            status: rank_history.status(),
            rank_history,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RankHistoriesListResponse {
    pub data: Vec<RankHistoryResponse>,
    pub pagination: PaginationMeta,
}

fn filtered(
    account_id: Option<Uuid>,
    status: Option<RequestStatus>,
    active: Option<bool>,
) -> faculty_rank_histories::BoxedQuery<'static, Pg> {
    let mut query = faculty_rank_histories::table.into_boxed();

    if let Some(account_id) = account_id {
        query = query.filter(faculty_rank_histories::account_id.eq(account_id));
    }

    match status {
        Some(RequestStatus::Pending) => {
            query = query
                .filter(faculty_rank_histories::is_successful.eq(false))
                .filter(faculty_rank_histories::is_active.eq(true));
        }
        Some(RequestStatus::Approved) => {
            query = query.filter(faculty_rank_histories::is_successful.eq(true));
        }
        Some(RequestStatus::Withdrawn) => {
            query = query
                .filter(faculty_rank_histories::is_successful.eq(false))
                .filter(faculty_rank_histories::is_active.eq(false));
        }
        None => {
            if let Some(is_active) = active {
                query = query.filter(faculty_rank_histories::is_active.eq(is_active));
            }
        }
    }

    query
}

fn find_rank_history(
    conn: &mut PgConnection,
    rank_history_id: Uuid,
) -> Result<FacultyRankHistory, DomainError> {
    faculty_rank_histories::table
        .find(rank_history_id)
        .select(FacultyRankHistory::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| DomainError::not_found("Rank request"))
}

#[utoipa::path(
    post,
    path = "/rank-histories",
    tag = "Rank Histories",
    request_body = CreateRankHistoryRequest,
    responses(
        (status = 200, description = "Rank request filed as pending", body = RankHistoryResponse),
        (status = 403, description = "Filing for another account requires staff", body = ApiError),
        (status = 404, description = "Account or referenced catalog not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_rank_history(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateRankHistoryRequest>,
) -> ApiResult<Json<RankHistoryResponse>> {
    let account_id = payload.account_id.unwrap_or(principal.account_id);
    if !principal.can_view(account_id) {
        return Err(DomainError::Forbidden.into());
    }

    let new_history = NewFacultyRankHistory {
        account_id,
        current_rank_id: payload.current_rank_id,
        current_nature_id: payload.current_nature_id,
        current_status_id: payload.current_status_id,
        target_rank_id: payload.target_rank_id,
        target_nature_id: payload.target_nature_id,
        target_status_id: payload.target_status_id,
    };

    let mut conn = get_db_conn(&state.db_pool)?;

    let history: FacultyRankHistory = diesel::insert_into(faculty_rank_histories::table)
        .values(&new_history)
        .returning(FacultyRankHistory::as_returning())
        .get_result(&mut conn)
        .map_err(db_err)?;

    info!(
        rank_history_id = %history.id,
        account_id = %history.account_id,
        filed_by = %principal.account_id,
        "Rank request filed"
    );

    Ok(Json(history.into()))
}

#[utoipa::path(
    get,
    path = "/rank-histories",
    tag = "Rank Histories",
    params(ListParams, RankHistoryFilter),
    responses(
        (status = 200, description = "Rank requests; non-staff see only their own", body = RankHistoriesListResponse),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_rank_histories(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<ListParams>,
    Query(filter): Query<RankHistoryFilter>,
) -> ApiResult<Json<RankHistoriesListResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;
    let account_id = principal.scope(filter.account_id);
    let active = params.active_filter();

    let total_count: i64 = filtered(account_id, filter.status, active)
        .count()
        .get_result(&mut conn)
        .map_err(db_err)?;

    let (limit, offset) = params.limit_offset();

    let histories: Vec<FacultyRankHistory> = filtered(account_id, filter.status, active)
        .order(faculty_rank_histories::date_of_request.desc())
        .limit(limit)
        .offset(offset)
        .select(FacultyRankHistory::as_select())
        .load(&mut conn)
        .map_err(db_err)?;

    Ok(Json(RankHistoriesListResponse {
        data: histories.into_iter().map(RankHistoryResponse::from).collect(),
        pagination: params.into_metadata(total_count),
    }))
}

#[utoipa::path(
    get,
    path = "/rank-histories/{rank_history_id}",
    tag = "Rank Histories",
    params(("rank_history_id" = Uuid, Path, description = "Rank request ID")),
    responses(
        (status = 200, description = "Rank request", body = RankHistoryResponse),
        (status = 404, description = "Rank request not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_rank_history(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(rank_history_id): Path<Uuid>,
) -> ApiResult<Json<RankHistoryResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let history = find_rank_history(&mut conn, rank_history_id)?;
    if !principal.can_view(history.account_id) {
        return Err(DomainError::not_found("Rank request").into());
    }

    Ok(Json(history.into()))
}

/// Moves a pending request to approved and makes it the account's current
/// rank. The status change is a conditional update so concurrent approvals
/// cannot both succeed.
#[utoipa::path(
    post,
    path = "/rank-histories/{rank_history_id}/approve",
    tag = "Rank Histories",
    params(("rank_history_id" = Uuid, Path, description = "Rank request ID")),
    request_body = ApproveRankHistoryRequest,
    responses(
        (status = 200, description = "Rank request approved", body = RankHistoryResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Rank request not found", body = ApiError),
        (status = 409, description = "Already approved or withdrawn", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn approve_rank_history(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(rank_history_id): Path<Uuid>,
    Json(payload): Json<ApproveRankHistoryRequest>,
) -> ApiResult<Json<RankHistoryResponse>> {
    principal.ensure_admin()?;

    let promotion_date = payload.promotion_date.unwrap_or_else(now);

    let mut conn = get_db_conn(&state.db_pool)?;

    let history = conn.transaction::<_, DomainError, _>(|conn| {
        let approved: Option<FacultyRankHistory> = diesel::update(
            faculty_rank_histories::table
                .find(rank_history_id)
                .filter(faculty_rank_histories::is_successful.eq(false))
                .filter(faculty_rank_histories::is_active.eq(true)),
        )
        .set((
            faculty_rank_histories::is_successful.eq(true),
            faculty_rank_histories::date_of_promotion.eq(Some(promotion_date)),
        ))
        .returning(FacultyRankHistory::as_returning())
        .get_result(conn)
        .optional()?;

        let Some(history) = approved else {
            // Nothing matched: either missing or no longer pending.
            find_rank_history(conn, rank_history_id)?.ensure_approvable()?;
            return Err(DomainError::conflict("Rank request is not pending"));
        };

        diesel::update(accounts::table.find(history.account_id))
            .set(accounts::current_rank_history_id.eq(Some(history.id)))
            .execute(conn)?;

        Ok(history)
    })?;

    record_promotion_approved();
    info!(
        rank_history_id = %history.id,
        account_id = %history.account_id,
        approved_by = %principal.account_id,
        "Rank request approved"
    );

    Ok(Json(history.into()))
}

#[utoipa::path(
    post,
    path = "/rank-histories/{rank_history_id}/withdraw",
    tag = "Rank Histories",
    params(("rank_history_id" = Uuid, Path, description = "Rank request ID")),
    responses(
        (status = 200, description = "Rank request withdrawn", body = RankHistoryResponse),
        (status = 404, description = "Rank request not found", body = ApiError),
        (status = 409, description = "Approved requests cannot be withdrawn", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn withdraw_rank_history(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(rank_history_id): Path<Uuid>,
) -> ApiResult<Json<RankHistoryResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let history = conn.transaction::<_, DomainError, _>(|conn| {
        let existing = find_rank_history(conn, rank_history_id)?;
        if !principal.can_view(existing.account_id) {
            return Err(DomainError::not_found("Rank request"));
        }

        let withdrawn: Option<FacultyRankHistory> = diesel::update(
            faculty_rank_histories::table
                .find(rank_history_id)
                .filter(faculty_rank_histories::is_successful.eq(false)),
        )
        .set(faculty_rank_histories::is_active.eq(false))
        .returning(FacultyRankHistory::as_returning())
        .get_result(conn)
        .optional()?;

        match withdrawn {
            Some(history) => Ok(history),
            None => {
                existing.ensure_withdrawable()?;
                Err(DomainError::conflict(
                    "An approved rank request cannot be withdrawn",
                ))
            }
        }
    })?;

    info!(
        rank_history_id = %history.id,
        account_id = %history.account_id,
        withdrawn_by = %principal.account_id,
        "Rank request withdrawn"
    );

    Ok(Json(history.into()))
}
