//! Evaluation recording and the per-account score summary.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use diesel::dsl::{count_star, sum};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    auth::Principal,
    error::{db_err, get_db_conn, ApiError, ApiResult, DomainError},
    handlers::{committees::is_evaluator, documents::find_document},
    helpers::now,
    models::{evaluation::check_score, Evaluation, EvaluationChangeset, NewEvaluation},
    pagination::{ListParams, PaginationMeta},
    schema::{accounts, evaluations},
    telemetry::record_evaluation_submitted,
    AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitEvaluationRequest {
    pub account_id: Uuid,
    pub document_id: Uuid,
    #[schema(example = 12.5)]
    pub score: f64,
    #[serde(default)]
    pub comment: String,
    /// Any JSON value. Defaults to `{}`.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEvaluationRequest {
    pub score: Option<f64>,
    pub comment: Option<String>,
    #[schema(value_type = Object)]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EvaluationFilter {
    pub account_id: Option<Uuid>,
    pub document_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryParams {
    /// Required for staff; everyone else always gets their own summary.
    pub account_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EvaluationResponse {
    pub evaluation: Evaluation,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EvaluationsListResponse {
    pub data: Vec<Evaluation>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EvaluationSummary {
    pub account_id: Uuid,
    #[schema(example = 87.5)]
    pub total_score: f64,
    #[schema(example = 9)]
    pub evaluation_count: i64,
}

fn filtered(
    account_id: Option<Uuid>,
    document_id: Option<Uuid>,
    active: Option<bool>,
) -> evaluations::BoxedQuery<'static, Pg> {
    let mut query = evaluations::table.into_boxed();

    if let Some(is_active) = active {
        query = query.filter(evaluations::is_active.eq(is_active));
    }
    if let Some(account_id) = account_id {
        query = query.filter(evaluations::account_id.eq(account_id));
    }
    if let Some(document_id) = document_id {
        query = query.filter(evaluations::document_id.eq(document_id));
    }

    query
}

/// Staff, or holders of an active credentialed committee seat.
fn ensure_evaluator(conn: &mut PgConnection, principal: &Principal) -> ApiResult<()> {
    if principal.is_admin() || is_evaluator(conn, principal.account_id).map_err(db_err)? {
        return Ok(());
    }
    warn!(account_id = %principal.account_id, "Evaluation write by non-evaluator");
    Err(DomainError::Forbidden.into())
}

fn find_evaluation(
    conn: &mut PgConnection,
    evaluation_id: Uuid,
) -> Result<Evaluation, DomainError> {
    evaluations::table
        .find(evaluation_id)
        .select(Evaluation::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| DomainError::not_found("Evaluation"))
}

#[utoipa::path(
    post,
    path = "/evaluations",
    tag = "Evaluations",
    request_body = SubmitEvaluationRequest,
    responses(
        (status = 200, description = "Evaluation recorded", body = EvaluationResponse),
        (status = 400, description = "Score out of range, or inactive account or document", body = ApiError),
        (status = 403, description = "Staff or evaluator only", body = ApiError),
        (status = 404, description = "Account or document not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_evaluation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<SubmitEvaluationRequest>,
) -> ApiResult<Json<EvaluationResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;
    ensure_evaluator(&mut conn, &principal)?;

    let document = find_document(&mut conn, payload.document_id)?;
    if !document.is_active {
        return Err(DomainError::validation("document_id", "Document is inactive").into());
    }

    let account_active: bool = accounts::table
        .find(payload.account_id)
        .select(accounts::is_active)
        .first(&mut conn)
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("Account"))?;
    if !account_active {
        return Err(DomainError::validation("account_id", "Account is inactive").into());
    }

    let new_evaluation = NewEvaluation {
        account_id: payload.account_id,
        document_id: document.id,
        score: check_score(payload.score, document.max_points)?,
        comment: payload.comment.trim().to_string(),
        details: payload
            .details
            .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
    };

    let evaluation: Evaluation = diesel::insert_into(evaluations::table)
        .values(&new_evaluation)
        .returning(Evaluation::as_returning())
        .get_result(&mut conn)
        .map_err(db_err)?;

    record_evaluation_submitted();
    info!(
        evaluation_id = %evaluation.id,
        account_id = %evaluation.account_id,
        document_id = %evaluation.document_id,
        score = evaluation.score,
        evaluator = %principal.account_id,
        "Evaluation recorded"
    );

    Ok(Json(EvaluationResponse { evaluation }))
}

#[utoipa::path(
    put,
    path = "/evaluations/{evaluation_id}",
    tag = "Evaluations",
    params(("evaluation_id" = Uuid, Path, description = "Evaluation ID")),
    request_body = UpdateEvaluationRequest,
    responses(
        (status = 200, description = "Evaluation updated", body = EvaluationResponse),
        (status = 400, description = "Score out of range", body = ApiError),
        (status = 403, description = "Staff or evaluator only", body = ApiError),
        (status = 404, description = "Evaluation not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_evaluation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(evaluation_id): Path<Uuid>,
    Json(payload): Json<UpdateEvaluationRequest>,
) -> ApiResult<Json<EvaluationResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;
    ensure_evaluator(&mut conn, &principal)?;

    let evaluation = conn.transaction::<_, DomainError, _>(|conn| {
        let existing = find_evaluation(conn, evaluation_id)?;

        let score = match payload.score {
            Some(score) => {
                let document = find_document(conn, existing.document_id)?;
                Some(check_score(score, document.max_points)?)
            }
            None => None,
        };

        let changes = EvaluationChangeset {
            score,
            comment: payload.comment.as_deref().map(|c| c.trim().to_string()),
            details: payload.details.clone(),
            date_updated: now(),
        };

        Ok(diesel::update(evaluations::table.find(evaluation_id))
            .set(&changes)
            .returning(Evaluation::as_returning())
            .get_result(conn)?)
    })?;

    info!(
        evaluation_id = %evaluation.id,
        updated_by = %principal.account_id,
        "Evaluation updated"
    );

    Ok(Json(EvaluationResponse { evaluation }))
}

#[utoipa::path(
    post,
    path = "/evaluations/{evaluation_id}/deactivate",
    tag = "Evaluations",
    params(("evaluation_id" = Uuid, Path, description = "Evaluation ID")),
    responses(
        (status = 200, description = "Evaluation retired", body = EvaluationResponse),
        (status = 403, description = "Staff or evaluator only", body = ApiError),
        (status = 404, description = "Evaluation not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn deactivate_evaluation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(evaluation_id): Path<Uuid>,
) -> ApiResult<Json<EvaluationResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;
    ensure_evaluator(&mut conn, &principal)?;

    let evaluation: Evaluation = diesel::update(evaluations::table.find(evaluation_id))
        .set((
            evaluations::is_active.eq(false),
            evaluations::date_updated.eq(now()),
        ))
        .returning(Evaluation::as_returning())
        .get_result(&mut conn)
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("Evaluation"))?;

    info!(
        evaluation_id = %evaluation.id,
        deactivated_by = %principal.account_id,
        "Evaluation deactivated"
    );

    Ok(Json(EvaluationResponse { evaluation }))
}

#[utoipa::path(
    get,
    path = "/evaluations",
    tag = "Evaluations",
    params(ListParams, EvaluationFilter),
    responses(
        (status = 200, description = "Evaluations; non-staff see only their own", body = EvaluationsListResponse),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_evaluations(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<ListParams>,
    Query(filter): Query<EvaluationFilter>,
) -> ApiResult<Json<EvaluationsListResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;
    let account_id = principal.scope(filter.account_id);
    let active = params.active_filter();

    let total_count: i64 = filtered(account_id, filter.document_id, active)
        .count()
        .get_result(&mut conn)
        .map_err(db_err)?;

    let (limit, offset) = params.limit_offset();

    let data: Vec<Evaluation> = filtered(account_id, filter.document_id, active)
        .order(evaluations::date_created.desc())
        .limit(limit)
        .offset(offset)
        .select(Evaluation::as_select())
        .load(&mut conn)
        .map_err(db_err)?;

    Ok(Json(EvaluationsListResponse {
        data,
        pagination: params.into_metadata(total_count),
    }))
}

#[utoipa::path(
    get,
    path = "/evaluations/{evaluation_id}",
    tag = "Evaluations",
    params(("evaluation_id" = Uuid, Path, description = "Evaluation ID")),
    responses(
        (status = 200, description = "Evaluation", body = EvaluationResponse),
        (status = 404, description = "Evaluation not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_evaluation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(evaluation_id): Path<Uuid>,
) -> ApiResult<Json<EvaluationResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let evaluation = find_evaluation(&mut conn, evaluation_id)?;
    if !principal.can_view(evaluation.account_id) {
        return Err(DomainError::not_found("Evaluation").into());
    }

    Ok(Json(EvaluationResponse { evaluation }))
}

#[utoipa::path(
    get,
    path = "/evaluations/summary",
    tag = "Evaluations",
    params(SummaryParams),
    responses(
        (status = 200, description = "Total score over active evaluations", body = EvaluationSummary),
        (status = 400, description = "account_id is required for staff", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn evaluation_summary(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<SummaryParams>,
) -> ApiResult<Json<EvaluationSummary>> {
    let account_id = principal
        .scope(params.account_id)
        .ok_or_else(|| DomainError::validation("account_id", "account_id is required"))?;

    let mut conn = get_db_conn(&state.db_pool)?;

    let (total_score, evaluation_count): (Option<f64>, i64) = evaluations::table
        .filter(evaluations::account_id.eq(account_id))
        .filter(evaluations::is_active.eq(true))
        .select((sum(evaluations::score), count_star()))
        .first(&mut conn)
        .map_err(db_err)?;

    Ok(Json(EvaluationSummary {
        account_id,
        total_score: total_score.unwrap_or(0.0),
        evaluation_count,
    }))
}
