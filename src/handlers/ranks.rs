//! Sub-rank, salary grade and faculty rank catalogs.

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
use validator::Validate;

use crate::{
    auth::Principal,
    error::{db_err, get_db_conn, ApiError, ApiResult, DomainError},
    helpers::{optional_text, validate_payload},
    models::{
        optional_required_text,
        rank::{check_point_range, check_salary_value},
        required_text, FacultyRank, FacultyRankChangeset, NewFacultyRank, NewSalaryGrade,
        NewSubRank, SalaryGrade, SalaryGradeChangeset, SubRank, SubRankChangeset,
    },
    pagination::{ListParams, PaginationMeta},
    schema::{faculty_ranks, salary_grades, sub_ranks},
    AppState,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSubRankRequest {
    #[validate(length(max = 100, message = "Tier must be at most 100 characters"))]
    #[schema(example = "III")]
    pub tier: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSubRankRequest {
    #[validate(length(max = 100, message = "Tier must be at most 100 characters"))]
    pub tier: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubRankResponse {
    pub sub_rank: SubRank,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubRanksListResponse {
    pub data: Vec<SubRank>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSalaryGradeRequest {
    #[validate(length(max = 100, message = "Tier must be at most 100 characters"))]
    #[schema(example = "SG 13")]
    pub tier: String,
    pub description: Option<String>,
    #[schema(example = 38413.0)]
    pub value: f64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSalaryGradeRequest {
    #[validate(length(max = 100, message = "Tier must be at most 100 characters"))]
    pub tier: Option<String>,
    pub description: Option<String>,
    pub value: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalaryGradeResponse {
    pub salary_grade: SalaryGrade,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalaryGradesListResponse {
    pub data: Vec<SalaryGrade>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFacultyRankRequest {
    pub rank_id: Uuid,
    pub sub_rank_id: Option<Uuid>,
    pub salary_grade_id: Uuid,
    pub description: Option<String>,
    #[schema(example = 0)]
    pub min_points: i32,
    #[schema(example = 100)]
    pub max_points: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFacultyRankRequest {
    pub rank_id: Option<Uuid>,
    pub sub_rank_id: Option<Uuid>,
    pub salary_grade_id: Option<Uuid>,
    pub description: Option<String>,
    pub min_points: Option<i32>,
    pub max_points: Option<i32>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FacultyRankFilter {
    pub rank_id: Option<Uuid>,
    pub sub_rank_id: Option<Uuid>,
    pub salary_grade_id: Option<Uuid>,
    /// Only ranks whose point window contains this value.
    pub points: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FacultyRankResponse {
    pub faculty_rank: FacultyRank,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FacultyRanksListResponse {
    pub data: Vec<FacultyRank>,
    pub pagination: PaginationMeta,
}

// Sub-ranks

#[utoipa::path(
    get,
    path = "/sub-ranks",
    tag = "Ranks",
    params(ListParams),
    responses(
        (status = 200, description = "Paginated list of sub-ranks", body = SubRanksListResponse),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_sub_ranks(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<SubRanksListResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let mut count_query = sub_ranks::table.into_boxed();
    let mut list_query = sub_ranks::table.into_boxed();
    if let Some(is_active) = params.active_filter() {
        count_query = count_query.filter(sub_ranks::is_active.eq(is_active));
        list_query = list_query.filter(sub_ranks::is_active.eq(is_active));
    }

    let total_count: i64 = count_query
        .count()
        .get_result(&mut conn)
        .map_err(db_err)?;

    let (limit, offset) = params.limit_offset();

    let data: Vec<SubRank> = list_query
        .order(sub_ranks::tier.asc())
        .limit(limit)
        .offset(offset)
        .select(SubRank::as_select())
        .load(&mut conn)
        .map_err(db_err)?;

    Ok(Json(SubRanksListResponse {
        data,
        pagination: params.into_metadata(total_count),
    }))
}

#[utoipa::path(
    get,
    path = "/sub-ranks/{sub_rank_id}",
    tag = "Ranks",
    params(("sub_rank_id" = Uuid, Path, description = "Sub-rank ID")),
    responses(
        (status = 200, description = "Sub-rank", body = SubRankResponse),
        (status = 404, description = "Sub-rank not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_sub_rank(
    State(state): State<AppState>,
    Path(sub_rank_id): Path<Uuid>,
) -> ApiResult<Json<SubRankResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let sub_rank: SubRank = sub_ranks::table
        .find(sub_rank_id)
        .select(SubRank::as_select())
        .first(&mut conn)
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("Sub-rank"))?;

    Ok(Json(SubRankResponse { sub_rank }))
}

#[utoipa::path(
    post,
    path = "/sub-ranks",
    tag = "Ranks",
    request_body = CreateSubRankRequest,
    responses(
        (status = 200, description = "Sub-rank created", body = SubRankResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 403, description = "Staff only", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_sub_rank(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateSubRankRequest>,
) -> ApiResult<Json<SubRankResponse>> {
    principal.ensure_admin()?;
    validate_payload(&payload)?;

    let new_sub_rank = NewSubRank {
        tier: required_text("tier", &payload.tier)?,
        description: optional_text(payload.description),
    };

    let mut conn = get_db_conn(&state.db_pool)?;

    let sub_rank: SubRank = diesel::insert_into(sub_ranks::table)
        .values(&new_sub_rank)
        .returning(SubRank::as_returning())
        .get_result(&mut conn)
        .map_err(db_err)?;

    info!(sub_rank_id = %sub_rank.id, tier = %sub_rank.tier, "Created sub-rank");

    Ok(Json(SubRankResponse { sub_rank }))
}

#[utoipa::path(
    put,
    path = "/sub-ranks/{sub_rank_id}",
    tag = "Ranks",
    params(("sub_rank_id" = Uuid, Path, description = "Sub-rank ID")),
    request_body = UpdateSubRankRequest,
    responses(
        (status = 200, description = "Sub-rank updated", body = SubRankResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Sub-rank not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_sub_rank(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(sub_rank_id): Path<Uuid>,
    Json(payload): Json<UpdateSubRankRequest>,
) -> ApiResult<Json<SubRankResponse>> {
    principal.ensure_admin()?;
    validate_payload(&payload)?;

    let changes = SubRankChangeset {
        tier: optional_required_text("tier", payload.tier)?,
        description: payload.description.map(|d| d.trim().to_string()),
    };

    let mut conn = get_db_conn(&state.db_pool)?;

    let sub_rank: SubRank = if changes.tier.is_none() && changes.description.is_none() {
        sub_ranks::table
            .find(sub_rank_id)
            .select(SubRank::as_select())
            .first(&mut conn)
            .optional()
    } else {
        diesel::update(sub_ranks::table.find(sub_rank_id))
            .set(&changes)
            .returning(SubRank::as_returning())
            .get_result(&mut conn)
            .optional()
    }
    .map_err(db_err)?
    .ok_or_else(|| DomainError::not_found("Sub-rank"))?;

    info!(sub_rank_id = %sub_rank.id, "Updated sub-rank");

    Ok(Json(SubRankResponse { sub_rank }))
}

fn set_sub_rank_active(
    state: &AppState,
    principal: &Principal,
    sub_rank_id: Uuid,
    active: bool,
) -> ApiResult<Json<SubRankResponse>> {
    principal.ensure_admin()?;
    let mut conn = get_db_conn(&state.db_pool)?;

    let sub_rank: SubRank = diesel::update(sub_ranks::table.find(sub_rank_id))
        .set(sub_ranks::is_active.eq(active))
        .returning(SubRank::as_returning())
        .get_result(&mut conn)
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("Sub-rank"))?;

    info!(sub_rank_id = %sub_rank.id, is_active = active, "Sub-rank active flag changed");

    Ok(Json(SubRankResponse { sub_rank }))
}

#[utoipa::path(
    post,
    path = "/sub-ranks/{sub_rank_id}/deactivate",
    tag = "Ranks",
    params(("sub_rank_id" = Uuid, Path, description = "Sub-rank ID")),
    responses(
        (status = 200, description = "Sub-rank retired", body = SubRankResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Sub-rank not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn deactivate_sub_rank(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(sub_rank_id): Path<Uuid>,
) -> ApiResult<Json<SubRankResponse>> {
    set_sub_rank_active(&state, &principal, sub_rank_id, false)
}

#[utoipa::path(
    post,
    path = "/sub-ranks/{sub_rank_id}/activate",
    tag = "Ranks",
    params(("sub_rank_id" = Uuid, Path, description = "Sub-rank ID")),
    responses(
        (status = 200, description = "Sub-rank restored", body = SubRankResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Sub-rank not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn activate_sub_rank(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(sub_rank_id): Path<Uuid>,
) -> ApiResult<Json<SubRankResponse>> {
    set_sub_rank_active(&state, &principal, sub_rank_id, true)
}

// Salary grades

#[utoipa::path(
    get,
    path = "/salary-grades",
    tag = "Ranks",
    params(ListParams),
    responses(
        (status = 200, description = "Paginated list of salary grades", body = SalaryGradesListResponse),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_salary_grades(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<SalaryGradesListResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let mut count_query = salary_grades::table.into_boxed();
    let mut list_query = salary_grades::table.into_boxed();
    if let Some(is_active) = params.active_filter() {
        count_query = count_query.filter(salary_grades::is_active.eq(is_active));
        list_query = list_query.filter(salary_grades::is_active.eq(is_active));
    }

    let total_count: i64 = count_query
        .count()
        .get_result(&mut conn)
        .map_err(db_err)?;

    let (limit, offset) = params.limit_offset();

    let data: Vec<SalaryGrade> = list_query
        .order((salary_grades::value.asc(), salary_grades::tier.asc()))
        .limit(limit)
        .offset(offset)
        .select(SalaryGrade::as_select())
        .load(&mut conn)
        .map_err(db_err)?;

    Ok(Json(SalaryGradesListResponse {
        data,
        pagination: params.into_metadata(total_count),
    }))
}

#[utoipa::path(
    get,
    path = "/salary-grades/{salary_grade_id}",
    tag = "Ranks",
    params(("salary_grade_id" = Uuid, Path, description = "Salary grade ID")),
    responses(
        (status = 200, description = "Salary grade", body = SalaryGradeResponse),
        (status = 404, description = "Salary grade not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_salary_grade(
    State(state): State<AppState>,
    Path(salary_grade_id): Path<Uuid>,
) -> ApiResult<Json<SalaryGradeResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let salary_grade: SalaryGrade = salary_grades::table
        .find(salary_grade_id)
        .select(SalaryGrade::as_select())
        .first(&mut conn)
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("Salary grade"))?;

    Ok(Json(SalaryGradeResponse { salary_grade }))
}

#[utoipa::path(
    post,
    path = "/salary-grades",
    tag = "Ranks",
    request_body = CreateSalaryGradeRequest,
    responses(
        (status = 200, description = "Salary grade created", body = SalaryGradeResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 403, description = "Staff only", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_salary_grade(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateSalaryGradeRequest>,
) -> ApiResult<Json<SalaryGradeResponse>> {
    principal.ensure_admin()?;
    validate_payload(&payload)?;

    let new_salary_grade = NewSalaryGrade {
        tier: required_text("tier", &payload.tier)?,
        description: optional_text(payload.description),
        value: check_salary_value(payload.value)?,
    };

    let mut conn = get_db_conn(&state.db_pool)?;

    let salary_grade: SalaryGrade = diesel::insert_into(salary_grades::table)
        .values(&new_salary_grade)
        .returning(SalaryGrade::as_returning())
        .get_result(&mut conn)
        .map_err(db_err)?;

    info!(
        salary_grade_id = %salary_grade.id,
        tier = %salary_grade.tier,
        value = salary_grade.value,
        "Created salary grade"
    );

    Ok(Json(SalaryGradeResponse { salary_grade }))
}

#[utoipa::path(
    put,
    path = "/salary-grades/{salary_grade_id}",
    tag = "Ranks",
    params(("salary_grade_id" = Uuid, Path, description = "Salary grade ID")),
    request_body = UpdateSalaryGradeRequest,
    responses(
        (status = 200, description = "Salary grade updated", body = SalaryGradeResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Salary grade not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_salary_grade(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(salary_grade_id): Path<Uuid>,
    Json(payload): Json<UpdateSalaryGradeRequest>,
) -> ApiResult<Json<SalaryGradeResponse>> {
    principal.ensure_admin()?;
    validate_payload(&payload)?;

    let changes = SalaryGradeChangeset {
        tier: optional_required_text("tier", payload.tier)?,
        description: payload.description.map(|d| d.trim().to_string()),
        value: payload.value.map(check_salary_value).transpose()?,
    };

    let mut conn = get_db_conn(&state.db_pool)?;

    let salary_grade: SalaryGrade =
        if changes.tier.is_none() && changes.description.is_none() && changes.value.is_none() {
            salary_grades::table
                .find(salary_grade_id)
                .select(SalaryGrade::as_select())
                .first(&mut conn)
                .optional()
        } else {
            diesel::update(salary_grades::table.find(salary_grade_id))
                .set(&changes)
                .returning(SalaryGrade::as_returning())
                .get_result(&mut conn)
                .optional()
        }
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("Salary grade"))?;

    info!(salary_grade_id = %salary_grade.id, "Updated salary grade");

    Ok(Json(SalaryGradeResponse { salary_grade }))
}

fn set_salary_grade_active(
    state: &AppState,
    principal: &Principal,
    salary_grade_id: Uuid,
    active: bool,
) -> ApiResult<Json<SalaryGradeResponse>> {
    principal.ensure_admin()?;
    let mut conn = get_db_conn(&state.db_pool)?;

    let salary_grade: SalaryGrade = diesel::update(salary_grades::table.find(salary_grade_id))
        .set(salary_grades::is_active.eq(active))
        .returning(SalaryGrade::as_returning())
        .get_result(&mut conn)
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("Salary grade"))?;

    info!(
        salary_grade_id = %salary_grade.id,
        is_active = active,
        "Salary grade active flag changed"
    );

    Ok(Json(SalaryGradeResponse { salary_grade }))
}

#[utoipa::path(
    post,
    path = "/salary-grades/{salary_grade_id}/deactivate",
    tag = "Ranks",
    params(("salary_grade_id" = Uuid, Path, description = "Salary grade ID")),
    responses(
        (status = 200, description = "Salary grade retired", body = SalaryGradeResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Salary grade not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn deactivate_salary_grade(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(salary_grade_id): Path<Uuid>,
) -> ApiResult<Json<SalaryGradeResponse>> {
    set_salary_grade_active(&state, &principal, salary_grade_id, false)
}

#[utoipa::path(
    post,
    path = "/salary-grades/{salary_grade_id}/activate",
    tag = "Ranks",
    params(("salary_grade_id" = Uuid, Path, description = "Salary grade ID")),
    responses(
        (status = 200, description = "Salary grade restored", body = SalaryGradeResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Salary grade not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn activate_salary_grade(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(salary_grade_id): Path<Uuid>,
) -> ApiResult<Json<SalaryGradeResponse>> {
    set_salary_grade_active(&state, &principal, salary_grade_id, true)
}

// Faculty ranks

fn filtered_faculty_ranks<'a>(
    filter: &'a FacultyRankFilter,
    active: Option<bool>,
) -> faculty_ranks::BoxedQuery<'a, Pg> {
    let mut query = faculty_ranks::table.into_boxed();

    if let Some(is_active) = active {
        query = query.filter(faculty_ranks::is_active.eq(is_active));
    }
    if let Some(rank_id) = filter.rank_id {
        query = query.filter(faculty_ranks::rank_id.eq(rank_id));
    }
    if let Some(sub_rank_id) = filter.sub_rank_id {
        query = query.filter(faculty_ranks::sub_rank_id.eq(sub_rank_id));
    }
    if let Some(salary_grade_id) = filter.salary_grade_id {
        query = query.filter(faculty_ranks::salary_grade_id.eq(salary_grade_id));
    }
    if let Some(points) = filter.points {
        query = query.filter(
            faculty_ranks::min_points
                .le(points)
                .and(faculty_ranks::max_points.ge(points)),
        );
    }

    query
}

fn find_faculty_rank(
    conn: &mut PgConnection,
    faculty_rank_id: Uuid,
) -> Result<FacultyRank, DomainError> {
    faculty_ranks::table
        .find(faculty_rank_id)
        .select(FacultyRank::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| DomainError::not_found("Faculty rank"))
}

#[utoipa::path(
    get,
    path = "/faculty-ranks",
    tag = "Ranks",
    params(ListParams, FacultyRankFilter),
    responses(
        (status = 200, description = "Paginated list of faculty ranks", body = FacultyRanksListResponse),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_faculty_ranks(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<FacultyRankFilter>,
) -> ApiResult<Json<FacultyRanksListResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;
    let active = params.active_filter();

    let total_count: i64 = filtered_faculty_ranks(&filter, active)
        .count()
        .get_result(&mut conn)
        .map_err(db_err)?;

    let (limit, offset) = params.limit_offset();

    let data: Vec<FacultyRank> = filtered_faculty_ranks(&filter, active)
        .order((faculty_ranks::min_points.asc(), faculty_ranks::max_points.asc()))
        .limit(limit)
        .offset(offset)
        .select(FacultyRank::as_select())
        .load(&mut conn)
        .map_err(db_err)?;

    Ok(Json(FacultyRanksListResponse {
        data,
        pagination: params.into_metadata(total_count),
    }))
}

#[utoipa::path(
    get,
    path = "/faculty-ranks/{faculty_rank_id}",
    tag = "Ranks",
    params(("faculty_rank_id" = Uuid, Path, description = "Faculty rank ID")),
    responses(
        (status = 200, description = "Faculty rank", body = FacultyRankResponse),
        (status = 404, description = "Faculty rank not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_faculty_rank(
    State(state): State<AppState>,
    Path(faculty_rank_id): Path<Uuid>,
) -> ApiResult<Json<FacultyRankResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;
    let faculty_rank = find_faculty_rank(&mut conn, faculty_rank_id)?;
    Ok(Json(FacultyRankResponse { faculty_rank }))
}

#[utoipa::path(
    post,
    path = "/faculty-ranks",
    tag = "Ranks",
    request_body = CreateFacultyRankRequest,
    responses(
        (status = 200, description = "Faculty rank created", body = FacultyRankResponse),
        (status = 400, description = "min_points exceeds max_points", body = ApiError),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Rank, sub-rank or salary grade not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_faculty_rank(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateFacultyRankRequest>,
) -> ApiResult<Json<FacultyRankResponse>> {
    principal.ensure_admin()?;
    check_point_range(payload.min_points, payload.max_points)?;

    let new_faculty_rank = NewFacultyRank {
        rank_id: payload.rank_id,
        sub_rank_id: payload.sub_rank_id,
        salary_grade_id: payload.salary_grade_id,
        description: optional_text(payload.description),
        min_points: payload.min_points,
        max_points: payload.max_points,
    };

    let mut conn = get_db_conn(&state.db_pool)?;

    let faculty_rank: FacultyRank = diesel::insert_into(faculty_ranks::table)
        .values(&new_faculty_rank)
        .returning(FacultyRank::as_returning())
        .get_result(&mut conn)
        .map_err(db_err)?;

    info!(
        faculty_rank_id = %faculty_rank.id,
        rank_id = %faculty_rank.rank_id,
        min_points = faculty_rank.min_points,
        max_points = faculty_rank.max_points,
        "Created faculty rank"
    );

    Ok(Json(FacultyRankResponse { faculty_rank }))
}

#[utoipa::path(
    put,
    path = "/faculty-ranks/{faculty_rank_id}",
    tag = "Ranks",
    params(("faculty_rank_id" = Uuid, Path, description = "Faculty rank ID")),
    request_body = UpdateFacultyRankRequest,
    responses(
        (status = 200, description = "Faculty rank updated", body = FacultyRankResponse),
        (status = 400, description = "min_points exceeds max_points", body = ApiError),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Faculty rank or referenced catalog not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_faculty_rank(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(faculty_rank_id): Path<Uuid>,
    Json(payload): Json<UpdateFacultyRankRequest>,
) -> ApiResult<Json<FacultyRankResponse>> {
    principal.ensure_admin()?;

    let changes = FacultyRankChangeset {
        rank_id: payload.rank_id,
        sub_rank_id: payload.sub_rank_id,
        salary_grade_id: payload.salary_grade_id,
        description: payload.description.map(|d| d.trim().to_string()),
        min_points: payload.min_points,
        max_points: payload.max_points,
    };

    let mut conn = get_db_conn(&state.db_pool)?;

    let faculty_rank = conn
        .transaction::<_, DomainError, _>(|conn| {
            let existing = find_faculty_rank(conn, faculty_rank_id)?;
            check_point_range(
                changes.min_points.unwrap_or(existing.min_points),
                changes.max_points.unwrap_or(existing.max_points),
            )?;

            let unchanged = changes.rank_id.is_none()
                && changes.sub_rank_id.is_none()
                && changes.salary_grade_id.is_none()
                && changes.description.is_none()
                && changes.min_points.is_none()
                && changes.max_points.is_none();
            if unchanged {
                return Ok(existing);
            }

            Ok(diesel::update(faculty_ranks::table.find(faculty_rank_id))
                .set(&changes)
                .returning(FacultyRank::as_returning())
                .get_result(conn)?)
        })?;

    info!(faculty_rank_id = %faculty_rank.id, "Updated faculty rank");

    Ok(Json(FacultyRankResponse { faculty_rank }))
}

fn set_faculty_rank_active(
    state: &AppState,
    principal: &Principal,
    faculty_rank_id: Uuid,
    active: bool,
) -> ApiResult<Json<FacultyRankResponse>> {
    principal.ensure_admin()?;
    let mut conn = get_db_conn(&state.db_pool)?;

    let faculty_rank: FacultyRank = diesel::update(faculty_ranks::table.find(faculty_rank_id))
        .set(faculty_ranks::is_active.eq(active))
        .returning(FacultyRank::as_returning())
        .get_result(&mut conn)
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("Faculty rank"))?;

    info!(
        faculty_rank_id = %faculty_rank.id,
        is_active = active,
        "Faculty rank active flag changed"
    );

    Ok(Json(FacultyRankResponse { faculty_rank }))
}

#[utoipa::path(
    post,
    path = "/faculty-ranks/{faculty_rank_id}/deactivate",
    tag = "Ranks",
    params(("faculty_rank_id" = Uuid, Path, description = "Faculty rank ID")),
    responses(
        (status = 200, description = "Faculty rank retired", body = FacultyRankResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Faculty rank not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn deactivate_faculty_rank(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(faculty_rank_id): Path<Uuid>,
) -> ApiResult<Json<FacultyRankResponse>> {
    set_faculty_rank_active(&state, &principal, faculty_rank_id, false)
}

#[utoipa::path(
    post,
    path = "/faculty-ranks/{faculty_rank_id}/activate",
    tag = "Ranks",
    params(("faculty_rank_id" = Uuid, Path, description = "Faculty rank ID")),
    responses(
        (status = 200, description = "Faculty rank restored", body = FacultyRankResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Faculty rank not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn activate_faculty_rank(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(faculty_rank_id): Path<Uuid>,
) -> ApiResult<Json<FacultyRankResponse>> {
    set_faculty_rank_active(&state, &principal, faculty_rank_id, true)
}
