//! Department and college handlers.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::Principal,
    error::{db_err, get_db_conn, ApiError, ApiResult, DomainError},
    helpers::{optional_text, validate_payload},
    models::{
        optional_required_text, required_text, College, CollegeChangeset, Department,
        DepartmentChangeset, NewCollege, NewDepartment,
    },
    pagination::{ListParams, PaginationMeta},
    schema::{colleges, departments},
    AppState,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrganizationUnitRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    #[schema(example = "College of Information Systems and Technology Management")]
    pub name: String,
    #[validate(length(max = 100, message = "Abbreviation must be at most 100 characters"))]
    #[schema(example = "CISTM")]
    pub abbreviation: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrganizationUnitRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 100, message = "Abbreviation must be at most 100 characters"))]
    pub abbreviation: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentResponse {
    pub department: Department,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentsListResponse {
    pub data: Vec<Department>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollegeResponse {
    pub college: College,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollegesListResponse {
    pub data: Vec<College>,
    pub pagination: PaginationMeta,
}

#[utoipa::path(
    get,
    path = "/departments",
    tag = "Organization",
    params(ListParams),
    responses(
        (status = 200, description = "Paginated list of departments", body = DepartmentsListResponse),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_departments(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<DepartmentsListResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let mut count_query = departments::table.into_boxed();
    let mut list_query = departments::table.into_boxed();
    if let Some(is_active) = params.active_filter() {
        count_query = count_query.filter(departments::is_active.eq(is_active));
        list_query = list_query.filter(departments::is_active.eq(is_active));
    }

    let total_count: i64 = count_query
        .count()
        .get_result(&mut conn)
        .map_err(db_err)?;

    let (limit, offset) = params.limit_offset();

    let data: Vec<Department> = list_query
        .order(departments::name.asc())
        .limit(limit)
        .offset(offset)
        .select(Department::as_select())
        .load(&mut conn)
        .map_err(db_err)?;

    Ok(Json(DepartmentsListResponse {
        data,
        pagination: params.into_metadata(total_count),
    }))
}

#[utoipa::path(
    get,
    path = "/departments/{department_id}",
    tag = "Organization",
    params(("department_id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department, active or retired", body = DepartmentResponse),
        (status = 404, description = "Department not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_department(
    State(state): State<AppState>,
    Path(department_id): Path<Uuid>,
) -> ApiResult<Json<DepartmentResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let department: Department = departments::table
        .find(department_id)
        .select(Department::as_select())
        .first(&mut conn)
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("Department"))?;

    Ok(Json(DepartmentResponse { department }))
}

#[utoipa::path(
    post,
    path = "/departments",
    tag = "Organization",
    request_body = CreateOrganizationUnitRequest,
    responses(
        (status = 200, description = "Department created", body = DepartmentResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 403, description = "Staff only", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_department(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateOrganizationUnitRequest>,
) -> ApiResult<Json<DepartmentResponse>> {
    principal.ensure_admin()?;
    validate_payload(&payload)?;

    let new_department = NewDepartment {
        name: required_text("name", &payload.name)?,
        abbreviation: payload.abbreviation.unwrap_or_default().trim().to_string(),
        description: optional_text(payload.description),
    };

    let mut conn = get_db_conn(&state.db_pool)?;

    let department: Department = diesel::insert_into(departments::table)
        .values(&new_department)
        .returning(Department::as_returning())
        .get_result(&mut conn)
        .map_err(db_err)?;

    info!(department_id = %department.id, name = %department.name, "Created department");

    Ok(Json(DepartmentResponse { department }))
}

#[utoipa::path(
    put,
    path = "/departments/{department_id}",
    tag = "Organization",
    params(("department_id" = Uuid, Path, description = "Department ID")),
    request_body = UpdateOrganizationUnitRequest,
    responses(
        (status = 200, description = "Department updated", body = DepartmentResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Department not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_department(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(department_id): Path<Uuid>,
    Json(payload): Json<UpdateOrganizationUnitRequest>,
) -> ApiResult<Json<DepartmentResponse>> {
    principal.ensure_admin()?;
    validate_payload(&payload)?;

    let changes = DepartmentChangeset {
        name: optional_required_text("name", payload.name)?,
        abbreviation: payload.abbreviation.map(|a| a.trim().to_string()),
        description: payload.description.map(|d| d.trim().to_string()),
    };

    let mut conn = get_db_conn(&state.db_pool)?;

    let department: Department = if changes.name.is_none()
        && changes.abbreviation.is_none()
        && changes.description.is_none()
    {
        departments::table
            .find(department_id)
            .select(Department::as_select())
            .first(&mut conn)
            .optional()
    } else {
        diesel::update(departments::table.find(department_id))
            .set(&changes)
            .returning(Department::as_returning())
            .get_result(&mut conn)
            .optional()
    }
    .map_err(db_err)?
    .ok_or_else(|| DomainError::not_found("Department"))?;

    info!(department_id = %department.id, "Updated department");

    Ok(Json(DepartmentResponse { department }))
}

fn set_department_active(
    state: &AppState,
    principal: &Principal,
    department_id: Uuid,
    active: bool,
) -> ApiResult<Json<DepartmentResponse>> {
    principal.ensure_admin()?;
    let mut conn = get_db_conn(&state.db_pool)?;

    let department: Department = diesel::update(departments::table.find(department_id))
        .set(departments::is_active.eq(active))
        .returning(Department::as_returning())
        .get_result(&mut conn)
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("Department"))?;

    info!(department_id = %department.id, is_active = active, "Department active flag changed");

    Ok(Json(DepartmentResponse { department }))
}

#[utoipa::path(
    post,
    path = "/departments/{department_id}/deactivate",
    tag = "Organization",
    params(("department_id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department retired; its accounts stay readable", body = DepartmentResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Department not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn deactivate_department(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(department_id): Path<Uuid>,
) -> ApiResult<Json<DepartmentResponse>> {
    set_department_active(&state, &principal, department_id, false)
}

#[utoipa::path(
    post,
    path = "/departments/{department_id}/activate",
    tag = "Organization",
    params(("department_id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department restored", body = DepartmentResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Department not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn activate_department(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(department_id): Path<Uuid>,
) -> ApiResult<Json<DepartmentResponse>> {
    set_department_active(&state, &principal, department_id, true)
}

#[utoipa::path(
    get,
    path = "/colleges",
    tag = "Organization",
    params(ListParams),
    responses(
        (status = 200, description = "Paginated list of colleges", body = CollegesListResponse),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_colleges(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<CollegesListResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let mut count_query = colleges::table.into_boxed();
    let mut list_query = colleges::table.into_boxed();
    if let Some(is_active) = params.active_filter() {
        count_query = count_query.filter(colleges::is_active.eq(is_active));
        list_query = list_query.filter(colleges::is_active.eq(is_active));
    }

    let total_count: i64 = count_query
        .count()
        .get_result(&mut conn)
        .map_err(db_err)?;

    let (limit, offset) = params.limit_offset();

    let data: Vec<College> = list_query
        .order(colleges::name.asc())
        .limit(limit)
        .offset(offset)
        .select(College::as_select())
        .load(&mut conn)
        .map_err(db_err)?;

    Ok(Json(CollegesListResponse {
        data,
        pagination: params.into_metadata(total_count),
    }))
}

#[utoipa::path(
    get,
    path = "/colleges/{college_id}",
    tag = "Organization",
    params(("college_id" = Uuid, Path, description = "College ID")),
    responses(
        (status = 200, description = "College, active or retired", body = CollegeResponse),
        (status = 404, description = "College not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_college(
    State(state): State<AppState>,
    Path(college_id): Path<Uuid>,
) -> ApiResult<Json<CollegeResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;

    let college: College = colleges::table
        .find(college_id)
        .select(College::as_select())
        .first(&mut conn)
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("College"))?;

    Ok(Json(CollegeResponse { college }))
}

#[utoipa::path(
    post,
    path = "/colleges",
    tag = "Organization",
    request_body = CreateOrganizationUnitRequest,
    responses(
        (status = 200, description = "College created", body = CollegeResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 403, description = "Staff only", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_college(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateOrganizationUnitRequest>,
) -> ApiResult<Json<CollegeResponse>> {
    principal.ensure_admin()?;
    validate_payload(&payload)?;

    let new_college = NewCollege {
        name: required_text("name", &payload.name)?,
        abbreviation: payload.abbreviation.unwrap_or_default().trim().to_string(),
        description: optional_text(payload.description),
    };

    let mut conn = get_db_conn(&state.db_pool)?;

    let college: College = diesel::insert_into(colleges::table)
        .values(&new_college)
        .returning(College::as_returning())
        .get_result(&mut conn)
        .map_err(db_err)?;

    info!(college_id = %college.id, name = %college.name, "Created college");

    Ok(Json(CollegeResponse { college }))
}

#[utoipa::path(
    put,
    path = "/colleges/{college_id}",
    tag = "Organization",
    params(("college_id" = Uuid, Path, description = "College ID")),
    request_body = UpdateOrganizationUnitRequest,
    responses(
        (status = 200, description = "College updated", body = CollegeResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "College not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_college(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(college_id): Path<Uuid>,
    Json(payload): Json<UpdateOrganizationUnitRequest>,
) -> ApiResult<Json<CollegeResponse>> {
    principal.ensure_admin()?;
    validate_payload(&payload)?;

    let changes = CollegeChangeset {
        name: optional_required_text("name", payload.name)?,
        abbreviation: payload.abbreviation.map(|a| a.trim().to_string()),
        description: payload.description.map(|d| d.trim().to_string()),
    };

    let mut conn = get_db_conn(&state.db_pool)?;

    let college: College = if changes.name.is_none()
        && changes.abbreviation.is_none()
        && changes.description.is_none()
    {
        colleges::table
            .find(college_id)
            .select(College::as_select())
            .first(&mut conn)
            .optional()
    } else {
        diesel::update(colleges::table.find(college_id))
            .set(&changes)
            .returning(College::as_returning())
            .get_result(&mut conn)
            .optional()
    }
    .map_err(db_err)?
    .ok_or_else(|| DomainError::not_found("College"))?;

    info!(college_id = %college.id, "Updated college");

    Ok(Json(CollegeResponse { college }))
}

fn set_college_active(
    state: &AppState,
    principal: &Principal,
    college_id: Uuid,
    active: bool,
) -> ApiResult<Json<CollegeResponse>> {
    principal.ensure_admin()?;
    let mut conn = get_db_conn(&state.db_pool)?;

    let college: College = diesel::update(colleges::table.find(college_id))
        .set(colleges::is_active.eq(active))
        .returning(College::as_returning())
        .get_result(&mut conn)
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("College"))?;

    info!(college_id = %college.id, is_active = active, "College active flag changed");

    Ok(Json(CollegeResponse { college }))
}

#[utoipa::path(
    post,
    path = "/colleges/{college_id}/deactivate",
    tag = "Organization",
    params(("college_id" = Uuid, Path, description = "College ID")),
    responses(
        (status = 200, description = "College retired", body = CollegeResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "College not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn deactivate_college(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(college_id): Path<Uuid>,
) -> ApiResult<Json<CollegeResponse>> {
    set_college_active(&state, &principal, college_id, false)
}

#[utoipa::path(
    post,
    path = "/colleges/{college_id}/activate",
    tag = "Organization",
    params(("college_id" = Uuid, Path, description = "College ID")),
    responses(
        (status = 200, description = "College restored", body = CollegeResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "College not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn activate_college(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(college_id): Path<Uuid>,
) -> ApiResult<Json<CollegeResponse>> {
    set_college_active(&state, &principal, college_id, true)
}
