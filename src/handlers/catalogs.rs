//! Simple catalog handlers, addressed as `/catalogs/{kind}`.
//!
//! All eleven simple catalogs share one row shape, so queries are written
//! once against the table named by [`CatalogKind::table_name`].

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Nullable, Text, Uuid as SqlUuid};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    auth::Principal,
    error::{db_err, get_db_conn, ApiError, ApiResult, DomainError},
    helpers::{contains_pattern, optional_text},
    models::{optional_required_text, required_text, CatalogEntry, CatalogKind},
    pagination::{ListParams, PaginationMeta},
    AppState,
};

const RETURNING: &str = "RETURNING id, name, description, is_active";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogFilter {
    /// Case-insensitive match on the name.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCatalogEntryRequest {
    #[schema(example = "Instruction")]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCatalogEntryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogEntryResponse {
    pub kind: CatalogKind,
    pub entry: CatalogEntry,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogListResponse {
    pub kind: CatalogKind,
    pub data: Vec<CatalogEntry>,
    pub pagination: PaginationMeta,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

fn parse_kind(kind: &str) -> Result<CatalogKind, DomainError> {
    kind.parse()
        .map_err(|_| DomainError::not_found(format!("Catalog '{}'", kind)))
}

fn checked_name(kind: CatalogKind, name: &str) -> Result<String, DomainError> {
    let name = required_text("name", name)?;
    if name.chars().count() > kind.max_name_length() {
        return Err(DomainError::validation(
            "name",
            format!(
                "Name must be at most {} characters",
                kind.max_name_length()
            ),
        ));
    }
    Ok(name)
}

fn entry_not_found(kind: CatalogKind) -> DomainError {
    DomainError::not_found(kind.label())
}

#[utoipa::path(
    get,
    path = "/catalogs/{kind}",
    tag = "Catalogs",
    params(
        ("kind" = CatalogKind, Path, description = "Catalog kind"),
        ListParams,
        CatalogFilter
    ),
    responses(
        (status = 200, description = "Paginated catalog entries", body = CatalogListResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Unknown catalog", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_entries(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<ListParams>,
    Query(filter): Query<CatalogFilter>,
) -> ApiResult<Json<CatalogListResponse>> {
    let kind = parse_kind(&kind)?;
    let mut conn = get_db_conn(&state.db_pool)?;

    let active = params.active_filter();
    let pattern = filter
        .search
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(contains_pattern);
    let where_clause =
        "WHERE ($1::boolean IS NULL OR is_active = $1) AND ($2::text IS NULL OR name ILIKE $2)";

    let total_count = diesel::sql_query(format!(
        "SELECT COUNT(*) AS count FROM {} {}",
        kind.table_name(),
        where_clause
    ))
    .bind::<Nullable<Bool>, _>(active)
    .bind::<Nullable<Text>, _>(pattern.clone())
    .get_result::<CountRow>(&mut conn)
    .map_err(db_err)?
    .count;

    let (limit, offset) = params.limit_offset();

    let entries: Vec<CatalogEntry> = diesel::sql_query(format!(
        "SELECT id, name, description, is_active FROM {} {} ORDER BY name ASC LIMIT $3 OFFSET $4",
        kind.table_name(),
        where_clause
    ))
    .bind::<Nullable<Bool>, _>(active)
    .bind::<Nullable<Text>, _>(pattern)
    .bind::<BigInt, _>(limit)
    .bind::<BigInt, _>(offset)
    .load(&mut conn)
    .map_err(db_err)?;

    Ok(Json(CatalogListResponse {
        kind,
        data: entries,
        pagination: params.into_metadata(total_count),
    }))
}

#[utoipa::path(
    get,
    path = "/catalogs/{kind}/{entry_id}",
    tag = "Catalogs",
    params(
        ("kind" = CatalogKind, Path, description = "Catalog kind"),
        ("entry_id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Catalog entry", body = CatalogEntryResponse),
        (status = 404, description = "Unknown catalog or entry", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_entry(
    State(state): State<AppState>,
    Path((kind, entry_id)): Path<(String, Uuid)>,
) -> ApiResult<Json<CatalogEntryResponse>> {
    let kind = parse_kind(&kind)?;
    let mut conn = get_db_conn(&state.db_pool)?;

    let entry: CatalogEntry = diesel::sql_query(format!(
        "SELECT id, name, description, is_active FROM {} WHERE id = $1",
        kind.table_name()
    ))
    .bind::<SqlUuid, _>(entry_id)
    .get_result(&mut conn)
    .optional()
    .map_err(db_err)?
    .ok_or_else(|| entry_not_found(kind))?;

    Ok(Json(CatalogEntryResponse { kind, entry }))
}

#[utoipa::path(
    post,
    path = "/catalogs/{kind}",
    tag = "Catalogs",
    params(("kind" = CatalogKind, Path, description = "Catalog kind")),
    request_body = CreateCatalogEntryRequest,
    responses(
        (status = 200, description = "Entry created", body = CatalogEntryResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Unknown catalog", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_entry(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(kind): Path<String>,
    Json(payload): Json<CreateCatalogEntryRequest>,
) -> ApiResult<Json<CatalogEntryResponse>> {
    principal.ensure_admin()?;
    let kind = parse_kind(&kind)?;
    let name = checked_name(kind, &payload.name)?;

    let mut conn = get_db_conn(&state.db_pool)?;

    let entry: CatalogEntry = diesel::sql_query(format!(
        "INSERT INTO {} (name, description) VALUES ($1, $2) {}",
        kind.table_name(),
        RETURNING
    ))
    .bind::<Text, _>(name)
    .bind::<Nullable<Text>, _>(optional_text(payload.description))
    .get_result(&mut conn)
    .map_err(db_err)?;

    info!(kind = %kind, entry_id = %entry.id, name = %entry.name, "Created catalog entry");

    Ok(Json(CatalogEntryResponse { kind, entry }))
}

#[utoipa::path(
    put,
    path = "/catalogs/{kind}/{entry_id}",
    tag = "Catalogs",
    params(
        ("kind" = CatalogKind, Path, description = "Catalog kind"),
        ("entry_id" = Uuid, Path, description = "Entry ID")
    ),
    request_body = UpdateCatalogEntryRequest,
    responses(
        (status = 200, description = "Entry updated", body = CatalogEntryResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Unknown catalog or entry", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_entry(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((kind, entry_id)): Path<(String, Uuid)>,
    Json(payload): Json<UpdateCatalogEntryRequest>,
) -> ApiResult<Json<CatalogEntryResponse>> {
    principal.ensure_admin()?;
    let kind = parse_kind(&kind)?;
    let name = optional_required_text("name", payload.name)?
        .map(|name| checked_name(kind, &name))
        .transpose()?;

    let mut conn = get_db_conn(&state.db_pool)?;

    let entry: CatalogEntry = diesel::sql_query(format!(
        "UPDATE {} SET name = COALESCE($2, name), description = COALESCE($3, description) \
         WHERE id = $1 {}",
        kind.table_name(),
        RETURNING
    ))
    .bind::<SqlUuid, _>(entry_id)
    .bind::<Nullable<Text>, _>(name)
    .bind::<Nullable<Text>, _>(payload.description.map(|d| d.trim().to_string()))
    .get_result(&mut conn)
    .optional()
    .map_err(db_err)?
    .ok_or_else(|| entry_not_found(kind))?;

    info!(kind = %kind, entry_id = %entry.id, "Updated catalog entry");

    Ok(Json(CatalogEntryResponse { kind, entry }))
}

fn set_entry_active(
    state: &AppState,
    principal: &Principal,
    kind: &str,
    entry_id: Uuid,
    active: bool,
) -> ApiResult<Json<CatalogEntryResponse>> {
    principal.ensure_admin()?;
    let kind = parse_kind(kind)?;
    let mut conn = get_db_conn(&state.db_pool)?;

    let entry: CatalogEntry = diesel::sql_query(format!(
        "UPDATE {} SET is_active = $2 WHERE id = $1 {}",
        kind.table_name(),
        RETURNING
    ))
    .bind::<SqlUuid, _>(entry_id)
    .bind::<Bool, _>(active)
    .get_result(&mut conn)
    .optional()
    .map_err(db_err)?
    .ok_or_else(|| entry_not_found(kind))?;

    info!(kind = %kind, entry_id = %entry.id, is_active = active, "Catalog entry active flag changed");

    Ok(Json(CatalogEntryResponse { kind, entry }))
}

#[utoipa::path(
    post,
    path = "/catalogs/{kind}/{entry_id}/deactivate",
    tag = "Catalogs",
    params(
        ("kind" = CatalogKind, Path, description = "Catalog kind"),
        ("entry_id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry retired; referencing rows are untouched", body = CatalogEntryResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Unknown catalog or entry", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn deactivate_entry(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((kind, entry_id)): Path<(String, Uuid)>,
) -> ApiResult<Json<CatalogEntryResponse>> {
    set_entry_active(&state, &principal, &kind, entry_id, false)
}

#[utoipa::path(
    post,
    path = "/catalogs/{kind}/{entry_id}/activate",
    tag = "Catalogs",
    params(
        ("kind" = CatalogKind, Path, description = "Catalog kind"),
        ("entry_id" = Uuid, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry restored", body = CatalogEntryResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Unknown catalog or entry", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn activate_entry(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((kind, entry_id)): Path<(String, Uuid)>,
) -> ApiResult<Json<CatalogEntryResponse>> {
    set_entry_active(&state, &principal, &kind, entry_id, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_kind_is_not_found() {
        assert_eq!(parse_kind("accounts").unwrap_err().code(), "NOT_FOUND");
        assert_eq!(parse_kind("ranks").unwrap(), CatalogKind::Ranks);
    }

    #[test]
    fn test_checked_name_respects_kind_limit() {
        let long = "x".repeat(150);
        assert!(checked_name(CatalogKind::Ranks, &long).is_err());
        assert!(checked_name(CatalogKind::Criteria, &long).is_ok());
        assert!(checked_name(CatalogKind::Ranks, "   ").is_err());
    }
}
