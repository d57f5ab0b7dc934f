//! Scorable document catalog.

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
    helpers::{contains_pattern, optional_text, validate_payload},
    models::{
        document::{check_multiplier, check_points},
        optional_required_text, required_text, Document, DocumentChangeset, NewDocument,
    },
    pagination::{ListParams, PaginationMeta},
    schema::documents,
    AppState,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDocumentRequest {
    pub major_component_id: Uuid,
    pub sub_major_component_id: Option<Uuid>,
    pub sub_minor_component_id: Option<Uuid>,
    pub minor_component_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub criteria_id: Option<Uuid>,
    pub sub_criteria_id: Option<Uuid>,
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    #[schema(example = "Published research article")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 5.0)]
    pub points: f64,
    #[schema(example = 20.0)]
    pub max_points: f64,
    #[serde(default)]
    pub has_multiplier: bool,
    #[validate(length(max = 255, message = "Multiplier unit must be at most 255 characters"))]
    pub multiplier_unit: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDocumentRequest {
    pub major_component_id: Option<Uuid>,
    pub sub_major_component_id: Option<Uuid>,
    pub sub_minor_component_id: Option<Uuid>,
    pub minor_component_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub criteria_id: Option<Uuid>,
    pub sub_criteria_id: Option<Uuid>,
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub points: Option<f64>,
    pub max_points: Option<f64>,
    pub has_multiplier: Option<bool>,
    #[validate(length(max = 255, message = "Multiplier unit must be at most 255 characters"))]
    pub multiplier_unit: Option<String>,
}

/// Narrows the catalog to one branch of the taxonomy.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DocumentFilter {
    pub major_component_id: Option<Uuid>,
    pub sub_major_component_id: Option<Uuid>,
    pub sub_minor_component_id: Option<Uuid>,
    pub minor_component_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub criteria_id: Option<Uuid>,
    pub sub_criteria_id: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    pub document: Document,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentsListResponse {
    pub data: Vec<Document>,
    pub pagination: PaginationMeta,
}

fn filtered<'a>(filter: &'a DocumentFilter, active: Option<bool>) -> documents::BoxedQuery<'a, Pg> {
    let mut query = documents::table.into_boxed();

    if let Some(is_active) = active {
        query = query.filter(documents::is_active.eq(is_active));
    }
    if let Some(id) = filter.major_component_id {
        query = query.filter(documents::major_component_id.eq(id));
    }
    if let Some(id) = filter.sub_major_component_id {
        query = query.filter(documents::sub_major_component_id.eq(id));
    }
    if let Some(id) = filter.sub_minor_component_id {
        query = query.filter(documents::sub_minor_component_id.eq(id));
    }
    if let Some(id) = filter.minor_component_id {
        query = query.filter(documents::minor_component_id.eq(id));
    }
    if let Some(id) = filter.category_id {
        query = query.filter(documents::category_id.eq(id));
    }
    if let Some(id) = filter.criteria_id {
        query = query.filter(documents::criteria_id.eq(id));
    }
    if let Some(id) = filter.sub_criteria_id {
        query = query.filter(documents::sub_criteria_id.eq(id));
    }
    if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
        query = query.filter(documents::name.ilike(contains_pattern(term)));
    }

    query
}

pub(crate) fn find_document(
    conn: &mut PgConnection,
    document_id: Uuid,
) -> Result<Document, DomainError> {
    documents::table
        .find(document_id)
        .select(Document::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| DomainError::not_found("Document"))
}

#[utoipa::path(
    get,
    path = "/documents",
    tag = "Documents",
    params(ListParams, DocumentFilter),
    responses(
        (status = 200, description = "Paginated list of documents", body = DocumentsListResponse),
        (status = 401, description = "Unauthorized", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_documents(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<DocumentFilter>,
) -> ApiResult<Json<DocumentsListResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;
    let active = params.active_filter();

    let total_count: i64 = filtered(&filter, active)
        .count()
        .get_result(&mut conn)
        .map_err(db_err)?;

    let (limit, offset) = params.limit_offset();

    let data: Vec<Document> = filtered(&filter, active)
        .order(documents::name.asc())
        .limit(limit)
        .offset(offset)
        .select(Document::as_select())
        .load(&mut conn)
        .map_err(db_err)?;

    Ok(Json(DocumentsListResponse {
        data,
        pagination: params.into_metadata(total_count),
    }))
}

#[utoipa::path(
    get,
    path = "/documents/{document_id}",
    tag = "Documents",
    params(("document_id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document", body = DocumentResponse),
        (status = 404, description = "Document not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> ApiResult<Json<DocumentResponse>> {
    let mut conn = get_db_conn(&state.db_pool)?;
    let document = find_document(&mut conn, document_id)?;
    Ok(Json(DocumentResponse { document }))
}

#[utoipa::path(
    post,
    path = "/documents",
    tag = "Documents",
    request_body = CreateDocumentRequest,
    responses(
        (status = 200, description = "Document created", body = DocumentResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Taxonomy entry not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_document(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateDocumentRequest>,
) -> ApiResult<Json<DocumentResponse>> {
    principal.ensure_admin()?;
    validate_payload(&payload)?;

    let multiplier_unit = optional_text(payload.multiplier_unit);
    check_points(payload.points, payload.max_points)?;
    check_multiplier(payload.has_multiplier, multiplier_unit.as_deref())?;

    let new_document = NewDocument {
        major_component_id: payload.major_component_id,
        sub_major_component_id: payload.sub_major_component_id,
        sub_minor_component_id: payload.sub_minor_component_id,
        minor_component_id: payload.minor_component_id,
        category_id: payload.category_id,
        criteria_id: payload.criteria_id,
        sub_criteria_id: payload.sub_criteria_id,
        name: required_text("name", &payload.name)?,
        description: optional_text(payload.description),
        points: payload.points,
        max_points: payload.max_points,
        has_multiplier: payload.has_multiplier,
        multiplier_unit,
    };

    let mut conn = get_db_conn(&state.db_pool)?;

    let document: Document = diesel::insert_into(documents::table)
        .values(&new_document)
        .returning(Document::as_returning())
        .get_result(&mut conn)
        .map_err(db_err)?;

    info!(
        document_id = %document.id,
        name = %document.name,
        max_points = document.max_points,
        "Created document"
    );

    Ok(Json(DocumentResponse { document }))
}

#[utoipa::path(
    put,
    path = "/documents/{document_id}",
    tag = "Documents",
    params(("document_id" = Uuid, Path, description = "Document ID")),
    request_body = UpdateDocumentRequest,
    responses(
        (status = 200, description = "Document updated", body = DocumentResponse),
        (status = 400, description = "Validation error", body = ApiError),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Document or taxonomy entry not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_document(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<UpdateDocumentRequest>,
) -> ApiResult<Json<DocumentResponse>> {
    principal.ensure_admin()?;
    validate_payload(&payload)?;

    let changes = DocumentChangeset {
        major_component_id: payload.major_component_id,
        sub_major_component_id: payload.sub_major_component_id,
        sub_minor_component_id: payload.sub_minor_component_id,
        minor_component_id: payload.minor_component_id,
        category_id: payload.category_id,
        criteria_id: payload.criteria_id,
        sub_criteria_id: payload.sub_criteria_id,
        name: optional_required_text("name", payload.name)?,
        description: payload.description.map(|d| d.trim().to_string()),
        points: payload.points,
        max_points: payload.max_points,
        has_multiplier: payload.has_multiplier,
        multiplier_unit: payload.multiplier_unit.map(|u| u.trim().to_string()),
    };

    let mut conn = get_db_conn(&state.db_pool)?;

    // Invariants are checked against the merged row, under the same transaction.
    let document = conn.transaction::<_, DomainError, _>(|conn| {
        let existing = find_document(conn, document_id)?;

        check_points(
            changes.points.unwrap_or(existing.points),
            changes.max_points.unwrap_or(existing.max_points),
        )?;
        check_multiplier(
            changes.has_multiplier.unwrap_or(existing.has_multiplier),
            changes
                .multiplier_unit
                .as_deref()
                .or(existing.multiplier_unit.as_deref()),
        )?;

        if changes.is_empty() {
            return Ok(existing);
        }

        Ok(diesel::update(documents::table.find(document_id))
            .set(&changes)
            .returning(Document::as_returning())
            .get_result(conn)?)
    })?;

    info!(document_id = %document.id, "Updated document");

    Ok(Json(DocumentResponse { document }))
}

fn set_document_active(
    state: &AppState,
    principal: &Principal,
    document_id: Uuid,
    active: bool,
) -> ApiResult<Json<DocumentResponse>> {
    principal.ensure_admin()?;
    let mut conn = get_db_conn(&state.db_pool)?;

    let document: Document = diesel::update(documents::table.find(document_id))
        .set(documents::is_active.eq(active))
        .returning(Document::as_returning())
        .get_result(&mut conn)
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| DomainError::not_found("Document"))?;

    info!(document_id = %document.id, is_active = active, "Document active flag changed");

    Ok(Json(DocumentResponse { document }))
}

#[utoipa::path(
    post,
    path = "/documents/{document_id}/deactivate",
    tag = "Documents",
    params(("document_id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document retired", body = DocumentResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Document not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn deactivate_document(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(document_id): Path<Uuid>,
) -> ApiResult<Json<DocumentResponse>> {
    set_document_active(&state, &principal, document_id, false)
}

#[utoipa::path(
    post,
    path = "/documents/{document_id}/activate",
    tag = "Documents",
    params(("document_id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document restored", body = DocumentResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Document not found", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn activate_document(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(document_id): Path<Uuid>,
) -> ApiResult<Json<DocumentResponse>> {
    set_document_active(&state, &principal, document_id, true)
}
