//! Read-only access to the administrable-entity descriptors.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    admin::AdminEntity,
    auth::Principal,
    error::{ApiError, ApiResult, DomainError},
    AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminEntitiesResponse {
    pub entities: Vec<AdminEntity>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminEntityResponse {
    pub entity: AdminEntity,
}

#[utoipa::path(
    get,
    path = "/admin/entities",
    tag = "Admin",
    responses(
        (status = 200, description = "Every administrable entity", body = AdminEntitiesResponse),
        (status = 403, description = "Staff only", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_entities(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<AdminEntitiesResponse>> {
    principal.ensure_admin()?;
    Ok(Json(AdminEntitiesResponse {
        entities: state.admin_entities.as_ref().clone(),
    }))
}

#[utoipa::path(
    get,
    path = "/admin/entities/{key}",
    tag = "Admin",
    params(("key" = String, Path, description = "Entity key, e.g. `departments`")),
    responses(
        (status = 200, description = "Entity descriptor", body = AdminEntityResponse),
        (status = 403, description = "Staff only", body = ApiError),
        (status = 404, description = "Unknown entity", body = ApiError)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_entity(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(key): Path<String>,
) -> ApiResult<Json<AdminEntityResponse>> {
    principal.ensure_admin()?;

    let entity = state
        .admin_entities
        .iter()
        .find(|entity| entity.key == key)
        .cloned()
        .ok_or_else(|| DomainError::not_found("Admin entity"))?;

    Ok(Json(AdminEntityResponse { entity }))
}
