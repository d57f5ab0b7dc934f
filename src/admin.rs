//! Administrable-entity descriptors.
//!
//! [`registry`] builds the explicit list of entities an administrative UI may
//! render. It is constructed once at startup and carried in `AppState`.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::CatalogKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    LongText,
    Email,
    Password,
    Date,
    DateTime,
    Integer,
    Decimal,
    Boolean,
    Json,
    Reference,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldDescriptor {
    #[schema(example = "department_id")]
    pub name: String,
    #[schema(example = "Department")]
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    /// Key of the referenced entity for [`FieldKind::Reference`] fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "departments")]
    pub references: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminEntity {
    #[schema(example = "departments")]
    pub key: String,
    #[schema(example = "Department")]
    pub label: String,
    #[schema(example = "/departments")]
    pub route: String,
    pub fields: Vec<FieldDescriptor>,
}

impl AdminEntity {
    fn new(key: &str, label: &str, route: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            route: route.to_string(),
            fields: Vec::new(),
        }
    }

    fn field(mut self, name: &str, label: &str, kind: FieldKind, required: bool) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required,
            references: None,
        });
        self
    }

    fn reference(mut self, name: &str, label: &str, target: &str, required: bool) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.to_string(),
            label: label.to_string(),
            kind: FieldKind::Reference,
            required,
            references: Some(target.to_string()),
        });
        self
    }

    fn active_flag(self) -> Self {
        self.field("is_active", "Active", FieldKind::Boolean, false)
    }
}

pub fn registry() -> Vec<AdminEntity> {
    use FieldKind::*;

    let mut entities = vec![
        AdminEntity::new("accounts", "Account", "/accounts")
            .field("email", "Email", Email, true)
            .field("password", "Password", Password, true)
            .field("first_name", "First name", Text, true)
            .field("middle_name", "Middle name", Text, false)
            .field("last_name", "Last name", Text, true)
            .field("faculty_id", "Faculty ID", Text, false)
            .field("plm_email", "PLM email", Email, false)
            .reference("college_id", "College", "colleges", false)
            .reference("department_id", "Department", "departments", false)
            .field("date_of_birth", "Date of birth", Date, false)
            .field("contact_number", "Contact number", Text, false)
            .field("address", "Address", LongText, false)
            .field("is_staff", "Staff", Boolean, false)
            .field("is_superuser", "Superuser", Boolean, false)
            .active_flag(),
        AdminEntity::new("departments", "Department", "/departments")
            .field("name", "Name", Text, true)
            .field("abbreviation", "Abbreviation", Text, false)
            .field("description", "Description", LongText, false)
            .active_flag(),
        AdminEntity::new("colleges", "College", "/colleges")
            .field("name", "Name", Text, true)
            .field("abbreviation", "Abbreviation", Text, false)
            .field("description", "Description", LongText, false)
            .active_flag(),
        AdminEntity::new("sub-ranks", "Sub-rank", "/sub-ranks")
            .field("tier", "Tier", Text, true)
            .field("description", "Description", LongText, false)
            .active_flag(),
        AdminEntity::new("salary-grades", "Salary grade", "/salary-grades")
            .field("tier", "Tier", Text, true)
            .field("description", "Description", LongText, false)
            .field("value", "Value", Decimal, true)
            .active_flag(),
        AdminEntity::new("faculty-ranks", "Faculty rank", "/faculty-ranks")
            .reference("rank_id", "Rank", "ranks", true)
            .reference("sub_rank_id", "Sub-rank", "sub-ranks", false)
            .reference("salary_grade_id", "Salary grade", "salary-grades", true)
            .field("description", "Description", LongText, false)
            .field("min_points", "Minimum points", Integer, true)
            .field("max_points", "Maximum points", Integer, true)
            .active_flag(),
        AdminEntity::new("documents", "Document", "/documents")
            .reference("major_component_id", "Major component", "major-components", true)
            .reference("sub_major_component_id", "Sub-major component", "sub-major-components", false)
            .reference("sub_minor_component_id", "Sub-minor component", "sub-minor-components", false)
            .reference("minor_component_id", "Minor component", "minor-components", false)
            .reference("category_id", "Category", "categories", false)
            .reference("criteria_id", "Criteria", "criteria", false)
            .reference("sub_criteria_id", "Sub-criteria", "sub-criteria", false)
            .field("name", "Name", Text, true)
            .field("description", "Description", LongText, false)
            .field("points", "Points", Decimal, true)
            .field("max_points", "Maximum points", Decimal, true)
            .field("has_multiplier", "Has multiplier", Boolean, false)
            .field("multiplier_unit", "Multiplier unit", Text, false)
            .active_flag(),
        AdminEntity::new("committees", "Committee assignment", "/committees")
            .reference("account_id", "Account", "accounts", true)
            .reference("role_id", "Role", "committee-roles", true)
            .reference("department_id", "Department", "departments", false)
            .reference("college_id", "College", "colleges", true)
            .field("has_credentials", "Has credentials", Boolean, false)
            .field("date_modified", "Date modified", DateTime, false)
            .active_flag(),
        AdminEntity::new("rank-histories", "Faculty rank history", "/rank-histories")
            .reference("account_id", "Account", "accounts", true)
            .reference("current_rank_id", "Current rank", "faculty-ranks", false)
            .reference("current_nature_id", "Current hiring nature", "hiring-natures", false)
            .reference("current_status_id", "Current employment status", "employment-statuses", false)
            .reference("target_rank_id", "Target rank", "faculty-ranks", false)
            .reference("target_nature_id", "Target hiring nature", "hiring-natures", false)
            .reference("target_status_id", "Target employment status", "employment-statuses", false)
            .field("date_of_request", "Date of request", DateTime, false)
            .field("is_successful", "Approved", Boolean, false)
            .field("date_of_promotion", "Date of promotion", DateTime, false)
            .active_flag(),
        AdminEntity::new("evaluations", "Evaluation", "/evaluations")
            .reference("account_id", "Account", "accounts", true)
            .reference("document_id", "Document", "documents", true)
            .field("score", "Score", Decimal, true)
            .field("comment", "Comment", LongText, false)
            .field("details", "Details", Json, false)
            .field("date_created", "Date created", DateTime, false)
            .field("date_updated", "Date updated", DateTime, false)
            .active_flag(),
    ];

    entities.extend(CatalogKind::ALL.into_iter().map(|kind| {
        AdminEntity::new(
            kind.slug(),
            kind.label(),
            &format!("/catalogs/{}", kind.slug()),
        )
        .field("name", "Name", Text, true)
        .field("description", "Description", LongText, false)
        .active_flag()
    }));

    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_and_routes_are_unique() {
        let entities = registry();
        let keys: HashSet<_> = entities.iter().map(|e| e.key.as_str()).collect();
        let routes: HashSet<_> = entities.iter().map(|e| e.route.as_str()).collect();
        assert_eq!(keys.len(), entities.len());
        assert_eq!(routes.len(), entities.len());
    }

    #[test]
    fn test_references_resolve() {
        let entities = registry();
        let keys: HashSet<_> = entities.iter().map(|e| e.key.clone()).collect();

        for entity in &entities {
            for field in &entity.fields {
                match (field.kind, &field.references) {
                    (FieldKind::Reference, Some(target)) => {
                        assert!(keys.contains(target), "{}.{} -> {}", entity.key, field.name, target)
                    }
                    (FieldKind::Reference, None) => panic!("{}.{} has no target", entity.key, field.name),
                    (_, reference) => assert!(reference.is_none()),
                }
            }
        }
    }

    #[test]
    fn test_every_catalog_is_registered() {
        let entities = registry();
        for kind in CatalogKind::ALL {
            let entity = entities.iter().find(|e| e.key == kind.slug()).unwrap();
            assert_eq!(entity.route, format!("/catalogs/{}", kind.slug()));
            assert!(entity.fields.iter().any(|f| f.name == "name" && f.required));
        }
    }

    #[test]
    fn test_account_fields_never_expose_hash() {
        let entities = registry();
        let accounts = entities.iter().find(|e| e.key == "accounts").unwrap();
        assert!(accounts.fields.iter().all(|f| f.name != "password_hash"));
    }
}
