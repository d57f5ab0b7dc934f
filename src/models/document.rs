use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::DomainError;
use crate::schema::documents;

/// A kind of evidence that can be scored, placed in the document taxonomy.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = documents)]
pub struct Document {
    pub id: Uuid,
    pub major_component_id: Uuid,
    pub sub_major_component_id: Option<Uuid>,
    pub sub_minor_component_id: Option<Uuid>,
    pub minor_component_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub criteria_id: Option<Uuid>,
    pub sub_criteria_id: Option<Uuid>,
    #[schema(example = "Published research article")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 5.0)]
    pub points: f64,
    #[schema(example = 20.0)]
    pub max_points: f64,
    pub has_multiplier: bool,
    #[schema(example = "per article")]
    pub multiplier_unit: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
pub struct NewDocument {
    pub major_component_id: Uuid,
    pub sub_major_component_id: Option<Uuid>,
    pub sub_minor_component_id: Option<Uuid>,
    pub minor_component_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub criteria_id: Option<Uuid>,
    pub sub_criteria_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub points: f64,
    pub max_points: f64,
    pub has_multiplier: bool,
    pub multiplier_unit: Option<String>,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = documents)]
pub struct DocumentChangeset {
    pub major_component_id: Option<Uuid>,
    pub sub_major_component_id: Option<Uuid>,
    pub sub_minor_component_id: Option<Uuid>,
    pub minor_component_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub criteria_id: Option<Uuid>,
    pub sub_criteria_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub points: Option<f64>,
    pub max_points: Option<f64>,
    pub has_multiplier: Option<bool>,
    pub multiplier_unit: Option<String>,
}

impl DocumentChangeset {
    pub fn is_empty(&self) -> bool {
        self.major_component_id.is_none()
            && self.sub_major_component_id.is_none()
            && self.sub_minor_component_id.is_none()
            && self.minor_component_id.is_none()
            && self.category_id.is_none()
            && self.criteria_id.is_none()
            && self.sub_criteria_id.is_none()
            && self.name.is_none()
            && self.description.is_none()
            && self.points.is_none()
            && self.max_points.is_none()
            && self.has_multiplier.is_none()
            && self.multiplier_unit.is_none()
    }
}

/// `0 <= points <= max_points`, both finite.
pub fn check_points(points: f64, max_points: f64) -> Result<(), DomainError> {
    if !points.is_finite() || !max_points.is_finite() {
        return Err(DomainError::validation("points", "Points must be finite"));
    }
    if points < 0.0 {
        return Err(DomainError::validation(
            "points",
            "Points must not be negative",
        ));
    }
    if points > max_points {
        return Err(DomainError::validation(
            "max_points",
            format!(
                "Maximum points ({}) must be at least the document points ({})",
                max_points, points
            ),
        ));
    }
    Ok(())
}

/// A multiplied document must say what it is multiplied by.
pub fn check_multiplier(
    has_multiplier: bool,
    multiplier_unit: Option<&str>,
) -> Result<(), DomainError> {
    let has_unit = multiplier_unit.is_some_and(|unit| !unit.trim().is_empty());
    if has_multiplier && !has_unit {
        return Err(DomainError::validation(
            "multiplier_unit",
            "A multiplier unit is required when the document has a multiplier",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_within_max() {
        assert!(check_points(0.0, 0.0).is_ok());
        assert!(check_points(5.0, 20.0).is_ok());
        assert!(check_points(20.0, 20.0).is_ok());
    }

    #[test]
    fn test_points_out_of_bounds() {
        assert_eq!(check_points(-1.0, 20.0).unwrap_err().field(), Some("points"));
        assert_eq!(
            check_points(21.0, 20.0).unwrap_err().field(),
            Some("max_points")
        );
        assert!(check_points(f64::INFINITY, f64::INFINITY).is_err());
    }

    #[test]
    fn test_empty_changeset() {
        assert!(DocumentChangeset::default().is_empty());
        let changes = DocumentChangeset {
            points: Some(1.0),
            ..Default::default()
        };
        assert!(!changes.is_empty());
        let changes = DocumentChangeset {
            description: Some("Peer reviewed".to_string()),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_multiplier_requires_unit() {
        assert!(check_multiplier(false, None).is_ok());
        assert!(check_multiplier(true, Some("per article")).is_ok());
        assert!(check_multiplier(true, None).is_err());
        assert!(check_multiplier(true, Some("  ")).is_err());
    }
}
