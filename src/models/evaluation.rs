use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::DomainError;
use crate::schema::evaluations;

/// A scored assessment of one document occurrence for an account.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = evaluations)]
pub struct Evaluation {
    pub id: Uuid,
    pub account_id: Uuid,
    pub document_id: Uuid,
    pub date_created: NaiveDateTime,
    pub date_updated: NaiveDateTime,
    #[schema(example = 12.5)]
    pub score: f64,
    #[schema(example = "Peer-reviewed, first author")]
    pub comment: String,
    /// Free-form payload, stored and returned as given.
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
    pub is_active: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = evaluations)]
pub struct NewEvaluation {
    pub account_id: Uuid,
    pub document_id: Uuid,
    pub score: f64,
    pub comment: String,
    pub details: serde_json::Value,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = evaluations)]
pub struct EvaluationChangeset {
    pub score: Option<f64>,
    pub comment: Option<String>,
    pub details: Option<serde_json::Value>,
    pub date_updated: NaiveDateTime,
}

/// A score must lie within `0..=max_points` of the document it rates.
pub fn check_score(score: f64, max_points: f64) -> Result<f64, DomainError> {
    if !score.is_finite() || score < 0.0 || score > max_points {
        return Err(DomainError::ScoreOutOfRange { score, max_points });
    }
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds_are_inclusive() {
        assert_eq!(check_score(0.0, 10.0), Ok(0.0));
        assert_eq!(check_score(10.0, 10.0), Ok(10.0));
    }

    #[test]
    fn test_score_above_max_is_rejected() {
        let err = check_score(11.0, 10.0).unwrap_err();
        assert_eq!(err.code(), "SCORE_OUT_OF_RANGE");
        assert_eq!(err.field(), Some("score"));
    }

    #[test]
    fn test_negative_and_nan_scores_are_rejected() {
        assert!(check_score(-0.5, 10.0).is_err());
        assert!(check_score(f64::NAN, 10.0).is_err());
    }
}
