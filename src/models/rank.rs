use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::DomainError;
use crate::schema::{faculty_ranks, salary_grades, sub_ranks};

#[derive(Debug, Clone, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = sub_ranks)]
pub struct SubRank {
    pub id: Uuid,
    #[schema(example = "I")]
    pub tier: String,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sub_ranks)]
pub struct NewSubRank {
    pub tier: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = sub_ranks)]
pub struct SubRankChangeset {
    pub tier: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = salary_grades)]
pub struct SalaryGrade {
    pub id: Uuid,
    #[schema(example = "SG 12")]
    pub tier: String,
    pub description: Option<String>,
    #[schema(example = 36619.0)]
    pub value: f64,
    pub is_active: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = salary_grades)]
pub struct NewSalaryGrade {
    pub tier: String,
    pub description: Option<String>,
    pub value: f64,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = salary_grades)]
pub struct SalaryGradeChangeset {
    pub tier: Option<String>,
    pub description: Option<String>,
    pub value: Option<f64>,
}

pub fn check_salary_value(value: f64) -> Result<f64, DomainError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(
            "value",
            "Salary grade value must be a non-negative amount",
        ));
    }
    Ok(value)
}

/// A Rank + SubRank + SalaryGrade composition with its point window.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = faculty_ranks)]
pub struct FacultyRank {
    pub id: Uuid,
    pub rank_id: Uuid,
    pub sub_rank_id: Option<Uuid>,
    pub salary_grade_id: Uuid,
    pub description: Option<String>,
    #[schema(example = 0)]
    pub min_points: i32,
    #[schema(example = 100)]
    pub max_points: i32,
    pub is_active: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = faculty_ranks)]
pub struct NewFacultyRank {
    pub rank_id: Uuid,
    pub sub_rank_id: Option<Uuid>,
    pub salary_grade_id: Uuid,
    pub description: Option<String>,
    pub min_points: i32,
    pub max_points: i32,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = faculty_ranks)]
pub struct FacultyRankChangeset {
    pub rank_id: Option<Uuid>,
    pub sub_rank_id: Option<Uuid>,
    pub salary_grade_id: Option<Uuid>,
    pub description: Option<String>,
    pub min_points: Option<i32>,
    pub max_points: Option<i32>,
}

pub fn check_point_range(min: i32, max: i32) -> Result<(), DomainError> {
    if min > max {
        return Err(DomainError::InvalidPointRange { min, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_range() {
        assert!(check_point_range(0, 100).is_ok());
        assert!(check_point_range(50, 50).is_ok());
        assert_eq!(
            check_point_range(101, 100),
            Err(DomainError::InvalidPointRange { min: 101, max: 100 })
        );
    }

    #[test]
    fn test_salary_value() {
        assert!(check_salary_value(0.0).is_ok());
        assert!(check_salary_value(-1.0).is_err());
        assert!(check_salary_value(f64::NAN).is_err());
    }
}
