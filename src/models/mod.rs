//! Database records and their invariants.

pub mod account;
pub mod catalog;
pub mod committee;
pub mod document;
pub mod evaluation;
pub mod organization;
pub mod rank;
pub mod rank_history;

pub use account::{Account, AccountChangeset, NewAccount, PermissionFlags};
pub use catalog::{CatalogEntry, CatalogKind};
pub use committee::{Committee, CommitteeChangeset, NewCommittee};
pub use document::{Document, DocumentChangeset, NewDocument};
pub use evaluation::{Evaluation, EvaluationChangeset, NewEvaluation};
pub use organization::{
    College, CollegeChangeset, Department, DepartmentChangeset, NewCollege, NewDepartment,
};
pub use rank::{
    FacultyRank, FacultyRankChangeset, NewFacultyRank, NewSalaryGrade, NewSubRank, SalaryGrade,
    SalaryGradeChangeset, SubRank, SubRankChangeset,
};
pub use rank_history::{FacultyRankHistory, NewFacultyRankHistory, RequestStatus};

use crate::error::DomainError;

/// Trims a required label and rejects it when nothing is left.
pub fn required_text(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(
            field,
            format!("{} must not be empty", field),
        ));
    }
    Ok(trimmed.to_string())
}

/// Same as [`required_text`] for fields that are only present on update.
pub fn optional_required_text(
    field: &str,
    value: Option<String>,
) -> Result<Option<String>, DomainError> {
    value.map(|v| required_text(field, &v)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(required_text("name", "  CCIS ").unwrap(), "CCIS");
    }

    #[test]
    fn test_required_text_rejects_blank() {
        let err = required_text("name", "   ").unwrap_err();
        assert_eq!(err.field(), Some("name"));
    }

    #[test]
    fn test_optional_required_text() {
        assert_eq!(optional_required_text("name", None).unwrap(), None);
        assert!(optional_required_text("name", Some(String::new())).is_err());
    }
}
