use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::DomainError;
use crate::schema::faculty_rank_histories;

/// A request to move an account from one (rank, nature, status) triple to another.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = faculty_rank_histories)]
pub struct FacultyRankHistory {
    pub id: Uuid,
    pub account_id: Uuid,
    pub current_rank_id: Option<Uuid>,
    pub current_nature_id: Option<Uuid>,
    pub current_status_id: Option<Uuid>,
    pub target_rank_id: Option<Uuid>,
    pub target_nature_id: Option<Uuid>,
    pub target_status_id: Option<Uuid>,
    pub date_of_request: NaiveDateTime,
    pub is_successful: bool,
    pub date_of_promotion: Option<NaiveDateTime>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Withdrawn,
}

impl FacultyRankHistory {
    pub fn status(&self) -> RequestStatus {
        if self.is_successful {
            RequestStatus::Approved
        } else if self.is_active {
            RequestStatus::Pending
        } else {
            RequestStatus::Withdrawn
        }
    }

    /// Only a pending request may move to approved; there is no way back.
    pub fn ensure_approvable(&self) -> Result<(), DomainError> {
        match self.status() {
            RequestStatus::Pending => Ok(()),
            RequestStatus::Approved => Err(DomainError::conflict(
                "Rank request has already been approved",
            )),
            RequestStatus::Withdrawn => Err(DomainError::conflict(
                "Rank request has been withdrawn",
            )),
        }
    }

    pub fn ensure_withdrawable(&self) -> Result<(), DomainError> {
        match self.status() {
            RequestStatus::Approved => Err(DomainError::conflict(
                "An approved rank request cannot be withdrawn",
            )),
            RequestStatus::Pending | RequestStatus::Withdrawn => Ok(()),
        }
    }
}

#[derive(Debug, Default, Insertable)]
#[diesel(table_name = faculty_rank_histories)]
pub struct NewFacultyRankHistory {
    pub account_id: Uuid,
    pub current_rank_id: Option<Uuid>,
    pub current_nature_id: Option<Uuid>,
    pub current_status_id: Option<Uuid>,
    pub target_rank_id: Option<Uuid>,
    pub target_nature_id: Option<Uuid>,
    pub target_status_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> FacultyRankHistory {
        FacultyRankHistory {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            current_rank_id: None,
            current_nature_id: None,
            current_status_id: None,
            target_rank_id: Some(Uuid::new_v4()),
            target_nature_id: None,
            target_status_id: None,
            date_of_request: chrono::Utc::now().naive_utc(),
            is_successful: false,
            date_of_promotion: None,
            is_active: true,
        }
    }

    #[test]
    fn test_pending_can_be_approved() {
        let history = pending();
        assert_eq!(history.status(), RequestStatus::Pending);
        assert!(history.ensure_approvable().is_ok());
    }

    #[test]
    fn test_approved_cannot_be_approved_again() {
        let mut history = pending();
        history.is_successful = true;
        history.date_of_promotion = Some(chrono::Utc::now().naive_utc());
        assert_eq!(history.status(), RequestStatus::Approved);
        assert_eq!(
            history.ensure_approvable().unwrap_err().code(),
            "CONFLICT"
        );
        assert!(history.ensure_withdrawable().is_err());
    }

    #[test]
    fn test_withdrawn_cannot_be_approved() {
        let mut history = pending();
        history.is_active = false;
        assert_eq!(history.status(), RequestStatus::Withdrawn);
        assert!(history.ensure_approvable().is_err());
        assert!(history.ensure_withdrawable().is_ok());
    }
}
