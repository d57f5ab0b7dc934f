use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::schema::accounts;

/// Administrative flags carried by every account.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Queryable, Selectable, Serialize, Deserialize, ToSchema,
)]
#[diesel(table_name = accounts)]
pub struct PermissionFlags {
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl PermissionFlags {
    pub fn staff() -> Self {
        Self {
            is_staff: true,
            is_superuser: false,
        }
    }

    pub fn superuser() -> Self {
        Self {
            is_staff: true,
            is_superuser: true,
        }
    }

    pub fn can_administer(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

/// The authentication principal.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = accounts)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub faculty_id: String,
    pub plm_email: String,
    pub college_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub date_of_birth: Option<NaiveDate>,
    pub contact_number: String,
    pub address: String,
    pub current_rank_history_id: Option<Uuid>,
    pub date_added: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
    #[diesel(embed)]
    pub permissions: PermissionFlags,
    pub is_active: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = accounts)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub faculty_id: String,
    pub plm_email: String,
    pub college_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub date_of_birth: Option<NaiveDate>,
    pub contact_number: String,
    pub address: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = accounts)]
pub struct AccountChangeset {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub faculty_id: Option<String>,
    pub plm_email: Option<String>,
    pub college_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub date_of_birth: Option<NaiveDate>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl AccountChangeset {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.middle_name.is_none()
            && self.last_name.is_none()
            && self.faculty_id.is_none()
            && self.plm_email.is_none()
            && self.college_id.is_none()
            && self.department_id.is_none()
            && self.date_of_birth.is_none()
            && self.contact_number.is_none()
            && self.address.is_none()
            && self.is_staff.is_none()
            && self.is_superuser.is_none()
    }
}

/// Login identifiers compare case-insensitively; they are stored lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@X.Edu "), "a@x.edu");
        assert_eq!(normalize_email("a@x.edu"), normalize_email("A@x.EDU"));
    }

    #[test]
    fn test_permission_flags() {
        assert!(!PermissionFlags::default().can_administer());
        assert!(PermissionFlags::staff().can_administer());
        assert!(PermissionFlags::superuser().is_superuser);
    }

    #[test]
    fn test_empty_changeset() {
        assert!(AccountChangeset::default().is_empty());
        let changes = AccountChangeset {
            address: Some("Intramuros".to_string()),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
