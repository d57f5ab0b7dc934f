//! Credentials, session tokens and the authenticated principal.

pub mod password;
pub mod session;

use uuid::Uuid;

use crate::error::DomainError;
use crate::models::{Account, PermissionFlags};

/// The account behind the current request, re-read from the database.
#[derive(Debug, Clone)]
pub struct Principal {
    pub account_id: Uuid,
    pub permissions: PermissionFlags,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.permissions.can_administer()
    }

    pub fn ensure_admin(&self) -> Result<(), DomainError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }

    /// Staff see every account's records; everyone else only their own.
    pub fn can_view(&self, account_id: Uuid) -> bool {
        self.is_admin() || self.account_id == account_id
    }

    /// Non-staff principals are pinned to their own account in list queries.
    pub fn scope(&self, requested: Option<Uuid>) -> Option<Uuid> {
        if self.is_admin() {
            requested
        } else {
            Some(self.account_id)
        }
    }
}

impl From<&Account> for Principal {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id,
            permissions: account.permissions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(permissions: PermissionFlags) -> Principal {
        Principal {
            account_id: Uuid::new_v4(),
            permissions,
        }
    }

    #[test]
    fn test_faculty_is_not_admin() {
        let faculty = principal(PermissionFlags::default());
        assert_eq!(faculty.ensure_admin(), Err(DomainError::Forbidden));
        assert!(faculty.can_view(faculty.account_id));
        assert!(!faculty.can_view(Uuid::new_v4()));
    }

    #[test]
    fn test_scope_pins_non_staff() {
        let faculty = principal(PermissionFlags::default());
        let other = Uuid::new_v4();
        assert_eq!(faculty.scope(Some(other)), Some(faculty.account_id));
        assert_eq!(faculty.scope(None), Some(faculty.account_id));

        let staff = principal(PermissionFlags::staff());
        assert!(staff.ensure_admin().is_ok());
        assert_eq!(staff.scope(Some(other)), Some(other));
        assert_eq!(staff.scope(None), None);
    }
}
