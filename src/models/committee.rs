use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::schema::committees;

/// An account's seat on a college review and ranking committee.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = committees)]
pub struct Committee {
    pub id: Uuid,
    pub account_id: Uuid,
    pub role_id: Uuid,
    /// Absent for college-wide roles.
    pub department_id: Option<Uuid>,
    pub college_id: Uuid,
    pub date_modified: NaiveDateTime,
    pub has_credentials: bool,
    pub is_active: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = committees)]
pub struct NewCommittee {
    pub account_id: Uuid,
    pub role_id: Uuid,
    pub department_id: Option<Uuid>,
    pub college_id: Uuid,
    pub has_credentials: bool,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = committees)]
pub struct CommitteeChangeset {
    pub role_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub has_credentials: Option<bool>,
}

impl CommitteeChangeset {
    pub fn is_empty(&self) -> bool {
        self.role_id.is_none() && self.department_id.is_none() && self.has_credentials.is_none()
    }
}
