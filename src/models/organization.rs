use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::schema::{colleges, departments};

#[derive(Debug, Clone, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = departments)]
pub struct Department {
    pub id: Uuid,
    #[schema(example = "Computer Science")]
    pub name: String,
    #[schema(example = "CS")]
    pub abbreviation: String,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = departments)]
pub struct NewDepartment {
    pub name: String,
    pub abbreviation: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = departments)]
pub struct DepartmentChangeset {
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = colleges)]
pub struct College {
    pub id: Uuid,
    #[schema(example = "College of Engineering and Technology")]
    pub name: String,
    #[schema(example = "CET")]
    pub abbreviation: String,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = colleges)]
pub struct NewCollege {
    pub name: String,
    pub abbreviation: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = colleges)]
pub struct CollegeChangeset {
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    pub description: Option<String>,
}
