//! Simple catalogs: tables that only carry a name, a description and the active flag.

use std::fmt;
use std::str::FromStr;

use diesel::prelude::*;
use diesel::sql_types::{Bool, Nullable, Text, Uuid as SqlUuid};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogKind {
    CommitteeRoles,
    Ranks,
    EmploymentStatuses,
    HiringNatures,
    MajorComponents,
    SubMajorComponents,
    SubMinorComponents,
    MinorComponents,
    Categories,
    Criteria,
    SubCriteria,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 11] = [
        CatalogKind::CommitteeRoles,
        CatalogKind::Ranks,
        CatalogKind::EmploymentStatuses,
        CatalogKind::HiringNatures,
        CatalogKind::MajorComponents,
        CatalogKind::SubMajorComponents,
        CatalogKind::SubMinorComponents,
        CatalogKind::MinorComponents,
        CatalogKind::Categories,
        CatalogKind::Criteria,
        CatalogKind::SubCriteria,
    ];

    /// Path segment under `/catalogs`.
    pub fn slug(&self) -> &'static str {
        match self {
            CatalogKind::CommitteeRoles => "committee-roles",
            CatalogKind::Ranks => "ranks",
            CatalogKind::EmploymentStatuses => "employment-statuses",
            CatalogKind::HiringNatures => "hiring-natures",
            CatalogKind::MajorComponents => "major-components",
            CatalogKind::SubMajorComponents => "sub-major-components",
            CatalogKind::SubMinorComponents => "sub-minor-components",
            CatalogKind::MinorComponents => "minor-components",
            CatalogKind::Categories => "categories",
            CatalogKind::Criteria => "criteria",
            CatalogKind::SubCriteria => "sub-criteria",
        }
    }

    /// Backing table. Only ever one of these fixed names is interpolated into SQL.
    pub fn table_name(&self) -> &'static str {
        match self {
            CatalogKind::CommitteeRoles => "committee_roles",
            CatalogKind::Ranks => "ranks",
            CatalogKind::EmploymentStatuses => "employment_statuses",
            CatalogKind::HiringNatures => "hiring_natures",
            CatalogKind::MajorComponents => "doc_major_components",
            CatalogKind::SubMajorComponents => "doc_sub_major_components",
            CatalogKind::SubMinorComponents => "doc_sub_minor_components",
            CatalogKind::MinorComponents => "doc_minor_components",
            CatalogKind::Categories => "doc_categories",
            CatalogKind::Criteria => "doc_criteria",
            CatalogKind::SubCriteria => "doc_sub_criteria",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CatalogKind::CommitteeRoles => "Committee role",
            CatalogKind::Ranks => "Rank",
            CatalogKind::EmploymentStatuses => "Employment status",
            CatalogKind::HiringNatures => "Hiring nature",
            CatalogKind::MajorComponents => "Major component",
            CatalogKind::SubMajorComponents => "Sub-major component",
            CatalogKind::SubMinorComponents => "Sub-minor component",
            CatalogKind::MinorComponents => "Minor component",
            CatalogKind::Categories => "Category",
            CatalogKind::Criteria => "Criteria",
            CatalogKind::SubCriteria => "Sub-criteria",
        }
    }

    pub fn max_name_length(&self) -> usize {
        if self.is_document_taxonomy() {
            255
        } else {
            100
        }
    }

    pub fn is_document_taxonomy(&self) -> bool {
        matches!(
            self,
            CatalogKind::MajorComponents
                | CatalogKind::SubMajorComponents
                | CatalogKind::SubMinorComponents
                | CatalogKind::MinorComponents
                | CatalogKind::Categories
                | CatalogKind::Criteria
                | CatalogKind::SubCriteria
        )
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown catalog '{0}'")]
pub struct UnknownCatalog(pub String);

impl FromStr for CatalogKind {
    type Err = UnknownCatalog;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CatalogKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| UnknownCatalog(s.to_string()))
    }
}

#[derive(Debug, Clone, QueryableByName, Serialize, ToSchema)]
pub struct CatalogEntry {
    #[diesel(sql_type = SqlUuid)]
    pub id: Uuid,
    #[diesel(sql_type = Text)]
    #[schema(example = "Instruction")]
    pub name: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub description: Option<String>,
    #[diesel(sql_type = Bool)]
    pub is_active: bool,
}
