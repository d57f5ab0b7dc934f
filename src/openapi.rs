//! OpenAPI document and Swagger UI.

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{
    accounts, admin, auth, catalogs, committees, documents, evaluations, health, organization,
    rank_histories, ranks,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Faculty Evaluation API",
        version = "1.0.0",
        description = "Faculty ranking and evaluation records.\n\n\
        ## Authentication\n\
        1. Register or login to obtain an access token\n\
        2. Send it as `Authorization: Bearer <token>`\n\n\
        Catalog lookups are open to every authenticated account. Writes to \
        catalogs, accounts and committees require a staff account. Evaluations \
        may also be recorded by members of a credentialed committee.\n\n\
        ## Lists\n\
        Every list is paginated (`page`, `per_page`) and hides retired rows \
        unless `include_inactive=true`."
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    tags(
        (name = "Health", description = "Probes"),
        (name = "Authentication", description = "Registration, login and the current account"),
        (name = "Accounts", description = "Account administration"),
        (name = "Catalogs", description = "Name and description lookup tables"),
        (name = "Organization", description = "Departments and colleges"),
        (name = "Ranks", description = "Sub-ranks, salary grades and faculty ranks"),
        (name = "Documents", description = "Scorable document catalog"),
        (name = "Committees", description = "Committee assignments"),
        (name = "Rank Histories", description = "Rank requests and approval"),
        (name = "Evaluations", description = "Scored evaluations"),
        (name = "Admin", description = "Administrable-entity descriptors")
    ),
    paths(
        health::health_check_simple,
        health::health_check,
        health::ready_check,
        health::live_check,

        auth::register,
        auth::login,
        auth::get_current_account,
        auth::change_password,

        accounts::list_accounts,
        accounts::get_account,
        accounts::update_account,
        accounts::deactivate_account,
        accounts::activate_account,
        accounts::delete_account,

        catalogs::list_entries,
        catalogs::get_entry,
        catalogs::create_entry,
        catalogs::update_entry,
        catalogs::deactivate_entry,
        catalogs::activate_entry,

        organization::list_departments,
        organization::get_department,
        organization::create_department,
        organization::update_department,
        organization::deactivate_department,
        organization::activate_department,
        organization::list_colleges,
        organization::get_college,
        organization::create_college,
        organization::update_college,
        organization::deactivate_college,
        organization::activate_college,

        ranks::list_sub_ranks,
        ranks::get_sub_rank,
        ranks::create_sub_rank,
        ranks::update_sub_rank,
        ranks::deactivate_sub_rank,
        ranks::activate_sub_rank,
        ranks::list_salary_grades,
        ranks::get_salary_grade,
        ranks::create_salary_grade,
        ranks::update_salary_grade,
        ranks::deactivate_salary_grade,
        ranks::activate_salary_grade,
        ranks::list_faculty_ranks,
        ranks::get_faculty_rank,
        ranks::create_faculty_rank,
        ranks::update_faculty_rank,
        ranks::deactivate_faculty_rank,
        ranks::activate_faculty_rank,

        documents::list_documents,
        documents::get_document,
        documents::create_document,
        documents::update_document,
        documents::deactivate_document,
        documents::activate_document,

        committees::assign_committee,
        committees::list_committees,
        committees::get_committee,
        committees::update_committee,
        committees::revoke_committee,

        rank_histories::create_rank_history,
        rank_histories::list_rank_histories,
        rank_histories::get_rank_history,
        rank_histories::approve_rank_history,
        rank_histories::withdraw_rank_history,

        evaluations::submit_evaluation,
        evaluations::update_evaluation,
        evaluations::deactivate_evaluation,
        evaluations::list_evaluations,
        evaluations::get_evaluation,
        evaluations::evaluation_summary,

        admin::list_entities,
        admin::get_entity,
    ),
    components(
        schemas(
            crate::error::ApiError,
            crate::pagination::PaginationMeta,

            auth::RegisterRequest,
            auth::LoginRequest,
            auth::ChangePasswordRequest,
            auth::AuthResponse,
            auth::AccountResponse,
            accounts::UpdateAccountRequest,
            accounts::AccountsListResponse,

            crate::models::CatalogKind,
            crate::models::CatalogEntry,
            catalogs::CreateCatalogEntryRequest,
            catalogs::UpdateCatalogEntryRequest,
            catalogs::CatalogEntryResponse,
            catalogs::CatalogListResponse,

            crate::models::Department,
            crate::models::College,
            organization::CreateOrganizationUnitRequest,
            organization::UpdateOrganizationUnitRequest,
            organization::DepartmentResponse,
            organization::DepartmentsListResponse,
            organization::CollegeResponse,
            organization::CollegesListResponse,

            crate::models::SubRank,
            crate::models::SalaryGrade,
            crate::models::FacultyRank,
            ranks::CreateSubRankRequest,
            ranks::UpdateSubRankRequest,
            ranks::SubRankResponse,
            ranks::SubRanksListResponse,
            ranks::CreateSalaryGradeRequest,
            ranks::UpdateSalaryGradeRequest,
            ranks::SalaryGradeResponse,
            ranks::SalaryGradesListResponse,
            ranks::CreateFacultyRankRequest,
            ranks::UpdateFacultyRankRequest,
            ranks::FacultyRankResponse,
            ranks::FacultyRanksListResponse,

            crate::models::Document,
            documents::CreateDocumentRequest,
            documents::UpdateDocumentRequest,
            documents::DocumentResponse,
            documents::DocumentsListResponse,

            crate::models::Committee,
            committees::AssignCommitteeRequest,
            committees::UpdateCommitteeRequest,
            committees::CommitteeResponse,
            committees::CommitteesListResponse,

            crate::models::FacultyRankHistory,
            crate::models::RequestStatus,
            rank_histories::CreateRankHistoryRequest,
            rank_histories::ApproveRankHistoryRequest,
            rank_histories::RankHistoryResponse,
            rank_histories::RankHistoriesListResponse,

            crate::models::Evaluation,
            evaluations::SubmitEvaluationRequest,
            evaluations::UpdateEvaluationRequest,
            evaluations::EvaluationResponse,
            evaluations::EvaluationsListResponse,
            evaluations::EvaluationSummary,

            crate::admin::AdminEntity,
            crate::admin::FieldDescriptor,
            crate::admin::FieldKind,
            admin::AdminEntitiesResponse,
            admin::AdminEntityResponse,

            health::HealthResponse,
            health::ReadinessResponse,
            health::DatabaseStatus,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Session token from /auth/login or /auth/register.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_router() -> Router {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
