//! Startup seeding of the administrator account.

use diesel::prelude::*;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    auth::password::PasswordService,
    config::BootstrapConfig,
    error::DomainError,
    models::{account::normalize_email, NewAccount},
    schema::accounts,
    DbPool,
};

/// Ensures the configured administrator exists with staff and superuser
/// flags. An existing account keeps its password; only flags are raised.
pub fn ensure_admin(
    pool: &DbPool,
    bootstrap: &BootstrapConfig,
    password_hash_cost: u32,
) -> Result<Option<Uuid>, DomainError> {
    let Some((email, password)) = bootstrap.admin_credentials() else {
        return Ok(None);
    };
    let email = normalize_email(email);

    let mut conn = pool.get().map_err(|e| {
        error!(error = %e, "Database connection error");
        DomainError::Database(e.to_string())
    })?;

    let existing: Option<Uuid> = accounts::table
        .filter(accounts::email.eq(&email))
        .select(accounts::id)
        .first(&mut conn)
        .optional()?;

    if let Some(id) = existing {
        diesel::update(accounts::table.find(id))
            .set((
                accounts::is_staff.eq(true),
                accounts::is_superuser.eq(true),
                accounts::is_active.eq(true),
            ))
            .execute(&mut conn)?;
        info!(account_id = %id, email = %email, "Bootstrap administrator already present");
        return Ok(Some(id));
    }

    let password_hash = PasswordService::hash_password_with_cost(password, password_hash_cost)
        .map_err(|e| DomainError::Database(format!("Password hashing failed: {}", e)))?;

    let id: Uuid = diesel::insert_into(accounts::table)
        .values(&NewAccount {
            email: email.clone(),
            password_hash,
            first_name: bootstrap.admin_first_name.clone(),
            middle_name: String::new(),
            last_name: bootstrap.admin_last_name.clone(),
            faculty_id: String::new(),
            plm_email: String::new(),
            college_id: None,
            department_id: None,
            date_of_birth: None,
            contact_number: String::new(),
            address: String::new(),
            is_staff: true,
            is_superuser: true,
        })
        .returning(accounts::id)
        .get_result(&mut conn)?;

    info!(account_id = %id, email = %email, "Bootstrap administrator created");
    Ok(Some(id))
}
