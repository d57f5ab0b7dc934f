//! Registration, login and session integration tests.

mod common;

use common::{expect_error, TestApp, PASSWORD};
use serde_json::{json, Value};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn register_returns_account_and_token() {
    let app = TestApp::spawn().await;
    let email = TestApp::unique_email();

    let response = app
        .post_public(
            "/auth/register",
            json!({
                "email": email,
                "password": PASSWORD,
                "first_name": "  Maria ",
                "last_name": "Santos",
                "faculty_id": "2019-00123"
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["account"]["email"], email);
    assert_eq!(body["account"]["first_name"], "Maria");
    assert_eq!(body["account"]["faculty_id"], "2019-00123");
    assert_eq!(body["account"]["is_staff"], false);
    assert!(body["account"].get("password_hash").is_none());
    assert!(body["access_token"].as_str().is_some());
}

#[tokio::test]
#[serial]
async fn register_normalizes_email_case() {
    let app = TestApp::spawn().await;
    let email = TestApp::unique_email();

    let account = app.register(&email.to_uppercase()).await;

    assert_eq!(account.email, email);
}

#[tokio::test]
#[serial]
async fn register_rejects_duplicate_email_regardless_of_case() {
    let app = TestApp::spawn().await;
    let email = TestApp::unique_email();
    app.register(&email).await;

    let response = app
        .post_public(
            "/auth/register",
            json!({
                "email": email.to_uppercase(),
                "password": PASSWORD,
                "first_name": "Other",
                "last_name": "Person"
            }),
        )
        .await;

    let body = expect_error(response, 409, "DUPLICATE_KEY").await;
    assert_eq!(body["field"], "email");
}

#[tokio::test]
#[serial]
async fn register_rejects_invalid_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post_public(
            "/auth/register",
            json!({
                "email": "not-an-email",
                "password": PASSWORD,
                "first_name": "Juan",
                "last_name": "Dela Cruz"
            }),
        )
        .await;

    let body = expect_error(response, 400, "VALIDATION_ERROR").await;
    assert_eq!(body["field"], "email");
}

#[tokio::test]
#[serial]
async fn register_rejects_short_password() {
    let app = TestApp::spawn().await;

    let response = app
        .post_public(
            "/auth/register",
            json!({
                "email": TestApp::unique_email(),
                "password": "short",
                "first_name": "Juan",
                "last_name": "Dela Cruz"
            }),
        )
        .await;

    let body = expect_error(response, 400, "VALIDATION_ERROR").await;
    assert_eq!(body["field"], "password");
}

#[tokio::test]
#[serial]
async fn register_rejects_blank_first_name() {
    let app = TestApp::spawn().await;

    let response = app
        .post_public(
            "/auth/register",
            json!({
                "email": TestApp::unique_email(),
                "password": PASSWORD,
                "first_name": "   ",
                "last_name": "Dela Cruz"
            }),
        )
        .await;

    let body = expect_error(response, 400, "VALIDATION_ERROR").await;
    assert_eq!(body["field"], "first_name");
}

#[tokio::test]
#[serial]
async fn register_with_unknown_department_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .post_public(
            "/auth/register",
            json!({
                "email": TestApp::unique_email(),
                "password": PASSWORD,
                "first_name": "Juan",
                "last_name": "Dela Cruz",
                "department_id": uuid::Uuid::new_v4()
            }),
        )
        .await;

    expect_error(response, 404, "NOT_FOUND").await;
}

#[tokio::test]
#[serial]
async fn login_succeeds_with_any_email_case() {
    let app = TestApp::spawn().await;
    let account = app.create_faculty().await;

    let response = app
        .post_public(
            "/auth/login",
            json!({ "email": account.email.to_uppercase(), "password": PASSWORD }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["account"]["id"], account.id.to_string());
    assert!(body["account"]["last_login"].as_str().is_some());
}

#[tokio::test]
#[serial]
async fn login_with_wrong_password_is_invalid_credentials() {
    let app = TestApp::spawn().await;
    let account = app.create_faculty().await;

    let response = app
        .post_public(
            "/auth/login",
            json!({ "email": account.email, "password": "wrong-password" }),
        )
        .await;

    expect_error(response, 401, "INVALID_CREDENTIALS").await;
}

#[tokio::test]
#[serial]
async fn login_with_unknown_email_is_invalid_credentials() {
    let app = TestApp::spawn().await;

    let response = app
        .post_public(
            "/auth/login",
            json!({ "email": TestApp::unique_email(), "password": PASSWORD }),
        )
        .await;

    expect_error(response, 401, "INVALID_CREDENTIALS").await;
}

#[tokio::test]
#[serial]
async fn login_to_deactivated_account_is_forbidden() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let faculty = app.create_faculty().await;

    let response = app
        .post(
            &format!("/accounts/{}/deactivate", faculty.id),
            &staff.token,
            json!({}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let response = app
        .post_public(
            "/auth/login",
            json!({ "email": faculty.email, "password": PASSWORD }),
        )
        .await;
    expect_error(response, 403, "ACCOUNT_INACTIVE").await;

    // The wrong password still reads as bad credentials.
    let response = app
        .post_public(
            "/auth/login",
            json!({ "email": faculty.email, "password": "wrong-password" }),
        )
        .await;
    expect_error(response, 401, "INVALID_CREDENTIALS").await;
}

#[tokio::test]
#[serial]
async fn existing_session_stops_working_after_deactivation() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let faculty = app.create_faculty().await;

    assert_eq!(app.get("/auth/me", &faculty.token).await.status().as_u16(), 200);

    app.post(
        &format!("/accounts/{}/deactivate", faculty.id),
        &staff.token,
        json!({}),
    )
    .await;

    let response = app.get("/auth/me", &faculty.token).await;
    expect_error(response, 403, "ACCOUNT_INACTIVE").await;
}

#[tokio::test]
#[serial]
async fn me_requires_bearer_token() {
    let app = TestApp::spawn().await;

    let response = app.get_public("/auth/me").await;
    expect_error(response, 401, "MISSING_AUTH_HEADER").await;

    let response = app.get("/auth/me", "not-a-token").await;
    expect_error(response, 401, "INVALID_TOKEN").await;
}

#[tokio::test]
#[serial]
async fn me_returns_current_account() {
    let app = TestApp::spawn().await;
    let account = app.create_faculty().await;

    let response = app.get("/auth/me", &account.token).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], account.id.to_string());
    assert_eq!(body["email"], account.email);
}

#[tokio::test]
#[serial]
async fn change_password_requires_current_password() {
    let app = TestApp::spawn().await;
    let account = app.create_faculty().await;

    let response = app
        .put(
            "/auth/password",
            &account.token,
            json!({ "current_password": "wrong-password", "new_password": "new-password-1" }),
        )
        .await;
    expect_error(response, 401, "INVALID_CREDENTIALS").await;

    let response = app
        .put(
            "/auth/password",
            &account.token,
            json!({ "current_password": PASSWORD, "new_password": "new-password-1" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 204);

    let response = app
        .post_public(
            "/auth/login",
            json!({ "email": account.email, "password": "new-password-1" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
#[serial]
async fn register_with_every_field_reads_back_identically() {
    // Arrange
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let college_id = app.create_college(&staff).await;
    let department_id = app.create_department(&staff).await;
    let email = TestApp::unique_email();
    let plm_email = TestApp::unique_email();
    let response = app
        .post_public(
            "/auth/register",
            json!({
                "email": email,
                "password": PASSWORD,
                "first_name": "Maria",
                "middle_name": "Reyes",
                "last_name": "Santos",
                "faculty_id": "2019-00456",
                "plm_email": plm_email,
                "college_id": college_id,
                "department_id": department_id,
                "date_of_birth": "1985-03-14",
                "contact_number": "+63 912 345 6789",
                "address": "Intramuros, Manila"
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let token = body["access_token"].as_str().unwrap().to_string();
    let created = body["account"].clone();

    // Act
    let response = app.get("/auth/me", &token).await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let account: Value = response.json().await.unwrap();
    assert_eq!(account["email"], email);
    assert_eq!(account["first_name"], "Maria");
    assert_eq!(account["middle_name"], "Reyes");
    assert_eq!(account["last_name"], "Santos");
    assert_eq!(account["faculty_id"], "2019-00456");
    assert_eq!(account["plm_email"], plm_email);
    assert_eq!(account["college_id"], college_id.to_string());
    assert_eq!(account["department_id"], department_id.to_string());
    assert_eq!(account["date_of_birth"], "1985-03-14");
    assert_eq!(account["contact_number"], "+63 912 345 6789");
    assert_eq!(account["address"], "Intramuros, Manila");
    assert!(account["current_rank_history_id"].is_null());

    let response = app
        .get(
            &format!("/accounts/{}", account["id"].as_str().unwrap()),
            &staff.token,
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let read_back: Value = response.json().await.unwrap();
    for field in [
        "id",
        "email",
        "first_name",
        "middle_name",
        "last_name",
        "faculty_id",
        "plm_email",
        "college_id",
        "department_id",
        "date_of_birth",
        "contact_number",
        "address",
        "date_added",
    ] {
        assert_eq!(read_back[field], created[field], "field {} differs", field);
    }
}

#[tokio::test]
#[serial]
async fn padded_email_is_trimmed_on_register_and_login() {
    let app = TestApp::spawn().await;
    let email = TestApp::unique_email();

    let response = app
        .post_public(
            "/auth/register",
            json!({
                "email": format!("  {}  ", email.to_uppercase()),
                "password": PASSWORD,
                "first_name": "Maria",
                "last_name": "Santos"
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["account"]["email"], email);

    let response = app
        .post_public(
            "/auth/login",
            json!({ "email": format!(" {} ", email), "password": PASSWORD }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
}
