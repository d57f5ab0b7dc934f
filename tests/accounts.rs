//! Account administration integration tests.

mod common;

use common::{expect_error, id_at, TestApp, PASSWORD};
use diesel::prelude::*;
use faculty_eval::schema::{committees, documents, evaluations, faculty_rank_histories};
use serde_json::{json, Value};
use serial_test::serial;
use uuid::Uuid;

#[tokio::test]
#[serial]
async fn staff_can_list_accounts() {
    // Arrange
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let faculty = app.create_faculty().await;

    // Act
    let response = app
        .get(
            &format!("/accounts?search={}", faculty.email),
            &staff.token,
        )
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], faculty.id.to_string());
    assert_eq!(body["pagination"]["total_count"], 1);
}

#[tokio::test]
#[serial]
async fn faculty_cannot_list_accounts() {
    let app = TestApp::spawn().await;
    let faculty = app.create_faculty().await;

    let response = app.get("/accounts", &faculty.token).await;

    expect_error(response, 403, "FORBIDDEN").await;
}

#[tokio::test]
#[serial]
async fn staff_can_update_account_profile() {
    // Arrange
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let faculty = app.create_faculty().await;
    let department_id = app.create_department(&staff).await;

    // Act
    let response = app
        .put(
            &format!("/accounts/{}", faculty.id),
            &staff.token,
            json!({
                "first_name": " Jose ",
                "faculty_id": "2020-00001",
                "department_id": department_id
            }),
        )
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["first_name"], "Jose");
    assert_eq!(body["last_name"], "Dela Cruz");
    assert_eq!(body["faculty_id"], "2020-00001");
    assert_eq!(body["department_id"], department_id.to_string());
}

#[tokio::test]
#[serial]
async fn update_rejects_blank_last_name() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let faculty = app.create_faculty().await;

    let response = app
        .put(
            &format!("/accounts/{}", faculty.id),
            &staff.token,
            json!({ "last_name": "  " }),
        )
        .await;

    let body = expect_error(response, 400, "VALIDATION_ERROR").await;
    assert_eq!(body["field"], "last_name");
}

#[tokio::test]
#[serial]
async fn empty_update_returns_account_unchanged() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let faculty = app.create_faculty().await;

    let response = app
        .put(&format!("/accounts/{}", faculty.id), &staff.token, json!({}))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], faculty.email);
}

#[tokio::test]
#[serial]
async fn staff_cannot_grant_superuser() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let faculty = app.create_faculty().await;

    let response = app
        .put(
            &format!("/accounts/{}", faculty.id),
            &staff.token,
            json!({ "is_superuser": true }),
        )
        .await;

    expect_error(response, 403, "FORBIDDEN").await;
}

#[tokio::test]
#[serial]
async fn staff_cannot_deactivate_themselves() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;

    let response = app
        .post(
            &format!("/accounts/{}/deactivate", staff.id),
            &staff.token,
            json!({}),
        )
        .await;

    expect_error(response, 409, "CONFLICT").await;
}

#[tokio::test]
#[serial]
async fn deactivated_account_can_be_reactivated() {
    // Arrange
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let faculty = app.create_faculty().await;

    // Act
    let response = app
        .post(
            &format!("/accounts/{}/deactivate", faculty.id),
            &staff.token,
            json!({}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["is_active"], false);

    let response = app
        .post(
            &format!("/accounts/{}/activate", faculty.id),
            &staff.token,
            json!({}),
        )
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let response = app
        .post_public(
            "/auth/login",
            json!({ "email": faculty.email, "password": PASSWORD }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
#[serial]
async fn inactive_accounts_are_hidden_from_default_list() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let faculty = app.create_faculty().await;
    app.post(
        &format!("/accounts/{}/deactivate", faculty.id),
        &staff.token,
        json!({}),
    )
    .await;

    let response = app
        .get(&format!("/accounts?search={}", faculty.email), &staff.token)
        .await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let response = app
        .get(
            &format!("/accounts?search={}&include_inactive=true", faculty.email),
            &staff.token,
        )
        .await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn delete_account_removes_it() {
    // Arrange
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let faculty = app.create_faculty().await;

    // Act
    let response = app
        .delete(&format!("/accounts/{}", faculty.id), &staff.token)
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 204);
    let response = app
        .get(&format!("/accounts/{}", faculty.id), &staff.token)
        .await;
    expect_error(response, 404, "NOT_FOUND").await;

    let response = app
        .delete(&format!("/accounts/{}", faculty.id), &staff.token)
        .await;
    expect_error(response, 404, "NOT_FOUND").await;
}

#[tokio::test]
#[serial]
async fn retired_department_keeps_its_accounts_readable() {
    // Arrange
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let faculty = app.create_faculty().await;
    let department_id = app.create_department(&staff).await;
    app.put(
        &format!("/accounts/{}", faculty.id),
        &staff.token,
        json!({ "department_id": department_id }),
    )
    .await;

    // Act
    let response = app
        .post(
            &format!("/departments/{}/deactivate", department_id),
            &staff.token,
            json!({}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    // Assert
    let response = app
        .get(&format!("/departments/{}", department_id), &faculty.token)
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["department"]["is_active"], false);

    let response = app
        .get(
            &format!("/accounts?department_id={}", department_id),
            &staff.token,
        )
        .await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"][0]["id"], faculty.id.to_string());
}

#[tokio::test]
#[serial]
async fn page_past_the_end_is_empty_not_an_error() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;

    let response = app
        .get(&format!("/accounts?page={}", i64::MAX), &staff.token)
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    assert_eq!(body["pagination"]["has_next"], false);
}

#[tokio::test]
#[serial]
async fn delete_account_removes_owned_records() {
    // Arrange
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let faculty = app.create_faculty().await;

    let role_id = app.create_catalog_entry(&staff, "committee-roles").await;
    let college_id = app.create_college(&staff).await;
    let response = app
        .post(
            "/committees",
            &staff.token,
            json!({
                "account_id": faculty.id,
                "role_id": role_id,
                "college_id": college_id,
                "has_credentials": true
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let response = app.post("/rank-histories", &faculty.token, json!({})).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let rank_history_id = id_at(&body["rank_history"]);
    let response = app
        .post(
            &format!("/rank-histories/{}/approve", rank_history_id),
            &staff.token,
            json!({}),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let document_id = app.create_document(&staff, 10.0).await;
    let response = app
        .post(
            "/evaluations",
            &staff.token,
            json!({ "account_id": faculty.id, "document_id": document_id, "score": 5.0 }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let response = app.get("/auth/me", &faculty.token).await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["current_rank_history_id"], rank_history_id.to_string());

    // Act
    let response = app
        .delete(&format!("/accounts/{}", faculty.id), &staff.token)
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 204);
    let mut conn = app.db_pool.get().unwrap();
    let seats: i64 = committees::table
        .filter(committees::account_id.eq(faculty.id))
        .count()
        .get_result(&mut conn)
        .unwrap();
    let requests: i64 = faculty_rank_histories::table
        .filter(faculty_rank_histories::account_id.eq(faculty.id))
        .count()
        .get_result(&mut conn)
        .unwrap();
    let scores: i64 = evaluations::table
        .filter(evaluations::account_id.eq(faculty.id))
        .count()
        .get_result(&mut conn)
        .unwrap();
    assert_eq!((seats, requests, scores), (0, 0, 0));

    // The scored document is a catalog row and survives
    let remaining: i64 = documents::table
        .find(document_id)
        .count()
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(remaining, 1);
}

#[tokio::test]
#[serial]
async fn catalog_row_referenced_by_document_cannot_be_removed() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let document_id = app.create_document(&staff, 10.0).await;
    let mut conn = app.db_pool.get().unwrap();
    let major_component_id: Uuid = documents::table
        .find(document_id)
        .select(documents::major_component_id)
        .first(&mut conn)
        .unwrap();

    let result = diesel::sql_query("DELETE FROM doc_major_components WHERE id = $1")
        .bind::<diesel::sql_types::Uuid, _>(major_component_id)
        .execute(&mut conn);

    assert!(result.is_err());

    let response = app
        .get(
            &format!("/catalogs/major-components/{}", major_component_id),
            &staff.token,
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
}
