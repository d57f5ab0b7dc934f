//! Administrable-entity descriptor integration tests.

mod common;

use common::{expect_error, TestApp};
use serde_json::Value;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn staff_lists_entity_descriptors() {
    // Arrange
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;

    // Act
    let response = app.get("/admin/entities", &staff.token).await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let entities = body["entities"].as_array().unwrap();
    assert!(entities.iter().any(|e| e["key"] == "accounts"));
    assert!(entities.iter().any(|e| e["key"] == "evaluations"));
}

#[tokio::test]
#[serial]
async fn entity_descriptor_lists_reference_fields() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;

    let response = app.get("/admin/entities/accounts", &staff.token).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["entity"]["route"], "/accounts");
    let department = body["entity"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["name"] == "department_id")
        .cloned()
        .unwrap();
    assert_eq!(department["kind"], "reference");
    assert_eq!(department["references"], "departments");
}

#[tokio::test]
#[serial]
async fn unknown_entity_is_not_found() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;

    let response = app.get("/admin/entities/spaceships", &staff.token).await;

    expect_error(response, 404, "NOT_FOUND").await;
}

#[tokio::test]
#[serial]
async fn faculty_cannot_read_descriptors() {
    let app = TestApp::spawn().await;
    let faculty = app.create_faculty().await;

    let response = app.get("/admin/entities", &faculty.token).await;

    expect_error(response, 403, "FORBIDDEN").await;
}
