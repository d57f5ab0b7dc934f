//! Committee assignment integration tests.

mod common;

use common::{expect_error, id_at, TestAccount, TestApp};
use serde_json::{json, Value};
use serial_test::serial;
use uuid::Uuid;

async fn assign(app: &TestApp, staff: &TestAccount, account_id: Uuid) -> Value {
    let role_id = app.create_catalog_entry(staff, "committee-roles").await;
    let college_id = app.create_college(staff).await;

    let response = app
        .post(
            "/committees",
            &staff.token,
            json!({
                "account_id": account_id,
                "role_id": role_id,
                "college_id": college_id,
                "has_credentials": true
            }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    body["committee"].clone()
}

#[tokio::test]
#[serial]
async fn staff_assigns_committee_seat() {
    // Arrange
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let faculty = app.create_faculty().await;

    // Act
    let committee = assign(&app, &staff, faculty.id).await;

    // Assert
    assert_eq!(committee["account_id"], faculty.id.to_string());
    assert_eq!(committee["has_credentials"], true);
    assert_eq!(committee["is_active"], true);

    let response = app.get("/committees", &faculty.token).await;
    let body: Value = response.json().await.unwrap();
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], committee["id"]);
}

#[tokio::test]
#[serial]
async fn faculty_cannot_assign_committee_seat() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let faculty = app.create_faculty().await;
    let role_id = app.create_catalog_entry(&staff, "committee-roles").await;
    let college_id = app.create_college(&staff).await;

    let response = app
        .post(
            "/committees",
            &faculty.token,
            json!({
                "account_id": faculty.id,
                "role_id": role_id,
                "college_id": college_id
            }),
        )
        .await;

    expect_error(response, 403, "FORBIDDEN").await;
}

#[tokio::test]
#[serial]
async fn assignment_to_unknown_account_is_not_found() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let role_id = app.create_catalog_entry(&staff, "committee-roles").await;
    let college_id = app.create_college(&staff).await;

    let response = app
        .post(
            "/committees",
            &staff.token,
            json!({
                "account_id": Uuid::new_v4(),
                "role_id": role_id,
                "college_id": college_id
            }),
        )
        .await;

    expect_error(response, 404, "NOT_FOUND").await;
}

#[tokio::test]
#[serial]
async fn other_members_seat_is_not_visible() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let member = app.create_faculty().await;
    let outsider = app.create_faculty().await;
    let committee = assign(&app, &staff, member.id).await;
    let committee_id = id_at(&committee);

    let response = app
        .get(&format!("/committees/{}", committee_id), &outsider.token)
        .await;
    expect_error(response, 404, "NOT_FOUND").await;

    let response = app
        .get(&format!("/committees/{}", committee_id), &member.token)
        .await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
#[serial]
async fn update_changes_credentials() {
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let faculty = app.create_faculty().await;
    let committee = assign(&app, &staff, faculty.id).await;

    let response = app
        .put(
            &format!("/committees/{}", id_at(&committee)),
            &staff.token,
            json!({ "has_credentials": false }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["committee"]["has_credentials"], false);
    assert_eq!(body["committee"]["role_id"], committee["role_id"]);
}

#[tokio::test]
#[serial]
async fn revoke_is_idempotent() {
    // Arrange
    let app = TestApp::spawn().await;
    let staff = app.create_staff().await;
    let faculty = app.create_faculty().await;
    let committee = assign(&app, &staff, faculty.id).await;
    let path = format!("/committees/{}/revoke", id_at(&committee));

    // Act
    let first = app.post(&path, &staff.token, json!({})).await;
    let second = app.post(&path, &staff.token, json!({})).await;

    // Assert
    assert_eq!(first.status().as_u16(), 200);
    assert_eq!(second.status().as_u16(), 200);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["committee"]["is_active"], false);

    let response = app.get("/committees", &faculty.token).await;
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}
