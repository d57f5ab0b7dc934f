//! Health check endpoint integration tests.
//!
//! These tests verify that the application starts correctly and the probes
//! are reachable without a session.

mod common;

use common::TestApp;
use serde_json::Value;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn health_check_returns_ok() {
    // Arrange
    let app = TestApp::spawn().await;

    // Act
    let response = app.get_public("/health").await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);

    let body = response.text().await.expect("Failed to read response body");
    assert_eq!(body, "OK");
}

#[tokio::test]
#[serial]
async fn health_status_reports_service() {
    // Arrange
    let app = TestApp::spawn().await;

    // Act
    let response = app.get_public("/health/status").await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "faculty-eval");
}

#[tokio::test]
#[serial]
async fn readiness_checks_database() {
    // Arrange
    let app = TestApp::spawn().await;

    // Act
    let response = app.get_public("/health/ready").await;

    // Assert - the test database is reachable
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["database"]["status"], "up");
}

#[tokio::test]
#[serial]
async fn nonexistent_endpoint_returns_error() {
    // Arrange
    let app = TestApp::spawn().await;

    // Act
    let response = app.get_public("/nonexistent-endpoint").await;

    // Assert
    let status = response.status().as_u16();
    assert!(
        status == 404 || status == 401,
        "Expected 404 or 401, got {}",
        status
    );
}
