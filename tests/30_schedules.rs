mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::TestApp;

fn recurring(school: &str) -> Value {
    json!({
        "schoolName": school,
        "className": "1A",
        "daysOfWeek": ["Mon", "Wed"],
        "startTime": "08:00",
        "endTime": "09:30",
        "expiryDate": "2025-06-30"
    })
}

fn one_off(date: &str) -> Value {
    json!({
        "schoolName": "A",
        "className": "2B",
        "date": date,
        "startTime": "13:00",
        "endTime": "14:00"
    })
}

#[tokio::test]
async fn recurring_schedule_round_trip() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;

    let (status, created) = app.post("/api/recurring-schedules", Some(&token), recurring("A")).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["id"].is_i64());
    assert_eq!(created["schoolName"], "A");
    assert_eq!(created["daysOfWeek"], json!(["Mon", "Wed"]));
    assert_eq!(created["expiryDate"], "2025-06-30");

    let (status, listed) = app.get("/api/recurring-schedules", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([created]));
    Ok(())
}

#[tokio::test]
async fn missing_field_is_named() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;

    let mut body = recurring("A");
    body.as_object_mut().expect("object").remove("startTime");
    let (status, error) = app.post("/api/recurring-schedules", Some(&token), body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "VALIDATION_ERROR");
    assert!(error["field_errors"].get("startTime").is_some());

    let (_, listed) = app.get("/api/recurring-schedules", Some(&token)).await?;
    assert_eq!(listed, json!([]));
    Ok(())
}

#[tokio::test]
async fn update_is_full_replace() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;
    let (_, created) = app.post("/api/recurring-schedules", Some(&token), recurring("A")).await?;
    let id = created["id"].as_i64().expect("id");

    let mut replacement = recurring("B");
    replacement.as_object_mut().expect("object").remove("expiryDate");
    let (status, updated) = app
        .put(&format!("/api/recurring-schedules/{}", id), Some(&token), replacement)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id);
    assert_eq!(updated["schoolName"], "B");
    assert!(updated["expiryDate"].is_null());
    Ok(())
}

#[tokio::test]
async fn update_of_missing_schedule_leaves_store_unchanged() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;
    let (_, created) = app.post("/api/recurring-schedules", Some(&token), recurring("A")).await?;

    let (status, body) = app
        .put("/api/recurring-schedules/9999", Some(&token), recurring("Z"))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Schedule not found");

    let (_, listed) = app.get("/api/recurring-schedules", Some(&token)).await?;
    assert_eq!(listed, json!([created]));
    Ok(())
}

#[tokio::test]
async fn one_off_lifecycle() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.user_token("teacher@example.com").await?;

    let (status, created) = app.post("/api/one-off-schedules", Some(&token), one_off("2025-03-01")).await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().expect("id");

    let (status, updated) = app
        .put(&format!("/api/one-off-schedules/{}", id), Some(&token), one_off("2025-03-08"))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["date"], "2025-03-08");

    let (status, body) = app.delete(&format!("/api/one-off-schedules/{}", id), Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Schedule deleted");

    let (status, _) = app.delete(&format!("/api/one-off-schedules/{}", id), Some(&token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = app.get("/api/one-off-schedules", Some(&token)).await?;
    assert_eq!(listed, json!([]));
    Ok(())
}

#[tokio::test]
async fn one_off_requires_date() -> Result<()> {
    let app = TestApp::spawn().await?;
    let token = app.admin_token().await?;
    let mut body = one_off("2025-03-01");
    body.as_object_mut().expect("object").remove("date");

    let (status, error) = app.post("/api/one-off-schedules", Some(&token), body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["field_errors"].get("date").is_some());
    Ok(())
}
