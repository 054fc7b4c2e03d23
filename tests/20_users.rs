mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn create_user_returns_created_view() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin_token().await?;

    let (status, body) = app
        .post(
            "/api/users",
            Some(&admin),
            json!({ "email": "t@example.com", "name": "T", "password": "secret1", "google_id": "" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "t@example.com");
    assert_eq!(body["role"], "User");
    assert!(body["google_id"].is_null());
    assert!(body.get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn weak_password_is_rejected_without_a_row() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin_token().await?;

    let (status, body) = app
        .post(
            "/api/users",
            Some(&admin),
            json!({ "email": "weak@example.com", "name": "Weak", "password": "12345" }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "WEAK_PASSWORD");

    let (_, users) = app.get("/api/users", Some(&admin)).await?;
    assert!(users.as_array().expect("list").iter().all(|u| u["email"] != "weak@example.com"));
    Ok(())
}

#[tokio::test]
async fn duplicate_email_conflicts() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin_token().await?;
    let user = json!({ "email": "dup@example.com", "name": "Dup" });

    let (status, _) = app.post("/api/users", Some(&admin), user.clone()).await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = app.post("/api/users", Some(&admin), user).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already exists");
    Ok(())
}

#[tokio::test]
async fn create_validates_fields_and_role() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin_token().await?;

    let (status, _) = app.post("/api/users", Some(&admin), json!({ "email": "x@example.com" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post("/api/users", Some(&admin), json!({ "email": "x@example.com", "name": "X", "role": "Owner" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ROLE");
    Ok(())
}

#[tokio::test]
async fn user_role_is_forbidden_from_admin_routes() -> Result<()> {
    let app = TestApp::spawn().await?;
    let user = app.user_token("plain@example.com").await?;

    let (status, body) = app.get("/api/users", Some(&user)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = app
        .post("/api/users", Some(&user), json!({ "email": "sneaky@example.com", "name": "S" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The handler never ran, so no row was written
    let admin = app.admin_token().await?;
    let (_, users) = app.get("/api/users", Some(&admin)).await?;
    assert!(users.as_array().expect("list").iter().all(|u| u["email"] != "sneaky@example.com"));

    // Session-only routes stay open to plain users
    let (status, _) = app.get("/api/recurring-schedules", Some(&user)).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn sole_admin_is_protected() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin_token().await?;
    let (_, users) = app.get("/api/users", Some(&admin)).await?;
    let admin_id = users[0]["id"].as_i64().expect("admin id");

    let (status, body) = app
        .put(&format!("/api/users/{}/role", admin_id), Some(&admin), json!({ "role": "User" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "LAST_ADMIN_PROTECTED");

    let (status, body) = app.delete(&format!("/api/users/{}", admin_id), Some(&admin)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "LAST_ADMIN_PROTECTED");
    Ok(())
}

#[tokio::test]
async fn deleting_one_of_two_admins_succeeds() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin_token().await?;

    let (status, second) = app
        .post(
            "/api/users",
            Some(&admin),
            json!({ "email": "second@example.com", "name": "Second", "role": "Admin" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    let second_id = second["id"].as_i64().expect("id");

    let (status, body) = app.delete(&format!("/api/users/{}", second_id), Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    let (status, _) = app.delete(&format!("/api/users/{}", second_id), Some(&admin)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, users) = app.get("/api/users", Some(&admin)).await?;
    let admins = users.as_array().expect("list").iter().filter(|u| u["role"] == "Admin").count();
    assert_eq!(admins, 1);
    Ok(())
}

#[tokio::test]
async fn promote_and_demote() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin_token().await?;
    let (_, created) = app
        .post("/api/users", Some(&admin), json!({ "email": "p@example.com", "name": "P" }))
        .await?;
    let id = created["id"].as_i64().expect("id");

    let (status, body) = app
        .put(&format!("/api/users/{}/role", id), Some(&admin), json!({ "role": "Admin" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "Admin");

    let (status, body) = app
        .put(&format!("/api/users/{}/role", id), Some(&admin), json!({ "role": "User" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "User");

    let (status, _) = app
        .put("/api/users/9999/role", Some(&admin), json!({ "role": "Admin" }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .put(&format!("/api/users/{}/role", id), Some(&admin), json!({ "role": "admin" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ROLE");
    Ok(())
}

#[tokio::test]
async fn change_password_applies_to_caller() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin_token().await?;

    let (status, body) = app
        .post("/api/users/change-password", Some(&admin), json!({ "new_password": "short" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "WEAK_PASSWORD");

    let (status, body) = app
        .post("/api/users/change-password", Some(&admin), json!({ "new_password": "much-longer" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password updated successfully");

    let (status, _) = app
        .post("/api/auth/login", None, json!({ "username": "admin", "password": "password" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app
        .post("/api/auth/login", None, json!({ "username": "admin", "password": "much-longer" }))
        .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn non_numeric_id_is_bad_request() -> Result<()> {
    let app = TestApp::spawn().await?;
    let admin = app.admin_token().await?;
    let (status, body) = app.delete("/api/users/abc", Some(&admin)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    Ok(())
}
