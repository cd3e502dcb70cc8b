// tests/api_tests.rs

mod common;

use common::{PASSWORD, spawn_app};
use serde_json::{Value, json};

#[tokio::test]
async fn index_points_to_the_quiz() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["play"], "/play");
    assert_eq!(body["leaderboard"], "/leaderboard");
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/register"))
        .header("content-type", "application/json")
        .body("{\"username\": ")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn unknown_path_is_404() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/random_path_that_does_not_exist"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Page not found");
}

#[tokio::test]
async fn register_works() {
    let app = spawn_app().await;

    let response = app.register("alice").await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "user");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn register_reports_field_errors() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/register"))
        .json(&json!({
            "username": "yo",
            "password": "password123",
            "password_confirm": "password124"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["fields"].get("username").is_some());
    assert!(body["fields"].get("password_confirm").is_some());
}

#[tokio::test]
async fn duplicate_username_is_conflict() {
    let app = spawn_app().await;

    assert_eq!(app.register("bob").await.status().as_u16(), 201);
    assert_eq!(app.register("bob").await.status().as_u16(), 409);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let app = spawn_app().await;
    app.register("carol").await;

    let response = app
        .client
        .post(app.url("/login"))
        .json(&json!({ "username": "carol", "password": "not-the-password" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn player_routes_require_authentication() {
    let app = spawn_app().await;

    for path in ["/play", "/user_home", "/submission_result/1"] {
        let response = app.client.get(app.url(path)).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 401, "{} should need a token", path);
    }

    let bad_token = app.get_auth("/play", "not.a.jwt").await;
    assert_eq!(bad_token.status().as_u16(), 401);
}

#[tokio::test]
async fn login_cookie_authenticates_and_logout_clears_it() {
    let app = spawn_app().await;
    app.register("dave").await;

    let login = app
        .client
        .post(app.url("/login"))
        .json(&json!({ "username": "dave", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    let set_cookie = login
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("login sets a cookie")
        .to_string();
    assert!(set_cookie.starts_with("quiz_token="));
    assert!(set_cookie.contains("HttpOnly"));

    let token: Value = login.json().await.unwrap();
    let cookie = format!("quiz_token={}", token["token"].as_str().unwrap());

    let home = app
        .client
        .get(app.url("/user_home"))
        .header(reqwest::header::COOKIE, cookie.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(home.status().as_u16(), 200);

    let logout = app
        .client
        .get(app.url("/logout"))
        .header(reqwest::header::COOKIE, cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(logout.status().as_u16(), 200);
    let cleared = logout
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("logout clears the cookie");
    assert!(cleared.starts_with("quiz_token="));
}

#[tokio::test]
async fn user_home_reports_fresh_profile() {
    let app = spawn_app().await;
    let token = app.player("erin").await;

    let body: Value = app.get_auth("/user_home", &token).await.json().await.unwrap();

    assert_eq!(body["username"], "erin");
    assert_eq!(body["total_score"], 0);
    assert_eq!(body["attempted_count"], 0);
    assert_eq!(body["correct_count"], 0);
}
