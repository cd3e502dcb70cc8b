// tests/admin_tests.rs

mod common;

use common::spawn_app;
use serde_json::{Value, json};

fn question_body() -> Value {
    json!({
        "text": "<b>Which</b> keyword declares a constant?<script>alert(1)</script>",
        "choices": [
            { "text": "const", "is_correct": true },
            { "text": "let" },
            { "text": "static mut", "is_correct": false }
        ]
    })
}

#[tokio::test]
async fn players_cannot_author_content() {
    let app = spawn_app().await;
    let token = app.player("player1").await;

    let response = app.post_auth("/questions", &token, &question_body()).await;
    assert_eq!(response.status().as_u16(), 403);

    let response = app
        .post_auth("/classrooms", &token, &json!({ "name": "7B" }))
        .await;
    assert_eq!(response.status().as_u16(), 403);

    let anonymous = app
        .client
        .post(app.url("/questions"))
        .json(&question_body())
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status().as_u16(), 401);
}

#[tokio::test]
async fn admin_creates_sanitised_question_that_players_get_served() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;

    let response = app.post_auth("/questions", &admin, &question_body()).await;
    assert_eq!(response.status().as_u16(), 201);

    let created: Value = response.json().await.unwrap();
    assert_eq!(created["text"], "<b>Which</b> keyword declares a constant?");
    let choices = created["choices"].as_array().unwrap();
    assert_eq!(choices.len(), 3);
    assert_eq!(
        choices.iter().filter(|c| c["is_correct"] == true).count(),
        1
    );

    let player = app.player("player2").await;
    let served = app.play(&player).await;
    assert_eq!(served["question"]["id"], created["id"]);
}

#[tokio::test]
async fn question_needs_exactly_one_correct_choice() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;

    let two_correct = json!({
        "text": "Pick one",
        "choices": [
            { "text": "a", "is_correct": true },
            { "text": "b", "is_correct": true }
        ]
    });
    let response = app.post_auth("/questions", &admin, &two_correct).await;
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["fields"].get("choices").is_some());

    let none_correct = json!({
        "text": "Pick one",
        "choices": [{ "text": "a" }, { "text": "b" }]
    });
    let response = app.post_auth("/questions", &admin, &none_correct).await;
    assert_eq!(response.status().as_u16(), 400);

    let player = app.player("player3").await;
    assert!(app.play(&player).await["question"].is_null());
}

#[tokio::test]
async fn classroom_create_update_and_enrol() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;

    let created: Value = app
        .post_auth(
            "/classrooms",
            &admin,
            &json!({ "name": "7B", "description": "Morning group" }),
        )
        .await
        .json()
        .await
        .unwrap();
    let id = created["id"].as_i64().unwrap();

    let updated = app
        .put_auth(
            &format!("/classrooms/{}", id),
            &admin,
            &json!({ "name": "7C", "description": "Moved" }),
        )
        .await;
    assert_eq!(updated.status().as_u16(), 200);

    let register: Value = app.register("student").await.json().await.unwrap();
    let user_id = register["id"].as_i64().unwrap();

    let enrol = app
        .post_auth(
            &format!("/classrooms/{}/examinees", id),
            &admin,
            &json!({ "name": "Student One", "user_id": user_id }),
        )
        .await;
    assert_eq!(enrol.status().as_u16(), 201);

    let again = app
        .post_auth(
            &format!("/classrooms/{}/examinees", id),
            &admin,
            &json!({ "name": "Student Again", "user_id": user_id }),
        )
        .await;
    assert_eq!(again.status().as_u16(), 409);

    let detail: Value = app
        .get_auth(&format!("/classrooms/{}", id), &admin)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(detail["name"], "7C");
    assert_eq!(detail["description"], "Moved");
    assert_eq!(detail["examinees"].as_array().unwrap().len(), 1);
    assert_eq!(detail["examinees"][0]["user_id"], user_id);
}

#[tokio::test]
async fn unknown_classroom_is_404_and_invalid_form_is_400() {
    let app = spawn_app().await;
    let admin = app.admin("root").await;

    let missing = app
        .put_auth("/classrooms/424242", &admin, &json!({ "name": "X" }))
        .await;
    assert_eq!(missing.status().as_u16(), 404);

    let missing = app.get_auth("/classrooms/424242", &admin).await;
    assert_eq!(missing.status().as_u16(), 404);

    let missing = app
        .post_auth("/classrooms/424242/examinees", &admin, &json!({ "name": "X" }))
        .await;
    assert_eq!(missing.status().as_u16(), 404);

    let invalid = app
        .post_auth("/classrooms", &admin, &json!({ "name": "" }))
        .await;
    assert_eq!(invalid.status().as_u16(), 400);
    let body: Value = invalid.json().await.unwrap();
    assert!(body["fields"].get("name").is_some());
}
