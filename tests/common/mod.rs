// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use quiz_backend::{
    config::Config,
    models::question::NewChoice,
    routes,
    state::AppState,
    store::{MemoryStore, QuizStore},
    utils::password::hash_password,
};
use serde_json::{Value, json};

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    /// Does not follow redirects, so `POST /play` can be asserted on.
    pub client: reqwest::Client,
}

/// Spawns the app on a random port, backed by a fresh in-memory store.
pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());

    let config = Config {
        database_url: "memory://".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        admin_username: None,
        admin_password: None,
    };

    let app = routes::create_router(AppState::new(store.clone(), config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        store,
        client,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, username: &str) -> reqwest::Response {
        self.client
            .post(self.url("/register"))
            .json(&json!({
                "username": username,
                "password": PASSWORD,
                "password_confirm": PASSWORD,
            }))
            .send()
            .await
            .expect("Register failed")
    }

    pub async fn login(&self, username: &str) -> String {
        let body: Value = self
            .client
            .post(self.url("/login"))
            .json(&json!({ "username": username, "password": PASSWORD }))
            .send()
            .await
            .expect("Login failed")
            .json()
            .await
            .expect("Failed to parse login json");

        body["token"].as_str().expect("Token not found").to_string()
    }

    /// Registers and logs in a player, returning their token.
    pub async fn player(&self, username: &str) -> String {
        assert_eq!(self.register(username).await.status().as_u16(), 201);
        self.login(username).await
    }

    /// Creates an admin directly in the store and logs in.
    pub async fn admin(&self, username: &str) -> String {
        let hash = hash_password(PASSWORD).unwrap();
        self.store.create_user(username, &hash, "admin").await.unwrap();
        self.login(username).await
    }

    /// Seeds a question whose first choice is correct. Returns (question id, choice ids).
    pub async fn seed_question(&self, text: &str, choices: &[&str]) -> (i64, Vec<i64>) {
        let new_choices: Vec<NewChoice> = choices
            .iter()
            .enumerate()
            .map(|(i, c)| NewChoice {
                text: c.to_string(),
                is_correct: i == 0,
            })
            .collect();
        let (question, saved) = self.store.create_question(text, &new_choices).await.unwrap();
        (question.id, saved.iter().map(|c| c.id).collect())
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn play(&self, token: &str) -> Value {
        let response = self.get_auth("/play", token).await;
        assert_eq!(response.status().as_u16(), 200);
        response.json().await.unwrap()
    }

    pub async fn answer(&self, token: &str, question_pk: i64, choice_pk: i64) -> reqwest::Response {
        self.post_auth(
            "/play",
            token,
            &json!({ "question_pk": question_pk, "choice_pk": choice_pk }),
        )
        .await
    }
}
