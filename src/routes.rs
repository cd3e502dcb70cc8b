// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{self, admin, auth, profile, quiz},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Public routes: the index, identity endpoints and the leaderboard.
/// * Player routes require a valid token (bearer header or cookie).
/// * Authoring routes additionally require the admin role.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    let public_routes = Router::new()
        .route("/", get(handlers::home))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/leaderboard", get(quiz::leaderboard));

    let player_routes = Router::new()
        .route("/user_home", get(profile::user_home))
        .route("/play", get(quiz::play_question).post(quiz::submit_answer))
        .route(
            "/submission_result/{attempted_question_pk}",
            get(quiz::submission_result),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Admin check runs after authentication (layers apply outside in).
    let admin_routes = Router::new()
        .route("/questions", post(admin::create_question))
        .route("/classrooms", post(admin::create_classroom))
        .route(
            "/classrooms/{id}",
            get(admin::get_classroom).put(admin::update_classroom),
        )
        .route("/classrooms/{id}/examinees", post(admin::add_examinee))
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(player_routes)
        .merge(admin_routes)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
