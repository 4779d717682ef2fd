use axum::{
    Router,
    routing::{get, post},
};

use shared_utils::state::AppState;

use crate::handlers;

pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/register", get(handlers::register_form).post(handlers::register))
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/logout", post(handlers::logout))
        .with_state(state)
}
