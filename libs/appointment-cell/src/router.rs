use axum::{
    Router,
    routing::{get, post},
};

use shared_utils::state::AppState;

use crate::handlers;

pub fn appointment_routes(state: AppState) -> Router {
    Router::new()
        .route("/dashboard", get(handlers::dashboard))
        .route(
            "/book_appointment",
            get(handlers::book_appointment_form).post(handlers::book_appointment),
        )
        // Both diagnosis routes share one handler and one guard.
        .route(
            "/view_appointment/{appointment_id}",
            get(handlers::view_appointment).post(handlers::submit_diagnosis),
        )
        .route("/submit_diagnosis/{appointment_id}", post(handlers::submit_diagnosis))
        .with_state(state)
}
