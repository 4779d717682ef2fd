use axum::{
    extract::{rejection::FormRejection, Form, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

use shared_models::error::AppError;
use shared_models::flash::Flash;
use shared_utils::session::Session;
use shared_utils::state::AppState;

use crate::models::{LoginError, LoginForm, RegisterForm, RegistrationError};
use crate::services::CredentialService;
use crate::views;

fn to_dashboard() -> Response {
    Redirect::to("/dashboard").into_response()
}

#[axum::debug_handler(state = AppState)]
pub async fn index(mut session: Session) -> Response {
    if session.is_authenticated() {
        return to_dashboard();
    }

    let flashes = session.take_flashes();
    (session, views::index_page(&flashes)).into_response()
}

#[axum::debug_handler(state = AppState)]
pub async fn register_form(mut session: Session) -> Response {
    if session.is_authenticated() {
        return to_dashboard();
    }

    let flashes = session.take_flashes();
    (session, views::register_page(&flashes)).into_response()
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    mut session: Session,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Result<Response, AppError> {
    if session.is_authenticated() {
        return Ok(to_dashboard());
    }
    let Form(form) = form?;

    let service = CredentialService::new(&state);

    match service.register(form).await {
        Ok(_) => {
            session.flash(Flash::success("Registration successful. Please log in."));
            Ok((session, Redirect::to("/login")).into_response())
        }
        Err(e) if e.is_user_correctable() => {
            let mut flashes = session.take_flashes();
            flashes.push(Flash::danger(e.to_string()));
            Ok((session, views::register_page(&flashes)).into_response())
        }
        Err(RegistrationError::Hashing(msg)) => Err(AppError::Internal(msg)),
        Err(e) => Err(AppError::Database(e.to_string())),
    }
}

#[axum::debug_handler(state = AppState)]
pub async fn login_form(mut session: Session) -> Response {
    if session.is_authenticated() {
        return to_dashboard();
    }

    let flashes = session.take_flashes();
    (session, views::login_page(&flashes)).into_response()
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    mut session: Session,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    if session.is_authenticated() {
        return Ok(to_dashboard());
    }
    let Form(form) = form?;

    let service = CredentialService::new(&state);

    match service.authenticate(&form).await {
        Ok(user) => {
            session.establish(user.identity())?;
            session.flash(Flash::success("Login successful."));
            Ok((session, Redirect::to("/dashboard")).into_response())
        }
        Err(LoginError::Store(e)) => Err(AppError::Database(e.to_string())),
        Err(e) => {
            warn!("Login failed for {}: {}", form.email, e);
            let mut flashes = session.take_flashes();
            flashes.push(Flash::danger(e.to_string()));
            Ok((session, views::login_page(&flashes)).into_response())
        }
    }
}

#[axum::debug_handler(state = AppState)]
pub async fn logout(mut session: Session) -> Response {
    if let Some(identity) = session.current_identity() {
        debug!("Logging out {}", identity.email);
    }

    session.clear();
    session.flash(Flash::success("You have been logged out."));
    (session, Redirect::to("/")).into_response()
}
