use axum::{
    extract::{rejection::FormRejection, Form, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use auth_cell::services::CredentialService;
use shared_models::auth::{Role, SessionIdentity};
use shared_models::error::AppError;
use shared_models::flash::Flash;
use shared_utils::session::Session;
use shared_utils::state::AppState;

use crate::models::{AppointmentError, BookAppointmentForm, DiagnosisRecord};
use crate::services::{AppointmentBookingService, DiagnosisService};
use crate::views;

/// The session identity when it carries `role`, otherwise the notice to
/// flash before redirecting to the login page.
fn require_role(
    session: &Session,
    role: Role,
    error: AppointmentError,
) -> Result<SessionIdentity, Flash> {
    match session.current_identity() {
        Some(identity) if identity.role == role => Ok(identity.clone()),
        _ => Err(Flash::danger(error.to_string())),
    }
}

fn redirect_with(mut session: Session, flash: Flash, to: &str) -> Response {
    session.flash(flash);
    (session, Redirect::to(to)).into_response()
}

/// Maps diagnosis-route failures: user-correctable ones become a notice on
/// the dashboard, store failures a 500.
fn diagnosis_failure(session: Session, error: AppointmentError) -> Result<Response, AppError> {
    match error {
        AppointmentError::Store(e) => Err(AppError::Database(e.to_string())),
        other => {
            let to = if matches!(other, AppointmentError::DoctorsOnly) { "/login" } else { "/dashboard" };
            Ok(redirect_with(session, Flash::danger(other.to_string()), to))
        }
    }
}

#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    mut session: Session,
) -> Result<Response, AppError> {
    let Some(identity) = session.current_identity().cloned() else {
        return Ok(redirect_with(session, Flash::danger("Please log in to continue."), "/login"));
    };

    let service = AppointmentBookingService::new(&state);
    let appointments = service.list_for(&identity).await.map_err(|e| match e {
        AppointmentError::Store(e) => AppError::Database(e.to_string()),
        other => AppError::Internal(other.to_string()),
    })?;
    debug!("Dashboard for {} lists {} appointments", identity.email, appointments.len());

    let flashes = session.take_flashes();
    let page = match identity.role {
        Role::Doctor => views::doctor_dashboard(&identity, &flashes, &appointments),
        Role::Patient => views::patient_dashboard(&identity, &flashes, &appointments),
    };

    Ok((session, page).into_response())
}

#[axum::debug_handler]
pub async fn book_appointment_form(
    State(state): State<AppState>,
    mut session: Session,
) -> Result<Response, AppError> {
    let identity = match require_role(&session, Role::Patient, AppointmentError::PatientsOnly) {
        Ok(identity) => identity,
        Err(flash) => return Ok(redirect_with(session, flash, "/login")),
    };

    let doctors = CredentialService::new(&state)
        .list_doctors()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let flashes = session.take_flashes();
    Ok((session, views::book_appointment_page(&identity, &flashes, &doctors)).into_response())
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppState>,
    session: Session,
    form: Result<Form<BookAppointmentForm>, FormRejection>,
) -> Result<Response, AppError> {
    let identity = match require_role(&session, Role::Patient, AppointmentError::PatientsOnly) {
        Ok(identity) => identity,
        Err(flash) => return Ok(redirect_with(session, flash, "/login")),
    };
    let Form(form) = form?;

    let service = AppointmentBookingService::new(&state);
    match service.book(&identity, form).await {
        Ok(_) => Ok(redirect_with(session, Flash::success("Appointment booked successfully."), "/dashboard")),
        Err(AppointmentError::Store(e)) => Err(AppError::Database(e.to_string())),
        Err(e) => Ok(redirect_with(session, Flash::danger(e.to_string()), "/login")),
    }
}

#[axum::debug_handler]
pub async fn view_appointment(
    State(state): State<AppState>,
    mut session: Session,
    Path(appointment_id): Path<String>,
) -> Result<Response, AppError> {
    let identity = match require_role(&session, Role::Doctor, AppointmentError::DoctorsOnly) {
        Ok(identity) => identity,
        Err(flash) => return Ok(redirect_with(session, flash, "/login")),
    };

    let service = DiagnosisService::new(&state);
    match service.appointment_for_doctor(&identity, &appointment_id).await {
        Ok(appointment) => {
            let flashes = session.take_flashes();
            let page = views::view_appointment_page(&identity, &flashes, &appointment_id, appointment.as_ref());
            Ok((session, page).into_response())
        }
        Err(e) => diagnosis_failure(session, e),
    }
}

/// Serves POSTs to both `/view_appointment/{id}` and `/submit_diagnosis/{id}`.
#[axum::debug_handler]
pub async fn submit_diagnosis(
    State(state): State<AppState>,
    session: Session,
    Path(appointment_id): Path<String>,
    record: Result<Form<DiagnosisRecord>, FormRejection>,
) -> Result<Response, AppError> {
    let identity = match require_role(&session, Role::Doctor, AppointmentError::DoctorsOnly) {
        Ok(identity) => identity,
        Err(flash) => return Ok(redirect_with(session, flash, "/login")),
    };
    let Form(record) = record?;

    let service = DiagnosisService::new(&state);
    match service.submit(&identity, &appointment_id, &record).await {
        Ok(()) => Ok(redirect_with(session, Flash::success("Diagnosis submitted successfully."), "/dashboard")),
        Err(e) => diagnosis_failure(session, e),
    }
}
