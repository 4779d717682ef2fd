use axum::http::StatusCode;

use appointment_cell::models::{Appointment, AppointmentStatus};
use appointment_cell::router::appointment_routes;
use appointment_cell::services::AppointmentRecords;
use auth_cell::models::RegisterForm;
use auth_cell::services::CredentialService;
use shared_models::auth::{Role, SessionIdentity};
use shared_utils::state::AppState;
use shared_utils::test_utils::{SessionTestUtils, TestBrowser, TestConfig};

fn create_test_app() -> (AppState, TestBrowser) {
    let (state, _) = TestConfig::default().to_memory_state();
    let browser = TestBrowser::new(appointment_routes(state.clone()));
    (state, browser)
}

fn log_in(browser: &mut TestBrowser, state: &AppState, email: &str, role: Role) {
    let cookie = SessionTestUtils::session_cookie(
        &SessionIdentity::new(email, role),
        &state.config.session_secret,
    );
    let (name, value) = cookie.split_once('=').unwrap();
    browser.set_cookie(name, value);
}

async fn seed_appointment(state: &AppState, doctor_email: &str, patient_email: &str) -> Appointment {
    let appointment = Appointment::new_pending(
        doctor_email.to_string(),
        patient_email.to_string(),
        "headache".to_string(),
    );
    AppointmentRecords::new(state).put(&appointment).await.unwrap();
    appointment
}

async fn seed_doctor(state: &AppState, email: &str, name: &str, specialization: &str) {
    CredentialService::new(state)
        .register(RegisterForm {
            name: name.to_string(),
            email: email.to_string(),
            password: "secret2".to_string(),
            age: 50,
            gender: "male".to_string(),
            role: Role::Doctor,
            specialization: Some(specialization.to_string()),
        })
        .await
        .unwrap();
}

fn diagnosis_form(diagnosis: &str) -> Vec<(&'static str, String)> {
    vec![
        ("diagnosis", diagnosis.to_string()),
        ("treatment_plan", "rest".to_string()),
        ("prescription", "aspirin".to_string()),
    ]
}

#[tokio::test]
async fn test_dashboard_requires_login() {
    let (_, mut browser) = create_test_app();

    let response = browser.get("/dashboard").await;

    assert!(response.is_redirect_to("/login"));
}

#[tokio::test]
async fn test_dashboard_with_tampered_cookie_requires_login() {
    let (_, mut browser) = create_test_app();
    browser.set_cookie("medtrack_session", "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJ4In0.c2ln");

    let response = browser.get("/dashboard").await;

    assert!(response.is_redirect_to("/login"));
}

#[tokio::test]
async fn test_empty_patient_dashboard() {
    let (state, mut browser) = create_test_app();
    log_in(&mut browser, &state, "p@x.com", Role::Patient);

    let response = browser.get("/dashboard").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("My appointments"));
    assert!(response.body.contains("You have no appointments."));
}

#[tokio::test]
async fn test_doctor_dashboard_lists_only_own_appointments() {
    let (state, mut browser) = create_test_app();
    seed_appointment(&state, "d@x.com", "alice@x.com").await;
    seed_appointment(&state, "other@x.com", "bob@x.com").await;
    log_in(&mut browser, &state, "d@x.com", Role::Doctor);

    let response = browser.get("/dashboard").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Doctor dashboard"));
    assert!(response.body.contains("alice@x.com"));
    assert!(!response.body.contains("bob@x.com"));
}

#[tokio::test]
async fn test_book_form_lists_doctors() {
    let (state, mut browser) = create_test_app();
    seed_doctor(&state, "d@x.com", "Dr. Heart", "Cardiology").await;
    log_in(&mut browser, &state, "p@x.com", Role::Patient);

    let response = browser.get("/book_appointment").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(r#"<option value="d@x.com">Dr. Heart (Cardiology)</option>"#));
}

#[tokio::test]
async fn test_doctor_cannot_book() {
    let (state, mut browser) = create_test_app();
    log_in(&mut browser, &state, "d@x.com", Role::Doctor);

    let form_page = browser.get("/book_appointment").await;
    assert!(form_page.is_redirect_to("/login"));

    let response = browser.post_form("/book_appointment", &[
        ("doctor_email", "d@x.com"),
        ("symptoms", "fever"),
    ]).await;
    assert!(response.is_redirect_to("/login"));

    let records = AppointmentRecords::new(&state);
    assert!(records.find_by("doctor_email", "d@x.com").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_anonymous_cannot_book() {
    let (state, mut browser) = create_test_app();

    let response = browser.post_form("/book_appointment", &[
        ("doctor_email", "d@x.com"),
        ("symptoms", "fever"),
    ]).await;

    assert!(response.is_redirect_to("/login"));
    assert!(AppointmentRecords::new(&state)
        .find_by("doctor_email", "d@x.com")
        .await
        .unwrap()
        .is_empty());

    let login_notice = browser.get("/dashboard").await;
    assert!(login_notice.is_redirect_to("/login"));
}

#[tokio::test]
async fn test_guards_run_before_partial_forms_are_decoded() {
    let (state, mut browser) = create_test_app();

    let booking = browser
        .post_form("/book_appointment", &[("doctor_email", "d@x.com")])
        .await;
    assert!(booking.is_redirect_to("/login"));

    let diagnosis = browser
        .post_form("/submit_diagnosis/abc", &[("diagnosis", "x")])
        .await;
    assert!(diagnosis.is_redirect_to("/login"));

    let via_view = browser
        .post_form("/view_appointment/abc", &[("diagnosis", "x")])
        .await;
    assert!(via_view.is_redirect_to("/login"));

    assert!(browser.has_cookie("medtrack_flash"));

    log_in(&mut browser, &state, "d@x.com", Role::Doctor);
    let wrong_role = browser
        .post_form("/book_appointment", &[("doctor_email", "d@x.com")])
        .await;
    assert!(wrong_role.is_redirect_to("/login"));
    assert!(AppointmentRecords::new(&state)
        .find_by("doctor_email", "d@x.com")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_partial_forms_from_permitted_roles_are_bad_requests() {
    let (state, mut browser) = create_test_app();
    let appointment = seed_appointment(&state, "d@x.com", "p@x.com").await;

    log_in(&mut browser, &state, "p@x.com", Role::Patient);
    let booking = browser
        .post_form("/book_appointment", &[("doctor_email", "d@x.com")])
        .await;
    assert_eq!(booking.status, StatusCode::BAD_REQUEST);

    log_in(&mut browser, &state, "d@x.com", Role::Doctor);
    let diagnosis = browser
        .post_form(
            &format!("/submit_diagnosis/{}", appointment.appointment_id),
            &[("diagnosis", "x")],
        )
        .await;
    assert_eq!(diagnosis.status, StatusCode::BAD_REQUEST);

    let stored = AppointmentRecords::new(&state)
        .get(&appointment.appointment_id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, AppointmentStatus::Pending);
}

#[tokio::test]
async fn test_patient_cannot_view_appointment() {
    let (state, mut browser) = create_test_app();
    let appointment = seed_appointment(&state, "d@x.com", "p@x.com").await;
    log_in(&mut browser, &state, "p@x.com", Role::Patient);

    let response = browser
        .get(&format!("/view_appointment/{}", appointment.appointment_id))
        .await;

    assert!(response.is_redirect_to("/login"));
}

#[tokio::test]
async fn test_view_missing_appointment_shows_empty_detail() {
    let (state, mut browser) = create_test_app();
    log_in(&mut browser, &state, "d@x.com", Role::Doctor);

    let response = browser.get("/view_appointment/does-not-exist").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Appointment not found."));
    assert!(!response.body.contains("<textarea"));
}

#[tokio::test]
async fn test_unassigned_doctor_is_sent_back_to_dashboard() {
    let (state, mut browser) = create_test_app();
    let appointment = seed_appointment(&state, "d@x.com", "p@x.com").await;
    log_in(&mut browser, &state, "other@x.com", Role::Doctor);

    let view = browser
        .get(&format!("/view_appointment/{}", appointment.appointment_id))
        .await;
    assert!(view.is_redirect_to("/dashboard"));

    let submit = browser
        .post_form(
            &format!("/submit_diagnosis/{}", appointment.appointment_id),
            &diagnosis_form("guess"),
        )
        .await;
    assert!(submit.is_redirect_to("/dashboard"));

    let dashboard = browser.follow(&submit).await;
    assert!(dashboard.body.contains("You are not assigned to this appointment."));

    let stored = AppointmentRecords::new(&state)
        .get(&appointment.appointment_id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, AppointmentStatus::Pending);
}

#[tokio::test]
async fn test_submit_route_enforces_doctor_guard() {
    let (state, mut browser) = create_test_app();
    let appointment = seed_appointment(&state, "d@x.com", "p@x.com").await;
    log_in(&mut browser, &state, "p@x.com", Role::Patient);

    let response = browser
        .post_form(
            &format!("/submit_diagnosis/{}", appointment.appointment_id),
            &diagnosis_form("self-diagnosed"),
        )
        .await;

    assert!(response.is_redirect_to("/login"));
    let stored = AppointmentRecords::new(&state)
        .get(&appointment.appointment_id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, AppointmentStatus::Pending);
    assert!(stored.outcome.is_none());
}

#[tokio::test]
async fn test_submit_missing_appointment_creates_nothing() {
    let (state, mut browser) = create_test_app();
    log_in(&mut browser, &state, "d@x.com", Role::Doctor);

    let response = browser
        .post_form("/submit_diagnosis/does-not-exist", &diagnosis_form("angina"))
        .await;

    assert!(response.is_redirect_to("/dashboard"));
    let dashboard = browser.follow(&response).await;
    assert!(dashboard.body.contains("Appointment not found."));
    assert!(AppointmentRecords::new(&state)
        .find_by("doctor_email", "d@x.com")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_both_diagnosis_routes_complete_the_appointment() {
    let (state, mut browser) = create_test_app();
    let appointment = seed_appointment(&state, "d@x.com", "p@x.com").await;
    let id = appointment.appointment_id.to_string();
    log_in(&mut browser, &state, "d@x.com", Role::Doctor);
    let records = AppointmentRecords::new(&state);

    let via_view = browser
        .post_form(&format!("/view_appointment/{}", id), &diagnosis_form("migraine"))
        .await;
    assert!(via_view.is_redirect_to("/dashboard"));
    let stored = records.get(&id).await.unwrap().unwrap();
    assert_eq!(stored.status, AppointmentStatus::Completed);
    assert_eq!(stored.outcome.unwrap().diagnosis, "migraine");

    let via_submit = browser
        .post_form(&format!("/submit_diagnosis/{}", id), &diagnosis_form("tension headache"))
        .await;
    assert!(via_submit.is_redirect_to("/dashboard"));
    let stored = records.get(&id).await.unwrap().unwrap();
    assert_eq!(stored.status, AppointmentStatus::Completed);
    assert_eq!(stored.outcome.unwrap().diagnosis, "tension headache");
}
