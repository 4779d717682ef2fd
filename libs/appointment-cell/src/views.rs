use axum::response::Html;

use auth_cell::models::User;
use shared_models::auth::SessionIdentity;
use shared_models::flash::Flash;
use shared_utils::html::{escape, render_page};

use crate::models::{Appointment, DiagnosisRecord};

fn format_date(appointment: &Appointment) -> String {
    appointment.appointment_date.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn status_badge(appointment: &Appointment) -> String {
    format!(
        r#"<span class="status status-{0}">{0}</span>"#,
        appointment.status.as_str()
    )
}

pub fn doctor_dashboard(
    identity: &SessionIdentity,
    flashes: &[Flash],
    appointments: &[Appointment],
) -> Html<String> {
    let body = if appointments.is_empty() {
        "<p>No appointments assigned to you yet.</p>".to_string()
    } else {
        let rows = appointments
            .iter()
            .map(|a| {
                format!(
                    r#"<tr><td>{date}</td><td>{patient}</td><td>{symptoms}</td><td>{status}</td><td><a href="/view_appointment/{id}">View</a></td></tr>"#,
                    date = format_date(a),
                    patient = escape(&a.patient_email),
                    symptoms = escape(&a.symptoms),
                    status = status_badge(a),
                    id = a.appointment_id,
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "<table class=\"appointments\">\n<thead><tr><th>Booked</th><th>Patient</th><th>Symptoms</th><th>Status</th><th></th></tr></thead>\n<tbody>\n{}\n</tbody>\n</table>",
            rows
        )
    };

    render_page("Doctor dashboard", Some(identity), flashes, &body)
}

pub fn patient_dashboard(
    identity: &SessionIdentity,
    flashes: &[Flash],
    appointments: &[Appointment],
) -> Html<String> {
    let body = if appointments.is_empty() {
        r#"<p>You have no appointments. <a href="/book_appointment">Book one now</a>.</p>"#.to_string()
    } else {
        let rows = appointments
            .iter()
            .map(|a| {
                let (diagnosis, treatment_plan, prescription) = match &a.outcome {
                    Some(o) => (escape(&o.diagnosis), escape(&o.treatment_plan), escape(&o.prescription)),
                    None => (String::new(), String::new(), String::new()),
                };
                format!(
                    "<tr><td>{date}</td><td>{doctor}</td><td>{symptoms}</td><td>{status}</td><td>{diagnosis}</td><td>{treatment_plan}</td><td>{prescription}</td></tr>",
                    date = format_date(a),
                    doctor = escape(&a.doctor_email),
                    symptoms = escape(&a.symptoms),
                    status = status_badge(a),
                    diagnosis = diagnosis,
                    treatment_plan = treatment_plan,
                    prescription = prescription,
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "<table class=\"appointments\">\n<thead><tr><th>Booked</th><th>Doctor</th><th>Symptoms</th><th>Status</th><th>Diagnosis</th><th>Treatment plan</th><th>Prescription</th></tr></thead>\n<tbody>\n{}\n</tbody>\n</table>",
            rows
        )
    };

    render_page("My appointments", Some(identity), flashes, &body)
}

pub fn book_appointment_page(
    identity: &SessionIdentity,
    flashes: &[Flash],
    doctors: &[User],
) -> Html<String> {
    let options = doctors
        .iter()
        .map(|d| {
            format!(
                r#"<option value="{email}">{name} ({specialization})</option>"#,
                email = escape(&d.email),
                name = escape(&d.name),
                specialization = escape(d.specialization.as_deref().unwrap_or("General")),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let body = if doctors.is_empty() {
        "<p>No doctors are registered yet.</p>".to_string()
    } else {
        format!(
            r#"<form method="post" action="/book_appointment">
<label>Doctor
<select name="doctor_email" required>
{options}
</select></label>
<label>Symptoms <textarea name="symptoms" required></textarea></label>
<button type="submit">Book appointment</button>
</form>"#,
            options = options,
        )
    };

    render_page("Book an appointment", Some(identity), flashes, &body)
}

pub fn view_appointment_page(
    identity: &SessionIdentity,
    flashes: &[Flash],
    appointment_id: &str,
    appointment: Option<&Appointment>,
) -> Html<String> {
    let Some(appointment) = appointment else {
        return render_page(
            "Appointment",
            Some(identity),
            flashes,
            "<p>Appointment not found.</p>",
        );
    };

    let empty = DiagnosisRecord {
        diagnosis: String::new(),
        treatment_plan: String::new(),
        prescription: String::new(),
    };
    let outcome = appointment.outcome.as_ref().unwrap_or(&empty);

    let body = format!(
        r#"<dl>
<dt>Patient</dt><dd>{patient}</dd>
<dt>Booked</dt><dd>{date}</dd>
<dt>Symptoms</dt><dd>{symptoms}</dd>
<dt>Status</dt><dd>{status}</dd>
</dl>
<form method="post" action="/submit_diagnosis/{id}">
<label>Diagnosis <textarea name="diagnosis" required>{diagnosis}</textarea></label>
<label>Treatment plan <textarea name="treatment_plan" required>{treatment_plan}</textarea></label>
<label>Prescription <textarea name="prescription" required>{prescription}</textarea></label>
<button type="submit">Submit diagnosis</button>
</form>"#,
        patient = escape(&appointment.patient_email),
        date = format_date(appointment),
        symptoms = escape(&appointment.symptoms),
        status = status_badge(appointment),
        id = escape(appointment_id),
        diagnosis = escape(&outcome.diagnosis),
        treatment_plan = escape(&outcome.treatment_plan),
        prescription = escape(&outcome.prescription),
    );

    render_page("Appointment", Some(identity), flashes, &body)
}
