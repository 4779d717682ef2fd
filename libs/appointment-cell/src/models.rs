use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub appointment_id: Uuid,
    pub doctor_email: String,
    pub patient_email: String,
    pub symptoms: String,
    pub status: AppointmentStatus,
    /// When the patient booked.
    pub appointment_date: DateTime<Utc>,
    /// Written by the assigned doctor. Stored as the flat `diagnosis`,
    /// `treatment_plan` and `prescription` columns; reads back as `None`
    /// unless all three are present.
    #[serde(flatten)]
    pub outcome: Option<DiagnosisRecord>,
}

impl Appointment {
    pub fn new_pending(doctor_email: String, patient_email: String, symptoms: String) -> Self {
        Self {
            appointment_id: Uuid::new_v4(),
            doctor_email,
            patient_email,
            symptoms,
            status: AppointmentStatus::Pending,
            appointment_date: Utc::now(),
            outcome: None,
        }
    }

    pub fn is_assigned_to(&self, doctor_email: &str) -> bool {
        self.doctor_email == doctor_email
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Doctor's findings. Doubles as the diagnosis form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisRecord {
    pub diagnosis: String,
    pub treatment_plan: String,
    pub prescription: String,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentForm {
    pub doctor_email: String,
    pub symptoms: String,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment not found.")]
    NotFound,

    #[error("Only patients can book appointments.")]
    PatientsOnly,

    #[error("Only doctors can view appointments.")]
    DoctorsOnly,

    #[error("You are not assigned to this appointment.")]
    NotAssigned,

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}
