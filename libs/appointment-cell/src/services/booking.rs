use tracing::{info, warn};

use shared_models::auth::{Role, SessionIdentity};
use shared_utils::state::AppState;

use crate::models::{Appointment, AppointmentError, BookAppointmentForm};
use crate::services::records::AppointmentRecords;

pub struct AppointmentBookingService {
    records: AppointmentRecords,
}

impl AppointmentBookingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            records: AppointmentRecords::new(state),
        }
    }

    /// Creates a pending appointment for the session patient. The doctor email
    /// is taken as given.
    pub async fn book(
        &self,
        identity: &SessionIdentity,
        form: BookAppointmentForm,
    ) -> Result<Appointment, AppointmentError> {
        if !identity.is_patient() {
            warn!("{} ({}) tried to book an appointment", identity.email, identity.role);
            return Err(AppointmentError::PatientsOnly);
        }

        let appointment = Appointment::new_pending(
            form.doctor_email,
            identity.email.clone(),
            form.symptoms,
        );
        self.records.put(&appointment).await?;

        info!(
            "Booked appointment {} for {} with {}",
            appointment.appointment_id, appointment.patient_email, appointment.doctor_email
        );
        Ok(appointment)
    }

    /// The appointments a dashboard shows: those naming the session user in
    /// the column matching their role.
    pub async fn list_for(&self, identity: &SessionIdentity) -> Result<Vec<Appointment>, AppointmentError> {
        let attribute = match identity.role {
            Role::Doctor => "doctor_email",
            Role::Patient => "patient_email",
        };

        Ok(self.records.find_by(attribute, &identity.email).await?)
    }
}
