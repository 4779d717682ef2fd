use tracing::{debug, info, warn};

use shared_models::auth::SessionIdentity;
use shared_utils::state::AppState;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, DiagnosisRecord};
use crate::services::records::AppointmentRecords;

/// The one transition an appointment has: the assigned doctor records a
/// diagnosis and the appointment becomes completed. Repeating it overwrites
/// the previous findings.
pub struct DiagnosisService {
    records: AppointmentRecords,
}

impl DiagnosisService {
    pub fn new(state: &AppState) -> Self {
        Self {
            records: AppointmentRecords::new(state),
        }
    }

    fn require_doctor(identity: &SessionIdentity) -> Result<(), AppointmentError> {
        if identity.is_doctor() {
            Ok(())
        } else {
            warn!("{} ({}) tried to access a doctor-only appointment page", identity.email, identity.role);
            Err(AppointmentError::DoctorsOnly)
        }
    }

    /// `Ok(None)` when no appointment has this id.
    pub async fn appointment_for_doctor(
        &self,
        identity: &SessionIdentity,
        appointment_id: &str,
    ) -> Result<Option<Appointment>, AppointmentError> {
        Self::require_doctor(identity)?;

        match self.records.get(appointment_id).await? {
            Some(appointment) if !appointment.is_assigned_to(&identity.email) => {
                warn!("{} is not assigned to appointment {}", identity.email, appointment_id);
                Err(AppointmentError::NotAssigned)
            }
            found => Ok(found),
        }
    }

    pub async fn submit(
        &self,
        identity: &SessionIdentity,
        appointment_id: &str,
        record: &DiagnosisRecord,
    ) -> Result<(), AppointmentError> {
        let appointment = self
            .appointment_for_doctor(identity, appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        if appointment.status == AppointmentStatus::Completed {
            debug!("Overwriting diagnosis on completed appointment {}", appointment_id);
        }

        // Last writer wins if two submissions race.
        if !self.records.complete(appointment_id, record).await? {
            return Err(AppointmentError::NotFound);
        }

        info!("Appointment {} completed by {}", appointment_id, identity.email);
        Ok(())
    }
}
