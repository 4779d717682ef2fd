use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Map, Value};
use tracing::debug;

use shared_database::{Filter, RecordKey, RecordStore};
use shared_utils::state::AppState;

use crate::models::{Appointment, AppointmentStatus, DiagnosisRecord};

const KEY_ATTRIBUTE: &str = "appointment_id";

/// Typed access to the appointments table.
pub struct AppointmentRecords {
    store: Arc<dyn RecordStore>,
    table: String,
}

impl AppointmentRecords {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            table: state.config.appointments_table.clone(),
        }
    }

    pub async fn get(&self, appointment_id: &str) -> Result<Option<Appointment>> {
        debug!("Fetching appointment {}", appointment_id);

        let record = self.store
            .get(&self.table, &RecordKey::new(KEY_ATTRIBUTE, appointment_id))
            .await?;

        match record {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn put(&self, appointment: &Appointment) -> Result<()> {
        let record = serde_json::to_value(appointment)?;
        self.store.put(&self.table, KEY_ATTRIBUTE, record).await
    }

    /// Full scan with an equality filter on `attribute`, newest first.
    pub async fn find_by(&self, attribute: &str, value: &str) -> Result<Vec<Appointment>> {
        let records = self.store
            .scan(&self.table, &[Filter::eq(attribute, value)])
            .await?;

        let mut appointments = records
            .into_iter()
            .map(serde_json::from_value::<Appointment>)
            .collect::<Result<Vec<_>, _>>()?;
        appointments.sort_by(|a, b| b.appointment_date.cmp(&a.appointment_date));

        debug!("Found {} appointments where {} = {}", appointments.len(), attribute, value);
        Ok(appointments)
    }

    /// Writes the doctor's findings and marks the appointment completed.
    /// Returns false when no appointment has this id.
    pub async fn complete(&self, appointment_id: &str, record: &DiagnosisRecord) -> Result<bool> {
        self.store
            .update(
                &self.table,
                &RecordKey::new(KEY_ATTRIBUTE, appointment_id),
                completion_fields(record),
            )
            .await
    }
}

pub fn completion_fields(record: &DiagnosisRecord) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("diagnosis".to_string(), json!(record.diagnosis));
    fields.insert("treatment_plan".to_string(), json!(record.treatment_plan));
    fields.insert("prescription".to_string(), json!(record.prescription));
    fields.insert("status".to_string(), json!(AppointmentStatus::Completed));
    fields
}
