use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use shared_database::{Filter, RecordKey, RecordStore};
use shared_models::auth::Role;
use shared_utils::state::AppState;

use crate::models::{LoginError, LoginForm, RegisterForm, RegistrationError, User};
use crate::services::password::PasswordService;

const KEY_ATTRIBUTE: &str = "email";

pub struct CredentialService {
    store: Arc<dyn RecordStore>,
    table: String,
}

impl CredentialService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            table: state.config.users_table.clone(),
        }
    }

    pub async fn find_user(&self, email: &str) -> Result<Option<User>> {
        debug!("Looking up user {}", email);

        let record = self.store
            .get(&self.table, &RecordKey::new(KEY_ATTRIBUTE, email))
            .await?;

        match record {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn register(&self, form: RegisterForm) -> Result<User, RegistrationError> {
        debug!("Registering {} as {}", form.email, form.role);

        let specialization = form.effective_specialization();
        if form.role == Role::Doctor && specialization.is_none() {
            return Err(RegistrationError::MissingSpecialization);
        }

        // Check-then-put: two concurrent registrations can still race.
        if self.find_user(&form.email).await?.is_some() {
            warn!("Registration rejected, {} already exists", form.email);
            return Err(RegistrationError::DuplicateEmail);
        }

        let password_hash = PasswordService::hash_password(&form.password)
            .map_err(|e| RegistrationError::Hashing(e.to_string()))?;

        let user = User {
            email: form.email,
            name: form.name,
            password_hash,
            age: form.age,
            gender: form.gender,
            role: form.role,
            specialization,
        };

        let record = serde_json::to_value(&user).map_err(anyhow::Error::from)?;
        self.store.put(&self.table, KEY_ATTRIBUTE, record).await?;

        info!("Registered {} ({})", user.email, user.role);
        Ok(user)
    }

    /// Checks, in order, that the email exists, the password verifies and the
    /// claimed role matches. The first failure wins.
    pub async fn authenticate(&self, form: &LoginForm) -> Result<User, LoginError> {
        let user = self.find_user(&form.email)
            .await?
            .ok_or(LoginError::EmailNotFound)?;

        let verified = PasswordService::verify_password(&form.password, &user.password_hash)
            .unwrap_or_else(|e| {
                warn!("Stored hash for {} is unreadable: {}", user.email, e);
                false
            });
        if !verified {
            return Err(LoginError::InvalidPassword);
        }

        if user.role != form.role {
            return Err(LoginError::InvalidRole);
        }

        info!("Authenticated {} as {}", user.email, user.role);
        Ok(user)
    }

    /// Every registered doctor, by name.
    pub async fn list_doctors(&self) -> Result<Vec<User>> {
        let records = self.store
            .scan(&self.table, &[Filter::eq("role", Role::Doctor.as_str())])
            .await?;

        let mut doctors = records
            .into_iter()
            .map(serde_json::from_value::<User>)
            .collect::<Result<Vec<_>, _>>()?;
        doctors.sort_by(|a, b| a.name.cmp(&b.name));

        debug!("Found {} doctors", doctors.len());
        Ok(doctors)
    }
}
