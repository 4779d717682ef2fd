use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::auth::{Role, SessionIdentity};

/// Stored credential record, keyed by `email`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub age: u32,
    pub gender: String,
    pub role: Role,
    /// Set for doctors only.
    #[serde(default)]
    pub specialization: Option<String>,
}

impl User {
    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity::new(self.email.clone(), self.role)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub age: u32,
    pub gender: String,
    pub role: Role,
    #[serde(default)]
    pub specialization: Option<String>,
}

impl RegisterForm {
    /// The specialization a user with this form's role may carry: the trimmed,
    /// non-empty value for doctors, `None` for patients.
    pub fn effective_specialization(&self) -> Option<String> {
        match self.role {
            Role::Doctor => self
                .specialization
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            Role::Patient => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("An account with this email already exists.")]
    DuplicateEmail,

    #[error("Specialization is required for doctors.")]
    MissingSpecialization,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl RegistrationError {
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, RegistrationError::DuplicateEmail | RegistrationError::MissingSpecialization)
    }
}

#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Email not found.")]
    EmailNotFound,

    #[error("Invalid password.")]
    InvalidPassword,

    #[error("Invalid role selected.")]
    InvalidRole,

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl LoginError {
    pub fn is_user_correctable(&self) -> bool {
        !matches!(self, LoginError::Store(_))
    }
}
