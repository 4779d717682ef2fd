use std::env;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Supabase,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_api_key: String,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    /// Marks session and flash cookies `Secure`; enable behind HTTPS.
    pub session_cookie_secure: bool,
    pub bind_address: String,
    pub users_table: String,
    pub appointments_table: String,
    pub store_backend: StoreBackend,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let supabase_url = env::var("SUPABASE_URL")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_URL not set, using empty value");
                String::new()
            });
        let supabase_api_key = env::var("SUPABASE_API_KEY")
            .unwrap_or_else(|_| {
                warn!("SUPABASE_API_KEY not set, using empty value");
                String::new()
            });

        let store_backend = match env::var("STORE_BACKEND").ok().as_deref() {
            Some("memory") => StoreBackend::Memory,
            Some("supabase") => StoreBackend::Supabase,
            Some(other) => {
                warn!("Unknown STORE_BACKEND '{}', picking from Supabase settings", other);
                Self::default_backend(&supabase_url, &supabase_api_key)
            }
            None => Self::default_backend(&supabase_url, &supabase_api_key),
        };

        let config = Self {
            supabase_url,
            supabase_api_key,
            session_secret: env::var("SESSION_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SESSION_SECRET not set, using empty value");
                    String::new()
                }),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    warn!("SESSION_TTL_HOURS not set or invalid, using default");
                    12
                }),
            session_cookie_secure: env::var("SESSION_COOKIE_SECURE")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            users_table: env::var("USERS_TABLE")
                .unwrap_or_else(|_| "users".to_string()),
            appointments_table: env::var("APPOINTMENTS_TABLE")
                .unwrap_or_else(|_| "appointments".to_string()),
            store_backend,
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    fn default_backend(url: &str, api_key: &str) -> StoreBackend {
        if !url.is_empty() && !api_key.is_empty() {
            StoreBackend::Supabase
        } else {
            warn!("Supabase not configured, falling back to in-memory store");
            StoreBackend::Memory
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.session_secret.is_empty() && self.is_store_configured()
    }

    pub fn is_store_configured(&self) -> bool {
        match self.store_backend {
            StoreBackend::Memory => true,
            StoreBackend::Supabase => {
                !self.supabase_url.is_empty() && !self.supabase_api_key.is_empty()
            }
        }
    }
}
