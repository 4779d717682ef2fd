use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use axum_extra::extract::cookie::Cookie;
use tower::ServiceExt;

use shared_config::{AppConfig, StoreBackend};
use shared_database::{MemoryStore, RecordStore};
use shared_models::auth::{Role, SessionIdentity};

use crate::session::SESSION_COOKIE;
use crate::state::AppState;
use crate::token::issue_session_token;

pub struct TestConfig {
    pub session_secret: String,
    pub supabase_url: String,
    pub supabase_api_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            session_secret: "test-session-secret-for-cookie-signing".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_api_key: "test-api-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_api_key: self.supabase_api_key.clone(),
            session_secret: self.session_secret.clone(),
            session_ttl_hours: 12,
            session_cookie_secure: false,
            bind_address: "127.0.0.1:0".to_string(),
            users_table: "users".to_string(),
            appointments_table: "appointments".to_string(),
            store_backend: StoreBackend::Memory,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }

    /// App state over a fresh in-memory store. The store handle is returned
    /// so tests can inspect what handlers wrote.
    pub fn to_memory_state(&self) -> (AppState, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(self.to_arc(), store.clone() as Arc<dyn RecordStore>);
        (state, store)
    }
}

pub struct TestUser {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
    pub specialization: Option<String>,
}

impl TestUser {
    pub fn doctor(email: &str, password: &str, specialization: &str) -> Self {
        Self {
            email: email.to_string(),
            name: "Dr. Test".to_string(),
            password: password.to_string(),
            role: Role::Doctor,
            specialization: Some(specialization.to_string()),
        }
    }

    pub fn patient(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            name: "Test Patient".to_string(),
            password: password.to_string(),
            role: Role::Patient,
            specialization: None,
        }
    }

    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity::new(self.email.clone(), self.role)
    }

    /// Fields of the registration form for this user.
    pub fn registration_form(&self) -> Vec<(&str, String)> {
        let mut fields = vec![
            ("name", self.name.clone()),
            ("email", self.email.clone()),
            ("password", self.password.clone()),
            ("age", "40".to_string()),
            ("gender", "female".to_string()),
            ("role", self.role.to_string()),
        ];
        if let Some(specialization) = &self.specialization {
            fields.push(("specialization", specialization.clone()));
        }
        fields
    }

    pub fn login_form(&self) -> Vec<(&str, String)> {
        vec![
            ("email", self.email.clone()),
            ("password", self.password.clone()),
            ("role", self.role.to_string()),
        ]
    }
}

pub struct SessionTestUtils;

impl SessionTestUtils {
    pub fn session_cookie(identity: &SessionIdentity, secret: &str) -> String {
        let token = issue_session_token(identity, secret, 1)
            .expect("test secret is never empty");
        format!("{}={}", SESSION_COOKIE, token)
    }

    pub fn expired_session_cookie(identity: &SessionIdentity, secret: &str) -> String {
        let token = issue_session_token(identity, secret, -1)
            .expect("test secret is never empty");
        format!("{}={}", SESSION_COOKIE, token)
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }

    pub fn is_redirect_to(&self, path: &str) -> bool {
        self.status.is_redirection() && self.location() == Some(path)
    }
}

/// Drives a router the way a browser would: keeps cookies between requests
/// and can follow redirects.
pub struct TestBrowser {
    app: Router,
    cookies: BTreeMap<String, String>,
}

impl TestBrowser {
    pub fn new(app: Router) -> Self {
        Self {
            app,
            cookies: BTreeMap::new(),
        }
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    pub fn clear_cookies(&mut self) {
        self.cookies.clear();
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = self.request_builder("GET", path)
            .body(Body::empty())
            .expect("valid GET request");
        self.send(request).await
    }

    pub async fn post_form<V: AsRef<str>>(&mut self, path: &str, fields: &[(&str, V)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v.as_ref())))
            .collect::<Vec<_>>()
            .join("&");

        let request = self.request_builder("POST", path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("valid POST request");
        self.send(request).await
    }

    /// Issues a GET for the `Location` of a redirect response.
    pub async fn follow(&mut self, response: &TestResponse) -> TestResponse {
        let location = response
            .location()
            .expect("response is a redirect")
            .to_string();
        self.get(&location).await
    }

    fn request_builder(&self, method: &str, path: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(path);
        if !self.cookies.is_empty() {
            let cookie_header = self.cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, cookie_header);
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            let Ok(cookie) = Cookie::parse(raw.to_string()) else { continue };
            if cookie.value().is_empty() {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies.insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}
