use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponseParts, ResponseParts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::auth::SessionIdentity;
use shared_models::error::AppError;
use shared_models::flash::Flash;

use crate::token::{issue_session_token, sign_token, validate_session_token, verify_token};

pub const SESSION_COOKIE: &str = "medtrack_session";
pub const FLASH_COOKIE: &str = "medtrack_flash";

#[derive(Debug, Default, Serialize, Deserialize)]
struct FlashClaims {
    messages: Vec<Flash>,
}

/// Per-request view of the browser session.
///
/// Built from the request cookies; any change made through [`Session::establish`],
/// [`Session::clear`], [`Session::flash`] or [`Session::take_flashes`] reaches the
/// browser only when the session is returned as part of the response.
pub struct Session {
    jar: CookieJar,
    identity: Option<SessionIdentity>,
    flashes: Vec<Flash>,
    secret: String,
    ttl_hours: i64,
    secure: bool,
}

impl Session {
    pub fn from_jar(jar: CookieJar, config: &AppConfig) -> Self {
        let identity = jar.get(SESSION_COOKIE).and_then(|cookie| {
            validate_session_token(cookie.value(), &config.session_secret)
                .map_err(|e| debug!("Ignoring session cookie: {}", e))
                .ok()
        });

        let flashes = jar
            .get(FLASH_COOKIE)
            .and_then(|cookie| {
                verify_token::<FlashClaims>(cookie.value(), &config.session_secret)
                    .map_err(|e| debug!("Ignoring flash cookie: {}", e))
                    .ok()
            })
            .map(|claims| claims.messages)
            .unwrap_or_default();

        Self {
            jar,
            identity,
            flashes,
            secret: config.session_secret.clone(),
            ttl_hours: config.session_ttl_hours,
            secure: config.session_cookie_secure,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn current_identity(&self) -> Option<&SessionIdentity> {
        self.identity.as_ref()
    }

    pub fn establish(&mut self, identity: SessionIdentity) -> Result<(), AppError> {
        let token = issue_session_token(&identity, &self.secret, self.ttl_hours)
            .map_err(AppError::Internal)?;

        let cookie = self.cookie(SESSION_COOKIE, token);
        self.jar = self.jar.clone().add(cookie);
        self.identity = Some(identity);
        Ok(())
    }

    pub fn clear(&mut self) {
        let removal = self.removal(SESSION_COOKIE);
        self.jar = self.jar.clone().remove(removal);
        self.identity = None;
    }

    /// Queues a notice for the next rendered page.
    pub fn flash(&mut self, flash: Flash) {
        self.flashes.push(flash);

        let claims = FlashClaims { messages: self.flashes.clone() };
        match sign_token(&claims, &self.secret) {
            Ok(token) => {
                let cookie = self.cookie(FLASH_COOKIE, token);
                self.jar = self.jar.clone().add(cookie);
            }
            Err(e) => warn!("Dropping flash notice: {}", e),
        }
    }

    /// Drains pending notices. The flash cookie is removed from the browser.
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        if self.jar.get(FLASH_COOKIE).is_some() {
            let removal = self.removal(FLASH_COOKIE);
            self.jar = self.jar.clone().remove(removal);
        }
        std::mem::take(&mut self.flashes)
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar
    }

    fn cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build()
    }

    fn removal(&self, name: &'static str) -> Cookie<'static> {
        Cookie::build((name, "")).path("/").secure(self.secure).build()
    }
}

impl<S> FromRequestParts<S> for Session
where
    Arc<AppConfig>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<AppConfig>::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Self::from_jar(jar, &config))
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.jar.into_response_parts(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};
    use shared_models::auth::Role;

    use crate::test_utils::TestConfig;

    fn session_from_cookies(config: &AppConfig, cookies: &str) -> Session {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookies).unwrap());
        Session::from_jar(CookieJar::from_headers(&headers), config)
    }

    #[test]
    fn test_new_session_is_unauthenticated() {
        let config = TestConfig::default().to_app_config();
        let session = Session::from_jar(CookieJar::new(), &config);

        assert!(!session.is_authenticated());
        assert!(session.current_identity().is_none());
    }

    #[test]
    fn test_establish_then_clear() {
        let config = TestConfig::default().to_app_config();
        let mut session = Session::from_jar(CookieJar::new(), &config);
        let identity = SessionIdentity::new("p@x.com", Role::Patient);

        session.establish(identity.clone()).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.current_identity(), Some(&identity));

        session.clear();
        assert!(!session.is_authenticated());
        assert!(session.current_identity().is_none());
    }

    #[test]
    fn test_established_cookie_restores_identity() {
        let config = TestConfig::default().to_app_config();
        let mut session = Session::from_jar(CookieJar::new(), &config);
        let identity = SessionIdentity::new("d@x.com", Role::Doctor);
        session.establish(identity.clone()).unwrap();

        let token = session.into_jar().get(SESSION_COOKIE).unwrap().value().to_string();
        let restored = session_from_cookies(&config, &format!("{}={}", SESSION_COOKIE, token));

        assert_eq!(restored.current_identity(), Some(&identity));
    }

    #[test]
    fn test_cookies_follow_secure_setting() {
        let mut config = TestConfig::default().to_app_config();
        let identity = SessionIdentity::new("p@x.com", Role::Patient);

        let mut plain = Session::from_jar(CookieJar::new(), &config);
        plain.establish(identity.clone()).unwrap();
        let jar = plain.into_jar();
        assert_ne!(jar.get(SESSION_COOKIE).unwrap().secure(), Some(true));

        config.session_cookie_secure = true;
        let mut secure = Session::from_jar(CookieJar::new(), &config);
        secure.establish(identity).unwrap();
        secure.flash(Flash::success("Login successful."));
        let jar = secure.into_jar();
        assert_eq!(jar.get(SESSION_COOKIE).unwrap().secure(), Some(true));
        assert_eq!(jar.get(FLASH_COOKIE).unwrap().secure(), Some(true));
        assert_eq!(jar.get(SESSION_COOKIE).unwrap().http_only(), Some(true));
    }

    #[test]
    fn test_garbage_cookie_is_unauthenticated() {
        let config = TestConfig::default().to_app_config();
        let session = session_from_cookies(&config, &format!("{}=not-a-token", SESSION_COOKIE));

        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_flashes_survive_one_request() {
        let config = TestConfig::default().to_app_config();
        let mut session = Session::from_jar(CookieJar::new(), &config);
        session.flash(Flash::success("Registration successful. Please log in."));

        let token = session.into_jar().get(FLASH_COOKIE).unwrap().value().to_string();
        let mut next = session_from_cookies(&config, &format!("{}={}", FLASH_COOKIE, token));

        let flashes = next.take_flashes();
        assert_eq!(flashes, vec![Flash::success("Registration successful. Please log in.")]);
        assert!(next.take_flashes().is_empty());
        assert!(next.into_jar().get(FLASH_COOKIE).is_none());
    }
}
