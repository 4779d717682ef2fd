use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Serialize};
use sha2::Sha256;
use tracing::debug;

use shared_models::auth::{SessionClaims, SessionIdentity, TokenHeader};

type HmacSha256 = Hmac<Sha256>;

fn signature_for(signing_input: &str, secret: &str) -> Result<Vec<u8>, String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(signing_input.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Encodes `claims` as `header.claims.signature` (HS256, base64url).
pub fn sign_token<T: Serialize>(claims: &T, secret: &str) -> Result<String, String> {
    if secret.is_empty() {
        return Err("Session secret is not set".to_string());
    }

    let header = TokenHeader {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };
    let header_json = serde_json::to_string(&header)
        .map_err(|_| "Invalid header format".to_string())?;
    let claims_json = serde_json::to_string(claims)
        .map_err(|_| "Invalid claims format".to_string())?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(claims_json)
    );
    let signature = signature_for(&signing_input, secret)?;

    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

/// Checks the signature of a token produced by [`sign_token`] and decodes its claims.
pub fn verify_token<T: DeserializeOwned>(token: &str, secret: &str) -> Result<T, String> {
    if secret.is_empty() {
        return Err("Session secret is not set".to_string());
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return Err("Invalid signature encoding".to_string());
        }
    };

    let signature_string = format!("{}.{}", header_b64, claims_b64);

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return Err("Failed to create HMAC".to_string()),
    };

    mac.update(signature_string.as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims_json = match URL_SAFE_NO_PAD.decode(claims_b64) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(json_str) => json_str,
            Err(_) => return Err("Invalid claims encoding".to_string()),
        },
        Err(_) => return Err("Invalid claims encoding".to_string()),
    };

    match serde_json::from_str(&claims_json) {
        Ok(c) => Ok(c),
        Err(e) => {
            debug!("Failed to parse claims: {}", e);
            Err("Invalid claims format".to_string())
        }
    }
}

pub fn issue_session_token(
    identity: &SessionIdentity,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, String> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: identity.email.clone(),
        role: identity.role,
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
    };

    sign_token(&claims, secret)
}

pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionIdentity, String> {
    let claims: SessionClaims = verify_token(token, secret)?;

    let now = Utc::now().timestamp();
    if claims.exp < now {
        debug!("Session expired at {} (now: {})", claims.exp, now);
        return Err("Session expired".to_string());
    }

    debug!("Session validated for {}", claims.sub);
    Ok(SessionIdentity::new(claims.sub, claims.role))
}
