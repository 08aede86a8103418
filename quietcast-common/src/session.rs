//! Session tokens
//!
//! Signed, time-limited identity tokens (HS256) carried in the session
//! cookie. The signing secret lives in the settings table and is generated
//! on first run.

use crate::{Error, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Settings table key holding the token signing secret
const SESSION_SECRET_KEY: &str = "session_secret";

/// Standard session lifetime
pub const SESSION_DAYS: i64 = 7;
/// Extended lifetime for "remember me" logins
pub const SESSION_DAYS_REMEMBERED: i64 = 30;

/// Token claims: the listener guid plus expiry
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Listener guid
    pub sub: String,
    /// Expiration (Unix seconds)
    pub exp: usize,
}

/// Sign a session token for a listener
pub fn sign_token(secret: &str, listener_guid: &str, lifetime_days: i64) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(lifetime_days))
        .ok_or_else(|| Error::Internal("Session expiry overflow".to_string()))?
        .timestamp();

    let claims = Claims {
        sub: listener_guid.to_string(),
        exp: expiration as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Token signing error: {}", e)))
}

/// Verify a session token and return its claims
pub fn verify_token(secret: &str, token: &str) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| Error::Unauthorized(format!("Invalid session token: {}", e)))?;
    Ok(data.claims)
}

/// Load the signing secret from the settings table, generating and storing
/// a new random secret if none exists yet.
pub async fn load_session_secret(db: &SqlitePool) -> Result<String> {
    let existing: Option<(String,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(SESSION_SECRET_KEY)
            .fetch_optional(db)
            .await?;

    if let Some((value,)) = existing {
        return Ok(value);
    }

    let secret = generate_secret();
    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(SESSION_SECRET_KEY)
        .bind(&secret)
        .execute(db)
        .await?;

    Ok(secret)
}

fn generate_secret() -> String {
    use rand::distributions::Alphanumeric;
    use rand::Rng;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trip() {
        let token = sign_token("test-secret", "listener-guid-1", SESSION_DAYS).unwrap();
        let claims = verify_token("test-secret", &token).unwrap();
        assert_eq!(claims.sub, "listener-guid-1");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign_token("secret-a", "listener-guid-1", SESSION_DAYS).unwrap();
        assert!(verify_token("secret-b", &token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_token("test-secret", "not.a.token").is_err());
    }

    #[test]
    fn generated_secrets_differ() {
        let a = generate_secret();
        let b = generate_secret();
        assert_eq!(a.len(), 48);
        assert_ne!(a, b);
    }
}
