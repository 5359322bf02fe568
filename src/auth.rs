//! Basic authentication
//!
//! A single static credential set. The password is kept only as an argon2 PHC
//! string; verification runs on the blocking pool so a slow hash never stalls
//! the request executor.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;

use crate::config::AuthConfig;
use crate::error::{CollectionError, Result};

/// Realm announced in `WWW-Authenticate`
pub const REALM: &str = "collections";

const SALT_LENGTH: usize = 16;

/// Hash `password` into an argon2id PHC string with a random salt
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(|e| CollectionError::Auth(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CollectionError::Auth(e.to_string()))
}

/// Check `password` against a PHC string produced by [`hash_password`]
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(password_hash).map_err(|e| CollectionError::Auth(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Username and password decoded from an `Authorization: Basic` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl BasicCredentials {
    /// Parse the value of an `Authorization` header
    pub fn parse(header: &str) -> Option<Self> {
        let (scheme, encoded) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;
        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Render as an `Authorization` header value
    pub fn to_header(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:{}", self.username, self.password)))
    }
}

/// The configured credential set
#[derive(Debug, Clone)]
pub struct BasicAuth {
    username: String,
    password_hash: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Result<Self> {
        let password_hash = password_hash.into();
        PasswordHash::new(&password_hash).map_err(|e| CollectionError::Auth(e.to_string()))?;
        Ok(Self {
            username: username.into(),
            password_hash,
        })
    }

    /// Build the gate from configuration; `None` when auth is disabled
    pub fn from_config(config: &AuthConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        match (&config.username, &config.password_hash) {
            (Some(username), Some(hash)) => Self::new(username.clone(), hash.clone()).map(Some),
            _ => Err(CollectionError::Auth(
                "auth is enabled but username or password_hash is missing".to_string(),
            )),
        }
    }

    /// Verify `credentials` off the async executor
    pub async fn verify(&self, credentials: BasicCredentials) -> bool {
        if credentials.username != self.username {
            return false;
        }
        let hash = self.password_hash.clone();
        tokio::task::spawn_blocking(move || verify_password(&credentials.password, &hash))
            .await
            .ok()
            .and_then(|result| result.ok())
            .unwrap_or(false)
    }
}
