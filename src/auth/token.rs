use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Role a connection plays on the live channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Viewer,
}

/// Identity recovered from a verified session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaim {
    pub username: String,
}

/// Signed payload of a session token
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    username: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Failed to sign session token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Issues and verifies HS256 session tokens with a fixed process secret.
///
/// Verification never fails loudly: anything that does not check out is
/// simply "no identity", which the caller maps to the viewer role.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    admin_username: Option<String>,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, admin_username: Option<String>, ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            admin_username: admin_username.filter(|name| !name.is_empty()),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Sign a token asserting `username`
    pub fn issue(&self, username: &str) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        let claims = SessionClaims {
            username: username.to_string(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Verify a token and recover its identity claim
    pub fn validate(&self, token: Option<&str>) -> Option<IdentityClaim> {
        let token = token.filter(|t| !t.is_empty())?;
        let validation = Validation::new(Algorithm::HS256);
        match decode::<SessionClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => Some(IdentityClaim { username: data.claims.username }),
            Err(e) => {
                debug!("Session token rejected: {}", e);
                None
            }
        }
    }

    pub fn is_admin(&self, claim: &Option<IdentityClaim>) -> bool {
        match (claim, &self.admin_username) {
            (Some(claim), Some(admin)) => &claim.username == admin,
            _ => false,
        }
    }

    /// Classify a connection from the token it presented
    pub fn role_for(&self, token: Option<&str>) -> Role {
        if self.is_admin(&self.validate(token)) {
            Role::Admin
        } else {
            Role::Viewer
        }
    }

    pub fn admin_username(&self) -> Option<&str> {
        self.admin_username.as_deref()
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }
}
