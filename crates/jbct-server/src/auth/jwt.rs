//! Session token issuance and validation.

use jbct_core::db::unix_timestamp;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::{Claims, Principal};

/// Session lifetime: 7 days.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// A freshly signed session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Unix timestamp.
    pub expires_at: i64,
}

/// Manages HS256 session token creation and validation.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    session_ttl_secs: i64,
}

impl JwtManager {
    /// Create a new `JwtManager` with the given secret.
    ///
    /// Expiry is checked with no clock leeway: a token is accepted up to and
    /// including its `exp` second and rejected after it.
    pub fn new(secret: &[u8], session_ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            session_ttl_secs,
        }
    }

    pub const fn session_ttl_secs(&self) -> i64 {
        self.session_ttl_secs
    }

    /// Issue a session token for `principal`.
    pub fn issue_session_token(
        &self,
        principal: &Principal,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let now = unix_timestamp();
        let exp = now + self.session_ttl_secs;

        let claims = Claims {
            jti: uuid::Uuid::new_v4().to_string(),
            user_id: principal.user_id.clone(),
            username: principal.username.clone(),
            email: principal.email.clone(),
            picture: principal.picture.clone(),
            iat: now,
            exp,
        };

        let token =
            jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(IssuedToken {
            token,
            expires_at: exp,
        })
    }

    /// Validate signature and expiry and return the claims.
    pub fn validate(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}
