//! Bearer token issuing and validation (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::error::TokenError;
use super::principal::PrincipalId;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // Subject (principal id as string)
    pub iat: i64,    // Issued at
    pub exp: i64,    // Expiration time (as UTC timestamp)
}

/// A freshly signed token and the instant it stops being accepted
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
        }
    }

    /// Issue a token for `principal_id` valid from now for the configured lifetime
    pub fn issue(&self, principal_id: PrincipalId) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        self.issue_at(principal_id, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        principal_id: PrincipalId,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let expires_at = issued_at + self.lifetime;
        let claims = Claims {
            sub: principal_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(IssuedToken { token, expires_at })
    }

    /// Verify signature and expiry, returning the bound principal id.
    pub fn validate(&self, token: &str) -> Result<PrincipalId, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                _ => TokenError::Malformed,
            }
        })?;

        // jsonwebtoken only rejects `exp < now`; a token dies at its expiry second
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        data.claims
            .sub
            .parse::<PrincipalId>()
            .map_err(|_| TokenError::Malformed)
    }
}
