use anyhow::{Context, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TOKEN_DURATION_SECS: i64 = 24 * 3600; // 24 hours

/// JWT Claims. `sub` is the user's UUID.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).context("JWT subject is not a UUID")
    }
}

/// HS256 bearer token verification against a shared secret.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: Option<String>,
}

impl JwtService {
    pub fn new(secret: &str, issuer: Option<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
        }
    }

    /// Issue a token for `user_id`. Tokens normally come from the identity
    /// provider; this is for local development and tests.
    pub fn create_token(&self, user_id: Uuid) -> Result<String> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::seconds(TOKEN_DURATION_SECS);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify signature, expiry and (when configured) issuer.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        if let Some(ref issuer) = self.issuer {
            validation.set_issuer(&[issuer]);
        }
        // Identity providers commonly set `aud`; ownership is checked per session instead.
        validation.validate_aud = false;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}
