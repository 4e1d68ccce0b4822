//! Identity token verification
//!
//! Sessions are owned by the external identity provider. The server only
//! verifies the bearer token it issued and reads the subject (`auth_id`)
//! plus optional profile claims. HS256 (shared secret) and RS256 (public
//! key) are supported; only an HS256 service can mint tokens, which the
//! test suites and local development use.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::AppError;

/// Claims read from an identity token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Identity-provider subject, used as the user's `auth_id`
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl IdentityClaims {
    /// Claims for `auth_id` valid for `ttl` from now
    #[must_use]
    pub fn new(auth_id: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: auth_id.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: None,
            name: None,
            email: None,
            picture: None,
        }
    }

    #[must_use]
    pub fn with_profile(mut self, name: &str, email: &str) -> Self {
        self.name = Some(name.to_string());
        self.email = Some(email.to_string());
        self
    }
}

/// Verifies (and for HS256, issues) identity tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: Option<EncodingKey>,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: Option<String>,
}

impl JwtService {
    /// HS256 service with default validation
    #[must_use]
    pub fn with_secret(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        Self {
            encoding_key: Some(EncodingKey::from_secret(secret.as_bytes())),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            issuer: None,
        }
    }

    /// Build from configuration; a public key selects RS256
    ///
    /// # Errors
    /// Returns a configuration error when no key is configured or the PEM is invalid
    pub fn from_config(config: &AuthConfig) -> Result<Self, AppError> {
        let mut service = match (&config.public_key_pem, &config.jwt_secret) {
            (Some(pem), _) => {
                let decoding_key = DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| AppError::Config(format!("invalid AUTH_PUBLIC_KEY_PEM: {e}")))?;
                Self {
                    encoding_key: None,
                    decoding_key,
                    validation: Validation::new(Algorithm::RS256),
                    issuer: None,
                }
            }
            (None, Some(secret)) => Self::with_secret(secret),
            (None, None) => {
                return Err(AppError::Config(
                    "either AUTH_JWT_SECRET or AUTH_PUBLIC_KEY_PEM is required".to_string(),
                ))
            }
        };

        service.validation.leeway = config.leeway_secs;
        if let Some(issuer) = &config.issuer {
            service.validation.set_issuer(&[issuer]);
            service.validation.required_spec_claims.insert("iss".to_string());
            service.issuer = Some(issuer.clone());
        }
        match &config.audience {
            Some(audience) => {
                service.validation.set_audience(&[audience]);
                service.validation.required_spec_claims.insert("aud".to_string());
            }
            None => service.validation.validate_aud = false,
        }

        Ok(service)
    }

    /// Verify a bearer token and return its claims
    ///
    /// # Errors
    /// `TokenExpired` for an expired token, `InvalidToken` for anything else
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, AppError> {
        let data = decode::<IdentityClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            },
        )?;

        if data.claims.sub.trim().is_empty() {
            return Err(AppError::InvalidToken);
        }
        Ok(data.claims)
    }

    /// Mint a token (HS256 only); the configured issuer is stamped in
    ///
    /// # Errors
    /// Fails when the service only holds a public key
    pub fn issue(&self, claims: &IdentityClaims) -> Result<String, AppError> {
        let key = self
            .encoding_key
            .as_ref()
            .ok_or_else(|| AppError::Config("token issuing requires a shared secret".to_string()))?;

        let mut claims = claims.clone();
        if claims.iss.is_none() {
            claims.iss.clone_from(&self.issuer);
        }

        encode(&Header::new(Algorithm::HS256), &claims, key)
            .map_err(|e| AppError::internal(anyhow::anyhow!("failed to encode token: {e}")))
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("algorithms", &self.validation.algorithms)
            .field("issuer", &self.issuer)
            .field("can_issue", &self.encoding_key.is_some())
            .finish_non_exhaustive()
    }
}
