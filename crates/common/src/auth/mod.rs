//! Authentication utilities
//!
//! Provides:
//! - Verification of bearer tokens issued by the hosted identity provider
//! - Signed-in user context extraction for handlers
//! - Token generation for local development and tests

use crate::config::AuthConfig;
use crate::errors::{AppError, Result};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Signed-in user available to handlers
#[derive(Debug, Clone, PartialEq)]
pub struct UserContext {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl UserContext {
    /// Name shown next to the user's comments, if the profile has one
    pub fn display_name(&self) -> Option<String> {
        let non_empty = |v: &Option<String>| v.as_deref().filter(|s| !s.trim().is_empty()).map(String::from);

        non_empty(&self.full_name)
            .or_else(|| non_empty(&self.name))
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .filter(|local| !local.is_empty())
                    .map(String::from)
            })
    }
}

/// Profile fields the identity provider embeds in its tokens
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl JwtClaims {
    fn into_user(self) -> Result<UserContext> {
        let user_id = Uuid::parse_str(&self.sub).map_err(|_| AppError::InvalidToken)?;
        let UserMetadata {
            full_name,
            name,
            avatar_url,
            picture,
        } = self.user_metadata;

        Ok(UserContext {
            user_id,
            email: self.email,
            full_name,
            name,
            avatar_url: avatar_url.or(picture),
        })
    }
}

/// JWT token manager
pub struct JwtManager {
    keys: Option<(EncodingKey, DecodingKey)>,
    validation: Validation,
    audience: Option<String>,
}

impl JwtManager {
    /// Create a manager from configuration; without a secret every token is rejected
    pub fn from_config(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;
        match config.jwt_audience {
            Some(ref aud) => validation.set_audience(&[aud.as_str()]),
            None => validation.validate_aud = false,
        }

        Self {
            keys: config.jwt_secret.as_deref().map(|secret| {
                (
                    EncodingKey::from_secret(secret.as_bytes()),
                    DecodingKey::from_secret(secret.as_bytes()),
                )
            }),
            validation,
            audience: config.jwt_audience.clone(),
        }
    }

    /// Create a manager with the given secret and default settings
    pub fn new(secret: &str) -> Self {
        Self::from_config(&AuthConfig {
            jwt_secret: Some(secret.to_string()),
            ..AuthConfig::default()
        })
    }

    fn keys(&self) -> Result<&(EncodingKey, DecodingKey)> {
        self.keys.as_ref().ok_or_else(|| AppError::Unauthorized {
            message: "Token verification is not configured".to_string(),
        })
    }

    /// Generate a token for a user
    pub fn generate_token(
        &self,
        user_id: Uuid,
        email: Option<String>,
        metadata: UserMetadata,
        ttl_secs: i64,
    ) -> Result<String> {
        let (encoding_key, _) = self.keys()?;
        let now = Utc::now();

        let claims = JwtClaims {
            sub: user_id.to_string(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
            iat: now.timestamp(),
            aud: self.audience.clone(),
            email,
            user_metadata: metadata,
        };

        encode(&Header::new(Algorithm::HS256), &claims, encoding_key).map_err(|e| {
            AppError::Internal {
                message: format!("Failed to generate token: {}", e),
            }
        })
    }

    /// Validate a token and return the user it identifies
    pub fn validate_token(&self, token: &str) -> Result<UserContext> {
        let (_, decoding_key) = self.keys()?;

        let claims = decode::<JwtClaims>(token, decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::ExpiredToken,
                _ => AppError::InvalidToken,
            })?;

        claims.into_user()
    }
}

/// Extract the token from an `Authorization: Bearer` header value
pub fn extract_bearer(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn bearer_from_parts(parts: &Parts) -> Result<Option<&str>> {
    let Some(value) = parts.headers.get("authorization") else {
        return Ok(None);
    };

    let header = value.to_str().map_err(|_| AppError::InvalidToken)?;
    extract_bearer(header)
        .map(Some)
        .ok_or_else(|| AppError::Unauthorized {
            message: "Expected a Bearer token".to_string(),
        })
}

/// Axum extractor for a required signed-in user
impl<S> FromRequestParts<S> for UserContext
where
    Arc<JwtManager>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let token = bearer_from_parts(parts)?.ok_or_else(|| AppError::Unauthorized {
            message: "Sign in required".to_string(),
        })?;

        Arc::<JwtManager>::from_ref(state).validate_token(token)
    }
}

/// Extractor for routes open to anonymous callers.
///
/// A present but invalid token is still rejected.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<UserContext>);

impl<S> FromRequestParts<S> for OptionalUser
where
    Arc<JwtManager>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        match bearer_from_parts(parts)? {
            Some(token) => Arc::<JwtManager>::from_ref(state)
                .validate_token(token)
                .map(|user| OptionalUser(Some(user))),
            None => Ok(OptionalUser(None)),
        }
    }
}
