//! Credential resolution for incoming requests.
//!
//! Every API route expects `Authorization: Bearer <token>`. The token is
//! forwarded downstream as-is, unless it matches the configured alias name,
//! in which case the alias value (the real secret) is sent instead.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use std::sync::Arc;
use tracing::info;

use crate::config::CredentialConfig;
use crate::error::{GatewayError, Result};

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Clone, PartialEq, Eq)]
pub struct CredentialAlias {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Default)]
pub struct CredentialResolver {
    alias: Option<Arc<CredentialAlias>>,
}

impl CredentialResolver {
    pub fn new(alias: Option<CredentialAlias>) -> Self {
        Self {
            alias: alias.map(Arc::new),
        }
    }

    /// Build a resolver from config; the alias is active only when both halves are non-empty
    pub fn from_config(config: &CredentialConfig) -> Self {
        let alias = match (config.alias_name.as_deref(), config.alias_value.as_deref()) {
            (Some(name), Some(value)) if !name.is_empty() && !value.is_empty() => {
                Some(CredentialAlias {
                    name: name.to_string(),
                    value: value.to_string(),
                })
            }
            _ => None,
        };
        Self::new(alias)
    }

    pub fn has_alias(&self) -> bool {
        self.alias.is_some()
    }

    /// Turn a raw `Authorization` header value into the key sent downstream
    pub fn resolve(&self, header: Option<&str>) -> Result<ApiKey> {
        let token = header
            .and_then(|h| h.strip_prefix(BEARER_PREFIX))
            .filter(|t| !t.is_empty() && !t.starts_with(char::is_whitespace))
            .ok_or(GatewayError::Unauthorized)?;

        if let Some(alias) = &self.alias
            && token == alias.name
        {
            info!("Using custom API key for alias: {}", alias.name);
            return Ok(ApiKey(alias.value.clone()));
        }

        Ok(ApiKey(token.to_string()))
    }
}

/// The credential to present to the downstream API.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl<S> FromRequestParts<S> for ApiKey
where
    S: Send + Sync,
    CredentialResolver: FromRef<S>,
{
    type Rejection = GatewayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let resolver = CredentialResolver::from_ref(state);
        // A non-ASCII header is as malformed as a missing one
        let raw = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        resolver.resolve(raw)
    }
}
