//! Gateway configuration.
//!
//! All configuration is driven by environment variables, matching LocalStack
//! conventions where an equivalent setting exists.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::{GatewayError, GatewayResult};

/// Global configuration for the BucketGuard gateway.
///
/// # Examples
///
/// ```
/// use bucketguard_core::GatewayConfig;
///
/// let config = GatewayConfig::default();
/// assert_eq!(config.gateway_listen, "0.0.0.0:4566");
/// assert!(config.auth_tokens.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Bind address for the gateway.
    #[builder(default = String::from("0.0.0.0:4566"))]
    pub gateway_listen: String,

    /// Default AWS region.
    #[builder(default = String::from("us-east-1"))]
    pub default_region: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Access key ID of the static credential, if configured.
    #[builder(default)]
    pub access_key: Option<String>,

    /// Secret access key of the static credential, if configured.
    #[serde(skip_serializing, default)]
    #[builder(default)]
    pub secret_key: Option<String>,

    /// Bearer tokens accepted by the static token verifier.
    #[serde(skip_serializing, default)]
    #[builder(default)]
    pub auth_tokens: Vec<String>,

    /// Whether the downstream signature stage is skipped.
    #[builder(default = false)]
    pub skip_signature_validation: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset variables keep their default value.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Some(v) = lookup("DEFAULT_REGION") {
            config.default_region = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        config.access_key = lookup("ACCESS_KEY").or_else(|| lookup("AWS_ACCESS_KEY_ID"));
        config.secret_key = lookup("SECRET_KEY").or_else(|| lookup("AWS_SECRET_ACCESS_KEY"));
        if let Some(v) = lookup("AUTH_TOKENS") {
            config.auth_tokens = parse_list(&v);
        }
        if let Some(v) = lookup("SKIP_SIGNATURE_VALIDATION") {
            config.skip_signature_validation = parse_bool(&v);
        }

        config
    }

    /// The configured static credential, when both halves are present.
    #[must_use]
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.access_key, &self.secret_key) {
            (Some(access), Some(secret)) => Some((access.clone(), secret.clone())),
            _ => None,
        }
    }

    /// Parse [`gateway_listen`](Self::gateway_listen) into a socket address.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if the value is not a valid `host:port` address.
    pub fn socket_addr(&self) -> GatewayResult<SocketAddr> {
        self.gateway_listen.parse().map_err(|_| {
            GatewayError::Config(format!("invalid bind address: {}", self.gateway_listen))
        })
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Split a comma-separated list, dropping empty entries.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
