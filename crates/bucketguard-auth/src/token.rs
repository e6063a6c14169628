//! In-memory bearer token verification.

use subtle::{Choice, ConstantTimeEq};
use tracing::debug;

use crate::constants::BEARER_PREFIX;
use crate::request::RequestView;
use crate::verifier::TokenVerifier;

/// Extract the token following `Bearer` and at least one space or tab, trimmed.
///
/// Returns `None` when the header is absent or not visible ASCII. Also `None`
/// when the prefix is missing or glued to the token (`Bearerxyz`), or when the
/// token is empty.
#[must_use]
pub fn bearer_token(req: &dyn RequestView) -> Option<&str> {
    req.header_str(http::header::AUTHORIZATION.as_str())?
        .strip_prefix(BEARER_PREFIX)
        .filter(|rest| rest.starts_with([' ', '\t']))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// A [`TokenVerifier`] that accepts a fixed set of opaque tokens.
///
/// Suitable for development and tests. Every configured token is compared in
/// constant time.
///
/// # Examples
///
/// ```
/// use bucketguard_auth::{StaticTokenVerifier, TokenVerifier};
///
/// let verifier = StaticTokenVerifier::new(vec!["s3cr3t".to_owned()]);
/// let req = http::Request::builder()
///     .header("Authorization", "Bearer s3cr3t")
///     .body(())
///     .unwrap();
/// assert!(verifier.verify_token(&req));
/// ```
#[derive(Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: Vec<String>,
}

impl std::fmt::Debug for StaticTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenVerifier")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

impl StaticTokenVerifier {
    /// Create a verifier accepting the given tokens. Empty tokens are dropped.
    pub fn new(tokens: impl IntoIterator<Item = String>) -> Self {
        Self {
            tokens: tokens.into_iter().filter(|t| !t.is_empty()).collect(),
        }
    }

    /// Number of accepted tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no token is accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify_token(&self, req: &dyn RequestView) -> bool {
        let Some(presented) = bearer_token(req) else {
            debug!("bearer token missing or empty");
            return false;
        };

        let matched = self
            .tokens
            .iter()
            .fold(Choice::from(0), |acc, known| {
                acc | known.as_bytes().ct_eq(presented.as_bytes())
            });
        matched.into()
    }
}
