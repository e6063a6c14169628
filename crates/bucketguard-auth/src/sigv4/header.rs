//! Parsing of the SigV4 `Authorization` header.
//!
//! ```text
//! AWS4-HMAC-SHA256 Credential=AKID/20130524/us-east-1/s3/aws4_request,
//!   SignedHeaders=host;x-amz-content-sha256;x-amz-date,
//!   Signature=<hex-signature>
//! ```

use crate::constants::SIGN_V4_ALGORITHM;
use crate::error::AuthError;

use super::SigningScope;

/// Components of a SigV4 `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationHeader {
    /// Credential scope from `Credential=`.
    pub scope: SigningScope,
    /// Signed header names as sent, in the client's order.
    pub signed_headers: Vec<String>,
    /// Hex signature from `Signature=`.
    pub signature: String,
}

impl AuthorizationHeader {
    /// Parse an `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnsupportedAlgorithm`] for anything but
    /// `AWS4-HMAC-SHA256`, [`AuthError::InvalidCredential`] for a malformed
    /// scope and [`AuthError::InvalidAuthHeader`] when a component is missing.
    pub fn parse(value: &str) -> Result<Self, AuthError> {
        let (algorithm, rest) = value
            .trim()
            .split_once(' ')
            .ok_or(AuthError::InvalidAuthHeader)?;
        if algorithm != SIGN_V4_ALGORITHM {
            return Err(AuthError::UnsupportedAlgorithm(algorithm.to_owned()));
        }

        let mut credential = None;
        let mut signed_headers = None;
        let mut signature = None;
        for component in rest.split(',').map(str::trim) {
            match component.split_once('=') {
                Some(("Credential", v)) => credential = Some(v),
                Some(("SignedHeaders", v)) => signed_headers = Some(v),
                Some(("Signature", v)) => signature = Some(v),
                _ => {}
            }
        }

        let scope = SigningScope::parse(credential.ok_or(AuthError::InvalidAuthHeader)?)?;
        let signed_headers = signed_headers
            .ok_or(AuthError::InvalidAuthHeader)?
            .split(';')
            .filter(|h| !h.is_empty())
            .map(ToOwned::to_owned)
            .collect::<Vec<_>>();
        let signature = signature.ok_or(AuthError::InvalidAuthHeader)?;
        if signed_headers.is_empty() || signature.is_empty() {
            return Err(AuthError::InvalidAuthHeader);
        }

        Ok(Self {
            scope,
            signed_headers,
            signature: signature.to_owned(),
        })
    }
}
