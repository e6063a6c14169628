//! AWS Signature Version 4 verification.
//!
//! [`CredentialSignatureVerifier`] implements [`SignatureVerifier`] for both
//! header-signed requests and presigned URLs:
//!
//! 1. Parse the credential scope, signed headers and provided signature.
//! 2. Rebuild the canonical request from the request head.
//! 3. Build the string to sign and derive the signing key via the HMAC chain.
//! 4. Compare the expected and provided signatures in constant time.
//!
//! A signature mismatch is `Ok(false)`. Everything else that stops the
//! comparison (unknown key, missing header, expired URL) is an [`AuthError`].
//!
//! Header-signed requests must carry an `x-amz-date` on the credential scope
//! date and within [`MAX_CLOCK_SKEW_SECS`] of the verifier's clock. Presigned
//! URLs may not be dated further than that into the future.

pub mod canonical;
pub mod credentials;
pub mod header;
pub mod presigned;

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use hmac::{Hmac, KeyInit, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::debug;

pub use credentials::{CredentialProvider, StaticCredentialProvider};
pub use header::AuthorizationHeader;
pub use presigned::PresignedParams;

use crate::constants::{MAX_CLOCK_SKEW_SECS, SIGN_V4_ALGORITHM, UNSIGNED_PAYLOAD, X_AMZ_DATE};
use crate::error::AuthError;
use crate::request::RequestView;
use crate::verifier::SignatureVerifier;

type HmacSha256 = Hmac<Sha256>;

/// Terminator of every SigV4 credential scope.
const SCOPE_TERMINATOR: &str = "aws4_request";

/// ISO 8601 basic format of `x-amz-date` and `X-Amz-Date`.
const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// The `AKID/date/region/service/aws4_request` credential scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningScope {
    /// Access key ID.
    pub access_key_id: String,
    /// Scope date, `YYYYMMDD`.
    pub date: String,
    /// AWS region.
    pub region: String,
    /// AWS service.
    pub service: String,
}

impl SigningScope {
    /// Parse a credential string.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredential`] unless the value has five
    /// non-empty `/`-separated parts ending in `aws4_request`.
    pub fn parse(credential: &str) -> Result<Self, AuthError> {
        let parts: Vec<&str> = credential.split('/').collect();
        match parts.as_slice() {
            [akid, date, region, service, SCOPE_TERMINATOR]
                if !akid.is_empty() && date.len() == 8 =>
            {
                Ok(Self {
                    access_key_id: (*akid).to_owned(),
                    date: (*date).to_owned(),
                    region: (*region).to_owned(),
                    service: (*service).to_owned(),
                })
            }
            _ => Err(AuthError::InvalidCredential),
        }
    }

    /// `date/region/service/aws4_request`, as used in the string to sign.
    #[must_use]
    pub fn credential_scope(&self) -> String {
        format!(
            "{}/{}/{}/{SCOPE_TERMINATOR}",
            self.date, self.region, self.service
        )
    }
}

/// The SigV4 string to sign.
#[must_use]
pub fn string_to_sign(timestamp: &str, scope: &SigningScope, canonical_request: &str) -> String {
    let canonical_hash = hash_payload(canonical_request.as_bytes());
    format!(
        "{SIGN_V4_ALGORITHM}\n{timestamp}\n{}\n{canonical_hash}",
        scope.credential_scope()
    )
}

/// Derive the signing key: `HMAC(HMAC(HMAC(HMAC("AWS4"+secret, date), region), service), "aws4_request")`.
#[must_use]
pub fn derive_signing_key(secret_key: &str, scope: &SigningScope) -> Vec<u8> {
    [
        scope.date.as_bytes(),
        scope.region.as_bytes(),
        scope.service.as_bytes(),
        SCOPE_TERMINATOR.as_bytes(),
    ]
    .iter()
    .fold(format!("AWS4{secret_key}").into_bytes(), |key, data| {
        hmac_sha256(&key, data)
    })
}

/// Hex HMAC-SHA256 of `data` under `signing_key`.
#[must_use]
pub fn compute_signature(signing_key: &[u8], data: &str) -> String {
    hex::encode(hmac_sha256(signing_key, data.as_bytes()))
}

/// Lowercase hex SHA-256 of `payload`.
///
/// ```
/// use bucketguard_auth::sigv4::hash_payload;
///
/// assert_eq!(
///     hash_payload(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// Parse a `YYYYMMDDTHHMMSSZ` request timestamp.
///
/// # Errors
///
/// Returns [`AuthError::InvalidParam`] for any other shape.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, AuthError> {
    NaiveDateTime::parse_from_str(value, AMZ_DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| AuthError::InvalidParam {
            field: "X-Amz-Date",
            value: value.to_owned(),
        })
}

/// Fail unless `timestamp` falls on the scope's date.
fn check_scope_date(timestamp: &str, scope: &SigningScope) -> Result<(), AuthError> {
    if timestamp.starts_with(scope.date.as_str()) {
        Ok(())
    } else {
        Err(AuthError::InvalidParam {
            field: "X-Amz-Date",
            value: timestamp.to_owned(),
        })
    }
}

/// Fail if `signed_at` lies more than the allowed skew after `now`.
fn check_not_future(signed_at: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), AuthError> {
    if signed_at - now > TimeDelta::seconds(MAX_CLOCK_SKEW_SECS) {
        return Err(AuthError::RequestTimeTooSkewed(
            signed_at.format(AMZ_DATE_FORMAT).to_string(),
        ));
    }
    Ok(())
}

/// Fail unless `timestamp` is a scope-dated timestamp within the skew window around `now`.
fn check_request_time(
    timestamp: &str,
    scope: &SigningScope,
    now: DateTime<Utc>,
) -> Result<(), AuthError> {
    let signed_at = parse_timestamp(timestamp)?;
    check_scope_date(timestamp, scope)?;
    if (now - signed_at).abs() > TimeDelta::seconds(MAX_CLOCK_SKEW_SECS) {
        return Err(AuthError::RequestTimeTooSkewed(timestamp.to_owned()));
    }
    Ok(())
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// [`SignatureVerifier`] backed by a [`CredentialProvider`].
#[derive(Clone)]
pub struct CredentialSignatureVerifier {
    credentials: Arc<dyn CredentialProvider>,
    clock: fn() -> DateTime<Utc>,
}

impl std::fmt::Debug for CredentialSignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSignatureVerifier")
            .finish_non_exhaustive()
    }
}

impl CredentialSignatureVerifier {
    /// Create a verifier that resolves secrets through `credentials`.
    pub fn new(credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            credentials,
            clock: Utc::now,
        }
    }

    /// Replace the clock used for the skew window and presigned URL expiry.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    fn signature_matches(
        &self,
        req: &dyn RequestView,
        scope: &SigningScope,
        timestamp: &str,
        canonical_request: &str,
        provided: &str,
    ) -> Result<bool, AuthError> {
        let secret_key = self.credentials.get_secret_key(&scope.access_key_id)?;
        let string_to_sign = string_to_sign(timestamp, scope, canonical_request);
        let expected = compute_signature(&derive_signing_key(&secret_key, scope), &string_to_sign);
        let matched: bool = expected.as_bytes().ct_eq(provided.as_bytes()).into();

        debug!(
            access_key_id = %scope.access_key_id,
            path = req.path(),
            matched,
            "computed SigV4 signature"
        );
        Ok(matched)
    }
}

impl SignatureVerifier for CredentialSignatureVerifier {
    fn verify_signed(&self, req: &dyn RequestView, payload_hash: &str) -> Result<bool, AuthError> {
        let value = req
            .header_str(http::header::AUTHORIZATION.as_str())
            .ok_or(AuthError::MissingAuthHeader)?;
        let parsed = AuthorizationHeader::parse(value)?;
        let timestamp = req
            .header_str(X_AMZ_DATE)
            .ok_or_else(|| AuthError::MissingHeader(X_AMZ_DATE.to_owned()))?;
        check_request_time(timestamp, &parsed.scope, (self.clock)())?;
        let canonical =
            canonical::canonical_request(req, &parsed.signed_headers, payload_hash, None)?;

        self.signature_matches(req, &parsed.scope, timestamp, &canonical, &parsed.signature)
    }

    fn verify_presigned(&self, req: &dyn RequestView) -> Result<bool, AuthError> {
        let parsed = PresignedParams::parse(req.query().unwrap_or(""))?;
        check_scope_date(&parsed.timestamp, &parsed.scope)?;
        parsed.check_expiry((self.clock)())?;
        let canonical = canonical::canonical_request(
            req,
            &parsed.signed_headers,
            UNSIGNED_PAYLOAD,
            Some(presigned::SIGNATURE_PARAM),
        )?;

        self.signature_matches(
            req,
            &parsed.scope,
            &parsed.timestamp,
            &canonical,
            &parsed.signature,
        )
    }
}
