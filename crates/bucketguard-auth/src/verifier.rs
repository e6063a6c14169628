//! Verifier seams and the mapping from verifier results to [`ErrorCode`]s.
//!
//! The cryptography lives behind [`SignatureVerifier`] and [`TokenVerifier`];
//! this module only decides which verifier call a request gets and what its
//! answer means for the client.

use tracing::{debug, error};

use crate::classify::{is_presigned_request, is_sigv4_request};
use crate::constants::EMPTY_PAYLOAD_SHA256;
use crate::error::{AuthError, ErrorCode};
use crate::request::RequestView;

/// Checks SigV4 header signatures and presigned URL signatures.
///
/// `Ok(false)` means the signature was computed and does not match.
/// `Err(_)` means no verdict could be reached.
pub trait SignatureVerifier: Send + Sync {
    /// Verify the `Authorization` header signature against `payload_hash`.
    fn verify_signed(&self, req: &dyn RequestView, payload_hash: &str) -> Result<bool, AuthError>;

    /// Verify the signature and expiry embedded in a presigned URL.
    fn verify_presigned(&self, req: &dyn RequestView) -> Result<bool, AuthError>;
}

/// Checks bearer tokens.
///
/// Malformed and invalid tokens are indistinguishable to callers.
pub trait TokenVerifier: Send + Sync {
    /// Whether the request's bearer token is valid.
    fn verify_token(&self, req: &dyn RequestView) -> bool;
}

/// Verdict of a signature check.
///
/// A rejected outcome always carries a code other than [`ErrorCode::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationOutcome {
    error: ErrorCode,
}

impl VerificationOutcome {
    /// The signature matched.
    #[must_use]
    pub fn matched() -> Self {
        Self {
            error: ErrorCode::None,
        }
    }

    /// The request is rejected with `code`. [`ErrorCode::None`] becomes
    /// [`ErrorCode::InternalError`].
    #[must_use]
    pub fn rejected(code: ErrorCode) -> Self {
        let error = match code {
            ErrorCode::None => ErrorCode::InternalError,
            other => other,
        };
        Self { error }
    }

    /// Whether the signature matched.
    #[must_use]
    pub fn is_match(self) -> bool {
        self.error == ErrorCode::None
    }

    /// [`ErrorCode::None`] on a match, the rejection code otherwise.
    #[must_use]
    pub fn error_code(self) -> ErrorCode {
        self.error
    }

    /// `Ok(())` on a match, `Err(code)` otherwise.
    ///
    /// # Errors
    ///
    /// Returns the rejection code when the signature did not match.
    pub fn into_result(self) -> Result<(), ErrorCode> {
        if self.is_match() {
            Ok(())
        } else {
            Err(self.error)
        }
    }
}

/// Check a request's SigV4 or presigned signature against an empty payload.
///
/// The header path hashes an empty body, so a request that signed a non-empty
/// body does not match here. Callers that hold the real body must re-check
/// with [`verify_request_signature_with_payload`] before trusting it.
///
/// | request | verifier result | outcome |
/// |---|---|---|
/// | SigV4 header or presigned query | `Ok(true)` | matched |
/// | SigV4 header or presigned query | `Ok(false)` | `SignatureDoesNotMatch` |
/// | SigV4 header or presigned query | `Err(_)` | `InternalError` |
/// | neither | not called | `AccessDenied` |
pub fn verify_request_signature(
    verifier: &dyn SignatureVerifier,
    req: &dyn RequestView,
) -> VerificationOutcome {
    verify_request_signature_with_payload(verifier, req, EMPTY_PAYLOAD_SHA256)
}

/// Like [`verify_request_signature`], with an explicit payload hash for the header path.
pub fn verify_request_signature_with_payload(
    verifier: &dyn SignatureVerifier,
    req: &dyn RequestView,
    payload_hash: &str,
) -> VerificationOutcome {
    let (kind, result) = if is_sigv4_request(req) {
        ("signature", verifier.verify_signed(req, payload_hash))
    } else if is_presigned_request(req) {
        ("presigned signature", verifier.verify_presigned(req))
    } else {
        return VerificationOutcome::rejected(ErrorCode::AccessDenied);
    };

    match result {
        Ok(true) => VerificationOutcome::matched(),
        Ok(false) => {
            debug!(path = req.path(), kind, "signature does not match");
            VerificationOutcome::rejected(ErrorCode::SignatureDoesNotMatch)
        }
        Err(err) => {
            error!(path = req.path(), kind, error = %err, "signature verification failed");
            VerificationOutcome::rejected(ErrorCode::InternalError)
        }
    }
}
