//! Error types for request authentication.
//!
//! [`ErrorCode`] is the closed set of outcomes the gateway itself reports to
//! clients. [`AuthError`] describes why a verifier could not reach a verdict.

use std::fmt;

/// Result tag handed to the error-response serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorCode {
    /// Success.
    #[default]
    None,
    /// The computed signature does not match the one supplied.
    SignatureDoesNotMatch,
    /// The verifier failed before reaching a verdict.
    InternalError,
    /// The request carries no verifiable signature.
    AccessDenied,
    /// The `Authorization` header uses an unsupported scheme.
    SignatureVersionNotSupported,
}

impl ErrorCode {
    /// The S3 wire code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::SignatureDoesNotMatch => "SignatureDoesNotMatch",
            Self::InternalError => "InternalError",
            Self::AccessDenied => "AccessDenied",
            Self::SignatureVersionNotSupported => "SignatureVersionNotSupported",
        }
    }

    /// HTTP status used when this code is returned to a client.
    #[must_use]
    pub fn status_code(self) -> http::StatusCode {
        match self {
            Self::None => http::StatusCode::OK,
            Self::SignatureDoesNotMatch | Self::AccessDenied => http::StatusCode::FORBIDDEN,
            Self::InternalError => http::StatusCode::INTERNAL_SERVER_ERROR,
            Self::SignatureVersionNotSupported => http::StatusCode::BAD_REQUEST,
        }
    }

    /// Human-readable description matching S3's wording.
    #[must_use]
    pub fn default_message(self) -> &'static str {
        match self {
            Self::None => "",
            Self::SignatureDoesNotMatch => {
                "The request signature we calculated does not match the signature you provided. \
                 Check your key and signing method."
            }
            Self::InternalError => "We encountered an internal error, please try again.",
            Self::AccessDenied => "Access Denied.",
            Self::SignatureVersionNotSupported => {
                "The authorization mechanism you have provided is not supported. \
                 Please use AWS4-HMAC-SHA256."
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors a verifier can hit before it is able to compare signatures.
///
/// A plain signature mismatch is not an error; verifiers report it as `Ok(false)`.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The `Authorization` header is missing from the request.
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    /// The `Authorization` header could not be parsed.
    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    /// The signing algorithm is not `AWS4-HMAC-SHA256`.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A header named in the signed header list is missing.
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// The credential is not `AKID/date/region/service/aws4_request`.
    #[error("Invalid credential format")]
    InvalidCredential,

    /// The access key ID was not found in the credential store.
    #[error("Access key not found: {0}")]
    AccessKeyNotFound(String),

    /// A required presigned query parameter is missing.
    #[error("Missing required query parameter: {0}")]
    MissingQueryParam(String),

    /// A timestamp or expiry could not be parsed.
    #[error("Invalid {field}: {value}")]
    InvalidParam {
        /// Parameter or header name.
        field: &'static str,
        /// Offending value.
        value: String,
    },

    /// The presigned URL is past its expiry.
    #[error("Request has expired")]
    RequestExpired,

    /// The request timestamp is too far from the gateway clock.
    #[error("Request time too skewed: {0}")]
    RequestTimeTooSkewed(String),
}
