//! Parsing and expiry of presigned URL query parameters.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};

use crate::constants::{MAX_PRESIGNED_EXPIRES_SECS, SIGN_V4_ALGORITHM};
use crate::error::AuthError;

use super::{SigningScope, check_not_future, parse_timestamp};

/// Query parameter carrying the presigned signature; excluded from the canonical query.
pub const SIGNATURE_PARAM: &str = "X-Amz-Signature";

/// Components of a presigned URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedParams {
    /// Credential scope from `X-Amz-Credential`.
    pub scope: SigningScope,
    /// ISO 8601 basic timestamp from `X-Amz-Date`.
    pub timestamp: String,
    /// Validity in seconds from `X-Amz-Expires`.
    pub expires: u64,
    /// Signed header names from `X-Amz-SignedHeaders`.
    pub signed_headers: Vec<String>,
    /// Hex signature from `X-Amz-Signature`.
    pub signature: String,
}

impl PresignedParams {
    /// Parse the raw query string of a presigned URL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingQueryParam`] for an absent parameter,
    /// [`AuthError::UnsupportedAlgorithm`], [`AuthError::InvalidCredential`] or
    /// [`AuthError::InvalidParam`] for malformed ones.
    pub fn parse(query: &str) -> Result<Self, AuthError> {
        let params: HashMap<String, String> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        let required = |name: &str| {
            params
                .get(name)
                .map(String::as_str)
                .ok_or_else(|| AuthError::MissingQueryParam(name.to_owned()))
        };

        let algorithm = required("X-Amz-Algorithm")?;
        if algorithm != SIGN_V4_ALGORITHM {
            return Err(AuthError::UnsupportedAlgorithm(algorithm.to_owned()));
        }

        let scope = SigningScope::parse(required("X-Amz-Credential")?)?;
        let timestamp = required("X-Amz-Date")?.to_owned();
        let expires_raw = required("X-Amz-Expires")?;
        let expires = expires_raw
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs <= MAX_PRESIGNED_EXPIRES_SECS)
            .ok_or_else(|| AuthError::InvalidParam {
                field: "X-Amz-Expires",
                value: expires_raw.to_owned(),
            })?;
        let signed_headers = required("X-Amz-SignedHeaders")?
            .split(';')
            .filter(|h| !h.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        let signature = required(SIGNATURE_PARAM)?.to_owned();

        Ok(Self {
            scope,
            timestamp,
            expires,
            signed_headers,
            signature,
        })
    }

    /// Fail with [`AuthError::RequestExpired`] if `now` is past the URL's validity window.
    ///
    /// # Errors
    ///
    /// Also returns [`AuthError::InvalidParam`] if `X-Amz-Date` is not `YYYYMMDDTHHMMSSZ`,
    /// and [`AuthError::RequestTimeTooSkewed`] if it lies beyond the skew window
    /// after `now`.
    pub fn check_expiry(&self, now: DateTime<Utc>) -> Result<(), AuthError> {
        let signed_at = parse_timestamp(&self.timestamp)?;
        check_not_future(signed_at, now)?;
        let validity = TimeDelta::try_seconds(i64::try_from(self.expires).unwrap_or(i64::MAX))
            .ok_or(AuthError::RequestExpired)?;
        if now > signed_at + validity {
            return Err(AuthError::RequestExpired);
        }
        Ok(())
    }
}
