//! Request authentication classification.
//!
//! The predicates below overlap: a request may carry both a SigV4
//! `Authorization` header and an `X-Amz-Credential` query parameter. The
//! classifier therefore walks [`CLASSIFICATION_RULES`] in order and the first
//! predicate that holds decides the [`AuthType`]. A request that matches no
//! rule has an `Authorization` header of an unrecognized shape and is
//! [`AuthType::Unknown`], never anonymous.

use crate::auth_type::AuthType;
use crate::constants::{
    BEARER_PREFIX, MULTIPART_FORM_DATA, PRESIGNED_CREDENTIAL_PARAM, SIGN_V4_ALGORITHM,
};
use crate::request::RequestView;

/// A classification predicate.
pub type Predicate = fn(&dyn RequestView) -> bool;

/// Ordered (predicate, result) pairs. First match wins; no match is [`AuthType::Unknown`].
pub const CLASSIFICATION_RULES: [(Predicate, AuthType); 5] = [
    (is_sigv4_request as Predicate, AuthType::Signed),
    (is_presigned_request as Predicate, AuthType::Presigned),
    (is_bearer_request as Predicate, AuthType::TokenAuth),
    (is_post_policy_request as Predicate, AuthType::PostPolicy),
    (lacks_authorization_header as Predicate, AuthType::Anonymous),
];

/// Classify a request into exactly one [`AuthType`].
///
/// Total and side-effect free.
///
/// # Examples
///
/// ```
/// use bucketguard_auth::{AuthType, classify};
///
/// let req = http::Request::builder()
///     .uri("/bucket/key")
///     .header("Authorization", "Basic dXNlcjpwYXNz")
///     .body(())
///     .unwrap();
/// assert_eq!(classify(&req), AuthType::Unknown);
/// ```
#[must_use]
pub fn classify(req: &dyn RequestView) -> AuthType {
    CLASSIFICATION_RULES
        .iter()
        .find(|(matches, _)| matches(req))
        .map_or(AuthType::Unknown, |&(_, auth_type)| auth_type)
}

/// `Authorization` starts with `Bearer`.
#[must_use]
pub fn is_bearer_request(req: &dyn RequestView) -> bool {
    authorization_starts_with(req, BEARER_PREFIX)
}

/// `Authorization` starts with `AWS4-HMAC-SHA256`.
#[must_use]
pub fn is_sigv4_request(req: &dyn RequestView) -> bool {
    authorization_starts_with(req, SIGN_V4_ALGORITHM)
}

/// An `X-Amz-Credential` query parameter is present. Its value is not inspected.
#[must_use]
pub fn is_presigned_request(req: &dyn RequestView) -> bool {
    req.has_query_param(PRESIGNED_CREDENTIAL_PARAM)
}

/// A `POST` whose `Content-Type` contains `multipart/form-data`.
#[must_use]
pub fn is_post_policy_request(req: &dyn RequestView) -> bool {
    *req.method() == http::Method::POST
        && req
            .header(http::header::CONTENT_TYPE.as_str())
            .is_some_and(|v| contains_bytes(v.as_bytes(), MULTIPART_FORM_DATA.as_bytes()))
}

/// No `Authorization` header at all.
#[must_use]
pub fn lacks_authorization_header(req: &dyn RequestView) -> bool {
    !req.has_header(http::header::AUTHORIZATION.as_str())
}

/// True unless the request claims a token, SigV4, presigned or form-policy scheme.
///
/// Agrees with [`classify`] returning [`AuthType::Anonymous`] for every request
/// that has no `Authorization` header.
#[must_use]
pub fn is_anonymous_request(req: &dyn RequestView) -> bool {
    !(is_bearer_request(req)
        || is_sigv4_request(req)
        || is_presigned_request(req)
        || is_post_policy_request(req))
}

fn authorization_starts_with(req: &dyn RequestView, prefix: &str) -> bool {
    req.header(http::header::AUTHORIZATION.as_str())
        .is_some_and(|v| v.as_bytes().starts_with(prefix.as_bytes()))
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
