//! Request authentication classification and verification for BucketGuard.
//!
//! An incoming request claims at most one authentication scheme: a SigV4
//! `Authorization` header, a presigned URL, a bearer token, a browser form
//! POST policy, or nothing at all. This crate decides which scheme a request
//! claims and provides the verifier seams the gateway dispatches to.
//!
//! # Overview
//!
//! - [`classify`] maps a request to exactly one [`AuthType`] by walking an
//!   ordered rule table; the first matching predicate wins.
//! - [`SignatureVerifier`] and [`TokenVerifier`] are the cryptographic
//!   collaborators. [`verify_request_signature`] turns a signature verifier's
//!   answer into a [`VerificationOutcome`] carrying an [`ErrorCode`].
//! - [`sigv4::CredentialSignatureVerifier`] and [`StaticTokenVerifier`] are
//!   in-memory implementations for development and tests.
//!
//! # Usage
//!
//! ```rust
//! use bucketguard_auth::{AuthType, classify};
//!
//! let req = http::Request::builder()
//!     .method("GET")
//!     .uri("/bucket/key?X-Amz-Credential=AKIDEXAMPLE%2F20150830")
//!     .body(())
//!     .unwrap();
//! assert_eq!(classify(&req), AuthType::Presigned);
//! ```
//!
//! # Modules
//!
//! - [`classify`](mod@classify) - Scheme predicates and the ordered classifier
//! - [`constants`] - Prefixes and names that define the matching contract
//! - [`error`] - [`ErrorCode`] and [`AuthError`]
//! - [`request`] - The [`RequestView`] facade over `http` requests
//! - [`sigv4`] - SigV4 header and presigned URL verification
//! - [`token`] - Bearer token extraction and static token verification
//! - [`verifier`] - Verifier traits and signature outcome mapping

pub mod auth_type;
pub mod classify;
pub mod constants;
pub mod error;
pub mod request;
pub mod sigv4;
pub mod token;
pub mod verifier;

pub use auth_type::AuthType;
pub use classify::{
    CLASSIFICATION_RULES, classify, is_anonymous_request, is_bearer_request,
    is_post_policy_request, is_presigned_request, is_sigv4_request,
};
pub use error::{AuthError, ErrorCode};
pub use request::RequestView;
pub use token::{StaticTokenVerifier, bearer_token};
pub use verifier::{
    SignatureVerifier, TokenVerifier, VerificationOutcome, verify_request_signature,
    verify_request_signature_with_payload,
};
