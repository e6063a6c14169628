//! HTTP layer for BucketGuard.
//!
//! This crate puts authentication classification in front of a downstream
//! handler. It provides:
//!
//! - [`GatewayService`]: a hyper `Service` adding request ids, health checks
//!   and common headers around [`AuthDispatch`]
//! - [`AuthDispatch`] and [`decide`]: the classify, gate, forward-or-reject
//!   state machine
//! - [`SignatureStage`]: a downstream stage that re-verifies SigV4 signatures
//!   with the real body hash
//! - [`GatewayBody`]: the response body type
//! - [`error_response`]: S3-style XML rejections

pub mod body;
pub mod dispatch;
pub mod response;
pub mod service;
pub mod stage;

pub use body::GatewayBody;
pub use dispatch::{AuthDecision, AuthDispatch, HandlerFuture, RequestHandler, RequestId, decide};
pub use response::{error_response, error_to_xml, unauthorized_response};
pub use service::GatewayService;
pub use stage::SignatureStage;
