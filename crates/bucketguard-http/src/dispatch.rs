//! Authentication dispatch: classify, gate, then forward or reject.
//!
//! [`decide`] is the whole state machine and performs no I/O:
//!
//! | classified as | decision |
//! |---|---|
//! | `Anonymous`, `Presigned`, `Signed`, `PostPolicy` | forward |
//! | `TokenAuth`, token valid | forward |
//! | `TokenAuth`, token invalid | `401 Unauthorized`, empty body |
//! | `Unknown` | reject with `SignatureVersionNotSupported` |
//!
//! [`AuthDispatch`] applies a decision to a real request and downstream
//! [`RequestHandler`]. The handler runs at most once, and only on forward.

use std::future::{self, Future};
use std::pin::Pin;
use std::sync::Arc;

use bucketguard_auth::{AuthType, ErrorCode, RequestView, TokenVerifier, classify};
use tracing::{debug, warn};

use crate::body::GatewayBody;
use crate::response::{error_response, unauthorized_response};

/// Boxed future returned by a [`RequestHandler`].
pub type HandlerFuture = Pin<Box<dyn Future<Output = http::Response<GatewayBody>> + Send>>;

/// Downstream stage that receives forwarded requests.
///
/// Forwarded requests carry their [`AuthType`] and [`RequestId`] in
/// [`http::Extensions`].
pub trait RequestHandler<B>: Send + Sync + 'static {
    /// Handle a forwarded request and produce a response.
    fn handle(&self, req: http::Request<B>) -> HandlerFuture;
}

/// Request id generated by the gateway, readable from request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// What the dispatcher does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    /// Pass the request downstream, tagged with its scheme.
    Forward(AuthType),
    /// Bearer token rejected: `401` with no body.
    Unauthorized,
    /// Scheme rejected with a structured error.
    Reject(ErrorCode),
}

/// Decide the fate of a request.
///
/// Only bearer-token requests consult `tokens`. Signed, presigned and
/// POST policy requests are forwarded unverified for a later stage to check.
pub fn decide(req: &dyn RequestView, tokens: &dyn TokenVerifier) -> AuthDecision {
    match classify(req) {
        AuthType::TokenAuth => {
            if tokens.verify_token(req) {
                AuthDecision::Forward(AuthType::TokenAuth)
            } else {
                AuthDecision::Unauthorized
            }
        }
        deferred if deferred.is_deferred() => AuthDecision::Forward(deferred),
        _ => AuthDecision::Reject(ErrorCode::SignatureVersionNotSupported),
    }
}

/// Authentication middleware in front of a downstream handler.
pub struct AuthDispatch<H> {
    handler: Arc<H>,
    tokens: Arc<dyn TokenVerifier>,
}

impl<H> AuthDispatch<H> {
    /// Wrap `handler`, gating bearer-token requests with `tokens`.
    #[must_use]
    pub fn new(handler: Arc<H>, tokens: Arc<dyn TokenVerifier>) -> Self {
        Self { handler, tokens }
    }

    /// Run [`decide`] on `req` and apply the decision.
    pub fn call<B>(&self, mut req: http::Request<B>, request_id: &str) -> HandlerFuture
    where
        H: RequestHandler<B>,
    {
        let path = req.uri().path().to_owned();
        match decide(&req, self.tokens.as_ref()) {
            AuthDecision::Forward(auth_type) => {
                debug!(%auth_type, %path, request_id, "forwarding request");
                let extensions = req.extensions_mut();
                extensions.insert(auth_type);
                extensions.insert(RequestId(request_id.to_owned()));
                self.handler.handle(req)
            }
            AuthDecision::Unauthorized => {
                warn!(%path, request_id, "bearer token rejected");
                Box::pin(future::ready(unauthorized_response()))
            }
            AuthDecision::Reject(code) => {
                warn!(%code, %path, request_id, "unsupported authorization scheme");
                Box::pin(future::ready(error_response(code, &path, request_id)))
            }
        }
    }
}

impl<H> Clone for AuthDispatch<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

impl<H> std::fmt::Debug for AuthDispatch<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthDispatch")
            .field("handler", &std::any::type_name::<H>())
            .field("tokens", &"...")
            .finish()
    }
}
