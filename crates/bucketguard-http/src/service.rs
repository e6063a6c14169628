//! The gateway's hyper service.
//!
//! [`GatewayService`] handles, in order:
//!
//! 1. Health check interception (`GET /_health`, `GET /health`)
//! 2. Authentication dispatch via [`AuthDispatch`]
//! 3. Common response headers (`x-amz-request-id`, `x-amz-id-2`, `Server`)

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bucketguard_auth::TokenVerifier;
use hyper::service::Service;
use tracing::debug;
use uuid::Uuid;

use crate::body::GatewayBody;
use crate::dispatch::{AuthDispatch, RequestHandler};

/// Value of the `Server` response header.
pub const SERVER_NAME: &str = "BucketGuard";

/// hyper service placing [`AuthDispatch`] in front of a handler.
///
/// Generic over the request body so it serves `hyper::body::Incoming` in
/// production and buffered bodies in tests.
pub struct GatewayService<H> {
    dispatch: AuthDispatch<H>,
}

impl<H> GatewayService<H> {
    /// Create a service forwarding authorized requests to `handler`.
    #[must_use]
    pub fn new(handler: H, tokens: Arc<dyn TokenVerifier>) -> Self {
        Self::from_shared(Arc::new(handler), tokens)
    }

    /// Create a service from an already shared handler.
    #[must_use]
    pub fn from_shared(handler: Arc<H>, tokens: Arc<dyn TokenVerifier>) -> Self {
        Self {
            dispatch: AuthDispatch::new(handler, tokens),
        }
    }
}

impl<H> Clone for GatewayService<H> {
    fn clone(&self) -> Self {
        Self {
            dispatch: self.dispatch.clone(),
        }
    }
}

impl<H> std::fmt::Debug for GatewayService<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayService")
            .field("dispatch", &self.dispatch)
            .finish()
    }
}

impl<B, H> Service<http::Request<B>> for GatewayService<H>
where
    H: RequestHandler<B>,
{
    type Response = http::Response<GatewayBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let request_id = Uuid::new_v4().to_string();
        debug!(method = %req.method(), uri = %req.uri(), %request_id, "processing request");

        let pending = if is_health_check(req.method(), req.uri().path()) {
            None
        } else {
            Some(self.dispatch.call(req, &request_id))
        };

        Box::pin(async move {
            let response = match pending {
                Some(fut) => fut.await,
                None => health_check_response(),
            };
            Ok(add_common_headers(response, &request_id))
        })
    }
}

/// Check if the request is a health check probe.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && (path == "/_health" || path == "/health")
}

fn health_check_response() -> http::Response<GatewayBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(GatewayBody::from_string(
            r#"{"status":"running","service":"bucketguard"}"#,
        ))
        .expect("static health response should be valid")
}

/// Add common response headers to every gateway response.
fn add_common_headers(
    mut response: http::Response<GatewayBody>,
    request_id: &str,
) -> http::Response<GatewayBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::header::HeaderValue::from_str(request_id) {
        headers.insert("x-amz-request-id", hv.clone());
        headers.insert("x-amz-id-2", hv);
    }
    headers.insert(
        http::header::SERVER,
        http::header::HeaderValue::from_static(SERVER_NAME),
    );

    response
}
