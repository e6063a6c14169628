//! Downstream handler that reports what the gateway let through.
//!
//! BucketGuard has no storage of its own. [`InspectHandler`] answers every
//! forwarded request with a JSON summary so deployments and tests can see
//! which scheme was detected.

use bucketguard_auth::AuthType;
use bucketguard_http::{GatewayBody, HandlerFuture, RequestHandler, RequestId};
use bytes::Bytes;
use serde::Serialize;
use tracing::{error, info};

/// JSON body returned for a forwarded request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Inspection<'a> {
    auth_type: &'a str,
    method: &'a str,
    path: &'a str,
    body_length: usize,
    request_id: Option<&'a str>,
}

/// Echoes the detected scheme and request shape as JSON.
#[derive(Debug, Clone, Default)]
pub struct InspectHandler;

impl RequestHandler<Bytes> for InspectHandler {
    fn handle(&self, req: http::Request<Bytes>) -> HandlerFuture {
        let auth_type = req
            .extensions()
            .get::<AuthType>()
            .copied()
            .unwrap_or(AuthType::Unknown);
        let request_id = req.extensions().get::<RequestId>().map(|id| id.0.as_str());

        let inspection = Inspection {
            auth_type: auth_type.as_str(),
            method: req.method().as_str(),
            path: req.uri().path(),
            body_length: req.body().len(),
            request_id,
        };
        info!(
            auth_type = inspection.auth_type,
            method = inspection.method,
            path = inspection.path,
            body_length = inspection.body_length,
            "accepted request"
        );

        let response = match serde_json::to_vec(&inspection) {
            Ok(json) => http::Response::builder()
                .status(http::StatusCode::OK)
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(GatewayBody::from_bytes(json)),
            Err(e) => {
                error!(error = %e, "failed to serialize inspection");
                http::Response::builder()
                    .status(http::StatusCode::INTERNAL_SERVER_ERROR)
                    .body(GatewayBody::empty())
            }
        };
        let response = response.unwrap_or_else(|_| {
            let mut fallback = http::Response::new(GatewayBody::empty());
            *fallback.status_mut() = http::StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        });

        Box::pin(async move { response })
    }
}
