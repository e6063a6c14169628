//! Signature check with the real request body.
//!
//! [`AuthDispatch`](crate::AuthDispatch) forwards SigV4 and presigned requests
//! unverified. [`SignatureStage`] sits behind it, buffers the body, and checks
//! the signature against the body's actual SHA-256 before the inner handler
//! sees anything.
//!
//! Only the exact unsigned placeholders (`UNSIGNED-PAYLOAD` and
//! `STREAMING-UNSIGNED-PAYLOAD-TRAILER`) stand in for the body hash.
//! Uploads with per-chunk signatures are refused with `AccessDenied`, since
//! the chunk signature chain is not verified here. Any other
//! `x-amz-content-sha256` value is checked against the real body hash.

use std::fmt::Display;
use std::sync::Arc;

use bucketguard_auth::constants::{
    STREAMING_SIGNED_PAYLOAD, STREAMING_SIGNED_PAYLOAD_TRAILER,
    STREAMING_UNSIGNED_PAYLOAD_TRAILER, UNSIGNED_PAYLOAD, X_AMZ_CONTENT_SHA256,
};
use bucketguard_auth::sigv4::hash_payload;
use bucketguard_auth::{
    AuthType, ErrorCode, RequestView, SignatureVerifier, classify,
    verify_request_signature_with_payload,
};
use bytes::Bytes;
use http_body_util::BodyExt;
use tracing::{debug, error, warn};

use crate::dispatch::{HandlerFuture, RequestHandler, RequestId};
use crate::response::error_response;

/// Buffers the body and verifies SigV4 signatures before calling `inner`.
///
/// With no verifier configured every request passes through unchecked.
pub struct SignatureStage<H> {
    inner: Arc<H>,
    verifier: Option<Arc<dyn SignatureVerifier>>,
}

impl<H> SignatureStage<H> {
    /// Verify signatures with `verifier` before handing requests to `inner`.
    #[must_use]
    pub fn new(inner: H, verifier: Arc<dyn SignatureVerifier>) -> Self {
        Self {
            inner: Arc::new(inner),
            verifier: Some(verifier),
        }
    }

    /// Pass every request straight through to `inner`.
    #[must_use]
    pub fn skip_validation(inner: H) -> Self {
        Self {
            inner: Arc::new(inner),
            verifier: None,
        }
    }

    /// Whether signatures are checked.
    #[must_use]
    pub fn is_validating(&self) -> bool {
        self.verifier.is_some()
    }
}

impl<H> std::fmt::Debug for SignatureStage<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureStage")
            .field("inner", &std::any::type_name::<H>())
            .field("verifier", &self.verifier.as_ref().map(|_| "..."))
            .finish()
    }
}

impl<B, H> RequestHandler<B> for SignatureStage<H>
where
    B: http_body::Body + Send + 'static,
    B::Data: Send,
    B::Error: Display + Send,
    H: RequestHandler<Bytes>,
{
    fn handle(&self, req: http::Request<B>) -> HandlerFuture {
        let inner = Arc::clone(&self.inner);
        let verifier = self.verifier.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let request_id = parts
                .extensions
                .get::<RequestId>()
                .map(|id| id.0.clone())
                .unwrap_or_default();

            let body = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(err) => {
                    error!(error = %err, %request_id, "failed to collect request body");
                    return error_response(ErrorCode::InternalError, parts.uri.path(), &request_id);
                }
            };
            let req = http::Request::from_parts(parts, body);

            let rejection = verifier
                .as_deref()
                .and_then(|verifier| check_signature(verifier, &req).err());
            if let Some(code) = rejection {
                warn!(%code, path = req.uri().path(), %request_id, "signature rejected");
                return error_response(code, req.uri().path(), &request_id);
            }

            inner.handle(req).await
        })
    }
}

/// Verify signed and presigned requests against the buffered body.
///
/// Anonymous, token and POST policy requests are not SigV4 signed and pass.
fn check_signature(
    verifier: &dyn SignatureVerifier,
    req: &http::Request<Bytes>,
) -> Result<(), ErrorCode> {
    let auth_type = req
        .extensions()
        .get::<AuthType>()
        .copied()
        .unwrap_or_else(|| classify(req));
    if !matches!(auth_type, AuthType::Signed | AuthType::Presigned) {
        debug!(%auth_type, "no signature to verify");
        return Ok(());
    }

    let payload_hash = payload_hash(req)?;
    verify_request_signature_with_payload(verifier, req, &payload_hash).into_result()
}

/// The payload hash to verify against.
///
/// An unsigned placeholder is used as sent. Signed-chunk uploads are refused.
/// Anything else, including unknown `STREAMING-` values, is replaced by the
/// body's SHA-256.
fn payload_hash(req: &http::Request<Bytes>) -> Result<String, ErrorCode> {
    match req.header_str(X_AMZ_CONTENT_SHA256) {
        Some(hint @ (UNSIGNED_PAYLOAD | STREAMING_UNSIGNED_PAYLOAD_TRAILER)) => {
            Ok(hint.to_owned())
        }
        Some(STREAMING_SIGNED_PAYLOAD | STREAMING_SIGNED_PAYLOAD_TRAILER) => {
            debug!(path = req.uri().path(), "signed-chunk upload not supported");
            Err(ErrorCode::AccessDenied)
        }
        _ => Ok(hash_payload(req.body())),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bucketguard_auth::AuthError;
    use bucketguard_auth::constants::EMPTY_PAYLOAD_SHA256;
    use http_body_util::Full;

    use super::*;
    use crate::body::GatewayBody;

    #[derive(Default)]
    struct EchoHandler {
        calls: AtomicUsize,
    }

    impl RequestHandler<Bytes> for EchoHandler {
        fn handle(&self, req: http::Request<Bytes>) -> HandlerFuture {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let body = req.into_body();
            Box::pin(async move {
                http::Response::builder()
                    .status(http::StatusCode::OK)
                    .body(GatewayBody::from_bytes(body))
                    .unwrap()
            })
        }
    }

    /// Records the payload hash it was given and answers with a fixed verdict.
    struct RecordingVerifier {
        verdict: Result<bool, ()>,
        hashes: Mutex<Vec<String>>,
        presigned_calls: AtomicUsize,
    }

    impl RecordingVerifier {
        fn new(verdict: Result<bool, ()>) -> Arc<Self> {
            Arc::new(Self {
                verdict,
                hashes: Mutex::new(Vec::new()),
                presigned_calls: AtomicUsize::new(0),
            })
        }

        fn answer(&self) -> Result<bool, AuthError> {
            self.verdict.map_err(|()| AuthError::InvalidCredential)
        }
    }

    impl SignatureVerifier for RecordingVerifier {
        fn verify_signed(
            &self,
            _req: &dyn RequestView,
            payload_hash: &str,
        ) -> Result<bool, AuthError> {
            self.hashes.lock().unwrap().push(payload_hash.to_owned());
            self.answer()
        }

        fn verify_presigned(&self, _req: &dyn RequestView) -> Result<bool, AuthError> {
            self.presigned_calls.fetch_add(1, Ordering::SeqCst);
            self.answer()
        }
    }

    fn signed_put(body: &'static str, content_sha: Option<&str>) -> http::Request<Full<Bytes>> {
        let mut builder = http::Request::builder()
            .method("PUT")
            .uri("/bucket/key")
            .header(
                "authorization",
                "AWS4-HMAC-SHA256 Credential=AKID/20130524/us-east-1/s3/aws4_request, \
                 SignedHeaders=host, Signature=abc",
            );
        if let Some(hint) = content_sha {
            builder = builder.header(X_AMZ_CONTENT_SHA256, hint);
        }
        builder.body(Full::new(Bytes::from_static(body.as_bytes()))).unwrap()
    }

    fn stage(verifier: &Arc<RecordingVerifier>) -> SignatureStage<EchoHandler> {
        SignatureStage::new(
            EchoHandler::default(),
            Arc::clone(verifier) as Arc<dyn SignatureVerifier>,
        )
    }

    #[tokio::test]
    async fn test_should_verify_against_real_body_hash() {
        let verifier = RecordingVerifier::new(Ok(true));
        let stage = stage(&verifier);

        let resp = stage.handle(signed_put("hello", None)).await;

        assert_eq!(resp.status(), http::StatusCode::OK);
        let hashes = verifier.hashes.lock().unwrap().clone();
        assert_eq!(hashes, vec![hash_payload(b"hello")]);
        assert_ne!(hashes[0], EMPTY_PAYLOAD_SHA256);
        assert_eq!(stage.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_should_pass_unsigned_payload_placeholder() {
        let verifier = RecordingVerifier::new(Ok(true));
        let stage = stage(&verifier);

        let resp = stage
            .handle(signed_put("hello", Some(UNSIGNED_PAYLOAD)))
            .await;

        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(
            verifier.hashes.lock().unwrap().clone(),
            vec![UNSIGNED_PAYLOAD.to_owned()]
        );
    }

    #[tokio::test]
    async fn test_should_pass_unsigned_streaming_trailer_placeholder() {
        let verifier = RecordingVerifier::new(Ok(true));
        let stage = stage(&verifier);

        let resp = stage
            .handle(signed_put(
                "5\r\nhello\r\n0\r\n\r\n",
                Some(STREAMING_UNSIGNED_PAYLOAD_TRAILER),
            ))
            .await;

        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(
            verifier.hashes.lock().unwrap().clone(),
            vec![STREAMING_UNSIGNED_PAYLOAD_TRAILER.to_owned()]
        );
    }

    #[tokio::test]
    async fn test_should_refuse_signed_chunk_uploads_before_inner_handler() {
        for hint in [STREAMING_SIGNED_PAYLOAD, STREAMING_SIGNED_PAYLOAD_TRAILER] {
            let verifier = RecordingVerifier::new(Ok(true));
            let stage = stage(&verifier);

            let resp = stage
                .handle(signed_put("not aws-chunked, tampered", Some(hint)))
                .await;

            assert_eq!(resp.status(), http::StatusCode::FORBIDDEN, "{hint}");
            let body = resp.into_body().collect().await.unwrap().to_bytes();
            let body = String::from_utf8(body.to_vec()).unwrap();
            assert!(body.contains("<Code>AccessDenied</Code>"), "{hint}");
            assert!(verifier.hashes.lock().unwrap().is_empty(), "{hint}");
            assert_eq!(stage.inner.calls.load(Ordering::SeqCst), 0, "{hint}");
        }
    }

    #[tokio::test]
    async fn test_should_hash_body_for_unknown_streaming_value() {
        let verifier = RecordingVerifier::new(Ok(true));
        let stage = stage(&verifier);

        let resp = stage
            .handle(signed_put("hello", Some("STREAMING-ANYTHING")))
            .await;

        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(
            verifier.hashes.lock().unwrap().clone(),
            vec![hash_payload(b"hello")]
        );
    }

    #[tokio::test]
    async fn test_should_reject_mismatched_signature_before_inner_handler() {
        let verifier = RecordingVerifier::new(Ok(false));
        let stage = stage(&verifier);

        let resp = stage.handle(signed_put("hello", None)).await;

        assert_eq!(resp.status(), http::StatusCode::FORBIDDEN);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("<Code>SignatureDoesNotMatch</Code>"));
        assert!(body.contains("<Resource>/bucket/key</Resource>"));
        assert_eq!(stage.inner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_should_map_verifier_failure_to_internal_error() {
        let verifier = RecordingVerifier::new(Err(()));
        let stage = stage(&verifier);

        let resp = stage.handle(signed_put("", None)).await;

        assert_eq!(resp.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(stage.inner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_should_verify_presigned_request() {
        let verifier = RecordingVerifier::new(Ok(true));
        let stage = stage(&verifier);

        let req = http::Request::builder()
            .uri("/bucket/key?X-Amz-Credential=AKID%2F20130524%2Fus-east-1%2Fs3%2Faws4_request")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let resp = stage.handle(req).await;

        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(verifier.presigned_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_should_not_verify_anonymous_or_post_policy() {
        let verifier = RecordingVerifier::new(Ok(false));
        let stage = stage(&verifier);

        let anonymous = http::Request::builder()
            .uri("/bucket/key")
            .body(Full::new(Bytes::new()))
            .unwrap();
        assert_eq!(stage.handle(anonymous).await.status(), http::StatusCode::OK);

        let post_policy = http::Request::builder()
            .method("POST")
            .uri("/bucket")
            .header("content-type", "multipart/form-data; boundary=x")
            .body(Full::new(Bytes::from_static(b"--x--")))
            .unwrap();
        assert_eq!(stage.handle(post_policy).await.status(), http::StatusCode::OK);

        assert!(verifier.hashes.lock().unwrap().is_empty());
        assert_eq!(verifier.presigned_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_should_trust_auth_type_from_extensions() {
        let verifier = RecordingVerifier::new(Ok(false));
        let stage = stage(&verifier);

        let mut req = signed_put("x", None);
        req.extensions_mut().insert(AuthType::Anonymous);
        assert_eq!(stage.handle(req).await.status(), http::StatusCode::OK);
        assert!(verifier.hashes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_should_skip_validation_without_verifier() {
        let stage = SignatureStage::skip_validation(EchoHandler::default());
        assert!(!stage.is_validating());

        let resp = stage.handle(signed_put("payload", None)).await;

        assert_eq!(resp.status(), http::StatusCode::OK);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"payload");
    }
}
