//! Integration tests for a running BucketGuard server.
//!
//! These tests require a server at `localhost:4566` started with:
//!
//! ```text
//! ACCESS_KEY=test SECRET_KEY=test AUTH_TOKENS=integration-token bucketguard-server
//! ```
//!
//! They are marked `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p bucketguard-integration -- --ignored
//! ```

use std::sync::Once;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

static INIT: Once = Once::new();

/// Access key and secret the server is expected to be configured with.
pub const TEST_CREDENTIAL: &str = "test";

/// Bearer token the server is expected to accept.
pub const TEST_TOKEN: &str = "integration-token";

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
#[must_use]
pub fn endpoint_url() -> String {
    std::env::var("GATEWAY_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

/// Plain HTTP client for hand-built requests.
#[must_use]
pub fn http_client() -> reqwest::Client {
    init_tracing();
    reqwest::Client::new()
}

/// S3 client signing with `secret_key` for the test access key.
#[must_use]
pub fn s3_client_with_secret(secret_key: &str) -> aws_sdk_s3::Client {
    init_tracing();

    let creds = Credentials::new(
        TEST_CREDENTIAL,
        secret_key,
        None,
        None,
        "integration-test",
    );

    let config = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(creds)
        .endpoint_url(endpoint_url())
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(config)
}

/// S3 client signing with the credential the server knows.
#[must_use]
pub fn s3_client() -> aws_sdk_s3::Client {
    s3_client_with_secret(TEST_CREDENTIAL)
}

/// Generate a unique object key for a test.
#[must_use]
pub fn test_key(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("{prefix}-{id}.txt")
}

mod test_classify;
mod test_signed;
