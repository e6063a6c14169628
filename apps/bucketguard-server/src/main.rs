//! BucketGuard Server - authentication gateway for S3-style requests.
//!
//! Every request is classified by the authentication scheme it claims.
//! Unsupported schemes are rejected, bearer tokens are checked immediately,
//! and SigV4 signatures are re-verified against the buffered body before the
//! request reaches the downstream handler.
//!
//! # Usage
//!
//! ```text
//! GATEWAY_LISTEN=0.0.0.0:4566 AUTH_TOKENS=t1,t2 bucketguard-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:4566` | Bind address |
//! | `ACCESS_KEY` / `AWS_ACCESS_KEY_ID` | *(unset)* | Access key for SigV4 verification |
//! | `SECRET_KEY` / `AWS_SECRET_ACCESS_KEY` | *(unset)* | Secret key for SigV4 verification |
//! | `AUTH_TOKENS` | *(unset)* | Comma-separated accepted bearer tokens |
//! | `SKIP_SIGNATURE_VALIDATION` | `false` | Skip SigV4 verification |
//! | `DEFAULT_REGION` | `us-east-1` | Region reported at startup |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod handler;

use std::sync::Arc;

use anyhow::{Context, Result};
use bucketguard_auth::sigv4::{CredentialSignatureVerifier, StaticCredentialProvider};
use bucketguard_auth::{SignatureVerifier, StaticTokenVerifier, TokenVerifier};
use bucketguard_core::GatewayConfig;
use bucketguard_http::{GatewayService, RequestHandler, SignatureStage};
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::handler::InspectHandler;

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the bearer token verifier from `AUTH_TOKENS`.
fn build_token_verifier(config: &GatewayConfig) -> Arc<dyn TokenVerifier> {
    let verifier = StaticTokenVerifier::new(config.auth_tokens.clone());
    if verifier.is_empty() {
        info!("no bearer tokens configured, token requests will be rejected");
    } else {
        info!(tokens = verifier.len(), "configured bearer token verifier");
    }
    Arc::new(verifier)
}

/// Build the SigV4 verifier, or `None` when validation is skipped.
///
/// Without a configured credential every signed request fails verification.
fn build_signature_verifier(config: &GatewayConfig) -> Option<Arc<dyn SignatureVerifier>> {
    if config.skip_signature_validation {
        warn!("signature validation disabled");
        return None;
    }

    let provider = match config.credentials() {
        Some((access_key, secret_key)) => {
            info!(access_key = %access_key, "configured credential provider from environment");
            StaticCredentialProvider::new([(access_key, secret_key)])
        }
        None => {
            warn!("no credentials configured, signed requests will be rejected");
            StaticCredentialProvider::default()
        }
    };

    Some(Arc::new(CredentialSignatureVerifier::new(Arc::new(provider))))
}

/// Assemble the request pipeline: auth dispatch, then signature stage, then handler.
fn build_service(config: &GatewayConfig) -> GatewayService<SignatureStage<InspectHandler>> {
    let stage = match build_signature_verifier(config) {
        Some(verifier) => SignatureStage::new(InspectHandler, verifier),
        None => SignatureStage::skip_validation(InspectHandler),
    };
    info!(signature_validation = stage.is_validating(), "built request pipeline");
    GatewayService::new(stage, build_token_verifier(config))
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve<H: RequestHandler<Incoming>>(
    listener: TcpListener,
    service: GatewayService<H>,
) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let conn = http.serve_connection(TokioIo::new(stream), service.clone());
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Request the health endpoint of a running gateway.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /_health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"status\":\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = GatewayConfig::from_env();

    // Handle --health-check flag for Docker HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let addr = config.gateway_listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config.log_level)?;

    info!(
        gateway_listen = %config.gateway_listen,
        default_region = %config.default_region,
        skip_signature_validation = config.skip_signature_validation,
        auth_tokens = config.auth_tokens.len(),
        version = VERSION,
        "starting BucketGuard",
    );

    let service = build_service(&config);
    let addr = config.socket_addr()?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service).await
}
