// src/main.rs
use anyhow::{Context, Result};
use hyper::{Body, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use ollama_proxy::{
    auth::{fingerprint, Authenticator},
    config,
    metrics::MetricsRegistry,
    proxy::Proxy,
    registry::{parse_instances, BackendRegistry},
    server::{RequestHandler, ServerBuilder},
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config()?;

    // Initialize tracing; DEBUG=true raises the default level.
    let default_directives = if config.debug {
        "ollama_proxy=debug,hyper=info,reqwest=debug"
    } else {
        "ollama_proxy=info,hyper=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directives)),
        )
        .init();

    match config.api_token() {
        Some(token) => info!("API token configured: {}", fingerprint(token)),
        None => warn!("API_TOKEN not set! Authentication is disabled."),
    }

    // Parse the instance mapping; malformed entries are skipped, not fatal.
    let parsed = parse_instances(&config.ollama_instances);
    for token in &parsed.skipped {
        warn!(entry = %token, "skipping malformed instance entry");
    }
    let registry = Arc::new(BackendRegistry::new(&parsed));
    info!("Configured backends: {:?}", registry.names());
    info!("Default backend: {}", registry.default_url());

    // Initialize metrics
    let metrics_registry = MetricsRegistry::new()?;
    let metrics = metrics_registry.collector();

    let authenticator = Authenticator::new(config.api_token().map(str::to_owned));
    let proxy = Arc::new(Proxy::new(registry, authenticator, metrics));

    // Start metrics server if enabled
    if config.metrics_enabled {
        let metrics_addr: SocketAddr = ([0, 0, 0, 0], config.metrics_port).into();
        start_metrics_server(metrics_addr, metrics_registry, config.metrics_path.clone());
    }

    // Create request handler
    let handler = RequestHandler::new(proxy);

    // Start main server
    let addr = (config.host.as_str(), config.port)
        .to_socket_addrs()
        .context("Invalid bind address")?
        .next()
        .context("Bind address did not resolve")?;
    info!("Starting Ollama proxy on {}", addr);

    let server = ServerBuilder::new(addr).with_handler(handler).serve();

    tokio::select! {
        result = server => result?,
        _ = shutdown_signal() => {}
    }

    Ok(())
}

fn start_metrics_server(addr: SocketAddr, registry: MetricsRegistry, path: String) {
    let registry = Arc::new(registry);
    let path = Arc::new(path);

    let make_service = hyper::service::make_service_fn(move |_| {
        let registry = registry.clone();
        let path = path.clone();

        async move {
            Ok::<_, Infallible>(hyper::service::service_fn(move |req: Request<Body>| {
                let registry = registry.clone();
                let path = path.clone();

                async move {
                    let response = if req.uri().path() == path.as_str() {
                        Response::builder()
                            .status(StatusCode::OK)
                            .header("Content-Type", "text/plain; version=0.0.4")
                            .body(Body::from(registry.gather()))
                    } else {
                        Response::builder()
                            .status(StatusCode::NOT_FOUND)
                            .body(Body::empty())
                    };
                    Ok::<_, Infallible>(response.unwrap())
                }
            }))
        }
    });

    let server = hyper::Server::bind(&addr).serve(make_service);
    info!("Metrics server listening on http://{}", addr);

    tokio::spawn(async move {
        if let Err(e) = server.await {
            error!("Metrics server error: {}", e);
        }
    });
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
