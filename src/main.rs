use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use souq_api::config::{init_tracing, load_config};
use souq_api::gateway::{CheckoutGateway, StripeGateway};
use souq_api::{app, build_state, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_tracing(config.log_level(), config.log_json);
    info!(environment = %config.environment, "Starting souq-api");

    let conn = db::establish_connection_from_app_config(&config)
        .await
        .context("failed to connect to the database")?;
    if config.auto_migrate {
        db::run_migrations(&conn)
            .await
            .context("failed to run migrations")?;
    }

    let gateway: Option<Arc<dyn CheckoutGateway>> = match config.stripe_api_key.clone() {
        Some(api_key) => {
            if config.stripe_webhook_secret.is_none() {
                warn!("No webhook secret configured; webhook deliveries will be rejected");
            }
            Some(Arc::new(StripeGateway::new(
                api_key,
                config.stripe_webhook_secret.clone(),
                config
                    .stripe_webhook_tolerance_secs
                    .map(Duration::from_secs),
            )))
        }
        None => {
            warn!("No Stripe API key configured; checkout endpoints will return errors");
            None
        }
    };

    let cors = build_cors_layer(&config)?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid host/port")?;

    let state = build_state(config, conn, gateway)?;
    let router = app(state).layer(cors).layer(TraceLayer::new_for_http());

    info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shutdown complete");
    Ok(())
}

fn build_cors_layer(config: &souq_api::config::AppConfig) -> anyhow::Result<CorsLayer> {
    if config.has_cors_allowed_origins() {
        let origins = config
            .cors_allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("invalid CORS origin: {}", origin))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let mut layer = CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
        if config.cors_allow_credentials {
            layer = layer.allow_credentials(true);
        }
        Ok(layer)
    } else {
        // Config validation only lets this path through in development or
        // with an explicit opt-in.
        warn!("Using permissive CORS");
        Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any))
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .unwrap_or_else(|e| warn!(error = %e, "Failed to listen for ctrl-c"));
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => warn!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl-c"),
        _ = terminate => info!("Received terminate signal"),
    }
}
