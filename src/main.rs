//! Tierpass HTTP server.
//!
//! Serves checkout creation, the Stripe webhook endpoint and membership
//! queries. Configuration comes from `TIERPASS__*` environment variables.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tierpass::adapters::http::{app_router, AppState};
use tierpass::adapters::postgres::{
    create_pool, run_migrations, PostgresMembershipRepository, PostgresUserDirectory,
};
use tierpass::adapters::stripe::{StripeConfig, StripePaymentGateway};
use tierpass::config::{AppConfig, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server);

    let pool = create_pool(&config.database).await?;
    tracing::info!(database = %config.database.redacted_url(), "Database pool created");

    if config.database.run_migrations {
        run_migrations(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let stripe = StripeConfig::from(&config.payment);
    if config.payment.is_test_mode() {
        tracing::warn!("Stripe is in test mode");
    }

    let state = AppState::new(
        Arc::new(StripePaymentGateway::new(stripe.clone())?),
        Arc::new(PostgresMembershipRepository::new(pool.clone())),
        Arc::new(PostgresUserDirectory::new(pool)),
        stripe.webhook_verifier(),
        config.payment.checkout_base_url.clone(),
    );

    let app = app_router(state, &config.server);
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(environment = ?config.server.environment, "tierpass listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// JSON logs in production, human-readable otherwise.
///
/// `RUST_LOG` overrides `server.log_level` when set.
fn init_tracing(config: &ServerConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let production = config.is_production();
    let json_layer = production.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!production).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
