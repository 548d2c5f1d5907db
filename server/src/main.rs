use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use taskdeck_config::load as load_config;
use taskdeck_database::initialize_database;
use taskdeck_gateway::{build_router, AppState};
use taskdeck_notify::{HttpMailer, Mailer, NullMailer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(env_filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("starting taskdeck backend");

    let config = load_config().context("failed to load configuration")?;

    let pool = initialize_database(&config.database)
        .await
        .context("failed to initialise database")?;

    let mailer: Arc<dyn Mailer> = if config.mail.enabled() {
        info!(base_url = %config.mail.base_url, "mail delivery enabled");
        Arc::new(HttpMailer::new(&config.mail).context("failed to build mail client")?)
    } else {
        info!("no mail api key configured, mail delivery disabled");
        Arc::new(NullMailer)
    };

    let state = AppState::new(
        pool,
        mailer,
        Duration::from_secs(config.mail.request_timeout_seconds),
        config.http.public_url.clone(),
    );
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

fn shutdown_signal() -> impl std::future::Future<Output = ()> {
    async {
        if let Err(error) = signal::ctrl_c().await {
            error!(?error, "failed to listen for shutdown signal");
        }
        info!("shutdown signal received");
    }
}
