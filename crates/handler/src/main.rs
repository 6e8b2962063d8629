//! Verimail handler binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use verimail_common::config::{AppConfig, EmailBackend};
use verimail_common::db;
use verimail_engine::{MySqlVerificationStore, VerificationStore};
use verimail_notifier::{EmailSender, MailgunSender, NoopSender};

use verimail_handler::routes::create_router;
use verimail_handler::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "verimail_handler=info,verimail_engine=info,verimail_notifier=info,tower_http=info",
            )
        }))
        .json()
        .init();

    tracing::info!("Verimail handler starting...");

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    let options = db::connect_options(&config.database)?;

    if config.run_migrations {
        let pool = db::create_pool(options.clone()).await?;
        sqlx::migrate!("../../migrations").run(&pool).await?;
        pool.close().await;
        tracing::info!("Database migrations applied");
    }

    let sender: Arc<dyn EmailSender> = match config.email_backend {
        EmailBackend::Mailgun => Arc::new(MailgunSender::new(&config.mailgun)?),
        EmailBackend::Noop => {
            tracing::warn!("EMAIL_BACKEND=noop, verification emails will not be delivered");
            Arc::new(NoopSender)
        }
    };
    let store: Arc<dyn VerificationStore> = Arc::new(MySqlVerificationStore::new(options));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config, sender, store);

    let app = create_router(state).layer(TraceLayer::new_for_http());

    tracing::info!("Handler listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Received shutdown signal, stopping gracefully...");
        })
        .await?;

    tracing::info!("Verimail handler stopped.");
    Ok(())
}
