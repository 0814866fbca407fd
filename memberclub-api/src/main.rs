//! # Memberclub API Server
//!
//! Membership-site backend: registration, authentication, profile editing,
//! and onboarding steps persisted to PostgreSQL, with operator notifications
//! over SMTP.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p memberclub-api
//! ```

use memberclub_api::{
    app::{build_router, AppState},
    config::Config,
};
use memberclub_shared::{
    db::{migrations::run_migrations, pool::create_pool},
    mail::SmtpNotifier,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memberclub_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Memberclub API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(config.database.clone()).await?;
    run_migrations(&pool).await?;

    let notifier = Arc::new(SmtpNotifier::new(&config.mail)?);

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config, notifier);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
