use songa_backend_lib::{
    config::Settings,
    email::{Mailer, NullMailer, SmtpMailer},
    router,
    storage::{FlatFileStorage, Storage},
    AppState,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize configuration, falling back to the packaged default path
    let config = Settings::load()
        .or_else(|_| Settings::load_from("config/default.toml"))
        .unwrap_or_default();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    // Create storage
    let storage = FlatFileStorage::new(&config.data_dir)?;

    // Outbound email goes through SMTP when configured
    let mailer: Arc<dyn Mailer> = match config.smtp.clone() {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp)),
        None => Arc::new(NullMailer),
    };

    let bind_addr = config.bind_addr;
    let superuser = config.superuser.clone();

    // Create application state
    let state = Arc::new(AppState::new(storage.clone(), config, mailer));

    // Bootstrap the configured superuser on first start
    if let Some(su) = superuser {
        match storage.user_by_email(&su.email).await {
            Ok(None) => {
                state
                    .auth
                    .create_superuser(&su.email, &su.phone, &su.password)
                    .await?;
                tracing::info!(email = %su.email, "bootstrapped superuser");
            },
            Ok(Some(_)) => {},
            Err(e) => tracing::warn!(error = %e, "superuser lookup failed"),
        }
    }

    // Create the router
    let app = router::create_router(state);

    // Start the server
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
