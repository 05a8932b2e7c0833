use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use training_schedule::shell::{bootstrap, config::Settings, http::router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let settings = Settings::from_env().context("reading schedule settings")?;
    tracing::info!(
        api = %settings.api_base_url,
        role = ?settings.schedule.role,
        user = %settings.credentials.username,
        "starting training schedule"
    );

    let state = bootstrap(&settings).await?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(settings.listen_addr)
        .await
        .with_context(|| format!("binding {}", settings.listen_addr))?;
    tracing::info!("Schedule endpoint: http://{}/schedule", settings.listen_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
