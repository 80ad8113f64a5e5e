use anyhow::Context;
use rollbook::{api, config::Config};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    let addr = SocketAddr::new(config.bind_addr, config.port);

    tracing::info!(
        roll_quantity_tolerance = %config.roll_quantity_tolerance,
        merge_multi_leg = config.merge_multi_leg,
        "configuration loaded"
    );

    let app = api::create_router(api::AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
