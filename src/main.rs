use course_recs_api::{
    api::{create_router, AppState},
    config::Config,
    db,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("course_recs_api=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    // Initialize application state
    let store = db::connect_store(&config).await?;
    let state = AppState::new(store, &config);

    // Create the router with all routes
    let app = create_router(state);

    // Start the server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
