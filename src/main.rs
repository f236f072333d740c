use printkiosk::api::router::build_router;
use printkiosk::bootstrap;
use printkiosk::config::Config;
use printkiosk::database::Database;
use printkiosk::workers::JobWorker;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "printkiosk=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Initialize database connection
    let db = Database::connect(&config.database_url).await?;
    tracing::info!("Database connection established");

    // Run migrations
    db.run_migrations().await?;
    tracing::info!("Database migrations applied");

    // Jobs stranded mid-pipeline by a crash are failed, never resumed.
    JobWorker::recover_interrupted(&db).await?;

    // Build application state and start the background worker
    let state = bootstrap::build_app_state(db, &config).await?;
    bootstrap::start_worker(&state, &config);

    // Build router
    let app = build_router(state);

    // Start server
    let addr = config.server_address();
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
