use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nextcopy_api::config::ServerConfig;
use nextcopy_api::router::build_app_router;
use nextcopy_api::state::AppState;
use nextcopy_events::{EventBus, OperatorNotifications, TelegramConfig, TelegramNotifier};
use nextcopy_genai::{GenAiConfig, GeminiClient, ImageProviderRegistry};
use nextcopy_pipeline::{Orchestrator, PipelineConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "nextcopy_api=debug,nextcopy_pipeline=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let genai_config = GenAiConfig::from_env();
    let pipeline_config = PipelineConfig::from_env();
    tracing::info!(
        theme_count = pipeline_config.theme_count,
        post_concurrency = pipeline_config.post_concurrency,
        image_concurrency = pipeline_config.image_concurrency,
        language = %pipeline_config.content_language,
        "Loaded pipeline configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = nextcopy_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    nextcopy_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    nextcopy_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Generation providers ---
    let gemini = Arc::new(GeminiClient::new(&genai_config));
    if !gemini.has_credentials() {
        tracing::warn!("GEMINI_API_KEY is not set, generation requests will fail");
    }
    let registry = Arc::new(ImageProviderRegistry::from_config(
        &genai_config,
        Arc::clone(&gemini),
    ));
    tracing::info!(services = ?registry.names(), "Image providers registered");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    let notifier = Arc::new(TelegramNotifier::new(TelegramConfig::from_env()));
    if !notifier.is_enabled() {
        tracing::info!("Telegram notifier disabled, operator notifications are logged only");
    }
    let notifications_handle = tokio::spawn(OperatorNotifications::run(
        notifier,
        event_bus.subscribe(),
    ));

    // --- Orchestrator ---
    let orchestrator = Arc::new(Orchestrator::new(
        pool.clone(),
        gemini,
        registry,
        Arc::clone(&event_bus),
        pipeline_config,
    ));

    orchestrator
        .recover_interrupted_runs()
        .await
        .expect("Failed to reset interrupted generation runs");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        orchestrator: Arc::clone(&orchestrator),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let drained = orchestrator
        .shutdown(Duration::from_secs(config.shutdown_timeout_secs))
        .await;
    if !drained {
        tracing::warn!("Some generation runs did not finish before the shutdown timeout");
    }

    // Dropping the last bus sender closes the channel and stops the
    // notification loop.
    drop(orchestrator);
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), notifications_handle).await;
    tracing::info!("Operator notifications shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
