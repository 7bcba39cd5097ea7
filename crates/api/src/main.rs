use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use realeagent_api::auth::password::hash_password;
use realeagent_api::background::session_cleanup;
use realeagent_api::config::ServerConfig;
use realeagent_api::router::build_app_router;
use realeagent_api::state::AppState;
use realeagent_cloud::S3Provider;
use realeagent_db::seed::DEMO_PASSWORD;
use realeagent_db::MemoryStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "realeagent_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let demo_hash = hash_password(DEMO_PASSWORD).expect("Failed to hash demo password");
    let pool = MemoryStore::with_demo_data(&demo_hash)
        .await
        .expect("Failed to seed demo users");
    tracing::info!("In-memory store seeded with demo users");

    match &config.storage.s3 {
        Some(s3) => {
            tracing::info!(endpoint = %s3.endpoint, bucket = %s3.bucket, "S3 storage enabled");
            S3Provider::new(s3).check_bucket().await;
        }
        None => tracing::info!(
            dir = %config.storage.local_dir.display(),
            "S3 not configured, storing PDFs locally"
        ),
    }

    let state = AppState::new(pool.clone(), config.clone());
    let app = build_app_router(state, &config);

    let cleanup_handle = tokio::spawn(session_cleanup::run(pool));

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

    cleanup_handle.abort();
    tracing::info!("Graceful shutdown complete");
}

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
