use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::info;

use clubhouse_api::{AppStateInner, router, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clubhouse=debug,clubhouse_api=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("CLUBHOUSE_DB_PATH").unwrap_or_else(|_| "clubhouse.db".into());
    let host = std::env::var("CLUBHOUSE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("CLUBHOUSE_PORT")
        .unwrap_or_else(|_| "8000".into())
        .parse()?;

    // Init database
    let db = clubhouse_db::Database::open(&PathBuf::from(&db_path))?;
    seed::seed_if_empty(&db)?;

    let app = router(AppStateInner::new(db));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Clubhouse server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
