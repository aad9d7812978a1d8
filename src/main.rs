use std::sync::Arc;

use favorites::{
    AppState, config::Config, db::ConnectionManager, routes, store::FavoritesStore,
    tmdb::TmdbClient,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,favorites=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let db = Arc::new(ConnectionManager::new(config.database.clone()));
    db.ensure_database_exists().await?;
    db.initialize().await?;

    let http = reqwest::Client::builder().user_agent("favorites/0.1").build()?;
    let tmdb = TmdbClient::new(http, config.tmdb_api_key.clone(), config.tmdb_base_url.clone());

    let state = Arc::new(AppState { store: FavoritesStore::new(db.clone()), tmdb: Arc::new(tmdb) });
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    db.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            },
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutting down");
}
