use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;

use backend::shared::config::{load_config, resolve_path};
use backend::shared::data::db::initialize_database;
use backend::shared::state::AppState;
use backend::{routes, system};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = load_config()?;

    let db_path = resolve_path(&config.database.path);
    let conn = initialize_database(&db_path.to_string_lossy())
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    let state = AppState::new(conn, config.clone());
    tokio::fs::create_dir_all(&state.media_root)
        .await
        .with_context(|| format!("cannot create media directory {}", state.media_root.display()))?;

    let app = routes::configure_routes(state);

    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server.address()))?;

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    addr.port()
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
