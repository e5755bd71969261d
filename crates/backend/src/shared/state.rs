use std::path::PathBuf;
use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::shared::config::{resolve_path, Config};

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    /// Resolved directory of uploaded images
    pub media_root: PathBuf,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let media_root = resolve_path(&config.media.dir);
        Self {
            db,
            config: Arc::new(config),
            media_root,
        }
    }

    pub fn with_media_root(mut self, media_root: impl Into<PathBuf>) -> Self {
        self.media_root = media_root.into();
        self
    }
}
