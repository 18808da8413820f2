//! Shared handler state

use devsetup_installer::Installer;
use sqlx::PgPool;
use std::path::PathBuf;
use std::sync::Arc;

/// State handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub installer: Arc<Installer>,
    /// Catalog script paths are resolved against this directory
    pub scripts_dir: PathBuf,
}
