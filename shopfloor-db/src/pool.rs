use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::DbPoolConfig;
use crate::error::DbError;

pub type DbPool = SqlitePool;

/// Creates a new SQLite connection pool from the provided configuration.
pub async fn create_pool(config: &DbPoolConfig) -> Result<DbPool, DbError> {
    let url = config.url.trim();
    if url.is_empty() {
        return Err(DbError::EmptyDatabaseUrl);
    }
    if config.max_connections == 0 {
        return Err(DbError::InvalidPoolConfig(
            "max_connections must be greater than 0".into(),
        ));
    }
    if config.min_connections > config.max_connections {
        return Err(DbError::InvalidPoolConfig(
            "min_connections must not exceed max_connections".into(),
        ));
    }

    // For file-backed databases make sure the parent directory and the file
    // exist before opening the pool; otherwise sqlx reports "unable to open
    // database file" on first start.
    ensure_sqlite_db_file_exists(url)?;

    let mut opts = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout());

    if let Some(idle) = config.idle_timeout() {
        opts = opts.idle_timeout(idle);
    }

    let pool = opts.connect(url).await?;
    tracing::debug!(url = %url, max_connections = config.max_connections, "database pool created");
    Ok(pool)
}

const SQLITE_MEMORY_PATTERNS: &[&str] = &[":memory:", "mode=memory"];

fn ensure_sqlite_db_file_exists(database_url: &str) -> Result<(), DbError> {
    use std::fs::{create_dir_all, File};
    use std::path::Path;

    /// Extract the file path from a SQLite connection URL.
    /// Returns None for in-memory databases or empty paths.
    fn extract_path(url: &str) -> Option<&str> {
        if SQLITE_MEMORY_PATTERNS.iter().any(|p| url.contains(p)) {
            return None;
        }

        let mut path = url;
        path = path
            .strip_prefix("sqlite://")
            .or_else(|| path.strip_prefix("sqlite:"))
            .unwrap_or(path);
        path = path.strip_prefix("//").unwrap_or(path);
        path = path.strip_prefix("file:").unwrap_or(path);

        if let Some(idx) = path.find('?') {
            path = &path[..idx];
        }

        let path = path.trim();
        if path.is_empty() {
            None
        } else {
            Some(path)
        }
    }

    let Some(clean_path) = extract_path(database_url) else {
        return Ok(());
    };

    let db_path = Path::new(clean_path);
    if let Some(parent) = db_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty() && !p.exists())
    {
        create_dir_all(parent).map_err(|e| {
            DbError::FileCreation(format!(
                "failed to create parent directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    if !db_path.exists() {
        File::create(db_path).map_err(|e| {
            DbError::FileCreation(format!("failed to create DB file '{}': {e}", db_path.display()))
        })?;
    }

    Ok(())
}
