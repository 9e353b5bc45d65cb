//! Connection pool and schema migrations for the shopfloor backend.
//!
//! The backend ships with a single SQLite backend; [`create_pool`] builds the
//! pool (creating the database file on first start when needed) and
//! [`MIGRATOR`] applies the embedded schema migrations.

mod config;
mod error;
mod pool;

pub use config::DbPoolConfig;
pub use error::DbError;
pub use pool::{create_pool, DbPool};

/// Embedded schema migrations, applied at bootstrap and by tests.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
