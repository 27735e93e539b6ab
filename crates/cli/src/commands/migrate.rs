//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! shopsync-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `WEB_DATABASE_URL` - `PostgreSQL` connection string
//!
//! Migration files live in `crates/web/migrations/`:
//! ```text
//! migrations/
//! ├── 20260801000001_create_users.sql
//! ├── 20260801000002_create_sessions.sql
//! └── ...
//! ```

use super::CommandError;

/// Run the web database migrations.
///
/// # Errors
///
/// Returns `CommandError` if the environment is incomplete or a
/// migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../web/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
