//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::WebConfig;
use crate::models::ChannelSummary;

/// How long the channel directory is cached. The directory is the hottest
/// read in the application and changes slowly.
const CHANNEL_DIRECTORY_TTL: Duration = Duration::from_secs(5 * 60);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    pool: PgPool,
    channel_directory: Cache<(), Arc<Vec<ChannelSummary>>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: WebConfig, pool: PgPool) -> Self {
        let channel_directory = Cache::builder()
            .max_capacity(1)
            .time_to_live(CHANNEL_DIRECTORY_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                channel_directory,
            }),
        }
    }

    /// Get a reference to the web configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the cached channel directory.
    #[must_use]
    pub fn channel_directory(&self) -> &Cache<(), Arc<Vec<ChannelSummary>>> {
        &self.inner.channel_directory
    }
}
