//! Connection pool utilities

use crate::config::DbConfig;
use crate::error::{JoblyError, JoblyResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a connection pool from [`DbConfig`].
///
/// Uses `NoTls` and fast recycling.
///
/// # Example
///
/// ```ignore
/// let pool = jobly_db::create_pool(&DbConfig::from_env()?)?;
/// let client = pool.get().await?;
/// let jobs = JobRepository::new(&client);
/// ```
pub fn create_pool(config: &DbConfig) -> JoblyResult<Pool> {
    config.validate()?;

    let pg_config: tokio_postgres::Config = config
        .url
        .parse()
        .map_err(|e: tokio_postgres::Error| JoblyError::Connection(e.to_string()))?;

    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = Manager::from_config(pg_config, NoTls, manager_config);
    Pool::builder(mgr)
        .max_size(config.max_pool_size)
        .build()
        .map_err(|e| JoblyError::Pool(e.to_string()))
}
