use std::str::FromStr;
use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlPool, MySqlPoolOptions};
use sqlx::Connection;

use crate::config::DatabaseConfig;
use crate::error::AppError;

/// Resolve MySQL connect options from configuration.
///
/// Precedence: `DATABASE_URL`, then the Cloud SQL socket, then TCP host/port.
pub fn connect_options(config: &DatabaseConfig) -> Result<MySqlConnectOptions, AppError> {
    let options = match &config.url {
        Some(url) => MySqlConnectOptions::from_str(url)?,
        None => {
            let options = MySqlConnectOptions::new()
                .username(&config.username)
                .password(&config.password)
                .database(&config.database);
            match config.socket_path() {
                Some(socket) => options.socket(socket),
                None => options.host(&config.host).port(config.port),
            }
        }
    };

    Ok(options)
}

/// Open a single connection. Callers close it when done.
pub async fn connect(options: &MySqlConnectOptions) -> Result<MySqlConnection, AppError> {
    let conn = MySqlConnection::connect_with(options).await?;
    tracing::debug!("Connected to MySQL");
    Ok(conn)
}

/// Create a small pool, used only for running migrations at startup.
pub async fn create_pool(options: MySqlConnectOptions) -> anyhow::Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;

    tracing::info!("Connected to MySQL");
    Ok(pool)
}
