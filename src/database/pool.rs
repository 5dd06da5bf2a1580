use std::str::FromStr;

use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::{info, instrument};

use crate::env::AppConfig;
use crate::error::AppError;

#[instrument(skip(config), fields(database_url = %config.database_url))]
pub async fn connect_pool(config: &AppConfig) -> Result<Pool<Sqlite>, AppError> {
    info!("Connecting to SQLite database");

    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    Ok(pool)
}
