use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::config::DatabaseConfig;

/// Connect and make sure the `images` table exists.
pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    opt.max_connections(20)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("catalog_server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}

/// [`init_db`] with a bounded retry loop, for a database container that may
/// still be starting.
pub async fn connect_with_retry(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let url = config
        .connection_url()
        .map_err(|e| DbErr::Custom(format!("Invalid database settings: {e}")))?;
    let attempts = config.connect_attempts.max(1);
    let delay = Duration::from_secs(config.connect_retry_delay_secs);

    let mut attempt = 1;
    loop {
        match init_db(&url).await {
            Ok(db) => {
                info!(attempt, "Database ready");
                return Ok(db);
            }
            Err(e) if attempt < attempts => {
                warn!(attempt, attempts, error = %e, "Waiting for database");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
