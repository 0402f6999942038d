pub mod ads;
pub mod categories;
pub mod profiles;
pub mod reviews;
pub mod users;

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Create the shared SeaORM connection pool.
pub async fn create_pool(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
