use std::time::Duration;

use sea_orm::sea_query::Table;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityName, EntityTrait,
};
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::entity::{handicraft, handicraft_tag, kegiatan, tag};

/// Open the connection pool. Does not touch the schema.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.to_owned());

    // Set connection pool options
    opt.max_connections(config.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    Database::connect(opt).await
}

/// Create missing tables and columns. Never drops anything.
pub async fn sync_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.get_schema_registry("rewaste_server::entity::*")
        .sync(db)
        .await?;
    info!("Database schema synchronized");
    Ok(())
}

/// Drop every table this service owns and recreate them empty.
pub async fn reset_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Join table first so the foreign keys never block a drop.
    drop_table(db, handicraft_tag::Entity).await?;
    drop_table(db, handicraft::Entity).await?;
    drop_table(db, tag::Entity).await?;
    drop_table(db, kegiatan::Entity).await?;
    sync_schema(db).await
}

async fn drop_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let table = entity.table_name().to_owned();
    let stmt = Table::drop().table(entity).if_exists().cascade().to_owned();
    db.execute_raw(db.get_database_backend().build(&stmt))
        .await?;
    warn!(%table, "Dropped table");
    Ok(())
}

/// Connect and bring the schema up to date.
pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let db = connect(config).await?;
    sync_schema(&db).await?;
    Ok(db)
}
