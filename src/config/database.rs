//! Database configuration module.
//!
//! This module handles database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL. Composite
//! indexes that cannot be expressed on a single column are added here.

use crate::entities::{
    Feature, GuestPrice, MonthlyProfit, MonthlyProfitColumn, Reservation, ReservationColumn,
    ReservationService, Room, RoomFeature, Service, User,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/innkeeper.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

async fn create_index<C>(db: &C, statement: &IndexCreateStatement) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    db.execute(builder.build(statement)).await?;
    Ok(())
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// Tables are created in dependency order so foreign keys always reference an existing table.
/// Safe to call on an already provisioned database.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Room).await?;
    create_table(db, &schema, Feature).await?;
    create_table(db, &schema, RoomFeature).await?;
    create_table(db, &schema, Service).await?;
    create_table(db, &schema, GuestPrice).await?;
    create_table(db, &schema, Reservation).await?;
    create_table(db, &schema, ReservationService).await?;
    create_table(db, &schema, MonthlyProfit).await?;

    // One aggregate row per (year, month)
    create_index(
        db,
        Index::create()
            .name("idx_monthly_profits_period")
            .table(MonthlyProfit)
            .col(MonthlyProfitColumn::Year)
            .col(MonthlyProfitColumn::Month)
            .unique()
            .if_not_exists(),
    )
    .await?;

    create_index(
        db,
        Index::create()
            .name("idx_reservations_room_dates")
            .table(Reservation)
            .col(ReservationColumn::RoomId)
            .col(ReservationColumn::StartDate)
            .if_not_exists(),
    )
    .await?;

    info!("Database tables ensured");
    Ok(())
}
