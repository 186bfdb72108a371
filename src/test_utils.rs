//! Shared test utilities for `Innkeeper`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{catalog, user},
    entities::{self, ReservationStatus, RoomCategory},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Routes `tracing` output through the test harness so it shows up for failing tests.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("trace")
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user named after the local part of `email`.
pub async fn create_test_user(db: &DatabaseConnection, email: &str) -> Result<entities::user::Model> {
    let name = email.split('@').next().unwrap_or(email).to_string();
    user::create_user(db, name, email.to_string()).await
}

/// Creates a test room with sensible defaults.
///
/// # Defaults
/// * `category`: Suite
/// * `price`: 100.0
/// * `image`: None
pub async fn create_test_room(db: &DatabaseConnection, number: i32) -> Result<entities::room::Model> {
    create_custom_room(db, number, RoomCategory::Suite, 100.0).await
}

/// Creates a test room with custom category and price.
pub async fn create_custom_room(
    db: &DatabaseConnection,
    number: i32,
    category: RoomCategory,
    price: f64,
) -> Result<entities::room::Model> {
    let room = entities::room::ActiveModel {
        number: Set(number),
        category: Set(category),
        price: Set(price),
        image: Set(None),
        ..Default::default()
    };
    Ok(room.insert(db).await?)
}

/// Creates a catalog feature.
pub async fn create_test_feature(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::feature::Model> {
    catalog::create_feature(db, name.to_string()).await
}

/// Inserts a reservation row directly, bypassing check-in rules.
/// Use this to arrange reservation history with arbitrary dates and statuses.
pub async fn insert_reservation(
    db: &DatabaseConnection,
    user_id: i64,
    room_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    status: ReservationStatus,
) -> Result<entities::reservation::Model> {
    let reservation = entities::reservation::ActiveModel {
        user_id: Set(user_id),
        room_id: Set(room_id),
        start_date: Set(start),
        end_date: Set(end),
        status: Set(status),
        price: Set(0.0),
        guest_name1: Set(None),
        guest_last_name1: Set(None),
        guest_name2: Set(None),
        guest_last_name2: Set(None),
        guest_name3: Set(None),
        guest_last_name3: Set(None),
        ..Default::default()
    };
    Ok(reservation.insert(db).await?)
}

/// Sets up a database with a priced catalog.
///
/// # Catalog
/// * guest surcharge: 20.0
/// * services: `breakfast` at 50.0, `spa` at 80.0
pub async fn setup_with_catalog() -> Result<DatabaseConnection> {
    let db = setup_test_db().await?;
    catalog::set_guest_price(&db, crate::core::pricing::GUEST_SURCHARGE_NAME, 20.0).await?;
    catalog::create_service(&db, "breakfast".to_string(), 50.0).await?;
    catalog::create_service(&db, "spa".to_string(), 80.0).await?;
    Ok(db)
}
