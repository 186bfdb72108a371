//! Catalog business logic - services, features and named guest prices.
//!
//! Also applies a [`CatalogConfig`] to the database. Seeding is idempotent: entries that
//! already exist (matched by their unique key) are left alone, except the guest surcharge
//! which is updated to the configured value.

use crate::{
    config::catalog::CatalogConfig,
    core::{pricing::GUEST_SURCHARGE_NAME, room},
    entities::{
        Feature, GuestPrice, Room, RoomFeature, Service, feature, guest_price, room as room_entity,
        room_feature, service,
    },
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument, warn};

/// Creates a catalog service. Prices must be finite and non-negative.
pub async fn create_service(
    db: &DatabaseConnection,
    service_type: String,
    price: f64,
) -> Result<service::Model> {
    if service_type.trim().is_empty() {
        return Err(Error::BlankField {
            field: "Service type",
        });
    }
    if price < 0.0 || !price.is_finite() {
        return Err(Error::NegativePrice { price });
    }

    let service = service::ActiveModel {
        service_type: Set(service_type.trim().to_string()),
        price: Set(price),
        ..Default::default()
    };
    service.insert(db).await.map_err(Into::into)
}

/// Retrieves the full service catalog ordered by type.
pub async fn list_services<C>(db: &C) -> Result<Vec<service::Model>>
where
    C: ConnectionTrait,
{
    Service::find()
        .order_by_asc(service::Column::ServiceType)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a service by its type.
pub async fn get_service_by_type(
    db: &DatabaseConnection,
    service_type: &str,
) -> Result<Option<service::Model>> {
    Service::find()
        .filter(service::Column::ServiceType.eq(service_type))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a feature with a unique, non-empty name.
pub async fn create_feature(db: &DatabaseConnection, name: String) -> Result<feature::Model> {
    if name.trim().is_empty() {
        return Err(Error::BlankField {
            field: "Feature name",
        });
    }

    let feature = feature::ActiveModel {
        name: Set(name.trim().to_string()),
        ..Default::default()
    };
    feature.insert(db).await.map_err(Into::into)
}

/// Retrieves every feature ordered by name.
pub async fn list_features<C>(db: &C) -> Result<Vec<feature::Model>>
where
    C: ConnectionTrait,
{
    Feature::find()
        .order_by_asc(feature::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a named guest price.
pub async fn get_guest_price<C>(db: &C, name: &str) -> Result<Option<guest_price::Model>>
where
    C: ConnectionTrait,
{
    GuestPrice::find()
        .filter(guest_price::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates or updates a named guest price.
pub async fn set_guest_price<C>(db: &C, name: &str, price: f64) -> Result<guest_price::Model>
where
    C: ConnectionTrait,
{
    if price < 0.0 || !price.is_finite() {
        return Err(Error::NegativePrice { price });
    }

    if let Some(existing) = get_guest_price(db, name).await? {
        let mut active_model: guest_price::ActiveModel = existing.into();
        active_model.price = Set(price);
        return active_model.update(db).await.map_err(Into::into);
    }

    let row = guest_price::ActiveModel {
        name: Set(name.to_string()),
        price: Set(price),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}

/// Counts of what a seeding run inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Newly inserted services
    pub services_created: usize,
    /// Newly inserted features
    pub features_created: usize,
    /// Newly inserted rooms
    pub rooms_created: usize,
}

/// Applies a catalog configuration in one transaction.
///
/// Room feature names must appear in the feature list (or already exist); an unknown
/// name fails with [`Error::FeatureNotFound`] and nothing is written.
#[instrument(skip(db, config))]
pub async fn seed_catalog(db: &DatabaseConnection, config: &CatalogConfig) -> Result<SeedReport> {
    info!(
        "Seeding catalog: {} services, {} features, {} rooms",
        config.services.len(),
        config.features.len(),
        config.rooms.len()
    );

    let txn = db.begin().await?;
    let mut report = SeedReport::default();

    set_guest_price(&txn, GUEST_SURCHARGE_NAME, config.guest_surcharge).await?;

    for cfg in &config.services {
        let exists = Service::find()
            .filter(service::Column::ServiceType.eq(cfg.service_type.as_str()))
            .one(&txn)
            .await?
            .is_some();
        if exists {
            debug!("Service '{}' already exists. Skipping.", cfg.service_type);
            continue;
        }
        service::ActiveModel {
            service_type: Set(cfg.service_type.clone()),
            price: Set(cfg.price),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        report.services_created += 1;
    }

    for name in &config.features {
        let exists = Feature::find()
            .filter(feature::Column::Name.eq(name.as_str()))
            .one(&txn)
            .await?
            .is_some();
        if exists {
            debug!("Feature '{}' already exists. Skipping.", name);
            continue;
        }
        feature::ActiveModel {
            name: Set(name.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        report.features_created += 1;
    }

    for cfg in &config.rooms {
        if room::find_by_number(&txn, cfg.number).await?.is_some() {
            warn!("Room {} already exists. Skipping.", cfg.number);
            continue;
        }

        let features = if cfg.features.is_empty() {
            Vec::new()
        } else {
            Feature::find()
                .filter(feature::Column::Name.is_in(cfg.features.iter().map(String::as_str)))
                .all(&txn)
                .await?
        };
        if features.len() != cfg.features.len() {
            return Err(Error::FeatureNotFound {
                reference: cfg.features.join(", "),
            });
        }

        let created = room_entity::ActiveModel {
            number: Set(cfg.number),
            category: Set(cfg.category),
            price: Set(cfg.price),
            image: Set(cfg.image.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if !features.is_empty() {
            RoomFeature::insert_many(features.iter().map(|f| room_feature::ActiveModel {
                room_id: Set(created.id),
                feature_id: Set(f.id),
            }))
            .exec_without_returning(&txn)
            .await?;
        }
        report.rooms_created += 1;
    }

    txn.commit().await?;
    info!(
        "Catalog seeded: {} services, {} features, {} rooms created",
        report.services_created, report.features_created, report.rooms_created
    );
    Ok(report)
}

/// Counts the rooms currently stored.
pub async fn count_rooms(db: &DatabaseConnection) -> Result<u64> {
    Room::find().count(db).await.map_err(Into::into)
}
