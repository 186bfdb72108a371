//! Service entity - Add-on services that can be booked with a reservation (e.g. breakfast).
//!
//! The catalog price is live; reservations keep their own snapshot in
//! `reservation_services`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Service database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "services")]
pub struct Model {
    /// Unique identifier for the service
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Service type used by guests to request it (e.g. `"breakfast"`)
    #[sea_orm(column_name = "type", unique)]
    pub service_type: String,
    /// Current catalog price
    pub price: f64,
}

/// Defines relationships between Service and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Booked snapshots of this service
    #[sea_orm(has_many = "super::reservation_service::Entity")]
    ReservationServices,
}

impl Related<super::reservation_service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReservationServices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
