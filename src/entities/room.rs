//! Room entity - A bookable hotel room.
//!
//! Each room has a unique number, a category, a nightly price and a set of features
//! linked through the `room_features` junction table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Room categories. Stored as their upper-case names.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomCategory {
    /// Standard suite
    #[sea_orm(string_value = "SUITE")]
    Suite,
    /// Premium suite
    #[sea_orm(string_value = "SUITE_PREMIUM")]
    SuitePremium,
    /// Standard loft
    #[sea_orm(string_value = "LOFT")]
    Loft,
    /// Premium loft
    #[sea_orm(string_value = "LOFT_PREMIUM")]
    LoftPremium,
    /// Basic room, not part of any search family
    #[sea_orm(string_value = "STANDARD")]
    Standard,
}

/// Room database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    /// Unique identifier for the room
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Room number shown to guests, unique across all rooms
    #[sea_orm(unique)]
    pub number: i32,
    /// Room category
    pub category: RoomCategory,
    /// Nightly price
    pub price: f64,
    /// Optional cover image
    pub image: Option<String>,
}

/// Defines relationships between Room and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One room has many reservations
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservations,
    /// Junction rows linking the room to its features
    #[sea_orm(has_many = "super::room_feature::Entity")]
    RoomFeatures,
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl Related<super::room_feature::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoomFeatures.def()
    }
}

impl Related<super::feature::Entity> for Entity {
    fn to() -> RelationDef {
        super::room_feature::Relation::Feature.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::room_feature::Relation::Room.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
