//! Feature entity - A room amenity (e.g. "Jacuzzi", "Sea view").

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Feature database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "features")]
pub struct Model {
    /// Unique identifier for the feature
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Feature name, unique across the catalog
    #[sea_orm(unique)]
    pub name: String,
}

/// Defines relationships between Feature and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Junction rows linking the feature to rooms
    #[sea_orm(has_many = "super::room_feature::Entity")]
    RoomFeatures,
}

impl Related<super::room_feature::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoomFeatures.def()
    }
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        super::room_feature::Relation::Room.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::room_feature::Relation::Feature.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
