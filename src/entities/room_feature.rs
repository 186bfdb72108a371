//! Junction table for the many-to-many relationship between rooms and features.
//! The composite primary key keeps a room from holding the same feature twice.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Room/feature link
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "room_features")]
pub struct Model {
    /// Linked room
    #[sea_orm(primary_key, auto_increment = false)]
    pub room_id: i64,
    /// Linked feature
    #[sea_orm(primary_key, auto_increment = false)]
    pub feature_id: i64,
}

/// Defines relationships to both linked entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id",
        on_delete = "Cascade"
    )]
    Room,
    #[sea_orm(
        belongs_to = "super::feature::Entity",
        from = "Column::FeatureId",
        to = "super::feature::Column::Id",
        on_delete = "Cascade"
    )]
    Feature,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl Related<super::feature::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feature.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
