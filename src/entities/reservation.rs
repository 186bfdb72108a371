//! Reservation entity - A booked stay of one user in one room.
//!
//! Dates are calendar dates. The stay covers `[start_date, end_date]` for overlap
//! purposes and is charged for `end_date - start_date` nights. Up to three guests are
//! recorded by name.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reservation lifecycle states. `Finished` is terminal.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Booked and not yet checked out
    #[sea_orm(string_value = "active")]
    Active,
    /// Checked out
    #[sea_orm(string_value = "finished")]
    Finished,
}

/// Reservation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    /// Unique identifier for the reservation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Booked room
    pub room_id: i64,
    /// First day of the stay
    pub start_date: Date,
    /// Last day of the stay
    pub end_date: Date,
    /// Lifecycle status
    pub status: ReservationStatus,
    /// Total price computed at check-in
    pub price: f64,
    /// First name of guest 1
    pub guest_name1: Option<String>,
    /// Last name of guest 1
    pub guest_last_name1: Option<String>,
    /// First name of guest 2
    pub guest_name2: Option<String>,
    /// Last name of guest 2
    pub guest_last_name2: Option<String>,
    /// First name of guest 3
    pub guest_name3: Option<String>,
    /// Last name of guest 3
    pub guest_last_name3: Option<String>,
}

/// Defines relationships between Reservation and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each reservation belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// Each reservation belongs to one room
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id",
        on_delete = "Cascade"
    )]
    Room,
    /// Service snapshots booked with this reservation
    #[sea_orm(has_many = "super::reservation_service::Entity")]
    ReservationServices,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl Related<super::reservation_service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReservationServices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
