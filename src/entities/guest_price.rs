//! Guest price entity - Named price lookups such as the per-guest surcharge.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Guest price database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "guest_prices")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Lookup name (e.g. `"guest"`)
    #[sea_orm(unique)]
    pub name: String,
    /// Price associated with the name
    pub price: f64,
}

/// `GuestPrice` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
