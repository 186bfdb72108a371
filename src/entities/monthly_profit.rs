//! Monthly profit entity - Revenue recognised per (year, month) of reservation start.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Monthly profit database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "monthly_profits")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Calendar year
    pub year: i32,
    /// Calendar month (1-12)
    pub month: i32,
    /// Accumulated revenue
    pub profit: f64,
}

/// `MonthlyProfit` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
