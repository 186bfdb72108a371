//! Monthly profit business logic
//!
//! Revenue is recognised in the (year, month) a reservation starts. The first booking of
//! a month creates the aggregate row; later bookings increment it with a single atomic
//! `UPDATE`. Rows are never decremented.

use crate::{
    entities::{MonthlyProfit, monthly_profit},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, QueryOrder, Set, prelude::*};
use tracing::debug;

/// Adds `amount` to the aggregate for (`year`, `month`), creating the row if needed.
///
/// Runs on whatever connection it is given, so check-in passes its open transaction and
/// the increment commits or rolls back with the reservation.
pub async fn record_profit<C>(
    db: &C,
    year: i32,
    month: i32,
    amount: f64,
) -> Result<monthly_profit::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    let existing = find_period(db, year, month).await?;

    if let Some(row) = existing {
        debug!("Adding {amount:.2} to profit for {year}-{month:02}");
        MonthlyProfit::update_many()
            .col_expr(
                monthly_profit::Column::Profit,
                Expr::col(monthly_profit::Column::Profit).add(amount),
            )
            .filter(monthly_profit::Column::Id.eq(row.id))
            .exec(db)
            .await?;

        return MonthlyProfit::find_by_id(row.id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("monthly profit {}", row.id)).into());
    }

    debug!("Opening profit for {year}-{month:02} with {amount:.2}");
    let row = monthly_profit::ActiveModel {
        year: Set(year),
        month: Set(month),
        profit: Set(amount),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}

async fn find_period<C>(db: &C, year: i32, month: i32) -> Result<Option<monthly_profit::Model>>
where
    C: ConnectionTrait,
{
    MonthlyProfit::find()
        .filter(monthly_profit::Column::Year.eq(year))
        .filter(monthly_profit::Column::Month.eq(month))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the aggregate for one month, if any revenue was recorded.
pub async fn get_monthly_profit(
    db: &DatabaseConnection,
    year: i32,
    month: i32,
) -> Result<Option<monthly_profit::Model>> {
    find_period(db, year, month).await
}

/// Retrieves every aggregate of a year, ordered by month.
pub async fn list_monthly_profits(
    db: &DatabaseConnection,
    year: i32,
) -> Result<Vec<monthly_profit::Model>> {
    MonthlyProfit::find()
        .filter(monthly_profit::Column::Year.eq(year))
        .order_by_asc(monthly_profit::Column::Month)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Formats a year of monthly aggregates into a human-readable summary.
#[must_use]
pub fn format_profit_summary(year: i32, rows: &[monthly_profit::Model]) -> String {
    use std::fmt::Write;

    let total: f64 = rows.iter().map(|row| row.profit).sum();
    let mut summary = format!("Revenue {year} - ${total:.2} across {} months\n", rows.len());

    for row in rows {
        let label = u32::try_from(row.month)
            .ok()
            .and_then(|month| NaiveDate::from_ymd_opt(row.year, month, 1))
            .map_or_else(|| format!("Month {}", row.month), |d| d.format("%B").to_string());
        // write! is infallible when writing to String
        let _ = writeln!(summary, "  {label}: ${:.2}", row.profit);
    }

    summary
}
