//! Room availability against the reservation set.
//!
//! Overlap is closed-interval: `[s1, e1]` and `[s2, e2]` overlap iff `s1 <= e2 && e1 >= s2`,
//! so ranges sharing only an endpoint overlap. Reservation status is not considered: a finished reservation keeps occupying its dates.

use crate::{
    core::dates::{DateWindow, StayRange},
    entities::{Reservation, reservation},
    errors::Result,
};
use sea_orm::{Condition, ConnectionTrait, QuerySelect, prelude::*};
use std::collections::HashSet;

/// Condition matching reservations whose `[start_date, end_date]` intersects `range`.
pub(crate) fn overlap_condition(range: &StayRange) -> Condition {
    Condition::all()
        .add(reservation::Column::StartDate.lte(range.end))
        .add(reservation::Column::EndDate.gte(range.start))
}

/// Condition matching reservations that intersect a possibly half-open window.
pub(crate) fn window_condition(window: &DateWindow) -> Condition {
    match window {
        DateWindow::Unbounded => Condition::all(),
        DateWindow::From(start) => {
            Condition::all().add(reservation::Column::EndDate.gte(*start))
        }
        DateWindow::Until(end) => Condition::all().add(reservation::Column::StartDate.lte(*end)),
        DateWindow::Between(range) => overlap_condition(range),
    }
}

/// Returns true if any reservation of `room_id` overlaps `range`.
pub async fn is_overlapping<C>(db: &C, room_id: i64, range: &StayRange) -> Result<bool>
where
    C: ConnectionTrait,
{
    let conflicting = Reservation::find()
        .filter(reservation::Column::RoomId.eq(room_id))
        .filter(overlap_condition(range))
        .count(db)
        .await?;
    Ok(conflicting > 0)
}

/// Returns the ids of every room holding a reservation that overlaps `range`.
pub async fn occupied_room_ids<C>(db: &C, range: &StayRange) -> Result<HashSet<i64>>
where
    C: ConnectionTrait,
{
    let ids: Vec<i64> = Reservation::find()
        .select_only()
        .column(reservation::Column::RoomId)
        .distinct()
        .filter(overlap_condition(range))
        .into_tuple()
        .all(db)
        .await?;
    Ok(ids.into_iter().collect())
}
