//! Reservation business logic - check-in, checkout and reservation queries.
//!
//! Check-in validates its input before touching the database, then runs every lookup,
//! availability check and write inside one transaction: the reservation, its service
//! snapshots and the monthly profit increment commit together or not at all.

use crate::{
    core::{
        availability,
        dates::{DateParts, DateWindow, StayRange, calendar_date, resolve_window},
        pricing::PricingEngine,
        profit,
    },
    entities::{
        Reservation, ReservationService, ReservationStatus, Room, User, reservation,
        reservation_service, room, user,
    },
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{
    Condition, DatabaseBackend, IsolationLevel, LoaderTrait, QueryOrder, Set, TransactionTrait,
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Longest stay accepted at check-in, in nights.
pub const MAX_STAY_NIGHTS: i64 = 15;

/// Name of one guest sharing the stay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestDetails {
    /// First name; an empty name does not count as a guest
    pub name: String,
    /// Last name
    pub last_name: String,
}

/// Check-in request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateReservationInput {
    /// Room to book
    pub room_id: i64,
    /// Start day of month
    pub start_day: i32,
    /// Start month
    pub start_month: i32,
    /// Start year
    pub start_year: i32,
    /// End day of month
    pub end_day: i32,
    /// End month
    pub end_month: i32,
    /// End year
    pub end_year: i32,
    /// First guest
    pub guest1: Option<GuestDetails>,
    /// Second guest
    pub guest2: Option<GuestDetails>,
    /// Third guest
    pub guest3: Option<GuestDetails>,
    /// Service types to book; repeated types are charged repeatedly
    #[serde(default)]
    pub services: Vec<String>,
}

impl CreateReservationInput {
    fn guests(&self) -> [Option<&GuestDetails>; 3] {
        [
            self.guest1.as_ref(),
            self.guest2.as_ref(),
            self.guest3.as_ref(),
        ]
    }

    fn guest_count(&self) -> u32 {
        let count = self
            .guests()
            .iter()
            .flatten()
            .filter(|guest| !guest.name.is_empty())
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Range checks on the raw parts, then the ordering of the resulting dates.
    fn stay_dates(&self, current_year: i32) -> Result<(NaiveDate, NaiveDate)> {
        let out_of_range = self.start_year < current_year
            || self.end_year < current_year
            || !(1..=12).contains(&self.start_month)
            || !(1..=12).contains(&self.end_month)
            || !(1..=31).contains(&self.start_day)
            || !(1..=31).contains(&self.end_day);
        if out_of_range {
            return Err(Error::InvalidDate {
                reason: format!(
                    "{}-{}-{} to {}-{}-{} is out of range",
                    self.start_day,
                    self.start_month,
                    self.start_year,
                    self.end_day,
                    self.end_month,
                    self.end_year
                ),
            });
        }

        let start = calendar_date(self.start_year, self.start_month, self.start_day);
        let end = calendar_date(self.end_year, self.end_month, self.end_day);
        match (start, end) {
            (Some(start), Some(end)) if start <= end => Ok((start, end)),
            (Some(start), Some(end)) => Err(Error::InvalidDate {
                reason: format!("start {start} is after end {end}"),
            }),
            _ => Err(Error::InvalidDate {
                reason: "dates are outside the supported calendar".to_string(),
            }),
        }
    }
}

/// Optional filter for the reservation queries.
///
/// A date window selects reservations overlapping it; a single bound leaves the window
/// open on the other side. When any window bound is given the status is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationFilter {
    /// Exact status match
    pub status: Option<ReservationStatus>,
    /// Start bound of the window
    #[serde(default)]
    pub start: DateParts,
    /// End bound of the window
    #[serde(default)]
    pub end: DateParts,
}

impl ReservationFilter {
    fn condition(&self) -> Result<Condition> {
        let window = resolve_window(&self.start, &self.end)?;
        let condition = availability::window_condition(&window);
        match (window, self.status) {
            (DateWindow::Unbounded, Some(status)) => {
                Ok(condition.add(reservation::Column::Status.eq(status)))
            }
            _ => Ok(condition),
        }
    }
}

/// A reservation with its user and room loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationDetails {
    /// The reservation
    pub reservation: reservation::Model,
    /// Owning user
    pub user: Option<user::Model>,
    /// Booked room
    pub room: Option<room::Model>,
}

/// Books a room for a user.
///
/// # Errors
/// In check order:
/// - [`Error::InvalidDate`] for out-of-range parts, a past year, or start after end
/// - [`Error::UserNotFound`] / [`Error::RoomNotFound`]
/// - [`Error::InvalidRange`] for a stay of zero nights
/// - [`Error::MaxStayExceeded`] beyond [`MAX_STAY_NIGHTS`]
/// - [`Error::DuplicateActiveReservation`] if the user already has an active reservation
/// - [`Error::RoomUnavailable`] if the dates overlap another reservation of the room
/// - [`Error::GuestSurchargeConfigMissing`] / [`Error::ServiceNotFound`] from pricing
#[instrument(skip(db, input), fields(room_id = input.room_id))]
pub async fn check_in(
    db: &DatabaseConnection,
    user_id: i64,
    input: CreateReservationInput,
) -> Result<reservation::Model> {
    book(db, None, user_id, input).await
}

/// Books a room for a user, pricing it with `pricing` instead of the stored catalog.
///
/// # Errors
/// As [`check_in`], except that the guest surcharge is never looked up.
#[instrument(skip(db, pricing, input), fields(room_id = input.room_id))]
pub async fn check_in_with_pricing(
    db: &DatabaseConnection,
    pricing: &PricingEngine,
    user_id: i64,
    input: CreateReservationInput,
) -> Result<reservation::Model> {
    book(db, Some(pricing), user_id, input).await
}

/// Without an engine, prices are loaded inside the booking transaction.
async fn book(
    db: &DatabaseConnection,
    pricing: Option<&PricingEngine>,
    user_id: i64,
    input: CreateReservationInput,
) -> Result<reservation::Model> {
    let (start, end) = input.stay_dates(Utc::now().year())?;

    let isolation = match db.get_database_backend() {
        DatabaseBackend::Postgres | DatabaseBackend::MySql => Some(IsolationLevel::Serializable),
        DatabaseBackend::Sqlite => None,
    };
    let txn = db.begin_with_config(isolation, None).await?;

    let user = User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;

    let room = Room::find_by_id(input.room_id)
        .one(&txn)
        .await?
        .ok_or(Error::RoomNotFound { id: input.room_id })?;

    let stay = StayRange::new(start, end)?;
    let nights = stay.nights();
    if nights <= 0 {
        return Err(Error::InvalidRange { start, end });
    }
    if nights > MAX_STAY_NIGHTS {
        return Err(Error::MaxStayExceeded {
            nights,
            max: MAX_STAY_NIGHTS,
        });
    }

    let active = Reservation::find()
        .filter(reservation::Column::UserId.eq(user.id))
        .filter(reservation::Column::Status.eq(ReservationStatus::Active))
        .one(&txn)
        .await?;
    if active.is_some() {
        return Err(Error::DuplicateActiveReservation { user_id: user.id });
    }

    if availability::is_overlapping(&txn, room.id, &stay).await? {
        return Err(Error::RoomUnavailable { room_id: room.id });
    }

    let guest_count = input.guest_count();
    let loaded;
    let pricing = match pricing {
        Some(pricing) => pricing,
        None => {
            loaded = PricingEngine::load(&txn).await?;
            &loaded
        }
    };
    let quote = pricing.quote(room.price, nights, guest_count, input.services.as_slice())?;
    debug!(
        "Quoted {:.2} for {nights} nights, {guest_count} guests at {:.2}, {} services",
        quote.total,
        pricing.guest_surcharge(),
        quote.services.len()
    );

    let [guest1, guest2, guest3] = input.guests().map(|guest| guest.cloned());
    let (guest_name1, guest_last_name1) = split_guest(guest1);
    let (guest_name2, guest_last_name2) = split_guest(guest2);
    let (guest_name3, guest_last_name3) = split_guest(guest3);

    let created = reservation::ActiveModel {
        user_id: Set(user.id),
        room_id: Set(room.id),
        start_date: Set(start),
        end_date: Set(end),
        status: Set(ReservationStatus::Active),
        price: Set(quote.total),
        guest_name1: Set(guest_name1),
        guest_last_name1: Set(guest_last_name1),
        guest_name2: Set(guest_name2),
        guest_last_name2: Set(guest_last_name2),
        guest_name3: Set(guest_name3),
        guest_last_name3: Set(guest_last_name3),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for charge in &quote.services {
        reservation_service::ActiveModel {
            reservation_id: Set(created.id),
            service_id: Set(charge.service_id),
            price: Set(charge.price),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    profit::record_profit(&txn, input.start_year, input.start_month, quote.total).await?;

    txn.commit().await?;

    info!(
        "Reservation {} booked: room {} for user {} from {start} to {end}, total {:.2}",
        created.id, room.number, user.id, created.price
    );
    Ok(created)
}

fn split_guest(guest: Option<GuestDetails>) -> (Option<String>, Option<String>) {
    guest.map_or((None, None), |guest| (Some(guest.name), Some(guest.last_name)))
}

/// Marks a reservation as finished. Price and profit are left untouched.
///
/// # Errors
/// - [`Error::ReservationNotFound`] if no reservation has this id
/// - [`Error::AlreadyFinished`] if it was already checked out
#[instrument(skip(db))]
pub async fn check_out(db: &DatabaseConnection, reservation_id: i64) -> Result<reservation::Model> {
    let reservation = Reservation::find_by_id(reservation_id)
        .one(db)
        .await?
        .ok_or(Error::ReservationNotFound { id: reservation_id })?;

    if reservation.status == ReservationStatus::Finished {
        return Err(Error::AlreadyFinished { id: reservation_id });
    }

    let mut active_model: reservation::ActiveModel = reservation.into();
    active_model.status = Set(ReservationStatus::Finished);
    let finished = active_model.update(db).await?;

    info!("Reservation {} checked out", finished.id);
    Ok(finished)
}

/// Retrieves a user's reservations matching `filter`, oldest stay first.
///
/// # Errors
/// [`Error::IncompleteDate`] or [`Error::InvalidRange`] for a malformed window.
pub async fn get_reservations(
    db: &DatabaseConnection,
    user_id: i64,
    filter: &ReservationFilter,
) -> Result<Vec<reservation::Model>> {
    let condition = filter.condition()?;
    Reservation::find()
        .filter(reservation::Column::UserId.eq(user_id))
        .filter(condition)
        .order_by_asc(reservation::Column::StartDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every reservation matching `filter` with user and room loaded.
///
/// # Errors
/// [`Error::IncompleteDate`] or [`Error::InvalidRange`] for a malformed window.
pub async fn get_all_reservations(
    db: &DatabaseConnection,
    filter: &ReservationFilter,
) -> Result<Vec<ReservationDetails>> {
    let condition = filter.condition()?;
    let reservations = Reservation::find()
        .filter(condition)
        .order_by_asc(reservation::Column::StartDate)
        .all(db)
        .await?;
    with_relations(db, reservations).await
}

/// Retrieves a room's reservations matching `filter` with user and room loaded.
///
/// # Errors
/// [`Error::IncompleteDate`] or [`Error::InvalidRange`] for a malformed window.
pub async fn get_reservations_room(
    db: &DatabaseConnection,
    room_id: i64,
    filter: &ReservationFilter,
) -> Result<Vec<ReservationDetails>> {
    let condition = filter.condition()?;
    let reservations = Reservation::find()
        .filter(reservation::Column::RoomId.eq(room_id))
        .filter(condition)
        .order_by_asc(reservation::Column::StartDate)
        .all(db)
        .await?;
    with_relations(db, reservations).await
}

async fn with_relations(
    db: &DatabaseConnection,
    reservations: Vec<reservation::Model>,
) -> Result<Vec<ReservationDetails>> {
    let users = reservations.load_one(User, db).await?;
    let rooms = reservations.load_one(Room, db).await?;

    Ok(reservations
        .into_iter()
        .zip(users)
        .zip(rooms)
        .map(|((reservation, user), room)| ReservationDetails {
            reservation,
            user,
            room,
        })
        .collect())
}

/// Finds a reservation by id, returning None if absent.
pub async fn get_reservation_by_id(
    db: &DatabaseConnection,
    reservation_id: i64,
) -> Result<Option<reservation::Model>> {
    Reservation::find_by_id(reservation_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the service snapshots booked with a reservation.
pub async fn get_reservation_services(
    db: &DatabaseConnection,
    reservation_id: i64,
) -> Result<Vec<reservation_service::Model>> {
    ReservationService::find()
        .filter(reservation_service::Column::ReservationId.eq(reservation_id))
        .order_by_asc(reservation_service::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::catalog;
    use crate::entities::{MonthlyProfit, service};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn next_year() -> i32 {
        Utc::now().year() + 1
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn guest(name: &str) -> Option<GuestDetails> {
        Some(GuestDetails {
            name: name.to_string(),
            last_name: "Doe".to_string(),
        })
    }

    /// Stay in March of next year from `start_day` to `end_day`.
    fn stay(room_id: i64, start_day: i32, end_day: i32) -> CreateReservationInput {
        CreateReservationInput {
            room_id,
            start_day,
            start_month: 3,
            start_year: next_year(),
            end_day,
            end_month: 3,
            end_year: next_year(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_check_in_rejects_bad_dates_before_queries() -> Result<()> {
        // No query results appended: any database access would fail with a DbErr
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut input = stay(1, 1, 4);
        input.start_month = 13;
        assert!(matches!(
            check_in(&db, 1, input).await,
            Err(Error::InvalidDate { .. })
        ));

        let mut input = stay(1, 1, 4);
        input.end_day = 32;
        assert!(matches!(
            check_in(&db, 1, input).await,
            Err(Error::InvalidDate { .. })
        ));

        let mut input = stay(1, 1, 4);
        input.start_year = Utc::now().year() - 1;
        assert!(matches!(
            check_in(&db, 1, input).await,
            Err(Error::InvalidDate { .. })
        ));

        assert!(matches!(
            check_in(&db, 1, stay(1, 10, 4)).await,
            Err(Error::InvalidDate { .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_check_in_user_not_found() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        assert!(matches!(
            check_in(&db, 42, stay(1, 1, 4)).await,
            Err(Error::UserNotFound { id: 42 })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_check_in_room_not_found() -> Result<()> {
        let db = setup_with_catalog().await?;
        let user = create_test_user(&db, "ana@example.com").await?;

        assert!(matches!(
            check_in(&db, user.id, stay(999, 1, 4)).await,
            Err(Error::RoomNotFound { id: 999 })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_check_in_reference_price() -> Result<()> {
        let db = setup_with_catalog().await?;
        let user = create_test_user(&db, "ana@example.com").await?;
        let room = create_test_room(&db, 101).await?;

        let mut input = stay(room.id, 1, 4);
        input.guest1 = guest("Ana");
        input.guest2 = guest("Bo");
        input.services = vec!["breakfast".to_string()];

        let reservation = check_in(&db, user.id, input).await?;
        assert_eq!(reservation.price, 390.0);
        assert_eq!(reservation.status, ReservationStatus::Active);
        assert_eq!(reservation.start_date, date(next_year(), 3, 1));
        assert_eq!(reservation.end_date, date(next_year(), 3, 4));
        assert_eq!(reservation.guest_name2.as_deref(), Some("Bo"));
        assert!(reservation.guest_name3.is_none());

        let services = get_reservation_services(&db, reservation.id).await?;
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].price, 50.0);

        let month = profit::get_monthly_profit(&db, next_year(), 3).await?.unwrap();
        assert_eq!(month.profit, 390.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_check_in_whitespace_guest_name_is_charged() -> Result<()> {
        let db = setup_with_catalog().await?;
        let user = create_test_user(&db, "ana@example.com").await?;
        let room = create_test_room(&db, 101).await?;

        let mut input = stay(room.id, 1, 2);
        input.guest1 = guest("Ana");
        input.guest2 = guest("   ");
        input.guest3 = guest("");

        // Only the empty name is free
        let reservation = check_in(&db, user.id, input).await?;
        assert_eq!(reservation.price, 140.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_check_in_with_injected_pricing() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "ana@example.com").await?;
        let room = create_test_room(&db, 101).await?;

        // No guest price is stored; the injected engine supplies it
        let pricing = PricingEngine::new(10.0, Vec::new());
        let mut input = stay(room.id, 1, 2);
        input.guest1 = guest("Ana");

        let reservation = check_in_with_pricing(&db, &pricing, user.id, input).await?;
        assert_eq!(reservation.price, 110.0);
        let month = profit::get_monthly_profit(&db, next_year(), 3).await?.unwrap();
        assert_eq!(month.profit, 110.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_check_in_stay_length_boundaries() -> Result<()> {
        let db = setup_with_catalog().await?;
        let room = create_test_room(&db, 101).await?;
        let user = create_test_user(&db, "ana@example.com").await?;

        assert!(matches!(
            check_in(&db, user.id, stay(room.id, 5, 5)).await,
            Err(Error::InvalidRange { .. })
        ));
        assert!(matches!(
            check_in(&db, user.id, stay(room.id, 1, 17)).await,
            Err(Error::MaxStayExceeded { nights: 16, max: 15 })
        ));

        let reservation = check_in(&db, user.id, stay(room.id, 1, 16)).await?;
        assert_eq!(reservation.price, 1500.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_check_in_one_active_reservation_per_user() -> Result<()> {
        let db = setup_with_catalog().await?;
        let user = create_test_user(&db, "ana@example.com").await?;
        let room1 = create_test_room(&db, 101).await?;
        let room2 = create_test_room(&db, 102).await?;

        let first = check_in(&db, user.id, stay(room1.id, 1, 3)).await?;
        assert!(matches!(
            check_in(&db, user.id, stay(room2.id, 10, 12)).await,
            Err(Error::DuplicateActiveReservation { .. })
        ));

        // Allowed again once the first stay is finished
        check_out(&db, first.id).await?;
        check_in(&db, user.id, stay(room2.id, 10, 12)).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_check_in_overlap_rejected() -> Result<()> {
        let db = setup_with_catalog().await?;
        let ana = create_test_user(&db, "ana@example.com").await?;
        let bo = create_test_user(&db, "bo@example.com").await?;
        let room = create_test_room(&db, 101).await?;

        check_in(&db, ana.id, stay(room.id, 10, 15)).await?;

        // Sharing the last day counts as overlapping
        assert!(matches!(
            check_in(&db, bo.id, stay(room.id, 15, 18)).await,
            Err(Error::RoomUnavailable { room_id }) if room_id == room.id
        ));
        check_in(&db, bo.id, stay(room.id, 16, 18)).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_finished_reservation_still_blocks_dates() -> Result<()> {
        let db = setup_with_catalog().await?;
        let ana = create_test_user(&db, "ana@example.com").await?;
        let bo = create_test_user(&db, "bo@example.com").await?;
        let room = create_test_room(&db, 101).await?;

        let booked = check_in(&db, ana.id, stay(room.id, 10, 15)).await?;
        check_out(&db, booked.id).await?;

        assert!(matches!(
            check_in(&db, bo.id, stay(room.id, 11, 12)).await,
            Err(Error::RoomUnavailable { .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_check_in_unknown_service_writes_nothing() -> Result<()> {
        let db = setup_with_catalog().await?;
        let user = create_test_user(&db, "ana@example.com").await?;
        let room = create_test_room(&db, 101).await?;

        let mut input = stay(room.id, 1, 3);
        input.services = vec!["breakfast".to_string(), "helicopter".to_string()];
        assert!(matches!(
            check_in(&db, user.id, input).await,
            Err(Error::ServiceNotFound { ref service_type }) if service_type == "helicopter"
        ));

        assert_eq!(Reservation::find().count(&db).await?, 0);
        assert_eq!(ReservationService::find().count(&db).await?, 0);
        assert_eq!(MonthlyProfit::find().count(&db).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_check_in_missing_surcharge() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "ana@example.com").await?;
        let room = create_test_room(&db, 101).await?;

        assert!(matches!(
            check_in(&db, user.id, stay(room.id, 1, 3)).await,
            Err(Error::GuestSurchargeConfigMissing { .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_monthly_profit_accumulates_by_start_month() -> Result<()> {
        let db = setup_with_catalog().await?;
        let ana = create_test_user(&db, "ana@example.com").await?;
        let bo = create_test_user(&db, "bo@example.com").await?;
        let room1 = create_test_room(&db, 101).await?;
        let room2 = create_test_room(&db, 102).await?;

        check_in(&db, ana.id, stay(room1.id, 1, 3)).await?;
        // Starts in March and ends in April; revenue belongs to March
        let mut input = stay(room2.id, 30, 2);
        input.end_month = 4;
        check_in(&db, bo.id, input).await?;

        let march = profit::get_monthly_profit(&db, next_year(), 3).await?.unwrap();
        assert_eq!(march.profit, 500.0);
        assert!(profit::get_monthly_profit(&db, next_year(), 4).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_snapshot_survives_catalog_price_change() -> Result<()> {
        let db = setup_with_catalog().await?;
        let user = create_test_user(&db, "ana@example.com").await?;
        let room = create_test_room(&db, 101).await?;

        let mut input = stay(room.id, 1, 2);
        input.services = vec!["breakfast".to_string()];
        let reservation = check_in(&db, user.id, input).await?;

        let breakfast = catalog::get_service_by_type(&db, "breakfast").await?.unwrap();
        let mut active_model: service::ActiveModel = breakfast.into();
        active_model.price = Set(75.0);
        active_model.update(&db).await?;

        let services = get_reservation_services(&db, reservation.id).await?;
        assert_eq!(services[0].price, 50.0);
        let stored = get_reservation_by_id(&db, reservation.id).await?.unwrap();
        assert_eq!(stored.price, 150.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_check_out_twice() -> Result<()> {
        let db = setup_with_catalog().await?;
        let user = create_test_user(&db, "ana@example.com").await?;
        let room = create_test_room(&db, 101).await?;
        let reservation = check_in(&db, user.id, stay(room.id, 1, 3)).await?;

        let finished = check_out(&db, reservation.id).await?;
        assert_eq!(finished.status, ReservationStatus::Finished);
        assert_eq!(finished.price, reservation.price);

        assert!(matches!(
            check_out(&db, reservation.id).await,
            Err(Error::AlreadyFinished { id }) if id == reservation.id
        ));

        // Profit was recorded once and never touched by checkout
        let month = profit::get_monthly_profit(&db, next_year(), 3).await?.unwrap();
        assert_eq!(month.profit, reservation.price);

        assert!(matches!(
            check_out(&db, 999).await,
            Err(Error::ReservationNotFound { id: 999 })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_round_trip_through_get_reservations() -> Result<()> {
        let db = setup_with_catalog().await?;
        let user = create_test_user(&db, "ana@example.com").await?;
        let room = create_test_room(&db, 101).await?;

        let mut input = stay(room.id, 1, 3);
        input.guest1 = guest("Ana");
        let created = check_in(&db, user.id, input).await?;

        let listed = get_reservations(&db, user.id, &ReservationFilter::default()).await?;
        assert_eq!(listed, vec![created]);

        Ok(())
    }

    #[tokio::test]
    async fn test_reservation_filters() -> Result<()> {
        let db = setup_test_db().await?;
        let ana = create_test_user(&db, "ana@example.com").await?;
        let bo = create_test_user(&db, "bo@example.com").await?;
        let room1 = create_test_room(&db, 101).await?;
        let room2 = create_test_room(&db, 102).await?;

        let early = insert_reservation(
            &db,
            ana.id,
            room1.id,
            date(2030, 1, 1),
            date(2030, 1, 5),
            ReservationStatus::Finished,
        )
        .await?;
        let late = insert_reservation(
            &db,
            ana.id,
            room2.id,
            date(2030, 2, 1),
            date(2030, 2, 5),
            ReservationStatus::Active,
        )
        .await?;
        let other = insert_reservation(
            &db,
            bo.id,
            room1.id,
            date(2030, 2, 3),
            date(2030, 2, 8),
            ReservationStatus::Active,
        )
        .await?;

        let by_status = ReservationFilter {
            status: Some(ReservationStatus::Active),
            ..Default::default()
        };
        assert_eq!(
            get_reservations(&db, ana.id, &by_status).await?,
            vec![late.clone()]
        );

        let january = ReservationFilter {
            start: DateParts::new(1, 1, 2030),
            end: DateParts::new(31, 1, 2030),
            ..Default::default()
        };
        assert_eq!(
            get_reservations(&db, ana.id, &january).await?,
            vec![early.clone()]
        );

        // Only a start bound: everything ending on or after it
        let from_feb = ReservationFilter {
            start: DateParts::new(5, 2, 2030),
            ..Default::default()
        };
        let all: Vec<i64> = get_all_reservations(&db, &from_feb)
            .await?
            .iter()
            .map(|d| d.reservation.id)
            .collect();
        assert_eq!(all, vec![late.id, other.id]);

        // A window takes over from the status
        let finished_in_feb = ReservationFilter {
            status: Some(ReservationStatus::Finished),
            start: DateParts::new(1, 2, 2030),
            end: DateParts::new(28, 2, 2030),
        };
        let in_feb: Vec<i64> = get_all_reservations(&db, &finished_in_feb)
            .await?
            .iter()
            .map(|d| d.reservation.id)
            .collect();
        assert_eq!(in_feb, vec![late.id, other.id]);

        let room_history =
            get_reservations_room(&db, room1.id, &ReservationFilter::default()).await?;
        assert_eq!(room_history.len(), 2);
        assert_eq!(room_history[0].reservation, early);
        assert_eq!(room_history[0].user.as_ref().unwrap().id, ana.id);
        assert_eq!(room_history[1].user.as_ref().unwrap().id, bo.id);
        assert_eq!(room_history[1].room.as_ref().unwrap().id, room1.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_room_history_narrowed_by_window() -> Result<()> {
        let db = setup_test_db().await?;
        let ana = create_test_user(&db, "ana@example.com").await?;
        let bo = create_test_user(&db, "bo@example.com").await?;
        let room1 = create_test_room(&db, 101).await?;
        let room2 = create_test_room(&db, 102).await?;

        let january = insert_reservation(
            &db,
            ana.id,
            room1.id,
            date(2030, 1, 10),
            date(2030, 1, 14),
            ReservationStatus::Finished,
        )
        .await?;
        insert_reservation(
            &db,
            bo.id,
            room1.id,
            date(2030, 2, 10),
            date(2030, 2, 14),
            ReservationStatus::Active,
        )
        .await?;
        insert_reservation(
            &db,
            bo.id,
            room2.id,
            date(2030, 1, 12),
            date(2030, 1, 13),
            ReservationStatus::Finished,
        )
        .await?;

        let filter = ReservationFilter {
            start: DateParts::new(1, 1, 2030),
            end: DateParts::new(31, 1, 2030),
            ..Default::default()
        };
        let history = get_reservations_room(&db, room1.id, &filter).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].reservation, january);
        assert_eq!(history[0].user.as_ref().unwrap().id, ana.id);
        assert_eq!(history[0].room.as_ref().unwrap().id, room1.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_reservation_filter_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let incomplete = ReservationFilter {
            start: DateParts {
                day: Some(1),
                month: Some(2),
                year: None,
            },
            ..Default::default()
        };
        assert!(matches!(
            get_reservations(&db, 1, &incomplete).await,
            Err(Error::IncompleteDate { bound: "start" })
        ));

        let reversed = ReservationFilter {
            start: DateParts::new(10, 2, 2030),
            end: DateParts::new(1, 2, 2030),
            ..Default::default()
        };
        assert!(matches!(
            get_reservations_room(&db, 1, &reversed).await,
            Err(Error::InvalidRange { .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_check_ins_book_room_once() -> Result<()> {
        let db = setup_with_catalog().await?;
        let ana = create_test_user(&db, "ana@example.com").await?;
        let bo = create_test_user(&db, "bo@example.com").await?;
        let room = create_test_room(&db, 101).await?;

        let (first, second) = tokio::join!(
            check_in(&db, ana.id, stay(room.id, 1, 5)),
            check_in(&db, bo.id, stay(room.id, 3, 8)),
        );

        let outcomes = [first, second];
        let booked = outcomes.iter().filter(|r| r.is_ok()).count();
        let rejected = outcomes
            .iter()
            .filter(|r| matches!(r, Err(Error::RoomUnavailable { .. })))
            .count();
        assert_eq!(booked, 1);
        assert_eq!(rejected, 1);
        assert_eq!(Reservation::find().count(&db).await?, 1);

        Ok(())
    }
}
