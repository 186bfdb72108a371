//! Payment gateway abstraction.
//!
//! The core never talks to a payment provider directly. It asks a [`PaymentGateway`] for a
//! checkout preference priced from the stored reservation, and is told about the outcome
//! through [`on_payment_success`] and [`on_payment_failure`].

use crate::{
    entities::{Reservation, ReservationStatus, Room, reservation},
    errors::{Error, Result},
};
use async_trait::async_trait;
use sea_orm::prelude::*;
use tracing::{info, warn};

/// What a gateway needs to open a checkout for one reservation.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentInput {
    /// Reservation being paid
    pub reservation_id: i64,
    /// Line item title shown to the payer
    pub title: String,
    /// Amount charged
    pub unit_price: f64,
    /// Always 1; a reservation is paid in one go
    pub quantity: u32,
}

/// A checkout preference opened by a gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceHandle {
    /// Provider-side preference id
    pub id: String,
    /// URL the payer is sent to
    pub init_point: String,
}

/// Payment provider interface.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens a checkout preference for `input`.
    ///
    /// # Errors
    /// Returns [`Error::Payment`] if the provider rejects the request.
    async fn initiate_preference(&self, input: &PaymentInput) -> Result<PreferenceHandle>;
}

/// Gateway that approves everything without contacting a provider. For development.
#[derive(Debug, Clone)]
pub struct DummyGateway {
    base_url: String,
}

impl DummyGateway {
    /// Creates a gateway whose checkout links point at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for DummyGateway {
    async fn initiate_preference(&self, input: &PaymentInput) -> Result<PreferenceHandle> {
        if input.unit_price <= 0.0 || !input.unit_price.is_finite() {
            return Err(Error::Payment {
                message: format!("cannot charge {:.2}", input.unit_price),
            });
        }

        let id = format!(
            "dummy_pref_{}_{}",
            input.reservation_id,
            uuid::Uuid::new_v4()
        );
        let init_point = format!("{}/checkout/{id}", self.base_url.trim_end_matches('/'));

        info!(
            "Dummy gateway opened preference {id} for reservation {}",
            input.reservation_id
        );
        Ok(PreferenceHandle { id, init_point })
    }
}

async fn find_reservation(db: &DatabaseConnection, reservation_id: i64) -> Result<reservation::Model> {
    Reservation::find_by_id(reservation_id)
        .one(db)
        .await?
        .ok_or(Error::ReservationNotFound { id: reservation_id })
}

/// Opens a checkout for a stored reservation at its booked price.
///
/// # Errors
/// - [`Error::ReservationNotFound`] if no reservation has this id
/// - [`Error::AlreadyFinished`] if the stay was already checked out
/// - whatever the gateway returns
pub async fn initiate_payment(
    db: &DatabaseConnection,
    gateway: &dyn PaymentGateway,
    reservation_id: i64,
) -> Result<PreferenceHandle> {
    let reservation = find_reservation(db, reservation_id).await?;
    if reservation.status == ReservationStatus::Finished {
        return Err(Error::AlreadyFinished { id: reservation_id });
    }

    let room = reservation.find_related(Room).one(db).await?;
    let title = room.map_or_else(
        || format!("Reservation {}", reservation.id),
        |room| {
            format!(
                "Room {} from {} to {}",
                room.number, reservation.start_date, reservation.end_date
            )
        },
    );

    let input = PaymentInput {
        reservation_id: reservation.id,
        title,
        unit_price: reservation.price,
        quantity: 1,
    };
    gateway.initiate_preference(&input).await
}

/// Provider callback for a completed payment.
///
/// Confirms the reservation is still active and returns it unchanged.
///
/// # Errors
/// - [`Error::ReservationNotFound`] if no reservation has this id
/// - [`Error::AlreadyFinished`] if the stay was already checked out
pub async fn on_payment_success(
    db: &DatabaseConnection,
    reservation_id: i64,
) -> Result<reservation::Model> {
    let reservation = find_reservation(db, reservation_id).await?;
    if reservation.status == ReservationStatus::Finished {
        return Err(Error::AlreadyFinished { id: reservation_id });
    }

    info!("Payment confirmed for reservation {reservation_id}");
    Ok(reservation)
}

/// Provider callback for a failed payment. Nothing is changed.
pub fn on_payment_failure(reservation_id: i64) {
    warn!("Payment failed for reservation {reservation_id}");
}
