//! Reservation pricing.
//!
//! The engine holds the guest surcharge and the service catalog as an explicit value.
//! [`PricingEngine::load`] reads both from the database once; [`PricingEngine::quote`]
//! is pure and returns the total together with the per-service price snapshots that
//! check-in persists.

use crate::{
    entities::{GuestPrice, Service, guest_price, service},
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, prelude::*};
use std::collections::HashMap;

/// Name of the guest price entry holding the per-guest surcharge.
pub const GUEST_SURCHARGE_NAME: &str = "guest";

/// A service accepted into a quote, with the price it is charged at.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCharge {
    /// Catalog service id
    pub service_id: i64,
    /// Service type as requested
    pub service_type: String,
    /// Price at booking time
    pub price: f64,
}

/// The result of pricing a stay.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    /// Room and guest portion of the total
    pub base_price: f64,
    /// Accepted services in request order
    pub services: Vec<ServiceCharge>,
    /// Grand total
    pub total: f64,
}

/// Computes reservation prices from an injected surcharge and service catalog.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    guest_surcharge: f64,
    catalog: HashMap<String, service::Model>,
}

impl PricingEngine {
    /// Creates an engine from an explicit surcharge and catalog.
    #[must_use]
    pub fn new(guest_surcharge: f64, catalog: Vec<service::Model>) -> Self {
        Self {
            guest_surcharge,
            catalog: catalog
                .into_iter()
                .map(|service| (service.service_type.clone(), service))
                .collect(),
        }
    }

    /// Builds an engine from the `"guest"` guest price and the current service catalog.
    ///
    /// # Errors
    /// Returns [`Error::GuestSurchargeConfigMissing`] if no `"guest"` entry exists.
    pub async fn load<C>(db: &C) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        let surcharge = GuestPrice::find()
            .filter(guest_price::Column::Name.eq(GUEST_SURCHARGE_NAME))
            .one(db)
            .await?
            .ok_or_else(|| Error::GuestSurchargeConfigMissing {
                name: GUEST_SURCHARGE_NAME.to_string(),
            })?;

        let catalog = Service::find().all(db).await?;
        Ok(Self::new(surcharge.price, catalog))
    }

    /// Per-guest surcharge in use.
    #[must_use]
    pub const fn guest_surcharge(&self) -> f64 {
        self.guest_surcharge
    }

    /// Prices a stay.
    ///
    /// `total = nightly_price * nights + guest_count * surcharge + sum(service prices)`.
    /// Each requested service type is looked up in the catalog and charged at its current
    /// price; requesting a type twice charges it twice.
    ///
    /// # Errors
    /// Returns [`Error::ServiceNotFound`] for the first requested type missing from the catalog.
    pub fn quote<S>(
        &self,
        nightly_price: f64,
        nights: i64,
        guest_count: u32,
        service_types: &[S],
    ) -> Result<PriceQuote>
    where
        S: AsRef<str>,
    {
        #[allow(clippy::cast_precision_loss)]
        let base_price =
            nightly_price * nights as f64 + f64::from(guest_count) * self.guest_surcharge;

        let services = service_types
            .iter()
            .map(|requested| {
                let requested = requested.as_ref();
                self.catalog
                    .get(requested)
                    .map(|service| ServiceCharge {
                        service_id: service.id,
                        service_type: service.service_type.clone(),
                        price: service.price,
                    })
                    .ok_or_else(|| Error::ServiceNotFound {
                        service_type: requested.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let total = services.iter().fold(base_price, |acc, charge| acc + charge.price);

        Ok(PriceQuote {
            base_price,
            services,
            total,
        })
    }
}
