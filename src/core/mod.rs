/// Room availability against stored reservations
pub mod availability;

/// Services, features, guest prices and catalog seeding
pub mod catalog;

/// Date parts, stay ranges and date windows
pub mod dates;

/// Payment gateway seam and payment callbacks
pub mod payment;

/// Reservation pricing
pub mod pricing;

/// Monthly profit aggregates
pub mod profit;

/// Check-in, checkout and reservation queries
pub mod reservation;

/// Room search, lookups and bulk updates
pub mod room;

/// User lookups
pub mod user;
