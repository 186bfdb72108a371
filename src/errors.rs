//! Unified error types for the reservation core.
//!
//! Every failure carries its specific kind so the boundary layer can map it to a
//! transport response. [`Error::kind`] groups the kinds into families.

use chrono::NaiveDate;
use thiserror::Error;

/// Error families used by callers to decide how to surface a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or contradictory input supplied by the caller
    Validation,
    /// A referenced entity does not exist
    NotFound,
    /// The request violates a business rule
    Conflict,
    /// Infrastructure failure (database, configuration, payment provider)
    Internal,
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    // Validation
    /// Some but not all of the day/month/year parts of a date bound were supplied
    #[error("Incomplete date information provided for the {bound} date")]
    IncompleteDate {
        /// Which bound was incomplete ("start" or "end")
        bound: &'static str,
    },

    /// Check-in date parts are out of range or out of order
    #[error("Invalid date: {reason}")]
    InvalidDate {
        /// What was wrong with the dates
        reason: String,
    },

    /// Range start is after its end, or the stay has no nights
    #[error("Invalid date range: {start} to {end}")]
    InvalidRange {
        /// Start of the rejected range
        start: NaiveDate,
        /// End of the rejected range
        end: NaiveDate,
    },

    /// Page and limit must both be at least 1
    #[error("Invalid pagination: page {page}, limit {limit} (both must be >= 1)")]
    InvalidPagination {
        /// Requested page
        page: u64,
        /// Requested page size
        limit: u64,
    },

    /// A price value was negative
    #[error("Price cannot be negative: {price}")]
    NegativePrice {
        /// The offending price
        price: f64,
    },

    /// Minimum price bound exceeds the maximum bound
    #[error("Minimum price {min} cannot be greater than maximum price {max}")]
    InvalidPriceRange {
        /// Minimum bound
        min: f64,
        /// Maximum bound
        max: f64,
    },

    /// Only one end of an availability window was supplied
    #[error("Both start date and end date must be provided")]
    IncompleteDateWindow,

    /// Category search code has no mapping
    #[error("Invalid category value: {code}")]
    InvalidCategory {
        /// The rejected code
        code: u8,
    },

    /// A required text field was empty or whitespace
    #[error("{field} cannot be empty")]
    BlankField {
        /// Name of the empty field
        field: &'static str,
    },

    /// Feature additions require the bulk-update mode
    #[error("applyToAll is required when featuresIds is provided")]
    ApplyToAllRequired,

    /// Room numbers cannot be mass-assigned
    #[error("applyToAll cannot be used together with a room number")]
    ApplyToAllConflict,

    /// The same feature was named for both addition and deletion
    #[error("You can't add and delete the same feature: {name}")]
    FeatureAddDeleteConflict {
        /// Name of the conflicting feature
        name: String,
    },

    // Not found
    /// User lookup failed
    #[error("User not found: {id}")]
    UserNotFound {
        /// Requested user id
        id: i64,
    },

    /// Room lookup failed
    #[error("Room not found: {id}")]
    RoomNotFound {
        /// Requested room id
        id: i64,
    },

    /// Reservation lookup failed
    #[error("Reservation not found: {id}")]
    ReservationNotFound {
        /// Requested reservation id
        id: i64,
    },

    /// One or more features did not resolve
    #[error("Feature not found: {reference}")]
    FeatureNotFound {
        /// The unresolved feature id(s) or name(s)
        reference: String,
    },

    /// Requested add-on service is not in the catalog
    #[error("Service of type {service_type} not found")]
    ServiceNotFound {
        /// The unknown service type
        service_type: String,
    },

    /// The named guest surcharge entry is missing
    #[error("Guest price '{name}' not found")]
    GuestSurchargeConfigMissing {
        /// Name of the missing surcharge entry
        name: String,
    },

    // Conflict
    /// User already holds an active reservation
    #[error("User {user_id} already has an active reservation")]
    DuplicateActiveReservation {
        /// The user holding the active reservation
        user_id: i64,
    },

    /// Requested dates overlap an existing reservation of the room
    #[error("There is already a reservation during these dates for room {room_id}")]
    RoomUnavailable {
        /// The requested room
        room_id: i64,
    },

    /// Stay is longer than the allowed maximum
    #[error("Stay of {nights} nights exceeds the maximum of {max}")]
    MaxStayExceeded {
        /// Requested stay length
        nights: i64,
        /// Allowed maximum
        max: i64,
    },

    /// Room number already taken
    #[error("Room number {number} already exists")]
    DuplicateRoomNumber {
        /// The taken number
        number: i32,
    },

    /// Feature(s) already attached to a room
    #[error("Feature(s) {feature_ids:?} already exist in room {room_id}")]
    DuplicateFeature {
        /// Room that already holds the features
        room_id: i64,
        /// The duplicated feature ids
        feature_ids: Vec<i64>,
    },

    /// Reservation was already checked out
    #[error("Reservation {id} already finished")]
    AlreadyFinished {
        /// The finished reservation
        id: i64,
    },

    // Infrastructure
    /// Configuration loading or parsing failed
    #[error("Configuration error: {message}")]
    Config {
        /// Failure description
        message: String,
    },

    /// Payment provider failure
    #[error("Payment provider error: {message}")]
    Payment {
        /// Failure description
        message: String,
    },

    /// Database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable failure
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Returns the family this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::IncompleteDate { .. }
            | Self::InvalidDate { .. }
            | Self::InvalidRange { .. }
            | Self::InvalidPagination { .. }
            | Self::NegativePrice { .. }
            | Self::InvalidPriceRange { .. }
            | Self::IncompleteDateWindow
            | Self::InvalidCategory { .. }
            | Self::BlankField { .. }
            | Self::ApplyToAllRequired
            | Self::ApplyToAllConflict
            | Self::FeatureAddDeleteConflict { .. } => ErrorKind::Validation,
            Self::UserNotFound { .. }
            | Self::RoomNotFound { .. }
            | Self::ReservationNotFound { .. }
            | Self::FeatureNotFound { .. }
            | Self::ServiceNotFound { .. }
            | Self::GuestSurchargeConfigMissing { .. } => ErrorKind::NotFound,
            Self::DuplicateActiveReservation { .. }
            | Self::RoomUnavailable { .. }
            | Self::MaxStayExceeded { .. }
            | Self::DuplicateRoomNumber { .. }
            | Self::DuplicateFeature { .. }
            | Self::AlreadyFinished { .. } => ErrorKind::Conflict,
            Self::Config { .. }
            | Self::Payment { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::EnvVar(_) => ErrorKind::Internal,
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::IncompleteDateWindow.kind(), ErrorKind::Validation);
        assert_eq!(
            Error::BlankField { field: "email" }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(Error::RoomNotFound { id: 1 }.kind(), ErrorKind::NotFound);
        assert_eq!(Error::AlreadyFinished { id: 1 }.kind(), ErrorKind::Conflict);
        assert_eq!(
            Error::MaxStayExceeded { nights: 16, max: 15 }.kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            Error::Config {
                message: "bad".to_string()
            }
            .kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_error_messages() {
        let err = Error::ServiceNotFound {
            service_type: "spa".to_string(),
        };
        assert_eq!(err.to_string(), "Service of type spa not found");

        let err = Error::DuplicateFeature {
            room_id: 3,
            feature_ids: vec![1, 2],
        };
        assert_eq!(err.to_string(), "Feature(s) [1, 2] already exist in room 3");

        let err = Error::BlankField {
            field: "Service type",
        };
        assert_eq!(err.to_string(), "Service type cannot be empty");
    }
}
