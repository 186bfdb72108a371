//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod feature;
pub mod guest_price;
pub mod monthly_profit;
pub mod reservation;
pub mod reservation_service;
pub mod room;
pub mod room_feature;
pub mod service;
pub mod user;

// Re-export specific types to avoid conflicts
pub use feature::{Column as FeatureColumn, Entity as Feature, Model as FeatureModel};
pub use guest_price::{Column as GuestPriceColumn, Entity as GuestPrice, Model as GuestPriceModel};
pub use monthly_profit::{
    Column as MonthlyProfitColumn, Entity as MonthlyProfit, Model as MonthlyProfitModel,
};
pub use reservation::{
    Column as ReservationColumn, Entity as Reservation, Model as ReservationModel,
    ReservationStatus,
};
pub use reservation_service::{
    Column as ReservationServiceColumn, Entity as ReservationService,
    Model as ReservationServiceModel,
};
pub use room::{Column as RoomColumn, Entity as Room, Model as RoomModel, RoomCategory};
pub use room_feature::{Column as RoomFeatureColumn, Entity as RoomFeature};
pub use service::{Column as ServiceColumn, Entity as Service, Model as ServiceModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
