//! Room business logic - search, lookups, creation, feature management and bulk updates.
//!
//! Category search codes and per-category image sets are static lookup tables, so adding
//! a category is a data change. Bulk updates ("apply to all") target every room sharing
//! the category of the room named in the request and run in one transaction.

use crate::{
    core::{availability, catalog, dates::StayRange},
    entities::{Feature, Room, RoomCategory, RoomFeature, feature, room, room_feature, service},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{Condition, ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

const SUITE_FAMILY: &[RoomCategory] = &[RoomCategory::Suite, RoomCategory::SuitePremium];
const LOFT_FAMILY: &[RoomCategory] = &[RoomCategory::Loft, RoomCategory::LoftPremium];

/// Coarse search codes accepted by [`search_rooms`] and the categories they select.
pub const CATEGORY_CODES: &[(u8, &[RoomCategory])] = &[
    (1, SUITE_FAMILY),
    (2, SUITE_FAMILY),
    (3, LOFT_FAMILY),
    (4, LOFT_FAMILY),
];

const ROOM_IMAGES: &[(RoomCategory, &[&str])] = &[
    (
        RoomCategory::Suite,
        &[
            "https://images.innkeeper.dev/rooms/suite-1.jpg",
            "https://images.innkeeper.dev/rooms/suite-2.jpg",
            "https://images.innkeeper.dev/rooms/suite-3.jpg",
        ],
    ),
    (
        RoomCategory::SuitePremium,
        &[
            "https://images.innkeeper.dev/rooms/suite-premium-1.jpg",
            "https://images.innkeeper.dev/rooms/suite-premium-2.jpg",
            "https://images.innkeeper.dev/rooms/suite-premium-3.jpg",
        ],
    ),
    (
        RoomCategory::Loft,
        &[
            "https://images.innkeeper.dev/rooms/loft-1.jpg",
            "https://images.innkeeper.dev/rooms/loft-2.jpg",
        ],
    ),
    (
        RoomCategory::LoftPremium,
        &[
            "https://images.innkeeper.dev/rooms/loft-premium-1.jpg",
            "https://images.innkeeper.dev/rooms/loft-premium-2.jpg",
        ],
    ),
];

/// Resolves a coarse search code into its category family.
///
/// # Errors
/// Returns [`Error::InvalidCategory`] for codes outside [`CATEGORY_CODES`].
pub fn categories_for_code(code: u8) -> Result<&'static [RoomCategory]> {
    CATEGORY_CODES
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, categories)| *categories)
        .ok_or(Error::InvalidCategory { code })
}

/// Static gallery for a category; empty when the category has none.
#[must_use]
pub fn images_for_category(category: RoomCategory) -> Vec<String> {
    ROOM_IMAGES
        .iter()
        .find(|(candidate, _)| *candidate == category)
        .map(|(_, images)| images.iter().map(ToString::to_string).collect())
        .unwrap_or_default()
}

/// A room together with its features.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomWithFeatures {
    /// The room
    pub room: room::Model,
    /// Attached features ordered by name
    pub features: Vec<feature::Model>,
}

/// Optional search filters. All supplied filters must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoomFilters {
    /// Coarse category code (see [`CATEGORY_CODES`])
    pub category: Option<u8>,
    /// Exact room number
    pub number: Option<i32>,
    /// Minimum nightly price, inclusive
    pub min_price: Option<f64>,
    /// Maximum nightly price, inclusive
    pub max_price: Option<f64>,
    /// Start of the availability window
    pub starting_date: Option<NaiveDate>,
    /// End of the availability window
    pub ending_date: Option<NaiveDate>,
}

/// One page of search results.
#[derive(Debug, Clone, Serialize)]
pub struct RoomPage {
    /// Rooms on this page
    pub data: Vec<RoomWithFeatures>,
    /// Number of rooms matching the filters
    pub total: u64,
    /// Requested page
    pub current_page: u64,
    /// Pages available at the requested limit
    pub total_pages: u64,
    /// Set when nothing matched
    pub message: Option<String>,
}

/// Guest view of a room.
#[derive(Debug, Clone, Serialize)]
pub struct RoomDetails {
    /// The room
    pub room: room::Model,
    /// Attached features
    pub features: Vec<feature::Model>,
    /// Gallery for the room's category
    pub images: Vec<String>,
    /// Full service catalog that can be booked with the room
    pub services: Vec<service::Model>,
}

/// Admin view of a room.
#[derive(Debug, Clone, Serialize)]
pub struct RoomAdminView {
    /// The room
    pub room: room::Model,
    /// Attached features
    pub features: Vec<feature::Model>,
    /// Catalog features not yet attached
    pub available_features: Vec<feature::Model>,
}

/// Input for [`create_room`].
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomInput {
    /// Room number, must be unused
    pub number: i32,
    /// Category
    pub category: RoomCategory,
    /// Nightly price
    pub price: f64,
    /// Optional cover image
    pub image: Option<String>,
}

/// Changes accepted by [`update_room`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoomInput {
    /// New nightly price
    pub price: Option<f64>,
    /// New room number; single-room updates only
    pub number: Option<i32>,
    /// New category
    pub category: Option<RoomCategory>,
    /// New cover image
    pub image: Option<String>,
    /// Feature ids to add; bulk updates only
    pub features_ids: Option<Vec<i64>>,
    /// Feature names to remove
    pub features_to_delete: Option<Vec<String>>,
}

impl UpdateRoomInput {
    const fn has_scalar_changes(&self) -> bool {
        self.price.is_some()
            || self.number.is_some()
            || self.category.is_some()
            || self.image.is_some()
    }

    fn apply_to(&self, model: room::Model) -> room::ActiveModel {
        let mut active_model: room::ActiveModel = model.into();
        if let Some(price) = self.price {
            active_model.price = Set(price);
        }
        if let Some(number) = self.number {
            active_model.number = Set(number);
        }
        if let Some(category) = self.category {
            active_model.category = Set(category);
        }
        if let Some(image) = &self.image {
            active_model.image = Set(Some(image.clone()));
        }
        active_model
    }
}

/// Result of [`update_room`].
#[derive(Debug, Clone, Serialize)]
pub enum RoomUpdate {
    /// The one room that was updated
    Single(RoomWithFeatures),
    /// Every room of the category, after the update
    Bulk(Vec<RoomWithFeatures>),
}

pub(crate) async fn find_by_number<C>(db: &C, number: i32) -> Result<Option<room::Model>>
where
    C: ConnectionTrait,
{
    Room::find()
        .filter(room::Column::Number.eq(number))
        .one(db)
        .await
        .map_err(Into::into)
}

async fn find_room<C>(db: &C, room_id: i64) -> Result<room::Model>
where
    C: ConnectionTrait,
{
    Room::find_by_id(room_id)
        .one(db)
        .await?
        .ok_or(Error::RoomNotFound { id: room_id })
}

async fn load_features<C>(db: &C, room: &room::Model) -> Result<Vec<feature::Model>>
where
    C: ConnectionTrait,
{
    room.find_related(Feature)
        .order_by_asc(feature::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn with_features<C>(db: &C, room: room::Model) -> Result<RoomWithFeatures>
where
    C: ConnectionTrait,
{
    let features = load_features(db, &room).await?;
    Ok(RoomWithFeatures { room, features })
}

/// Resolves feature names, failing if any name is unknown.
async fn features_by_name<C>(db: &C, names: &[String]) -> Result<Vec<feature::Model>>
where
    C: ConnectionTrait,
{
    let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
    let found = Feature::find()
        .filter(feature::Column::Name.is_in(wanted.iter().copied()))
        .all(db)
        .await?;

    if found.len() != wanted.len() {
        let known: HashSet<&str> = found.iter().map(|f| f.name.as_str()).collect();
        let mut missing: Vec<&str> = wanted.difference(&known).copied().collect();
        missing.sort_unstable();
        return Err(Error::FeatureNotFound {
            reference: missing.join(", "),
        });
    }
    Ok(found)
}

async fn detach_features<C>(db: &C, room_id: i64, feature_ids: &[i64]) -> Result<()>
where
    C: ConnectionTrait,
{
    if feature_ids.is_empty() {
        return Ok(());
    }
    RoomFeature::delete_many()
        .filter(room_feature::Column::RoomId.eq(room_id))
        .filter(room_feature::Column::FeatureId.is_in(feature_ids.iter().copied()))
        .exec(db)
        .await?;
    Ok(())
}

async fn attach_features<C>(db: &C, room_id: i64, feature_ids: &[i64]) -> Result<()>
where
    C: ConnectionTrait,
{
    if feature_ids.is_empty() {
        return Ok(());
    }
    RoomFeature::insert_many(feature_ids.iter().map(|feature_id| room_feature::ActiveModel {
        room_id: Set(room_id),
        feature_id: Set(*feature_id),
    }))
    .exec_without_returning(db)
    .await?;
    Ok(())
}

fn validate_price(price: Option<f64>) -> Result<()> {
    match price {
        Some(price) if price < 0.0 || !price.is_finite() => Err(Error::NegativePrice { price }),
        _ => Ok(()),
    }
}

/// Searches rooms page by page.
///
/// Filters combine with AND. When an availability window is given, rooms holding any
/// reservation that overlaps it are excluded. Results are ordered by room number.
///
/// # Errors
/// - [`Error::InvalidPagination`] if `page` or `limit` is 0
/// - [`Error::InvalidCategory`] for an unmapped category code
/// - [`Error::NegativePrice`] / [`Error::InvalidPriceRange`] for bad price bounds
/// - [`Error::IncompleteDateWindow`] if only one window date is given
/// - [`Error::InvalidRange`] if the window start is after its end
pub async fn search_rooms(
    db: &DatabaseConnection,
    page: u64,
    limit: u64,
    filters: &RoomFilters,
) -> Result<RoomPage> {
    if page < 1 || limit < 1 {
        return Err(Error::InvalidPagination { page, limit });
    }

    let mut condition = Condition::all();

    if let Some(code) = filters.category {
        let categories = categories_for_code(code)?;
        condition = condition.add(room::Column::Category.is_in(categories.iter().copied()));
    }

    if let Some(number) = filters.number {
        condition = condition.add(room::Column::Number.eq(number));
    }

    validate_price(filters.min_price)?;
    validate_price(filters.max_price)?;
    if let (Some(min), Some(max)) = (filters.min_price, filters.max_price)
        && min > max
    {
        return Err(Error::InvalidPriceRange { min, max });
    }
    if let Some(min) = filters.min_price {
        condition = condition.add(room::Column::Price.gte(min));
    }
    if let Some(max) = filters.max_price {
        condition = condition.add(room::Column::Price.lte(max));
    }

    match (filters.starting_date, filters.ending_date) {
        (Some(start), Some(end)) => {
            let window = StayRange::new(start, end)?;
            let occupied = availability::occupied_room_ids(db, &window).await?;
            debug!("{} rooms occupied between {start} and {end}", occupied.len());
            if !occupied.is_empty() {
                condition = condition.add(room::Column::Id.is_not_in(occupied));
            }
        }
        (None, None) => {}
        _ => return Err(Error::IncompleteDateWindow),
    }

    let paginator = Room::find()
        .filter(condition)
        .order_by_asc(room::Column::Number)
        .paginate(db, limit);
    let total = paginator.num_items().await?;
    let rooms = paginator.fetch_page(page - 1).await?;

    let mut data = Vec::with_capacity(rooms.len());
    for room in rooms {
        data.push(with_features(db, room).await?);
    }

    Ok(RoomPage {
        data,
        total,
        current_page: page,
        total_pages: total.div_ceil(limit),
        message: (total == 0).then(|| "No rooms found matching the criteria.".to_string()),
    })
}

/// Retrieves every room of a category ordered by number.
pub async fn list_rooms_in_category<C>(db: &C, category: RoomCategory) -> Result<Vec<room::Model>>
where
    C: ConnectionTrait,
{
    Room::find()
        .filter(room::Column::Category.eq(category))
        .order_by_asc(room::Column::Number)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Guest view: the room, its features, its category gallery and the service catalog.
pub async fn get_room_by_id(db: &DatabaseConnection, room_id: i64) -> Result<RoomDetails> {
    let room = find_room(db, room_id).await?;
    let features = load_features(db, &room).await?;
    let services = catalog::list_services(db).await?;
    let images = images_for_category(room.category);

    Ok(RoomDetails {
        room,
        features,
        images,
        services,
    })
}

/// Admin view: the room, its features and the catalog features it does not have yet.
pub async fn get_room_by_id_admin(db: &DatabaseConnection, room_id: i64) -> Result<RoomAdminView> {
    let room = find_room(db, room_id).await?;
    let features = load_features(db, &room).await?;

    let available_features = Feature::find()
        .filter(feature::Column::Id.is_not_in(features.iter().map(|f| f.id)))
        .order_by_asc(feature::Column::Name)
        .all(db)
        .await?;

    Ok(RoomAdminView {
        room,
        features,
        available_features,
    })
}

/// Creates a room with an unused number.
///
/// # Errors
/// - [`Error::NegativePrice`] if the price is negative
/// - [`Error::DuplicateRoomNumber`] if the number is taken
#[instrument(skip(db))]
pub async fn create_room(db: &DatabaseConnection, input: CreateRoomInput) -> Result<room::Model> {
    validate_price(Some(input.price))?;

    if find_by_number(db, input.number).await?.is_some() {
        return Err(Error::DuplicateRoomNumber {
            number: input.number,
        });
    }

    let room = room::ActiveModel {
        number: Set(input.number),
        category: Set(input.category),
        price: Set(input.price),
        image: Set(input.image),
        ..Default::default()
    };
    let created = room.insert(db).await?;
    info!("Created room {} ({:?})", created.number, created.category);
    Ok(created)
}

/// Attaches one feature to a room. Attaching a feature the room already has is a no-op.
///
/// # Errors
/// [`Error::RoomNotFound`] or [`Error::FeatureNotFound`] if either id does not resolve.
pub async fn add_feature(
    db: &DatabaseConnection,
    room_id: i64,
    feature_id: i64,
) -> Result<RoomWithFeatures> {
    let room = find_room(db, room_id).await?;
    let feature = Feature::find_by_id(feature_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::FeatureNotFound {
            reference: feature_id.to_string(),
        })?;

    let attached = RoomFeature::find_by_id((room.id, feature.id))
        .one(db)
        .await?
        .is_some();
    if !attached {
        attach_features(db, room.id, &[feature.id]).await?;
    }

    with_features(db, room).await
}

/// Deletes a room. Its feature links and reservations are removed by the database.
///
/// # Errors
/// [`Error::RoomNotFound`] if the room does not exist.
#[instrument(skip(db))]
pub async fn delete_room(db: &DatabaseConnection, room_id: i64) -> Result<room::Model> {
    let room = find_room(db, room_id).await?;
    room.clone().delete(db).await?;
    info!("Deleted room {}", room.number);
    Ok(room)
}

/// Updates one room, or with `apply_to_all` every room sharing its category.
///
/// Single-room mode removes `features_to_delete` and merges the scalar fields. Bulk mode
/// adds `features_ids` to every room of the category, removes `features_to_delete` from
/// all of them, and copies price, category and image onto each. Every check runs before
/// the first write and all writes share one transaction.
///
/// # Errors
/// - [`Error::RoomNotFound`] if the target room does not exist
/// - [`Error::ApplyToAllRequired`] if `features_ids` is given without `apply_to_all`
/// - [`Error::ApplyToAllConflict`] if `number` is given with `apply_to_all`
/// - [`Error::FeatureAddDeleteConflict`] if a feature is both added and deleted
/// - [`Error::FeatureNotFound`] if a feature id or name does not resolve
/// - [`Error::DuplicateFeature`] if a room already has a feature being added
/// - [`Error::DuplicateRoomNumber`] if the new number belongs to another room
#[instrument(skip(db, changes))]
pub async fn update_room(
    db: &DatabaseConnection,
    room_id: i64,
    changes: UpdateRoomInput,
    apply_to_all: bool,
) -> Result<RoomUpdate> {
    let txn = db.begin().await?;

    let room = find_room(&txn, room_id).await?;

    if changes.features_ids.is_some() && !apply_to_all {
        return Err(Error::ApplyToAllRequired);
    }
    if changes.number.is_some() && apply_to_all {
        return Err(Error::ApplyToAllConflict);
    }
    validate_price(changes.price)?;

    let update = if apply_to_all {
        update_category(&txn, &room, &changes).await?
    } else {
        update_single(&txn, room, &changes).await?
    };

    txn.commit().await?;
    Ok(update)
}

async fn update_single<C>(
    db: &C,
    room: room::Model,
    changes: &UpdateRoomInput,
) -> Result<RoomUpdate>
where
    C: ConnectionTrait,
{
    if let Some(names) = &changes.features_to_delete {
        let to_remove = features_by_name(db, names).await?;
        let ids: Vec<i64> = to_remove.iter().map(|f| f.id).collect();
        detach_features(db, room.id, &ids).await?;
    }

    if let Some(number) = changes.number
        && number != room.number
        && find_by_number(db, number).await?.is_some()
    {
        return Err(Error::DuplicateRoomNumber { number });
    }

    let room = if changes.has_scalar_changes() {
        changes.apply_to(room).update(db).await?
    } else {
        room
    };

    debug!("Updated room {}", room.number);
    Ok(RoomUpdate::Single(with_features(db, room).await?))
}

async fn update_category<C>(
    db: &C,
    target: &room::Model,
    changes: &UpdateRoomInput,
) -> Result<RoomUpdate>
where
    C: ConnectionTrait,
{
    let rooms = list_rooms_in_category(db, target.category).await?;

    let mut to_add: Vec<i64> = Vec::new();
    if let Some(requested) = &changes.features_ids {
        let mut unique: Vec<i64> = requested.clone();
        unique.sort_unstable();
        unique.dedup();

        let features = Feature::find()
            .filter(feature::Column::Id.is_in(unique.iter().copied()))
            .all(db)
            .await?;

        if let Some(names) = &changes.features_to_delete
            && let Some(conflict) = features.iter().find(|f| names.contains(&f.name))
        {
            return Err(Error::FeatureAddDeleteConflict {
                name: conflict.name.clone(),
            });
        }

        if features.len() != unique.len() {
            let found: HashSet<i64> = features.iter().map(|f| f.id).collect();
            let missing: Vec<String> = unique
                .iter()
                .filter(|id| !found.contains(id))
                .map(ToString::to_string)
                .collect();
            return Err(Error::FeatureNotFound {
                reference: missing.join(", "),
            });
        }

        for room in &rooms {
            let existing: HashSet<i64> = load_features(db, room)
                .await?
                .iter()
                .map(|f| f.id)
                .collect();
            let duplicates: Vec<i64> = unique
                .iter()
                .copied()
                .filter(|id| existing.contains(id))
                .collect();
            if !duplicates.is_empty() {
                return Err(Error::DuplicateFeature {
                    room_id: room.id,
                    feature_ids: duplicates,
                });
            }
        }

        to_add = unique;
    }

    let to_remove: Vec<i64> = match &changes.features_to_delete {
        Some(names) => features_by_name(db, names)
            .await?
            .iter()
            .map(|f| f.id)
            .collect(),
        None => Vec::new(),
    };

    let mut updated = Vec::with_capacity(rooms.len());
    for room in rooms {
        attach_features(db, room.id, &to_add).await?;
        detach_features(db, room.id, &to_remove).await?;
        let room = if changes.has_scalar_changes() {
            changes.apply_to(room).update(db).await?
        } else {
            room
        };
        updated.push(with_features(db, room).await?);
    }

    info!(
        "Bulk-updated {} rooms of category {:?}",
        updated.len(),
        target.category
    );
    Ok(RoomUpdate::Bulk(updated))
}
