//! Entity store seams and their implementations.
//!
//! Readers and writers are split per entity the way the services consume
//! them. Writers for locations and categories run the hierarchy validators
//! inside their commit path; there is no way to store a location or
//! category without passing them.

use diesel::SqliteConnection;

use crate::db::{DbConnection, DbPool};
use crate::domain::category::{Category, CategoryUpdate, NewCategory};
use crate::domain::item::{Item, NewItem};
use crate::domain::location::{Location, LocationUpdate, NewLocation};
use crate::domain::room::{NewRoom, Room};
use crate::domain::types::{
    CategoryId, CategoryName, ItemId, LocationId, LocationName, RoomId, RoomName,
};
use crate::hierarchy::{CategoryGraph, LocationGraph};

pub mod category;
pub mod errors;
pub mod item;
pub mod location;
pub mod memory;
pub mod room;

pub use errors::{RepositoryError, RepositoryResult};
pub use memory::MemoryRepository;

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Hierarchy lookups running on the connection of an open transaction.
struct TxGraph<'a> {
    conn: &'a mut SqliteConnection,
}

fn tx_graph(conn: &mut SqliteConnection) -> TxGraph<'_> {
    TxGraph { conn }
}

/// Query parameters used when listing items.
#[derive(Debug, Clone, Default)]
pub struct ItemListQuery {
    /// Restrict to items stored in any of these locations.
    pub location_ids: Option<Vec<LocationId>>,
    /// Restrict to items of this category.
    pub category_id: Option<CategoryId>,
    /// Only items without a location.
    pub unplaced: bool,
    /// Case-insensitive substring of the item name.
    pub search: Option<String>,
}

impl ItemListQuery {
    pub fn location(mut self, location_id: LocationId) -> Self {
        self.location_ids = Some(vec![location_id]);
        self
    }
    pub fn locations(mut self, location_ids: Vec<LocationId>) -> Self {
        self.location_ids = Some(location_ids);
        self
    }
    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }
    pub fn unplaced(mut self) -> Self {
        self.unplaced = true;
        self
    }
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Whether `item` satisfies every filter of this query.
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(ids) = &self.location_ids {
            if !item.location_id.is_some_and(|id| ids.contains(&id)) {
                return false;
            }
        }
        if self.category_id.is_some() && item.category_id != self.category_id {
            return false;
        }
        if self.unplaced && item.location_id.is_some() {
            return false;
        }
        match &self.search {
            Some(search) => item
                .name
                .to_lowercase()
                .contains(&search.trim().to_lowercase()),
            None => true,
        }
    }
}

/// Read-only operations for room entities.
pub trait RoomReader {
    /// List all rooms ordered by identity.
    fn list_rooms(&self) -> RepositoryResult<Vec<Room>>;
    /// Retrieve a room by its identifier.
    fn get_room_by_id(&self, id: RoomId) -> RepositoryResult<Option<Room>>;
    /// Retrieve the oldest room with exactly this name.
    fn find_room_by_name(&self, name: &RoomName) -> RepositoryResult<Option<Room>>;
}

/// Write operations for room entities.
pub trait RoomWriter {
    /// Persist a new room.
    fn create_room(&self, room: &NewRoom) -> RepositoryResult<Room>;
    /// Overwrite the attributes of an existing room.
    fn update_room(&self, id: RoomId, room: &NewRoom) -> RepositoryResult<Room>;
    /// Delete a room together with its locations. Items of the removed
    /// locations are detached.
    fn delete_room(&self, id: RoomId) -> RepositoryResult<usize>;
}

/// Read-only operations for location entities.
pub trait LocationReader {
    /// List all locations ordered by identity.
    fn list_locations(&self) -> RepositoryResult<Vec<Location>>;
    /// Retrieve a location by its identifier.
    fn get_location_by_id(&self, id: LocationId) -> RepositoryResult<Option<Location>>;
    /// Direct children of `parent_id`, ordered by identity.
    fn list_sublocations(&self, parent_id: LocationId) -> RepositoryResult<Vec<Location>>;
    /// Locations without a parent, optionally restricted to one room.
    fn list_top_level_locations(&self, room_id: Option<RoomId>)
    -> RepositoryResult<Vec<Location>>;
    /// The oldest top-level location in `room_id` with exactly this name.
    fn find_location_by_name(
        &self,
        name: &LocationName,
        room_id: RoomId,
    ) -> RepositoryResult<Option<Location>>;
}

/// Write operations for location entities.
pub trait LocationWriter {
    /// Validate and persist a new location.
    fn create_location(&self, location: &NewLocation) -> RepositoryResult<Location>;
    /// Validate and apply a full update to an existing location.
    fn update_location(&self, id: LocationId, update: &LocationUpdate)
    -> RepositoryResult<Location>;
    /// Delete a location and all of its sublocations. Returns the number of
    /// locations removed; items are detached, not deleted.
    fn delete_location(&self, id: LocationId) -> RepositoryResult<usize>;
}

/// Read-only operations for category entities.
pub trait CategoryReader {
    /// List all categories ordered by identity.
    fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
    /// Retrieve a category by its identifier.
    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;
    /// Direct children of `parent_id`, ordered by identity.
    fn list_subcategories(&self, parent_id: CategoryId) -> RepositoryResult<Vec<Category>>;
    /// Categories without a parent.
    fn list_top_level_categories(&self) -> RepositoryResult<Vec<Category>>;
    /// The category called `name` directly under `parent_id`.
    fn find_category_by_name(
        &self,
        name: &CategoryName,
        parent_id: Option<CategoryId>,
    ) -> RepositoryResult<Option<Category>>;
}

/// Write operations for category entities.
pub trait CategoryWriter {
    /// Validate and persist a new category.
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category>;
    /// Validate and apply an update to an existing category.
    fn update_category(&self, id: CategoryId, update: &CategoryUpdate)
    -> RepositoryResult<Category>;
    /// Delete a category. Children become top-level and items lose the
    /// category. Rejected when a child would clash with a top-level name.
    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize>;
}

/// Read-only operations for item entities.
pub trait ItemReader {
    /// List items matching the supplied query, ordered by identity.
    fn list_items(&self, query: ItemListQuery) -> RepositoryResult<Vec<Item>>;
    /// Retrieve an item by its identifier.
    fn get_item_by_id(&self, id: ItemId) -> RepositoryResult<Option<Item>>;
}

/// Write operations for item entities.
pub trait ItemWriter {
    /// Persist a new item. Referenced location and category must exist.
    fn create_item(&self, item: &NewItem) -> RepositoryResult<Item>;
    /// Overwrite an existing item.
    fn update_item(&self, id: ItemId, item: &NewItem) -> RepositoryResult<Item>;
    /// Delete an item.
    fn delete_item(&self, id: ItemId) -> RepositoryResult<usize>;
}

/// Read-side [`LocationGraph`]/[`CategoryGraph`] over any repository.
///
/// Lookups go through the public reader traits, so each step may see a
/// newer snapshot than the previous one. Use it for resolution on read
/// paths only; commits validate against their own transaction.
pub struct ReaderGraph<'a, R>(pub &'a R);

impl<R> LocationGraph for ReaderGraph<'_, R>
where
    R: LocationReader + RoomReader,
{
    type Error = RepositoryError;

    fn location(&mut self, id: LocationId) -> RepositoryResult<Option<Location>> {
        self.0.get_location_by_id(id)
    }

    fn room(&mut self, id: RoomId) -> RepositoryResult<Option<Room>> {
        self.0.get_room_by_id(id)
    }
}

impl<R> CategoryGraph for ReaderGraph<'_, R>
where
    R: CategoryReader,
{
    type Error = RepositoryError;

    fn category_parent(
        &mut self,
        id: CategoryId,
    ) -> RepositoryResult<Option<Option<CategoryId>>> {
        Ok(self.0.get_category_by_id(id)?.map(|c| c.parent_id))
    }

    fn category_named(
        &mut self,
        name: &CategoryName,
        parent: Option<CategoryId>,
    ) -> RepositoryResult<Option<CategoryId>> {
        Ok(self.0.find_category_by_name(name, parent)?.map(|c| c.id))
    }
}

