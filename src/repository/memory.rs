//! In-memory entity store.
//!
//! Every table lives in one identity-ordered map behind a single `RwLock`.
//! Writers hold the write half across validation and commit, so two edits of
//! the same hierarchy can never both pass the cycle check against a state
//! the other is about to change. Readers share the read half and always see
//! whole mutations.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::domain::category::{Category, CategoryUpdate, NewCategory};
use crate::domain::item::{Item, NewItem};
use crate::domain::location::{Location, LocationUpdate, NewLocation};
use crate::domain::room::{NewRoom, Room};
use crate::domain::types::{
    CategoryId, CategoryName, ItemId, LocationId, LocationName, RoomId, RoomName,
};
use crate::hierarchy::{
    CategoryCandidate, CategoryGraph, EntityKind, HierarchyError, LocationCandidate,
    LocationGraph, ensure_orphans_fit_top_level, validate_category, validate_location,
};
use crate::repository::{
    CategoryReader, CategoryWriter, ItemListQuery, ItemReader, ItemWriter, LocationReader,
    LocationWriter, RepositoryError, RepositoryResult, RoomReader, RoomWriter,
};

#[derive(Debug, Default)]
struct Tables {
    rooms: BTreeMap<RoomId, Room>,
    locations: BTreeMap<LocationId, Location>,
    categories: BTreeMap<CategoryId, Category>,
    items: BTreeMap<ItemId, Item>,
    last_room: i32,
    last_location: i32,
    last_category: i32,
    last_item: i32,
}

/// Hands out the next identity, never reusing one.
fn next_id(last: &mut i32) -> i32 {
    *last += 1;
    *last
}

impl Tables {
    /// Identities of `roots` and every location below them.
    fn location_subtree(&self, roots: Vec<LocationId>) -> Vec<LocationId> {
        let mut children: HashMap<LocationId, Vec<LocationId>> = HashMap::new();
        for location in self.locations.values() {
            if let Some(parent) = location.parent_id {
                children.entry(parent).or_default().push(location.id);
            }
        }

        let mut seen = HashSet::new();
        let mut all = Vec::new();
        let mut stack = roots;
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            all.push(id);
            if let Some(kids) = children.get(&id) {
                stack.extend(kids);
            }
        }
        all
    }

    fn remove_locations(&mut self, doomed: &[LocationId]) -> usize {
        for item in self.items.values_mut() {
            if item.location_id.is_some_and(|id| doomed.contains(&id)) {
                item.location_id = None;
            }
        }
        doomed
            .iter()
            .filter(|id| self.locations.remove(*id).is_some())
            .count()
    }

    fn check_item_references(&self, item: &NewItem) -> Result<(), HierarchyError> {
        if let Some(id) = item.location_id.filter(|id| !self.locations.contains_key(id)) {
            return Err(HierarchyError::not_found(EntityKind::Location, id));
        }
        if let Some(id) = item.category_id.filter(|id| !self.categories.contains_key(id)) {
            return Err(HierarchyError::not_found(EntityKind::Category, id));
        }
        Ok(())
    }
}

/// Graph view over locked tables.
struct View<'a>(&'a Tables);

impl LocationGraph for View<'_> {
    type Error = RepositoryError;

    fn location(&mut self, id: LocationId) -> RepositoryResult<Option<Location>> {
        Ok(self.0.locations.get(&id).cloned())
    }

    fn room(&mut self, id: RoomId) -> RepositoryResult<Option<Room>> {
        Ok(self.0.rooms.get(&id).cloned())
    }
}

impl CategoryGraph for View<'_> {
    type Error = RepositoryError;

    fn category_parent(
        &mut self,
        id: CategoryId,
    ) -> RepositoryResult<Option<Option<CategoryId>>> {
        Ok(self.0.categories.get(&id).map(|c| c.parent_id))
    }

    fn category_named(
        &mut self,
        name: &CategoryName,
        parent: Option<CategoryId>,
    ) -> RepositoryResult<Option<CategoryId>> {
        Ok(self
            .0
            .categories
            .values()
            .find(|c| &c.name == name && c.parent_id == parent)
            .map(|c| c.id))
    }
}

/// Entity store keeping everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads records verbatim, bypassing validation. Meant for restoring
    /// snapshots and for tests that need to start from a given state.
    pub fn seeded(
        rooms: Vec<Room>,
        locations: Vec<Location>,
        categories: Vec<Category>,
        items: Vec<Item>,
    ) -> Self {
        let mut tables = Tables {
            rooms: rooms.into_iter().map(|r| (r.id, r)).collect(),
            locations: locations.into_iter().map(|l| (l.id, l)).collect(),
            categories: categories.into_iter().map(|c| (c.id, c)).collect(),
            items: items.into_iter().map(|i| (i.id, i)).collect(),
            ..Tables::default()
        };
        tables.last_room = tables.rooms.keys().last().map_or(0, |id| id.get());
        tables.last_location = tables.locations.keys().last().map_or(0, |id| id.get());
        tables.last_category = tables.categories.keys().last().map_or(0, |id| id.get());
        tables.last_item = tables.items.keys().last().map_or(0, |id| id.get());

        Self {
            tables: RwLock::new(tables),
        }
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| RepositoryError::LockPoisoned)
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| RepositoryError::LockPoisoned)
    }
}

impl RoomReader for MemoryRepository {
    fn list_rooms(&self) -> RepositoryResult<Vec<Room>> {
        Ok(self.read()?.rooms.values().cloned().collect())
    }

    fn get_room_by_id(&self, id: RoomId) -> RepositoryResult<Option<Room>> {
        Ok(self.read()?.rooms.get(&id).cloned())
    }

    fn find_room_by_name(&self, name: &RoomName) -> RepositoryResult<Option<Room>> {
        Ok(self
            .read()?
            .rooms
            .values()
            .find(|room| &room.name == name)
            .cloned())
    }
}

impl RoomWriter for MemoryRepository {
    fn create_room(&self, room: &NewRoom) -> RepositoryResult<Room> {
        let mut tables = self.write()?;
        let id = RoomId::new(next_id(&mut tables.last_room))?;
        let room = room.clone().into_room(id);
        tables.rooms.insert(id, room.clone());
        Ok(room)
    }

    fn update_room(&self, id: RoomId, room: &NewRoom) -> RepositoryResult<Room> {
        let mut tables = self.write()?;
        let stored = tables
            .rooms
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Room, id))?;
        *stored = room.clone().into_room(id);
        Ok(stored.clone())
    }

    fn delete_room(&self, id: RoomId) -> RepositoryResult<usize> {
        let mut tables = self.write()?;
        if tables.rooms.remove(&id).is_none() {
            return Ok(0);
        }

        let top_level = tables
            .locations
            .values()
            .filter(|l| l.room_id == Some(id))
            .map(|l| l.id)
            .collect();
        let doomed = tables.location_subtree(top_level);
        tables.remove_locations(&doomed);
        Ok(1)
    }
}

impl LocationReader for MemoryRepository {
    fn list_locations(&self) -> RepositoryResult<Vec<Location>> {
        Ok(self.read()?.locations.values().cloned().collect())
    }

    fn get_location_by_id(&self, id: LocationId) -> RepositoryResult<Option<Location>> {
        Ok(self.read()?.locations.get(&id).cloned())
    }

    fn list_sublocations(&self, parent_id: LocationId) -> RepositoryResult<Vec<Location>> {
        Ok(self
            .read()?
            .locations
            .values()
            .filter(|l| l.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    fn list_top_level_locations(
        &self,
        room_id: Option<RoomId>,
    ) -> RepositoryResult<Vec<Location>> {
        Ok(self
            .read()?
            .locations
            .values()
            .filter(|l| l.is_top_level())
            .filter(|l| room_id.is_none() || l.room_id == room_id)
            .cloned()
            .collect())
    }

    fn find_location_by_name(
        &self,
        name: &LocationName,
        room_id: RoomId,
    ) -> RepositoryResult<Option<Location>> {
        Ok(self
            .read()?
            .locations
            .values()
            .find(|l| l.is_top_level() && l.room_id == Some(room_id) && &l.name == name)
            .cloned())
    }
}

impl LocationWriter for MemoryRepository {
    fn create_location(&self, location: &NewLocation) -> RepositoryResult<Location> {
        let mut tables = self.write()?;

        if let Some(id) = location.id.filter(|id| tables.locations.contains_key(id)) {
            return Err(RepositoryError::Conflict {
                entity: EntityKind::Location,
                id: id.get(),
            });
        }

        validate_location(&LocationCandidate::from(location), &mut View(&tables))?;

        let id = match location.id {
            Some(id) => {
                tables.last_location = tables.last_location.max(id.get());
                id
            }
            None => LocationId::new(next_id(&mut tables.last_location))?,
        };
        let created = location.clone().into_location(id);
        tables.locations.insert(id, created.clone());
        Ok(created)
    }

    fn update_location(
        &self,
        id: LocationId,
        update: &LocationUpdate,
    ) -> RepositoryResult<Location> {
        let mut tables = self.write()?;

        let current = tables
            .locations
            .get(&id)
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Location, id))?;
        let updated = current.updated(update);

        validate_location(&LocationCandidate::from(&updated), &mut View(&tables))?;

        tables.locations.insert(id, updated.clone());
        Ok(updated)
    }

    fn delete_location(&self, id: LocationId) -> RepositoryResult<usize> {
        let mut tables = self.write()?;
        if !tables.locations.contains_key(&id) {
            return Ok(0);
        }
        let doomed = tables.location_subtree(vec![id]);
        Ok(tables.remove_locations(&doomed))
    }
}

impl CategoryReader for MemoryRepository {
    fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        Ok(self.read()?.categories.values().cloned().collect())
    }

    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        Ok(self.read()?.categories.get(&id).cloned())
    }

    fn list_subcategories(&self, parent_id: CategoryId) -> RepositoryResult<Vec<Category>> {
        Ok(self
            .read()?
            .categories
            .values()
            .filter(|c| c.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    fn list_top_level_categories(&self) -> RepositoryResult<Vec<Category>> {
        Ok(self
            .read()?
            .categories
            .values()
            .filter(|c| c.parent_id.is_none())
            .cloned()
            .collect())
    }

    fn find_category_by_name(
        &self,
        name: &CategoryName,
        parent_id: Option<CategoryId>,
    ) -> RepositoryResult<Option<Category>> {
        Ok(self
            .read()?
            .categories
            .values()
            .find(|c| &c.name == name && c.parent_id == parent_id)
            .cloned())
    }
}

impl CategoryWriter for MemoryRepository {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category> {
        let mut tables = self.write()?;

        if let Some(id) = category.id.filter(|id| tables.categories.contains_key(id)) {
            return Err(RepositoryError::Conflict {
                entity: EntityKind::Category,
                id: id.get(),
            });
        }

        let candidate = CategoryCandidate {
            id: category.id,
            name: &category.name,
            parent_id: category.parent_id,
        };
        validate_category(&candidate, &mut View(&tables))?;

        let id = match category.id {
            Some(id) => {
                tables.last_category = tables.last_category.max(id.get());
                id
            }
            None => CategoryId::new(next_id(&mut tables.last_category))?,
        };
        let created = category.clone().into_category(id);
        tables.categories.insert(id, created.clone());
        Ok(created)
    }

    fn update_category(
        &self,
        id: CategoryId,
        update: &CategoryUpdate,
    ) -> RepositoryResult<Category> {
        let mut tables = self.write()?;

        if !tables.categories.contains_key(&id) {
            return Err(RepositoryError::not_found(EntityKind::Category, id));
        }

        let candidate = CategoryCandidate {
            id: Some(id),
            name: &update.name,
            parent_id: update.parent_id,
        };
        validate_category(&candidate, &mut View(&tables))?;

        let stored = tables
            .categories
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Category, id))?;
        stored.name = update.name.clone();
        stored.description = update.description.clone();
        stored.parent_id = update.parent_id;
        stored.updated_at = Utc::now().naive_utc();
        Ok(stored.clone())
    }

    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize> {
        let mut tables = self.write()?;
        if !tables.categories.contains_key(&id) {
            return Ok(0);
        }

        let children: Vec<Category> = tables
            .categories
            .values()
            .filter(|c| c.parent_id == Some(id))
            .cloned()
            .collect();
        ensure_orphans_fit_top_level(id, &children, &mut View(&tables))?;
        tables.categories.remove(&id);

        let now = Utc::now().naive_utc();
        for child in tables
            .categories
            .values_mut()
            .filter(|c| c.parent_id == Some(id))
        {
            child.parent_id = None;
            child.updated_at = now;
        }
        for item in tables
            .items
            .values_mut()
            .filter(|i| i.category_id == Some(id))
        {
            item.category_id = None;
        }
        Ok(1)
    }
}

impl ItemReader for MemoryRepository {
    fn list_items(&self, query: ItemListQuery) -> RepositoryResult<Vec<Item>> {
        Ok(self
            .read()?
            .items
            .values()
            .filter(|item| query.matches(item))
            .cloned()
            .collect())
    }

    fn get_item_by_id(&self, id: ItemId) -> RepositoryResult<Option<Item>> {
        Ok(self.read()?.items.get(&id).cloned())
    }
}

impl ItemWriter for MemoryRepository {
    fn create_item(&self, item: &NewItem) -> RepositoryResult<Item> {
        let mut tables = self.write()?;
        tables.check_item_references(item)?;
        let id = ItemId::new(next_id(&mut tables.last_item))?;
        let created = item.clone().into_item(id);
        tables.items.insert(id, created.clone());
        Ok(created)
    }

    fn update_item(&self, id: ItemId, item: &NewItem) -> RepositoryResult<Item> {
        let mut tables = self.write()?;
        tables.check_item_references(item)?;
        let stored = tables
            .items
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Item, id))?;
        *stored = item.clone().into_item(id);
        Ok(stored.clone())
    }

    fn delete_item(&self, id: ItemId) -> RepositoryResult<usize> {
        let mut tables = self.write()?;
        Ok(usize::from(tables.items.remove(&id).is_some()))
    }
}
