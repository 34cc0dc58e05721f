use crate::domain::location::Location;
use crate::domain::room::Room;
use crate::domain::types::LocationId;
use crate::forms::locations::{AddLocationFormPayload, UpdateLocationFormPayload};
use crate::hierarchy::{
    LocationTreeNode, build_location_forest, build_location_tree, resolve_room,
};
use crate::repository::{LocationReader, LocationWriter, ReaderGraph, RoomReader};

use super::{ServiceError, ServiceResult, store_failure};

/// The whole location forest, rooted at top-level locations.
pub fn location_forest<R>(repo: &R) -> ServiceResult<Vec<LocationTreeNode>>
where
    R: LocationReader + RoomReader,
{
    let locations = repo
        .list_locations()
        .map_err(|e| store_failure("list locations", e))?;
    let rooms = repo.list_rooms().map_err(|e| store_failure("list rooms", e))?;

    build_location_forest(&locations, &rooms).map_err(|e| {
        log::error!("Failed to build location forest: {e}");
        ServiceError::from(e)
    })
}

fn get_location<R>(location_id: i32, repo: &R) -> ServiceResult<Location>
where
    R: LocationReader,
{
    let location_id = LocationId::new(location_id).map_err(|_| ServiceError::NotFound)?;

    match repo.get_location_by_id(location_id) {
        Ok(Some(location)) => Ok(location),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => Err(store_failure("get location", e)),
    }
}

/// A single location with its effective room and nested sublocations.
pub fn show_location<R>(location_id: i32, repo: &R) -> ServiceResult<LocationTreeNode>
where
    R: LocationReader + RoomReader,
{
    let location = get_location(location_id, repo)?;
    let locations = repo
        .list_locations()
        .map_err(|e| store_failure("list locations", e))?;
    let rooms = repo.list_rooms().map_err(|e| store_failure("list rooms", e))?;

    let mut tree = build_location_tree(&[location.id], &locations, &rooms).map_err(|e| {
        log::error!("Failed to build tree for location {}: {e}", location.id);
        ServiceError::from(e)
    })?;

    tree.pop().ok_or(ServiceError::NotFound)
}

/// The room a location effectively lives in.
pub fn effective_room<R>(location_id: i32, repo: &R) -> ServiceResult<Option<Room>>
where
    R: LocationReader + RoomReader,
{
    let location = get_location(location_id, repo)?;
    resolve_room(&location, &mut ReaderGraph(repo))
        .map_err(|e| store_failure("resolve effective room", e))
}

pub fn add_location<R>(payload: AddLocationFormPayload, repo: &R) -> ServiceResult<Location>
where
    R: LocationWriter,
{
    let location = repo
        .create_location(&payload.location)
        .map_err(|e| store_failure("create location", e))?;
    log::info!("Created location {} '{}'", location.id, location.name);
    Ok(location)
}

/// Applies a full update, including moves between rooms and parents.
pub fn update_location<R>(payload: UpdateLocationFormPayload, repo: &R) -> ServiceResult<Location>
where
    R: LocationWriter,
{
    repo.update_location(payload.location_id, &payload.update)
        .map_err(|e| store_failure("update location", e))
}

/// Deletes a location subtree and returns how many locations were removed.
pub fn delete_location<R>(location_id: i32, repo: &R) -> ServiceResult<usize>
where
    R: LocationWriter,
{
    let location_id = LocationId::new(location_id).map_err(|_| ServiceError::NotFound)?;

    match repo.delete_location(location_id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(removed) => {
            log::info!("Deleted location {location_id} and {} below it", removed - 1);
            Ok(removed)
        }
        Err(e) => Err(store_failure("delete location", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::location::{LocationUpdate, NewLocation};
    use crate::domain::room::NewRoom;
    use crate::domain::types::{LocationName, RoomId, RoomName};
    use crate::hierarchy::{ConstraintViolation, EntityKind, HierarchyError};
    use crate::repository::{MemoryRepository, RoomWriter};

    fn name(value: &str) -> LocationName {
        LocationName::new(value).unwrap()
    }

    fn add(repo: &MemoryRepository, location: NewLocation) -> ServiceResult<Location> {
        add_location(AddLocationFormPayload { location }, repo)
    }

    fn kitchen(repo: &MemoryRepository) -> RoomId {
        repo.create_room(&NewRoom::named(RoomName::new("Kitchen").unwrap()))
            .unwrap()
            .id
    }

    #[test]
    fn pantry_scenario_resolves_and_renders() {
        let repo = MemoryRepository::new();
        let kitchen = kitchen(&repo);
        let shelf = add(&repo, NewLocation::in_room(name("Pantry Shelf"), kitchen)).unwrap();
        let box_a = add(&repo, NewLocation::under(name("Box A"), shelf.id)).unwrap();

        let room = effective_room(box_a.id.get(), &repo).unwrap().unwrap();
        assert_eq!(room.name, "Kitchen");

        let forest = location_forest(&repo).unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].name, "Pantry Shelf");
        assert_eq!(forest[0].children[0].name, "Box A");
        assert_eq!(
            forest[0].children[0]
                .effective_room
                .as_ref()
                .map(|r| r.name.as_str()),
            Some("Kitchen")
        );
    }

    #[test]
    fn show_location_returns_its_subtree_only() {
        let repo = MemoryRepository::new();
        let kitchen = kitchen(&repo);
        let shelf = add(&repo, NewLocation::in_room(name("Shelf"), kitchen)).unwrap();
        let box_a = add(&repo, NewLocation::under(name("Box A"), shelf.id)).unwrap();
        add(&repo, NewLocation::under(name("Tin"), box_a.id)).unwrap();
        add(&repo, NewLocation::in_room(name("Drawer"), kitchen)).unwrap();

        let node = show_location(box_a.id.get(), &repo).unwrap();
        assert_eq!(node.size(), 2);
        assert_eq!(node.effective_room.as_ref().unwrap().id, kitchen);
    }

    #[test]
    fn rule_violations_reach_the_caller_intact() {
        let repo = MemoryRepository::new();
        let kitchen = kitchen(&repo);
        let shelf = add(&repo, NewLocation::in_room(name("Shelf"), kitchen)).unwrap();

        let err = add(&repo, NewLocation::default()).unwrap_err();
        assert_eq!(
            err,
            ServiceError::Hierarchy(ConstraintViolation::LocationRequiresRoom.into())
        );

        let both = NewLocation {
            room_id: Some(kitchen),
            ..NewLocation::under(name("Box"), shelf.id)
        };
        assert_eq!(
            add(&repo, both).unwrap_err(),
            ServiceError::Hierarchy(ConstraintViolation::SublocationHasRoom.into())
        );
    }

    #[test]
    fn moving_under_a_descendant_is_a_cycle() {
        let repo = MemoryRepository::new();
        let kitchen = kitchen(&repo);
        let a = add(&repo, NewLocation::in_room(name("A"), kitchen)).unwrap();
        let b = add(&repo, NewLocation::under(name("B"), a.id)).unwrap();
        let c = add(&repo, NewLocation::under(name("C"), b.id)).unwrap();

        let mut update = LocationUpdate::from(&a);
        update.room_id = None;
        update.parent_id = Some(c.id);
        let err = update_location(
            UpdateLocationFormPayload {
                location_id: a.id,
                update,
            },
            &repo,
        )
        .unwrap_err();

        assert_eq!(
            err,
            ServiceError::Hierarchy(HierarchyError::cycle(EntityKind::Location, a.id))
        );
    }

    #[test]
    fn delete_reports_removed_subtree_size() {
        let repo = MemoryRepository::new();
        let kitchen = kitchen(&repo);
        let shelf = add(&repo, NewLocation::in_room(name("Shelf"), kitchen)).unwrap();
        add(&repo, NewLocation::under(name("Box"), shelf.id)).unwrap();

        assert_eq!(delete_location(shelf.id.get(), &repo).unwrap(), 2);
        assert_eq!(
            delete_location(shelf.id.get(), &repo).unwrap_err(),
            ServiceError::NotFound
        );
    }
}
