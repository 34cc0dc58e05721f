//! Effective-room resolution for nested locations.

use std::collections::HashSet;

use crate::domain::location::Location;
use crate::domain::room::Room;
use crate::domain::types::RoomId;

use super::{EntityKind, HierarchyError, LocationGraph};

/// Identity of the room `location` effectively lives in.
///
/// Follows parent links to the first location without a parent and returns
/// its direct room; rooms set on sublocations are ignored. A corrupted graph
/// fails with [`HierarchyError::Cycle`] instead of looping, and a dangling
/// parent reference with [`HierarchyError::NotFound`].
pub fn effective_room_id<G>(location: &Location, graph: &mut G) -> Result<Option<RoomId>, G::Error>
where
    G: LocationGraph,
{
    let mut visited = HashSet::from([location.id]);
    let mut parent_id = location.parent_id;
    let mut room_id = location.room_id;

    while let Some(id) = parent_id {
        if !visited.insert(id) {
            return Err(HierarchyError::cycle(EntityKind::Location, id).into());
        }
        let parent = graph
            .location(id)?
            .ok_or_else(|| HierarchyError::not_found(EntityKind::Location, id))?;
        parent_id = parent.parent_id;
        room_id = parent.room_id;
    }

    Ok(room_id)
}

/// The room `location` effectively lives in, if any.
pub fn resolve_room<G>(location: &Location, graph: &mut G) -> Result<Option<Room>, G::Error>
where
    G: LocationGraph,
{
    match effective_room_id(location, graph)? {
        Some(room_id) => graph.room(room_id),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::tree::SnapshotGraph;
    use crate::test_support::{location, room};

    #[test]
    fn sublocation_inherits_room_through_every_level() {
        let rooms = [room(1, "Kitchen"), room(2, "Garage")];
        let locations = [
            location(1, "Pantry Shelf", Some(1), None),
            location(2, "Box A", None, Some(1)),
            location(3, "Tin", None, Some(2)),
            location(4, "Workbench", Some(2), None),
        ];
        let mut graph = SnapshotGraph::new(&locations, &rooms);

        for location in &locations[..3] {
            let resolved = resolve_room(location, &mut graph).unwrap().unwrap();
            assert_eq!(resolved.name, "Kitchen");
        }
        let garage = resolve_room(&locations[3], &mut graph).unwrap().unwrap();
        assert_eq!(garage.name, "Garage");
    }

    #[test]
    fn child_matches_parent_resolution() {
        let rooms = [room(1, "Kitchen")];
        let locations = [
            location(1, "Shelf", Some(1), None),
            location(2, "Box", None, Some(1)),
        ];
        let mut graph = SnapshotGraph::new(&locations, &rooms);
        assert_eq!(
            effective_room_id(&locations[1], &mut graph).unwrap(),
            effective_room_id(&locations[0], &mut graph).unwrap()
        );
    }

    #[test]
    fn detached_root_resolves_to_none() {
        let locations = [location(1, "Loose", None, None)];
        let mut graph = SnapshotGraph::new(&locations, &[]);
        assert_eq!(resolve_room(&locations[0], &mut graph).unwrap(), None);
    }

    #[test]
    fn corrupted_cycle_fails_loudly() {
        let locations = [
            location(1, "A", None, Some(2)),
            location(2, "B", None, Some(1)),
        ];
        let mut graph = SnapshotGraph::new(&locations, &[]);
        assert_eq!(
            resolve_room(&locations[0], &mut graph),
            Err(HierarchyError::cycle(EntityKind::Location, 1))
        );
    }

    #[test]
    fn deep_chain_resolves_without_recursion() {
        let rooms = [room(1, "Attic")];
        let mut locations = vec![location(1, "Level 1", Some(1), None)];
        for id in 2..=50_000 {
            locations.push(location(id, "Level", None, Some(id - 1)));
        }
        let mut graph = SnapshotGraph::new(&locations, &rooms);
        let deepest = locations.last().unwrap().clone();
        assert_eq!(
            effective_room_id(&deepest, &mut graph).unwrap(),
            Some(RoomId::new(1).unwrap())
        );
    }
}
