//! Placement rules for locations.

use crate::domain::location::{Location, LocationUpdate, NewLocation};
use crate::domain::types::{LocationId, RoomId};

use super::{ConstraintViolation, EntityKind, HierarchyError, LocationGraph, ensure_acyclic};

/// The placement-relevant part of a location about to be committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationCandidate {
    /// Own identity, when one exists or has been reserved by the caller.
    pub id: Option<LocationId>,
    pub room_id: Option<RoomId>,
    pub parent_id: Option<LocationId>,
}

impl From<&NewLocation> for LocationCandidate {
    fn from(location: &NewLocation) -> Self {
        Self {
            id: location.id,
            room_id: location.room_id,
            parent_id: location.parent_id,
        }
    }
}

impl From<&Location> for LocationCandidate {
    fn from(location: &Location) -> Self {
        Self {
            id: Some(location.id),
            room_id: location.room_id,
            parent_id: location.parent_id,
        }
    }
}

impl LocationCandidate {
    /// Candidate for applying `update` to the location `id`.
    pub fn for_update(id: LocationId, update: &LocationUpdate) -> Self {
        Self {
            id: Some(id),
            room_id: update.room_id,
            parent_id: update.parent_id,
        }
    }
}

/// Decides whether `candidate` may be committed.
///
/// Rules run in this order: no self-parenting, exactly one of room/parent,
/// the room exists, and the parent chain reaches a root without passing
/// through the candidate itself.
pub fn validate_location<G>(candidate: &LocationCandidate, graph: &mut G) -> Result<(), G::Error>
where
    G: LocationGraph,
{
    if let Some(id) = candidate.id.filter(|id| candidate.parent_id == Some(*id)) {
        return Err(HierarchyError::cycle(EntityKind::Location, id).into());
    }

    match (candidate.parent_id, candidate.room_id) {
        (None, None) => {
            return Err(HierarchyError::from(ConstraintViolation::LocationRequiresRoom).into());
        }
        (Some(_), Some(_)) => {
            return Err(HierarchyError::from(ConstraintViolation::SublocationHasRoom).into());
        }
        (None, Some(room_id)) => {
            if graph.room(room_id)?.is_none() {
                return Err(HierarchyError::not_found(EntityKind::Room, room_id).into());
            }
        }
        (Some(_), None) => {}
    }

    ensure_acyclic(
        EntityKind::Location,
        candidate.id,
        candidate.parent_id,
        |id| Ok(graph.location(id)?.map(|location| location.parent_id)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::tree::SnapshotGraph;
    use crate::test_support::{location, room};

    fn candidate(id: Option<i32>, room_id: Option<i32>, parent_id: Option<i32>) -> LocationCandidate {
        LocationCandidate {
            id: id.map(|id| LocationId::new(id).unwrap()),
            room_id: room_id.map(|id| RoomId::new(id).unwrap()),
            parent_id: parent_id.map(|id| LocationId::new(id).unwrap()),
        }
    }

    fn check(
        candidate: &LocationCandidate,
        locations: &[Location],
    ) -> Result<(), HierarchyError> {
        let rooms = [room(1, "Kitchen")];
        let mut graph = SnapshotGraph::new(locations, &rooms);
        validate_location(candidate, &mut graph)
    }

    #[test]
    fn accepts_top_level_with_room() {
        assert!(check(&candidate(None, Some(1), None), &[]).is_ok());
    }

    #[test]
    fn rejects_top_level_without_room() {
        assert_eq!(
            check(&candidate(None, None, None), &[]),
            Err(ConstraintViolation::LocationRequiresRoom.into())
        );
    }

    #[test]
    fn rejects_sublocation_with_room() {
        let shelf = location(1, "Pantry Shelf", Some(1), None);
        assert_eq!(
            check(&candidate(None, Some(1), Some(1)), &[shelf]),
            Err(ConstraintViolation::SublocationHasRoom.into())
        );
    }

    #[test]
    fn rejects_missing_room() {
        assert_eq!(
            check(&candidate(None, Some(5), None), &[]),
            Err(HierarchyError::not_found(EntityKind::Room, 5))
        );
    }

    #[test]
    fn rejects_missing_parent() {
        assert_eq!(
            check(&candidate(None, None, Some(8)), &[]),
            Err(HierarchyError::not_found(EntityKind::Location, 8))
        );
    }

    #[test]
    fn self_parenting_is_a_cycle_even_before_persisting() {
        // Identity 3 is reserved but not stored yet.
        assert_eq!(
            check(&candidate(Some(3), None, Some(3)), &[]),
            Err(HierarchyError::cycle(EntityKind::Location, 3))
        );
    }

    #[test]
    fn self_parenting_wins_over_room_rule() {
        let shelf = location(1, "Pantry Shelf", Some(1), None);
        assert_eq!(
            check(&candidate(Some(1), Some(1), Some(1)), &[shelf]),
            Err(HierarchyError::cycle(EntityKind::Location, 1))
        );
    }

    #[test]
    fn rejects_parenting_to_descendant() {
        let locations = [
            location(1, "Shelf", Some(1), None),
            location(2, "Box", None, Some(1)),
            location(3, "Tin", None, Some(2)),
        ];
        assert_eq!(
            check(&candidate(Some(1), None, Some(3)), &locations),
            Err(HierarchyError::cycle(EntityKind::Location, 1))
        );
    }

    #[test]
    fn accepts_moving_within_acyclic_forest() {
        let locations = [
            location(1, "Shelf", Some(1), None),
            location(2, "Cupboard", Some(1), None),
            location(3, "Box", None, Some(1)),
        ];
        assert!(check(&candidate(Some(3), None, Some(2)), &locations).is_ok());
    }

    #[test]
    fn accepts_arbitrarily_deep_chains() {
        let mut locations = vec![location(1, "Level 1", Some(1), None)];
        for id in 2..=5_000 {
            locations.push(location(id, "Level", None, Some(id - 1)));
        }
        assert!(check(&candidate(None, None, Some(5_000)), &locations).is_ok());
    }
}
