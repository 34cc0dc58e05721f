//! Structural rules for the self-referential location and category graphs.
//!
//! Everything here is pure: graph access goes through [`LocationGraph`] and
//! [`CategoryGraph`], which the entity stores implement over whatever view
//! of the data they hold (a transaction, a locked map, a loaded snapshot).
//! Stores call the validators from inside their commit path, so a mutation
//! that fails here is never persisted.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::hash::Hash;

use serde::Serialize;
use thiserror::Error;

use crate::domain::location::Location;
use crate::domain::room::Room;
use crate::domain::types::{CategoryId, CategoryName, LocationId, RoomId};

pub mod category;
pub mod location;
pub mod resolver;
pub mod tree;

pub use category::{
    CategoryCandidate, ensure_orphans_fit_top_level, ensure_unique_category_name, validate_category,
};
pub use location::{LocationCandidate, validate_location};
pub use resolver::{effective_room_id, resolve_room};
pub use tree::{
    CategoryTreeNode, LocationTreeNode, NestedNode, Outline, RoomRef, build_category_forest,
    build_location_forest, build_location_tree, serialize_outline,
};

/// Entity kinds that take part in a hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Room,
    Location,
    Category,
    Item,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Room => "room",
            Self::Location => "location",
            Self::Category => "category",
            Self::Item => "item",
        };
        f.write_str(name)
    }
}

/// Structural rules other than acyclicity.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// A location without a parent carries no room.
    #[error("top-level location must have a room")]
    LocationRequiresRoom,
    /// A location with a parent also carries a direct room.
    #[error("sublocation cannot have a room directly")]
    SublocationHasRoom,
    /// Another category with the same name already hangs off the same parent.
    #[error("category '{name}' already exists under {}", parent_label(.parent))]
    DuplicateCategoryName {
        name: String,
        parent: Option<CategoryId>,
    },
}

fn parent_label(parent: &Option<CategoryId>) -> String {
    match parent {
        Some(id) => format!("category {id}"),
        None => "the top level".to_string(),
    }
}

/// Rejection produced by the hierarchy validators and resolvers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    /// Following parent links would revisit `node`.
    #[error("{entity} hierarchy would contain a cycle through {entity} {node}")]
    Cycle { entity: EntityKind, node: i32 },
    #[error(transparent)]
    Constraint(#[from] ConstraintViolation),
    /// A referenced parent, room or category is missing from the store.
    #[error("{entity} {id} does not exist")]
    NotFound { entity: EntityKind, id: i32 },
}

impl HierarchyError {
    pub fn cycle(entity: EntityKind, node: impl Into<i32>) -> Self {
        Self::Cycle {
            entity,
            node: node.into(),
        }
    }

    pub fn not_found(entity: EntityKind, id: impl Into<i32>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Read access to locations and rooms needed by validation and resolution.
pub trait LocationGraph {
    type Error: From<HierarchyError>;

    /// Fetch a location by identity.
    fn location(&mut self, id: LocationId) -> Result<Option<Location>, Self::Error>;
    /// Fetch a room by identity.
    fn room(&mut self, id: RoomId) -> Result<Option<Room>, Self::Error>;
}

/// Read access to categories needed by the category guard.
pub trait CategoryGraph {
    type Error: From<HierarchyError>;

    /// Parent of `id`: `None` when the category does not exist,
    /// `Some(None)` for a top-level category.
    fn category_parent(
        &mut self,
        id: CategoryId,
    ) -> Result<Option<Option<CategoryId>>, Self::Error>;
    /// Identity of the category called `name` directly under `parent`.
    fn category_named(
        &mut self,
        name: &CategoryName,
        parent: Option<CategoryId>,
    ) -> Result<Option<CategoryId>, Self::Error>;
}

/// Walks parent links from `start` until a root is reached.
///
/// The visited set is seeded with `own_id`, so reaching the entity itself
/// through its prospective ancestors is reported as a cycle. `parent_of`
/// returns `None` for a missing node and `Some(parent)` otherwise.
pub(crate) fn ensure_acyclic<I, E, F>(
    entity: EntityKind,
    own_id: Option<I>,
    start: Option<I>,
    mut parent_of: F,
) -> Result<(), E>
where
    I: Copy + Eq + Hash + Into<i32>,
    E: From<HierarchyError>,
    F: FnMut(I) -> Result<Option<Option<I>>, E>,
{
    let mut visited: HashSet<I> = own_id.into_iter().collect();
    let mut current = start;

    while let Some(id) = current {
        if !visited.insert(id) {
            return Err(HierarchyError::cycle(entity, id).into());
        }
        current = match parent_of(id)? {
            Some(parent) => parent,
            None => return Err(HierarchyError::not_found(entity, id).into()),
        };
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn walk(
        links: &HashMap<i32, Option<i32>>,
        own: Option<i32>,
        start: Option<i32>,
    ) -> Result<(), HierarchyError> {
        ensure_acyclic(EntityKind::Location, own, start, |id| {
            Ok::<_, HierarchyError>(links.get(&id).copied())
        })
    }

    #[test]
    fn walk_succeeds_at_root() {
        let links = HashMap::from([(1, None), (2, Some(1)), (3, Some(2))]);
        assert!(walk(&links, Some(4), Some(3)).is_ok());
        assert!(walk(&links, None, None).is_ok());
    }

    #[test]
    fn walk_reports_revisit_of_own_identity() {
        let links = HashMap::from([(1, Some(3)), (2, Some(1)), (3, None)]);
        // Making 3 a child of 2 closes 3 -> 2 -> 1 -> 3.
        assert_eq!(
            walk(&links, Some(3), Some(2)),
            Err(HierarchyError::cycle(EntityKind::Location, 3))
        );
    }

    #[test]
    fn walk_reports_preexisting_loop() {
        let links = HashMap::from([(1, Some(2)), (2, Some(1))]);
        assert!(matches!(
            walk(&links, None, Some(1)),
            Err(HierarchyError::Cycle { .. })
        ));
    }

    #[test]
    fn walk_reports_missing_parent() {
        let links = HashMap::from([(1, Some(9))]);
        assert_eq!(
            walk(&links, None, Some(1)),
            Err(HierarchyError::not_found(EntityKind::Location, 9))
        );
    }

    #[test]
    fn walk_has_no_depth_limit() {
        let depth = 20_000;
        let links: HashMap<i32, Option<i32>> = (1..=depth)
            .map(|id| (id, if id == 1 { None } else { Some(id - 1) }))
            .collect();
        assert!(walk(&links, Some(depth + 1), Some(depth)).is_ok());
    }

    #[test]
    fn duplicate_name_message_names_parent() {
        let top = ConstraintViolation::DuplicateCategoryName {
            name: "Electronics".into(),
            parent: None,
        };
        assert_eq!(
            top.to_string(),
            "category 'Electronics' already exists under the top level"
        );
    }
}
