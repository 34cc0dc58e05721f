//! Nested views of the location and category forests.
//!
//! Building never recurses: a pre-order pass with an explicit stack fixes
//! the visiting order, then nodes are assembled bottom-up. Siblings keep
//! insertion order, i.e. ascending identity.
//!
//! Nodes are torn down and serialized with explicit stacks as well. A forest
//! is rendered through [`Outline`] as a flat pre-order listing where every
//! row names its parent and depth.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::Serialize;
use serde::ser::{SerializeSeq, Serializer};

use crate::domain::category::Category;
use crate::domain::location::Location;
use crate::domain::room::Room;
use crate::domain::types::{
    CategoryId, CategoryName, Description, LocationId, LocationName, RoomId, RoomName,
};

use super::{EntityKind, HierarchyError, LocationGraph, resolver};

/// Minimal room reference embedded in tree nodes.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoomRef {
    pub id: RoomId,
    pub name: RoomName,
}

impl From<&Room> for RoomRef {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id,
            name: room.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationTreeNode {
    pub id: LocationId,
    pub name: LocationName,
    pub effective_room: Option<RoomRef>,
    pub description: Option<Description>,
    pub children: Vec<LocationTreeNode>,
}

impl LocationTreeNode {
    /// Number of nodes in this subtree, including itself.
    pub fn size(&self) -> usize {
        let mut total = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            total += 1;
            stack.extend(node.children.iter());
        }
        total
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTreeNode {
    pub id: CategoryId,
    pub name: CategoryName,
    pub description: Option<Description>,
    pub children: Vec<CategoryTreeNode>,
}

/// A node owning its children.
pub trait NestedNode: Sized {
    fn node_id(&self) -> i32;
    fn children(&self) -> &[Self];
    fn children_mut(&mut self) -> &mut Vec<Self>;
    /// Own fields of the node, without `id` and children.
    fn fields(&self) -> impl Serialize + '_;
}

/// Empties `node` without recursing into its descendants.
pub fn drop_nested<N: NestedNode>(node: &mut N) {
    let mut stack = std::mem::take(node.children_mut());
    while let Some(mut child) = stack.pop() {
        stack.append(child.children_mut());
    }
}

#[derive(Serialize)]
struct LocationFields<'a> {
    name: &'a LocationName,
    effective_room: Option<&'a RoomRef>,
    description: Option<&'a Description>,
}

impl NestedNode for LocationTreeNode {
    fn node_id(&self) -> i32 {
        self.id.get()
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }

    fn fields(&self) -> impl Serialize + '_ {
        LocationFields {
            name: &self.name,
            effective_room: self.effective_room.as_ref(),
            description: self.description.as_ref(),
        }
    }
}

impl Drop for LocationTreeNode {
    fn drop(&mut self) {
        drop_nested(self);
    }
}

#[derive(Serialize)]
struct CategoryFields<'a> {
    name: &'a CategoryName,
    description: Option<&'a Description>,
}

impl NestedNode for CategoryTreeNode {
    fn node_id(&self) -> i32 {
        self.id.get()
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }

    fn fields(&self) -> impl Serialize + '_ {
        CategoryFields {
            name: &self.name,
            description: self.description.as_ref(),
        }
    }
}

impl Drop for CategoryTreeNode {
    fn drop(&mut self) {
        drop_nested(self);
    }
}

#[derive(Serialize)]
struct OutlineRow<F> {
    id: i32,
    /// Enclosing node within the outline; `None` for its roots.
    parent_id: Option<i32>,
    depth: usize,
    #[serde(flatten)]
    fields: F,
}

/// Serializes a forest as a flat pre-order sequence of rows.
#[derive(Debug, Clone, Copy)]
pub struct Outline<'a, N>(pub &'a [N]);

impl<N: NestedNode> Serialize for Outline<'_, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_outline(self.0, serializer)
    }
}

/// [`Outline`] as a `serialize_with` helper for nested fields.
pub fn serialize_outline<N, S>(roots: &[N], serializer: S) -> Result<S::Ok, S::Error>
where
    N: NestedNode,
    S: Serializer,
{
    let mut total = 0;
    let mut stack: Vec<&N> = roots.iter().collect();
    while let Some(node) = stack.pop() {
        total += 1;
        stack.extend(node.children());
    }

    let mut seq = serializer.serialize_seq(Some(total))?;
    let mut stack: Vec<(&N, Option<i32>, usize)> =
        roots.iter().rev().map(|node| (node, None, 0)).collect();
    while let Some((node, parent_id, depth)) = stack.pop() {
        seq.serialize_element(&OutlineRow {
            id: node.node_id(),
            parent_id,
            depth,
            fields: node.fields(),
        })?;
        let id = Some(node.node_id());
        stack.extend(
            node.children()
                .iter()
                .rev()
                .map(|child| (child, id, depth + 1)),
        );
    }
    seq.end()
}

/// Entries that can be arranged into a forest.
trait TreeEntry {
    type Id: Copy + Eq + Hash + Ord + Into<i32>;
    const KIND: EntityKind;

    fn entry_id(&self) -> Self::Id;
    fn entry_parent(&self) -> Option<Self::Id>;
}

impl TreeEntry for Location {
    type Id = LocationId;
    const KIND: EntityKind = EntityKind::Location;

    fn entry_id(&self) -> LocationId {
        self.id
    }

    fn entry_parent(&self) -> Option<LocationId> {
        self.parent_id
    }
}

impl TreeEntry for Category {
    type Id = CategoryId;
    const KIND: EntityKind = EntityKind::Category;

    fn entry_id(&self) -> CategoryId {
        self.id
    }

    fn entry_parent(&self) -> Option<CategoryId> {
        self.parent_id
    }
}

/// Entries reachable from `roots`, parents before children.
fn preorder<'a, T: TreeEntry>(
    roots: &[T::Id],
    entries: &'a [T],
) -> Result<Vec<&'a T>, HierarchyError> {
    let by_id: HashMap<T::Id, &T> = entries.iter().map(|e| (e.entry_id(), e)).collect();
    let mut children: HashMap<T::Id, Vec<&T>> = HashMap::new();
    for entry in entries {
        if let Some(parent) = entry.entry_parent() {
            children.entry(parent).or_default().push(entry);
        }
    }
    for siblings in children.values_mut() {
        siblings.sort_by_key(|e| e.entry_id());
    }

    let mut stack = Vec::with_capacity(roots.len());
    for root in roots.iter().rev() {
        let entry = by_id
            .get(root)
            .ok_or_else(|| HierarchyError::not_found(T::KIND, *root))?;
        stack.push(*entry);
    }

    let mut visited = HashSet::new();
    let mut order = Vec::with_capacity(entries.len());
    while let Some(entry) = stack.pop() {
        if !visited.insert(entry.entry_id()) {
            return Err(HierarchyError::cycle(T::KIND, entry.entry_id()));
        }
        order.push(entry);
        if let Some(kids) = children.get(&entry.entry_id()) {
            stack.extend(kids.iter().rev());
        }
    }

    Ok(order)
}

/// Assembles nodes bottom-up from a pre-order listing.
fn assemble<T, N, F>(roots: &[T::Id], order: &[&T], mut make: F) -> Vec<N>
where
    T: TreeEntry,
    F: FnMut(&T, Vec<N>) -> N,
{
    let root_set: HashSet<T::Id> = roots.iter().copied().collect();
    let mut pending: HashMap<T::Id, Vec<N>> = HashMap::new();
    let mut forest = Vec::with_capacity(roots.len());

    for &entry in order.iter().rev() {
        let mut children = pending.remove(&entry.entry_id()).unwrap_or_default();
        children.reverse();
        let node = make(entry, children);
        match entry.entry_parent() {
            Some(parent) if !root_set.contains(&entry.entry_id()) => {
                pending.entry(parent).or_default().push(node)
            }
            _ => forest.push(node),
        }
    }

    forest.reverse();
    forest
}

fn top_level<T: TreeEntry>(entries: &[T]) -> Vec<T::Id> {
    let mut roots: Vec<T::Id> = entries
        .iter()
        .filter(|e| e.entry_parent().is_none())
        .map(TreeEntry::entry_id)
        .collect();
    roots.sort();
    roots
}

/// In-memory [`LocationGraph`] over loaded slices.
pub struct SnapshotGraph<'a> {
    locations: HashMap<LocationId, &'a Location>,
    rooms: HashMap<RoomId, &'a Room>,
}

impl<'a> SnapshotGraph<'a> {
    pub fn new(locations: &'a [Location], rooms: &'a [Room]) -> Self {
        Self {
            locations: locations.iter().map(|l| (l.id, l)).collect(),
            rooms: rooms.iter().map(|r| (r.id, r)).collect(),
        }
    }

    fn room_ref(&self, id: Option<RoomId>) -> Option<RoomRef> {
        id.and_then(|id| self.rooms.get(&id)).map(|room| RoomRef::from(*room))
    }
}

impl LocationGraph for SnapshotGraph<'_> {
    type Error = HierarchyError;

    fn location(&mut self, id: LocationId) -> Result<Option<Location>, HierarchyError> {
        Ok(self.locations.get(&id).map(|l| (*l).clone()))
    }

    fn room(&mut self, id: RoomId) -> Result<Option<Room>, HierarchyError> {
        Ok(self.rooms.get(&id).map(|r| (*r).clone()))
    }
}

/// Builds location subtrees under `roots` and hands every node to `make`
/// together with its effective room and already built children.
///
/// Roots are expected to be disjoint subtrees; reaching a node twice is
/// reported as a cycle.
pub fn build_location_tree_with<N, F>(
    roots: &[LocationId],
    locations: &[Location],
    rooms: &[Room],
    mut make: F,
) -> Result<Vec<N>, HierarchyError>
where
    F: FnMut(&Location, Option<&RoomRef>, Vec<N>) -> N,
{
    let order = preorder(roots, locations)?;
    let mut graph = SnapshotGraph::new(locations, rooms);
    let root_set: HashSet<LocationId> = roots.iter().copied().collect();

    let mut effective: HashMap<LocationId, Option<RoomRef>> = HashMap::with_capacity(order.len());
    for location in &order {
        let room = match location.parent_id {
            Some(parent) if !root_set.contains(&location.id) => {
                effective.get(&parent).cloned().flatten()
            }
            _ => {
                let room_id = resolver::effective_room_id(location, &mut graph)?;
                graph.room_ref(room_id)
            }
        };
        effective.insert(location.id, room);
    }

    Ok(assemble(roots, &order, |location: &Location, children| {
        let room = effective.get(&location.id).and_then(Option::as_ref);
        make(location, room, children)
    }))
}

/// Nested view of the subtrees rooted at `roots`.
pub fn build_location_tree(
    roots: &[LocationId],
    locations: &[Location],
    rooms: &[Room],
) -> Result<Vec<LocationTreeNode>, HierarchyError> {
    build_location_tree_with(roots, locations, rooms, |location, room, children| {
        LocationTreeNode {
            id: location.id,
            name: location.name.clone(),
            effective_room: room.cloned(),
            description: location.description.clone(),
            children,
        }
    })
}

/// Nested view of every location, rooted at the top-level ones.
pub fn build_location_forest(
    locations: &[Location],
    rooms: &[Room],
) -> Result<Vec<LocationTreeNode>, HierarchyError> {
    let roots = top_level(locations);
    let forest = build_location_tree(&roots, locations, rooms)?;

    let placed: usize = forest.iter().map(LocationTreeNode::size).sum();
    if placed != locations.len() {
        log::warn!(
            "Location forest covers {placed} of {} locations; the rest are unreachable from any room",
            locations.len()
        );
    }

    Ok(forest)
}

/// Nested view of every category, rooted at the top-level ones.
pub fn build_category_forest(
    categories: &[Category],
) -> Result<Vec<CategoryTreeNode>, HierarchyError> {
    let roots = top_level(categories);
    let order = preorder(&roots, categories)?;

    Ok(assemble(&roots, &order, |category: &Category, children| {
        CategoryTreeNode {
            id: category.id,
            name: category.name.clone(),
            description: category.description.clone(),
            children,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{category, location, room};

    fn names(nodes: &[LocationTreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.name.as_str()).collect()
    }

    #[test]
    fn pantry_scenario() {
        let rooms = [room(1, "Kitchen")];
        let locations = [
            location(1, "Pantry Shelf", Some(1), None),
            location(2, "Box A", None, Some(1)),
        ];

        let tree =
            build_location_tree(&[LocationId::new(1).unwrap()], &locations, &rooms).unwrap();

        assert_eq!(tree.len(), 1);
        let shelf = &tree[0];
        assert_eq!(shelf.name, "Pantry Shelf");
        assert_eq!(shelf.effective_room.as_ref().unwrap().name, "Kitchen");
        assert_eq!(names(&shelf.children), vec!["Box A"]);
        assert_eq!(
            shelf.children[0].effective_room.as_ref().unwrap().name,
            "Kitchen"
        );
    }

    #[test]
    fn forest_contains_every_location_once() {
        let rooms = [room(1, "Kitchen"), room(2, "Garage")];
        let locations = [
            location(1, "Shelf", Some(1), None),
            location(2, "Rack", Some(2), None),
            location(3, "Box", None, Some(1)),
            location(4, "Tin", None, Some(3)),
            location(5, "Bin", None, Some(2)),
            location(6, "Jar", None, Some(3)),
        ];

        let forest = build_location_forest(&locations, &rooms).unwrap();

        assert_eq!(names(&forest), vec!["Shelf", "Rack"]);
        let total: usize = forest.iter().map(LocationTreeNode::size).sum();
        assert_eq!(total, locations.len());
        assert_eq!(names(&forest[0].children[0].children), vec!["Tin", "Jar"]);
        assert_eq!(
            forest[1].children[0].effective_room.as_ref().unwrap().name,
            "Garage"
        );
    }

    #[test]
    fn siblings_follow_identity_order_not_input_order() {
        let rooms = [room(1, "Kitchen")];
        let locations = [
            location(3, "Zeta", None, Some(1)),
            location(1, "Shelf", Some(1), None),
            location(2, "Alpha", None, Some(1)),
        ];
        let forest = build_location_forest(&locations, &rooms).unwrap();
        assert_eq!(names(&forest[0].children), vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn subtree_root_inherits_room_from_outside_the_subtree() {
        let rooms = [room(1, "Kitchen")];
        let locations = [
            location(1, "Shelf", Some(1), None),
            location(2, "Box", None, Some(1)),
            location(3, "Tin", None, Some(2)),
        ];
        let tree =
            build_location_tree(&[LocationId::new(2).unwrap()], &locations, &rooms).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].effective_room.as_ref().unwrap().name, "Kitchen");
        assert_eq!(tree[0].size(), 2);
    }

    #[test]
    fn overlapping_roots_are_rejected() {
        let rooms = [room(1, "Kitchen")];
        let locations = [
            location(1, "Shelf", Some(1), None),
            location(2, "Box", None, Some(1)),
        ];
        let roots = [LocationId::new(1).unwrap(), LocationId::new(2).unwrap()];
        assert_eq!(
            build_location_tree(&roots, &locations, &rooms),
            Err(HierarchyError::cycle(EntityKind::Location, 2))
        );
    }

    #[test]
    fn unknown_root_is_not_found() {
        assert_eq!(
            build_location_tree(&[LocationId::new(9).unwrap()], &[], &[]),
            Err(HierarchyError::not_found(EntityKind::Location, 9))
        );
    }

    #[test]
    fn deep_chain_builds_renders_and_drops_without_recursion() {
        let rooms = [room(1, "Cellar")];
        let mut locations = vec![location(1, "Level 1", Some(1), None)];
        for id in 2..=20_000 {
            locations.push(location(id, "Level", None, Some(id - 1)));
        }
        let forest = build_location_forest(&locations, &rooms).unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].size(), 20_000);

        let json = serde_json::to_string(&Outline(&forest)).unwrap();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(rows.len(), 20_000);
        assert_eq!(rows[19_999]["depth"], 19_999);
        assert_eq!(rows[19_999]["parent_id"], 19_999);
        assert_eq!(rows[19_999]["effective_room"]["name"], "Cellar");
    }

    #[test]
    fn outline_lists_parents_before_children() {
        let rooms = [room(1, "Kitchen")];
        let locations = [
            location(1, "Shelf", Some(1), None),
            location(2, "Box", None, Some(1)),
            location(3, "Rack", Some(1), None),
            location(4, "Tin", None, Some(2)),
        ];
        let forest = build_location_forest(&locations, &rooms).unwrap();

        let rows = serde_json::to_value(Outline(&forest)).unwrap();
        let rows = rows.as_array().unwrap();
        let ids: Vec<_> = rows.iter().map(|row| row["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 4, 3]);
        assert_eq!(rows[0]["parent_id"], serde_json::Value::Null);
        assert_eq!(rows[2]["parent_id"], 2);
        assert_eq!(rows[2]["depth"], 2);
        assert_eq!(rows[1]["name"], "Box");
        assert!(rows[1].get("children").is_none());
    }

    #[test]
    fn deep_category_chain_renders_and_drops() {
        let mut categories = vec![category(1, "Root", None)];
        for id in 2..=20_000 {
            categories.push(category(id, "Nested", Some(id - 1)));
        }
        let forest = build_category_forest(&categories).unwrap();

        let rows = serde_json::to_value(Outline(&forest)).unwrap();
        assert_eq!(rows.as_array().unwrap().len(), 20_000);
    }

    #[test]
    fn category_forest_orphans_are_roots() {
        let categories = [
            category(1, "Electronics", None),
            category(2, "Garage", None),
            category(3, "Electronics", Some(2)),
            category(4, "Cables", Some(1)),
        ];
        let forest = build_category_forest(&categories).unwrap();
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].children[0].name, "Cables");
        assert_eq!(forest[1].children[0].name, "Electronics");
    }
}
