use serde::Serialize;

use crate::domain::room::Room;
use crate::dto::items::ItemDto;
use crate::hierarchy::tree::{NestedNode, drop_nested, serialize_outline};

/// A location inside a room inventory with the items kept there.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryLocationDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub items: Vec<ItemDto>,
    pub children: Vec<InventoryLocationDto>,
}

impl InventoryLocationDto {
    /// Items in this location and every sublocation.
    pub fn item_count(&self) -> usize {
        let mut total = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            total += node.items.len();
            stack.extend(node.children.iter());
        }
        total
    }
}

#[derive(Serialize)]
struct InventoryLocationFields<'a> {
    name: &'a str,
    description: Option<&'a str>,
    items: &'a [ItemDto],
}

impl NestedNode for InventoryLocationDto {
    fn node_id(&self) -> i32 {
        self.id
    }

    fn children(&self) -> &[Self] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }

    fn fields(&self) -> impl Serialize + '_ {
        InventoryLocationFields {
            name: &self.name,
            description: self.description.as_deref(),
            items: &self.items,
        }
    }
}

impl Drop for InventoryLocationDto {
    fn drop(&mut self) {
        drop_nested(self);
    }
}

/// Everything stored in one room, arranged by location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomInventoryDto {
    pub id: i32,
    pub name: String,
    pub floor: Option<String>,
    pub description: Option<String>,
    /// Rendered as a flat outline, parents before children.
    #[serde(serialize_with = "serialize_outline")]
    pub locations: Vec<InventoryLocationDto>,
}

impl RoomInventoryDto {
    pub fn new(room: Room, locations: Vec<InventoryLocationDto>) -> Self {
        Self {
            id: room.id.get(),
            name: room.name.into_inner(),
            floor: room.floor.map(|f| f.into_inner()),
            description: room.description.map(|d| d.into_inner()),
            locations,
        }
    }
}
