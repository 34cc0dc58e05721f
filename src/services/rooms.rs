use std::collections::HashMap;

use crate::domain::item::Item;
use crate::domain::location::Location;
use crate::domain::room::Room;
use crate::domain::types::{LocationId, RoomId};
use crate::dto::items::ItemDto;
use crate::dto::rooms::{InventoryLocationDto, RoomInventoryDto};
use crate::forms::rooms::{AddRoomFormPayload, UpdateRoomFormPayload};
use crate::hierarchy::tree::build_location_tree_with;
use crate::repository::{
    ItemListQuery, ItemReader, LocationReader, RoomReader, RoomWriter,
};

use super::{ServiceError, ServiceResult, store_failure};

pub fn list_rooms<R>(repo: &R) -> ServiceResult<Vec<Room>>
where
    R: RoomReader,
{
    repo.list_rooms().map_err(|e| store_failure("list rooms", e))
}

pub fn show_room<R>(room_id: i32, repo: &R) -> ServiceResult<Room>
where
    R: RoomReader,
{
    let room_id = RoomId::new(room_id).map_err(|_| ServiceError::NotFound)?;

    match repo.get_room_by_id(room_id) {
        Ok(Some(room)) => Ok(room),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => Err(store_failure("get room", e)),
    }
}

pub fn add_room<R>(payload: AddRoomFormPayload, repo: &R) -> ServiceResult<Room>
where
    R: RoomWriter,
{
    let room = repo
        .create_room(&payload.room)
        .map_err(|e| store_failure("create room", e))?;
    log::info!("Created room {} '{}'", room.id, room.name);
    Ok(room)
}

pub fn update_room<R>(payload: UpdateRoomFormPayload, repo: &R) -> ServiceResult<Room>
where
    R: RoomWriter,
{
    repo.update_room(payload.room_id, &payload.room)
        .map_err(|e| store_failure("update room", e))
}

/// Deletes a room together with every location placed in it.
///
/// Items kept in those locations survive unplaced.
pub fn delete_room<R>(room_id: i32, repo: &R) -> ServiceResult<()>
where
    R: RoomWriter,
{
    let room_id = RoomId::new(room_id).map_err(|_| ServiceError::NotFound)?;

    match repo.delete_room(room_id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => {
            log::info!("Deleted room {room_id}");
            Ok(())
        }
        Err(e) => Err(store_failure("delete room", e)),
    }
}

/// Everything stored in a room, arranged by its location tree.
pub fn room_inventory<R>(room_id: i32, repo: &R) -> ServiceResult<RoomInventoryDto>
where
    R: RoomReader + LocationReader + ItemReader,
{
    let room = show_room(room_id, repo)?;

    let roots: Vec<LocationId> = repo
        .list_top_level_locations(Some(room.id))
        .map_err(|e| store_failure("list top-level locations", e))?
        .iter()
        .map(|location| location.id)
        .collect();
    let locations = repo
        .list_locations()
        .map_err(|e| store_failure("list locations", e))?;

    let mut placed = Vec::new();
    let mut nodes = build_location_tree_with(
        &roots,
        &locations,
        std::slice::from_ref(&room),
        |location: &Location, _, children| {
            placed.push(location.id);
            InventoryLocationDto {
                id: location.id.get(),
                name: location.name.to_string(),
                description: location.description.as_ref().map(ToString::to_string),
                items: Vec::new(),
                children,
            }
        },
    )
    .map_err(|e| {
        log::error!("Failed to build inventory of room {}: {e}", room.id);
        ServiceError::from(e)
    })?;

    let items = if placed.is_empty() {
        Vec::new()
    } else {
        repo.list_items(ItemListQuery::default().locations(placed))
            .map_err(|e| store_failure("list items", e))?
    };
    let mut by_location: HashMap<i32, Vec<Item>> = HashMap::new();
    for item in items {
        if let Some(location_id) = item.location_id {
            by_location.entry(location_id.get()).or_default().push(item);
        }
    }

    let room_name = room.name.to_string();
    let mut stack: Vec<&mut InventoryLocationDto> = nodes.iter_mut().collect();
    while let Some(node) = stack.pop() {
        node.items = by_location
            .remove(&node.id)
            .unwrap_or_default()
            .into_iter()
            .map(|item| {
                ItemDto::from(item).placed(Some(node.name.clone()), Some(room_name.clone()))
            })
            .collect();
        stack.extend(node.children.iter_mut());
    }

    Ok(RoomInventoryDto::new(room, nodes))
}
