use std::collections::HashMap;

use crate::domain::item::Item;
use crate::domain::types::{ItemId, LocationId, RoomId};
use crate::dto::items::ItemDto;
use crate::forms::items::{ItemFormPayload, UpdateItemFormPayload};
use crate::hierarchy::effective_room_id;
use crate::hierarchy::tree::SnapshotGraph;
use crate::repository::{
    ItemListQuery, ItemReader, ItemWriter, LocationReader, RoomReader,
};

use super::{ServiceError, ServiceResult, store_failure};

/// Attaches location and effective room names to `items`.
///
/// Locations and rooms are loaded once; each item's room is resolved
/// against that snapshot.
fn describe_items<R>(items: Vec<Item>, repo: &R) -> ServiceResult<Vec<ItemDto>>
where
    R: LocationReader + RoomReader,
{
    if items.iter().all(|item| item.location_id.is_none()) {
        return Ok(items.into_iter().map(ItemDto::from).collect());
    }

    let locations = repo
        .list_locations()
        .map_err(|e| store_failure("list locations", e))?;
    let rooms = repo.list_rooms().map_err(|e| store_failure("list rooms", e))?;

    let by_id: HashMap<LocationId, usize> = locations
        .iter()
        .enumerate()
        .map(|(idx, location)| (location.id, idx))
        .collect();
    let room_names: HashMap<RoomId, String> = rooms
        .iter()
        .map(|room| (room.id, room.name.to_string()))
        .collect();
    let mut graph = SnapshotGraph::new(&locations, &rooms);

    let mut described = Vec::with_capacity(items.len());
    for item in items {
        let location = item
            .location_id
            .and_then(|id| by_id.get(&id))
            .map(|&idx| &locations[idx]);
        let (location_name, room_name) = match location {
            Some(location) => {
                let room_id = effective_room_id(location, &mut graph).map_err(|e| {
                    log::error!("Failed to resolve room of location {}: {e}", location.id);
                    ServiceError::from(e)
                })?;
                (
                    Some(location.name.to_string()),
                    room_id.and_then(|id| room_names.get(&id).cloned()),
                )
            }
            None => (None, None),
        };
        described.push(ItemDto::from(item).placed(location_name, room_name));
    }

    Ok(described)
}

pub fn list_items<R>(query: ItemListQuery, repo: &R) -> ServiceResult<Vec<ItemDto>>
where
    R: ItemReader + LocationReader + RoomReader,
{
    let items = repo
        .list_items(query)
        .map_err(|e| store_failure("list items", e))?;
    describe_items(items, repo)
}

pub fn show_item<R>(item_id: i32, repo: &R) -> ServiceResult<ItemDto>
where
    R: ItemReader + LocationReader + RoomReader,
{
    let item_id = ItemId::new(item_id).map_err(|_| ServiceError::NotFound)?;

    let item = match repo.get_item_by_id(item_id) {
        Ok(Some(item)) => item,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => return Err(store_failure("get item", e)),
    };

    describe_items(vec![item], repo)?
        .pop()
        .ok_or(ServiceError::Internal)
}

pub fn add_item<R>(payload: ItemFormPayload, repo: &R) -> ServiceResult<Item>
where
    R: ItemWriter,
{
    repo.create_item(&payload.item)
        .map_err(|e| store_failure("create item", e))
}

pub fn update_item<R>(payload: UpdateItemFormPayload, repo: &R) -> ServiceResult<Item>
where
    R: ItemWriter,
{
    repo.update_item(payload.item_id, &payload.item)
        .map_err(|e| store_failure("update item", e))
}

pub fn delete_item<R>(item_id: i32, repo: &R) -> ServiceResult<()>
where
    R: ItemWriter,
{
    let item_id = ItemId::new(item_id).map_err(|_| ServiceError::NotFound)?;

    match repo.delete_item(item_id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => Err(store_failure("delete item", e)),
    }
}
