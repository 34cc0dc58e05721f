//! Materializes item tuples produced by the external extraction step.
//!
//! Rooms and top-level locations are matched by exact name and created when
//! missing. A tuple naming a location but no room asks for a top-level
//! location without a room, which the hierarchy rules reject; that tuple is
//! reported as failed and the rest of the batch continues.
//!
//! Tuples are validated before anything is stored. The report counts rooms
//! and locations that were actually created.

use serde::Serialize;

use crate::domain::item::NewItem;
use crate::domain::location::{Location, NewLocation};
use crate::domain::room::{NewRoom, Room};
use crate::domain::types::{LocationName, RoomId, RoomName};
use crate::dto::items::ItemDto;
use crate::forms::intake::{ExtractedItem, ExtractedItemForm};
use crate::repository::{
    ItemWriter, LocationReader, LocationWriter, RoomReader, RoomWriter,
};

use super::{ServiceError, ServiceResult, store_failure};

/// Tuple-level intake failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeRowError {
    pub row_number: usize,
    pub item_name: Option<String>,
    pub message: String,
}

/// Aggregated intake outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IntakeReport {
    pub total_rows: usize,
    pub created: usize,
    pub failed: usize,
    pub rooms_created: usize,
    pub locations_created: usize,
    pub items: Vec<ItemDto>,
    pub errors: Vec<IntakeRowError>,
}

impl IntakeReport {
    pub fn with_total(total_rows: usize) -> Self {
        Self {
            total_rows,
            ..Self::default()
        }
    }

    pub fn push_error(
        &mut self,
        row_number: usize,
        item_name: Option<String>,
        message: impl Into<String>,
    ) {
        self.failed += 1;
        self.errors.push(IntakeRowError {
            row_number,
            item_name,
            message: message.into(),
        });
    }
}

fn room_named<R>(name: &RoomName, repo: &R) -> ServiceResult<(Room, bool)>
where
    R: RoomReader + RoomWriter,
{
    match repo.find_room_by_name(name) {
        Ok(Some(room)) => Ok((room, false)),
        Ok(None) => {
            let room = repo
                .create_room(&NewRoom::named(name.clone()))
                .map_err(|e| store_failure("create room", e))?;
            log::info!("Intake created room {} '{}'", room.id, room.name);
            Ok((room, true))
        }
        Err(e) => Err(store_failure("find room", e)),
    }
}

fn location_named<R>(
    name: &LocationName,
    room_id: Option<RoomId>,
    repo: &R,
) -> ServiceResult<(Location, bool)>
where
    R: LocationReader + LocationWriter,
{
    if let Some(room_id) = room_id {
        match repo.find_location_by_name(name, room_id) {
            Ok(Some(location)) => return Ok((location, false)),
            Ok(None) => {}
            Err(e) => return Err(store_failure("find location", e)),
        }
    }

    let location = NewLocation {
        name: name.clone(),
        room_id,
        ..NewLocation::default()
    };
    let location = repo
        .create_location(&location)
        .map_err(|e| store_failure("create location", e))?;
    log::info!("Intake created location {} '{}'", location.id, location.name);
    Ok((location, true))
}

/// The room called `name`, created if no room has that name yet.
pub fn find_or_create_room<R>(name: &RoomName, repo: &R) -> ServiceResult<Room>
where
    R: RoomReader + RoomWriter,
{
    room_named(name, repo).map(|(room, _)| room)
}

/// The top-level location called `name` in `room_id`, created if missing.
///
/// Without a room there is nothing to match against, so a new top-level
/// location without a room is attempted and rejected by the hierarchy rules.
pub fn find_or_create_location<R>(
    name: &LocationName,
    room_id: Option<RoomId>,
    repo: &R,
) -> ServiceResult<Location>
where
    R: LocationReader + LocationWriter,
{
    location_named(name, room_id, repo).map(|(location, _)| location)
}

fn ingest_one<R>(item: ExtractedItem, repo: &R, report: &mut IntakeReport) -> ServiceResult<()>
where
    R: RoomReader + RoomWriter + LocationReader + LocationWriter + ItemWriter,
{
    let room = match &item.room_name {
        Some(name) => {
            let (room, created) = room_named(name, repo)?;
            report.rooms_created += usize::from(created);
            Some(room)
        }
        None => None,
    };

    let location = match &item.location_name {
        Some(name) => {
            let (location, created) = location_named(name, room.as_ref().map(|r| r.id), repo)?;
            report.locations_created += usize::from(created);
            Some(location)
        }
        None => None,
    };

    let created = repo
        .create_item(&NewItem::simple(
            item.item_name,
            item.quantity,
            location.as_ref().map(|l| l.id),
        ))
        .map_err(|e| store_failure("create item", e))?;

    report.created += 1;
    report.items.push(ItemDto::from(created).placed(
        location.map(|l| l.name.into_inner()),
        room.map(|r| r.name.into_inner()),
    ));
    Ok(())
}

/// Creates an item for every tuple, finding or creating its room and
/// location on the way.
///
/// Invalid tuples and tuples rejected by the hierarchy rules are recorded in
/// the report; a store malfunction aborts the batch.
pub fn ingest_extracted_items<R>(
    rows: Vec<ExtractedItemForm>,
    repo: &R,
) -> ServiceResult<IntakeReport>
where
    R: RoomReader + RoomWriter + LocationReader + LocationWriter + ItemWriter,
{
    let mut report = IntakeReport::with_total(rows.len());

    for (idx, form) in rows.into_iter().enumerate() {
        let row_number = idx + 1;
        let raw_name = form.item_name.clone();

        let outcome = ExtractedItem::try_from(form)
            .map_err(ServiceError::from)
            .and_then(|item| ingest_one(item, repo, &mut report));

        match outcome {
            Ok(()) => {}
            Err(ServiceError::Internal) => return Err(ServiceError::Internal),
            Err(e) => {
                log::warn!("Intake row {row_number} '{raw_name}' failed: {e}");
                report.push_error(row_number, Some(raw_name), e.to_string());
            }
        }
    }

    log::info!(
        "Intake finished: {} of {} rows created items, {} failed",
        report.created,
        report.total_rows,
        report.failed
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{ConstraintViolation, HierarchyError};
    use crate::repository::{ItemListQuery, ItemReader, MemoryRepository};

    fn row(name: &str, quantity: i32, room: Option<&str>, location: Option<&str>) -> ExtractedItemForm {
        ExtractedItemForm {
            item_name: name.to_string(),
            quantity: Some(quantity),
            room_name: room.map(str::to_string),
            location_name: location.map(str::to_string),
        }
    }

    #[test]
    fn reuses_rooms_and_locations_by_name() {
        let repo = MemoryRepository::new();
        let report = ingest_extracted_items(
            vec![
                row("Flour", 2, Some("Kitchen"), Some("Pantry")),
                row("Sugar", 1, Some("Kitchen"), Some("Pantry")),
                row("Rice", 3, Some("Kitchen"), Some("Cupboard")),
            ],
            &repo,
        )
        .unwrap();

        assert_eq!(report.created, 3);
        assert_eq!(report.rooms_created, 1);
        assert_eq!(report.locations_created, 2);
        assert_eq!(repo.list_rooms().unwrap().len(), 1);
        assert_eq!(report.items[1].location_name.as_deref(), Some("Pantry"));
        assert_eq!(report.items[1].room_name.as_deref(), Some("Kitchen"));
    }

    #[test]
    fn location_without_room_fails_only_that_row() {
        let repo = MemoryRepository::new();
        let report = ingest_extracted_items(
            vec![
                row("Torch", 1, None, Some("Drawer")),
                row("Batteries", 4, None, None),
            ],
            &repo,
        )
        .unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.created, 1);
        assert_eq!(report.errors[0].row_number, 1);
        assert_eq!(
            report.errors[0].message,
            HierarchyError::from(ConstraintViolation::LocationRequiresRoom).to_string()
        );
        assert!(repo.list_locations().unwrap().is_empty());
    }

    #[test]
    fn room_without_location_leaves_item_unplaced() {
        let repo = MemoryRepository::new();
        let report =
            ingest_extracted_items(vec![row("Mop", 1, Some("Utility"), None)], &repo).unwrap();

        assert_eq!(report.rooms_created, 1);
        let unplaced = repo.list_items(ItemListQuery::default().unplaced()).unwrap();
        assert_eq!(unplaced.len(), 1);
        assert_eq!(report.items[0].room_name.as_deref(), Some("Utility"));
    }

    #[test]
    fn invalid_tuples_are_reported() {
        let repo = MemoryRepository::new();
        let report = ingest_extracted_items(
            vec![row("Glue", -1, None, None), row(" ", 1, None, None)],
            &repo,
        )
        .unwrap();

        assert_eq!(report.failed, 2);
        assert_eq!(report.created, 0);
    }

    #[test]
    fn invalid_tuple_creates_no_room() {
        let repo = MemoryRepository::new();
        let report = ingest_extracted_items(
            vec![
                row("Paint", -3, Some("Attic"), Some("Crate")),
                row("Brush", 1, Some("Shed"), None),
            ],
            &repo,
        )
        .unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.rooms_created, 1);
        assert_eq!(report.locations_created, 0);
        let rooms = repo.list_rooms().unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].name, "Shed");
    }

    #[test]
    fn find_or_create_room_is_idempotent() {
        let repo = MemoryRepository::new();
        let name = RoomName::new("Hall").unwrap();
        let first = find_or_create_room(&name, &repo).unwrap();
        let second = find_or_create_room(&name, &repo).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn find_or_create_location_needs_a_room() {
        let repo = MemoryRepository::new();
        let err = find_or_create_location(&LocationName::new("Shelf").unwrap(), None, &repo)
            .unwrap_err();
        assert_eq!(
            err,
            ServiceError::Hierarchy(ConstraintViolation::LocationRequiresRoom.into())
        );
    }
}
