use std::collections::HashSet;

use diesel::prelude::*;

use crate::domain::location::{Location, LocationUpdate, NewLocation};
use crate::domain::room::Room;
use crate::domain::types::{LocationId, LocationName, RoomId};
use crate::hierarchy::{EntityKind, LocationCandidate, LocationGraph, validate_location};
use crate::models::location::{
    Location as DbLocation, LocationChangeset, NewLocation as DbNewLocation,
};
use crate::repository::room::find_room;
use crate::repository::{
    DieselRepository, LocationReader, LocationWriter, RepositoryError, RepositoryResult, TxGraph,
    tx_graph,
};

pub(super) fn find_location(
    conn: &mut SqliteConnection,
    id: LocationId,
) -> RepositoryResult<Option<Location>> {
    use crate::schema::locations;

    let location = locations::table
        .find(id.get())
        .first::<DbLocation>(conn)
        .optional()?;

    Ok(location.map(TryInto::try_into).transpose()?)
}

/// Identities of `roots` and everything below them.
pub(super) fn subtree_ids(
    conn: &mut SqliteConnection,
    roots: Vec<i32>,
) -> QueryResult<Vec<i32>> {
    use crate::schema::locations;

    let mut seen: HashSet<i32> = roots.iter().copied().collect();
    let mut all = roots.clone();
    let mut frontier = roots;

    while !frontier.is_empty() {
        let children = locations::table
            .filter(locations::parent_id.eq_any(frontier.iter().map(|id| Some(*id))))
            .select(locations::id)
            .load::<i32>(conn)?;
        frontier = children.into_iter().filter(|id| seen.insert(*id)).collect();
        all.extend(&frontier);
    }

    Ok(all)
}

/// Clears the location of items stored in any of `location_ids`.
pub(super) fn detach_items(conn: &mut SqliteConnection, location_ids: &[i32]) -> QueryResult<usize> {
    use crate::schema::items;

    diesel::update(
        items::table.filter(items::location_id.eq_any(location_ids.iter().map(|id| Some(*id)))),
    )
    .set(items::location_id.eq(None::<i32>))
    .execute(conn)
}

impl LocationGraph for TxGraph<'_> {
    type Error = RepositoryError;

    fn location(&mut self, id: LocationId) -> RepositoryResult<Option<Location>> {
        find_location(self.conn, id)
    }

    fn room(&mut self, id: RoomId) -> RepositoryResult<Option<Room>> {
        find_room(self.conn, id)
    }
}

fn load_locations(
    query: crate::schema::locations::BoxedQuery<'_, diesel::sqlite::Sqlite>,
    conn: &mut SqliteConnection,
) -> RepositoryResult<Vec<Location>> {
    use crate::schema::locations;

    let items = query
        .order(locations::id.asc())
        .load::<DbLocation>(conn)?
        .into_iter()
        .map(TryInto::try_into)
        .collect::<Result<Vec<Location>, _>>()?;

    Ok(items)
}

impl LocationReader for DieselRepository {
    fn list_locations(&self) -> RepositoryResult<Vec<Location>> {
        use crate::schema::locations;

        let mut conn = self.conn()?;
        load_locations(locations::table.into_boxed(), &mut conn)
    }

    fn get_location_by_id(&self, id: LocationId) -> RepositoryResult<Option<Location>> {
        let mut conn = self.conn()?;
        find_location(&mut conn, id)
    }

    fn list_sublocations(&self, parent_id: LocationId) -> RepositoryResult<Vec<Location>> {
        use crate::schema::locations;

        let mut conn = self.conn()?;
        let query = locations::table
            .filter(locations::parent_id.eq(Some(parent_id.get())))
            .into_boxed();
        load_locations(query, &mut conn)
    }

    fn list_top_level_locations(
        &self,
        room_id: Option<RoomId>,
    ) -> RepositoryResult<Vec<Location>> {
        use crate::schema::locations;

        let mut conn = self.conn()?;
        let mut query = locations::table
            .filter(locations::parent_id.is_null())
            .into_boxed();
        if let Some(room_id) = room_id {
            query = query.filter(locations::room_id.eq(Some(room_id.get())));
        }
        load_locations(query, &mut conn)
    }

    fn find_location_by_name(
        &self,
        name: &LocationName,
        room_id: RoomId,
    ) -> RepositoryResult<Option<Location>> {
        use crate::schema::locations;

        let mut conn = self.conn()?;

        let location = locations::table
            .filter(locations::name.eq(name.as_str()))
            .filter(locations::parent_id.is_null())
            .filter(locations::room_id.eq(Some(room_id.get())))
            .order(locations::id.asc())
            .first::<DbLocation>(&mut conn)
            .optional()?;

        Ok(location.map(TryInto::try_into).transpose()?)
    }
}

impl LocationWriter for DieselRepository {
    fn create_location(&self, location: &NewLocation) -> RepositoryResult<Location> {
        use crate::schema::locations;

        let mut conn = self.conn()?;

        conn.immediate_transaction(|conn| {
            if let Some(id) = location.id {
                if find_location(conn, id)?.is_some() {
                    return Err(RepositoryError::Conflict {
                        entity: EntityKind::Location,
                        id: id.get(),
                    });
                }
            }

            validate_location(&LocationCandidate::from(location), &mut tx_graph(conn))?;

            let row = diesel::insert_into(locations::table)
                .values(DbNewLocation::from(location))
                .get_result::<DbLocation>(conn)?;
            let created: Location = row.try_into()?;
            Ok(created)
        })
    }

    fn update_location(
        &self,
        id: LocationId,
        update: &LocationUpdate,
    ) -> RepositoryResult<Location> {
        use crate::schema::locations;

        let mut conn = self.conn()?;

        conn.immediate_transaction(|conn| {
            if find_location(conn, id)?.is_none() {
                return Err(RepositoryError::not_found(EntityKind::Location, id));
            }

            validate_location(
                &LocationCandidate::for_update(id, update),
                &mut tx_graph(conn),
            )?;

            let row = diesel::update(locations::table.find(id.get()))
                .set(LocationChangeset::from(update))
                .get_result::<DbLocation>(conn)?;
            let updated: Location = row.try_into()?;
            Ok(updated)
        })
    }

    fn delete_location(&self, id: LocationId) -> RepositoryResult<usize> {
        use crate::schema::locations;

        let mut conn = self.conn()?;

        conn.immediate_transaction(|conn| {
            if find_location(conn, id)?.is_none() {
                return Ok(0);
            }

            let doomed = subtree_ids(conn, vec![id.get()])?;
            detach_items(conn, &doomed)?;
            let affected =
                diesel::delete(locations::table.filter(locations::id.eq_any(&doomed))).execute(conn)?;
            Ok(affected)
        })
    }
}
