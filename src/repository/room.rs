use diesel::prelude::*;

use crate::domain::room::{NewRoom, Room};
use crate::domain::types::{RoomId, RoomName};
use crate::hierarchy::EntityKind;
use crate::models::room::{NewRoom as DbNewRoom, Room as DbRoom};
use crate::repository::location::{detach_items, subtree_ids};
use crate::repository::{DieselRepository, RepositoryError, RepositoryResult, RoomReader, RoomWriter};

pub(super) fn find_room(conn: &mut SqliteConnection, id: RoomId) -> RepositoryResult<Option<Room>> {
    use crate::schema::rooms;

    let room = rooms::table
        .find(id.get())
        .first::<DbRoom>(conn)
        .optional()?;

    Ok(room.map(TryInto::try_into).transpose()?)
}

impl RoomReader for DieselRepository {
    fn list_rooms(&self) -> RepositoryResult<Vec<Room>> {
        use crate::schema::rooms;

        let mut conn = self.conn()?;

        let rooms = rooms::table
            .order(rooms::id.asc())
            .load::<DbRoom>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Room>, _>>()?;

        Ok(rooms)
    }

    fn get_room_by_id(&self, id: RoomId) -> RepositoryResult<Option<Room>> {
        let mut conn = self.conn()?;
        find_room(&mut conn, id)
    }

    fn find_room_by_name(&self, name: &RoomName) -> RepositoryResult<Option<Room>> {
        use crate::schema::rooms;

        let mut conn = self.conn()?;

        let room = rooms::table
            .filter(rooms::name.eq(name.as_str()))
            .order(rooms::id.asc())
            .first::<DbRoom>(&mut conn)
            .optional()?;

        Ok(room.map(TryInto::try_into).transpose()?)
    }
}

impl RoomWriter for DieselRepository {
    fn create_room(&self, room: &NewRoom) -> RepositoryResult<Room> {
        use crate::schema::rooms;

        let mut conn = self.conn()?;

        let row = diesel::insert_into(rooms::table)
            .values(DbNewRoom::from(room))
            .get_result::<DbRoom>(&mut conn)?;

        Ok(row.try_into()?)
    }

    fn update_room(&self, id: RoomId, room: &NewRoom) -> RepositoryResult<Room> {
        use crate::schema::rooms;

        let mut conn = self.conn()?;

        let row = diesel::update(rooms::table.find(id.get()))
            .set(DbNewRoom::from(room))
            .get_result::<DbRoom>(&mut conn)
            .optional()?
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Room, id))?;

        Ok(row.try_into()?)
    }

    fn delete_room(&self, id: RoomId) -> RepositoryResult<usize> {
        use crate::schema::{locations, rooms};

        let mut conn = self.conn()?;

        conn.immediate_transaction(|conn| {
            let top_level = locations::table
                .filter(locations::room_id.eq(Some(id.get())))
                .select(locations::id)
                .load::<i32>(conn)?;
            let doomed = subtree_ids(conn, top_level)?;

            detach_items(conn, &doomed)?;
            diesel::delete(locations::table.filter(locations::id.eq_any(&doomed))).execute(conn)?;

            let affected = diesel::delete(rooms::table.find(id.get())).execute(conn)?;
            Ok(affected)
        })
    }
}
