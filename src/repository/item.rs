use diesel::prelude::*;

use crate::domain::item::{Item, NewItem};
use crate::domain::types::ItemId;
use crate::hierarchy::{EntityKind, HierarchyError};
use crate::models::item::{Item as DbItem, NewItem as DbNewItem};
use crate::repository::category::find_category;
use crate::repository::location::find_location;
use crate::repository::{
    DieselRepository, ItemListQuery, ItemReader, ItemWriter, RepositoryError, RepositoryResult,
};

/// Referenced location and category must exist before an item points at them.
fn check_references(conn: &mut SqliteConnection, item: &NewItem) -> RepositoryResult<()> {
    if let Some(location_id) = item.location_id {
        if find_location(conn, location_id)?.is_none() {
            return Err(HierarchyError::not_found(EntityKind::Location, location_id).into());
        }
    }
    if let Some(category_id) = item.category_id {
        if find_category(conn, category_id)?.is_none() {
            return Err(HierarchyError::not_found(EntityKind::Category, category_id).into());
        }
    }
    Ok(())
}

impl ItemReader for DieselRepository {
    fn list_items(&self, query: ItemListQuery) -> RepositoryResult<Vec<Item>> {
        use crate::schema::items;

        let mut conn = self.conn()?;

        let mut filtered = items::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(location_ids) = &query.location_ids {
            filtered = filtered.filter(
                items::location_id.eq_any(location_ids.iter().map(|id| Some(id.get()))),
            );
        }
        if let Some(category_id) = query.category_id {
            filtered = filtered.filter(items::category_id.eq(Some(category_id.get())));
        }
        if query.unplaced {
            filtered = filtered.filter(items::location_id.is_null());
        }
        if let Some(search) = &query.search {
            filtered = filtered.filter(items::name.like(format!("%{}%", search.trim())));
        }

        let items = filtered
            .order(items::id.asc())
            .load::<DbItem>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Item>, _>>()?;

        Ok(items)
    }

    fn get_item_by_id(&self, id: ItemId) -> RepositoryResult<Option<Item>> {
        use crate::schema::items;

        let mut conn = self.conn()?;

        let item = items::table
            .find(id.get())
            .first::<DbItem>(&mut conn)
            .optional()?;

        Ok(item.map(TryInto::try_into).transpose()?)
    }
}

impl ItemWriter for DieselRepository {
    fn create_item(&self, item: &NewItem) -> RepositoryResult<Item> {
        use crate::schema::items;

        let mut conn = self.conn()?;

        conn.immediate_transaction(|conn| {
            check_references(conn, item)?;
            let row = diesel::insert_into(items::table)
                .values(DbNewItem::from(item))
                .get_result::<DbItem>(conn)?;
            let created: Item = row.try_into()?;
            Ok(created)
        })
    }

    fn update_item(&self, id: ItemId, item: &NewItem) -> RepositoryResult<Item> {
        use crate::schema::items;

        let mut conn = self.conn()?;

        conn.immediate_transaction(|conn| {
            check_references(conn, item)?;
            let row = diesel::update(items::table.find(id.get()))
                .set(DbNewItem::from(item))
                .get_result::<DbItem>(conn)
                .optional()?
                .ok_or_else(|| RepositoryError::not_found(EntityKind::Item, id))?;
            let updated: Item = row.try_into()?;
            Ok(updated)
        })
    }

    fn delete_item(&self, id: ItemId) -> RepositoryResult<usize> {
        use crate::schema::items;

        let mut conn = self.conn()?;

        let affected = diesel::delete(items::table.find(id.get())).execute(&mut conn)?;
        Ok(affected)
    }
}
