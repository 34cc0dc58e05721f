use chrono::Utc;
use diesel::prelude::*;

use crate::domain::category::{Category, CategoryUpdate, NewCategory};
use crate::domain::types::{CategoryId, CategoryName};
use crate::hierarchy::{
    CategoryCandidate, CategoryGraph, EntityKind, ensure_orphans_fit_top_level, validate_category,
};
use crate::models::category::{
    Category as DbCategory, CategoryChangeset, NewCategory as DbNewCategory,
};
use crate::repository::{
    CategoryReader, CategoryWriter, DieselRepository, RepositoryError, RepositoryResult, TxGraph,
    tx_graph,
};

pub(super) fn find_category(
    conn: &mut SqliteConnection,
    id: CategoryId,
) -> RepositoryResult<Option<Category>> {
    use crate::schema::categories;

    let category = categories::table
        .find(id.get())
        .first::<DbCategory>(conn)
        .optional()?;

    Ok(category.map(TryInto::try_into).transpose()?)
}

fn find_named(
    conn: &mut SqliteConnection,
    name: &CategoryName,
    parent_id: Option<CategoryId>,
) -> RepositoryResult<Option<Category>> {
    use crate::schema::categories;

    let mut query = categories::table
        .filter(categories::name.eq(name.as_str()))
        .into_boxed();
    query = match parent_id {
        Some(parent_id) => query.filter(categories::parent_id.eq(Some(parent_id.get()))),
        None => query.filter(categories::parent_id.is_null()),
    };

    let category = query
        .order(categories::id.asc())
        .first::<DbCategory>(conn)
        .optional()?;

    Ok(category.map(TryInto::try_into).transpose()?)
}

fn load_categories(
    query: crate::schema::categories::BoxedQuery<'_, diesel::sqlite::Sqlite>,
    conn: &mut SqliteConnection,
) -> RepositoryResult<Vec<Category>> {
    use crate::schema::categories;

    let items = query
        .order(categories::id.asc())
        .load::<DbCategory>(conn)?
        .into_iter()
        .map(TryInto::try_into)
        .collect::<Result<Vec<Category>, _>>()?;

    Ok(items)
}

impl CategoryGraph for TxGraph<'_> {
    type Error = RepositoryError;

    fn category_parent(
        &mut self,
        id: CategoryId,
    ) -> RepositoryResult<Option<Option<CategoryId>>> {
        Ok(find_category(self.conn, id)?.map(|category| category.parent_id))
    }

    fn category_named(
        &mut self,
        name: &CategoryName,
        parent: Option<CategoryId>,
    ) -> RepositoryResult<Option<CategoryId>> {
        Ok(find_named(self.conn, name, parent)?.map(|category| category.id))
    }
}

impl CategoryReader for DieselRepository {
    fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;
        load_categories(categories::table.into_boxed(), &mut conn)
    }

    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        let mut conn = self.conn()?;
        find_category(&mut conn, id)
    }

    fn list_subcategories(&self, parent_id: CategoryId) -> RepositoryResult<Vec<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;
        let query = categories::table
            .filter(categories::parent_id.eq(Some(parent_id.get())))
            .into_boxed();
        load_categories(query, &mut conn)
    }

    fn list_top_level_categories(&self) -> RepositoryResult<Vec<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;
        let query = categories::table
            .filter(categories::parent_id.is_null())
            .into_boxed();
        load_categories(query, &mut conn)
    }

    fn find_category_by_name(
        &self,
        name: &CategoryName,
        parent_id: Option<CategoryId>,
    ) -> RepositoryResult<Option<Category>> {
        let mut conn = self.conn()?;
        find_named(&mut conn, name, parent_id)
    }
}

impl CategoryWriter for DieselRepository {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        conn.immediate_transaction(|conn| {
            if let Some(id) = category.id {
                if find_category(conn, id)?.is_some() {
                    return Err(RepositoryError::Conflict {
                        entity: EntityKind::Category,
                        id: id.get(),
                    });
                }
            }

            let candidate = CategoryCandidate {
                id: category.id,
                name: &category.name,
                parent_id: category.parent_id,
            };
            validate_category(&candidate, &mut tx_graph(conn))?;

            let row = diesel::insert_into(categories::table)
                .values(DbNewCategory::from(category))
                .get_result::<DbCategory>(conn)?;
            let created: Category = row.try_into()?;
            Ok(created)
        })
    }

    fn update_category(
        &self,
        id: CategoryId,
        update: &CategoryUpdate,
    ) -> RepositoryResult<Category> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        conn.immediate_transaction(|conn| {
            if find_category(conn, id)?.is_none() {
                return Err(RepositoryError::not_found(EntityKind::Category, id));
            }

            let candidate = CategoryCandidate {
                id: Some(id),
                name: &update.name,
                parent_id: update.parent_id,
            };
            validate_category(&candidate, &mut tx_graph(conn))?;

            let changeset = CategoryChangeset::new(update, Utc::now().naive_utc());
            let row = diesel::update(categories::table.find(id.get()))
                .set(changeset)
                .get_result::<DbCategory>(conn)?;
            let updated: Category = row.try_into()?;
            Ok(updated)
        })
    }

    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize> {
        use crate::schema::{categories, items};

        let mut conn = self.conn()?;

        conn.immediate_transaction(|conn| {
            let children = load_categories(
                categories::table
                    .filter(categories::parent_id.eq(Some(id.get())))
                    .into_boxed(),
                conn,
            )?;
            ensure_orphans_fit_top_level(id, &children, &mut tx_graph(conn))?;

            diesel::update(items::table.filter(items::category_id.eq(Some(id.get()))))
                .set(items::category_id.eq(None::<i32>))
                .execute(conn)?;

            // The parent row goes first so an orphan may take its top-level name.
            let affected = diesel::delete(categories::table.find(id.get())).execute(conn)?;

            let orphans: Vec<i32> = children.iter().map(|child| child.id.get()).collect();
            diesel::update(categories::table.filter(categories::id.eq_any(&orphans)))
                .set((
                    categories::parent_id.eq(None::<i32>),
                    categories::updated_at.eq(diesel::dsl::now),
                ))
                .execute(conn)?;

            Ok(affected)
        })
    }
}
