//! Topology and naming rules for categories.

use crate::domain::category::Category;
use crate::domain::types::{CategoryId, CategoryName};

use super::{CategoryGraph, ConstraintViolation, EntityKind, HierarchyError, ensure_acyclic};

/// A category about to be created or updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCandidate<'a> {
    pub id: Option<CategoryId>,
    pub name: &'a CategoryName,
    pub parent_id: Option<CategoryId>,
}

/// Checks that `candidate` keeps the category graph acyclic and its name
/// unique under its parent.
pub fn validate_category<G>(candidate: &CategoryCandidate<'_>, graph: &mut G) -> Result<(), G::Error>
where
    G: CategoryGraph,
{
    if let Some(id) = candidate.id.filter(|id| candidate.parent_id == Some(*id)) {
        return Err(HierarchyError::cycle(EntityKind::Category, id).into());
    }

    ensure_acyclic(
        EntityKind::Category,
        candidate.id,
        candidate.parent_id,
        |id| graph.category_parent(id),
    )?;

    ensure_unique_category_name(candidate, graph)
}

/// Rejects `candidate` when another category already uses its name under
/// the same parent. The candidate itself does not count as a clash.
pub fn ensure_unique_category_name<G>(
    candidate: &CategoryCandidate<'_>,
    graph: &mut G,
) -> Result<(), G::Error>
where
    G: CategoryGraph,
{
    match graph.category_named(candidate.name, candidate.parent_id)? {
        Some(existing) if Some(existing) != candidate.id => Err(HierarchyError::from(
            ConstraintViolation::DuplicateCategoryName {
                name: candidate.name.to_string(),
                parent: candidate.parent_id,
            },
        )
        .into()),
        _ => Ok(()),
    }
}

/// Checks that the children of `deleted` can be lifted to the top level
/// once it goes away. Siblings never clash with each other and `deleted`
/// itself no longer counts, so only the other top-level names matter.
pub fn ensure_orphans_fit_top_level<G>(
    deleted: CategoryId,
    children: &[Category],
    graph: &mut G,
) -> Result<(), G::Error>
where
    G: CategoryGraph,
{
    for child in children {
        match graph.category_named(&child.name, None)? {
            Some(existing) if existing != deleted && existing != child.id => {
                return Err(HierarchyError::from(ConstraintViolation::DuplicateCategoryName {
                    name: child.name.to_string(),
                    parent: None,
                })
                .into());
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::category::NewCategory;

    #[derive(Default)]
    struct Categories(HashMap<i32, (String, Option<i32>)>);

    impl Categories {
        fn with(mut self, id: i32, name: &str, parent: Option<i32>) -> Self {
            self.0.insert(id, (name.to_string(), parent));
            self
        }
    }

    impl CategoryGraph for Categories {
        type Error = HierarchyError;

        fn category_parent(
            &mut self,
            id: CategoryId,
        ) -> Result<Option<Option<CategoryId>>, Self::Error> {
            Ok(self.0.get(&id.get()).map(|(_, parent)| {
                parent.map(|parent| CategoryId::new(parent).unwrap())
            }))
        }

        fn category_named(
            &mut self,
            name: &CategoryName,
            parent: Option<CategoryId>,
        ) -> Result<Option<CategoryId>, Self::Error> {
            let parent = parent.map(CategoryId::get);
            Ok(self
                .0
                .iter()
                .filter(|(_, (n, p))| n == name.as_str() && *p == parent)
                .map(|(id, _)| CategoryId::new(*id).unwrap())
                .min())
        }
    }

    fn id(value: i32) -> CategoryId {
        CategoryId::new(value).unwrap()
    }

    fn check(
        graph: &mut Categories,
        own: Option<i32>,
        name: &str,
        parent: Option<i32>,
    ) -> Result<(), HierarchyError> {
        let name = CategoryName::new(name).unwrap();
        let candidate = CategoryCandidate {
            id: own.map(id),
            name: &name,
            parent_id: parent.map(id),
        };
        validate_category(&candidate, graph)
    }

    #[test]
    fn duplicate_top_level_name_is_rejected() {
        let mut graph = Categories::default().with(1, "Electronics", None);
        assert_eq!(
            check(&mut graph, None, "Electronics", None),
            Err(ConstraintViolation::DuplicateCategoryName {
                name: "Electronics".into(),
                parent: None,
            }
            .into())
        );
    }

    #[test]
    fn same_name_under_other_parent_is_accepted() {
        let mut graph = Categories::default()
            .with(1, "Electronics", None)
            .with(2, "Garage", None);
        assert!(check(&mut graph, None, "Electronics", Some(2)).is_ok());
    }

    #[test]
    fn renaming_to_own_name_is_not_a_clash() {
        let mut graph = Categories::default().with(1, "Electronics", None);
        assert!(check(&mut graph, Some(1), "Electronics", None).is_ok());
    }

    #[test]
    fn self_parent_is_rejected_for_unsaved_category() {
        let mut graph = Categories::default();
        assert_eq!(
            check(&mut graph, Some(4), "Tools", Some(4)),
            Err(HierarchyError::cycle(EntityKind::Category, 4))
        );
    }

    #[test]
    fn parenting_under_descendant_is_rejected() {
        let mut graph = Categories::default()
            .with(1, "Home", None)
            .with(2, "Kitchen", Some(1))
            .with(3, "Knives", Some(2));
        assert_eq!(
            check(&mut graph, Some(1), "Home", Some(3)),
            Err(HierarchyError::cycle(EntityKind::Category, 1))
        );
    }

    #[test]
    fn missing_parent_is_not_found() {
        let mut graph = Categories::default();
        assert_eq!(
            check(&mut graph, None, "Tools", Some(9)),
            Err(HierarchyError::not_found(EntityKind::Category, 9))
        );
    }

    #[test]
    fn orphan_clashing_with_top_level_name_is_rejected() {
        let mut graph = Categories::default()
            .with(1, "Cables", None)
            .with(2, "Garage", None)
            .with(3, "Cables", Some(2));
        let now = chrono::Utc::now().naive_utc();
        let orphan = NewCategory::new(CategoryName::new("Cables").unwrap(), Some(id(2)), now)
            .into_category(id(3));

        assert_eq!(
            ensure_orphans_fit_top_level(id(2), &[orphan], &mut graph),
            Err(ConstraintViolation::DuplicateCategoryName {
                name: "Cables".into(),
                parent: None,
            }
            .into())
        );
    }

    #[test]
    fn orphan_may_take_the_name_of_its_deleted_parent() {
        let mut graph = Categories::default()
            .with(1, "Cables", None)
            .with(2, "Cables", Some(1));
        let now = chrono::Utc::now().naive_utc();
        let orphan = NewCategory::new(CategoryName::new("Cables").unwrap(), Some(id(1)), now)
            .into_category(id(2));

        assert!(ensure_orphans_fit_top_level(id(1), &[orphan], &mut graph).is_ok());
    }

    #[test]
    fn cycle_is_reported_before_duplicate_name() {
        let mut graph = Categories::default()
            .with(1, "A", None)
            .with(2, "A", Some(1));
        assert!(matches!(
            check(&mut graph, Some(1), "A", Some(2)),
            Err(HierarchyError::Cycle { .. })
        ));
    }
}
