//! Filter → sort → paginate stages over in-memory collections
//!
//! Each stage is a pure function that takes ownership of the items and
//! returns a new collection, so stages compose and can be tested in
//! isolation.
//!
//! Sorting only ever reads fields through the entity's [`SortField`] table.
//! A criterion naming a field outside that table compares every pair as
//! equal, so client-driven sorting can never reach an undeclared field.

use crate::core::entity::Entity;
use crate::core::field::FieldValue;
use crate::search::params::SearchFilter;
use crate::search::sort::SortCriterion;
use std::cmp::Ordering;
use std::fmt;

/// Named, statically typed accessor for a sortable field
pub struct SortField<E> {
    pub name: &'static str,
    pub accessor: fn(&E) -> FieldValue,
}

impl<E> SortField<E> {
    pub const fn new(name: &'static str, accessor: fn(&E) -> FieldValue) -> Self {
        Self { name, accessor }
    }

    pub fn read(&self, entity: &E) -> FieldValue {
        (self.accessor)(entity)
    }
}

impl<E> Clone for SortField<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for SortField<E> {}

impl<E> fmt::Debug for SortField<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortField").field("name", &self.name).finish()
    }
}

/// An entity the search engine can filter and sort
pub trait Searchable: Entity {
    /// Filter shape accepted by this entity's repositories
    type Filter: SearchFilter;

    /// The sort allow-list, with one accessor per field
    fn sort_fields() -> &'static [SortField<Self>];

    /// Entity-specific filter predicate
    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Ordering applied when the caller supplies no sort criteria
    fn default_sort() -> Vec<SortCriterion> {
        Vec::new()
    }

    /// Names of the fields clients may sort by
    fn sortable_fields() -> Vec<&'static str> {
        Self::sort_fields().iter().map(|f| f.name).collect()
    }

    fn sort_field(name: &str) -> Option<&'static SortField<Self>> {
        Self::sort_fields().iter().find(|f| f.name == name)
    }
}

/// Keep the items matching `filter`; no filter keeps everything as is
pub fn apply_filter<E: Searchable>(items: Vec<E>, filter: Option<&E::Filter>) -> Vec<E> {
    match filter {
        None => items,
        Some(filter) => items.into_iter().filter(|item| item.matches(filter)).collect(),
    }
}

/// Stable multi-criterion sort.
///
/// Criteria are applied left to right, each one only breaking ties left by
/// the previous ones. With no usable criterion the items come back in
/// their original order.
pub fn apply_sort<E: Searchable>(items: Vec<E>, criteria: &[SortCriterion]) -> Vec<E> {
    let resolved: Vec<(&SortCriterion, &SortField<E>)> = criteria
        .iter()
        .filter(|criterion| criterion.is_valid())
        .filter_map(|criterion| match E::sort_field(&criterion.field) {
            Some(field) => Some((criterion, field)),
            None => {
                tracing::debug!(
                    entity_type = E::entity_type(),
                    field = %criterion.field,
                    "Ignoring sort on field outside the allow-list"
                );
                None
            }
        })
        .collect();

    if resolved.is_empty() {
        return items;
    }

    let mut keyed: Vec<(Vec<FieldValue>, E)> = items
        .into_iter()
        .map(|item| {
            let keys = resolved
                .iter()
                .map(|(criterion, field)| criterion.prepare(field.read(&item)))
                .collect();
            (keys, item)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, &resolved));

    keyed.into_iter().map(|(_, item)| item).collect()
}

fn compare_keys<E>(
    a: &[FieldValue],
    b: &[FieldValue],
    resolved: &[(&SortCriterion, &SortField<E>)],
) -> Ordering {
    a.iter()
        .zip(b)
        .zip(resolved)
        .map(|((ka, kb), (criterion, _))| criterion.direction.apply(ka.compare(kb)))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Slice `[(page - 1) * limit, page * limit)`; out of range gives nothing
pub fn apply_pagination<E>(items: Vec<E>, page: usize, limit: usize) -> Vec<E> {
    let offset = page.saturating_sub(1).saturating_mul(limit);
    items.into_iter().skip(offset).take(limit).collect()
}
