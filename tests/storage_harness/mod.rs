//! Shared test harness for searchable repository backends
//!
//! Provides fixture builders for the catalog aggregates with deterministic,
//! whole-second timestamps (so every backend round-trips them exactly) and
//! the `searchable_repository_tests!` contract suite.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
mod searchable_repository_tests;

use catalog::catalog::{CastMember, CastMemberType, Category};
use catalog::search::SearchResult;
use chrono::{DateTime, Duration, TimeZone, Utc};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Reference instant fixtures are offset from
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

/// A valid category created `offset` seconds after [`base_time`]
pub fn category_at(name: &str, offset: i64) -> Category {
    let mut category = Category::new(name, None, true).unwrap();
    category.created_at = base_time() + Duration::seconds(offset);
    category
}

/// Categories with strictly increasing creation times, in the given order
pub fn categories(names: &[&str]) -> Vec<Category> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| category_at(name, i as i64))
        .collect()
}

/// A valid cast member created `offset` seconds after [`base_time`]
pub fn cast_member_at(name: &str, member_type: CastMemberType, offset: i64) -> CastMember {
    let mut member = CastMember::new(name, member_type).unwrap();
    member.created_at = base_time() + Duration::seconds(offset);
    member
}

/// `n` categories named `Category 0`..`Category n-1`, oldest first
pub fn category_batch(n: usize) -> Vec<Category> {
    (0..n)
        .map(|i| category_at(&format!("Category {}", i), i as i64))
        .collect()
}

// ---------------------------------------------------------------------------
// Assertion helpers
// ---------------------------------------------------------------------------

/// Names of the categories on a result page, in order
pub fn category_names(result: &SearchResult<Category>) -> Vec<String> {
    result.items.iter().map(|c| c.name.clone()).collect()
}

/// Names of the cast members on a result page, in order
pub fn cast_member_names(result: &SearchResult<CastMember>) -> Vec<String> {
    result.items.iter().map(|m| m.name.clone()).collect()
}

/// Assert the pagination metadata of a result.
pub fn assert_page<E>(
    result: &SearchResult<E>,
    total: usize,
    current_page: usize,
    limit: usize,
    last_page: usize,
) {
    assert_eq!(result.total, total, "unexpected total");
    assert_eq!(result.current_page, current_page, "unexpected current_page");
    assert_eq!(result.limit, limit, "unexpected limit");
    assert_eq!(result.last_page, last_page, "unexpected last_page");
}
