//! Generic search engine: sort criteria, search params, results and the
//! in-memory filter → sort → paginate pipeline

pub mod coerce;
pub mod params;
pub mod pipeline;
pub mod result;
pub mod sort;

pub use params::{DEFAULT_LIMIT, DEFAULT_PAGE, SearchFilter, SearchInput, SearchParams};
pub use pipeline::{Searchable, SortField, apply_filter, apply_pagination, apply_sort};
pub use result::SearchResult;
pub use sort::{
    SortCriterion, SortDirection, SortTransform, normalize_sort_criteria, normalize_sort_criterion,
};
