//! Search parameters: validated page, limit, sort criteria and filter
//!
//! [`SearchParams`] is built once per search request from raw, possibly
//! attacker-controlled input and is immutable afterwards.
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog::search::{SearchParams, SortCriterion};
//!
//! // From a JSON body or decoded query string
//! let params: SearchParams = SearchParams::from_value(&json!({
//!     "page": "2",
//!     "limit": 10,
//!     "sort_criteria": [{"field": "name", "direction": "DESC"}],
//!     "filter": "drama",
//! }))?;
//!
//! // Typed
//! let params: SearchParams = SearchParams::builder()
//!     .page(2)
//!     .limit(10)
//!     .sort(SortCriterion::desc("name"))
//!     .filter("drama")
//!     .build()?;
//! ```

use crate::core::error::ValidationError;
use crate::search::coerce::{coerce_filter_text, coerce_positive_int};
use crate::search::sort::{SortCriterion, normalize_sort_criteria};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Page used when the requested page is missing or invalid
pub const DEFAULT_PAGE: usize = 1;

/// Page size used when the requested limit is missing or invalid
pub const DEFAULT_LIMIT: usize = 15;

/// Filter shape accepted by a repository.
///
/// `from_raw` must never fail: input it cannot use means "no filter".
/// `validate` is the hook for rules specific to an aggregate (e.g. a filter
/// that only accepts known enum values); it runs once the params are built.
pub trait SearchFilter: Clone + fmt::Debug + Send + Sync + 'static {
    fn from_raw(raw: &Value) -> Option<Self>;

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl SearchFilter for String {
    fn from_raw(raw: &Value) -> Option<Self> {
        coerce_filter_text(raw)
    }
}

/// Raw search input, typically deserialized from a query string or body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchInput {
    pub page: Value,

    #[serde(alias = "per_page")]
    pub limit: Value,

    #[serde(alias = "sortCriteria")]
    pub sort_criteria: Value,

    pub filter: Value,
}

/// Immutable, sanitized search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams<F = String> {
    page: usize,
    limit: usize,
    sort_criteria: Vec<SortCriterion>,
    filter: Option<F>,
}

impl<F: SearchFilter> Default for SearchParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: SearchFilter> SearchParams<F> {
    /// Defaults: page 1, limit 15, no sort, no filter
    pub fn new() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort_criteria: Vec::new(),
            filter: None,
        }
    }

    pub fn builder() -> SearchParamsBuilder<F> {
        SearchParamsBuilder::new()
    }

    /// Build from raw input; fails only if the filter's own rules reject it
    pub fn from_input(input: SearchInput) -> Result<Self, ValidationError> {
        Self::builder()
            .page(input.page)
            .limit(input.limit)
            .sort_value(&input.sort_criteria)
            .filter(input.filter)
            .build()
    }

    /// Build from an arbitrary JSON value; non-objects give the defaults
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        // Sequences would otherwise deserialize positionally into the fields
        let input = match value {
            Value::Object(_) => {
                serde_json::from_value::<SearchInput>(value.clone()).unwrap_or_default()
            }
            _ => SearchInput::default(),
        };
        Self::from_input(input)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Criteria in tie-break priority order; empty when none were given
    pub fn sort_criteria(&self) -> &[SortCriterion] {
        &self.sort_criteria
    }

    pub fn has_sort(&self) -> bool {
        !self.sort_criteria.is_empty()
    }

    pub fn filter(&self) -> Option<&F> {
        self.filter.as_ref()
    }

    /// Number of items skipped before the current page
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Sort criteria in their external shape: `null`, a single object, or
    /// an array when more than one criterion survived normalization
    pub fn sort_criteria_value(&self) -> Value {
        match self.sort_criteria.as_slice() {
            [] => Value::Null,
            [single] => single.to_value(),
            many => Value::Array(many.iter().map(SortCriterion::to_value).collect()),
        }
    }
}

/// Collects raw values and sanitizes them in [`SearchParamsBuilder::build`]
#[derive(Debug, Clone)]
pub struct SearchParamsBuilder<F> {
    page: Value,
    limit: Value,
    sort_criteria: Vec<SortCriterion>,
    filter: Option<F>,
}

impl<F: SearchFilter> Default for SearchParamsBuilder<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: SearchFilter> SearchParamsBuilder<F> {
    pub fn new() -> Self {
        Self {
            page: Value::Null,
            limit: Value::Null,
            sort_criteria: Vec::new(),
            filter: None,
        }
    }

    pub fn page(mut self, page: impl Into<Value>) -> Self {
        self.page = page.into();
        self
    }

    pub fn limit(mut self, limit: impl Into<Value>) -> Self {
        self.limit = limit.into();
        self
    }

    /// Append one typed criterion
    pub fn sort(mut self, criterion: SortCriterion) -> Self {
        self.sort_criteria.push(criterion);
        self
    }

    /// Append typed criteria in priority order
    pub fn sort_by(mut self, criteria: impl IntoIterator<Item = SortCriterion>) -> Self {
        self.sort_criteria.extend(criteria);
        self
    }

    /// Append raw criteria (one object or an array of objects)
    pub fn sort_value(mut self, raw: &Value) -> Self {
        self.sort_criteria.extend(normalize_sort_criteria(raw));
        self
    }

    /// Raw filter, coerced by the filter type
    pub fn filter(mut self, raw: impl Into<Value>) -> Self {
        self.filter = F::from_raw(&raw.into());
        self
    }

    /// Already typed filter
    pub fn filter_with(mut self, filter: Option<F>) -> Self {
        self.filter = filter;
        self
    }

    pub fn build(self) -> Result<SearchParams<F>, ValidationError> {
        let params = SearchParams {
            page: coerce_positive_int(&self.page).unwrap_or(DEFAULT_PAGE),
            limit: coerce_positive_int(&self.limit).unwrap_or(DEFAULT_LIMIT),
            sort_criteria: self
                .sort_criteria
                .into_iter()
                .filter_map(SortCriterion::normalize)
                .collect(),
            filter: self.filter,
        };

        if let Some(filter) = &params.filter {
            filter.validate()?;
        }

        Ok(params)
    }
}
