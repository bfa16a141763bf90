//! Catalog queries: parameter parsing and the pure query engine

pub mod engine;
pub mod params;

pub use engine::{lookup, query, EchoedFilters, EchoedSort, PageMeta, QueryResult};
pub use params::{Bound, QueryParams, SortField, SortOrder, DEFAULT_LIMIT, MAX_LIMIT};
