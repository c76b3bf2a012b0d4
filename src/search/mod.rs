//! Client-side listing search: parse a page query, filter a snapshot,
//! order the result.

pub mod params;
pub mod pipeline;

pub use params::{CountFilter, SearchParams, SortKey};
pub use pipeline::{related, run, sort};
