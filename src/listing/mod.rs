//! Template listing: the API response format, its HTTP fetch and the name filter.

/// Listing parse, fetch and filter.
pub mod api;

pub use api::{
    DEFAULT_LISTING_API, FALLBACK_DIMENSION, fetch_templates, filter_templates, parse_listing,
};
