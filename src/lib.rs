//! Client toolkit for a real-estate brokerage backend: typed REST access,
//! client-side listing search, a notification feed that survives backend
//! outages, and media URL proxying.

pub mod api;
pub mod config;
pub mod feed;
pub mod media;
pub mod models;
pub mod search;

pub use api::{ApiClient, ApiError};
pub use config::Config;
pub use feed::{FeedEvent, NotificationFeed};
pub use media::MediaProxy;
pub use search::{SearchParams, SortKey};
