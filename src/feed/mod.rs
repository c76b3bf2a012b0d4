//! The notification feed: remote-first with a durable local fallback, so the
//! bell keeps working while the backend is down.

pub mod storage;
pub mod store;

pub use storage::FeedStorage;
pub use store::NotificationFeed;

use async_trait::async_trait;

use crate::models::{NewNotification, Notification};

/// What the feed needs from the backend. `ApiClient` implements this against
/// the real service; tests swap in an in-memory double.
#[async_trait]
pub trait NotificationBackend: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<Vec<Notification>>;
    async fn create(&self, new: &NewNotification) -> anyhow::Result<Notification>;
    async fn mark_read(&self, id: &str) -> anyhow::Result<()>;
    async fn mark_all_read(&self) -> anyhow::Result<()>;
    async fn delete(&self, id: &str) -> anyhow::Result<()>;
    async fn clear_all(&self) -> anyhow::Result<()>;
}

/// Published on the feed's broadcast channel after each state change, in the
/// order the changes were applied.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    Added(Notification),
    MarkedRead(String),
    MarkedAllRead,
    Deleted(String),
    Cleared,
    /// An optimistic change was undone after the backend refused it.
    RolledBack,
}
