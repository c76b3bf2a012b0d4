use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::broadcast;
use tracing::warn;

use crate::models::{relative_time, NewNotification, Notification, NotificationKind};

use super::storage::{FeedSnapshot, FeedStorage};
use super::{FeedEvent, NotificationBackend};

/// Most records kept when the backend cannot confirm them.
const LOCAL_CAP: usize = 50;
const EVENT_BUFFER: usize = 64;

#[derive(Debug)]
struct FeedState {
    items: Vec<Notification>,
    cleared: bool,
}

/// The notification feed. Reads prefer the backend and fall back to the local
/// cache; writes apply locally first and roll back if the backend refuses
/// them. Every change lands on disk and on the event channel.
pub struct NotificationFeed {
    backend: Arc<dyn NotificationBackend>,
    storage: FeedStorage,
    state: Mutex<FeedState>,
    events: broadcast::Sender<FeedEvent>,
}

impl NotificationFeed {
    /// Open the feed on top of a persisted snapshot.
    pub fn open(backend: Arc<dyn NotificationBackend>, storage: FeedStorage) -> Result<Self> {
        let snapshot = storage.load()?;
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Ok(Self {
            backend,
            storage,
            state: Mutex::new(FeedState {
                items: snapshot.items,
                cleared: snapshot.cleared,
            }),
            events,
        })
    }

    /// Receive every feed change from this point on. Events arrive in the
    /// order the changes were applied; nothing is replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.events.subscribe()
    }

    /// Unread records in the current cache, without touching the backend.
    pub fn unread_count(&self) -> usize {
        self.lock().items.iter().filter(|n| !n.read).count()
    }

    /// The cached records with their display ages recomputed.
    pub fn snapshot(&self) -> Vec<Notification> {
        let mut items = self.lock().items.clone();
        refresh_ages(&mut items);
        items
    }

    /// Refresh from the backend. When it is unreachable the local cache is
    /// served instead, unless the feed was cleared, in which case it stays
    /// empty until the backend has content again.
    pub async fn fetch_all(&self) -> Result<Vec<Notification>> {
        match self.backend.fetch().await {
            Ok(mut remote) => {
                refresh_ages(&mut remote);
                let mut state = self.lock();
                if !remote.is_empty() {
                    state.cleared = false;
                }
                state.items = remote.clone();
                self.persist(&state)?;
                Ok(remote)
            }
            Err(e) => {
                warn!(error = %e, "Notification fetch failed; serving local cache");
                let state = self.lock();
                if state.cleared {
                    return Ok(Vec::new());
                }
                let mut items = state.items.clone();
                drop(state);
                refresh_ages(&mut items);
                Ok(items)
            }
        }
    }

    /// Record a notification. If the backend cannot persist it, a `local-`
    /// record attributed to "System" is kept instead so the event is not
    /// lost.
    pub async fn add(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        entity_id: Option<String>,
        entity_name: Option<String>,
    ) -> Result<Notification> {
        let message = message.into();
        let new = NewNotification {
            kind,
            message: message.clone(),
            entity_id: entity_id.clone(),
            entity_name: entity_name.clone(),
        };
        let mut record = match self.backend.create(&new).await {
            Ok(created) => created,
            Err(e) => {
                warn!(error = %e, "Backend create failed; keeping notification locally");
                Notification::local(kind, message, entity_id, entity_name)
            }
        };
        record.time_ago = relative_time(record.created_at, Utc::now());
        {
            let mut state = self.lock();
            state.items.insert(0, record.clone());
            state.items.truncate(LOCAL_CAP);
            // A fresh record means the feed has content again.
            state.cleared = false;
            self.persist(&state)?;
        }
        self.publish(FeedEvent::Added(record.clone()));
        Ok(record)
    }

    /// Mark one record read. The flip is applied and persisted immediately;
    /// if the backend then refuses it, the record flips back and the error
    /// is returned.
    pub async fn mark_read(&self, id: &str) -> Result<()> {
        let is_local = {
            let mut state = self.lock();
            let item = state
                .items
                .iter_mut()
                .find(|n| n.id == id)
                .with_context(|| format!("no notification with id {id}"))?;
            if item.read {
                return Ok(());
            }
            item.read = true;
            let is_local = item.is_local();
            self.persist(&state)?;
            is_local
        };
        self.publish(FeedEvent::MarkedRead(id.to_string()));
        // Records the backend never saw have nothing to confirm.
        if is_local {
            return Ok(());
        }
        if let Err(e) = self.backend.mark_read(id).await {
            {
                let mut state = self.lock();
                if let Some(item) = state.items.iter_mut().find(|n| n.id == id) {
                    item.read = false;
                }
                self.persist(&state)?;
            }
            self.publish(FeedEvent::RolledBack);
            return Err(e.context(format!("backend rejected mark-read for {id}; change rolled back")));
        }
        Ok(())
    }

    /// Mark everything read. On backend failure only the records the backend
    /// owns flip back; local records stay read.
    pub async fn mark_all_read(&self) -> Result<()> {
        let remote_flips: Vec<String> = {
            let mut state = self.lock();
            let mut flips = Vec::new();
            let mut changed = false;
            for item in &mut state.items {
                if !item.read {
                    item.read = true;
                    changed = true;
                    if !item.is_local() {
                        flips.push(item.id.clone());
                    }
                }
            }
            if !changed {
                return Ok(());
            }
            self.persist(&state)?;
            flips
        };
        self.publish(FeedEvent::MarkedAllRead);
        if remote_flips.is_empty() {
            return Ok(());
        }
        if let Err(e) = self.backend.mark_all_read().await {
            {
                let mut state = self.lock();
                for item in &mut state.items {
                    if remote_flips.contains(&item.id) {
                        item.read = false;
                    }
                }
                self.persist(&state)?;
            }
            self.publish(FeedEvent::RolledBack);
            return Err(e.context("backend rejected mark-all-read; change rolled back"));
        }
        Ok(())
    }

    /// Remove one record. If the backend refuses, the record returns to its
    /// old position.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let (position, removed) = {
            let mut state = self.lock();
            let position = state
                .items
                .iter()
                .position(|n| n.id == id)
                .with_context(|| format!("no notification with id {id}"))?;
            let removed = state.items.remove(position);
            self.persist(&state)?;
            (position, removed)
        };
        self.publish(FeedEvent::Deleted(id.to_string()));
        if removed.is_local() {
            return Ok(());
        }
        if let Err(e) = self.backend.delete(id).await {
            {
                let mut state = self.lock();
                let at = position.min(state.items.len());
                state.items.insert(at, removed);
                self.persist(&state)?;
            }
            self.publish(FeedEvent::RolledBack);
            return Err(e.context(format!("backend rejected delete for {id}; record restored")));
        }
        Ok(())
    }

    /// Empty the feed. The local clear always succeeds; a backend failure is
    /// only logged, and the persisted cleared flag keeps the feed empty until
    /// the backend has content again.
    pub async fn clear_all(&self) -> Result<()> {
        if let Err(e) = self.backend.clear_all().await {
            warn!(error = %e, "Backend clear-all failed; cleared flag will keep the feed empty");
        }
        {
            let mut state = self.lock();
            state.items.clear();
            state.cleared = true;
            self.persist(&state)?;
        }
        self.publish(FeedEvent::Cleared);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn persist(&self, state: &FeedState) -> Result<()> {
        self.storage
            .save(&FeedSnapshot::current(state.cleared, state.items.clone()))
    }

    fn publish(&self, event: FeedEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn refresh_ages(items: &mut [Notification]) {
    let now = Utc::now();
    for item in items {
        item.time_ago = relative_time(item.created_at, now);
    }
}
