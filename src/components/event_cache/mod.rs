//! Local event cache.
//!
//! The whole collection is one JSON array under `skasc_events` in durable
//! storage; every operation reads it, changes it and writes it back. The most
//! recently saved event is mirrored into transient storage as the current
//! selection, which is never refreshed by later updates or deletes.

pub mod models;

pub use models::{generate_event_id, EventRecord, EventRecordBuilder};

use crate::components::session::Session;
use crate::components::storage::keys;
use crate::error::{not_found_error, ClientResult};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

/// CRUD over the cached event collection
#[derive(Debug, Clone)]
pub struct EventCache {
    session: Arc<Session>,
}

impl EventCache {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Fill defaults, append, select the event and return its id
    pub async fn save_event(&self, event: impl Into<EventRecordBuilder>) -> ClientResult<String> {
        let result = self.try_save_event(event.into()).await;
        if let Err(e) = &result {
            error!("Error saving event: {}", e);
        }
        result
    }

    async fn try_save_event(&self, builder: EventRecordBuilder) -> ClientResult<String> {
        let mut events = self.load_events().await?;

        let hint = self.session.event_type_hint().await?;
        let record = builder.build(hint.as_deref());
        let id = record.id.clone();

        events.push(record.clone());
        self.store_events(&events).await?;

        let transient = self.session.transient();
        transient
            .set(keys::SELECTED_EVENT, &serde_json::to_string(&record)?)
            .await?;
        transient.set(keys::SELECTED_EVENT_ID, &id).await?;

        info!("Event saved: {}", id);
        Ok(id)
    }

    /// Every cached event in insertion order; empty when nothing is stored
    pub async fn get_all_events(&self) -> ClientResult<Vec<EventRecord>> {
        let events = self.load_events().await.inspect_err(|e| {
            error!("Error getting events: {}", e);
        })?;
        debug!("Retrieved {} events", events.len());
        Ok(events)
    }

    /// First event with `id`
    pub async fn get_event_by_id(&self, id: &str) -> ClientResult<Option<EventRecord>> {
        let events = self.get_all_events().await?;
        Ok(events.into_iter().find(|event| event.id == id))
    }

    /// Shallow-merge `partial` onto the first event with `id`
    ///
    /// Returns the merged record, or `Error::NotFound` without touching
    /// storage when no event matches.
    pub async fn update_event(
        &self,
        id: &str,
        partial: Map<String, Value>,
    ) -> ClientResult<EventRecord> {
        let mut events = self.get_all_events().await?;

        let Some(event) = events.iter_mut().find(|event| event.id == id) else {
            debug!("No event {} to update", id);
            return Err(not_found_error(&format!("event {}", id)));
        };

        event.merge(partial);
        let merged = event.clone();

        self.store_events(&events).await.inspect_err(|e| {
            error!("Error updating event: {}", e);
        })?;

        info!("Event updated: {}", id);
        Ok(merged)
    }

    /// Remove every event with `id` and return how many went
    pub async fn delete_event(&self, id: &str) -> ClientResult<usize> {
        let events = self.get_all_events().await?;
        let before = events.len();

        let remaining: Vec<EventRecord> =
            events.into_iter().filter(|event| event.id != id).collect();
        let removed = before - remaining.len();

        self.store_events(&remaining).await.inspect_err(|e| {
            error!("Error deleting event: {}", e);
        })?;

        info!("Deleted {} event(s) with id {}", removed, id);
        Ok(removed)
    }

    /// Drop the whole collection
    pub async fn clear_all_events(&self) -> ClientResult<()> {
        self.session
            .durable()
            .remove(keys::EVENTS)
            .await
            .inspect_err(|e| error!("Error clearing events: {}", e))?;

        info!("Cleared all events");
        Ok(())
    }

    /// Event most recently saved in this session
    pub async fn selected_event(&self) -> ClientResult<Option<EventRecord>> {
        match self.session.transient().get(keys::SELECTED_EVENT).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Id of the event most recently saved in this session
    pub async fn selected_event_id(&self) -> ClientResult<Option<String>> {
        self.session.transient().get(keys::SELECTED_EVENT_ID).await
    }

    async fn load_events(&self) -> ClientResult<Vec<EventRecord>> {
        match self.session.durable().get(keys::EVENTS).await? {
            // A stored `null` reads as an empty collection
            Some(raw) => Ok(serde_json::from_str::<Option<Vec<EventRecord>>>(&raw)?
                .unwrap_or_default()),
            None => Ok(Vec::new()),
        }
    }

    async fn store_events(&self, events: &[EventRecord]) -> ClientResult<()> {
        let json = serde_json::to_string(events)?;
        self.session.durable().set(keys::EVENTS, &json).await
    }
}
