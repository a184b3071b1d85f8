//! Change events and the broadcast bus that carries them.
//!
//! Every mutation on the fixture server emits a [`ServerEvent`]. The bus wraps
//! it in an [`EventEnvelope`] (UUIDv7 id, timestamp, entity scope) and fans it
//! out to independent subscribers such as the `/events` SSE stream.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Self-describing wrapper around a [`ServerEvent`].
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    /// UUIDv7, so ids sort by emission time.
    pub event_id: Uuid,
    /// Namespaced event type (e.g. `"job.created"`).
    pub event_type: String,
    pub occurred_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<i64>,
    pub payload_version: u32,
    pub payload: ServerEvent,
}

impl EventEnvelope {
    pub fn new(event: ServerEvent) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event_type: event.namespaced_event_type().to_string(),
            occurred_at: Utc::now(),
            entity_type: event.entity_type().map(String::from),
            entity_id: event.entity_id(),
            payload_version: 1,
            payload: event,
        }
    }
}

/// Domain payloads, serialized with a `type` tag:
/// `{"type":"JobCreated","job_id":7,"title":"Warehouse"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    JobCreated {
        job_id: i64,
        title: String,
    },
    JobUpdated {
        job_id: i64,
        status: String,
    },
    JobDeleted {
        job_id: i64,
    },
    JobsOptimized {
        total_jobs: usize,
        assigned: usize,
    },
    /// A stop group was marked complete from the ops board.
    StopsCompleted {
        truck_id: i64,
        completed: usize,
    },
    /// The next stop group was handed to the driver webhook.
    NextStopsSent {
        truck_id: i64,
        stop_count: usize,
        delivered: bool,
    },
    TruckChanged {
        truck_id: i64,
        deleted: bool,
    },
    ItemChanged {
        item_id: i64,
        deleted: bool,
    },
    CategoryChanged {
        category_id: i64,
        deleted: bool,
    },
}

impl ServerEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ServerEvent::JobCreated { .. } => "JobCreated",
            ServerEvent::JobUpdated { .. } => "JobUpdated",
            ServerEvent::JobDeleted { .. } => "JobDeleted",
            ServerEvent::JobsOptimized { .. } => "JobsOptimized",
            ServerEvent::StopsCompleted { .. } => "StopsCompleted",
            ServerEvent::NextStopsSent { .. } => "NextStopsSent",
            ServerEvent::TruckChanged { .. } => "TruckChanged",
            ServerEvent::ItemChanged { .. } => "ItemChanged",
            ServerEvent::CategoryChanged { .. } => "CategoryChanged",
        }
    }

    pub fn namespaced_event_type(&self) -> &'static str {
        match self {
            ServerEvent::JobCreated { .. } => "job.created",
            ServerEvent::JobUpdated { .. } => "job.updated",
            ServerEvent::JobDeleted { .. } => "job.deleted",
            ServerEvent::JobsOptimized { .. } => "jobs.optimized",
            ServerEvent::StopsCompleted { .. } => "ops.stops_completed",
            ServerEvent::NextStopsSent { .. } => "ops.next_stops_sent",
            ServerEvent::TruckChanged { deleted: true, .. } => "truck.deleted",
            ServerEvent::TruckChanged { .. } => "truck.changed",
            ServerEvent::ItemChanged { deleted: true, .. } => "item.deleted",
            ServerEvent::ItemChanged { .. } => "item.changed",
            ServerEvent::CategoryChanged { deleted: true, .. } => "category.deleted",
            ServerEvent::CategoryChanged { .. } => "category.changed",
        }
    }

    pub fn entity_type(&self) -> Option<&'static str> {
        match self {
            ServerEvent::JobCreated { .. }
            | ServerEvent::JobUpdated { .. }
            | ServerEvent::JobDeleted { .. } => Some("job"),
            ServerEvent::JobsOptimized { .. } => None,
            ServerEvent::StopsCompleted { .. }
            | ServerEvent::NextStopsSent { .. }
            | ServerEvent::TruckChanged { .. } => Some("truck"),
            ServerEvent::ItemChanged { .. } => Some("item"),
            ServerEvent::CategoryChanged { .. } => Some("category"),
        }
    }

    pub fn entity_id(&self) -> Option<i64> {
        match self {
            ServerEvent::JobCreated { job_id, .. }
            | ServerEvent::JobUpdated { job_id, .. }
            | ServerEvent::JobDeleted { job_id } => Some(*job_id),
            ServerEvent::JobsOptimized { .. } => None,
            ServerEvent::StopsCompleted { truck_id, .. }
            | ServerEvent::NextStopsSent { truck_id, .. }
            | ServerEvent::TruckChanged { truck_id, .. } => Some(*truck_id),
            ServerEvent::ItemChanged { item_id, .. } => Some(*item_id),
            ServerEvent::CategoryChanged { category_id, .. } => Some(*category_id),
        }
    }
}

/// Broadcast-based event bus. Lagging subscribers miss events.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers. Dropped silently when nobody listens.
    pub fn emit(&self, event: ServerEvent) {
        let envelope = EventEnvelope::new(event);
        let subscriber_count = self.tx.receiver_count();
        tracing::debug!(
            event_type = %envelope.event_type,
            event_id = %envelope.event_id,
            subscriber_count,
            "EventBus emit"
        );
        let _ = self.tx.send(envelope);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::defaults::EVENT_BUS_CAPACITY)
    }
}
