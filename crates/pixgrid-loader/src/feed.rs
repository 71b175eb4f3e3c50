#![forbid(unsafe_code)]

//! Realtime change feed.
//!
//! The hosted store pushes one payload per row change. A
//! [`ChangePublisher`] (held by the transport callback) decodes and forwards
//! them; the [`ChangeFeed`] (held by the index owner) drains them in arrival
//! order. Events are never reordered or coalesced.
//!
//! # Payload Format
//!
//! ```json
//! { "eventType": "INSERT" | "UPDATE" | "DELETE",
//!   "new": { ...cell row... },
//!   "old": { "x": 3, "y": 4, ... } }
//! ```
//!
//! Inserts and updates carry the row in `new`; deletes carry at least the
//! coordinates in `old`.

use std::sync::mpsc;

use pixgrid_index::Cell;
use serde::Deserialize;

use crate::error::{LoadError, Result};

/// One row change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// Row inserted or updated.
    Upsert(Cell),
    /// Row deleted.
    Delete {
        /// Column of the deleted row.
        x: i32,
        /// Row of the deleted row.
        y: i32,
    },
}

impl ChangeEvent {
    /// Decode a realtime payload.
    pub fn from_json(payload: &str) -> Result<Self> {
        let raw: RawPayload = serde_json::from_str(payload)?;
        Self::from_raw(raw)
    }

    /// Decode an already-parsed realtime payload.
    pub fn from_value(payload: serde_json::Value) -> Result<Self> {
        let raw: RawPayload = serde_json::from_value(payload)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawPayload) -> Result<Self> {
        match raw.event_type {
            EventType::Insert | EventType::Update => {
                Ok(Self::Upsert(serde_json::from_value(raw.new)?))
            }
            EventType::Delete => {
                let key: DeletedKey = serde_json::from_value(raw.old)?;
                Ok(Self::Delete { x: key.x, y: key.y })
            }
        }
    }

    /// Short stable name for logs.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Upsert(_) => "upsert",
            Self::Delete { .. } => "delete",
        }
    }
}

#[derive(Deserialize)]
struct RawPayload {
    #[serde(rename = "eventType")]
    event_type: EventType,
    #[serde(default)]
    new: serde_json::Value,
    #[serde(default)]
    old: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "UPPERCASE")]
enum EventType {
    Insert,
    Update,
    Delete,
}

#[derive(Deserialize)]
struct DeletedKey {
    x: i32,
    y: i32,
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// Create a connected publisher / feed pair.
pub fn channel() -> (ChangePublisher, ChangeFeed) {
    let (tx, rx) = mpsc::channel();
    (
        ChangePublisher { tx },
        ChangeFeed {
            rx,
            disconnected: false,
        },
    )
}

/// Sending half, cloneable, usable from any thread.
#[derive(Debug, Clone)]
pub struct ChangePublisher {
    tx: mpsc::Sender<ChangeEvent>,
}

impl ChangePublisher {
    /// Forward an event.
    pub fn publish(&self, event: ChangeEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| LoadError::Disconnected)
    }

    /// Decode a realtime payload and forward it.
    ///
    /// Undecodable payloads are returned as errors and not forwarded.
    pub fn publish_json(&self, payload: &str) -> Result<()> {
        self.publish(ChangeEvent::from_json(payload)?)
    }
}

/// Receiving half, owned by whoever owns the index.
#[derive(Debug)]
pub struct ChangeFeed {
    rx: mpsc::Receiver<ChangeEvent>,
    disconnected: bool,
}

impl ChangeFeed {
    /// Next event, if one is queued.
    pub fn try_next(&mut self) -> Option<ChangeEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.disconnected = true;
                None
            }
        }
    }

    /// Every queued event, in arrival order.
    pub fn drain(&mut self) -> Vec<ChangeEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Whether every publisher has been dropped and the queue ran dry.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}
