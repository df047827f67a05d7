//! In-process registry of live real-time connections.
//!
//! Each connection owns a bounded outbound queue drained by its socket
//! writer task. Producers only ever `try_send`, so a slow or dead client
//! never holds up a broadcast to anyone else. The registry lives in one
//! process; fanning out across several instances needs an external pub/sub
//! layer.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::Utf8Bytes;
use common::ServerMessage;
use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, warn};
use uuid::Uuid;

pub type ConnectionId = Uuid;

/// Where a connection currently sits in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Connected but not joined to any event. Receives no broadcasts.
    Unscoped,
    Joined {
        event_id: i32,
        participant_id: Option<i32>,
    },
}

/// Outcome of one broadcast. Failures are already logged and counted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

struct Subscriber {
    scope: Scope,
    tx: mpsc::Sender<Utf8Bytes>,
}

pub struct Hub {
    subscribers: DashMap<ConnectionId, Subscriber>,
    queue_capacity: usize,
    delivery_failures: AtomicU64,
}

impl Hub {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            subscribers: DashMap::new(),
            queue_capacity: queue_capacity.max(1),
            delivery_failures: AtomicU64::new(0),
        }
    }

    /// Register a new, unscoped connection and hand back its outbound queue.
    pub fn connect(&self) -> (ConnectionId, mpsc::Receiver<Utf8Bytes>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        self.subscribers.insert(
            id,
            Subscriber {
                scope: Scope::Unscoped,
                tx,
            },
        );
        debug!(connection_id = %id, "Connection registered");
        (id, rx)
    }

    /// Scope a connection to an event, replacing any earlier scope.
    ///
    /// Returns `false` if the connection is not registered.
    pub fn join(&self, id: ConnectionId, event_id: i32, participant_id: Option<i32>) -> bool {
        let Some(mut subscriber) = self.subscribers.get_mut(&id) else {
            return false;
        };
        subscriber.scope = Scope::Joined {
            event_id,
            participant_id,
        };
        debug!(connection_id = %id, event_id, ?participant_id, "Connection joined event");
        true
    }

    /// Return a connection to the unscoped state without closing it.
    pub fn unjoin(&self, id: ConnectionId) -> bool {
        let Some(mut subscriber) = self.subscribers.get_mut(&id) else {
            return false;
        };
        subscriber.scope = Scope::Unscoped;
        true
    }

    /// Deregister a connection. Safe to call more than once.
    pub fn leave(&self, id: ConnectionId) -> bool {
        let removed = self.subscribers.remove(&id).is_some();
        if removed {
            debug!(connection_id = %id, "Connection deregistered");
        }
        removed
    }

    pub fn scope(&self, id: ConnectionId) -> Option<Scope> {
        self.subscribers.get(&id).map(|s| s.scope)
    }

    /// Queue a message for one connection, regardless of its scope.
    pub fn send_to(&self, id: ConnectionId, message: &ServerMessage) -> bool {
        let Some(payload) = encode(message) else {
            return false;
        };
        let Some(subscriber) = self.subscribers.get(&id) else {
            return false;
        };
        let result = subscriber.tx.try_send(payload);
        drop(subscriber);

        match result {
            Ok(()) => true,
            Err(e) => {
                self.record_failure(id, None, message, &e);
                if matches!(e, TrySendError::Closed(_)) {
                    self.leave(id);
                }
                false
            }
        }
    }

    /// Deliver a message to every connection joined to `event_id`.
    ///
    /// Per-connection failures never reach the caller. Connections whose
    /// writer has gone away are deregistered.
    pub fn broadcast(&self, event_id: i32, message: &ServerMessage) -> DeliveryReport {
        let Some(payload) = encode(message) else {
            return DeliveryReport::default();
        };

        let mut report = DeliveryReport::default();
        let mut closed = Vec::new();

        for entry in self.subscribers.iter() {
            if !matches!(entry.scope, Scope::Joined { event_id: e, .. } if e == event_id) {
                continue;
            }
            match entry.tx.try_send(payload.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    self.record_failure(*entry.key(), Some(event_id), message, &e);
                    if matches!(e, TrySendError::Closed(_)) {
                        closed.push(*entry.key());
                    }
                }
            }
        }

        // Removal takes a shard write lock, so it waits until iteration is done.
        for id in closed {
            self.leave(id);
        }

        debug!(
            event_id,
            kind = message.kind(),
            delivered = report.delivered,
            failed = report.failed,
            "Broadcast"
        );
        report
    }

    pub fn connection_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Number of connections currently joined to `event_id`.
    pub fn subscriber_count(&self, event_id: i32) -> usize {
        self.subscribers
            .iter()
            .filter(|s| matches!(s.scope, Scope::Joined { event_id: e, .. } if e == event_id))
            .count()
    }

    /// Total failed deliveries since startup.
    pub fn delivery_failures(&self) -> u64 {
        self.delivery_failures.load(Ordering::Relaxed)
    }

    fn record_failure<T>(
        &self,
        id: ConnectionId,
        event_id: Option<i32>,
        message: &ServerMessage,
        err: &TrySendError<T>,
    ) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
        let reason = match err {
            TrySendError::Full(_) => "queue full",
            TrySendError::Closed(_) => "connection closed",
        };
        warn!(
            connection_id = %id,
            ?event_id,
            kind = message.kind(),
            reason,
            "Delivery failed"
        );
    }
}

fn encode(message: &ServerMessage) -> Option<Utf8Bytes> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Utf8Bytes::from(json)),
        Err(e) => {
            error!(error = %e, kind = message.kind(), "Failed to serialize message");
            None
        }
    }
}
