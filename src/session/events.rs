use crate::api::models::{ItemDetail, Section, TrailProgress};
use crate::session::sync::ItemProgressRecord;
use crate::session::watch::WatchState;
use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};
use tokio::sync::mpsc as tokio_mpsc;
use tracing::debug;

type SubscriptionId = u64;

/// Events emitted by a lesson session over its lifetime
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Initial fetches in flight
    Loading,
    /// Sidebar, aggregate and item detail are available
    Loaded {
        sections: Vec<Section>,
        progress: TrailProgress,
        detail: ItemDetail,
    },
    LoadFailed {
        message: String,
    },
    /// Embed reported ready; rates and volume snapshot taken exactly once
    PlayerReady {
        rates: Vec<f64>,
        volume: u8,
        muted: bool,
    },
    WatchUpdated {
        watch: WatchState,
        watched_percent: f64,
        can_mark_complete: bool,
    },
    /// A progress write is in flight (or all writes settled)
    Saving {
        active: bool,
    },
    /// A periodic push was accepted by the backend
    ProgressPushed {
        record: ItemProgressRecord,
    },
    /// Aggregate re-fetched after an explicit completion
    AggregateRefreshed {
        progress: TrailProgress,
    },
    /// Playback reached the end of the video
    Ended,
}

struct Subscription {
    tx: tokio_mpsc::UnboundedSender<SessionEvent>,
}

/// Handle for subscribing to session events.
///
/// A background task fans every event out to all live subscribers;
/// subscriptions are removed automatically when their receiver is dropped.
#[derive(Clone)]
pub struct SessionEventsHandle {
    subscriptions: Arc<Mutex<HashMap<SubscriptionId, Subscription>>>,
    next_id: Arc<AtomicU64>,
}

impl SessionEventsHandle {
    pub fn new(
        mut events_rx: tokio_mpsc::UnboundedReceiver<SessionEvent>,
        runtime_handle: tokio::runtime::Handle,
    ) -> Self {
        let subscriptions: Arc<Mutex<HashMap<SubscriptionId, Subscription>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let subscriptions_clone = subscriptions.clone();

        runtime_handle.spawn(async move {
            loop {
                match events_rx.recv().await {
                    Some(event) => {
                        let mut subs = subscriptions_clone.lock().unwrap();
                        let mut to_remove = Vec::new();

                        for (id, subscription) in subs.iter() {
                            if subscription.tx.send(event.clone()).is_err() {
                                to_remove.push(*id);
                            }
                        }

                        for id in to_remove {
                            subs.remove(&id);
                        }
                    }
                    None => {
                        debug!("Session event channel closed, exiting");
                        break;
                    }
                }
            }
        });

        Self {
            subscriptions,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Subscribe to all session events. The subscription is removed when
    /// the returned receiver is dropped.
    pub fn subscribe_all(&self) -> tokio_mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = tokio_mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        self.subscriptions
            .lock()
            .unwrap()
            .insert(id, Subscription { tx });
        rx
    }
}
