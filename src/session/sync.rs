use crate::api::models::ProgressStatus;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc as tokio_mpsc;
use tokio::task::JoinHandle;

/// Client-side optimistic copy of the server's progress record for the
/// mounted item; overwritten by whatever the server returns on an explicit
/// re-fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemProgressRecord {
    pub status: ProgressStatus,
    pub progress_value: u32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    /// Debounce timer armed, waiting for quiescence
    PendingPush,
    /// At least one push in flight
    Pushing,
}

/// Trailing-debounce scheduler for progress pushes.
///
/// Every position change re-arms the timer; the push fires only after the
/// window elapses with no further change, carrying the latest position.
/// Pushes are not serialized against each other: a new window can come due
/// while an earlier push is still in flight, and the backend owns write
/// ordering.
pub struct ProgressSynchronizer {
    window: Duration,
    timer: Option<JoinHandle<()>>,
    in_flight: usize,
}

impl ProgressSynchronizer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            timer: None,
            in_flight: 0,
        }
    }

    /// (Re)arm the trailing debounce, cancelling any pending timer. `due_tx`
    /// receives one message once the window elapses undisturbed.
    pub fn schedule(&mut self, due_tx: tokio_mpsc::UnboundedSender<()>) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        let window = self.window;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let _ = due_tx.send(());
        }));
    }

    /// The armed window came due and a push is being issued.
    pub fn begin_push(&mut self) {
        self.timer = None;
        self.in_flight += 1;
    }

    pub fn finish_push(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Drop the armed timer without pushing. Used on teardown: the pending
    /// window is deliberately not flushed.
    pub fn cancel_pending(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    pub fn phase(&self) -> SyncPhase {
        if self.timer.is_some() {
            SyncPhase::PendingPush
        } else if self.in_flight > 0 {
            SyncPhase::Pushing
        } else {
            SyncPhase::Idle
        }
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight > 0
    }
}

impl Drop for ProgressSynchronizer {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
