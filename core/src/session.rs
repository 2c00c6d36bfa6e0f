//! Execution session: the state one run shares with whoever started it.
//!
//! The caller only ever cancels. Progress fields are written by the executor
//! alone and published through a watch channel, so observers read consistent
//! snapshots without taking part in the run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub is_cancelled: bool,
    /// `None` until the first step starts.
    pub current_step_index: Option<usize>,
    pub is_complete: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
struct Inner {
    id: String,
    started_at: DateTime<Utc>,
    cancel: CancellationToken,
    state: watch::Sender<SessionSnapshot>,
}

/// Cheap to clone; every clone refers to the same session.
#[derive(Debug, Clone)]
pub struct ExecutionSession {
    inner: Arc<Inner>,
}

impl Default for ExecutionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionSession {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                id: uuid::Uuid::new_v4().to_string(),
                started_at: Utc::now(),
                cancel: CancellationToken::new(),
                state,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }

    /// Requests cancellation. Safe from any task at any time; repeated calls
    /// are no-ops.
    pub fn cancel(&self) {
        self.inner.cancel.cancel();
        self.inner.state.send_if_modified(|s| {
            if s.is_cancelled {
                false
            } else {
                s.is_cancelled = true;
                true
            }
        });
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn current_step_index(&self) -> Option<usize> {
        self.inner.state.borrow().current_step_index
    }

    pub fn is_complete(&self) -> bool {
        self.inner.state.borrow().is_complete
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.borrow().error.clone()
    }

    /// Index only moves forward; a stale or repeated index is ignored.
    pub(crate) fn set_current_step(&self, index: usize) {
        self.inner.state.send_if_modified(|s| match s.current_step_index {
            Some(current) if current >= index => false,
            _ => {
                s.current_step_index = Some(index);
                true
            }
        });
    }

    pub(crate) fn mark_complete(&self) {
        self.inner.state.send_if_modified(|s| {
            if s.is_complete || s.error.is_some() {
                false
            } else {
                s.is_complete = true;
                true
            }
        });
    }

    pub(crate) fn mark_failed(&self, message: impl Into<String>) {
        let message = message.into();
        self.inner.state.send_if_modified(|s| {
            if s.error.is_some() || s.is_complete {
                false
            } else {
                s.error = Some(message);
                true
            }
        });
    }
}
