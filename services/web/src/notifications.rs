//! services/web/src/notifications.rs
//!
//! The toast queue: the concrete `NotificationService`. Toasts are logged as
//! they fire and held until the front end drains them. The queue is bounded;
//! the oldest toast is dropped when it overflows.

use chrono::{DateTime, Utc};
use job_tracker_core::ports::NotificationService;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{info, warn};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

pub struct ToastQueue {
    capacity: usize,
    next_id: AtomicU64,
    pending: Mutex<VecDeque<Toast>>,
}

impl ToastQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_id: AtomicU64::new(1),
            pending: Mutex::new(VecDeque::new()),
        }
    }

    /// Removes and returns every pending toast, oldest first.
    pub fn drain(&self) -> Vec<Toast> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, kind: ToastKind, message: &str) {
        let toast = Toast {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            kind,
            message: message.to_string(),
            created_at: Utc::now(),
        };
        let mut pending = self.lock();
        if pending.len() == self.capacity {
            pending.pop_front();
        }
        pending.push_back(toast);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Toast>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl NotificationService for ToastQueue {
    fn success(&self, message: &str) {
        info!(toast = "success", "{}", message);
        self.push(ToastKind::Success, message);
    }

    fn error(&self, message: &str) {
        warn!(toast = "error", "{}", message);
        self.push(ToastKind::Error, message);
    }
}
