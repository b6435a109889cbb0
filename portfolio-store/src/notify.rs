use serde::Serialize;
use std::{
    fmt::Debug,
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::time::Instant;
use tracing::{info, warn};

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// Fire-and-forget sink for transient user-facing messages.
pub trait NotificationSink: Send + Sync + Debug {
    fn notify(&self, severity: Severity, message: &str);
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct Toast {
    pub id: u64,
    #[serde(rename = "type")]
    pub severity: Severity,
    pub message: String,
    #[serde(skip)]
    expires_at: Instant,
}

/// Keeps each toast around for a fixed duration.
#[derive(Debug)]
pub struct ToastBoard {
    display_for: Duration,
    next_id: AtomicU64,
    toasts: Mutex<Vec<Toast>>,
}

impl Default for ToastBoard {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl ToastBoard {
    #[must_use]
    pub fn new(display_for: Duration) -> Self {
        Self {
            display_for,
            next_id: AtomicU64::new(0),
            toasts: Mutex::new(Vec::new()),
        }
    }

    /// Toasts that have not expired yet, oldest first.
    #[must_use]
    pub fn active(&self) -> Vec<Toast> {
        self.live().clone()
    }

    pub fn dismiss(&self, id: u64) -> bool {
        let mut toasts = self.toasts.lock().unwrap_or_else(PoisonError::into_inner);
        let before = toasts.len();
        toasts.retain(|toast| toast.id != id);
        toasts.len() != before
    }

    /// The toast list with expired entries already dropped.
    fn live(&self) -> MutexGuard<'_, Vec<Toast>> {
        let now = Instant::now();
        let mut toasts = self.toasts.lock().unwrap_or_else(PoisonError::into_inner);
        toasts.retain(|toast| toast.expires_at > now);
        toasts
    }
}

impl NotificationSink for ToastBoard {
    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Error => warn!(text = message, "Notification"),
            Severity::Success | Severity::Info => info!(?severity, text = message, "Notification"),
        }

        let toast = Toast {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            severity,
            message: message.to_owned(),
            expires_at: Instant::now() + self.display_for,
        };
        self.live().push(toast);
    }
}

#[cfg(test)]
mod tests {
    use crate::notify::{NotificationSink, Severity, ToastBoard};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn toasts_expire() {
        let board = ToastBoard::new(Duration::from_secs(3));
        board.notify(Severity::Success, "Пост успешно создан!");

        tokio::time::advance(Duration::from_secs(2)).await;
        board.notify(Severity::Info, "Действие отменено");

        let active = board.active();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].message, "Пост успешно создан!");
        assert_eq!(active[1].severity, Severity::Info);

        tokio::time::advance(Duration::from_secs(2)).await;
        let active = board.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].message, "Действие отменено");
    }

    #[tokio::test(start_paused = true)]
    async fn unread_toasts_do_not_pile_up() {
        let board = ToastBoard::new(Duration::from_secs(3));

        for _ in 0..100 {
            board.notify(Severity::Error, "Ошибка входа");
            tokio::time::advance(Duration::from_secs(1)).await;
        }

        assert!(board.toasts.lock().unwrap().len() <= 3);
        assert_eq!(board.active().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_by_id() {
        let board = ToastBoard::default();
        board.notify(Severity::Error, "Ошибка входа");
        let id = board.active()[0].id;

        assert!(board.dismiss(id));
        assert!(!board.dismiss(id));
        assert!(board.active().is_empty());
    }
}
