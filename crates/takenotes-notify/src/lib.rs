//! Synchronous fan-out of transient user-facing messages.
//!
//! The UI layer subscribes once and renders whatever arrives as toasts; the
//! API client publishes request failures. Delivery is synchronous and in
//! subscription order, with no queue: a notification only reaches listeners
//! subscribed at the moment of publish.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub title: Option<String>,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            title: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

type Listener = Arc<dyn Fn(&Notification) + Send + Sync>;

/// Broadcast channel for [`Notification`]s.
///
/// Cheap to clone; all clones share the same listener list. Callbacks run
/// outside the relay's lock, so a listener may publish or subscribe from
/// inside its callback; changes made mid-publish take effect from the next
/// publish on.
#[derive(Clone, Default)]
pub struct Relay {
    inner: Arc<RelayInner>,
}

#[derive(Default)]
struct RelayInner {
    next_token: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It stays subscribed until the returned handle is
    /// dropped or explicitly unsubscribed.
    pub fn subscribe(&self, listener: impl Fn(&Notification) + Send + Sync + 'static) -> Subscription {
        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.listeners).push((token, Arc::new(listener)));
        Subscription {
            relay: Arc::downgrade(&self.inner),
            token,
        }
    }

    /// Invoke every currently subscribed listener, in subscription order.
    /// Returns the notification as delivered (id included).
    pub fn publish(&self, notification: Notification) -> Notification {
        // Snapshot before fan-out so callbacks can touch the relay without
        // deadlocking on the listener lock.
        let snapshot: Vec<Listener> = lock(&self.inner.listeners)
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in &snapshot {
            listener(&notification);
        }
        notification
    }
}

/// Handle returned by [`Relay::subscribe`]. Dropping it removes the listener.
pub struct Subscription {
    relay: Weak<RelayInner>,
    token: u64,
}

impl Subscription {
    /// Detach the listener now instead of at drop time.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.relay.upgrade() {
            lock(&inner.listeners).retain(|(token, _)| *token != self.token);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn publish_reaches_listeners_in_subscription_order() {
        let relay = Relay::new();
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();

        let seen_a = seen.clone();
        let _a = relay.subscribe(move |n| seen_a.lock().unwrap().push(format!("a:{}", n.message)));
        let seen_b = seen.clone();
        let _b = relay.subscribe(move |n| seen_b.lock().unwrap().push(format!("b:{}", n.message)));

        relay.publish(Notification::info("hello"));

        assert_eq!(*seen.lock().unwrap(), vec!["a:hello", "b:hello"]);
    }

    #[test]
    fn published_notification_carries_a_generated_id() {
        let relay = Relay::new();
        let seen: Arc<Mutex<Vec<Notification>>> = Arc::default();
        let sink = seen.clone();
        let _sub = relay.subscribe(move |n| sink.lock().unwrap().push(n.clone()));

        relay.publish(Notification::error("x"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, NotificationKind::Error);
        assert!(!seen[0].id.is_nil());
    }

    #[test]
    fn dropped_subscription_stops_receiving() {
        let relay = Relay::new();
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();

        let sink = seen.clone();
        let sub = relay.subscribe(move |n| sink.lock().unwrap().push(n.message.clone()));
        relay.publish(Notification::info("one"));
        sub.unsubscribe();
        relay.publish(Notification::info("two"));

        assert_eq!(*seen.lock().unwrap(), vec!["one"]);
    }

    #[test]
    fn listeners_may_publish_reentrantly() {
        let relay = Relay::new();
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();

        let sink = seen.clone();
        let inner = relay.clone();
        let _sub = relay.subscribe(move |n| {
            sink.lock().unwrap().push(n.message.clone());
            if n.message == "first" {
                inner.publish(Notification::info("second"));
            }
        });

        relay.publish(Notification::info("first"));

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn listeners_may_subscribe_from_inside_a_callback() {
        let relay = Relay::new();
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let late: Arc<Mutex<Option<Subscription>>> = Arc::default();

        let sink = seen.clone();
        let inner = relay.clone();
        let slot = late.clone();
        let _sub = relay.subscribe(move |n| {
            sink.lock().unwrap().push(format!("a:{}", n.message));
            if n.message == "one" {
                let sink = sink.clone();
                let sub = inner.subscribe(move |n| {
                    sink.lock().unwrap().push(format!("b:{}", n.message));
                });
                *slot.lock().unwrap() = Some(sub);
            }
        });

        relay.publish(Notification::info("one"));
        relay.publish(Notification::info("two"));

        // The listener added mid-publish only sees the next publish.
        assert_eq!(*seen.lock().unwrap(), vec!["a:one", "a:two", "b:two"]);
    }

    #[test]
    fn listeners_are_invoked_once_per_publish() {
        let relay = Relay::new();
        let count = Arc::new(std::sync::atomic::AtomicU64::new(0));
        let counter = count.clone();
        let _sub = relay.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        relay.publish(Notification::warning("w").with_title("t"));
        relay.publish(Notification::success("s"));

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
