use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// A short-lived, user-facing message. Never persisted.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub severity: Severity,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub severity: Severity,
    pub title: String,
    pub message: Option<String>,
}

impl NewNotification {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            title: title.into(),
            message: None,
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            title: title.into(),
            message: None,
        }
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            title: title.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Live notifications, newest first, each with a scheduled expiry task.
///
/// An expiry task is keyed by notification id. Dismissing a notification
/// cancels its task in the same step, so a sweep can never remove it again.
#[derive(Debug)]
pub struct NotificationChannel {
    ttl: Duration,
    live: VecDeque<Notification>,
    expiry: HashMap<String, DateTime<Utc>>,
}

impl NotificationChannel {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            live: VecDeque::new(),
            expiry: HashMap::new(),
        }
    }

    pub fn push(&mut self, id: String, new: NewNotification, now: DateTime<Utc>) -> &Notification {
        let expires_at = now + self.ttl;
        self.expiry.insert(id.clone(), expires_at);
        self.live.push_front(Notification {
            id,
            severity: new.severity,
            title: new.title,
            message: new.message,
            expires_at,
        });
        &self.live[0]
    }

    /// Remove now and cancel the pending expiry. `false` if already gone.
    pub fn dismiss(&mut self, id: &str) -> bool {
        self.expiry.remove(id);
        let before = self.live.len();
        self.live.retain(|n| n.id != id);
        self.live.len() != before
    }

    /// Run every expiry task due at `now`
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let due: Vec<String> = self
            .expiry
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &due {
            self.expiry.remove(id);
        }
        let before = self.live.len();
        self.live.retain(|n| !due.contains(&n.id));
        before - self.live.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.live.iter()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn pending_expiries(&self) -> usize {
        self.expiry.len()
    }
}
