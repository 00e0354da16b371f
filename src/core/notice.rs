//! Toast-style notices produced by board operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Notice severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeVariant {
    /// Informational / success.
    #[default]
    Default,
    /// Something failed.
    Destructive,
}

/// A single notice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    /// Unique notice identifier.
    pub id: String,

    /// When the notice was raised.
    pub timestamp: DateTime<Utc>,

    /// Severity.
    pub variant: NoticeVariant,

    /// Short title, e.g. "Upload Failed".
    pub title: String,

    /// Details.
    pub description: String,
}

impl Notice {
    /// A success/info notice.
    #[must_use]
    pub fn info(title: &str, description: impl Into<String>) -> Self {
        Self::build(NoticeVariant::Default, title, description.into())
    }

    /// A failure notice.
    #[must_use]
    pub fn failure(title: &str, description: impl Into<String>) -> Self {
        Self::build(NoticeVariant::Destructive, title, description.into())
    }

    fn build(variant: NoticeVariant, title: &str, description: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            variant,
            title: title.to_string(),
            description,
        }
    }

    /// Whether this notice reports a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.variant == NoticeVariant::Destructive
    }
}

/// Bounded queue of notices; the oldest are dropped first.
#[derive(Debug, Clone)]
pub struct Notices {
    items: VecDeque<Notice>,
    max: usize,
}

impl Default for Notices {
    fn default() -> Self {
        Self::with_capacity(50)
    }
}

impl Notices {
    /// Queue that keeps at most `max` notices (at least one).
    #[must_use]
    pub fn with_capacity(max: usize) -> Self {
        Self {
            items: VecDeque::new(),
            max: max.max(1),
        }
    }

    /// Add a notice, dropping the oldest when full.
    pub fn push(&mut self, notice: Notice) {
        if notice.is_failure() {
            tracing::warn!(title = %notice.title, "{}", notice.description);
        } else {
            tracing::info!(title = %notice.title, "{}", notice.description);
        }
        while self.items.len() >= self.max {
            self.items.pop_front();
        }
        self.items.push_back(notice);
    }

    /// Most recent notice.
    #[must_use]
    pub fn latest(&self) -> Option<&Notice> {
        self.items.back()
    }

    /// Take every queued notice, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.items.drain(..).collect()
    }

    /// Iterate over queued notices, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    /// Number of queued notices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
