//! BCF topics and comments
//!
//! A topic is one pending-approval request addressed to one user. New
//! topics are always `Issue`s in status `New`, due seven days after creation.

use crate::timestamp;
use crate::{CommentId, TopicId, UserId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Topic type sent on every creation request
pub const TOPIC_TYPE_ISSUE: &str = "Issue";

/// Days between topic creation and its due date
pub const TOPIC_DUE_DAYS: i64 = 7;

// ── Priority ─────────────────────────────────────────────────────────

/// Topic priority.
///
/// Requests use the lowercase names. Any other spelling read from a
/// response, `"High"` included, is kept verbatim in [`TopicPriority::Other`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TopicPriority {
    Low,
    Normal,
    #[default]
    High,
    Critical,
    Other(String),
}

impl TopicPriority {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Critical => "critical",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for TopicPriority {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "low" => Self::Low,
            "normal" => Self::Normal,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Other(raw),
        }
    }
}

impl From<TopicPriority> for String {
    fn from(priority: TopicPriority) -> Self {
        priority.as_str().to_string()
    }
}

impl fmt::Display for TopicPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Status ───────────────────────────────────────────────────────────

/// Topic status.
///
/// Callers may close a topic with any label, so unknown values are kept
/// verbatim in [`TopicStatus::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TopicStatus {
    New,
    Open,
    InProgress,
    Resolved,
    Closed,
    Other(String),
}

impl TopicStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::New => "New",
            Self::Open => "Open",
            Self::InProgress => "InProgress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for TopicStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "New" => Self::New,
            "Open" => Self::Open,
            "InProgress" => Self::InProgress,
            "Resolved" => Self::Resolved,
            "Closed" => Self::Closed,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for TopicStatus {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<TopicStatus> for String {
    fn from(status: TopicStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Topic ────────────────────────────────────────────────────────────

/// A BCF topic as returned by the server.
///
/// Every field except the id is optional and timestamps stay as the text
/// the server sent, so serializing a topic gives back the body it came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    /// Topic id
    pub id: TopicId,
    /// Headline shown in the issue list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Body text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// User the topic is addressed to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
    /// Priority as sent by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TopicPriority>,
    /// Workflow status label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TopicStatus>,
    /// BCF topic type, `Issue` for approval topics
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub topic_type: Option<String>,
    /// Due date, raw; see [`Topic::due`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Resolution time, raw; see [`Topic::resolved`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<String>,
    /// Any other fields the server returned
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Topic {
    /// Title, empty when missing
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// Parsed due date; `None` when missing or unreadable
    pub fn due(&self) -> Option<DateTime<Utc>> {
        self.due_date.as_deref().and_then(timestamp::parse)
    }

    /// Parsed resolution time; `None` when missing or unreadable
    pub fn resolved(&self) -> Option<DateTime<Utc>> {
        self.resolved_at.as_deref().and_then(timestamp::parse)
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
            || matches!(self.status, Some(TopicStatus::Resolved | TopicStatus::Closed))
    }
}

/// Caller input for a new topic; see [`NewTopic`] for what is actually sent
#[derive(Clone, Debug, PartialEq)]
pub struct TopicDraft {
    /// Topic headline
    pub title: String,
    /// Approver the topic goes to
    pub assigned_to: UserId,
    /// Defaults to [`TopicPriority::High`]
    pub priority: TopicPriority,
    /// Defaults to empty
    pub description: String,
}

impl TopicDraft {
    /// Draft with high priority and an empty description
    pub fn new(title: impl Into<String>, assigned_to: impl Into<UserId>) -> Self {
        Self {
            title: title.into(),
            assigned_to: assigned_to.into(),
            priority: TopicPriority::High,
            description: String::new(),
        }
    }

    pub fn with_priority(mut self, priority: TopicPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Body of a topic creation request
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTopic {
    pub title: String,
    pub description: String,
    pub assigned_to: UserId,
    pub priority: TopicPriority,
    /// Always [`TopicStatus::New`]
    pub status: TopicStatus,
    /// Always [`TOPIC_TYPE_ISSUE`]
    #[serde(rename = "type")]
    pub topic_type: String,
    /// Creation time plus [`TOPIC_DUE_DAYS`]
    #[serde(with = "timestamp::millis")]
    pub due_date: DateTime<Utc>,
}

impl NewTopic {
    /// Fill in the fixed fields, with the due date counted from `now`
    pub fn from_draft(draft: TopicDraft, now: DateTime<Utc>) -> Self {
        Self {
            title: draft.title,
            description: draft.description,
            assigned_to: draft.assigned_to,
            priority: draft.priority,
            status: TopicStatus::New,
            topic_type: TOPIC_TYPE_ISSUE.to_string(),
            due_date: now + Duration::days(TOPIC_DUE_DAYS),
        }
    }
}

/// Partial topic update; unset fields are left out of the body
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TopicPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TopicStatus>,
    /// Sent with millisecond precision
    #[serde(
        with = "timestamp::millis_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<DateTime<Utc>>,
    /// Set together with `status` when closing a topic
    #[serde(
        with = "timestamp::millis_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl TopicUpdate {
    /// Close a topic with `status` at `resolved_at`
    pub fn resolution(status: impl Into<TopicStatus>, resolved_at: DateTime<Utc>) -> Self {
        Self {
            status: Some(status.into()),
            resolved_at: Some(resolved_at),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ── Comments ─────────────────────────────────────────────────────────

/// A comment on a topic
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Comment id, when the server assigns one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CommentId>,
    /// Comment text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Author, dates and the other server fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of a comment creation request
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewComment {
    pub text: String,
}
