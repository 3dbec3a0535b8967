use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";

/// Storage format for `created_at`. Fixed width, so text order is time order.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub mood: Option<String>,
    pub background_color: String,
    pub created_at: DateTime<Utc>,
}

/// A validated note ready to be persisted: mood is `None` rather than empty
/// and the background color is always set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub mood: Option<String>,
    pub background_color: String,
}

pub fn format_created_at(at: DateTime<Utc>) -> String {
    at.format(CREATED_AT_FORMAT).to_string()
}
