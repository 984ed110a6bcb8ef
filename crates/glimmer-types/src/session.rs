//! Saved-session types for Glimmer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::turn::Turn;

/// A saved conversation: an ordered turn list plus list metadata.
///
/// `title` is derived from the first user turn and `preview` from the last
/// turn; both are truncated for display. `timestamp` is the last-modified
/// instant, refreshed on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub timestamp: DateTime<Utc>,
    pub turns: Vec<Turn>,
}
