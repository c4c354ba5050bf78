//! Room (Glip group) models

use serde::{Deserialize, Serialize};

/// A Glip group as returned by the group listing endpoint.
///
/// Only the fields the aggregation pipeline consumes are modeled; the
/// provider returns more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "isArchived", default)]
    pub is_archived: bool,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl Room {
    /// Whether this room participates in discovery: non-archived,
    /// team-type groups only. Filtering here saves the per-room page
    /// fetches entirely for everything else.
    pub fn is_active_team(&self) -> bool {
        !self.is_archived && self.kind.as_deref() == Some("Team")
    }

    /// Display name, falling back to the raw ID when the provider omits it.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.id,
        }
    }
}
