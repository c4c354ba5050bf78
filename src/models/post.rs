//! Post and person models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single post in a room. Read-only; fetched, counted, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(rename = "creatorId")]
    pub creator_id: String,
    #[serde(rename = "creationTime")]
    pub creation_time: DateTime<Utc>,
}

/// A provider user record from the person lookup endpoint. Used only for
/// best-effort display-name resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct Person {
    pub id: String,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
}

impl Person {
    /// "First Last", trimmed; falls back to the raw ID when both name
    /// fields are missing.
    pub fn display_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let name = name.trim();
        if name.is_empty() {
            self.id.clone()
        } else {
            name.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_deserialize() {
        let json = r#"{"id":"p1","creatorId":"u1","creationTime":"2024-01-02T10:30:00Z"}"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.creator_id, "u1");
        assert_eq!(post.creation_time.to_rfc3339(), "2024-01-02T10:30:00+00:00");
    }

    #[test]
    fn test_person_display_name() {
        let full = Person {
            id: "u1".into(),
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
        };
        assert_eq!(full.display_name(), "Ada Lovelace");

        let partial = Person {
            id: "u2".into(),
            first_name: Some("Ada".into()),
            last_name: None,
        };
        assert_eq!(partial.display_name(), "Ada");

        let empty = Person {
            id: "u3".into(),
            first_name: None,
            last_name: None,
        };
        assert_eq!(empty.display_name(), "u3");
    }
}
