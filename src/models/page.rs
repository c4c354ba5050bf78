//! Paginated response envelope

use serde::Deserialize;

/// One page of records from a paginated Glip endpoint.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
    pub navigation: Option<Navigation>,
}

/// Pagination cursor block. `nextPageToken` is opaque and only valid
/// within the page sequence that produced it.
#[derive(Debug, Deserialize)]
pub struct Navigation {
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    /// Continuation token for the next page, if any.
    pub fn next_token(&self) -> Option<&str> {
        self.navigation
            .as_ref()
            .and_then(|n| n.next_page_token.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_with_token() {
        let json = r#"{"records":[1,2,3],"navigation":{"nextPageToken":"abc"}}"#;
        let page: Page<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(page.records, vec![1, 2, 3]);
        assert_eq!(page.next_token(), Some("abc"));
    }

    #[test]
    fn test_last_page_shapes() {
        // Providers end a sequence either by omitting navigation entirely
        // or by sending it without a token.
        let json = r#"{"records":[]}"#;
        let page: Page<u32> = serde_json::from_str(json).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.next_token(), None);

        let json = r#"{"records":[1],"navigation":{}}"#;
        let page: Page<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(page.next_token(), None);
    }
}
