use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::node::LocationId;

/// Content item exposed by one or more locations
///
/// Read-only from the executor's point of view; locations are attached to
/// content, never the other way around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentInfo {
    pub id: i64,
    pub remote_id: String,
    pub name: String,
    pub owner_id: i64,
    pub section_id: i64,
    pub content_type_id: i64,
    pub main_language_code: String,
    /// None until the content has been placed in the tree
    pub main_location_id: Option<LocationId>,
    pub current_version_no: u32,
    pub always_available: bool,
    pub modification_date: DateTime<Utc>,
    pub published_date: DateTime<Utc>,
}

impl ContentInfo {
    /// Content with the given identity and defaults for everything else
    ///
    /// Defaults: owner 14, section 1, `eng-GB`, version 1, not always
    /// available, both timestamps set to now.
    pub fn new(id: i64, remote_id: impl Into<String>, name: impl Into<String>, content_type_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id,
            remote_id: remote_id.into(),
            name: name.into(),
            owner_id: 14,
            section_id: 1,
            content_type_id,
            main_language_code: "eng-GB".to_string(),
            main_location_id: None,
            current_version_no: 1,
            always_available: false,
            modification_date: now,
            published_date: now,
        }
    }
}

/// Content type metadata needed by reference extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentType {
    pub id: i64,
    pub identifier: String,
}
