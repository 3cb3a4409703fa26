use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One registered identifier, keyed in the store by the platform user id.
/// Field names on disk match the files written by the first deployment.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserRecord {
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "embark_id")]
    pub external_id: String,
}

impl UserRecord {
    pub fn new(display_name: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            external_id: external_id.into(),
        }
    }
}

/// Full persisted mapping: user id -> record, in stored order.
pub type Registry = IndexMap<String, UserRecord>;
