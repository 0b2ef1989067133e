use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Roster entry for a contractor the dispatch fan-out offers jobs to.
/// Read-only from this workflow's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contractor {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: Option<String>,
}

impl Contractor {
    /// A contractor can only be dispatched to when it has a usable address.
    pub fn usable_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty() && e.contains('@'))
    }
}
