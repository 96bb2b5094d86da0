//! Per-operation option structs with documented defaults.

use std::collections::HashMap;

/// Options for [`Client::add`](crate::Client::add).
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Owner partition key. Required: an empty `user_id` is rejected.
    pub user_id: String,
    /// Secondary partition key, e.g. for per-agent memories.
    pub agent_id: Option<String>,
    /// Arbitrary JSON metadata stored with the memory.
    pub metadata: Option<serde_json::Value>,
    /// Run the duplicate check before inserting. Defaults to `false`; a hit
    /// merges into the existing record instead of creating a new one.
    pub infer: bool,
}

/// Options for [`Client::search`](crate::Client::search).
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Owner partition to search. Empty string searches all users.
    pub user_id: String,
    /// Secondary partition key. `None` matches any agent.
    pub agent_id: Option<String>,
    /// Maximum number of results; 0 means unlimited. Default 10.
    pub limit: usize,
    /// Minimum relevance score a result must reach. Default 0.0.
    pub min_score: f64,
    /// Equality matches against top-level metadata keys.
    pub filters: HashMap<String, serde_json::Value>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            agent_id: None,
            limit: 10,
            min_score: 0.0,
            filters: HashMap::new(),
        }
    }
}

/// Options for [`Client::get_all`](crate::Client::get_all).
#[derive(Debug, Clone)]
pub struct GetAllOptions {
    /// Owner partition to list. Empty string lists all users.
    pub user_id: String,
    /// Secondary partition key. `None` matches any agent.
    pub agent_id: Option<String>,
    /// Maximum number of results; 0 means unlimited. Default 100.
    pub limit: usize,
    /// Number of records to skip, for pagination. Default 0.
    pub offset: usize,
}

impl Default for GetAllOptions {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            agent_id: None,
            limit: 100,
            offset: 0,
        }
    }
}

/// Options for [`Client::delete_all`](crate::Client::delete_all).
#[derive(Debug, Clone, Default)]
pub struct DeleteAllOptions {
    /// Owner partition to clear. Empty string clears all users.
    pub user_id: String,
    /// Secondary partition key. `None` matches any agent.
    pub agent_id: Option<String>,
}
