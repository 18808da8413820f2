//! Tool catalog domain types

use serde::{Deserialize, Serialize};

/// An installable developer tool from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub category: String,
    pub description: Option<String>,
    /// Install script path, relative to the configured scripts directory
    pub script_path: String,
    pub icon: Option<String>,
    pub installed: bool,
    pub install_date: Option<chrono::DateTime<chrono::Utc>>,
}

/// A named group of tools that can be installed together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSet {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    /// Tool names belonging to the set
    pub tools: Vec<String>,
}
