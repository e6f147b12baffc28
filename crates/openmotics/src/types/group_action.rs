//! Group action records

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Location;

/// A group action: a named sequence of actions, optionally used as a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAction {
    /// Group action identifier
    pub id: u64,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Action type / action number pairs
    #[serde(default)]
    pub actions: Option<Value>,

    /// Intended usage (e.g. `SCENE`)
    #[serde(default)]
    pub usage: Option<String>,

    /// Placement
    #[serde(default)]
    pub location: Option<Location>,

    /// Record version
    #[serde(rename = "_version", default)]
    pub version: Option<Value>,
}
