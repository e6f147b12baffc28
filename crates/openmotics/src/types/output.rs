//! Output and light records

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Location;

/// Switching state shared by outputs and lights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputStatus {
    /// Whether the output is on
    #[serde(default)]
    pub on: bool,

    /// Locked against changes
    #[serde(default)]
    pub locked: Option<bool>,

    /// Manually overridden at the installation
    #[serde(default)]
    pub manual_override: Option<bool>,

    /// Dimmer level, 0-100
    #[serde(default)]
    pub value: Option<u8>,
}

/// A relay or dimmer output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    /// Output identifier
    pub id: u64,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Output type (e.g. `OUTLET`, `LIGHT`)
    #[serde(rename = "type", default)]
    pub output_type: Option<String>,

    /// Capabilities (e.g. `ON_OFF`, `RANGE`)
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Placement
    #[serde(default)]
    pub location: Option<Location>,

    /// Free-form metadata
    #[serde(default)]
    pub metadata: Option<Value>,

    /// Current state
    #[serde(default)]
    pub status: Option<OutputStatus>,

    /// Epoch seconds of the last state change
    #[serde(default)]
    pub last_state_change: Option<f64>,

    /// Record version
    #[serde(rename = "_version", default)]
    pub version: Option<Value>,
}

impl Output {
    /// Whether the output reports itself on. Unknown status counts as off.
    pub fn is_on(&self) -> bool {
        self.status.is_some_and(|status| status.on)
    }

    /// Dimmer level, for outputs that report one.
    pub fn brightness(&self) -> Option<u8> {
        self.status.and_then(|status| status.value)
    }
}

/// A light, as exposed by the lights endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// Light identifier
    pub id: u64,

    /// Identifier on the gateway
    #[serde(default)]
    pub local_id: Option<u64>,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Capabilities (`ON_OFF`, `RANGE`, `WHITE_TEMP`, `FULL_COLOR`)
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Placement
    #[serde(default)]
    pub location: Option<Location>,

    /// Current state
    #[serde(default)]
    pub status: Option<OutputStatus>,

    /// Record version
    #[serde(rename = "_version", default)]
    pub version: Option<Value>,
}

impl Light {
    /// Whether the light reports itself on.
    pub fn is_on(&self) -> bool {
        self.status.is_some_and(|status| status.on)
    }

    /// Dimmer level, for dimmable lights.
    pub fn brightness(&self) -> Option<u8> {
        self.status.and_then(|status| status.value)
    }
}
