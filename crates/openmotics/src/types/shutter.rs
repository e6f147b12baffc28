//! Shutter records

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Location;

/// Motion and lock state of a shutter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShutterStatus {
    /// Epoch seconds of the last change
    #[serde(default)]
    pub last_change: Option<f64>,

    /// Position in steps, when the shutter supports positions
    #[serde(default)]
    pub position: Option<i64>,

    /// `UP`, `DOWN`, `STOP`, `GOING_UP` or `GOING_DOWN`
    #[serde(default)]
    pub state: Option<String>,

    /// Locked against movement
    #[serde(default)]
    pub locked: Option<bool>,

    /// Manually overridden at the installation
    #[serde(default)]
    pub manual_override: Option<bool>,
}

/// A shutter or blind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shutter {
    /// Shutter identifier
    pub id: u64,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Timers, steps and group configuration
    #[serde(default)]
    pub configuration: Option<Value>,

    /// Capabilities (`UP_DOWN`, `POSITION`, `PRESET`, ...)
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Placement
    #[serde(default)]
    pub location: Option<Location>,

    /// Current state
    #[serde(default)]
    pub status: Option<ShutterStatus>,

    /// Record version
    #[serde(rename = "_version", default)]
    pub version: Option<Value>,
}

impl Shutter {
    /// Motion state as reported by the gateway.
    pub fn state(&self) -> Option<&str> {
        self.status.as_ref()?.state.as_deref()
    }

    /// Position in steps.
    pub fn position(&self) -> Option<i64> {
        self.status.as_ref()?.position
    }

    /// Number of position steps from the configuration.
    pub fn steps(&self) -> Option<u64> {
        self.configuration.as_ref()?.get("steps")?.as_u64()
    }
}
