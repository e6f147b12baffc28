//! Sensor records

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Location;

/// A sensor (temperature, humidity, brightness, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    /// Sensor identifier
    pub id: u64,

    /// Identifier on the gateway
    #[serde(default)]
    pub local_id: Option<u64>,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Measured quantity (e.g. `temperature`)
    #[serde(default)]
    pub physical_quantity: Option<String>,

    /// Unit of the measured value
    #[serde(default)]
    pub unit: Option<String>,

    /// Placement
    #[serde(default)]
    pub location: Option<Location>,

    /// Latest reading
    #[serde(default)]
    pub status: Option<Value>,

    /// Record version
    #[serde(rename = "_version", default)]
    pub version: Option<Value>,
}

impl Sensor {
    /// Latest numeric reading, if any.
    pub fn value(&self) -> Option<f64> {
        self.status.as_ref()?.get("value")?.as_f64()
    }
}
