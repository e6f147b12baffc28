//! Thermostat records and control values

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Location;

/// Heating or cooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThermostatMode {
    /// Heating
    Heating,
    /// Cooling
    Cooling,
}

/// Thermostat power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThermostatState {
    /// Regulating
    On,
    /// Not regulating
    Off,
}

/// Preset a thermostat unit follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThermostatPreset {
    /// Follow the schedule
    Auto,
    /// Away temperature
    Away,
    /// Party temperature
    Party,
    /// Vacation temperature
    Vacation,
}

/// Setpoints (degrees Celsius) for the fixed presets of one mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct PresetTemperatures {
    /// Setpoint while away
    pub away: f64,
    /// Setpoint while on vacation
    pub vacation: f64,
    /// Setpoint during a party
    pub party: f64,
}

/// A group of thermostat units sharing a mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermostatGroup {
    /// Group identifier
    pub id: u64,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Capabilities (`HEATING`, `COOLING`)
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Placement
    #[serde(default)]
    pub location: Option<Location>,

    /// Current mode and state
    #[serde(default)]
    pub status: Option<Value>,

    /// Record version
    #[serde(rename = "_version", default)]
    pub version: Option<Value>,
}

impl ThermostatGroup {
    /// Current mode, when the gateway reports a known one.
    pub fn mode(&self) -> Option<ThermostatMode> {
        let mode = self.status.as_ref()?.get("mode")?;
        ThermostatMode::deserialize(mode).ok()
    }
}

/// A single thermostat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermostatUnit {
    /// Unit identifier
    pub id: u64,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Capabilities
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Placement
    #[serde(default)]
    pub location: Option<Location>,

    /// Temperatures, preset and state
    #[serde(default)]
    pub status: Option<Value>,

    /// Record version
    #[serde(rename = "_version", default)]
    pub version: Option<Value>,
}

impl ThermostatUnit {
    fn status_f64(&self, key: &str) -> Option<f64> {
        self.status.as_ref()?.get(key)?.as_f64()
    }

    /// Measured temperature.
    pub fn actual_temperature(&self) -> Option<f64> {
        self.status_f64("actual_temperature")
    }

    /// Active setpoint.
    pub fn setpoint(&self) -> Option<f64> {
        self.status_f64("current_setpoint")
    }

    /// Active preset, when the gateway reports a known one.
    pub fn preset(&self) -> Option<ThermostatPreset> {
        let preset = self.status.as_ref()?.get("preset")?;
        ThermostatPreset::deserialize(preset).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_control_values_serialize_upper_case() {
        assert_eq!(serde_json::to_value(ThermostatMode::Heating).unwrap(), json!("HEATING"));
        assert_eq!(serde_json::to_value(ThermostatState::Off).unwrap(), json!("OFF"));
        assert_eq!(
            serde_json::to_value(PresetTemperatures {
                away: 16.0,
                vacation: 12.0,
                party: 22.5,
            })
            .unwrap(),
            json!({"AWAY": 16.0, "VACATION": 12.0, "PARTY": 22.5})
        );
    }

    #[test]
    fn test_unit_status_accessors() {
        let unit: ThermostatUnit = serde_json::from_value(json!({
            "id": 9,
            "name": "Office",
            "status": {
                "actual_temperature": 20.5,
                "current_setpoint": 21.0,
                "preset": "AWAY",
                "state": "ON"
            }
        }))
        .unwrap();

        assert_eq!(unit.actual_temperature(), Some(20.5));
        assert_eq!(unit.setpoint(), Some(21.0));
        assert_eq!(unit.preset(), Some(ThermostatPreset::Away));
    }

    #[test]
    fn test_group_mode() {
        let group: ThermostatGroup =
            serde_json::from_value(json!({"id": 1, "status": {"mode": "COOLING"}})).unwrap();
        assert_eq!(group.mode(), Some(ThermostatMode::Cooling));

        let group: ThermostatGroup =
            serde_json::from_value(json!({"id": 1, "status": {"mode": "DEFROST"}})).unwrap();
        assert_eq!(group.mode(), None);
    }
}
