//! Records returned by the OpenMotics API
//!
//! Field sets follow what the API documents for each resource. Nested maps
//! without a stable shape are kept as [`serde_json::Value`].

mod group_action;
mod installation;
mod location;
mod output;
mod sensor;
mod shutter;
mod thermostat;

pub use group_action::GroupAction;
pub use installation::Installation;
pub use location::{FloorCoordinates, Location};
pub use output::{Light, Output, OutputStatus};
pub use sensor::Sensor;
pub use shutter::{Shutter, ShutterStatus};
pub use thermostat::{
    PresetTemperatures, ThermostatGroup, ThermostatMode, ThermostatPreset, ThermostatState,
    ThermostatUnit,
};
