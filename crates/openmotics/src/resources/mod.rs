//! API resource endpoints
//!
//! Thin per-resource wrappers over [`Client::get`] and [`Client::post`].
//! Every endpoint lives under `/base/installations`; list and get calls
//! unwrap the `{"data": ...}` envelope into records, control calls return
//! the raw [`Body`](crate::Body).

pub mod group_actions;
pub mod installations;
pub mod lights;
pub mod outputs;
pub mod sensors;
pub mod shutters;
pub mod thermostats;

pub use group_actions::GroupActions;
pub use installations::Installations;
pub use lights::Lights;
pub use outputs::Outputs;
pub use sensors::Sensors;
pub use shutters::Shutters;
pub use thermostats::{ThermostatGroups, ThermostatUnits, Thermostats};

use crate::client::Client;

/// Base trait for API resources.
pub trait Resource {
    /// Get a reference to the client.
    fn client(&self) -> &Client;
}

fn installation_path(installation_id: u64, rest: &str) -> String {
    format!("/base/installations/{installation_id}{rest}")
}

fn filter_query(filter: Option<&str>) -> Vec<(&str, &str)> {
    filter.map(|filter| vec![("filter", filter)]).unwrap_or_default()
}

/// Dimmer values outside 0..=100 are clamped.
fn dimmer_value(value: i64) -> i64 {
    value.clamp(0, 100)
}
