//! Thermostats API endpoint
//!
//! Installation-wide calls live on [`Thermostats`]; group and unit calls on
//! [`ThermostatGroups`] and [`ThermostatUnits`].

use serde_json::json;

use super::{Resource, installation_path};
use crate::{
    client::Client,
    error::{Error, Result},
    http::Body,
    types::{
        PresetTemperatures, ThermostatGroup, ThermostatMode, ThermostatPreset, ThermostatState,
        ThermostatUnit,
    },
};

/// Thermostats API resource.
#[derive(Clone, Copy)]
pub struct Thermostats<'a> {
    client: &'a Client,
}

impl<'a> Thermostats<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Set the mode of every group the user has access to.
    pub async fn set_mode(&self, installation_id: u64, mode: ThermostatMode) -> Result<Body> {
        let path = installation_path(installation_id, "/thermostats/mode");
        self.client.post(&path, Some(json!({ "mode": mode }))).await
    }

    /// Set the state of every group the user has access to.
    pub async fn set_state(&self, installation_id: u64, state: ThermostatState) -> Result<Body> {
        let path = installation_path(installation_id, "/thermostats/state");
        self.client.post(&path, Some(json!({ "state": state }))).await
    }

    /// Thermostat groups.
    pub fn groups(&self) -> ThermostatGroups<'a> {
        ThermostatGroups {
            client: self.client,
        }
    }

    /// Thermostat units.
    pub fn units(&self) -> ThermostatUnits<'a> {
        ThermostatUnits {
            client: self.client,
        }
    }
}

impl Resource for Thermostats<'_> {
    fn client(&self) -> &Client {
        self.client
    }
}

/// Thermostat groups resource.
#[derive(Clone, Copy)]
pub struct ThermostatGroups<'a> {
    client: &'a Client,
}

impl ThermostatGroups<'_> {
    /// List the thermostat groups of an installation.
    pub async fn list(&self, installation_id: u64) -> Result<Vec<ThermostatGroup>> {
        self.client
            .get(&installation_path(installation_id, "/thermostats/groups"), &[])
            .await?
            .data()
    }

    /// Get one thermostat group.
    pub async fn get(&self, installation_id: u64, group_id: u64) -> Result<ThermostatGroup> {
        let path = installation_path(installation_id, &format!("/thermostats/groups/{group_id}"));
        self.client.get(&path, &[]).await?.data()
    }

    /// Set the mode of one group.
    pub async fn set_mode(
        &self,
        installation_id: u64,
        group_id: u64,
        mode: ThermostatMode,
    ) -> Result<Body> {
        let path = installation_path(
            installation_id,
            &format!("/thermostats/groups/{group_id}/mode"),
        );
        self.client.post(&path, Some(json!({ "mode": mode }))).await
    }
}

impl Resource for ThermostatGroups<'_> {
    fn client(&self) -> &Client {
        self.client
    }
}

/// Thermostat units resource.
#[derive(Clone, Copy)]
pub struct ThermostatUnits<'a> {
    client: &'a Client,
}

impl ThermostatUnits<'_> {
    fn path(installation_id: u64, unit_id: u64, rest: &str) -> String {
        installation_path(installation_id, &format!("/thermostats/units/{unit_id}{rest}"))
    }

    /// List the thermostat units of an installation.
    pub async fn list(&self, installation_id: u64) -> Result<Vec<ThermostatUnit>> {
        self.client
            .get(&installation_path(installation_id, "/thermostats/units"), &[])
            .await?
            .data()
    }

    /// Get one thermostat unit.
    pub async fn get(&self, installation_id: u64, unit_id: u64) -> Result<ThermostatUnit> {
        self.client
            .get(&Self::path(installation_id, unit_id, ""), &[])
            .await?
            .data()
    }

    /// Switch a unit on or off.
    pub async fn set_state(
        &self,
        installation_id: u64,
        unit_id: u64,
        state: ThermostatState,
    ) -> Result<Body> {
        let path = Self::path(installation_id, unit_id, "/state");
        self.client.post(&path, Some(json!({ "state": state }))).await
    }

    /// Set the setpoint of a unit, in degrees Celsius.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] for a NaN or infinite temperature.
    pub async fn set_temperature(
        &self,
        installation_id: u64,
        unit_id: u64,
        temperature: f64,
    ) -> Result<Body> {
        finite("temperature", temperature)?;
        let path = Self::path(installation_id, unit_id, "/setpoint");
        self.client
            .post(&path, Some(json!({ "temperature": temperature })))
            .await
    }

    /// Select the preset a unit follows.
    pub async fn set_preset(
        &self,
        installation_id: u64,
        unit_id: u64,
        preset: ThermostatPreset,
    ) -> Result<Body> {
        let path = Self::path(installation_id, unit_id, "/preset");
        self.client.post(&path, Some(json!({ "preset": preset }))).await
    }

    /// Configure the away, vacation and party setpoints for both modes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] if any setpoint is NaN or infinite.
    pub async fn set_preset_config(
        &self,
        installation_id: u64,
        unit_id: u64,
        heating: PresetTemperatures,
        cooling: PresetTemperatures,
    ) -> Result<Body> {
        for temperatures in [&heating, &cooling] {
            finite("away temperature", temperatures.away)?;
            finite("vacation temperature", temperatures.vacation)?;
            finite("party temperature", temperatures.party)?;
        }
        let path = Self::path(installation_id, unit_id, "/preset/config");
        self.client
            .post(&path, Some(json!({ "heating": heating, "cooling": cooling })))
            .await
    }
}

impl Resource for ThermostatUnits<'_> {
    fn client(&self) -> &Client {
        self.client
    }
}

fn finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::Argument(format!("{name} must be a finite number, got {value}")))
    }
}
