//! Sensors API endpoint

use super::{Resource, filter_query, installation_path};
use crate::{client::Client, error::Result, types::Sensor};

/// Sensors API resource.
#[derive(Clone, Copy)]
pub struct Sensors<'a> {
    client: &'a Client,
}

impl<'a> Sensors<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List the sensors of an installation.
    pub async fn list(&self, installation_id: u64, filter: Option<&str>) -> Result<Vec<Sensor>> {
        self.client
            .get(&installation_path(installation_id, "/sensors"), &filter_query(filter))
            .await?
            .data()
    }

    /// Get one sensor.
    pub async fn get(&self, installation_id: u64, sensor_id: u64) -> Result<Sensor> {
        self.client
            .get(&installation_path(installation_id, &format!("/sensors/{sensor_id}")), &[])
            .await?
            .data()
    }
}

impl Resource for Sensors<'_> {
    fn client(&self) -> &Client {
        self.client
    }
}
