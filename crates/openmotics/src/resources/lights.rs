//! Lights API endpoint

use serde_json::json;

use super::{Resource, dimmer_value, filter_query, installation_path};
use crate::{client::Client, error::Result, http::Body, types::Light};

/// Lights API resource.
#[derive(Clone, Copy)]
pub struct Lights<'a> {
    client: &'a Client,
}

impl<'a> Lights<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List the lights of an installation.
    pub async fn list(&self, installation_id: u64, filter: Option<&str>) -> Result<Vec<Light>> {
        self.client
            .get(&installation_path(installation_id, "/lights"), &filter_query(filter))
            .await?
            .data()
    }

    /// Get one light.
    pub async fn get(&self, installation_id: u64, light_id: u64) -> Result<Light> {
        self.client
            .get(&installation_path(installation_id, &format!("/lights/{light_id}")), &[])
            .await?
            .data()
    }

    /// Toggle a light.
    pub async fn toggle(&self, installation_id: u64, light_id: u64) -> Result<Body> {
        let path = installation_path(installation_id, &format!("/lights/{light_id}/toggle"));
        self.client.post(&path, None).await
    }

    /// Turn a light on. Brightness values are clamped to 0..=100; `None` means 100.
    pub async fn turn_on(
        &self,
        installation_id: u64,
        light_id: u64,
        value: Option<i64>,
    ) -> Result<Body> {
        let path = installation_path(installation_id, &format!("/lights/{light_id}/turn_on"));
        let value = dimmer_value(value.unwrap_or(100));
        self.client.post(&path, Some(json!({ "value": value }))).await
    }

    /// Turn one light off, or every light of the installation when
    /// `light_id` is `None`.
    pub async fn turn_off(&self, installation_id: u64, light_id: Option<u64>) -> Result<Body> {
        let path = match light_id {
            Some(light_id) => {
                installation_path(installation_id, &format!("/lights/{light_id}/turn_off"))
            }
            None => installation_path(installation_id, "/lights/turn_off"),
        };
        self.client.post(&path, None).await
    }
}

impl Resource for Lights<'_> {
    fn client(&self) -> &Client {
        self.client
    }
}
