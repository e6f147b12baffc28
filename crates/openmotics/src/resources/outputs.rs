//! Outputs API endpoint

use serde_json::json;

use super::{Resource, dimmer_value, filter_query, installation_path};
use crate::{client::Client, error::Result, http::Body, types::Output};

/// Outputs API resource.
///
/// # Example
///
/// ```rust,no_run
/// # async fn example(client: openmotics::Client) -> openmotics::Result<()> {
/// let outputs = client.outputs();
/// for output in outputs.list(1, None).await? {
///     if output.is_on() {
///         outputs.turn_off(1, Some(output.id)).await?;
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy)]
pub struct Outputs<'a> {
    client: &'a Client,
}

impl<'a> Outputs<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List the outputs of an installation.
    pub async fn list(&self, installation_id: u64, filter: Option<&str>) -> Result<Vec<Output>> {
        self.client
            .get(&installation_path(installation_id, "/outputs"), &filter_query(filter))
            .await?
            .data()
    }

    /// Get one output.
    pub async fn get(&self, installation_id: u64, output_id: u64) -> Result<Output> {
        self.client
            .get(&installation_path(installation_id, &format!("/outputs/{output_id}")), &[])
            .await?
            .data()
    }

    /// Toggle an output.
    pub async fn toggle(&self, installation_id: u64, output_id: u64) -> Result<Body> {
        let path = installation_path(installation_id, &format!("/outputs/{output_id}/toggle"));
        self.client.post(&path, None).await
    }

    /// Turn an output on. Dimmer values are clamped to 0..=100; `None` means 100.
    pub async fn turn_on(
        &self,
        installation_id: u64,
        output_id: u64,
        value: Option<i64>,
    ) -> Result<Body> {
        let path = installation_path(installation_id, &format!("/outputs/{output_id}/turn_on"));
        let value = dimmer_value(value.unwrap_or(100));
        self.client.post(&path, Some(json!({ "value": value }))).await
    }

    /// Turn one output off, or every output of the installation when
    /// `output_id` is `None`.
    pub async fn turn_off(&self, installation_id: u64, output_id: Option<u64>) -> Result<Body> {
        let path = match output_id {
            Some(output_id) => {
                installation_path(installation_id, &format!("/outputs/{output_id}/turn_off"))
            }
            None => installation_path(installation_id, "/outputs/turn_off"),
        };
        self.client.post(&path, None).await
    }
}

impl Resource for Outputs<'_> {
    fn client(&self) -> &Client {
        self.client
    }
}
