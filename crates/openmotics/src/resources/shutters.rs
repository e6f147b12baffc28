//! Shutters API endpoint
//!
//! Positions are expressed in steps, from 0 up to (excluding) the `steps`
//! value in the shutter's configuration. Position, preset and lock calls are
//! not supported by every gateway; unsupported calls surface as
//! [`Error::ClientError`](crate::Error::ClientError).

use serde_json::json;

use super::{Resource, filter_query, installation_path};
use crate::{
    client::Client,
    error::{Error, Result},
    http::Body,
    types::Shutter,
};

/// Shutters API resource.
#[derive(Clone, Copy)]
pub struct Shutters<'a> {
    client: &'a Client,
}

impl<'a> Shutters<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List the shutters of an installation.
    pub async fn list(&self, installation_id: u64, filter: Option<&str>) -> Result<Vec<Shutter>> {
        self.client
            .get(&installation_path(installation_id, "/shutters"), &filter_query(filter))
            .await?
            .data()
    }

    /// Get one shutter.
    pub async fn get(&self, installation_id: u64, shutter_id: u64) -> Result<Shutter> {
        self.client
            .get(&installation_path(installation_id, &format!("/shutters/{shutter_id}")), &[])
            .await?
            .data()
    }

    /// Move a shutter up.
    pub async fn move_up(&self, installation_id: u64, shutter_id: u64) -> Result<Body> {
        self.action(installation_id, shutter_id, "up", None).await
    }

    /// Move a shutter down.
    pub async fn move_down(&self, installation_id: u64, shutter_id: u64) -> Result<Body> {
        self.action(installation_id, shutter_id, "down", None).await
    }

    /// Stop a moving shutter.
    pub async fn stop(&self, installation_id: u64, shutter_id: u64) -> Result<Body> {
        self.action(installation_id, shutter_id, "stop", None).await
    }

    /// Move a shutter to an absolute position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] for a negative position without calling
    /// the API.
    pub async fn change_position(
        &self,
        installation_id: u64,
        shutter_id: u64,
        position: i64,
    ) -> Result<Body> {
        let position = non_negative("position", position)?;
        self.action(
            installation_id,
            shutter_id,
            "change_position",
            Some(json!({ "position": position })),
        )
        .await
    }

    /// Move a shutter by `offset` steps; negative offsets move it up.
    pub async fn change_relative_position(
        &self,
        installation_id: u64,
        shutter_id: u64,
        offset: i64,
    ) -> Result<Body> {
        self.action(
            installation_id,
            shutter_id,
            "change_relative_position",
            Some(json!({ "offset": offset })),
        )
        .await
    }

    /// Lock a shutter. Depending on its capabilities this is a hardware lock
    /// (`LOCAL_LOCK`) or a cloud-side lock (`CLOUD_LOCK`).
    pub async fn lock(&self, installation_id: u64, shutter_id: u64) -> Result<Body> {
        self.action(installation_id, shutter_id, "lock", None).await
    }

    /// Unlock a shutter.
    pub async fn unlock(&self, installation_id: u64, shutter_id: u64) -> Result<Body> {
        self.action(installation_id, shutter_id, "unlock", None).await
    }

    /// Store a preset position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] for a negative position without calling
    /// the API.
    pub async fn preset(
        &self,
        installation_id: u64,
        shutter_id: u64,
        position: i64,
    ) -> Result<Body> {
        let position = non_negative("position", position)?;
        self.action(
            installation_id,
            shutter_id,
            "preset",
            Some(json!({ "position": position })),
        )
        .await
    }

    /// Move a shutter to its stored preset.
    pub async fn move_to_preset(&self, installation_id: u64, shutter_id: u64) -> Result<Body> {
        self.action(installation_id, shutter_id, "move", None).await
    }

    async fn action(
        &self,
        installation_id: u64,
        shutter_id: u64,
        action: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Body> {
        let path = installation_path(installation_id, &format!("/shutters/{shutter_id}/{action}"));
        self.client.post(&path, body).await
    }
}

fn non_negative(name: &str, value: i64) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| Error::Argument(format!("{name} must not be negative, got {value}")))
}

impl Resource for Shutters<'_> {
    fn client(&self) -> &Client {
        self.client
    }
}
