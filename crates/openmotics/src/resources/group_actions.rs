//! Group actions API endpoint

use super::{Resource, filter_query, installation_path};
use crate::{
    client::Client,
    error::{Error, Result},
    http::Body,
    types::GroupAction,
};

/// Usage of group actions that act as scenes (e.g. watching tv).
pub const SCENE: &str = "SCENE";

/// Group actions API resource.
///
/// Triggering is a POST; like any POST it is retried on transient failures
/// and may then run twice.
#[derive(Clone, Copy)]
pub struct GroupActions<'a> {
    client: &'a Client,
}

impl<'a> GroupActions<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List the group actions of an installation.
    pub async fn list(
        &self,
        installation_id: u64,
        filter: Option<&str>,
    ) -> Result<Vec<GroupAction>> {
        self.client
            .get(&installation_path(installation_id, "/groupactions"), &filter_query(filter))
            .await?
            .data()
    }

    /// Get one group action.
    pub async fn get(&self, installation_id: u64, group_action_id: u64) -> Result<GroupAction> {
        let path = installation_path(installation_id, &format!("/groupactions/{group_action_id}"));
        self.client.get(&path, &[]).await?.data()
    }

    /// Trigger a group action.
    pub async fn trigger(&self, installation_id: u64, group_action_id: u64) -> Result<Body> {
        let path = installation_path(
            installation_id,
            &format!("/groupactions/{group_action_id}/trigger"),
        );
        self.client.post(&path, None).await
    }

    /// List the group actions intended for `usage` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] for an empty usage without calling the API.
    pub async fn by_usage(&self, installation_id: u64, usage: &str) -> Result<Vec<GroupAction>> {
        let usage = usage.trim();
        if usage.is_empty() {
            return Err(Error::Argument("group action usage cannot be empty".to_string()));
        }
        let usage = usage.to_uppercase();
        self.client
            .get(
                &installation_path(installation_id, "/groupactions"),
                &[("usage", usage.as_str())],
            )
            .await?
            .data()
    }

    /// List the group actions usable as scenes.
    pub async fn scenes(&self, installation_id: u64) -> Result<Vec<GroupAction>> {
        self.by_usage(installation_id, SCENE).await
    }
}

impl Resource for GroupActions<'_> {
    fn client(&self) -> &Client {
        self.client
    }
}
