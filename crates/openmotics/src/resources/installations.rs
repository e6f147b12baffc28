//! Installations API endpoint

use super::{Resource, filter_query};
use crate::{client::Client, error::Result, types::Installation};

/// Installations API resource.
#[derive(Clone, Copy)]
pub struct Installations<'a> {
    client: &'a Client,
}

impl<'a> Installations<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List the installations the credentials give access to.
    ///
    /// `filter` is passed through as the `filter` query parameter.
    pub async fn list(&self, filter: Option<&str>) -> Result<Vec<Installation>> {
        self.client
            .get("/base/installations", &filter_query(filter))
            .await?
            .data()
    }

    /// Get one installation.
    pub async fn get(&self, installation_id: u64) -> Result<Installation> {
        self.client
            .get(&format!("/base/installations/{installation_id}"), &[])
            .await?
            .data()
    }
}

impl Resource for Installations<'_> {
    fn client(&self) -> &Client {
        self.client
    }
}
