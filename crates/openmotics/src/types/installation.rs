//! Installation records

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An OpenMotics installation (one gateway and everything behind it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installation {
    /// Installation identifier
    pub id: u64,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,

    /// Gateway hardware model
    #[serde(default)]
    pub gateway_model: Option<String>,

    /// Access control flags (`configure`, `view`, `control`)
    #[serde(rename = "_acl", default)]
    pub acl: Option<Value>,

    /// Record version
    #[serde(rename = "_version", default)]
    pub version: Option<Value>,

    /// Role of the authenticated user
    #[serde(default)]
    pub user_role: Option<Value>,

    /// Gateway registration key
    #[serde(default)]
    pub registration_key: Option<String>,

    /// Platform (e.g. `CLASSIC`)
    #[serde(default)]
    pub platform: Option<String>,

    /// Building roles
    #[serde(default)]
    pub building_roles: Option<Value>,

    /// Network details such as `local_ip_address`
    #[serde(default)]
    pub network: Option<Value>,

    /// Status flags such as `ONLINE`
    #[serde(default)]
    pub flags: Option<Value>,

    /// Available and used features
    #[serde(default)]
    pub features: Option<Value>,
}

impl Installation {
    /// The gateway's address on its local network, if reported.
    pub fn local_ip_address(&self) -> Option<&str> {
        self.network.as_ref()?.get("local_ip_address")?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_cloud_installation() {
        let installation: Installation = serde_json::from_value(json!({
            "id": 1,
            "name": "John Doe",
            "description": "",
            "gateway_model": "openmotics",
            "_acl": {"view": {"allowed": true}},
            "_version": 1.0,
            "platform": "CLASSIC",
            "network": {"local_ip_address": "172.16.1.25"},
            "flags": {"UNREAD_NOTIFICATIONS": 0, "ONLINE": null},
            "something_new": true
        }))
        .unwrap();

        assert_eq!(installation.id, 1);
        assert_eq!(installation.name.as_deref(), Some("John Doe"));
        assert_eq!(installation.version, Some(json!(1.0)));
        assert_eq!(installation.local_ip_address(), Some("172.16.1.25"));
        assert!(installation.features.is_none());
    }
}
