//! Placement of a device within an installation

use serde::{Deserialize, Serialize};

/// Where a device sits in the building.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Position on the floor plan
    #[serde(default)]
    pub floor_coordinates: Option<FloorCoordinates>,

    /// Floor identifier
    #[serde(default)]
    pub floor_id: Option<u64>,

    /// Installation the device belongs to
    #[serde(default)]
    pub installation_id: Option<u64>,

    /// Gateway the device is wired to
    #[serde(default)]
    pub gateway_id: Option<u64>,

    /// Room identifier
    #[serde(default)]
    pub room_id: Option<u64>,
}

/// Floor plan coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorCoordinates {
    /// Horizontal position
    pub x: Option<i64>,
    /// Vertical position
    pub y: Option<i64>,
}
