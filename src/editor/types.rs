//! Value types exchanged with the editor collaborator.

use serde::{Deserialize, Serialize};

/// World-space position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Vector3 {
    /// Creates a vector from its components.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Orientation in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotator {
    /// Rotation about the lateral axis.
    pub pitch: f64,
    /// Rotation about the vertical axis.
    pub yaw: f64,
    /// Rotation about the forward axis.
    pub roll: f64,
}

impl Rotator {
    /// Creates a rotator from its components.
    #[must_use]
    pub const fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }
}

/// Project identity reported by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    /// Project name.
    pub name: String,
    /// Engine version string.
    pub engine_version: String,
    /// Name of the open world; `None` when no world is loaded.
    pub world_name: Option<String>,
}

/// Result of a successful spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorHandle {
    /// Editor-unique actor name.
    pub name: String,
    /// Concrete engine class of the spawned actor.
    pub class_name: String,
}

/// One entry of a level enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorInfo {
    /// Editor-unique actor name.
    pub name: String,
    /// Engine class name.
    pub class_name: String,
    /// Actor location.
    pub location: Vector3,
    /// Actor orientation.
    pub rotation: Rotator,
}
