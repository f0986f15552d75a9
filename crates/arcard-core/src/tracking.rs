//! Tracked image handles supplied by the host tracker

use serde::{Deserialize, Serialize};

use crate::layout::Extents;

/// Tracking quality reported by the host tracker for an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingState {
    /// Actively tracked this frame
    #[default]
    Tracking,
    /// Temporarily lost, may resume
    Paused,
    /// Tracking stopped and will not resume
    Stopped,
}

/// Rigid pose in scene units: translation (metres) and rotation quaternion (x, y, z, w)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub translation: [f32; 3],
    pub rotation: [f32; 4],
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
    };

    pub fn from_translation(translation: [f32; 3]) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A recognized physical image with its live centre pose and measured extents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedImage {
    /// Index of the image in the reference database
    pub id: u32,
    pub name: String,
    pub center_pose: Pose,
    /// Measured width in metres
    pub extent_x: f32,
    /// Measured height in metres
    pub extent_z: f32,
    #[serde(default)]
    pub state: TrackingState,
}

impl TrackedImage {
    pub fn new(id: u32, name: impl Into<String>, extent_x: f32, extent_z: f32) -> Self {
        Self {
            id,
            name: name.into(),
            center_pose: Pose::IDENTITY,
            extent_x,
            extent_z,
            state: TrackingState::Tracking,
        }
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.center_pose = pose;
        self
    }

    pub fn with_state(mut self, state: TrackingState) -> Self {
        self.state = state;
        self
    }

    pub fn extents(&self) -> Extents {
        Extents::new(self.extent_x, self.extent_z)
    }

    pub fn is_tracking(&self) -> bool {
        self.state == TrackingState::Tracking
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_extents() {
        let pose = Pose::from_translation([0.1, 0.0, -0.4]);
        let image = TrackedImage::new(2, "card", 0.2, 0.3)
            .with_pose(pose)
            .with_state(TrackingState::Paused);

        assert_eq!(image.center_pose, pose);
        assert_eq!(image.center_pose.rotation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(image.extents(), Extents::new(0.2, 0.3));
        assert!(!image.is_tracking());
        assert!(image.with_state(TrackingState::Tracking).is_tracking());
    }

    #[test]
    fn test_state_defaults_to_tracking() {
        let toml = r#"
id = 0
name = "card"
extent_x = 0.2
extent_z = 0.3

[center_pose]
translation = [0.0, 0.0, 0.0]
rotation = [0.0, 0.0, 0.0, 1.0]
"#;
        let image: TrackedImage = toml::from_str(toml).unwrap();
        assert_eq!(image.state, TrackingState::Tracking);
        assert!(image.is_tracking());
    }
}
