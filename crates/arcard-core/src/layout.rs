//! Overlay layout derived from a tracked image's measured extents
//!
//! Everything here is local to the parent node: the anchor sits at the image
//! centre, the border and video frame hang off the anchor, and the three icons
//! hang off the border. Only the anchor and border depend on the image
//! extents; icon transforms are fixed engine-unit constants.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::IconKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("invalid image extents: {extent_x} x {extent_z} (both must be finite and positive)")]
    InvalidExtents { extent_x: f32, extent_z: f32 },
}

/// Measured physical width/height of a tracked image, in metres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extents {
    pub x: f32,
    pub z: f32,
}

impl Extents {
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    pub fn validate(self) -> Result<Self, LayoutError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if valid(self.x) && valid(self.z) {
            Ok(self)
        } else {
            Err(LayoutError::InvalidExtents {
                extent_x: self.x,
                extent_z: self.z,
            })
        }
    }
}

/// Local translation and scale of a node relative to its parent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalTransform {
    pub translation: [f32; 3],
    pub scale: [f32; 3],
}

impl LocalTransform {
    pub const IDENTITY: LocalTransform = LocalTransform {
        translation: [0.0, 0.0, 0.0],
        scale: [1.0, 1.0, 1.0],
    };

    pub fn new(translation: [f32; 3], scale: [f32; 3]) -> Self {
        Self { translation, scale }
    }
}

/// Computed transforms for every node in one overlay subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayLayout {
    pub extents: Extents,
    pub anchor: LocalTransform,
    pub border: LocalTransform,
    pub video: LocalTransform,
    pub facebook: LocalTransform,
    pub message: LocalTransform,
    pub call: LocalTransform,
}

impl OverlayLayout {
    pub fn icon(&self, kind: IconKind) -> LocalTransform {
        match kind {
            IconKind::Facebook => self.facebook,
            IconKind::Message => self.message,
            IconKind::Call => self.call,
        }
    }
}

/// Tunable layout constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Border width as a multiple of the image width
    #[serde(default = "default_border_scale_x")]
    pub border_scale_x: f32,
    /// Border depth as a multiple of the image height
    #[serde(default = "default_border_scale_z")]
    pub border_scale_z: f32,
    #[serde(default = "default_icon_scale")]
    pub icon_scale: [f32; 3],
    /// Icon column offset along X, in border-local units
    #[serde(default = "default_icon_offset_x")]
    pub icon_offset_x: f32,
    /// Distance between neighbouring icons along Z
    #[serde(default = "default_icon_spacing_z")]
    pub icon_spacing_z: f32,
}

fn default_border_scale_x() -> f32 {
    1.95
}

fn default_border_scale_z() -> f32 {
    1.3
}

fn default_icon_scale() -> [f32; 3] {
    [0.6, 0.1, 0.6]
}

fn default_icon_offset_x() -> f32 {
    0.325
}

fn default_icon_spacing_z() -> f32 {
    0.2
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            border_scale_x: default_border_scale_x(),
            border_scale_z: default_border_scale_z(),
            icon_scale: default_icon_scale(),
            icon_offset_x: default_icon_offset_x(),
            icon_spacing_z: default_icon_spacing_z(),
        }
    }
}

impl LayoutConfig {
    /// Anchor is pinned to the image centre and scaled to its extents
    pub fn anchor_transform(&self, extents: Extents) -> LocalTransform {
        LocalTransform::new([0.0, 0.0, 0.0], [extents.x, 1.0, extents.z])
    }

    pub fn border_transform(&self, extents: Extents) -> LocalTransform {
        LocalTransform::new(
            [0.0, 0.0, 0.0],
            [
                self.border_scale_x * extents.x,
                1.0,
                self.border_scale_z * extents.z,
            ],
        )
    }

    pub fn video_transform(&self) -> LocalTransform {
        LocalTransform::IDENTITY
    }

    pub fn icon_transform(&self, kind: IconKind) -> LocalTransform {
        let z = match kind {
            IconKind::Facebook => -self.icon_spacing_z,
            IconKind::Message => 0.0,
            IconKind::Call => self.icon_spacing_z,
        };
        LocalTransform::new([self.icon_offset_x, 0.0, z], self.icon_scale)
    }

    pub fn compute(&self, extents: Extents) -> Result<OverlayLayout, LayoutError> {
        let extents = extents.validate()?;
        Ok(OverlayLayout {
            extents,
            anchor: self.anchor_transform(extents),
            border: self.border_transform(extents),
            video: self.video_transform(),
            facebook: self.icon_transform(IconKind::Facebook),
            message: self.icon_transform(IconKind::Message),
            call: self.icon_transform(IconKind::Call),
        })
    }

    pub fn validate(&self) -> Result<(), String> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.border_scale_x) || !positive(self.border_scale_z) {
            return Err("border scale factors must be finite and positive".to_string());
        }
        if !self.icon_scale.iter().all(|v| positive(*v)) {
            return Err("icon scale components must be finite and positive".to_string());
        }
        if !self.icon_offset_x.is_finite() || !self.icon_spacing_z.is_finite() {
            return Err("icon offsets must be finite".to_string());
        }
        Ok(())
    }
}
