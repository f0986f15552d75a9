//! Engine-agnostic state of one anchored overlay
//!
//! A node owns the latest image assigned to it and the layout computed for
//! that assignment. Layout is computed exactly once per assignment whether or
//! not the shared assets have loaded; renderability is a separate question
//! answered against the current [`AssetReadiness`].

use tracing::debug;

use crate::action::{ActionsConfig, IconKind, TapAction};
use crate::layout::{LayoutConfig, LayoutError, OverlayLayout};
use crate::readiness::AssetReadiness;
use crate::tracking::{Pose, TrackedImage};

#[derive(Debug, Clone, Default)]
pub struct AnchoredOverlayNode {
    config: LayoutConfig,
    image: Option<TrackedImage>,
    layout: Option<OverlayLayout>,
    /// Bumped on every accepted assignment
    generation: u64,
}

impl AnchoredOverlayNode {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            image: None,
            layout: None,
            generation: 0,
        }
    }

    /// Assign (or clear) the tracked image and recompute the layout for it.
    ///
    /// Invalid extents are rejected and the previous layout is kept. The
    /// tracking state of the rejected update still applies, so a tracker that
    /// stops with degenerate extents hides the overlay.
    pub fn assign(
        &mut self,
        image: Option<TrackedImage>,
    ) -> Result<Option<&OverlayLayout>, LayoutError> {
        let Some(image) = image else {
            self.image = None;
            self.layout = None;
            self.generation += 1;
            return Ok(None);
        };

        let layout = match self.config.compute(image.extents()) {
            Ok(layout) => layout,
            Err(e) => {
                if let Some(current) = self.image.as_mut().filter(|current| current.id == image.id) {
                    current.state = image.state;
                }
                return Err(e);
            }
        };
        debug!(
            image = image.id,
            extent_x = image.extent_x,
            extent_z = image.extent_z,
            "Overlay layout recomputed"
        );
        self.image = Some(image);
        self.layout = Some(layout);
        self.generation += 1;
        Ok(self.layout.as_ref())
    }

    pub fn image(&self) -> Option<&TrackedImage> {
        self.image.as_ref()
    }

    pub fn layout(&self) -> Option<&OverlayLayout> {
        self.layout.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// World pose of the anchor: the centre pose of the assigned image
    pub fn anchor_pose(&self) -> Option<Pose> {
        self.image.as_ref().map(|image| image.center_pose)
    }

    pub fn is_renderable(&self, readiness: &AssetReadiness) -> bool {
        readiness.is_ready()
            && self.layout.is_some()
            && self.image.as_ref().is_some_and(|image| image.is_tracking())
    }

    /// Resolve a tap on one of this node's icons, or `None` while it cannot render
    pub fn tap_action(
        &self,
        icon: IconKind,
        readiness: &AssetReadiness,
        actions: &ActionsConfig,
    ) -> Option<TapAction> {
        if !self.is_renderable(readiness) {
            debug!(icon = %icon, state = readiness.label(), "Ignoring tap on overlay that is not renderable");
            return None;
        }
        Some(actions.action_for(icon))
    }
}
