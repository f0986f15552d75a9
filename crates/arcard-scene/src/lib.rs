//! arcard Scene - Bevy plugin for the tracked-image overlay
//!
//! This crate anchors the arcard overlay (video frame, border and three
//! tappable icons) to every image reported in [`TrackedImageFeed`]. The five
//! overlay models are loaded once into the shared [`OverlayAssets`] cache;
//! overlays stay hidden until all of them are ready.

pub mod assets;
pub mod interaction;
pub mod overlay;

use bevy::prelude::*;

use arcard_core::{dispatcher_from_config, Config};

/// Plugin that sets up asset loading, overlay sync and tap handling
#[derive(Default)]
pub struct ArcardScenePlugin {
    pub config: Config,
}

impl ArcardScenePlugin {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl Plugin for ArcardScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(OverlayAssets::new(self.config.assets.clone()))
            .insert_resource(OverlaySettings {
                layout: self.config.layout.clone(),
                actions: self.config.actions.clone(),
                interaction: self.config.interaction.clone(),
            });

        if !app.world().contains_resource::<OverlayDispatcher>() {
            let dispatcher = dispatcher_from_config(&self.config.dispatch);
            tracing::info!(dispatcher = dispatcher.name(), "Installing tap dispatcher");
            app.insert_resource(OverlayDispatcher(dispatcher));
        }

        app.add_plugins(assets::OverlayAssetsPlugin)
            .add_plugins(overlay::OverlayPlugin)
            .add_plugins(interaction::InteractionPlugin);
    }
}

// Re-export commonly used types
pub use assets::OverlayAssets;
pub use interaction::{DispatchLog, MainCamera, OverlayDispatcher, PointerCaptured, TapRay};
pub use overlay::{AnchoredOverlay, OverlayPart, OverlaySettings, TrackedImageFeed};
