//! HUD overlay using bevy_egui

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};

use arcard_core::AssetReadiness;
use arcard_scene::{DispatchLog, OverlayAssets, OverlayDispatcher, PointerCaptured, TrackedImageFeed};

use crate::tracker::SimulatedTracker;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        // Runs in EguiPrimaryContextPass for proper input handling (bevy_egui 0.38+)
        app.add_systems(EguiPrimaryContextPass, hud_system);
    }
}

fn readiness_color(readiness: &AssetReadiness) -> egui::Color32 {
    match readiness {
        AssetReadiness::Ready => egui::Color32::GREEN,
        AssetReadiness::AwaitingAssets { .. } => egui::Color32::YELLOW,
        AssetReadiness::Failed { .. } => egui::Color32::RED,
    }
}

fn hud_system(
    mut contexts: EguiContexts,
    assets: Res<OverlayAssets>,
    feed: Res<TrackedImageFeed>,
    tracker: Res<SimulatedTracker>,
    log: Res<DispatchLog>,
    dispatcher: Res<OverlayDispatcher>,
    mut captured: ResMut<PointerCaptured>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    egui::Window::new("arcard")
        .default_pos([12.0, 12.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Assets:");
                ui.label(
                    egui::RichText::new(assets.readiness.label())
                        .color(readiness_color(&assets.readiness)),
                );
            });
            match &assets.readiness {
                AssetReadiness::AwaitingAssets { .. } => {
                    let pending: Vec<String> = assets
                        .readiness
                        .pending()
                        .iter()
                        .map(|asset| asset.to_string())
                        .collect();
                    ui.label(
                        egui::RichText::new(format!("Pending: {}", pending.join(", ")))
                            .small()
                            .color(egui::Color32::GRAY),
                    );
                }
                AssetReadiness::Failed { asset, cause } => {
                    ui.label(
                        egui::RichText::new(format!("{}: {}", asset, cause))
                            .small()
                            .color(egui::Color32::LIGHT_RED),
                    );
                }
                AssetReadiness::Ready => {}
            }

            ui.separator();

            if feed.images.is_empty() {
                ui.label("No image tracked");
            }
            for image in feed.images.values() {
                ui.label(format!(
                    "{} #{}: {:.3} x {:.3} m ({:?})",
                    image.name, image.id, image.extent_x, image.extent_z, image.state
                ));
            }
            ui.label(
                egui::RichText::new(format!(
                    "Simulated card {}",
                    if tracker.detected { "detected" } else { "hidden" }
                ))
                .small()
                .color(egui::Color32::GRAY),
            );

            ui.separator();

            ui.label(format!("Dispatcher: {}", dispatcher.0.name()));
            if log.entries.is_empty() {
                ui.label(egui::RichText::new("No taps yet").small().color(egui::Color32::GRAY));
            }
            for request in log.entries.iter().rev() {
                ui.label(egui::RichText::new(request.to_string()).monospace());
            }

            ui.separator();
            ui.label(
                egui::RichText::new("Space: detect/lose card  Arrows: move  +/-: rescale  Click icons to tap")
                    .small()
                    .color(egui::Color32::GRAY),
            );
        });

    captured.0 = ctx.wants_pointer_input() || ctx.is_pointer_over_area();
}
