//! Overlay subtrees anchored to tracked images
//!
//! Each tracked image gets its own subtree:
//!
//! ```text
//! anchor (image centre pose, scaled to extents)
//! ├── video frame
//! └── border
//!     ├── facebook icon
//!     ├── message icon
//!     └── call icon
//! ```
//!
//! Transforms are written once per image assignment. Models are attached and
//! the subtree made visible only once the shared assets are ready.

use bevy::prelude::*;
use std::collections::{BTreeMap, HashMap};

use arcard_core::{
    ActionsConfig, AnchoredOverlayNode, IconKind, InteractionConfig, LayoutConfig, LocalTransform,
    OverlayAsset, OverlayLayout, Pose, TrackedImage,
};

use crate::assets::OverlayAssets;

/// Input boundary: the images the host tracker currently reports, by id
#[derive(Debug, Clone, Resource, Default)]
pub struct TrackedImageFeed {
    pub images: BTreeMap<u32, TrackedImage>,
}

impl TrackedImageFeed {
    /// Insert or replace the image with the same id
    pub fn upsert(&mut self, image: TrackedImage) {
        self.images.insert(image.id, image);
    }

    pub fn remove(&mut self, id: u32) -> Option<TrackedImage> {
        self.images.remove(&id)
    }

    pub fn get(&self, id: u32) -> Option<&TrackedImage> {
        self.images.get(&id)
    }
}

/// Overlay tuning shared by all overlays
#[derive(Debug, Clone, Resource, Default)]
pub struct OverlaySettings {
    pub layout: LayoutConfig,
    pub actions: ActionsConfig,
    pub interaction: InteractionConfig,
}

/// Root of one overlay subtree, pinned to a tracked image
#[derive(Component)]
pub struct AnchoredOverlay {
    pub image_id: u32,
    pub node: AnchoredOverlayNode,
    /// Node generation whose layout has been written to the transforms
    pub applied_generation: u64,
}

/// Which part of the subtree an entity is
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPart {
    Border,
    VideoFrame,
    Icon(IconKind),
}

/// Links a part back to its anchor entity
#[derive(Component, Debug, Clone, Copy)]
pub struct OverlayOwner(pub Entity);

/// Model to attach to this entity once assets are ready
#[derive(Component, Debug, Clone, Copy)]
pub struct OverlayModel(pub OverlayAsset);

pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TrackedImageFeed>()
            .init_resource::<OverlaySettings>()
            .init_resource::<OverlayAssets>()
            .add_systems(Update, sync_tracked_images)
            .add_systems(Update, apply_overlay_layout.after(sync_tracked_images))
            .add_systems(Update, attach_models_when_ready.after(sync_tracked_images))
            .add_systems(Update, update_overlay_visibility.after(apply_overlay_layout));
    }
}

/// Spawn a hidden subtree for a newly seen image
fn spawn_overlay(commands: &mut Commands, image_id: u32, node: AnchoredOverlayNode) -> Entity {
    let anchor = commands
        .spawn((
            Name::new(format!("overlay-{}", image_id)),
            Transform::IDENTITY,
            Visibility::Hidden,
            AnchoredOverlay {
                image_id,
                node,
                applied_generation: 0,
            },
        ))
        .id();

    commands.spawn((
        Name::new("video-frame"),
        Transform::IDENTITY,
        Visibility::Inherited,
        OverlayPart::VideoFrame,
        OverlayOwner(anchor),
        OverlayModel(OverlayAsset::VideoFrame),
        ChildOf(anchor),
    ));

    let border = commands
        .spawn((
            Name::new("border"),
            Transform::IDENTITY,
            Visibility::Inherited,
            OverlayPart::Border,
            OverlayOwner(anchor),
            OverlayModel(OverlayAsset::Border),
            ChildOf(anchor),
        ))
        .id();

    for icon in IconKind::ALL {
        commands.spawn((
            Name::new(format!("{}-icon", icon)),
            Transform::IDENTITY,
            Visibility::Inherited,
            OverlayPart::Icon(icon),
            OverlayOwner(anchor),
            OverlayModel(icon.asset()),
            ChildOf(border),
        ));
    }

    tracing::info!(image = image_id, "Spawned overlay subtree");
    anchor
}

/// Assign the latest tracked images to their overlays
fn sync_tracked_images(
    mut commands: Commands,
    feed: Res<TrackedImageFeed>,
    settings: Res<OverlaySettings>,
    mut overlays: Query<(Entity, &mut AnchoredOverlay)>,
) {
    if !feed.is_changed() {
        return;
    }

    let mut existing: HashMap<u32, Entity> = HashMap::new();
    for (entity, mut overlay) in overlays.iter_mut() {
        match feed.get(overlay.image_id) {
            Some(image) => {
                existing.insert(overlay.image_id, entity);
                if overlay.node.image() == Some(image) {
                    continue;
                }
                if let Err(e) = overlay.node.assign(Some(image.clone())) {
                    tracing::warn!(image = image.id, "Rejected tracked image update: {}", e);
                }
            }
            None => {
                tracing::info!(image = overlay.image_id, "Tracked image lost, removing overlay");
                commands.entity(entity).despawn();
            }
        }
    }

    for image in feed.images.values() {
        if existing.contains_key(&image.id) {
            continue;
        }
        let mut node = AnchoredOverlayNode::new(settings.layout.clone());
        if let Err(e) = node.assign(Some(image.clone())) {
            tracing::warn!(image = image.id, "Rejected tracked image: {}", e);
        }
        spawn_overlay(&mut commands, image.id, node);
    }
}

pub fn pose_to_transform(pose: &Pose) -> Transform {
    let rotation = Quat::from_array(pose.rotation);
    let rotation = if rotation.length_squared() > f32::EPSILON {
        rotation.normalize()
    } else {
        Quat::IDENTITY
    };
    Transform::from_translation(Vec3::from_array(pose.translation)).with_rotation(rotation)
}

pub fn local_to_transform(local: &LocalTransform) -> Transform {
    Transform::from_translation(Vec3::from_array(local.translation))
        .with_scale(Vec3::from_array(local.scale))
}

fn part_transform(layout: &OverlayLayout, part: OverlayPart) -> Transform {
    match part {
        OverlayPart::Border => local_to_transform(&layout.border),
        OverlayPart::VideoFrame => local_to_transform(&layout.video),
        OverlayPart::Icon(icon) => local_to_transform(&layout.icon(icon)),
    }
}

/// Write anchor and child transforms for overlays with a new assignment
fn apply_overlay_layout(
    mut overlays: Query<(Entity, &mut AnchoredOverlay, &mut Transform)>,
    mut parts: Query<(&OverlayPart, &OverlayOwner, &mut Transform), Without<AnchoredOverlay>>,
) {
    let mut updated: HashMap<Entity, OverlayLayout> = HashMap::new();

    for (entity, mut overlay, mut transform) in overlays.iter_mut() {
        if overlay.applied_generation == overlay.node.generation() {
            continue;
        }
        overlay.applied_generation = overlay.node.generation();

        let (Some(pose), Some(layout)) = (overlay.node.anchor_pose(), overlay.node.layout())
        else {
            continue;
        };
        *transform = pose_to_transform(&pose).mul_transform(local_to_transform(&layout.anchor));
        updated.insert(entity, layout.clone());
    }

    if updated.is_empty() {
        return;
    }

    for (part, owner, mut transform) in parts.iter_mut() {
        if let Some(layout) = updated.get(&owner.0) {
            *transform = part_transform(layout, *part);
        }
    }
}

/// Attach models to overlay parts once every asset has loaded
fn attach_models_when_ready(
    mut commands: Commands,
    assets: Res<OverlayAssets>,
    parts: Query<(Entity, &OverlayModel), Without<SceneRoot>>,
) {
    if !assets.readiness.is_ready() {
        return;
    }

    for (entity, model) in parts.iter() {
        match assets.scene(model.0) {
            Some(scene) => {
                commands.entity(entity).insert(SceneRoot(scene.clone()));
            }
            None => tracing::debug!(asset = %model.0, "Ready without a scene handle"),
        }
    }
}

/// Show an overlay only while its image is tracked and the assets are ready
fn update_overlay_visibility(
    assets: Res<OverlayAssets>,
    mut overlays: Query<(&AnchoredOverlay, &mut Visibility)>,
) {
    for (overlay, mut visibility) in overlays.iter_mut() {
        let target = if overlay.node.is_renderable(&assets.readiness) {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(target);
    }
}
