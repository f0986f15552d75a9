//! Keyboard-driven stand-in for a real image tracker
//!
//! Space toggles detection of a 0.2 x 0.3 m card, arrow keys slide it
//! across the table and +/- rescale its measured extents. The physical card
//! itself is drawn as a flat plane so the overlay has something to sit on.

use bevy::prelude::*;

use arcard_core::{Pose, TrackedImage};
use arcard_scene::TrackedImageFeed;

const CARD_ID: u32 = 0;
const MOVE_STEP: f32 = 0.01;
const SCALE_STEP: f32 = 1.1;

/// One edit to the simulated card
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackerInput {
    ToggleDetection,
    Move(Vec2),
    Scale(f32),
}

#[derive(Debug, Clone, Resource)]
pub struct SimulatedTracker {
    pub detected: bool,
    pub image: TrackedImage,
}

impl Default for SimulatedTracker {
    fn default() -> Self {
        Self {
            detected: false,
            image: TrackedImage::new(CARD_ID, "business-card", 0.2, 0.3),
        }
    }
}

impl SimulatedTracker {
    pub fn apply(&mut self, input: TrackerInput) {
        match input {
            TrackerInput::ToggleDetection => self.detected = !self.detected,
            TrackerInput::Move(delta) => {
                self.image.center_pose.translation[0] += delta.x;
                self.image.center_pose.translation[2] += delta.y;
            }
            TrackerInput::Scale(factor) => {
                self.image.extent_x *= factor;
                self.image.extent_z *= factor;
            }
        }
    }
}

/// Marker for the plane standing in for the physical card
#[derive(Component)]
pub struct PhysicalCard;

pub struct TrackerPlugin;

impl Plugin for TrackerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulatedTracker>()
            .add_systems(Startup, spawn_physical_card)
            .add_systems(Update, (read_tracker_keys, publish_tracked_image).chain())
            .add_systems(Update, sync_physical_card.after(read_tracker_keys));
    }
}

fn spawn_physical_card(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(1.0, 1.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.85, 0.85, 0.8),
            perceptual_roughness: 0.9,
            ..default()
        })),
        Transform::default(),
        Visibility::Hidden,
        PhysicalCard,
    ));
}

fn read_tracker_keys(keyboard: Res<ButtonInput<KeyCode>>, mut tracker: ResMut<SimulatedTracker>) {
    let mut inputs = Vec::new();

    if keyboard.just_pressed(KeyCode::Space) {
        inputs.push(TrackerInput::ToggleDetection);
    }

    let mut delta = Vec2::ZERO;
    if keyboard.just_pressed(KeyCode::ArrowLeft) {
        delta.x -= MOVE_STEP;
    }
    if keyboard.just_pressed(KeyCode::ArrowRight) {
        delta.x += MOVE_STEP;
    }
    if keyboard.just_pressed(KeyCode::ArrowUp) {
        delta.y -= MOVE_STEP;
    }
    if keyboard.just_pressed(KeyCode::ArrowDown) {
        delta.y += MOVE_STEP;
    }
    if delta != Vec2::ZERO {
        inputs.push(TrackerInput::Move(delta));
    }

    if keyboard.any_just_pressed([KeyCode::Equal, KeyCode::NumpadAdd]) {
        inputs.push(TrackerInput::Scale(SCALE_STEP));
    }
    if keyboard.any_just_pressed([KeyCode::Minus, KeyCode::NumpadSubtract]) {
        inputs.push(TrackerInput::Scale(1.0 / SCALE_STEP));
    }

    for input in inputs {
        tracker.apply(input);
        tracing::debug!(?input, "Simulated tracker input");
    }
}

/// Push the simulated card into the feed the overlay plugin reads
fn publish_tracked_image(tracker: Res<SimulatedTracker>, mut feed: ResMut<TrackedImageFeed>) {
    if !tracker.is_changed() {
        return;
    }

    if tracker.detected {
        if feed.get(CARD_ID) != Some(&tracker.image) {
            tracing::info!(
                extent_x = tracker.image.extent_x,
                extent_z = tracker.image.extent_z,
                "Card detected"
            );
            feed.upsert(tracker.image.clone());
        }
    } else if feed.get(CARD_ID).is_some() {
        tracing::info!("Card lost");
        feed.remove(CARD_ID);
    }
}

fn sync_physical_card(
    tracker: Res<SimulatedTracker>,
    mut cards: Query<(&mut Transform, &mut Visibility), With<PhysicalCard>>,
) {
    if !tracker.is_changed() {
        return;
    }

    let pose: Pose = tracker.image.center_pose;
    for (mut transform, mut visibility) in cards.iter_mut() {
        *transform = Transform::from_translation(Vec3::from_array(pose.translation))
            .with_scale(Vec3::new(tracker.image.extent_x, 1.0, tracker.image.extent_z));
        visibility.set_if_neq(if tracker.detected {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_inputs() {
        let mut tracker = SimulatedTracker::default();
        assert!(!tracker.detected);

        tracker.apply(TrackerInput::ToggleDetection);
        assert!(tracker.detected);

        tracker.apply(TrackerInput::Move(Vec2::new(0.01, -0.02)));
        assert_eq!(tracker.image.center_pose.translation, [0.01, 0.0, -0.02]);

        tracker.apply(TrackerInput::Scale(2.0));
        assert_eq!(tracker.image.extent_x, 0.4);
        assert_eq!(tracker.image.extent_z, 0.6);
    }

    #[test]
    fn test_feed_follows_detection() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<TrackedImageFeed>()
            .init_resource::<SimulatedTracker>()
            .add_systems(Update, publish_tracked_image);

        app.world_mut()
            .resource_mut::<SimulatedTracker>()
            .apply(TrackerInput::ToggleDetection);
        app.update();
        assert!(app.world().resource::<TrackedImageFeed>().get(CARD_ID).is_some());

        app.world_mut()
            .resource_mut::<SimulatedTracker>()
            .apply(TrackerInput::ToggleDetection);
        app.update();
        assert!(app.world().resource::<TrackedImageFeed>().get(CARD_ID).is_none());
    }
}
