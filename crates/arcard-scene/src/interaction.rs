//! Icon taps: hit-testing and dispatch

use bevy::prelude::*;
use std::collections::VecDeque;

use arcard_core::{AssetReadiness, DispatchRequest, Dispatcher, IconKind, SuppressedDispatcher};

use crate::assets::OverlayAssets;
use crate::overlay::{AnchoredOverlay, OverlayOwner, OverlayPart, OverlaySettings};

/// Marker component for the camera taps are cast from
#[derive(Component)]
pub struct MainCamera;

/// Platform dispatcher used for icon taps
#[derive(Resource)]
pub struct OverlayDispatcher(pub Box<dyn Dispatcher>);

impl Default for OverlayDispatcher {
    fn default() -> Self {
        Self(Box::new(SuppressedDispatcher))
    }
}

/// Set by UI layers that own the pointer this frame
#[derive(Debug, Clone, Resource, Default)]
pub struct PointerCaptured(pub bool);

/// World-space ray of a tap waiting to be resolved against the icons
#[derive(Debug, Clone, Copy, Resource, Default)]
pub struct TapRay(pub Option<Ray3d>);

/// Most recent successfully dispatched requests, newest last
#[derive(Debug, Clone, Resource, Default)]
pub struct DispatchLog {
    pub entries: VecDeque<DispatchRequest>,
}

impl DispatchLog {
    const CAPACITY: usize = 8;

    pub fn push(&mut self, request: DispatchRequest) {
        if self.entries.len() == Self::CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(request);
    }
}

#[derive(Resource, Default)]
pub struct TouchState {
    /// Position where touch started
    start_position: Option<Vec2>,
    /// Whether this touch has moved far enough to be a drag, not a tap
    is_dragging: bool,
}

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TouchState>()
            .init_resource::<PointerCaptured>()
            .init_resource::<TapRay>()
            .init_resource::<DispatchLog>()
            .add_systems(Update, (capture_tap_ray, resolve_icon_taps).chain());

        if !app.world().contains_resource::<OverlayDispatcher>() {
            app.init_resource::<OverlayDispatcher>();
        }
    }
}

/// Where `ray` crosses the XZ plane of an icon's model space, in model units
fn footprint_hit(ray: Ray3d, transform: &GlobalTransform) -> Option<Vec2> {
    let to_local = transform.affine().inverse();
    let origin = to_local.transform_point3(ray.origin);
    let direction = to_local.transform_vector3(*ray.direction);
    if !(origin.is_finite() && direction.is_finite()) || direction.y.abs() <= f32::EPSILON {
        return None;
    }

    let t = -origin.y / direction.y;
    if t < 0.0 {
        return None;
    }
    let hit = origin + direction * t;
    Some(Vec2::new(hit.x, hit.z))
}

/// Pick the icon whose footprint the ray lands in, closest to that icon's centre.
///
/// Footprints are squares of `half_extent` in each icon's model space, so the
/// hit area follows the icon's world transform.
pub fn pick_icon<I>(ray: Ray3d, candidates: I, half_extent: f32) -> Option<(Entity, IconKind)>
where
    I: IntoIterator<Item = (Entity, IconKind, GlobalTransform)>,
{
    let mut closest: Option<(f32, Entity, IconKind)> = None;

    for (entity, icon, transform) in candidates {
        let Some(hit) = footprint_hit(ray, &transform) else {
            continue;
        };
        if hit.x.abs() > half_extent || hit.y.abs() > half_extent {
            continue;
        }
        let distance_sq = hit.length_squared();
        if closest.is_none_or(|(best, _, _)| distance_sq < best) {
            closest = Some((distance_sq, entity, icon));
        }
    }

    closest.map(|(_, entity, icon)| (entity, icon))
}

/// Resolve and dispatch a tap on `icon` of `overlay`
pub fn dispatch_icon_tap(
    overlay: &AnchoredOverlay,
    icon: IconKind,
    readiness: &AssetReadiness,
    settings: &OverlaySettings,
    dispatcher: &dyn Dispatcher,
    log: &mut DispatchLog,
) -> Option<DispatchRequest> {
    let action = overlay.node.tap_action(icon, readiness, &settings.actions)?;

    let request = match action.to_request() {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(icon = %icon, "Cannot build dispatch request: {}", e);
            return None;
        }
    };

    tracing::info!(icon = %icon, image = overlay.image_id, request = %request, "Icon tapped");
    if let Err(e) = dispatcher.dispatch(&request) {
        tracing::warn!(dispatcher = dispatcher.name(), request = %request, "Dispatch failed: {}", e);
        return None;
    }
    log.push(request.clone());
    Some(request)
}

/// Turn a mouse click or touch tap into a camera ray
#[allow(clippy::too_many_arguments)]
fn capture_tap_ray(
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    windows: Query<&Window>,
    captured: Res<PointerCaptured>,
    settings: Res<OverlaySettings>,
    mut touch_state: ResMut<TouchState>,
    mut tap: ResMut<TapRay>,
) {
    if captured.0 {
        return;
    }

    let mut tap_pos: Option<Vec2> = None;

    if let Some(touch) = touch_input.iter().next() {
        if touch_input.just_pressed(touch.id()) {
            touch_state.start_position = Some(touch.position());
            touch_state.is_dragging = false;
        } else if let Some(start) = touch_state.start_position {
            if touch.position().distance(start) > settings.interaction.drag_threshold {
                touch_state.is_dragging = true;
            }
        }
    }

    for touch in touch_input.iter_just_released() {
        if !touch_state.is_dragging {
            if let Some(start) = touch_state.start_position {
                tap_pos = Some(start);
            }
        }
        touch_state.start_position = None;
        touch_state.is_dragging = false;
        tracing::trace!(touch = touch.id(), "Touch released");
    }

    if mouse_button.just_pressed(MouseButton::Left) {
        if let Ok(window) = windows.single() {
            if let Some(cursor) = window.cursor_position() {
                tap_pos = Some(cursor);
            }
        }
    }

    let Some(pos) = tap_pos else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    if let Ok(ray) = camera.viewport_to_world(camera_transform, pos) {
        tap.0 = Some(ray);
    }
}

/// Hit-test a pending tap ray against visible icons and dispatch the result
fn resolve_icon_taps(
    mut tap: ResMut<TapRay>,
    icons: Query<(Entity, &OverlayPart, &OverlayOwner, &GlobalTransform, &InheritedVisibility)>,
    overlays: Query<&AnchoredOverlay>,
    assets: Res<OverlayAssets>,
    settings: Res<OverlaySettings>,
    dispatcher: Res<OverlayDispatcher>,
    mut log: ResMut<DispatchLog>,
) {
    let Some(ray) = tap.0.take() else {
        return;
    };

    let candidates = icons
        .iter()
        .filter(|(_, _, _, _, visibility)| visibility.get())
        .filter_map(|(entity, part, _, transform, _)| match part {
            OverlayPart::Icon(icon) => Some((entity, *icon, *transform)),
            _ => None,
        });

    let Some((entity, icon)) = pick_icon(ray, candidates, settings.interaction.hit_half_extent)
    else {
        tracing::trace!("Tap missed every icon");
        return;
    };

    let Ok((_, _, owner, _, _)) = icons.get(entity) else {
        return;
    };
    let Ok(overlay) = overlays.get(owner.0) else {
        return;
    };

    dispatch_icon_tap(
        overlay,
        icon,
        &assets.readiness,
        &settings,
        dispatcher.0.as_ref(),
        &mut log,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcard_core::{
        AnchoredOverlayNode, DispatchError, DispatchIntent, OverlayAsset, RecordingDispatcher,
        TrackedImage,
    };
    use bevy::transform::TransformPlugin;

    use crate::overlay::{OverlayPlugin, TrackedImageFeed};

    fn ready() -> AssetReadiness {
        let mut readiness = AssetReadiness::new();
        for asset in OverlayAsset::ALL {
            readiness.mark_loaded(asset);
        }
        readiness
    }

    fn overlay() -> AnchoredOverlay {
        let mut node = AnchoredOverlayNode::default();
        node.assign(Some(TrackedImage::new(0, "card", 0.2, 0.3))).unwrap();
        AnchoredOverlay {
            image_id: 0,
            node,
            applied_generation: 0,
        }
    }

    fn down_from(x: f32, z: f32) -> Ray3d {
        Ray3d::new(Vec3::new(x, 1.0, z), Dir3::NEG_Y)
    }

    /// World transform of an icon on the default 0.2 x 0.3 card
    fn card_icon_at(translation: Vec3) -> GlobalTransform {
        GlobalTransform::from(
            Transform::from_translation(translation).with_scale(Vec3::new(0.0468, 0.1, 0.0702)),
        )
    }

    struct FailingDispatcher;

    impl Dispatcher for FailingDispatcher {
        fn dispatch(&self, _request: &DispatchRequest) -> Result<(), DispatchError> {
            Err(DispatchError::Poisoned)
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[test]
    fn test_tap_away_from_centre_hits_footprint() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let candidates = vec![(a, IconKind::Call, card_icon_at(Vec3::ZERO))];

        // 1.5 cm off centre, still inside a 4.7 cm wide icon
        let picked = pick_icon(down_from(0.015, 0.0), candidates.clone(), 0.5);
        assert_eq!(picked, Some((a, IconKind::Call)));

        let outside = pick_icon(down_from(0.03, 0.0), candidates, 0.5);
        assert_eq!(outside, None);
    }

    #[test]
    fn test_footprint_grows_with_icon_scale() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let large = GlobalTransform::from(Transform::from_scale(Vec3::new(0.2, 0.1, 0.2)));

        let picked = pick_icon(down_from(0.08, 0.08), vec![(a, IconKind::Facebook, large)], 0.5);
        assert_eq!(picked, Some((a, IconKind::Facebook)));
    }

    #[test]
    fn test_pick_closest_icon_centre_among_overlaps() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let candidates = vec![
            (a, IconKind::Facebook, card_icon_at(Vec3::new(0.0, 0.0, -0.0234))),
            (b, IconKind::Message, card_icon_at(Vec3::ZERO)),
        ];

        let picked = pick_icon(down_from(0.0, -0.008), candidates, 0.5);
        assert_eq!(picked, Some((b, IconKind::Message)));
    }

    #[test]
    fn test_pick_ignores_icons_behind_and_degenerate() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let candidates = vec![
            (a, IconKind::Call, card_icon_at(Vec3::new(0.0, 2.0, 0.0))),
            (b, IconKind::Message, GlobalTransform::from(Transform::from_scale(Vec3::ZERO))),
        ];
        assert_eq!(pick_icon(down_from(0.0, 0.0), candidates, 0.5), None);
    }

    #[test]
    fn test_tap_dispatches_each_icon() {
        let overlay = overlay();
        let settings = OverlaySettings::default();
        let dispatcher = RecordingDispatcher::new();
        let mut log = DispatchLog::default();
        let readiness = ready();

        for icon in IconKind::ALL {
            dispatch_icon_tap(&overlay, icon, &readiness, &settings, &dispatcher, &mut log);
        }

        let requests = dispatcher.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].intent, DispatchIntent::View);
        assert_eq!(requests[0].uri, "https://mail.google.com/mail");
        assert_eq!(requests[1].intent, DispatchIntent::View);
        assert_eq!(requests[1].uri, "https://www.instagram.com/dream_ar_/");
        assert_eq!(requests[2].intent, DispatchIntent::Dial);
        assert_eq!(requests[2].uri, "tel:8800211079");
        assert_eq!(log.entries, requests);
    }

    #[test]
    fn test_tap_ignored_until_ready() {
        let overlay = overlay();
        let dispatcher = RecordingDispatcher::new();
        let mut log = DispatchLog::default();

        let result = dispatch_icon_tap(
            &overlay,
            IconKind::Call,
            &AssetReadiness::new(),
            &OverlaySettings::default(),
            &dispatcher,
            &mut log,
        );
        assert!(result.is_none());
        assert!(dispatcher.requests().is_empty());
    }

    #[test]
    fn test_failed_dispatch_not_logged() {
        let mut log = DispatchLog::default();
        let result = dispatch_icon_tap(
            &overlay(),
            IconKind::Message,
            &ready(),
            &OverlaySettings::default(),
            &FailingDispatcher,
            &mut log,
        );
        assert!(result.is_none());
        assert!(log.entries.is_empty());
    }

    #[test]
    fn test_dispatch_log_is_bounded() {
        let mut log = DispatchLog::default();
        for i in 0..12 {
            log.push(DispatchRequest {
                intent: DispatchIntent::View,
                uri: format!("https://example.com/{}", i),
            });
        }
        assert_eq!(log.entries.len(), 8);
        assert_eq!(log.entries[0].uri, "https://example.com/4");
        assert_eq!(log.entries[7].uri, "https://example.com/11");
    }

    #[test]
    fn test_tap_ray_dispatches_through_app() {
        let recorder = RecordingDispatcher::new();
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, TransformPlugin))
            .init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<Touches>()
            .insert_resource(OverlayDispatcher(Box::new(recorder.clone())))
            .add_plugins(OverlayPlugin)
            .add_plugins(InteractionPlugin);

        {
            let mut assets = app.world_mut().resource_mut::<OverlayAssets>();
            for asset in OverlayAsset::ALL {
                assets.readiness.mark_loaded(asset);
            }
        }
        app.world_mut()
            .resource_mut::<TrackedImageFeed>()
            .upsert(TrackedImage::new(0, "card", 0.2, 0.3));
        app.update();
        app.update();

        let mut icons = app
            .world_mut()
            .query::<(Entity, &OverlayPart, &GlobalTransform)>();
        let parts: Vec<(Entity, OverlayPart, GlobalTransform)> = icons
            .iter(app.world())
            .map(|(entity, part, transform)| (entity, *part, *transform))
            .collect();
        for (entity, _, _) in &parts {
            app.world_mut()
                .entity_mut(*entity)
                .insert(InheritedVisibility::VISIBLE);
        }
        let (_, _, call) = parts
            .iter()
            .find(|(_, part, _)| *part == OverlayPart::Icon(IconKind::Call))
            .unwrap();
        let (scale, _, centre) = call.to_scale_rotation_translation();

        // Off-centre tap on the call icon
        let origin = centre + Vec3::new(scale.x * 0.3, 1.0, 0.0);
        app.insert_resource(TapRay(Some(Ray3d::new(origin, Dir3::NEG_Y))));
        app.update();

        let requests = recorder.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].intent, DispatchIntent::Dial);
        assert_eq!(requests[0].uri, "tel:8800211079");
        assert!(app.world().resource::<TapRay>().0.is_none());
        assert_eq!(app.world().resource::<DispatchLog>().entries.len(), 1);
    }
}
