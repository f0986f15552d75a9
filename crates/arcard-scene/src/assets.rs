//! Shared overlay asset cache and load tracking

use bevy::asset::LoadState;
use bevy::prelude::*;
use std::collections::HashMap;

use arcard_core::{AssetManifest, AssetReadiness, OverlayAsset, Transition};

/// The five overlay models, loaded once at startup and shared by every overlay
#[derive(Resource, Default)]
pub struct OverlayAssets {
    pub manifest: AssetManifest,
    pub loading: HashMap<OverlayAsset, Handle<Gltf>>,
    pub scenes: HashMap<OverlayAsset, Handle<Scene>>,
    pub readiness: AssetReadiness,
}

impl OverlayAssets {
    pub fn new(manifest: AssetManifest) -> Self {
        Self {
            manifest,
            loading: HashMap::new(),
            scenes: HashMap::new(),
            readiness: AssetReadiness::new(),
        }
    }

    pub fn scene(&self, asset: OverlayAsset) -> Option<&Handle<Scene>> {
        self.scenes.get(&asset)
    }

    /// Record a finished load. Returns the readiness transition, if any.
    pub fn complete_load(&mut self, asset: OverlayAsset, scene: Handle<Scene>) -> Transition {
        self.loading.remove(&asset);
        self.scenes.insert(asset, scene);
        self.readiness.mark_loaded(asset)
    }

    /// Record a failed load. Returns the readiness transition, if any.
    pub fn fail_load(&mut self, asset: OverlayAsset, cause: impl Into<String>) -> Transition {
        self.loading.remove(&asset);
        self.readiness.mark_failed(asset, cause)
    }
}

pub struct OverlayAssetsPlugin;

impl Plugin for OverlayAssetsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OverlayAssets>()
            .add_systems(Startup, start_asset_loads)
            .add_systems(Update, poll_asset_loads);
    }
}

/// Issue exactly one load per asset kind
fn start_asset_loads(mut assets: ResMut<OverlayAssets>, asset_server: Res<AssetServer>) {
    if !assets.loading.is_empty() || !assets.scenes.is_empty() {
        return;
    }

    let requests: Vec<(OverlayAsset, String)> = OverlayAsset::ALL
        .into_iter()
        .map(|asset| (asset, assets.manifest.normalized_path(asset)))
        .collect();

    for (asset, path) in requests {
        tracing::info!(asset = %asset, path = %path, "Starting to load overlay model");
        let handle: Handle<Gltf> = asset_server.load(path);
        assets.loading.insert(asset, handle);
    }
}

/// Check loading state and extract scenes from loaded glTFs
fn poll_asset_loads(
    mut assets: ResMut<OverlayAssets>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
) {
    if assets.loading.is_empty() {
        return;
    }

    let loading: Vec<(OverlayAsset, Handle<Gltf>)> = assets
        .loading
        .iter()
        .map(|(asset, handle)| (*asset, handle.clone()))
        .collect();

    for (asset, handle) in loading {
        let transition = match asset_server.get_load_state(handle.id()) {
            Some(LoadState::Loaded) => {
                let Some(gltf) = gltf_assets.get(&handle) else {
                    continue;
                };
                match gltf
                    .default_scene
                    .clone()
                    .or_else(|| gltf.scenes.first().cloned())
                {
                    Some(scene) => {
                        tracing::info!(asset = %asset, "Overlay model loaded");
                        assets.complete_load(asset, scene)
                    }
                    None => assets.fail_load(asset, "glTF contains no scenes"),
                }
            }
            Some(LoadState::Failed(err)) => assets.fail_load(asset, err.to_string()),
            _ => continue,
        };

        match transition {
            Transition::Ready => tracing::info!("All overlay models loaded"),
            Transition::Failed { asset, cause } => {
                tracing::error!(asset = %asset, cause = %cause, "Exception loading overlay model");
            }
            Transition::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn loader_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Gltf>()
            .init_asset::<Scene>()
            .insert_resource(OverlayAssets::new(AssetManifest {
                video_frame: "missing/video.glb".to_string(),
                border: "missing/border.glb".to_string(),
                facebook_icon: "missing/facebook.glb".to_string(),
                message_icon: "missing/message.glb".to_string(),
                call_icon: "missing/call.glb".to_string(),
            }))
            .add_plugins(OverlayAssetsPlugin);
        app
    }

    #[test]
    fn test_startup_issues_one_load_per_asset() {
        let mut app = loader_app();
        app.world_mut().run_schedule(Startup);

        let assets = app.world().resource::<OverlayAssets>();
        assert_eq!(assets.loading.len(), 5);
        for asset in OverlayAsset::ALL {
            assert!(assets.loading.contains_key(&asset));
        }

        // Running startup again must not issue a second round of loads
        app.world_mut().run_schedule(Startup);
        assert_eq!(app.world().resource::<OverlayAssets>().loading.len(), 5);
    }

    #[test]
    fn test_missing_models_fail_without_retry() {
        let mut app = loader_app();
        app.world_mut().run_schedule(Startup);

        for _ in 0..500 {
            app.update();
            if app.world().resource::<OverlayAssets>().loading.is_empty() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        let failed = {
            let assets = app.world().resource::<OverlayAssets>();
            assert!(assets.loading.is_empty());
            assert!(assets.scenes.is_empty());
            assets.readiness.clone()
        };
        let AssetReadiness::Failed { cause, .. } = &failed else {
            panic!("expected Failed, got {:?}", failed);
        };
        assert!(!cause.is_empty());

        for _ in 0..3 {
            app.update();
        }
        let assets = app.world().resource::<OverlayAssets>();
        assert!(assets.loading.is_empty());
        assert_eq!(assets.readiness, failed);
    }

    #[test]
    fn test_complete_and_fail_loads() {
        let mut assets = OverlayAssets::new(AssetManifest::default());

        for asset in &OverlayAsset::ALL[..4] {
            assert_eq!(assets.complete_load(*asset, Handle::default()), Transition::None);
        }
        assert!(assets.scene(OverlayAsset::Border).is_some());

        assert!(matches!(
            assets.fail_load(OverlayAsset::CallIcon, "missing"),
            Transition::Failed { asset: OverlayAsset::CallIcon, .. }
        ));
        assert!(assets.readiness.is_failed());
        assert_eq!(assets.fail_load(OverlayAsset::CallIcon, "missing"), Transition::None);
    }
}
