//! arcard Core - Overlay layout, asset readiness and tap dispatch
//!
//! This crate provides the engine-agnostic pieces of the arcard overlay:
//! - Tracked image handles with centre pose and measured extents
//! - Layout arithmetic for the anchor, border and icon nodes
//! - The shared asset manifest and its readiness state machine
//! - Anchored overlay node state, recomputed once per image assignment
//! - Tap actions, dispatch requests and pluggable dispatchers
//! - TOML configuration

pub mod action;
pub mod assets;
pub mod config;
pub mod dispatch;
pub mod layout;
pub mod node;
pub mod readiness;
pub mod tracking;

pub use action::{ActionError, ActionsConfig, DispatchIntent, DispatchRequest, IconKind, TapAction};
pub use assets::{AssetManifest, OverlayAsset};
pub use config::{load_config, save_default_config, Config, ConfigError, InteractionConfig};
pub use dispatch::{
    dispatcher_from_config, DispatchConfig, DispatchError, DispatchMode, Dispatcher, RecordingDispatcher, SuppressedDispatcher,
    SystemDispatcher,
};
pub use layout::{Extents, LayoutConfig, LayoutError, LocalTransform, OverlayLayout};
pub use node::AnchoredOverlayNode;
pub use readiness::{AssetReadiness, Transition};
pub use tracking::{Pose, TrackedImage, TrackingState};
