//! Overlay asset kinds and the manifest that locates them

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five models making up an overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayAsset {
    VideoFrame,
    Border,
    FacebookIcon,
    MessageIcon,
    CallIcon,
}

impl OverlayAsset {
    pub const ALL: [OverlayAsset; 5] = [
        OverlayAsset::VideoFrame,
        OverlayAsset::Border,
        OverlayAsset::FacebookIcon,
        OverlayAsset::MessageIcon,
        OverlayAsset::CallIcon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayAsset::VideoFrame => "video_frame",
            OverlayAsset::Border => "border",
            OverlayAsset::FacebookIcon => "facebook_icon",
            OverlayAsset::MessageIcon => "message_icon",
            OverlayAsset::CallIcon => "call_icon",
        }
    }
}

impl fmt::Display for OverlayAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Asset paths for each overlay model, relative to the asset root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetManifest {
    #[serde(default = "default_video_frame")]
    pub video_frame: String,
    #[serde(default = "default_border")]
    pub border: String,
    #[serde(default = "default_facebook_icon")]
    pub facebook_icon: String,
    #[serde(default = "default_message_icon")]
    pub message_icon: String,
    #[serde(default = "default_call_icon")]
    pub call_icon: String,
}

fn default_video_frame() -> String {
    "models/augmented_video_model.glb".to_string()
}

fn default_border() -> String {
    "models/border.glb".to_string()
}

fn default_facebook_icon() -> String {
    "models/facebook_button.glb".to_string()
}

fn default_message_icon() -> String {
    "models/message_button.glb".to_string()
}

fn default_call_icon() -> String {
    "models/call_button.glb".to_string()
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self {
            video_frame: default_video_frame(),
            border: default_border(),
            facebook_icon: default_facebook_icon(),
            message_icon: default_message_icon(),
            call_icon: default_call_icon(),
        }
    }
}

impl AssetManifest {
    pub fn path(&self, asset: OverlayAsset) -> &str {
        match asset {
            OverlayAsset::VideoFrame => &self.video_frame,
            OverlayAsset::Border => &self.border,
            OverlayAsset::FacebookIcon => &self.facebook_icon,
            OverlayAsset::MessageIcon => &self.message_icon,
            OverlayAsset::CallIcon => &self.call_icon,
        }
    }

    /// Iterate (kind, path) pairs in load order
    pub fn entries(&self) -> impl Iterator<Item = (OverlayAsset, &str)> + '_ {
        OverlayAsset::ALL
            .into_iter()
            .map(move |asset| (asset, self.path(asset)))
    }

    /// Strip leading slashes so paths resolve against the asset root
    pub fn normalized_path(&self, asset: OverlayAsset) -> String {
        let path = self.path(asset);
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        path.trim_start_matches('/').to_string()
    }
}
