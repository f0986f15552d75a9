//! Readiness of the shared overlay assets
//!
//! All five assets must load before an overlay can render. Loads are joined
//! all-or-nothing: the first failure moves the set to `Failed` for good, and
//! later events are ignored. Each transition is reported exactly once so the
//! owner can log it once.

use std::collections::BTreeSet;

use crate::assets::OverlayAsset;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetReadiness {
    /// Some loads are still in flight
    AwaitingAssets { pending: BTreeSet<OverlayAsset> },
    /// Every asset loaded
    Ready,
    /// One asset failed; the overlay never becomes renderable
    Failed { asset: OverlayAsset, cause: String },
}

/// Outcome of feeding one load event into the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    None,
    Ready,
    Failed { asset: OverlayAsset, cause: String },
}

impl Default for AssetReadiness {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetReadiness {
    pub fn new() -> Self {
        Self::AwaitingAssets {
            pending: OverlayAsset::ALL.into_iter().collect(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, AssetReadiness::Ready)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AssetReadiness::Failed { .. })
    }

    /// Assets whose load has not completed yet
    pub fn pending(&self) -> Vec<OverlayAsset> {
        match self {
            AssetReadiness::AwaitingAssets { pending } => pending.iter().copied().collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_pending(&self, asset: OverlayAsset) -> bool {
        match self {
            AssetReadiness::AwaitingAssets { pending } => pending.contains(&asset),
            _ => false,
        }
    }

    pub fn mark_loaded(&mut self, asset: OverlayAsset) -> Transition {
        let AssetReadiness::AwaitingAssets { pending } = self else {
            return Transition::None;
        };
        if !pending.remove(&asset) {
            return Transition::None;
        }
        if pending.is_empty() {
            *self = AssetReadiness::Ready;
            return Transition::Ready;
        }
        Transition::None
    }

    pub fn mark_failed(&mut self, asset: OverlayAsset, cause: impl Into<String>) -> Transition {
        let AssetReadiness::AwaitingAssets { pending } = self else {
            return Transition::None;
        };
        if !pending.contains(&asset) {
            return Transition::None;
        }
        let cause = cause.into();
        *self = AssetReadiness::Failed {
            asset,
            cause: cause.clone(),
        };
        Transition::Failed { asset, cause }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AssetReadiness::AwaitingAssets { .. } => "awaiting assets",
            AssetReadiness::Ready => "ready",
            AssetReadiness::Failed { .. } => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_after_all_five() {
        let mut readiness = AssetReadiness::new();
        assert_eq!(readiness.pending().len(), 5);

        for asset in &OverlayAsset::ALL[..4] {
            assert_eq!(readiness.mark_loaded(*asset), Transition::None);
            assert!(!readiness.is_ready());
        }
        assert_eq!(readiness.mark_loaded(OverlayAsset::CallIcon), Transition::Ready);
        assert!(readiness.is_ready());
        assert!(readiness.pending().is_empty());
    }

    #[test]
    fn test_ready_reported_once() {
        let mut readiness = AssetReadiness::new();
        for asset in OverlayAsset::ALL {
            readiness.mark_loaded(asset);
        }
        assert_eq!(readiness.mark_loaded(OverlayAsset::Border), Transition::None);
        assert!(readiness.is_ready());
    }

    #[test]
    fn test_duplicate_load_does_not_count_twice() {
        let mut readiness = AssetReadiness::new();
        readiness.mark_loaded(OverlayAsset::Border);
        readiness.mark_loaded(OverlayAsset::Border);
        assert_eq!(readiness.pending().len(), 4);
    }

    #[test]
    fn test_single_failure_is_terminal() {
        let mut readiness = AssetReadiness::new();
        readiness.mark_loaded(OverlayAsset::VideoFrame);

        let transition = readiness.mark_failed(OverlayAsset::Border, "file not found");
        assert_eq!(
            transition,
            Transition::Failed {
                asset: OverlayAsset::Border,
                cause: "file not found".to_string(),
            }
        );
        assert!(readiness.is_failed());

        // No second failure, no recovery
        assert_eq!(readiness.mark_failed(OverlayAsset::CallIcon, "boom"), Transition::None);
        for asset in OverlayAsset::ALL {
            assert_eq!(readiness.mark_loaded(asset), Transition::None);
        }
        assert!(!readiness.is_ready());
    }

    #[test]
    fn test_failure_after_load_of_same_asset_ignored() {
        let mut readiness = AssetReadiness::new();
        readiness.mark_loaded(OverlayAsset::MessageIcon);
        assert_eq!(readiness.mark_failed(OverlayAsset::MessageIcon, "late"), Transition::None);
        assert!(!readiness.is_failed());
    }
}
