//! Icon tap actions and the dispatch requests they produce

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::assets::OverlayAsset;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error("invalid URL {0:?}: expected an http:// or https:// link")]
    InvalidUrl(String),
    #[error("invalid phone number {0:?}: expected digits with an optional leading '+'")]
    InvalidNumber(String),
}

/// The three tappable icons on the overlay border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconKind {
    Facebook,
    Message,
    Call,
}

impl IconKind {
    pub const ALL: [IconKind; 3] = [IconKind::Facebook, IconKind::Message, IconKind::Call];

    pub fn asset(&self) -> OverlayAsset {
        match self {
            IconKind::Facebook => OverlayAsset::FacebookIcon,
            IconKind::Message => OverlayAsset::MessageIcon,
            IconKind::Call => OverlayAsset::CallIcon,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IconKind::Facebook => "facebook",
            IconKind::Message => "message",
            IconKind::Call => "call",
        }
    }
}

impl fmt::Display for IconKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What tapping an icon should do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TapAction {
    OpenUrl(String),
    Dial(String),
}

/// Platform intent kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchIntent {
    /// Open the URI in whatever handles it (browser, app)
    View,
    /// Open the dialer pre-filled with the number
    Dial,
}

/// A fully built request for the platform to open something
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub intent: DispatchIntent,
    pub uri: String,
}

impl fmt::Display for DispatchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.intent {
            DispatchIntent::View => write!(f, "view {}", self.uri),
            DispatchIntent::Dial => write!(f, "dial {}", self.uri),
        }
    }
}

impl TapAction {
    pub fn validate(&self) -> Result<(), ActionError> {
        match self {
            TapAction::OpenUrl(url) => {
                let rest = url
                    .strip_prefix("https://")
                    .or_else(|| url.strip_prefix("http://"));
                match rest {
                    Some(host) if !host.is_empty() => Ok(()),
                    _ => Err(ActionError::InvalidUrl(url.clone())),
                }
            }
            TapAction::Dial(number) => {
                let digits = number.strip_prefix('+').unwrap_or(number);
                if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                    Ok(())
                } else {
                    Err(ActionError::InvalidNumber(number.clone()))
                }
            }
        }
    }

    pub fn to_request(&self) -> Result<DispatchRequest, ActionError> {
        self.validate()?;
        Ok(match self {
            TapAction::OpenUrl(url) => DispatchRequest {
                intent: DispatchIntent::View,
                uri: url.clone(),
            },
            TapAction::Dial(number) => DispatchRequest {
                intent: DispatchIntent::Dial,
                uri: format!("tel:{}", number),
            },
        })
    }
}

/// Targets for the three icons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionsConfig {
    #[serde(default = "default_facebook_url")]
    pub facebook_url: String,
    #[serde(default = "default_message_url")]
    pub message_url: String,
    #[serde(default = "default_call_number")]
    pub call_number: String,
}

fn default_facebook_url() -> String {
    "https://mail.google.com/mail".to_string()
}

fn default_message_url() -> String {
    "https://www.instagram.com/dream_ar_/".to_string()
}

fn default_call_number() -> String {
    "8800211079".to_string()
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            facebook_url: default_facebook_url(),
            message_url: default_message_url(),
            call_number: default_call_number(),
        }
    }
}

impl ActionsConfig {
    pub fn action_for(&self, icon: IconKind) -> TapAction {
        match icon {
            IconKind::Facebook => TapAction::OpenUrl(self.facebook_url.clone()),
            IconKind::Message => TapAction::OpenUrl(self.message_url.clone()),
            IconKind::Call => TapAction::Dial(self.call_number.clone()),
        }
    }

    pub fn validate(&self) -> Result<(), ActionError> {
        for icon in IconKind::ALL {
            self.action_for(icon).validate()?;
        }
        Ok(())
    }
}
