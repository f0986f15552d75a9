//! Pluggable platform dispatch for icon taps

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::info;

use crate::action::DispatchRequest;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("platform could not open {uri}: {source}")]
    Open {
        uri: String,
        #[source]
        source: std::io::Error,
    },
    #[error("dispatcher state poisoned")]
    Poisoned,
}

/// Performs a dispatch request on the platform
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, request: &DispatchRequest) -> Result<(), DispatchError>;

    fn name(&self) -> &'static str;
}

/// Logs the request without touching the platform
#[derive(Debug, Clone, Copy, Default)]
pub struct SuppressedDispatcher;

impl Dispatcher for SuppressedDispatcher {
    fn dispatch(&self, request: &DispatchRequest) -> Result<(), DispatchError> {
        info!(intent = ?request.intent, uri = %request.uri, "Dispatch suppressed");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "suppressed"
    }
}

/// Hands the URI to the operating system's default handler
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDispatcher;

impl Dispatcher for SystemDispatcher {
    fn dispatch(&self, request: &DispatchRequest) -> Result<(), DispatchError> {
        info!(intent = ?request.intent, uri = %request.uri, "Opening on platform");
        open::that(&request.uri).map_err(|source| DispatchError::Open {
            uri: request.uri.clone(),
            source,
        })
    }

    fn name(&self) -> &'static str {
        "system"
    }
}

/// Keeps every request in memory; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct RecordingDispatcher {
    requests: Arc<Mutex<Vec<DispatchRequest>>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<DispatchRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl Dispatcher for RecordingDispatcher {
    fn dispatch(&self, request: &DispatchRequest) -> Result<(), DispatchError> {
        let mut requests = self.requests.lock().map_err(|_| DispatchError::Poisoned)?;
        requests.push(request.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Which dispatcher the app should install
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    #[default]
    Suppressed,
    System,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default)]
    pub mode: DispatchMode,
}

pub fn dispatcher_from_config(config: &DispatchConfig) -> Box<dyn Dispatcher> {
    match config.mode {
        DispatchMode::Suppressed => Box::new(SuppressedDispatcher),
        DispatchMode::System => Box::new(SystemDispatcher),
    }
}
