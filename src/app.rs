//! Root Dioxus application component
//!
//! This module contains the main App component that serves as the root of the
//! UI tree, plus the shared application state.

use std::sync::Arc;

use dioxus::prelude::*;
use tokio::sync::Mutex;

use crate::inference::{LlamaEngine, Mode};
use crate::report::GenerationReport;
use crate::ui::Layout;

/// Represents the current state of the model
#[derive(Clone, PartialEq, Debug)]
pub enum ModelState {
    NotLoaded,
    Loading,
    Loaded(String),
    /// Load failed; the session is halted and the form disabled
    Error(String),
}

/// State of the current generation request
#[derive(Clone, PartialEq, Debug)]
pub enum GenerationPhase {
    Idle,
    Running(Mode),
    Done { topic: String, report: GenerationReport },
    /// Per-request failure; the form stays usable for resubmission
    Failed(String),
}

/// Global application state shared across components
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Mutex<LlamaEngine>>,
    pub model_state: Signal<ModelState>,
    pub phase: Signal<GenerationPhase>,
}

impl AppState {
    pub fn new() -> Self {
        tracing::info!("AppState initialized");
        Self {
            engine: Arc::new(Mutex::new(LlamaEngine::new())),
            model_state: Signal::new(ModelState::NotLoaded),
            phase: Signal::new(GenerationPhase::Idle),
        }
    }
}

#[component]
pub fn App() -> Element {
    let app_state = AppState::new();
    use_context_provider(|| app_state);

    rsx! {
        Layout {}
    }
}
