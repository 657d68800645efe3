//! UI components for BlogForge
//!
//! This module contains all user interface components built with Dioxus.

pub mod form;
pub mod results;

use dioxus::prelude::*;
use form::BlogForm;
use results::ResultsPanel;

use crate::app::{AppState, ModelState};

/// Main Application Layout
#[component]
pub fn Layout() -> Element {
    let app_state = use_context::<AppState>();
    let model_state = app_state.model_state.read().clone();

    let model_status = match &model_state {
        ModelState::NotLoaded => "Model loads on first generation".to_string(),
        ModelState::Loading => "⏳ Loading model...".to_string(),
        ModelState::Loaded(path) => format!("Model: {path}"),
        ModelState::Error(_) => "Model unavailable".to_string(),
    };

    // A failed model load halts the session: banner instead of form
    let body = match model_state {
        ModelState::Error(message) => rsx! {
            div {
                class: "max-w-2xl mx-auto mt-8 p-6 rounded-xl border animate-fade-in",
                style: "border-color: var(--border-error); background-color: var(--bg-error-subtle); color: var(--text-error);",
                h2 { class: "font-semibold mb-2", "❌ Model unavailable" }
                p { class: "text-sm leading-relaxed", "{message}" }
                p {
                    class: "text-sm mt-3",
                    style: "color: var(--text-secondary);",
                    "Restart the application after fixing the model setup."
                }
            }
        },
        _ => rsx! {
            main {
                class: "flex-1 w-full max-w-3xl mx-auto px-8 pb-12",
                BlogForm {}
                ResultsPanel {}
            }
        },
    };

    rsx! {
        div {
            class: "flex flex-col h-screen w-screen overflow-y-auto font-sans",
            style: "background-color: var(--bg-main); color: var(--text-primary);",

            link { rel: "stylesheet", href: "assets/styles.css" }

            header {
                class: "px-8 pt-8 pb-4 text-center",
                h1 { class: "text-3xl font-bold tracking-tight mb-2", "📝 BlogForge" }
                p {
                    class: "text-base",
                    style: "color: var(--text-secondary);",
                    "Generate blog posts with a local LLaMA model, tuned to your topic, audience, and word count."
                }
                p {
                    class: "text-xs mt-2",
                    style: "color: var(--text-tertiary);",
                    "{model_status}"
                }
            }

            {body}
        }
    }
}
