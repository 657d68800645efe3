//! Results panel
//!
//! Shows the generation status banner, post-generation stats, the generated
//! text, and the save-to-file button.

use dioxus::prelude::*;

use crate::app::{AppState, GenerationPhase};
use crate::export::save_blog;
use crate::inference::Mode;

#[component]
pub fn ResultsPanel() -> Element {
    let app_state = use_context::<AppState>();
    let phase = app_state.phase.read().clone();
    let mut save_status = use_signal(|| None::<String>);

    match phase {
        GenerationPhase::Idle => rsx! {
            div { class: "mt-8 text-center text-sm", style: "color: var(--text-tertiary);",
                "Enter a topic and click Generate Blog to get started."
            }
        },

        GenerationPhase::Running(mode) => {
            let message = match mode {
                Mode::Fast => "🚀 Fast generating...",
                Mode::Quality => "⏳ Generating blog (high quality)...",
            };
            rsx! {
                div { class: "flex items-center justify-center gap-2 mt-10 animate-fade-in",
                    style: "color: var(--text-tertiary);",
                    div { class: "w-2 h-2 rounded-full animate-bounce", style: "background-color: var(--accent-primary);" }
                    div { class: "w-2 h-2 rounded-full animate-bounce delay-75", style: "background-color: var(--accent-primary);" }
                    div { class: "w-2 h-2 rounded-full animate-bounce delay-150", style: "background-color: var(--accent-primary);" }
                    span { "{message}" }
                }
            }
        }

        GenerationPhase::Failed(message) => rsx! {
            div {
                class: "mt-8 p-4 rounded-xl border animate-fade-in",
                style: "border-color: var(--border-error); background-color: var(--bg-error-subtle); color: var(--text-error);",
                "❌ {message}"
            }
        },

        GenerationPhase::Done { topic, report } => {
            let handle_save = {
                let topic = topic.clone();
                let text = report.text.clone();
                move |_| match save_blog(&topic, &text) {
                    Ok(path) => save_status.set(Some(format!("Saved to {}", path.display()))),
                    Err(e) => {
                        tracing::error!("Export failed: {e}");
                        save_status.set(Some(format!("❌ {e}")));
                    }
                }
            };

            rsx! {
                div { class: "mt-8 space-y-4 animate-fade-in",

                    div {
                        class: "p-3 rounded-lg text-sm font-medium",
                        style: "background-color: var(--bg-success-subtle); color: var(--text-success);",
                        "✅ Blog generated successfully in {report.elapsed_seconds:.1} seconds!"
                    }

                    div {
                        class: "p-3 rounded-lg text-sm",
                        style: "background-color: var(--bg-hover); color: var(--text-secondary);",
                        "📊 Stats: {report.word_count} words generated | ⏱️ {report.elapsed_seconds:.1}s | 🚀 Mode: {report.mode.label()}"
                    }

                    h3 { class: "text-xl font-semibold", "Generated Blog:" }
                    div {
                        class: "p-4 rounded-xl border whitespace-pre-wrap leading-relaxed",
                        style: "border-color: var(--border-subtle); background-color: var(--bg-surface);",
                        "{report.text}"
                    }

                    button {
                        onclick: handle_save,
                        class: "px-5 py-2.5 rounded-xl font-medium transition-all shadow-md active:scale-95",
                        style: "background-color: var(--accent-primary); color: var(--accent-text);",
                        "📥 Download Blog"
                    }

                    {save_status().map(|status| rsx! {
                        p { class: "text-sm", style: "color: var(--text-secondary);", "{status}" }
                    })}
                }
            }
        }
    }
}
