//! Blog generation form
//!
//! Collects the topic, audience, length, and performance settings, and kicks
//! off the generation workflow on submit.

use dioxus::prelude::*;

use crate::app::{AppState, GenerationPhase, ModelState};
use crate::inference::{GenerationParams, Mode, ModelConfig};
use crate::prompt::build_prompt;
use crate::report::finalize;
use crate::request::{default_max_tokens, Audience, BlogRequest};

#[component]
pub fn BlogForm() -> Element {
    let app_state = use_context::<AppState>();

    let mut topic = use_signal(String::new);
    let mut audience = use_signal(|| Audience::Researchers);
    let mut target_words = use_signal(|| 300u32);
    let mut fast_mode = use_signal(|| true);
    let mut threads = use_signal(|| 4u32);
    let mut max_tokens = use_signal(|| default_max_tokens(300));
    // Tracks whether the user has overridden the derived default
    let mut max_tokens_touched = use_signal(|| false);

    let is_generating = matches!(*app_state.phase.read(), GenerationPhase::Running(_));

    let handle_generate = {
        let app_state = app_state.clone();
        move |_| {
            let mut phase = app_state.phase;
            let mut model_state = app_state.model_state;

            let request = match BlogRequest::build(
                &topic(),
                audience(),
                target_words(),
                fast_mode(),
                threads(),
                max_tokens(),
            ) {
                Ok(request) => request,
                Err(e) => {
                    phase.set(GenerationPhase::Failed(e.to_string()));
                    return;
                }
            };

            let mode = Mode::from_fast_flag(request.fast_mode);
            phase.set(GenerationPhase::Running(mode));

            let app_state = app_state.clone();
            spawn(async move {
                let prompt = build_prompt(&request);
                let params = GenerationParams::for_mode(mode, request.max_tokens);

                let rx = {
                    let mut engine = app_state.engine.lock().await;

                    if let Err(e) = engine.init() {
                        model_state.set(ModelState::Error(e.to_string()));
                        phase.set(GenerationPhase::Idle);
                        return;
                    }

                    if !engine.load_attempted() {
                        model_state.set(ModelState::Loading);
                    }
                    match engine.load_model(ModelConfig::with_threads(request.threads)) {
                        Ok(info) => model_state.set(ModelState::Loaded(info.path)),
                        Err(e) => {
                            // No usable model: halt the session
                            tracing::error!("Model load failed: {e}");
                            model_state.set(ModelState::Error(e.to_string()));
                            phase.set(GenerationPhase::Idle);
                            return;
                        }
                    }

                    match engine.generate(&prompt, params) {
                        Ok(rx) => rx,
                        Err(e) => {
                            phase.set(GenerationPhase::Failed(e.to_string()));
                            return;
                        }
                    }
                };

                // Poll the worker without blocking the render loop
                loop {
                    match rx.try_recv() {
                        Ok(Ok(output)) => {
                            // elapsed is measured on the worker and covers
                            // generation only, never the model load
                            tracing::info!(
                                "Generation finished in {:.1}s ({:?})",
                                output.elapsed.as_secs_f64(),
                                output.finish_reason
                            );
                            match finalize(&output.text, output.elapsed, mode) {
                                Ok(report) => phase.set(GenerationPhase::Done {
                                    topic: request.topic.clone(),
                                    report,
                                }),
                                Err(e) => phase.set(GenerationPhase::Failed(e.to_string())),
                            }
                            break;
                        }
                        Ok(Err(e)) => {
                            tracing::warn!("Generation failed: {e}");
                            phase.set(GenerationPhase::Failed(e.to_string()));
                            break;
                        }
                        Err(std::sync::mpsc::TryRecvError::Empty) => {
                            tokio::task::yield_now().await;
                        }
                        Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                            phase.set(GenerationPhase::Failed(
                                "Inference worker stopped unexpectedly".to_string(),
                            ));
                            break;
                        }
                    }
                }
            });
        }
    };

    let estimated_time = if fast_mode() { "30-60 seconds" } else { "2-5 minutes" };

    rsx! {
        div {
            class: "space-y-6 mt-4",

            // How-to help
            details {
                class: "rounded-xl border p-4",
                style: "border-color: var(--border-subtle); background-color: var(--bg-surface);",
                summary { class: "font-medium cursor-pointer select-none", "ℹ️ How to use this app" }

                div { class: "space-y-4 mt-4 text-sm", style: "color: var(--text-secondary);",
                    ol { class: "space-y-2 list-decimal",
                        li { b { "Enter a Blog Topic" } ": Provide a clear and specific topic for your blog post" }
                        li { b { "Choose Target Audience" } ": Select who you're writing for (affects tone and complexity)" }
                        li { b { "Select Length" } ": Choose how long you want your blog post to be" }
                        li { b { "Generate" } ": Click the button and wait for the AI to create your blog" }
                        li { b { "Download" } ": Save your generated blog as a text file" }
                    }

                    div {
                        p { class: "font-medium mb-2", style: "color: var(--text-primary);", "Tips for better results:" }
                        ul { class: "space-y-1 list-disc",
                            li { "Be specific with your topic (e.g., \"Benefits of Machine Learning in Healthcare\" vs \"AI\")" }
                            li { "Consider your audience when choosing complexity level" }
                            li { "Use Fast Mode for quicker results (slightly lower quality)" }
                            li { "Shorter blogs generate much faster" }
                        }
                    }

                    div {
                        p { class: "font-medium mb-2", style: "color: var(--text-primary);", "Performance Tips:" }
                        ul { class: "space-y-1 list-disc",
                            li { "Enable Fast Mode for 3-5x faster generation" }
                            li { "Use 300 words or less for best speed" }
                            li { "Increase CPU threads if you have a multi-core processor" }
                            li { "Close other heavy applications while generating" }
                        }
                    }
                }
            }

            // Topic
            div { class: "space-y-2 flex flex-col",
                label { class: "font-medium", "Enter Blog Topic" }
                input {
                    r#type: "text",
                    value: "{topic}",
                    placeholder: "e.g., 'The Future of Artificial Intelligence in Education'",
                    oninput: move |e| topic.set(e.value()),
                    class: "w-full p-3 rounded-lg border focus:ring-2 transition-all",
                    style: "background-color: var(--bg-input); color: var(--text-primary); border-color: var(--border-subtle);"
                }
                p { class: "text-xs", style: "color: var(--text-tertiary);",
                    "Be specific and clear about what you want to write about."
                }
            }

            // Audience
            div { class: "space-y-2 flex flex-col",
                label { class: "font-medium", "Choose Target Audience" }
                select {
                    value: "{audience().label()}",
                    onchange: move |e| audience.set(Audience::from_label(&e.value())),
                    class: "w-full p-3 rounded-lg border transition-all",
                    style: "background-color: var(--bg-input); color: var(--text-primary); border-color: var(--border-subtle);",
                    for a in Audience::ALL {
                        option { value: "{a.label()}", "{a.label()}" }
                    }
                }
                p { class: "text-xs", style: "color: var(--text-tertiary);",
                    "This affects the tone and complexity of the generated content."
                }
            }

            // Length slider
            div { class: "space-y-2 flex flex-col",
                div { class: "flex justify-between items-center",
                    label { class: "font-medium", "Select Length (in words)" }
                    span {
                        class: "text-sm font-mono px-2 py-1 rounded",
                        style: "background-color: var(--bg-hover); color: var(--text-secondary);",
                        "{target_words}"
                    }
                }
                input {
                    r#type: "range",
                    min: "100",
                    max: "1000",
                    step: "50",
                    value: "{target_words}",
                    oninput: move |e| {
                        let value = e.value().parse().unwrap_or(300);
                        target_words.set(value);
                        // Follow the length until the user overrides the budget
                        if !max_tokens_touched() {
                            max_tokens.set(default_max_tokens(value));
                        }
                    },
                    class: "w-full h-2 rounded-lg appearance-none cursor-pointer",
                    style: "background-color: var(--bg-active); accent-color: var(--accent-primary);"
                }
            }

            // Performance settings
            details {
                class: "rounded-xl border p-4",
                style: "border-color: var(--border-subtle); background-color: var(--bg-surface);",
                summary { class: "font-medium cursor-pointer select-none", "⚡ Performance Settings (Advanced)" }

                div { class: "space-y-4 mt-4",
                    label { class: "flex items-center gap-3 cursor-pointer",
                        input {
                            r#type: "checkbox",
                            checked: fast_mode(),
                            onchange: move |e| fast_mode.set(e.checked()),
                            style: "accent-color: var(--accent-primary);"
                        }
                        span { "🚀 Fast Mode" }
                        span { class: "text-xs", style: "color: var(--text-tertiary);",
                            "Reduces quality slightly but generates much faster"
                        }
                    }

                    div { class: "space-y-2 flex flex-col",
                        div { class: "flex justify-between items-center",
                            label { class: "font-medium", "CPU Threads" }
                            span { class: "text-sm font-mono", style: "color: var(--text-secondary);", "{threads}" }
                        }
                        input {
                            r#type: "range",
                            min: "1",
                            max: "8",
                            step: "1",
                            value: "{threads}",
                            oninput: move |e| threads.set(e.value().parse().unwrap_or(4)),
                            class: "w-full h-2 rounded-lg appearance-none cursor-pointer",
                            style: "background-color: var(--bg-active); accent-color: var(--accent-primary);"
                        }
                        p { class: "text-xs", style: "color: var(--text-tertiary);",
                            "More threads = faster generation on multi-core machines. Applied on the first model load."
                        }
                    }

                    div { class: "space-y-2 flex flex-col",
                        div { class: "flex justify-between items-center",
                            label { class: "font-medium", "Max Output Length" }
                            span { class: "text-sm font-mono", style: "color: var(--text-secondary);", "{max_tokens}" }
                        }
                        input {
                            r#type: "range",
                            min: "200",
                            max: "800",
                            step: "50",
                            value: "{max_tokens}",
                            oninput: move |e| {
                                max_tokens_touched.set(true);
                                max_tokens.set(e.value().parse().unwrap_or(400));
                            },
                            class: "w-full h-2 rounded-lg appearance-none cursor-pointer",
                            style: "background-color: var(--bg-active); accent-color: var(--accent-primary);"
                        }
                        p { class: "text-xs", style: "color: var(--text-tertiary);",
                            "Lower = faster generation. Fast Mode caps this at 300."
                        }
                    }
                }
            }

            // Settings summary
            if !topic().trim().is_empty() {
                div {
                    class: "p-3 rounded-lg text-sm",
                    style: "background-color: var(--bg-hover); color: var(--text-secondary);",
                    "📝 Topic: {topic().trim()} | 👥 Audience: {audience().label()} | 📏 Length: ~{target_words} words | ⏱️ Est. Time: {estimated_time}"
                }
            }

            button {
                onclick: handle_generate,
                disabled: is_generating,
                class: "w-full py-3 rounded-xl font-semibold transition-all shadow-md active:scale-95 disabled:opacity-40 disabled:cursor-not-allowed",
                style: "background-color: var(--accent-primary); color: var(--accent-text);",
                if is_generating { "Generating..." } else { "Generate Blog" }
            }
        }
    }
}
