//! LLM inference engine
//!
//! This module handles all interaction with llama-cpp for model loading and
//! generation.

pub mod engine;
pub mod model;
pub mod params;

// Re-export main types for convenience
pub use engine::{EngineError, FinishReason, GenerationOutput, LlamaEngine, LoadedModelInfo};
pub use model::{validate_gguf, GgufMetadata, ModelConfig, ModelError, GGUF_MAGIC, MODEL_PATH};
pub use params::{GenerationParams, Mode, FAST_MODE_TOKEN_CAP};
