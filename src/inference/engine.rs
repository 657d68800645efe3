//! Inference engine implementation
//!
//! Core logic for managing the llama-cpp backend and running generation.
//!
//! # Architecture
//!
//! Since llama-cpp-2 types (`LlamaBackend`, `LlamaModel`, `LlamaContext`)
//! contain raw pointers that are not `Send`, all inference operations run on
//! a dedicated worker thread. The main thread communicates via channels.
//!
//! The engine performs at most one model load per process: the first result,
//! success or failure, is memoized and handed back to every later caller.

use std::num::NonZeroU32;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::context::LlamaContext;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel, Special};
use llama_cpp_2::sampling::LlamaSampler;
use thiserror::Error;

use crate::inference::model::{validate_gguf, ModelConfig, ModelError, MODEL_DOWNLOAD_HINT};
use crate::inference::params::GenerationParams;

/// Errors that can occur during inference operations
#[derive(Debug, Error, Clone)]
pub enum EngineError {
    #[error("Backend not initialized")]
    BackendNotInitialized,

    #[error("No model loaded")]
    NoModelLoaded,

    #[error("Model file not found at {path}. {}", MODEL_DOWNLOAD_HINT)]
    ModelNotFound { path: String },

    #[error("Model validation failed: {0}")]
    ModelValidation(String),

    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Failed to create context: {0}")]
    ContextCreate(String),

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Worker thread error: {0}")]
    WorkerError(String),
}

impl From<ModelError> for EngineError {
    fn from(e: ModelError) -> Self {
        EngineError::ModelValidation(e.to_string())
    }
}

/// Why a generation run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The model emitted an end-of-generation token
    EndOfSequence,
    /// A stop sequence appeared in the output
    StopSequence,
    /// The token budget ran out
    MaxTokens,
}

/// The raw outcome of one blocking generation call
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    /// Generated text, truncated at the first stop sequence if one matched
    pub text: String,
    /// Why generation ended
    pub finish_reason: FinishReason,
    /// Wall-clock time of the generation call itself, measured on the worker
    /// thread. Model loading happens in a separate command and is never part
    /// of this duration.
    pub elapsed: Duration,
}

/// Model information after loading
#[derive(Debug, Clone)]
pub struct LoadedModelInfo {
    /// Path to the loaded model
    pub path: String,
    /// Vocabulary size
    pub vocab_size: i32,
    /// Embedding dimension
    pub embedding_dim: i32,
    /// Training context length
    pub context_length: u32,
    /// Total parameter count
    pub param_count: u64,
    /// Model size in bytes
    pub size_bytes: u64,
}

/// Commands sent to the worker thread
enum WorkerCommand {
    Init,
    LoadModel {
        config: ModelConfig,
        response_tx: Sender<Result<LoadedModelInfo, EngineError>>,
    },
    Generate {
        prompt: String,
        params: GenerationParams,
        response_tx: Sender<Result<GenerationOutput, EngineError>>,
    },
    Shutdown,
}

/// The LLM inference engine using llama-cpp-2
///
/// Uses a dedicated worker thread for all llama-cpp operations since the
/// underlying types are not Send. The first load attempt is memoized for the
/// lifetime of the engine; a later call with a different thread count reuses
/// whatever the first call produced.
pub struct LlamaEngine {
    /// Channel to send commands to the worker thread
    command_tx: Option<Sender<WorkerCommand>>,
    /// Handle to the worker thread
    worker_handle: Option<JoinHandle<()>>,
    /// Memoized result of the single load attempt
    load_result: Option<Result<LoadedModelInfo, EngineError>>,
    /// Whether backend is initialized
    initialized: bool,
}

impl LlamaEngine {
    /// Creates a new uninitialized engine
    pub fn new() -> Self {
        Self {
            command_tx: None,
            worker_handle: None,
            load_result: None,
            initialized: false,
        }
    }

    /// Initializes the llama.cpp backend
    ///
    /// Must be called before loading the model or running inference.
    /// Spawns a dedicated worker thread for all llama-cpp operations.
    pub fn init(&mut self) -> Result<(), EngineError> {
        if self.initialized {
            return Ok(());
        }

        let (command_tx, command_rx) = mpsc::channel::<WorkerCommand>();

        // Spawn worker thread that owns the backend and model
        let handle = thread::spawn(move || {
            worker_thread_main(command_rx);
        });

        self.command_tx = Some(command_tx.clone());
        self.worker_handle = Some(handle);

        command_tx
            .send(WorkerCommand::Init)
            .map_err(|e| EngineError::WorkerError(e.to_string()))?;

        self.initialized = true;
        tracing::info!("LlamaEngine worker thread started");
        Ok(())
    }

    /// Loads the model described by `config`, or returns the memoized result
    /// of an earlier attempt.
    ///
    /// Exactly one load attempt is made per engine. A missing or malformed
    /// artifact is detected before the backend is asked to construct a
    /// handle, and that failure is memoized too: the caller must restart the
    /// process to retry.
    pub fn load_model(&mut self, config: ModelConfig) -> Result<LoadedModelInfo, EngineError> {
        if let Some(result) = &self.load_result {
            tracing::debug!("Reusing memoized model load result");
            return result.clone();
        }

        let result = self.load_model_once(config);
        self.load_result = Some(result.clone());
        result
    }

    fn load_model_once(&mut self, config: ModelConfig) -> Result<LoadedModelInfo, EngineError> {
        // Existence check happens before any backend work
        if !config.model_path.exists() {
            return Err(EngineError::ModelNotFound {
                path: config.model_path.display().to_string(),
            });
        }

        // Validate the GGUF header (cheap file I/O, main thread)
        let _metadata = validate_gguf(&config.model_path)?;
        tracing::debug!("GGUF validation passed for {:?}", config.model_path);

        let command_tx = self
            .command_tx
            .as_ref()
            .ok_or(EngineError::BackendNotInitialized)?;

        let (response_tx, response_rx) = mpsc::channel();

        command_tx
            .send(WorkerCommand::LoadModel {
                config,
                response_tx,
            })
            .map_err(|e| EngineError::WorkerError(e.to_string()))?;

        response_rx
            .recv()
            .map_err(|e| EngineError::WorkerError(e.to_string()))?
    }

    /// Returns information about the loaded model, if the load succeeded
    pub fn model_info(&self) -> Option<&LoadedModelInfo> {
        match &self.load_result {
            Some(Ok(info)) => Some(info),
            _ => None,
        }
    }

    /// Returns true if the model is loaded
    pub fn is_model_loaded(&self) -> bool {
        matches!(self.load_result, Some(Ok(_)))
    }

    /// Returns true if a load was attempted, regardless of outcome
    pub fn load_attempted(&self) -> bool {
        self.load_result.is_some()
    }

    /// Returns true if the backend is initialized
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Starts one blocking generation call on the worker thread.
    ///
    /// Returns a receiver that yields exactly one message: the full generated
    /// text or an error. The caller polls it without blocking the UI. There
    /// are no retries and no cancellation.
    pub fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<Receiver<Result<GenerationOutput, EngineError>>, EngineError> {
        let command_tx = self
            .command_tx
            .as_ref()
            .ok_or(EngineError::BackendNotInitialized)?;

        if !self.is_model_loaded() {
            return Err(EngineError::NoModelLoaded);
        }

        let (response_tx, response_rx) = mpsc::channel();

        command_tx
            .send(WorkerCommand::Generate {
                prompt: prompt.to_string(),
                params,
                response_tx,
            })
            .map_err(|e| EngineError::WorkerError(e.to_string()))?;

        Ok(response_rx)
    }
}

impl Default for LlamaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LlamaEngine {
    fn drop(&mut self) {
        if let Some(tx) = self.command_tx.take() {
            let _ = tx.send(WorkerCommand::Shutdown);
        }
        if let Some(handle) = self.worker_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Worker thread main loop
///
/// Owns the LlamaBackend, LlamaModel, and load-time config; processes
/// commands from the main thread.
fn worker_thread_main(command_rx: Receiver<WorkerCommand>) {
    let mut backend: Option<LlamaBackend> = None;
    let mut model: Option<LlamaModel> = None;
    let mut model_config: Option<ModelConfig> = None;

    loop {
        match command_rx.recv() {
            Ok(WorkerCommand::Init) => match LlamaBackend::init() {
                Ok(b) => {
                    backend = Some(b);
                    tracing::info!("LlamaBackend initialized in worker thread");
                }
                Err(e) => {
                    tracing::error!("Failed to init backend: {}", e);
                }
            },
            Ok(WorkerCommand::LoadModel {
                config,
                response_tx,
            }) => {
                let result = load_model_internal(&backend, &config);
                match result {
                    Ok((m, info)) => {
                        tracing::info!(
                            "Model loaded: {} ({} params, {} vocab, {} ctx)",
                            info.path,
                            info.param_count,
                            info.vocab_size,
                            info.context_length
                        );
                        model = Some(m);
                        model_config = Some(config);
                        let _ = response_tx.send(Ok(info));
                    }
                    Err(e) => {
                        let _ = response_tx.send(Err(e));
                    }
                }
            }
            Ok(WorkerCommand::Generate {
                prompt,
                params,
                response_tx,
            }) => {
                let result = match (&backend, &model, &model_config) {
                    (Some(b), Some(m), Some(config)) => {
                        run_generation(b, m, config, &prompt, &params)
                    }
                    _ => Err(EngineError::NoModelLoaded),
                };
                let _ = response_tx.send(result);
            }
            Ok(WorkerCommand::Shutdown) => {
                tracing::info!("Worker thread shutting down");
                break;
            }
            Err(_) => {
                // Channel closed, exit
                tracing::debug!("Command channel closed, worker exiting");
                break;
            }
        }
    }
}

/// Load the model and extract its info (helper for worker thread)
fn load_model_internal(
    backend: &Option<LlamaBackend>,
    config: &ModelConfig,
) -> Result<(LlamaModel, LoadedModelInfo), EngineError> {
    let backend = backend.as_ref().ok_or(EngineError::BackendNotInitialized)?;

    let model_params = LlamaModelParams::default().with_n_gpu_layers(config.gpu_layers);

    let model = LlamaModel::load_from_file(backend, &config.model_path, &model_params)
        .map_err(|e| EngineError::ModelLoad(e.to_string()))?;

    let info = LoadedModelInfo {
        path: config.model_path.to_string_lossy().to_string(),
        vocab_size: model.n_vocab(),
        embedding_dim: model.n_embd(),
        context_length: model.n_ctx_train(),
        param_count: model.n_params() as u64,
        size_bytes: model.size() as u64,
    };

    Ok((model, info))
}

/// Run one blocking text generation (called from worker thread)
fn run_generation(
    backend: &LlamaBackend,
    model: &LlamaModel,
    config: &ModelConfig,
    prompt: &str,
    params: &GenerationParams,
) -> Result<GenerationOutput, EngineError> {
    let started = Instant::now();
    let n_ctx = std::cmp::min(config.context_size, model.n_ctx_train());
    let batch_capacity = config.batch_size.max(1);

    let ctx_params = LlamaContextParams::default()
        .with_n_ctx(NonZeroU32::new(n_ctx))
        .with_n_batch(batch_capacity)
        .with_n_threads(config.threads as i32)
        .with_n_threads_batch(config.threads as i32);

    let mut ctx = model
        .new_context(backend, ctx_params)
        .map_err(|e| EngineError::ContextCreate(e.to_string()))?;

    let tokens = model
        .str_to_token(prompt, AddBos::Always)
        .map_err(|e| EngineError::Tokenization(e.to_string()))?;

    if tokens.len() as u32 >= n_ctx {
        return Err(EngineError::Tokenization(format!(
            "Prompt is {} tokens but the context window is {}",
            tokens.len(),
            n_ctx
        )));
    }

    tracing::debug!("Tokenized prompt into {} tokens", tokens.len());

    let (text, finish_reason) = run_inference(&mut ctx, model, tokens, batch_capacity, params)?;

    Ok(GenerationOutput {
        text,
        finish_reason,
        elapsed: started.elapsed(),
    })
}

/// Runs the inference loop, accumulating output until the token budget runs
/// out, the model emits an end-of-generation token, or a stop sequence
/// appears.
fn run_inference(
    ctx: &mut LlamaContext,
    model: &LlamaModel,
    prompt_tokens: Vec<llama_cpp_2::token::LlamaToken>,
    batch_capacity: u32,
    params: &GenerationParams,
) -> Result<(String, FinishReason), EngineError> {
    let mut batch = LlamaBatch::new(batch_capacity as usize, 1);
    let mut n_past: i32 = 0;
    let last_index = prompt_tokens.len() - 1;

    // Decode the prompt in chunks of at most batch_capacity tokens; logits
    // are only requested for the final prompt token.
    for chunk in prompt_tokens.chunks(batch_capacity as usize) {
        batch.clear();
        for token in chunk {
            let is_last = n_past as usize == last_index;
            batch
                .add(*token, n_past, &[0], is_last)
                .map_err(|e| EngineError::Inference(format!("Failed to add token to batch: {e}")))?;
            n_past += 1;
        }
        ctx.decode(&mut batch)
            .map_err(|e| EngineError::Inference(format!("Failed to decode prompt: {e}")))?;
    }

    let mut sampler = if params.temperature < 0.01 {
        // Greedy sampling for very low temperature
        LlamaSampler::greedy()
    } else {
        LlamaSampler::chain_simple([
            LlamaSampler::penalties(64, params.repeat_penalty, 0.0, 0.0),
            LlamaSampler::top_k(params.top_k as i32),
            LlamaSampler::top_p(params.top_p, 1),
            LlamaSampler::temp(params.temperature),
            LlamaSampler::dist(rand_seed()),
        ])
    };

    let mut output = String::new();
    let mut finish_reason = FinishReason::MaxTokens;

    // Buffer for handling incomplete UTF-8 sequences
    let mut utf8_buffer: Vec<u8> = Vec::new();

    'generation: for _ in 0..params.max_tokens {
        let new_token = sampler.sample(ctx, batch.n_tokens() - 1);
        sampler.accept(new_token);

        if model.is_eog_token(new_token) {
            finish_reason = FinishReason::EndOfSequence;
            break;
        }

        let token_bytes = model
            .token_to_bytes(new_token, Special::Tokenize)
            .map_err(|e| EngineError::Inference(format!("Failed to convert token: {e}")))?;

        utf8_buffer.extend_from_slice(&token_bytes);
        drain_valid_utf8(&mut utf8_buffer, &mut output);

        // Stop-sequence check on the accumulated text; a match truncates the
        // output at its start and ends generation.
        if let Some(pos) = find_stop(&output, &params.stop_sequences) {
            output.truncate(pos);
            finish_reason = FinishReason::StopSequence;
            break 'generation;
        }

        batch.clear();
        batch
            .add(new_token, n_past, &[0], true)
            .map_err(|e| EngineError::Inference(format!("Failed to add token to batch: {e}")))?;

        ctx.decode(&mut batch)
            .map_err(|e| EngineError::Inference(format!("Failed to decode: {e}")))?;

        n_past += 1;
    }

    // Flush whatever is left in the UTF-8 buffer
    if !utf8_buffer.is_empty() {
        if let Ok(s) = String::from_utf8(utf8_buffer) {
            output.push_str(&s);
        }
    }
    if finish_reason != FinishReason::StopSequence {
        if let Some(pos) = find_stop(&output, &params.stop_sequences) {
            output.truncate(pos);
            finish_reason = FinishReason::StopSequence;
        }
    }

    tracing::debug!(
        "Generation finished ({:?}, {} chars)",
        finish_reason,
        output.len()
    );

    Ok((output, finish_reason))
}

/// Moves the longest valid UTF-8 prefix of `buffer` into `output`, keeping
/// any incomplete trailing sequence buffered for the next token.
fn drain_valid_utf8(buffer: &mut Vec<u8>, output: &mut String) {
    match std::str::from_utf8(buffer) {
        Ok(s) => {
            output.push_str(s);
            buffer.clear();
        }
        Err(e) => {
            let valid_len = e.valid_up_to();
            if valid_len > 0 {
                // Safe: valid_up_to guarantees this prefix is valid UTF-8
                output.push_str(std::str::from_utf8(&buffer[..valid_len]).unwrap_or(""));
                buffer.drain(..valid_len);
            }
        }
    }
}

/// Finds the earliest occurrence of any stop sequence in `text`.
fn find_stop(text: &str, stops: &[String]) -> Option<usize> {
    stops
        .iter()
        .filter_map(|stop| text.find(stop.as_str()))
        .min()
}

/// Generates a random seed using system entropy
fn rand_seed() -> u32 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};
    RandomState::new().build_hasher().finish() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::model::GGUF_MAGIC;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_engine_new() {
        let engine = LlamaEngine::new();
        assert!(!engine.is_initialized());
        assert!(!engine.is_model_loaded());
        assert!(!engine.load_attempted());
        assert!(engine.model_info().is_none());
    }

    #[test]
    fn test_missing_artifact_fails_before_backend() {
        // No init: a missing artifact must be reported without the backend
        // ever being involved.
        let mut engine = LlamaEngine::new();
        let config = ModelConfig {
            model_path: PathBuf::from("models/definitely-not-here.gguf"),
            ..ModelConfig::default()
        };

        let err = engine.load_model(config).unwrap_err();
        assert!(matches!(err, EngineError::ModelNotFound { .. }));
        assert!(err.to_string().contains("models/definitely-not-here.gguf"));
        assert!(err.to_string().contains("huggingface.co"));
    }

    #[test]
    fn test_load_failure_is_memoized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.gguf");

        let mut engine = LlamaEngine::new();
        let config = ModelConfig {
            model_path: path.clone(),
            ..ModelConfig::default()
        };

        let err = engine.load_model(config.clone()).unwrap_err();
        assert!(matches!(err, EngineError::ModelNotFound { .. }));
        assert!(engine.load_attempted());

        // Creating the file afterwards must not matter: the first attempt's
        // outcome is reused for the rest of the process.
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&GGUF_MAGIC.to_le_bytes()).unwrap();
        file.write_all(&3u32.to_le_bytes()).unwrap();
        file.write_all(&10u64.to_le_bytes()).unwrap();
        file.write_all(&5u64.to_le_bytes()).unwrap();
        file.flush().unwrap();

        let err = engine.load_model(config).unwrap_err();
        assert!(matches!(err, EngineError::ModelNotFound { .. }));
    }

    #[test]
    fn test_corrupt_artifact_rejected_by_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.gguf");
        std::fs::write(&path, b"this is not a gguf file, padded to 24+ bytes").unwrap();

        let mut engine = LlamaEngine::new();
        let config = ModelConfig {
            model_path: path,
            ..ModelConfig::default()
        };

        let err = engine.load_model(config).unwrap_err();
        assert!(matches!(err, EngineError::ModelValidation(_)));
    }

    #[test]
    fn test_generate_without_model() {
        let engine = LlamaEngine::new();
        let params = GenerationParams::for_mode(crate::inference::params::Mode::Fast, 300);
        let err = engine.generate("prompt", params).unwrap_err();
        assert!(matches!(err, EngineError::BackendNotInitialized));
    }

    #[test]
    fn test_find_stop_earliest_match() {
        let stops = vec!["---".to_string(), "END".to_string()];
        assert_eq!(find_stop("no stops here", &stops), None);
        assert_eq!(find_stop("text END more --- tail", &stops), Some(5));
        assert_eq!(find_stop("text --- END", &stops), Some(5));
    }

    #[test]
    fn test_find_stop_triple_newline() {
        let stops = vec!["</s>".to_string(), "\n\n\n".to_string(), "---".to_string()];
        let text = "A paragraph.\n\nStill going.\n\n\ntrailing junk";
        let pos = find_stop(text, &stops).unwrap();
        assert_eq!(&text[..pos], "A paragraph.\n\nStill going.");
    }

    #[test]
    fn test_drain_valid_utf8_holds_partial_sequence() {
        let mut output = String::new();
        // "é" is 0xC3 0xA9; feed it split across two calls
        let mut buffer = vec![b'a', 0xC3];
        drain_valid_utf8(&mut buffer, &mut output);
        assert_eq!(output, "a");
        assert_eq!(buffer, vec![0xC3]);

        buffer.push(0xA9);
        drain_valid_utf8(&mut buffer, &mut output);
        assert_eq!(output, "aé");
        assert!(buffer.is_empty());
    }
}
