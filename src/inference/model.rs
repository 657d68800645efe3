//! Model artifact handling
//!
//! Resolves the fixed model path, checks that the artifact exists, and
//! validates the GGUF header before the backend touches it.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// GGUF magic bytes (little-endian: "GGUF")
pub const GGUF_MAGIC: u32 = 0x46554747;

/// Fixed relative path to the model artifact
pub const MODEL_PATH: &str = "models/llama-2-7b-chat.Q4_0.gguf";

/// Where to get the model if it is missing
pub const MODEL_DOWNLOAD_HINT: &str =
    "Download the model from https://huggingface.co/TheBloke/Llama-2-7B-Chat-GGUF \
     and place it in the 'models/' folder as instructed in the README.";

/// Errors that can occur during model file validation
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to open file: {0}")]
    FileOpen(#[from] std::io::Error),

    #[error("Invalid GGUF file: magic bytes mismatch (expected 0x{:08X}, got 0x{:08X})", GGUF_MAGIC, .0)]
    InvalidMagic(u32),

    #[error("Unsupported GGUF version: {0}")]
    UnsupportedVersion(u32),

    #[error("File too small to be valid GGUF")]
    FileTooSmall,
}

/// Load-time configuration for the inference handle
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Path to the GGUF model file
    pub model_path: PathBuf,
    /// CPU threads handed to llama.cpp
    pub threads: u32,
    /// Context window in tokens
    pub context_size: u32,
    /// Tokens decoded per batch
    pub batch_size: u32,
    /// Layers offloaded to GPU (0 = CPU only)
    pub gpu_layers: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(MODEL_PATH),
            threads: 4,
            context_size: 1024,
            batch_size: 1,
            gpu_layers: 0,
        }
    }
}

impl ModelConfig {
    /// Default configuration with a caller-supplied thread count
    pub fn with_threads(threads: u32) -> Self {
        Self {
            threads,
            ..Self::default()
        }
    }
}

/// Metadata extracted from a GGUF file header
#[derive(Debug, Clone)]
pub struct GgufMetadata {
    /// GGUF format version
    pub version: u32,
    /// Number of tensors in the model
    pub tensor_count: u64,
    /// Number of metadata key-value pairs
    pub metadata_kv_count: u64,
}

/// Validates that a file is a valid GGUF format and extracts basic metadata.
pub fn validate_gguf<P: AsRef<Path>>(path: P) -> Result<GgufMetadata, ModelError> {
    let mut file = File::open(path)?;

    // Minimum header: magic(4) + version(4) + tensor_count(8) + metadata_kv_count(8)
    let file_size = file.seek(SeekFrom::End(0))?;
    if file_size < 24 {
        return Err(ModelError::FileTooSmall);
    }
    file.seek(SeekFrom::Start(0))?;

    let mut magic_bytes = [0u8; 4];
    file.read_exact(&mut magic_bytes)?;
    let magic = u32::from_le_bytes(magic_bytes);

    if magic != GGUF_MAGIC {
        return Err(ModelError::InvalidMagic(magic));
    }

    let mut version_bytes = [0u8; 4];
    file.read_exact(&mut version_bytes)?;
    let version = u32::from_le_bytes(version_bytes);

    // GGUF v2 and v3 are supported
    if !(2..=3).contains(&version) {
        return Err(ModelError::UnsupportedVersion(version));
    }

    let mut tensor_count_bytes = [0u8; 8];
    file.read_exact(&mut tensor_count_bytes)?;
    let tensor_count = u64::from_le_bytes(tensor_count_bytes);

    let mut metadata_kv_count_bytes = [0u8; 8];
    file.read_exact(&mut metadata_kv_count_bytes)?;
    let metadata_kv_count = u64::from_le_bytes(metadata_kv_count_bytes);

    Ok(GgufMetadata {
        version,
        tensor_count,
        metadata_kv_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_gguf() -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".gguf").tempfile().unwrap();

        file.write_all(&GGUF_MAGIC.to_le_bytes()).unwrap(); // magic
        file.write_all(&3u32.to_le_bytes()).unwrap(); // version 3
        file.write_all(&10u64.to_le_bytes()).unwrap(); // tensor_count
        file.write_all(&5u64.to_le_bytes()).unwrap(); // metadata_kv_count
        file.flush().unwrap();

        file
    }

    #[test]
    fn test_validate_gguf_valid() {
        let file = create_test_gguf();
        let metadata = validate_gguf(file.path()).unwrap();

        assert_eq!(metadata.version, 3);
        assert_eq!(metadata.tensor_count, 10);
        assert_eq!(metadata.metadata_kv_count, 5);
    }

    #[test]
    fn test_validate_gguf_invalid_magic() {
        let mut file = tempfile::Builder::new().suffix(".gguf").tempfile().unwrap();

        file.write_all(&0xDEADBEEFu32.to_le_bytes()).unwrap();
        file.write_all(&3u32.to_le_bytes()).unwrap();
        file.write_all(&10u64.to_le_bytes()).unwrap();
        file.write_all(&5u64.to_le_bytes()).unwrap();
        file.flush().unwrap();

        let result = validate_gguf(file.path());
        assert!(matches!(result, Err(ModelError::InvalidMagic(0xDEADBEEF))));
    }

    #[test]
    fn test_validate_gguf_file_too_small() {
        let mut file = tempfile::Builder::new().suffix(".gguf").tempfile().unwrap();

        file.write_all(&GGUF_MAGIC.to_le_bytes()).unwrap();
        file.flush().unwrap();

        let result = validate_gguf(file.path());
        assert!(matches!(result, Err(ModelError::FileTooSmall)));
    }

    #[test]
    fn test_validate_gguf_unsupported_version() {
        let mut file = tempfile::Builder::new().suffix(".gguf").tempfile().unwrap();

        file.write_all(&GGUF_MAGIC.to_le_bytes()).unwrap();
        file.write_all(&1u32.to_le_bytes()).unwrap();
        file.write_all(&10u64.to_le_bytes()).unwrap();
        file.write_all(&5u64.to_le_bytes()).unwrap();
        file.flush().unwrap();

        let result = validate_gguf(file.path());
        assert!(matches!(result, Err(ModelError::UnsupportedVersion(1))));
    }

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert_eq!(config.model_path, PathBuf::from(MODEL_PATH));
        assert_eq!(config.threads, 4);
        assert_eq!(config.context_size, 1024);
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.gpu_layers, 0);
    }

    #[test]
    fn test_config_with_threads() {
        let config = ModelConfig::with_threads(8);
        assert_eq!(config.threads, 8);
        assert_eq!(config.context_size, 1024);
    }
}
