//! Generation parameter bundles
//!
//! The app exposes exactly two operating points. Fast mode trades sampling
//! diversity and token budget for latency; quality mode widens both for more
//! coherent, longer output. Bundles are selected once per request instead of
//! scattering literals across call sites.

/// Hard cap on generated tokens in fast mode
pub const FAST_MODE_TOKEN_CAP: u32 = 300;

/// Operating mode for a generation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Fast,
    Quality,
}

impl Mode {
    /// Selects the mode from the form's fast-mode checkbox
    pub fn from_fast_flag(fast_mode: bool) -> Self {
        if fast_mode {
            Mode::Fast
        } else {
            Mode::Quality
        }
    }

    /// Display label for the stats line
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Fast => "Fast",
            Mode::Quality => "Quality",
        }
    }
}

/// Sampling parameters for one generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
    /// Temperature for sampling
    pub temperature: f32,
    /// Top-p (nucleus) sampling parameter
    pub top_p: f32,
    /// Top-k sampling parameter
    pub top_k: u32,
    /// Repetition penalty
    pub repeat_penalty: f32,
    /// Strings that terminate generation when they appear in the output
    pub stop_sequences: Vec<String>,
}

impl GenerationParams {
    /// Builds the parameter bundle for a mode and a requested token budget.
    ///
    /// Fast mode caps the budget at [`FAST_MODE_TOKEN_CAP`] regardless of
    /// what was requested.
    pub fn for_mode(mode: Mode, requested_max_tokens: u32) -> Self {
        match mode {
            Mode::Fast => Self {
                max_tokens: requested_max_tokens.min(FAST_MODE_TOKEN_CAP),
                temperature: 0.9,
                top_p: 0.8,
                top_k: 30,
                repeat_penalty: 1.15,
                stop_sequences: vec!["</s>".into(), "\n\n\n".into(), "---".into()],
            },
            Mode::Quality => Self {
                max_tokens: requested_max_tokens,
                temperature: 0.7,
                top_p: 0.95,
                top_k: 50,
                repeat_penalty: 1.1,
                stop_sequences: vec!["</s>".into(), "\n---".into(), "END".into()],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_mode_caps_tokens() {
        let params = GenerationParams::for_mode(Mode::Fast, 800);
        assert_eq!(params.max_tokens, 300);

        let params = GenerationParams::for_mode(Mode::Fast, 200);
        assert_eq!(params.max_tokens, 200);
    }

    #[test]
    fn test_quality_mode_keeps_requested_budget() {
        let params = GenerationParams::for_mode(Mode::Quality, 800);
        assert_eq!(params.max_tokens, 800);
    }

    #[test]
    fn test_fast_bundle_values() {
        let params = GenerationParams::for_mode(Mode::Fast, 400);
        assert!((params.temperature - 0.9).abs() < 1e-6);
        assert!((params.top_p - 0.8).abs() < 1e-6);
        assert_eq!(params.top_k, 30);
        assert!((params.repeat_penalty - 1.15).abs() < 1e-6);
        assert_eq!(params.stop_sequences, vec!["</s>", "\n\n\n", "---"]);
    }

    #[test]
    fn test_quality_bundle_values() {
        let params = GenerationParams::for_mode(Mode::Quality, 400);
        assert!((params.temperature - 0.7).abs() < 1e-6);
        assert!((params.top_p - 0.95).abs() < 1e-6);
        assert_eq!(params.top_k, 50);
        assert!((params.repeat_penalty - 1.1).abs() < 1e-6);
        assert_eq!(params.stop_sequences, vec!["</s>", "\n---", "END"]);
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(Mode::from_fast_flag(true), Mode::Fast);
        assert_eq!(Mode::from_fast_flag(false), Mode::Quality);
        assert_eq!(Mode::Fast.label(), "Fast");
        assert_eq!(Mode::Quality.label(), "Quality");
    }
}
