//! Generation reports
//!
//! Validates raw model output and packages it with display stats (word
//! count, elapsed time) for the results panel.

use std::time::Duration;

use thiserror::Error;

use crate::inference::params::Mode;

/// Minimum trimmed length for an output to count as a real blog post
pub const MIN_OUTPUT_CHARS: usize = 50;

/// Errors produced when validating generated output
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Generated content is too short. Please try again with a different topic.")]
    OutputTooShort,
}

/// A finished, validated generation with its display stats
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    /// The raw generated text, untrimmed
    pub text: String,
    /// Whitespace-delimited word count of the raw text
    pub word_count: usize,
    /// Wall-clock generation time in seconds
    pub elapsed_seconds: f64,
    /// Operating mode the text was generated under
    pub mode: Mode,
}

/// Counts whitespace-delimited words in a string.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Validates raw output and assembles a [`GenerationReport`].
///
/// Rejects degenerate outputs shorter than [`MIN_OUTPUT_CHARS`] after
/// trimming. The text carried in the report is the original raw output; the
/// trim is only used for the length check.
pub fn finalize(raw: &str, elapsed: Duration, mode: Mode) -> Result<GenerationReport, ReportError> {
    if raw.trim().chars().count() < MIN_OUTPUT_CHARS {
        return Err(ReportError::OutputTooShort);
    }

    Ok(GenerationReport {
        text: raw.to_string(),
        word_count: word_count(raw),
        elapsed_seconds: elapsed.as_secs_f64(),
        mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_OUTPUT: &str = "Artificial intelligence is transforming healthcare in ways that \
                               were unimaginable a decade ago, from diagnostics to drug discovery.";

    #[test]
    fn test_short_output_rejected() {
        let result = finalize("Too short.", Duration::from_secs(3), Mode::Fast);
        assert_eq!(result.unwrap_err(), ReportError::OutputTooShort);
    }

    #[test]
    fn test_whitespace_padding_does_not_pass_length_check() {
        let padded = format!("Short.{}", " ".repeat(100));
        let result = finalize(&padded, Duration::from_secs(3), Mode::Fast);
        assert_eq!(result.unwrap_err(), ReportError::OutputTooShort);
    }

    #[test]
    fn test_report_keeps_raw_text() {
        let raw = format!("  {LONG_OUTPUT}\n\n");
        let report = finalize(&raw, Duration::from_secs(12), Mode::Quality).unwrap();
        // Untrimmed text survives into the report
        assert_eq!(report.text, raw);
        assert_eq!(report.mode, Mode::Quality);
        assert!((report.elapsed_seconds - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_elapsed_is_generation_scoped() {
        use crate::inference::{FinishReason, GenerationOutput};

        // The worker stamps the output with the duration of the generation
        // call itself; the report must carry exactly that value, so a slow
        // first-time model load can never leak into the displayed time.
        let output = GenerationOutput {
            text: LONG_OUTPUT.to_string(),
            finish_reason: FinishReason::MaxTokens,
            elapsed: Duration::from_millis(2500),
        };

        let report = finalize(&output.text, output.elapsed, Mode::Fast).unwrap();
        assert!((report.elapsed_seconds - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_word_count_whitespace_delimited() {
        assert_eq!(word_count("Hello world.  Done"), 3);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("  \n\t "), 0);
        assert_eq!(word_count("one\ntwo\tthree four"), 4);
    }

    #[test]
    fn test_word_count_on_untrimmed_text() {
        let raw = format!("\n\n{LONG_OUTPUT} ");
        let report = finalize(&raw, Duration::from_secs(5), Mode::Fast).unwrap();
        assert_eq!(report.word_count, word_count(&raw));
    }
}
