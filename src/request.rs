//! Blog request types
//!
//! Defines the per-submission request built from the form fields, along with
//! its validation rules. A request is validated before any model work starts.

use thiserror::Error;

/// Minimum topic length after trimming
pub const MIN_TOPIC_CHARS: usize = 3;

/// Allowed range for the target word count
pub const TARGET_WORDS_RANGE: std::ops::RangeInclusive<u32> = 100..=1000;

/// Allowed range for the CPU thread count
pub const THREADS_RANGE: std::ops::RangeInclusive<u32> = 1..=8;

/// Allowed range for the max output token budget
pub const MAX_TOKENS_RANGE: std::ops::RangeInclusive<u32> = 200..=800;

/// Default output token budget for a given target word count.
///
/// Tracks the length slider until the user overrides it: a little headroom
/// over the word count, capped at 500 so the default never drifts into slow
/// territory.
pub fn default_max_tokens(target_words: u32) -> u32 {
    (target_words + 100).min(500)
}

/// Errors produced by request validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Please enter a blog topic")]
    EmptyTopic,

    #[error("Blog topic should be at least {MIN_TOPIC_CHARS} characters long")]
    TopicTooShort,
}

/// Target audience for the generated blog post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Researchers,
    CommonPeople,
    DataScientists,
}

impl Audience {
    /// All selectable audiences, in display order
    pub const ALL: [Audience; 3] = [
        Audience::Researchers,
        Audience::CommonPeople,
        Audience::DataScientists,
    ];

    /// Display label shown in the form
    pub fn label(&self) -> &'static str {
        match self {
            Audience::Researchers => "Researchers",
            Audience::CommonPeople => "Common People",
            Audience::DataScientists => "Data Scientists",
        }
    }

    /// Lower-cased form embedded into the prompt
    pub fn prompt_label(&self) -> String {
        self.label().to_lowercase()
    }

    /// Parses a display label back into an audience, defaulting to Researchers
    pub fn from_label(label: &str) -> Audience {
        Audience::ALL
            .into_iter()
            .find(|a| a.label() == label)
            .unwrap_or(Audience::Researchers)
    }
}

/// A validated blog generation request
///
/// Immutable once built; numeric fields are clamped to their allowed ranges
/// so downstream code never sees out-of-range values even if the form does
/// something odd.
#[derive(Debug, Clone, PartialEq)]
pub struct BlogRequest {
    /// Trimmed blog topic
    pub topic: String,
    /// Target audience
    pub audience: Audience,
    /// Approximate word count requested for the post
    pub target_words: u32,
    /// Fast mode trades quality for latency
    pub fast_mode: bool,
    /// CPU threads handed to the inference backend
    pub threads: u32,
    /// Upper bound on generated tokens requested by the user
    pub max_tokens: u32,
}

impl BlogRequest {
    /// Builds a request from raw form values, validating the topic and
    /// clamping the numeric fields.
    pub fn build(
        topic: &str,
        audience: Audience,
        target_words: u32,
        fast_mode: bool,
        threads: u32,
        max_tokens: u32,
    ) -> Result<Self, RequestError> {
        let topic = topic.trim();

        if topic.is_empty() {
            return Err(RequestError::EmptyTopic);
        }
        if topic.chars().count() < MIN_TOPIC_CHARS {
            return Err(RequestError::TopicTooShort);
        }

        Ok(Self {
            topic: topic.to_string(),
            audience,
            target_words: target_words.clamp(*TARGET_WORDS_RANGE.start(), *TARGET_WORDS_RANGE.end()),
            fast_mode,
            threads: threads.clamp(*THREADS_RANGE.start(), *THREADS_RANGE.end()),
            max_tokens: max_tokens.clamp(*MAX_TOKENS_RANGE.start(), *MAX_TOKENS_RANGE.end()),
        })
    }
}
