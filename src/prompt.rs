//! Prompt construction
//!
//! Builds one of two fixed prompt templates from a validated request. Pure
//! and deterministic: the same request always yields the same string.

use crate::request::BlogRequest;

/// Builds the completion prompt for a request.
///
/// Fast mode uses a compact single-line instruction; quality mode asks for a
/// structured post (introduction, main content, conclusion) and ends with a
/// "Blog Post:" cue to bias the model toward a clean completion.
///
/// The topic is embedded verbatim beyond trimming; no further escaping is
/// applied.
pub fn build_prompt(request: &BlogRequest) -> String {
    let topic = request.topic.trim();
    let audience = request.audience.prompt_label();

    if request.fast_mode {
        format!(
            "Write a {}-word blog about '{}' for {}:\n\n",
            request.target_words, topic, audience
        )
    } else {
        format!(
            "Write a comprehensive {}-word blog post about \"{}\" for {}.\n\
             Include introduction, main content, and conclusion.\n\
             \n\
             Blog Post:",
            request.target_words, topic, audience
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Audience;

    fn request(fast: bool) -> BlogRequest {
        BlogRequest::build("AI in Healthcare", Audience::Researchers, 300, fast, 4, 400).unwrap()
    }

    #[test]
    fn test_fast_prompt_exact() {
        let prompt = build_prompt(&request(true));
        assert_eq!(
            prompt,
            "Write a 300-word blog about 'AI in Healthcare' for researchers:\n\n"
        );
    }

    #[test]
    fn test_quality_prompt_structure() {
        let prompt = build_prompt(&request(false));
        assert!(prompt.starts_with(
            "Write a comprehensive 300-word blog post about \"AI in Healthcare\" for researchers."
        ));
        assert!(prompt.contains("Include introduction, main content, and conclusion."));
        assert!(prompt.ends_with("Blog Post:"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_prompt(&request(false));
        let b = build_prompt(&request(false));
        assert_eq!(a, b);
    }

    #[test]
    fn test_audience_lowercased_in_prompt() {
        let req =
            BlogRequest::build("Quantum Computing", Audience::CommonPeople, 500, true, 4, 400)
                .unwrap();
        let prompt = build_prompt(&req);
        assert!(prompt.contains("for common people"));
        assert!(!prompt.contains("Common People"));
    }
}
