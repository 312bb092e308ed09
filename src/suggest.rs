//! AI suggestion generation and extraction.
//!
//! Turns a user prompt into a validated ordered list of suggested task
//! strings. The provider is asked to answer with a JSON array of strings,
//! but models routinely wrap the array in prose or markdown fences, so the
//! extraction step recovers the span between the first `[` and the last
//! `]` and parses that.

use std::sync::Arc;

use thiserror::Error;

use crate::llm::{LlmError, TextGenerator};

/// Failure modes of a generation call.
#[derive(Debug, Error)]
pub enum SuggestError {
    /// The provider is temporarily unreachable or overloaded. Callers
    /// should present a retry-later message.
    #[error("provider temporarily unavailable: {0}")]
    Unavailable(String),

    /// The provider answered but no usable array of strings could be
    /// recovered, or the provider rejected the request permanently.
    #[error("generation failed: {0}")]
    Generation(String),
}

impl From<LlmError> for SuggestError {
    fn from(err: LlmError) -> Self {
        if err.is_transient() {
            SuggestError::Unavailable(err.to_string())
        } else {
            SuggestError::Generation(err.to_string())
        }
    }
}

/// Extract a JSON array of strings from noisy provider output.
///
/// Takes the inclusive span between the first `[` and the last `]` and
/// parses it. No salvage is attempted beyond that: a missing bracket,
/// malformed JSON, or an array holding non-strings all fail.
pub fn extract_json_array(text: &str) -> Result<Vec<String>, SuggestError> {
    let start = text
        .find('[')
        .ok_or_else(|| SuggestError::Generation("no '[' in provider output".to_string()))?;
    let end = text
        .rfind(']')
        .filter(|&end| end > start)
        .ok_or_else(|| SuggestError::Generation("no ']' after '[' in provider output".to_string()))?;

    let span = &text[start..=end];
    serde_json::from_str::<Vec<String>>(span)
        .map_err(|e| SuggestError::Generation(format!("extracted span is not a JSON array of strings: {}", e)))
}

/// Build the instruction sent to the provider for a user prompt.
///
/// The prompt is embedded verbatim; the inline example steers the model
/// toward bare-array output.
fn build_instruction(prompt: &str) -> String {
    format!(
        "Based on the following prompt, generate a to-do list. \
         Return the list as a simple array of strings in JSON format. \
         For example: [\"item 1\", \"item 2\", \"item 3\"]. \
         The prompt is: \"{}\"",
        prompt
    )
}

/// Generates task suggestions through a text-generation provider.
pub struct SuggestionEngine {
    generator: Arc<dyn TextGenerator>,
}

impl SuggestionEngine {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Produce an ordered list of suggested task strings for a prompt.
    ///
    /// One best-effort round trip to the provider; the parsed array is
    /// returned unmodified (no dedup, trimming, or length cap). The raw
    /// provider text is logged when extraction fails, but never surfaced
    /// to the caller.
    pub async fn generate_suggestions(&self, prompt: &str) -> Result<Vec<String>, SuggestError> {
        let instruction = build_instruction(prompt);
        let text = self.generator.generate(&instruction).await?;

        match extract_json_array(&text) {
            Ok(todos) => {
                tracing::debug!("Extracted {} suggestions from provider output", todos.len());
                Ok(todos)
            }
            Err(e) => {
                tracing::warn!("Could not extract suggestions, raw provider output: {}", text);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[test]
    fn test_extracts_bare_array() {
        let todos = extract_json_array(r#"["Book venue", "Order cake"]"#).expect("extract");
        assert_eq!(todos, vec!["Book venue", "Order cake"]);
    }

    #[test]
    fn test_extracts_array_wrapped_in_prose() {
        let text = r#"Sure! ["Book venue", "Order cake", "Send invitations"]"#;
        let todos = extract_json_array(text).expect("extract");
        assert_eq!(todos, vec!["Book venue", "Order cake", "Send invitations"]);
    }

    #[test]
    fn test_extracts_array_in_markdown_fence() {
        let text = "Here you go:\n```json\n[\"a\", \"b\", \"c\"]\n```\nLet me know!";
        let todos = extract_json_array(text).expect("extract");
        assert_eq!(todos, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_order_preserved() {
        let todos = extract_json_array(r#"["z", "a", "m"]"#).expect("extract");
        assert_eq!(todos, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_no_opening_bracket_fails() {
        let err = extract_json_array("I cannot help with that.").unwrap_err();
        assert!(matches!(err, SuggestError::Generation(_)));
    }

    #[test]
    fn test_no_closing_bracket_fails() {
        let err = extract_json_array(r#"["a", "b""#).unwrap_err();
        assert!(matches!(err, SuggestError::Generation(_)));
    }

    #[test]
    fn test_closing_bracket_before_opening_fails() {
        let err = extract_json_array("] nothing here [").unwrap_err();
        assert!(matches!(err, SuggestError::Generation(_)));
    }

    #[test]
    fn test_invalid_json_in_span_fails() {
        // Trailing comma.
        let err = extract_json_array(r#"["a", "b",]"#).unwrap_err();
        assert!(matches!(err, SuggestError::Generation(_)));
        // Unescaped quote.
        let err = extract_json_array(r#"["a "quote""]"#).unwrap_err();
        assert!(matches!(err, SuggestError::Generation(_)));
    }

    #[test]
    fn test_non_string_elements_fail() {
        let err = extract_json_array(r#"[1, 2, 3]"#).unwrap_err();
        assert!(matches!(err, SuggestError::Generation(_)));
    }

    #[test]
    fn test_empty_array_is_valid() {
        let todos = extract_json_array("[]").expect("extract");
        assert!(todos.is_empty());
    }

    #[test]
    fn test_instruction_embeds_prompt_verbatim() {
        let instruction = build_instruction("plan a birthday party");
        assert!(instruction.contains("\"plan a birthday party\""));
        assert!(instruction.contains("[\"item 1\", \"item 2\", \"item 3\"]"));
    }

    /// Scripted generator for exercising the engine without a network.
    struct ScriptedGenerator {
        response: Result<String, ()>,
        transient: bool,
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(()) if self.transient => {
                    Err(LlmError::rate_limited(503, "busy".to_string()))
                }
                Err(()) => Err(LlmError::client_error(400, "rejected".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_engine_returns_parsed_suggestions() {
        let engine = SuggestionEngine::new(Arc::new(ScriptedGenerator {
            response: Ok(r#"Sure! ["Book venue", "Order cake", "Send invitations"]"#.to_string()),
            transient: false,
        }));
        let todos = engine
            .generate_suggestions("plan a birthday party")
            .await
            .expect("suggestions");
        assert_eq!(todos, vec!["Book venue", "Order cake", "Send invitations"]);
    }

    #[tokio::test]
    async fn test_engine_maps_transient_provider_error_to_unavailable() {
        let engine = SuggestionEngine::new(Arc::new(ScriptedGenerator {
            response: Err(()),
            transient: true,
        }));
        let err = engine.generate_suggestions("xyz").await.unwrap_err();
        assert!(matches!(err, SuggestError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_engine_maps_permanent_provider_error_to_generation() {
        let engine = SuggestionEngine::new(Arc::new(ScriptedGenerator {
            response: Err(()),
            transient: false,
        }));
        let err = engine.generate_suggestions("xyz").await.unwrap_err();
        assert!(matches!(err, SuggestError::Generation(_)));
    }

    #[tokio::test]
    async fn test_engine_reports_bracketless_output_as_generation_failure() {
        let engine = SuggestionEngine::new(Arc::new(ScriptedGenerator {
            response: Ok("I cannot help with that.".to_string()),
            transient: false,
        }));
        let err = engine.generate_suggestions("xyz").await.unwrap_err();
        assert!(matches!(err, SuggestError::Generation(_)));
    }
}
