//! Study-pack generation from extracted text.
//!
//! Builds the prompt, invokes the structured-completion capability, and
//! parses the reply defensively: the model is instructed, not guaranteed,
//! to honor the requested shape.

use serde::{Deserialize, Serialize};

use crate::completion::{ChatMessage, CompletionClient};
use crate::error::{CompletionError, PipelineError};

/// Longest text slice forwarded to the model.
const MAX_PROMPT_CHARS: usize = 8000;

pub const FALLBACK_SUMMARY: &str = "No summary could be generated.";
pub const FALLBACK_DIAGRAM: &str = "graph TD; A[No Diagram];";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// Parsed model output with every missing field already defaulted.
#[derive(Debug, Clone)]
pub struct StudyPackDraft {
    pub summary: String,
    pub youtube_search_terms: Vec<String>,
    pub concept_diagram: String,
    pub flashcards: Vec<Flashcard>,
}

#[derive(Deserialize)]
struct RawDraft {
    summary: Option<String>,
    #[serde(default)]
    youtube_search_terms: Vec<String>,
    concept_diagram: Option<String>,
    #[serde(default)]
    flashcards: Vec<Flashcard>,
}

/// Ask the completion service for a study pack over `text`.
///
/// A reply that is not a JSON object is fatal; no partial pack is
/// synthesized. More or fewer entries than the prompt asked for are
/// accepted as-is.
pub async fn generate(
    completion: &dyn CompletionClient,
    text: &str,
) -> Result<StudyPackDraft, PipelineError> {
    let messages = [ChatMessage::user(build_prompt(text))];
    let reply = completion.complete(&messages, true).await?;

    let raw: RawDraft = serde_json::from_str(&reply).map_err(CompletionError::Malformed)?;
    Ok(StudyPackDraft {
        summary: raw.summary.unwrap_or_else(|| FALLBACK_SUMMARY.to_string()),
        youtube_search_terms: raw.youtube_search_terms,
        concept_diagram: raw
            .concept_diagram
            .unwrap_or_else(|| FALLBACK_DIAGRAM.to_string()),
        flashcards: raw.flashcards,
    })
}

fn build_prompt(text: &str) -> String {
    format!(
        r#"Based on the following educational notes, generate a comprehensive study pack. The output MUST be a valid JSON object.

Notes:
---
{}
---

Provide the following in a JSON format:
1.  "summary": A concise, easy-to-understand summary of the key points (around 200-300 words).
2.  "youtube_search_terms": An array of 3 short, relevant search terms for finding related YouTube videos.
3.  "concept_diagram": A concept map in Mermaid flowchart syntax (e.g., "graph TD; A[Start] --> B(Process);").
4.  "flashcards": An array of 5 JSON objects, where each object has a "question" and an "answer".
"#,
        truncate_chars(text, MAX_PROMPT_CHARS)
    )
}

/// Truncate to at most `max` characters, never splitting a code point.
/// Silent: the caller is not told when input was dropped.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Returns a fixed reply and remembers what it was asked.
    struct CannedCompletion {
        reply: String,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
        json_modes: Mutex<Vec<bool>>,
    }

    impl CannedCompletion {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                json_modes: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for CannedCompletion {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            json_object: bool,
        ) -> Result<String, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts
                .lock()
                .unwrap()
                .extend(messages.iter().map(|m| m.content.clone()));
            self.json_modes.lock().unwrap().push(json_object);
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn full_reply_is_parsed() {
        let completion = CannedCompletion::new(
            r#"{
                "summary": "Plants turn light into sugar.",
                "youtube_search_terms": ["photosynthesis", "chlorophyll"],
                "concept_diagram": "graph TD; A-->B;",
                "flashcards": [{"question": "Q", "answer": "A"}]
            }"#,
        );

        let draft = generate(&completion, "notes about plants").await.unwrap();
        assert_eq!(draft.summary, "Plants turn light into sugar.");
        assert_eq!(draft.youtube_search_terms, ["photosynthesis", "chlorophyll"]);
        assert_eq!(draft.concept_diagram, "graph TD; A-->B;");
        assert_eq!(draft.flashcards.len(), 1);
    }

    #[tokio::test]
    async fn missing_fields_get_defaults() {
        let completion = CannedCompletion::new("{}");

        let draft = generate(&completion, "notes").await.unwrap();
        assert_eq!(draft.summary, FALLBACK_SUMMARY);
        assert!(draft.youtube_search_terms.is_empty());
        assert_eq!(draft.concept_diagram, FALLBACK_DIAGRAM);
        assert!(draft.flashcards.is_empty());
    }

    #[tokio::test]
    async fn wrong_counts_are_accepted() {
        // Seven flashcards and one term instead of the instructed five/three.
        let completion = CannedCompletion::new(
            r#"{
                "youtube_search_terms": ["only one"],
                "flashcards": [
                    {"question": "1", "answer": "a"}, {"question": "2", "answer": "b"},
                    {"question": "3", "answer": "c"}, {"question": "4", "answer": "d"},
                    {"question": "5", "answer": "e"}, {"question": "6", "answer": "f"},
                    {"question": "7", "answer": "g"}
                ]
            }"#,
        );

        let draft = generate(&completion, "notes").await.unwrap();
        assert_eq!(draft.youtube_search_terms.len(), 1);
        assert_eq!(draft.flashcards.len(), 7);
    }

    #[tokio::test]
    async fn non_json_reply_is_fatal() {
        let completion = CannedCompletion::new("Sorry, I cannot produce JSON today.");

        let err = generate(&completion, "notes").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Completion(CompletionError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn prompt_carries_text_and_requests_json_mode() {
        let completion = CannedCompletion::new("{}");
        generate(&completion, "mitochondria are the powerhouse")
            .await
            .unwrap();

        assert_eq!(completion.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*completion.json_modes.lock().unwrap(), [true]);

        let prompts = completion.prompts.lock().unwrap();
        let prompt = &prompts[0];
        assert!(prompt.contains("mitochondria are the powerhouse"));
        for key in ["summary", "youtube_search_terms", "concept_diagram", "flashcards"] {
            assert!(prompt.contains(key), "prompt missing key {}", key);
        }
    }

    #[tokio::test]
    async fn long_input_is_truncated_in_the_prompt() {
        let completion = CannedCompletion::new("{}");
        let text = "x".repeat(MAX_PROMPT_CHARS + 500);
        generate(&completion, &text).await.unwrap();

        let prompts = completion.prompts.lock().unwrap();
        assert!(!prompts[0].contains(&text));
        assert!(prompts[0].contains(&"x".repeat(MAX_PROMPT_CHARS)));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "héllo wörld";
        assert_eq!(truncate_chars(text, 4), "héll");
        assert_eq!(truncate_chars(text, 100), text);
        assert_eq!(truncate_chars("", 10), "");
    }
}
