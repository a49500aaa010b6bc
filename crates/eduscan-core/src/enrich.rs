//! Enrichment of a generated draft into the final study pack.

use base64::Engine as _;
use serde::Serialize;

use crate::generate::{Flashcard, StudyPackDraft};
use crate::video::VideoSearch;

const MERMAID_RENDER_URL: &str = "https://mermaid.ink/img";
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// The response artifact for one document. Built once, never mutated,
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct StudyPack {
    pub summary: String,
    pub youtube_links: Vec<String>,
    pub concept_diagram_url: String,
    pub flashcards: Vec<Flashcard>,
}

/// Build a mermaid.ink render URL for `markup`.
///
/// Pure and deterministic; the URL is only resolved to an image when a
/// client fetches it.
pub fn diagram_url(markup: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(markup.as_bytes());
    format!("{}/{}?bgColor=FFFFFF", MERMAID_RENDER_URL, encoded)
}

/// Resolve the draft's secondary content. Never fails: a lost video lookup
/// costs one link, nothing more. Link order follows term order.
pub async fn enrich(draft: StudyPackDraft, video: &dyn VideoSearch) -> StudyPack {
    let mut youtube_links = Vec::with_capacity(draft.youtube_search_terms.len());
    for term in &draft.youtube_search_terms {
        match video.find_first(term).await {
            Ok(Some(id)) => youtube_links.push(format!("{}{}", WATCH_URL, id)),
            Ok(None) => tracing::warn!(term = %term, "video search returned no results"),
            Err(err) => tracing::warn!(term = %term, error = %err, "video search failed"),
        }
    }

    StudyPack {
        summary: draft.summary,
        youtube_links,
        concept_diagram_url: diagram_url(&draft.concept_diagram),
        flashcards: draft.flashcards,
    }
}
