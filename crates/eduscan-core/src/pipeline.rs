//! Pipeline orchestration: extraction → generation → enrichment, plus the
//! direct chat path that bypasses both.

use std::sync::Arc;

use crate::completion::{ChatMessage, CompletionClient, OpenRouterClient};
use crate::config::Config;
use crate::enrich::{enrich, StudyPack};
use crate::error::PipelineError;
use crate::extract::{Document, TextExtractor};
use crate::generate;
use crate::ocr::{OcrMyPdf, TesseractCli};
use crate::video::{VideoSearch, YoutubeSearch};

/// System persona for the chat endpoint.
const SAKHI_PERSONA: &str = "You are Sakhi, a friendly and helpful AI study assistant for students. Keep your answers concise and easy to understand.";

pub struct StudyPipeline {
    extractor: TextExtractor,
    completion: Arc<dyn CompletionClient>,
    video: Arc<dyn VideoSearch>,
}

impl StudyPipeline {
    /// Wire the production engines and clients from `config`.
    pub fn new(config: &Config) -> Self {
        Self::with_parts(
            TextExtractor::new(Arc::new(OcrMyPdf), Arc::new(TesseractCli)),
            Arc::new(OpenRouterClient::new(config)),
            Arc::new(YoutubeSearch::new(config.request_timeout)),
        )
    }

    /// Assembly seam: any capability can be swapped.
    pub fn with_parts(
        extractor: TextExtractor,
        completion: Arc<dyn CompletionClient>,
        video: Arc<dyn VideoSearch>,
    ) -> Self {
        Self {
            extractor,
            completion,
            video,
        }
    }

    /// Produce a study pack for one document.
    ///
    /// Stages run sequentially; each needs the previous stage's output.
    /// Empty or whitespace-only extraction is terminal and the generator
    /// is never invoked for it.
    pub async fn summarize(&self, doc: Document) -> Result<StudyPack, PipelineError> {
        let text = self
            .extractor
            .extract(&doc)
            .await
            .map_err(PipelineError::Extraction)?;
        if text.trim().is_empty() {
            return Err(PipelineError::NoTextFound);
        }

        let draft = generate::generate(self.completion.as_ref(), &text).await?;
        let pack = enrich(draft, self.video.as_ref()).await;
        tracing::info!(
            links = pack.youtube_links.len(),
            flashcards = pack.flashcards.len(),
            "study pack assembled"
        );
        Ok(pack)
    }

    /// Single stateless chat turn with the Sakhi persona. No history is
    /// kept across calls; the reply text is returned raw.
    pub async fn chat(&self, prompt: &str) -> Result<String, PipelineError> {
        let messages = [ChatMessage::system(SAKHI_PERSONA), ChatMessage::user(prompt)];
        Ok(self.completion.complete(&messages, false).await?)
    }
}
