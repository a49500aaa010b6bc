//! Text extraction from uploaded documents.
//!
//! Two independent strategies: a PDF path (OCR-normalize the whole file,
//! then read it page by page) and an image path (per-image OCR with a
//! skip-and-continue policy). Everything the extractor writes to disk is
//! scratch storage scoped to one call and released on every exit path.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::ocr::{ImageOcr, PdfOcr};

/// One uploaded document: a single PDF or an ordered set of note photos.
///
/// Owned by the pipeline invocation that received it; never persisted.
pub enum Document {
    Pdf(Vec<u8>),
    Images(Vec<Vec<u8>>),
}

pub struct TextExtractor {
    pdf_ocr: Arc<dyn PdfOcr>,
    image_ocr: Arc<dyn ImageOcr>,
}

impl TextExtractor {
    pub fn new(pdf_ocr: Arc<dyn PdfOcr>, image_ocr: Arc<dyn ImageOcr>) -> Self {
        Self { pdf_ocr, image_ocr }
    }

    /// Extract all recognizable text from `doc`.
    pub async fn extract(&self, doc: &Document) -> Result<String> {
        match doc {
            Document::Pdf(bytes) => self.extract_pdf(bytes).await,
            Document::Images(images) => self.extract_images(images).await,
        }
    }

    /// OCR-normalize the PDF, then concatenate page text in page order.
    ///
    /// Normalization failure is fatal. Both scratch files are removed when
    /// this function returns, on success and on error alike.
    async fn extract_pdf(&self, bytes: &[u8]) -> Result<String> {
        let mut input = scratch_pdf().context("failed to create scratch file for upload")?;
        input
            .write_all(bytes)
            .context("failed to spool upload to disk")?;
        let output = scratch_pdf().context("failed to create scratch file for OCR output")?;

        self.pdf_ocr
            .normalize(input.path(), output.path())
            .await
            .context("OCR normalization failed")?;

        let text = read_pdf_text(output.path())?;
        tracing::debug!(chars = text.len(), "extracted text from PDF");
        Ok(text)
    }

    /// OCR each image in order; an unreadable image is skipped, not fatal.
    /// Per-image results join with a blank line.
    async fn extract_images(&self, images: &[Vec<u8>]) -> Result<String> {
        let mut parts = Vec::with_capacity(images.len());
        for (index, bytes) in images.iter().enumerate() {
            match self.recognize_one(bytes).await {
                Ok(text) => parts.push(text),
                Err(err) => tracing::warn!(index, error = %err, "skipping unreadable image"),
            }
        }
        tracing::debug!(
            recognized = parts.len(),
            total = images.len(),
            "extracted text from image batch"
        );
        Ok(parts.join("\n\n"))
    }

    async fn recognize_one(&self, bytes: &[u8]) -> Result<String> {
        let mut image = NamedTempFile::new().context("failed to create scratch file for image")?;
        image
            .write_all(bytes)
            .context("failed to spool image to disk")?;
        self.image_ocr.recognize(image.path()).await
    }
}

fn scratch_pdf() -> std::io::Result<NamedTempFile> {
    tempfile::Builder::new().suffix(".pdf").tempfile()
}

/// Read the text of every page of `path`, concatenated in ascending page
/// order.
fn read_pdf_text(path: &Path) -> Result<String> {
    let doc = lopdf::Document::load(path).context("failed to parse normalized PDF")?;

    let mut pages: Vec<u32> = doc.get_pages().keys().cloned().collect();
    pages.sort();

    let mut text = String::new();
    for page_num in &pages {
        text.push_str(&doc.extract_text(&[*page_num]).unwrap_or_default());
    }
    Ok(text)
}
