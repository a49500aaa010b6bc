//! OCR engine capabilities.
//!
//! The pipeline consumes text recognition through these traits only; the
//! production implementations shell out to the `ocrmypdf` and `tesseract`
//! command-line tools.

use std::path::Path;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::process::Command;

/// OCR-normalizes a whole PDF: pages are rasterized, de-skewed and given a
/// fresh text layer.
#[async_trait]
pub trait PdfOcr: Send + Sync {
    /// Write an OCR-normalized copy of `input` to `output`.
    async fn normalize(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Recognizes the text in a single image.
#[async_trait]
pub trait ImageOcr: Send + Sync {
    async fn recognize(&self, image: &Path) -> Result<String>;
}

/// `ocrmypdf` CLI wrapper. OCR is forced even when the document already
/// carries a text layer; embedded layers in scanned student notes are
/// routinely unusable.
pub struct OcrMyPdf;

#[async_trait]
impl PdfOcr for OcrMyPdf {
    async fn normalize(&self, input: &Path, output: &Path) -> Result<()> {
        let run = Command::new("ocrmypdf")
            .arg("--deskew")
            .arg("--force-ocr")
            .arg(input)
            .arg(output)
            .output()
            .await
            .context("failed to run ocrmypdf (is it installed?)")?;

        if !run.status.success() {
            bail!(
                "ocrmypdf failed: {}",
                String::from_utf8_lossy(&run.stderr).trim()
            );
        }
        Ok(())
    }
}

/// `tesseract` CLI wrapper; recognized text arrives on stdout.
pub struct TesseractCli;

#[async_trait]
impl ImageOcr for TesseractCli {
    async fn recognize(&self, image: &Path) -> Result<String> {
        let run = Command::new("tesseract")
            .arg(image)
            .arg("stdout")
            .output()
            .await
            .context("failed to run tesseract (is it installed?)")?;

        if !run.status.success() {
            bail!(
                "tesseract failed: {}",
                String::from_utf8_lossy(&run.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&run.stdout).into_owned())
    }
}
