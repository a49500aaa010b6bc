//! Error taxonomy for the study-pack pipeline.
//!
//! Stage-internal failures travel as `anyhow::Error` with context attached;
//! they are converted into these typed variants at the pipeline boundary so
//! the server layer can translate them into HTTP statuses.

use thiserror::Error;

/// Failures of the structured-completion capability.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The service could not be reached at all (connect, TLS, timeout).
    #[error("completion service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("completion service returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The reply was not the JSON we asked for. Fatal; no partial pack is
    /// synthesized from a half-readable reply.
    #[error("completion reply was not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The reply envelope carried no message content.
    #[error("completion reply carried no content")]
    EmptyReply,
}

/// Failures surfaced by the pipeline's entry operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Extraction produced nothing usable; the generator is never invoked.
    #[error("no text found in document")]
    NoTextFound,

    /// OCR normalization or document parsing failed.
    #[error("text extraction failed: {0:#}")]
    Extraction(anyhow::Error),

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

impl PipelineError {
    /// True when the failure was reaching the completion service at all,
    /// as opposed to a bad reply or a local fault. The chat endpoint maps
    /// this case to a distinct service-unavailable response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Completion(CompletionError::Transport(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_is_distinguished() {
        let err = PipelineError::NoTextFound;
        assert!(!err.is_transport());

        let err = PipelineError::Completion(CompletionError::EmptyReply);
        assert!(!err.is_transport());
    }

    #[test]
    fn display_carries_detail() {
        let err = PipelineError::Extraction(anyhow::anyhow!("ocrmypdf failed: bad xref"));
        assert!(err.to_string().contains("bad xref"));

        let parse = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = PipelineError::Completion(CompletionError::Malformed(parse));
        assert!(err.to_string().contains("not valid JSON"));
    }
}
