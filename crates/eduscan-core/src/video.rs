//! Best-effort video lookup.

use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;

/// Finds at most one video for a search term.
///
/// Implementations just report failures; absorbing them is the enricher's
/// job.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// The id of the first matching video, or `None` when nothing matched.
    async fn find_first(&self, term: &str) -> Result<Option<String>>;
}

const RESULTS_URL: &str = "https://www.youtube.com/results";

/// Pulls the first video id out of the YouTube results page, the same
/// scrape the unauthenticated search libraries perform. No API key needed.
pub struct YoutubeSearch {
    client: reqwest::Client,
    results_url: String,
    request_timeout: Duration,
}

impl YoutubeSearch {
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            results_url: RESULTS_URL.to_string(),
            request_timeout,
        }
    }
}

#[async_trait]
impl VideoSearch for YoutubeSearch {
    async fn find_first(&self, term: &str) -> Result<Option<String>> {
        let url = format!(
            "{}?search_query={}",
            self.results_url,
            urlencoding::encode(term)
        );

        let response = self
            .client
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await
            .context("video search request failed")?
            .error_for_status()
            .context("video search returned an error status")?;

        let body = response
            .text()
            .await
            .context("failed to read video search response")?;
        Ok(first_video_id(&body))
    }
}

/// First embedded `"videoId":"…"` in a results page body.
fn first_video_id(body: &str) -> Option<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r#""videoId":"([A-Za-z0-9_-]{11})""#).expect("valid pattern"));
    pattern.captures(body).map(|captures| captures[1].to_string())
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    #[test]
    fn extracts_first_video_id() {
        let body = r#"var ytInitialData = {"contents": [
            {"videoRenderer": {"videoId":"dQw4w9WgXcQ","title": "First"}},
            {"videoRenderer": {"videoId":"abc123XYZ_-","title": "Second"}}
        ]};"#;
        assert_eq!(first_video_id(body), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn no_match_yields_none() {
        assert_eq!(first_video_id("<html>no results markup</html>"), None);
        // Too short to be a real id.
        assert_eq!(first_video_id(r#""videoId":"short""#), None);
    }

    #[tokio::test]
    async fn searches_with_encoded_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/results")
                    .query_param("search_query", "krebs cycle");
                then.status(200)
                    .body(r#"{"videoRenderer": {"videoId":"k9rebsCycle"}}"#);
            })
            .await;

        let search = YoutubeSearch {
            client: reqwest::Client::new(),
            results_url: server.url("/results"),
            request_timeout: Duration::from_secs(5),
        };

        let id = search.find_first("krebs cycle").await.unwrap();
        mock.assert_async().await;
        assert_eq!(id, Some("k9rebsCycle".to_string()));
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/results");
                then.status(503);
            })
            .await;

        let search = YoutubeSearch {
            client: reqwest::Client::new(),
            results_url: server.url("/results"),
            request_timeout: Duration::from_secs(5),
        };

        assert!(search.find_first("anything").await.is_err());
    }
}
