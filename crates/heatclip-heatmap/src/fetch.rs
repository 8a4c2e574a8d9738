//! Heatmap markup retrieval.
//!
//! The attention graphic ships inline in the watch page markup. This
//! client pulls the page and extracts the heat-map SVG block; everything
//! downstream (parser, binner, detector) is pure and offline.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, info};

use heatclip_models::VideoId;

use crate::error::{HeatmapError, HeatmapResult};

const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

fn svg_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?s)<svg[^>]*ytp-heat-map-svg.*?</svg>"#).expect("valid regex")
    })
}

/// Client for fetching a video's heat-map markup.
#[derive(Debug, Clone)]
pub struct HeatmapClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for HeatmapClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HeatmapClient {
    /// Create a client against the production watch-page host.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom host. Used in tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .expect("reqwest client");

        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch the heat-map SVG markup for a video.
    ///
    /// Returns [`HeatmapError::NotFound`] when the page has no heat-map
    /// block (too few views, heatmap disabled, or region-gated pages).
    pub async fn fetch(&self, video_id: &VideoId) -> HeatmapResult<String> {
        let url = format!("{}/watch?v={}", self.base_url, video_id);
        debug!(url = %url, "Fetching watch page for heatmap");

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(HeatmapError::BadStatus(response.status().as_u16()));
        }

        let body = response.text().await?;
        let markup = svg_pattern()
            .find(&body)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| HeatmapError::NotFound(video_id.to_string()))?;

        info!(
            video_id = %video_id,
            markup_bytes = markup.len(),
            "Extracted heatmap markup"
        );
        Ok(markup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn video_id() -> VideoId {
        VideoId::parse("dQw4w9WgXcQ").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_extracts_svg_block() {
        let server = MockServer::start().await;
        let page = concat!(
            "<html><body><div>",
            r#"<svg class="ytp-heat-map-svg" viewBox="0 0 1000 100">"#,
            r#"<g transform="translate(0, 0)"><path d="M 0.0,100.0 C 1.0,90.0 2.0,80.0 3.0,70.0"/></g>"#,
            "</svg>",
            "</div></body></html>"
        );

        Mock::given(method("GET"))
            .and(path("/watch"))
            .and(query_param("v", "dQw4w9WgXcQ"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;

        let client = HeatmapClient::with_base_url(server.uri());
        let markup = client.fetch(&video_id()).await.unwrap();
        assert!(markup.starts_with("<svg"));
        assert!(markup.ends_with("</svg>"));
        assert!(markup.contains("ytp-heat-map-svg"));
    }

    #[tokio::test]
    async fn test_fetch_missing_heatmap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/watch"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>no heatmap</html>"))
            .mount(&server)
            .await;

        let client = HeatmapClient::with_base_url(server.uri());
        let err = client.fetch(&video_id()).await.unwrap_err();
        assert!(matches!(err, HeatmapError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_bad_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = HeatmapClient::with_base_url(server.uri());
        let err = client.fetch(&video_id()).await.unwrap_err();
        assert!(matches!(err, HeatmapError::BadStatus(429)));
    }
}
