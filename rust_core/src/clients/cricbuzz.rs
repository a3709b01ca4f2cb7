use super::error::FetchError;
use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use crate::retry::{execute_with_retry, RetryConfig};
use anyhow::{Context, Result};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const WEB_BASE: &str = "https://www.cricbuzz.com";
pub const MOBILE_BASE: &str = "https://m.cricbuzz.com";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct CricbuzzConfig {
    /// Desktop site (live scores, scorecards)
    pub web_base: String,
    /// Mobile site (match-center JSON API)
    pub mobile_base: String,
    pub page_timeout: Duration,
    pub api_timeout: Duration,
    pub commentary_retry: RetryConfig,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for CricbuzzConfig {
    fn default() -> Self {
        Self {
            web_base: WEB_BASE.to_string(),
            mobile_base: MOBILE_BASE.to_string(),
            page_timeout: Duration::from_secs(10),
            api_timeout: Duration::from_secs(25),
            commentary_retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

#[derive(Clone)]
pub struct CricbuzzClient {
    client: Client,
    config: Arc<CricbuzzConfig>,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl std::fmt::Debug for CricbuzzClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CricbuzzClient")
            .field("web_base", &self.config.web_base)
            .field("mobile_base", &self.config.mobile_base)
            .field("circuit_breaker_state", &self.circuit_breaker.state())
            .finish()
    }
}

impl CricbuzzClient {
    pub fn new(config: CricbuzzConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json, text/html, text/plain, */*"),
        );
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            circuit_breaker: Arc::new(CircuitBreaker::new(
                "cricbuzz",
                config.circuit_breaker.clone(),
            )),
            config: Arc::new(config),
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(CricbuzzConfig::default())
    }

    pub fn is_available(&self) -> bool {
        self.circuit_breaker.is_available()
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state()
    }

    pub fn reset_circuit_breaker(&self) {
        self.circuit_breaker.reset();
    }

    pub fn live_scores_url(&self) -> String {
        format!("{}/cricket-match/live-scores", self.config.web_base)
    }

    /// `link` is the site-relative path found on the live-scores page.
    pub fn scorecard_url(&self, link: &str) -> String {
        format!("{}{}", self.config.web_base, link)
    }

    pub fn commentary_url(&self, match_id: &str, innings_id: &str) -> String {
        format!(
            "{}/api/mcenter/{}/full-commentary/{}",
            self.config.mobile_base, match_id, innings_id
        )
    }

    pub async fn live_scores_page(&self) -> Result<String, FetchError> {
        self.fetch_page(&self.live_scores_url()).await
    }

    pub async fn scorecard_page(&self, link: &str) -> Result<String, FetchError> {
        self.fetch_page(&self.scorecard_url(link)).await
    }

    /// Single commentary request without retries, used to probe which innings exist.
    pub async fn probe_commentary(
        &self,
        match_id: &str,
        innings_id: &str,
    ) -> Result<serde_json::Value, FetchError> {
        self.fetch_api_json(&self.commentary_url(match_id, innings_id))
            .await
    }

    /// Commentary JSON for one innings, retried with backoff.
    pub async fn commentary(
        &self,
        match_id: &str,
        innings_id: &str,
    ) -> Result<serde_json::Value, FetchError> {
        if !self.circuit_breaker.is_available() {
            return Err(FetchError::CircuitOpen(
                self.circuit_breaker.name().to_string(),
            ));
        }

        let url = self.commentary_url(match_id, innings_id);
        let result = execute_with_retry(&self.config.commentary_retry, "Commentary fetch", || {
            self.fetch_api_json(&url)
        })
        .await;

        match &result {
            Ok(_) => {
                info!("Got commentary data for match {}", match_id);
                self.circuit_breaker.record_success();
            }
            Err(e) if e.is_upstream_failure() => self.circuit_breaker.record_failure(),
            Err(e) => {
                debug!("Match {} has no commentary: {}", match_id, e);
                self.circuit_breaker.record_success();
            }
        }

        result
    }

    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {}", url);
        let resp = self
            .client
            .get(url)
            .timeout(self.config.page_timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        resp.text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }

    async fn fetch_api_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        debug!("GET {}", url);
        let resp = self
            .client
            .get(url)
            .timeout(self.config.api_timeout)
            .header(header::REFERER, format!("{}/", self.config.mobile_base))
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        resp.json::<serde_json::Value>()
            .await
            .map_err(|e| FetchError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::Backoff;

    fn client() -> CricbuzzClient {
        CricbuzzClient::new(CricbuzzConfig {
            web_base: "http://web.test".to_string(),
            mobile_base: "http://m.test".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_urls() {
        let c = client();
        assert_eq!(c.live_scores_url(), "http://web.test/cricket-match/live-scores");
        assert_eq!(
            c.scorecard_url("/live-cricket-scorecard/91798/ind-vs-aus"),
            "http://web.test/live-cricket-scorecard/91798/ind-vs-aus"
        );
        assert_eq!(
            c.commentary_url("91798", "2"),
            "http://m.test/api/mcenter/91798/full-commentary/2"
        );
    }

    #[tokio::test]
    async fn test_open_circuit_short_circuits() {
        let c = CricbuzzClient::new(CricbuzzConfig {
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: 1,
                recovery_timeout: Duration::from_secs(3600),
                success_threshold: 1,
            },
            ..Default::default()
        })
        .unwrap();

        c.circuit_breaker.record_failure();
        assert_eq!(c.circuit_state(), CircuitState::Open);

        let err = c.commentary("91798", "1").await.unwrap_err();
        assert!(matches!(err, FetchError::CircuitOpen(_)));

        c.reset_circuit_breaker();
        assert!(c.is_available());
    }

    /// Local match-center stand-in answering every request through `route`.
    async fn serve(route: fn(&str) -> (&'static str, &'static str)) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let mut read = 0;
                    while read < buf.len() {
                        let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        read += n;
                        if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }

                    let request = String::from_utf8_lossy(&buf[..read]);
                    let (status, body) = route(&request);
                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{}", addr)
    }

    fn local_client(mobile_base: String, failure_threshold: u32) -> CricbuzzClient {
        CricbuzzClient::new(CricbuzzConfig {
            mobile_base,
            commentary_retry: RetryConfig {
                max_attempts: 2,
                backoff: Backoff::new(1, 1),
                jitter: Duration::ZERO,
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold,
                recovery_timeout: Duration::from_secs(3600),
                success_threshold: 1,
            },
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_commentary_does_not_trip_breaker() {
        let base = serve(|request| {
            if request.contains("/99999/") {
                ("200 OK", r#"{"commentary":[]}"#)
            } else {
                ("404 Not Found", "")
            }
        })
        .await;
        let c = local_client(base, 5);

        // More not-yet-started matches than the failure threshold.
        for id in ["10001", "10002", "10003", "10004", "10005", "10006"] {
            let err = c.commentary(id, "1").await.unwrap_err();
            assert!(matches!(err, FetchError::Status { status: 404, .. }), "{}", err);
        }
        assert_eq!(c.circuit_state(), CircuitState::Closed);

        let live = c.commentary("99999", "1").await.unwrap();
        assert_eq!(live["commentary"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_server_errors_trip_breaker() {
        let base = serve(|_| ("503 Service Unavailable", "")).await;
        let c = local_client(base, 2);

        for id in ["10001", "10002"] {
            let err = c.commentary(id, "1").await.unwrap_err();
            assert!(matches!(err, FetchError::Status { status: 503, .. }), "{}", err);
        }
        assert_eq!(c.circuit_state(), CircuitState::Open);

        let err = c.commentary("10003", "1").await.unwrap_err();
        assert!(matches!(err, FetchError::CircuitOpen(_)));
    }

    #[tokio::test]
    #[ignore] // Requires network
    async fn test_live_scores_page() {
        let c = CricbuzzClient::with_defaults().unwrap();
        match c.live_scores_page().await {
            Ok(html) => assert!(!html.is_empty()),
            Err(e) => println!("Warning: Could not fetch live scores: {}", e),
        }
    }
}
