use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::StatusCode;
use tracing::warn;

use crate::config::ScrapeConfig;
use crate::error::{PipelineError, Result};

const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;

/// HTTP client for the source site. Built once from the run's config and
/// shared by both discovery and extraction.
pub struct PageFetcher {
    client: reqwest::Client,
    delay: Duration,
}

impl PageFetcher {
    pub fn new(cfg: &ScrapeConfig) -> Result<PageFetcher> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &cfg.cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| PipelineError::Configuration(format!("invalid cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .user_agent(cfg.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| PipelineError::Configuration(format!("http client: {}", e)))?;

        Ok(PageFetcher {
            client,
            delay: Duration::from_millis(cfg.request_delay_ms),
        })
    }

    /// Fetch one page's HTML, retrying transient failures with exponential
    /// backoff. Non-success status after retries is a `Fetch` error.
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        for attempt in 0..=MAX_RETRIES {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < MAX_RETRIES && is_transient(&e) => {
                    let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
                    warn!(
                        "transient failure on {} (attempt {}/{}), backing off {:.1}s: {}",
                        url,
                        attempt + 1,
                        MAX_RETRIES,
                        backoff.as_secs_f64(),
                        e
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
        unreachable!("retry loop always returns");
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            PipelineError::Fetch {
                url: url.to_string(),
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Fetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|_| PipelineError::Fetch {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }

    /// Inter-request pause, applied between players in the extraction loop.
    pub async fn pace(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

fn is_transient(err: &PipelineError) -> bool {
    match err {
        PipelineError::Fetch { status, .. } => {
            matches!(
                StatusCode::from_u16(*status).ok(),
                Some(StatusCode::TOO_MANY_REQUESTS)
                    | Some(StatusCode::INTERNAL_SERVER_ERROR)
                    | Some(StatusCode::BAD_GATEWAY)
                    | Some(StatusCode::SERVICE_UNAVAILABLE)
            ) || *status == 0
        }
        _ => false,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_is_transient() {
        let e = PipelineError::Fetch { url: "u".into(), status: 429 };
        assert!(is_transient(&e));
        let e = PipelineError::Fetch { url: "u".into(), status: 503 };
        assert!(is_transient(&e));
    }

    #[test]
    fn not_found_is_permanent() {
        let e = PipelineError::Fetch { url: "u".into(), status: 404 };
        assert!(!is_transient(&e));
        assert!(!is_transient(&PipelineError::Parse("x".into())));
    }
}
