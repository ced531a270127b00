use crate::config::ProviderConfig;
use crate::provider::ProviderError;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// Thin reqwest wrapper: one attempt per call, status codes mapped onto
/// `ProviderError`.
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            // Yahoo ties the crumb to the session cookie
            .cookie_store(true)
            .build()?;

        Ok(Self { inner })
    }

    /// Fetch a URL as text; any non-2xx status is an error.
    pub async fn get_text(&self, url: &str) -> Result<String, ProviderError> {
        debug!("GET {}", url);

        let resp = self.inner.get(url).send().await?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.text().await?);
        }

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Rate limited on {}", url);
                Err(ProviderError::RateLimited { url: url.to_string() })
            }
            StatusCode::UNAUTHORIZED => Err(ProviderError::Unauthorized { url: url.to_string() }),
            _ => Err(ProviderError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }),
        }
    }

    /// Hit a URL only for the cookies it sets; the status is ignored.
    pub async fn touch(&self, url: &str) -> Result<(), ProviderError> {
        let resp = self.inner.get(url).send().await?;
        debug!("Session cookie request {} → {}", url, resp.status());
        Ok(())
    }
}
