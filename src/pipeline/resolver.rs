// Link resolution - adapter for the external resolver service

use async_trait::async_trait;
use serde::Deserialize;

use super::errors::AcquireError;
use super::models::{NetworkConfig, ResolvedMedia};

/// Hosted resolver endpoint used when no override is given.
const DEFAULT_ENDPOINT: &str = "https://nayan-video-downloader.vercel.app";

/// Resolves a platform share link into candidate direct media URLs.
///
/// Implementations must be stateless across calls; the orchestrator invokes
/// them once per platform link.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Name of the resolver (for logging)
    fn name(&self) -> &'static str;

    /// Resolves `url` into direct media candidates.
    ///
    /// `Ok(None)` means the service answered but had nothing for the link;
    /// transport and protocol failures come back as errors.
    async fn resolve(&self, url: &str) -> Result<Option<ResolvedMedia>, AcquireError>;
}

/// Response envelope of the alldown resolver API.
#[derive(Debug, Deserialize)]
struct ResolveEnvelope {
    data: Option<ResolvedMedia>,
}

/// HTTP client for the hosted alldown resolver service.
pub struct AllDownResolver {
    client: reqwest::Client,
    endpoint: String,
    timeout_seconds: u64,
}

impl AllDownResolver {
    /// Client against `endpoint` (no trailing slash) with the given
    /// network settings.
    pub fn new(endpoint: impl Into<String>, network: &NetworkConfig) -> Result<Self, AcquireError> {
        Ok(Self {
            client: network.build_client()?,
            endpoint: endpoint.into(),
            timeout_seconds: network.timeout_seconds,
        })
    }

    /// Client against the default hosted endpoint.
    pub fn hosted(network: &NetworkConfig) -> Result<Self, AcquireError> {
        Self::new(DEFAULT_ENDPOINT, network)
    }
}

#[async_trait]
impl MediaResolver for AllDownResolver {
    fn name(&self) -> &'static str {
        "alldown"
    }

    async fn resolve(&self, url: &str) -> Result<Option<ResolvedMedia>, AcquireError> {
        let request_url = format!("{}/alldown", self.endpoint);

        let response = self
            .client
            .get(&request_url)
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AcquireError::Timeout {
                        operation: format!("resolving {}", url),
                        seconds: self.timeout_seconds,
                    }
                } else {
                    AcquireError::Resolution {
                        url: url.to_string(),
                        detail: e.to_string(),
                    }
                }
            })?;

        let response = response.error_for_status().map_err(|e| AcquireError::Resolution {
            url: url.to_string(),
            detail: e.to_string(),
        })?;

        let envelope: ResolveEnvelope = response.json().await.map_err(|e| AcquireError::Resolution {
            url: url.to_string(),
            detail: format!("invalid resolver response: {}", e),
        })?;

        Ok(envelope.data)
    }
}
