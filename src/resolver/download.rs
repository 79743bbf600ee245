// DownloadResolver - walks conversion services in priority order
//
// Each service is asked to extract the media; a returned link is only
// trusted after a HEAD probe. The first validated link wins. Per-service
// failures are logged and absorbed; only the final aggregate reaches the
// user through the notifier.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::config::ResolverConfig;
use super::errors::ResolveError;
use super::models::{DownloadRequest, Endpoint, ServiceClass};
use super::traits::{HttpTransport, Notifier};
use super::validation::classify_probe;

/// Public conversion instances, most reliable first
pub const DEFAULT_CONVERSION_SERVICES: [&str; 11] = [
    "https://sunny.imput.net",
    "https://nachos.imput.net",
    "https://kityune.imput.net",
    "https://blossom.imput.net",
    "https://cobalt-backend.canine.tools",
    "https://capi.3kh0.net",
    "https://noodle.imput.net",
    "https://cobalt.api.timelessnesses.me",
    "https://olly.imput.net",
    "https://downloadapi.stuff.solutions",
    "https://cobalt-7.kwiatekmiki.com",
];

const ALL_UNAVAILABLE: &str = "All download services are unavailable";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversionRequest<'a> {
    url: &'a str,
    download_mode: &'static str,
    audio_format: &'a str,
    filename_style: &'static str,
}

/// Body returned by a conversion service; an empty `url` defers to `error`
#[derive(Debug, Deserialize)]
struct ConversionResponse {
    url: Option<String>,
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServiceError {
    Message(String),
    Coded { code: String },
    Other(serde_json::Value),
}

impl ServiceError {
    /// Message to record, or `None` when the field is empty/falsy
    fn message(&self) -> Option<String> {
        match self {
            Self::Message(m) if !m.is_empty() => Some(m.clone()),
            Self::Coded { code } if !code.is_empty() => Some(code.clone()),
            Self::Other(v) if !v.is_null() && v != &serde_json::Value::Bool(false) => {
                Some(v.to_string())
            }
            _ => None,
        }
    }
}

/// Decode a service body into a candidate URL, or the message to record
fn decode_candidate(body: &str) -> Result<String, String> {
    let unexpected = || "Unexpected response format".to_string();

    match serde_json::from_str::<ConversionResponse>(body) {
        Ok(ConversionResponse { url: Some(url), .. }) if !url.is_empty() => Ok(url),
        Ok(ConversionResponse {
            error: Some(error), ..
        }) => Err(error.message().unwrap_or_else(unexpected)),
        Ok(_) => Err(unexpected()),
        Err(e) => match serde_json::from_str::<serde_json::Value>(body) {
            Ok(_) => Err(unexpected()),
            Err(_) => Err(ResolveError::from(e).to_string()),
        },
    }
}

pub struct DownloadResolver {
    endpoints: Vec<Endpoint>,
    transport: Arc<dyn HttpTransport>,
    notifier: Arc<dyn Notifier>,
    extraction_timeout: Duration,
    probe_timeout: Duration,
}

impl DownloadResolver {
    pub fn new(transport: Arc<dyn HttpTransport>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            endpoints: to_endpoints(DEFAULT_CONVERSION_SERVICES),
            transport,
            notifier,
            extraction_timeout: Duration::from_secs(10),
            probe_timeout: Duration::from_secs(5),
        }
    }

    pub fn from_config(
        config: &ResolverConfig,
        transport: Arc<dyn HttpTransport>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::new(transport, notifier)
            .with_endpoints(config.mirrors.conversion.iter().cloned())
            .with_timeouts(
                config.network.extraction_timeout(),
                config.network.probe_timeout(),
            )
    }

    /// Replace the service list; an empty list keeps the built-in one
    pub fn with_endpoints<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let endpoints = to_endpoints(urls);
        if !endpoints.is_empty() {
            self.endpoints = endpoints;
        }
        self
    }

    pub fn with_timeouts(mut self, extraction: Duration, probe: Duration) -> Self {
        self.extraction_timeout = extraction;
        self.probe_timeout = probe;
        self
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Resolve a validated download link. On total failure the user is
    /// notified once and `None` is returned.
    pub async fn resolve(&self, request: &DownloadRequest) -> Option<String> {
        match self.try_resolve(request).await {
            Ok(url) => Some(url),
            Err(e) => {
                let last = match &e {
                    ResolveError::EndpointExhausted { last_error } => last_error.clone(),
                    other => other.to_string(),
                };
                tracing::error!(media_id = %request.media_id, last_error = %last, "all conversion services failed");
                self.notifier.notify(&format!(
                    "Download failed: {}. Please try again later.",
                    last
                ));
                None
            }
        }
    }

    /// Same walk as [`resolve`](Self::resolve) without notifying
    pub async fn try_resolve(&self, request: &DownloadRequest) -> Result<String, ResolveError> {
        let source = request.source_url();
        let body = serde_json::to_value(ConversionRequest {
            url: &source,
            download_mode: "audio",
            audio_format: &request.output_format,
            filename_style: "basic",
        })?;

        let mut last_error = String::new();
        let total = self.endpoints.len();

        for (i, endpoint) in self.endpoints.iter().enumerate() {
            tracing::debug!(
                endpoint = %endpoint.url,
                attempt = i + 1,
                total,
                "requesting extraction"
            );

            match self.attempt(endpoint, &body).await {
                Ok(url) => {
                    tracing::info!(endpoint = %endpoint.url, "validated download link");
                    return Ok(url);
                }
                Err(reason) => {
                    tracing::warn!(endpoint = %endpoint.url, %reason, "conversion service failed");
                    last_error = reason;
                }
            }
        }

        if last_error.is_empty() {
            last_error = ALL_UNAVAILABLE.to_string();
        }
        Err(ResolveError::EndpointExhausted { last_error })
    }

    /// One service: extract, decode, probe. `Err` carries the message to record.
    async fn attempt(&self, endpoint: &Endpoint, body: &serde_json::Value) -> Result<String, String> {
        let reply = bounded(
            self.extraction_timeout,
            self.transport
                .post_json(&endpoint.url, body, self.extraction_timeout),
        )
        .await
        .map_err(|e| e.to_string())?;

        if !reply.is_success() {
            return Err(format!("HTTP {}", reply.status));
        }

        let candidate = decode_candidate(&reply.body)?;
        tracing::debug!(endpoint = %endpoint.url, candidate = %candidate, "got candidate link");

        let probe = bounded(
            self.probe_timeout,
            self.transport.head(&candidate, self.probe_timeout),
        )
        .await
        .map_err(|e| format!("URL verification failed: {}", e))?;

        let outcome = classify_probe(&probe);
        if outcome.ok {
            Ok(candidate)
        } else {
            Err(outcome.reason.to_string())
        }
    }
}

/// Enforce the call-local timeout regardless of the transport
async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, ResolveError>
where
    F: Future<Output = Result<T, ResolveError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| ResolveError::Timeout)?
}

fn to_endpoints<I, S>(urls: I) -> Vec<Endpoint>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    urls.into_iter()
        .map(|url| Endpoint::new(url, ServiceClass::ConversionService))
        .collect()
}
