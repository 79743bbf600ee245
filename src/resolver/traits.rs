// Seams to the outside world: HTTP, decoder capability, user notification

use async_trait::async_trait;
use std::time::Duration;

use super::errors::ResolveError;

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Headers of interest from a header-only probe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReply {
    pub status: u16,
    /// Raw `content-length` header, if sent
    pub content_length: Option<String>,
    /// Raw `content-type` header, if sent
    pub content_type: Option<String>,
}

/// Outbound HTTP used by the download resolver
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST a JSON body, bounded by `timeout`
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<HttpReply, ResolveError>;

    /// HEAD request, bounded by `timeout`
    async fn head(&self, url: &str, timeout: Duration) -> Result<ProbeReply, ResolveError>;
}

/// Decoder capability of the playback environment
#[async_trait]
pub trait CodecSupport: Send + Sync {
    async fn supports_opus(&self) -> bool;
}

/// Capability known up front (tests, headless hosts)
#[derive(Debug, Clone, Copy)]
pub struct FixedCodecSupport(pub bool);

#[async_trait]
impl CodecSupport for FixedCodecSupport {
    async fn supports_opus(&self) -> bool {
        self.0
    }
}

/// User-visible notification sink (snackbar, toast, stderr...)
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Notifier that only logs; used when the host does not provide one
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(target: "mirror_resolver::notify", "{}", message);
    }
}
