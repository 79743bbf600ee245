// Common data models for resolution

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker carried in the `xtags` of dynamic-range-compressed renditions
pub const DRC_MARKER: &str = "drc%3D1";

/// Marker carried in the `xtags` of dubbed audio tracks
pub const DUBBED_MARKER: &str = "acont%3Ddubbed";

/// Class of interchangeable mirrors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceClass {
    /// Audio stream proxies (primary list plus HLS-capable mirrors)
    StreamProxy,
    /// List/page proxies
    PlaylistProxy,
    /// One-off media extraction services
    ConversionService,
}

impl fmt::Display for ServiceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StreamProxy => write!(f, "stream-proxy"),
            Self::PlaylistProxy => write!(f, "playlist-proxy"),
            Self::ConversionService => write!(f, "conversion-service"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,
    pub service_class: ServiceClass,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, service_class: ServiceClass) -> Self {
        Self {
            url: url.into(),
            service_class,
        }
    }
}

/// One available audio rendition of a media item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub url: String,
    /// Rendition id (bitrate/codec combination) embedded in the URL
    pub encoding_tag: u32,
    pub is_dubbed_variant: bool,
    pub is_dynamic_range_compressed: bool,
}

impl StreamDescriptor {
    /// Build a descriptor from a raw stream URL, reading the tag and
    /// variant markers the URL carries. Returns `None` without an `itag`.
    pub fn from_url(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        let encoding_tag = itag_values(&url).next()?;

        Some(Self {
            is_dubbed_variant: url.contains(DUBBED_MARKER),
            is_dynamic_range_compressed: url.contains(DRC_MARKER),
            encoding_tag,
            url,
        })
    }

    /// Whether the URL embeds the given tag as an `itag` value
    pub fn embeds_tag(&self, tag: u32) -> bool {
        itag_values(&self.url).any(|t| t == tag)
    }
}

/// All `itag=<digits>` values found in a URL, in order
fn itag_values(url: &str) -> impl Iterator<Item = u32> + '_ {
    url.match_indices("itag=").filter_map(move |(idx, key)| {
        let rest = &url[idx + key.len()..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        rest[..end].parse().ok()
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    Opus,
    Aac,
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opus => write!(f, "opus"),
            Self::Aac => write!(f, "aac"),
        }
    }
}

/// User codec choice; `Any` defers to the decoder capability probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecPreference {
    Opus,
    Aac,
    #[default]
    Any,
}

/// Per-action download request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub media_id: String,
    /// Audio container requested from the conversion service (opus, mp3, ...)
    pub output_format: String,
}

impl DownloadRequest {
    pub fn new(media_id: impl Into<String>, output_format: impl Into<String>) -> Self {
        Self {
            media_id: media_id.into(),
            output_format: output_format.into(),
        }
    }

    /// Source URL handed to conversion services
    pub fn source_url(&self) -> String {
        format!("https://youtu.be/{}", self.media_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationReason {
    None,
    HttpError(u16),
    EmptyBody,
    AmbiguousContent,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "valid"),
            Self::HttpError(code) => write!(f, "Download URL returned {}", code),
            Self::EmptyBody => write!(f, "Download URL has 0 bytes"),
            Self::AmbiguousContent => write!(f, "Download URL has unclear content"),
        }
    }
}

/// Result of probing one candidate link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub ok: bool,
    pub reason: ValidationReason,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            ok: true,
            reason: ValidationReason::None,
        }
    }

    pub fn invalid(reason: ValidationReason) -> Self {
        Self { ok: false, reason }
    }
}

/// State of one logical fetch and its retries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailoverContext {
    pub service_class: ServiceClass,
    pub last_error_message: String,
}

/// Proxy policy flags chosen by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyPolicy {
    /// Route every stream through the proxy mirror
    pub enforce_proxy: bool,
    /// A self-hosted instance is configured; never bypass it
    pub custom_instance: bool,
}

/// Host that listing links are resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkHost {
    pub base: String,
    /// Origin of the page currently hosting the application
    pub page_origin: String,
}

impl LinkHost {
    pub fn new(base: impl Into<String>, page_origin: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            page_origin: page_origin.into(),
        }
    }

    pub fn is_same_origin(&self) -> bool {
        self.base.trim_end_matches('/') == self.page_origin.trim_end_matches('/')
    }
}
