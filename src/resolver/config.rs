// Resolver configuration: network limits, user preferences, mirror lists
//
// Everything here is plain data supplied by the host application. Loading
// and persisting it is the host's job; we only parse what it hands over.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::download::DEFAULT_CONVERSION_SERVICES;
use super::errors::ResolveError;
use super::models::{CodecPreference, LinkHost, ProxyPolicy, QualityTier};

/// Network configuration for outbound requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// HTTP or SOCKS5 proxy URL (e.g., "socks5://127.0.0.1:1080")
    pub proxy: Option<String>,
    /// Honour HTTP(S)_PROXY from the environment when no proxy is set
    pub use_system_proxy: bool,
    /// Timeout for a conversion-service extraction request
    pub extraction_timeout_secs: u64,
    /// Timeout for the header-only validation probe
    pub probe_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            use_system_proxy: true,
            extraction_timeout_secs: 10,
            probe_timeout_secs: 5,
            user_agent: "Ytify-App/1.0".to_string(),
        }
    }
}

impl NetworkConfig {
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_system_proxy(mut self, enabled: bool) -> Self {
        self.use_system_proxy = enabled;
        self
    }

    pub fn with_extraction_timeout(mut self, seconds: u64) -> Self {
        self.extraction_timeout_secs = seconds;
        self
    }

    pub fn with_probe_timeout(mut self, seconds: u64) -> Self {
        self.probe_timeout_secs = seconds;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Preferences the user picked in the host application's settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub quality: QualityTier,
    pub codec: CodecPreference,
    /// Prefer loudness-normalised (DRC) audio when available
    pub stable_volume: bool,
    pub enforce_proxy: bool,
    pub custom_instance: bool,
    pub download_format: String,
    pub link_host: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            quality: QualityTier::Medium,
            codec: CodecPreference::Any,
            stable_volume: false,
            enforce_proxy: false,
            custom_instance: false,
            download_format: "opus".to_string(),
            link_host: "https://ytify.netlify.app".to_string(),
        }
    }
}

impl UserSettings {
    pub fn proxy_policy(&self) -> ProxyPolicy {
        ProxyPolicy {
            enforce_proxy: self.enforce_proxy,
            custom_instance: self.custom_instance,
        }
    }

    pub fn link_host(&self, page_origin: impl Into<String>) -> LinkHost {
        LinkHost::new(self.link_host.clone(), page_origin)
    }
}

/// Ordered mirror lists, index 0 most preferred
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorLists {
    /// Stream proxies
    pub piped: Vec<String>,
    /// List/page proxies
    pub invidious: Vec<String>,
    /// HLS-capable mirrors appended after `piped`
    pub hls: Vec<String>,
    /// Conversion services, walked in order by the download resolver
    pub conversion: Vec<String>,
}

impl Default for MirrorLists {
    fn default() -> Self {
        Self {
            piped: Vec::new(),
            invidious: Vec::new(),
            hls: Vec::new(),
            conversion: DEFAULT_CONVERSION_SERVICES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Top-level configuration handed over by the host application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub network: NetworkConfig,
    pub settings: UserSettings,
    pub mirrors: MirrorLists,
}

impl ResolverConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ResolveError> {
        toml::from_str(s).map_err(|e| ResolveError::Parse(format!("config: {}", e)))
    }

    pub fn from_json_str(s: &str) -> Result<Self, ResolveError> {
        serde_json::from_str(s).map_err(|e| ResolveError::Parse(format!("config: {}", e)))
    }

    pub fn with_network(mut self, network: NetworkConfig) -> Self {
        self.network = network;
        self
    }

    pub fn with_settings(mut self, settings: UserSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_mirrors(mut self, mirrors: MirrorLists) -> Self {
        self.mirrors = mirrors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.network.extraction_timeout(), Duration::from_secs(10));
        assert_eq!(config.network.probe_timeout(), Duration::from_secs(5));
        assert_eq!(config.settings.quality, QualityTier::Medium);
        assert_eq!(
            config.mirrors.conversion.len(),
            DEFAULT_CONVERSION_SERVICES.len()
        );
    }

    #[test]
    fn test_toml_partial_override() {
        let config = ResolverConfig::from_toml_str(
            r#"
            [network]
            probe_timeout_secs = 2

            [settings]
            quality = "high"
            codec = "aac"
            stable_volume = true

            [mirrors]
            piped = ["https://pipedapi.a", "https://pipedapi.b"]
            hls = ["https://hls.c"]
            "#,
        )
        .unwrap();

        assert_eq!(config.network.probe_timeout_secs, 2);
        assert_eq!(config.network.extraction_timeout_secs, 10);
        assert_eq!(config.settings.quality, QualityTier::High);
        assert_eq!(config.settings.codec, CodecPreference::Aac);
        assert!(config.settings.stable_volume);
        assert_eq!(config.mirrors.piped.len(), 2);
        assert!(!config.mirrors.conversion.is_empty());
    }

    #[test]
    fn test_json_config() {
        let config =
            ResolverConfig::from_json_str(r#"{"settings":{"enforce_proxy":true}}"#).unwrap();
        assert!(config.settings.proxy_policy().enforce_proxy);
        assert!(!config.settings.proxy_policy().custom_instance);
    }

    #[test]
    fn test_invalid_config_is_parse_error() {
        let err = ResolverConfig::from_toml_str("settings = 3").unwrap_err();
        assert!(matches!(err, ResolveError::Parse(_)));
    }

    #[test]
    fn test_builders() {
        let network = NetworkConfig::default()
            .with_proxy(Some("socks5://127.0.0.1:1080".to_string()))
            .with_probe_timeout(1)
            .with_user_agent("test/0");
        let config = ResolverConfig::default().with_network(network);
        assert_eq!(config.network.probe_timeout(), Duration::from_secs(1));
        assert_eq!(config.network.user_agent, "test/0");
    }
}
