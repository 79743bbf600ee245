// MirrorResolver - one handle wiring the components to the user's settings

use std::sync::Arc;

use super::config::{ResolverConfig, UserSettings};
use super::download::DownloadResolver;
use super::errors::ResolveError;
use super::failover::FailoverController;
use super::models::{DownloadRequest, ServiceClass, StreamDescriptor};
use super::registry::EndpointRegistry;
use super::stream_selector::StreamSelector;
use super::traits::{CodecSupport, HttpTransport, Notifier};
use super::transport::ReqwestTransport;
use super::url_rewriter::{resolve_listing_link, UrlRewriter};

pub struct MirrorResolver {
    settings: UserSettings,
    registry: Arc<EndpointRegistry>,
    notifier: Arc<dyn Notifier>,
    selector: StreamSelector,
    rewriter: UrlRewriter,
    downloads: DownloadResolver,
}

impl MirrorResolver {
    pub fn new(
        config: &ResolverConfig,
        transport: Arc<dyn HttpTransport>,
        codec_support: Arc<dyn CodecSupport>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let registry = Arc::new(EndpointRegistry::from_lists(&config.mirrors));

        Self {
            settings: config.settings.clone(),
            selector: StreamSelector::new(codec_support),
            rewriter: UrlRewriter::new(registry.clone()),
            downloads: DownloadResolver::from_config(config, transport, notifier.clone()),
            registry,
            notifier,
        }
    }

    /// Production wiring: reqwest transport built from the network config
    pub fn with_reqwest(
        config: &ResolverConfig,
        codec_support: Arc<dyn CodecSupport>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ResolveError> {
        let transport = Arc::new(ReqwestTransport::new(&config.network)?);
        Ok(Self::new(config, transport, codec_support, notifier))
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Arc<EndpointRegistry> {
        &self.registry
    }

    /// Pick the stream to play using the stored quality/codec/volume choices
    pub async fn resolve_stream(
        &self,
        descriptors: &[StreamDescriptor],
    ) -> Result<StreamDescriptor, ResolveError> {
        self.selector
            .resolve_stream(
                descriptors,
                self.settings.quality,
                self.settings.codec,
                self.settings.stable_volume,
            )
            .await
    }

    pub fn proxy_stream_url(&self, url: &str) -> Result<String, ResolveError> {
        self.rewriter
            .proxy_stream_url(url, self.settings.proxy_policy())
    }

    pub fn listing_link(&self, link: &str, page_origin: &str) -> String {
        resolve_listing_link(link, &self.settings.link_host(page_origin))
    }

    /// Validated download link in the user's format, `None` after notifying
    pub async fn resolve_download(&self, media_id: &str) -> Option<String> {
        let request = DownloadRequest::new(media_id, self.settings.download_format.clone());
        self.downloads.resolve(&request).await
    }

    /// Failover policy over one class's cursor, for paged fetches
    pub fn failover(&self, class: ServiceClass) -> FailoverController {
        FailoverController::new(self.registry.clone(), class, self.notifier.clone())
    }
}
