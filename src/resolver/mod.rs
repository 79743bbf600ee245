// Resolver module - mirror failover, stream selection, download resolution

pub mod config;
pub mod download;
pub mod errors;
pub mod failover;
pub mod models;
pub mod orchestrator;
pub mod registry;
pub mod stream_selector;
pub mod traits;
pub mod transport;
pub mod url_rewriter;
pub mod validation;
pub mod variant_filter;

pub use config::{MirrorLists, NetworkConfig, ResolverConfig, UserSettings};
pub use download::{DownloadResolver, DEFAULT_CONVERSION_SERVICES};
pub use errors::ResolveError;
pub use failover::{FailoverController, FailoverOutcome, NEXTPAGE_ERROR, NO_DATA_FOUND};
pub use models::{
    Codec, CodecPreference, DownloadRequest, Endpoint, FailoverContext, LinkHost, ProxyPolicy,
    QualityTier, ServiceClass, StreamDescriptor, ValidationOutcome, ValidationReason,
};
pub use orchestrator::MirrorResolver;
pub use registry::EndpointRegistry;
pub use stream_selector::{QualityPreferenceTable, StreamSelector};
pub use traits::{
    CodecSupport, FixedCodecSupport, HttpReply, HttpTransport, LogNotifier, Notifier, ProbeReply,
};
pub use transport::ReqwestTransport;
pub use url_rewriter::{media_id_from_url, resolve_listing_link, UrlRewriter};
pub use validation::classify_probe;
pub use variant_filter::TrackVariantFilter;
