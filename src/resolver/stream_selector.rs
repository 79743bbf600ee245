// StreamSelector - picks one audio rendition using a codec/quality table
//
// Selection walks the preference list for (tier, codec) and returns the first
// descriptor embedding the first tag that has any match. It does not look
// further down the list for a better-available rendition.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::errors::ResolveError;
use super::models::{Codec, CodecPreference, QualityTier, StreamDescriptor};
use super::traits::CodecSupport;
use super::variant_filter::TrackVariantFilter;

/// Ordered encoding tags per (tier, codec), most preferred first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityPreferenceTable {
    entries: HashMap<(QualityTier, Codec), Vec<u32>>,
}

impl Default for QualityPreferenceTable {
    fn default() -> Self {
        Self::empty()
            .with_tags(QualityTier::Low, Codec::Opus, [600, 249, 251])
            .with_tags(QualityTier::Low, Codec::Aac, [599, 139, 140])
            .with_tags(QualityTier::Medium, Codec::Opus, [250, 249, 251])
            .with_tags(QualityTier::Medium, Codec::Aac, [139, 140])
            .with_tags(QualityTier::High, Codec::Opus, [251])
            .with_tags(QualityTier::High, Codec::Aac, [140])
    }
}

impl QualityPreferenceTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn with_tags(
        mut self,
        tier: QualityTier,
        codec: Codec,
        tags: impl IntoIterator<Item = u32>,
    ) -> Self {
        self.entries.insert((tier, codec), tags.into_iter().collect());
        self
    }

    pub fn tags(&self, tier: QualityTier, codec: Codec) -> &[u32] {
        self.entries
            .get(&(tier, codec))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

pub struct StreamSelector {
    table: QualityPreferenceTable,
    codec_support: Arc<dyn CodecSupport>,
    opus_supported: OnceCell<bool>,
}

impl StreamSelector {
    pub fn new(codec_support: Arc<dyn CodecSupport>) -> Self {
        Self {
            table: QualityPreferenceTable::default(),
            codec_support,
            opus_supported: OnceCell::new(),
        }
    }

    pub fn with_table(mut self, table: QualityPreferenceTable) -> Self {
        self.table = table;
        self
    }

    pub fn table(&self) -> &QualityPreferenceTable {
        &self.table
    }

    /// Turn `Any` into a concrete codec. The capability probe runs once per
    /// selector and is cached afterwards.
    pub async fn resolve_codec(&self, preference: CodecPreference) -> Codec {
        match preference {
            CodecPreference::Opus => Codec::Opus,
            CodecPreference::Aac => Codec::Aac,
            CodecPreference::Any => {
                let supported = *self
                    .opus_supported
                    .get_or_init(|| async {
                        let supported = self.codec_support.supports_opus().await;
                        tracing::debug!(supported, "opus decoder capability probed");
                        supported
                    })
                    .await;

                if supported {
                    Codec::Opus
                } else {
                    Codec::Aac
                }
            }
        }
    }

    /// Select with a concrete codec (no capability probe)
    pub fn select_with_codec<'a>(
        &self,
        descriptors: &'a [StreamDescriptor],
        tier: QualityTier,
        codec: Codec,
    ) -> Result<&'a StreamDescriptor, ResolveError> {
        for &tag in self.table.tags(tier, codec) {
            if let Some(stream) = descriptors.iter().find(|d| d.embeds_tag(tag)) {
                tracing::debug!(tag, ?tier, %codec, "selected audio stream");
                return Ok(stream);
            }
        }

        Err(ResolveError::NoMatchingStream)
    }

    pub async fn select<'a>(
        &self,
        descriptors: &'a [StreamDescriptor],
        tier: QualityTier,
        preference: CodecPreference,
    ) -> Result<&'a StreamDescriptor, ResolveError> {
        let codec = self.resolve_codec(preference).await;
        self.select_with_codec(descriptors, tier, codec)
    }

    /// Filter unwanted variants, then select
    pub async fn resolve_stream(
        &self,
        descriptors: &[StreamDescriptor],
        tier: QualityTier,
        preference: CodecPreference,
        stable_volume_preferred: bool,
    ) -> Result<StreamDescriptor, ResolveError> {
        let candidates = TrackVariantFilter::new(stable_volume_preferred).apply(descriptors);
        if candidates.is_empty() {
            return Err(ResolveError::NoMatchingStream);
        }

        self.select(&candidates, tier, preference).await.cloned()
    }
}
