// TrackVariantFilter - drops dubbed tracks and the unwanted DRC variant

use super::models::StreamDescriptor;

#[derive(Debug, Clone, Copy, Default)]
pub struct TrackVariantFilter {
    stable_volume_preferred: bool,
}

impl TrackVariantFilter {
    pub fn new(stable_volume_preferred: bool) -> Self {
        Self {
            stable_volume_preferred,
        }
    }

    /// Keep DRC variants only when stable volume is wanted and one exists,
    /// otherwise keep non-DRC variants; then keep original-language tracks.
    /// The result may be empty.
    pub fn apply(&self, descriptors: &[StreamDescriptor]) -> Vec<StreamDescriptor> {
        let use_drc = self.stable_volume_preferred
            && descriptors.iter().any(|d| d.is_dynamic_range_compressed);

        descriptors
            .iter()
            .filter(|d| d.is_dynamic_range_compressed == use_drc)
            .filter(|d| !d.is_dubbed_variant)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(tag: u32, drc: bool, dubbed: bool) -> StreamDescriptor {
        StreamDescriptor {
            url: format!("https://rr.example/videoplayback?itag={}", tag),
            encoding_tag: tag,
            is_dubbed_variant: dubbed,
            is_dynamic_range_compressed: drc,
        }
    }

    #[test]
    fn test_stable_volume_keeps_only_drc() {
        let set = vec![descriptor(251, true, false), descriptor(251, false, false)];

        let kept = TrackVariantFilter::new(true).apply(&set);
        assert_eq!(kept, vec![set[0].clone()]);
    }

    #[test]
    fn test_without_stable_volume_keeps_only_plain() {
        let set = vec![descriptor(251, true, false), descriptor(251, false, false)];

        let kept = TrackVariantFilter::new(false).apply(&set);
        assert_eq!(kept, vec![set[1].clone()]);
    }

    #[test]
    fn test_stable_volume_without_drc_falls_back_to_plain() {
        let set = vec![descriptor(140, false, false), descriptor(251, false, false)];

        let kept = TrackVariantFilter::new(true).apply(&set);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_dubbed_dropped() {
        let set = vec![
            descriptor(251, false, true),
            descriptor(140, false, false),
            descriptor(250, true, true),
        ];

        let kept = TrackVariantFilter::new(false).apply(&set);
        assert_eq!(kept, vec![set[1].clone()]);

        // Only a dubbed DRC variant exists: DRC is chosen, then dubbing empties it
        let kept = TrackVariantFilter::new(true).apply(&set);
        assert!(kept.is_empty());
    }
}
