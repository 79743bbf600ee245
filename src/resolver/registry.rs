// EndpointRegistry - ordered mirror lists with a failover cursor per class
//
// Cursors are shared by every operation holding the same registry. They are
// mutex-guarded, but two unrelated failing operations on one class still move
// the same cursor; build a separate registry when that matters.

use parking_lot::Mutex;
use std::collections::HashMap;

use super::config::MirrorLists;
use super::errors::ResolveError;
use super::models::{Endpoint, ServiceClass};

#[derive(Debug, Default)]
pub struct EndpointRegistry {
    endpoints: HashMap<ServiceClass, Vec<Endpoint>>,
    cursors: Mutex<HashMap<ServiceClass, usize>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configured lists. The stream-proxy sequence is the piped
    /// list followed by the HLS mirrors.
    pub fn from_lists(lists: &MirrorLists) -> Self {
        let mut registry = Self::new();
        let stream = lists.piped.iter().chain(lists.hls.iter());

        registry.set(ServiceClass::StreamProxy, stream.cloned());
        registry.set(ServiceClass::PlaylistProxy, lists.invidious.iter().cloned());
        registry.set(ServiceClass::ConversionService, lists.conversion.iter().cloned());
        registry
    }

    /// Replace the sequence for a class and reset its cursor
    pub fn set<I, S>(&mut self, class: ServiceClass, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = urls
            .into_iter()
            .map(|url| Endpoint::new(url, class))
            .collect();
        self.endpoints.insert(class, list);
        self.cursors.get_mut().insert(class, 0);
    }

    /// Append mirrors after the existing ones without reordering them
    pub fn extend<I, S>(&mut self, class: ServiceClass, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.endpoints
            .entry(class)
            .or_default()
            .extend(urls.into_iter().map(|url| Endpoint::new(url, class)));
    }

    /// Endpoint under the cursor
    pub fn current(&self, class: ServiceClass) -> Result<Endpoint, ResolveError> {
        let index = self.cursor(class);
        self.endpoint_at(class, index)
    }

    /// Endpoint at an explicit index, ignoring the cursor
    pub fn endpoint_at(&self, class: ServiceClass, index: usize) -> Result<Endpoint, ResolveError> {
        self.list(class)
            .get(index)
            .cloned()
            .ok_or(ResolveError::OutOfRange(class))
    }

    /// Move to the next endpoint. Returns false (cursor untouched) at the end.
    pub fn advance(&self, class: ServiceClass) -> bool {
        let len = self.len(class);
        let mut cursors = self.cursors.lock();
        let cursor = cursors.entry(class).or_insert(0);

        if *cursor + 1 < len {
            *cursor += 1;
            tracing::debug!(%class, cursor = *cursor, "advanced endpoint cursor");
            true
        } else {
            false
        }
    }

    pub fn reset(&self, class: ServiceClass) {
        self.cursors.lock().insert(class, 0);
    }

    pub fn cursor(&self, class: ServiceClass) -> usize {
        self.cursors.lock().get(&class).copied().unwrap_or(0)
    }

    pub fn len(&self, class: ServiceClass) -> usize {
        self.list(class).len()
    }

    pub fn is_empty(&self, class: ServiceClass) -> bool {
        self.list(class).is_empty()
    }

    /// Whether the cursor sits on the last endpoint (or there is none)
    pub fn is_exhausted(&self, class: ServiceClass) -> bool {
        self.cursor(class) + 1 >= self.len(class)
    }

    fn list(&self, class: ServiceClass) -> &[Endpoint] {
        self.endpoints.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }
}
