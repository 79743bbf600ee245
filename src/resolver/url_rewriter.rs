// URLRewriter - proxy policy for stream URLs and listing-link resolution

use regex::Regex;
use std::sync::Arc;
use url::Url;

use super::errors::ResolveError;
use super::models::{LinkHost, ProxyPolicy, ServiceClass};
use super::registry::EndpointRegistry;

const HOST_PARAM: &str = "host";

pub struct UrlRewriter {
    registry: Arc<EndpointRegistry>,
}

impl UrlRewriter {
    pub fn new(registry: Arc<EndpointRegistry>) -> Self {
        Self { registry }
    }

    /// Apply the proxy policy to a stream URL.
    ///
    /// - `enforce_proxy`: append `host=<origin>` unless a `host` is present
    /// - a `host` parameter without a custom instance: talk to that host
    ///   directly and drop the parameter
    /// - otherwise the URL is returned as is
    ///
    /// Starting a proxied resolution is a fresh failover episode, so the
    /// stream-proxy cursor is reset.
    pub fn proxy_stream_url(&self, url: &str, policy: ProxyPolicy) -> Result<String, ResolveError> {
        self.registry.reset(ServiceClass::StreamProxy);

        let mut parsed = Url::parse(url)?;
        let origin = origin_of(&parsed)?;
        // An empty `host=` counts as absent
        let host = parsed
            .query_pairs()
            .find(|(k, _)| k == HOST_PARAM)
            .map(|(_, v)| v.into_owned())
            .filter(|h| !h.is_empty());

        if policy.enforce_proxy {
            if host.is_some() {
                return Ok(url.to_string());
            }
            let query = match parsed.query() {
                Some(q) if !q.is_empty() => format!("{}&{}={}", q, HOST_PARAM, origin),
                _ => format!("{}={}", HOST_PARAM, origin),
            };
            parsed.set_query(Some(&query));
            return Ok(parsed.to_string());
        }

        match host {
            Some(host) if !policy.custom_instance => direct_url(&parsed, &host),
            _ => Ok(url.to_string()),
        }
    }
}

/// `host[:port]` without the scheme
fn origin_of(url: &Url) -> Result<String, ResolveError> {
    let host = url
        .host_str()
        .ok_or_else(|| ResolveError::InvalidUrl(format!("{} has no host", url)))?;

    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Same URL served from `host`, with the `host` indirection removed
fn direct_url(parsed: &Url, host: &str) -> Result<String, ResolveError> {
    if host.is_empty() || host.contains('/') {
        return Err(ResolveError::InvalidUrl(format!("bad host parameter: {}", host)));
    }

    let mut out = format!("{}://{}{}", parsed.scheme(), host, parsed.path());

    let kept: Vec<&str> = parsed
        .query()
        .unwrap_or("")
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some(HOST_PARAM))
        .collect();
    if !kept.is_empty() {
        out.push('?');
        out.push_str(&kept.join("&"));
    }
    if let Some(fragment) = parsed.fragment() {
        out.push('#');
        out.push_str(fragment);
    }

    Url::parse(&out)?;
    Ok(out)
}

/// Turn a relative listing link into an absolute URL on the link host.
///
/// A link host on the page's own origin takes the raw link (with `?list=`
/// collapsed to `=`). Other hosts get the query form: `/watch?v=ID` becomes
/// `?s=ID`, everything else goes to `/list?<key>=<value>`.
pub fn resolve_listing_link(link: &str, host: &LinkHost) -> String {
    let base = host.base.trim_end_matches('/');

    if host.is_same_origin() {
        return format!("{}{}", base, link.replace("?list=", "="));
    }

    if link.starts_with("/watch") {
        let id = link.find('=').map(|i| &link[i..]).unwrap_or("=");
        return format!("{}?s{}", base, id);
    }

    format!("{}/list?{}", base, listing_query(link))
}

fn listing_query(link: &str) -> String {
    if let Some((_, value)) = link.split_once('=') {
        let value = value.split('&').next().unwrap_or(value);
        return format!("playlists={}", value);
    }

    let mut segments: Vec<&str> = link.split('/').filter(|s| !s.is_empty()).collect();
    if let Some(first) = segments.first_mut() {
        if *first == "playlist" {
            *first = "playlists";
        }
    }
    segments.join("=")
}

/// Extract the media id from watch, short, embed and legacy link shapes
pub fn media_id_from_url(link: &str) -> Option<String> {
    lazy_static::lazy_static! {
        static ref MEDIA_ID_RE: Regex = Regex::new(
            r"(?i)(https?://)?((www\.)?(youtube(-nocookie)?|youtube\.googleapis)\.com.*(v/|v=|vi=|vi/|e/|embed/|user/.*/u/\d+/)|youtu\.be/)([_0-9a-z-]+)"
        ).unwrap();
    }

    MEDIA_ID_RE
        .captures(link)
        .and_then(|caps| caps.get(7))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::config::MirrorLists;

    fn rewriter() -> (UrlRewriter, Arc<EndpointRegistry>) {
        let registry = Arc::new(EndpointRegistry::from_lists(&MirrorLists {
            piped: vec!["https://p0".to_string(), "https://p1".to_string()],
            ..MirrorLists::default()
        }));
        (UrlRewriter::new(registry.clone()), registry)
    }

    const PLAIN: &str = "https://proxy.example/videoplayback?itag=251&id=abc";
    const WITH_HOST: &str = "https://proxy.example/videoplayback?itag=251&host=rr3.googlevideo.com&id=abc";

    #[test]
    fn test_no_policy_no_host_is_identity() {
        let (r, _) = rewriter();
        let policy = ProxyPolicy::default();

        let once = r.proxy_stream_url(PLAIN, policy).unwrap();
        assert_eq!(once, PLAIN);
        assert_eq!(r.proxy_stream_url(&once, policy).unwrap(), PLAIN);
    }

    #[test]
    fn test_enforce_appends_origin() {
        let (r, _) = rewriter();
        let policy = ProxyPolicy {
            enforce_proxy: true,
            custom_instance: false,
        };

        assert_eq!(
            r.proxy_stream_url(PLAIN, policy).unwrap(),
            format!("{}&host=proxy.example", PLAIN)
        );
        assert_eq!(
            r.proxy_stream_url("https://proxy.example:8443/vp", policy).unwrap(),
            "https://proxy.example:8443/vp?host=proxy.example:8443"
        );
    }

    #[test]
    fn test_enforce_keeps_existing_host() {
        let (r, _) = rewriter();
        let policy = ProxyPolicy {
            enforce_proxy: true,
            custom_instance: false,
        };
        assert_eq!(r.proxy_stream_url(WITH_HOST, policy).unwrap(), WITH_HOST);
    }

    #[test]
    fn test_host_param_bypasses_proxy() {
        let (r, _) = rewriter();
        assert_eq!(
            r.proxy_stream_url(WITH_HOST, ProxyPolicy::default()).unwrap(),
            "https://rr3.googlevideo.com/videoplayback?itag=251&id=abc"
        );
    }

    #[test]
    fn test_empty_host_param_is_ignored() {
        let (r, _) = rewriter();
        let url = "https://proxy.example/videoplayback?itag=251&host=&id=abc";

        assert_eq!(r.proxy_stream_url(url, ProxyPolicy::default()).unwrap(), url);

        let policy = ProxyPolicy {
            enforce_proxy: true,
            custom_instance: false,
        };
        assert_eq!(
            r.proxy_stream_url(url, policy).unwrap(),
            format!("{}&host=proxy.example", url)
        );
    }

    #[test]
    fn test_enforce_keeps_fragment_last() {
        let (r, _) = rewriter();
        let policy = ProxyPolicy {
            enforce_proxy: true,
            custom_instance: false,
        };
        assert_eq!(
            r.proxy_stream_url("https://proxy.example/vp?itag=251#t=10", policy).unwrap(),
            "https://proxy.example/vp?itag=251&host=proxy.example#t=10"
        );
        assert_eq!(
            r.proxy_stream_url("https://proxy.example/vp#t=10", policy).unwrap(),
            "https://proxy.example/vp?host=proxy.example#t=10"
        );
    }

    #[test]
    fn test_custom_instance_keeps_proxy() {
        let (r, _) = rewriter();
        let policy = ProxyPolicy {
            enforce_proxy: false,
            custom_instance: true,
        };
        assert_eq!(r.proxy_stream_url(WITH_HOST, policy).unwrap(), WITH_HOST);
    }

    #[test]
    fn test_proxy_resets_stream_cursor() {
        let (r, registry) = rewriter();
        registry.advance(ServiceClass::StreamProxy);
        assert_eq!(registry.cursor(ServiceClass::StreamProxy), 1);

        r.proxy_stream_url(PLAIN, ProxyPolicy::default()).unwrap();
        assert_eq!(registry.cursor(ServiceClass::StreamProxy), 0);
    }

    #[test]
    fn test_invalid_url() {
        let (r, _) = rewriter();
        assert!(matches!(
            r.proxy_stream_url("not a url", ProxyPolicy::default()),
            Err(ResolveError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_listing_links_on_foreign_host() {
        let host = LinkHost::new("https://ytify.example/", "https://app.example");

        assert_eq!(
            resolve_listing_link("/watch?v=dQw4w9WgXcQ", &host),
            "https://ytify.example?s=dQw4w9WgXcQ"
        );
        assert_eq!(
            resolve_listing_link("/playlist?list=PLxyz", &host),
            "https://ytify.example/list?playlists=PLxyz"
        );
        assert_eq!(
            resolve_listing_link("/playlist/PLxyz", &host),
            "https://ytify.example/list?playlists=PLxyz"
        );
        assert_eq!(
            resolve_listing_link("/channel/UC123", &host),
            "https://ytify.example/list?channel=UC123"
        );
    }

    #[test]
    fn test_listing_links_same_origin() {
        let host = LinkHost::new("https://ytify.example", "https://ytify.example");

        assert_eq!(
            resolve_listing_link("/playlist?list=PLxyz", &host),
            "https://ytify.example/playlist=PLxyz"
        );
        assert_eq!(
            resolve_listing_link("/channel/UC123", &host),
            "https://ytify.example/channel/UC123"
        );
    }

    #[test]
    fn test_media_id_from_url() {
        for link in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube-nocookie.com/v/dQw4w9WgXcQ",
        ] {
            assert_eq!(media_id_from_url(link).as_deref(), Some("dQw4w9WgXcQ"), "{}", link);
        }
        assert_eq!(media_id_from_url("https://example.com/watch?v=x"), None);
    }
}
