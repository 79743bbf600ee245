// Heuristic validation of candidate download links from a HEAD probe

use super::models::{ValidationOutcome, ValidationReason};
use super::traits::ProbeReply;

/// Content types that may legitimately stream without a length
const STREAMABLE_TYPES: [&str; 3] = ["audio/", "video/", "application/octet-stream"];

/// Classify a probe response.
///
/// Non-2xx and an explicit zero length are rejected. A missing length is
/// accepted only for streamable content types. Any other present length
/// is accepted.
pub fn classify_probe(reply: &ProbeReply) -> ValidationOutcome {
    if !(200..300).contains(&reply.status) {
        return ValidationOutcome::invalid(ValidationReason::HttpError(reply.status));
    }

    let length = reply
        .content_length
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match length {
        Some(value) if value.parse::<u64>().ok() == Some(0) => {
            ValidationOutcome::invalid(ValidationReason::EmptyBody)
        }
        Some(_) => ValidationOutcome::valid(),
        None if is_streamable(reply.content_type.as_deref()) => ValidationOutcome::valid(),
        None => ValidationOutcome::invalid(ValidationReason::AmbiguousContent),
    }
}

fn is_streamable(content_type: Option<&str>) -> bool {
    content_type.map_or(false, |ct| {
        let ct = ct.to_ascii_lowercase();
        STREAMABLE_TYPES.iter().any(|t| ct.contains(t))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(status: u16, length: Option<&str>, content_type: Option<&str>) -> ProbeReply {
        ProbeReply {
            status,
            content_length: length.map(String::from),
            content_type: content_type.map(String::from),
        }
    }

    #[test]
    fn test_zero_length_invalid() {
        let outcome = classify_probe(&reply(200, Some("0"), Some("audio/mpeg")));
        assert_eq!(outcome, ValidationOutcome::invalid(ValidationReason::EmptyBody));
    }

    #[test]
    fn test_streaming_without_length_valid() {
        assert!(classify_probe(&reply(200, None, Some("audio/mpeg"))).ok);
        assert!(classify_probe(&reply(200, None, Some("video/mp4"))).ok);
        assert!(classify_probe(&reply(206, None, Some("application/octet-stream"))).ok);
    }

    #[test]
    fn test_missing_length_ambiguous_type_invalid() {
        assert_eq!(
            classify_probe(&reply(200, None, Some("text/html; charset=utf-8"))),
            ValidationOutcome::invalid(ValidationReason::AmbiguousContent)
        );
        assert_eq!(
            classify_probe(&reply(200, None, None)),
            ValidationOutcome::invalid(ValidationReason::AmbiguousContent)
        );
    }

    #[test]
    fn test_non_success_status_invalid() {
        assert_eq!(
            classify_probe(&reply(404, Some("1234"), Some("audio/mpeg"))),
            ValidationOutcome::invalid(ValidationReason::HttpError(404))
        );
    }

    #[test]
    fn test_present_length_valid_regardless_of_type() {
        assert!(classify_probe(&reply(200, Some("4096"), Some("text/plain"))).ok);
        assert!(classify_probe(&reply(200, Some("4096"), None)).ok);
    }
}
