// Query-string sanitation for CDN media URLs

use url::Url;

/// Query keys that encode a CDN byte-range request. Left in place they make
/// the origin serve a truncated partial object instead of the full file.
const RANGE_KEYS: [&str; 3] = ["bytestart", "byteend", "range"];

/// Strip byte-range query parameters, keeping every other pair byte-for-byte
/// intact (signature and expiry tokens must survive). Returns the input
/// unchanged when it does not parse as a URL; sanitation is best-effort and
/// never fails the caller.
pub fn strip_range_params(raw: &str) -> String {
    if Url::parse(raw).is_err() {
        return raw.to_string();
    }
    let Some((base, rest)) = raw.split_once('?') else {
        return raw.to_string();
    };
    let (query, fragment) = match rest.split_once('#') {
        Some((q, f)) => (q, Some(f)),
        None => (rest, None),
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty() && !is_range_pair(pair))
        .collect();

    let mut out = base.to_string();
    if !kept.is_empty() {
        out.push('?');
        out.push_str(&kept.join("&"));
    }
    if let Some(f) = fragment {
        out.push('#');
        out.push_str(f);
    }
    out
}

fn is_range_pair(pair: &str) -> bool {
    let key = pair.split('=').next().unwrap_or("").to_ascii_lowercase();
    RANGE_KEYS.contains(&key.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_range_keys_preserving_signature() {
        let input = "https://cdn.example.com/v.mp4?sig=abc123&bytestart=0&byteend=500";
        assert_eq!(
            strip_range_params(input),
            "https://cdn.example.com/v.mp4?sig=abc123"
        );
    }

    #[test]
    fn test_range_keys_are_case_insensitive() {
        let input = "https://cdn.example.com/v.mp4?ByteStart=0&BYTEEND=9&Range=0-9&x=1";
        assert_eq!(strip_range_params(input), "https://cdn.example.com/v.mp4?x=1");
    }

    #[test]
    fn test_idempotent() {
        let input = "https://cdn.example.com/v.mp4?bytestart=0&sig=s&range=0-";
        let once = strip_range_params(input);
        assert_eq!(strip_range_params(&once), once);
    }

    #[test]
    fn test_query_free_url_untouched() {
        let input = "https://cdn.example.com/v.mp4";
        assert_eq!(strip_range_params(input), input);
    }

    #[test]
    fn test_all_pairs_stripped_drops_separator() {
        let input = "https://cdn.example.com/v.mp4?bytestart=0&byteend=500";
        assert_eq!(strip_range_params(input), "https://cdn.example.com/v.mp4");
    }

    #[test]
    fn test_unparseable_input_returned_unchanged() {
        let input = "not a url?bytestart=0";
        assert_eq!(strip_range_params(input), input);
    }

    #[test]
    fn test_fragment_survives() {
        let input = "https://cdn.example.com/v.mp4?bytestart=0&sig=s#t=10";
        assert_eq!(
            strip_range_params(input),
            "https://cdn.example.com/v.mp4?sig=s#t=10"
        );
    }
}
