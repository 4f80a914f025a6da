// Object naming for published media

use crate::extractor::models::MediaKind;

/// Known media extensions probed in URLs, most common first
const URL_EXTENSIONS: [&str; 6] = [".mp4", ".mov", ".webm", ".m4v", ".jpg", ".jpeg"];

const MAX_SLUG_LEN: usize = 60;

/// Lowercase, collapse non-alphanumeric runs to '-', trim the edges, cap the
/// length. Empty input falls back to "reel".
pub fn slugify(input: &str) -> String {
    let mut slug: String = input
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    while slug.contains("--") {
        slug = slug.replace("--", "-");
    }
    let slug: String = slug.trim_matches('-').chars().take(MAX_SLUG_LEN).collect();
    if slug.is_empty() {
        "reel".to_string()
    } else {
        slug
    }
}

/// Extension inferred from a URL; ".mp4" when nothing matches
pub fn extension_from_url(url: &str) -> &'static str {
    let lower = url.to_lowercase();
    for ext in URL_EXTENSIONS {
        if lower.ends_with(ext) || lower.contains(&format!("{}?", ext)) {
            return if ext == ".jpeg" { ".jpg" } else { ext };
        }
    }
    ".mp4"
}

/// Extension for a download. The declared content type overrides the URL
/// guess for videos; images always land as .jpg.
pub fn extension_for(kind: MediaKind, content_type: &str, url: &str) -> &'static str {
    match kind {
        MediaKind::Image => ".jpg",
        MediaKind::Video => {
            let ct = content_type.to_ascii_lowercase();
            if ct.contains("webm") {
                ".webm"
            } else if ct.contains("quicktime") {
                ".mov"
            } else {
                extension_from_url(url)
            }
        }
    }
}

/// Final object name: `<timestamp>-<slug><ext>`, with characters both the
/// filesystem and URL handling tolerate
pub fn object_name(datetime_iso: &str, hint: &str, ext: &str) -> String {
    let stamp = datetime_iso.replace([':', '.'], "-");
    format!("{}-{}{}", stamp, slugify(hint), ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_and_trims() {
        assert_eq!(slugify("Sunset walk!! (part 2)"), "sunset-walk-part-2");
        assert_eq!(slugify("---"), "reel");
        assert_eq!(slugify(""), "reel");
    }

    #[test]
    fn test_slugify_caps_length() {
        let long = "a".repeat(200);
        assert_eq!(slugify(&long).len(), 60);
    }

    #[test]
    fn test_extension_from_url_handles_queries() {
        assert_eq!(extension_from_url("https://cdn/v.mp4"), ".mp4");
        assert_eq!(extension_from_url("https://cdn/v.webm?tk=1"), ".webm");
        assert_eq!(extension_from_url("https://cdn/photo.JPEG"), ".jpg");
        assert_eq!(extension_from_url("https://cdn/unknown"), ".mp4");
    }

    #[test]
    fn test_content_type_overrides_url_guess() {
        assert_eq!(
            extension_for(MediaKind::Video, "video/webm", "https://cdn/v.mp4"),
            ".webm"
        );
        assert_eq!(
            extension_for(MediaKind::Video, "video/quicktime", "https://cdn/v"),
            ".mov"
        );
        assert_eq!(
            extension_for(MediaKind::Video, "video/mp4", "https://cdn/v.mp4?x=1"),
            ".mp4"
        );
        assert_eq!(
            extension_for(MediaKind::Image, "image/png", "https://cdn/p.png"),
            ".jpg"
        );
    }

    #[test]
    fn test_object_name_is_filesystem_safe() {
        let name = object_name("2025-08-27T12:30:00Z", "Sunset walk", ".mp4");
        assert_eq!(name, "2025-08-27T12-30-00Z-sunset-walk.mp4");
        assert!(!name.contains(':'));
    }
}
