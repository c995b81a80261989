//! URL parsing helpers for YouTube video ids.

/// Markers that can precede a video id in a YouTube URL, checked in order.
/// Covers watch, short-link, embed, shorts, live and legacy `/v/` paths,
/// with or without `www.`/`m.` prefixes.
const ID_MARKERS: &[&str] = &[
    "?v=",
    "&v=",
    "youtu.be/",
    "/embed/",
    "/shorts/",
    "/live/",
    "/v/",
];

/// Characters that terminate an id segment inside a URL.
const SEGMENT_DELIMITERS: [char; 4] = ['&', '#', '?', '/'];

/// YouTube video ids are exactly 11 characters of `[A-Za-z0-9_-]`.
const VIDEO_ID_LEN: usize = 11;

/// Extract the 11-character video id from a YouTube URL.
///
/// Returns `None` for non-YouTube URLs, URLs without an id, and ids that
/// fail format validation. Matching is case-insensitive on the URL path but
/// preserves the id's own casing.
pub fn extract_video_id(url: &str) -> Option<String> {
    let url = url.trim();
    let lowered = url.to_ascii_lowercase();

    if !lowered.contains("youtube.com") && !lowered.contains("youtu.be") {
        return None;
    }

    for marker in ID_MARKERS {
        if let Some(pos) = lowered.find(marker) {
            // Byte offsets are stable: ASCII lowercasing preserves length.
            let tail = &url[pos + marker.len()..];
            if let Some(id) = take_id_segment(tail) {
                return Some(id);
            }
        }
    }

    None
}

/// Take the leading segment of `tail` up to the next delimiter and validate
/// it as a video id.
fn take_id_segment(tail: &str) -> Option<String> {
    let end = tail
        .find(|c| SEGMENT_DELIMITERS.contains(&c))
        .unwrap_or(tail.len());
    let candidate = tail[..end].trim();

    if candidate.len() != VIDEO_ID_LEN {
        return None;
    }
    if !candidate
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return None;
    }

    Some(candidate.to_string())
}
