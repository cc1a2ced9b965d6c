//! Utility functions for common operations.

use url::Url;

/// Characters that are not allowed in file names on at least one platform.
const RESERVED_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Replaces every filesystem-reserved character with an underscore.
///
/// The result never contains any of `\ / : * ? " < > |`, and sanitizing an
/// already sanitized title returns it unchanged.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if RESERVED_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Returns the directory part of a URL, used as the Referer for a page.
///
/// `http://host/12/34/567.html` becomes `http://host/12/34/`. Query and
/// fragment are dropped.
pub fn parent_referer(url: &Url) -> String {
    let mut parent = url.clone();
    parent.set_query(None);
    parent.set_fragment(None);
    match parent.join("./") {
        Ok(dir) => dir.to_string(),
        Err(_) => parent.to_string(),
    }
}
