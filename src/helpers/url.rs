//! URL helper functions

use crate::config::SiteConfig;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/post/hello/") // -> "https://example.com/blog/post/hello/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Path of a post page relative to the site root
pub fn post_path(id: &str) -> String {
    format!("post/{}/", encode_url(id))
}

/// Path of an accumulated listing page; page 1 is the home page
pub fn listing_path(page: usize) -> String {
    if page <= 1 {
        String::new()
    } else {
        format!("page/{}/", page)
    }
}

/// Encode a URL path segment
pub fn encode_url(segment: &str) -> String {
    percent_encoding::utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Everything but unreserved characters
const SEGMENT: &percent_encoding::AsciiSet = &percent_encoding::NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');
