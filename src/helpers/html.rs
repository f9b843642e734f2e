//! HTML helper functions

use super::url::url_for;
use crate::config::{CommentsConfig, SiteConfig};

/// Generate a CSS link tag
///
/// # Examples
/// ```ignore
/// css(&config, "style.css") // -> <link rel="stylesheet" href="/blog/css/style.css">
/// ```
pub fn css(config: &SiteConfig, path: &str) -> String {
    let path =
        if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//") {
            path.to_string()
        } else {
            let path = if path.ends_with(".css") {
                path.to_string()
            } else {
                format!("{}.css", path)
            };
            url_for(config, &format!("css/{}", path.trim_start_matches('/')))
        };

    format!(r#"<link rel="stylesheet" href="{}">"#, path)
}

/// Generate the comment widget: a container the utterances script mounts
/// its iframe into. Empty when comments are disabled.
pub fn comments_widget(config: &CommentsConfig) -> String {
    if !config.is_active() {
        return String::new();
    }

    format!(
        concat!(
            r#"<div id="comments" class="comments">"#,
            r#"<div class="comment-box">"#,
            r#"<script src="{}" repo="{}" issue-term="{}" theme="{}" crossorigin="anonymous" async></script>"#,
            "</div></div>"
        ),
        html_escape(&config.script_url),
        html_escape(&config.repo),
        html_escape(&config.issue_term),
        html_escape(&config.theme)
    )
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
