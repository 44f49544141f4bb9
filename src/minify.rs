//! HTML minification for themed pages.

use crate::error::{Error, Result};

/// Minify HTML content, including inline CSS and JS.
pub fn html(input: &str) -> Result<String> {
    let cfg = minify_html::Cfg {
        minify_css: true,
        minify_js: true,
        keep_closing_tags: true,
        ..Default::default()
    };

    let bytes = minify_html::minify(input.as_bytes(), &cfg);
    String::from_utf8(bytes).map_err(|e| Error::Other(e.to_string()))
}
