//! Directive catalog: the literal lines each feature writes when enabled.
//!
//! The templates are plain Apache directives.  They are deliberately wrapped
//! in `<IfModule>` guards so a server without the corresponding module simply
//! ignores them instead of failing with a 500.
//!
//! Only the hotlink template is parameterized (by the site's own host name);
//! the other two are constant.

use crate::domain::feature::Feature;

/// MIME types compressed by `mod_deflate`, in emission order.
const DEFLATE_MIME_TYPES: &[&str] = &[
    "text/html",
    "text/css",
    "text/javascript",
    "text/xml",
    "text/plain",
    "image/x-icon",
    "image/svg+xml",
    "application/rss+xml",
    "application/javascript",
    "application/x-javascript",
    "application/xml",
    "application/xhtml+xml",
    "application/x-font",
    "application/x-font-truetype",
    "application/x-font-ttf",
    "application/x-font-otf",
    "application/x-font-opentype",
    "application/vnd.ms-fontobject",
    "font/ttf",
    "font/otf",
    "font/opentype",
];

/// Cache lifetimes as `(mime type, lifetime)`, grouped by asset kind.
const EXPIRY_RULES: &[(&str, &str)] = &[
    // Images
    ("image/jpeg", "1 year"),
    ("image/gif", "1 year"),
    ("image/png", "1 year"),
    ("image/webp", "1 year"),
    ("image/svg+xml", "1 year"),
    ("image/x-icon", "1 year"),
    // Fonts
    ("application/x-font", "1 year"),
    ("application/x-font-truetype", "1 year"),
    ("application/x-font-ttf", "1 year"),
    ("application/x-font-otf", "1 year"),
    ("application/x-font-woff", "1 year"),
    ("application/vnd.ms-fontobject", "1 year"),
    ("font/ttf", "1 year"),
    ("font/otf", "1 year"),
    ("font/opentype", "1 year"),
    // Video
    ("video/mp4", "1 year"),
    ("video/mpeg", "1 year"),
    // Stylesheets and scripts
    ("text/css", "1 week"),
    ("text/javascript", "1 month"),
    ("application/javascript", "1 month"),
    // Documents
    ("application/pdf", "1 month"),
    ("application/x-shockwave-flash", "1 month"),
];

/// External referrers allowed to embed images (image search engines).
pub const ALLOWED_REFERRERS: &[&str] = &["google.com", "startpage.com"];

/// Image extensions blocked for foreign referrers.
pub const BLOCKED_EXTENSIONS: &str = "jpg|jpeg|png|gif";

/// Renders the enabled-state body of each feature's section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockCatalog {
    site_domain: String,
}

impl BlockCatalog {
    /// Creates a catalog for the site served at `site_domain`
    /// (see [`crate::site_domain`]).
    pub fn new(site_domain: impl Into<String>) -> Self {
        Self {
            site_domain: site_domain.into(),
        }
    }

    /// Returns the body lines written when `feature` is enabled.
    ///
    /// The result is never empty: an empty body means "remove the section".
    pub fn render(&self, feature: Feature) -> Vec<String> {
        match feature {
            Feature::Compression => compression_lines(),
            Feature::ExpiryHeaders => expiry_lines(),
            Feature::HotlinkPrevention => hotlink_lines(&self.site_domain),
        }
    }
}

/// `mod_deflate` filters, legacy browser exceptions, and a `mod_gzip`
/// fallback for servers that only ship the older module.
pub fn compression_lines() -> Vec<String> {
    let mut lines = Vec::with_capacity(DEFLATE_MIME_TYPES.len() + 16);
    lines.push("<IfModule mod_deflate.c>".to_string());
    lines.extend(
        DEFLATE_MIME_TYPES
            .iter()
            .map(|mime| format!("AddOutputFilterByType DEFLATE {mime}")),
    );
    // Netscape 4.x and early MSIE mishandle compressed non-HTML responses.
    lines.push("BrowserMatch ^Mozilla/4 gzip-only-text/html".to_string());
    lines.push(r"BrowserMatch ^Mozilla/4\.0[678] no-gzip".to_string());
    lines.push(r"BrowserMatch \bMSIE !no-gzip !gzip-only-text/html".to_string());
    lines.push("</IfModule>".to_string());
    lines.push(String::new());

    lines.push("<ifModule mod_gzip.c>".to_string());
    lines.extend(
        [
            "mod_gzip_on Yes",
            "mod_gzip_dechunk Yes",
            r"mod_gzip_item_include file \.(html?|txt|css|js|php|pl)$",
            "mod_gzip_item_include mime ^application/x-javascript.*",
            "mod_gzip_item_include mime ^text/.*",
            "mod_gzip_item_exclude rspheader ^Content-Encoding:.*gzip.*",
            "mod_gzip_item_exclude mime ^image/.*",
            "mod_gzip_item_include handler ^cgi-script$",
        ]
        .map(str::to_string),
    );
    lines.push("</ifModule>".to_string());
    lines.push(String::new());
    lines
}

/// `mod_expires` lifetimes per MIME type.
pub fn expiry_lines() -> Vec<String> {
    let mut lines = Vec::with_capacity(EXPIRY_RULES.len() + 3);
    lines.push("<IfModule mod_expires.c>".to_string());
    lines.push("  ExpiresActive On".to_string());
    lines.extend(
        EXPIRY_RULES
            .iter()
            .map(|(mime, lifetime)| format!("  ExpiresByType {mime} \"access plus {lifetime}\"")),
    );
    lines.push("</IfModule>".to_string());
    lines
}

/// Referrer rules: empty referrer, the site itself and the allow-listed
/// search engines may load images; everyone else gets `403`.
pub fn hotlink_lines(site_domain: &str) -> Vec<String> {
    let mut lines = vec![
        "RewriteEngine on".to_string(),
        "RewriteCond %{HTTP_REFERER} !^$".to_string(),
        referrer_exception(site_domain),
    ];
    lines.extend(ALLOWED_REFERRERS.iter().map(|domain| referrer_exception(domain)));
    lines.push(format!(r"RewriteRule \.({BLOCKED_EXTENSIONS})$ - [F]"));
    lines
}

fn referrer_exception(domain: &str) -> String {
    format!(r"RewriteCond %{{HTTP_REFERER}} !^http(s)?://(www\.)?{domain} [NC]")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_feature_renders_a_non_empty_body() {
        let catalog = BlockCatalog::new("example.com");
        for feature in Feature::ALL {
            assert!(!catalog.render(feature).is_empty(), "{feature} must render lines");
        }
    }

    #[test]
    fn test_compression_block_has_deflate_and_gzip_fallback() {
        let lines = compression_lines();
        assert_eq!(lines[0], "<IfModule mod_deflate.c>");
        assert!(lines.contains(&"AddOutputFilterByType DEFLATE text/html".to_string()));
        assert!(lines.contains(&"<ifModule mod_gzip.c>".to_string()));
        assert!(lines.contains(&"mod_gzip_on Yes".to_string()));
    }

    #[test]
    fn test_compression_block_emits_mime_types_in_order() {
        let lines = compression_lines();
        let html = lines.iter().position(|l| l.ends_with(" text/html")).unwrap();
        let css = lines.iter().position(|l| l.ends_with(" text/css")).unwrap();
        let font = lines.iter().position(|l| l.ends_with(" font/opentype")).unwrap();
        assert!(html < css && css < font);
    }

    #[test]
    fn test_expiry_lifetimes_by_asset_kind() {
        let lines = expiry_lines();
        let lifetime_of = |mime: &str| {
            lines
                .iter()
                .find(|l| l.contains(&format!("ExpiresByType {mime} ")))
                .cloned()
                .unwrap_or_default()
        };

        assert!(lifetime_of("image/png").ends_with("\"access plus 1 year\""));
        assert!(lifetime_of("font/ttf").ends_with("\"access plus 1 year\""));
        assert!(lifetime_of("video/mp4").ends_with("\"access plus 1 year\""));
        assert!(lifetime_of("text/css").ends_with("\"access plus 1 week\""));
        assert!(lifetime_of("application/javascript").ends_with("\"access plus 1 month\""));
        assert!(lifetime_of("application/pdf").ends_with("\"access plus 1 month\""));
        assert!(lifetime_of("application/x-shockwave-flash").ends_with("\"access plus 1 month\""));
    }

    #[test]
    fn test_hotlink_block_allows_site_and_two_search_engines() {
        // Arrange
        let catalog = BlockCatalog::new("example.com");

        // Act
        let lines = catalog.render(Feature::HotlinkPrevention);

        // Assert
        let exceptions: Vec<&String> = lines
            .iter()
            .filter(|l| l.starts_with("RewriteCond %{HTTP_REFERER} !^http"))
            .collect();
        assert_eq!(exceptions.len(), 3);
        assert!(exceptions[0].contains("example.com"));
        assert!(exceptions[1].contains("google.com"));
        assert!(exceptions[2].contains("startpage.com"));
        assert_eq!(lines.last().unwrap(), r"RewriteRule \.(jpg|jpeg|png|gif)$ - [F]");
    }

    #[test]
    fn test_hotlink_block_allows_empty_referrer_first() {
        let lines = hotlink_lines("example.com");
        assert_eq!(lines[0], "RewriteEngine on");
        assert_eq!(lines[1], "RewriteCond %{HTTP_REFERER} !^$");
    }

    #[test]
    fn test_referrer_exception_format() {
        assert_eq!(
            referrer_exception("example.com"),
            r"RewriteCond %{HTTP_REFERER} !^http(s)?://(www\.)?example.com [NC]"
        );
    }
}
