//! Post-content rewriting for the lazy-load setting.

/// Defers image loading by moving every `src=` attribute to `data-src=`.
///
/// The page script swaps the attribute back once the element scrolls into
/// view.  Attributes already named `data-src=` are left untouched so the
/// rewrite can run more than once over the same content.
pub fn lazy_load_images(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + content.len() / 16);
    let mut rest = content;

    while let Some(idx) = rest.find("src=") {
        let (head, tail) = rest.split_at(idx);
        out.push_str(head);
        if !head.ends_with("data-") {
            out.push_str("data-");
        }
        out.push_str("src=");
        rest = &tail["src=".len()..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_src_attributes_become_data_src() {
        let html = r#"<p><img src="a.png"> text <img class="x" src='b.jpg'></p>"#;
        assert_eq!(
            lazy_load_images(html),
            r#"<p><img data-src="a.png"> text <img class="x" data-src='b.jpg'></p>"#
        );
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let once = lazy_load_images(r#"<img src="a.png">"#);
        assert_eq!(lazy_load_images(&once), once);
    }

    #[test]
    fn test_content_without_images_is_unchanged() {
        assert_eq!(lazy_load_images("plain text"), "plain text");
    }
}
