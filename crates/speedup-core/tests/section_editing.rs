//! Integration tests for the speedup-core section editor.
//!
//! These tests drive the public API the way the admin crate does: render a
//! block from the catalog, apply it to realistic `.htaccess` text, and check
//! presence with the default policy.

use speedup_core::{
    section::markers::{section_body, serialized_span},
    upsert_text, BlockCatalog, ByteDistancePolicy, Feature, PresencePolicy, SectionEdit,
};

const WORDPRESS_HTACCESS: &str = "\
# BEGIN WordPress
<IfModule mod_rewrite.c>
RewriteEngine On
RewriteBase /
RewriteRule ^index\\.php$ - [L]
RewriteCond %{REQUEST_FILENAME} !-f
RewriteCond %{REQUEST_FILENAME} !-d
RewriteRule . /index.php [L]
</IfModule>
# END WordPress
";

fn apply(text: &str, name: &str, body: &[String]) -> String {
    match upsert_text(text, name, body).expect("markers must be consistent") {
        SectionEdit::Rewritten(out) => out,
        SectionEdit::Unchanged => text.to_string(),
    }
}

#[test]
fn test_removing_absent_section_leaves_text_byte_identical() {
    let edit = upsert_text(WORDPRESS_HTACCESS, Feature::ExpiryHeaders.section_name(), &[])
        .expect("no markers to trip over");
    assert_eq!(edit, SectionEdit::Unchanged);
}

#[test]
fn test_upserting_second_section_never_alters_the_first() {
    // Arrange
    let catalog = BlockCatalog::new("example.com");
    let expire = Feature::ExpiryHeaders.section_name();
    let hotlinks = Feature::HotlinkPrevention.section_name();
    let with_expire = apply(WORDPRESS_HTACCESS, expire, &catalog.render(Feature::ExpiryHeaders));
    let expire_body: Vec<String> = section_body(&with_expire, expire)
        .unwrap()
        .unwrap()
        .into_iter()
        .map(str::to_string)
        .collect();

    // Act
    let with_both = apply(&with_expire, hotlinks, &catalog.render(Feature::HotlinkPrevention));
    let without_hotlinks = apply(&with_both, hotlinks, &[]);

    // Assert
    let after: Vec<String> = section_body(&with_both, expire)
        .unwrap()
        .unwrap()
        .into_iter()
        .map(str::to_string)
        .collect();
    assert_eq!(after, expire_body);
    assert!(with_both.starts_with(WORDPRESS_HTACCESS));
    assert_eq!(without_hotlinks, with_expire);
}

#[test]
fn test_catalog_blocks_are_detected_as_present_after_upsert() {
    let catalog = BlockCatalog::new("example.com");
    let policy = ByteDistancePolicy::default();

    for feature in Feature::ALL {
        let text = apply(WORDPRESS_HTACCESS, feature.section_name(), &catalog.render(feature));
        assert!(policy.is_present(&text, feature.section_name()), "{feature} must be present");
    }
}

#[test]
fn test_presence_follows_serialized_span_around_the_boundary() {
    let policy = ByteDistancePolicy::default();
    let name = "T";
    // `# BEGIN T\n` is 10 bytes, so a body line of n chars spans 10 + n + 1.
    for len in 30..45 {
        let body = vec!["x".repeat(len)];
        let text = apply(WORDPRESS_HTACCESS, name, &body);
        let span = serialized_span(name, &body);
        assert_eq!(policy.is_present(&text, name), span > 50, "span {span}");
    }
}

#[test]
fn test_wordpress_block_survives_enable_disable_cycle() {
    let catalog = BlockCatalog::new("example.com");
    let mut text = WORDPRESS_HTACCESS.to_string();

    for feature in Feature::ALL {
        text = apply(&text, feature.section_name(), &catalog.render(feature));
    }
    for feature in Feature::ALL {
        text = apply(&text, feature.section_name(), &[]);
    }

    assert_eq!(text, WORDPRESS_HTACCESS);
}
