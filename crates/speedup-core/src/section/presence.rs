//! Presence-detection policies.
//!
//! Deciding whether a feature is "on" is done by looking at the managed file,
//! not at any persisted flag.  Two policies exist:
//!
//! - [`ByteDistancePolicy`] reproduces the historical heuristic: the section
//!   counts as present when its begin and end markers are more than a fixed
//!   number of bytes apart.  Short but legitimate blocks are misclassified
//!   as absent.
//!
//! - [`LineCountPolicy`] parses the section structurally and counts
//!   non-blank body lines.
//!
//! # Boundary
//!
//! The byte-distance comparison is strict: a distance of exactly
//! [`DEFAULT_BYTE_THRESHOLD`] classifies the section as **absent**.
//!
//! Both policies find markers with [`locate`], the same whole-line rule the
//! editor uses, so a section the editor cannot remove is never reported as
//! present.

use crate::section::markers::{locate, section_body};

/// Historical distance threshold, in bytes, between the two marker offsets.
pub const DEFAULT_BYTE_THRESHOLD: usize = 50;

/// Decides whether a named section is present (i.e. the feature is enabled).
pub trait PresencePolicy: Send + Sync {
    /// Returns `true` if section `name` counts as present in `text`.
    fn is_present(&self, text: &str, name: &str) -> bool;
}

/// Marker byte-distance heuristic.
///
/// Present iff the section is well formed and
/// `end_offset - begin_offset > threshold`, where the offsets are the byte
/// positions of the begin and end marker lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteDistancePolicy {
    pub threshold: usize,
}

impl Default for ByteDistancePolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_BYTE_THRESHOLD,
        }
    }
}

impl PresencePolicy for ByteDistancePolicy {
    fn is_present(&self, text: &str, name: &str) -> bool {
        let lines: Vec<&str> = text.split('\n').collect();
        match locate(&lines, name) {
            Ok(Some(span)) => {
                // Each line is followed by the '\n' it was split on.
                let distance: usize = lines[span.begin..span.end]
                    .iter()
                    .map(|l| l.len() + 1)
                    .sum();
                distance > self.threshold
            }
            Ok(None) => false,
            Err(e) => {
                tracing::debug!(section = name, error = %e, "malformed section treated as absent");
                false
            }
        }
    }
}

/// Structural policy: the section exists, is well formed, and holds at least
/// `min_lines` non-blank body lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCountPolicy {
    pub min_lines: usize,
}

impl Default for LineCountPolicy {
    fn default() -> Self {
        Self { min_lines: 1 }
    }
}

impl PresencePolicy for LineCountPolicy {
    fn is_present(&self, text: &str, name: &str) -> bool {
        match section_body(text, name) {
            Ok(Some(body)) => {
                body.iter().filter(|l| !l.trim().is_empty()).count() >= self.min_lines
            }
            Ok(None) => false,
            Err(e) => {
                tracing::debug!(section = name, error = %e, "malformed section treated as absent");
                false
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a section whose begin/end offsets are exactly `span` bytes apart.
    /// `# BEGIN T\n` is 10 bytes; the single body line fills the rest.
    fn section_with_span(span: usize) -> String {
        let filler = "x".repeat(span - 10 - 1);
        format!("# BEGIN T\n{filler}\n# END T\n")
    }

    #[test]
    fn test_byte_distance_exactly_at_threshold_is_absent() {
        let text = section_with_span(50);
        assert!(!ByteDistancePolicy::default().is_present(&text, "T"));
    }

    #[test]
    fn test_byte_distance_one_past_threshold_is_present() {
        let text = section_with_span(51);
        assert!(ByteDistancePolicy::default().is_present(&text, "T"));
    }

    #[test]
    fn test_byte_distance_missing_end_marker_is_absent() {
        let text = format!("# BEGIN T\n{}\n", "x".repeat(200));
        assert!(!ByteDistancePolicy::default().is_present(&text, "T"));
    }

    #[test]
    fn test_byte_distance_end_before_begin_is_absent() {
        let text = format!("# END T\n{}\n# BEGIN T\n", "x".repeat(200));
        assert!(!ByteDistancePolicy::default().is_present(&text, "T"));
    }

    #[test]
    fn test_byte_distance_custom_threshold() {
        let text = section_with_span(20);
        assert!(ByteDistancePolicy { threshold: 19 }.is_present(&text, "T"));
        assert!(!ByteDistancePolicy { threshold: 20 }.is_present(&text, "T"));
    }

    #[test]
    fn test_marker_with_trailing_space_is_absent_under_both_policies() {
        // The editor only matches whole marker lines, so neither policy may
        // report this block as present.
        let text = format!("# BEGIN T \n{}\n# END T\n", "x".repeat(200));
        assert!(!ByteDistancePolicy::default().is_present(&text, "T"));
        assert!(!LineCountPolicy::default().is_present(&text, "T"));
    }

    #[test]
    fn test_byte_distance_ignores_marker_text_inside_other_lines() {
        let text = format!("# see # BEGIN T\n{}\n# END T is here\n", "x".repeat(200));
        assert!(!ByteDistancePolicy::default().is_present(&text, "T"));
    }

    #[test]
    fn test_byte_distance_counts_crlf_marker_lines() {
        let text = format!("# BEGIN T\r\n{}\r\n# END T\r\n", "x".repeat(60));
        assert!(ByteDistancePolicy::default().is_present(&text, "T"));
    }

    #[test]
    fn test_line_count_short_block_is_present() {
        // A one-line block the byte heuristic would miss.
        let text = "# BEGIN T\nOn\n# END T\n";
        assert!(LineCountPolicy::default().is_present(text, "T"));
        assert!(!ByteDistancePolicy::default().is_present(text, "T"));
    }

    #[test]
    fn test_line_count_blank_body_is_absent() {
        let text = "# BEGIN T\n\n   \n# END T\n";
        assert!(!LineCountPolicy::default().is_present(text, "T"));
    }

    #[test]
    fn test_line_count_unterminated_section_is_absent() {
        let text = "# BEGIN T\nOn\n";
        assert!(!LineCountPolicy::default().is_present(text, "T"));
    }

    #[test]
    fn test_line_count_minimum_is_honoured() {
        let text = "# BEGIN T\na\nb\n# END T\n";
        assert!(LineCountPolicy { min_lines: 2 }.is_present(text, "T"));
        assert!(!LineCountPolicy { min_lines: 3 }.is_present(text, "T"));
    }
}
