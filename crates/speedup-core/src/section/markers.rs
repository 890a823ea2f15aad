//! Pure text editing of marker-delimited sections.
//!
//! The file is treated as a sequence of lines separated by `\n`.  Edits only
//! ever touch the lines between (and including) the two markers of the target
//! section; every other byte of the input is carried over verbatim, including
//! a missing or present trailing newline and any `\r` line endings.
//!
//! Markers are matched as whole lines (a trailing `\r` is tolerated), and only
//! the first occurrence of a section is considered.

use thiserror::Error;

const BEGIN_PREFIX: &str = "# BEGIN ";
const END_PREFIX: &str = "# END ";

/// Returns the exact begin marker line for `name`.
pub fn begin_marker(name: &str) -> String {
    format!("{BEGIN_PREFIX}{name}")
}

/// Returns the exact end marker line for `name`.
pub fn end_marker(name: &str) -> String {
    format!("{END_PREFIX}{name}")
}

/// Errors raised when the file's markers are inconsistent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MarkerError {
    /// A begin marker exists with no end marker after it.  Editing would
    /// either duplicate the section or swallow everything after the marker,
    /// so the file is left alone.
    #[error("section '{0}' has a begin marker without a matching end marker")]
    Unterminated(String),
}

/// Result of applying an edit to the file text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionEdit {
    /// The text changed; the new content is carried inline.
    Rewritten(String),
    /// The section was already in the requested state; nothing to write.
    Unchanged,
}

/// Line indices of a located section: `begin` holds the begin marker and
/// `end` the end marker, `begin < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpan {
    pub begin: usize,
    pub end: usize,
}

impl SectionSpan {
    /// Number of body lines between the markers.
    pub fn body_len(&self) -> usize {
        self.end - self.begin - 1
    }
}

fn is_marker_line(line: &str, marker: &str) -> bool {
    line.strip_suffix('\r').unwrap_or(line) == marker
}

/// Finds the first section called `name` in `lines`.
///
/// An end marker that appears before any begin marker is ignored.
///
/// # Errors
///
/// Returns [`MarkerError::Unterminated`] when the begin marker has no end
/// marker after it.
pub fn locate(lines: &[&str], name: &str) -> Result<Option<SectionSpan>, MarkerError> {
    let begin = begin_marker(name);
    let end = end_marker(name);

    let Some(begin_idx) = lines.iter().position(|l| is_marker_line(l, &begin)) else {
        return Ok(None);
    };

    lines[begin_idx + 1..]
        .iter()
        .position(|l| is_marker_line(l, &end))
        .map(|offset| {
            Some(SectionSpan {
                begin: begin_idx,
                end: begin_idx + 1 + offset,
            })
        })
        .ok_or_else(|| MarkerError::Unterminated(name.to_string()))
}

/// Returns the body lines of section `name`, or `None` if it does not exist.
///
/// # Errors
///
/// See [`locate`].
pub fn section_body<'a>(text: &'a str, name: &str) -> Result<Option<Vec<&'a str>>, MarkerError> {
    let lines: Vec<&str> = text.split('\n').collect();
    Ok(locate(&lines, name)?.map(|span| lines[span.begin + 1..span.end].to_vec()))
}

/// Applies "make section `name` contain exactly `body`" to `text`.
///
/// - `body` empty: remove the section with both markers; absent section is
///   [`SectionEdit::Unchanged`].
/// - `body` non-empty, section present: replace the body in place, or
///   [`SectionEdit::Unchanged`] when it is already identical.
/// - `body` non-empty, section absent: append begin marker, body and end
///   marker at the end of the text, each terminated by `\n`.
///
/// # Errors
///
/// Returns [`MarkerError::Unterminated`] if the section's begin marker has no
/// end marker after it.
pub fn upsert_text(text: &str, name: &str, body: &[String]) -> Result<SectionEdit, MarkerError> {
    let lines: Vec<&str> = text.split('\n').collect();

    match locate(&lines, name)? {
        Some(span) if body.is_empty() => {
            let mut kept: Vec<&str> = Vec::with_capacity(lines.len() - span.body_len() - 2);
            kept.extend_from_slice(&lines[..span.begin]);
            kept.extend_from_slice(&lines[span.end + 1..]);
            Ok(SectionEdit::Rewritten(kept.join("\n")))
        }
        Some(span) => {
            let existing = &lines[span.begin + 1..span.end];
            let identical = existing.len() == body.len()
                && existing
                    .iter()
                    .zip(body)
                    .all(|(old, new)| old.strip_suffix('\r').unwrap_or(*old) == new.as_str());
            if identical {
                return Ok(SectionEdit::Unchanged);
            }

            let mut out: Vec<&str> = Vec::with_capacity(lines.len() - span.body_len() + body.len());
            out.extend_from_slice(&lines[..=span.begin]);
            out.extend(body.iter().map(String::as_str));
            out.extend_from_slice(&lines[span.end..]);
            Ok(SectionEdit::Rewritten(out.join("\n")))
        }
        None if body.is_empty() => Ok(SectionEdit::Unchanged),
        None => Ok(SectionEdit::Rewritten(append_section(text, name, body))),
    }
}

fn append_section(text: &str, name: &str, body: &[String]) -> String {
    let body_bytes: usize = body.iter().map(|l| l.len() + 1).sum();
    let mut out = String::with_capacity(text.len() + body_bytes + 2 * (name.len() + 16));
    out.push_str(text);
    if !text.is_empty() && !text.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&begin_marker(name));
    out.push('\n');
    for line in body {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&end_marker(name));
    out.push('\n');
    out
}

/// Byte distance between the start of the begin marker and the start of the
/// end marker when `body` is written as a section called `name`.
pub fn serialized_span(name: &str, body: &[String]) -> usize {
    begin_marker(name).len() + 1 + body.iter().map(|l| l.len() + 1).sum::<usize>()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
