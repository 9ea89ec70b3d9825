//! Line parser deriving structured fields from a single todo.txt line.
//!
//! Parsing is total: any string produces a [`Task`], malformed content simply
//! yields empty derived fields.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::priority::Priority;
use crate::task::{Tag, Task};

/// Marker prefix of a completed task.
pub const DONE_MARKER: &str = "x ";

#[allow(clippy::expect_used)]
static PROJECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+[A-Za-z0-9_]+").expect("valid project regex"));
#[allow(clippy::expect_used)]
static CONTEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@[A-Za-z0-9_]+").expect("valid context regex"));
#[allow(clippy::expect_used)]
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9_]+:\S+").expect("valid tag regex"));

/// Parse one line (without its trailing newline) into a [`Task`].
///
/// The returned task has line number `0`; the repository assigns positions.
#[must_use]
pub fn parse(text: &str) -> Task {
    let (done, body) = split_done(text);
    let (priority, _) = Priority::split_prefix(body);

    Task {
        line_number: 0,
        text: text.to_owned(),
        done,
        priority,
        projects: collect_tokens(&PROJECT_RE, text),
        contexts: collect_tokens(&CONTEXT_RE, text),
        tags: TAG_RE
            .find_iter(text)
            .filter_map(|m| Tag::split(m.as_str()))
            .collect(),
    }
}

/// Split a line into its done flag and the body following the `x ` marker.
#[must_use]
pub fn split_done(text: &str) -> (bool, &str) {
    text.strip_prefix(DONE_MARKER)
        .map_or((false, text), |body| (true, body))
}

/// Replace embedded line breaks with single spaces so the text fits on one line.
#[must_use]
pub fn flatten_newlines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

fn collect_tokens(re: &Regex, text: &str) -> Vec<String> {
    re.find_iter(text).map(|m| m.as_str().to_owned()).collect()
}
