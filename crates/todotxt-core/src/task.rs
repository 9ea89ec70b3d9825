use serde::Serialize;

use crate::parser::{self, DONE_MARKER};
use crate::priority::Priority;

/// A `key:value` token found in task text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Tag {
    /// Text before the first colon.
    pub key: String,
    /// Text after the first colon.
    pub value: String,
}

impl Tag {
    /// Split a `key:value` token at its first colon.
    #[must_use]
    pub fn split(token: &str) -> Option<Self> {
        let (key, value) = token.split_once(':')?;
        if key.is_empty() || value.is_empty() {
            return None;
        }
        Some(Self {
            key: key.to_owned(),
            value: value.to_owned(),
        })
    }
}

/// One line of a todo list together with the fields derived from it.
///
/// Derived fields are never set independently of `text`: the mutators below
/// rewrite the text and the affected fields together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub(crate) line_number: usize,
    pub(crate) text: String,
    pub(crate) done: bool,
    pub(crate) priority: Option<Priority>,
    pub(crate) projects: Vec<String>,
    pub(crate) contexts: Vec<String>,
    pub(crate) tags: Vec<Tag>,
}

impl Task {
    /// Parse a single line. Equivalent to [`parser::parse`].
    #[must_use]
    pub fn parse(text: &str) -> Self {
        parser::parse(text)
    }

    /// Raw line contents.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the line starts with the `x ` marker.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Priority letter, if any.
    #[must_use]
    pub const fn priority(&self) -> Option<Priority> {
        self.priority
    }

    /// `+project` tokens in textual order.
    #[must_use]
    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    /// `@context` tokens in textual order.
    #[must_use]
    pub fn contexts(&self) -> &[String] {
        &self.contexts
    }

    /// `key:value` tags in textual order.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// 1-based position in the list view; `0` means unassigned.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        self.line_number
    }

    /// Assign the list position. Only the owning list should call this.
    pub const fn set_line_number(&mut self, line_number: usize) {
        self.line_number = line_number;
    }

    /// Flip the done marker. Priority and tokens are kept as they are, so
    /// toggling twice restores the original text byte for byte.
    pub fn toggle_done(&mut self) {
        if self.done {
            if let Some(body) = self.text.strip_prefix(DONE_MARKER) {
                self.text = body.to_owned();
            }
            self.done = false;
        } else {
            self.text.insert_str(0, DONE_MARKER);
            self.done = true;
        }
    }

    /// Replace or clear the `(P) ` prefix. On a done task the prefix sits
    /// right after the done marker. Stacked prefixes such as `(A) (B) ` are
    /// all removed so the text never implies a different priority.
    pub fn set_priority(&mut self, priority: Option<Priority>) {
        let (done, body) = parser::split_done(&self.text);
        let mut rest = body;
        while let (Some(_), remainder) = Priority::split_prefix(rest) {
            rest = remainder;
        }

        let mut text = String::with_capacity(self.text.len() + 4);
        if done {
            text.push_str(DONE_MARKER);
        }
        if let Some(priority) = priority {
            text.push_str(&priority.prefix());
        }
        text.push_str(rest);

        self.text = text;
        self.priority = priority;
    }

    /// Replace the whole text, flattening line breaks, and re-derive every field.
    /// The line number is kept.
    pub fn set_text(&mut self, text: &str) {
        let line_number = self.line_number;
        *self = parser::parse(&parser::flatten_newlines(text));
        self.line_number = line_number;
    }
}
