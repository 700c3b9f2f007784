use serde::{Deserialize, Serialize};

/// Separator used when several source cells fold into one column
pub const CELL_SEPARATOR: &str = ", ";

/// A table cell value
///
/// Serialized untagged: plain text becomes a JSON string, a link becomes
/// `{"text": ..., "href": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// A cell holding a hyperlink
    Link { text: String, href: String },

    /// A cell holding only text
    Text(String),
}

impl Cell {
    /// Creates a text cell
    pub fn text_cell(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Creates a link cell
    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self::Link {
            text: text.into(),
            href: href.into(),
        }
    }

    /// Returns the visible text of the cell
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) | Self::Link { text, .. } => text,
        }
    }

    /// Returns the link target, if the cell holds a link
    pub fn href(&self) -> Option<&str> {
        match self {
            Self::Link { href, .. } => Some(href),
            Self::Text(_) => None,
        }
    }

    /// Returns true if the cell has neither text nor a link
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Link { text, href } => text.is_empty() && href.is_empty(),
        }
    }

    /// Appends text to the cell, keeping a link if there is one
    ///
    /// Empty text leaves the cell unchanged.
    pub fn merge_text(&mut self, addition: &str) {
        match self {
            Self::Text(text) | Self::Link { text, .. } => append_text(text, addition),
        }
    }

    /// Appends text and upgrades the cell to a link pointing at `href`
    ///
    /// Accumulated text is kept; the new target replaces any earlier one.
    pub fn merge_link(&mut self, addition: &str, href: String) {
        let mut text = self.text().to_string();
        append_text(&mut text, addition);
        *self = Self::Link { text, href };
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

fn append_text(text: &mut String, addition: &str) {
    if addition.is_empty() {
        return;
    }
    if !text.is_empty() {
        text.push_str(CELL_SEPARATOR);
    }
    text.push_str(addition);
}
