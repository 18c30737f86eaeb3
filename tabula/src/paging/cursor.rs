//! Cursor paging: opaque before/after tokens.

use serde::{Deserialize, Serialize};

/// Which token produced the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorDirection {
    Before(String),
    After(String),
}

/// Tokens declared by the data source for the current page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub before: Option<String>,
    pub after: Option<String>,
    /// Token that fetched the present page; `None` on page 1.
    pub current: Option<CursorDirection>,
}

impl Cursor {
    pub fn new(before: Option<String>, after: Option<String>) -> Self {
        Self {
            before,
            after,
            current: None,
        }
    }

    /// True when the `after` token marks the end of the data.
    pub fn is_last_page(&self) -> bool {
        is_terminal(self.after.as_deref())
    }

    /// Replaces the tokens, keeping `current`.
    pub fn update(&mut self, before: Option<String>, after: Option<String>) {
        self.before = before;
        self.after = after;
    }

    /// Records the direction of a move from `previous` to `page`.
    ///
    /// Moving forward uses the `after` token, anything else `before`.
    /// Returning to page 1 clears the current token.
    pub fn advance(&mut self, previous: u32, page: u32) {
        self.current = if page > 1 {
            let direction = if page > previous {
                self.after.clone().map(CursorDirection::After)
            } else {
                self.before.clone().map(CursorDirection::Before)
            };
            if direction.is_none() {
                log::warn!("No cursor token to move from page {} to {}", previous, page);
            }
            direction
        } else {
            None
        };
    }
}

/// An absent, empty or `-1` token means there is no further page.
pub fn is_terminal(token: Option<&str>) -> bool {
    match token {
        None => true,
        Some(token) => {
            let token = token.trim();
            token.is_empty() || token == "-1"
        }
    }
}
