//! Paging controller.
//!
//! One controller covers both modes. Offset paging knows the total and can
//! list pages; cursor paging only knows whether a next page exists and
//! threads the data source's tokens through.

mod cursor;
mod offset;

pub use cursor::{Cursor, CursorDirection, is_terminal};
pub use offset::{PageEntry, first_item, is_last_page, last_item, page_list, total_pages};

use serde::{Deserialize, Serialize};

use crate::config::PagingMode;

/// Requested page and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub page: u32,
    pub size: usize,
}

impl Paging {
    pub fn new(page: u32, size: usize) -> Self {
        Self {
            page: page.max(1),
            size,
        }
    }
}

/// What triggered a page change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageChangeKind {
    /// Next/previous/page picker.
    PageIndex,
    /// Page size picker; returns to page 1.
    PageSize,
    /// Programmatic jump; returns to page 1.
    UserEvent,
    /// Re-request of the current paging (e.g. after an empty page).
    Refresh,
}

/// A paging gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageChange {
    pub kind: PageChangeKind,
    pub page: Option<u32>,
    pub size: Option<usize>,
}

impl PageChange {
    pub fn page(page: u32) -> Self {
        Self {
            kind: PageChangeKind::PageIndex,
            page: Some(page),
            size: None,
        }
    }

    pub fn size(size: usize) -> Self {
        Self {
            kind: PageChangeKind::PageSize,
            page: None,
            size: Some(size),
        }
    }

    pub fn user(page: u32) -> Self {
        Self {
            kind: PageChangeKind::UserEvent,
            page: Some(page),
            size: None,
        }
    }

    pub fn refresh() -> Self {
        Self {
            kind: PageChangeKind::Refresh,
            page: None,
            size: None,
        }
    }
}

/// Result of applying a [`PageChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOutcome {
    pub previous: Paging,
    pub paging: Paging,
    /// Remembered scroll offsets no longer apply.
    pub clear_scroll: bool,
}

/// Display state of the paginator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u32,
    pub size: usize,
    pub is_first_page: bool,
    pub is_last_page: bool,
    /// Known only in offset mode.
    pub total_pages: Option<u32>,
    pub total_elements: usize,
    /// Displayed item range; offset mode only.
    pub range: Option<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Offset,
    Cursor { cursor: Cursor, is_last_page: bool },
}

/// Tracks the current page and translates gestures into page requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingController {
    paging: Paging,
    total_elements: usize,
    mode: Mode,
}

impl PagingController {
    pub fn new(mode: PagingMode, paging: Paging) -> Self {
        let mode = match mode {
            PagingMode::Offset => Mode::Offset,
            PagingMode::Cursor => Mode::Cursor {
                cursor: Cursor::default(),
                is_last_page: true,
            },
        };
        Self {
            paging,
            total_elements: 0,
            mode,
        }
    }

    /// Restores persisted cursor tokens. Ignored in offset mode.
    pub fn with_cursor(mut self, restored: Cursor) -> Self {
        if let Mode::Cursor {
            cursor,
            is_last_page,
        } = &mut self.mode
        {
            *is_last_page = restored.is_last_page();
            *cursor = restored;
        }
        self
    }

    pub fn paging(&self) -> Paging {
        self.paging
    }

    pub fn mode(&self) -> PagingMode {
        match self.mode {
            Mode::Offset => PagingMode::Offset,
            Mode::Cursor { .. } => PagingMode::Cursor,
        }
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        match &self.mode {
            Mode::Offset => None,
            Mode::Cursor { cursor, .. } => Some(cursor),
        }
    }

    /// The token payload handed to the data source, cursor mode only.
    pub fn current_cursor(&self) -> Option<&CursorDirection> {
        self.cursor().and_then(|c| c.current.as_ref())
    }

    pub fn total_elements(&self) -> usize {
        self.total_elements
    }

    /// Sets the item count: the full total in offset mode, the rows on
    /// the current page in cursor mode.
    pub fn set_total_elements(&mut self, total: usize) {
        self.total_elements = total;
    }

    /// Applies a paging gesture.
    ///
    /// Page-size changes and user jumps return to page 1 and invalidate
    /// remembered scroll offsets. In cursor mode the move direction is
    /// recorded and the last-page flag stays set until new tokens arrive.
    pub fn on_page_change(&mut self, change: PageChange) -> PageOutcome {
        let previous = self.paging;
        let clear_scroll = matches!(
            change.kind,
            PageChangeKind::PageSize | PageChangeKind::UserEvent
        );

        let mut page = change.page.unwrap_or(previous.page).max(1);
        let size = change.size.filter(|&s| s > 0).unwrap_or(previous.size);
        if clear_scroll {
            page = 1;
        }
        self.paging = Paging { page, size };

        if let Mode::Cursor {
            cursor,
            is_last_page,
        } = &mut self.mode
        {
            *is_last_page = true;
            cursor.advance(previous.page, page);
        }

        log::debug!(
            "Page change {:?}: {}/{} -> {}/{}",
            change.kind,
            previous.page,
            previous.size,
            page,
            size
        );

        PageOutcome {
            previous,
            paging: self.paging,
            clear_scroll,
        }
    }

    /// Accepts the data source's tokens for the current page.
    ///
    /// Returns whether this is the last page. No-op in offset mode.
    pub fn set_cursor(&mut self, before: Option<String>, after: Option<String>) -> bool {
        if let Mode::Cursor {
            cursor,
            is_last_page,
        } = &mut self.mode
        {
            cursor.update(before, after);
            *is_last_page = cursor.is_last_page();
            return *is_last_page;
        }
        self.info().is_last_page
    }

    /// Steps back one page after an empty page arrived.
    pub fn step_back(&mut self) -> Option<PageOutcome> {
        if self.paging.page <= 1 {
            return None;
        }
        Some(self.on_page_change(PageChange {
            kind: PageChangeKind::PageIndex,
            page: Some(self.paging.page - 1),
            size: None,
        }))
    }

    /// Returns to page 1 and forgets cursor tokens.
    pub fn reset(&mut self) {
        self.paging.page = 1;
        if let Mode::Cursor {
            cursor,
            is_last_page,
        } = &mut self.mode
        {
            *cursor = Cursor::default();
            *is_last_page = true;
        }
    }

    pub fn info(&self) -> PageInfo {
        let Paging { page, size } = self.paging;
        match &self.mode {
            Mode::Offset => {
                let last = is_last_page(page, self.total_elements, size);
                PageInfo {
                    page,
                    size,
                    is_first_page: page <= 1,
                    is_last_page: last,
                    total_pages: Some(total_pages(self.total_elements, size)),
                    total_elements: self.total_elements,
                    range: Some((
                        first_item(page, size, self.total_elements),
                        last_item(page, size, self.total_elements, last),
                    )),
                }
            }
            Mode::Cursor { is_last_page, .. } => PageInfo {
                page,
                size,
                is_first_page: page <= 1,
                is_last_page: *is_last_page,
                total_pages: None,
                total_elements: self.total_elements,
                range: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_change_resets_page() {
        let mut pager = PagingController::new(PagingMode::Offset, Paging::new(3, 25));
        let outcome = pager.on_page_change(PageChange::size(50));
        assert_eq!(outcome.paging, Paging { page: 1, size: 50 });
        assert!(outcome.clear_scroll);

        let outcome = pager.on_page_change(PageChange::page(2));
        assert_eq!(outcome.paging, Paging { page: 2, size: 50 });
        assert!(!outcome.clear_scroll);
    }

    #[test]
    fn test_offset_info() {
        let mut pager = PagingController::new(PagingMode::Offset, Paging::new(2, 25));
        pager.set_total_elements(60);
        let info = pager.info();
        assert_eq!(info.total_pages, Some(3));
        assert!(!info.is_first_page && !info.is_last_page);
        assert_eq!(info.range, Some((26, 50)));
    }

    #[test]
    fn test_cursor_after_minus_one_marks_last_page() {
        let mut pager = PagingController::new(PagingMode::Cursor, Paging::new(1, 25));
        assert!(!pager.set_cursor(None, Some("tok".into())));
        assert!(pager.set_cursor(Some("b".into()), Some("-1".into())));
        assert!(pager.info().is_last_page);
        assert_eq!(pager.info().total_pages, None);
    }

    #[test]
    fn test_cursor_page_change_threads_token() {
        let mut pager = PagingController::new(PagingMode::Cursor, Paging::new(1, 25));
        pager.set_cursor(None, Some("p2".into()));
        pager.on_page_change(PageChange::page(2));
        assert!(pager.info().is_last_page);
        assert_eq!(
            pager.current_cursor(),
            Some(&CursorDirection::After("p2".into()))
        );

        pager.set_cursor(Some("p1".into()), Some("p3".into()));
        pager.on_page_change(PageChange::page(1));
        assert_eq!(pager.current_cursor(), None);
    }

    #[test]
    fn test_step_back_and_reset() {
        let mut pager = PagingController::new(PagingMode::Cursor, Paging::new(1, 25));
        assert!(pager.step_back().is_none());
        pager.set_cursor(Some("a".into()), Some("b".into()));
        pager.on_page_change(PageChange::page(2));
        let outcome = pager.step_back().unwrap();
        assert_eq!(outcome.paging.page, 1);

        pager.reset();
        assert_eq!(pager.cursor(), Some(&Cursor::default()));
        assert_eq!(pager.paging().page, 1);
    }

    #[test]
    fn test_restored_cursor_sets_last_page_flag() {
        let restored = Cursor::new(None, Some("next".into()));
        let pager =
            PagingController::new(PagingMode::Cursor, Paging::new(1, 25)).with_cursor(restored);
        assert!(!pager.info().is_last_page);
    }
}
