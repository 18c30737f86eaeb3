//! Page arithmetic for offset paging.

/// Number of pages for `total` items, never less than one.
pub fn total_pages(total: usize, size: usize) -> u32 {
    if size == 0 {
        return 1;
    }
    u32::try_from(total.div_ceil(size)).unwrap_or(u32::MAX).max(1)
}

/// Whether `page` is the last page.
pub fn is_last_page(page: u32, total: usize, size: usize) -> bool {
    page >= total_pages(total, size)
}

/// 1-based index of the first item shown on `page`, or 0 when empty.
pub fn first_item(page: u32, size: usize, total: usize) -> usize {
    if total < 1 {
        return 0;
    }
    size * (page.max(1) as usize - 1) + 1
}

/// 1-based index of the last item shown on `page`.
pub fn last_item(page: u32, size: usize, total: usize, is_last: bool) -> usize {
    if size > total || is_last {
        return total;
    }
    size * page as usize
}

/// A selectable page with its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub value: u32,
    pub label: String,
}

/// Lists every page; `labels[i]` overrides the label of page `i + 1`.
pub fn page_list(total: usize, size: usize, labels: &[String]) -> Vec<PageEntry> {
    (1..=total_pages(total, size))
        .map(|value| PageEntry {
            value,
            label: labels
                .get(value as usize - 1)
                .cloned()
                .unwrap_or_else(|| value.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_has_minimum_of_one() {
        assert_eq!(total_pages(0, 25), 1);
        assert_eq!(total_pages(25, 25), 1);
        assert_eq!(total_pages(26, 25), 2);
        assert_eq!(total_pages(10, 0), 1);
    }

    #[test]
    fn test_item_range() {
        assert_eq!(first_item(2, 25, 60), 26);
        assert_eq!(last_item(2, 25, 60, false), 50);
        assert_eq!(last_item(3, 25, 60, true), 60);
        assert_eq!(first_item(1, 25, 0), 0);
        assert_eq!(last_item(1, 25, 10, false), 10);
    }

    #[test]
    fn test_page_list_labels() {
        let pages = page_list(60, 25, &["first".to_string()]);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].label, "first");
        assert_eq!(pages[2].label, "3");
    }
}
