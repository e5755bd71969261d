//! Page arithmetic for list views

use serde::Serialize;

/// Token that selects the last page
pub const LAST_PAGE_TOKEN: &str = "last";

/// One page of a list
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number
    pub number: u64,
    pub num_pages: u64,
    /// Total number of records across all pages
    pub total: u64,
    pub page_size: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, total: u64, page_size: u64) -> Self {
        let num_pages = num_pages(total, page_size);
        Self {
            items,
            number,
            num_pages,
            total,
            page_size,
            has_previous: number > 1,
            has_next: number < num_pages,
        }
    }

    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        let items = self.items.into_iter().map(f).collect::<Result<Vec<U>, E>>()?;
        Ok(Page {
            items,
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            page_size: self.page_size,
            has_previous: self.has_previous,
            has_next: self.has_next,
        })
    }
}

/// Number of pages for `total` records. An empty list still has one page.
pub fn num_pages(total: u64, page_size: u64) -> u64 {
    if total == 0 || page_size == 0 {
        return 1;
    }
    (total + page_size - 1) / page_size
}

/// Resolve a client supplied page token to a valid page number.
///
/// Missing, blank or non-numeric tokens select the first page, numbers below
/// one clamp to the first page and numbers past the end clamp to the last.
/// The literal `last` selects the last page.
pub fn resolve_page_number(token: Option<&str>, num_pages: u64) -> u64 {
    let num_pages = num_pages.max(1);
    let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
        return 1;
    };
    if token.eq_ignore_ascii_case(LAST_PAGE_TOKEN) {
        return num_pages;
    }
    match token.parse::<i64>() {
        Ok(n) if n < 1 => 1,
        Ok(n) if n as u64 > num_pages => num_pages,
        Ok(n) => n as u64,
        // Digits that overflow i64 are still "beyond the last page"
        Err(_) if token.chars().all(|c| c.is_ascii_digit()) => num_pages,
        Err(_) => 1,
    }
}

/// Row offset of a 1-based page
pub fn page_offset(number: u64, page_size: u64) -> u64 {
    number.saturating_sub(1) * page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_pages() {
        assert_eq!(num_pages(0, 12), 1);
        assert_eq!(num_pages(12, 12), 1);
        assert_eq!(num_pages(13, 12), 2);
        assert_eq!(num_pages(25, 8), 4);
    }

    #[test]
    fn test_resolve_page_number_clamps() {
        assert_eq!(resolve_page_number(None, 3), 1);
        assert_eq!(resolve_page_number(Some(""), 3), 1);
        assert_eq!(resolve_page_number(Some("abc"), 3), 1);
        assert_eq!(resolve_page_number(Some("0"), 3), 1);
        assert_eq!(resolve_page_number(Some("-4"), 3), 1);
        assert_eq!(resolve_page_number(Some("2"), 3), 2);
        assert_eq!(resolve_page_number(Some(" 3 "), 3), 3);
        assert_eq!(resolve_page_number(Some("999"), 3), 3);
        assert_eq!(resolve_page_number(Some("99999999999999999999999"), 3), 3);
        assert_eq!(resolve_page_number(Some("last"), 3), 3);
        assert_eq!(resolve_page_number(Some("2.5"), 3), 1);
    }

    #[test]
    fn test_resolve_on_empty_list() {
        assert_eq!(resolve_page_number(Some("5"), 0), 1);
        assert_eq!(resolve_page_number(Some("last"), 1), 1);
    }

    #[test]
    fn test_page_flags() {
        let page = Page::new(vec![1, 2], 2, 26, 12);
        assert_eq!(page.num_pages, 3);
        assert!(page.has_previous);
        assert!(page.has_next);

        let last = Page::new(vec![25, 26], 3, 26, 12)
            .try_map(|n| if n > 0 { Ok(n * 10) } else { Err(n) })
            .unwrap();
        assert_eq!(last.items, vec![250, 260]);
        assert!(!last.has_next);
        assert_eq!(Page::new(vec![1, -1], 1, 2, 12).try_map(|n| if n > 0 { Ok(n) } else { Err(n) }).unwrap_err(), -1);
        assert_eq!(page_offset(3, 12), 24);
        assert_eq!(page_offset(1, 8), 0);
    }
}
