use crate::TokenRecord;

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Visible prefix of a clean token list, grown one page at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenWindow {
    page_size: usize,
    visible: usize,
}

impl Default for TokenWindow {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl TokenWindow {
    /// A window showing the first page. A zero page size is treated as one.
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page_size,
            visible: page_size,
        }
    }

    /// A window already extended to `pages` pages.
    pub fn with_pages(page_size: usize, pages: usize) -> Self {
        let mut window = Self::new(page_size);
        window.visible = window.page_size.saturating_mul(pages.max(1));
        window
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Grow by one page, never past `total`.
    pub fn extend(&mut self, total: usize) {
        if self.visible < total {
            self.visible = (self.visible + self.page_size).min(total);
        }
    }

    pub fn visible<'a>(&self, tokens: &'a [TokenRecord]) -> &'a [TokenRecord] {
        &tokens[..self.visible.min(tokens.len())]
    }

    pub fn visible_count(&self, total: usize) -> usize {
        self.visible.min(total)
    }

    pub fn has_more(&self, total: usize) -> bool {
        self.visible < total
    }

    /// True once a list longer than one page is fully shown.
    pub fn all_loaded(&self, total: usize) -> bool {
        total > self.page_size && !self.has_more(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(n: usize) -> Vec<TokenRecord> {
        (0..n)
            .map(|i| TokenRecord {
                token_ticker: Some(format!("T{}", i)),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_grows_one_page_at_a_time() {
        let list = tokens(45);
        let mut window = TokenWindow::default();
        assert_eq!(window.visible(&list).len(), 20);
        assert!(window.has_more(list.len()));
        assert!(!window.all_loaded(list.len()));

        window.extend(list.len());
        assert_eq!(window.visible(&list).len(), 40);

        window.extend(list.len());
        assert_eq!(window.visible(&list).len(), 45);
        assert!(!window.has_more(list.len()));
        assert!(window.all_loaded(list.len()));

        // capped
        window.extend(list.len());
        assert_eq!(window.visible_count(list.len()), 45);
    }

    #[test]
    fn test_short_list_is_never_all_loaded() {
        let list = tokens(7);
        let window = TokenWindow::new(20);
        assert_eq!(window.visible(&list).len(), 7);
        assert!(!window.has_more(list.len()));
        assert!(!window.all_loaded(list.len()));
    }

    #[test]
    fn test_with_pages() {
        let list = tokens(100);
        assert_eq!(TokenWindow::with_pages(20, 3).visible(&list).len(), 60);
        assert_eq!(TokenWindow::with_pages(20, 0).visible(&list).len(), 20);
        assert_eq!(TokenWindow::with_pages(0, 2).page_size(), 1);
    }
}
