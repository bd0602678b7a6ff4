//! This module defines the common functionality for paging through expenses.

use serde::Serialize;

/// The config for pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationConfig {
    /// The maximum number of expenses on one page.
    pub page_size: u64,
    /// The maximum number of page numbers to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_pages: 5,
        }
    }
}

/// One element of a pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaginationIndicator {
    /// A link to another page.
    Page(u64),
    /// The page being viewed.
    CurrPage(u64),
    /// A gap in the page numbers.
    Ellipsis,
    /// A link to the next page.
    NextButton(u64),
    /// A link to the previous page.
    BackButton(u64),
}

/// The number of pages needed to show `item_count` items, at least one.
pub fn page_count(item_count: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 1;
    }

    item_count.div_ceil(page_size).max(1)
}

/// Build the controls for moving between `page_count` pages while on `curr_page`.
///
/// At most `max_pages` consecutive page numbers are shown, centred on the
/// current page where possible. The first and last pages are always reachable.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let max_pages = max_pages.max(1);
    let (start, end) = if page_count <= max_pages {
        (1, page_count)
    } else {
        let start = curr_page
            .saturating_sub(max_pages / 2)
            .clamp(1, page_count - max_pages + 1);
        (start, start + max_pages - 1)
    };

    let mut indicators = Vec::new();

    if curr_page > 1 {
        indicators.push(PaginationIndicator::BackButton(curr_page - 1));
    }

    if start > 1 {
        indicators.push(PaginationIndicator::Page(1));
        indicators.push(PaginationIndicator::Ellipsis);
    }

    indicators.extend((start..=end).map(|page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    }));

    if end < page_count {
        indicators.push(PaginationIndicator::Ellipsis);
        indicators.push(PaginationIndicator::Page(page_count));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}
