//! Paging for the transactions table.

/// The config for pagination.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of transactions to display per page.
    pub default_page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_pages: 5,
        }
    }
}

/// How many pages a row set spans.
///
/// Always at least one, so an empty result still renders a single page.
/// `page_size` must be non-zero.
pub fn page_count(row_count: usize, page_size: u64) -> u64 {
    (row_count as u64).div_ceil(page_size).max(1)
}

/// The rows belonging to a 1-based page.
///
/// Pages past the end of `items` are empty rather than an error.
pub fn page_slice<T>(items: &[T], page: u64, page_size: u64) -> &[T] {
    let start = (page.saturating_sub(1)).saturating_mul(page_size) as usize;
    if start >= items.len() {
        return &[];
    }

    let end = (start + page_size as usize).min(items.len());
    &items[start..end]
}

/// One element of the pagination control row.
#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    /// A link to another page.
    Page(u64),
    /// The page currently being displayed.
    CurrPage(u64),
    /// A gap between page links.
    Ellipsis,
    /// A link to the next page.
    NextButton(u64),
    /// A link to the previous page.
    BackButton(u64),
}

/// The window of page numbers shown around the current page.
fn visible_page_range(curr_page: u64, page_count: u64, max_pages: u64) -> (u64, u64) {
    if page_count <= max_pages {
        (1, page_count)
    } else if curr_page <= max_pages / 2 {
        (1, max_pages)
    } else if curr_page > page_count - max_pages / 2 {
        (page_count - max_pages + 1, page_count)
    } else {
        (curr_page - max_pages / 2, curr_page + max_pages / 2)
    }
}

/// Build the pagination control row for the current page.
///
/// At most `max_pages` numbered links are shown, centered on the current page
/// where possible, with the first and last page reachable through ellipsis
/// links and back/next buttons at the edges.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let (first, last) = visible_page_range(curr_page, page_count, max_pages);

    let mut indicators = Vec::new();

    if curr_page > 1 {
        indicators.push(PaginationIndicator::BackButton(curr_page - 1));
    }

    if first > 1 {
        indicators.push(PaginationIndicator::Page(1));
        indicators.push(PaginationIndicator::Ellipsis);
    }

    for page in first..=last {
        if page == curr_page {
            indicators.push(PaginationIndicator::CurrPage(page));
        } else {
            indicators.push(PaginationIndicator::Page(page));
        }
    }

    if last < page_count {
        indicators.push(PaginationIndicator::Ellipsis);
        indicators.push(PaginationIndicator::Page(page_count));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

#[cfg(test)]
mod tests {
    use super::{
        PaginationIndicator, create_pagination_indicators, page_count, page_slice,
    };

    #[test]
    fn twenty_three_rows_make_three_pages_of_ten() {
        let rows: Vec<u64> = (0..23).collect();
        let page_size = 10;

        assert_eq!(page_count(rows.len(), page_size), 3);
        assert_eq!(page_slice(&rows, 1, page_size).len(), 10);
        assert_eq!(page_slice(&rows, 2, page_size).len(), 10);
        assert_eq!(page_slice(&rows, 3, page_size).len(), 3);
    }

    #[test]
    fn empty_rows_still_have_one_page() {
        let rows: Vec<u64> = Vec::new();

        assert_eq!(page_count(rows.len(), 10), 1);
        assert!(page_slice(&rows, 1, 10).is_empty());
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let rows: Vec<u64> = (0..5).collect();

        assert!(page_slice(&rows, 7, 10).is_empty());
    }

    #[test]
    fn exact_multiple_has_no_partial_page() {
        assert_eq!(page_count(20, 10), 2);

        let rows: Vec<u64> = (0..20).collect();
        assert_eq!(page_slice(&rows, 2, 10).len(), 10);
    }

    #[test]
    fn shows_all_pages_when_they_fit() {
        let got = create_pagination_indicators(1, 5, 5);

        let want = [
            PaginationIndicator::CurrPage(1),
            PaginationIndicator::Page(2),
            PaginationIndicator::Page(3),
            PaginationIndicator::Page(4),
            PaginationIndicator::Page(5),
            PaginationIndicator::NextButton(2),
        ];
        assert_eq!(want, got.as_slice());
    }

    #[test]
    fn clips_to_the_left_near_the_start() {
        let got = create_pagination_indicators(1, 10, 5);

        let want = [
            PaginationIndicator::CurrPage(1),
            PaginationIndicator::Page(2),
            PaginationIndicator::Page(3),
            PaginationIndicator::Page(4),
            PaginationIndicator::Page(5),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(10),
            PaginationIndicator::NextButton(2),
        ];
        assert_eq!(want, got.as_slice());
    }

    #[test]
    fn centers_on_the_current_page_in_the_middle() {
        let got = create_pagination_indicators(5, 10, 5);

        let want = [
            PaginationIndicator::BackButton(4),
            PaginationIndicator::Page(1),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(3),
            PaginationIndicator::Page(4),
            PaginationIndicator::CurrPage(5),
            PaginationIndicator::Page(6),
            PaginationIndicator::Page(7),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(10),
            PaginationIndicator::NextButton(6),
        ];
        assert_eq!(want, got.as_slice());
    }

    #[test]
    fn clips_to_the_right_near_the_end() {
        let got = create_pagination_indicators(10, 10, 5);

        let want = [
            PaginationIndicator::BackButton(9),
            PaginationIndicator::Page(1),
            PaginationIndicator::Ellipsis,
            PaginationIndicator::Page(6),
            PaginationIndicator::Page(7),
            PaginationIndicator::Page(8),
            PaginationIndicator::Page(9),
            PaginationIndicator::CurrPage(10),
        ];
        assert_eq!(want, got.as_slice());
    }
}
