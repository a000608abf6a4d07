//! Paginated, filterable projection of a [`Header`].

use crate::header::{Header, HEADER_SENTINEL};

pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Result of a substring search over a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    text: String,
    /// Sentinel followed by the matching names, in header order.
    entries: Vec<String>,
    /// `index_map[i]` is the header position of `entries[i + 1]`.
    index_map: Vec<usize>,
}

impl Filter {
    /// Case-sensitive substring match over record names. The sentinel never matches.
    pub fn apply(header: &Header, text: &str) -> Self {
        let mut entries = vec![HEADER_SENTINEL.to_string()];
        let mut index_map = Vec::new();
        for (i, name) in header.names().iter().enumerate() {
            if name.contains(text) {
                entries.push(name.clone());
                index_map.push(i + 1);
            }
        }
        Self {
            text: text.to_string(),
            entries,
            index_map,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn index_map(&self) -> &[usize] {
        &self.index_map
    }
}

/// Page and filter state of the account list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    page: usize,
    page_size: usize,
    filter: Option<Filter>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            filter: None,
        }
    }

    /// 1-based page number.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn page_left(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    /// Unbounded: paging past the end shows an empty list.
    pub fn page_right(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Filter by `text`; empty text clears the filter. Either way, back to page 1.
    pub fn search(&mut self, header: &Header, text: &str) {
        if text.is_empty() {
            self.clear_search();
            return;
        }
        self.filter = Some(Filter::apply(header, text));
        self.page = 1;
    }

    pub fn clear_search(&mut self) {
        self.filter = None;
        self.page = 1;
    }

    /// Recompute the active filter against a freshly loaded header.
    pub fn refilter(&mut self, header: &Header) {
        if let Some(filter) = self.filter.take() {
            self.filter = Some(Filter::apply(header, &filter.text));
        }
    }

    pub fn reset(&mut self) {
        self.page = 1;
        self.filter = None;
    }

    /// Index of the first entry of the current page; `None` on overflow.
    fn offset(&self) -> Option<usize> {
        (self.page - 1).checked_mul(self.page_size)
    }

    /// Header position of `display_row` on the current page, if that row is shown.
    pub fn resolve(&self, header: &Header, display_row: usize) -> Option<usize> {
        if display_row >= self.page_size {
            return None;
        }
        let absolute = self.offset()?.checked_add(display_row)?;
        match &self.filter {
            Some(filter) => filter.index_map.get(absolute).copied(),
            None => {
                let position = absolute.checked_add(1)?;
                (position <= header.len()).then_some(position)
            }
        }
    }
}

/// Names visible on the current page, after filtering.
pub fn project(header: &Header, view: &ViewState) -> Vec<String> {
    let entries = match view.filter() {
        Some(filter) => filter.entries(),
        None => header.entries(),
    };
    let Some(start) = view.offset().and_then(|o| o.checked_add(1)) else {
        return Vec::new();
    };
    if start >= entries.len() {
        return Vec::new();
    }
    let end = start.saturating_add(view.page_size()).min(entries.len());
    entries[start..end].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_of(names: &[&str]) -> Header {
        let mut entries = vec![HEADER_SENTINEL.to_string()];
        entries.extend(names.iter().map(|n| n.to_string()));
        Header::from_entries(entries).unwrap()
    }

    fn numbered(count: usize) -> Header {
        let names: Vec<String> = (1..=count).map(|i| format!("acct{:03}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        header_of(&refs)
    }

    #[test]
    fn test_page_sizes_and_reconstruction() {
        for size in [1usize, 3, 7, 25] {
            for count in [0usize, 1, 2, 6, 7, 24, 25, 26, 51] {
                let header = numbered(count);
                let mut view = ViewState::new(size);
                let mut seen = Vec::new();
                loop {
                    let page = project(&header, &view);
                    let p = view.page();
                    let expected = size.min(count.saturating_sub((p - 1) * size));
                    assert_eq!(page.len(), expected, "size {} count {} page {}", size, count, p);
                    if page.is_empty() {
                        break;
                    }
                    seen.extend(page);
                    view.page_right();
                }
                assert_eq!(seen, header.names(), "size {} count {}", size, count);
            }
        }
    }

    #[test]
    fn test_sentinel_never_shown() {
        let header = header_of(&["bank"]);
        assert_eq!(project(&header, &ViewState::new(25)), vec!["bank"]);
        assert!(project(&Header::empty(), &ViewState::new(25)).is_empty());
    }

    #[test]
    fn test_page_left_clamps_at_one() {
        let mut view = ViewState::new(5);
        view.page_left();
        assert_eq!(view.page(), 1);
        view.page_right();
        view.page_right();
        view.page_left();
        assert_eq!(view.page(), 2);
    }

    #[test]
    fn test_page_right_past_end_is_empty() {
        let header = numbered(3);
        let mut view = ViewState::new(25);
        view.page_right();
        assert_eq!(view.page(), 2);
        assert!(project(&header, &view).is_empty());
    }

    #[test]
    fn test_huge_page_is_empty_not_overflow() {
        let header = numbered(3);
        let mut view = ViewState::new(25);
        view.go_to_page(usize::MAX);
        assert!(project(&header, &view).is_empty());
        assert_eq!(view.resolve(&header, 0), None);
    }

    #[test]
    fn test_filter_keeps_order_and_maps_positions() {
        let header = header_of(&["bank", "mail", "banking", "shop", "mybank"]);
        let filter = Filter::apply(&header, "bank");
        assert_eq!(
            filter.entries(),
            [HEADER_SENTINEL, "bank", "banking", "mybank"]
        );
        assert_eq!(filter.index_map(), [1, 3, 5]);
        for (i, &position) in filter.index_map().iter().enumerate() {
            assert_eq!(header.entries()[position], filter.entries()[i + 1]);
        }
    }

    #[test]
    fn test_filter_is_case_sensitive_substring() {
        let header = header_of(&["Bank", "bank", "b-a-n-k"]);
        let filter = Filter::apply(&header, "bank");
        assert_eq!(filter.entries(), [HEADER_SENTINEL, "bank"]);
    }

    #[test]
    fn test_filter_ignores_sentinel() {
        let header = header_of(&["HK stuff", "other"]);
        let filter = Filter::apply(&header, "HK");
        assert_eq!(filter.entries(), [HEADER_SENTINEL, "HK stuff"]);
        assert_eq!(filter.index_map(), [1]);
    }

    #[test]
    fn test_search_projects_filtered_and_resets_page() {
        let header = header_of(&["bank", "mail", "mybank"]);
        let mut view = ViewState::new(25);
        view.page_right();
        view.search(&header, "bank");
        assert_eq!(view.page(), 1);
        assert_eq!(project(&header, &view), vec!["bank", "mybank"]);

        view.search(&header, "");
        assert!(view.filter().is_none());
        assert_eq!(project(&header, &view), vec!["bank", "mail", "mybank"]);
    }

    #[test]
    fn test_filtered_pages() {
        let header = numbered(30);
        let mut view = ViewState::new(4);
        view.search(&header, "acct01");
        // acct010..=acct019
        assert_eq!(project(&header, &view).len(), 4);
        view.go_to_page(3);
        assert_eq!(project(&header, &view), vec!["acct018", "acct019"]);
        assert_eq!(view.resolve(&header, 1), Some(19));
        assert_eq!(view.resolve(&header, 2), None);
    }

    #[test]
    fn test_resolve_unfiltered() {
        let header = numbered(30);
        let mut view = ViewState::new(25);
        assert_eq!(view.resolve(&header, 0), Some(1));
        assert_eq!(view.resolve(&header, 24), Some(25));
        assert_eq!(view.resolve(&header, 25), None);
        view.page_right();
        assert_eq!(view.resolve(&header, 0), Some(26));
        assert_eq!(view.resolve(&header, 4), Some(30));
        assert_eq!(view.resolve(&header, 5), None);
    }

    #[test]
    fn test_resolve_filtered() {
        let header = header_of(&["bank", "mail", "mybank"]);
        let mut view = ViewState::new(25);
        view.search(&header, "bank");
        assert_eq!(view.resolve(&header, 0), Some(1));
        assert_eq!(view.resolve(&header, 1), Some(3));
        assert_eq!(view.resolve(&header, 2), None);
    }

    #[test]
    fn test_refilter_tracks_new_header() {
        let mut view = ViewState::new(25);
        view.search(&header_of(&["bank", "mail"]), "bank");
        view.refilter(&header_of(&["mail", "bank", "newbank"]));
        let filter = view.filter().unwrap();
        assert_eq!(filter.text(), "bank");
        assert_eq!(filter.index_map(), [2, 3]);
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        assert_eq!(ViewState::new(0).page_size(), 1);
    }
}
