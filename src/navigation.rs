//! Navigable page state
//!
//! The current page lives in navigable state (a `page` query parameter) so a
//! page position is shareable and survives navigation. Views read the page
//! through [`PageQuery`] and hand it, together with a [`Navigator`], to a
//! [`Paginator`] they own. Nothing here is process-wide.

use tracing::debug;
use url::form_urlencoded;

use crate::config::PaginationConfig;
use crate::pagination::PageWindow;

/// Query parameter carrying the current page by default
pub const DEFAULT_PAGE_PARAM: &str = "page";

/// Reads and writes the page indicator in a URL query string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    param: String,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_PARAM)
    }
}

impl PageQuery {
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &PaginationConfig) -> Self {
        Self::new(config.page_param.clone())
    }

    #[must_use]
    pub fn param(&self) -> &str {
        &self.param
    }

    /// Current page encoded in `query` (with or without the leading `?`).
    ///
    /// Missing, malformed, zero or negative values all read as page 1.
    #[must_use]
    pub fn current_page(&self, query: &str) -> usize {
        parse(query)
            .find(|(key, _)| *key == self.param)
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .filter(|page| *page > 0)
            .unwrap_or(1)
    }

    /// `query` with the page parameter set to `page`.
    ///
    /// The first occurrence is replaced in place and duplicates are dropped;
    /// if absent it is appended. Other parameters keep their order.
    #[must_use]
    pub fn with_page(&self, query: &str, page: usize) -> String {
        let page = page.to_string();
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        let mut replaced = false;
        for (key, value) in parse(query) {
            if key != self.param {
                serializer.append_pair(&key, &value);
            } else if !replaced {
                serializer.append_pair(&self.param, &page);
                replaced = true;
            }
        }
        if !replaced {
            serializer.append_pair(&self.param, &page);
        }
        serializer.finish()
    }

    /// Full link to `page` for a view mounted at `path`
    #[must_use]
    pub fn href(&self, path: &str, query: &str, page: usize) -> String {
        format!("{path}?{}", self.with_page(query, page))
    }
}

fn parse(query: &str) -> form_urlencoded::Parse<'_> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
}

/// Side of the page-change request owned by the hosting view
pub trait Navigator {
    /// Request navigation to `page`; the next render re-derives the window
    fn go_to_page(&mut self, page: usize);

    /// Bring the top of the list back into view
    fn scroll_to_top(&mut self) {}
}

/// Navigator that writes page changes into a URL and records the pushes
#[derive(Debug, Clone)]
pub struct QueryNavigator {
    path: String,
    query: String,
    page_query: PageQuery,
    history: Vec<String>,
    scroll_requests: usize,
}

impl QueryNavigator {
    pub fn new(path: impl Into<String>, query: impl Into<String>, page_query: PageQuery) -> Self {
        Self {
            path: path.into(),
            query: query.into(),
            page_query,
            history: Vec::new(),
            scroll_requests: 0,
        }
    }

    /// Page currently encoded in the navigator's URL
    #[must_use]
    pub fn current_page(&self) -> usize {
        self.page_query.current_page(&self.query)
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Every URL pushed so far, oldest first
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    #[must_use]
    pub fn scroll_requests(&self) -> usize {
        self.scroll_requests
    }
}

impl Navigator for QueryNavigator {
    fn go_to_page(&mut self, page: usize) {
        self.query = self.page_query.with_page(&self.query, page);
        let href = format!("{}?{}", self.path, self.query);
        debug!("Navigating to {}", href);
        self.history.push(href);
    }

    fn scroll_to_top(&mut self) {
        self.scroll_requests += 1;
    }
}

/// Pagination state owned by a single list view
#[derive(Debug)]
pub struct Paginator<N: Navigator> {
    current_page: usize,
    items_per_page: usize,
    navigator: N,
}

impl<N: Navigator> Paginator<N> {
    pub fn new(current_page: usize, items_per_page: usize, navigator: N) -> Self {
        Self {
            current_page: current_page.max(1),
            items_per_page,
            navigator,
        }
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Window for a list of `total_items`
    #[must_use]
    pub fn window(&self, total_items: usize) -> PageWindow {
        PageWindow::derive(total_items, self.items_per_page, self.current_page)
    }

    /// The slice of `items` shown on the current page
    #[must_use]
    pub fn page_of<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        self.window(items.len()).slice(items)
    }

    /// Request navigation to `requested`.
    ///
    /// The request is not checked against the page count; an out-of-range
    /// page renders as an empty list.
    pub fn change_page(&mut self, requested: usize) {
        let page = requested.max(1);
        debug!("Changing page {} -> {}", self.current_page, page);
        self.navigator.go_to_page(page);
        self.navigator.scroll_to_top();
        self.current_page = page;
    }

    #[must_use]
    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn into_navigator(self) -> N {
        self.navigator
    }
}

impl Paginator<QueryNavigator> {
    /// Build a paginator whose current page is read from the URL
    #[must_use]
    pub fn from_query(
        path: &str,
        query: &str,
        page_query: PageQuery,
        items_per_page: usize,
    ) -> Self {
        let navigator = QueryNavigator::new(path, query, page_query);
        let current_page = navigator.current_page();
        Self::new(current_page, items_per_page, navigator)
    }

    /// Build a paginator using the configured page size and page parameter
    #[must_use]
    pub fn from_config(path: &str, query: &str, config: &PaginationConfig) -> Self {
        Self::from_query(
            path,
            query,
            PageQuery::from_config(config),
            config.items_per_page,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", 1)]
    #[case("page=3", 3)]
    #[case("?q=beach&page=2", 2)]
    #[case("page=0", 1)]
    #[case("page=-2", 1)]
    #[case("page=abc", 1)]
    #[case("page=", 1)]
    #[case("sort=rating", 1)]
    fn test_current_page_from_query(#[case] query: &str, #[case] expected: usize) {
        assert_eq!(PageQuery::default().current_page(query), expected);
    }

    #[test]
    fn test_with_page_preserves_other_params() {
        let page_query = PageQuery::default();
        assert_eq!(page_query.with_page("q=beach&page=2", 3), "q=beach&page=3");
        assert_eq!(page_query.with_page("q=beach", 2), "q=beach&page=2");
        assert_eq!(page_query.with_page("", 1), "page=1");
        assert_eq!(
            page_query.with_page("page=1&q=a%20b&page=4", 5),
            "page=5&q=a+b"
        );
        assert_eq!(
            page_query.with_page("?city=S%C3%A3o+Paulo&page=2", 3),
            "city=S%C3%A3o+Paulo&page=3"
        );
    }

    #[test]
    fn test_custom_param() {
        let page_query = PageQuery::new("trips_page");
        assert_eq!(page_query.current_page("page=9&trips_page=2"), 2);
        assert_eq!(
            page_query.href("/trips", "page=9", 4),
            "/trips?page=9&trips_page=4"
        );
    }

    #[test]
    fn test_change_page_navigates_and_scrolls() {
        let mut paginator =
            Paginator::from_query("/experiences", "q=lake&page=1", PageQuery::default(), 6);
        assert_eq!(paginator.current_page(), 1);

        paginator.change_page(2);

        assert_eq!(paginator.current_page(), 2);
        let navigator = paginator.navigator();
        assert_eq!(navigator.history(), ["/experiences?q=lake&page=2"]);
        assert_eq!(navigator.scroll_requests(), 1);
        assert_eq!(navigator.current_page(), 2);
    }

    #[test]
    fn test_change_page_does_not_clamp() {
        let items: Vec<u32> = (0..13).collect();
        let mut paginator = Paginator::from_query("/experiences", "", PageQuery::default(), 6);

        paginator.change_page(7);

        assert_eq!(paginator.current_page(), 7);
        assert!(paginator.page_of(&items).is_empty());
        assert_eq!(paginator.window(items.len()).total_pages, 3);
    }

    #[test]
    fn test_rerender_from_pushed_url() {
        let items: Vec<u32> = (0..13).collect();
        let mut paginator = Paginator::from_query("/trips", "", PageQuery::default(), 6);
        paginator.change_page(3);

        let navigator = paginator.into_navigator();
        let rerendered =
            Paginator::from_query("/trips", navigator.query(), PageQuery::default(), 6);
        assert_eq!(rerendered.page_of(&items), &[12]);
    }

    #[test]
    fn test_from_config_uses_page_size_and_param() {
        let config = PaginationConfig {
            items_per_page: 4,
            page_param: "trips_page".to_string(),
        };
        let items: Vec<u32> = (0..10).collect();
        let mut paginator = Paginator::from_config("/trips", "page=1&trips_page=2", &config);

        assert_eq!(paginator.current_page(), 2);
        assert_eq!(paginator.page_of(&items), &[4, 5, 6, 7]);

        paginator.change_page(3);
        assert_eq!(paginator.navigator().query(), "page=1&trips_page=3");
        assert_eq!(paginator.page_of(&items), &[8, 9]);
    }

    struct Recorder(Vec<usize>);

    impl Navigator for Recorder {
        fn go_to_page(&mut self, page: usize) {
            self.0.push(page);
        }
    }

    #[test]
    fn test_custom_navigator() {
        let mut paginator = Paginator::new(1, 10, Recorder(Vec::new()));
        paginator.change_page(2);
        paginator.change_page(0);
        assert_eq!(paginator.navigator().0, vec![2, 1]);
    }
}
