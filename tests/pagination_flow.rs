//! Pagination across a listing page, driven through the URL query

use rstest::rstest;
use tripshare::config::PaginationConfig;
use tripshare::{PageItem, Paginator};

fn experiences(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Experience {i}")).collect()
}

#[test]
fn test_walk_through_experience_listing() {
    let items = experiences(13);
    let mut paginator = Paginator::from_config("/experiences", "sort=recent", &PaginationConfig::default());

    assert_eq!(paginator.current_page(), 1);
    assert_eq!(paginator.page_of(&items).len(), 6);
    assert!(!paginator.window(items.len()).has_previous());

    paginator.change_page(3);
    let window = paginator.window(items.len());
    assert_eq!(window.total_pages, 3);
    assert_eq!(paginator.page_of(&items), &items[12..13]);
    assert!(!window.has_next());

    let navigator = paginator.into_navigator();
    assert_eq!(navigator.query(), "sort=recent&page=3");
    assert_eq!(navigator.scroll_requests(), 1);
}

#[rstest]
#[case("page=2", 2)]
#[case("page=abc", 1)]
#[case("page=0", 1)]
#[case("page=-4", 1)]
#[case("city=Portland", 1)]
fn test_page_read_from_query(#[case] query: &str, #[case] expected: usize) {
    let paginator = Paginator::from_config("/trips", query, &PaginationConfig::default());
    assert_eq!(paginator.current_page(), expected);
}

#[test]
fn test_page_past_the_end_renders_empty() {
    let items = experiences(13);
    let paginator = Paginator::from_config("/experiences", "page=9", &PaginationConfig::default());

    let window = paginator.window(items.len());
    assert!(window.is_out_of_range());
    assert!(paginator.page_of(&items).is_empty());
}

#[test]
fn test_controls_for_long_listing() {
    let items = experiences(120);
    let paginator = Paginator::from_config("/experiences", "page=10", &PaginationConfig::default());
    let window = paginator.window(items.len());

    assert!(window.shows_controls());
    assert_eq!(
        window.visible_pages(),
        vec![
            PageItem::Page(1),
            PageItem::Ellipsis,
            PageItem::Page(9),
            PageItem::Page(10),
            PageItem::Page(11),
            PageItem::Ellipsis,
            PageItem::Page(20),
        ]
    );
}

#[test]
fn test_configured_page_size_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[pagination]\nitems_per_page = 5\npage_param = \"p\"\n",
    )
    .unwrap();
    let config = tripshare::TripShareConfig::load_from_path(Some(path)).unwrap();

    let items = experiences(13);
    let paginator = Paginator::from_config("/experiences", "p=3", &config.pagination);

    assert_eq!(paginator.window(items.len()).total_pages, 3);
    assert_eq!(paginator.page_of(&items), &items[10..13]);
}
