//! Property-based tests for page windows and display indices.

use proptest::prelude::*;

use lambda_console::controllers::pagination::{PaginatedCollection, PaginationState};

proptest! {
    /// The first page starts at item 1, or 0 when there is nothing to show.
    #[test]
    fn prop_first_page_starts_at_one(len in 0usize..500, per_page in 1usize..50) {
        let state = PaginationState::new(1, per_page).unwrap();
        let expected = if len == 0 { 0 } else { 1 };
        prop_assert_eq!(state.first_of_current_page(len), expected);
    }

    /// The last index never exceeds the collection length.
    #[test]
    fn prop_last_index_is_bounded(len in 0usize..500, page in 1usize..60, per_page in 1usize..50) {
        let state = PaginationState::new(page, per_page).unwrap();
        let last = state.last_of_current_page(len);
        prop_assert_eq!(last, len.min(page * per_page));
        prop_assert!(last <= len);
    }

    /// The window holds exactly the items between the display indices.
    #[test]
    fn prop_window_matches_indices(len in 1usize..300, page in 1usize..40, per_page in 1usize..30) {
        let collection = PaginatedCollection::new(
            (1..=len).collect::<Vec<_>>(),
            PaginationState::new(page, per_page).unwrap(),
        );
        let items = collection.paged_items();
        prop_assert!(items.len() <= per_page);

        if let (Some(first), Some(last)) = (items.first(), items.last()) {
            prop_assert_eq!(*first, collection.first_of_current_page());
            prop_assert_eq!(*last, collection.last_of_current_page());
        } else {
            prop_assert!(page > collection.total_pages());
        }
    }

    /// Pages cover the collection without gaps or overlap.
    #[test]
    fn prop_pages_partition_collection(len in 0usize..200, per_page in 1usize..25) {
        let items: Vec<usize> = (0..len).collect();
        let mut seen = Vec::new();
        let total = PaginationState::new(1, per_page).unwrap().total_pages(len);
        for page in 1..=total {
            let state = PaginationState::new(page, per_page).unwrap();
            seen.extend_from_slice(state.window(&items));
        }
        prop_assert_eq!(seen, items);
    }

    /// A state survives the trip through its query string.
    #[test]
    fn prop_query_string_round_trip(page in 1usize..10_000, per_page in 1usize..1_000) {
        let state = PaginationState::new(page, per_page).unwrap();
        prop_assert_eq!(PaginationState::from_query(&state.to_query()).unwrap(), state);
    }
}

#[test]
fn test_third_page_of_twenty_five() {
    let collection = PaginatedCollection::new(
        (1..=25).collect::<Vec<_>>(),
        PaginationState::new(3, 10).unwrap(),
    );
    assert_eq!(collection.paged_items().len(), 5);
    assert_eq!(collection.first_of_current_page(), 21);
    assert_eq!(collection.last_of_current_page(), 25);
}
