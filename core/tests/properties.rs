//! Property and scenario tests for the collection operations.

use proptest::prelude::*;
use todo_core::{FilterMode, SortKey, Stamp, TitlePolicy, TodoCollection, TodoId, TodoItem};

fn arb_collection() -> impl Strategy<Value = TodoCollection> {
    prop::collection::vec(("[a-zA-Z ]{1,12}", any::<bool>(), 0i64..1_000), 0..12).prop_map(
        |rows| {
            let items = rows
                .into_iter()
                .enumerate()
                .map(|(i, (title, completed, created_at))| TodoItem {
                    id: i as TodoId + 1,
                    title,
                    completed,
                    created_at: Some(created_at),
                })
                .collect::<Vec<_>>();
            TodoCollection::from(items)
        },
    )
}

fn arb_filter() -> impl Strategy<Value = FilterMode> {
    prop_oneof![
        Just(FilterMode::All),
        Just(FilterMode::Active),
        Just(FilterMode::Completed),
    ]
}

fn stamp() -> Stamp {
    Stamp {
        id: 10_000,
        created_at: 10_000,
    }
}

proptest! {
    #[test]
    fn prop_blank_title_is_noop(s in arb_collection(), blank in "[ \t\n]{0,6}") {
        prop_assert_eq!(s.add(&blank, &TitlePolicy::default(), stamp()), s);
    }

    #[test]
    fn prop_add_grows_by_one(s in arb_collection(), title in "[a-z]{1,40}") {
        let next = s.add(&title, &TitlePolicy::default(), stamp());
        prop_assert_eq!(next.len(), s.len() + 1);
        let added = next.get(stamp().id).unwrap();
        prop_assert!(!added.completed);
        prop_assert_eq!(&added.title, &title);
    }

    #[test]
    fn prop_toggle_twice_is_identity(s in arb_collection(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!s.is_empty());
        let id = s.items()[pick.index(s.len())].id;
        prop_assert_eq!(s.toggle(id).toggle(id), s);
    }

    #[test]
    fn prop_remove_unknown_is_noop(s in arb_collection()) {
        prop_assert_eq!(s.remove(-42), s.clone());
        prop_assert_eq!(s.remove(1_000_000), s);
    }

    #[test]
    fn prop_clear_completed_keeps_active_in_order(s in arb_collection()) {
        let cleared = s.clear_completed();
        prop_assert!(cleared.iter().all(|i| !i.completed));
        let active: Vec<&TodoItem> = s.iter().filter(|i| !i.completed).collect();
        let kept: Vec<&TodoItem> = cleared.iter().collect();
        prop_assert_eq!(kept, active);
    }

    #[test]
    fn prop_filter_then_search_is_an_ordered_subset(
        s in arb_collection(),
        mode in arb_filter(),
        query in "[a-z]{0,2}",
    ) {
        let ids = s.filter(mode).search(&query).ids();
        let source = s.view().ids();
        // every id comes from the source, in source order
        let mut cursor = source.iter();
        for id in &ids {
            prop_assert!(cursor.any(|seen| seen == id), "id {} out of order or unknown", id);
        }
    }

    #[test]
    fn prop_title_sort_is_case_insensitive_and_stable(s in arb_collection()) {
        let sorted = s.sort(SortKey::Title);
        let items: Vec<&TodoItem> = sorted.iter().collect();
        for pair in items.windows(2) {
            let (a, b) = (pair[0].title.to_lowercase(), pair[1].title.to_lowercase());
            prop_assert!(a <= b);
            if a == b {
                // ties keep insertion order; ids grow with insertion here
                prop_assert!(pair[0].id < pair[1].id);
            }
        }
    }

    #[test]
    fn prop_date_sort_is_newest_first(s in arb_collection()) {
        let sorted = s.sort(SortKey::Date);
        let items: Vec<&TodoItem> = sorted.iter().collect();
        for pair in items.windows(2) {
            prop_assert!(pair[0].created_at >= pair[1].created_at);
        }
    }
}

#[test]
fn title_sort_example() {
    let s = TodoCollection::from(vec![
        TodoItem {
            id: 1,
            title: "Banana".to_string(),
            completed: false,
            created_at: None,
        },
        TodoItem {
            id: 2,
            title: "apple".to_string(),
            completed: false,
            created_at: None,
        },
    ]);
    assert_eq!(s.sort(SortKey::Title).titles(), vec!["apple", "Banana"]);
}

#[test]
fn end_to_end_scenario() {
    let policy = TitlePolicy::default();
    let s = TodoCollection::new();

    let s = s.add("Buy milk", &policy, stamp());
    assert_eq!(s.len(), 1);
    let item = &s.items()[0];
    assert_eq!(item.title, "Buy milk");
    assert!(!item.completed);
    let id = item.id;

    let s = s.toggle(id);
    assert!(s.get(id).unwrap().completed);

    let s = s.add("", &policy, Stamp { id: 10_001, created_at: 10_001 });
    assert_eq!(s.len(), 1);

    let s = s.clear_completed();
    assert!(s.is_empty());
}
