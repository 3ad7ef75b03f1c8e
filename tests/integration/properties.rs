//! Property-based tests for the query pipeline and descriptor normalization.

use crate::common::{self, fixtures};
use mongodb_management::adapter::{ResourceAdapter, rename_identity};
use mongodb_management::kinds::CollectionAdapter;
use mongodb_management::query::{
    DefaultMatcher, DefaultSorter, Descriptor, Matcher, PaginationPolicy, QuerySpec, execute,
    paginate,
};
use mongodb_management::{InMemoryBackend, Params};
use proptest::prelude::*;
use serde_json::{Map, Value, json};

fn items_strategy() -> impl Strategy<Value = Vec<Descriptor>> {
    prop::collection::vec(("[a-z]{1,8}", 0u64..100), 0..40).prop_map(|rows| {
        rows.into_iter()
            .map(|(name, count)| fixtures::descriptor(json!({"name": name, "count": count})))
            .collect()
    })
}

fn spec(raw: Value) -> QuerySpec {
    let raw = raw.as_object().cloned().unwrap_or_default();
    QuerySpec::parse(&raw, &PaginationPolicy::disabled()).unwrap()
}

proptest! {
    #[test]
    fn test_every_returned_item_matches_the_filter(
        items in items_strategy(),
        threshold in 0u64..100,
    ) {
        let query = json!({"count": {"$gte": threshold}});
        let expected = items
            .iter()
            .filter(|item| item["count"].as_u64().unwrap_or(0) >= threshold)
            .count();

        let page = execute(items, &spec(query.clone()), &DefaultMatcher, &DefaultSorter);

        prop_assert_eq!(page.total, expected);
        prop_assert_eq!(page.data.len(), expected);
        let filter = query.as_object().cloned().unwrap_or_default();
        for item in &page.data {
            prop_assert!(DefaultMatcher.matches(&filter, item));
        }
    }

    #[test]
    fn test_total_ignores_skip_limit_and_select(
        items in items_strategy(),
        skip in 0usize..50,
        limit in 0usize..50,
    ) {
        let plain = execute(items.clone(), &spec(json!({})), &DefaultMatcher, &DefaultSorter);
        let windowed = execute(
            items,
            &spec(json!({"$skip": skip, "$limit": limit, "$select": ["name"]})),
            &DefaultMatcher,
            &DefaultSorter,
        );

        prop_assert_eq!(plain.total, windowed.total);
        prop_assert!(windowed.data.len() <= limit);
        prop_assert!(windowed.data.iter().all(|item| item.get("count").is_none()));
    }

    #[test]
    fn test_paginate_length(
        total in 0usize..100,
        skip in 0usize..120,
        limit in 0usize..120,
    ) {
        let items: Vec<usize> = (0..total).collect();
        let window = paginate(items, skip, Some(limit));

        prop_assert_eq!(window.len(), limit.min(total.saturating_sub(skip)));
        prop_assert!(window.iter().enumerate().all(|(offset, value)| *value == skip + offset));
    }

    #[test]
    fn test_sorted_output_is_ordered(items in items_strategy()) {
        let sort = spec(json!({"$sort": {"count": -1}}));
        let page = execute(items, &sort, &DefaultMatcher, &DefaultSorter);

        let counts: Vec<u64> = page
            .data
            .iter()
            .filter_map(|item| item["count"].as_u64())
            .collect();
        prop_assert!(counts.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn test_rename_identity_is_idempotent(name in "[a-zA-Z0-9_]{1,16}", size in 0u64..1_000_000) {
        let mut raw = Map::new();
        raw.insert("sizeOnDisk".to_string(), json!(size));
        raw.insert("db".to_string(), json!(name.clone()));

        let once = rename_identity(raw, "db");
        let twice = rename_identity(once.clone(), "db");

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.get("name"), Some(&Value::String(name)));
        prop_assert!(once.get("db").is_none());
    }

    #[test]
    fn test_collection_name_is_namespace_tail(
        database in "[a-z]{1,8}",
        collection in "[a-z]{1,8}(\\.[a-z]{1,8}){0,2}",
    ) {
        let adapter = CollectionAdapter::new(InMemoryBackend::new(), database.clone());
        let namespace = format!("{}.{}", database, collection);
        let raw = fixtures::descriptor(json!({"ns": namespace, "count": 0}));

        let normalized = adapter.normalize(raw);

        prop_assert_eq!(normalized.get("name"), Some(&Value::String(collection)));
        prop_assert!(normalized.get("ns").is_none());
    }

    #[test]
    fn test_service_total_counts_every_collection(count in 0usize..25) {
        tokio_test::block_on(async {
            let backend = common::backend_with_collections(count).await;
            let collections = common::paginated_management(backend).collections().unwrap();

            let result = collections.find(&Params::new()).await.unwrap();
            let page = result.as_page().unwrap();

            assert_eq!(page.total, count);
            assert_eq!(page.data.len(), count.min(10));
        });
    }
}
