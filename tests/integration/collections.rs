//! Collection service behaviour.

use crate::common::{self, fixtures};
use mongodb_management::backend::Backend;
use mongodb_management::{BackendError, InMemoryBackend, OneOrMany, Params, ServiceError};
use serde_json::{Value, json};

#[tokio::test]
async fn test_created_collection_is_found_without_namespace() {
    let management = common::management(InMemoryBackend::new());
    let collections = management.collections().unwrap();

    collections
        .create(
            OneOrMany::from_value(json!({"name": "orders"})).unwrap(),
            &Params::new(),
        )
        .await
        .unwrap();

    let found = collections.find(&Params::new()).await.unwrap().into_data();
    assert_eq!(found.len(), 1);

    let orders = &found[0];
    assert_eq!(orders["name"], "orders");
    assert!(orders["count"].as_u64().is_some());
    assert!(orders.get("ns").is_none());
    assert_eq!(orders.keys().next().map(String::as_str), Some("name"));
}

#[tokio::test]
async fn test_create_passes_options_without_name() {
    let backend = InMemoryBackend::new();
    let collections = common::management(backend.clone()).collections().unwrap();

    let created = collections
        .create(
            OneOrMany::from_value(json!({"name": "events", "capped": true, "size": 4096})).unwrap(),
            &Params::new(),
        )
        .await
        .unwrap()
        .one()
        .unwrap();

    assert_eq!(created["name"], "events");
    assert_eq!(created["capped"], true);

    let rejected = collections
        .create(
            OneOrMany::from_value(json!({"name": "broken", "capped": true})).unwrap(),
            &Params::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        rejected,
        ServiceError::Backend(BackendError::InvalidOptions { .. })
    ));
}

#[tokio::test]
async fn test_document_count_is_reported() {
    let backend = common::seeded_backend().await;
    backend
        .insert_documents(
            fixtures::APP_DATABASE,
            "orders",
            vec![json!({"sku": "A1"}), json!({"sku": "B2"})],
        )
        .await;
    let collections = common::management(backend).collections().unwrap();

    let busy = collections
        .find(&Params::new().with_query(json!({"count": {"$gt": 0}, "$select": ["name", "count"]})))
        .await
        .unwrap()
        .into_data();

    assert_eq!(busy, vec![fixtures::descriptor(json!({"name": "orders", "count": 2}))]);
}

#[tokio::test]
async fn test_collections_are_scoped_to_their_database() {
    let backend = common::seeded_backend().await;
    let management = common::management(backend);

    let logs = management.collections_in("logs").unwrap();
    logs.create(fixtures::collections(&["access"]), &Params::new())
        .await
        .unwrap();

    let app_names = fixtures::names(
        management
            .collections()
            .unwrap()
            .find(&Params::new())
            .await
            .unwrap()
            .data(),
    );
    assert_eq!(app_names, fixtures::SEED_COLLECTIONS.to_vec());

    let log_names = fixtures::names(logs.find(&Params::new()).await.unwrap().data());
    assert_eq!(log_names, vec!["access"]);
}

#[tokio::test]
async fn test_bulk_create_returns_every_descriptor() {
    let collections = common::management(InMemoryBackend::new())
        .collections()
        .unwrap();

    let created = collections
        .create(
            fixtures::collections(&["a", "b", "c"]),
            &Params::new().with_query(json!({"$select": ["name"]})),
        )
        .await
        .unwrap();

    assert!(created.is_many());
    assert_eq!(
        created.into_vec(),
        vec![
            fixtures::descriptor(json!({"name": "a"})),
            fixtures::descriptor(json!({"name": "b"})),
            fixtures::descriptor(json!({"name": "c"})),
        ]
    );
}

#[tokio::test]
async fn test_bulk_create_fails_on_existing_collection() {
    let backend = common::seeded_backend().await;
    let collections = common::management(backend.clone()).collections().unwrap();

    let error = collections
        .create(fixtures::collections(&["fresh", "orders"]), &Params::new())
        .await
        .unwrap_err();

    match error {
        ServiceError::Backend(BackendError::NamespaceExists { namespace }) => {
            assert_eq!(namespace, "app.orders");
        }
        other => panic!("expected NamespaceExists, got {:?}", other),
    }

    // Elements created before the failure are not rolled back
    let names = backend.list_collections(fixtures::APP_DATABASE).await.unwrap();
    assert!(names.contains(&"fresh".to_string()));
}

#[tokio::test]
async fn test_create_requires_name() {
    let backend = InMemoryBackend::new();
    let collections = common::management(backend.clone()).collections().unwrap();

    for body in [json!({}), json!({"name": ""}), json!({"name": null})] {
        let error = collections
            .create(OneOrMany::from_value(body).unwrap(), &Params::new())
            .await
            .unwrap_err();
        assert!(matches!(error, ServiceError::Validation(_)));
    }

    assert_eq!(backend.stats().await.collection_count, 0);
}

#[tokio::test]
async fn test_remove_collection_echoes_input() {
    let backend = common::seeded_backend().await;
    let collections = common::management(backend.clone()).collections().unwrap();

    let echo = collections
        .remove(
            Some(fixtures::descriptor(json!({"name": "carts"})).into()),
            &Params::new(),
        )
        .await
        .unwrap();
    assert_eq!(echo, OneOrMany::One(fixtures::descriptor(json!({"name": "carts"}))));

    let names = backend.list_collections(fixtures::APP_DATABASE).await.unwrap();
    assert_eq!(names, vec!["orders", "invoices"]);

    let missing = collections
        .remove(Some("carts".into()), &Params::new())
        .await
        .unwrap_err();
    assert_eq!(missing.not_found_id(), Some("carts"));
}

#[tokio::test]
async fn test_remove_descriptor_without_name_is_rejected() {
    let backend = common::seeded_backend().await;
    let collections = common::management(backend).collections().unwrap();

    let error = collections
        .remove(
            Some(fixtures::descriptor(json!({"count": 0})).into()),
            &Params::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(error, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_find_supports_operators() {
    let backend = common::seeded_backend().await;
    let collections = common::management(backend).collections().unwrap();

    let found = collections
        .find(&Params::new().with_query(json!({
            "name": {"$in": ["orders", "invoices", "absent"]},
            "$sort": {"name": 1}
        })))
        .await
        .unwrap();

    assert_eq!(fixtures::names(found.data()), vec!["invoices", "orders"]);
    assert!(
        found
            .data()
            .iter()
            .all(|d| d.get("capped") == Some(&Value::Bool(false)))
    );
}
