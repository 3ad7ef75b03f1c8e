//! Principal (user) service behaviour.

use crate::common::{self, fixtures};
use mongodb_management::{
    BackendError, InMemoryBackend, Management, ManagementConfig, OneOrMany, Params, ServiceError,
    ValidationError,
};
use serde_json::json;

#[tokio::test]
async fn test_create_user_with_selection() {
    let backend = InMemoryBackend::new();
    let users = common::management(backend.clone()).principals().unwrap();

    let created = users
        .create(
            fixtures::user("alice", "s3cret"),
            &Params::new().with_query(json!({"$select": ["name"]})),
        )
        .await
        .unwrap();

    assert_eq!(
        created,
        OneOrMany::One(fixtures::descriptor(json!({"name": "alice"})))
    );
    assert!(
        backend
            .verify_password(fixtures::APP_DATABASE, "alice", "s3cret")
            .await
    );
}

#[tokio::test]
async fn test_find_users_with_selection() {
    let users = common::paginated_management(InMemoryBackend::new())
        .principals()
        .unwrap();

    users
        .create(
            OneOrMany::from_value(json!({"name": "alice", "password": "p"})).unwrap(),
            &Params::new(),
        )
        .await
        .unwrap();

    let found = users
        .find(&Params::new().with_query(json!({"$select": ["name"]})))
        .await
        .unwrap();

    assert_eq!(found.as_page().map(|page| page.total), Some(1));
    assert_eq!(
        found.into_data(),
        vec![fixtures::descriptor(json!({"name": "alice"}))]
    );
}

#[tokio::test]
async fn test_user_descriptor_shape() {
    let users = common::management(InMemoryBackend::new())
        .principals()
        .unwrap();

    users
        .create(
            OneOrMany::from_value(json!({
                "name": "bob",
                "password": "pw",
                "roles": ["read", {"role": "dbAdmin", "db": "admin"}],
                "customData": {"team": "ops"}
            }))
            .unwrap(),
            &Params::new(),
        )
        .await
        .unwrap();

    let bob = users.get("bob", &Params::new()).await.unwrap();
    assert_eq!(bob["name"], "bob");
    assert!(bob.get("user").is_none());
    assert!(bob.get("password").is_none());
    assert!(bob.get("credentials").is_none());
    assert_eq!(bob["customData"], json!({"team": "ops"}));
    assert_eq!(
        bob["roles"],
        json!([
            {"role": "read", "db": fixtures::APP_DATABASE},
            {"role": "dbAdmin", "db": "admin"}
        ])
    );
}

#[tokio::test]
async fn test_create_user_requires_password() {
    let backend = InMemoryBackend::new();
    let users = common::management(backend.clone()).principals().unwrap();

    let error = users
        .create(
            OneOrMany::from_value(json!({"name": "carol"})).unwrap(),
            &Params::new(),
        )
        .await
        .unwrap_err();

    match error {
        ServiceError::Validation(ValidationError::MissingRequiredField { field, .. }) => {
            assert_eq!(field, "password");
        }
        other => panic!("expected missing password, got {:?}", other),
    }
    assert_eq!(backend.stats().await.user_count, 0);
}

#[tokio::test]
async fn test_duplicate_user_is_a_backend_error() {
    let users = common::management(InMemoryBackend::new())
        .principals()
        .unwrap();

    users
        .create(fixtures::user("alice", "a"), &Params::new())
        .await
        .unwrap();
    let error = users
        .create(fixtures::user("alice", "b"), &Params::new())
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        ServiceError::Backend(BackendError::UserExists { .. })
    ));
}

#[tokio::test]
async fn test_users_listed_from_system_users_when_configured() {
    let backend = InMemoryBackend::new();
    common::management(backend.clone())
        .principals()
        .unwrap()
        .create(fixtures::user("alice", "pw"), &Params::new())
        .await
        .unwrap();

    let config = ManagementConfig {
        has_users_info_command: false,
        ..ManagementConfig::default().with_database(fixtures::APP_DATABASE)
    };
    let users = Management::new(backend, config).principals().unwrap();

    let found = users.find(&Params::new()).await.unwrap().into_data();
    assert_eq!(fixtures::names(&found), vec!["alice"]);
    assert!(found[0].get("credentials").is_none());
}

#[tokio::test]
async fn test_falls_back_when_server_lacks_users_info() {
    let backend = InMemoryBackend::new().without_users_info_command();
    let users = common::management(backend).principals().unwrap();

    for name in ["alice", "bob"] {
        users
            .create(fixtures::user(name, "pw"), &Params::new())
            .await
            .unwrap();
    }

    let found = users
        .find(&Params::new().with_query(json!({"name": "bob"})))
        .await
        .unwrap();
    assert_eq!(fixtures::names(found.data()), vec!["bob"]);

    let echo = users.remove(Some("alice".into()), &Params::new()).await.unwrap();
    assert_eq!(echo, OneOrMany::One(fixtures::descriptor(json!({"name": "alice"}))));
    assert_eq!(
        fixtures::names(users.find(&Params::new()).await.unwrap().data()),
        vec!["bob"]
    );
}

#[tokio::test]
async fn test_users_are_scoped_to_their_database() {
    let management = common::management(InMemoryBackend::new());

    management
        .principals_in("admin")
        .unwrap()
        .create(fixtures::user("root", "pw"), &Params::new())
        .await
        .unwrap();

    let app_users = management.principals().unwrap();
    assert!(app_users.find(&Params::new()).await.unwrap().data().is_empty());

    let error = app_users
        .remove(Some("root".into()), &Params::new())
        .await
        .unwrap_err();
    assert_eq!(error.not_found_id(), Some("root"));
}
