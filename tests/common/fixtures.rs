//! Test data shared across the integration suite.

use mongodb_management::{Descriptor, OneOrMany};
use serde_json::{Value, json};

pub const APP_DATABASE: &str = "app";

pub const SEED_COLLECTIONS: [&str; 3] = ["orders", "carts", "invoices"];

/// Convert a JSON object literal into a descriptor.
pub fn descriptor(value: Value) -> Descriptor {
    match value {
        Value::Object(fields) => fields,
        other => panic!("fixture is not an object: {}", other),
    }
}

/// Request body for a single user.
pub fn user(name: &str, password: &str) -> OneOrMany<Descriptor> {
    OneOrMany::One(descriptor(json!({
        "name": name,
        "password": password,
        "roles": ["readWrite"]
    })))
}

/// Request body for several collections.
pub fn collections(names: &[&str]) -> OneOrMany<Descriptor> {
    OneOrMany::Many(
        names
            .iter()
            .map(|name| descriptor(json!({"name": name})))
            .collect(),
    )
}

/// Names of the given descriptors, in order.
pub fn names(descriptors: &[Descriptor]) -> Vec<String> {
    descriptors
        .iter()
        .filter_map(|descriptor| descriptor.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}
