//! Predicate matching of descriptors against a structured query.
//!
//! A query maps field paths to either a literal (equality) or an operator
//! object such as `{"$gte": 10}`. Supported operators: `$eq`, `$ne`, `$gt`,
//! `$gte`, `$lt`, `$lte`, `$in`, `$nin`, `$exists`, `$not`, `$size`, plus the
//! top-level combinators `$or`, `$and` and `$nor`.

use super::{Descriptor, field_value};
use crate::query::sorter::compare_same_type;
use log::warn;
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Decides whether a descriptor satisfies a query.
///
/// Closures with the same signature implement this trait, which makes it
/// easy to swap the matcher in tests.
pub trait Matcher: Send + Sync {
    fn matches(&self, query: &Map<String, Value>, item: &Descriptor) -> bool;
}

impl<F> Matcher for F
where
    F: Fn(&Map<String, Value>, &Descriptor) -> bool + Send + Sync,
{
    fn matches(&self, query: &Map<String, Value>, item: &Descriptor) -> bool {
        self(query, item)
    }
}

/// Matcher implementing the document-query operator subset.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMatcher;

impl Matcher for DefaultMatcher {
    fn matches(&self, query: &Map<String, Value>, item: &Descriptor) -> bool {
        matches_query(query, item)
    }
}

fn matches_query(query: &Map<String, Value>, item: &Descriptor) -> bool {
    query.iter().all(|(key, condition)| match key.as_str() {
        "$or" => branches(condition).any(|branch| matches_query(branch, item)),
        "$and" => branches(condition).all(|branch| matches_query(branch, item)),
        "$nor" => !branches(condition).any(|branch| matches_query(branch, item)),
        other if other.starts_with('$') => {
            warn!("Unknown top-level query operator '{}'", other);
            false
        }
        path => matches_condition(field_value(item, path), condition),
    })
}

fn branches(condition: &Value) -> impl Iterator<Item = &Map<String, Value>> {
    condition
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn is_operator_object(fields: &Map<String, Value>) -> bool {
    !fields.is_empty() && fields.keys().all(|key| key.starts_with('$'))
}

fn matches_condition(value: Option<&Value>, condition: &Value) -> bool {
    match condition {
        Value::Object(operators) if is_operator_object(operators) => operators
            .iter()
            .all(|(operator, argument)| apply_operator(operator, value, argument)),
        literal => equals(value, literal),
    }
}

fn apply_operator(operator: &str, value: Option<&Value>, argument: &Value) -> bool {
    match operator {
        "$eq" => equals(value, argument),
        "$ne" => !equals(value, argument),
        "$gt" => compares(value, argument, |o| o == Ordering::Greater),
        "$gte" => compares(value, argument, |o| o != Ordering::Less),
        "$lt" => compares(value, argument, |o| o == Ordering::Less),
        "$lte" => compares(value, argument, |o| o != Ordering::Greater),
        "$in" => match argument.as_array() {
            Some(candidates) => candidates.iter().any(|c| equals(value, c)),
            None => {
                warn!("$in expects an array, got {}", argument);
                false
            }
        },
        "$nin" => match argument.as_array() {
            Some(candidates) => !candidates.iter().any(|c| equals(value, c)),
            None => {
                warn!("$nin expects an array, got {}", argument);
                false
            }
        },
        "$exists" => truthy(argument) == value.is_some(),
        "$not" => !matches_condition(value, argument),
        "$size" => match (value, argument.as_u64()) {
            (Some(Value::Array(elements)), Some(size)) => elements.len() as u64 == size,
            _ => false,
        },
        other => {
            warn!("Unknown query operator '{}'", other);
            false
        }
    }
}

// Array fields match when any element matches, as in document queries.
fn equals(value: Option<&Value>, literal: &Value) -> bool {
    match value {
        None => literal.is_null(),
        Some(Value::Array(elements)) if !literal.is_array() => {
            elements.iter().any(|element| values_equal(element, literal))
        }
        Some(value) => values_equal(value, literal),
    }
}

fn compares(value: Option<&Value>, argument: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    match value {
        Some(Value::Array(elements)) => elements
            .iter()
            .any(|element| compare_same_type(element, argument).is_some_and(&accept)),
        Some(value) => compare_same_type(value, argument).is_some_and(accept),
        None => false,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64() != Some(0.0),
        _ => true,
    }
}
