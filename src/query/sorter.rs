//! Multi-key ordering of descriptors.

use super::{Descriptor, SortDirection, SortSpec, field_value};
use serde_json::Value;
use std::cmp::Ordering;

/// Orders two descriptors under a sort specification.
pub trait Sorter: Send + Sync {
    fn compare(&self, sort: &SortSpec, a: &Descriptor, b: &Descriptor) -> Ordering;
}

impl<F> Sorter for F
where
    F: Fn(&SortSpec, &Descriptor, &Descriptor) -> Ordering + Send + Sync,
{
    fn compare(&self, sort: &SortSpec, a: &Descriptor, b: &Descriptor) -> Ordering {
        self(sort, a, b)
    }
}

/// Sorter comparing field values with [`compare_values`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSorter;

impl Sorter for DefaultSorter {
    fn compare(&self, sort: &SortSpec, a: &Descriptor, b: &Descriptor) -> Ordering {
        for (field, direction) in sort.keys() {
            let ordering = compare_values(field_value(a, field), field_value(b, field));
            let ordering = match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Total order over optional JSON values.
///
/// Values of different types order by type: missing/null, numbers, strings,
/// objects, arrays, booleans.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let (rank_a, rank_b) = (type_rank(a), type_rank(b));
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }

    match (a, b) {
        (Some(Value::Array(x)), Some(Value::Array(y))) => x
            .iter()
            .zip(y.iter())
            .map(|(p, q)| compare_values(Some(p), Some(q)))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Some(Value::Object(x)), Some(Value::Object(y))) => x
            .iter()
            .zip(y.iter())
            .map(|((ka, va), (kb, vb))| ka.cmp(kb).then_with(|| compare_values(Some(va), Some(vb))))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Some(x), Some(y)) => compare_same_type(x, y).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

/// Compare two scalars of the same JSON type; `None` when not comparable.
pub(crate) fn compare_same_type(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
