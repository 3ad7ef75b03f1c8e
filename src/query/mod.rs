//! In-memory query engine for resource listings.
//!
//! Turns a raw listing of descriptors into a uniform page: filter, count,
//! sort, skip, limit and project, always in that order. The four building
//! blocks ([`Matcher`], [`Sorter`], [`paginate`], [`project`]) are pure and
//! independent; [`execute`] composes them.
//!
//! # Example Usage
//!
//! ```rust
//! use mongodb_management::query::{
//!     DefaultMatcher, DefaultSorter, PaginationPolicy, QuerySpec, execute,
//! };
//! use serde_json::json;
//!
//! let items = vec![
//!     json!({"name": "orders", "count": 12}),
//!     json!({"name": "carts", "count": 3}),
//!     json!({"name": "users", "count": 40}),
//! ]
//! .into_iter()
//! .filter_map(|value| value.as_object().cloned())
//! .collect();
//!
//! let raw = json!({"count": {"$gt": 5}, "$sort": {"count": -1}, "$select": ["name"]});
//! let spec = QuerySpec::parse(raw.as_object().unwrap(), &PaginationPolicy::disabled()).unwrap();
//!
//! let page = execute(items, &spec, &DefaultMatcher, &DefaultSorter);
//! assert_eq!(page.total, 2);
//! assert_eq!(page.data[0]["name"], "users");
//! assert!(page.data[0].get("count").is_none());
//! ```

pub mod matcher;
pub mod sorter;

pub use matcher::{DefaultMatcher, Matcher};
pub use sorter::{DefaultSorter, Sorter, compare_values};

use crate::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalized, uniform-shape representation of one resource.
pub type Descriptor = Map<String, Value>;

const SORT: &str = "$sort";
const SKIP: &str = "$skip";
const LIMIT: &str = "$limit";
const SELECT: &str = "$select";

/// Default and maximum page sizes applied to `find`.
///
/// A policy without a positive `default` disables pagination: `find`
/// returns the bare data sequence instead of a [`Page`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationPolicy {
    /// Page size used when the caller gives no `$limit`
    pub default: Option<usize>,
    /// Upper bound on any requested `$limit`
    pub max: Option<usize>,
}

impl PaginationPolicy {
    /// Create a policy with a default page size and an optional maximum.
    pub fn new(default: usize, max: Option<usize>) -> Self {
        Self {
            default: Some(default),
            max,
        }
    }

    /// A policy that turns pagination off.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Whether results are wrapped in a [`Page`] envelope.
    pub fn is_enabled(&self) -> bool {
        self.default.is_some_and(|default| default > 0)
    }

    /// Resolve the effective limit for a caller-requested `$limit`.
    pub fn resolve_limit(&self, requested: Option<usize>) -> Option<usize> {
        match self.default {
            Some(default) if default > 0 => {
                let lower = requested.unwrap_or(default);
                Some(self.max.map_or(lower, |max| lower.min(max)))
            }
            _ => requested,
        }
    }
}

/// Direction of one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Ordered sort keys; earlier keys take precedence, later keys break ties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<(String, SortDirection)>,
}

impl SortSpec {
    /// Create an empty sort specification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sort key.
    pub fn then(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.keys.push((field.into(), direction));
        self
    }

    /// Sort keys in precedence order.
    pub fn keys(&self) -> &[(String, SortDirection)] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// A caller query split into its filter and its reserved parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    /// Field predicates; every entry must be satisfied
    pub query: Map<String, Value>,
    pub sort: Option<SortSpec>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
    pub select: Option<Vec<String>>,
}

impl QuerySpec {
    /// Split a raw caller query into filter and reserved parameters.
    ///
    /// `$sort`, `$skip`, `$limit` and `$select` are extracted; everything
    /// else, including `$or`/`$and`/`$nor`, stays in the filter. The limit is
    /// resolved against the pagination policy.
    pub fn parse(raw: &Map<String, Value>, paginate: &PaginationPolicy) -> ValidationResult<Self> {
        let mut spec = QuerySpec::default();
        let mut requested_limit = None;

        for (key, value) in raw {
            match key.as_str() {
                SORT => spec.sort = Some(parse_sort(value)?),
                SKIP => spec.skip = Some(parse_count(SKIP, value)?),
                LIMIT => requested_limit = Some(parse_count(LIMIT, value)?),
                SELECT => spec.select = Some(parse_select(value)?),
                _ => {
                    spec.query.insert(key.clone(), value.clone());
                }
            }
        }

        spec.limit = paginate.resolve_limit(requested_limit);
        Ok(spec)
    }
}

/// Extract only the `$select` parameter of a raw query.
pub fn selection(raw: &Map<String, Value>) -> ValidationResult<Option<Vec<String>>> {
    raw.get(SELECT).map(parse_select).transpose()
}

fn parse_count(parameter: &str, value: &Value) -> ValidationResult<usize> {
    let parsed = match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed
        .and_then(|count| usize::try_from(count).ok())
        .ok_or_else(|| {
            ValidationError::invalid_query(
                parameter,
                format!("expected a non-negative integer, got {}", value),
            )
        })
}

fn parse_sort(value: &Value) -> ValidationResult<SortSpec> {
    let fields = value.as_object().ok_or_else(|| {
        ValidationError::invalid_query(SORT, "expected an object of field directions")
    })?;

    let mut sort = SortSpec::new();
    for (field, direction) in fields {
        let parsed = match direction {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        };
        let direction = match parsed {
            Some(1) => SortDirection::Ascending,
            Some(-1) => SortDirection::Descending,
            _ => {
                return Err(ValidationError::invalid_query(
                    SORT,
                    format!("direction for '{}' must be 1 or -1", field),
                ));
            }
        };
        sort = sort.then(field.clone(), direction);
    }

    Ok(sort)
}

fn parse_select(value: &Value) -> ValidationResult<Vec<String>> {
    let invalid = || ValidationError::invalid_query(SELECT, "expected an array of field names");
    match value {
        Value::String(field) => Ok(vec![field.clone()]),
        Value::Array(fields) => fields
            .iter()
            .map(|field| field.as_str().map(str::to_string).ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

/// Paginated result envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    /// Number of descriptors matching the query before skip/limit
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    pub skip: usize,
    pub data: Vec<Descriptor>,
}

/// Outcome of `find`: a page envelope, or the bare data when pagination is off.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FindResult {
    Page(Page),
    Items(Vec<Descriptor>),
}

impl FindResult {
    /// The descriptors of this result.
    pub fn data(&self) -> &[Descriptor] {
        match self {
            FindResult::Page(page) => &page.data,
            FindResult::Items(items) => items,
        }
    }

    pub fn into_data(self) -> Vec<Descriptor> {
        match self {
            FindResult::Page(page) => page.data,
            FindResult::Items(items) => items,
        }
    }

    /// The page envelope, if pagination was in effect.
    pub fn as_page(&self) -> Option<&Page> {
        match self {
            FindResult::Page(page) => Some(page),
            FindResult::Items(_) => None,
        }
    }
}

/// Slice `items[skip .. skip + limit]`; an absent limit keeps the whole tail.
pub fn paginate<T>(items: Vec<T>, skip: usize, limit: Option<usize>) -> Vec<T> {
    items
        .into_iter()
        .skip(skip)
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

/// Keep only the named top-level fields, without renaming them.
pub fn project(item: &Descriptor, fields: &[String]) -> Descriptor {
    fields
        .iter()
        .filter_map(|field| item.get(field).map(|value| (field.clone(), value.clone())))
        .collect()
}

/// Run the full pipeline: filter, count, sort, skip, limit, project.
pub fn execute(
    items: Vec<Descriptor>,
    spec: &QuerySpec,
    matcher: &dyn Matcher,
    sorter: &dyn Sorter,
) -> Page {
    let mut values: Vec<Descriptor> = items
        .into_iter()
        .filter(|item| matcher.matches(&spec.query, item))
        .collect();

    let total = values.len();

    if let Some(sort) = spec.sort.as_ref().filter(|sort| !sort.is_empty()) {
        values.sort_by(|a, b| sorter.compare(sort, a, b));
    }

    let skip = spec.skip.unwrap_or(0);
    let mut data = paginate(values, skip, spec.limit);

    if let Some(fields) = &spec.select {
        data = data.iter().map(|item| project(item, fields)).collect();
    }

    Page {
        total,
        limit: spec.limit,
        skip,
        data,
    }
}

/// Resolve a dotted path inside a descriptor.
pub(crate) fn field_value<'a>(item: &'a Descriptor, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = item.get(parts.next()?)?;

    for part in parts {
        current = match current {
            Value::Object(fields) => fields.get(part)?,
            Value::Array(elements) => elements.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}
