//! Generic resource service.
//!
//! [`ResourceService`] turns one [`ResourceAdapter`] into the uniform
//! `find`/`create`/`remove` contract. It holds no resource-specific
//! knowledge: listing, description and removal are delegated to the adapter,
//! and listings go through the [`query`](crate::query) pipeline.
//!
//! # Example Usage
//!
//! ```rust
//! use mongodb_management::backend::InMemoryBackend;
//! use mongodb_management::kinds::collection;
//! use mongodb_management::service::{OneOrMany, Params, ServiceOptions};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = ServiceOptions::new(InMemoryBackend::new()).with_database("shop");
//! let service = collection::init(options)?;
//!
//! let created = service
//!     .create(OneOrMany::from_value(json!({"name": "orders"}))?, &Params::new())
//!     .await?;
//! assert_eq!(created.into_vec()[0]["name"], "orders");
//!
//! let found = service
//!     .find(&Params::new().with_query(json!({"name": "orders"})))
//!     .await?;
//! assert_eq!(found.data().len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod builder;


pub use builder::{ResourceServiceBuilder, ServiceOptions};

use crate::adapter::{NAME_FIELD, ResourceAdapter, ResourceHandle};
use crate::error::{ServiceError, ServiceResult, ValidationError, ValidationResult};
use crate::query::{
    self, Descriptor, FindResult, Matcher, Page, PaginationPolicy, QuerySpec, Sorter,
};
use futures::future::try_join_all;
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Per-call parameters supplied by the request layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    /// Raw caller query, including `$sort`/`$skip`/`$limit`/`$select`
    pub query: Map<String, Value>,
    /// Per-call pagination override; `None` uses the service policy
    pub paginate: Option<PaginationPolicy>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw query. Non-object values are ignored.
    pub fn with_query(mut self, query: Value) -> Self {
        match query {
            Value::Object(fields) => self.query = fields,
            other => warn!("Ignoring non-object query {}", other),
        }
        self
    }

    /// Override the service pagination for this call.
    pub fn with_paginate(mut self, paginate: PaginationPolicy) -> Self {
        self.paginate = Some(paginate);
        self
    }
}

/// A single item or an array of items, as accepted and returned by bulk-capable verbs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }

    /// The single item, if this is not an array.
    pub fn one(self) -> Option<T> {
        match self {
            OneOrMany::One(item) => Some(item),
            OneOrMany::Many(_) => None,
        }
    }

    pub fn is_many(&self) -> bool {
        matches!(self, OneOrMany::Many(_))
    }
}

impl OneOrMany<Descriptor> {
    /// Interpret a request body as one object or an array of objects.
    pub fn from_value(value: Value) -> ValidationResult<Self> {
        match value {
            Value::Object(item) => Ok(OneOrMany::One(item)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(item) => Ok(item),
                    other => Err(ValidationError::invalid_payload(format!(
                        "array elements must be objects, got {}",
                        other
                    ))),
                })
                .collect::<ValidationResult<Vec<_>>>()
                .map(OneOrMany::Many),
            other => Err(ValidationError::invalid_payload(format!(
                "expected an object or an array of objects, got {}",
                other
            ))),
        }
    }
}

/// What to remove: a bare identifier or a full descriptor keyed on `name`.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoveTarget {
    Id(String),
    Descriptor(Descriptor),
}

impl From<&str> for RemoveTarget {
    fn from(id: &str) -> Self {
        RemoveTarget::Id(id.to_string())
    }
}

impl From<String> for RemoveTarget {
    fn from(id: String) -> Self {
        RemoveTarget::Id(id)
    }
}

impl From<Descriptor> for RemoveTarget {
    fn from(descriptor: Descriptor) -> Self {
        RemoveTarget::Descriptor(descriptor)
    }
}

/// Uniform CRUD-and-query service over one resource adapter.
pub struct ResourceService<A: ResourceAdapter> {
    adapter: A,
    paginate: PaginationPolicy,
    matcher: Arc<dyn Matcher>,
    sorter: Arc<dyn Sorter>,
}

impl<A: ResourceAdapter> ResourceService<A> {
    /// Create a service with default matcher/sorter and no pagination.
    pub fn new(adapter: A) -> Self {
        ResourceServiceBuilder::new(adapter).build()
    }

    pub fn builder(adapter: A) -> ResourceServiceBuilder<A> {
        ResourceServiceBuilder::new(adapter)
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Configured pagination policy.
    pub fn paginate(&self) -> &PaginationPolicy {
        &self.paginate
    }

    fn effective_pagination(&self, params: &Params) -> PaginationPolicy {
        params.paginate.unwrap_or(self.paginate)
    }

    /// List, describe and normalize every resource, in listing order.
    async fn describe_all(&self) -> ServiceResult<Vec<Descriptor>> {
        let handles = self.adapter.list_all().await?;
        let adapter = &self.adapter;

        let raws = try_join_all(handles.iter().map(|handle| async move {
            match handle.as_descriptor() {
                Some(raw) => Ok(raw),
                None => {
                    trace!("Describing {} '{}'", adapter.kind(), handle.name());
                    adapter.describe(handle).await
                }
            }
        }))
        .await?;

        Ok(raws.into_iter().map(|raw| adapter.normalize(raw)).collect())
    }

    async fn run_query(&self, spec: &QuerySpec) -> ServiceResult<Page> {
        let descriptors = self.describe_all().await?;
        Ok(query::execute(
            descriptors,
            spec,
            self.matcher.as_ref(),
            self.sorter.as_ref(),
        ))
    }

    /// Query the resources of this kind.
    ///
    /// Returns a [`Page`] when the effective pagination policy has a default
    /// page size, and the bare data sequence otherwise.
    pub async fn find(&self, params: &Params) -> ServiceResult<FindResult> {
        let paginate = self.effective_pagination(params);
        let spec = QuerySpec::parse(&params.query, &paginate)?;
        debug!("Finding {} resources with {:?}", self.adapter.kind(), spec);

        let page = self.run_query(&spec).await?;

        if paginate.is_enabled() {
            Ok(FindResult::Page(page))
        } else {
            Ok(FindResult::Items(page.data))
        }
    }

    /// Fetch one resource by name.
    pub async fn get(&self, name: &str, params: &Params) -> ServiceResult<Descriptor> {
        let select = query::selection(&params.query)?;
        let handle = self
            .adapter
            .get_one(name)
            .await?
            .ok_or_else(|| ServiceError::not_found(self.adapter.kind(), name))?;

        let raw = match handle.as_descriptor() {
            Some(raw) => raw,
            None => self.adapter.describe(&handle).await?,
        };

        Ok(select_fields(self.adapter.normalize(raw), select.as_deref()))
    }

    /// Create one resource, or every element of an array concurrently.
    ///
    /// Bulk creation fails as a whole on the first failing element; elements
    /// already created at the backend stay created.
    pub async fn create(
        &self,
        data: OneOrMany<Descriptor>,
        params: &Params,
    ) -> ServiceResult<OneOrMany<Descriptor>> {
        let select = query::selection(&params.query)?;

        match data {
            OneOrMany::One(item) => Ok(OneOrMany::One(
                self.create_one(item, select.as_deref()).await?,
            )),
            OneOrMany::Many(items) => {
                let created = try_join_all(
                    items
                        .into_iter()
                        .map(|item| self.create_one(item, select.as_deref())),
                )
                .await?;
                Ok(OneOrMany::Many(created))
            }
        }
    }

    async fn create_one(
        &self,
        mut data: Descriptor,
        select: Option<&[String]>,
    ) -> ServiceResult<Descriptor> {
        let name = take_name(&mut data, self.adapter.kind())?;

        let raw = self.adapter.create_one(&name, data).await?;
        info!("Created {} '{}'", self.adapter.kind(), name);

        Ok(select_fields(self.adapter.normalize(raw), select))
    }

    /// Remove one resource, or, given `None`, every resource of the current page.
    ///
    /// "Remove all" runs the unfiltered-by-id `find` pipeline under the
    /// effective pagination and removes exactly the returned page. With a
    /// default page size of 10 and 15 resources, only 10 are removed; callers
    /// wanting everything must disable or raise pagination explicitly.
    pub async fn remove(
        &self,
        target: Option<RemoveTarget>,
        params: &Params,
    ) -> ServiceResult<OneOrMany<Descriptor>> {
        let select = query::selection(&params.query)?;

        let Some(target) = target else {
            let paginate = self.effective_pagination(params);
            let mut spec = QuerySpec::parse(&params.query, &paginate)?;
            // Removal needs the name; projection applies to the echoes.
            spec.select = None;

            let page = self.run_query(&spec).await?;
            debug!(
                "Removing {} of {} {} resources",
                page.data.len(),
                page.total,
                self.adapter.kind()
            );

            let removed = try_join_all(page.data.into_iter().map(|descriptor| {
                self.remove_one(RemoveTarget::Descriptor(descriptor), select.as_deref())
            }))
            .await?;
            return Ok(OneOrMany::Many(removed));
        };

        Ok(OneOrMany::One(
            self.remove_one(target, select.as_deref()).await?,
        ))
    }

    async fn remove_one(
        &self,
        target: RemoveTarget,
        select: Option<&[String]>,
    ) -> ServiceResult<Descriptor> {
        let (name, echo) = match target {
            RemoveTarget::Id(id) => {
                let mut echo = Descriptor::new();
                echo.insert(NAME_FIELD.to_string(), Value::String(id.clone()));
                (id, echo)
            }
            RemoveTarget::Descriptor(descriptor) => {
                let name = match descriptor.get(NAME_FIELD) {
                    Some(Value::String(name)) if !name.is_empty() => name.clone(),
                    _ => {
                        return Err(ValidationError::missing_required(
                            self.adapter.kind(),
                            NAME_FIELD,
                        )
                        .into());
                    }
                };
                (name, descriptor)
            }
        };

        let handle = self
            .adapter
            .get_one(&name)
            .await?
            .ok_or_else(|| ServiceError::not_found(self.adapter.kind(), &name))?;

        debug!("Removing {} '{}'", self.adapter.kind(), handle.name());
        self.adapter.remove_one(handle).await?;
        info!("Removed {} '{}'", self.adapter.kind(), name);

        Ok(select_fields(echo, select))
    }

    /// Partial update is not defined for any resource kind.
    pub async fn patch(
        &self,
        _id: Option<&str>,
        _data: Descriptor,
        _params: &Params,
    ) -> ServiceResult<OneOrMany<Descriptor>> {
        Err(ServiceError::unsupported(self.adapter.kind(), "patch"))
    }

    /// Full replacement is not defined for any resource kind.
    pub async fn update(
        &self,
        _id: &str,
        _data: Descriptor,
        _params: &Params,
    ) -> ServiceResult<Descriptor> {
        Err(ServiceError::unsupported(self.adapter.kind(), "update"))
    }
}

fn take_name(data: &mut Descriptor, kind: &str) -> ValidationResult<String> {
    match data.remove(NAME_FIELD) {
        Some(Value::String(name)) if !name.is_empty() => Ok(name),
        None | Some(Value::Null) | Some(Value::String(_)) => {
            Err(ValidationError::missing_required(kind, NAME_FIELD))
        }
        Some(_) => Err(ValidationError::invalid_type(NAME_FIELD, "string")),
    }
}

fn select_fields(item: Descriptor, select: Option<&[String]>) -> Descriptor {
    match select {
        Some(fields) => query::project(&item, fields),
        None => item,
    }
}
