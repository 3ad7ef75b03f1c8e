//! Builder and factory options for resource services.
//!
//! [`ResourceServiceBuilder`] wires an adapter to a pagination policy and a
//! query engine. [`ServiceOptions`] is the configuration object accepted by
//! the per-kind factories in [`crate::kinds`].

use crate::adapter::ResourceAdapter;
use crate::config::ManagementConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::query::{DefaultMatcher, DefaultSorter, Matcher, PaginationPolicy, Sorter};
use crate::service::ResourceService;
use std::sync::Arc;

/// Builder for [`ResourceService`].
pub struct ResourceServiceBuilder<A: ResourceAdapter> {
    adapter: A,
    paginate: PaginationPolicy,
    matcher: Option<Arc<dyn Matcher>>,
    sorter: Option<Arc<dyn Sorter>>,
}

impl<A: ResourceAdapter> ResourceServiceBuilder<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            paginate: PaginationPolicy::disabled(),
            matcher: None,
            sorter: None,
        }
    }

    /// Set the default pagination policy.
    pub fn paginate(mut self, paginate: PaginationPolicy) -> Self {
        self.paginate = paginate;
        self
    }

    /// Replace the query matcher.
    pub fn matcher(mut self, matcher: Arc<dyn Matcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Replace the sorter.
    pub fn sorter(mut self, sorter: Arc<dyn Sorter>) -> Self {
        self.sorter = Some(sorter);
        self
    }

    pub fn build(self) -> ResourceService<A> {
        ResourceService {
            adapter: self.adapter,
            paginate: self.paginate,
            matcher: self.matcher.unwrap_or_else(|| Arc::new(DefaultMatcher)),
            sorter: self.sorter.unwrap_or_else(|| Arc::new(DefaultSorter)),
        }
    }
}

/// Configuration object accepted by the resource-kind factories.
#[derive(Clone)]
pub struct ServiceOptions<B> {
    /// Backend client the adapter runs native calls against
    pub backend: B,
    pub paginate: Option<PaginationPolicy>,
    /// Database scoping collections and principals
    pub database: Option<String>,
    /// Whether principals are listed through `usersInfo` or `system.users`
    pub has_users_info_command: bool,
    pub matcher: Option<Arc<dyn Matcher>>,
    pub sorter: Option<Arc<dyn Sorter>>,
}

impl<B> ServiceOptions<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            paginate: None,
            database: None,
            has_users_info_command: true,
            matcher: None,
            sorter: None,
        }
    }

    /// Build options from a loaded configuration.
    pub fn from_config(backend: B, config: &ManagementConfig) -> Self {
        Self {
            backend,
            paginate: config.paginate,
            database: config.database.clone(),
            has_users_info_command: config.has_users_info_command,
            matcher: None,
            sorter: None,
        }
    }

    pub fn with_paginate(mut self, paginate: PaginationPolicy) -> Self {
        self.paginate = Some(paginate);
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_users_info_command(mut self, enabled: bool) -> Self {
        self.has_users_info_command = enabled;
        self
    }

    pub fn with_matcher(mut self, matcher: Arc<dyn Matcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn with_sorter(mut self, sorter: Arc<dyn Sorter>) -> Self {
        self.sorter = Some(sorter);
        self
    }

    /// Wrap an adapter into a service configured by these options.
    pub fn build_service<A: ResourceAdapter>(&self, adapter: A) -> ResourceService<A> {
        let mut builder = ResourceServiceBuilder::new(adapter);
        if let Some(paginate) = self.paginate {
            builder = builder.paginate(paginate);
        }
        if let Some(matcher) = &self.matcher {
            builder = builder.matcher(Arc::clone(matcher));
        }
        if let Some(sorter) = &self.sorter {
            builder = builder.sorter(Arc::clone(sorter));
        }
        builder.build()
    }

    /// The scoping database, required by collection and principal services.
    pub(crate) fn require_database(&self, kind: &str) -> ServiceResult<String> {
        self.database
            .clone()
            .filter(|database| !database.is_empty())
            .ok_or_else(|| {
                ServiceError::configuration(format!(
                    "a database option has to be provided for the {} service",
                    kind
                ))
            })
    }
}
