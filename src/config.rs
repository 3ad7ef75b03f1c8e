//! Configuration for the management services.
//!
//! The configuration mirrors the settings an application passes when it
//! mounts the services: the default pagination policy, the database that
//! scopes collections and principals, and whether the server supports the
//! `usersInfo` command.
//!
//! ```rust
//! use mongodb_management::config::ManagementConfig;
//!
//! let config = ManagementConfig::from_json(r#"{
//!     "paginate": { "default": 10, "max": 50 },
//!     "database": "feathers-test"
//! }"#).unwrap();
//!
//! assert_eq!(config.paginate.unwrap().default, Some(10));
//! assert!(config.has_users_info_command);
//! ```

use serde::{Deserialize, Serialize};

use crate::query::PaginationPolicy;

/// Settings shared by the database, collection and principal services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManagementConfig {
    /// Default pagination; absent means `find` returns bare arrays
    pub paginate: Option<PaginationPolicy>,

    /// Database scoping collections and principals
    pub database: Option<String>,

    /// Use the `usersInfo` command (servers newer than 2.4) instead of
    /// reading `system.users`
    pub has_users_info_command: bool,
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self {
            paginate: None,
            database: None,
            has_users_info_command: true,
        }
    }
}

impl ManagementConfig {
    /// Parse a configuration from a JSON document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_paginate(mut self, paginate: PaginationPolicy) -> Self {
        self.paginate = Some(paginate);
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }
}
