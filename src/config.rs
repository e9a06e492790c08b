//! Process configuration.
//!
//! Values come from the environment (`API_BASE`, `API_TOKEN`, ...), optionally
//! layered over a config file with the same flat keys in lower case. The
//! result is validated once into an [`AppConfig`] that is passed explicitly to
//! every component.

use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{IngestError, Result};

pub const DEFAULT_TARGET_SCHEMA: &str = "core";
pub const DEFAULT_STAGING_SCHEMA: &str = "landing";
pub const DEFAULT_PAGE_SIZE: u32 = 5000;
pub const DEFAULT_SCHEMA_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_DATA_TIMEOUT_SECS: u64 = 120;

/// Raw settings as read from the sources, before validation.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    api_base: Option<String>,
    api_token: Option<String>,
    pg_dsn: Option<String>,
    table_name: Option<String>,
    primary_key: Option<String>,
    schema_target: Option<String>,
    schema_staging: Option<String>,
    page_size: Option<u32>,
    schema_timeout_secs: Option<u64>,
    data_timeout_secs: Option<u64>,
}

#[derive(Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: String,
    pub page_size: u32,
    pub schema_timeout: Duration,
    pub data_timeout: Duration,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub dsn: String,
    pub staging_schema: String,
    pub target_schema: String,
}

#[derive(Debug, Clone)]
pub struct TableConfig {
    pub name: String,
    pub primary_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub table: TableConfig,
}

impl AppConfig {
    /// Load from the process environment, layered over `path` when given.
    pub fn load(path: Option<&str>) -> Result<Self> {
        Self::from_sources(path, None)
    }

    /// Load from an optional config file and an environment map. `None` for
    /// `env` reads the real process environment.
    pub fn from_sources(path: Option<&str>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }
        let settings = builder
            .add_source(config::Environment::default().source(env))
            .build()
            .map_err(|e| IngestError::Configuration(e.to_string()))?;

        let raw: RawConfig = settings
            .try_deserialize()
            .map_err(|e| IngestError::Configuration(e.to_string()))?;

        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self> {
        // Empty strings count as missing.
        let present = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let api_base = present(raw.api_base);
        let api_token = present(raw.api_token);
        let pg_dsn = present(raw.pg_dsn);
        let table_name = present(raw.table_name);

        let missing: Vec<&str> = [
            ("API_BASE", api_base.is_none()),
            ("API_TOKEN", api_token.is_none()),
            ("PG_DSN", pg_dsn.is_none()),
            ("TABLE_NAME", table_name.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, absent)| absent.then_some(key))
        .collect();

        let (Some(api_base), Some(token), Some(dsn), Some(name)) =
            (api_base, api_token, pg_dsn, table_name)
        else {
            return Err(IngestError::Configuration(format!(
                "missing required variables: {}",
                missing.join(", ")
            )));
        };

        let base_url = api_base.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| {
            IngestError::Configuration(format!("invalid API_BASE '{}': {}", base_url, e))
        })?;

        let page_size = raw.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(IngestError::Configuration(
                "PAGE_SIZE must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api: ApiConfig {
                base_url,
                token,
                page_size,
                schema_timeout: Duration::from_secs(
                    raw.schema_timeout_secs.unwrap_or(DEFAULT_SCHEMA_TIMEOUT_SECS),
                ),
                data_timeout: Duration::from_secs(
                    raw.data_timeout_secs.unwrap_or(DEFAULT_DATA_TIMEOUT_SECS),
                ),
            },
            database: DatabaseConfig {
                dsn,
                staging_schema: present(raw.schema_staging)
                    .unwrap_or_else(|| DEFAULT_STAGING_SCHEMA.to_string()),
                target_schema: present(raw.schema_target)
                    .unwrap_or_else(|| DEFAULT_TARGET_SCHEMA.to_string()),
            },
            table: TableConfig {
                name,
                primary_key: present(raw.primary_key),
            },
        })
    }
}

impl Debug for ApiConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("page_size", &self.page_size)
            .field("schema_timeout", &self.schema_timeout)
            .field("data_timeout", &self.data_timeout)
            .finish()
    }
}

impl Debug for DatabaseConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("dsn", &"<redacted>")
            .field("staging_schema", &self.staging_schema)
            .field("target_schema", &self.target_schema)
            .finish()
    }
}
