mod api;
mod fetcher;
mod pages;
mod types;

pub use api::{ApiClient, API_KEY_HEADER, DATA_PATH, SCHEMA_PATH};
pub use fetcher::PageSource;
pub use pages::Pages;
pub use types::{parse_schema_columns, ColumnSpec, Row, DEFAULT_DECLARED_TYPE};
