pub mod catalog;
pub mod coerce;
pub mod config;
pub mod datafetch;
pub mod error;
pub mod ingest;
pub mod pipeline;

pub use error::IngestError;
