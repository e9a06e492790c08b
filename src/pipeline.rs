//! The two jobs of the tool, wired from an [`AppConfig`].

use tracing::info;

use crate::catalog::ddl::qualified_name;
use crate::catalog::PostgresCatalog;
use crate::config::AppConfig;
use crate::datafetch::{ApiClient, Pages, SCHEMA_PATH};
use crate::error::{IngestError, Result};
use crate::ingest::{build_insert_sql, IngestionResult, Ingestor, PgRowSink};

/// Read the remote schema and create the staging and curated tables.
pub async fn create_tables(config: &AppConfig) -> Result<()> {
    let api = ApiClient::new(&config.api)?;

    info!("Reading schema from {}{}", config.api.base_url, SCHEMA_PATH);
    let columns = api.fetch_schema().await?;
    if columns.is_empty() {
        return Err(IngestError::EmptySchema);
    }

    info!("{} columns found:", columns.len());
    for c in &columns {
        info!("  - {} ({})", c.name, c.declared_type);
    }

    info!("Connecting to Postgres");
    let mut catalog = PostgresCatalog::connect(&config.database.dsn).await?;
    catalog.create_tables(config, &columns).await?;

    let table = &config.table.name;
    info!(
        "Staging: {}",
        qualified_name(&config.database.staging_schema, table)
    );
    info!(
        "Curated: {}",
        qualified_name(&config.database.target_schema, table)
    );
    if let Some(pk) = &config.table.primary_key {
        info!("Primary key: {}", pk);
    }

    Ok(())
}

/// Stream every page of `/dados` into the curated table.
pub async fn ingest(config: &AppConfig) -> Result<IngestionResult> {
    let schema = &config.database.target_schema;
    let table = &config.table.name;

    info!("Connecting to Postgres");
    let mut catalog = PostgresCatalog::connect(&config.database.dsn).await?;
    let descriptor = catalog.describe_table(schema, table).await?;

    let ingestor = Ingestor::new(&descriptor);
    let sql = build_insert_sql(schema, table, &descriptor);

    info!("Target table: {}", qualified_name(schema, table));
    info!(
        "Inserted columns ({}): {:?}",
        ingestor.column_names().len(),
        ingestor.column_names()
    );
    info!("Duplicates are allowed (no ON CONFLICT)");

    let api = ApiClient::new(&config.api)?;
    let mut pages = Pages::new(&api, config.api.page_size);
    let mut sink = PgRowSink::new(catalog.connection(), sql);

    let result = ingestor.run(&mut pages, &mut sink).await?;

    info!("Ingestion finished");
    info!("  Inserted : {}", result.inserted);
    info!("  Failed   : {}", result.failed);
    info!("  Processed: {}", result.total);

    Ok(result)
}
