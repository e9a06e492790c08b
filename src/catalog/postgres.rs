//! PostgreSQL destination catalog: schema/table creation and introspection.

use std::fmt::{self, Debug, Formatter};

use sqlx::postgres::PgConnection;
use sqlx::{Connection, Row};
use tracing::info;

use super::ddl::{build_core_ddl, build_schemas_ddl, build_staging_ddl, qualified_name};
use super::TableDescriptor;
use crate::config::AppConfig;
use crate::datafetch::ColumnSpec;
use crate::error::{IngestError, Result};

pub struct PostgresCatalog {
    conn: PgConnection,
}

impl PostgresCatalog {
    /// Open a single connection and pin the session time zone to UTC.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let mut conn = PgConnection::connect(dsn).await?;
        sqlx::raw_sql("SET TIME ZONE 'UTC'")
            .execute(&mut conn)
            .await?;
        Ok(Self { conn })
    }

    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }

    /// Create both schemas, the staging table and the curated table in one
    /// transaction.
    pub async fn create_tables(&mut self, config: &AppConfig, columns: &[ColumnSpec]) -> Result<()> {
        let db = &config.database;
        let table = &config.table.name;

        let staging_ddl = build_staging_ddl(&db.staging_schema, table, columns);
        let core_ddl = build_core_ddl(
            &db.target_schema,
            table,
            columns,
            config.table.primary_key.as_deref(),
        );

        let mut tx = self.conn.begin().await?;

        for statement in build_schemas_ddl(&db.staging_schema, &db.target_schema) {
            sqlx::raw_sql(&statement).execute(&mut *tx).await?;
        }

        info!("Creating/validating staging table");
        sqlx::raw_sql(&staging_ddl).execute(&mut *tx).await?;

        info!("Creating/validating curated table");
        sqlx::raw_sql(&core_ddl).execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Read the live column list of `schema.table` in physical order.
    pub async fn describe_table(&mut self, schema: &str, table: &str) -> Result<TableDescriptor> {
        let rows = sqlx::query(
            r#"
            SELECT
                column_name::text,
                data_type::text,
                format('%I.%I', udt_schema, udt_name) AS cast_type,
                (is_identity = 'YES' OR is_generated = 'ALWAYS') AS is_identity
            FROM information_schema.columns
            WHERE table_schema = $1 AND table_name = $2
            ORDER BY ordinal_position
            "#,
        )
        .bind(schema)
        .bind(table)
        .fetch_all(&mut self.conn)
        .await?;

        let mut descriptor = TableDescriptor::default();
        for row in rows {
            let name: String = row.get(0);
            let data_type: String = row.get(1);
            let cast_type: String = row.get(2);
            let is_identity: Option<bool> = row.get(3);
            descriptor.push_column(name, data_type, cast_type, is_identity.unwrap_or(false));
        }

        if descriptor.is_empty() {
            return Err(IngestError::TableNotFound(qualified_name(schema, table)));
        }

        Ok(descriptor)
    }
}

impl Debug for PostgresCatalog {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresCatalog")
            .field("conn", &"<PgConnection>")
            .finish()
    }
}
