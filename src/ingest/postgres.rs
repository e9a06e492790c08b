use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgConnection};
use sqlx::query::Query;
use sqlx::{Connection, Postgres};

use super::RowSink;
use crate::catalog::ddl::{qualified_name, quote_ident};
use crate::catalog::TableDescriptor;
use crate::coerce::SqlValue;
use crate::error::{IngestError, Result};

/// Single-row INSERT for the insertable columns of `table`, in table order.
///
/// Every placeholder is cast to the column's qualified catalog type (enums,
/// arrays and domains included) so raw-text fallbacks are parsed by the
/// server. Duplicates are accepted: there is no conflict clause.
pub fn build_insert_sql(schema: &str, table_name: &str, table: &TableDescriptor) -> String {
    let target = qualified_name(schema, table_name);
    let columns = table.insertable_columns();

    if columns.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES", target);
    }

    let names: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    let placeholders: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("CAST(${} AS {})", i + 1, table.cast_type(c)))
        .collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        target,
        names.join(", "),
        placeholders.join(", ")
    )
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &'q SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Float(f) => query.bind(*f),
        SqlValue::Decimal(d) => query.bind(*d),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Text(s) => query.bind(s.as_str()),
    }
}

/// Inserts each row in its own transaction on a borrowed connection.
pub struct PgRowSink<'c> {
    conn: &'c mut PgConnection,
    sql: String,
}

impl<'c> PgRowSink<'c> {
    pub fn new(conn: &'c mut PgConnection, sql: String) -> Self {
        Self { conn, sql }
    }
}

#[async_trait]
impl RowSink for PgRowSink<'_> {
    async fn insert_row(&mut self, row: u64, params: &[SqlValue]) -> Result<()> {
        // Parameter types change from row to row, so the statement is not
        // cached server-side.
        let mut query = sqlx::query(&self.sql).persistent(false);
        for value in params {
            query = bind_value(query, value);
        }

        let mut tx = self.conn.begin().await?;

        if let Err(e) = query.execute(&mut *tx).await {
            tx.rollback().await?;
            return Err(IngestError::RowInsert {
                row,
                message: e.to_string(),
            });
        }

        tx.commit().await.map_err(|e| IngestError::RowInsert {
            row,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_sql_lists_insertable_columns_in_order() {
        let mut table = TableDescriptor::default();
        table.push_column("id".into(), "bigint".into(), "pg_catalog.int8".into(), true);
        table.push_column("Name".into(), "text".into(), "pg_catalog.text".into(), false);
        table.push_column(
            "amount".into(),
            "numeric".into(),
            "pg_catalog.\"numeric\"".into(),
            false,
        );
        table.push_column("tags".into(), "ARRAY".into(), "pg_catalog._int4".into(), false);
        table.push_column("mood".into(), "USER-DEFINED".into(), "public.mood".into(), false);
        table.push_column(
            "raw_loaded_at".into(),
            "timestamp with time zone".into(),
            "pg_catalog.timestamptz".into(),
            false,
        );

        let sql = build_insert_sql("core", "sales", &table);

        assert_eq!(
            sql,
            "INSERT INTO \"core\".\"sales\" (\"Name\", \"amount\", \"tags\", \"mood\") VALUES \
             (CAST($1 AS pg_catalog.text), CAST($2 AS pg_catalog.\"numeric\"), \
             CAST($3 AS pg_catalog._int4), CAST($4 AS public.mood))"
        );
        assert!(!sql.contains("ON CONFLICT"));
    }

    #[test]
    fn test_insert_sql_with_nothing_insertable() {
        let mut table = TableDescriptor::default();
        table.push_column("id".into(), "bigint".into(), "pg_catalog.int8".into(), true);

        assert_eq!(
            build_insert_sql("core", "t", &table),
            "INSERT INTO \"core\".\"t\" DEFAULT VALUES"
        );
    }
}
