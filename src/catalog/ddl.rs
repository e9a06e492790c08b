//! DDL rendering for the staging and curated tables.
//!
//! Everything here is pure string building; execution lives in
//! [`PostgresCatalog`](super::PostgresCatalog).

use crate::datafetch::ColumnSpec;

/// Audit column appended to every staging table.
pub const AUDIT_COLUMN: &str = "raw_loaded_at";

/// Type used for declared labels that have no mapping.
pub const DEFAULT_PG_TYPE: &str = "TEXT";

/// Quote an identifier with double quotes, doubling any embedded quote.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal with single quotes, doubling any embedded quote.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `"schema"."table"`
pub fn qualified_name(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

/// Map a declared API type label to a PostgreSQL column type.
pub fn map_declared_type(label: &str) -> &'static str {
    match label.trim().to_lowercase().as_str() {
        "string" => "TEXT",
        "float" => "DOUBLE PRECISION",
        "decimal" => "NUMERIC(12,2)",
        "int" | "integer" => "BIGINT",
        "bool" | "boolean" => "BOOLEAN",
        "date" => "DATE",
        "datetime" | "timestamp" => "TIMESTAMPTZ",
        "time" => "TIME",
        _ => DEFAULT_PG_TYPE,
    }
}

/// Name of the primary key constraint added to the curated table.
pub fn primary_key_constraint(table: &str) -> String {
    format!("pk_{}", table)
}

pub fn build_schemas_ddl(staging_schema: &str, core_schema: &str) -> Vec<String> {
    let mut statements = vec![format!(
        "CREATE SCHEMA IF NOT EXISTS {};",
        quote_ident(staging_schema)
    )];
    if core_schema != staging_schema {
        statements.push(format!(
            "CREATE SCHEMA IF NOT EXISTS {};",
            quote_ident(core_schema)
        ));
    }
    statements
}

/// All-text landing table. Nothing is rejected on type grounds here.
pub fn build_staging_ddl(schema: &str, table: &str, columns: &[ColumnSpec]) -> String {
    let mut cols: Vec<String> = columns
        .iter()
        .map(|c| format!("  {} TEXT", quote_ident(&c.name)))
        .collect();
    cols.push(format!("  {} TIMESTAMPTZ DEFAULT now()", AUDIT_COLUMN));

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
        qualified_name(schema, table),
        cols.join(",\n")
    )
}

/// Typed curated table, with a guarded primary key block when `primary_key`
/// is set. The guard makes repeated runs a no-op.
pub fn build_core_ddl(
    schema: &str,
    table: &str,
    columns: &[ColumnSpec],
    primary_key: Option<&str>,
) -> String {
    let cols: Vec<String> = columns
        .iter()
        .map(|c| {
            format!(
                "  {} {}",
                quote_ident(&c.name),
                map_declared_type(&c.declared_type)
            )
        })
        .collect();

    let qualified = qualified_name(schema, table);
    let mut ddl = format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
        qualified,
        cols.join(",\n")
    );

    if let Some(pk) = primary_key {
        let constraint = primary_key_constraint(table);
        ddl.push_str(&format!(
            r#"
DO $$
BEGIN
    IF NOT EXISTS (
        SELECT 1
        FROM pg_constraint
        WHERE conname = {literal}
    ) THEN
        ALTER TABLE {qualified}
        ADD CONSTRAINT {constraint} PRIMARY KEY ({pk});
    END IF;
END$$;"#,
            literal = quote_literal(&constraint),
            qualified = qualified,
            constraint = quote_ident(&constraint),
            pk = quote_ident(pk),
        ));
    }

    ddl
}
