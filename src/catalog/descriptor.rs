use std::collections::{HashMap, HashSet};

use super::ddl::AUDIT_COLUMN;

/// Live shape of a destination table, as read from the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableDescriptor {
    /// Column names in physical order.
    pub columns: Vec<String>,
    /// Identity or generated columns. The database fills these in.
    pub identity_columns: HashSet<String>,
    /// Column name to `information_schema` data type (`bigint`, `numeric`, ...).
    pub column_types: HashMap<String, String>,
    /// Column name to the qualified type name used to cast insert parameters.
    pub cast_types: HashMap<String, String>,
}

impl TableDescriptor {
    pub fn push_column(
        &mut self,
        name: String,
        data_type: String,
        cast_type: String,
        is_identity: bool,
    ) {
        if is_identity {
            self.identity_columns.insert(name.clone());
        }
        self.cast_types.insert(name.clone(), cast_type);
        self.column_types.insert(name.clone(), data_type);
        self.columns.push(name);
    }

    /// Columns the ingestor writes, in table order.
    pub fn insertable_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| !self.identity_columns.contains(*c) && c.as_str() != AUDIT_COLUMN)
            .map(String::as_str)
            .collect()
    }

    /// Catalog type of `column`, empty when unknown.
    pub fn column_type(&self, column: &str) -> &str {
        self.column_types.get(column).map(String::as_str).unwrap_or("")
    }

    /// Qualified type name of `column`, empty when unknown.
    pub fn cast_type(&self, column: &str) -> &str {
        self.cast_types.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
