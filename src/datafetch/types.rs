use serde::Deserialize;
use serde_json::{Map, Value};

/// One record from a `/dados` page.
pub type Row = Map<String, Value>;

/// Declared type used when the schema omits one.
pub const DEFAULT_DECLARED_TYPE: &str = "string";

/// A column as announced by the remote schema endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub declared_type: String,
}

#[derive(Debug, Deserialize)]
struct WireColumn {
    name: String,
    #[serde(rename = "type", default)]
    declared_type: Option<Value>,
}

impl From<WireColumn> for ColumnSpec {
    fn from(wire: WireColumn) -> Self {
        let declared_type = match wire.declared_type {
            None | Some(Value::Null) => DEFAULT_DECLARED_TYPE.to_string(),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        };
        ColumnSpec {
            name: wire.name,
            declared_type,
        }
    }
}

/// Extract the column list from a schema response body.
///
/// Returns `None` when the body has no list-valued `columns` field or an entry
/// lacks a string `name`.
pub fn parse_schema_columns(body: &Value) -> Option<Vec<ColumnSpec>> {
    let columns = body.get("columns")?.as_array()?;
    columns
        .iter()
        .map(|c| {
            serde_json::from_value::<WireColumn>(c.clone())
                .ok()
                .map(ColumnSpec::from)
        })
        .collect()
}
