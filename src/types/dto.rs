use serde::{Deserialize, Serialize};

/// Tabular result of a table read or a `SELECT`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableDataResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub is_successful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl TableDataResponse {
    pub fn success(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            columns,
            rows,
            is_successful: true,
            error_message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            is_successful: false,
            error_message: Some(message.into()),
        }
    }
}

/// Listing or acknowledgement: target names, table names, exec results.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenericResponse {
    pub rows: Vec<String>,
    pub is_successful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl GenericResponse {
    pub fn success(rows: Vec<String>) -> Self {
        Self {
            rows,
            is_successful: true,
            error_message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            rows: Vec::new(),
            is_successful: false,
            error_message: Some(message.into()),
        }
    }
}

/// One cell to update, addressed by the row's primary key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RowUpdateRequest {
    pub column_name: String,
    pub column_value: String,
    pub primary_key_column_name: String,
    pub primary_key_column_value: String,
    #[serde(default)]
    pub column_type: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRowResponse {
    pub is_successful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl UpdateRowResponse {
    pub fn success() -> Self {
        Self {
            is_successful: true,
            error_message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_successful: false,
            error_message: Some(message.into()),
        }
    }
}

/// Declared SQL type of the value carried by a [`RowUpdateRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Boolean,
    Text,
}

impl ColumnType {
    /// Case-insensitive; unknown names fall back to `Text`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" | "long" => ColumnType::Integer,
            "real" | "float" | "double" => ColumnType::Real,
            "boolean" | "bool" => ColumnType::Boolean,
            _ => ColumnType::Text,
        }
    }
}
