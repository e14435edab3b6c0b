use crate::core::field::FieldId;
use crate::core::value::{FieldValue, FormValues};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Value as Json, json};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadOptions {
    /// SharePoint list item entity type, e.g. `SP.Data.ConsentsListItem`.
    /// Emitted as `__metadata.type` when set.
    pub list_item_type: Option<String>,
}

/// Body of one list write, keyed by external column name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SubmissionPayload {
    columns: IndexMap<String, Json>,
}

impl SubmissionPayload {
    /// Map every registry field onto its list column.
    pub fn from_values(values: &FormValues, options: &PayloadOptions) -> Self {
        let mut columns = IndexMap::new();
        if let Some(item_type) = &options.list_item_type {
            columns.insert("__metadata".to_string(), json!({ "type": item_type }));
        }
        for id in FieldId::ALL {
            let column = id.descriptor().column;
            columns.insert(column.to_string(), column_value(values.get(id)));
        }
        Self { columns }
    }

    pub fn get(&self, column: &str) -> Option<&Json> {
        self.columns.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn column_value(value: &FieldValue) -> Json {
    match value {
        FieldValue::Text(text) | FieldValue::Date(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Json::Null
            } else {
                Json::String(trimmed.to_string())
            }
        }
        FieldValue::Choice(choice) | FieldValue::Signature(choice) => match choice {
            Some(text) if !text.is_empty() => Json::String(text.clone()),
            _ => Json::Null,
        },
        FieldValue::Choices(items) => {
            if items.is_empty() {
                Json::Null
            } else {
                Json::String(items.join(", "))
            }
        }
        FieldValue::Flag(flag) => Json::Bool(*flag),
    }
}
