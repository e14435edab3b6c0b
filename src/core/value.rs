use crate::core::field::{FieldId, FieldKind};
use crate::error::ValueError;
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// Date as typed; the validation schema decides whether it parses.
    Date(String),
    Choice(Option<String>),
    Choices(Vec<String>),
    Flag(bool),
    /// Image-encoded signature (`data:` URL).
    Signature(Option<String>),
}

impl FieldValue {
    pub fn empty_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => Self::Text(String::new()),
            FieldKind::Date => Self::Date(String::new()),
            FieldKind::SingleChoice(_) => Self::Choice(None),
            FieldKind::MultiChoice(_) => Self::Choices(Vec::new()),
            FieldKind::Flag => Self::Flag(false),
            FieldKind::Signature => Self::Signature(None),
        }
    }

    /// Zero-length text and an unchecked flag both count as empty.
    /// Whitespace is content.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(v) | Self::Date(v) => v.is_empty(),
            Self::Choice(v) | Self::Signature(v) => v.as_deref().is_none_or(str::is_empty),
            Self::Choices(v) => v.is_empty(),
            Self::Flag(v) => !v,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) | Self::Date(v) => Some(v.as_str()),
            Self::Choice(v) | Self::Signature(v) => v.as_deref(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Flag(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Choices(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn fits(&self, kind: FieldKind) -> bool {
        matches!(
            (self, kind),
            (Self::Text(_), FieldKind::Text)
                | (Self::Date(_), FieldKind::Date)
                | (Self::Choice(_), FieldKind::SingleChoice(_))
                | (Self::Choices(_), FieldKind::MultiChoice(_))
                | (Self::Flag(_), FieldKind::Flag)
                | (Self::Signature(_), FieldKind::Signature)
        )
    }
}

/// Current value of every registry field. A key is never absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    values: IndexMap<FieldId, FieldValue>,
}

impl FormValues {
    pub fn new() -> Self {
        let values = FieldId::ALL
            .iter()
            .map(|id| (*id, FieldValue::empty_for(id.kind())))
            .collect();
        Self { values }
    }

    pub fn get(&self, id: FieldId) -> &FieldValue {
        &self.values[&id]
    }

    pub fn text(&self, id: FieldId) -> &str {
        self.get(id).as_text().unwrap_or("")
    }

    /// Replace a field's value. Returns whether the stored value changed.
    pub fn set(&mut self, id: FieldId, value: FieldValue) -> Result<bool, ValueError> {
        let descriptor = id.descriptor();
        if !value.fits(descriptor.kind) {
            return Err(ValueError::KindMismatch {
                field: descriptor.key,
                expected: descriptor.kind.name(),
            });
        }
        match &value {
            FieldValue::Choice(Some(option)) => check_option(id, option)?,
            FieldValue::Choices(options) => {
                for option in options {
                    check_option(id, option)?;
                }
            }
            _ => {}
        }

        let slot = &mut self.values[&id];
        if *slot == value {
            return Ok(false);
        }
        *slot = value;
        Ok(true)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &FieldValue)> {
        self.values.iter().map(|(id, value)| (*id, value))
    }

    /// Build values from a parsed document keyed by field key.
    ///
    /// Strings, booleans, lists and nulls are accepted where they fit the
    /// field kind; unknown keys are rejected.
    pub fn from_document(
        document: &IndexMap<String, serde_json::Value>,
    ) -> Result<Self, ValueError> {
        let mut values = Self::new();
        for (key, raw) in document {
            let id = FieldId::from_key(key).ok_or_else(|| ValueError::UnknownField(key.clone()))?;
            let value = value_from_json(id, raw)?;
            values.set(id, value)?;
        }
        Ok(values)
    }
}

impl Default for FormValues {
    fn default() -> Self {
        Self::new()
    }
}

fn check_option(id: FieldId, option: &str) -> Result<(), ValueError> {
    let descriptor = id.descriptor();
    if descriptor.has_option(option) {
        Ok(())
    } else {
        Err(ValueError::UnknownOption {
            field: descriptor.key,
            option: option.to_string(),
        })
    }
}

fn value_from_json(id: FieldId, raw: &serde_json::Value) -> Result<FieldValue, ValueError> {
    use serde_json::Value as Json;

    let kind = id.kind();
    let mismatch = || ValueError::KindMismatch {
        field: id.key(),
        expected: kind.name(),
    };

    let value = match (kind, raw) {
        (_, Json::Null) => FieldValue::empty_for(kind),
        (FieldKind::Text, Json::String(s)) => FieldValue::Text(s.clone()),
        (FieldKind::Text, Json::Number(n)) => FieldValue::Text(n.to_string()),
        (FieldKind::Date, Json::String(s)) => FieldValue::Date(s.clone()),
        (FieldKind::SingleChoice(_), Json::String(s)) => FieldValue::Choice(Some(s.clone())),
        (FieldKind::MultiChoice(_), Json::String(s)) => FieldValue::Choices(vec![s.clone()]),
        (FieldKind::MultiChoice(_), Json::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let Json::String(s) = item else {
                    return Err(mismatch());
                };
                out.push(s.clone());
            }
            FieldValue::Choices(out)
        }
        (FieldKind::Flag, Json::Bool(b)) => FieldValue::Flag(*b),
        (FieldKind::Signature, Json::String(s)) => FieldValue::Signature(Some(s.clone())),
        _ => return Err(mismatch()),
    };
    Ok(value)
}
