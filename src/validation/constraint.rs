use crate::core::value::FieldValue;
use time::Date;
use time::macros::format_description;

pub type ValidationError = String;

/// A single rule attached to a field in the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Value must be non-empty after trimming.
    Required { message: String },
    /// Value must be present and parse as a calendar date.
    RequiredDate {
        message: String,
        invalid_message: String,
    },
}

impl Constraint {
    pub fn required(message: impl Into<String>) -> Self {
        Self::Required {
            message: message.into(),
        }
    }

    pub fn required_date(message: impl Into<String>, invalid_message: impl Into<String>) -> Self {
        Self::RequiredDate {
            message: message.into(),
            invalid_message: invalid_message.into(),
        }
    }

    pub fn check(&self, value: &FieldValue) -> Result<(), ValidationError> {
        match self {
            Self::Required { message } => {
                if value.is_empty() {
                    Err(message.clone())
                } else {
                    Ok(())
                }
            }
            Self::RequiredDate {
                message,
                invalid_message,
            } => {
                if value.is_empty() {
                    return Err(message.clone());
                }
                match value.as_text() {
                    Some(text) if parse_date(text).is_some() => Ok(()),
                    _ => Err(invalid_message.clone()),
                }
            }
        }
    }
}

/// Run constraints in order, returning the first error.
pub fn run_constraints(constraints: &[Constraint], value: &FieldValue) -> Result<(), ValidationError> {
    for constraint in constraints {
        constraint.check(value)?;
    }
    Ok(())
}

pub fn parse_date(text: &str) -> Option<Date> {
    Date::parse(text.trim(), format_description!("[year]-[month]-[day]")).ok()
}
