pub mod constraint;

pub use constraint::{Constraint, ValidationError, parse_date, run_constraints};

use crate::core::field::FieldId;
use crate::core::value::FormValues;
use indexmap::IndexMap;

/// Per-field validation failures. A field is present only while it fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: IndexMap<FieldId, ValidationError>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, id: FieldId) -> Option<&str> {
        self.errors.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: FieldId) -> bool {
        self.errors.contains_key(&id)
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.errors.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &str)> {
        self.errors.iter().map(|(id, msg)| (*id, msg.as_str()))
    }
}

/// Declarative mapping from field to its constraints. Rules are independent;
/// no rule looks at another field's value.
#[derive(Debug, Clone, Default)]
pub struct ValidationSchema {
    rules: IndexMap<FieldId, Vec<Constraint>>,
}

impl ValidationSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules of the patient consent form. The signature is deliberately
    /// left optional.
    pub fn consent_form() -> Self {
        let mut schema = Self::new();
        for id in [
            FieldId::Address,
            FieldId::City,
            FieldId::FirstName,
            FieldId::LastName,
            FieldId::PhoneNumber,
            FieldId::PostalCode,
            FieldId::Province,
            FieldId::PublicHealthCardNumber,
        ] {
            schema = schema.with_rule(id, Constraint::required(format!("{} is required", id.label())));
        }
        schema.with_rule(
            FieldId::DateOfBirth,
            Constraint::required_date(
                "Date of Birth is required",
                "Date of Birth must be a valid date",
            ),
        )
    }

    pub fn with_rule(mut self, id: FieldId, constraint: Constraint) -> Self {
        self.rules.entry(id).or_default().push(constraint);
        self
    }

    pub fn rules_for(&self, id: FieldId) -> &[Constraint] {
        self.rules.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn validate_field(&self, id: FieldId, values: &FormValues) -> Option<ValidationError> {
        run_constraints(self.rules_for(id), values.get(id)).err()
    }

    /// Errors for exactly the fields whose current value breaks a rule,
    /// in registry order.
    pub fn validate(&self, values: &FormValues) -> FieldErrors {
        let errors = FieldId::ALL
            .iter()
            .filter_map(|id| self.validate_field(*id, values).map(|err| (*id, err)))
            .collect();
        FieldErrors { errors }
    }
}

#[cfg(test)]
mod tests {
    use super::{Constraint, ValidationSchema};
    use crate::core::field::FieldId;
    use crate::core::value::{FieldValue, FormValues};

    const REQUIRED: [FieldId; 9] = [
        FieldId::Address,
        FieldId::City,
        FieldId::DateOfBirth,
        FieldId::FirstName,
        FieldId::LastName,
        FieldId::PhoneNumber,
        FieldId::PostalCode,
        FieldId::Province,
        FieldId::PublicHealthCardNumber,
    ];

    fn filled() -> FormValues {
        let mut values = FormValues::new();
        for id in REQUIRED {
            let value = if id == FieldId::DateOfBirth {
                FieldValue::Date("1990-05-17".into())
            } else {
                FieldValue::Text(format!("{} value", id.key()))
            };
            values.set(id, value).expect("fits");
        }
        values
    }

    #[test]
    fn empty_form_fails_every_required_field() {
        let errors = ValidationSchema::consent_form().validate(&FormValues::new());
        assert_eq!(errors.len(), REQUIRED.len());
        for id in REQUIRED {
            assert!(errors.contains(id), "{id} should fail");
        }
        assert_eq!(errors.get(FieldId::FirstName), Some("First Name is required"));
        assert!(!errors.contains(FieldId::Signature));
    }

    #[test]
    fn each_empty_required_field_yields_exactly_its_own_error() {
        let schema = ValidationSchema::consent_form();
        for id in REQUIRED {
            let mut values = filled();
            let empty = FieldValue::empty_for(id.kind());
            values.set(id, empty).expect("fits");

            let errors = schema.validate(&values);
            assert_eq!(errors.len(), 1, "only {id} should fail");
            assert!(errors.contains(id));
        }
    }

    #[test]
    fn valid_values_produce_no_errors() {
        let errors = ValidationSchema::consent_form().validate(&filled());
        assert!(errors.is_empty());
    }

    #[test]
    fn whitespace_only_text_satisfies_required() {
        let mut values = filled();
        values
            .set(FieldId::FirstName, FieldValue::Text("   ".into()))
            .expect("fits");
        let errors = ValidationSchema::consent_form().validate(&values);
        assert_eq!(errors.get(FieldId::FirstName), None);
        assert!(errors.is_empty());
    }

    #[test]
    fn bad_birth_date_reports_invalid_message() {
        let mut values = filled();
        values
            .set(FieldId::DateOfBirth, FieldValue::Date("1990-13-01".into()))
            .expect("fits");
        let errors = ValidationSchema::consent_form().validate(&values);
        assert_eq!(
            errors.get(FieldId::DateOfBirth),
            Some("Date of Birth must be a valid date")
        );
    }

    #[test]
    fn with_rule_extends_schema() {
        let schema = ValidationSchema::new()
            .with_rule(FieldId::Signature, Constraint::required("Signature is required"));
        let errors = schema.validate(&FormValues::new());
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![FieldId::Signature]);
    }
}
