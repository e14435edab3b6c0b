use crate::core::field::FieldId;
use crate::core::value::{FieldValue, FormValues};
use crate::error::ValueError;
use crate::validation::{FieldErrors, ValidationSchema};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    Pristine,
    TouchedValid,
    TouchedInvalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorVisibility {
    Hidden,
    Inline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitGate {
    #[default]
    Ready,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitBlocked {
    /// A submission from this form is still in flight.
    InFlight,
    /// At least one field fails validation.
    Invalid(FieldErrors),
}

/// Owns the form's values, which fields the user has touched, the current
/// validation errors and the Ready/Submitting gate.
pub struct FormController {
    schema: ValidationSchema,
    values: FormValues,
    errors: FieldErrors,
    touched: HashSet<FieldId>,
    submit_attempted: bool,
    gate: SubmitGate,
}

impl FormController {
    pub fn new(schema: ValidationSchema) -> Self {
        let values = FormValues::new();
        let errors = schema.validate(&values);
        Self {
            schema,
            values,
            errors,
            touched: HashSet::new(),
            submit_attempted: false,
            gate: SubmitGate::Ready,
        }
    }

    /// Seed the form with prefilled values. Fields stay pristine.
    pub fn with_values(mut self, values: FormValues) -> Self {
        self.values = values;
        self.revalidate();
        self
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn gate(&self) -> SubmitGate {
        self.gate
    }

    pub fn is_submitting(&self) -> bool {
        self.gate == SubmitGate::Submitting
    }

    pub fn submit_attempted(&self) -> bool {
        self.submit_attempted
    }

    /// Whether the schema carries any rule for `id`.
    pub fn is_required(&self, id: FieldId) -> bool {
        !self.schema.rules_for(id).is_empty()
    }

    /// Store a new value, mark the field touched and recompute errors.
    /// Returns whether the value changed.
    pub fn set_value(&mut self, id: FieldId, value: FieldValue) -> Result<bool, ValueError> {
        let changed = self.values.set(id, value)?;
        self.touched.insert(id);
        if changed {
            self.revalidate();
        }
        Ok(changed)
    }

    pub fn blur(&mut self, id: FieldId) {
        self.touched.insert(id);
    }

    pub fn attach_signature(&mut self, signature: Option<String>) {
        let value = FieldValue::Signature(signature);
        // Signature values always fit their own field.
        if let Ok(true) = self.values.set(FieldId::Signature, value) {
            self.touched.insert(FieldId::Signature);
            self.revalidate();
        }
    }

    pub fn field_status(&self, id: FieldId) -> FieldStatus {
        if !self.touched.contains(&id) {
            FieldStatus::Pristine
        } else if self.errors.contains(id) {
            FieldStatus::TouchedInvalid
        } else {
            FieldStatus::TouchedValid
        }
    }

    pub fn error_visibility(&self, id: FieldId) -> Option<ErrorVisibility> {
        if !self.errors.contains(id) {
            return None;
        }
        if self.submit_attempted || self.touched.contains(&id) {
            Some(ErrorVisibility::Inline)
        } else {
            Some(ErrorVisibility::Hidden)
        }
    }

    /// The error to render next to a field, if the user should see it yet.
    pub fn visible_error(&self, id: FieldId) -> Option<&str> {
        match self.error_visibility(id) {
            Some(ErrorVisibility::Inline) => self.errors.get(id),
            _ => None,
        }
    }

    /// Check the gate and the schema, then freeze the current values for
    /// the pipeline. On success the form is Submitting until
    /// [`finish_submit`](Self::finish_submit).
    pub fn begin_submit(&mut self) -> Result<FormValues, SubmitBlocked> {
        if self.gate == SubmitGate::Submitting {
            return Err(SubmitBlocked::InFlight);
        }

        self.submit_attempted = true;
        self.touched.extend(FieldId::ALL);
        self.revalidate();
        if !self.errors.is_empty() {
            return Err(SubmitBlocked::Invalid(self.errors.clone()));
        }

        self.gate = SubmitGate::Submitting;
        Ok(self.values.clone())
    }

    pub fn finish_submit(&mut self) {
        self.gate = SubmitGate::Ready;
    }

    fn revalidate(&mut self) {
        self.errors = self.schema.validate(&self.values);
    }
}
