pub mod form;

pub use form::{ErrorVisibility, FieldStatus, FormController, SubmitBlocked, SubmitGate};
