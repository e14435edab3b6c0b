pub mod field;
pub mod value;

pub use field::{ChoiceOption, FIELDS, FieldDescriptor, FieldId, FieldKind};
pub use value::{FieldValue, FormValues};
