pub mod checkbox;
pub mod choice;
pub mod multi_choice;
pub mod signature;
pub mod text;
pub mod text_edit;

use crate::core::field::{FieldDescriptor, FieldKind};
use crate::widgets::traits::Widget;

pub use checkbox::CheckboxInput;
pub use choice::ChoiceInput;
pub use multi_choice::MultiChoiceInput;
pub use signature::SignatureInput;
pub use text::TextInput;

/// The editor used for a registry field.
pub fn widget_for(descriptor: &FieldDescriptor) -> Box<dyn Widget> {
    let id = descriptor.id;
    match descriptor.kind {
        FieldKind::Text | FieldKind::Date => Box::new(TextInput::new(id)),
        FieldKind::SingleChoice(_) => Box::new(ChoiceInput::new(id)),
        FieldKind::MultiChoice(_) => Box::new(MultiChoiceInput::new(id)),
        FieldKind::Flag => Box::new(CheckboxInput::new(id)),
        FieldKind::Signature => Box::new(SignatureInput::new(id)),
    }
}
