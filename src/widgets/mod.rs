pub mod inputs;
pub mod traits;

pub use inputs::widget_for;
pub use traits::{DrawOutput, InteractionResult, RenderContext, Widget, WidgetAction};
