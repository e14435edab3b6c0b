pub mod render;
pub mod span;
pub mod style;

pub use render::{Focus, FormView, Frame, StatusLine, render_form};
pub use span::{Span, SpanLine};
pub use style::{Color, Style};
