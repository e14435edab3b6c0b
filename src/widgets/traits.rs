use crate::core::field::FieldId;
use crate::core::value::FieldValue;
use crate::terminal::{CursorPos, KeyEvent, MouseButtonState};
use crate::ui::span::{Span, SpanLine};

// ---------------------------------------------------------------------------
// Render context & output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub focused: bool,
    /// Columns available to the widget body.
    pub width: u16,
}

#[derive(Debug, Clone, Default)]
pub struct DrawOutput {
    pub lines: Vec<SpanLine>,
    /// Cursor relative to the first line of `lines`.
    pub cursor: Option<CursorPos>,
}

impl DrawOutput {
    pub fn plain_lines(lines: Vec<String>) -> Self {
        Self {
            lines: lines.into_iter().map(|line| vec![Span::new(line)]).collect(),
            cursor: None,
        }
    }
}

// ---------------------------------------------------------------------------
// InteractionResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetAction {
    /// The user finished with this field (Enter).
    InputDone,
    /// Export the signature now and keep it with the form.
    SaveSignature,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionResult {
    pub handled: bool,
    pub value_changed: bool,
    pub actions: Vec<WidgetAction>,
}

impl InteractionResult {
    pub fn ignored() -> Self {
        Self::default()
    }

    pub fn handled() -> Self {
        Self {
            handled: true,
            ..Self::default()
        }
    }

    pub fn changed() -> Self {
        Self {
            handled: true,
            value_changed: true,
            actions: Vec::new(),
        }
    }

    pub fn with_action(action: WidgetAction) -> Self {
        Self {
            handled: true,
            value_changed: false,
            actions: vec![action],
        }
    }

    pub fn input_done() -> Self {
        Self::with_action(WidgetAction::InputDone)
    }

    pub fn handled_if(handled: bool) -> Self {
        if handled { Self::handled() } else { Self::ignored() }
    }

    pub fn changed_if(changed: bool) -> Self {
        if changed { Self::changed() } else { Self::ignored() }
    }
}

// ---------------------------------------------------------------------------
// Widget: one editor per registry field
// ---------------------------------------------------------------------------

pub trait Widget: Send {
    fn field(&self) -> FieldId;

    fn draw(&self, ctx: &RenderContext) -> DrawOutput;

    fn on_key(&mut self, key: KeyEvent) -> InteractionResult;

    /// Left-button mouse activity at `col`/`row` relative to the widget body.
    fn on_mouse(&mut self, _state: MouseButtonState, _col: u16, _row: u16) -> InteractionResult {
        InteractionResult::ignored()
    }

    fn value(&self) -> FieldValue;

    fn set_value(&mut self, value: &FieldValue);
}
