use crate::core::field::FieldId;
use crate::core::value::FieldValue;
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::Span;
use crate::ui::style::{Color, Style};
use crate::widgets::traits::{DrawOutput, InteractionResult, RenderContext, Widget};

pub struct CheckboxInput {
    field: FieldId,
    checked: bool,
}

impl CheckboxInput {
    pub fn new(field: FieldId) -> Self {
        Self {
            field,
            checked: false,
        }
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }
}

impl Widget for CheckboxInput {
    fn field(&self) -> FieldId {
        self.field
    }

    fn draw(&self, ctx: &RenderContext) -> DrawOutput {
        let (symbol, style) = if self.checked {
            ("[✓] Yes", Style::new().color(Color::Green))
        } else {
            ("[ ] No", Style::new().color(Color::DarkGrey))
        };
        let style = if ctx.focused { style.bold() } else { style };

        DrawOutput {
            lines: vec![vec![Span::styled(symbol, style)]],
            cursor: None,
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        match key.code {
            KeyCode::Char(' ') => {
                self.checked = !self.checked;
                InteractionResult::changed()
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let changed = !self.checked;
                self.checked = true;
                InteractionResult::changed_if(changed)
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                let changed = self.checked;
                self.checked = false;
                InteractionResult::changed_if(changed)
            }
            KeyCode::Enter => InteractionResult::input_done(),
            _ => InteractionResult::ignored(),
        }
    }

    fn value(&self) -> FieldValue {
        FieldValue::Flag(self.checked)
    }

    fn set_value(&mut self, value: &FieldValue) {
        if let Some(flag) = value.as_bool() {
            self.checked = flag;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CheckboxInput;
    use crate::core::field::FieldId;
    use crate::core::value::FieldValue;
    use crate::terminal::{KeyCode, KeyEvent};
    use crate::widgets::traits::Widget;

    #[test]
    fn space_toggles_and_letters_set() {
        let mut input = CheckboxInput::new(FieldId::VerbalConsent);
        assert!(input.on_key(KeyEvent::plain(KeyCode::Char(' '))).value_changed);
        assert_eq!(input.value(), FieldValue::Flag(true));

        assert!(!input.on_key(KeyEvent::plain(KeyCode::Char('y'))).value_changed);
        assert!(input.on_key(KeyEvent::plain(KeyCode::Char('n'))).value_changed);
        assert!(!input.is_checked());
    }
}
