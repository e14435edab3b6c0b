use super::choice::option_lines;
use crate::core::field::{ChoiceOption, FieldId};
use crate::core::value::FieldValue;
use crate::terminal::{KeyCode, KeyEvent};
use crate::widgets::traits::{DrawOutput, InteractionResult, RenderContext, Widget};

/// Checkbox group: any subset of the options.
pub struct MultiChoiceInput {
    field: FieldId,
    options: &'static [ChoiceOption],
    highlighted: usize,
    checked: Vec<bool>,
}

impl MultiChoiceInput {
    pub fn new(field: FieldId) -> Self {
        let options = field.kind().options();
        Self {
            field,
            options,
            highlighted: 0,
            checked: vec![false; options.len()],
        }
    }

    pub fn checked_values(&self) -> Vec<String> {
        self.options
            .iter()
            .zip(&self.checked)
            .filter(|(_, checked)| **checked)
            .map(|(opt, _)| opt.value.to_string())
            .collect()
    }

    fn toggle_highlighted(&mut self) -> bool {
        match self.checked.get_mut(self.highlighted) {
            Some(flag) => {
                *flag = !*flag;
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) -> bool {
        let had_any = self.checked.iter().any(|flag| *flag);
        self.checked.iter_mut().for_each(|flag| *flag = false);
        had_any
    }
}

impl Widget for MultiChoiceInput {
    fn field(&self) -> FieldId {
        self.field
    }

    fn draw(&self, ctx: &RenderContext) -> DrawOutput {
        DrawOutput {
            lines: option_lines(
                self.options,
                &self.checked,
                self.highlighted,
                ctx.focused,
                "[x]",
                "[ ]",
            ),
            cursor: None,
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        let len = self.options.len();
        if len == 0 {
            return InteractionResult::ignored();
        }
        match key.code {
            KeyCode::Left | KeyCode::Up => {
                self.highlighted = (self.highlighted + len - 1) % len;
                InteractionResult::handled()
            }
            KeyCode::Right | KeyCode::Down => {
                self.highlighted = (self.highlighted + 1) % len;
                InteractionResult::handled()
            }
            KeyCode::Char(' ') => InteractionResult::changed_if(self.toggle_highlighted()),
            KeyCode::Backspace | KeyCode::Delete => InteractionResult::changed_if(self.clear()),
            KeyCode::Enter => InteractionResult::input_done(),
            _ => InteractionResult::ignored(),
        }
    }

    fn value(&self) -> FieldValue {
        FieldValue::Choices(self.checked_values())
    }

    fn set_value(&mut self, value: &FieldValue) {
        if let Some(values) = value.as_list() {
            self.checked = self
                .options
                .iter()
                .map(|opt| values.iter().any(|v| v == opt.value))
                .collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MultiChoiceInput;
    use crate::core::field::FieldId;
    use crate::core::value::FieldValue;
    use crate::terminal::{KeyCode, KeyEvent};
    use crate::ui::span::line_text;
    use crate::widgets::traits::{RenderContext, Widget};

    #[test]
    fn space_toggles_each_option_independently() {
        let mut input = MultiChoiceInput::new(FieldId::BestTimeToCall);
        input.on_key(KeyEvent::plain(KeyCode::Char(' ')));
        input.on_key(KeyEvent::plain(KeyCode::Right));
        input.on_key(KeyEvent::plain(KeyCode::Right));
        input.on_key(KeyEvent::plain(KeyCode::Char(' ')));
        assert_eq!(
            input.value(),
            FieldValue::Choices(vec!["morning".into(), "evening".into()])
        );

        input.on_key(KeyEvent::plain(KeyCode::Char(' ')));
        assert_eq!(input.value(), FieldValue::Choices(vec!["morning".into()]));
    }

    #[test]
    fn values_come_back_in_option_order() {
        let mut input = MultiChoiceInput::new(FieldId::BestTimeToCall);
        input.set_value(&FieldValue::Choices(vec!["evening".into(), "noon".into()]));
        assert_eq!(input.checked_values(), vec!["noon", "evening"]);

        let out = input.draw(&RenderContext {
            focused: false,
            width: 60,
        });
        assert_eq!(
            line_text(&out.lines[0]),
            "[ ] Morning   [x] Noon   [x] Evening"
        );
    }

    #[test]
    fn backspace_clears_all() {
        let mut input = MultiChoiceInput::new(FieldId::BestTimeToCall);
        input.set_value(&FieldValue::Choices(vec!["noon".into()]));
        assert!(input.on_key(KeyEvent::plain(KeyCode::Backspace)).value_changed);
        assert!(input.value().is_empty());
        assert!(!input.on_key(KeyEvent::plain(KeyCode::Backspace)).handled);
    }
}
