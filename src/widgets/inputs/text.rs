use super::text_edit;
use crate::core::field::{FieldId, FieldKind};
use crate::core::value::FieldValue;
use crate::terminal::{CursorPos, KeyCode, KeyEvent, KeyModifiers};
use crate::ui::span::Span;
use crate::ui::style::{Color, Style};
use crate::widgets::traits::{DrawOutput, InteractionResult, RenderContext, Widget};
use unicode_width::UnicodeWidthChar;

pub const DATE_PLACEHOLDER: &str = "YYYY-MM-DD";

/// Single-line editor for text and date fields.
pub struct TextInput {
    field: FieldId,
    value: String,
    cursor: usize,
    placeholder: Option<String>,
}

impl TextInput {
    pub fn new(field: FieldId) -> Self {
        let placeholder = match field.kind() {
            FieldKind::Date => Some(DATE_PLACEHOLDER.to_string()),
            _ => None,
        };
        Self {
            field,
            value: String::new(),
            cursor: 0,
            placeholder,
        }
    }

    pub fn text(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn cursor_col(&self) -> u16 {
        let width: usize = self
            .value
            .chars()
            .take(self.cursor)
            .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
            .sum();
        u16::try_from(width).unwrap_or(u16::MAX)
    }
}

impl Widget for TextInput {
    fn field(&self) -> FieldId {
        self.field
    }

    fn draw(&self, ctx: &RenderContext) -> DrawOutput {
        let line = match &self.placeholder {
            Some(ph) if self.value.is_empty() => {
                vec![Span::styled(ph.clone(), Style::new().color(Color::DarkGrey))]
            }
            _ => vec![Span::new(self.value.clone())],
        };

        DrawOutput {
            lines: vec![line],
            cursor: ctx.focused.then(|| CursorPos {
                col: self.cursor_col(),
                row: 0,
            }),
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('w') | KeyCode::Backspace => InteractionResult::changed_if(
                    text_edit::delete_word_left(&mut self.value, &mut self.cursor),
                ),
                _ => InteractionResult::ignored(),
            };
        }

        match key.code {
            KeyCode::Char(ch) => {
                text_edit::insert_char(&mut self.value, &mut self.cursor, ch);
                InteractionResult::changed()
            }
            KeyCode::Backspace => InteractionResult::changed_if(text_edit::backspace_char(
                &mut self.value,
                &mut self.cursor,
            )),
            KeyCode::Delete => InteractionResult::changed_if(text_edit::delete_char(
                &mut self.value,
                &mut self.cursor,
            )),
            KeyCode::Left => {
                InteractionResult::handled_if(text_edit::move_left(&mut self.cursor, &self.value))
            }
            KeyCode::Right => {
                InteractionResult::handled_if(text_edit::move_right(&mut self.cursor, &self.value))
            }
            KeyCode::Home => {
                self.cursor = 0;
                InteractionResult::handled()
            }
            KeyCode::End => {
                self.cursor = text_edit::char_count(&self.value);
                InteractionResult::handled()
            }
            KeyCode::Enter => InteractionResult::input_done(),
            _ => InteractionResult::ignored(),
        }
    }

    fn value(&self) -> FieldValue {
        match self.field.kind() {
            FieldKind::Date => FieldValue::Date(self.value.clone()),
            _ => FieldValue::Text(self.value.clone()),
        }
    }

    fn set_value(&mut self, value: &FieldValue) {
        if let Some(text) = value.as_text() {
            self.value = text.to_string();
            self.cursor = text_edit::char_count(&self.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TextInput;
    use crate::core::field::FieldId;
    use crate::core::value::FieldValue;
    use crate::terminal::{CursorPos, KeyCode, KeyEvent};
    use crate::ui::span::line_text;
    use crate::widgets::traits::{RenderContext, Widget, WidgetAction};

    fn type_text(input: &mut TextInput, text: &str) {
        for ch in text.chars() {
            input.on_key(KeyEvent::plain(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn typing_updates_value_and_cursor() {
        let mut input = TextInput::new(FieldId::FirstName);
        type_text(&mut input, "Ana");
        input.on_key(KeyEvent::plain(KeyCode::Left));
        type_text(&mut input, "n");

        assert_eq!(input.value(), FieldValue::Text("Anna".into()));
        let out = input.draw(&RenderContext {
            focused: true,
            width: 40,
        });
        assert_eq!(out.cursor, Some(CursorPos { col: 3, row: 0 }));
    }

    #[test]
    fn date_field_shows_placeholder_and_yields_date_value() {
        let mut input = TextInput::new(FieldId::DateOfBirth);
        let ctx = RenderContext {
            focused: false,
            width: 40,
        };
        assert_eq!(line_text(&input.draw(&ctx).lines[0]), "YYYY-MM-DD");
        assert_eq!(input.draw(&ctx).cursor, None);

        type_text(&mut input, "1990-05-17");
        assert_eq!(input.value(), FieldValue::Date("1990-05-17".into()));
    }

    #[test]
    fn ctrl_w_deletes_previous_word() {
        let mut input = TextInput::new(FieldId::Address);
        type_text(&mut input, "12 Main Street");
        let result = input.on_key(KeyEvent::ctrl('w'));
        assert!(result.value_changed);
        assert_eq!(input.text(), "12 Main ");
    }

    #[test]
    fn backspace_at_start_is_not_a_change() {
        let mut input = TextInput::new(FieldId::City);
        let result = input.on_key(KeyEvent::plain(KeyCode::Backspace));
        assert!(!result.handled);
    }

    #[test]
    fn enter_reports_input_done() {
        let mut input = TextInput::new(FieldId::Email);
        let result = input.on_key(KeyEvent::plain(KeyCode::Enter));
        assert_eq!(result.actions, vec![WidgetAction::InputDone]);
    }

    #[test]
    fn set_value_moves_cursor_to_end() {
        let mut input = TextInput::new(FieldId::LastName);
        input.set_value(&FieldValue::Text("Tremblay".into()));
        assert_eq!(input.cursor(), 8);
        assert_eq!(input.text(), "Tremblay");
    }
}
