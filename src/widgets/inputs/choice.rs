use crate::core::field::{ChoiceOption, FieldId};
use crate::core::value::FieldValue;
use crate::terminal::{KeyCode, KeyEvent};
use crate::ui::span::{Span, SpanLine};
use crate::ui::style::{Color, Style};
use crate::widgets::traits::{DrawOutput, InteractionResult, RenderContext, Widget};

/// Option lists longer than this are drawn one per line.
pub const INLINE_OPTION_LIMIT: usize = 3;

/// Radio group: at most one option selected.
pub struct ChoiceInput {
    field: FieldId,
    options: &'static [ChoiceOption],
    highlighted: usize,
    selected: Option<usize>,
}

impl ChoiceInput {
    pub fn new(field: FieldId) -> Self {
        Self {
            field,
            options: field.kind().options(),
            highlighted: 0,
            selected: None,
        }
    }

    pub fn selected_value(&self) -> Option<&'static str> {
        self.selected
            .and_then(|index| self.options.get(index))
            .map(|opt| opt.value)
    }

    fn move_prev(&mut self) -> bool {
        if self.options.is_empty() {
            return false;
        }
        let len = self.options.len();
        self.highlighted = (self.highlighted + len - 1) % len;
        true
    }

    fn move_next(&mut self) -> bool {
        if self.options.is_empty() {
            return false;
        }
        self.highlighted = (self.highlighted + 1) % self.options.len();
        true
    }

    fn highlight_by_letter(&mut self, ch: char) -> bool {
        let needle = ch.to_ascii_lowercase();
        match self.options.iter().position(|opt| {
            opt.label
                .chars()
                .next()
                .is_some_and(|c| c.to_ascii_lowercase() == needle)
        }) {
            Some(index) => {
                self.highlighted = index;
                true
            }
            None => false,
        }
    }

    fn select_highlighted(&mut self) -> bool {
        if self.highlighted >= self.options.len() || self.selected == Some(self.highlighted) {
            return false;
        }
        self.selected = Some(self.highlighted);
        true
    }
}

impl Widget for ChoiceInput {
    fn field(&self) -> FieldId {
        self.field
    }

    fn draw(&self, ctx: &RenderContext) -> DrawOutput {
        let marks: Vec<bool> = (0..self.options.len())
            .map(|index| self.selected == Some(index))
            .collect();
        DrawOutput {
            lines: option_lines(self.options, &marks, self.highlighted, ctx.focused, "(●)", "( )"),
            cursor: None,
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        match key.code {
            KeyCode::Left | KeyCode::Up => InteractionResult::handled_if(self.move_prev()),
            KeyCode::Right | KeyCode::Down => InteractionResult::handled_if(self.move_next()),
            KeyCode::Char(' ') => InteractionResult::changed_if(self.select_highlighted()),
            KeyCode::Char(ch) => InteractionResult::handled_if(self.highlight_by_letter(ch)),
            KeyCode::Backspace | KeyCode::Delete => {
                InteractionResult::changed_if(self.selected.take().is_some())
            }
            KeyCode::Enter => InteractionResult::input_done(),
            _ => InteractionResult::ignored(),
        }
    }

    fn value(&self) -> FieldValue {
        FieldValue::Choice(self.selected_value().map(str::to_string))
    }

    fn set_value(&mut self, value: &FieldValue) {
        if let FieldValue::Choice(choice) = value {
            self.selected = choice
                .as_deref()
                .and_then(|v| self.options.iter().position(|opt| opt.value == v));
            if let Some(index) = self.selected {
                self.highlighted = index;
            }
        }
    }
}

/// Draws an option list with the given marks, inline for short lists.
pub(super) fn option_lines(
    options: &[ChoiceOption],
    marks: &[bool],
    highlighted: usize,
    focused: bool,
    on: &str,
    off: &str,
) -> Vec<SpanLine> {
    let mark_style = Style::new().color(Color::Green).bold();
    let active_style = Style::new().color(Color::Cyan).bold();
    let inactive_style = Style::new().color(Color::DarkGrey);

    let option_spans = |index: usize, option: &ChoiceOption| -> Vec<Span> {
        let marked = marks.get(index).copied().unwrap_or(false);
        let mark = if marked {
            Span::styled(on.to_string(), mark_style)
        } else {
            Span::styled(off.to_string(), inactive_style)
        };
        let style = if focused && index == highlighted {
            active_style
        } else if marked {
            Style::default()
        } else {
            inactive_style
        };
        vec![mark, Span::new(" "), Span::styled(option.label, style)]
    };

    if options.len() <= INLINE_OPTION_LIMIT {
        let mut line = Vec::new();
        for (index, option) in options.iter().enumerate() {
            if index > 0 {
                line.push(Span::new("   "));
            }
            line.extend(option_spans(index, option));
        }
        return vec![line];
    }

    options
        .iter()
        .enumerate()
        .map(|(index, option)| option_spans(index, option))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::ChoiceInput;
    use crate::core::field::FieldId;
    use crate::core::value::FieldValue;
    use crate::terminal::{KeyCode, KeyEvent};
    use crate::ui::span::line_text;
    use crate::widgets::traits::{RenderContext, Widget};

    const FOCUSED: RenderContext = RenderContext {
        focused: true,
        width: 60,
    };

    #[test]
    fn space_selects_highlighted_option() {
        let mut input = ChoiceInput::new(FieldId::CanLeaveVoiceMail);
        assert_eq!(input.value(), FieldValue::Choice(None));

        input.on_key(KeyEvent::plain(KeyCode::Right));
        let result = input.on_key(KeyEvent::plain(KeyCode::Char(' ')));
        assert!(result.value_changed);
        assert_eq!(input.value(), FieldValue::Choice(Some("no".into())));

        let again = input.on_key(KeyEvent::plain(KeyCode::Char(' ')));
        assert!(!again.value_changed);
    }

    #[test]
    fn backspace_clears_selection() {
        let mut input = ChoiceInput::new(FieldId::CanLeaveVoiceMail);
        input.set_value(&FieldValue::Choice(Some("yes".into())));
        assert!(input.on_key(KeyEvent::plain(KeyCode::Backspace)).value_changed);
        assert_eq!(input.value(), FieldValue::Choice(None));
        assert!(!input.on_key(KeyEvent::plain(KeyCode::Backspace)).handled);
    }

    #[test]
    fn short_lists_draw_inline() {
        let mut input = ChoiceInput::new(FieldId::CanLeaveVoiceMail);
        input.set_value(&FieldValue::Choice(Some("yes".into())));
        let out = input.draw(&FOCUSED);
        assert_eq!(out.lines.len(), 1);
        assert_eq!(line_text(&out.lines[0]), "(●) Yes   ( ) No");
    }

    #[test]
    fn long_lists_draw_one_option_per_line() {
        let input = ChoiceInput::new(FieldId::TherapyType);
        let out = input.draw(&FOCUSED);
        assert_eq!(out.lines.len(), FieldId::TherapyType.kind().options().len());
    }

    #[test]
    fn letter_moves_highlight_without_selecting() {
        let mut input = ChoiceInput::new(FieldId::CanLeaveVoiceMail);
        assert!(input.on_key(KeyEvent::plain(KeyCode::Char('n'))).handled);
        assert_eq!(input.value(), FieldValue::Choice(None));
        input.on_key(KeyEvent::plain(KeyCode::Char(' ')));
        assert_eq!(input.value(), FieldValue::Choice(Some("no".into())));
    }
}
