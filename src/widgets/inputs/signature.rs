use crate::core::field::FieldId;
use crate::core::value::FieldValue;
use crate::signature::{Point, SignaturePad};
use crate::terminal::{KeyCode, KeyEvent, MouseButtonState};
use crate::ui::span::{Span, SpanLine};
use crate::ui::style::{Color, Style};
use crate::widgets::traits::{
    DrawOutput, InteractionResult, RenderContext, Widget, WidgetAction,
};
use std::collections::HashSet;

pub const CANVAS_WIDTH: u16 = 48;
pub const CANVAS_HEIGHT: u16 = 6;

const INK: &str = "█";
const PEN: &str = "+";

/// Drawing canvas framed by a one-cell border. Mouse drags draw strokes;
/// the arrow keys move a pen that draws while it is down.
pub struct SignatureInput {
    field: FieldId,
    pad: SignaturePad,
    pen: Point,
    pen_down: bool,
    /// Signature loaded from prefilled values, shown until the pad is used.
    imported: Option<String>,
}

impl SignatureInput {
    pub fn new(field: FieldId) -> Self {
        Self {
            field,
            pad: SignaturePad::new(CANVAS_WIDTH, CANVAS_HEIGHT),
            pen: Point::new(0, 0),
            pen_down: false,
            imported: None,
        }
    }

    pub fn pad(&self) -> &SignaturePad {
        &self.pad
    }

    pub fn is_pen_down(&self) -> bool {
        self.pen_down
    }

    /// Encoded drawing, falling back to a prefilled signature.
    pub fn export(&self) -> Option<String> {
        self.pad.export().or_else(|| self.imported.clone())
    }

    fn clear(&mut self) -> bool {
        let had_any = !self.pad.is_empty() || self.imported.is_some();
        self.pad.clear();
        self.pen_down = false;
        self.imported = None;
        had_any
    }

    fn move_pen(&mut self, dx: i32, dy: i32) -> InteractionResult {
        let max_x = i32::from(self.pad.width()) - 1;
        let max_y = i32::from(self.pad.height()) - 1;
        let x = (i32::from(self.pen.x) + dx).clamp(0, max_x);
        let y = (i32::from(self.pen.y) + dy).clamp(0, max_y);
        let next = Point::new(x as u16, y as u16);
        if next == self.pen {
            return InteractionResult::ignored();
        }
        self.pen = next;
        if self.pen_down {
            self.pad.extend_stroke(next);
            return InteractionResult::changed();
        }
        InteractionResult::handled()
    }

    fn toggle_pen(&mut self) -> InteractionResult {
        if self.pen_down {
            self.pad.end_stroke();
            self.pen_down = false;
            InteractionResult::handled()
        } else {
            self.pad.begin_stroke(self.pen);
            self.pen_down = true;
            InteractionResult::changed()
        }
    }

    /// Canvas cell under a body-relative position, if inside the border.
    fn canvas_point(&self, col: u16, row: u16) -> Option<Point> {
        let x = col.checked_sub(1)?;
        let y = row.checked_sub(1)?;
        (x < self.pad.width() && y < self.pad.height()).then(|| Point::new(x, y))
    }

    fn canvas_rows(&self, focused: bool) -> Vec<SpanLine> {
        let width = usize::from(self.pad.width());
        let inked: HashSet<(u16, u16)> = self
            .pad
            .inked_cells()
            .into_iter()
            .map(|p| (p.x, p.y))
            .collect();
        let border = Style::new().color(if focused { Color::Cyan } else { Color::DarkGrey });
        let ink = Style::new().color(Color::Blue);
        let pen = Style::new().color(Color::Yellow).bold();

        let mut rows = Vec::with_capacity(usize::from(self.pad.height()));
        for y in 0..self.pad.height() {
            let mut line = vec![Span::styled("│", border)];
            if self.pad.is_empty() && y == 0 && self.imported.is_some() {
                let note = format!("{:<width$}", "(signature on file)");
                line.push(Span::styled(note, Style::new().color(Color::Green)));
            } else {
                for x in 0..self.pad.width() {
                    let cell = if focused && self.pen == Point::new(x, y) {
                        Span::styled(PEN, pen)
                    } else if inked.contains(&(x, y)) {
                        Span::styled(INK, ink)
                    } else {
                        Span::new(" ")
                    };
                    line.push(cell);
                }
            }
            line.push(Span::styled("│", border));
            rows.push(line);
        }
        rows
    }
}

impl Widget for SignatureInput {
    fn field(&self) -> FieldId {
        self.field
    }

    fn draw(&self, ctx: &RenderContext) -> DrawOutput {
        let width = usize::from(self.pad.width());
        let border = Style::new().color(if ctx.focused { Color::Cyan } else { Color::DarkGrey });

        let mut lines = vec![vec![Span::styled(format!("┌{}┐", "─".repeat(width)), border)]];
        lines.extend(self.canvas_rows(ctx.focused));
        lines.push(vec![Span::styled(format!("└{}┘", "─".repeat(width)), border)]);

        if ctx.focused {
            let pen_state = if self.pen_down { "pen down" } else { "pen up" };
            lines.push(vec![Span::styled(
                format!("drag or arrows to draw, space: {pen_state}, c: clear, s: save"),
                Style::new().color(Color::DarkGrey),
            )]);
        }

        DrawOutput {
            lines,
            cursor: None,
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> InteractionResult {
        match key.code {
            KeyCode::Left => self.move_pen(-1, 0),
            KeyCode::Right => self.move_pen(1, 0),
            KeyCode::Up => self.move_pen(0, -1),
            KeyCode::Down => self.move_pen(0, 1),
            KeyCode::Char(' ') => self.toggle_pen(),
            KeyCode::Char('c') | KeyCode::Backspace => InteractionResult::changed_if(self.clear()),
            KeyCode::Char('s') => InteractionResult::with_action(WidgetAction::SaveSignature),
            KeyCode::Enter => {
                if self.pen_down {
                    self.pad.end_stroke();
                    self.pen_down = false;
                }
                InteractionResult::input_done()
            }
            _ => InteractionResult::ignored(),
        }
    }

    fn on_mouse(&mut self, state: MouseButtonState, col: u16, row: u16) -> InteractionResult {
        match state {
            MouseButtonState::Down => match self.canvas_point(col, row) {
                Some(point) => {
                    self.pad.begin_stroke(point);
                    self.pen = point;
                    InteractionResult::changed()
                }
                None => InteractionResult::ignored(),
            },
            MouseButtonState::Drag if self.pad.is_drawing() => {
                let point = Point::new(col.saturating_sub(1), row.saturating_sub(1));
                self.pad.extend_stroke(point);
                InteractionResult::changed()
            }
            MouseButtonState::Up if self.pad.is_drawing() => {
                self.pad.end_stroke();
                self.pen_down = false;
                InteractionResult::handled()
            }
            _ => InteractionResult::ignored(),
        }
    }

    fn value(&self) -> FieldValue {
        FieldValue::Signature(self.export())
    }

    fn set_value(&mut self, value: &FieldValue) {
        if let FieldValue::Signature(signature) = value
            && *signature != self.pad.export()
        {
            self.imported = signature.clone();
        }
    }
}
