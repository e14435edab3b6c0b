//! Lays the whole form out as one tall list of span lines.
//!
//! The terminal scrolls this frame; field regions let mouse input be routed
//! back to the widget under the pointer.

use crate::core::field::{FIELDS, FieldId};
use crate::state::form::FormController;
use crate::terminal::CursorPos;
use crate::ui::span::{Span, SpanLine, wrap_words};
use crate::ui::style::{Color, Style};
use crate::widgets::traits::{RenderContext, Widget};

pub const TITLE: &str = "VCH Patient Consent Form";
pub const SUBMIT_LABEL: &str = "Submit Consent Form";
pub const CONSENT_HEADING: &str =
    "PATIENT CONSENT TO ENROL IN AND RECEIVE SERVICES FROM SENTREX";
pub const CONSENT_TEXT: &str = "\
I consent to the collection, use and disclosure of my personal health \
information by the program and its service providers for the purposes of \
enrolling me in the program, coordinating my therapy, contacting me about my \
care and seeking reimbursement from my insurer.\n\
I understand that I may withdraw this consent at any time by contacting the \
program, and that withdrawing consent will end my participation.";

/// Column where widget bodies start.
pub const BODY_INDENT: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(FieldId),
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub color: Color,
}

impl StatusLine {
    pub fn new(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }

    pub fn empty() -> Self {
        Self::new("", Color::Reset)
    }
}

/// Where a widget body landed in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRegion {
    pub field: FieldId,
    pub row: usize,
    pub col: u16,
    pub height: usize,
}

impl FieldRegion {
    /// Body-relative position of a frame cell, if it falls inside.
    pub fn local(&self, col: u16, row: usize) -> Option<(u16, u16)> {
        if row < self.row || row >= self.row + self.height || col < self.col {
            return None;
        }
        let local_row = u16::try_from(row - self.row).ok()?;
        Some((col - self.col, local_row))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub lines: Vec<SpanLine>,
    pub cursor: Option<CursorPos>,
    pub regions: Vec<FieldRegion>,
}

impl Frame {
    pub fn region(&self, field: FieldId) -> Option<&FieldRegion> {
        self.regions.iter().find(|region| region.field == field)
    }

    fn push(&mut self, line: SpanLine) {
        self.lines.push(line);
    }

    fn blank(&mut self) {
        self.lines.push(Vec::new());
    }

    fn row(&self) -> usize {
        self.lines.len()
    }
}

pub struct FormView<'a> {
    pub form: &'a FormController,
    pub widgets: &'a [Box<dyn Widget>],
    pub focus: Focus,
    pub status: &'a StatusLine,
    pub width: u16,
}

pub fn render_form(view: &FormView<'_>) -> Frame {
    let mut frame = Frame::default();
    let width = usize::from(view.width.max(20));

    frame.push(vec![Span::styled(TITLE, Style::new().color(Color::Cyan).bold())]);
    frame.push(vec![Span::styled(
        "Tab/Shift+Tab: move  Enter: next  Ctrl+S: submit  Esc: quit",
        Style::new().color(Color::DarkGrey),
    )]);
    frame.blank();

    for descriptor in FIELDS.iter() {
        if descriptor.id == FieldId::Signature {
            render_consent_text(&mut frame, width);
        }
        let Some(widget) = view.widgets.iter().find(|w| w.field() == descriptor.id) else {
            continue;
        };
        render_field(&mut frame, view, widget.as_ref());
    }

    let focused = view.focus == Focus::Submit;
    let button_style = if focused {
        Style::new().color(Color::White).background(Color::Blue).bold()
    } else {
        Style::new().color(Color::Blue)
    };
    let marker = if focused { "> " } else { "  " };
    frame.push(vec![
        Span::styled(marker, Style::new().color(Color::Cyan)),
        Span::styled(format!("[ {SUBMIT_LABEL} ]"), button_style),
    ]);
    if !view.status.text.is_empty() {
        frame.push(vec![Span::styled(
            format!("  {}", view.status.text),
            Style::new().color(view.status.color).bold(),
        )]);
    }

    frame
}

fn render_field(frame: &mut Frame, view: &FormView<'_>, widget: &dyn Widget) {
    let id = widget.field();
    let focused = view.focus == Focus::Field(id);

    let mut label = vec![
        Span::styled(
            if focused { "> " } else { "  " },
            Style::new().color(Color::Cyan),
        ),
        Span::styled(format!("{}:", id.label()), Style::new().bold()),
    ];
    if view.form.is_required(id) {
        label.push(Span::styled(" *", Style::new().color(Color::Red)));
    }
    frame.push(label);

    let ctx = RenderContext {
        focused,
        width: view.width.saturating_sub(BODY_INDENT),
    };
    let out = widget.draw(&ctx);
    let body_row = frame.row();
    let indent = " ".repeat(usize::from(BODY_INDENT));
    for line in out.lines.iter() {
        let mut indented = Vec::with_capacity(line.len() + 1);
        indented.push(Span::new(indent.clone()));
        indented.extend(line.iter().cloned());
        frame.push(indented);
    }
    frame.regions.push(FieldRegion {
        field: id,
        row: body_row,
        col: BODY_INDENT,
        height: out.lines.len(),
    });

    if let Some(cursor) = out.cursor {
        let row = u16::try_from(body_row + usize::from(cursor.row)).unwrap_or(u16::MAX);
        frame.cursor = Some(CursorPos {
            col: BODY_INDENT + cursor.col,
            row,
        });
    }

    if let Some(error) = view.form.visible_error(id) {
        frame.push(vec![
            Span::new(indent),
            Span::styled(error.to_string(), Style::new().color(Color::Red)),
        ]);
    }
    frame.blank();
}

fn render_consent_text(frame: &mut Frame, width: usize) {
    let text_width = width.saturating_sub(usize::from(BODY_INDENT)).max(20);
    frame.push(vec![Span::styled(format!("  {CONSENT_HEADING}"), Style::new().bold())]);
    for line in wrap_words(CONSENT_TEXT, text_width) {
        frame.push(vec![Span::new(format!("  {line}"))]);
    }
    frame.blank();
}

#[cfg(test)]
mod tests {
    use super::{BODY_INDENT, CONSENT_HEADING, Focus, FormView, StatusLine, render_form};
    use crate::core::field::{FIELDS, FieldId};
    use crate::state::form::FormController;
    use crate::terminal::CursorPos;
    use crate::ui::span::line_text;
    use crate::ui::style::Color;
    use crate::validation::ValidationSchema;
    use crate::widgets::inputs::widget_for;
    use crate::widgets::traits::Widget;

    fn widgets() -> Vec<Box<dyn Widget>> {
        FIELDS.iter().map(widget_for).collect()
    }

    fn texts(lines: &[crate::ui::span::SpanLine]) -> Vec<String> {
        lines.iter().map(|line| line_text(line)).collect()
    }

    #[test]
    fn fields_render_in_registry_order_with_consent_before_signature() {
        let form = FormController::new(ValidationSchema::consent_form());
        let widgets = widgets();
        let status = StatusLine::empty();
        let frame = render_form(&FormView {
            form: &form,
            widgets: &widgets,
            focus: Focus::Submit,
            status: &status,
            width: 80,
        });
        let lines = texts(&frame.lines);

        let first = lines.iter().position(|l| l.contains("First Name:")).expect("first");
        let last = lines.iter().position(|l| l.contains("Last Name:")).expect("last");
        let consent = lines.iter().position(|l| l.contains(CONSENT_HEADING)).expect("consent");
        let signature = lines
            .iter()
            .position(|l| l.contains("Patient's Signature:"))
            .expect("signature");
        assert!(first < last && last < consent && consent < signature);
        assert!(lines[first].ends_with(" *"));
        assert!(lines.iter().any(|l| l.contains("> [ Submit Consent Form ]")));
        assert_eq!(frame.regions.len(), FIELDS.len());
    }

    #[test]
    fn errors_render_only_once_visible() {
        let mut form = FormController::new(ValidationSchema::consent_form());
        let widgets = widgets();
        let status = StatusLine::new("Please fix 9 fields", Color::Red);
        let view = |form: &FormController| {
            texts(
                &render_form(&FormView {
                    form,
                    widgets: &widgets,
                    focus: Focus::Field(FieldId::FirstName),
                    status: &status,
                    width: 80,
                })
                .lines,
            )
        };

        assert!(!view(&form).iter().any(|l| l.contains("First Name is required")));
        let _ = form.begin_submit();
        let lines = view(&form);
        assert!(lines.iter().any(|l| l.contains("First Name is required")));
        assert!(lines.iter().any(|l| l.contains("Please fix 9 fields")));
    }

    #[test]
    fn cursor_and_regions_point_at_widget_bodies() {
        let form = FormController::new(ValidationSchema::consent_form());
        let widgets = widgets();
        let status = StatusLine::empty();
        let frame = render_form(&FormView {
            form: &form,
            widgets: &widgets,
            focus: Focus::Field(FieldId::FirstName),
            status: &status,
            width: 80,
        });

        let region = *frame.region(FieldId::FirstName).expect("region");
        assert_eq!(
            frame.cursor,
            Some(CursorPos {
                col: BODY_INDENT,
                row: region.row as u16,
            })
        );

        let signature = frame.region(FieldId::Signature).expect("signature region");
        assert_eq!(signature.local(BODY_INDENT + 1, signature.row + 1), Some((1, 1)));
        assert_eq!(signature.local(0, signature.row), None);
        assert_eq!(signature.local(BODY_INDENT, signature.row + signature.height), None);
    }
}
