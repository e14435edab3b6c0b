use crate::app::command::Command;
use crate::app::key_bindings::KeyBindings;
use crate::core::field::{FIELDS, FieldId};
use crate::core::value::FieldValue;
use crate::state::form::{FormController, SubmitBlocked};
use crate::submission::{SubmissionOutcome, SubmissionPipeline, SubmissionState};
use crate::terminal::{KeyCode, KeyEvent, MouseButtonState, MouseEvent, Terminal, TerminalEvent};
use crate::ui::render::{Focus, FormView, Frame, StatusLine, render_form};
use crate::ui::style::Color;
use crate::widgets::inputs::widget_for;
use crate::widgets::traits::{InteractionResult, Widget, WidgetAction};
use std::io;
use std::time::Duration;
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(120);

/// Interactive consent form: widgets feed the controller, the controller
/// gates the pipeline, and pipeline completions come back on each tick.
pub struct App {
    form: FormController,
    pipeline: SubmissionPipeline,
    widgets: Vec<Box<dyn Widget>>,
    key_bindings: KeyBindings,
    focus: Focus,
    status: StatusLine,
    frame: Frame,
    should_exit: bool,
}

impl App {
    pub fn new(form: FormController, pipeline: SubmissionPipeline) -> Self {
        let mut widgets: Vec<Box<dyn Widget>> = FIELDS.iter().map(widget_for).collect();
        for widget in widgets.iter_mut() {
            widget.set_value(form.values().get(widget.field()));
        }
        Self {
            form,
            pipeline,
            widgets,
            key_bindings: KeyBindings::new(),
            focus: Focus::Field(FieldId::ALL[0]),
            status: StatusLine::empty(),
            frame: Frame::default(),
            should_exit: false,
        }
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn submission_state(&self) -> &SubmissionState {
        self.pipeline.state()
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit
    }

    pub fn run(&mut self, terminal: &mut Terminal) -> io::Result<()> {
        terminal.enter()?;

        let run_result = (|| -> io::Result<()> {
            while !self.should_exit {
                self.tick();
                let frame = self.layout(terminal.size().width);
                terminal.render(&frame.lines, frame.cursor)?;

                match terminal.poll_event(POLL_INTERVAL)? {
                    TerminalEvent::Key(key) => self.handle_key(key),
                    TerminalEvent::Mouse(mouse) => {
                        self.handle_mouse(mouse, terminal.scroll_offset());
                    }
                    TerminalEvent::Scroll(delta) => terminal.scroll(delta),
                    TerminalEvent::Resize(_) | TerminalEvent::Tick => {}
                }
            }
            Ok(())
        })();

        let exit_result = terminal.exit();
        run_result.and(exit_result)
    }

    /// Lay the form out at `width` columns and keep the frame for mouse routing.
    pub fn layout(&mut self, width: u16) -> &Frame {
        self.frame = render_form(&FormView {
            form: &self.form,
            widgets: &self.widgets,
            focus: self.focus,
            status: &self.status,
            width,
        });
        &self.frame
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let command = self
            .key_bindings
            .resolve(key)
            .unwrap_or(Command::InputKey(key));
        self.process_command(command);
    }

    /// Route left-button activity. `scroll_offset` is the frame row shown
    /// at the top of the screen.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, scroll_offset: usize) {
        let row = usize::from(mouse.row) + scroll_offset;
        let col = mouse.col;

        if mouse.state == MouseButtonState::Down {
            let hit = self
                .frame
                .regions
                .iter()
                .find_map(|region| region.local(col, row).map(|local| (region.field, local)));
            let Some((field, (local_col, local_row))) = hit else {
                return;
            };
            self.set_focus(Focus::Field(field));
            self.dispatch_mouse(field, mouse.state, local_col, local_row);
            return;
        }

        let Focus::Field(field) = self.focus else {
            return;
        };
        let Some(region) = self.frame.region(field).copied() else {
            return;
        };
        let local_col = col.saturating_sub(region.col);
        let local_row = u16::try_from(row.saturating_sub(region.row)).unwrap_or(u16::MAX);
        self.dispatch_mouse(field, mouse.state, local_col, local_row);
    }

    /// Fold a finished submission into the form. Returns true when one
    /// was folded.
    pub fn tick(&mut self) -> bool {
        let Some(outcome) = self.pipeline.poll() else {
            return false;
        };
        self.fold(&outcome);
        true
    }

    /// Block until an in-flight submission finishes and fold it in.
    /// Called after the event loop so leaving the form never abandons a
    /// write. Returns false when nothing was in flight.
    pub fn finish_in_flight(&mut self) -> bool {
        if !self.pipeline.state().is_submitting() {
            return false;
        }
        info!("waiting for the in-flight submission before exiting");
        let Some(outcome) = self.pipeline.wait() else {
            return false;
        };
        self.fold(&outcome);
        true
    }

    fn fold(&mut self, outcome: &SubmissionOutcome) {
        self.form.finish_submit();
        self.status = match self.pipeline.state() {
            SubmissionState::Succeeded => StatusLine::new(
                SubmissionState::Succeeded.label(),
                Color::Green,
            ),
            state => StatusLine::new(state.label(), Color::Red),
        };
        debug!(run_id = outcome.run_id, success = outcome.is_success(), "submission folded");
    }

    pub fn process_command(&mut self, command: Command) {
        match command {
            Command::Exit => self.should_exit = true,
            Command::Submit => self.submit(),
            Command::NextFocus => self.move_focus(1),
            Command::PrevFocus => self.move_focus(-1),
            Command::InputKey(key) => self.dispatch_key(key),
            Command::Tick => {
                self.tick();
            }
        }
    }

    fn dispatch_key(&mut self, key: KeyEvent) {
        let field = match self.focus {
            Focus::Submit => {
                if key.code == KeyCode::Enter {
                    self.submit();
                }
                return;
            }
            Focus::Field(field) => field,
        };
        let Some(widget) = self.widget_mut(field) else {
            return;
        };
        let result = widget.on_key(key);
        self.apply_result(field, result);
    }

    fn dispatch_mouse(&mut self, field: FieldId, state: MouseButtonState, col: u16, row: u16) {
        let Some(widget) = self.widget_mut(field) else {
            return;
        };
        let result = widget.on_mouse(state, col, row);
        self.apply_result(field, result);
    }

    fn apply_result(&mut self, field: FieldId, result: InteractionResult) {
        if result.value_changed
            && let Some(value) = self.widget(field).map(|widget| widget.value())
            && let Err(err) = self.form.set_value(field, value)
        {
            warn!(field = %field, error = %err, "widget produced a value the field rejects");
        }

        for action in result.actions {
            match action {
                WidgetAction::InputDone => self.move_focus(1),
                WidgetAction::SaveSignature => self.save_signature(),
            }
        }
    }

    fn save_signature(&mut self) {
        let signature = self.current_signature();
        match &signature {
            Some(data) => {
                info!(length = data.len(), "signature saved");
                self.status = StatusLine::new("Signature saved", Color::Green);
            }
            None => {
                info!("signature pad is empty");
                self.status = StatusLine::new("Signature pad is empty", Color::Yellow);
            }
        }
        self.form.attach_signature(signature);
    }

    fn submit(&mut self) {
        let signature = self.current_signature();
        self.form.attach_signature(signature);

        match self.form.begin_submit() {
            Ok(values) => {
                if self.pipeline.submit(&values) {
                    self.status = StatusLine::new(SubmissionState::Submitting.label(), Color::Yellow);
                }
            }
            Err(SubmitBlocked::InFlight) => {
                debug!("submit ignored while a submission is in flight");
            }
            Err(SubmitBlocked::Invalid(errors)) => {
                warn!(invalid = errors.len(), "submission blocked by validation");
                let noun = if errors.len() == 1 { "field" } else { "fields" };
                self.status = StatusLine::new(
                    format!("Please fix {} {noun} before submitting", errors.len()),
                    Color::Red,
                );
                if let Some(first) = errors.fields().next() {
                    self.set_focus(Focus::Field(first));
                }
            }
        }
    }

    fn current_signature(&self) -> Option<String> {
        match self.widget(FieldId::Signature).map(|widget| widget.value()) {
            Some(FieldValue::Signature(signature)) => signature,
            _ => None,
        }
    }

    fn move_focus(&mut self, delta: isize) {
        let slots = FieldId::ALL.len() + 1;
        let current = match self.focus {
            Focus::Field(field) => field as usize,
            Focus::Submit => FieldId::ALL.len(),
        };
        let next = (current as isize + delta).rem_euclid(slots as isize) as usize;
        let focus = FieldId::ALL
            .get(next)
            .map(|field| Focus::Field(*field))
            .unwrap_or(Focus::Submit);
        self.set_focus(focus);
    }

    fn set_focus(&mut self, focus: Focus) {
        if focus == self.focus {
            return;
        }
        if let Focus::Field(field) = self.focus {
            self.form.blur(field);
        }
        self.focus = focus;
    }

    fn widget(&self, field: FieldId) -> Option<&dyn Widget> {
        self.widgets
            .iter()
            .find(|widget| widget.field() == field)
            .map(|widget| widget.as_ref())
    }

    fn widget_mut(&mut self, field: FieldId) -> Option<&mut Box<dyn Widget>> {
        self.widgets.iter_mut().find(|widget| widget.field() == field)
    }
}
