use crate::core::value::FormValues;
use crate::error::SubmitError;
use crate::submission::payload::{PayloadOptions, SubmissionPayload};
use crate::submission::state::SubmissionState;
use crate::submission::transport::{ListWriter, WriteReceipt};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use tracing::{debug, error, info, warn};

#[derive(Debug)]
pub struct SubmissionOutcome {
    pub run_id: u64,
    pub result: Result<WriteReceipt, SubmitError>,
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// The write currently on a worker thread. The worker owns the only
/// sender, so the channel disconnects if it dies without answering.
struct InFlight {
    run_id: u64,
    completion_rx: Receiver<SubmissionOutcome>,
}

/// Builds the payload and performs at most one write at a time on a
/// worker thread. Completions are drained by [`poll`](Self::poll).
pub struct SubmissionPipeline {
    writer: Arc<dyn ListWriter>,
    options: PayloadOptions,
    state: SubmissionState,
    sequence: u64,
    in_flight: Option<InFlight>,
}

impl SubmissionPipeline {
    pub fn new(writer: Arc<dyn ListWriter>, options: PayloadOptions) -> Self {
        Self {
            writer,
            options,
            state: SubmissionState::Idle,
            sequence: 0,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn preview(&self, values: &FormValues) -> SubmissionPayload {
        SubmissionPayload::from_values(values, &self.options)
    }

    /// Start one write. Returns false, without writing, while another
    /// submission is in flight.
    pub fn submit(&mut self, values: &FormValues) -> bool {
        if self.in_flight.is_some() {
            warn!("submission already in flight; ignoring duplicate submit");
            return false;
        }

        let payload = self.preview(values);
        self.sequence = self.sequence.saturating_add(1);
        let run_id = self.sequence;
        self.state = SubmissionState::Submitting;

        info!(
            run_id,
            target = %self.writer.describe(),
            columns = payload.len(),
            "submitting consent form"
        );

        let writer = Arc::clone(&self.writer);
        let (completion_tx, completion_rx) = mpsc::channel::<SubmissionOutcome>();
        std::thread::spawn(move || {
            let result = writer.create_item(&payload);
            let _ = completion_tx.send(SubmissionOutcome { run_id, result });
        });
        self.in_flight = Some(InFlight {
            run_id,
            completion_rx,
        });
        true
    }

    /// Fold a finished write into the state, if one is ready.
    pub fn poll(&mut self) -> Option<SubmissionOutcome> {
        let in_flight = self.in_flight.as_ref()?;
        let outcome = match in_flight.completion_rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => worker_exited(in_flight.run_id),
        };
        Some(self.finish(outcome))
    }

    /// Block until the in-flight write finishes. Returns `None` when
    /// nothing is in flight.
    pub fn wait(&mut self) -> Option<SubmissionOutcome> {
        let in_flight = self.in_flight.as_ref()?;
        let outcome = in_flight
            .completion_rx
            .recv()
            .unwrap_or_else(|_| worker_exited(in_flight.run_id));
        Some(self.finish(outcome))
    }

    fn finish(&mut self, outcome: SubmissionOutcome) -> SubmissionOutcome {
        self.in_flight = None;
        match &outcome.result {
            Ok(receipt) => {
                info!(run_id = outcome.run_id, status = receipt.status, "list write succeeded");
                debug!(run_id = outcome.run_id, body = %receipt.body, "list response");
                self.state = SubmissionState::Succeeded;
            }
            Err(err) => {
                error!(run_id = outcome.run_id, error = %err, "list write failed");
                self.state = SubmissionState::Failed(err.to_string());
            }
        }
        outcome
    }
}

fn worker_exited(run_id: u64) -> SubmissionOutcome {
    SubmissionOutcome {
        run_id,
        result: Err(SubmitError::WorkerExited),
    }
}

#[cfg(test)]
mod tests {
    use super::SubmissionPipeline;
    use crate::core::value::FormValues;
    use crate::error::SubmitError;
    use crate::submission::payload::{PayloadOptions, SubmissionPayload};
    use crate::submission::state::SubmissionState;
    use crate::submission::transport::{ListWriter, WriteReceipt};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::{self, Receiver};
    use std::sync::{Arc, Mutex};

    /// Holds each write until the test releases it.
    struct GatedWriter {
        calls: AtomicUsize,
        release: Mutex<Receiver<Result<u16, String>>>,
    }

    impl ListWriter for GatedWriter {
        fn create_item(&self, _payload: &SubmissionPayload) -> Result<WriteReceipt, SubmitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .release
                .lock()
                .expect("release lock")
                .recv()
                .unwrap_or_else(|_| Err("closed".into()));
            match next {
                Ok(status) => Ok(WriteReceipt {
                    status,
                    body: "{}".into(),
                }),
                Err(message) => Err(SubmitError::Transport(message)),
            }
        }

        fn describe(&self) -> String {
            "gated".into()
        }
    }

    fn gated() -> (Arc<GatedWriter>, mpsc::Sender<Result<u16, String>>) {
        let (tx, rx) = mpsc::channel();
        let writer = Arc::new(GatedWriter {
            calls: AtomicUsize::new(0),
            release: Mutex::new(rx),
        });
        (writer, tx)
    }

    #[test]
    fn second_submit_while_in_flight_is_ignored() {
        let (writer, release) = gated();
        let mut pipeline = SubmissionPipeline::new(writer.clone(), PayloadOptions::default());
        let values = FormValues::new();

        assert!(pipeline.submit(&values));
        assert!(!pipeline.submit(&values));
        assert_eq!(pipeline.state(), &SubmissionState::Submitting);

        release.send(Ok(201)).expect("release");
        let outcome = pipeline.wait().expect("one write in flight");
        assert!(outcome.is_success());
        assert_eq!(writer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(pipeline.state(), &SubmissionState::Succeeded);
    }

    #[test]
    fn failure_is_recorded_and_not_retried() {
        let (writer, release) = gated();
        let mut pipeline = SubmissionPipeline::new(writer.clone(), PayloadOptions::default());

        assert!(pipeline.submit(&FormValues::new()));
        release.send(Err("connection reset".into())).expect("release");
        let outcome = pipeline.wait().expect("write finished");
        assert!(!outcome.is_success());
        assert!(matches!(pipeline.state(), SubmissionState::Failed(reason) if reason.contains("connection reset")));

        assert!(pipeline.wait().is_none());
        assert!(pipeline.poll().is_none());
        assert_eq!(writer.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn new_submit_allowed_after_completion() {
        let (writer, release) = gated();
        let mut pipeline = SubmissionPipeline::new(writer.clone(), PayloadOptions::default());

        assert!(pipeline.submit(&FormValues::new()));
        release.send(Err("boom".into())).expect("release");
        pipeline.wait().expect("finished");

        assert!(pipeline.submit(&FormValues::new()));
        release.send(Ok(201)).expect("release");
        let outcome = pipeline.wait().expect("finished");
        assert_eq!(outcome.run_id, 2);
        assert_eq!(writer.calls.load(Ordering::SeqCst), 2);
    }

    struct PanickingWriter;

    impl ListWriter for PanickingWriter {
        fn create_item(&self, _payload: &SubmissionPayload) -> Result<WriteReceipt, SubmitError> {
            panic!("writer blew up");
        }

        fn describe(&self) -> String {
            "panicking".into()
        }
    }

    #[test]
    fn worker_panic_fails_the_submission_instead_of_hanging() {
        let mut pipeline = SubmissionPipeline::new(Arc::new(PanickingWriter), PayloadOptions::default());

        assert!(pipeline.submit(&FormValues::new()));
        let outcome = pipeline.wait().expect("worker exit is reported");
        assert!(matches!(outcome.result, Err(SubmitError::WorkerExited)));
        assert!(matches!(pipeline.state(), SubmissionState::Failed(_)));

        assert!(pipeline.submit(&FormValues::new()));
        let mut folded = None;
        for _ in 0..400 {
            folded = pipeline.poll();
            if folded.is_some() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        let folded = folded.expect("poll sees the dead worker");
        assert_eq!(folded.run_id, 2);
        assert!(!pipeline.state().is_submitting());
    }

    #[test]
    fn poll_is_empty_before_anything_finishes() {
        let (writer, _release) = gated();
        let mut pipeline = SubmissionPipeline::new(writer, PayloadOptions::default());
        assert!(pipeline.poll().is_none());
        assert_eq!(pipeline.state(), &SubmissionState::Idle);
    }
}
