//! Step wizard controller
//!
//! A linear state machine over `step_count` input steps plus one implicit
//! completion step at `step_count + 1`:
//!
//! - `retreat`: `n -> n - 1` for `n > 1`
//! - `advance`: `n -> n + 1` for `n < step_count`
//! - `advance` on the last input step starts a submit; success moves to the
//!   completion step, failure leaves the wizard where it is
//! - the completion step is absorbing
//!
//! [`WizardState`] holds the data and the pure transitions. [`WizardController`]
//! wraps it with the submit collaborator, which runs on a background thread
//! and reports back over a channel the host drains with
//! [`WizardController::poll`] or [`WizardController::wait`].

use crate::error::{SubmitError, WizardError};
use crate::submit::Submitter;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Accumulated form values keyed by field name
pub type FormData = Map<String, Value>;

/// Shallow merge: patch values overwrite by key, other keys are kept
pub fn merge_patch(data: &mut FormData, patch: FormData) {
    for (key, value) in patch {
        data.insert(key, value);
    }
}

/// Result of a command applied to the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The current step changed
    Moved { from: usize, to: usize },
    /// A submit was started from the last input step
    SubmitStarted,
    /// The command had no effect
    Ignored,
}

/// Wizard position, data and submit flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardState {
    step_count: usize,
    current_step: usize,
    form_data: FormData,
    is_submitting: bool,
}

impl WizardState {
    /// Create a wizard positioned on step 1
    pub fn new(step_count: usize, initial_data: FormData) -> Result<Self, WizardError> {
        if step_count == 0 {
            return Err(WizardError::NoSteps);
        }
        Ok(Self {
            step_count,
            current_step: 1,
            form_data: initial_data,
            is_submitting: false,
        })
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// The implicit completion step
    pub fn terminal_step(&self) -> usize {
        self.step_count + 1
    }

    pub fn form_data(&self) -> &FormData {
        &self.form_data
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn is_complete(&self) -> bool {
        self.current_step == self.terminal_step()
    }

    pub fn is_last_input_step(&self) -> bool {
        self.current_step == self.step_count
    }

    /// Whether `retreat` would move the wizard
    pub fn can_retreat(&self) -> bool {
        self.current_step > 1 && !self.is_complete() && !self.is_submitting
    }

    /// Share of input steps already passed, in `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        (self.current_step - 1) as f64 / self.step_count as f64
    }

    /// Merge a patch into the form data
    ///
    /// Allowed in every state, including while a submit is pending.
    pub fn update(&mut self, patch: FormData) {
        merge_patch(&mut self.form_data, patch);
    }

    /// Step back one input step
    ///
    /// No-op on step 1, on the completion step, and while a submit is
    /// pending (the pending submit belongs to the last input step).
    pub fn retreat(&mut self) -> Transition {
        if !self.can_retreat() {
            return Transition::Ignored;
        }
        let from = self.current_step;
        self.current_step -= 1;
        Transition::Moved {
            from,
            to: self.current_step,
        }
    }

    /// Step forward, or start a submit from the last input step
    pub fn advance(&mut self) -> Transition {
        if self.current_step < self.step_count {
            let from = self.current_step;
            self.current_step += 1;
            return Transition::Moved {
                from,
                to: self.current_step,
            };
        }

        if self.is_last_input_step() && !self.is_submitting {
            self.is_submitting = true;
            return Transition::SubmitStarted;
        }

        Transition::Ignored
    }

    /// Apply the outcome of the pending submit
    pub fn finish_submit(&mut self, succeeded: bool) -> Transition {
        if !self.is_submitting {
            return Transition::Ignored;
        }
        self.is_submitting = false;

        if succeeded {
            let from = self.current_step;
            self.current_step = self.terminal_step();
            Transition::Moved {
                from,
                to: self.current_step,
            }
        } else {
            Transition::Ignored
        }
    }
}

/// Host-side hooks
///
/// Every method has an empty default, so hosts implement only what they
/// need. `()` is the observer that ignores everything.
pub trait WizardObserver {
    /// Called synchronously whenever the current step changes
    fn step_changed(&mut self, _step: usize) {}

    /// Called when a submit attempt starts
    fn submit_started(&mut self, _data: &FormData) {}

    /// Called once the pending submit succeeded
    fn submit_succeeded(&mut self) {}

    /// Called once the pending submit failed
    fn submit_failed(&mut self, _error: &SubmitError) {}
}

impl WizardObserver for () {}

/// Adapts a plain step-change callback into an observer
pub struct OnStepChange<F>(pub F);

impl<F: FnMut(usize)> WizardObserver for OnStepChange<F> {
    fn step_changed(&mut self, step: usize) {
        (self.0)(step)
    }
}

/// Wizard notifications for hosts that prefer polling a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    StepChanged(usize),
    SubmitStarted,
    SubmitSucceeded,
    SubmitFailed(String),
}

impl WizardObserver for Sender<WizardEvent> {
    fn step_changed(&mut self, step: usize) {
        let _ = self.send(WizardEvent::StepChanged(step));
    }

    fn submit_started(&mut self, _data: &FormData) {
        let _ = self.send(WizardEvent::SubmitStarted);
    }

    fn submit_succeeded(&mut self) {
        let _ = self.send(WizardEvent::SubmitSucceeded);
    }

    fn submit_failed(&mut self, error: &SubmitError) {
        let _ = self.send(WizardEvent::SubmitFailed(error.to_string()));
    }
}

/// How a pending submit ended
#[derive(Debug)]
pub enum SubmitResolution {
    /// The wizard moved to its completion step
    Completed,
    /// The wizard stayed on its last input step
    Failed(SubmitError),
}

impl SubmitResolution {
    pub fn is_completed(&self) -> bool {
        matches!(self, SubmitResolution::Completed)
    }
}

/// Message posted by the submit worker
struct SubmitOutcome {
    attempt: u64,
    result: Result<(), SubmitError>,
}

/// Drives a [`WizardState`] and its submit collaborator
pub struct WizardController {
    state: WizardState,
    submitter: Arc<dyn Submitter>,
    observer: Box<dyn WizardObserver>,
    outcome_tx: Sender<SubmitOutcome>,
    outcome_rx: Receiver<SubmitOutcome>,
    /// Sequence number of the latest submit attempt
    attempt: u64,
    /// Timed-out attempt whose worker has not reported back yet
    abandoned: Option<u64>,
    pending_since: Option<Instant>,
    submit_timeout: Option<Duration>,
    last_error: Option<String>,
    /// Snapshot handed to the pending submit
    in_flight: Option<FormData>,
    /// Snapshot of the submit that completed the wizard
    submitted: Option<FormData>,
}

impl fmt::Debug for WizardController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardController")
            .field("state", &self.state)
            .field("attempt", &self.attempt)
            .field("submit_timeout", &self.submit_timeout)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl WizardController {
    /// Create a controller on step 1 with no observer and no submit timeout
    pub fn new<S: Submitter>(
        step_count: usize,
        initial_data: FormData,
        submitter: S,
    ) -> Result<Self, WizardError> {
        Self::with_shared_submitter(step_count, initial_data, Arc::new(submitter))
    }

    /// Create a controller around an already shared submitter
    pub fn with_shared_submitter(
        step_count: usize,
        initial_data: FormData,
        submitter: Arc<dyn Submitter>,
    ) -> Result<Self, WizardError> {
        let state = WizardState::new(step_count, initial_data)?;
        let (outcome_tx, outcome_rx) = mpsc::channel();
        debug!(step_count, "Wizard initialized");

        Ok(Self {
            state,
            submitter,
            observer: Box::new(()),
            outcome_tx,
            outcome_rx,
            attempt: 0,
            abandoned: None,
            pending_since: None,
            submit_timeout: None,
            last_error: None,
            in_flight: None,
            submitted: None,
        })
    }

    /// Attach the host observer
    pub fn with_observer<O: WizardObserver + 'static>(mut self, observer: O) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Give up on a submit that has not reported back within `timeout`
    ///
    /// A timed-out attempt counts as failed; whatever it reports later is
    /// discarded. No new submit starts until the abandoned worker has
    /// returned, so submitter calls never overlap.
    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = Some(timeout);
        self
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step()
    }

    pub fn step_count(&self) -> usize {
        self.state.step_count()
    }

    pub fn form_data(&self) -> &FormData {
        self.state.form_data()
    }

    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting()
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    pub fn is_last_input_step(&self) -> bool {
        self.state.is_last_input_step()
    }

    pub fn can_retreat(&self) -> bool {
        self.state.can_retreat()
    }

    pub fn progress(&self) -> f64 {
        self.state.progress()
    }

    /// Message of the most recent submit failure, cleared on the next attempt
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The data the successful submit received
    ///
    /// May differ from [`form_data`](Self::form_data) when fields were
    /// updated while the submit was pending.
    pub fn submitted_data(&self) -> Option<&FormData> {
        self.submitted.as_ref()
    }

    /// Whether a timed-out submit worker is still running
    pub fn has_abandoned_submit(&mut self) -> bool {
        self.reap_abandoned();
        self.abandoned.is_some()
    }

    /// Merge field updates into the form data
    pub fn update_data(&mut self, patch: FormData) {
        if self.state.is_submitting() {
            debug!(fields = patch.len(), "Form data updated while a submit is pending");
        }
        self.state.update(patch);
    }

    /// Step back, if possible
    pub fn retreat(&mut self) -> Transition {
        let transition = self.state.retreat();
        self.notify(transition);
        transition
    }

    /// Step forward, or submit from the last input step
    pub fn advance(&mut self) -> Transition {
        if self.state.is_last_input_step()
            && !self.state.is_submitting()
            && self.has_abandoned_submit()
        {
            debug!(
                attempt = self.attempt,
                "Advance ignored, timed-out submit still running"
            );
            return Transition::Ignored;
        }

        let transition = self.state.advance();
        match transition {
            Transition::Moved { .. } => self.notify(transition),
            Transition::SubmitStarted => self.start_submit(),
            Transition::Ignored => {
                debug!(
                    step = self.state.current_step(),
                    submitting = self.state.is_submitting(),
                    "Advance ignored"
                );
            }
        }
        transition
    }

    /// Apply the pending submit's outcome if it has arrived
    ///
    /// Never blocks. Returns `None` when nothing is pending or the worker
    /// has not reported yet.
    pub fn poll(&mut self) -> Option<SubmitResolution> {
        if !self.state.is_submitting() {
            self.reap_abandoned();
            return None;
        }

        loop {
            match self.outcome_rx.try_recv() {
                Ok(outcome) => {
                    if let Some(resolution) = self.receive(outcome) {
                        return Some(resolution);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        match (self.pending_since, self.submit_timeout) {
            (Some(started), Some(timeout)) if started.elapsed() >= timeout => {
                warn!(attempt = self.attempt, ?timeout, "Submit timed out, abandoning worker");
                self.abandoned = Some(self.attempt);
                Some(self.resolve(Err(SubmitError::TimedOut(timeout))))
            }
            _ => None,
        }
    }

    /// Block for at most `timeout` waiting for the pending submit to resolve
    pub fn wait(&mut self, timeout: Duration) -> Option<SubmitResolution> {
        let deadline = Instant::now() + timeout;

        loop {
            if !self.state.is_submitting() {
                return None;
            }
            if let Some(resolution) = self.poll() {
                return Some(resolution);
            }

            let now = Instant::now();
            if now >= deadline {
                return None;
            }

            let mut wait_for = deadline - now;
            if let (Some(started), Some(submit_timeout)) = (self.pending_since, self.submit_timeout)
            {
                let submit_deadline = started + submit_timeout;
                wait_for = wait_for.min(submit_deadline.saturating_duration_since(now));
            }

            match self.outcome_rx.recv_timeout(wait_for) {
                Ok(outcome) => {
                    if let Some(resolution) = self.receive(outcome) {
                        return Some(resolution);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Apply a worker outcome; outcomes of abandoned attempts only release the guard
    fn receive(&mut self, outcome: SubmitOutcome) -> Option<SubmitResolution> {
        if self.abandoned == Some(outcome.attempt) {
            debug!(attempt = outcome.attempt, "Abandoned submit worker finished");
            self.abandoned = None;
            return None;
        }
        if outcome.attempt == self.attempt && self.state.is_submitting() {
            return Some(self.resolve(outcome.result));
        }
        debug!(attempt = outcome.attempt, "Discarding stale submit outcome");
        None
    }

    /// Drain outcomes that arrived while nothing was pending
    fn reap_abandoned(&mut self) {
        if self.abandoned.is_none() {
            return;
        }
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            let _ = self.receive(outcome);
        }
    }

    fn start_submit(&mut self) {
        self.attempt += 1;
        self.last_error = None;
        self.pending_since = Some(Instant::now());

        let attempt = self.attempt;
        let snapshot = self.state.form_data().clone();
        info!(attempt, fields = snapshot.len(), "Submitting form data");
        self.observer.submit_started(&snapshot);
        self.in_flight = Some(snapshot.clone());

        let submitter = Arc::clone(&self.submitter);
        let tx = self.outcome_tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("wizard-submit-{attempt}"))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| submitter.submit(&snapshot)))
                    .unwrap_or_else(|payload| Err(SubmitError::Panicked(panic_message(payload))));
                let _ = tx.send(SubmitOutcome { attempt, result });
            });

        if let Err(e) = spawned {
            warn!(error = %e, "Could not start submit worker");
            self.resolve(Err(SubmitError::Io(e)));
        }
    }

    fn resolve(&mut self, result: Result<(), SubmitError>) -> SubmitResolution {
        self.pending_since = None;
        let snapshot = self.in_flight.take();
        let transition = self.state.finish_submit(result.is_ok());

        match result {
            Ok(()) => {
                info!(attempt = self.attempt, "Submission accepted");
                self.submitted = snapshot;
                self.notify(transition);
                self.observer.submit_succeeded();
                SubmitResolution::Completed
            }
            Err(e) => {
                error!(attempt = self.attempt, error = %e, "Submission failed");
                self.last_error = Some(e.to_string());
                self.observer.submit_failed(&e);
                SubmitResolution::Failed(e)
            }
        }
    }

    fn notify(&mut self, transition: Transition) {
        if let Transition::Moved { from, to } = transition {
            debug!(from, to, "Wizard step changed");
            self.observer.step_changed(to);
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WAIT: Duration = Duration::from_secs(5);

    fn patch(value: Value) -> FormData {
        value.as_object().cloned().unwrap()
    }

    fn accept_all(_: &FormData) -> Result<(), SubmitError> {
        Ok(())
    }

    fn reject_all(_: &FormData) -> Result<(), SubmitError> {
        Err(SubmitError::Rejected("server said no".into()))
    }

    #[derive(Clone, Default)]
    struct Recorder {
        steps: Arc<Mutex<Vec<usize>>>,
        failures: Arc<AtomicUsize>,
        successes: Arc<AtomicUsize>,
    }

    impl WizardObserver for Recorder {
        fn step_changed(&mut self, step: usize) {
            self.steps.lock().unwrap().push(step);
        }

        fn submit_succeeded(&mut self) {
            self.successes.fetch_add(1, Ordering::SeqCst);
        }

        fn submit_failed(&mut self, _error: &SubmitError) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_zero_steps_rejected() {
        assert_eq!(
            WizardState::new(0, FormData::new()).unwrap_err(),
            WizardError::NoSteps
        );
        assert!(WizardController::new(0, FormData::new(), accept_all).is_err());
    }

    #[test]
    fn test_initial_state() {
        let initial = patch(json!({"email": "ada@example.com"}));
        let state = WizardState::new(3, initial.clone()).unwrap();
        assert_eq!(state.current_step(), 1);
        assert_eq!(state.form_data(), &initial);
        assert!(!state.is_submitting());
        assert!(!state.is_complete());
        assert_eq!(state.progress(), 0.0);
    }

    #[test]
    fn test_merge_overwrites_by_key() {
        let mut state = WizardState::new(3, FormData::new()).unwrap();
        state.update(patch(json!({"a": 1})));
        state.update(patch(json!({"b": 2})));
        state.update(patch(json!({"a": 3})));
        assert_eq!(state.form_data(), &patch(json!({"a": 3, "b": 2})));
        assert_eq!(state.current_step(), 1);
    }

    #[test]
    fn test_retreat_on_first_step_is_noop() {
        let mut state = WizardState::new(3, FormData::new()).unwrap();
        let before = state.clone();
        assert_eq!(state.retreat(), Transition::Ignored);
        assert_eq!(state, before);
    }

    #[test]
    fn test_advance_on_completion_step_is_noop() {
        let mut state = WizardState::new(1, FormData::new()).unwrap();
        assert_eq!(state.advance(), Transition::SubmitStarted);
        assert_eq!(
            state.finish_submit(true),
            Transition::Moved { from: 1, to: 2 }
        );
        let before = state.clone();
        assert_eq!(state.advance(), Transition::Ignored);
        assert_eq!(state.retreat(), Transition::Ignored);
        assert_eq!(state, before);
        assert_eq!(state.progress(), 1.0);
    }

    #[test]
    fn test_failed_submit_keeps_last_step() {
        let mut state = WizardState::new(2, FormData::new()).unwrap();
        state.advance();
        assert_eq!(state.advance(), Transition::SubmitStarted);
        assert_eq!(state.advance(), Transition::Ignored);
        assert_eq!(state.retreat(), Transition::Ignored);
        assert_eq!(state.finish_submit(false), Transition::Ignored);
        assert_eq!(state.current_step(), 2);
        assert!(!state.is_submitting());
        assert_eq!(state.finish_submit(true), Transition::Ignored);
    }

    #[test]
    fn test_step_stays_in_bounds_for_every_command_sequence() {
        // 0 = advance, 1 = retreat, 2 = submit succeeds, 3 = submit fails
        const LEN: u32 = 7;
        for step_count in 1..=3 {
            for mut code in 0..4usize.pow(LEN) {
                let mut state = WizardState::new(step_count, FormData::new()).unwrap();
                for _ in 0..LEN {
                    match code % 4 {
                        0 => state.advance(),
                        1 => state.retreat(),
                        2 => state.finish_submit(true),
                        _ => state.finish_submit(false),
                    };
                    code /= 4;
                    assert!((1..=step_count + 1).contains(&state.current_step()));
                    if state.is_submitting() {
                        assert!(state.is_last_input_step());
                    }
                }
            }
        }
    }

    #[test]
    fn test_controller_walks_to_completion() {
        let recorder = Recorder::default();
        let mut wizard = WizardController::new(3, FormData::new(), accept_all)
            .unwrap()
            .with_observer(recorder.clone());

        assert_eq!(wizard.advance(), Transition::Moved { from: 1, to: 2 });
        assert_eq!(wizard.advance(), Transition::Moved { from: 2, to: 3 });
        assert!(!wizard.is_submitting());
        assert_eq!(wizard.advance(), Transition::SubmitStarted);
        assert!(wizard.is_submitting());
        assert_eq!(wizard.current_step(), 3);

        let resolution = wizard.wait(WAIT).unwrap();
        assert!(resolution.is_completed());
        assert!(!wizard.is_submitting());
        assert_eq!(wizard.current_step(), 4);
        assert!(wizard.is_complete());
        assert_eq!(*recorder.steps.lock().unwrap(), vec![2, 3, 4]);
        assert_eq!(recorder.successes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_controller_failure_reports_once() {
        let recorder = Recorder::default();
        let mut wizard = WizardController::new(3, FormData::new(), reject_all)
            .unwrap()
            .with_observer(recorder.clone());

        wizard.advance();
        wizard.advance();
        wizard.advance();
        let resolution = wizard.wait(WAIT).unwrap();

        assert!(matches!(
            resolution,
            SubmitResolution::Failed(SubmitError::Rejected(_))
        ));
        assert_eq!(wizard.current_step(), 3);
        assert!(!wizard.is_submitting());
        assert_eq!(recorder.failures.load(Ordering::SeqCst), 1);
        assert_eq!(*recorder.steps.lock().unwrap(), vec![2, 3]);
        assert!(wizard.last_error().unwrap().contains("server said no"));
        assert!(wizard.poll().is_none());
    }

    #[test]
    fn test_retry_after_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let flaky = move |_: &FormData| -> Result<(), SubmitError> {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(SubmitError::Rejected("try again".into()))
            } else {
                Ok(())
            }
        };
        let mut wizard = WizardController::new(1, FormData::new(), flaky).unwrap();

        wizard.advance();
        assert!(!wizard.wait(WAIT).unwrap().is_completed());
        assert!(wizard.last_error().is_some());

        assert_eq!(wizard.advance(), Transition::SubmitStarted);
        assert!(wizard.last_error().is_none());
        assert!(wizard.wait(WAIT).unwrap().is_completed());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(wizard.current_step(), 2);
    }

    #[test]
    fn test_duplicate_advance_submits_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let counter = Arc::clone(&calls);
        let gated = move |_: &FormData| -> Result<(), SubmitError> {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = release_rx.lock().unwrap().recv();
            Ok(())
        };
        let mut wizard = WizardController::new(1, FormData::new(), gated).unwrap();

        assert_eq!(wizard.advance(), Transition::SubmitStarted);
        assert_eq!(wizard.advance(), Transition::Ignored);
        assert!(wizard.is_submitting());
        assert!(wizard.poll().is_none());

        release_tx.send(()).unwrap();
        assert!(wizard.wait(WAIT).unwrap().is_completed());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_updates_allowed_while_submitting() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let seen = Arc::new(Mutex::new(FormData::new()));
        let sink = Arc::clone(&seen);
        let gated = move |data: &FormData| -> Result<(), SubmitError> {
            let _ = release_rx.lock().unwrap().recv();
            *sink.lock().unwrap() = data.clone();
            Ok(())
        };
        let mut wizard =
            WizardController::new(1, patch(json!({"name": "Ada"})), gated).unwrap();

        wizard.advance();
        wizard.update_data(patch(json!({"name": "Grace"})));
        release_tx.send(()).unwrap();
        wizard.wait(WAIT).unwrap();

        // the submit saw the snapshot taken when it started
        assert_eq!(seen.lock().unwrap().get("name"), Some(&json!("Ada")));
        assert_eq!(wizard.form_data().get("name"), Some(&json!("Grace")));
        assert_eq!(
            wizard.submitted_data().and_then(|data| data.get("name")),
            Some(&json!("Ada"))
        );
    }

    #[test]
    fn test_timed_out_worker_blocks_next_submit() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let (running_in, peak_in, calls_in) =
            (Arc::clone(&running), Arc::clone(&peak), Arc::clone(&calls));
        let slow = move |_: &FormData| -> Result<(), SubmitError> {
            calls_in.fetch_add(1, Ordering::SeqCst);
            let now = running_in.fetch_add(1, Ordering::SeqCst) + 1;
            peak_in.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(400));
            running_in.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        };
        let mut wizard = WizardController::new(1, FormData::new(), slow)
            .unwrap()
            .with_submit_timeout(Duration::from_millis(50));

        assert_eq!(wizard.advance(), Transition::SubmitStarted);
        assert!(matches!(
            wizard.wait(WAIT),
            Some(SubmitResolution::Failed(SubmitError::TimedOut(_)))
        ));

        // the first worker is still sleeping
        assert_eq!(wizard.advance(), Transition::Ignored);
        assert!(!wizard.is_submitting());
        assert!(wizard.has_abandoned_submit());

        let deadline = Instant::now() + WAIT;
        while wizard.has_abandoned_submit() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(wizard.advance(), Transition::SubmitStarted);

        // give the second attempt room to finish
        let mut wizard = wizard.with_submit_timeout(Duration::from_secs(5));
        assert!(wizard.wait(WAIT).unwrap().is_completed());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_submit_timeout() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let gated = move |_: &FormData| -> Result<(), SubmitError> {
            let _ = release_rx.lock().unwrap().recv();
            Ok(())
        };
        let mut wizard = WizardController::new(1, FormData::new(), gated)
            .unwrap()
            .with_submit_timeout(Duration::from_millis(50));

        wizard.advance();
        let resolution = wizard.wait(WAIT).unwrap();
        assert!(matches!(
            resolution,
            SubmitResolution::Failed(SubmitError::TimedOut(_))
        ));
        assert_eq!(wizard.current_step(), 1);

        // the late success of the abandoned attempt must not complete the wizard
        release_tx.send(()).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        assert!(wizard.poll().is_none());
        assert_eq!(wizard.current_step(), 1);
    }

    #[test]
    fn test_panicking_submitter_is_a_failure() {
        let exploding = |_: &FormData| -> Result<(), SubmitError> { panic!("boom") };
        let mut wizard = WizardController::new(1, FormData::new(), exploding).unwrap();

        wizard.advance();
        match wizard.wait(WAIT).unwrap() {
            SubmitResolution::Failed(SubmitError::Panicked(message)) => {
                assert_eq!(message, "boom")
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
        assert!(!wizard.is_submitting());
    }

    #[test]
    fn test_channel_observer_events() {
        let (tx, rx) = mpsc::channel();
        let mut wizard = WizardController::new(2, FormData::new(), accept_all)
            .unwrap()
            .with_observer(tx);

        wizard.retreat();
        wizard.advance();
        wizard.retreat();
        wizard.advance();
        wizard.advance();
        wizard.wait(WAIT).unwrap();
        wizard.advance();

        let events: Vec<WizardEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                WizardEvent::StepChanged(2),
                WizardEvent::StepChanged(1),
                WizardEvent::StepChanged(2),
                WizardEvent::SubmitStarted,
                WizardEvent::StepChanged(3),
                WizardEvent::SubmitSucceeded,
            ]
        );
    }

    #[test]
    fn test_step_callback_skips_noops() {
        let steps = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&steps);
        let mut wizard = WizardController::new(2, FormData::new(), accept_all)
            .unwrap()
            .with_observer(OnStepChange(move |step: usize| sink.lock().unwrap().push(step)));

        wizard.retreat();
        wizard.retreat();
        wizard.advance();
        wizard.retreat();

        assert_eq!(*steps.lock().unwrap(), vec![2, 1]);
    }
}
