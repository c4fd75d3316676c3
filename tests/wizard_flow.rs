//! End-to-end wizard runs against a real outbox directory

use expert_onboarding::hash::submission_id;
use expert_onboarding::{
    Config, FormData, OutboxSubmitter, SubmitError, SubmitResolution, Transition,
    WizardController, WizardDefinition, WizardEvent, list_submissions,
};
use serde_json::{Value, json};
use std::sync::mpsc;
use std::time::Duration;
use tempfile::tempdir;

const WAIT: Duration = Duration::from_secs(5);

fn object(value: Value) -> FormData {
    value.as_object().cloned().unwrap()
}

/// Answers grouped by step, as a user would enter them
fn step_answers() -> Vec<FormData> {
    vec![
        object(json!({"full_name": "Grace Hopper", "email": "grace@example.com"})),
        object(json!({
            "primary_domain": "Data Engineering",
            "skills": ["COBOL", "compilers"],
            "years_experience": "40",
        })),
        object(json!({"hours_per_week": "20-30", "hourly_rate": "300", "remote_only": true})),
        object(json!({"accept_terms": true})),
    ]
}

#[test]
fn walks_every_step_and_stores_the_submission() {
    let dir = tempdir().unwrap();
    let definition = WizardDefinition::default();
    let submitter = OutboxSubmitter::new(dir.path()).with_definition(definition.clone());
    let (tx, rx) = mpsc::channel();

    let mut wizard =
        WizardController::new(definition.step_count(), definition.initial_data(), submitter)
            .unwrap()
            .with_observer(tx);

    for (index, answers) in step_answers().into_iter().enumerate() {
        let step = index + 1;
        assert_eq!(wizard.current_step(), step);
        wizard.update_data(answers);
        assert!(definition.check_step(step, wizard.form_data()).is_empty());

        let expected = if step < definition.step_count() {
            Transition::Moved { from: step, to: step + 1 }
        } else {
            Transition::SubmitStarted
        };
        assert_eq!(wizard.advance(), expected);
    }

    // a second advance while pending is swallowed
    assert_eq!(wizard.advance(), Transition::Ignored);

    let resolution = wizard.wait(WAIT).unwrap();
    assert!(resolution.is_completed());
    assert!(wizard.is_complete());
    assert_eq!(wizard.current_step(), definition.step_count() + 1);

    let events: Vec<WizardEvent> = rx.try_iter().collect();
    assert_eq!(
        events,
        vec![
            WizardEvent::StepChanged(2),
            WizardEvent::StepChanged(3),
            WizardEvent::StepChanged(4),
            WizardEvent::SubmitStarted,
            WizardEvent::StepChanged(5),
            WizardEvent::SubmitSucceeded,
        ]
    );

    let stored = list_submissions(dir.path()).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, submission_id(wizard.form_data()).unwrap());
    assert_eq!(stored[0].data["skills"], json!(["COBOL", "compilers"]));
    assert_eq!(stored[0].wizard, "Expert Onboarding");
}

#[test]
fn rejected_submission_can_be_fixed_and_retried() {
    let dir = tempdir().unwrap();
    let definition = WizardDefinition::default();
    let submitter = OutboxSubmitter::new(dir.path()).with_definition(definition.clone());

    let mut wizard =
        WizardController::new(definition.step_count(), definition.initial_data(), submitter)
            .unwrap();

    // skip the per-step checks so the outbox has to reject
    let mut answers = step_answers();
    answers[0].remove("email");
    for patch in answers {
        wizard.update_data(patch);
        wizard.advance();
    }

    match wizard.wait(WAIT) {
        Some(SubmitResolution::Failed(SubmitError::Rejected(reason))) => {
            assert!(reason.contains("Email"), "{reason}");
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
    assert_eq!(wizard.current_step(), definition.step_count());
    assert!(!wizard.is_submitting());
    assert!(wizard.last_error().is_some());
    assert!(list_submissions(dir.path()).unwrap().is_empty());

    wizard.update_data(object(json!({"email": "grace@example.com"})));
    assert_eq!(wizard.advance(), Transition::SubmitStarted);
    assert!(wizard.last_error().is_none());
    assert!(wizard.wait(WAIT).unwrap().is_completed());
    assert_eq!(list_submissions(dir.path()).unwrap().len(), 1);
}

#[test]
fn retreat_keeps_answers_and_stops_at_the_first_step() {
    let dir = tempdir().unwrap();
    let mut wizard = WizardController::new(3, FormData::new(), OutboxSubmitter::new(dir.path()))
        .unwrap();

    wizard.update_data(object(json!({"full_name": "Ada"})));
    wizard.advance();
    wizard.update_data(object(json!({"skills": ["Rust"]})));
    wizard.advance();
    assert_eq!(wizard.current_step(), 3);

    assert_eq!(wizard.retreat(), Transition::Moved { from: 3, to: 2 });
    assert_eq!(wizard.retreat(), Transition::Moved { from: 2, to: 1 });
    assert_eq!(wizard.retreat(), Transition::Ignored);
    assert_eq!(
        wizard.form_data(),
        &object(json!({"full_name": "Ada", "skills": ["Rust"]}))
    );
}

#[test]
fn config_drives_delay_and_timeout() {
    let dir = tempdir().unwrap();
    let config = Config {
        outbox_dir: dir.path().join("outbox"),
        submit_delay_ms: 2_000,
        ..Config::default()
    };

    let mut wizard = WizardController::new(1, FormData::new(), {
        let mut single = config.clone();
        single.wizard.steps.truncate(1);
        single.wizard.steps[0].fields.clear();
        single.submitter()
    })
    .unwrap()
    .with_submit_timeout(Duration::from_millis(100));

    assert_eq!(wizard.advance(), Transition::SubmitStarted);
    match wizard.wait(WAIT) {
        Some(SubmitResolution::Failed(SubmitError::TimedOut(limit))) => {
            assert_eq!(limit, Duration::from_millis(100));
        }
        other => panic!("expected a timeout, got {other:?}"),
    }
    assert_eq!(wizard.current_step(), 1);
    assert!(!wizard.is_submitting());
}

#[test]
fn zero_steps_is_rejected() {
    let dir = tempdir().unwrap();
    let result = WizardController::new(0, FormData::new(), OutboxSubmitter::new(dir.path()));
    assert!(result.is_err());
}

#[test]
fn stored_id_follows_the_submitted_snapshot() {
    let dir = tempdir().unwrap();
    let submitter = OutboxSubmitter::new(dir.path()).with_delay(Duration::from_millis(300));
    let mut wizard =
        WizardController::new(1, object(json!({"full_name": "Ada"})), submitter).unwrap();

    assert_eq!(wizard.advance(), Transition::SubmitStarted);
    // edits during the pending window stay local
    wizard.update_data(object(json!({"full_name": "Grace"})));
    assert!(wizard.wait(WAIT).unwrap().is_completed());

    let submitted = wizard.submitted_data().unwrap();
    assert_eq!(submitted["full_name"], json!("Ada"));

    let stored = list_submissions(dir.path()).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, submission_id(submitted).unwrap());
    assert_ne!(stored[0].id, submission_id(wizard.form_data()).unwrap());
}
