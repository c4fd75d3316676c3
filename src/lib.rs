//! Expert Onboarding - a step-by-step signup wizard for the expert marketplace
//!
//! This library provides:
//! - A linear step controller with an asynchronous submit and re-entrancy guard
//! - Declarative wizard definitions with per-step field checks
//! - An outbox submitter storing content-addressed JSON submissions
//! - TOML configuration and a clap CLI
//! - A ratatui terminal front end

// Initialize i18n with locale files
rust_i18n::i18n!("locales", fallback = "en");

pub mod cli;
pub mod config;
pub mod definition;
pub mod error;
pub mod hash;
pub mod i18n;
pub mod submit;
pub mod tui;
pub mod wizard;

pub use cli::Cli;
pub use config::{Config, ConfigError};
pub use definition::{FieldDefinition, FieldIssue, FieldKind, StepDefinition, WizardDefinition};
pub use error::{Error, Result, SubmitError, WizardError};
pub use i18n::init_locale;
pub use submit::{OutboxSubmitter, Submission, Submitter, list_submissions};
pub use tui::{TuiApp, TuiResult, display_submissions, should_run_interactive};
pub use wizard::{
    FormData, OnStepChange, SubmitResolution, Transition, WizardController, WizardEvent,
    WizardObserver, WizardState,
};
