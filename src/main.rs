//! Expert Onboarding - step-by-step signup wizard for the expert marketplace
//!
//! Without arguments the interactive terminal wizard starts. With
//! `--answers` the same wizard runs headless and submits to the outbox.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use expert_onboarding::hash::submission_id;
use expert_onboarding::wizard::merge_patch;
use expert_onboarding::{
    Cli, Config, FormData, OnStepChange, SubmitResolution, Transition, TuiApp, WizardController,
    display_submissions, init_locale, list_submissions, should_run_interactive,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{Level, debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// Initialize i18n for this binary
rust_i18n::i18n!("locales", fallback = "en");

/// Config looked up beside the executable in interactive mode
const INTERACTIVE_CONFIG_NAME: &str = "onboarding";

/// How long one `wait` call blocks before logging that the submit is still pending
const WAIT_SLICE: Duration = Duration::from_secs(2);

// CLI Output Module
mod cli_output {
    //! CLI 输出美化模块
    //!
    //! 为命令行输出提供统一的颜色和格式样式。

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    /// CLI 主题颜色
    pub struct CliTheme;

    impl CliTheme {
        /// 成功颜色（绿色）
        pub const SUCCESS: Color = Color::Green;
        /// 错误颜色（红色）
        pub const ERROR: Color = Color::Red;
        /// 提示颜色（暗灰色）
        pub const HINT: Color = Color::DarkGrey;
        /// 强调颜色（青色）
        pub const ACCENT: Color = Color::Cyan;
    }

    /// 打印分隔线
    pub fn print_separator() {
        let _ = stdout().execute(Print(format!("{}\n", "─".repeat(60))));
    }

    /// 打印居中的标题
    pub fn print_title(title: &str) {
        let padding = 60usize.saturating_sub(title.chars().count()) / 2;
        let left_pad = " ".repeat(padding.saturating_sub(1));

        let _ = stdout().execute(Print(format!("{}{} {} {}\n", left_pad, "╔", title, "╗").bold()));
        let _ = stdout().execute(Print("\n"));
    }

    /// 打印错误消息
    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    /// 打印提示消息
    pub fn print_hint(msg: &str) {
        let _ = stdout().execute(Print(style("→ ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    /// 打印键值对
    pub fn print_key_value(key: &str, value: &str, value_color: Option<Color>) {
        let key_styled = style(key).with(CliTheme::HINT);
        let value_styled = match value_color {
            Some(color) => style(value).with(color),
            None => style(value).bold(),
        };
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(key_styled));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(value_styled));
        let _ = stdout().execute(Print("\n"));
    }

    /// 打印步骤结果行
    pub fn print_result(status_icon: &str, status_color: Color, step: &str, msg: &str) {
        let icon_styled = style(status_icon).with(status_color).bold();
        let step_styled = style(step).italic();
        let msg_styled = style(msg).with(CliTheme::HINT);

        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(icon_styled));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(step_styled));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(msg_styled));
        let _ = stdout().execute(Print("\n"));
    }

    /// 打印日志文件路径
    pub fn print_log_path(label: &str, path: &str) {
        let _ = stdout().execute(Print("\n"));
        let _ = stdout().execute(Print(style("  📁 ").with(CliTheme::ACCENT)));
        let _ = stdout().execute(Print(style(format!("{} ", label)).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", path)));
    }

    /// 打印空行
    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

/// Convenience macro for translation
macro_rules! t {
    ($key:expr) => {
        rust_i18n::t!($key)
    };
    ($key:expr, $($tt:tt)*) => {
        rust_i18n::t!($key, $($tt)*)
    };
}

fn main() -> Result<()> {
    // Initialize locale based on system settings
    init_locale();

    // Check if we should run in interactive mode
    if should_run_interactive() {
        return run_interactive_mode();
    }

    // Standard CLI mode
    run_cli_mode()
}

/// Run in interactive mode with Ratatui TUI
fn run_interactive_mode() -> Result<()> {
    // Get executable directory first for log path
    let exe_dir = get_executable_dir()?;
    let log_dir = exe_dir.join("Log");
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let log_path = log_dir.join(format!("Interactive_{}.log", timestamp));

    // Setup file-only logging before TUI starts
    let _guard = setup_file_only_logging(&log_path)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Expert Onboarding starting in interactive mode"
    );

    let config_path = resolve_config_path(&exe_dir, Path::new(INTERACTIVE_CONFIG_NAME));
    let config = if config_path.exists() {
        info!(config_file = %config_path.display(), "Loading configuration from file");
        Config::load_from_file(&config_path)?
    } else {
        debug!("No interactive configuration found, using defaults");
        Config::default()
    };

    let mut app = TuiApp::new(config)?;
    app.set_log_path(log_path.clone());

    let result = app.run()?;
    info!(
        submitted = result.submitted.len(),
        log_file = %log_path.display(),
        "Interactive session complete"
    );

    Ok(())
}

/// Run in standard CLI mode
fn run_cli_mode() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    if cli.print_sample_config {
        print!("{}", Config::sample_config()?);
        return Ok(());
    }

    // Get the executable directory for Config and Log directories
    let exe_dir = get_executable_dir()?;

    // Determine log file path based on config file or timestamp
    let log_path = get_log_path(&exe_dir, &cli);

    // Load configuration first so a config file can turn on verbose logging
    let (config, config_file) = load_config(&cli, &exe_dir)?;

    // Setup logging
    let guard = setup_logging(&cli, log_level(&config), &log_path)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Expert Onboarding starting");
    if let Some(path) = config_file {
        info!(config_file = %path.display(), "Configuration loaded from file");
    }

    if config.verbose {
        info!(?config, "Configuration loaded");
    }

    info!(log_file = %log_path.display(), "Log file location");

    if cli.list {
        let submissions = list_submissions(&config.outbox_dir)?;
        info!(count = submissions.len(), outbox = %config.outbox_dir.display(), "Listing submissions");
        display_submissions(&submissions, &config.wizard);
        return Ok(());
    }

    let Some(ref answers_path) = cli.answers else {
        anyhow::bail!("{}", t!("cli_nothing_to_do"));
    };

    let answers = load_answers(answers_path, cli.data.as_deref())?;
    let succeeded = run_headless(&config, answers)?;

    cli_output::print_separator();
    cli_output::print_log_path(&t!("log_saved_to"), &log_path.display().to_string());
    info!(log_file = %log_path.display(), "Run complete. Log saved to");

    if !succeeded {
        // exit skips destructors; flush the log writer first
        drop(guard);
        std::process::exit(1);
    }
    Ok(())
}

/// Read the answers file and overlay the inline `--data` object
fn load_answers(path: &Path, inline: Option<&str>) -> Result<FormData> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("{} {}", t!("cli_answers_read_error"), path.display()))?;
    let mut answers = parse_object(&content)
        .with_context(|| format!("{} {}", t!("cli_answers_parse_error"), path.display()))?;

    if let Some(inline) = inline {
        let overlay = parse_object(inline).context(t!("cli_data_parse_error").to_string())?;
        merge_patch(&mut answers, overlay);
    }

    Ok(answers)
}

fn parse_object(text: &str) -> Result<FormData> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("expected a JSON object, found {}", json_kind(&other)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Walk the wizard step by step with the given answers and submit them
///
/// Returns whether the submission was accepted.
fn run_headless(config: &Config, mut answers: FormData) -> Result<bool> {
    use cli_output::*;

    let definition = &config.wizard;

    let mut controller = WizardController::new(
        definition.step_count(),
        definition.initial_data(),
        config.submitter(),
    )?
    .with_observer(OnStepChange(|step: usize| debug!(step, "Headless wizard moved")));
    if let Some(timeout) = config.submit_timeout() {
        controller = controller.with_submit_timeout(timeout);
    }

    print_separator();
    print_title(&definition.title);
    print_separator();

    // Keys no step asks for travel with the first step
    let known: std::collections::HashSet<&str> =
        definition.fields().map(|f| f.key.as_str()).collect();
    let extra: FormData = answers
        .iter()
        .filter(|(key, _)| !known.contains(key.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    if !extra.is_empty() {
        warn!(keys = ?extra.keys().collect::<Vec<_>>(), "Answers contain fields outside the wizard");
        controller.update_data(extra);
    }

    for step in &definition.steps {
        let patch: FormData = step
            .fields
            .iter()
            .filter_map(|field| answers.remove(&field.key).map(|v| (field.key.clone(), v)))
            .collect();
        controller.update_data(patch);

        let issues = definition.check_step(controller.current_step(), controller.form_data());
        if !issues.is_empty() {
            print_result("✗", CliTheme::ERROR, &step.title, &t!("cli_step_incomplete"));
            for issue in &issues {
                print_hint(&issue.to_string());
            }
            error!(step = %step.id, issues = issues.len(), "Answers do not complete the step");
            return Ok(false);
        }

        let transition = controller.advance();
        print_result("✓", CliTheme::SUCCESS, &step.title, "");
        if transition == Transition::SubmitStarted {
            break;
        }
    }

    if !controller.is_submitting() {
        anyhow::bail!("wizard finished its steps without starting a submission");
    }

    print_blank();
    print_hint(&t!("submitting"));

    let resolution = loop {
        if let Some(resolution) = controller.wait(WAIT_SLICE) {
            break resolution;
        }
        info!("Submission still pending");
    };

    print_blank();
    match resolution {
        SubmitResolution::Completed => {
            let submitted = controller
                .submitted_data()
                .context("completed wizard has no submitted data")?;
            let id = submission_id(submitted)?;
            let path: PathBuf = config.outbox_dir.join(format!("{}.json", id));
            print_key_value(&t!("submission_id"), &id, Some(CliTheme::SUCCESS));
            print_key_value(&t!("submission_file"), &path.display().to_string(), Some(CliTheme::ACCENT));
            info!(%id, "Headless onboarding complete");
            Ok(true)
        }
        SubmitResolution::Failed(e) => {
            print_error(&t!("submit_failed", error = e.to_string()));
            Ok(false)
        }
    }
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Determine the log file path based on config file or timestamp
fn get_log_path(exe_dir: &Path, cli: &Cli) -> PathBuf {
    let log_dir = exe_dir.join("Log");
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    if let Some(config_name) = cli.config_name() {
        let config_log_dir = log_dir.join(&config_name);
        let log_filename = format!("{}_{}.log", config_name, timestamp);
        config_log_dir.join(log_filename)
    } else {
        let log_filename = format!("CLIRun_{}.log", timestamp);
        log_dir.join(log_filename)
    }
}

/// Resolve config path - supports shorthand syntax
fn resolve_config_path(exe_dir: &Path, config_path: &Path) -> PathBuf {
    if config_path.exists() {
        return config_path.to_path_buf();
    }

    let with_extension = if config_path.extension().is_none() {
        config_path.with_extension("toml")
    } else {
        config_path.to_path_buf()
    };

    if with_extension.exists() {
        return with_extension;
    }

    let config_dir = exe_dir.join("Config");
    let filename = config_path.file_name().unwrap_or(config_path.as_os_str());

    let mut in_config_dir = config_dir.join(filename);
    if in_config_dir.extension().is_none() {
        in_config_dir = in_config_dir.with_extension("toml");
    }

    if in_config_dir.exists() {
        return in_config_dir;
    }

    config_path.to_path_buf()
}

/// Load configuration from file or CLI arguments
///
/// Returns the merged config and the file it came from, if any. Runs before
/// logging is set up.
fn load_config(cli: &Cli, exe_dir: &Path) -> Result<(Config, Option<PathBuf>)> {
    let Some(ref config_path) = cli.config else {
        return Ok((cli.to_config(), None));
    };

    let resolved_path = resolve_config_path(exe_dir, config_path);
    let file_config = Config::load_from_file(&resolved_path)?;
    Ok((cli.merge_with_config(file_config), Some(resolved_path)))
}

/// Log level for the merged configuration
fn log_level(config: &Config) -> Level {
    if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Setup logging for CLI mode (file + console)
fn setup_logging(cli: &Cli, level: Level, log_path: &Path) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if cli.json_log {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(Some(guard))
}

/// Setup logging for interactive mode (file only, no console)
fn setup_file_only_logging(log_path: &Path) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();

    Ok(Some(guard))
}
