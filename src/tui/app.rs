//! TUI application main module
//!
//! Owns the terminal and the event loop. Every tick also polls the active
//! onboarding session so a finished submit shows up without a key press.

use crate::config::Config;
use crate::tui::event::{EventPoll, TuiEvent, disable_bracketed_paste, enable_bracketed_paste};
use crate::tui::state::{
    AppState, MenuItem, OnboardingSession, Screen, Selectable, SubmissionsState, TuiResult,
    reset_to_main_menu,
};
use crate::tui::ui::render;
use ratatui::DefaultTerminal;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// TUI application
#[derive(Debug)]
pub struct TuiApp {
    /// Terminal
    pub terminal: DefaultTerminal,
    /// Event poller
    pub event_poll: EventPoll,
    /// Application state
    pub state: AppState,
}

impl TuiApp {
    /// Create new TUI application
    pub fn new(config: Config) -> std::io::Result<Self> {
        let terminal = ratatui::init();
        if let Err(e) = enable_bracketed_paste() {
            warn!(error = %e, "Bracketed paste unavailable");
        }

        Ok(Self {
            terminal,
            event_poll: EventPoll::default(),
            state: AppState::new(config),
        })
    }

    /// Set log path
    pub fn set_log_path(&mut self, path: PathBuf) {
        self.state.log_path = Some(path);
    }

    /// Run application until the user exits
    pub fn run(&mut self) -> std::io::Result<TuiResult> {
        let outcome = self.event_loop();

        let _ = disable_bracketed_paste();
        ratatui::restore();

        outcome?;
        Ok(std::mem::take(&mut self.state.result))
    }

    fn event_loop(&mut self) -> std::io::Result<()> {
        render(&mut self.terminal, &mut self.state)?;

        loop {
            let event = self.event_poll.next();
            let mut dirty = self.state.poll_session();

            match event {
                TuiEvent::None => {}
                TuiEvent::Resize(_, _) => dirty = true,
                TuiEvent::CtrlC => {
                    if self.state.current_screen == Screen::Exit {
                        return Ok(());
                    }
                    self.state.show_exit_confirm();
                    dirty = true;
                }
                event => {
                    if self.handle_event(event) {
                        return Ok(());
                    }
                    dirty = true;
                }
            }

            if dirty {
                render(&mut self.terminal, &mut self.state)?;
            }
        }
    }

    /// Handle event, returns true when the application should exit
    fn handle_event(&mut self, event: TuiEvent) -> bool {
        match self.state.current_screen {
            Screen::MainMenu => self.handle_main_menu(event),
            Screen::Onboarding => {
                self.handle_onboarding(event);
                false
            }
            Screen::Complete => {
                if matches!(event, TuiEvent::Enter | TuiEvent::Escape) {
                    reset_to_main_menu(&mut self.state);
                }
                false
            }
            Screen::Submissions => {
                self.handle_submissions(event);
                false
            }
            Screen::Exit => self.handle_exit(event),
        }
    }

    /// Handle main menu event
    fn handle_main_menu(&mut self, event: TuiEvent) -> bool {
        match event {
            TuiEvent::Up | TuiEvent::BackTab => self.state.menu_state.prev(),
            TuiEvent::Down | TuiEvent::Tab => self.state.menu_state.next(),
            TuiEvent::Enter => match self.state.menu_state.selected_item() {
                MenuItem::StartOnboarding => self.start_onboarding(),
                MenuItem::BrowseSubmissions => self.browse_submissions(),
                MenuItem::Exit => self.state.show_exit_confirm(),
            },
            TuiEvent::Escape | TuiEvent::Char('q') => self.state.show_exit_confirm(),
            _ => {}
        }
        false
    }

    fn start_onboarding(&mut self) {
        match OnboardingSession::start(&self.state.config) {
            Ok(session) => {
                self.state.session = Some(session);
                self.state.error_message = None;
                self.state.current_screen = Screen::Onboarding;
            }
            Err(e) => {
                error!(error = %e, "Could not start onboarding");
                self.state.error_message = Some(e.to_string());
            }
        }
    }

    fn browse_submissions(&mut self) {
        self.state.submissions = SubmissionsState::load(&self.state.config.outbox_dir);
        self.state.current_screen = Screen::Submissions;
    }

    /// Handle onboarding form event
    fn handle_onboarding(&mut self, event: TuiEvent) {
        let Some(session) = self.state.session.as_mut() else {
            reset_to_main_menu(&mut self.state);
            return;
        };

        if session.form.in_input_mode {
            let input = &mut session.form.input;
            match event {
                TuiEvent::Char(c) => input.insert_char(c),
                TuiEvent::Paste(text) => text
                    .chars()
                    .filter(|c| !c.is_control())
                    .for_each(|c| input.insert_char(c)),
                TuiEvent::Backspace => input.delete_before_cursor(),
                TuiEvent::Delete => input.delete_after_cursor(),
                TuiEvent::Left => input.move_cursor_left(),
                TuiEvent::Right => input.move_cursor_right(),
                TuiEvent::Home => input.move_cursor_to_start(),
                TuiEvent::End => input.move_cursor_to_end(),
                TuiEvent::Enter | TuiEvent::Tab => session.commit_edit(),
                TuiEvent::Escape => session.cancel_edit(),
                _ => {}
            }
            return;
        }

        match event {
            TuiEvent::Up | TuiEvent::BackTab => session.select_prev(),
            TuiEvent::Down | TuiEvent::Tab => session.select_next(),
            TuiEvent::Left => session.cycle(false),
            TuiEvent::Right | TuiEvent::Char(' ') => session.cycle(true),
            TuiEvent::Enter => {
                session.activate();
            }
            TuiEvent::Escape => {
                if session.is_submitting() {
                    return;
                }
                if session.controller().can_retreat() {
                    session.retreat();
                } else {
                    info!("Onboarding abandoned on the first step");
                    reset_to_main_menu(&mut self.state);
                }
            }
            _ => {}
        }
    }

    /// Handle submissions browser event
    fn handle_submissions(&mut self, event: TuiEvent) {
        match event {
            TuiEvent::Up | TuiEvent::BackTab => self.state.submissions.prev(),
            TuiEvent::Down | TuiEvent::Tab => self.state.submissions.next(),
            TuiEvent::Char('r') => self.browse_submissions(),
            TuiEvent::Enter | TuiEvent::Escape => reset_to_main_menu(&mut self.state),
            _ => {}
        }
    }

    /// Handle exit confirmation
    fn handle_exit(&mut self, event: TuiEvent) -> bool {
        match event {
            TuiEvent::Char('y') | TuiEvent::Char('Y') => return true,
            TuiEvent::Char('n') | TuiEvent::Char('N') | TuiEvent::Escape => {
                self.state.close_exit_confirm();
            }
            _ => {}
        }
        false
    }
}
