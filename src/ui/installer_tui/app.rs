use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::core::install::{
    EngineCommand, EngineEvent, EngineHandle, FileRecord, InstallMode, LogLine, RunState,
};
use crate::core::system_monitor::MetricsSnapshot;
use crate::platform::parse_dropped_paths;

use super::event_handler::InstallerEvent;
use super::render::render_ui;

/// Lines kept in the log pane; the file on disk keeps everything
const LOG_CAPACITY: usize = 2000;

const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Installer dashboard state. A mirror of what the engine reported.
pub struct InstallerApp {
    pub records: Vec<FileRecord>,
    pub log: VecDeque<LogLine>,
    pub progress: u8,
    pub run_state: RunState,
    pub metrics: MetricsSnapshot,
    pub mode: InstallMode,
    pub log_path: PathBuf,
    /// Add prompt buffer, `Some` while the prompt is open
    pub input: Option<String>,
    /// Modal notice, dismissed by any key
    pub notice: Option<String>,
    pub show_help: bool,
    pub should_quit: bool,
    pub selected: usize,
}

impl InstallerApp {
    pub fn new(mode: InstallMode, log_path: PathBuf) -> Self {
        Self {
            records: Vec::new(),
            log: VecDeque::new(),
            progress: 0,
            run_state: RunState::Idle,
            metrics: MetricsSnapshot::zeroed(),
            mode,
            log_path,
            input: None,
            notice: None,
            show_help: false,
            should_quit: false,
            selected: 0,
        }
    }

    pub fn can_start(&self) -> bool {
        self.run_state == RunState::Idle
    }

    pub fn can_stop(&self) -> bool {
        self.run_state == RunState::Running
    }

    /// Fold one engine notification into the view state
    pub fn apply(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::RecordAdded(record) => self.records.push(record),
            EngineEvent::StatusChanged {
                id,
                status,
                progress,
            } => {
                if let Some(record) = self.records.iter_mut().find(|r| r.id == id) {
                    record.status = status;
                    record.progress = progress;
                }
            }
            EngineEvent::Log(line) => {
                self.log.push_back(line);
                while self.log.len() > LOG_CAPACITY {
                    self.log.pop_front();
                }
            }
            EngineEvent::Progress(percent) => self.progress = percent,
            EngineEvent::RunState(state) => self.run_state = state,
            EngineEvent::Cleared => {
                self.records.clear();
                self.selected = 0;
            }
            EngineEvent::Warning(message) => self.notice = Some(message),
            EngineEvent::RunFinished(summary) => {
                log::info!(
                    "Run finished: {} completed, {} failed, {} pending",
                    summary.completed,
                    summary.failed,
                    summary.pending
                );
            }
        }
    }

    /// Translate a key press according to what is on screen
    pub fn map_key(&self, key: KeyEvent) -> InstallerEvent {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return InstallerEvent::Quit;
        }

        if self.notice.is_some() {
            return InstallerEvent::Dismiss;
        }

        if self.show_help {
            return InstallerEvent::ToggleHelp;
        }

        if self.input.is_some() {
            return match key.code {
                KeyCode::Enter => InstallerEvent::SubmitInput,
                KeyCode::Esc => InstallerEvent::CancelInput,
                KeyCode::Backspace => InstallerEvent::Backspace,
                KeyCode::Char(c) => InstallerEvent::Input(c),
                _ => InstallerEvent::None,
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => InstallerEvent::Quit,
            KeyCode::Char('?') | KeyCode::Char('h') => InstallerEvent::ToggleHelp,
            KeyCode::Char('a') => InstallerEvent::BeginAdd,
            KeyCode::Char('s') => InstallerEvent::Start,
            KeyCode::Char('x') => InstallerEvent::Stop,
            KeyCode::Char('c') => InstallerEvent::Clear,
            KeyCode::Up | KeyCode::Char('k') => InstallerEvent::SelectUp,
            KeyCode::Down | KeyCode::Char('j') => InstallerEvent::SelectDown,
            _ => InstallerEvent::None,
        }
    }

    /// Apply a UI event and return the commands it produces for the engine
    pub fn handle_event(&mut self, event: InstallerEvent) -> Vec<EngineCommand> {
        match event {
            InstallerEvent::Quit => {
                self.should_quit = true;
                Vec::new()
            }
            InstallerEvent::ToggleHelp => {
                self.show_help = !self.show_help;
                Vec::new()
            }
            InstallerEvent::BeginAdd => {
                self.input = Some(String::new());
                Vec::new()
            }
            // Disabled controls ignore their key
            InstallerEvent::Start if self.can_start() => vec![EngineCommand::Start],
            InstallerEvent::Stop if self.can_stop() => vec![EngineCommand::Stop],
            InstallerEvent::Start | InstallerEvent::Stop => Vec::new(),
            InstallerEvent::Clear => vec![EngineCommand::Clear],
            InstallerEvent::SelectUp => {
                self.selected = self.selected.saturating_sub(1);
                Vec::new()
            }
            InstallerEvent::SelectDown => {
                let max_index = self.records.len().saturating_sub(1);
                if self.selected < max_index {
                    self.selected += 1;
                }
                Vec::new()
            }
            InstallerEvent::Dismiss => {
                self.notice = None;
                Vec::new()
            }
            InstallerEvent::Input(c) => {
                if let Some(input) = self.input.as_mut() {
                    input.push(c);
                }
                Vec::new()
            }
            InstallerEvent::Backspace => {
                if let Some(input) = self.input.as_mut() {
                    input.pop();
                }
                Vec::new()
            }
            InstallerEvent::SubmitInput => match self.input.take() {
                Some(input) => add_commands(&input),
                None => Vec::new(),
            },
            InstallerEvent::CancelInput => {
                self.input = None;
                Vec::new()
            }
            // A modal is up, same as keys
            InstallerEvent::Paste(_) if self.notice.is_some() || self.show_help => Vec::new(),
            InstallerEvent::Paste(text) => match self.input.as_mut() {
                Some(input) => {
                    input.push_str(text.trim_end_matches(['\r', '\n']));
                    Vec::new()
                }
                None => add_commands(&text),
            },
            InstallerEvent::None => Vec::new(),
        }
    }
}

fn add_commands(text: &str) -> Vec<EngineCommand> {
    parse_dropped_paths(text)
        .into_iter()
        .map(EngineCommand::Add)
        .collect()
}

/// Run the installer TUI application until the user quits.
///
/// Quitting shuts the engine down; a running installer is then handled
/// according to the configured stop policy.
pub fn run_installer_app(
    handle: EngineHandle,
    mode: InstallMode,
    log_path: PathBuf,
    initial: Vec<PathBuf>,
) -> Result<()> {
    for path in initial {
        handle.add(path).context("Failed to queue file")?;
    }

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = InstallerApp::new(mode, log_path);
    let result = event_loop(&mut terminal, &mut app, &handle);

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    handle.shutdown();
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut InstallerApp,
    handle: &EngineHandle,
) -> Result<()> {
    let mut metrics = handle.metrics();

    loop {
        for event in handle.drain_events() {
            app.apply(event);
        }

        if metrics.has_changed().unwrap_or(false) {
            app.metrics = *metrics.borrow_and_update();
        }

        terminal.draw(|frame| render_ui(frame, app))?;

        if event::poll(FRAME_INTERVAL).context("Event poll failed")? {
            let installer_event = match event::read().context("Event read failed")? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.map_key(key),
                Event::Paste(text) => InstallerEvent::Paste(text),
                _ => InstallerEvent::None,
            };

            for command in app.handle_event(installer_event) {
                handle.send(command)?;
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::install::{InstallStatus, LogLevel, RecordId};

    fn app() -> InstallerApp {
        InstallerApp::new(InstallMode::Silent, PathBuf::from("install_log.txt"))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn record(id: u64, name: &str) -> FileRecord {
        FileRecord::new(RecordId(id), PathBuf::from(name), 1024 * 1024)
    }

    #[test]
    fn test_start_and_stop_follow_run_state() {
        let mut app = app();
        assert_eq!(app.handle_event(InstallerEvent::Start), vec![EngineCommand::Start]);
        assert!(app.handle_event(InstallerEvent::Stop).is_empty());

        app.apply(EngineEvent::RunState(RunState::Running));
        assert!(app.handle_event(InstallerEvent::Start).is_empty());
        assert_eq!(app.handle_event(InstallerEvent::Stop), vec![EngineCommand::Stop]);
    }

    #[test]
    fn test_status_change_updates_matching_record() {
        let mut app = app();
        app.apply(EngineEvent::RecordAdded(record(1, "setup.exe")));
        app.apply(EngineEvent::RecordAdded(record(2, "setup.exe")));

        app.apply(EngineEvent::StatusChanged {
            id: RecordId(2),
            status: InstallStatus::Completed,
            progress: "100%".into(),
        });

        assert_eq!(app.records[0].status, InstallStatus::Pending);
        assert_eq!(app.records[1].status, InstallStatus::Completed);
        assert_eq!(app.records[1].progress, "100%");
    }

    #[test]
    fn test_warning_opens_modal_and_any_key_dismisses() {
        let mut app = app();
        app.apply(EngineEvent::Warning("Please add files to install first.".into()));
        assert!(app.notice.is_some());

        let event = app.map_key(key(KeyCode::Char('s')));
        assert_eq!(event, InstallerEvent::Dismiss);
        assert!(app.handle_event(event).is_empty());
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_add_prompt_submits_paths() {
        let mut app = app();
        app.handle_event(app.map_key(key(KeyCode::Char('a'))));
        assert_eq!(app.input.as_deref(), Some(""));

        for c in "/tmp/a.exe".chars() {
            let event = app.map_key(key(KeyCode::Char(c)));
            app.handle_event(event);
        }
        let commands = app.handle_event(app.map_key(key(KeyCode::Enter)));

        assert_eq!(commands, vec![EngineCommand::Add(PathBuf::from("/tmp/a.exe"))]);
        assert!(app.input.is_none());
    }

    #[test]
    fn test_paste_outside_prompt_adds_each_path() {
        let mut app = app();
        let commands = app.handle_event(InstallerEvent::Paste(
            "file:///tmp/one.msi\n/tmp/two.zip\n".into(),
        ));
        assert_eq!(
            commands,
            vec![
                EngineCommand::Add(PathBuf::from("/tmp/one.msi")),
                EngineCommand::Add(PathBuf::from("/tmp/two.zip")),
            ]
        );
    }

    #[test]
    fn test_paste_is_ignored_behind_notice_and_help() {
        let mut app = app();
        app.apply(EngineEvent::Warning("Please add files to install first.".into()));
        assert!(app
            .handle_event(InstallerEvent::Paste("/tmp/one.msi\n".into()))
            .is_empty());
        assert!(app.notice.is_some());

        app.handle_event(InstallerEvent::Dismiss);
        app.handle_event(InstallerEvent::ToggleHelp);
        assert!(app
            .handle_event(InstallerEvent::Paste("/tmp/one.msi\n".into()))
            .is_empty());

        app.handle_event(InstallerEvent::ToggleHelp);
        assert_eq!(
            app.handle_event(InstallerEvent::Paste("/tmp/one.msi\n".into())),
            vec![EngineCommand::Add(PathBuf::from("/tmp/one.msi"))]
        );
    }

    #[test]
    fn test_cleared_resets_records_and_log_is_capped() {
        let mut app = app();
        app.apply(EngineEvent::RecordAdded(record(1, "a.exe")));
        app.handle_event(InstallerEvent::SelectDown);
        app.apply(EngineEvent::Cleared);
        assert!(app.records.is_empty());
        assert_eq!(app.selected, 0);

        for i in 0..LOG_CAPACITY + 5 {
            app.apply(EngineEvent::Log(LogLine {
                level: LogLevel::Info,
                text: format!("line {}", i),
            }));
        }
        assert_eq!(app.log.len(), LOG_CAPACITY);
        assert_eq!(app.log.front().unwrap().text, "line 5");
    }

    #[test]
    fn test_ctrl_c_quits_even_in_prompt() {
        let mut app = app();
        app.input = Some(String::new());
        let event = app.map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(event, InstallerEvent::Quit);
        app.handle_event(event);
        assert!(app.should_quit);
    }
}
