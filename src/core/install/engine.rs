//! The install engine.
//!
//! A single thread owns the queue, the install log and the metrics sampler.
//! Front ends never touch the queue: they send [`EngineCommand`]s and render
//! the [`EngineEvent`]s that come back. Installers run one at a time, in
//! insertion order, and commands are still handled while an installer runs.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tokio::sync::watch;

use super::launcher::{
    ExitOutcome, InstallMode, InstallerProcess, Invocation, Launcher, StopPolicy, SystemLauncher,
};
use super::log::{InstallLog, LogLevel, LogLine};
use super::queue::{InstallQueue, RunProgress};
use super::record::{FileRecord, InstallStatus, RecordId};
use crate::core::archive::{is_archive, ArchiveExpander};
use crate::core::config::Config;
use crate::core::system_monitor::{
    create_source, snapshot_channel, MetricsBackend, MetricsSampler, MetricsSnapshot,
    SnapshotSender,
};
use crate::error::{NullBatchError, Result};
use crate::platform::{display_name, file_size_bytes, has_extension, resolve_path};

/// Requests accepted by the engine thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Add(PathBuf),
    Clear,
    Start,
    Stop,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

/// Totals reported when a run ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: usize,
    pub failed: usize,
    /// Records still Pending when the run ended
    pub pending: usize,
    pub stopped: bool,
    pub elapsed: Duration,
}

/// Notifications emitted by the engine thread
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    RecordAdded(FileRecord),
    StatusChanged {
        id: RecordId,
        status: InstallStatus,
        progress: String,
    },
    Log(LogLine),
    /// Overall progress of the current run, 0..=100
    Progress(u8),
    RunState(RunState),
    Cleared,
    /// Needs the user's attention (shown as a modal notice)
    Warning(String),
    RunFinished(RunSummary),
}

/// Engine settings derived from [`Config`] and command line overrides
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub mode: InstallMode,
    pub log_file: PathBuf,
    pub poll_interval: Duration,
    pub install_timeout: Option<Duration>,
    pub stop_policy: StopPolicy,
    pub installer_extensions: Vec<String>,
    /// `None` disables the metrics sampler
    pub metrics: Option<(MetricsBackend, Duration)>,
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        Self {
            mode: config.mode,
            log_file: config.log_file.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            install_timeout: config.install_timeout_secs.map(Duration::from_secs),
            stop_policy: config.stop_policy,
            installer_extensions: config.installer_extensions.clone(),
            metrics: Some((
                config.metrics_backend,
                Duration::from_millis(config.metrics_interval_ms.max(1)),
            )),
        }
    }
}

/// How waiting on one installer ended
#[derive(Debug)]
enum Outcome {
    Exited(ExitOutcome),
    LaunchError(String),
    WaitError(String),
    TimedOut(Duration),
    Interrupted { pid: u32, killed: bool },
}

pub struct Engine {
    settings: EngineSettings,
    queue: InstallQueue,
    log: InstallLog,
    expander: ArchiveExpander,
    launcher: Box<dyn Launcher>,
    commands: Receiver<EngineCommand>,
    events: Sender<EngineEvent>,
    snapshot_tx: SnapshotSender,
    sampler: Option<MetricsSampler>,
    state: RunState,
    start_time: Option<Instant>,
    progress: RunProgress,
    stopped_by_user: bool,
    start_requested: bool,
    shutdown: bool,
}

impl Engine {
    pub fn new(
        settings: EngineSettings,
        launcher: Box<dyn Launcher>,
        commands: Receiver<EngineCommand>,
        events: Sender<EngineEvent>,
        snapshot_tx: SnapshotSender,
    ) -> Self {
        Self {
            log: InstallLog::new(settings.log_file.clone()),
            expander: ArchiveExpander::new(settings.installer_extensions.clone()),
            settings,
            queue: InstallQueue::new(),
            launcher,
            commands,
            events,
            snapshot_tx,
            sampler: None,
            state: RunState::Idle,
            start_time: None,
            progress: RunProgress::default(),
            stopped_by_user: false,
            start_requested: false,
            shutdown: false,
        }
    }

    pub fn queue(&self) -> &InstallQueue {
        &self.queue
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Serve commands until `Shutdown` or until every sender is gone
    pub fn run(mut self) {
        log::debug!("Install engine started");

        while !self.shutdown {
            match self.commands.recv() {
                Ok(command) => self.handle(command),
                Err(_) => break,
            }
        }

        self.stop_sampler();
        log::debug!("Install engine stopped");
    }

    pub fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Add(path) => self.add(&path),
            EngineCommand::Clear => self.clear(),
            EngineCommand::Start => self.start(),
            EngineCommand::Stop => self.stop(),
            EngineCommand::Shutdown => {
                if self.state == RunState::Running {
                    self.halt();
                    self.write_log(LogLevel::Warning, "Installation stopped: shutting down");
                }
                self.shutdown = true;
            }
        }
    }

    /// Queue a file, expand an archive, or scan a folder.
    pub fn add(&mut self, path: &Path) {
        let resolved = resolve_path(path);
        let path = resolved.as_path();

        if !path.exists() {
            self.write_log(
                LogLevel::Error,
                &format!("Error: File not found - {}", path.display()),
            );
            return;
        }

        if path.is_dir() {
            self.add_directory(path);
        } else if is_archive(path) {
            self.expand_archive(path);
        } else {
            self.add_file(path);
        }
    }

    fn add_file(&mut self, path: &Path) {
        let size = match file_size_bytes(path) {
            Ok(size) => size,
            Err(e) => {
                self.write_log(
                    LogLevel::Error,
                    &format!("Error reading {}: {}", path.display(), e),
                );
                return;
            }
        };

        let record = self.queue.push(path.to_path_buf(), size);
        let name = record.name();
        self.emit(EngineEvent::RecordAdded(record));

        // Files added mid-run join the current run
        if self.state == RunState::Running {
            self.progress.total += 1;
        }

        self.write_log(LogLevel::Info, &format!("Added: {}", name));
    }

    fn expand_archive(&mut self, archive: &Path) {
        match self.expander.expand(archive) {
            Ok(expansion) => {
                self.write_log(
                    LogLevel::Success,
                    &format!("Successfully extracted: {}", archive.display()),
                );

                if expansion.installers.is_empty() {
                    self.write_log(
                        LogLevel::Warning,
                        &format!(
                            "No installers found in {} ({} files extracted)",
                            display_name(archive),
                            expansion.entry_count
                        ),
                    );
                }

                for installer in &expansion.installers {
                    self.add_file(installer);
                }
            }
            Err(e) => {
                self.write_log(
                    LogLevel::Error,
                    &format!("Error extracting {}: {}", archive.display(), e),
                );
            }
        }
    }

    fn add_directory(&mut self, dir: &Path) {
        let mut installers: Vec<PathBuf> = ignore::WalkBuilder::new(dir)
            .standard_filters(false)
            .build()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| has_extension(path, &self.settings.installer_extensions))
            .collect();
        installers.sort();

        if installers.is_empty() {
            self.write_log(
                LogLevel::Warning,
                &format!("No installers found in folder {}", dir.display()),
            );
            return;
        }

        for installer in &installers {
            self.add_file(installer);
        }
    }

    /// Remove every record. Refused while a run is in progress.
    pub fn clear(&mut self) {
        if self.state == RunState::Running {
            self.write_log(
                LogLevel::Warning,
                "Cannot clear the installation list while installation is running",
            );
            return;
        }

        self.queue.clear();
        self.emit(EngineEvent::Cleared);
        self.write_log(LogLevel::Info, "Cleared installation list");
    }

    /// Drain the queue on this thread until it is exhausted or stopped.
    pub fn start(&mut self) {
        if self.state == RunState::Running {
            log::debug!("Start ignored, a run is already in progress");
            return;
        }

        if self.queue.is_empty() {
            self.emit(EngineEvent::Warning(
                "Please add files to install first.".to_string(),
            ));
            return;
        }

        loop {
            self.begin_run();
            self.drain();
            self.finish_run();

            if self.shutdown || !std::mem::take(&mut self.start_requested) {
                break;
            }
        }
    }

    fn begin_run(&mut self) {
        self.state = RunState::Running;
        self.stopped_by_user = false;
        self.start_time = Some(Instant::now());
        self.progress = RunProgress::new(self.queue.pending_count());

        self.emit(EngineEvent::RunState(RunState::Running));
        self.emit(EngineEvent::Progress(self.progress.percent()));
        self.start_sampler();

        self.write_log(
            LogLevel::Info,
            &format!(
                "Starting installation of {} file(s) in {} mode",
                self.progress.total, self.settings.mode
            ),
        );
    }

    fn drain(&mut self) {
        loop {
            self.pump_commands();
            if self.state != RunState::Running {
                break;
            }

            let Some(id) = self.queue.next_pending() else {
                break;
            };

            self.install(id);
            self.progress.finished += 1;
            self.emit(EngineEvent::Progress(self.progress.percent()));
        }
    }

    fn finish_run(&mut self) {
        if self.state == RunState::Running {
            self.state = RunState::Idle;
            self.emit(EngineEvent::RunState(RunState::Idle));
            self.stop_sampler();
            self.write_log(LogLevel::Info, "Installation process completed");
        }

        let elapsed = self
            .start_time
            .map(|t| t.elapsed())
            .unwrap_or_default();

        self.emit(EngineEvent::RunFinished(RunSummary {
            completed: self.queue.count(InstallStatus::Completed),
            failed: self.queue.count(InstallStatus::Failed),
            pending: self.queue.pending_count(),
            stopped: self.stopped_by_user,
            elapsed,
        }));
    }

    /// Halt progression to the next record. Safe to call while idle.
    pub fn stop(&mut self) {
        if self.state == RunState::Running {
            self.stopped_by_user = true;
        }
        self.halt();
        self.write_log(LogLevel::Warning, "Installation stopped by user");
    }

    fn halt(&mut self) {
        self.state = RunState::Idle;
        self.start_requested = false;
        self.emit(EngineEvent::RunState(RunState::Idle));
        self.stop_sampler();
    }

    /// Handle whatever arrived while the current record was running
    fn pump_commands(&mut self) {
        loop {
            match self.commands.try_recv() {
                Ok(command) => self.handle_during_run(command),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnect();
                    break;
                }
            }
        }
    }

    fn handle_during_run(&mut self, command: EngineCommand) {
        match command {
            // A start after a stop in the same batch runs again once this drain unwinds
            EngineCommand::Start if self.state == RunState::Idle => self.start_requested = true,
            EngineCommand::Start => {}
            other => self.handle(other),
        }
    }

    fn disconnect(&mut self) {
        if self.state == RunState::Running {
            self.halt();
        }
        self.shutdown = true;
    }

    fn install(&mut self, id: RecordId) {
        let Some(record) = self.queue.get(id).cloned() else {
            return;
        };
        let name = record.name();

        self.set_status(id, InstallStatus::Installing);

        let invocation = Invocation::for_installer(record.path(), self.settings.mode);
        log::info!("Executing command: {}", invocation);

        let outcome = match self.launcher.launch(&invocation) {
            Ok(process) => self.wait_for(process),
            Err(e) => Outcome::LaunchError(e.to_string()),
        };

        log::info!("{} finished: {:?}", name, outcome);

        match outcome {
            Outcome::Exited(exit) if exit.success() => {
                self.set_status(id, InstallStatus::Completed);
                self.write_log(
                    LogLevel::Success,
                    &format!("Successfully installed: {}", name),
                );
            }
            Outcome::Exited(ExitOutcome::Code(code)) => {
                self.set_status(id, InstallStatus::Failed);
                self.write_log(
                    LogLevel::Error,
                    &format!("Installation failed for {} (exit code {})", name, code),
                );
            }
            Outcome::Exited(ExitOutcome::Terminated) => {
                self.set_status(id, InstallStatus::Failed);
                self.write_log(
                    LogLevel::Error,
                    &format!(
                        "Installation failed for {} (terminated without exit code)",
                        name
                    ),
                );
            }
            Outcome::LaunchError(e) | Outcome::WaitError(e) => {
                self.set_status(id, InstallStatus::Failed);
                self.write_log(
                    LogLevel::Error,
                    &format!("Error installing {}: {}", name, e),
                );
            }
            Outcome::TimedOut(limit) => {
                self.set_status(id, InstallStatus::Failed);
                self.write_log(
                    LogLevel::Error,
                    &format!(
                        "Installation of {} timed out after {}s; installer process killed",
                        name,
                        limit.as_secs()
                    ),
                );
            }
            Outcome::Interrupted { pid, killed } => {
                self.set_status(id, InstallStatus::Failed);
                let fate = if killed {
                    "installer process killed".to_string()
                } else {
                    format!("installer process left running (pid {})", pid)
                };
                self.write_log(
                    LogLevel::Warning,
                    &format!("Installation of {} interrupted by stop; {}", name, fate),
                );
            }
        }
    }

    /// Check the child every poll interval, serving commands in between
    fn wait_for(&mut self, mut process: Box<dyn InstallerProcess>) -> Outcome {
        let started = Instant::now();

        loop {
            match process.try_wait() {
                Ok(Some(exit)) => return Outcome::Exited(exit),
                Ok(None) => {}
                Err(e) => return Outcome::WaitError(e.to_string()),
            }

            if let Some(limit) = self.settings.install_timeout {
                if started.elapsed() >= limit {
                    if let Err(e) = process.kill() {
                        log::warn!("Failed to kill timed out installer: {}", e);
                    }
                    return Outcome::TimedOut(limit);
                }
            }

            match self.commands.recv_timeout(self.settings.poll_interval) {
                Ok(command) => self.handle_during_run(command),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => self.disconnect(),
            }

            if self.state != RunState::Running {
                return self.interrupt(process);
            }
        }
    }

    fn interrupt(&mut self, mut process: Box<dyn InstallerProcess>) -> Outcome {
        // It may have finished while we were handling the stop
        if let Ok(Some(exit)) = process.try_wait() {
            return Outcome::Exited(exit);
        }

        let pid = process.id();
        match self.settings.stop_policy {
            StopPolicy::Detach => Outcome::Interrupted { pid, killed: false },
            StopPolicy::Kill => {
                let killed = match process.kill() {
                    Ok(()) => true,
                    Err(e) => {
                        log::warn!("Failed to kill installer (pid {}): {}", pid, e);
                        false
                    }
                };
                Outcome::Interrupted { pid, killed }
            }
        }
    }

    fn set_status(&mut self, id: RecordId, status: InstallStatus) {
        if self.queue.set_status(id, status) {
            self.emit(EngineEvent::StatusChanged {
                id,
                status,
                progress: status.progress().to_string(),
            });
        }
    }

    fn start_sampler(&mut self) {
        let Some((backend, period)) = self.settings.metrics else {
            return;
        };
        if self.sampler.is_some() {
            return;
        }

        match MetricsSampler::start(create_source(backend), period, self.snapshot_tx.clone()) {
            Ok(sampler) => self.sampler = Some(sampler),
            Err(e) => log::warn!("Could not start metrics sampler: {}", e),
        }
    }

    fn stop_sampler(&mut self) {
        if let Some(sampler) = self.sampler.take() {
            sampler.stop();
        }
    }

    fn write_log(&mut self, level: LogLevel, message: &str) {
        let line = self.log.append(level, message);
        self.emit(EngineEvent::Log(line));
    }

    fn emit(&self, event: EngineEvent) {
        // The front end may already be gone during shutdown
        let _ = self.events.send(event);
    }
}

/// Front-end side of a running engine thread
pub struct EngineHandle {
    commands: Sender<EngineCommand>,
    events: Receiver<EngineEvent>,
    metrics: watch::Receiver<MetricsSnapshot>,
    thread: Option<JoinHandle<()>>,
}

impl EngineHandle {
    /// Spawn an engine that launches real processes
    pub fn spawn(config: &Config) -> Result<Self> {
        Self::spawn_with(EngineSettings::from(config), Box::new(SystemLauncher))
    }

    pub fn spawn_with(settings: EngineSettings, launcher: Box<dyn Launcher>) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let (snapshot_tx, snapshot_rx) = snapshot_channel();

        let engine = Engine::new(settings, launcher, command_rx, event_tx, snapshot_tx);

        let thread = std::thread::Builder::new()
            .name("install-engine".to_string())
            .spawn(move || engine.run())?;

        Ok(Self {
            commands: command_tx,
            events: event_rx,
            metrics: snapshot_rx,
            thread: Some(thread),
        })
    }

    pub fn send(&self, command: EngineCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| NullBatchError::EngineDisconnected)
    }

    pub fn add(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.send(EngineCommand::Add(path.into()))
    }

    pub fn start(&self) -> Result<()> {
        self.send(EngineCommand::Start)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(EngineCommand::Stop)
    }

    pub fn clear(&self) -> Result<()> {
        self.send(EngineCommand::Clear)
    }

    /// A sender usable from other threads (signal handlers)
    pub fn commander(&self) -> Sender<EngineCommand> {
        self.commands.clone()
    }

    pub fn events(&self) -> &Receiver<EngineEvent> {
        &self.events
    }

    /// Everything emitted since the last call, without blocking
    pub fn drain_events(&self) -> Vec<EngineEvent> {
        self.events.try_iter().collect()
    }

    pub fn metrics(&self) -> watch::Receiver<MetricsSnapshot> {
        self.metrics.clone()
    }

    /// Ask the engine to exit and wait for its thread
    pub fn shutdown(mut self) {
        self.join();
    }

    fn join(&mut self) {
        let _ = self.commands.send(EngineCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Install engine thread panicked");
            }
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.join();
    }
}
