//! End-to-end runs with real child processes (small shell scripts).
#![cfg(unix)]

use nullbatch::core::install::{
    EngineEvent, EngineHandle, EngineSettings, InstallMode, InstallStatus, RunSummary,
    StopPolicy, SystemLauncher,
};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn settings(dir: &Path, mode: InstallMode) -> EngineSettings {
    EngineSettings {
        mode,
        log_file: dir.join("install_log.txt"),
        poll_interval: Duration::from_millis(20),
        install_timeout: None,
        stop_policy: StopPolicy::Detach,
        installer_extensions: vec!["exe".into(), "msi".into()],
        metrics: None,
    }
}

/// Collect events until the run finishes
fn run_to_end(handle: &EngineHandle) -> (Vec<EngineEvent>, RunSummary) {
    let mut events = Vec::new();
    loop {
        let event = handle
            .events()
            .recv_timeout(Duration::from_secs(10))
            .unwrap();
        if let EngineEvent::RunFinished(summary) = event {
            return (events, summary);
        }
        events.push(event);
    }
}

fn final_statuses(events: &[EngineEvent]) -> Vec<InstallStatus> {
    let mut records: Vec<(nullbatch::core::install::RecordId, InstallStatus)> = Vec::new();
    for event in events {
        match event {
            EngineEvent::RecordAdded(record) => records.push((record.id, record.status)),
            EngineEvent::StatusChanged { id, status, .. } => {
                if let Some(entry) = records.iter_mut().find(|(rid, _)| rid == id) {
                    entry.1 = *status;
                }
            }
            _ => {}
        }
    }
    records.into_iter().map(|(_, status)| status).collect()
}

#[test]
fn test_silent_run_passes_flags_and_reports_failures() {
    let temp_dir = TempDir::new().unwrap();
    let args_file = temp_dir.path().join("args.txt");
    let ok = script(
        temp_dir.path(),
        "ok.exe",
        &format!("echo \"$@\" > '{}'\nexit 0", args_file.display()),
    );
    let bad = script(temp_dir.path(), "bad.exe", "exit 3");

    let handle =
        EngineHandle::spawn_with(settings(temp_dir.path(), InstallMode::Silent), Box::new(SystemLauncher))
            .unwrap();
    handle.add(&ok).unwrap();
    handle.add(&bad).unwrap();
    handle.start().unwrap();

    let (events, summary) = run_to_end(&handle);
    handle.shutdown();

    assert_eq!(summary.completed, 1);
    assert_eq!(summary.failed, 1);
    assert!(!summary.stopped);
    assert_eq!(
        final_statuses(&events),
        vec![InstallStatus::Completed, InstallStatus::Failed]
    );

    let args = std::fs::read_to_string(&args_file).unwrap();
    assert_eq!(args.trim(), "/quiet /norestart");

    let log = std::fs::read_to_string(temp_dir.path().join("install_log.txt")).unwrap();
    assert!(log.contains("Added: ok.exe"));
    assert!(log.contains("Successfully installed: ok.exe"));
    assert!(log.contains("Installation failed for bad.exe (exit code 3)"));
    assert!(log.trim_end().ends_with("Installation process completed"));
}

#[test]
fn test_interactive_run_passes_no_arguments() {
    let temp_dir = TempDir::new().unwrap();
    let args_file = temp_dir.path().join("args.txt");
    let ok = script(
        temp_dir.path(),
        "ok.exe",
        &format!("echo \"$#\" > '{}'", args_file.display()),
    );

    let handle = EngineHandle::spawn_with(
        settings(temp_dir.path(), InstallMode::Interactive),
        Box::new(SystemLauncher),
    )
    .unwrap();
    handle.add(&ok).unwrap();
    handle.start().unwrap();
    let (_, summary) = run_to_end(&handle);
    handle.shutdown();

    assert_eq!(summary.completed, 1);
    assert_eq!(std::fs::read_to_string(&args_file).unwrap().trim(), "0");
}

#[test]
fn test_stop_during_install_leaves_rest_pending() {
    let temp_dir = TempDir::new().unwrap();
    let slow = script(temp_dir.path(), "slow.exe", "sleep 30");
    let next = script(temp_dir.path(), "next.exe", "exit 0");

    let mut settings = settings(temp_dir.path(), InstallMode::Silent);
    settings.stop_policy = StopPolicy::Kill;

    let handle = EngineHandle::spawn_with(settings, Box::new(SystemLauncher)).unwrap();
    handle.add(&slow).unwrap();
    handle.add(&next).unwrap();
    handle.start().unwrap();

    // Wait for the first installer to be running
    loop {
        let event = handle
            .events()
            .recv_timeout(Duration::from_secs(10))
            .unwrap();
        if matches!(
            event,
            EngineEvent::StatusChanged {
                status: InstallStatus::Installing,
                ..
            }
        ) {
            break;
        }
    }
    handle.stop().unwrap();

    let (_, summary) = run_to_end(&handle);
    handle.shutdown();

    assert!(summary.stopped);
    assert_eq!(summary.completed, 0);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.pending, 1);
    assert!(summary.elapsed < Duration::from_secs(10));

    let log = std::fs::read_to_string(temp_dir.path().join("install_log.txt")).unwrap();
    assert!(log.contains("Installation stopped by user"));
    assert!(log.contains("interrupted by stop; installer process killed"));
}

#[test]
fn test_relative_path_runs_from_working_directory() {
    let temp_dir = TempDir::new().unwrap();
    script(temp_dir.path(), "setup.exe", "exit 0");

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(temp_dir.path()).unwrap();

    let handle =
        EngineHandle::spawn_with(settings(temp_dir.path(), InstallMode::Silent), Box::new(SystemLauncher))
            .unwrap();
    handle.add("setup.exe").unwrap();
    handle.start().unwrap();
    let (events, summary) = run_to_end(&handle);
    handle.shutdown();

    std::env::set_current_dir(previous).unwrap();

    let added = events
        .iter()
        .find_map(|event| match event {
            EngineEvent::RecordAdded(record) => Some(record.path.clone()),
            _ => None,
        })
        .unwrap();
    assert!(added.is_absolute());
    assert!(added.ends_with("setup.exe"));
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.failed, 0);
}

#[test]
fn test_timeout_fails_hung_installer() {
    let temp_dir = TempDir::new().unwrap();
    let hung = script(temp_dir.path(), "hung.exe", "sleep 30");

    let mut settings = settings(temp_dir.path(), InstallMode::Silent);
    settings.install_timeout = Some(Duration::from_millis(200));

    let handle = EngineHandle::spawn_with(settings, Box::new(SystemLauncher)).unwrap();
    handle.add(&hung).unwrap();
    handle.start().unwrap();
    let (_, summary) = run_to_end(&handle);
    handle.shutdown();

    assert_eq!(summary.failed, 1);
    let log = std::fs::read_to_string(temp_dir.path().join("install_log.txt")).unwrap();
    assert!(log.contains("Installation of hung.exe timed out"));
}

#[test]
fn test_missing_file_is_not_queued() {
    let temp_dir = TempDir::new().unwrap();
    let handle =
        EngineHandle::spawn_with(settings(temp_dir.path(), InstallMode::Silent), Box::new(SystemLauncher))
            .unwrap();
    handle.add(temp_dir.path().join("ghost.exe")).unwrap();
    handle.start().unwrap();

    let mut saw_error = false;
    loop {
        match handle
            .events()
            .recv_timeout(Duration::from_secs(5))
            .unwrap()
        {
            EngineEvent::Log(line) => saw_error |= line.text.contains("Error: File not found"),
            EngineEvent::Warning(message) => {
                assert_eq!(message, "Please add files to install first.");
                break;
            }
            EngineEvent::RecordAdded(_) => panic!("missing file must not be queued"),
            _ => {}
        }
    }
    handle.shutdown();
    assert!(saw_error);
}
