use nullbatch::core::install::{InstallLog, LogLevel};
use regex::Regex;
use tempfile::TempDir;

#[test]
fn test_lines_are_timestamped_and_appended() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("install_log.txt");
    std::fs::write(&path, "[00:00:00] earlier session\n").unwrap();

    let log = InstallLog::new(&path);
    let line = log.append(LogLevel::Success, "Successfully installed: a.exe");
    log.append(LogLevel::Error, "Installation failed for b.exe (exit code 1)");

    assert_eq!(line.level, LogLevel::Success);

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "[00:00:00] earlier session");

    let pattern = Regex::new(r"^\[\d{2}:\d{2}:\d{2}\] Successfully installed: a\.exe$").unwrap();
    assert!(pattern.is_match(lines[1]));
    assert_eq!(lines[1], line.text);
    assert!(lines[2].ends_with("Installation failed for b.exe (exit code 1)"));
}

#[test]
fn test_unwritable_log_still_returns_line() {
    let temp_dir = TempDir::new().unwrap();
    // A directory cannot be opened for appending
    let log = InstallLog::new(temp_dir.path());

    let line = log.append(LogLevel::Info, "Added: a.exe");
    assert!(line.text.ends_with("Added: a.exe"));
}
