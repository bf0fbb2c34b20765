use nullbatch::core::archive::{is_archive, ArchiveExpander};
use nullbatch::core::install::{EngineEvent, EngineHandle, EngineSettings, SystemLauncher};
use nullbatch::core::Config;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    for (name, data) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

fn expander() -> ArchiveExpander {
    ArchiveExpander::new(vec!["exe".to_string(), "msi".to_string()])
}

#[test]
fn test_zip_yields_only_its_own_installers() {
    let temp_dir = TempDir::new().unwrap();
    // Unrelated installer already sitting next to the archive
    std::fs::write(temp_dir.path().join("old.exe"), "x").unwrap();

    let archive = temp_dir.path().join("bundle.zip");
    write_zip(
        &archive,
        &[
            ("b.exe", "bbb"),
            ("readme.txt", "hello"),
            ("tools/a.MSI", "aa"),
            ("tools/c.exe", "c"),
        ],
    );

    let expansion = expander().expand(&archive).unwrap();

    assert_eq!(expansion.directory, temp_dir.path());
    assert_eq!(expansion.entry_count, 4);
    let expected: Vec<PathBuf> = vec![
        temp_dir.path().join("b.exe"),
        temp_dir.path().join("tools").join("a.MSI"),
        temp_dir.path().join("tools").join("c.exe"),
    ];
    assert_eq!(expansion.installers, expected);
    assert!(temp_dir.path().join("readme.txt").is_file());
}

#[test]
fn test_zip_overwrites_existing_files() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("setup.exe"), "old").unwrap();

    let archive = temp_dir.path().join("bundle.zip");
    write_zip(&archive, &[("setup.exe", "new contents")]);

    expander().expand(&archive).unwrap();
    let data = std::fs::read(temp_dir.path().join("setup.exe")).unwrap();
    assert_eq!(data, b"new contents");
}

#[test]
fn test_corrupt_zip_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("broken.zip");
    std::fs::write(&archive, "this is not a zip file").unwrap();

    assert!(expander().expand(&archive).is_err());
}

#[test]
fn test_archive_detection() {
    assert!(is_archive(Path::new("a.zip")));
    assert!(is_archive(Path::new("A.7Z")));
    assert!(!is_archive(Path::new("a.exe")));
    assert!(!is_archive(Path::new("a.tar.gz")));
}

fn settings(dir: &Path) -> EngineSettings {
    let mut settings = EngineSettings::from(&Config::default());
    settings.log_file = dir.join("install_log.txt");
    settings.metrics = None;
    settings
}

fn collect_until_logs(handle: &EngineHandle, wanted: usize) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    let mut logs = 0;
    while logs < wanted {
        let event = handle
            .events()
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        if matches!(event, EngineEvent::Log(_)) {
            logs += 1;
        }
        events.push(event);
    }
    events
}

#[test]
fn test_adding_archive_enqueues_each_installer() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("bundle.zip");
    write_zip(&archive, &[("one.exe", "1"), ("two.msi", "22"), ("notes.txt", "n")]);

    let handle = EngineHandle::spawn_with(settings(temp_dir.path()), Box::new(SystemLauncher)).unwrap();
    handle.add(&archive).unwrap();

    // "Successfully extracted" plus one "Added" per installer
    let events = collect_until_logs(&handle, 3);
    handle.shutdown();

    let added: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::RecordAdded(record) => Some(record.name()),
            _ => None,
        })
        .collect();
    assert_eq!(added, vec!["one.exe", "two.msi"]);

    let log = std::fs::read_to_string(temp_dir.path().join("install_log.txt")).unwrap();
    assert!(log.contains(&format!("Successfully extracted: {}", archive.display())));
}

#[test]
fn test_adding_corrupt_archive_only_logs() {
    let temp_dir = TempDir::new().unwrap();
    let archive = temp_dir.path().join("broken.zip");
    std::fs::write(&archive, "garbage").unwrap();

    let handle = EngineHandle::spawn_with(settings(temp_dir.path()), Box::new(SystemLauncher)).unwrap();
    handle.add(&archive).unwrap();

    let events = collect_until_logs(&handle, 1);
    handle.shutdown();

    assert!(!events.iter().any(|e| matches!(e, EngineEvent::RecordAdded(_))));
    match events.last() {
        Some(EngineEvent::Log(line)) => {
            assert!(line.text.contains(&format!("Error extracting {}", archive.display())))
        }
        other => panic!("expected a log line, got {:?}", other),
    }
}
