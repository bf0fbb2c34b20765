use nullbatch::core::install::{InstallQueue, InstallStatus, RunProgress};
use std::path::PathBuf;

#[test]
fn test_records_keep_insertion_order_and_unique_ids() {
    let mut queue = InstallQueue::new();
    let a = queue.push(PathBuf::from("/tmp/setup.exe"), 10);
    let b = queue.push(PathBuf::from("/other/setup.exe"), 20);

    assert_ne!(a.id, b.id);
    assert_eq!(a.name(), b.name());
    assert_eq!(queue.next_pending(), Some(a.id));

    assert!(queue.set_status(a.id, InstallStatus::Installing));
    assert!(queue.set_status(a.id, InstallStatus::Completed));
    assert_eq!(queue.get(a.id).unwrap().progress, "100%");
    assert_eq!(queue.get(b.id).unwrap().status, InstallStatus::Pending);
    assert_eq!(queue.next_pending(), Some(b.id));
}

#[test]
fn test_terminal_status_is_final() {
    let mut queue = InstallQueue::new();
    let record = queue.push(PathBuf::from("a.exe"), 1);

    queue.set_status(record.id, InstallStatus::Installing);
    queue.set_status(record.id, InstallStatus::Failed);

    assert!(!queue.set_status(record.id, InstallStatus::Completed));
    assert!(!queue.set_status(record.id, InstallStatus::Installing));
    assert_eq!(queue.get(record.id).unwrap().status, InstallStatus::Failed);
    assert_eq!(queue.get(record.id).unwrap().progress, "0%");
}

#[test]
fn test_clear_keeps_ids_increasing() {
    let mut queue = InstallQueue::new();
    let first = queue.push(PathBuf::from("a.exe"), 1);
    assert_eq!(queue.clear(), 1);
    assert!(queue.is_empty());

    let second = queue.push(PathBuf::from("a.exe"), 1);
    assert!(second.id > first.id);
}

#[test]
fn test_run_progress_truncates() {
    let mut progress = RunProgress::new(3);
    assert_eq!(progress.percent(), 0);
    progress.finished = 1;
    assert_eq!(progress.percent(), 33);
    progress.finished = 2;
    assert_eq!(progress.percent(), 66);
    progress.finished = 3;
    assert_eq!(progress.percent(), 100);

    assert_eq!(RunProgress::new(0).percent(), 100);
}
