//! Tests for logging setup.

use super::*;
use crate::model::{ExtractionItem, Side};
use crate::state::ReconciliationSession;
use serial_test::serial;
use std::fs;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// In-memory writer shared with the test body.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture(filter: &str, body: impl FnOnce()) -> String {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = subscriber(EnvFilter::new(filter), move || writer.clone());
    tracing::subscriber::with_default(subscriber, body);
    captured.text()
}

// ===== split_log_path =====

#[test]
fn split_log_path_separates_directory_and_file() {
    let path = Path::new("/var/log/fieldmatch/app.log");
    let (dir, file) = split_log_path(path).expect("valid path");
    assert_eq!(dir, Path::new("/var/log/fieldmatch"));
    assert_eq!(file, "app.log");
}

#[test]
fn split_log_path_bare_name_uses_current_directory() {
    let (dir, file) = split_log_path(Path::new("fieldmatch.log")).expect("valid path");
    assert_eq!(dir, Path::new("."));
    assert_eq!(file, "fieldmatch.log");
}

#[test]
fn split_log_path_rejects_paths_without_file_name() {
    assert!(matches!(
        split_log_path(Path::new("/")),
        Err(LoggingError::InvalidPath(_))
    ));
    assert!(matches!(
        split_log_path(Path::new("logs/..")),
        Err(LoggingError::InvalidPath(_))
    ));
}

// ===== init =====

#[test]
#[serial(tracing_init)]
fn init_creates_log_directory_if_missing() {
    let test_dir = std::env::temp_dir().join("fieldmatch_test_logs_create");
    let log_file = test_dir.join("test.log");
    let _ = fs::remove_dir_all(&test_dir);

    // May fail with SubscriberAlreadySet if another test installed one first.
    let _ = init(&log_file);

    assert!(test_dir.exists(), "Log directory should be created: {:?}", test_dir);
    let _ = fs::remove_dir_all(&test_dir);
}

#[test]
#[serial(tracing_init)]
fn second_init_reports_subscriber_already_set() {
    let test_dir = std::env::temp_dir().join("fieldmatch_test_logs_twice");
    let log_file = test_dir.join("test.log");

    let _ = init(&log_file);
    let second = init(&log_file);

    assert!(matches!(second, Err(LoggingError::SubscriberAlreadySet)));
    let _ = fs::remove_dir_all(&test_dir);
}

// ===== Output =====

#[test]
fn rejected_edit_is_logged_as_warning() {
    let session = ReconciliationSession::new(vec![ExtractionItem::new("K", "v", vec![1])], vec![]);

    let output = capture("warn", || {
        let _ = session.update(Side::B, 3, "K", "x");
    });

    assert!(output.contains("WARN"), "got: {output}");
    assert!(output.contains("Ignoring edit of nonexistent item"), "got: {output}");
    assert!(!output.contains('\u{1b}'), "log output must not contain ANSI escapes");
}

#[test]
fn filter_suppresses_lower_levels() {
    let output = capture("warn", || {
        tracing::info!("routine detail");
        tracing::warn!("needs attention");
    });

    assert!(!output.contains("routine detail"));
    assert!(output.contains("needs attention"));
}
