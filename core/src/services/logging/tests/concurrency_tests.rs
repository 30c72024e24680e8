//! Concurrent writers sharing one logger

use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use std::thread;

use hl_shared::config::LoggingConfig;
use tempfile::tempdir;

use crate::services::clock::SystemClock;
use crate::services::logging::{LogLevel, RotatingLogger};

const WRITERS: usize = 8;
const LINES_PER_WRITER: usize = 200;

#[test]
fn test_concurrent_writers_lose_and_duplicate_nothing() {
    let dir = tempdir().unwrap();
    let logger = Arc::new(
        RotatingLogger::new(
            LoggingConfig::new(dir.path()).with_max_file_size(512).without_console(),
            Arc::new(SystemClock),
        )
        .unwrap(),
    );

    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for line in 0..LINES_PER_WRITER {
                    logger.log_message(&format!("writer={} line={}", writer, line), LogLevel::Info);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.flush().unwrap();

    let mut seen = HashSet::new();
    let mut on_disk = 0u64;
    let mut file_count = 0u64;
    for entry in fs::read_dir(dir.path()).unwrap() {
        let path = entry.unwrap().path();
        let content = fs::read_to_string(&path).unwrap();
        on_disk += content.len() as u64;
        file_count += 1;

        for line in content.lines() {
            let (_, message) = line.split_once(" [INFO] ").expect("intact line");
            assert!(seen.insert(message.to_string()), "duplicated entry: {}", message);
        }
    }

    assert_eq!(seen.len(), WRITERS * LINES_PER_WRITER);
    assert_eq!(on_disk, logger.total_bytes_written());
    assert_eq!(file_count, logger.files_opened());
}

#[test]
fn test_no_file_grows_past_ceiling() {
    let dir = tempdir().unwrap();
    let ceiling = 300u64;
    let logger = Arc::new(
        RotatingLogger::new(
            LoggingConfig::new(dir.path()).with_max_file_size(ceiling).without_console(),
            Arc::new(SystemClock),
        )
        .unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|writer| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for line in 0..100 {
                    logger.info(&format!("w{} l{}", writer, line));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.flush().unwrap();

    for entry in fs::read_dir(dir.path()).unwrap() {
        let content = fs::read_to_string(entry.unwrap().path()).unwrap();
        assert!(content.len() as u64 <= ceiling, "file grew past the ceiling");
    }
}
