//! Error collector for batch file processing with cargo-style output

use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

// ============================================================================
// FILE PROCESSING CONTEXT
// ============================================================================

/// Context information for file processing
#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self { file_path, file_id }
    }
}

// ============================================================================
// PROCESSING SUMMARY
// ============================================================================

/// Summary of batch processing results
#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
}

impl ProcessingSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            self.successful_files as f64 / self.total_files as f64
        }
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }
}

// ============================================================================
// ERROR COLLECTOR
// ============================================================================

/// Thread-safe collector of error and warning events, keyed by file
pub struct ErrorCollector {
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
    file_contexts: Mutex<BTreeMap<PathBuf, FileProcessingContext>>,
    processing_start: Instant,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            file_contexts: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    /// Record an event for a specific file, capped at MAX_LOG_EVENTS_PER_FILE
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut events = lock(&self.file_events);
        let file_events = events.entry(file_path.to_path_buf()).or_default();

        if file_events.len() < MAX_LOG_EVENTS_PER_FILE {
            file_events.push(event);
        } else if file_events.len() == MAX_LOG_EVENTS_PER_FILE {
            file_events.push(LogEvent::warning(&format!(
                "Too many events for file (limit: {})",
                MAX_LOG_EVENTS_PER_FILE
            )));
        }
    }

    /// Record file processing context
    pub fn record_file_context(&self, context: FileProcessingContext) {
        lock(&self.file_contexts).insert(context.file_path.clone(), context);
    }

    pub fn get_file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        lock(&self.file_events)
            .get(file_path)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        lock(&self.file_events).clone()
    }

    /// Summarise every file seen, including files that produced no events
    pub fn get_summary(&self) -> ProcessingSummary {
        let events = lock(&self.file_events);
        let contexts = lock(&self.file_contexts);

        let files: BTreeSet<&PathBuf> = events.keys().chain(contexts.keys()).collect();

        let mut summary = ProcessingSummary {
            total_files: files.len(),
            total_processing_time: self.processing_start.elapsed(),
            ..Default::default()
        };

        for file_path in files {
            let file_events = events.get(file_path).map(Vec::as_slice).unwrap_or(&[]);
            let errors = file_events.iter().filter(|e| e.is_error()).count();
            let warnings = file_events.iter().filter(|e| e.is_warning()).count();

            summary.total_errors += errors;
            summary.total_warnings += warnings;

            if errors > 0 {
                summary.failed_files += 1;
            } else if warnings > 0 {
                summary.files_with_warnings += 1;
            } else {
                summary.successful_files += 1;
            }
        }

        summary
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CARGO-STYLE FORMATTING
// ============================================================================

fn push_event(output: &mut String, label: &str, file_path: &Path, event: &LogEvent) {
    let span_info = event
        .span
        .as_ref()
        .map(|s| {
            format!(
                "\n  --> {}:{}:{}",
                file_path.display(),
                s.start().line,
                s.start().column
            )
        })
        .unwrap_or_default();

    output.push_str(&format!(
        "{}[{}]: {}{}\n",
        label,
        event.code.as_str(),
        event.message,
        span_info
    ));

    let mut keys: Vec<_> = event
        .context
        .keys()
        .filter(|k| k.as_str() != "file" && k.as_str() != "file_id")
        .collect();
    keys.sort();
    for key in keys {
        output.push_str(&format!("  = {}: {}\n", key, event.context[key]));
    }

    if event.is_error() {
        let action = event.recommended_action();
        if action != "No specific action available" {
            output.push_str(&format!("  = help: {}\n", action));
        }
    }
}

/// Format errors in cargo-style output
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (file_path, events) in &collector.get_all_file_events() {
        if events.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", file_path.display()));
        for event in events.iter().filter(|e| e.is_error()) {
            push_event(&mut output, "error", file_path, event);
        }
        for event in events.iter().filter(|e| e.is_warning()) {
            push_event(&mut output, "warning", file_path, event);
        }
        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::{Position, Span};

    #[test]
    fn test_error_collector_basic() {
        let collector = ErrorCollector::new();
        let file_path = PathBuf::from("test.fc");

        collector.record_event(
            &file_path,
            LogEvent::error(codes::file_processing::FILE_NOT_FOUND, "Test error"),
        );

        let events = collector.get_file_events(&file_path);
        assert_eq!(events.len(), 1);
        assert!(events[0].is_error());
        assert!(collector.get_file_events(Path::new("other.fc")).is_empty());
    }

    #[test]
    fn test_processing_summary_counts_clean_files() {
        let collector = ErrorCollector::new();

        collector.record_event(
            Path::new("bad.fc"),
            LogEvent::error(codes::lexical::ILLEGAL_CHARACTER, "illegal character"),
        );
        collector.record_event(Path::new("warn.fc"), LogEvent::warning("Warning"));
        collector.record_file_context(FileProcessingContext::new(PathBuf::from("ok.fc"), 3));

        let summary = collector.get_summary();
        assert_eq!(summary.total_files, 3);
        assert_eq!(summary.failed_files, 1);
        assert_eq!(summary.files_with_warnings, 1);
        assert_eq!(summary.successful_files, 1);
        assert!(summary.has_errors());
    }

    #[test]
    fn test_per_file_event_cap() {
        let collector = ErrorCollector::new();
        let file_path = PathBuf::from("noisy.fc");

        for _ in 0..MAX_LOG_EVENTS_PER_FILE + 5 {
            collector.record_event(&file_path, LogEvent::warning("w"));
        }

        assert_eq!(
            collector.get_file_events(&file_path).len(),
            MAX_LOG_EVENTS_PER_FILE + 1
        );
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        let file_path = PathBuf::from("prog.fc");

        collector.record_event(
            &file_path,
            LogEvent::error(codes::syntax::MISSING_PRODUCTION, "expected BLOCK, found semicolon")
                .with_span(Span::single(Position::new(4, 12))),
        );

        let output = format_cargo_style_errors(&collector);
        assert!(output.contains("Checking prog.fc..."));
        assert!(output.contains("error[E040]: expected BLOCK, found semicolon"));
        assert!(output.contains("--> prog.fc:4:12"));
        assert!(output.contains("Total errors: 1"));
    }
}
