//! Batch processing of FusionCod source directories
//!
//! Discovers `.fc` files, then runs each through the pipeline either
//! sequentially or on worker threads sharing one loaded grammar. Every file
//! runs inside its own logging file context so the error collector can group
//! diagnostics per file.

use crate::config::compile_time::batch_processing::{MAX_FILES_PER_BATCH, MAX_WORKER_THREADS};
use crate::config::compile_time::file_processing::MAX_FILE_SIZE;
use crate::file_processor::SOURCE_EXTENSION;
use crate::grammar::GrammarTable;
use crate::logging::{codes, Code};
use crate::pipeline::{self, PipelineError, PipelineResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: Option<usize>,
    pub progress_reporting: bool,
    pub fail_fast: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: thread::available_parallelism()
                .map(|n| n.get().min(8))
                .unwrap_or(4)
                .min(MAX_WORKER_THREADS),
            recursive: true,
            max_files: None,
            progress_reporting: true,
            fail_fast: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchResults {
    pub successful_files: Vec<(PathBuf, PipelineResult)>,
    pub failed_files: Vec<(PathBuf, PipelineError)>,
    /// Files rejected before the pipeline ran, with the reason
    pub skipped_files: Vec<(PathBuf, String)>,
    pub processing_duration: Duration,
    pub files_processed: usize,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successful_files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_files.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.files_processed == 0 {
            0.0
        } else {
            self.success_count() as f64 / self.files_processed as f64
        }
    }

    pub fn add_success(&mut self, file_path: PathBuf, result: PipelineResult) {
        self.successful_files.push((file_path, result));
        self.files_processed += 1;
    }

    pub fn add_failure(&mut self, file_path: PathBuf, error: PipelineError) {
        self.failed_files.push((file_path, error));
        self.files_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful_files.extend(other.successful_files);
        self.failed_files.extend(other.failed_files);
        self.skipped_files.extend(other.skipped_files);
        self.files_processed += other.files_processed;
    }

    /// Order results by path so parallel runs report deterministically
    pub fn sort(&mut self) {
        self.successful_files.sort_by(|a, b| a.0.cmp(&b.0));
        self.failed_files.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn summary(&self) -> String {
        format!(
            "{} files processed, {} successful ({:.1}%), {} failed, {:.2}s total",
            self.files_processed,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No .fc files found in directory: {path}")]
    NoFilesFound { path: String },

    #[error("Too many files found: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("IO error during directory traversal: {error}")]
    IoError { error: String },

    #[error("Worker thread error: {message}")]
    ThreadError { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::DirectoryNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            Self::NoFilesFound { .. } => codes::file_processing::INVALID_PATH,
            Self::TooManyFiles { .. } => codes::file_processing::FILE_TOO_LARGE,
            Self::IoError { .. } => codes::file_processing::IO_ERROR,
            Self::ThreadError { .. } => codes::system::INTERNAL_ERROR,
        }
    }
}

fn lock(results: &Mutex<BatchResults>) -> MutexGuard<'_, BatchResults> {
    match results.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Find `.fc` files under `dir_path`, sorted by path
pub fn discover_fc_files(dir_path: &Path, config: &BatchConfig) -> Result<Vec<PathBuf>, BatchError> {
    crate::log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.is_dir() {
        return Err(BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        });
    }

    let limit = config
        .max_files
        .unwrap_or(MAX_FILES_PER_BATCH)
        .min(MAX_FILES_PER_BATCH);

    let mut files = Vec::new();
    let mut pending = vec![dir_path.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| BatchError::IoError {
            error: format!("{}: {}", dir.display(), e),
        })?;

        for entry in entries {
            let path = entry
                .map_err(|e| BatchError::IoError {
                    error: e.to_string(),
                })?
                .path();

            if path.is_dir() {
                if config.recursive {
                    pending.push(path);
                }
            } else if is_fc_file(&path) {
                files.push(path);
            }
        }
    }

    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
        });
    }

    files.sort();

    if files.len() > limit {
        if config.max_files.is_none() {
            return Err(BatchError::TooManyFiles {
                count: files.len(),
                max: MAX_FILES_PER_BATCH,
            });
        }
        crate::log_warning!("Reached maximum file limit",
            "files_found" => files.len(),
            "limit" => limit
        );
        files.truncate(limit);
    }

    crate::log_success!(codes::success::OPERATION_COMPLETED_SUCCESSFULLY, "File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

fn is_fc_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
            .unwrap_or(false)
}

/// Split into files worth handing to the pipeline and files rejected up front
fn validate_files(files: &[PathBuf]) -> (Vec<PathBuf>, Vec<(PathBuf, String)>) {
    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for file in files {
        match fs::metadata(file) {
            Ok(meta) if !meta.is_file() => invalid.push((file.clone(), "not a file".to_string())),
            Ok(meta) if meta.len() > MAX_FILE_SIZE => invalid.push((
                file.clone(),
                format!("file too large: {} bytes (max: {})", meta.len(), MAX_FILE_SIZE),
            )),
            Ok(_) => valid.push(file.clone()),
            Err(e) => invalid.push((file.clone(), e.to_string())),
        }
    }

    for (file, reason) in &invalid {
        crate::log_error!(codes::file_processing::INVALID_PATH, "File skipped",
            "file" => file.display(),
            "reason" => reason
        );
    }

    (valid, invalid)
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

pub fn process_directory_sequential(
    dir_path: &Path,
    config: &BatchConfig,
    grammar: &GrammarTable,
) -> Result<BatchResults, BatchError> {
    let start = Instant::now();
    crate::log_info!("Starting sequential batch processing", "directory" => dir_path.display());

    let discovered = discover_fc_files(dir_path, config)?;
    let (valid, invalid) = validate_files(&discovered);

    let mut results = BatchResults::new();
    results.files_discovered = discovered.len();
    results.skipped_files = invalid;

    for (file_id, file_path) in valid.iter().enumerate() {
        if config.progress_reporting {
            println!(
                "Processing file {} of {}: {}",
                file_id + 1,
                valid.len(),
                file_path.display()
            );
        }

        let path = file_path.to_string_lossy();
        match pipeline::process_file_with_id(&path, file_id, grammar) {
            Ok(result) => results.add_success(file_path.clone(), result),
            Err(error) => {
                results.add_failure(file_path.clone(), error);
                if config.fail_fast {
                    crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
                    break;
                }
            }
        }
    }

    results.processing_duration = start.elapsed();
    log_completion("Sequential batch processing completed", &results, 1);
    Ok(results)
}

pub fn process_directory_parallel(
    dir_path: &Path,
    config: &BatchConfig,
    grammar: Arc<GrammarTable>,
) -> Result<BatchResults, BatchError> {
    let start = Instant::now();
    let threads = config.max_threads.clamp(1, MAX_WORKER_THREADS);
    crate::log_info!("Starting parallel batch processing",
        "directory" => dir_path.display(),
        "max_threads" => threads
    );

    let discovered = discover_fc_files(dir_path, config)?;
    let (valid, invalid) = validate_files(&discovered);

    let mut results = BatchResults::new();
    results.files_discovered = discovered.len();
    results.skipped_files = invalid;

    let chunk_size = calculate_chunk_size(valid.len(), threads);
    crate::log_debug!("Parallel processing configuration",
        "total_files" => valid.len(),
        "chunk_size" => chunk_size,
        "threads" => threads
    );

    let mut offset = 0;
    for chunk in valid.chunks(chunk_size.max(1)) {
        let chunk_results = process_chunk_parallel(chunk, offset, threads, Arc::clone(&grammar))?;
        offset += chunk.len();
        results.merge(chunk_results);

        if config.fail_fast && results.failure_count() > 0 {
            crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
            break;
        }
    }

    results.sort();
    results.processing_duration = start.elapsed();
    log_completion("Parallel batch processing completed", &results, threads);
    Ok(results)
}

fn process_chunk_parallel(
    files: &[PathBuf],
    first_id: usize,
    threads: usize,
    grammar: Arc<GrammarTable>,
) -> Result<BatchResults, BatchError> {
    let results = Arc::new(Mutex::new(BatchResults::new()));
    let per_thread = files.len().div_ceil(threads).max(1);

    let mut handles = Vec::new();
    for (index, slice) in files.chunks(per_thread).enumerate() {
        let thread_files = slice.to_vec();
        let base_id = first_id + index * per_thread;
        let results = Arc::clone(&results);
        let grammar = Arc::clone(&grammar);

        handles.push(thread::spawn(move || {
            for (local_id, file_path) in thread_files.into_iter().enumerate() {
                let path = file_path.to_string_lossy().into_owned();
                let outcome = pipeline::process_file_with_id(&path, base_id + local_id, &grammar);

                let mut guard = lock(&results);
                match outcome {
                    Ok(result) => guard.add_success(file_path, result),
                    Err(error) => guard.add_failure(file_path, error),
                }
            }
        }));
    }

    for handle in handles {
        handle.join().map_err(|_| BatchError::ThreadError {
            message: "worker panicked during processing".to_string(),
        })?;
    }

    let results = Arc::try_unwrap(results).map_err(|_| BatchError::ThreadError {
        message: "results still shared after workers finished".to_string(),
    })?;
    Ok(match results.into_inner() {
        Ok(results) => results,
        Err(poisoned) => poisoned.into_inner(),
    })
}

fn calculate_chunk_size(file_count: usize, threads: usize) -> usize {
    const MAX_CHUNK_SIZE: usize = 50;
    file_count.div_ceil(threads.max(1)).clamp(1, MAX_CHUNK_SIZE)
}

fn log_completion(message: &str, results: &BatchResults, threads: usize) {
    crate::log_performance!(
        codes::success::OPERATION_COMPLETED_SUCCESSFULLY,
        message,
        duration = results.processing_duration,
        "files_processed" => results.files_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "skipped" => results.skipped_files.len(),
        "threads" => threads
    );
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Process a directory with the given configuration and grammar
pub fn process_directory_with_grammar(
    dir_path: &Path,
    config: &BatchConfig,
    grammar: Arc<GrammarTable>,
) -> Result<BatchResults, BatchError> {
    if config.max_threads <= 1 {
        process_directory_sequential(dir_path, config, &grammar)
    } else {
        process_directory_parallel(dir_path, config, grammar)
    }
}

/// Process a directory with the embedded grammar
pub fn process_directory_with_config(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let grammar = GrammarTable::default_grammar().map_err(|e| BatchError::ThreadError {
        message: format!("embedded grammar failed to load: {}", e),
    })?;
    process_directory_with_grammar(dir_path, config, Arc::new(grammar))
}

#[derive(Debug, Clone)]
pub struct BatchInfo {
    pub max_recommended_threads: usize,
    pub max_worker_threads: usize,
    pub max_files_per_batch: usize,
    pub supported_file_extensions: Vec<String>,
}

impl BatchInfo {
    pub fn summary(&self) -> String {
        format!(
            "Batch processor: up to {} threads (recommended {}), {} files per batch",
            self.max_worker_threads, self.max_recommended_threads, self.max_files_per_batch
        )
    }
}

pub fn get_batch_info() -> BatchInfo {
    BatchInfo {
        max_recommended_threads: thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
            .min(MAX_WORKER_THREADS),
        max_worker_threads: MAX_WORKER_THREADS,
        max_files_per_batch: MAX_FILES_PER_BATCH,
        supported_file_extensions: vec![SOURCE_EXTENSION.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const GOOD: &str = "fn main() { x int = 1; }";
    const BAD: &str = "fn main() { x int = 1 }";

    fn sequential() -> BatchConfig {
        BatchConfig {
            max_threads: 1,
            progress_reporting: false,
            ..BatchConfig::default()
        }
    }

    #[test]
    fn test_file_discovery() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.fc"), GOOD).unwrap();
        fs::write(dir.path().join("a.fc"), GOOD).unwrap();
        fs::write(dir.path().join("notes.txt"), "no").unwrap();
        fs::write(dir.path().join("sub").join("c.fc"), GOOD).unwrap();

        let files = discover_fc_files(dir.path(), &BatchConfig::default()).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files[0].ends_with("a.fc"));

        let flat = BatchConfig {
            recursive: false,
            ..BatchConfig::default()
        };
        assert_eq!(discover_fc_files(dir.path(), &flat).unwrap().len(), 2);
    }

    #[test]
    fn test_discovery_errors_and_limit() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            discover_fc_files(dir.path(), &BatchConfig::default()),
            Err(BatchError::NoFilesFound { .. })
        ));
        assert!(matches!(
            discover_fc_files(&dir.path().join("missing"), &BatchConfig::default()),
            Err(BatchError::DirectoryNotFound { .. })
        ));

        for name in ["a.fc", "b.fc", "c.fc"] {
            fs::write(dir.path().join(name), GOOD).unwrap();
        }
        let limited = BatchConfig {
            max_files: Some(2),
            ..BatchConfig::default()
        };
        assert_eq!(discover_fc_files(dir.path(), &limited).unwrap().len(), 2);
    }

    #[test]
    fn test_sequential_processing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.fc"), GOOD).unwrap();
        fs::write(dir.path().join("b.fc"), BAD).unwrap();

        let grammar = GrammarTable::default_grammar().unwrap();
        let results = process_directory_sequential(dir.path(), &sequential(), &grammar).unwrap();

        assert_eq!(results.files_discovered, 2);
        assert_eq!(results.success_count(), 1);
        assert_eq!(results.failure_count(), 1);
        assert!((results.success_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fail_fast_stops_early() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.fc"), BAD).unwrap();
        fs::write(dir.path().join("b.fc"), GOOD).unwrap();

        let config = BatchConfig {
            fail_fast: true,
            ..sequential()
        };
        let grammar = GrammarTable::default_grammar().unwrap();
        let results = process_directory_sequential(dir.path(), &config, &grammar).unwrap();

        assert_eq!(results.files_processed, 1);
        assert_eq!(results.failure_count(), 1);
    }

    #[test]
    fn test_parallel_processing_matches_sequential() {
        let dir = tempdir().unwrap();
        for i in 0..7 {
            let source = if i % 3 == 0 { BAD } else { GOOD };
            fs::write(dir.path().join(format!("f{}.fc", i)), source).unwrap();
        }

        let config = BatchConfig {
            max_threads: 3,
            progress_reporting: false,
            ..BatchConfig::default()
        };
        let grammar = Arc::new(GrammarTable::default_grammar().unwrap());
        let results = process_directory_with_grammar(dir.path(), &config, grammar).unwrap();

        assert_eq!(results.files_processed, 7);
        assert_eq!(results.failure_count(), 3);
        assert!(results.successful_files[0].0.ends_with("f1.fc"));
    }

    #[test]
    fn test_chunk_size_calculation() {
        assert_eq!(calculate_chunk_size(100, 4), 25);
        assert_eq!(calculate_chunk_size(10, 4), 3);
        assert_eq!(calculate_chunk_size(0, 4), 1);
        assert_eq!(calculate_chunk_size(200, 4), 50);
    }

    #[test]
    fn test_batch_info() {
        let info = get_batch_info();
        assert_eq!(info.supported_file_extensions, vec!["fc".to_string()]);
        assert!(info.max_recommended_threads <= MAX_WORKER_THREADS);
    }
}
