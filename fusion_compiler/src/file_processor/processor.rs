//! Reads FusionCod sources from disk under the compile-time size limits

use crate::config::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT_FOR_ANALYSIS,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::{codes, Code};
use crate::{log_debug, log_error, log_success, log_warning};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const SOURCE_EXTENSION: &str = "fc";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected .fc, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty")]
    EmptyFile,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },

    #[error("File exceeds maximum line count: {lines} (max: {max_lines})")]
    TooManyLines { lines: usize, max_lines: usize },
}

impl FileProcessorError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::FileNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            Self::InvalidExtension { .. } => codes::file_processing::INVALID_EXTENSION,
            Self::FileTooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            Self::EmptyFile => codes::file_processing::EMPTY_FILE,
            Self::PermissionDenied { .. } => codes::file_processing::PERMISSION_DENIED,
            Self::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            Self::IoError { .. } => codes::file_processing::IO_ERROR,
            Self::InvalidPath { .. } => codes::file_processing::INVALID_PATH,
            Self::TooManyLines { .. } => codes::file_processing::TOO_MANY_LINES,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    fn from_io(error: std::io::Error, path: &Path) -> Self {
        match error.kind() {
            ErrorKind::NotFound => Self::FileNotFound {
                path: path.display().to_string(),
            },
            ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.display().to_string(),
            },
            ErrorKind::InvalidData => Self::InvalidEncoding {
                path: path.display().to_string(),
            },
            _ => Self::IoError {
                message: format!("'{}': {}", path.display(), error),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Canonical path
    pub path: PathBuf,
    pub size: u64,
    pub extension: Option<String>,
    pub line_count: usize,
    pub is_fc_file: bool,
    pub modified: Option<std::time::SystemTime>,
}

impl FileMetadata {
    pub fn human_readable_size(&self) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
        let mut size = self.size as f64;
        let mut unit = 0;

        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }

        if unit == 0 {
            format!("{} {}", self.size, UNITS[unit])
        } else {
            format!("{:.2} {}", size, UNITS[unit])
        }
    }

    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }

    /// File name without extension, used to name output artifacts
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "source".to_string())
    }
}

#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl FileProcessingResult {
    pub fn char_count(&self) -> usize {
        self.source.chars().count()
    }

    /// Whitespace-only sources tokenize to nothing
    pub fn is_effectively_empty(&self) -> bool {
        self.source.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct FileProcessor {
    pub require_fc_extension: bool,
    pub enable_performance_logging: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            require_fc_extension: true,
            enable_performance_logging: true,
        }
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            require_fc_extension: prefs.require_fc_extension,
            enable_performance_logging: prefs.enable_performance_logging,
        }
    }

    pub fn with_fc_extension_required(mut self, required: bool) -> Self {
        self.require_fc_extension = required;
        self
    }

    pub fn with_performance_logging(mut self, enabled: bool) -> Self {
        self.enable_performance_logging = enabled;
        self
    }

    pub fn max_file_size() -> u64 {
        MAX_FILE_SIZE
    }

    /// Validate and read `file_path`: path, metadata, size and extension,
    /// UTF-8 content, then the line count
    pub fn process_file(&self, file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
        let start = Instant::now();
        log_debug!("Starting file processing", "file" => file_path);

        let result = self.process_inner(file_path, start);
        if let Err(error) = &result {
            log_error!(error.error_code(), &error.to_string(), "file" => file_path);
        }
        result
    }

    fn process_inner(
        &self,
        file_path: &str,
        start: Instant,
    ) -> Result<FileProcessingResult, FileProcessorError> {
        let path = Self::validate_path(file_path)?;
        let mut metadata = Self::collect_metadata(&path)?;
        self.validate_metadata(&metadata)?;

        let source = fs::read_to_string(&path).map_err(|e| FileProcessorError::from_io(e, &path))?;

        let line_count = source.lines().count();
        if line_count > MAX_LINE_COUNT_FOR_ANALYSIS {
            return Err(FileProcessorError::TooManyLines {
                lines: line_count,
                max_lines: MAX_LINE_COUNT_FOR_ANALYSIS,
            });
        }
        metadata.line_count = line_count;

        if metadata.is_large_file() {
            log_warning!(code = codes::warnings::LARGE_FILE, "Large source file",
                "file" => file_path,
                "size" => metadata.human_readable_size()
            );
        }

        let result = FileProcessingResult {
            source,
            metadata,
            processing_duration: start.elapsed(),
        };
        self.log_success(&result, file_path);
        Ok(result)
    }

    fn validate_path(file_path: &str) -> Result<PathBuf, FileProcessorError> {
        if file_path.trim().is_empty() {
            return Err(FileProcessorError::InvalidPath {
                path: file_path.to_string(),
            });
        }

        let path = Path::new(file_path);
        if !path.exists() {
            return Err(FileProcessorError::FileNotFound {
                path: file_path.to_string(),
            });
        }
        if !path.is_file() {
            return Err(FileProcessorError::InvalidPath {
                path: file_path.to_string(),
            });
        }

        path.canonicalize()
            .map_err(|e| FileProcessorError::from_io(e, path))
    }

    fn collect_metadata(path: &Path) -> Result<FileMetadata, FileProcessorError> {
        let meta = fs::metadata(path).map_err(|e| FileProcessorError::from_io(e, path))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase());
        let is_fc_file = extension.as_deref() == Some(SOURCE_EXTENSION);

        Ok(FileMetadata {
            path: path.to_path_buf(),
            size: meta.len(),
            extension,
            line_count: 0,
            is_fc_file,
            modified: meta.modified().ok(),
        })
    }

    fn validate_metadata(&self, metadata: &FileMetadata) -> Result<(), FileProcessorError> {
        if metadata.size > MAX_FILE_SIZE {
            return Err(FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: MAX_FILE_SIZE,
            });
        }
        if metadata.size == 0 {
            return Err(FileProcessorError::EmptyFile);
        }
        if self.require_fc_extension && !metadata.is_fc_file {
            return Err(FileProcessorError::InvalidExtension {
                extension: metadata.extension.clone(),
            });
        }
        Ok(())
    }

    fn log_success(&self, result: &FileProcessingResult, file_path: &str) {
        if self.enable_performance_logging {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "File read",
                "file" => file_path,
                "size" => result.metadata.human_readable_size(),
                "lines" => result.metadata.line_count,
                "chars" => result.char_count(),
                "duration_ms" => format!("{:.3}", result.processing_duration.as_secs_f64() * 1000.0)
            );
        } else {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "File read",
                "file" => file_path,
                "lines" => result.metadata.line_count
            );
        }
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}
