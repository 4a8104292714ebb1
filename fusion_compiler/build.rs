// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    file_processing: FileProcessingLimits,
    lexical: LexicalLimits,
    syntax: SyntaxLimits,
    symbols: SymbolLimits,
    batch_processing: BatchProcessingLimits,
    security: SecurityLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
    large_file_threshold: u64,
    max_line_count_for_analysis: usize,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_string_size: usize,
    max_identifier_length: usize,
    max_token_count: usize,
    max_lexical_errors: usize,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    max_stack_depth: usize,
    max_derivation_steps: usize,
    max_tree_nodes: usize,
}

#[derive(serde::Deserialize)]
struct SymbolLimits {
    max_scopes: usize,
    max_symbols_per_scope: usize,
    max_parameters_per_function: usize,
    max_tree_walk_depth: usize,
}

#[derive(serde::Deserialize)]
struct BatchProcessingLimits {
    max_worker_threads: usize,
    max_files_per_batch: usize,
}

#[derive(serde::Deserialize)]
struct SecurityLimits {
    max_processing_time_seconds: u64,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_file: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=grammar/fusion_ll1.toml");
    println!("cargo:rerun-if-env-changed=FUSION_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=FUSION_CONFIG_DIR");

    let profile = env::var("FUSION_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("FUSION_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the fusion_compiler directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_security_constraints(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_security_constraints(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_FILE_SIZE: u64 = 1_000_000_000;
    const ABSOLUTE_MAX_PROCESSING_TIME: u64 = 3600;
    const ABSOLUTE_MAX_STACK_DEPTH: usize = 1_000_000;

    if config.file_processing.max_file_size > ABSOLUTE_MAX_FILE_SIZE {
        panic!("CONFIG: max_file_size exceeds absolute maximum");
    }

    if config.security.max_processing_time_seconds > ABSOLUTE_MAX_PROCESSING_TIME {
        panic!("CONFIG: max_processing_time_seconds exceeds absolute maximum");
    }

    if config.syntax.max_stack_depth > ABSOLUTE_MAX_STACK_DEPTH {
        panic!("CONFIG: max_stack_depth exceeds absolute maximum");
    }

    if config.lexical.max_identifier_length == 0 || config.lexical.max_token_count == 0 {
        panic!("CONFIG: lexical limits must be non-zero");
    }

    if config.logging.max_log_events_per_file > config.logging.log_buffer_size {
        panic!("CONFIG: max_log_events_per_file exceeds log_buffer_size");
    }

    if profile == "production" {
        if config.file_processing.max_file_size > 50_000_000 {
            panic!("PRODUCTION: max_file_size too high for production");
        }
        if config.security.max_processing_time_seconds > 600 {
            panic!("PRODUCTION: max_processing_time_seconds too high for production");
        }
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod file_processing {{
        pub const MAX_FILE_SIZE: u64 = {};
        pub const LARGE_FILE_THRESHOLD: u64 = {};
        pub const MAX_LINE_COUNT_FOR_ANALYSIS: usize = {};
    }}

    pub mod lexical {{
        pub const MAX_STRING_SIZE: usize = {};
        pub const MAX_IDENTIFIER_LENGTH: usize = {};
        pub const MAX_TOKEN_COUNT: usize = {};
        pub const MAX_LEXICAL_ERRORS: usize = {};
    }}

    pub mod syntax {{
        pub const MAX_STACK_DEPTH: usize = {};
        pub const MAX_DERIVATION_STEPS: usize = {};
        pub const MAX_TREE_NODES: usize = {};
    }}

    pub mod symbols {{
        pub const MAX_SCOPES: usize = {};
        pub const MAX_SYMBOLS_PER_SCOPE: usize = {};
        pub const MAX_PARAMETERS_PER_FUNCTION: usize = {};
        pub const MAX_TREE_WALK_DEPTH: usize = {};
    }}

    pub mod batch_processing {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_FILES_PER_BATCH: usize = {};
    }}

    pub mod security {{
        pub const MAX_PROCESSING_TIME_SECONDS: u64 = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_FILE: usize = {};
    }}
}}
"#,
        profile,
        // File Processing
        config.file_processing.max_file_size,
        config.file_processing.large_file_threshold,
        config.file_processing.max_line_count_for_analysis,
        // Lexical
        config.lexical.max_string_size,
        config.lexical.max_identifier_length,
        config.lexical.max_token_count,
        config.lexical.max_lexical_errors,
        // Syntax
        config.syntax.max_stack_depth,
        config.syntax.max_derivation_steps,
        config.syntax.max_tree_nodes,
        // Symbols
        config.symbols.max_scopes,
        config.symbols.max_symbols_per_scope,
        config.symbols.max_parameters_per_function,
        config.symbols.max_tree_walk_depth,
        // Batch Processing
        config.batch_processing.max_worker_threads,
        config.batch_processing.max_files_per_batch,
        // Security
        config.security.max_processing_time_seconds,
        // Logging
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.max_log_events_per_file,
    );

    fs::write(output_path, constants_code).unwrap();
}
