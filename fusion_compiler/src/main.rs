use fusion_compiler::config::runtime::{LogLevel, LoggingPreferences};
use fusion_compiler::export::DotLabel;
use fusion_compiler::grammar::{self, GrammarTable};
use fusion_compiler::pipeline::{self, EmitSet, OutputOptions, PipelineError, PipelineOutput};
use fusion_compiler::utils::SourceMap;
use fusion_compiler::{batch, logging};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct CliOptions {
    batch: batch::BatchConfig,
    grammar: Option<PathBuf>,
    output: OutputOptions,
    json: bool,
    verbose: bool,
    log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <input.fc|directory> [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(&args[0]);
        return Ok(());
    }

    let options = parse_options(&args[2..]);

    if options.verbose {
        logging::config::init_runtime_preferences(LoggingPreferences {
            enable_console_logging: true,
            min_log_level: LogLevel::Debug,
            ..LoggingPreferences::default()
        })?;
    }
    match &options.log_file {
        Some(path) => logging::init_global_logging_with_log_file(path)?,
        None => logging::init_global_logging()?,
    }
    pipeline::validate_pipeline()?;

    let grammar = match grammar::load_grammar(options.grammar.as_deref()) {
        Ok(grammar) => grammar,
        Err(error) => {
            eprintln!("Error: could not load grammar: {}", error);
            std::process::exit(1);
        }
    };

    let input_path = Path::new(&args[1]);
    if input_path.is_file() {
        process_single_file(&args[1], &grammar, &options);
    } else if input_path.is_dir() {
        process_directory_batch(input_path, grammar, &options);
    } else {
        eprintln!("Error: Input must be a file (.fc) or directory");
        eprintln!("  File: {}", input_path.display());
        std::process::exit(1);
    }

    Ok(())
}

fn print_help(program_name: &str) {
    println!("FusionCod Compiler front end v{}", env!("CARGO_PKG_VERSION"));
    println!("Lexer, LL(1) parser and scope builder for FusionCod sources");
    println!();
    println!("USAGE:");
    println!("    {} <input.fc> [options]           # Process single file", program_name);
    println!("    {} <directory> [options]          # Process directory", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --grammar FILE      Load the LL(1) table from FILE instead of the built-in one");
    println!("    --output DIR        Directory for generated artifacts (default: output)");
    println!(
        "    --emit LIST         Artifacts to write: {}, all (default: all)",
        EmitSet::NAMES.join(", ")
    );
    println!(
        "    --label NAME        Parse tree node label: {}",
        DotLabel::ALL.iter().map(|l| l.as_str()).collect::<Vec<_>>().join(", ")
    );
    println!("    --no-highlight      Draw parse tree leaves like inner nodes");
    println!("    --json              Print a JSON summary for each successful file");
    println!("    --verbose           Print every log event, down to debug level");
    println!("    --log-file PATH     Also write log events to PATH");
    println!("    --sequential        Force sequential processing (no parallelism)");
    println!("    --threads N         Set maximum number of threads (default: auto)");
    println!("    --no-recursive      Don't search subdirectories");
    println!("    --max-files N       Limit maximum files to process");
    println!("    --fail-fast         Stop on first error");
    println!("    --quiet             Suppress progress reporting");
    println!();
    println!("OUTPUT FILES:");
    println!("    <name>-tokens.txt   Token kinds followed by a token table");
    println!("    tree-<name>.dot     Parse tree in Graphviz format");
    println!("    scopes-<name>.dot   Scope tree in Graphviz format");
    println!("    symbols-<name>.csv  One row per declared symbol");
    println!();
    println!("EXAMPLES:");
    println!("    {} factorial.fc                     # Single file", program_name);
    println!("    {} programs/ --threads 4            # 4 threads max", program_name);
    println!("    {} programs/ --sequential --fail-fast", program_name);
    println!("    {} factorial.fc --emit tree --label value", program_name);
    println!();

    let pipeline_info = pipeline::get_pipeline_info();
    println!("PIPELINE CAPABILITIES:");
    for line in pipeline_info.report().lines() {
        println!("    {}", line);
    }
    println!();

    let batch_info = batch::get_batch_info();
    println!("BATCH PROCESSING CAPABILITIES:");
    println!("    {}", batch_info.summary());
    println!(
        "    Supported extensions: {}",
        batch_info.supported_file_extensions.join(", ")
    );
}

/// Value following a flag, advancing the cursor past it
fn flag_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Option<&'a str> {
    match args.get(*i + 1) {
        Some(value) => {
            *i += 1;
            Some(value.as_str())
        }
        None => {
            eprintln!("Warning: {} requires a value", flag);
            None
        }
    }
}

fn parse_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions {
        batch: batch::BatchConfig::default(),
        grammar: None,
        output: OutputOptions::default(),
        json: false,
        verbose: false,
        log_file: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--sequential" => options.batch.max_threads = 1,
            "--parallel" => {}
            "--threads" => {
                if let Some(value) = flag_value(args, &mut i, "--threads") {
                    match value.parse::<usize>() {
                        Ok(threads) => options.batch.max_threads = threads.max(1),
                        Err(_) => eprintln!("Warning: Invalid thread count '{}', using default", value),
                    }
                }
            }
            "--no-recursive" => options.batch.recursive = false,
            "--max-files" => {
                if let Some(value) = flag_value(args, &mut i, "--max-files") {
                    match value.parse::<usize>() {
                        Ok(max_files) => options.batch.max_files = Some(max_files),
                        Err(_) => eprintln!("Warning: Invalid max files '{}', ignoring", value),
                    }
                }
            }
            "--fail-fast" => options.batch.fail_fast = true,
            "--quiet" => options.batch.progress_reporting = false,
            "--grammar" => {
                if let Some(value) = flag_value(args, &mut i, "--grammar") {
                    options.grammar = Some(PathBuf::from(value));
                }
            }
            "--output" => {
                if let Some(value) = flag_value(args, &mut i, "--output") {
                    options.output.dir = PathBuf::from(value);
                }
            }
            "--emit" => {
                if let Some(value) = flag_value(args, &mut i, "--emit") {
                    match EmitSet::parse(value) {
                        Ok(emit) => options.output.emit = emit,
                        Err(message) => eprintln!("Warning: {}, writing all artifacts", message),
                    }
                }
            }
            "--label" => {
                if let Some(value) = flag_value(args, &mut i, "--label") {
                    match DotLabel::parse(value) {
                        Some(label) => options.output.dot.label = label,
                        None => eprintln!("Warning: Unknown label '{}', using symbol", value),
                    }
                }
            }
            "--no-highlight" => options.output.dot.highlight_leaves = false,
            "--json" => options.json = true,
            "--verbose" => options.verbose = true,
            "--log-file" => {
                if let Some(value) = flag_value(args, &mut i, "--log-file") {
                    options.log_file = Some(PathBuf::from(value));
                }
            }
            other => eprintln!("Warning: Unknown option '{}'", other),
        }
        i += 1;
    }

    options
}

fn process_single_file(file_path: &str, grammar: &GrammarTable, options: &CliOptions) {
    println!("Processing file: {}", file_path);

    match pipeline::process_file_with_grammar(file_path, grammar) {
        Ok(result) => {
            println!(
                "\nSUCCESS: {} tokens, {} parse tree nodes, {} scopes, {} symbols",
                result.token_count(),
                result.tree.len(),
                result.symbols.scopes().len(),
                result.symbol_count()
            );
            for warning in &result.warnings {
                println!("  warning: {}", warning);
            }

            if let Err(error) = emit_artifacts(&result, options) {
                eprintln!("\nFAILED: {}", error);
                logging::print_cargo_style_summary();
                std::process::exit(1);
            }

            logging::print_cargo_style_summary();
        }
        Err(error) => {
            eprintln!("\nFAILED: {}", error);
            print_detailed_error(file_path, &error);

            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    }
}

fn emit_artifacts(
    result: &pipeline::PipelineResult,
    options: &CliOptions,
) -> Result<(), PipelineError> {
    if !options.output.emit.is_empty() {
        for path in pipeline::write_outputs(result, &options.output)? {
            println!("  wrote {}", path.display());
        }
    }
    if options.json {
        println!("{}", PipelineOutput::new(result).to_json()?);
    }
    Ok(())
}

fn process_directory_batch(dir_path: &Path, grammar: GrammarTable, options: &CliOptions) {
    let config = &options.batch;
    println!("Starting batch processing: {}", dir_path.display());
    println!(
        "Configuration: {} threads, recursive={}, fail_fast={}",
        config.max_threads, config.recursive, config.fail_fast
    );

    if let Some(max_files) = config.max_files {
        println!("File limit: {} files maximum", max_files);
    }

    match batch::process_directory_with_grammar(dir_path, config, Arc::new(grammar)) {
        Ok(results) => {
            println!("\nBatch processing completed!");

            let mut write_failures = 0;
            for (file_path, result) in &results.successful_files {
                if let Err(error) = emit_artifacts(result, options) {
                    eprintln!("  {}: {}", file_path.display(), error);
                    write_failures += 1;
                }
            }

            print_batch_results(&results);
            logging::print_cargo_style_summary();

            if results.failure_count() > 0 || write_failures > 0 {
                std::process::exit(1);
            }
        }
        Err(error) => {
            eprintln!("Batch processing failed [{}]: {}", error.error_code(), error);
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    }
}

fn print_batch_results(results: &batch::BatchResults) {
    println!("Batch Processing Summary:");
    println!("  Files discovered: {}", results.files_discovered);
    println!("  {}", results.summary());

    if !results.skipped_files.is_empty() {
        println!("  Skipped: {}", results.skipped_files.len());
    }

    if results.files_processed > 0 {
        let avg_time = results.processing_duration.as_secs_f64() / results.files_processed as f64;
        println!("  Average time per file: {:.3}s", avg_time);
    }

    let seconds = results.processing_duration.as_secs_f64();
    if !results.successful_files.is_empty() && seconds > 0.0 {
        let total_tokens: usize = results
            .successful_files
            .iter()
            .map(|(_, result)| result.token_count())
            .sum();
        println!("  Processing rate: {:.0} tokens/sec", total_tokens as f64 / seconds);
    }

    if results.failure_count() > 0 {
        println!("\nFailed Files:");
        for (file_path, error) in &results.failed_files {
            println!("  {}: {}", file_path.display(), get_error_summary(error));
            for diagnostic in error.diagnostics() {
                println!("    {}", diagnostic);
            }
        }
    }

    if results.success_count() > 0 && results.success_count() <= 10 {
        println!("\nSuccessful Files:");
        for (file_path, result) in &results.successful_files {
            println!(
                "  {}: {} tokens, {} symbols",
                file_path.display(),
                result.token_count(),
                result.symbol_count()
            );
        }
    } else if results.success_count() > 10 {
        println!("\n{} files processed successfully", results.success_count());
    }
}

fn get_error_summary(error: &PipelineError) -> String {
    let mut stage = error.stage().to_string();
    if let Some(first) = stage.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    format!("{} error [{}]", stage, error.error_code())
}

/// Print each diagnostic, quoting the offending source line when it can be read
fn print_detailed_error(file_path: &str, error: &PipelineError) {
    eprintln!("{} stage failed:", get_error_summary(error));

    let source_map = fs::read_to_string(file_path).ok().map(SourceMap::new);
    for diagnostic in error.diagnostics() {
        match (&source_map, diagnostic.span()) {
            (Some(map), Some(span)) => {
                let message = format!("[{}] {}", diagnostic.code, diagnostic.message);
                eprintln!("{}", map.format_error(&span, &message));
            }
            _ => eprintln!("  {}", diagnostic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_batch_options() {
        let options = parse_options(&args(&["--threads", "4", "--fail-fast", "--no-recursive"]));
        assert_eq!(options.batch.max_threads, 4);
        assert!(options.batch.fail_fast);
        assert!(!options.batch.recursive);
    }

    #[test]
    fn test_parse_output_options() {
        let options = parse_options(&args(&[
            "--output", "out", "--emit", "tree,symbols", "--label", "value", "--json", "--verbose",
        ]));
        assert_eq!(options.output.dir, PathBuf::from("out"));
        assert!(options.output.emit.tree && options.output.emit.symbols);
        assert!(!options.output.emit.tokens);
        assert_eq!(options.output.dot.label, DotLabel::Value);
        assert!(options.json);
        assert!(options.verbose);
    }

    #[test]
    fn test_parse_options_invalid() {
        let options = parse_options(&args(&[
            "--threads", "invalid", "--emit", "ast", "--unknown-option", "--grammar",
        ]));
        assert_ne!(options.batch.max_threads, 0);
        assert_eq!(options.output.emit, EmitSet::all());
        assert!(options.grammar.is_none());
    }

    #[test]
    fn test_get_error_summary() {
        let error = PipelineError::pipeline_error("test");
        assert_eq!(get_error_summary(&error), "Pipeline error [E001]");
    }
}
