//! CLI binary for the dump parser
//!
//! This provides the command-line interface for the dump parser library.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, Command};
use fc_dump_parser::{
    export_document, parse_dump_file, DumpDocument, DumpKind, ExportOptions, Limits,
};
use glob::glob;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

fn long_version() -> String {
    let sha = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown");
    match option_env!("VERGEN_GIT_COMMIT_DATE") {
        Some(date) => format!("{} ({sha} {date})", env!("CARGO_PKG_VERSION")),
        None => format!("{} ({sha})", env!("CARGO_PKG_VERSION")),
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn expand_patterns(file_patterns: &[&String]) -> Vec<PathBuf> {
    let mut valid_paths = Vec::new();
    for pattern in file_patterns {
        debug!("Processing pattern: {pattern}");

        let paths: Vec<PathBuf> = if pattern.contains('*') || pattern.contains('?') {
            match glob(pattern) {
                Ok(glob_iter) => match glob_iter.collect::<Result<Vec<_>, _>>() {
                    Ok(paths) => {
                        debug!("Glob pattern '{pattern}' matched {} files", paths.len());
                        paths
                    }
                    Err(e) => {
                        eprintln!("Error expanding glob pattern '{pattern}': {e}");
                        continue;
                    }
                },
                Err(e) => {
                    eprintln!("Invalid glob pattern '{pattern}': {e}");
                    continue;
                }
            }
        } else {
            vec![Path::new(pattern.as_str()).to_path_buf()]
        };

        for path in paths {
            if !path.exists() {
                eprintln!("Warning: File does not exist: {path:?}");
                continue;
            }

            if let Err(e) = DumpKind::from_path(&path) {
                eprintln!("Warning: Skipping {path:?}: {e}");
                continue;
            }

            debug!("Added valid file: {path:?}");
            valid_paths.push(path);
        }
    }
    valid_paths
}

fn print_summary(doc: &DumpDocument) {
    let firmware = &doc.firmware;
    let flavor = firmware
        .flavor()
        .map(|f| f.to_string())
        .unwrap_or_else(|| "unknown firmware".to_string());
    let version = firmware
        .version()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "?".to_string());
    println!("  Firmware:   {flavor} {version}");
    if let Some(board) = &firmware.board_name {
        let manufacturer = firmware.manufacturer_id.as_deref().unwrap_or("?");
        println!("  Board:      {board} ({manufacturer})");
    }
    if let Some(name) = &firmware.fc_name {
        println!("  Name:       {name}");
    }
    println!(
        "  Features:   {} enabled, {} disabled",
        doc.features.enabled.len(),
        doc.features.disabled.len()
    );
    println!(
        "  Settings:   {} keys across profiles [{}] and rateprofiles [{}]",
        doc.setting_count(),
        doc.stats.profiles_detected.join(", "),
        doc.stats.rateprofiles_detected.join(", ")
    );
    println!(
        "  Lines:      {} total, {} recognized, {} unknown",
        doc.stats.lines_total, doc.stats.recognized, doc.stats.unknown
    );
    for warning in &doc.warnings {
        println!("  Warning:    {warning}");
    }
}

fn main() -> Result<()> {
    let matches = Command::new("FC Dump Parser")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version())
        .about("Read and parse flight-controller CLI dump/diff exports. Output to JSON or CSV.")
        .arg(
            Arg::new("files")
                .help("Dump files to parse (.txt, .dump, .sql, .cli, .diff, .gz, .zip; case-insensitive, supports globbing)")
                .required(true)
                .num_args(1..)
                .index(1),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug output and detailed parsing information")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Export the parsed document to .dump.json files")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("csv")
                .long("csv")
                .help("Export categorized settings to .settings.csv files")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .help("Directory for exported files (default: same as input file)")
                .value_name("DIR"),
        )
        .arg(
            Arg::new("max-raw-bytes")
                .long("max-raw-bytes")
                .help("Reject inputs larger than this many bytes before decompression (default: 20 MiB)")
                .value_name("BYTES")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("max-payload-bytes")
                .long("max-payload-bytes")
                .help("Reject payloads that decompress to more than this many bytes (default: 20 MiB)")
                .value_name("BYTES")
                .value_parser(value_parser!(u64)),
        )
        .get_matches();

    let debug = matches.get_flag("debug");
    init_logging(debug);

    let export_options = ExportOptions {
        json: matches.get_flag("json"),
        csv: matches.get_flag("csv"),
        output_dir: matches.get_one::<String>("output-dir").cloned(),
    };
    let defaults = Limits::default();
    let limits = Limits {
        max_raw_bytes: matches
            .get_one::<u64>("max-raw-bytes")
            .copied()
            .unwrap_or(defaults.max_raw_bytes),
        max_payload_bytes: matches
            .get_one::<u64>("max-payload-bytes")
            .copied()
            .unwrap_or(defaults.max_payload_bytes),
    };
    let file_patterns: Vec<&String> = matches
        .get_many::<String>("files")
        .context("no input files given")?
        .collect();

    debug!("Input patterns: {file_patterns:?}");
    let valid_paths = expand_patterns(&file_patterns);

    if valid_paths.is_empty() {
        eprintln!("Error: No valid files found to process.");
        eprintln!("Supported extensions: .txt, .dump, .sql, .cli, .diff, .gz, .zip (case-insensitive)");
        eprintln!("Input patterns were: {file_patterns:?}");
        std::process::exit(1);
    }

    let mut processed_files = 0;
    for (index, path) in valid_paths.iter().enumerate() {
        if index > 0 {
            println!();
        }

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        println!("Processing: {filename}");

        let doc = match parse_dump_file(path, &limits) {
            Ok(doc) => doc,
            Err(e) => {
                eprintln!("Error processing {filename}: {e}");
                eprintln!("Continuing with next file...");
                continue;
            }
        };
        print_summary(&doc);

        if export_options.json || export_options.csv {
            match export_document(&doc, path, &export_options)
                .with_context(|| format!("Failed to export {filename}"))
            {
                Ok(report) => {
                    if let Some(json_path) = &report.json_path {
                        println!("  Exported:   {}", json_path.display());
                    }
                    if let Some(csv_path) = &report.csv_path {
                        println!("  Exported:   {}", csv_path.display());
                    }
                }
                Err(e) => warn!("{e:#}"),
            }
        }
        processed_files += 1;
    }

    if processed_files == 0 {
        eprintln!(
            "Error: No files were successfully processed out of {} files found.",
            valid_paths.len()
        );
        eprintln!("This could be due to:");
        eprintln!("  - Corrupt .gz or .zip containers");
        eprintln!("  - Archives holding more than one file");
        eprintln!("  - Inputs exceeding the size ceilings");
        eprintln!("Use --debug flag for more detailed error information.");
        std::process::exit(1);
    }

    Ok(())
}
