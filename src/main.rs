//! GBX CLI - Command-line tool for inspecting Nadeo GameBox file headers.
//!
//! This is the main entry point for the `gbx` command-line application.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use gbx::header::{known_classes, FolderNode, RefTarget};
use gbx::prelude::*;

/// GBX - Nadeo GameBox header inspection tool
#[derive(Parser)]
#[command(name = "gbx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log more (-v debug, -vv trace); overrides GBX_LOG
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the header, decoded chunks, reference table and body sizes
    Info {
        /// Path to the GBX file
        #[arg(env = "GBX_FILE")]
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the header chunk directory
    Chunks {
        /// Path to the GBX file
        #[arg(env = "GBX_FILE")]
        file: PathBuf,
    },

    /// Show the folder tree and external references
    Refs {
        /// Path to the GBX file
        #[arg(env = "GBX_FILE")]
        file: PathBuf,
    },

    /// List known class ids
    Classes {
        /// Only show classes of this category (e.g. Challenge, Collector)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Decode every file matching a glob pattern
    Scan {
        /// Glob pattern, e.g. "Tracks/**/*.Gbx"
        pattern: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { file, json } => cmd_info(&file, json)?,
        Commands::Chunks { file } => cmd_chunks(&file)?,
        Commands::Refs { file } => cmd_refs(&file)?,
        Commands::Classes { category } => cmd_classes(category.as_deref()),
        Commands::Scan { pattern, json } => cmd_scan(&pattern, json)?,
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env("GBX_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open(path: &Path) -> Result<GbxFile> {
    GbxFile::open(path).with_context(|| format!("Failed to decode {}", path.display()))
}

fn cmd_info(path: &Path, json: bool) -> Result<()> {
    let file = open(path)?;

    if json {
        let out = serde_json::to_string_pretty(&file).context("Failed to serialize")?;
        println!("{out}");
        return Ok(());
    }

    let header = &file.header;
    println!("File:      {}", path.display());
    println!("Version:   {}", header.version);
    println!("Storage:   {}", header.storage_string());
    println!(
        "Class:     {:#010x} {}",
        header.class_id,
        header.class_name.unwrap_or("(unknown)")
    );
    println!("Category:  {}", header.category);
    println!("User data: {} bytes", header.user_data_size);
    println!("Nodes:     {}", header.num_nodes);
    println!("Refs:      {}", header.num_external_refs);

    match &file.directory {
        Ok(directory) => println!("\n{} header chunks", directory.len()),
        Err(e) => println!("\nHeader chunks: {e}"),
    }
    for chunk in &file.chunks {
        println!(
            "\n[{:#010x}] {} ({} bytes)",
            chunk.record.id,
            chunk.data.kind(),
            chunk.record.size
        );
        for field in chunk.data.describe() {
            println!("  {field}");
        }
        if let Some(e) = &chunk.error {
            println!("  ! {e}");
        }
    }

    println!();
    match &file.ref_table {
        Ok(table) => println!(
            "Reference table: {} folders, {} refs",
            table.flattened().len(),
            table.refs.len()
        ),
        Err(e) => println!("Reference table: {e}"),
    }
    match &file.body {
        Ok(BodyInfo::Compressed {
            uncompressed_size,
            compressed_size,
        }) => println!("Body: compressed, {compressed_size} -> {uncompressed_size} bytes"),
        Ok(BodyInfo::Uncompressed { len }) => println!("Body: uncompressed, {len} bytes"),
        Err(e) => println!("Body: {e}"),
    }

    Ok(())
}

fn cmd_chunks(path: &Path) -> Result<()> {
    let file = open(path)?;
    let directory = file
        .directory
        .as_ref()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("Failed to read the header chunk table")?;

    println!("{:>10} {:>8} {:>8} {}", "ID", "SIZE", "OFFSET", "KIND");
    for record in directory.entries() {
        println!(
            "{:#010x} {:>8} {:>8} {}",
            record.id,
            record.size,
            record.offset,
            record.kind.map_or("-", ChunkKind::name)
        );
    }
    println!("\nTotal: {} chunks", directory.len());

    Ok(())
}

fn print_folders(folders: &[FolderNode], depth: usize) {
    for folder in folders {
        println!("{:indent$}{}\\", "", folder.name, indent = depth * 2);
        print_folders(&folder.children, depth + 1);
    }
}

fn cmd_refs(path: &Path) -> Result<()> {
    let file = open(path)?;
    let table = file
        .ref_table
        .as_ref()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("Failed to read the reference table")?;

    println!("Ancestor level: {}", table.ancestor_level);
    if !table.folders.is_empty() {
        println!("\nFolders:");
        print_folders(&table.folders, 1);
    }

    println!("\nRefs:");
    for (i, reference) in table.refs.iter().enumerate() {
        let target = match &reference.target {
            RefTarget::File(_) => table
                .resolve(reference)
                .unwrap_or_else(|| "(bad folder index)".to_string()),
            RefTarget::Resource(index) => format!("resource #{index}"),
        };
        println!("{:>5} node {:>5}  {}", i, reference.node_index, target);
    }
    println!("\nTotal: {} refs", table.refs.len());

    Ok(())
}

fn cmd_classes(category: Option<&str>) {
    let mut count = 0;
    for (id, name, class_category) in known_classes() {
        if let Some(filter) = category {
            if !class_category.name().eq_ignore_ascii_case(filter) {
                continue;
            }
        }
        println!("{id:#010x} {:<12} {name}", class_category.name());
        count += 1;
    }
    println!("\nTotal: {count} classes");
}

#[derive(Default, Serialize)]
struct ScanReport {
    files: usize,
    complete: usize,
    categories: BTreeMap<String, usize>,
    failures: Vec<ScanFailure>,
}

#[derive(Serialize)]
struct ScanFailure {
    path: PathBuf,
    error: String,
}

fn cmd_scan(pattern: &str, json: bool) -> Result<()> {
    let paths: Vec<PathBuf> = glob::glob(pattern)
        .context("Invalid glob pattern")?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    tracing::info!(pattern, files = paths.len(), "scanning");

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let results: Vec<_> = paths
        .par_iter()
        .map(|path| {
            let outcome = GbxFile::open(path).map(|file| (file.header.category, file.is_complete()));
            pb.inc(1);
            (path, outcome)
        })
        .collect();
    pb.finish_and_clear();

    let mut report = ScanReport {
        files: results.len(),
        ..Default::default()
    };
    for (path, outcome) in results {
        match outcome {
            Ok((category, complete)) => {
                *report.categories.entry(category.to_string()).or_default() += 1;
                if complete {
                    report.complete += 1;
                }
            }
            Err(e) => report.failures.push(ScanFailure {
                path: path.clone(),
                error: e.to_string(),
            }),
        }
    }

    if json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize")?;
        println!("{out}");
        return Ok(());
    }

    println!("Scanned {} files in {:?}", report.files, start.elapsed());
    for (category, count) in &report.categories {
        println!("{category:>12} {count}");
    }
    println!(
        "{} fully decoded, {} partially, {} failed",
        report.complete,
        report.files - report.complete - report.failures.len(),
        report.failures.len()
    );
    for failure in &report.failures {
        eprintln!("Error decoding {}: {}", failure.path.display(), failure.error);
    }

    Ok(())
}
