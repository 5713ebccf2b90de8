#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]

use clap::{ArgAction, Parser, Subcommand};
use hexeditlib::{
    Endianness, ExportFormat, Request, Response, SearchType, Session, SessionConfig,
    format_with_separators,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(
    name = "hexedit",
    version,
    about = "Binary file editor: inspect, search, patch & export bytes",
    after_help = "Examples:\n  \
    hexedit read firmware.bin --offset 0x100 --length 64\n  \
    hexedit search firmware.bin \"DE AD BE EF\" --hex\n  \
    hexedit inspect firmware.bin 0x10 --big-endian\n  \
    hexedit patch firmware.bin 0x0=0x5A 0x1=0xFF\n  \
    hexedit export firmware.bin --format c --output firmware.h"
)]
struct Cli {
    /// Increase log verbosity (-v: info, -vv: debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Decode multi-byte values as big endian
    #[arg(long, global = true)]
    big_endian: bool,

    /// Bytes per row in dumps and exports (1-256)
    #[arg(
        long,
        default_value_t = 16,
        global = true,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..=256)
    )]
    bytes_per_row: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show path and size of a file
    Info { input: PathBuf },
    /// Dump a range of bytes
    Read {
        input: PathBuf,
        #[arg(long, value_parser = parse_number, default_value = "0")]
        offset: usize,
        #[arg(long, value_parser = parse_number, default_value = "256")]
        length: usize,
    },
    /// Search for a byte pattern, text, or regex
    Search {
        input: PathBuf,
        query: String,
        /// Treat the query as hex bytes, e.g. "DE AD BE EF"
        #[arg(long, conflicts_with = "regex")]
        hex: bool,
        /// Treat the query as a regular expression
        #[arg(long)]
        regex: bool,
    },
    /// Decode the bytes at an offset as numbers, text & timestamp
    Inspect {
        input: PathBuf,
        #[arg(value_parser = parse_number)]
        offset: usize,
    },
    /// Render the whole file as an array literal
    Export {
        input: PathBuf,
        /// plain, c, rust, python, javascript, go, csharp
        #[arg(long, default_value = "plain")]
        format: ExportFormat,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Apply <offset>=<value> edits and commit them
    Patch {
        input: PathBuf,
        #[arg(required = true, value_parser = parse_edit)]
        edits: Vec<(usize, u8)>,
    },
    /// Serve JSON requests from stdin, one per line
    Serve { input: PathBuf },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // Dispatch and immediately handle results
    if let Err(e) = run_dispatch(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run_dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = SessionConfig {
        bytes_per_row: cli.bytes_per_row,
        ..SessionConfig::default()
    };
    if cli.big_endian {
        config.endianness = Endianness::Big;
    }

    match cli.command {
        Command::Info { input } => run_info(&input, config),
        Command::Read {
            input,
            offset,
            length,
        } => run_read(&input, config, offset, length),
        Command::Search {
            input,
            query,
            hex,
            regex,
        } => {
            let search_type = if regex {
                SearchType::Regex(query)
            } else {
                SearchType::from_query(&query, hex)?
            };
            run_search(&input, config, &search_type)
        }
        Command::Inspect { input, offset } => run_inspect(&input, config, offset),
        Command::Export {
            input,
            format,
            output,
        } => run_export(&input, config, format, output.as_deref()),
        Command::Patch { input, edits } => run_patch(&input, config, &edits),
        Command::Serve { input } => run_serve(&input, config),
    }
}

fn run_info(path: &Path, config: SessionConfig) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open_with(path, config)?;

    println!("File Path:   {}", session.path().display());
    println!("Data Size:   {} bytes", format_with_separators(session.len()));
    Ok(())
}

fn run_read(
    path: &Path,
    config: SessionConfig,
    offset: usize,
    length: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open_with(path, config)?;
    let bytes = session.read_range(offset, length)?;

    for (idx, row) in bytes.chunks(config.bytes_per_row).enumerate() {
        let addr = offset + idx * config.bytes_per_row;
        let hex: Vec<String> = row.iter().map(|b| format!("{b:02X}")).collect();
        let ascii: String = row
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    char::from(b)
                } else {
                    '.'
                }
            })
            .collect();
        println!(
            "{}  {:<width$}  |{ascii}|",
            format_addr(addr),
            hex.join(" "),
            width = config.bytes_per_row * 3 - 1
        );
    }
    Ok(())
}

fn run_search(
    path: &Path,
    config: SessionConfig,
    search_type: &SearchType,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open_with(path, config)?;
    let hits = session.search_with(search_type)?;

    if hits.is_empty() {
        println!("No results");
        return Ok(());
    }

    println!("Hits: {}", hits.len());
    for hit in hits {
        println!("  {}", format_addr(hit));
    }
    Ok(())
}

fn run_inspect(
    path: &Path,
    config: SessionConfig,
    offset: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open_with(path, config)?;
    let info = session.select_offset(offset)?;

    let endianness = match info.endianness {
        Endianness::Little => "Little Endian",
        Endianness::Big => "Big Endian",
    };
    println!("Offset:      {} ({endianness})", format_addr(info.offset));
    let raw: Vec<String> = info.bytes.iter().map(|b| format!("{b:02X}")).collect();
    println!("Bytes:       {}", raw.join(" "));
    println!();

    for (label, value) in info.rows() {
        println!("{label:<12} {value}");
    }
    Ok(())
}

fn run_export(
    path: &Path,
    config: SessionConfig,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open_with(path, config)?;
    let text = session.export(format)?;

    if let Some(out_path) = output {
        std::fs::write(out_path, format!("{text}\n"))?;
        println!("Exported {} -> {}", path.display(), out_path.display());
    } else {
        println!("{text}");
    }
    Ok(())
}

fn run_patch(
    path: &Path,
    config: SessionConfig,
    edits: &[(usize, u8)],
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open_with(path, config)?;

    for &(offset, value) in edits {
        session.apply_edit(offset, value)?;
    }
    session.commit()?;

    println!(
        "Patched {} byte(s) in {}",
        edits.len(),
        session.path().display()
    );
    Ok(())
}

fn run_serve(path: &Path, config: SessionConfig) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open_with(path, config)?;
    let mut stdout = io::stdout().lock();

    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => session.handle(request).unwrap_or_else(Response::from),
            Err(e) => Response::Error {
                message: format!("Malformed request: {e}"),
            },
        };

        serde_json::to_writer(&mut stdout, &response)?;
        writeln!(stdout)?;
        stdout.flush()?;
    }

    if session.is_dirty() {
        log::warn!("Input closed with uncommitted edits; they are discarded");
    }
    Ok(())
}

// =============================== HELPER FUNCTIONS ===============================

/// Format an offset as `0x0000_0000`
fn format_addr(addr: usize) -> String {
    let s = format!("{addr:08X}");
    let (high, low) = s.split_at(s.len() - 4);
    format!("0x{high}_{low}")
}

/// Parse a decimal or `0x`-prefixed hex number
fn parse_number(s: &str) -> Result<usize, String> {
    let s = s.trim();

    // Handle explicit 0x prefix
    if let Some(hex_str) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return usize::from_str_radix(hex_str, 16).map_err(|e| format!("Invalid number '{s}': {e}"));
    }

    s.parse::<usize>()
        .map_err(|e| format!("Invalid number '{s}': {e}"))
}

/// Parse an `<offset>=<value>` edit, e.g. `0x10=0xFF`
fn parse_edit(s: &str) -> Result<(usize, u8), String> {
    let (offset, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected <offset>=<value>, got '{s}'"))?;

    let offset = parse_number(offset)?;
    let value = parse_number(value)?;
    let value = u8::try_from(value).map_err(|_| format!("Value {value} does not fit into a byte"))?;

    Ok((offset, value))
}
