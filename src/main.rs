//! # retxt CLI
//!
//! Re-encodes a file, or standard input, from one character encoding into
//! another and writes the result to standard output.

#[cfg(feature = "cli")]
use std::fs::File;
#[cfg(feature = "cli")]
use std::io::{self, BufWriter, Read, Write};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use std::process::ExitCode;

#[cfg(feature = "cli")]
use anyhow::Context;
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use serde::Serialize;
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
use retxt::registry::UTF_PREFIX;
#[cfg(feature = "cli")]
use retxt::{
    EncodingRef, Family, Labels, Registry, TranscodeError, TranscodeOptions, Transcoded, Transcoder,
};

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features disabled. Enable with --features cli");
    std::process::exit(1);
}

/// Exit status for data and I/O faults
#[cfg(feature = "cli")]
const EXIT_FAULT: u8 = 1;
/// Exit status for usage errors and the informational modes
#[cfg(feature = "cli")]
const EXIT_USAGE: u8 = 2;

/// retxt: convert text between character encodings
#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "retxt")]
#[command(about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Input encoding name
    #[arg(short = 'i', long = "in", default_value = "utf-8")]
    input: String,

    /// Output encoding name
    #[arg(short = 'o', long = "out", default_value = "utf-8")]
    output: String,

    /// List all encoding names
    #[arg(long, group = "mode")]
    list: bool,

    /// List just UTF encoding names
    #[arg(long, group = "mode")]
    list_utf: bool,

    /// Print version information
    #[arg(long, group = "mode")]
    version: bool,

    /// Buffer size for reading input (KB)
    #[arg(long, default_value = "64", value_parser = clap::value_parser!(u32).range(1..))]
    buffer_size: u32,

    /// Output format for listings and summaries (text, json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Input file (stdin if not specified)
    file: Option<PathBuf>,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct ListedEncoding {
    name: &'static str,
    key: String,
    family: Family,
}

#[cfg(feature = "cli")]
#[derive(Serialize)]
struct ConversionResult {
    success: bool,
    input: &'static str,
    output: &'static str,
    bytes_processed: u64,
    bytes_written: u64,
    error: Option<String>,
    offset: Option<u64>,
}

/// Why a run stopped short of a clean conversion
#[cfg(feature = "cli")]
#[derive(Debug)]
enum Failure {
    /// Bad arguments, caught before any input was read
    Usage(String),
    /// I/O or conversion fault
    Fault(anyhow::Error),
}

#[cfg(feature = "cli")]
impl Failure {
    fn status(&self) -> u8 {
        match self {
            Failure::Usage(_) => EXIT_USAGE,
            Failure::Fault(_) => EXIT_FAULT,
        }
    }
}

#[cfg(feature = "cli")]
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let stdout = io::stdout();
    let status = match run(&cli, stdout.lock()) {
        Ok(status) => status,
        Err(failure) => {
            match &failure {
                Failure::Usage(message) => eprintln!("error: {message}"),
                Failure::Fault(err) => eprintln!("error: {err:#}"),
            }
            failure.status()
        }
    };
    ExitCode::from(status)
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Carry out one invocation, writing converted text to `stdout`. Returns
/// the process exit status.
#[cfg(feature = "cli")]
fn run<W: Write>(cli: &Cli, stdout: W) -> Result<u8, Failure> {
    let registry = Registry::standard()
        .context("could not build encoding registry")
        .map_err(Failure::Fault)?;

    if cli.list || cli.list_utf {
        let prefix = if cli.list_utf { UTF_PREFIX } else { "" };
        list_encodings(&registry, prefix, cli.format, stdout).map_err(Failure::Fault)?;
        return Ok(EXIT_USAGE);
    }

    if cli.version {
        eprintln!("{}:{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(EXIT_USAGE);
    }

    let (input, output) = resolve_pair(&registry, cli)?;
    let source = open_source(cli.file.as_deref()).map_err(Failure::Fault)?;

    let chunk_size = cli.buffer_size as usize * 1024;
    let sink = BufWriter::with_capacity(chunk_size, stdout);
    let transcoder = Transcoder::new(TranscodeOptions { chunk_size });
    let labels = registry.labels(input, output);
    tracing::debug!(
        input = labels.input,
        output = labels.output,
        file = ?cli.file,
        "converting"
    );

    let result = transcoder.transcode_labeled(source, sink, input, output, labels);
    report(cli, labels, &result);
    match result {
        Ok(_) => Ok(0),
        Err(err) => Err(Failure::Fault(err.into())),
    }
}

/// Look up both encoding names before any input is touched
#[cfg(feature = "cli")]
fn resolve_pair(registry: &Registry, cli: &Cli) -> Result<(EncodingRef, EncodingRef), Failure> {
    let input = registry
        .resolve(&cli.input)
        .ok_or_else(|| Failure::Usage(format!("invalid input encoding name: {}", cli.input)))?;

    let output = registry
        .resolve(&cli.output)
        .ok_or_else(|| Failure::Usage(format!("invalid output encoding name: {}", cli.output)))?;
    Ok((input, output))
}

#[cfg(feature = "cli")]
fn open_source(path: Option<&Path>) -> anyhow::Result<Box<dyn Read>> {
    match path {
        Some(path) => {
            let file = File::open(path).with_context(|| {
                format!("could not read from specified file: {}", path.display())
            })?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

/// Print display names starting with `prefix`. Text goes to stderr, one
/// name per line; JSON goes to `stdout` as a single array.
#[cfg(feature = "cli")]
fn list_encodings<W: Write>(
    registry: &Registry,
    prefix: &str,
    format: OutputFormat,
    mut stdout: W,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let listed: Vec<ListedEncoding> = registry
                .entries()
                .iter()
                .filter(|e| e.display().starts_with(prefix))
                .map(|e| ListedEncoding {
                    name: e.display(),
                    key: e.key().to_string(),
                    family: e.family(),
                })
                .collect();
            serde_json::to_writer_pretty(&mut stdout, &listed)?;
            writeln!(stdout)?;
            stdout.flush()?;
        }
        OutputFormat::Text => {
            let mut stderr = io::stderr().lock();
            for name in registry.list(prefix) {
                writeln!(stderr, "{name}")?;
            }
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn report(cli: &Cli, labels: Labels, result: &Result<Transcoded, TranscodeError>) {
    match cli.format {
        OutputFormat::Json => {
            let summary = match result {
                Ok(done) => ConversionResult {
                    success: true,
                    input: labels.input,
                    output: labels.output,
                    bytes_processed: done.consumed,
                    bytes_written: done.written,
                    error: None,
                    offset: None,
                },
                Err(err) => ConversionResult {
                    success: false,
                    input: labels.input,
                    output: labels.output,
                    bytes_processed: err.consumed(),
                    bytes_written: err.written(),
                    error: Some(err.fault().to_string()),
                    offset: err.offset(),
                },
            };
            match serde_json::to_string_pretty(&summary) {
                Ok(json) => eprintln!("{json}"),
                Err(err) => tracing::warn!(%err, "could not serialize summary"),
            }
        }
        OutputFormat::Text => {
            if let Ok(done) = result {
                tracing::info!(
                    consumed = done.consumed,
                    written = done.written,
                    "conversion completed"
                );
            }
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("retxt").chain(args.iter().copied())).unwrap()
    }

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("retxt-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_unknown_encoding_is_rejected_before_opening_file() {
        let cli = parse(&["--in", "not-a-real-encoding", "/definitely/not/here.txt"]);
        let mut out = Vec::new();
        match run(&cli, &mut out) {
            Err(Failure::Usage(message)) => {
                assert_eq!(message, "invalid input encoding name: not-a-real-encoding");
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert!(out.is_empty());

        let cli = parse(&["-o", "nope", "/definitely/not/here.txt"]);
        let failure = run(&cli, &mut out).unwrap_err();
        assert_eq!(failure.status(), EXIT_USAGE);
    }

    #[test]
    fn test_missing_file_is_a_fault() {
        let cli = parse(&["-i", "utf8", "-o", "latin1", "/definitely/not/here.txt"]);
        let failure = run(&cli, Vec::new()).unwrap_err();
        assert_eq!(failure.status(), EXIT_FAULT);
        match failure {
            Failure::Fault(err) => {
                assert!(err.to_string().starts_with("could not read from specified file"));
            }
            Failure::Usage(message) => panic!("unexpected usage error {message}"),
        }
    }

    #[test]
    fn test_converts_file() {
        let path = temp_file("cafe.txt", "café".as_bytes());
        let cli = parse(&["-i", "UTF-8", "-o", "ISO 8859-1", path.to_str().unwrap()]);
        let mut out = Vec::new();
        let status = run(&cli, &mut out).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(status, 0);
        assert_eq!(out, b"caf\xE9");
    }

    #[test]
    fn test_conversion_fault_reports_offset() {
        let path = temp_file("euro.txt", "abc€".as_bytes());
        let cli = parse(&["-o", "latin1", "--buffer-size", "1", path.to_str().unwrap()]);
        let mut out = Vec::new();
        let failure = run(&cli, &mut out).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(failure.status(), EXIT_FAULT);
        match failure {
            Failure::Fault(err) => {
                let message = format!("{err:#}");
                assert!(message.starts_with("could not transcode, read input up to byte 4: "));
                assert!(message.contains("U+20AC"));
            }
            Failure::Usage(message) => panic!("unexpected usage error {message}"),
        }
        assert_eq!(out, b"abc");
    }

    #[test]
    fn test_faults_name_encodings_as_listed() {
        let path = temp_file("kanji.txt", "ab日".as_bytes());
        let cli = parse(&["-o", "cp1252", path.to_str().unwrap()]);
        let failure = run(&cli, Vec::new()).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        match failure {
            Failure::Fault(err) => {
                let message = format!("{err:#}");
                assert!(message.starts_with("could not transcode, read input up to byte 3: "));
                assert!(message.ends_with("cannot be represented in Windows 1252"), "{message}");
            }
            Failure::Usage(message) => panic!("unexpected usage error {message}"),
        }

        // 0xA1 is unassigned in the Arabic set
        let path = temp_file("arabic.txt", b"ok\xA1");
        let cli = parse(&["-i", "iso-8859-6e", path.to_str().unwrap()]);
        let failure = run(&cli, Vec::new()).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        match failure {
            Failure::Fault(err) => {
                assert!(format!("{err:#}").ends_with(": input is not valid ISO 8859-6E"));
            }
            Failure::Usage(message) => panic!("unexpected usage error {message}"),
        }
    }

    #[test]
    fn test_names_resolve_in_any_spelling() {
        let cli = parse(&["-i", "Windows_1252", "-o", "UTF_16-LE-bom"]);
        let registry = Registry::standard().unwrap();
        let (input, output) = resolve_pair(&registry, &cli).unwrap();
        assert_eq!(registry.display_name(input), Some("Windows 1252"));
        assert_eq!(registry.display_name(output), Some("UTF-16-LE-BOM"));
    }

    #[test]
    fn test_informational_modes_exit_with_usage_status() {
        let cli = parse(&["--list-utf", "--format", "json"]);
        let mut out = Vec::new();
        assert_eq!(run(&cli, &mut out).unwrap(), EXIT_USAGE);

        let listed: Vec<serde_json::Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(listed.len(), 10);
        assert_eq!(listed[0]["name"], "UTF-8");
        assert_eq!(listed[0]["key"], "utf8");
        assert_eq!(listed[0]["family"], "unicode");

        let cli = parse(&["--version"]);
        assert_eq!(run(&cli, Vec::new()).unwrap(), EXIT_USAGE);
    }

    #[test]
    fn test_argument_validation() {
        let args = |extra: &[&str]| {
            Cli::try_parse_from(std::iter::once("retxt").chain(extra.iter().copied()))
        };
        assert!(args(&["--buffer-size", "0"]).is_err());
        assert!(args(&["--list", "--version"]).is_err());
        assert!(args(&["--format", "yaml"]).is_err());

        let cli = parse(&[]);
        assert_eq!(cli.input, "utf-8");
        assert_eq!(cli.output, "utf-8");
        assert_eq!(cli.buffer_size, 64);
        assert!(cli.file.is_none());
    }
}
