//! Evaluate a query against BER/DER data from a file or stdin.
//!
//! Usage:
//!   tlvq [OPTIONS] <QUERY> [FILE]
//!   tlvq '.index(0).index(1)@utf8' cert.der
//!   echo 300a020105160548656c6c6f | tlvq --hex '.index(0)@pretty'
//!
//! `@tlv` output is written as raw bytes; all other output is text followed by a newline.
//!
//! Exit codes: 0 success, 1 selection/render failure, 2 invalid query,
//! 3 malformed input, 4 I/O failure.

use anyhow::Context as _;
use clap::Parser;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tlvq::{Decoder, Error, Evaluator};

const EXIT_QUERY_FAILED: u8 = 1;
const EXIT_BAD_QUERY: u8 = 2;
const EXIT_BAD_INPUT: u8 = 3;
const EXIT_IO: u8 = 4;

#[derive(Parser, Debug)]
#[command(name = "tlvq", version, about = "Navigate and reformat BER/DER TLV data")]
struct Cli {
    /// Query, e.g. `.index(0).tag(0x04).decode()@pretty`.
    query: String,

    /// Input file; stdin when omitted or `-`.
    file: Option<PathBuf>,

    /// Input is hex text (whitespace ignored) instead of raw bytes.
    #[arg(long)]
    hex: bool,

    /// Maximum nesting depth of constructed elements.
    #[arg(long, default_value_t = tlvq::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Log evaluation progress to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "query failed");
            eprintln!("tlvq: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let query = tlvq::parse(&cli.query)?;
    tracing::debug!(query = %query, "parsed query");

    let raw = read_input(cli.file.as_deref())?;
    let input = if cli.hex { decode_hex(&raw)? } else { raw };
    tracing::debug!(bytes = input.len(), max_depth = cli.max_depth, "read input");

    let evaluator = Evaluator::new(Decoder::new(cli.max_depth));
    let output = evaluator.evaluate(&input, &query)?;
    tracing::debug!(binary = output.is_binary(), len = output.as_bytes().len(), "rendered");

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes()).context("write output")?;
    if !output.is_binary() {
        stdout.write_all(b"\n").context("write output")?;
    }
    stdout.flush().context("write output")?;
    Ok(())
}

fn read_input(path: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match path {
        Some(p) if p != Path::new("-") => {
            std::fs::read(p).with_context(|| format!("read '{}'", p.display()))
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf).context("read stdin")?;
            Ok(buf)
        }
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<Error>() {
        Some(e) if e.is_query() => EXIT_BAD_QUERY,
        Some(e) if e.is_encoding() => EXIT_BAD_INPUT,
        Some(_) => EXIT_QUERY_FAILED,
        None => EXIT_IO,
    }
}

/// Hex text to bytes; offsets in errors count hex digits after whitespace removal.
fn decode_hex(text: &[u8]) -> tlvq::Result<Vec<u8>> {
    let digits: Vec<u8> = text
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    hex::decode(&digits).map_err(|e| match e {
        hex::FromHexError::OddLength => Error::InvalidEncoding {
            offset: digits.len(),
            reason: "odd number of hex digits",
        },
        hex::FromHexError::InvalidHexCharacter { index, .. } => Error::InvalidEncoding {
            offset: index,
            reason: "invalid hex digit",
        },
        hex::FromHexError::InvalidStringLength => Error::InvalidEncoding {
            offset: 0,
            reason: "invalid hex length",
        },
    })
}
