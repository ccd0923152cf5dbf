use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use ahed::{EncoderConfig, Padding};
use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ahed", about = "Adaptive Huffman encoder/decoder")]
#[command(group(ArgGroup::new("mode").required(true).args(["encode", "decode"])))]
struct Cli {
    /// Encode the input.
    #[arg(short = 'c', long)]
    encode: bool,
    /// Decode the input.
    #[arg(short = 'x', long)]
    decode: bool,
    /// Input file (default: stdin).
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Output file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Write uncoded/coded byte counts to this file.
    #[arg(short, long)]
    log: Option<PathBuf>,
    /// Pad the last byte with zeros instead of the NYT code (encoding only).
    #[arg(long)]
    zero_padding: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let input: Box<dyn Read> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path)
                .with_context(|| format!("failed to open input {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin().lock())),
    };
    let output: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("failed to create output {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let summary = if cli.encode {
        let padding = if cli.zero_padding {
            Padding::Zero
        } else {
            Padding::NytPrefix
        };
        let config = EncoderConfig::new().with_padding(padding);
        ahed::encode_with_config(input, output, config).context("encoding failed")?
    } else {
        ahed::decode(input, output).context("decoding failed")?
    };

    if let Some(path) = &cli.log {
        let log = File::create(path)
            .with_context(|| format!("failed to create log {}", path.display()))?;
        summary
            .write_log(log)
            .with_context(|| format!("failed to write log {}", path.display()))?;
    }

    Ok(())
}
