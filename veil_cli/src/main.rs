use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use veil_codecs::{codec_pair, Format, DEFAULT_LEVEL};
use veil_core::{CompressionStream, FileStream, Stream};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "veil",
    about = "Compress and decompress files through transparent compression streams",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file
    Compress {
        /// Source file ("-" reads stdin)
        input: PathBuf,
        /// Destination file
        output: PathBuf,
        /// Stream format: gzip | deflate
        #[arg(short, long, default_value = "gzip")]
        format: String,
        /// Compression level (0–9)
        #[arg(short, long, default_value_t = DEFAULT_LEVEL)]
        level: u32,
    },
    /// Decompress a file
    Decompress {
        /// Source file
        input: PathBuf,
        /// Destination file ("-" writes to stdout)
        output: PathBuf,
        /// Stream format the source was written in: gzip | deflate
        #[arg(short, long, default_value = "gzip")]
        format: String,
    },
}

// ── Helpers ────────────────────────────────────────────────────────────────

const IO_CHUNK: usize = 64 * 1024;

fn format_from_name(name: &str) -> anyhow::Result<Format> {
    match name {
        "gzip" | "gz" => Ok(Format::Gzip),
        "deflate" | "raw" => Ok(Format::Deflate),
        other => anyhow::bail!("unknown format '{}'. Valid options: gzip, deflate", other),
    }
}

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_compress(
    input: PathBuf,
    output: PathBuf,
    format_name: &str,
    level: u32,
) -> anyhow::Result<()> {
    let format = format_from_name(format_name)?;
    let (encoder, decoder) = codec_pair(format, level);

    let mut src: Box<dyn Read> = if input.to_str() == Some("-") {
        Box::new(io::stdin().lock())
    } else {
        let file =
            File::open(&input).with_context(|| format!("opening input file {:?}", input))?;
        Box::new(BufReader::new(file))
    };

    let mut child = FileStream::create(&output)
        .with_context(|| format!("creating output file {:?}", output))?;

    let t0 = Instant::now();
    let mut raw_size = 0u64;
    {
        let mut stream = CompressionStream::new(&mut child, encoder, decoder);
        let mut buf = vec![0u8; IO_CHUNK];
        loop {
            let n = src.read(&mut buf)?;
            if n == 0 {
                break;
            }
            stream.write(&buf[..n])?;
            raw_size += n as u64;
        }
        stream.close()?;
    }
    let elapsed = t0.elapsed();

    let compressed_size = std::fs::metadata(&output)?.len();
    let ratio = if compressed_size == 0 {
        1.0
    } else {
        raw_size as f64 / compressed_size as f64
    };

    eprintln!("  format      : {}", format_name);
    eprintln!("  level       : {}", level);
    eprintln!("  raw size    : {}", human_bytes(raw_size));
    eprintln!("  compressed  : {}", human_bytes(compressed_size));
    eprintln!("  ratio       : {:.2}x", ratio);
    eprintln!(
        "  throughput  : {}/s",
        human_bytes((raw_size as f64 / elapsed.as_secs_f64()) as u64)
    );
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn run_decompress(input: PathBuf, output: PathBuf, format_name: &str) -> anyhow::Result<()> {
    let format = format_from_name(format_name)?;
    let (encoder, decoder) = codec_pair(format, DEFAULT_LEVEL);

    let mut child =
        FileStream::open(&input).with_context(|| format!("opening input file {:?}", input))?;

    let is_stdout = output.to_str() == Some("-");
    let mut dst: Box<dyn Write> = if is_stdout {
        Box::new(io::stdout())
    } else {
        Box::new(
            File::create(&output).with_context(|| format!("creating output file {:?}", output))?,
        )
    };

    let t0 = Instant::now();
    let mut raw_size = 0u64;
    {
        let mut stream = CompressionStream::new(&mut child, encoder, decoder);
        let mut buf = vec![0u8; IO_CHUNK];
        loop {
            let n = stream.read_some(&mut buf)?;
            if n == 0 {
                break;
            }
            dst.write_all(&buf[..n])?;
            raw_size += n as u64;
        }
    }
    dst.flush()?;
    let elapsed = t0.elapsed();

    eprintln!("  format      : {}", format_name);
    eprintln!("  raw size    : {}", human_bytes(raw_size));
    eprintln!(
        "  throughput  : {}/s",
        human_bytes((raw_size as f64 / elapsed.as_secs_f64()) as u64)
    );
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Compress {
            input,
            output,
            format,
            level,
        } => run_compress(input, output, &format, level),
        Commands::Decompress {
            input,
            output,
            format,
        } => run_decompress(input, output, &format),
    }
}
