//! lumen-ctl — loopback harness for the fragment protocol.
//!
//! Runs the sender and receiver halves over plain text instead of
//! optics: `encode` prints one wire line per fragment to stdout, and
//! `decode` reads candidate lines from stdin until the transfer
//! completes. Piping one into the other (in any line order, with any
//! amount of junk mixed in) exercises the full protocol without a
//! screen or camera.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use lumen_core::codec::BrotliCodec;
use lumen_core::config::TransferConfig;
use lumen_transfer::encoder;
use lumen_transfer::reassembly::{Reassembler, ReceiveError};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = load_config()?;

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("encode") => {
            let file = args.next().context("usage: lumen-ctl encode <file>")?;
            cmd_encode(Path::new(&file), &config)
        }
        Some("decode") => {
            let out_dir = args.next().context("usage: lumen-ctl decode <output-dir>")?;
            cmd_decode(Path::new(&out_dir), &config)
        }
        _ => {
            eprintln!("usage: lumen-ctl <encode <file> | decode <output-dir>>");
            eprintln!();
            eprintln!("  encode  print the file's fragment lines to stdout");
            eprintln!("  decode  read fragment lines from stdin, write the file");
            eprintln!();
            eprintln!("  LUMEN_CONFIG may point at a TOML transfer config.");
            std::process::exit(2);
        }
    }
}

/// Optional TOML config; defaults otherwise. The core never reads the
/// environment itself, so resolution lives here in the harness.
fn load_config() -> Result<TransferConfig> {
    match std::env::var_os("LUMEN_CONFIG") {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config {}", path.to_string_lossy()))?;
            parse_config(&text)
        }
        None => Ok(TransferConfig::default()),
    }
}

/// Reject values the transfer core treats as contract violations, so an
/// operator typo fails with a message instead of a panic deeper in.
fn parse_config(text: &str) -> Result<TransferConfig> {
    let config: TransferConfig =
        toml::from_str(text).context("failed to parse transfer config")?;
    if config.chunk_size == 0 {
        bail!("chunk_size must be greater than zero");
    }
    Ok(config)
}

fn cmd_encode(path: &Path, config: &TransferConfig) -> Result<()> {
    let data =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("file name is not valid UTF-8")?;

    let encoded = encoder::encode(&data, file_name, config, &BrotliCodec);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for fragment in &encoded.fragments {
        writeln!(out, "{}", fragment.to_line())?;
    }

    eprintln!(
        "{}: {} bytes in {} fragments (transfer {})",
        file_name,
        data.len(),
        encoded.fragments.len(),
        encoded.transfer,
    );
    Ok(())
}

fn cmd_decode(out_dir: &Path, config: &TransferConfig) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut reassembler = Reassembler::new(Box::new(BrotliCodec), config.foreign_nonce);

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;

        match reassembler.process_frame(&line) {
            Ok(true) => {
                let (received, total) = reassembler.progress();
                eprintln!("{received}/{total}");
            }
            Ok(false) => {}
            Err(ReceiveError::TransferCorrupt(e)) => {
                bail!("transfer corrupt, restart it from the sender: {e}");
            }
            Err(e) => return Err(e.into()),
        }

        if reassembler.is_finished() {
            let finished = reassembler.into_finished()?;
            let out_path = sanitized_output_path(out_dir, &finished.file_name);
            std::fs::write(&out_path, &finished.data)
                .with_context(|| format!("failed to write {}", out_path.display()))?;
            println!("{}", out_path.display());
            return Ok(());
        }
    }

    bail!("stdin closed before the transfer completed");
}

/// The file name arrived over an untrusted channel; keep only its final
/// component so it cannot escape the output directory.
fn sanitized_output_path(out_dir: &Path, file_name: &str) -> PathBuf {
    let leaf = Path::new(file_name)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "received.bin".into());
    out_dir.join(leaf)
}
