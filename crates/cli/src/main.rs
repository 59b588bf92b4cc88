//! jarcast: package a jar archive into a native, self-contained executable.
//!
//! The produced binary embeds the archive, stages it to a private temp
//! directory at run time, and launches `java` against it with inherited
//! standard streams.

mod output;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jarcast_lib::package::{PackageOptions, package};
use jarcast_lib::toolchain::CargoToolchain;

use crate::output::OutputFormat;

/// Package a jar archive into a native executable for a chosen platform.
#[derive(Parser)]
#[command(name = "jarcast", version, about, long_about = None)]
struct Cli {
  /// Path to the input jar archive
  #[arg(long, value_name = "PATH")]
  input: PathBuf,

  /// Destination path for the produced binary
  #[arg(long, value_name = "PATH")]
  output: PathBuf,

  /// Target operating system: windows, linux, or darwin (default: host)
  #[arg(long, value_name = "OS")]
  os: Option<String>,

  /// Target cpu architecture, passed through to the compiler (default: host)
  #[arg(long, value_name = "ARCH")]
  arch: Option<String>,

  /// Outcome report format
  #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
  format: OutputFormat,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,
}

fn main() {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .without_time()
    .init();

  if let Err(err) = run(&cli) {
    output::print_error(&err.to_string());
    std::process::exit(1);
  }
}

fn run(cli: &Cli) -> Result<()> {
  let options = PackageOptions {
    input: cli.input.clone(),
    output: cli.output.clone(),
    os: cli.os.clone(),
    arch: cli.arch.clone(),
  };

  let started = Instant::now();
  let outcome = package(&options, &CargoToolchain::default())?;
  let elapsed = started.elapsed();

  if cli.format.is_json() {
    output::print_json(&serde_json::json!({
      "output": outcome.output,
      "os": outcome.target.os,
      "arch": outcome.target.arch,
      "triple": outcome.target.triple(),
      "payload_bytes": outcome.payload_size,
      "duration_ms": elapsed.as_millis() as u64,
    }))?;
  } else {
    output::print_success(&format!(
      "packaged {} for {} in {}",
      outcome.output.display(),
      outcome.target,
      output::format_duration(elapsed)
    ));
    output::print_stat("payload", &output::format_bytes(outcome.payload_size));
    output::print_stat("triple", &outcome.target.triple());
  }

  Ok(())
}
