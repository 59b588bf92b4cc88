//! Cross-build driver: the one-shot packaging pipeline.
//!
//! One invocation runs validate → assemble workspace → compile → place
//! binary, strictly in that order. Failure at any stage short-circuits, and
//! the workspace is dropped (deleted) before this module returns either way.

use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use crate::target::{InvalidTargetError, Target};
use crate::toolchain::{Toolchain, ToolchainError};
use crate::workspace::{BuildWorkspace, WorkspaceError};

/// Top-level pipeline error. Everything is fatal; there are no retries and
/// no partial artifacts.
#[derive(Debug, Error)]
pub enum PackageError {
  #[error(transparent)]
  InvalidTarget(#[from] InvalidTargetError),

  #[error(transparent)]
  Workspace(#[from] WorkspaceError),

  #[error(transparent)]
  Compile(#[from] ToolchainError),

  #[error("failed to create output directory {}: {source}", path.display())]
  CreateOutputDir { path: PathBuf, source: io::Error },

  #[error("failed to write output binary {}: {source}", path.display())]
  WriteOutput { path: PathBuf, source: io::Error },
}

/// What to package, where to put it, and for which platform.
pub struct PackageOptions {
  /// Path to the payload archive.
  pub input: PathBuf,
  /// Destination path for the produced binary.
  pub output: PathBuf,
  /// Requested OS name; host OS when absent.
  pub os: Option<String>,
  /// Requested architecture; host architecture when absent.
  pub arch: Option<String>,
}

/// Result of a successful packaging run.
#[derive(Debug)]
pub struct PackageOutcome {
  /// Where the binary landed, after suffix normalization.
  pub output: PathBuf,
  /// The resolved target descriptor.
  pub target: Target,
  /// Size in bytes of the embedded payload.
  pub payload_size: u64,
}

/// Run the full pipeline against the given toolchain.
pub fn package(
  options: &PackageOptions,
  toolchain: &dyn Toolchain,
) -> Result<PackageOutcome, PackageError> {
  // Target validation comes before any filesystem work.
  let target = Target::resolve(options.os.as_deref(), options.arch.as_deref())?;
  let output = target.prepare_output_path(&options.output);
  debug!(target = %target, output = %output.display(), "resolved packaging request");

  let workspace = BuildWorkspace::assemble(&options.input)?;

  if let Some(parent) = output.parent() {
    if !parent.as_os_str().is_empty() {
      fs::create_dir_all(parent).map_err(|e| PackageError::CreateOutputDir {
        path: parent.to_path_buf(),
        source: e,
      })?;
    }
  }

  let artifact = toolchain.compile(&workspace, &target)?;

  fs::copy(&artifact, &output).map_err(|e| PackageError::WriteOutput {
    path: output.clone(),
    source: e,
  })?;

  info!(output = %output.display(), target = %target, "packaging complete");
  Ok(PackageOutcome {
    output,
    target,
    payload_size: workspace.payload_size(),
  })
}
