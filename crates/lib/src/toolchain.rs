//! Toolchain invocation for cross-building the launcher.
//!
//! `Toolchain` is the capability seam over the external compiler; the one
//! real binding drives `cargo build` with target environment overrides
//! layered on the inherited process environment.

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info};

use crate::stub::LAUNCHER_PACKAGE;
use crate::target::Target;
use crate::workspace::BuildWorkspace;

/// Errors from the external compiler.
#[derive(Debug, Error)]
pub enum ToolchainError {
  /// The compiler binary could not be located at all.
  #[error("cargo not found: {bin} (is a Rust toolchain installed?)")]
  NotFound { bin: String },

  #[error("failed to run cargo: {0}")]
  Spawn(#[source] io::Error),

  /// The build ran and failed; its diagnostics already streamed through.
  #[error("cargo build failed with exit code {code:?}")]
  Failed { code: Option<i32> },

  #[error("cargo reported success but produced no artifact at {}", path.display())]
  MissingArtifact { path: PathBuf },
}

/// Capability interface over the external compiler.
pub trait Toolchain {
  /// Cross-compile the assembled workspace for `target`, returning the path
  /// of the produced binary inside the workspace.
  fn compile(
    &self,
    workspace: &BuildWorkspace,
    target: &Target,
  ) -> Result<PathBuf, ToolchainError>;
}

/// The real binding: `cargo build --release` against the workspace.
pub struct CargoToolchain {
  cargo_bin: OsString,
}

impl CargoToolchain {
  pub fn new(cargo_bin: impl Into<OsString>) -> Self {
    Self {
      cargo_bin: cargo_bin.into(),
    }
  }

  fn command(&self, workspace: &BuildWorkspace, target: &Target) -> Command {
    let mut cmd = Command::new(&self.cargo_bin);
    cmd
      .arg("build")
      .arg("--release")
      .current_dir(workspace.path())
      // Target selection via the environment, layered on the inherited one.
      .env("CARGO_BUILD_TARGET", target.triple())
      // Build artifacts never leave the ephemeral workspace.
      .env("CARGO_TARGET_DIR", workspace.path().join("target"))
      // The stub has no dependencies; resolution must never touch the network.
      .env("CARGO_NET_OFFLINE", "true")
      // Static link so the produced binary carries no host-library deps.
      .env("RUSTFLAGS", "-C target-feature=+crt-static");
    cmd
  }

  fn artifact_path(&self, workspace: &BuildWorkspace, target: &Target) -> PathBuf {
    workspace
      .path()
      .join("target")
      .join(target.triple())
      .join("release")
      .join(format!("{LAUNCHER_PACKAGE}{}", target.os.exe_suffix()))
  }
}

impl Default for CargoToolchain {
  /// Prefer the toolchain that invoked us (`$CARGO`), else `cargo` from PATH.
  fn default() -> Self {
    Self {
      cargo_bin: env::var_os("CARGO").unwrap_or_else(|| OsString::from("cargo")),
    }
  }
}

impl Toolchain for CargoToolchain {
  fn compile(
    &self,
    workspace: &BuildWorkspace,
    target: &Target,
  ) -> Result<PathBuf, ToolchainError> {
    info!(triple = %target.triple(), "invoking cargo");

    // Inherited stdio: compiler diagnostics stream straight through,
    // unparsed and unreformatted.
    let status = self.command(workspace, target).status().map_err(|e| {
      if e.kind() == io::ErrorKind::NotFound {
        ToolchainError::NotFound {
          bin: self.cargo_bin.to_string_lossy().into_owned(),
        }
      } else {
        ToolchainError::Spawn(e)
      }
    })?;

    if !status.success() {
      return Err(ToolchainError::Failed {
        code: status.code(),
      });
    }

    let artifact = self.artifact_path(workspace, target);
    if !artifact.exists() {
      return Err(ToolchainError::MissingArtifact { path: artifact });
    }

    debug!(artifact = %artifact.display(), "cargo build succeeded");
    Ok(artifact)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::ffi::OsStr;
  use std::fs;
  use tempfile::TempDir;

  use crate::target::Os;

  fn workspace() -> (TempDir, BuildWorkspace) {
    let temp = TempDir::new().unwrap();
    let payload = temp.path().join("input.jar");
    fs::write(&payload, b"payload").unwrap();
    let workspace = BuildWorkspace::assemble(&payload).unwrap();
    (temp, workspace)
  }

  fn env_of(cmd: &Command, key: &str) -> Option<OsString> {
    cmd
      .get_envs()
      .find(|(k, _)| k.to_str() == Some(key))
      .and_then(|(_, v)| v.map(OsStr::to_os_string))
  }

  #[test]
  fn command_builds_release_in_the_workspace() {
    let (_temp, ws) = workspace();
    let toolchain = CargoToolchain::new("cargo");
    let target = Target::new(Os::Linux, "x86_64");

    let cmd = toolchain.command(&ws, &target);
    let args: Vec<_> = cmd.get_args().collect();
    assert_eq!(args, vec![OsStr::new("build"), OsStr::new("--release")]);
    assert_eq!(cmd.get_current_dir(), Some(ws.path()));
  }

  #[test]
  fn command_layers_target_environment_overrides() {
    let (_temp, ws) = workspace();
    let toolchain = CargoToolchain::new("cargo");
    let target = Target::new(Os::Windows, "aarch64");

    let cmd = toolchain.command(&ws, &target);
    assert_eq!(
      env_of(&cmd, "CARGO_BUILD_TARGET"),
      Some(OsString::from("aarch64-pc-windows-gnu"))
    );
    assert_eq!(
      env_of(&cmd, "CARGO_TARGET_DIR"),
      Some(ws.path().join("target").into_os_string())
    );
    assert_eq!(
      env_of(&cmd, "CARGO_NET_OFFLINE"),
      Some(OsString::from("true"))
    );
    assert_eq!(
      env_of(&cmd, "RUSTFLAGS"),
      Some(OsString::from("-C target-feature=+crt-static"))
    );
  }

  #[test]
  fn artifact_path_follows_the_triple() {
    let (_temp, ws) = workspace();
    let toolchain = CargoToolchain::new("cargo");

    let linux = Target::new(Os::Linux, "x86_64");
    assert_eq!(
      toolchain.artifact_path(&ws, &linux),
      ws.path()
        .join("target/x86_64-unknown-linux-musl/release/payload-stub")
    );

    let windows = Target::new(Os::Windows, "x86_64");
    assert_eq!(
      toolchain.artifact_path(&ws, &windows),
      ws.path()
        .join("target/x86_64-pc-windows-gnu/release/payload-stub.exe")
    );
  }

  #[test]
  fn compile_reports_a_missing_compiler_distinctly() {
    let (_temp, ws) = workspace();
    let toolchain = CargoToolchain::new("jarcast-definitely-not-a-cargo");
    let target = Target::new(Os::Linux, "x86_64");

    let err = toolchain.compile(&ws, &target).unwrap_err();
    assert!(matches!(err, ToolchainError::NotFound { .. }));
    assert!(err.to_string().contains("jarcast-definitely-not-a-cargo"));
  }
}
