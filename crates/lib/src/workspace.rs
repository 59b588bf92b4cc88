//! Ephemeral build workspace assembly.
//!
//! One workspace per packaging invocation, holding exactly three artifacts:
//! the copied payload, the generated launcher source, and the isolated
//! manifest. The directory is removed when the handle drops, on success and
//! on failure alike.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;
use tracing::debug;

use crate::stub::{self, PAYLOAD_FILE_NAME, StubError};

/// Errors from workspace assembly. Any of these aborts the whole pipeline;
/// nothing is ever written to the final destination on the way here.
#[derive(Debug, Error)]
pub enum WorkspaceError {
  #[error("failed to create build workspace: {0}")]
  Create(#[source] std::io::Error),

  #[error("failed to copy payload {}: {source}", path.display())]
  CopyPayload { path: PathBuf, source: std::io::Error },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("failed to write {}: {source}", path.display())]
  WriteFile { path: PathBuf, source: std::io::Error },

  #[error(transparent)]
  Stub(#[from] StubError),
}

/// Ephemeral directory holding one build's artifacts.
#[derive(Debug)]
pub struct BuildWorkspace {
  dir: TempDir,
  payload_size: u64,
}

impl BuildWorkspace {
  /// Create the workspace and populate it: payload under its canonical
  /// name, isolated manifest, and rendered launcher source.
  pub fn assemble(payload: &Path) -> Result<Self, WorkspaceError> {
    let dir = TempDir::with_prefix("jarcast-build-").map_err(WorkspaceError::Create)?;
    let root = dir.path();

    let staged = root.join(PAYLOAD_FILE_NAME);
    let payload_size = fs::copy(payload, &staged).map_err(|e| WorkspaceError::CopyPayload {
      path: payload.to_path_buf(),
      source: e,
    })?;

    let manifest = root.join("Cargo.toml");
    fs::write(&manifest, stub::LAUNCHER_MANIFEST).map_err(|e| WorkspaceError::WriteFile {
      path: manifest,
      source: e,
    })?;

    let src_dir = root.join("src");
    fs::create_dir(&src_dir).map_err(|e| WorkspaceError::CreateDir {
      path: src_dir.clone(),
      source: e,
    })?;

    let main_rs = src_dir.join("main.rs");
    let source = stub::launcher_source(PAYLOAD_FILE_NAME)?;
    fs::write(&main_rs, source).map_err(|e| WorkspaceError::WriteFile {
      path: main_rs,
      source: e,
    })?;

    debug!(workspace = %root.display(), payload_size, "assembled build workspace");
    Ok(Self { dir, payload_size })
  }

  /// Root of the workspace directory.
  pub fn path(&self) -> &Path {
    self.dir.path()
  }

  /// Size in bytes of the staged payload.
  pub fn payload_size(&self) -> u64 {
    self.payload_size
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn payload_file(bytes: &[u8]) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("input.jar");
    fs::write(&path, bytes).unwrap();
    (temp, path)
  }

  #[test]
  fn assemble_creates_all_three_artifacts() {
    let (_temp, payload) = payload_file(b"PK\x03\x04fake");
    let workspace = BuildWorkspace::assemble(&payload).unwrap();

    assert!(workspace.path().join(PAYLOAD_FILE_NAME).exists());
    assert!(workspace.path().join("Cargo.toml").exists());
    assert!(workspace.path().join("src").join("main.rs").exists());
  }

  #[test]
  fn assemble_stages_payload_bytes_verbatim() {
    let bytes: Vec<u8> = (0..=255).collect();
    let (_temp, payload) = payload_file(&bytes);
    let workspace = BuildWorkspace::assemble(&payload).unwrap();

    let staged = fs::read(workspace.path().join(PAYLOAD_FILE_NAME)).unwrap();
    assert_eq!(staged, bytes);
    assert_eq!(workspace.payload_size(), bytes.len() as u64);
  }

  #[test]
  fn workspace_is_removed_on_drop() {
    let (_temp, payload) = payload_file(b"bytes");
    let workspace = BuildWorkspace::assemble(&payload).unwrap();
    let root = workspace.path().to_path_buf();

    assert!(root.exists());
    drop(workspace);
    assert!(!root.exists());
  }

  #[test]
  fn assemble_fails_on_missing_payload() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.jar");

    let err = BuildWorkspace::assemble(&missing).unwrap_err();
    assert!(matches!(err, WorkspaceError::CopyPayload { .. }));
    assert!(err.to_string().contains("nope.jar"));
  }
}
