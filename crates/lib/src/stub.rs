//! Stub generation: source and manifest templates for the launcher.
//!
//! The launcher is the minimal host program that gets cross-compiled around
//! the payload. It embeds the archive at compile time via `include_bytes!`,
//! stages it to a private temp directory at run time, and hands it to `java`
//! with fully inherited standard streams.

use thiserror::Error;

/// Canonical name the payload is staged under, at build time and at run time.
pub const PAYLOAD_FILE_NAME: &str = "app.jar";

/// Throwaway package identity for the generated build unit. Also the file
/// name of the compiled launcher binary.
pub const LAUNCHER_PACKAGE: &str = "payload-stub";

/// Errors from stub generation. Only reachable with a resource name other
/// than [`PAYLOAD_FILE_NAME`], so in the pipeline this is an internal fault.
#[derive(Debug, Error)]
pub enum StubError {
  #[error("resource name cannot be embedded in generated source: {name:?}")]
  UnsupportedResourceName { name: String },
}

/// Manifest for the generated build unit.
///
/// The empty `[workspace]` table pins the stub to its own workspace so Cargo
/// never walks up and resolves against the invoking user's project.
pub const LAUNCHER_MANIFEST: &str = r#"# Generated by jarcast. Throwaway build unit; never published.
[package]
name = "payload-stub"
version = "0.0.0"
edition = "2021"
publish = false

[profile.release]
strip = true

[workspace]
"#;

/// Launcher source, with `{payload}` standing in for the embedded resource
/// name relative to the generated crate root.
const LAUNCHER_TEMPLATE: &str = r#"//! Self-extracting launcher generated by jarcast. Do not edit.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::{self, Command};

static PAYLOAD: &[u8] = include_bytes!("../{payload}");

/// Removes the staging directory when dropped, whatever the child did.
struct StageDir(PathBuf);

impl Drop for StageDir {
  fn drop(&mut self) {
    let _ = fs::remove_dir_all(&self.0);
  }
}

fn main() {
  match run() {
    Ok(code) => process::exit(code),
    Err(message) => {
      eprintln!("error: {message}");
      process::exit(1);
    }
  }
}

fn run() -> Result<i32, String> {
  let root = env::temp_dir().join(format!("jarcast-{pid}", pid = process::id()));
  fs::create_dir_all(&root)
    .map_err(|e| format!("cannot create staging directory {}: {e}", root.display()))?;
  let _stage = StageDir(root.clone());

  let archive = root.join("{payload}");
  fs::write(&archive, PAYLOAD)
    .map_err(|e| format!("cannot stage {}: {e}", archive.display()))?;

  let status = Command::new("java")
    .arg("-jar")
    .arg(&archive)
    .status()
    .map_err(|e| format!("cannot launch java: {e}"))?;

  Ok(status.code().unwrap_or(1))
}
"#;

/// Render launcher source that embeds the named resource.
///
/// The name must survive verbatim inside an `include_bytes!` string literal
/// and a path join, so path separators, quotes, backslashes, and control
/// characters are rejected.
pub fn launcher_source(resource: &str) -> Result<String, StubError> {
  if !embeddable(resource) {
    return Err(StubError::UnsupportedResourceName {
      name: resource.to_string(),
    });
  }
  Ok(LAUNCHER_TEMPLATE.replace("{payload}", resource))
}

fn embeddable(name: &str) -> bool {
  !name.is_empty()
    && !name.contains(['/', '\\', '"'])
    && !name.chars().any(|c| c.is_control())
}
