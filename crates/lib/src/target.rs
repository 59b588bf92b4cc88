//! Target descriptor: operating system, architecture, and triple mapping.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The requested operating system is not one jarcast can target.
#[derive(Debug, Error)]
#[error("unsupported target os: {requested} (expected windows, linux, or darwin)")]
pub struct InvalidTargetError {
  pub requested: String,
}

/// Operating system a produced binary can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
  Linux,
  Darwin,
  Windows,
}

impl Os {
  /// The operating system this pipeline itself runs on.
  #[cfg(target_os = "linux")]
  pub const fn host() -> Self {
    Os::Linux
  }

  #[cfg(target_os = "macos")]
  pub const fn host() -> Self {
    Os::Darwin
  }

  #[cfg(target_os = "windows")]
  pub const fn host() -> Self {
    Os::Windows
  }

  /// Returns the OS name as accepted on the command line.
  pub const fn as_str(&self) -> &'static str {
    match self {
      Os::Linux => "linux",
      Os::Darwin => "darwin",
      Os::Windows => "windows",
    }
  }

  /// Executable suffix convention for this OS.
  pub const fn exe_suffix(&self) -> &'static str {
    match self {
      Os::Windows => ".exe",
      Os::Linux | Os::Darwin => "",
    }
  }
}

impl FromStr for Os {
  type Err = InvalidTargetError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "linux" => Ok(Os::Linux),
      "darwin" => Ok(Os::Darwin),
      "windows" => Ok(Os::Windows),
      _ => Err(InvalidTargetError {
        requested: s.to_string(),
      }),
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Combined target descriptor (e.g. "windows/x86_64").
///
/// The OS is constrained to the closed set above; the architecture is carried
/// as-is into the target triple and left to the compiler to accept or reject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
  pub os: Os,
  pub arch: String,
}

impl Target {
  pub fn new(os: Os, arch: impl Into<String>) -> Self {
    Self {
      os,
      arch: arch.into(),
    }
  }

  /// The platform this pipeline itself runs on.
  pub fn host() -> Self {
    Self::new(Os::host(), std::env::consts::ARCH)
  }

  /// Resolve a requested OS/architecture pair, defaulting missing parts to
  /// the host. The OS must parse (case-insensitively) into the supported
  /// set; the architecture is not validated here.
  pub fn resolve(os: Option<&str>, arch: Option<&str>) -> Result<Self, InvalidTargetError> {
    let os = match os {
      Some(name) => name.parse()?,
      None => Os::host(),
    };
    let arch = arch.unwrap_or(std::env::consts::ARCH);
    Ok(Self::new(os, arch))
  }

  /// Rust target triple for this descriptor.
  ///
  /// Linux maps to musl so the produced binary is fully static and carries
  /// no host-library dependencies.
  pub fn triple(&self) -> String {
    match self.os {
      Os::Linux => format!("{}-unknown-linux-musl", self.arch),
      Os::Darwin => format!("{}-apple-darwin", self.arch),
      Os::Windows => format!("{}-pc-windows-gnu", self.arch),
    }
  }

  /// Append `.exe` for windows targets when the path lacks it. Paths for
  /// other targets, and already-suffixed paths, come back untouched.
  pub fn prepare_output_path(&self, path: &Path) -> PathBuf {
    if self.os != Os::Windows {
      return path.to_path_buf();
    }

    let suffixed = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"));

    if suffixed {
      path.to_path_buf()
    } else {
      let mut raw = path.as_os_str().to_owned();
      raw.push(".exe");
      PathBuf::from(raw)
    }
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.os, self.arch)
  }
}
