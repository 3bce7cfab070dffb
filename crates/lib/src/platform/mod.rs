pub mod arch;
pub mod catalog;
pub mod directive;
pub mod os;
pub mod set;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use arch::Arch;
pub use catalog::{all_defaults, catalog_oses, defaults_for};
pub use directive::{Directive, DirectiveError, apply, resolve_platforms, split_directives};
pub use os::Os;
pub use set::PlatformSet;

/// A cross-compilation target: an OS/architecture pair (e.g., "linux/amd64").
///
/// Platforms compare by value and order by OS, then architecture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Platform {
  pub os: Os,
  pub arch: Arch,
}

/// Errors from parsing an `os/arch` pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsePlatformError {
  #[error("expected os/arch, got '{0}'")]
  MissingSeparator(String),

  #[error("empty os in '{0}'")]
  EmptyOs(String),

  #[error("empty arch in '{0}'")]
  EmptyArch(String),

  #[error("too many '/' separators in '{0}'")]
  TooManySeparators(String),
}

impl Platform {
  pub fn new(os: impl Into<Os>, arch: impl Into<Arch>) -> Self {
    Self {
      os: os.into(),
      arch: arch.into(),
    }
  }

  /// Detect the platform the tool is running on.
  ///
  /// Returns `None` if the host OS or architecture has no toolchain token.
  pub fn host() -> Option<Self> {
    Some(Self {
      os: Os::current()?,
      arch: Arch::current()?,
    })
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.os, self.arch)
  }
}

impl FromStr for Platform {
  type Err = ParsePlatformError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (os, arch) = s
      .split_once('/')
      .ok_or_else(|| ParsePlatformError::MissingSeparator(s.to_string()))?;

    if arch.contains('/') {
      return Err(ParsePlatformError::TooManySeparators(s.to_string()));
    }
    if os.is_empty() {
      return Err(ParsePlatformError::EmptyOs(s.to_string()));
    }
    if arch.is_empty() {
      return Err(ParsePlatformError::EmptyArch(s.to_string()));
    }

    Ok(Self::new(os, arch))
  }
}
