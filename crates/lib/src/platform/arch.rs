use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// CPU architecture token understood by the toolchain (the value of `GOARCH`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arch(Cow<'static, str>);

impl Arch {
  pub const AMD64: Arch = Arch(Cow::Borrowed("amd64"));
  pub const I386: Arch = Arch(Cow::Borrowed("386"));
  pub const ARM: Arch = Arch(Cow::Borrowed("arm"));
  pub const ARM64: Arch = Arch(Cow::Borrowed("arm64"));
  pub const PPC64: Arch = Arch(Cow::Borrowed("ppc64"));
  pub const PPC64LE: Arch = Arch(Cow::Borrowed("ppc64le"));
  pub const MIPS: Arch = Arch(Cow::Borrowed("mips"));
  pub const MIPSLE: Arch = Arch(Cow::Borrowed("mipsle"));
  pub const MIPS64: Arch = Arch(Cow::Borrowed("mips64"));
  pub const MIPS64LE: Arch = Arch(Cow::Borrowed("mips64le"));

  pub fn new(token: impl Into<String>) -> Self {
    Self(Cow::Owned(token.into()))
  }

  /// Detect the host CPU architecture, translated to its toolchain token.
  ///
  /// Returns `None` if the architecture has no known token.
  pub fn current() -> Option<Self> {
    match std::env::consts::ARCH {
      "x86_64" => Some(Self::AMD64),
      "x86" => Some(Self::I386),
      "aarch64" => Some(Self::ARM64),
      "arm" => Some(Self::ARM),
      "powerpc64" if cfg!(target_endian = "little") => Some(Self::PPC64LE),
      "powerpc64" => Some(Self::PPC64),
      "mips" if cfg!(target_endian = "little") => Some(Self::MIPSLE),
      "mips" => Some(Self::MIPS),
      "mips64" if cfg!(target_endian = "little") => Some(Self::MIPS64LE),
      "mips64" => Some(Self::MIPS64),
      _ => None,
    }
  }

  /// Returns the token for this architecture
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl From<&str> for Arch {
  fn from(token: &str) -> Self {
    Self::new(token)
  }
}
