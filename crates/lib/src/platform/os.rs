use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Operating system token understood by the toolchain (the value of `GOOS`).
///
/// Any token is accepted; the well-known ones are exposed as constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Os(Cow<'static, str>);

impl Os {
  pub const ANDROID: Os = Os(Cow::Borrowed("android"));
  pub const DARWIN: Os = Os(Cow::Borrowed("darwin"));
  pub const DRAGONFLY: Os = Os(Cow::Borrowed("dragonfly"));
  pub const FREEBSD: Os = Os(Cow::Borrowed("freebsd"));
  pub const LINUX: Os = Os(Cow::Borrowed("linux"));
  pub const NETBSD: Os = Os(Cow::Borrowed("netbsd"));
  pub const OPENBSD: Os = Os(Cow::Borrowed("openbsd"));
  pub const PLAN9: Os = Os(Cow::Borrowed("plan9"));
  pub const SOLARIS: Os = Os(Cow::Borrowed("solaris"));
  pub const WINDOWS: Os = Os(Cow::Borrowed("windows"));

  pub fn new(token: impl Into<String>) -> Self {
    Self(Cow::Owned(token.into()))
  }

  /// Detect the host operating system, translated to its toolchain token.
  ///
  /// Returns `None` if the host OS has no known token.
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::LINUX),
      "macos" => Some(Self::DARWIN),
      "windows" => Some(Self::WINDOWS),
      "freebsd" => Some(Self::FREEBSD),
      "dragonfly" => Some(Self::DRAGONFLY),
      "netbsd" => Some(Self::NETBSD),
      "openbsd" => Some(Self::OPENBSD),
      "solaris" => Some(Self::SOLARIS),
      "android" => Some(Self::ANDROID),
      _ => None,
    }
  }

  /// Returns the token for this OS
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Whether executables built for this OS need the `.exe` suffix.
  pub fn is_windows(&self) -> bool {
    *self == Self::WINDOWS
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl From<&str> for Os {
  fn from(token: &str) -> Self {
    Self::new(token)
  }
}
