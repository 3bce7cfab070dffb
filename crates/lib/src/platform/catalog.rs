//! Curated default platforms per OS.
//!
//! Only architectures considered production-ready are listed. ARM variants are
//! left out until per-variant settings (e.g. `GOARM`) can be configured.

use super::{Arch, Os, Platform};

/// OS → default architectures, in the order platforms are listed.
const DEFAULTS: &[(Os, &[Arch])] = &[
  (Os::DARWIN, &[Arch::I386, Arch::AMD64]),
  (Os::DRAGONFLY, &[Arch::AMD64]),
  (Os::FREEBSD, &[Arch::I386, Arch::AMD64]),
  (
    Os::LINUX,
    &[
      Arch::I386,
      Arch::AMD64,
      Arch::PPC64,
      Arch::PPC64LE,
      Arch::MIPS,
      Arch::MIPSLE,
      Arch::MIPS64,
      Arch::MIPS64LE,
    ],
  ),
  (Os::NETBSD, &[Arch::I386, Arch::AMD64]),
  (Os::OPENBSD, &[Arch::I386, Arch::AMD64]),
  (Os::PLAN9, &[Arch::I386, Arch::AMD64]),
  (Os::SOLARIS, &[Arch::AMD64]),
  (Os::WINDOWS, &[Arch::I386, Arch::AMD64]),
];

/// Returns the default platforms for `os`.
///
/// An OS missing from the table has no defaults and yields an empty list.
pub fn defaults_for(os: &Os) -> Vec<Platform> {
  DEFAULTS
    .iter()
    .find(|(known, _)| known == os)
    .map(|(os, arches)| expand(os, arches))
    .unwrap_or_default()
}

/// Returns every OS's defaults concatenated, in table order.
pub fn all_defaults() -> Vec<Platform> {
  DEFAULTS.iter().flat_map(|(os, arches)| expand(os, arches)).collect()
}

/// Returns the OSes that carry defaults, in table order.
pub fn catalog_oses() -> Vec<Os> {
  DEFAULTS.iter().map(|(os, _)| os.clone()).collect()
}

fn expand(os: &Os, arches: &[Arch]) -> Vec<Platform> {
  arches
    .iter()
    .map(|arch| Platform {
      os: os.clone(),
      arch: arch.clone(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn windows_defaults() {
    assert_eq!(
      defaults_for(&Os::WINDOWS),
      vec![Platform::new(Os::WINDOWS, Arch::I386), Platform::new(Os::WINDOWS, Arch::AMD64)]
    );
  }

  #[test]
  fn unknown_os_has_no_defaults() {
    assert!(defaults_for(&Os::new("haiku")).is_empty());
    // Known to the toolchain, but nothing curated yet.
    assert!(defaults_for(&Os::ANDROID).is_empty());
  }

  #[test]
  fn all_defaults_is_the_curated_table() {
    let all: Vec<String> = all_defaults().iter().map(ToString::to_string).collect();
    assert_eq!(
      all,
      [
        "darwin/386",
        "darwin/amd64",
        "dragonfly/amd64",
        "freebsd/386",
        "freebsd/amd64",
        "linux/386",
        "linux/amd64",
        "linux/ppc64",
        "linux/ppc64le",
        "linux/mips",
        "linux/mipsle",
        "linux/mips64",
        "linux/mips64le",
        "netbsd/386",
        "netbsd/amd64",
        "openbsd/386",
        "openbsd/amd64",
        "plan9/386",
        "plan9/amd64",
        "solaris/amd64",
        "windows/386",
        "windows/amd64",
      ]
    );
  }

  #[test]
  fn no_arm_defaults() {
    assert!(
      all_defaults()
        .iter()
        .all(|p| p.arch != Arch::ARM && p.arch != Arch::ARM64)
    );
  }

  #[test]
  fn catalog_oses_matches_table() {
    assert_eq!(catalog_oses().len(), 9);
    assert!(catalog_oses().contains(&Os::SOLARIS));
  }
}
