//! Set algebra over target platforms.
//!
//! Every modifying operation returns a new [`PlatformSet`] and leaves the
//! receiver untouched, so a chain of directives can be folded by reassignment.

use std::collections::HashSet;
use std::collections::hash_set;

use super::catalog;
use super::{Os, Platform};

/// An unordered set of platforms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformSet {
  platforms: HashSet<Platform>,
}

impl PlatformSet {
  /// Create an empty set.
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a set holding every catalog default.
  pub fn with_defaults() -> Self {
    catalog::all_defaults().into_iter().collect()
  }

  /// Returns a new set with every given platform added.
  pub fn union<I>(&self, other: I) -> Self
  where
    I: IntoIterator<Item = Platform>,
  {
    let mut platforms = self.platforms.clone();
    platforms.extend(other);
    Self { platforms }
  }

  /// Returns a new set with the catalog defaults for `os` added.
  ///
  /// An OS without defaults adds nothing.
  pub fn with_os(&self, os: &Os) -> Self {
    self.union(catalog::defaults_for(os))
  }

  /// Returns a new set without any platform of `os`.
  pub fn without_os(&self, os: &Os) -> Self {
    self.retain(|p| p.os != *os)
  }

  /// Returns a new set with `platform` added.
  pub fn with_platform(&self, platform: Platform) -> Self {
    self.union([platform])
  }

  /// Returns a new set without `platform`. Removing an absent platform is a no-op.
  pub fn without_platform(&self, platform: &Platform) -> Self {
    self.retain(|p| p != platform)
  }

  pub fn contains(&self, platform: &Platform) -> bool {
    self.platforms.contains(platform)
  }

  pub fn len(&self) -> usize {
    self.platforms.len()
  }

  pub fn is_empty(&self) -> bool {
    self.platforms.is_empty()
  }

  pub fn iter(&self) -> hash_set::Iter<'_, Platform> {
    self.platforms.iter()
  }

  /// Snapshot of the members in unspecified order.
  pub fn to_list(&self) -> Vec<Platform> {
    self.platforms.iter().cloned().collect()
  }

  /// Snapshot of the members ordered by OS, then architecture.
  pub fn to_sorted_vec(&self) -> Vec<Platform> {
    let mut list = self.to_list();
    list.sort();
    list
  }

  fn retain(&self, keep: impl Fn(&Platform) -> bool) -> Self {
    Self {
      platforms: self.platforms.iter().filter(|p| keep(p)).cloned().collect(),
    }
  }
}

impl FromIterator<Platform> for PlatformSet {
  fn from_iter<I: IntoIterator<Item = Platform>>(iter: I) -> Self {
    Self {
      platforms: iter.into_iter().collect(),
    }
  }
}

impl<'a> IntoIterator for &'a PlatformSet {
  type Item = &'a Platform;
  type IntoIter = hash_set::Iter<'a, Platform>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}
