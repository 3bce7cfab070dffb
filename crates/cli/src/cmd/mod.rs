mod build;
mod list;

pub use build::{BuildOptions, cmd_build};
pub use list::cmd_list;

use anyhow::{Context, Result};

use bakelite_lib::platform::{Platform, resolve_platforms, split_directives};

/// Resolve a `--platforms` value into a sorted platform list.
///
/// Without a value the catalog defaults are used.
fn resolve_platform_list(directives: Option<&str>) -> Result<Vec<Platform>> {
  let tokens = directives.map(split_directives).unwrap_or_default();
  let set = resolve_platforms(&tokens).context("Invalid --platforms value")?;
  Ok(set.to_sorted_vec())
}
