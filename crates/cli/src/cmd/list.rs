//! Implementation of `bakelite --list`.
//!
//! Prints the resolved platform list without building anything.

use anyhow::Result;

use crate::output::{OutputFormat, print_json};

pub fn cmd_list(directives: Option<&str>, output: OutputFormat) -> Result<()> {
  let platforms = super::resolve_platform_list(directives)?;

  if output.is_json() {
    print_json(&platforms)?;
  } else {
    for platform in &platforms {
      println!("{}", platform);
    }
  }

  Ok(())
}
