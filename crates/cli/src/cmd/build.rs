//! Implementation of the default build command.
//!
//! Resolves the platform list, then builds every package for every platform
//! with bounded parallelism.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::debug;

use bakelite_lib::execute::{BuildConfig, CommandRunner, default_parallelism, environment, run_builds};
use bakelite_lib::platform::Platform;

use crate::output::{format_duration, print_info, print_success};

/// Settings collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
  pub packages: Vec<String>,
  pub platforms: Option<String>,
  pub jobs: Option<usize>,
  pub toolchain: String,
  pub cgo: bool,
  pub ldflags: Option<String>,
}

/// Execute the build command.
///
/// Returns `ExitCode::FAILURE` when any build failed. Configuration problems
/// are returned as errors before any build starts.
pub fn cmd_build(options: BuildOptions) -> Result<ExitCode> {
  if options.packages.is_empty() {
    bail!("Expected at least one package");
  }

  let platforms = super::resolve_platform_list(options.platforms.as_deref())?;
  let jobs = options.jobs.unwrap_or_else(default_parallelism);

  let config = BuildConfig {
    toolchain: options.toolchain,
    cgo: options.cgo,
    ldflags: options.ldflags.filter(|flags| !flags.is_empty()),
  };

  if let Some(host) = Platform::host() {
    debug!(host = %host, "detected host platform");
  }
  print_info(&format!("running bakelite with {} jobs", jobs));

  let started = Instant::now();
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let result = rt
    .block_on(run_builds(
      Arc::new(CommandRunner),
      &platforms,
      &options.packages,
      jobs,
      &config,
      environment(),
    ))
    .context("Failed to start builds")?;

  if result.is_failed() {
    return Ok(ExitCode::FAILURE);
  }

  print_success(&format!(
    "built {} artifact(s) in {}",
    result.succeeded,
    format_duration(started.elapsed())
  ));

  Ok(ExitCode::SUCCESS)
}
