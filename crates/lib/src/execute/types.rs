//! Types for build dispatch.
//!
//! This module defines the job, outcome, configuration, and error types
//! shared by the dispatcher and the per-job build task.

use std::fmt;

use thiserror::Error;

use crate::platform::Platform;

/// Program invoked for every build unless configured otherwise.
pub const DEFAULT_TOOLCHAIN: &str = "go";

/// Errors from setting up or running a dispatch.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The concurrency limit must allow at least one build.
  #[error("invalid concurrency limit {0}: must be at least 1")]
  InvalidConcurrency(usize),

  /// A build slot could not be acquired.
  #[error("failed to acquire build slot: {0}")]
  Admission(#[from] tokio::sync::AcquireError),
}

/// Errors from running an external process.
#[derive(Debug, Error)]
pub enum ProcessError {
  /// The program could not be started.
  #[error("failed to spawn {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The program ran but did not exit successfully.
  #[error("{program} exited with code {code:?}")]
  Exit { program: String, code: Option<i32> },
}

/// One (platform, package) pair submitted to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildJob {
  pub platform: Platform,
  pub package: String,
}

impl BuildJob {
  pub fn new(platform: Platform, package: impl Into<String>) -> Self {
    Self {
      platform,
      package: package.into(),
    }
  }
}

impl fmt::Display for BuildJob {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} @ {}", self.package, self.platform)
  }
}

/// Diagnostics for a failed build.
#[derive(Debug)]
pub struct BuildFailure {
  pub job: BuildJob,
  pub error: ProcessError,
  pub stdout: String,
  pub stderr: String,
}

/// Result of one build attempt.
#[derive(Debug)]
pub enum BuildOutcome {
  Succeeded(BuildJob),
  Failed(Box<BuildFailure>),
}

impl BuildOutcome {
  pub fn is_success(&self) -> bool {
    matches!(self, BuildOutcome::Succeeded(_))
  }

  pub fn job(&self) -> &BuildJob {
    match self {
      BuildOutcome::Succeeded(job) => job,
      BuildOutcome::Failed(failure) => &failure.job,
    }
  }
}

/// Aggregate result of a dispatch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchResult {
  /// Jobs that were handed a build slot.
  pub submitted: usize,

  /// Jobs whose build succeeded.
  pub succeeded: usize,

  /// Jobs whose build failed (including tasks that panicked).
  pub failed: usize,

  /// Whether slot acquisition failed and submission stopped early.
  pub admission_failed: bool,
}

impl DispatchResult {
  /// True if any build failed or the dispatcher could not submit every job.
  pub fn is_failed(&self) -> bool {
    self.failed > 0 || self.admission_failed
  }
}

/// Configuration for each build invocation.
#[derive(Debug, Clone)]
pub struct BuildConfig {
  /// Toolchain program to invoke.
  pub toolchain: String,

  /// Whether native interop (cgo) is enabled for the build.
  pub cgo: bool,

  /// Extra linker arguments; `None` or empty omits the flag.
  pub ldflags: Option<String>,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      toolchain: DEFAULT_TOOLCHAIN.to_string(),
      cgo: false,
      ldflags: None,
    }
  }
}

/// Get the number of CPUs for default parallelism.
pub fn default_parallelism() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}
