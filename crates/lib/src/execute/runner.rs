//! External process invocation.
//!
//! Builds never inherit the parent environment directly: the child receives
//! exactly the environment it is handed, and both output streams are captured
//! separately rather than streamed.

use std::collections::BTreeMap;
use std::future::Future;

use tokio::process::Command;
use tracing::debug;

use crate::execute::types::ProcessError;

/// Captured result of running a process.
///
/// The streams are kept whether or not the process succeeded.
#[derive(Debug)]
pub struct ProcessOutput {
  pub status: Result<(), ProcessError>,
  pub stdout: String,
  pub stderr: String,
}

/// Runs external programs on behalf of a build.
pub trait ProcessRunner: Send + Sync {
  /// Run `program` with `args` and exactly the variables in `env`.
  fn run(
    &self,
    program: &str,
    args: &[String],
    env: &BTreeMap<String, String>,
  ) -> impl Future<Output = ProcessOutput> + Send;
}

/// [`ProcessRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner;

impl ProcessRunner for CommandRunner {
  async fn run(&self, program: &str, args: &[String], env: &BTreeMap<String, String>) -> ProcessOutput {
    let mut command = Command::new(program);
    command.args(args).env_clear().envs(env);

    debug!(program = %program, args = ?args, "spawning process");

    let output = match command.output().await {
      Ok(output) => output,
      Err(source) => {
        return ProcessOutput {
          status: Err(ProcessError::Spawn {
            program: program.to_string(),
            source,
          }),
          stdout: String::new(),
          stderr: String::new(),
        };
      }
    };

    let status = if output.status.success() {
      Ok(())
    } else {
      Err(ProcessError::Exit {
        program: program.to_string(),
        code: output.status.code(),
      })
    };

    ProcessOutput {
      status,
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
  }
}

/// Snapshot the current process environment.
///
/// Non-UTF-8 keys and values are converted lossily.
pub fn environment() -> BTreeMap<String, String> {
  std::env::vars_os()
    .map(|(key, value)| (key.to_string_lossy().into_owned(), value.to_string_lossy().into_owned()))
    .collect()
}
