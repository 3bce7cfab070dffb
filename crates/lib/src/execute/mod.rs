//! Build dispatch.
//!
//! This module fans builds out over every (platform, package) pair. It handles:
//! - Bounding how many builds run at once
//! - Collecting every outcome, failed or not
//! - Reducing the outcomes to a single pass/fail result

pub mod runner;
pub mod task;
pub mod types;

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::platform::Platform;

pub use runner::{CommandRunner, ProcessOutput, ProcessRunner, environment};
pub use task::{artifact_name, build_args, build_env, execute_build};
pub use types::{
  BuildConfig, BuildFailure, BuildJob, BuildOutcome, DEFAULT_TOOLCHAIN, DispatchResult, ExecuteError, ProcessError,
  default_parallelism,
};

/// Runs builds with a bounded number in flight.
///
/// A slot is acquired before each job is spawned and released when the job's
/// task ends, whatever the outcome.
#[derive(Debug)]
pub struct Dispatcher {
  admission: Arc<Semaphore>,
  limit: usize,
}

impl Dispatcher {
  /// Create a dispatcher running at most `limit` builds at once.
  pub fn new(limit: usize) -> Result<Self, ExecuteError> {
    if limit == 0 {
      return Err(ExecuteError::InvalidConcurrency(limit));
    }

    Ok(Self {
      admission: Arc::new(Semaphore::new(limit)),
      limit,
    })
  }

  /// Handle to the admission semaphore. Closing it stops further submission.
  pub fn admission(&self) -> Arc<Semaphore> {
    self.admission.clone()
  }

  /// Run `build` for every (platform, package) pair, platform-major.
  ///
  /// Waits for every submitted job before returning. A failed build never
  /// cancels the others. If a slot cannot be acquired, submission stops and
  /// the jobs already running are still awaited.
  pub async fn run<F, Fut>(&self, platforms: &[Platform], packages: &[String], build: F) -> DispatchResult
  where
    F: Fn(BuildJob) -> Fut,
    Fut: Future<Output = BuildOutcome> + Send + 'static,
  {
    info!(
      platforms = platforms.len(),
      packages = packages.len(),
      jobs = self.limit,
      "starting builds"
    );

    let mut result = DispatchResult::default();
    let mut join_set = JoinSet::new();

    'submit: for platform in platforms {
      for package in packages {
        let permit = match self.admission.clone().acquire_owned().await {
          Ok(permit) => permit,
          Err(e) => {
            let e = ExecuteError::from(e);
            error!(error = %e, "stopping build submission");
            result.admission_failed = true;
            break 'submit;
          }
        };

        let job = BuildJob::new(platform.clone(), package.clone());
        debug!(job = %job, "submitting build");
        let task = build(job);

        join_set.spawn(async move {
          let _permit = permit;
          task.await
        });
        result.submitted += 1;
      }
    }

    while let Some(joined) = join_set.join_next().await {
      match joined {
        Ok(outcome) => {
          debug!(job = %outcome.job(), success = outcome.is_success(), "build finished");
          if outcome.is_success() {
            result.succeeded += 1;
          } else {
            result.failed += 1;
          }
        }
        Err(e) => {
          error!(error = %e, "build task panicked");
          result.failed += 1;
        }
      }
    }

    info!(
      submitted = result.submitted,
      succeeded = result.succeeded,
      failed = result.failed,
      "builds complete"
    );

    result
  }
}

/// Build every package for every platform with the toolchain in `config`.
///
/// `base_env` is the environment each build starts from.
pub async fn run_builds<R>(
  runner: Arc<R>,
  platforms: &[Platform],
  packages: &[String],
  parallelism: usize,
  config: &BuildConfig,
  base_env: BTreeMap<String, String>,
) -> Result<DispatchResult, ExecuteError>
where
  R: ProcessRunner + 'static,
{
  let dispatcher = Dispatcher::new(parallelism)?;
  let config = Arc::new(config.clone());
  let base_env = Arc::new(base_env);

  let result = dispatcher
    .run(platforms, packages, |job| {
      let runner = runner.clone();
      let config = config.clone();
      let base_env = base_env.clone();
      async move { execute_build(runner.as_ref(), &job, &config, &base_env).await }
    })
    .await;

  Ok(result)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Mutex;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::time::Duration;
  use tracing_test::traced_test;

  fn platforms(names: &[&str]) -> Vec<Platform> {
    names.iter().map(|name| name.parse::<Platform>().unwrap()).collect()
  }

  fn packages(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
  }

  fn failure(job: BuildJob) -> BuildOutcome {
    BuildOutcome::Failed(Box::new(BuildFailure {
      job,
      error: ProcessError::Exit {
        program: "go".to_string(),
        code: Some(1),
      },
      stdout: String::new(),
      stderr: String::new(),
    }))
  }

  #[test]
  fn zero_limit_is_rejected() {
    assert!(matches!(Dispatcher::new(0), Err(ExecuteError::InvalidConcurrency(0))));
  }

  #[tokio::test]
  async fn no_jobs_is_not_a_failure() {
    let dispatcher = Dispatcher::new(2).unwrap();

    let result = dispatcher
      .run(&[], &packages(&["cmd/foo"]), |job| async move { BuildOutcome::Succeeded(job) })
      .await;

    assert_eq!(result, DispatchResult::default());
    assert!(!result.is_failed());
  }

  #[tokio::test]
  async fn submits_platform_major() {
    let dispatcher = Dispatcher::new(1).unwrap();
    let order = Mutex::new(Vec::new());

    let result = dispatcher
      .run(
        &platforms(&["linux/amd64", "windows/386"]),
        &packages(&["cmd/a", "cmd/b"]),
        |job| {
          order.lock().unwrap().push(job.to_string());
          async move { BuildOutcome::Succeeded(job) }
        },
      )
      .await;

    assert_eq!(result.submitted, 4);
    assert_eq!(result.succeeded, 4);
    assert!(!result.is_failed());
    assert_eq!(*order.lock().unwrap(), [
      "cmd/a @ linux/amd64",
      "cmd/b @ linux/amd64",
      "cmd/a @ windows/386",
      "cmd/b @ windows/386"
    ]);
  }

  #[tokio::test]
  async fn one_failure_fails_the_run_without_cancelling_siblings() {
    let dispatcher = Dispatcher::new(4).unwrap();

    let result = dispatcher
      .run(
        &platforms(&["linux/amd64", "plan9/386", "windows/amd64"]),
        &packages(&["cmd/foo"]),
        |job| async move {
          if job.platform.os.as_str() == "plan9" {
            failure(job)
          } else {
            tokio::time::sleep(Duration::from_millis(20)).await;
            BuildOutcome::Succeeded(job)
          }
        },
      )
      .await;

    assert!(result.is_failed());
    assert_eq!(result.submitted, 3);
    assert_eq!(result.succeeded, 2);
    assert_eq!(result.failed, 1);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn never_exceeds_concurrency_limit() {
    let dispatcher = Dispatcher::new(2).unwrap();
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let result = dispatcher
      .run(
        &platforms(&["darwin/amd64", "linux/386", "linux/amd64", "windows/amd64"]),
        &packages(&["cmd/a", "cmd/b"]),
        |job| {
          let in_flight = in_flight.clone();
          let peak = peak.clone();
          async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            BuildOutcome::Succeeded(job)
          }
        },
      )
      .await;

    assert_eq!(result.succeeded, 8);
    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(dispatcher.admission().available_permits(), 2);
  }

  #[tokio::test]
  async fn slots_are_released_after_failures() {
    let dispatcher = Dispatcher::new(1).unwrap();

    let result = dispatcher
      .run(&platforms(&["linux/amd64", "linux/386"]), &packages(&["cmd/foo"]), |job| async move {
        failure(job)
      })
      .await;

    assert_eq!(result.failed, 2);
    assert_eq!(dispatcher.admission().available_permits(), 1);
  }

  #[tokio::test]
  #[traced_test]
  async fn logs_each_finished_job() {
    let dispatcher = Dispatcher::new(2).unwrap();

    dispatcher
      .run(&platforms(&["plan9/386"]), &packages(&["cmd/foo"]), |job| async move {
        failure(job)
      })
      .await;

    assert!(logs_contain("build finished"));
    assert!(logs_contain("cmd/foo @ plan9/386"));
  }

  #[tokio::test]
  async fn panicked_task_counts_as_failure() {
    let dispatcher = Dispatcher::new(2).unwrap();

    let result = dispatcher
      .run(&platforms(&["linux/amd64"]), &packages(&["cmd/foo"]), |job| async move {
        if job.package == "cmd/foo" {
          panic!("toolchain exploded");
        }
        BuildOutcome::Succeeded(job)
      })
      .await;

    assert_eq!(result.failed, 1);
    assert!(result.is_failed());
  }

  #[tokio::test]
  async fn closed_admission_fails_before_submitting() {
    let dispatcher = Dispatcher::new(2).unwrap();
    dispatcher.admission().close();

    let result = dispatcher
      .run(&platforms(&["linux/amd64"]), &packages(&["cmd/foo"]), |job| async move {
        BuildOutcome::Succeeded(job)
      })
      .await;

    assert!(result.admission_failed);
    assert_eq!(result.submitted, 0);
    assert!(result.is_failed());
  }

  #[tokio::test]
  async fn admission_closed_mid_run_awaits_running_jobs() {
    let dispatcher = Dispatcher::new(1).unwrap();
    let admission = dispatcher.admission();

    let result = dispatcher
      .run(
        &platforms(&["linux/amd64", "linux/386", "windows/amd64"]),
        &packages(&["cmd/foo"]),
        |job| {
          let admission = admission.clone();
          async move {
            admission.close();
            tokio::time::sleep(Duration::from_millis(10)).await;
            BuildOutcome::Succeeded(job)
          }
        },
      )
      .await;

    assert!(result.admission_failed);
    assert_eq!(result.submitted, 1);
    assert_eq!(result.succeeded, 1);
    assert!(result.is_failed());
  }

  #[tokio::test]
  async fn run_builds_drives_the_runner() {
    struct Flaky;

    impl ProcessRunner for Flaky {
      async fn run(&self, _program: &str, args: &[String], env: &BTreeMap<String, String>) -> ProcessOutput {
        let status = if env["GOOS"] == "windows" {
          Err(ProcessError::Exit {
            program: "go".to_string(),
            code: Some(1),
          })
        } else {
          Ok(())
        };
        ProcessOutput {
          status,
          stdout: args.join(" "),
          stderr: String::new(),
        }
      }
    }

    let result = run_builds(
      Arc::new(Flaky),
      &platforms(&["linux/amd64", "windows/amd64"]),
      &packages(&["cmd/foo", "cmd/bar"]),
      2,
      &BuildConfig::default(),
      BTreeMap::new(),
    )
    .await
    .unwrap();

    assert_eq!(result.succeeded, 2);
    assert_eq!(result.failed, 2);
    assert!(result.is_failed());
  }

  #[tokio::test]
  async fn run_builds_rejects_zero_parallelism() {
    let result = run_builds(
      Arc::new(CommandRunner),
      &[],
      &[],
      0,
      &BuildConfig::default(),
      BTreeMap::new(),
    )
    .await;

    assert!(matches!(result, Err(ExecuteError::InvalidConcurrency(0))));
  }
}
