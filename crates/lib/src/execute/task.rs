//! A single (platform, package) build.

use std::collections::BTreeMap;

use tracing::{error, info};

use crate::execute::runner::{ProcessOutput, ProcessRunner};
use crate::execute::types::{BuildConfig, BuildFailure, BuildJob, BuildOutcome};
use crate::platform::Platform;

/// Variable naming the target OS for the toolchain.
pub const ENV_TARGET_OS: &str = "GOOS";
/// Variable naming the target architecture for the toolchain.
pub const ENV_TARGET_ARCH: &str = "GOARCH";
/// Variable toggling native interop.
pub const ENV_CGO: &str = "CGO_ENABLED";

const WINDOWS_EXE_SUFFIX: &str = ".exe";

/// Name of the artifact a build writes: `<base>-<os>-<arch>[.exe]`.
///
/// `<base>` is the last segment of the package path.
pub fn artifact_name(package: &str, platform: &Platform) -> String {
  let base = package
    .trim_end_matches('/')
    .rsplit('/')
    .next()
    .filter(|segment| !segment.is_empty())
    .unwrap_or(package);

  let mut name = format!("{}-{}-{}", base, platform.os, platform.arch);
  if platform.os.is_windows() {
    name.push_str(WINDOWS_EXE_SUFFIX);
  }
  name
}

/// The child environment: `base` overlaid with the cross-compilation variables.
pub fn build_env(base: &BTreeMap<String, String>, platform: &Platform, cgo: bool) -> BTreeMap<String, String> {
  let mut env = base.clone();
  env.insert(ENV_TARGET_OS.to_string(), platform.os.to_string());
  env.insert(ENV_TARGET_ARCH.to_string(), platform.arch.to_string());
  env.insert(ENV_CGO.to_string(), if cgo { "1" } else { "0" }.to_string());
  env
}

/// Toolchain arguments: `build -o <artifact> [-ldflags <flags>] <package>`.
pub fn build_args(artifact: &str, ldflags: Option<&str>, package: &str) -> Vec<String> {
  let mut args = vec!["build".to_string(), "-o".to_string(), artifact.to_string()];

  if let Some(flags) = ldflags.filter(|flags| !flags.is_empty()) {
    args.push("-ldflags".to_string());
    args.push(flags.to_string());
  }

  args.push(package.to_string());
  args
}

/// Build one package for one platform.
///
/// Failures are logged with the captured output and returned as an outcome;
/// they are never propagated as errors.
pub async fn execute_build<R: ProcessRunner>(
  runner: &R,
  job: &BuildJob,
  config: &BuildConfig,
  base_env: &BTreeMap<String, String>,
) -> BuildOutcome {
  let artifact = artifact_name(&job.package, &job.platform);
  let env = build_env(base_env, &job.platform, config.cgo);
  let args = build_args(&artifact, config.ldflags.as_deref(), &job.package);

  info!(
    package = %job.package,
    goos = %job.platform.os,
    goarch = %job.platform.arch,
    "running build"
  );

  let ProcessOutput { status, stdout, stderr } = runner.run(&config.toolchain, &args, &env).await;

  match status {
    Ok(()) => {
      info!(package = %job.package, platform = %job.platform, artifact = %artifact, "build succeeded");
      BuildOutcome::Succeeded(job.clone())
    }
    Err(error) => {
      error!(
        package = %job.package,
        goos = %job.platform.os,
        goarch = %job.platform.arch,
        error = %error,
        stdout = %stdout,
        stderr = %stderr,
        "build failed"
      );
      BuildOutcome::Failed(Box::new(BuildFailure {
        job: job.clone(),
        error,
        stdout,
        stderr,
      }))
    }
  }
}
