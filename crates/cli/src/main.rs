mod cmd;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bakelite_lib::execute::DEFAULT_TOOLCHAIN;
use bakelite_lib::platform::{catalog_oses, defaults_for};

use cmd::{BuildOptions, cmd_build, cmd_list};
use output::{OutputFormat, print_error};

/// Exit code for configuration errors (bad flags, no packages, bad directives).
const EXIT_CONFIG_ERROR: u8 = 2;

/// Long help trailer describing the directive syntax and the default platforms.
fn platforms_help() -> String {
  let mut help = String::from(
    "\
Platforms are prefixed with \"-\" to remove from the set and \"+\" to add to
the set. They can be given sparsely as just the OS, or as a complete os/arch
pair. If the special platform \"-\" is given first, the default set is
disabled.

By default Bakelite builds for the following platforms:

",
  );

  for os in catalog_oses() {
    for platform in defaults_for(&os) {
      help.push_str(&format!("  {}\n", platform));
    }
  }

  help.push_str(
    "
Artifacts are written to the working directory as <package>-<os>-<arch>,
with an .exe suffix for Windows.",
  );
  help
}

/// Bakelite - compile packages for many OS/architecture pairs at once
#[derive(Parser)]
#[command(name = "bakelite")]
#[command(author, version, about, long_about = None, after_long_help = platforms_help())]
struct Cli {
  /// Packages to build
  packages: Vec<String>,

  /// Enable cgo (passes CGO_ENABLED=1; may require a toolchain per platform)
  #[arg(long)]
  cgo: bool,

  /// Arguments to pass on each toolchain link invocation
  #[arg(long, value_name = "FLAGS", allow_hyphen_values = true)]
  ldflags: Option<String>,

  /// Space-separated list of platform directives modifying the built set
  #[arg(long, value_name = "LIST", allow_hyphen_values = true)]
  platforms: Option<String>,

  /// Number of builds to run at once [default: available parallelism]
  #[arg(short, long, env = "BAKELITE_JOBS")]
  jobs: Option<usize>,

  /// Toolchain program to invoke for each build
  #[arg(long, env = "BAKELITE_TOOLCHAIN", default_value = DEFAULT_TOOLCHAIN)]
  toolchain: String,

  /// Print the resolved platforms and exit without building
  #[arg(long)]
  list: bool,

  /// Output format for --list
  #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
  format: OutputFormat,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  // Initialize logging
  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = if cli.list {
    cmd_list(cli.platforms.as_deref(), cli.format).map(|()| ExitCode::SUCCESS)
  } else {
    cmd_build(BuildOptions {
      packages: cli.packages,
      platforms: cli.platforms,
      jobs: cli.jobs,
      toolchain: cli.toolchain,
      cgo: cli.cgo,
      ldflags: cli.ldflags,
    })
  };

  match result {
    Ok(code) => code,
    Err(e) => {
      print_error(&format!("fatal: {:#}", e));
      ExitCode::from(EXIT_CONFIG_ERROR)
    }
  }
}
