mod cmd;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{CopyPlanArgs, DefineArgs, DiscoverArgs, ManifestArgs, MergeArgs};
use output::{OutputFormat, print_error};

/// swa - Static web asset manifest tool
#[derive(Parser)]
#[command(name = "swa")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  format: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Discover assets under a content root
  Discover(DiscoverArgs),

  /// Define assets from candidate items
  Define(DefineArgs),

  /// Merge the assets of referenced projects' manifests
  Merge(MergeArgs),

  /// Write the asset manifest (and optionally the runtime manifest)
  Manifest(ManifestArgs),

  /// Plan copies to the output or publish directory
  CopyPlan(CopyPlanArgs),
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let result = match &cli.command {
    Commands::Discover(args) => cmd::cmd_discover(args, cli.format),
    Commands::Define(args) => cmd::cmd_define(args, cli.format),
    Commands::Merge(args) => cmd::cmd_merge(args, cli.format),
    Commands::Manifest(args) => cmd::cmd_manifest(args, cli.format),
    Commands::CopyPlan(args) => cmd::cmd_copy_plan(args, cli.format),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}

/// `SWA_LOG` wins; otherwise `debug` with `--verbose`, else `warn`.
fn init_logging(verbose: bool) {
  let filter = EnvFilter::try_from_env("SWA_LOG")
    .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}
