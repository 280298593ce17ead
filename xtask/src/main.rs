use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use clap::{Parser, Subcommand};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const RELAY_PACKAGE: &str = "notify_relay_lambda";
const RELAY_BIN: &str = "relay_lambda";
const WORKSPACE_CRATES: [&str; 2] = ["notify_relay_core", RELAY_PACKAGE];

#[derive(Parser)]
#[command(name = "xtask", about = "Developer tasks for the notify-relay workspace")]
struct Cli {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand)]
enum Task {
    /// Run unit and integration tests for every relay crate
    Test,
    /// Formatting and clippy gates followed by the test suite
    Ci,
    /// Build the relay binary and wrap it as a provided.al2 `bootstrap` zip
    ServerlessPackage {
        /// Lambda target triple
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build without --release
        #[arg(long)]
        debug: bool,
        /// Where the zip is written
        #[arg(long, default_value = "infra/notify_relay/dist/relay.zip")]
        output: PathBuf,
    },
}

type TaskResult = Result<(), String>;

fn cargo(args: &[&str]) -> TaskResult {
    eprintln!("+ cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .status()
        .map_err(|error| format!("could not start cargo: {error}"))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!("`cargo {}` exited with {status}", args.join(" ")))
    }
}

fn test_all() -> TaskResult {
    WORKSPACE_CRATES
        .into_iter()
        .try_for_each(|package| cargo(&["test", "-p", package]))
}

fn ci() -> TaskResult {
    cargo(&["fmt", "--all", "--", "--check"])?;
    cargo(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])?;
    test_all()
}

fn serverless_package(target: &str, debug: bool, output: &Path) -> TaskResult {
    let mut build = vec!["build", "-p", RELAY_PACKAGE, "--bin", RELAY_BIN, "--target", target];
    if !debug {
        build.push("--release");
    }
    cargo(&build)?;

    let profile = if debug { "debug" } else { "release" };
    let binary = Path::new("target").join(target).join(profile).join(RELAY_BIN);
    let executable = fs::read(&binary)
        .map_err(|error| format!("relay binary missing at {}: {error}", binary.display()))?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .map_err(|error| format!("cannot create {}: {error}", parent.display()))?;
    }
    write_bootstrap_zip(&executable, output)
        .map_err(|error| format!("cannot write {}: {error}", output.display()))?;

    eprintln!("packaged {} ({} bytes of bootstrap)", output.display(), executable.len());
    Ok(())
}

fn write_bootstrap_zip(executable: &[u8], output: &Path) -> zip::result::ZipResult<()> {
    let mut archive = ZipWriter::new(File::create(output)?);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    archive.start_file("bootstrap", options)?;
    archive.write_all(executable)?;
    archive.finish()?;
    Ok(())
}

fn main() -> ExitCode {
    let result = match Cli::parse().command {
        Task::Test => test_all(),
        Task::Ci => ci(),
        Task::ServerlessPackage {
            target,
            debug,
            output,
        } => serverless_package(&target, debug, &output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("xtask failed: {message}");
            ExitCode::FAILURE
        }
    }
}
