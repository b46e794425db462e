use std::{path::PathBuf, sync::LazyLock};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use xshell::{Shell, cmd};

#[derive(Parser)]
#[command(name = "xtask", about = "arenals project automation")]
#[command(styles = clap_cargo::style::CLAP_STYLING)]
#[clap(disable_version_flag = true, bin_name = "cargo xtask")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Format code
  Fmt {
    /// Check formatting without making changes
    #[arg(long)]
    check: bool,
  },
  /// Lint both feature sets and check formatting
  Lint {
    /// Fix lint issues automatically
    #[arg(long)]
    fix: bool,
  },
  /// Run the test suite with and without `std`
  Test,
  /// Run the arena benchmarks
  Bench {
    /// Only run benchmarks whose name contains this
    filter: Option<String>,
  },
}

/// Project root directory.
static ROOT: LazyLock<PathBuf> = LazyLock::new(|| {
  let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
  manifest.parent().unwrap_or(manifest).to_path_buf()
});

fn main() -> Result<()> {
  let cli = Cli::parse();

  let sh = Shell::new().context("failed to start shell")?;
  sh.change_dir(ROOT.as_path());

  match cli.command {
    Command::Fmt { check } => fmt(&sh, check),
    Command::Lint { fix } => lint(&sh, fix),
    Command::Test => test(&sh),
    Command::Bench { filter } => bench(&sh, filter),
  }
}

fn fmt(sh: &Shell, check: bool) -> Result<()> {
  let args =
    std::iter::once("--all").chain(check.then_some(["--", "--check"]).into_iter().flatten());
  cmd!(sh, "cargo +nightly fmt {args...}").run()?;
  Ok(())
}

fn lint(sh: &Shell, fix: bool) -> Result<()> {
  let args =
    if fix { ["--fix", "--allow-dirty", "--allow-staged"] } else { ["--", "-D", "warnings"] };
  cmd!(sh, "cargo clippy --workspace --all-targets {args...}").run()?;
  cmd!(sh, "cargo clippy -p arenals --lib --no-default-features {args...}").run()?;
  fmt(sh, !fix)
}

fn test(sh: &Shell) -> Result<()> {
  cmd!(sh, "cargo test --workspace").run()?;
  cmd!(sh, "cargo test -p arenals --lib --no-default-features").run()?;
  Ok(())
}

fn bench(sh: &Shell, filter: Option<String>) -> Result<()> {
  let filter = filter.into_iter();
  cmd!(sh, "cargo bench -p arenals --bench arena -- {filter...}").run()?;
  Ok(())
}
