use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the ride fare workspace",
    long_about = "A unified CLI for running the booking demo, benchmarks,\n\
                  and CI checks in the ride fare workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the booking_flow example
    Demo,
    /// Quote the sample cross-town trip through the `ride` CLI
    Quote {
        /// Vehicle tier id
        #[arg(long, default_value = "bike")]
        tier: String,
    },
    /// Run Criterion benchmarks
    Bench,
    /// Compare benchmarks: stash changes, create baseline, restore, compare
    BenchCompare,
    /// Run CI checks (fmt, clippy, tests, examples, benchmarks)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Build and run examples
    Examples,
    /// Run benchmarks
    Bench,
    /// Run check + examples + bench
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn git(args: &[&str]) -> ExitStatus {
    eprintln!("+ git {}", args.join(" "));
    Command::new("git")
        .args(args)
        .status()
        .expect("failed to execute git")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_git(args: &[&str]) {
    let status = git(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn bench_args<'a>(extra: &[&'a str]) -> Vec<&'a str> {
    let mut args = vec!["bench", "--package", "ride_core", "--bench", "estimate"];
    if !extra.is_empty() {
        args.push("--");
        args.extend_from_slice(extra);
    }
    args
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test ride_core");
    run_cargo(&["test", "-p", "ride_core"]);

    step("Test ride_cli");
    run_cargo(&["test", "-p", "ride_cli"]);
}

fn ci_examples() {
    step("Run booking_flow example");
    run_cargo(&["run", "-p", "ride_core", "--example", "booking_flow"]);

    step("Book through the ride CLI");
    run_cargo(&[
        "run",
        "-p",
        "ride_cli",
        "--",
        "book",
        "--tier",
        "mini",
        "--pickup-lat",
        "24.8607",
        "--pickup-lng",
        "67.0011",
        "--dropoff-lat",
        "24.9056",
        "--dropoff-lng",
        "67.0822",
        "--auto-accept",
    ]);
}

fn ci_bench() {
    step("Run benchmarks");
    run_cargo(&bench_args(&[]));
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Demo => {
            run_cargo(&["run", "-p", "ride_core", "--example", "booking_flow"]);
        }
        Commands::Quote { tier } => {
            run_cargo(&[
                "run",
                "-p",
                "ride_cli",
                "--",
                "quote",
                "--tier",
                &tier,
                "--pickup-lat",
                "24.8607",
                "--pickup-lng",
                "67.0011",
                "--dropoff-lat",
                "24.9056",
                "--dropoff-lng",
                "67.0822",
            ]);
        }
        Commands::Bench => {
            run_cargo(&bench_args(&[]));
        }
        Commands::BenchCompare => {
            let baseline_dir = Path::new("target/criterion");
            if baseline_dir.exists() {
                step("Removing existing benchmark data");
                std::fs::remove_dir_all(baseline_dir).expect("failed to remove target/criterion");
            }

            step("Stashing current changes");
            run_git(&[
                "stash",
                "push",
                "-m",
                "Temporary stash for benchmark comparison",
            ]);

            step("Running benchmark to create baseline");
            run_cargo(&bench_args(&["--save-baseline", "main"]));

            step("Reapplying changes");
            run_git(&["stash", "pop"]);

            step("Running benchmark comparing against baseline");
            run_cargo(&bench_args(&["--baseline", "main"]));

            eprintln!("\nDone! Check the output above to see performance comparison.");
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Examples => ci_examples(),
                CiJob::Bench => ci_bench(),
                CiJob::All => {
                    ci_check();
                    ci_examples();
                    ci_bench();
                }
            }
            eprintln!("\nCI job passed.");
        }
    }
}
