use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "auth_event_lambda";
const LAMBDA_BIN: &str = "auth_event_forwarder";
const DIST_DIR: &str = "infra/auth_event_forwarder/dist";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the auth event forwarder workspace"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::All)]
        job: CiJob,
    },
    /// Build and package the forwarder Lambda as a bootstrap zip
    ServerlessPackage {
        /// Compilation target triple for the Lambda binary
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for the binary
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting and clippy
    Lint,
    /// Unit and integration tests
    Test,
    /// Run lint + test
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn run_cargo(args: &[&str]) {
    eprintln!("+ cargo {}", args.join(" "));
    let status: ExitStatus = Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo");
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_forwarder(target: &str, profile: BuildProfile) {
    ensure_rust_target_installed(target);

    step("Build forwarder lambda binary");
    let mut cargo_args = vec![
        "build",
        "-p",
        LAMBDA_PACKAGE,
        "--target",
        target,
        "--bin",
        LAMBDA_BIN,
    ];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package lambda zip artifact");
    let binary_path = Path::new("target")
        .join(target)
        .join(profile.dir_name())
        .join(LAMBDA_BIN);
    let dist_dir = Path::new(DIST_DIR);
    fs::create_dir_all(dist_dir).expect("failed to create lambda dist directory");

    let zip_path = dist_dir.join(format!("{LAMBDA_BIN}.zip"));
    package_lambda_zip(&binary_path, &zip_path);

    eprintln!("\nPackaged artifact:\n- {}", zip_path.display());
}

fn ensure_rust_target_installed(target: &str) {
    let output = match Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
    {
        Ok(value) => value,
        Err(error) => {
            eprintln!(
                "warning: failed to run `rustup target list --installed` ({error}); continuing without target preflight"
            );
            return;
        }
    };

    let installed = String::from_utf8_lossy(&output.stdout);
    if output.status.success() && !installed.lines().any(|line| line.trim() == target) {
        panic!(
            "required rust target `{target}` is not installed. install it with `rustup target add {target}` and re-run `cargo run -p xtask -- serverless-package`"
        );
    }
}

// The provided.al2023 runtime executes a file named `bootstrap`.
fn package_lambda_zip(binary_path: &Path, zip_path: &Path) {
    if !binary_path.exists() {
        panic!("expected lambda binary at '{}'", binary_path.display());
    }

    let binary = fs::read(binary_path).expect("failed to read lambda binary");
    let file = fs::File::create(zip_path).expect("failed to create lambda zip");
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)
        .expect("failed to start bootstrap entry in lambda zip");
    zip.write_all(&binary)
        .expect("failed to write bootstrap entry");
    zip.finish().expect("failed to finish lambda zip");
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_lint() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&["clippy", "--all-targets", "--", "-D", "warnings"]);
}

fn ci_test() {
    step("Test auth_event_core");
    run_cargo(&["test", "-p", "auth_event_core"]);

    step("Test auth_event_lambda");
    run_cargo(&["test", "-p", LAMBDA_PACKAGE]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { job } => {
            match job {
                CiJob::Lint => ci_lint(),
                CiJob::Test => ci_test(),
                CiJob::All => {
                    ci_lint();
                    ci_test();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::ServerlessPackage { target, profile } => {
            package_forwarder(&target, profile);
        }
    }
}
