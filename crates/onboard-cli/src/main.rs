//! # onboard CLI entry point
//!
//! Parses command-line arguments, initialises logging and dispatches to
//! subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use onboard_cli::check::{run_check, CheckArgs};
use onboard_cli::enrollment::{run_enrollment, EnrollmentArgs};

/// Identity liveness onboarding toolchain.
#[derive(Parser, Debug)]
#[command(name = "onboard", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one liveness check against a user record file.
    Check(CheckArgs),

    /// Inspect remote enrollments at the verification provider.
    Enrollment(EnrollmentArgs),
}

/// `RUST_LOG` wins; otherwise verbosity picks the level.
fn env_filter(verbose: u8) -> EnvFilter {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable JSON.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .with_target(false);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    let result = match &cli.command {
        Commands::Check(args) => run_check(args).await,
        Commands::Enrollment(args) => run_enrollment(args).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onboard_cli::enrollment::EnrollmentCommand;
    use onboard_liveness::VerificationMode;

    #[test]
    fn cli_parse_check_with_image() {
        let cli = Cli::try_parse_from([
            "onboard",
            "check",
            "user.json",
            "--image",
            "s3://captures/selfie.jpg",
            "--mode",
            "simple",
        ])
        .unwrap();
        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.record.to_str(), Some("user.json"));
        assert_eq!(args.image.as_deref(), Some("s3://captures/selfie.jpg"));
        assert_eq!(args.mode, Some(VerificationMode::Simple));
        assert!(!args.mock);
    }

    #[test]
    fn cli_rejects_image_and_video_together() {
        let result = Cli::try_parse_from([
            "onboard", "check", "user.json", "--image", "a.jpg", "--video", "a.mp4",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_rejects_unknown_mode() {
        let result = Cli::try_parse_from(["onboard", "check", "user.json", "--mode", "offline"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parse_enrollment_info() {
        let cli = Cli::try_parse_from(["onboard", "--log-json", "enrollment", "info", "enr-1"])
            .unwrap();
        assert!(cli.log_json);
        let Commands::Enrollment(args) = cli.command else {
            panic!("expected enrollment");
        };
        assert!(matches!(
            args.command,
            EnrollmentCommand::Info { ref reference } if reference == "enr-1"
        ));
    }

    #[test]
    fn verbose_flag_counts() {
        let cli = Cli::try_parse_from(["onboard", "-vv", "enrollment", "status", "ACC-1"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
