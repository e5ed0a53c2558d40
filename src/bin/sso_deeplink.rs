//! Generate a list of AWS SSO deep-links you can open in your browser.
//!
//! ```text
//! sso-deeplink | fzf | awk '{print $NF}' | xargs google-chrome
//! ```

use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use sso_deeplink::app::generate;
use sso_deeplink::config::ConfigLoader;
use sso_deeplink::error::SsoError;
use sso_deeplink::http::RetryPolicy;
use sso_deeplink::output::{self, OutputMode};

#[derive(Parser)]
#[command(name = "sso-deeplink")]
#[command(about = "Generate a list of AWS SSO urls you can open in your browser")]
#[command(version)]
struct Cli {
    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// SSO token cache file (defaults to $ORG_SSO_FILE)
    #[arg(long)]
    sso_file: Option<String>,

    /// Override the portal base URL derived from the cache file's region
    #[arg(long)]
    base_url: Option<String>,

    /// Attempts per request, including the first one
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=10))]
    attempts: u32,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<SsoError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &SsoError) -> u8 {
    match error {
        SsoError::MissingSsoFile
        | SsoError::SsoFileNotFound(_)
        | SsoError::SsoFileRead(_)
        | SsoError::SsoFileParse(_)
        | SsoError::MissingField(_)
        | SsoError::InvalidBaseUrl(_)
        | SsoError::InvalidHeader(_) => 2,
        SsoError::Transport { .. } | SsoError::Discovery { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let mut config = ConfigLoader::resolve(cli.sso_file.as_deref())?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url)?;
    }
    let policy = RetryPolicy::default().with_attempts(cli.attempts);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;
    let report = runtime.block_on(generate(&config, policy))?;

    output::print(&report, mode)
        .map_err(|err| SsoError::Output(err.to_string()))?;
    Ok(())
}
