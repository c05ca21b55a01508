//! `cloudwatch-to-timber`: run the Timber packaging hook against a resolved
//! serverless service document and write the result.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use cloudwatch_to_timber_synthesis::{
    DocumentHost, ForwardingOutcome, HostOptions, TimberPlugin, PACKAGE_HOOK,
};

/// Framework version assumed when none is given
const DEFAULT_FRAMEWORK_VERSION: &str = "1.12.0";

#[derive(Parser, Debug)]
#[command(
    name = "cloudwatch-to-timber",
    version,
    about = "Inject Timber log forwarding resources into a serverless service document",
    long_about = "Reads a resolved service document (for example the output of \
                  `serverless print --format json`), adds the IAM role, forwarder \
                  function, invoke permission and one CloudWatch Logs subscription \
                  filter per function, and writes the updated document."
)]
struct Cli {
    /// Path to the service document (JSON), or `-` to read stdin
    service_file: PathBuf,

    /// Stage override (defaults to provider.stage, then `dev`)
    #[arg(long)]
    stage: Option<String>,

    /// Region override (defaults to provider.region, then `us-east-1`)
    #[arg(long)]
    region: Option<String>,

    /// Timber API key, replacing custom.timber.apiKey
    #[arg(long, env = "TIMBER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Version of the host framework to report to the plugin
    #[arg(long, env = "SERVERLESS_VERSION", default_value = DEFAULT_FRAMEWORK_VERSION)]
    framework_version: String,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only print resources.Resources
    #[arg(long)]
    resources_only: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_target(false)
        .format_timestamp(None)
        .init();
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read service document from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read service document: {}", path.display()))
    }
}

fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, format!("{contents}\n"))
            .with_context(|| format!("Failed to write output: {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{contents}").context("Failed to write to stdout")
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let input = read_input(&cli.service_file)?;
    let options = HostOptions {
        stage: cli.stage.clone(),
        region: cli.region.clone(),
    };

    let mut host = DocumentHost::from_json(cli.framework_version.as_str(), &input, options)
        .context("Failed to load service document")?;
    if let Some(api_key) = &cli.api_key {
        host.document_mut().set_api_key(api_key);
    }

    let mut plugin = TimberPlugin::new(host).context("Failed to initialise Timber plugin")?;
    match plugin.run_hook(PACKAGE_HOOK) {
        Some(ForwardingOutcome::Applied { inserted }) => {
            log::info!("Timber: added {} resources", inserted.len());
            for logical_id in &inserted {
                log::debug!("  {logical_id}");
            }
        }
        Some(ForwardingOutcome::Skipped(reason)) => {
            log::debug!("Packaging pass skipped: {reason:?}");
        }
        None => log::warn!("{PACKAGE_HOOK} was not handled"),
    }

    let document = plugin.into_host().into_document();
    let value = if cli.resources_only {
        serde_json::to_value(document.resources().cloned().unwrap_or_default())
    } else {
        serde_json::to_value(&document)
    }
    .context("Failed to serialize output")?;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .context("Failed to serialize output")?;

    write_output(cli.output.as_deref(), &rendered)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(&cli)
}
