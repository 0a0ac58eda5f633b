//! viewer-release CLI
//!
//! Entry point for the `viewer-release` command-line tool.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use artifact_name::ArtifactFilename;
use viewer_release::config::{version_manager_secret, BuildIdentity, ConfigSource, ReleaseConfig};
use viewer_release::notify::{HttpTransport, MessageSink, Notifier, StdoutSink, WebhookSink};
use viewer_release::{Pipeline, PipelineError, Publisher};

/// Environment variable consulted when `--webhook` is not given
const ENV_WEBHOOK: &str = "FS_DISCORD_WEBHOOK";

#[derive(Parser)]
#[command(name = "viewer-release")]
#[command(about = "Viewer build artifact publishing pipeline", version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Unpack artifacts, build the download list and publish it
    DownloadList {
        /// Directory holding the CI artifact archives
        input_dir: PathBuf,

        /// Root of the hosted download tree
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Path to config file (default: built-in tables)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Webhook URL to post the download list to
        #[arg(long, env = ENV_WEBHOOK)]
        webhook: Option<String>,

        /// Submit every artifact to the version-manager
        #[arg(long)]
        notify: bool,

        /// Print the aggregated registry as JSON instead of publishing
        #[arg(long)]
        json: bool,
    },

    /// Decode a single artifact archive name
    ParseName {
        /// Archive or directory name
        name: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::DownloadList {
            input_dir,
            output,
            config,
            webhook,
            notify,
            json,
        } => {
            let options = DownloadListOptions {
                input_dir,
                output,
                config,
                webhook,
                notify,
                json,
            };
            if let Err(e) = run_download_list(options) {
                eprintln!("Error: {}", e);
                process::exit(e.exit_code());
            }
        }
        Commands::ParseName { name, json } => {
            run_parse_name(&name, json);
        }
    }
}

struct DownloadListOptions {
    input_dir: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
    webhook: Option<String>,
    notify: bool,
    json: bool,
}

fn run_download_list(options: DownloadListOptions) -> Result<(), PipelineError> {
    let (config, source) = ReleaseConfig::load(options.config.as_deref())?;
    log_config_source(&source);

    let pipeline = Pipeline::new(&config, &options.output)?;
    log::info!("hosted tree: {}", pipeline.output_root().display());

    if options.json {
        let summary = pipeline.run::<HttpTransport>(&options.input_dir, None)?;
        println!("{}", serde_json::to_string_pretty(&summary.registry.to_json())?);
        return Ok(());
    }

    // Identity and secret are resolved up front so a misconfigured run fails
    // before anything is unpacked
    let notify_setup = if options.notify {
        let url = config.version_manager_url.clone().ok_or_else(|| {
            viewer_release::ConfigError::Validation(
                "--notify requires version_manager_url in the config".to_string(),
            )
        })?;
        let identity = BuildIdentity::from_env()?;
        let secret = version_manager_secret()?;
        Some((url, identity, secret, HttpTransport::new()?))
    } else {
        None
    };

    let webhook = match options.webhook.as_deref() {
        Some(url) => Some(WebhookSink::new(url)?),
        None => None,
    };

    let stdout = StdoutSink;
    let mut sinks: Vec<&dyn MessageSink> = vec![&stdout];
    if let Some(ref sink) = webhook {
        sinks.push(sink);
    }

    let notifier = notify_setup
        .as_ref()
        .map(|(url, identity, secret, transport)| Notifier::new(transport, url, secret, identity));

    let publisher = Publisher { sinks, notifier };
    let summary = pipeline.run(&options.input_dir, Some(&publisher))?;

    for group in &summary.groups {
        log::info!(
            "{}: {} record(s), {} report chunk(s), delivered {:?}",
            group.classification,
            group.aggregate.recorded,
            group.chunks,
            group.delivered
        );
        if let Some(ref notify) = group.notify {
            log::info!(
                "{}: version-manager accepted {}, failed {}",
                group.classification,
                notify.accepted.len(),
                notify.failed.len()
            );
        }
    }

    if !summary.unpack.skipped.is_empty() {
        log::warn!("{} input(s) skipped", summary.unpack.skipped.len());
    }

    Ok(())
}

fn log_config_source(source: &ConfigSource) {
    match (&source.path, &source.digest) {
        (Some(path), Some(digest)) => log::debug!("config: {} ({})", path, digest),
        _ => log::debug!("config: built-in defaults"),
    }
}

fn run_parse_name(name: &str, json: bool) {
    let parsed = match ArtifactFilename::parse(name) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&parsed) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("Classification:   {}", parsed.classification);
        println!("Platform:         {}", parsed.platform);
        println!("Platform version: {}", parsed.platform_version);
        println!("Variant:          {}", parsed.variant);
        println!("Grid:             {}", parsed.grid);
    }
}
