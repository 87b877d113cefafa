use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use liveswitch_cli::{output, root, router};
use liveswitch_core::config::{Config, ExitPolicy, WarnLevel};
use liveswitch_core::{ActionBuilder, Dispatcher, FleetCommand, SystemClock};
use medialive_api::HttpEndpointResolver;

#[derive(Parser)]
#[command(
    name = "liveswitch",
    about = "Start, stop, switch and pause live channels across regions",
    version
)]
struct Cli {
    /// One of: start, stop, input_s3, input_live, ch1_pause, ch1_unpause, ch2_pause, ch2_unpause
    command: Option<String>,

    /// Config file (default: nearest liveswitch.yaml, then ~/.config/liveswitch/config.yaml)
    #[arg(long, env = "LIVESWITCH_CONFIG")]
    config: Option<PathBuf>,

    /// Output the fleet report as JSON
    #[arg(long, short = 'j')]
    json: bool,

    /// Override the configured exit policy (strict | lenient)
    #[arg(long, value_name = "POLICY")]
    exit_policy: Option<ExitPolicy>,
}

fn main() {
    // Argument errors share the exit status of unknown command tokens.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                eprint!("{e}");
                eprintln!("{}", router::usage());
                std::process::exit(1);
            }
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Unknown or missing tokens never reach config or the network.
    let command = match cli.command.as_deref().map(str::parse::<FleetCommand>) {
        Some(Ok(command)) => command,
        Some(Err(e)) => {
            eprintln!("error: {e}");
            eprintln!("{}", router::usage());
            std::process::exit(1);
        }
        None => {
            eprintln!("{}", router::usage());
            std::process::exit(1);
        }
    };

    match run(command, &cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run(command: FleetCommand, cli: &Cli) -> anyhow::Result<i32> {
    let path = root::resolve_config(cli.config.as_deref())?;
    let config = Config::load(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;

    for w in config.validate() {
        match w.level {
            WarnLevel::Warning => tracing::warn!("config: {}", w.message),
            WarnLevel::Error => tracing::error!("config: {}", w.message),
        }
    }
    config.ensure_valid()?;

    let resolver = Arc::new(HttpEndpointResolver::new(config.endpoints.clone()));
    let builder = ActionBuilder::new(Arc::new(SystemClock), config.switch_lead());
    let dispatcher = Dispatcher::new(resolver, builder, config.dispatch.options());

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt
        .block_on(router::route(command, &config, &dispatcher))
        .with_context(|| format!("{command} was not dispatched"))?;

    if cli.json {
        output::print_json(&report)?;
    } else {
        print!("{}", output::render_report(&report));
    }

    let policy = cli.exit_policy.unwrap_or(config.exit_policy);
    let code = match policy {
        ExitPolicy::Strict if !report.is_success() => 1,
        _ => 0,
    };
    Ok(code)
}
