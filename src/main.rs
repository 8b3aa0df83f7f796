//! `rgw-healthcheck` command line.
//!
//! # Architecture Overview
//!
//! ```text
//!   config.toml / --hostname
//!          │
//!          ▼
//!   ┌─────────────┐    ┌───────────────┐    ┌──────────────────────────┐
//!   │   config    │───▶│    runner     │───▶│  health::RgwHealthCheck  │
//!   │ + inventory │    │ plan, fan-out │    │  running/enabled/endpoint│
//!   └─────────────┘    │ timeout/retry │    └────────────┬─────────────┘
//!                      └───────┬───────┘                 │
//!                              │                         ▼
//!                              ▼                 ┌──────────────┐
//!                      ┌───────────────┐         │    probe     │
//!                      │    report     │         │ systemctl/ip │
//!                      │  text / json  │         │  /proc/net   │
//!                      └───────────────┘         │ local or ssh │
//!                                                └──────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use rgw_healthcheck::config::{self, CheckConfig, ReportFormat};
use rgw_healthcheck::health::{service_name, CheckId, Selection};
use rgw_healthcheck::inventory::Node;
use rgw_healthcheck::observability::logging::init_logging;
use rgw_healthcheck::Runner;

/// Exit code for configuration and usage errors.
const EXIT_USAGE: u8 = 2;

#[derive(Parser)]
#[command(name = "rgw-healthcheck")]
#[command(about = "Verify Ceph RADOS Gateway services on deployed nodes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the RGW checks
    Run(RunArgs),
    /// List checks and the capabilities they require
    List,
    /// Print the RGW unit name for an inventory hostname
    ServiceName {
        hostname: String,
        /// Unit name template
        #[arg(long, default_value = config::schema::DEFAULT_SERVICE_TEMPLATE)]
        template: String,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// TOML config file with settings and [[nodes]]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Check this machine as the given inventory hostname instead of config nodes
    #[arg(long)]
    hostname: Option<String>,

    /// Ceph daemons run in containers (skips host-only checks)
    #[arg(long)]
    containerized: bool,

    /// Run only these checks
    #[arg(long, value_parser = parse_check_id)]
    only: Vec<CheckId>,

    /// Skip these checks
    #[arg(long, value_parser = parse_check_id)]
    skip: Vec<CheckId>,

    /// Report format, overrides the config file
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

fn parse_check_id(s: &str) -> Result<CheckId, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            for id in CheckId::ALL {
                let caps: Vec<String> = id.requires().iter().map(ToString::to_string).collect();
                println!("{}\trequires: {}", id, caps.join(", "));
            }
            ExitCode::SUCCESS
        }
        Commands::ServiceName { hostname, template } => {
            println!("{}", service_name(&template, &hostname));
            ExitCode::SUCCESS
        }
        Commands::Run(args) => match run(args).await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_USAGE)
            }
        },
    }
}

async fn run(args: RunArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => CheckConfig::default(),
    };
    init_logging(&config.observability);

    if args.containerized {
        config.environment.containerized = true;
    }
    if let Some(format) = args.format {
        config.report.format = format.into();
    }

    let nodes = match args.hostname {
        Some(hostname) if !hostname.trim().is_empty() => vec![Node::local(hostname)],
        Some(_) => return Err("--hostname must not be empty".into()),
        None if config.nodes.is_empty() => {
            return Err("no nodes to check: pass --hostname or add [[nodes]] to the config".into())
        }
        None => config.nodes.clone(),
    };

    tracing::info!(
        nodes = nodes.len(),
        containerized = config.environment.containerized,
        interface = %config.rgw.interface,
        port = config.rgw.port,
        "Configuration loaded"
    );

    let format = config.report.format;
    let selection = Selection {
        include: args.only,
        exclude: args.skip,
    };
    let report = Runner::new(config, selection).run(&nodes).await;

    match format {
        ReportFormat::Text => print!("{}", report.render_text()),
        ReportFormat::Json => println!("{}", report.render_json()?),
    }

    Ok(ExitCode::from(report.exit_code() as u8))
}
