use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use costview::cli::allocations::AllocationsOptions;
use costview::cli::assets::AssetsOptions;
use costview::core::aggregation::AggregationLevel;
use costview::core::asset::AssetKind;
use costview::core::filter;
use costview::core::log::init_logging;
use costview::core::window::ReportWindow;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct AllocationsArgs {
    /// Report window: month, today, yesterday, 24h, 48h, week, lastweek, 7d, 14d
    #[arg(short, long, default_value = "7d")]
    window: ReportWindow,

    /// Aggregation: namespace, cluster, node, controllerKind, controller, pod, container
    #[arg(short, long, default_value = "namespace")]
    aggregate: AggregationLevel,

    /// Request one accumulated snapshot instead of daily snapshots
    #[arg(long)]
    accumulate: bool,

    /// Filter stack, e.g. 'namespace:"prod"+controllerKind:"deployment"'
    #[arg(short, long)]
    filter: Option<String>,

    /// Leave out the __idle__ row
    #[arg(long)]
    exclude_idle: bool,

    /// Display currency for this run, e.g. EUR
    #[arg(long)]
    currency: Option<String>,

    /// Drill into the named row of the current level
    #[arg(short, long)]
    drill: Option<String>,

    /// Go back to a breadcrumb: -1 for all results, 0 for the first filter
    #[arg(long, allow_hyphen_values = true)]
    up: Option<isize>,

    /// Show daily trend, efficiency and usage for one row of the current level
    #[arg(long, conflicts_with_all = ["export", "watch"])]
    detail: Option<String>,

    /// Write the report as CSV to this file or directory
    #[arg(short, long, conflicts_with = "watch")]
    export: Option<PathBuf>,

    /// Keep refreshing until Ctrl-C
    #[arg(long)]
    watch: bool,
}

#[derive(Args)]
struct AssetsArgs {
    /// Report window: month, today, yesterday, 24h, 48h, week, lastweek, 7d, 14d
    #[arg(short, long, default_value = "7d")]
    window: ReportWindow,

    /// Only show assets of this type, e.g. Node or Disk
    #[arg(short, long)]
    kind: Option<AssetKind>,

    /// Display currency for this run, e.g. EUR
    #[arg(long)]
    currency: Option<String>,

    /// Write the report as CSV to this file or directory
    #[arg(short, long, conflicts_with = "watch")]
    export: Option<PathBuf>,

    /// Keep refreshing until Ctrl-C
    #[arg(long)]
    watch: bool,
}

impl From<Commands> for costview::AppCommand {
    fn from(cmd: Commands) -> costview::AppCommand {
        match cmd {
            Commands::Allocations(args) => {
                costview::AppCommand::Allocations(AllocationsOptions {
                    window: args.window,
                    aggregate: args.aggregate,
                    accumulate: args.accumulate,
                    filters: args.filter.as_deref().map(filter::decode).unwrap_or_default(),
                    include_idle: !args.exclude_idle,
                    currency: args.currency,
                    drill: args.drill,
                    up: args.up,
                    detail: args.detail,
                    export: args.export,
                    watch: args.watch,
                })
            }
            Commands::Assets(args) => costview::AppCommand::Assets(AssetsOptions {
                window: args.window,
                kind: args.kind,
                currency: args.currency,
                export: args.export,
                watch: args.watch,
            }),
            Commands::Rates => costview::AppCommand::Rates,
            Commands::Currency { code } => costview::AppCommand::Currency(code),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display cost allocation, with drill-down
    Allocations(AllocationsArgs),
    /// Display the cloud asset inventory
    Assets(AssetsArgs),
    /// Display exchange rates for the supported currencies
    Rates,
    /// Show or set the display currency
    Currency {
        /// ISO currency code to save, e.g. EUR
        code: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => costview::cli::setup::setup(),
        Some(cmd) => costview::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
