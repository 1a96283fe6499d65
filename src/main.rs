use anyhow::Result;
use cambio::core::CurrencyCode;
use cambio::core::log::init_logging;
use clap::{CommandFactory, Parser, Subcommand};

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

impl From<Commands> for cambio::AppCommand {
    fn from(cmd: Commands) -> cambio::AppCommand {
        match cmd {
            Commands::Convert { amount, from, to } => cambio::AppCommand::Convert { amount, from, to },
            Commands::Interactive => cambio::AppCommand::Interactive,
            Commands::Currencies => cambio::AppCommand::Currencies,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount once and print the result
    #[command(allow_negative_numbers = true)]
    Convert {
        /// Amount to convert, e.g. 10 or 10,50
        amount: Option<String>,
        /// Currency to convert from
        #[arg(short, long)]
        from: Option<CurrencyCode>,
        /// Currency to convert to
        #[arg(short, long)]
        to: Option<CurrencyCode>,
    },
    /// Edit amount and currencies interactively, converting on every change
    Interactive,
    /// List supported currencies
    Currencies,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => cambio::cli::setup::setup(),
        Some(cmd) => cambio::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
