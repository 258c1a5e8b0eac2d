use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use quickswap::core::conversion::parse_amount;
use quickswap::core::log::init_logging;
use quickswap::core::{CurrencyCode, HistoryFilter, Offer, TransactionId};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Skip the live rate request and use the built-in reference rates
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for quickswap::AppCommand {
    fn from(cmd: Commands) -> quickswap::AppCommand {
        match cmd {
            Commands::Rates {
                code,
                amount,
                slot,
                show,
                all,
            } => quickswap::AppCommand::Rates {
                edit: code.map(|c| (c, amount.as_deref().map_or(0.0, parse_amount))),
                show: slot.zip(show).map(|(slot, code)| ((slot - 1) as usize, code)),
                all,
            },
            Commands::Compare {
                from,
                to,
                give,
                get,
                save,
            } => quickswap::AppCommand::Compare {
                offer: Offer {
                    from,
                    to,
                    from_amount: parse_amount(&give),
                    to_amount: parse_amount(&get),
                },
                save,
            },
            Commands::History { filter, reference } => {
                quickswap::AppCommand::History { filter, reference }
            }
            Commands::Delete { id, yes } => quickswap::AppCommand::Delete {
                id,
                assume_yes: yes,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show live rates and the converted amount in each currency
    Rates {
        /// Currency the entered amount is in
        #[arg(long, requires = "amount")]
        code: Option<CurrencyCode>,
        /// Amount to convert
        #[arg(long, requires = "code")]
        amount: Option<String>,
        /// Display slot to change, starting at 1
        #[arg(long, requires = "show", value_parser = clap::value_parser!(u64).range(1..))]
        slot: Option<u64>,
        /// Currency to show in the chosen slot
        #[arg(long, requires = "slot")]
        show: Option<CurrencyCode>,
        /// Show every supported currency
        #[arg(long)]
        all: bool,
    },
    /// Compare an offered exchange against the market rate
    Compare {
        /// Currency you give
        #[arg(long, default_value = "TWD")]
        from: CurrencyCode,
        /// Currency you get
        #[arg(long, default_value = "VND")]
        to: CurrencyCode,
        /// Amount you give
        #[arg(long)]
        give: String,
        /// Amount you get
        #[arg(long)]
        get: String,
        /// Record the exchange in the history
        #[arg(long)]
        save: bool,
    },
    /// Display recorded exchanges and the running profit/loss
    History {
        /// Currency code to filter by, or ALL
        #[arg(long, default_value = "ALL")]
        filter: HistoryFilter,
        /// Currency to report profit/loss in
        #[arg(long)]
        reference: Option<CurrencyCode>,
    },
    /// Delete a recorded exchange
    Delete {
        /// Transaction ID as shown by `history`
        id: TransactionId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => quickswap::cli::setup::setup(),
        Some(cmd) => {
            quickswap::run_command(cmd.into(), cli.config_path.as_deref(), cli.offline).await
        }
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
