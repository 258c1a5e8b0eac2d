pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::fetcher::OfflineProvider;
use crate::core::{AppState, CurrencyCode, HistoryFilter, Ledger, Offer, RateProvider, TransactionId};
use anyhow::Result;
use providers::gemini::GeminiProvider;
use tracing::{debug, info};

pub enum AppCommand {
    Rates {
        edit: Option<(CurrencyCode, f64)>,
        /// Zero-based display slot and the currency to show in it
        show: Option<(usize, CurrencyCode)>,
        all: bool,
    },
    Compare {
        offer: Offer,
        save: bool,
    },
    History {
        filter: HistoryFilter,
        reference: Option<CurrencyCode>,
    },
    Delete {
        id: TransactionId,
        assume_yes: bool,
    },
}

impl AppCommand {
    fn needs_rates(&self) -> bool {
        !matches!(self, AppCommand::Delete { .. })
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>, offline: bool) -> Result<()> {
    info!("QuickSwap starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = store::open(&config.default_data_path()?)?;
    let ledger = Ledger::load(store)?;
    let mut state = AppState::new(ledger).with_visible(config.visible_currencies.clone());

    if command.needs_rates() {
        let provider: Box<dyn RateProvider + Send + Sync> = if offline {
            Box::new(OfflineProvider)
        } else {
            Box::new(GeminiProvider::from_config(&config.providers.gemini))
        };
        let pb = cli::ui::new_spinner("Fetching latest rates...");
        state.refresh(provider.as_ref()).await;
        pb.finish_and_clear();
    }

    match command {
        AppCommand::Rates { edit, show, all } => cli::rates::run(&mut state, edit, show, all),
        AppCommand::Compare { offer, save } => cli::compare::run(&mut state, &offer, save),
        AppCommand::History { filter, reference } => cli::history::run(
            &mut state,
            filter,
            reference.unwrap_or(config.reference_currency),
        ),
        AppCommand::Delete { id, assume_yes } => {
            cli::history::delete(&mut state, id, assume_yes).map(|_| ())
        }
    }
}
