pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

pub use crate::core::config;

use crate::cli::allocations::AllocationsOptions;
use crate::cli::assets::AssetsOptions;
use crate::core::cache::Store;
use crate::core::config::AppConfig;
use crate::core::currency::{BASE_CURRENCY, currency_option};
use crate::core::preferences::{COLLECTION_NAME, Preferences};
use crate::providers::{CachingRatesProvider, FrankfurterProvider, OpenCostClient};
use crate::store::KeyValueStore;
use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Allocations(AllocationsOptions),
    Assets(AssetsOptions),
    Rates,
    Currency(Option<String>),
}

/// Services shared by every command of one invocation.
pub struct App {
    pub config: AppConfig,
    pub opencost: OpenCostClient,
    pub rates: CachingRatesProvider<FrankfurterProvider>,
    pub preferences: Preferences,
    // Declared last: dropping it flushes the preferences to disk.
    _store: KeyValueStore,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let data_path = config.default_data_path()?;
        debug!("Using data path {}", data_path.display());
        let store = KeyValueStore::open(&data_path);

        let collection = match store.get_collection(COLLECTION_NAME, true, true) {
            Some(collection) => collection,
            None => {
                warn!("Preferences will not be saved between runs");
                store
                    .get_collection(COLLECTION_NAME, false, true)
                    .context("Failed to create preferences collection")?
            }
        };
        let preferences = Preferences::new(collection);

        let opencost = OpenCostClient::new(config.opencost_url())?;
        let rates = CachingRatesProvider::new(
            FrankfurterProvider::new(config.rates_url())?,
            preferences.clone(),
        );

        Ok(Self {
            config,
            opencost,
            rates,
            preferences,
            _store: store,
        })
    }

    /// Display currency: the explicit request, then the saved preference,
    /// then the config file, then USD.
    pub async fn display_currency(&self, requested: Option<&str>) -> Result<String> {
        if let Some(code) = requested {
            return match currency_option(code) {
                Some(option) => Ok(option.code.to_string()),
                None => bail!("Unsupported currency: {}", code),
            };
        }
        if let Some(saved) = self.preferences.stored_currency().await {
            return Ok(saved);
        }
        let configured = self
            .config
            .currency
            .as_deref()
            .and_then(currency_option)
            .map_or(BASE_CURRENCY, |option| option.code);
        Ok(configured.to_string())
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("costview starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let app = App::new(config)?;
    let interval = app.config.refresh_interval();

    match command {
        AppCommand::Allocations(options) => {
            let currency = app.display_currency(options.currency.as_deref()).await?;
            cli::allocations::run(&app.opencost, &app.rates, &currency, interval, options).await
        }
        AppCommand::Assets(options) => {
            let currency = app.display_currency(options.currency.as_deref()).await?;
            cli::assets::run(&app.opencost, &app.rates, &currency, interval, options).await
        }
        AppCommand::Rates => {
            let currency = app.display_currency(None).await?;
            cli::rates::run(&app.rates, &currency).await
        }
        AppCommand::Currency(code) => cli::rates::currency(&app.preferences, code.as_deref()).await,
    }
}
