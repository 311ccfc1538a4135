//! Configuration file handling for caja.
//!
//! The configuration file is stored at `$CAJA_HOME/config.json` and holds the business name and
//! the currency symbol used when printing money. The ledger itself lives next to it in
//! `$CAJA_HOME/caja.sqlite`.

use crate::db::Db;
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::Amount;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "caja";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const CAJA_SQLITE: &str = "caja.sqlite";
pub(crate) const DEFAULT_BUSINESS_NAME: &str = "Mi Negocio";
pub(crate) const DEFAULT_CURRENCY_SYMBOL: &str = "S/";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$CAJA_HOME` and from there it loads `$CAJA_HOME/config.json` and opens the
/// ledger database.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    db: Db,
    sqlite_path: PathBuf,
}

impl Config {
    /// Creates the data directory with an initial `config.json` and an empty ledger database.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/caja`
    /// - `business_name` - Shown in report headers.
    /// - `currency_symbol` - Prefixed to money when printing, e.g. `S/`.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail or if a ledger database already exists.
    pub async fn create(
        dir: impl Into<PathBuf>,
        business_name: &str,
        currency_symbol: &str,
    ) -> Result<Self> {
        Self::create_inner(dir.into(), business_name, currency_symbol)
            .await
            .pub_result(ErrorType::Config)
    }

    async fn create_inner(
        maybe_relative: PathBuf,
        business_name: &str,
        currency_symbol: &str,
    ) -> Res<Self> {
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the caja home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A configuration already exists at '{}'",
                config_path.display()
            )
        }

        let config_file = ConfigFile::new(business_name.trim(), currency_symbol.trim());
        config_file.save(&config_path).await?;

        let sqlite_path = root.join(CAJA_SQLITE);
        let db = Db::init(&sqlite_path)
            .await
            .context("Unable to create SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    /// This will
    /// - validate that `caja_home` exists and that the config file exists
    /// - load the config file
    /// - open the ledger database, migrating it if needed
    /// - return the loaded configuration object
    pub async fn load(caja_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(caja_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(maybe_relative: PathBuf) -> Res<Self> {
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Caja Home is missing, run 'caja init' first")?;
        utils::read_dir(&root).await?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let sqlite_path = root.join(CAJA_SQLITE);
        let db = Db::load(&sqlite_path)
            .await
            .context("Unable to load SQLite DB")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            db,
            sqlite_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub(crate) fn db(&self) -> &Db {
        &self.db
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }

    pub fn business_name(&self) -> &str {
        &self.config_file.business_name
    }

    pub fn currency_symbol(&self) -> &str {
        &self.config_file.currency_symbol
    }

    /// Formats `amount` for people, e.g. `S/ 1,234.50` or `-S/ 3.00`.
    pub fn money(&self, amount: Amount) -> String {
        if amount.is_negative() {
            format!("-{} {}", self.currency_symbol(), (Amount::ZERO - amount).grouped())
        } else {
            format!("{} {}", self.currency_symbol(), amount.grouped())
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "caja",
///   "config_version": 1,
///   "business_name": "Dulce Tentación",
///   "currency_symbol": "S/"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "caja"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    #[serde(default = "default_business_name")]
    business_name: String,

    #[serde(default = "default_currency_symbol")]
    currency_symbol: String,
}

fn default_business_name() -> String {
    DEFAULT_BUSINESS_NAME.to_string()
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new(DEFAULT_BUSINESS_NAME, DEFAULT_CURRENCY_SYMBOL)
    }
}

impl ConfigFile {
    fn new(business_name: &str, currency_symbol: &str) -> Self {
        let or_default = |value: &str, default: &str| {
            if value.is_empty() {
                default.to_string()
            } else {
                value.to_string()
            }
        };
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            business_name: or_default(business_name, DEFAULT_BUSINESS_NAME),
            currency_symbol: or_default(currency_symbol, DEFAULT_CURRENCY_SYMBOL),
        }
    }

    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version <= CONFIG_VERSION,
            "Unsupported config_version {} in config file, expected {} or lower",
            config.config_version,
            CONFIG_VERSION
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }
}
