//! Layered configuration for the `rft` binary
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file
//! (`--config` or `rft.toml` in the working directory), then `RFT_*`
//! environment variables.

use anyhow::{Context, Result};
use config::{Config, Environment, File as ConfigFile};
use rft_ledger::{
    FeeSchedule, GenesisConfig, GenesisPolicy, LedgerAmount, LedgerParams, NumericBackend,
    TokenInfo,
};
use rft_types::{
    Address, DEFAULT_BURN_BPS, DEFAULT_INITIAL_SUPPLY, DEFAULT_OUTPUT_SCALE,
    DEFAULT_REFLECTION_BPS, DEFAULT_TOKEN_NAME, DEFAULT_TOKEN_SYMBOL,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "rft.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    // Ledger
    pub backend: NumericBackend,
    /// Parsed per backend: decimal text or whole smallest units
    pub initial_supply: String,
    pub burn_bps: u32,
    pub reflection_bps: u32,
    pub genesis_policy: GenesisPolicy,
    pub fee_exemption: bool,
    pub output_scale: u32,

    // Genesis parties
    pub creator: String,
    pub contract_address: String,

    // Token metadata
    pub token_name: String,
    pub token_symbol: String,
    pub token_logo_url: String,
    pub token_website: String,

    // Logging
    pub log_level: String,
    pub log_format: String,
}

impl AppConfig {
    pub fn load(config_path_override: Option<&Path>) -> Result<Self> {
        let resolved_path = match config_path_override {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!(
                        "Configuration file {} not found (specified via --config)",
                        path.display()
                    );
                }
                Some(path.to_path_buf())
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                path.exists().then_some(path)
            }
        };

        let mut builder = Config::builder()
            .set_default("backend", "decimal")?
            .set_default("initial_supply", DEFAULT_INITIAL_SUPPLY.to_string())?
            .set_default("burn_bps", DEFAULT_BURN_BPS)?
            .set_default("reflection_bps", DEFAULT_REFLECTION_BPS)?
            .set_default("genesis_policy", "creator_included")?
            .set_default("fee_exemption", true)?
            .set_default("output_scale", DEFAULT_OUTPUT_SCALE)?
            .set_default("creator", "creator")?
            .set_default("contract_address", "con_reflection")?
            .set_default("token_name", DEFAULT_TOKEN_NAME)?
            .set_default("token_symbol", DEFAULT_TOKEN_SYMBOL)?
            .set_default("token_logo_url", "")?
            .set_default("token_website", "")?
            .set_default("log_level", "info")?
            .set_default("log_format", "plain")?;

        if let Some(path) = &resolved_path {
            builder = builder.add_source(ConfigFile::from(path.as_path()));
        }

        builder = builder.add_source(Environment::with_prefix("RFT").try_parsing(true));

        let config = builder
            .build()
            .context("failed to assemble configuration")?
            .try_deserialize::<AppConfig>()
            .context("invalid configuration")?;

        Ok(config)
    }

    pub fn ledger_params(&self) -> LedgerParams {
        LedgerParams {
            fees: FeeSchedule {
                burn_bps: self.burn_bps,
                reflection_bps: self.reflection_bps,
            },
            genesis_policy: self.genesis_policy,
            fee_exemption: self.fee_exemption,
            output_scale: self.output_scale,
        }
    }

    pub fn genesis_config<N: LedgerAmount>(&self) -> Result<GenesisConfig<N>> {
        let creator = Address::parse(&self.creator)
            .with_context(|| format!("invalid creator address {:?}", self.creator))?;
        let contract = Address::parse(&self.contract_address).with_context(|| {
            format!("invalid contract address {:?}", self.contract_address)
        })?;
        let initial_supply = N::parse_amount(&self.initial_supply)
            .with_context(|| format!("invalid initial supply for the {} backend", N::BACKEND))?;

        Ok(GenesisConfig {
            creator,
            contract,
            initial_supply,
            token: TokenInfo {
                name: self.token_name.clone(),
                symbol: self.token_symbol.clone(),
                logo_url: self.token_logo_url.clone(),
                website: self.token_website.clone(),
            },
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to render configuration")
    }
}
