use std::fs;
use std::path::{Path, PathBuf};

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use serde::Deserialize;
use thiserror::Error;

use crate::infrastructure::ethereum::{ProviderConfig, WalletSource};
use crate::modules::dao::ContractAddresses;

/// Network the DAO contracts are deployed on unless configured otherwise
pub const DEFAULT_CHAIN_ID: u64 = 4;
pub const DEFAULT_RPC: &str = "http://localhost:8545";
pub const DEFAULT_KEY_ENV: &str = "DAODASH_PRIVATE_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid {field} address `{value}`")]
    InvalidAddress { field: &'static str, value: String },
    #[error("{0} contract address is not configured")]
    MissingAddress(&'static str),
    #[error("invalid private key in ${var}")]
    InvalidKey { var: String },
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct WalletConfig {
    /// Name of the environment variable holding a hex private key
    pub private_key_env: Option<String>,
    /// Unlocked node account to send from
    pub account: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub rpc: Option<String>,
    pub ws: Option<String>,
    pub ipc: Option<String>,
    pub chain_id: Option<u64>,
    pub dao_address: Option<String>,
    pub nft_address: Option<String>,

    #[serde(default)]
    pub wallet: WalletConfig,
}

/// Command line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub rpc: Option<String>,
    pub ws: Option<String>,
    pub ipc: Option<PathBuf>,
    pub chain_id: Option<u64>,
    pub dao: Option<String>,
    pub nft: Option<String>,
    pub account: Option<String>,
}

/// Fully resolved startup settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint: ProviderConfig,
    pub chain_id: u64,
    pub contracts: ContractAddresses,
    pub wallet: WalletSource,
}

/// Load the config file. A missing file yields the defaults.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let Some(path) = path.map(Path::to_path_buf).or_else(config_path) else {
        return Ok(Config::default());
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    parse(&content).map_err(|source| ConfigError::Parse { path, source })
}

pub fn parse(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(content)
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("DAODASH_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("daodash").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("daodash").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "daodash", "daodash")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("daodash"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("daodash"));
    }
    directories::ProjectDirs::from("io", "daodash", "daodash")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

impl Settings {
    /// Merge the file with the command line. Private keys are read through
    /// `lookup` so nothing secret ever lives in the file itself.
    pub fn resolve<F>(config: &Config, overrides: &Overrides, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = endpoint(config, overrides);
        let chain_id = overrides
            .chain_id
            .or(config.chain_id)
            .unwrap_or(DEFAULT_CHAIN_ID);

        let dao = overrides
            .dao
            .as_deref()
            .or(config.dao_address.as_deref())
            .ok_or(ConfigError::MissingAddress("dao"))?;
        let nft = overrides
            .nft
            .as_deref()
            .or(config.nft_address.as_deref())
            .ok_or(ConfigError::MissingAddress("nft"))?;
        let contracts = ContractAddresses {
            dao: parse_address("dao", dao)?,
            nft: parse_address("nft", nft)?,
        };

        let wallet = wallet(config, overrides, lookup)?;

        Ok(Self {
            endpoint,
            chain_id,
            contracts,
            wallet,
        })
    }
}

// Precedence: command line before file, and ipc before ws before http
fn endpoint(config: &Config, overrides: &Overrides) -> ProviderConfig {
    #[cfg(unix)]
    {
        let ipc = overrides
            .ipc
            .clone()
            .or_else(|| config.ipc.as_ref().map(PathBuf::from));
        if let Some(path) = ipc {
            return ProviderConfig::Ipc(path);
        }
    }
    if let Some(ws) = overrides.ws.clone() {
        return ProviderConfig::WebSocket(ws);
    }
    if let Some(rpc) = overrides.rpc.clone() {
        return ProviderConfig::Http(rpc);
    }
    if let Some(ws) = config.ws.clone() {
        return ProviderConfig::WebSocket(ws);
    }
    ProviderConfig::Http(config.rpc.clone().unwrap_or_else(|| DEFAULT_RPC.to_string()))
}

fn wallet<F>(config: &Config, overrides: &Overrides, lookup: F) -> Result<WalletSource, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let account = overrides
        .account
        .as_deref()
        .or(config.wallet.account.as_deref());
    if let Some(account) = account {
        return Ok(WalletSource::Unlocked(Some(parse_address("account", account)?)));
    }

    let var = config
        .wallet
        .private_key_env
        .clone()
        .unwrap_or_else(|| DEFAULT_KEY_ENV.to_string());
    match lookup(&var).filter(|key| !key.trim().is_empty()) {
        Some(key) => key
            .trim()
            .parse::<PrivateKeySigner>()
            .map(WalletSource::LocalKey)
            .map_err(|_| ConfigError::InvalidKey { var }),
        None => Ok(WalletSource::Unlocked(None)),
    }
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, ConfigError> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|_| ConfigError::InvalidAddress {
            field,
            value: value.to_string(),
        })
}
