use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

use bridge_connector_common::result::{BridgeSdkError, Result};
use ethers::types::{Address, U256};
use ethers::utils::parse_units;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Decimals used for every native coin
pub const NATIVE_COIN_DECIMALS: u8 = 18;

/// Largest decimal count `parse_units` accepts
const MAX_TOKEN_DECIMALS: u8 = 77;

/// Coins moved through the transaction `value` field, keyed by the chains on
/// which they are native. Any other `(coin, chain)` pair is an ERC-20 transfer.
const NATIVE_COINS: &[(&str, &[u64])] = &[
    ("ETH", &[1, 4]),
    ("FSN", &[32_659, 46_688]),
    ("BNB", &[97, 56]),
    ("HT", &[128, 256]),
    ("FTM", &[250]),
    ("ONE", &[1_666_600_000]),
    ("MOVR", &[1_285]),
];

const BRIDGE_TOKENS: &[(&str, &str, u8)] = &[
    ("XNFT", "0xE5944B50DF84001a36c7DE0d5Cb4da7ab21407D2", 18),
    ("PLF", "0x601464Aa0Df93e1FcB4afc96C0a615d546BAdC9f", 18),
    ("PTT", "0x7eed8a3ccfe3d507ec4df443773eae792b9ef2d7", 18),
    ("MAKI", "0x5fad6fbba4bba686ba9b8052cf0bd51699f38b93", 18),
    ("SOY", "0xfb4c85b31b888e4f84ac131667865e029d6486f7", 18),
    ("HYN", "0x3ac19481face71565155f370b3e34a1178745382", 18),
    ("PIPI", "0xaaae746b5e55d14398879312660e9fde07fbc1dc", 18),
];

lazy_static! {
    static ref DEFAULT_TOKENS: HashMap<String, TokenInfo> = BRIDGE_TOKENS
        .iter()
        .map(|(symbol, address, decimals)| {
            (
                symbol.to_string(),
                TokenInfo::new(
                    address.parse().expect("Invalid built-in token address"),
                    *decimals,
                ),
            )
        })
        .collect();
}

pub fn is_native_coin(coin: &str, chain_id: u64) -> bool {
    NATIVE_COINS
        .iter()
        .any(|(symbol, chains)| *symbol == coin && chains.contains(&chain_id))
}

/// Parses a human-readable amount into the smallest unit
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256> {
    let amount = amount.trim();
    if amount.is_empty() || amount.starts_with('-') || amount.starts_with('+') {
        return Err(BridgeSdkError::InvalidArgument(format!(
            "Invalid transfer amount: {amount:?}"
        )));
    }

    if let Some((_, fraction)) = amount.split_once('.') {
        if fraction.trim_end_matches('0').len() > usize::from(decimals) {
            return Err(BridgeSdkError::InvalidArgument(format!(
                "Transfer amount {amount:?} has more than {decimals} decimals"
            )));
        }
    }

    let value: U256 = parse_units(amount, u32::from(decimals))
        .map_err(|err| {
            BridgeSdkError::InvalidArgument(format!("Invalid transfer amount {amount:?}: {err}"))
        })?
        .into();

    Ok(value)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: Address,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<String>,
}

impl TokenInfo {
    pub fn new(address: Address, decimals: u8) -> Self {
        Self {
            address,
            decimals,
            min_amount: None,
            max_amount: None,
        }
    }

    pub fn with_limits(mut self, min_amount: Option<String>, max_amount: Option<String>) -> Self {
        self.min_amount = min_amount;
        self.max_amount = max_amount;
        self
    }

    /// Rejects `value` (already in the smallest unit) when it falls outside
    /// the configured bridge limits
    pub fn check_limits(&self, amount: &str, value: U256) -> Result<()> {
        let min = self.limit(self.min_amount.as_deref())?;
        let max = self.limit(self.max_amount.as_deref())?;

        let below = min.is_some_and(|min| value < min);
        let above = max.is_some_and(|max| value > max);
        if below || above {
            return Err(BridgeSdkError::AmountOutOfRange {
                amount: amount.to_string(),
                min: self.min_amount.clone().unwrap_or_else(|| "0".to_string()),
                max: self.max_amount.clone().unwrap_or_else(|| "unbounded".to_string()),
            });
        }

        Ok(())
    }

    fn limit(&self, limit: Option<&str>) -> Result<Option<U256>> {
        limit
            .map(|limit| parse_amount(limit, self.decimals))
            .transpose()
    }

    fn validate(&self, symbol: &str) -> Result<()> {
        if self.decimals > MAX_TOKEN_DECIMALS {
            return Err(BridgeSdkError::ConfigError(format!(
                "Token {symbol} has {} decimals, at most {MAX_TOKEN_DECIMALS} are supported",
                self.decimals
            )));
        }

        let (min, max) = self.limits().map_err(|err| {
            BridgeSdkError::ConfigError(format!("Token {symbol} has invalid limits: {err}"))
        })?;

        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(BridgeSdkError::ConfigError(format!(
                    "Token {symbol} minimum amount exceeds its maximum amount"
                )));
            }
        }

        Ok(())
    }

    fn limits(&self) -> Result<(Option<U256>, Option<U256>)> {
        Ok((
            self.limit(self.min_amount.as_deref())?,
            self.limit(self.max_amount.as_deref())?,
        ))
    }
}

/// Static symbol to ERC-20 token mapping used to resolve non-native transfers.
///
/// Entries are validated once when the registry is built; lookups never fail
/// silently and return `UnknownToken` for symbols that are not registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRegistry {
    tokens: HashMap<String, TokenInfo>,
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self {
            tokens: DEFAULT_TOKENS.clone(),
        }
    }
}

impl TokenRegistry {
    pub fn new<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, TokenInfo)>,
        S: Into<String>,
    {
        Self::empty().with_tokens(tokens)
    }

    pub fn empty() -> Self {
        Self {
            tokens: HashMap::new(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let tokens: HashMap<String, TokenInfo> = serde_json::from_str(json)?;
        Self::new(tokens)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            BridgeSdkError::ConfigError(format!(
                "Unable to open token registry {}: {err}",
                path.display()
            ))
        })?;

        let tokens: HashMap<String, TokenInfo> = serde_json::from_reader(BufReader::new(file))?;
        Self::new(tokens)
    }

    /// Adds or replaces entries, validating each of them
    pub fn with_tokens<I, S>(mut self, tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, TokenInfo)>,
        S: Into<String>,
    {
        for (symbol, info) in tokens {
            let symbol = symbol.into();
            if symbol.trim().is_empty() {
                return Err(BridgeSdkError::ConfigError(
                    "Token symbol must not be empty".to_string(),
                ));
            }

            info.validate(&symbol)?;
            self.tokens.insert(symbol, info);
        }

        Ok(self)
    }

    pub fn get(&self, symbol: &str) -> Option<&TokenInfo> {
        self.tokens.get(symbol)
    }

    pub fn resolve(&self, symbol: &str) -> Result<&TokenInfo> {
        self.get(symbol)
            .ok_or_else(|| BridgeSdkError::UnknownToken(symbol.to_string()))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TokenInfo)> {
        self.tokens
            .iter()
            .map(|(symbol, info)| (symbol.as_str(), info))
    }
}
