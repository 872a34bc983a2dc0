use std::collections::BTreeMap;

use bridge_connector_common::result::{BridgeSdkError, Result};
use derive_builder::Builder;
use ethers::types::Address;
use evm_bridge_client::{parse_amount, TokenInfo, TokenRegistry};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};

/// One side of a bridge route as reported by the router server
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteToken {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub decimals: u8,
    #[serde(default)]
    pub contract_address: String,
    #[serde(default)]
    pub deposit_address: String,
    pub minimum_swap: Option<serde_json::Number>,
    pub maximum_swap: Option<serde_json::Number>,
    pub plus_gas_price_percentage: Option<u32>,
    #[serde(default)]
    pub disable_swap: bool,
}

impl RouteToken {
    /// Token contract, `None` for native coins
    pub fn contract_address(&self) -> Result<Option<Address>> {
        parse_optional_address(&self.contract_address, "contract")
    }

    pub fn deposit_address(&self) -> Result<Address> {
        parse_optional_address(&self.deposit_address, "deposit")?.ok_or_else(|| {
            BridgeSdkError::BridgeServerError(format!(
                "Route for {} has no deposit address",
                self.symbol
            ))
        })
    }
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BridgeRoute {
    #[serde(rename = "PairID")]
    pub pair_id: String,
    #[serde(rename = "SrcChainID")]
    #[serde_as(as = "DisplayFromStr")]
    pub src_chain_id: u64,
    #[serde(rename = "DestChainID")]
    #[serde_as(as = "DisplayFromStr")]
    pub dest_chain_id: u64,
    pub src_token: RouteToken,
    pub dest_token: RouteToken,
}

impl BridgeRoute {
    /// Registry entry for depositing the source token, `None` for native coins
    pub fn token_info(&self) -> Result<Option<TokenInfo>> {
        let token = &self.src_token;
        let Some(address) = token.contract_address()? else {
            return Ok(None);
        };

        Ok(Some(TokenInfo::new(address, token.decimals).with_limits(
            swap_limit(token, token.minimum_swap.as_ref()),
            swap_limit(token, token.maximum_swap.as_ref()),
        )))
    }

    pub fn deposit_address(&self) -> Result<Address> {
        self.src_token.deposit_address()
    }

    pub fn gas_price_percent_padding(&self) -> Option<u32> {
        self.src_token.plus_gas_price_percentage
    }

    pub fn is_enabled(&self) -> bool {
        !self.src_token.disable_swap
    }
}

/// Routes served by the bridge server, keyed by pair id
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct BridgeServerInfo {
    pub routes: BTreeMap<String, BridgeRoute>,
}

impl BridgeServerInfo {
    /// Enabled routes depositing from `src_chain_id`, in pair id order
    pub fn routes_from(&self, src_chain_id: u64) -> impl Iterator<Item = &BridgeRoute> {
        self.routes
            .values()
            .filter(move |route| route.src_chain_id == src_chain_id && route.is_enabled())
    }

    /// First enabled route for `symbol` deposited on `src_chain_id`
    pub fn route_for_symbol(&self, symbol: &str, src_chain_id: u64) -> Option<&BridgeRoute> {
        self.routes_from(src_chain_id)
            .find(|route| route.src_token.symbol == symbol)
    }

    /// Extends `registry` with the ERC-20 tokens deposited on `src_chain_id`.
    /// The first route of a symbol wins, matching `route_for_symbol`.
    pub fn extend_registry(
        &self,
        registry: TokenRegistry,
        src_chain_id: u64,
    ) -> Result<TokenRegistry> {
        let mut tokens: BTreeMap<String, TokenInfo> = BTreeMap::new();
        for route in self.routes_from(src_chain_id) {
            if tokens.contains_key(&route.src_token.symbol) {
                continue;
            }
            if let Some(info) = route.token_info()? {
                tokens.insert(route.src_token.symbol.clone(), info);
            }
        }

        registry.with_tokens(tokens)
    }
}

/// Client for the bridge router's server info API
#[derive(Builder, Default, Clone)]
pub struct BridgeServerClient {
    #[doc = r"Bridge server API endpoint. Required for `get_server_info`"]
    pub endpoint: Option<String>,
}

impl BridgeServerClient {
    /// Creates an empty instance of the client. Property values can be set separately depending on the required use case.
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(skip_all, name = "GET SERVER INFO", fields(chain_id = chain_id))]
    pub async fn get_server_info(&self, chain_id: u64) -> Result<BridgeServerInfo> {
        let endpoint = self.endpoint()?;
        let sanitized_endpoint = endpoint.trim_end_matches('/');

        let url = format!("{}/v2/serverinfoFull/{}", sanitized_endpoint, chain_id);

        let response = reqwest::get(url)
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| BridgeSdkError::BridgeServerError(err.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|err| BridgeSdkError::BridgeServerError(err.to_string()))?;

        let info: BridgeServerInfo = serde_json::from_str(&body)?;
        tracing::debug!(routes = info.routes.len(), "Fetched bridge server info");

        Ok(info)
    }

    fn endpoint(&self) -> Result<&str> {
        Ok(self.endpoint.as_ref().ok_or(BridgeSdkError::ConfigError(
            "Bridge server api endpoint is not set".to_string(),
        ))?)
    }
}

/// Swap limit as a plain decimal. Limits that are not a valid amount for the
/// token are dropped so one bad route does not poison the registry.
fn swap_limit(token: &RouteToken, limit: Option<&serde_json::Number>) -> Option<String> {
    let limit = limit?;
    // f64 `Display` never uses exponent notation, unlike `Number`'s
    let amount = match (limit.as_u64(), limit.as_f64()) {
        (Some(value), _) => value.to_string(),
        (None, Some(value)) => value.to_string(),
        (None, None) => limit.to_string(),
    };

    match parse_amount(&amount, token.decimals) {
        Ok(_) => Some(amount),
        Err(err) => {
            tracing::warn!(
                symbol = %token.symbol,
                limit = limit.to_string(),
                error = err.to_string(),
                "Ignoring invalid swap limit"
            );
            None
        }
    }
}

fn parse_optional_address(address: &str, kind: &str) -> Result<Option<Address>> {
    if address.is_empty() {
        return Ok(None);
    }

    address.parse().map(Some).map_err(|_| {
        BridgeSdkError::BridgeServerError(format!("Invalid {kind} address: {address}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER_INFO: &str = r#"{
        "soyv5": {
            "PairID": "soyv5",
            "SrcChainID": "128",
            "DestChainID": "137",
            "SrcToken": {
                "Symbol": "SOY",
                "Name": "SoyFinance",
                "Decimals": 18,
                "ContractAddress": "0xfb4c85b31b888e4f84ac131667865e029d6486f7",
                "DepositAddress": "0x533e3c0e6b48010873b947bddc4721b1bdff9648",
                "MinimumSwap": 50,
                "MaximumSwap": 1000000,
                "PlusGasPricePercentage": 15,
                "DisableSwap": false
            },
            "DestToken": {
                "Symbol": "SOY",
                "Name": "SoyFinance",
                "Decimals": 18,
                "ContractAddress": "0x9a2d50ed0c2b1ab5e4bbcd1a9dbe5a3c6c9fbe01",
                "DepositAddress": "",
                "MinimumSwap": 500,
                "MaximumSwap": 1000000
            }
        },
        "ht": {
            "PairID": "ht",
            "SrcChainID": "128",
            "DestChainID": "137",
            "SrcToken": {
                "Symbol": "HT",
                "Decimals": 18,
                "ContractAddress": "",
                "DepositAddress": "0x533e3c0e6b48010873b947bddc4721b1bdff9648"
            },
            "DestToken": {
                "Symbol": "HT",
                "Decimals": 18,
                "ContractAddress": "0x8af8c5fd9b4c0f6f4ef6a56b0b01e1b31b6d12c0"
            }
        }
    }"#;

    fn server_info() -> BridgeServerInfo {
        serde_json::from_str(SERVER_INFO).unwrap()
    }

    #[test]
    fn parses_routes() {
        let info = server_info();

        assert_eq!(info.routes.len(), 2);
        let soy = &info.routes["soyv5"];
        assert_eq!(soy.src_chain_id, 128);
        assert_eq!(soy.dest_chain_id, 137);
        assert_eq!(soy.gas_price_percent_padding(), Some(15));
        assert!(soy.is_enabled());
    }

    #[test]
    fn token_route_becomes_registry_entry() {
        let info = server_info();
        let route = info.route_for_symbol("SOY", 128).unwrap();

        let token = route.token_info().unwrap().unwrap();
        assert_eq!(token.decimals, 18);
        assert_eq!(token.min_amount.as_deref(), Some("50"));
        assert_eq!(token.max_amount.as_deref(), Some("1000000"));
        assert_eq!(
            route.deposit_address().unwrap(),
            "0x533e3c0e6b48010873b947bddc4721b1bdff9648"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn native_route_has_no_registry_entry() {
        let info = server_info();
        let route = info.route_for_symbol("HT", 128).unwrap();

        assert!(route.token_info().unwrap().is_none());
        assert!(route.deposit_address().is_ok());
    }

    #[test]
    fn extends_registry_with_token_routes() {
        let registry = server_info()
            .extend_registry(TokenRegistry::empty(), 128)
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.resolve("SOY").unwrap().min_amount.as_deref(),
            Some("50")
        );
    }

    fn route(pair_id: &str, src_chain_id: u64, deposit: &str, disabled: bool) -> String {
        format!(
            r#""{pair_id}": {{
                "PairID": "{pair_id}",
                "SrcChainID": "{src_chain_id}",
                "DestChainID": "137",
                "SrcToken": {{
                    "Symbol": "SOY",
                    "Decimals": 18,
                    "ContractAddress": "0x{deposit}{deposit}{deposit}{deposit}{deposit}{deposit}{deposit}{deposit}{deposit}{deposit}",
                    "DepositAddress": "0x{deposit}{deposit}{deposit}{deposit}{deposit}{deposit}{deposit}{deposit}{deposit}{deposit}",
                    "DisableSwap": {disabled}
                }},
                "DestToken": {{ "Symbol": "SOY", "Decimals": 18 }}
            }}"#
        )
    }

    #[test]
    fn routes_are_matched_on_source_chain_and_status() {
        let info: BridgeServerInfo = serde_json::from_str(&format!(
            "{{ {}, {}, {} }}",
            route("a-soy-bsc-disabled", 56, "2222", true),
            route("b-soy-heco", 128, "3333", false),
            route("c-soy-heco", 128, "4444", false),
        ))
        .unwrap();

        assert!(info.route_for_symbol("SOY", 56).is_none());
        assert!(info.route_for_symbol("SOY", 1).is_none());

        let heco = info.route_for_symbol("SOY", 128).unwrap();
        assert_eq!(heco.pair_id, "b-soy-heco");
        assert_eq!(
            heco.deposit_address().unwrap(),
            Address::repeat_byte(0x33)
        );

        let registry = info
            .extend_registry(TokenRegistry::empty(), 128)
            .unwrap();
        assert_eq!(
            registry.resolve("SOY").unwrap().address,
            Address::repeat_byte(0x33)
        );
        assert!(info
            .extend_registry(TokenRegistry::empty(), 56)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn limits_are_written_as_plain_decimals() {
        let info: BridgeServerInfo = serde_json::from_str(
            r#"{
                "usdc": {
                    "PairID": "usdc",
                    "SrcChainID": "128",
                    "DestChainID": "137",
                    "SrcToken": {
                        "Symbol": "USDC",
                        "Decimals": 6,
                        "ContractAddress": "0x5555555555555555555555555555555555555555",
                        "DepositAddress": "0x6666666666666666666666666666666666666666",
                        "MinimumSwap": 1e-5,
                        "MaximumSwap": 1e21
                    },
                    "DestToken": { "Symbol": "USDC", "Decimals": 6 }
                },
                "dai": {
                    "PairID": "dai",
                    "SrcChainID": "128",
                    "DestChainID": "137",
                    "SrcToken": {
                        "Symbol": "DAI",
                        "Decimals": 2,
                        "ContractAddress": "0x7777777777777777777777777777777777777777",
                        "DepositAddress": "0x6666666666666666666666666666666666666666",
                        "MinimumSwap": 0.001,
                        "MaximumSwap": -5
                    },
                    "DestToken": { "Symbol": "DAI", "Decimals": 2 }
                }
            }"#,
        )
        .unwrap();

        let registry = info
            .extend_registry(TokenRegistry::empty(), 128)
            .unwrap();

        let usdc = registry.resolve("USDC").unwrap();
        assert_eq!(usdc.min_amount.as_deref(), Some("0.00001"));
        assert_eq!(
            usdc.max_amount.as_deref(),
            Some("1000000000000000000000")
        );

        // 0.001 has more decimals than the token, -5 is not an amount
        let dai = registry.resolve("DAI").unwrap();
        assert_eq!(dai.min_amount, None);
        assert_eq!(dai.max_amount, None);
    }

    #[test]
    fn missing_deposit_address_is_reported() {
        let info = server_info();

        assert!(matches!(
            info.routes["soyv5"].dest_token.deposit_address(),
            Err(BridgeSdkError::BridgeServerError(_))
        ));
    }

    #[tokio::test]
    async fn requires_endpoint() {
        let result = BridgeServerClient::new().get_server_info(137).await;

        assert!(matches!(result, Err(BridgeSdkError::ConfigError(_))));
    }
}
