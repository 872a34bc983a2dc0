use std::{sync::Arc, time::Duration};

use clap::Subcommand;

use bridge_connector_common::result::PipelineResult;
use bridge_server_client::{BridgeRoute, BridgeServerClientBuilder, BridgeServerInfo};
use ethers::providers::{Http, Provider};
use ethers_core::types::Address;
use evm_bridge_client::{
    EvmBridgeClient, EvmBridgeClientBuilder, ExternalSigner, JsonRpcSigner, LocalWalletSigner,
    TokenRegistry, TransferRequest, DEFAULT_PARAM_FETCH_TIMEOUT,
};

use crate::{combined_config, CliConfig, Network};

#[derive(Subcommand, Debug)]
pub enum EvmBridgeSubCommand {
    #[clap(about = "Send a bridge deposit signed through the configured wallet")]
    Transfer {
        #[clap(short, long, help = "Native coin or registered token symbol")]
        coin: String,
        #[clap(short, long, help = "Amount in human units, e.g. 1.5")]
        amount: String,
        #[clap(
            short,
            long,
            help = "Recipient or deposit address. Resolved from the bridge server when omitted"
        )]
        to: Option<Address>,
        #[clap(
            long,
            help = "Sender address. Defaults to the address of the configured private key"
        )]
        from: Option<Address>,
        #[clap(long, help = "Percent added on top of the fetched gas price")]
        gas_price_padding: Option<u32>,
        #[clap(long, help = "Chain the bridge route delivers to")]
        dest_chain_id: Option<u64>,
        #[command(flatten)]
        config_cli: CliConfig,
    },
    #[clap(about = "Print the bridge routes served for a destination chain")]
    ServerInfo {
        #[clap(short, long, help = "Destination chain id")]
        dest_chain_id: u64,
        #[command(flatten)]
        config_cli: CliConfig,
    },
    #[clap(about = "Print the tokens that can be bridged as ERC-20 transfers")]
    Tokens {
        #[clap(long, help = "Include tokens routed to this chain by the bridge server")]
        dest_chain_id: Option<u64>,
        #[command(flatten)]
        config_cli: CliConfig,
    },
}

pub async fn match_subcommand(cmd: EvmBridgeSubCommand, network: Network) {
    match cmd {
        EvmBridgeSubCommand::Transfer {
            coin,
            amount,
            to,
            from,
            gas_price_padding,
            dest_chain_id,
            config_cli,
        } => {
            let config = combined_config(config_cli, network);
            let chain_id = config.evm_chain_id.expect("EVM chain id is not set");
            let mut registry = token_registry(&config);

            let route = match dest_chain_id {
                Some(dest_chain_id) => {
                    let info = server_info(&config, dest_chain_id).await;
                    registry = info
                        .extend_registry(registry, chain_id)
                        .expect("Invalid token in bridge server info");
                    info.route_for_symbol(&coin, chain_id).cloned()
                }
                None => None,
            };

            let to = to
                .or_else(|| route.as_ref().map(deposit_address))
                .expect("Recipient is not set and no bridge route was found for the coin");
            let gas_price_padding =
                gas_price_padding.or_else(|| route.as_ref().and_then(|r| r.gas_price_percent_padding()));

            let (signer, signer_address) = signer(&config);
            let from = from
                .or(signer_address)
                .expect("Sender address is required when signing through a remote wallet");

            let request = TransferRequest {
                coin,
                from,
                to,
                amount,
                gas_price_percent_padding: gas_price_padding,
                chain_id,
            };

            match evm_bridge_client(&config, signer, registry)
                .send_bridge_transfer(&request)
                .await
            {
                PipelineResult::Success { transaction_hash } => {
                    tracing::info!(
                        tx_hash = format!("{:?}", transaction_hash),
                        "Bridge transfer submitted"
                    );
                }
                PipelineResult::Failure { reason } => {
                    tracing::error!(reason = reason.to_string(), "Bridge transfer failed");
                    std::process::exit(1);
                }
            }
        }
        EvmBridgeSubCommand::ServerInfo {
            dest_chain_id,
            config_cli,
        } => {
            let config = combined_config(config_cli, network);
            let info = server_info(&config, dest_chain_id).await;

            for (pair_id, route) in &info.routes {
                tracing::info!(
                    pair_id = pair_id,
                    symbol = route.src_token.symbol,
                    src_chain_id = route.src_chain_id,
                    deposit_address = route.src_token.deposit_address,
                    contract_address = route.src_token.contract_address,
                    enabled = route.is_enabled(),
                    "Bridge route"
                );
            }
        }
        EvmBridgeSubCommand::Tokens {
            dest_chain_id,
            config_cli,
        } => {
            let config = combined_config(config_cli, network);
            let mut registry = token_registry(&config);
            if let Some(dest_chain_id) = dest_chain_id {
                let chain_id = config.evm_chain_id.expect("EVM chain id is not set");
                registry = server_info(&config, dest_chain_id)
                    .await
                    .extend_registry(registry, chain_id)
                    .expect("Invalid token in bridge server info");
            }

            let mut tokens: Vec<_> = registry.iter().collect();
            tokens.sort_by_key(|(symbol, _)| *symbol);
            for (symbol, info) in tokens {
                tracing::info!(
                    symbol = symbol,
                    address = format!("{:?}", info.address),
                    decimals = info.decimals,
                    min_amount = info.min_amount,
                    max_amount = info.max_amount,
                    "Token"
                );
            }
        }
    }
}

fn evm_bridge_client(
    config: &CliConfig,
    signer: Arc<dyn ExternalSigner>,
    registry: TokenRegistry,
) -> EvmBridgeClient<Provider<Http>, Arc<dyn ExternalSigner>> {
    let endpoint = config.evm_rpc.as_deref().expect("EVM rpc endpoint is not set");
    let provider = Provider::<Http>::try_from(endpoint).expect("Invalid EVM rpc endpoint url");

    EvmBridgeClientBuilder::default()
        .rpc(provider)
        .signer(signer)
        .token_registry(registry)
        .param_fetch_timeout(
            config
                .param_fetch_timeout_secs
                .map_or(DEFAULT_PARAM_FETCH_TIMEOUT, Duration::from_secs),
        )
        .build()
        .unwrap()
}

fn signer(config: &CliConfig) -> (Arc<dyn ExternalSigner>, Option<Address>) {
    if let Some(private_key) = &config.evm_private_key {
        let signer = LocalWalletSigner::from_private_key(private_key).unwrap();
        let address = signer.address();
        return (Arc::new(signer), Some(address));
    }

    let endpoint = config
        .evm_signer_rpc
        .as_deref()
        .expect("Either an EVM private key or a signer rpc must be set");
    let provider =
        Provider::<Http>::try_from(endpoint).expect("Invalid EVM signer rpc endpoint url");

    (Arc::new(JsonRpcSigner::new(provider)), None)
}

fn token_registry(config: &CliConfig) -> TokenRegistry {
    match &config.token_registry_file {
        Some(path) => TokenRegistry::default()
            .with_tokens(
                TokenRegistry::from_json_file(path)
                    .unwrap()
                    .iter()
                    .map(|(symbol, info)| (symbol.to_string(), info.clone())),
            )
            .unwrap(),
        None => TokenRegistry::default(),
    }
}

async fn server_info(config: &CliConfig, dest_chain_id: u64) -> BridgeServerInfo {
    BridgeServerClientBuilder::default()
        .endpoint(config.bridge_server_api.clone())
        .build()
        .unwrap()
        .get_server_info(dest_chain_id)
        .await
        .unwrap()
}

fn deposit_address(route: &BridgeRoute) -> Address {
    route
        .deposit_address()
        .expect("Bridge route has no valid deposit address")
}
