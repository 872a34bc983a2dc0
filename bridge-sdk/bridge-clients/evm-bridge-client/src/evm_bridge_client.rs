use std::{fmt, time::Duration};

use bridge_connector_common::result::{BridgeSdkError, PipelineResult, Result};
use derive_builder::Builder;
use ethers::types::TxHash;

mod broadcaster;
mod chain_params;
mod chain_rpc;
mod signature;
mod signer;
mod token_registry;
mod transaction;
mod transaction_builder;

pub use broadcaster::broadcast_transaction;
pub use chain_params::{
    apply_gas_price_padding, apply_gas_safety_margin, fetch_chain_params,
    DEFAULT_PARAM_FETCH_TIMEOUT, FALLBACK_GAS_LIMIT,
};
pub use chain_rpc::ChainRpc;
pub use signature::{assemble_signature, eip155_v};
pub use signer::{ExternalSigner, JsonRpcSigner, LocalWalletSigner};
pub use token_registry::{
    is_native_coin, parse_amount, TokenInfo, TokenRegistry, NATIVE_COIN_DECIMALS,
};
pub use transaction::{
    ChainParams, ReadyTransaction, SignedTransaction, TransferRequest, UnsignedTransaction,
};
pub use transaction_builder::build_unsigned_transaction;

/// Stages of a bridge transfer, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Building,
    FetchingParams,
    AwaitingSignature,
    Assembling,
    Broadcasting,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Self::Building => "building",
            Self::FetchingParams => "fetching_params",
            Self::AwaitingSignature => "awaiting_signature",
            Self::Assembling => "assembling",
            Self::Broadcasting => "broadcasting",
        };
        f.write_str(stage)
    }
}

/// Sends bridge deposits on an EVM chain by building a legacy transaction,
/// having an external wallet sign its hash and broadcasting the result.
///
/// The client holds no mutable state, so concurrent transfers never share
/// transaction records. Transfers are not idempotent: calling
/// [`EvmBridgeClient::send_bridge_transfer`] twice signs and broadcasts two
/// transactions.
#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct EvmBridgeClient<R, S> {
    #[doc = r"Chain RPC used to fetch gas, nonce and gas price and to broadcast"]
    rpc: R,
    #[doc = r"Wallet producing raw signatures over the transaction hash"]
    signer: S,
    #[doc = r"ERC-20 tokens that can be bridged. Defaults to the built-in bridge tokens"]
    #[builder(default)]
    token_registry: TokenRegistry,
    #[doc = r"Deadline for fetching gas, nonce and gas price"]
    #[builder(default = "DEFAULT_PARAM_FETCH_TIMEOUT")]
    param_fetch_timeout: Duration,
}

impl<R: ChainRpc, S: ExternalSigner> EvmBridgeClient<R, S> {
    /// Runs a bridge transfer end to end. Never fails across this boundary:
    /// any stage error is reported as [`PipelineResult::Failure`].
    #[tracing::instrument(
        skip_all,
        name = "EVM BRIDGE TRANSFER",
        fields(coin = %request.coin, chain_id = request.chain_id)
    )]
    pub async fn send_bridge_transfer(&self, request: &TransferRequest) -> PipelineResult {
        let result = self.transfer(request).await;

        match &result {
            Ok(tx_hash) => tracing::info!(
                tx_hash = format!("{:?}", tx_hash),
                "Sent bridge transfer transaction"
            ),
            Err(err) => tracing::error!(error = err.to_string(), "Bridge transfer failed"),
        }

        result.into()
    }

    pub fn token_registry(&self) -> &TokenRegistry {
        &self.token_registry
    }

    pub fn param_fetch_timeout(&self) -> Duration {
        self.param_fetch_timeout
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<TxHash> {
        enter(PipelineStage::Building);
        let unsigned = build_unsigned_transaction(request, &self.token_registry)?;

        enter(PipelineStage::FetchingParams);
        let params = fetch_chain_params(
            &self.rpc,
            &unsigned,
            request.gas_price_percent_padding,
            self.param_fetch_timeout,
        )
        .await?;
        let ready = unsigned.with_params(params);

        let signed = self.sign(ready).await?;

        enter(PipelineStage::Broadcasting);
        broadcast_transaction(&self.rpc, &signed).await
    }

    async fn sign(&self, ready: ReadyTransaction) -> Result<SignedTransaction> {
        enter(PipelineStage::AwaitingSignature);
        let raw_signature = self
            .signer
            .sign(ready.from(), ready.sighash())
            .await
            .map_err(|err| match err {
                BridgeSdkError::SignerError(_) => err,
                other => BridgeSdkError::SignerError(other.to_string()),
            })?;

        enter(PipelineStage::Assembling);
        let signature = assemble_signature(&raw_signature, ready.chain_id())?;

        Ok(ready.with_signature(signature))
    }
}

fn enter(stage: PipelineStage) {
    tracing::debug!(stage = %stage, "Entering stage");
}
