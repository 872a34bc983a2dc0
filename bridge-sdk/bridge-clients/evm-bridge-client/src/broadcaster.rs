use bridge_connector_common::result::{BridgeSdkError, Result};
use ethers::types::TxHash;

use crate::chain_rpc::ChainRpc;
use crate::transaction::SignedTransaction;

/// Submits the signed transaction once. RPC rejections are passed through
/// as `BroadcastError` without interpretation.
#[tracing::instrument(skip_all, name = "BROADCAST")]
pub async fn broadcast_transaction<R: ChainRpc + ?Sized>(
    rpc: &R,
    tx: &SignedTransaction,
) -> Result<TxHash> {
    let raw_tx = tx.raw();
    tracing::debug!(raw_tx = raw_tx.to_string(), "Sending raw transaction");

    rpc.send_raw_transaction(raw_tx)
        .await
        .map_err(|err| BridgeSdkError::BroadcastError(err.to_string()))
}
