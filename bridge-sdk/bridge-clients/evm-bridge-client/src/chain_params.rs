use std::time::Duration;

use bridge_connector_common::result::{BridgeSdkError, Result};
use ethers::types::U256;

use crate::chain_rpc::ChainRpc;
use crate::transaction::{ChainParams, UnsignedTransaction};

/// Gas limit used when `eth_estimateGas` fails
pub const FALLBACK_GAS_LIMIT: u64 = 90_000;
pub const DEFAULT_PARAM_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Estimate multiplied by 1.2, rounded half up
pub fn apply_gas_safety_margin(estimate: U256) -> Result<U256> {
    estimate
        .checked_mul(U256::from(12u64))
        .and_then(|gas| gas.checked_add(U256::from(5u64)))
        .map(|gas| gas / 10u64)
        .ok_or_else(|| {
            BridgeSdkError::ParamFetchError(format!("Gas estimate {estimate} is out of range"))
        })
}

pub fn apply_gas_price_padding(gas_price: U256, percent_padding: Option<u32>) -> Result<U256> {
    let Some(padding) = percent_padding else {
        return Ok(gas_price);
    };

    gas_price
        .checked_mul(U256::from(100 + u64::from(padding)))
        .and_then(|price| price.checked_add(U256::from(50u64)))
        .map(|price| price / 100u64)
        .ok_or_else(|| {
            BridgeSdkError::ParamFetchError(format!(
                "Gas price {gas_price} padded by {padding}% is out of range"
            ))
        })
}

/// Fetches gas, nonce and gas price concurrently.
///
/// A failed gas estimate falls back to [`FALLBACK_GAS_LIMIT`]; a failed nonce
/// or gas price lookup aborts the stage. All three calls must settle within
/// `deadline`, otherwise the pending calls are dropped and the stage fails
/// with `ParamFetchTimeout`.
#[tracing::instrument(skip_all, name = "FETCH CHAIN PARAMS")]
pub async fn fetch_chain_params<R: ChainRpc + ?Sized>(
    rpc: &R,
    tx: &UnsignedTransaction,
    gas_price_percent_padding: Option<u32>,
    deadline: Duration,
) -> Result<ChainParams> {
    let typed_tx = tx.as_typed();

    let gas = async {
        match rpc.estimate_gas(&typed_tx).await {
            Ok(estimate) => apply_gas_safety_margin(estimate),
            Err(err) => {
                tracing::warn!(
                    error = err.to_string(),
                    fallback = FALLBACK_GAS_LIMIT,
                    "Gas estimation failed, using fallback gas limit"
                );
                Ok(U256::from(FALLBACK_GAS_LIMIT))
            }
        }
    };

    let nonce = async {
        rpc.get_transaction_count(tx.from()).await.map_err(|err| {
            BridgeSdkError::ParamFetchError(format!("Failed to get transaction count: {err}"))
        })
    };

    let gas_price = async {
        rpc.get_gas_price()
            .await
            .map_err(|err| {
                BridgeSdkError::ParamFetchError(format!("Failed to get gas price: {err}"))
            })
            .and_then(|gas_price| apply_gas_price_padding(gas_price, gas_price_percent_padding))
    };

    let (gas, nonce, gas_price) =
        tokio::time::timeout(deadline, async { tokio::try_join!(gas, nonce, gas_price) })
            .await
            .map_err(|_| BridgeSdkError::ParamFetchTimeout(deadline))??;

    tracing::debug!(
        gas = gas.to_string(),
        gas_price = gas_price.to_string(),
        nonce = nonce.to_string(),
        "Fetched transaction parameters"
    );

    Ok(ChainParams {
        gas,
        gas_price,
        nonce,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safety_margin_rounds_to_nearest() {
        assert_eq!(
            apply_gas_safety_margin(U256::from(21_000u64)).unwrap(),
            U256::from(25_200u64)
        );
        // 1.2 * 52_123 = 62_547.6
        assert_eq!(
            apply_gas_safety_margin(U256::from(52_123u64)).unwrap(),
            U256::from(62_548u64)
        );
        // 1.2 * 52_121 = 62_545.2
        assert_eq!(
            apply_gas_safety_margin(U256::from(52_121u64)).unwrap(),
            U256::from(62_545u64)
        );
    }

    #[test]
    fn gas_price_padding() {
        let gwei = U256::from(1_000_000_000u64);

        assert_eq!(
            apply_gas_price_padding(gwei * 30u64, None).unwrap(),
            gwei * 30u64
        );
        assert_eq!(
            apply_gas_price_padding(gwei * 30u64, Some(0)).unwrap(),
            gwei * 30u64
        );
        assert_eq!(
            apply_gas_price_padding(gwei * 30u64, Some(15)).unwrap(),
            gwei * 345u64 / 10u64
        );
        // 333 * 1.1 = 366.3
        assert_eq!(
            apply_gas_price_padding(U256::from(333u64), Some(10)).unwrap(),
            U256::from(366u64)
        );
    }

    #[test]
    fn oversized_rpc_values_are_rejected() {
        assert!(matches!(
            apply_gas_safety_margin(U256::MAX),
            Err(BridgeSdkError::ParamFetchError(_))
        ));
        assert!(matches!(
            apply_gas_price_padding(U256::MAX / 50u64, Some(10)),
            Err(BridgeSdkError::ParamFetchError(_))
        ));
        assert_eq!(
            apply_gas_price_padding(U256::MAX, None).unwrap(),
            U256::MAX
        );
    }
}
