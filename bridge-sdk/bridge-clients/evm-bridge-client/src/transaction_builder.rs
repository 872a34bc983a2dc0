use bridge_connector_common::result::{BridgeSdkError, Result};
use ethers::abi::AbiEncode;
use ethers::prelude::abigen;
use ethers::types::{Bytes, U256};

use crate::signature::eip155_v;
use crate::token_registry::{is_native_coin, parse_amount, TokenRegistry, NATIVE_COIN_DECIMALS};
use crate::transaction::{TransferRequest, UnsignedTransaction};

abigen!(
    ERC20,
    r#"[
      function transfer(address to, uint256 amount) external returns (bool)
    ]"#
);

/// Builds the unsigned transaction for a bridge transfer.
///
/// Native coins are sent through `value` with an empty payload; everything
/// else must be a registered token and is sent as an ERC-20 `transfer` call to
/// the token contract. No RPC call is made here.
pub fn build_unsigned_transaction(
    request: &TransferRequest,
    registry: &TokenRegistry,
) -> Result<UnsignedTransaction> {
    // Fails before the wallet is asked to sign for a chain that cannot be encoded
    eip155_v(request.chain_id, 1)?;

    if is_native_coin(&request.coin, request.chain_id) {
        let value = parse_transfer_amount(&request.amount, NATIVE_COIN_DECIMALS)?;

        return Ok(UnsignedTransaction::new(
            request.from,
            request.to,
            value,
            Bytes::new(),
            request.chain_id,
        ));
    }

    let token = registry.resolve(&request.coin)?;
    let amount = parse_transfer_amount(&request.amount, token.decimals)?;
    token.check_limits(&request.amount, amount)?;

    let data = TransferCall {
        to: request.to,
        amount,
    }
    .encode();

    Ok(UnsignedTransaction::new(
        request.from,
        token.address,
        U256::zero(),
        data.into(),
        request.chain_id,
    ))
}

fn parse_transfer_amount(amount: &str, decimals: u8) -> Result<U256> {
    let value = parse_amount(amount, decimals)?;
    if value.is_zero() {
        return Err(BridgeSdkError::InvalidArgument(
            "Transfer amount must be greater than zero".to_string(),
        ));
    }

    Ok(value)
}
