use bridge_connector_common::result::{BridgeSdkError, Result};
use ethers::types::{Signature, U256};

const SIGNATURE_LENGTH: usize = 65;

/// EIP-155 replay-protected `v` for a raw recovery id
pub fn eip155_v(chain_id: u64, recovery_id: u8) -> Result<u64> {
    chain_id
        .checked_mul(2)
        .and_then(|v| v.checked_add(35 + u64::from(recovery_id)))
        .ok_or_else(|| {
            BridgeSdkError::InvalidArgument(format!("Chain id {chain_id} is too large for EIP-155"))
        })
}

/// Splits a raw `r || s || v` signature returned by the wallet and rebinds
/// its recovery id to `chain_id`
pub fn assemble_signature(raw_signature: &str, chain_id: u64) -> Result<Signature> {
    let body = raw_signature.strip_prefix("0x").unwrap_or(raw_signature);
    let bytes = hex::decode(body).map_err(|_| {
        BridgeSdkError::SignerError("Signature is not a valid hex string".to_string())
    })?;

    if bytes.len() != SIGNATURE_LENGTH {
        return Err(BridgeSdkError::SignerError(format!(
            "Expected a {SIGNATURE_LENGTH}-byte signature, got {} bytes",
            bytes.len()
        )));
    }

    // Wallets return 27/28; some hardware wallets return the bare id
    let recovery_id = match bytes[64] {
        byte @ (27 | 28) => byte - 27,
        byte @ (0 | 1) => byte,
        byte => {
            return Err(BridgeSdkError::SignerError(format!(
                "Unexpected signature recovery byte {byte}"
            )))
        }
    };

    Ok(Signature {
        r: U256::from_big_endian(&bytes[0..32]),
        s: U256::from_big_endian(&bytes[32..64]),
        v: eip155_v(chain_id, recovery_id)?,
    })
}
