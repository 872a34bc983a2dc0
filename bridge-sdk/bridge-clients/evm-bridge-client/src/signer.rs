use std::sync::Arc;

use async_trait::async_trait;
use bridge_connector_common::result::{BridgeSdkError, Result};
use ethers::providers::{JsonRpcClient, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, H256};

/// Wallet capability producing a raw 65-byte `r || s || v` signature over a
/// 32-byte hash, hex encoded. Implementations report refusals and transport
/// failures as `SignerError` with a human-readable message.
#[async_trait]
pub trait ExternalSigner: Send + Sync {
    async fn sign(&self, address: Address, message_hash: H256) -> Result<String>;
}

#[async_trait]
impl<S: ExternalSigner + ?Sized> ExternalSigner for Arc<S> {
    async fn sign(&self, address: Address, message_hash: H256) -> Result<String> {
        (**self).sign(address, message_hash).await
    }
}

/// Signs through a wallet reachable over JSON-RPC using `eth_sign`.
///
/// The wallet must sign the 32-byte hash as is. Wallets that apply the
/// EIP-191 personal message prefix produce signatures that do not recover to
/// the sender, and the node rejects the resulting transaction.
#[derive(Debug, Clone)]
pub struct JsonRpcSigner<P> {
    provider: Provider<P>,
}

impl<P: JsonRpcClient> JsonRpcSigner<P> {
    pub fn new(provider: Provider<P>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: JsonRpcClient> ExternalSigner for JsonRpcSigner<P> {
    #[tracing::instrument(skip_all, name = "ETH SIGN")]
    async fn sign(&self, address: Address, message_hash: H256) -> Result<String> {
        self.provider
            .request::<_, String>("eth_sign", (address, message_hash))
            .await
            .map_err(|err| BridgeSdkError::SignerError(err.to_string()))
    }
}

/// Signs with a locally held private key
#[derive(Debug, Clone)]
pub struct LocalWalletSigner {
    wallet: LocalWallet,
}

impl LocalWalletSigner {
    pub fn new(wallet: LocalWallet) -> Self {
        Self { wallet }
    }

    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let private_key = private_key.strip_prefix("0x").unwrap_or(private_key);
        let private_key_bytes = hex::decode(private_key).map_err(|_| {
            BridgeSdkError::ConfigError("EVM private key is not a valid hex string".to_string())
        })?;

        if private_key_bytes.len() != 32 {
            return Err(BridgeSdkError::ConfigError(
                "EVM private key is of invalid length".to_string(),
            ));
        }

        let wallet = LocalWallet::from_bytes(&private_key_bytes)
            .map_err(|_| BridgeSdkError::ConfigError("Invalid EVM private key".to_string()))?;

        Ok(Self::new(wallet))
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }
}

#[async_trait]
impl ExternalSigner for LocalWalletSigner {
    async fn sign(&self, address: Address, message_hash: H256) -> Result<String> {
        if address != self.wallet.address() {
            return Err(BridgeSdkError::SignerError(format!(
                "Wallet {:?} cannot sign for {:?}",
                self.wallet.address(),
                address
            )));
        }

        let signature = self
            .wallet
            .sign_hash(message_hash)
            .map_err(|err| BridgeSdkError::SignerError(err.to_string()))?;

        Ok(format!("0x{}", hex::encode(signature.to_vec())))
    }
}
