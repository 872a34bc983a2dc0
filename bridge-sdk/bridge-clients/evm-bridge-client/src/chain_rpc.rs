use std::sync::Arc;

use async_trait::async_trait;
use ethers::providers::{JsonRpcClient, Middleware, Provider, ProviderError};
use ethers::types::{transaction::eip2718::TypedTransaction, Address, Bytes, TxHash, U256};

/// JSON-RPC calls the bridge pipeline issues against the target chain
#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn estimate_gas(&self, tx: &TypedTransaction) -> Result<U256, ProviderError>;

    async fn get_transaction_count(&self, address: Address) -> Result<U256, ProviderError>;

    async fn get_gas_price(&self) -> Result<U256, ProviderError>;

    async fn send_raw_transaction(&self, raw_tx: Bytes) -> Result<TxHash, ProviderError>;
}

#[async_trait]
impl<P: JsonRpcClient> ChainRpc for Provider<P> {
    async fn estimate_gas(&self, tx: &TypedTransaction) -> Result<U256, ProviderError> {
        Middleware::estimate_gas(self, tx, None).await
    }

    async fn get_transaction_count(&self, address: Address) -> Result<U256, ProviderError> {
        Middleware::get_transaction_count(self, address, None).await
    }

    async fn get_gas_price(&self) -> Result<U256, ProviderError> {
        Middleware::get_gas_price(self).await
    }

    async fn send_raw_transaction(&self, raw_tx: Bytes) -> Result<TxHash, ProviderError> {
        let pending = Middleware::send_raw_transaction(self, raw_tx).await?;
        Ok(pending.tx_hash())
    }
}

#[async_trait]
impl<R: ChainRpc + ?Sized> ChainRpc for Arc<R> {
    async fn estimate_gas(&self, tx: &TypedTransaction) -> Result<U256, ProviderError> {
        (**self).estimate_gas(tx).await
    }

    async fn get_transaction_count(&self, address: Address) -> Result<U256, ProviderError> {
        (**self).get_transaction_count(address).await
    }

    async fn get_gas_price(&self) -> Result<U256, ProviderError> {
        (**self).get_gas_price().await
    }

    async fn send_raw_transaction(&self, raw_tx: Bytes) -> Result<TxHash, ProviderError> {
        (**self).send_raw_transaction(raw_tx).await
    }
}
