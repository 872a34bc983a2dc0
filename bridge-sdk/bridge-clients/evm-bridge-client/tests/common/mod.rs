#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use async_trait::async_trait;
use bridge_connector_common::result::{BridgeSdkError, Result};
use ethers::providers::ProviderError;
use ethers::types::{transaction::eip2718::TypedTransaction, Address, Bytes, TxHash, H256, U256};
use evm_bridge_client::{ChainRpc, ExternalSigner};

pub const GWEI: u64 = 1_000_000_000;

/// How a fake RPC call resolves
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Value(T),
    Fail(String),
    After(Duration, T),
    Hang,
}

impl<T: Clone> Reply<T> {
    async fn resolve(&self) -> std::result::Result<T, ProviderError> {
        match self {
            Self::Value(value) => Ok(value.clone()),
            Self::Fail(message) => Err(ProviderError::CustomError(message.clone())),
            Self::After(delay, value) => {
                tokio::time::sleep(*delay).await;
                Ok(value.clone())
            }
            Self::Hang => std::future::pending().await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeRpc {
    pub gas_estimate: Reply<U256>,
    pub nonce: Reply<U256>,
    pub gas_price: Reply<U256>,
    pub send: Reply<TxHash>,
    pub calls: Arc<AtomicUsize>,
    pub estimated: Arc<Mutex<Vec<TypedTransaction>>>,
    pub sent: Arc<Mutex<Vec<Bytes>>>,
}

impl FakeRpc {
    pub fn healthy() -> Self {
        Self {
            gas_estimate: Reply::Value(U256::from(21_000u64)),
            nonce: Reply::Value(U256::from(7u64)),
            gas_price: Reply::Value(U256::from(30 * GWEI)),
            send: Reply::Value(TxHash::repeat_byte(0xee)),
            calls: Arc::new(AtomicUsize::new(0)),
            estimated: Arc::new(Mutex::new(Vec::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Bytes> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainRpc for FakeRpc {
    async fn estimate_gas(&self, tx: &TypedTransaction) -> std::result::Result<U256, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.estimated.lock().unwrap().push(tx.clone());
        self.gas_estimate.resolve().await
    }

    async fn get_transaction_count(
        &self,
        _address: Address,
    ) -> std::result::Result<U256, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.nonce.resolve().await
    }

    async fn get_gas_price(&self) -> std::result::Result<U256, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gas_price.resolve().await
    }

    async fn send_raw_transaction(
        &self,
        raw_tx: Bytes,
    ) -> std::result::Result<TxHash, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(raw_tx);
        self.send.resolve().await
    }
}

/// Returns the same raw signature for every hash
#[derive(Debug, Clone)]
pub struct FixedSigner {
    pub raw_signature: String,
    pub requests: Arc<Mutex<Vec<(Address, H256)>>>,
}

impl FixedSigner {
    pub fn new(recovery_byte: u8) -> Self {
        Self {
            raw_signature: format!(
                "0x{}{}{:02x}",
                "1a".repeat(32),
                "2b".repeat(32),
                recovery_byte
            ),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl ExternalSigner for FixedSigner {
    async fn sign(&self, address: Address, message_hash: H256) -> Result<String> {
        self.requests.lock().unwrap().push((address, message_hash));
        Ok(self.raw_signature.clone())
    }
}

/// Simulates the user declining the signature prompt
#[derive(Debug, Clone)]
pub struct RejectingSigner;

#[async_trait]
impl ExternalSigner for RejectingSigner {
    async fn sign(&self, _address: Address, _message_hash: H256) -> Result<String> {
        Err(BridgeSdkError::SignerError(
            "MetaMask Message Signature: User denied message signature.".to_string(),
        ))
    }
}
