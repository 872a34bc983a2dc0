use ethers::types::{
    transaction::eip2718::TypedTransaction, Address, Bytes, NameOrAddress, Signature,
    TransactionRequest, H256, U256,
};

/// A bridge transfer as requested by the UI layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Native coin symbol (e.g. `ETH`) or a symbol from the token registry
    pub coin: String,
    pub from: Address,
    /// Recipient or bridge deposit address
    pub to: Address,
    /// Decimal amount in human units, e.g. `"1.5"`
    pub amount: String,
    /// Whole percent added on top of the fetched gas price
    pub gas_price_percent_padding: Option<u32>,
    pub chain_id: u64,
}

/// Dynamic parameters fetched from the chain right before signing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainParams {
    pub gas: U256,
    pub gas_price: U256,
    pub nonce: U256,
}

/// Legacy transaction without gas, gas price and nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    request: TransactionRequest,
    chain_id: u64,
}

impl UnsignedTransaction {
    pub fn new(from: Address, to: Address, value: U256, data: Bytes, chain_id: u64) -> Self {
        let request = TransactionRequest::new()
            .from(from)
            .to(to)
            .value(value)
            .data(data)
            .chain_id(chain_id);

        Self { request, chain_id }
    }

    pub fn from(&self) -> Address {
        self.request.from.unwrap_or_default()
    }

    pub fn to(&self) -> Option<Address> {
        match &self.request.to {
            Some(NameOrAddress::Address(address)) => Some(*address),
            _ => None,
        }
    }

    pub fn value(&self) -> U256 {
        self.request.value.unwrap_or_default()
    }

    pub fn data(&self) -> Bytes {
        self.request.data.clone().unwrap_or_default()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn is_native_transfer(&self) -> bool {
        self.request.data.as_ref().map_or(true, |data| data.is_empty())
    }

    /// Form used for `eth_estimateGas`
    pub fn as_typed(&self) -> TypedTransaction {
        TypedTransaction::Legacy(self.request.clone())
    }

    /// Merges the fetched chain parameters. This is the only way to obtain
    /// a transaction that can be handed to a signer.
    pub fn with_params(self, params: ChainParams) -> ReadyTransaction {
        let request = self
            .request
            .gas(params.gas)
            .gas_price(params.gas_price)
            .nonce(params.nonce);

        ReadyTransaction {
            request,
            chain_id: self.chain_id,
        }
    }
}

/// Fully parameterized transaction awaiting a signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyTransaction {
    request: TransactionRequest,
    chain_id: u64,
}

impl ReadyTransaction {
    pub fn from(&self) -> Address {
        self.request.from.unwrap_or_default()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn gas(&self) -> U256 {
        self.request.gas.unwrap_or_default()
    }

    pub fn gas_price(&self) -> U256 {
        self.request.gas_price.unwrap_or_default()
    }

    pub fn nonce(&self) -> U256 {
        self.request.nonce.unwrap_or_default()
    }

    pub fn request(&self) -> &TransactionRequest {
        &self.request
    }

    /// EIP-155 signing hash
    pub fn sighash(&self) -> H256 {
        self.request.sighash()
    }

    pub fn with_signature(self, signature: Signature) -> SignedTransaction {
        SignedTransaction {
            request: self.request,
            signature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    request: TransactionRequest,
    signature: Signature,
}

impl SignedTransaction {
    pub fn request(&self) -> &TransactionRequest {
        &self.request
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn r(&self) -> String {
        word_to_hex(self.signature.r)
    }

    pub fn s(&self) -> String {
        word_to_hex(self.signature.s)
    }

    pub fn v(&self) -> String {
        format!("{:#x}", self.signature.v)
    }

    /// Raw RLP encoding submitted through `eth_sendRawTransaction`
    pub fn raw(&self) -> Bytes {
        self.request.rlp_signed(&self.signature)
    }
}

fn word_to_hex(word: U256) -> String {
    let mut bytes = [0u8; 32];
    word.to_big_endian(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}
