/// Mainnet
pub const EVM_RPC_MAINNET: &str = "https://polygon-rpc.com";
pub const EVM_CHAIN_ID_MAINNET: u64 = 137;
pub const BRIDGE_SERVER_API_MAINNET: &str = "https://bridgeapi.anyswap.exchange";

/// Testnet
pub const EVM_RPC_TESTNET: &str = "https://data-seed-prebsc-1-s1.binance.org:8545";
pub const EVM_CHAIN_ID_TESTNET: u64 = 97;
pub const BRIDGE_SERVER_API_TESTNET: &str = "https://testbridgeapi.anyswap.exchange";
