use clap::{Args, Parser, Subcommand, ValueEnum};
use evm_bridge_command::EvmBridgeSubCommand;
use serde::Deserialize;
use std::{env, fs::File, io::BufReader};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{field::MakeExt, fmt::format, EnvFilter, FmtSubscriber};

mod defaults;
mod evm_bridge_command;

#[derive(Args, Debug, Clone, Deserialize, Default)]
struct CliConfig {
    #[arg(long)]
    evm_rpc: Option<String>,
    #[arg(long)]
    evm_chain_id: Option<u64>,
    #[arg(long)]
    evm_private_key: Option<String>,
    #[arg(long, help = "JSON-RPC endpoint of a wallet answering eth_sign")]
    evm_signer_rpc: Option<String>,
    #[arg(long)]
    param_fetch_timeout_secs: Option<u64>,

    #[arg(long, help = "JSON file mapping token symbols to address and decimals")]
    token_registry_file: Option<String>,
    #[arg(long)]
    bridge_server_api: Option<String>,

    #[arg(long)]
    config_file: Option<String>,
}

impl CliConfig {
    fn or(self, other: Self) -> Self {
        Self {
            evm_rpc: self.evm_rpc.or(other.evm_rpc),
            evm_chain_id: self.evm_chain_id.or(other.evm_chain_id),
            evm_private_key: self.evm_private_key.or(other.evm_private_key),
            evm_signer_rpc: self.evm_signer_rpc.or(other.evm_signer_rpc),
            param_fetch_timeout_secs: self
                .param_fetch_timeout_secs
                .or(other.param_fetch_timeout_secs),

            token_registry_file: self.token_registry_file.or(other.token_registry_file),
            bridge_server_api: self.bridge_server_api.or(other.bridge_server_api),

            config_file: self.config_file.or(other.config_file),
        }
    }
}

fn env_config() -> CliConfig {
    CliConfig {
        evm_rpc: env::var("EVM_RPC").ok(),
        evm_chain_id: env::var("EVM_CHAIN_ID")
            .ok()
            .and_then(|val| val.parse::<u64>().ok()),
        evm_private_key: env::var("EVM_PRIVATE_KEY").ok(),
        evm_signer_rpc: env::var("EVM_SIGNER_RPC").ok(),
        param_fetch_timeout_secs: env::var("PARAM_FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok()),

        token_registry_file: env::var("TOKEN_REGISTRY_FILE").ok(),
        bridge_server_api: env::var("BRIDGE_SERVER_API").ok(),

        config_file: None,
    }
}

fn default_config(network: Network) -> CliConfig {
    match network {
        Network::Mainnet => CliConfig {
            evm_rpc: Some(defaults::EVM_RPC_MAINNET.to_owned()),
            evm_chain_id: Some(defaults::EVM_CHAIN_ID_MAINNET),
            evm_private_key: None,
            evm_signer_rpc: None,
            param_fetch_timeout_secs: None,

            token_registry_file: None,
            bridge_server_api: Some(defaults::BRIDGE_SERVER_API_MAINNET.to_owned()),

            config_file: None,
        },
        Network::Testnet => CliConfig {
            evm_rpc: Some(defaults::EVM_RPC_TESTNET.to_owned()),
            evm_chain_id: Some(defaults::EVM_CHAIN_ID_TESTNET),
            evm_private_key: None,
            evm_signer_rpc: None,
            param_fetch_timeout_secs: None,

            token_registry_file: None,
            bridge_server_api: Some(defaults::BRIDGE_SERVER_API_TESTNET.to_owned()),

            config_file: None,
        },
    }
}

fn file_config(path: &str) -> CliConfig {
    let file = File::open(path).expect("Unable to open config file");
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).expect("Unable to parse config file")
}

fn combined_config(cli_config: CliConfig, network: Network) -> CliConfig {
    let file_config = cli_config
        .config_file
        .as_ref()
        .map_or_else(CliConfig::default, |path| file_config(path));

    cli_config
        .or(env_config())
        .or(file_config)
        .or(default_config(network))
}

#[derive(Subcommand, Debug)]
enum SubCommand {
    EvmBridge {
        #[clap(subcommand)]
        cmd: EvmBridgeSubCommand,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Network {
    Mainnet,
    Testnet,
}

#[derive(Parser, Debug)]
#[clap(version)]
struct Arguments {
    network: Network,
    #[command(subcommand)]
    cmd: SubCommand,
}

#[tokio::main]
async fn main() {
    init_logger();
    dotenv::dotenv().ok();
    let args = Arguments::parse();

    match args.cmd {
        SubCommand::EvmBridge { cmd } => {
            evm_bridge_command::match_subcommand(cmd, args.network).await
        }
    }
}

fn init_logger() {
    let field_formatter = format::debug_fn(|writer, field, value| match field.name() {
        "message" => write!(writer, "{:?}", value),
        _ => write!(writer, "{}={:?}", field, value),
    })
    .display_messages()
    .delimited("\n");

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_file(false)
        .with_target(false)
        .with_line_number(false)
        .with_level(false)
        .fmt_fields(field_formatter)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}
