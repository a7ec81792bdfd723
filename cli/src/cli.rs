//! # CLI Interface
//!
//! Defines the command-line argument structure for `creditnet` using
//! `clap` derive. Every subcommand prepares one unsigned transaction (or
//! queries one path) and prints it as JSON.

use clap::{Args, Parser, Subcommand, ValueEnum};

use creditnet_client::config::DEFAULT_RELAY_API_URL;
use creditnet_client::{
    DecimalsOptions, FeePayer, PathOptions, TxOptions, VerificationKeyType, WalletType,
};

use crate::logging::LogFormat;

/// CreditNet transaction preparation.
///
/// Talks to a relay to find paths, nonces and fees, and prints the prepared
/// transaction on stdout. Nothing is signed or sent.
#[derive(Parser, Debug)]
#[command(
    name = "creditnet",
    about = "Prepare unsigned CreditNet transactions",
    version,
    propagate_version = true
)]
pub struct CreditNetCli {
    /// Base URL of the relay REST API.
    #[arg(long, global = true, env = "CREDITNET_RELAY_URL", default_value = DEFAULT_RELAY_API_URL)]
    pub relay_url: String,

    /// Address of the acting account (or identity contract).
    #[arg(long, global = true, env = "CREDITNET_ACCOUNT")]
    pub account: Option<String>,

    /// Wallet type: `ethers` pays its own gas, `identity` uses a relayer.
    #[arg(long, global = true, env = "CREDITNET_WALLET_TYPE", default_value = "ethers")]
    pub wallet_type: WalletType,

    /// Relay request timeout in seconds.
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log format: pretty or json.
    #[arg(long, global = true, env = "CREDITNET_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find a payment path without preparing a transaction.
    Path {
        /// Currency network address.
        network: String,
        /// Receiving account.
        receiver: String,
        /// Value to send, as a decimal.
        value: String,
        #[command(flatten)]
        path: PathArgs,
    },
    /// Prepare a multi-hop payment.
    Pay {
        /// Currency network address.
        network: String,
        /// Receiving account.
        receiver: String,
        /// Value to send, as a decimal.
        value: String,
        #[command(flatten)]
        path: PathArgs,
        #[command(flatten)]
        tx: TxArgs,
    },
    /// Prepare closing a trustline by triangulation.
    Close {
        /// Currency network address.
        network: String,
        /// Counterparty of the trustline.
        counterparty: String,
        #[command(flatten)]
        path: PathArgs,
        #[command(flatten)]
        tx: TxArgs,
    },
    /// Prepare a native-coin transfer.
    PayEth {
        /// Recipient.
        to: String,
        /// Value in coins, as a decimal.
        value: String,
        #[command(flatten)]
        tx: TxArgs,
    },
    /// Prepare minting into a shield.
    Mint {
        /// Shield contract address.
        shield: String,
        #[command(flatten)]
        proof: ProofArgs,
        /// Value to mint, as a decimal.
        value: String,
        /// Note commitment.
        commitment: String,
        #[command(flatten)]
        path: PathArgs,
        #[command(flatten)]
        tx: TxArgs,
    },
    /// Prepare a transfer inside a shield.
    ShieldTransfer {
        /// Shield contract address.
        shield: String,
        #[command(flatten)]
        proof: ProofArgs,
        /// Merkle root.
        root: String,
        /// Nullifier of the first spent note.
        nullifier_c: String,
        /// Nullifier of the second spent note.
        nullifier_d: String,
        /// Commitment of the first new note.
        commitment_e: String,
        /// Commitment of the second new note.
        commitment_f: String,
        #[command(flatten)]
        tx: TxArgs,
    },
    /// Prepare burning out of a shield.
    Burn {
        /// Shield contract address.
        shield: String,
        #[command(flatten)]
        proof: ProofArgs,
        /// Merkle root.
        root: String,
        /// Nullifier of the spent note.
        nullifier: String,
        /// Value to burn, as a decimal.
        value: String,
        /// Recipient of the burned value.
        pay_to: String,
        #[command(flatten)]
        path: PathArgs,
        #[command(flatten)]
        tx: TxArgs,
    },
    /// Prepare registering a verification key (development only).
    RegisterVk {
        /// Shield contract address.
        shield: String,
        /// Key slot: mint, transfer or burn.
        vk_type: VerificationKeyType,
        /// Flattened verification key, comma separated.
        #[arg(long, value_delimiter = ',', required = true)]
        key: Vec<String>,
        #[command(flatten)]
        tx: TxArgs,
    },
}

/// Groth16 proof and public inputs.
#[derive(Args, Debug)]
pub struct ProofArgs {
    /// Proof field elements, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    pub proof: Vec<String>,

    /// Public inputs, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    pub inputs: Vec<String>,
}

/// Who pays the mediators.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FeePayerArg {
    Sender,
    Receiver,
}

/// Path constraints.
#[derive(Args, Debug)]
pub struct PathArgs {
    /// Maximum number of hops.
    #[arg(long)]
    pub max_hops: Option<u32>,

    /// Maximum fees, as a decimal.
    #[arg(long)]
    pub max_fees: Option<String>,

    /// Who pays the mediator fees.
    #[arg(long, value_enum)]
    pub fee_payer: Option<FeePayerArg>,

    /// Network decimals, when known. Skips the lookup.
    #[arg(long)]
    pub decimals: Option<u32>,
}

impl From<&PathArgs> for PathOptions {
    fn from(args: &PathArgs) -> Self {
        Self {
            max_hops: args.max_hops,
            max_fees: args.max_fees.clone(),
            fee_payer: args.fee_payer.map(|p| match p {
                FeePayerArg::Sender => FeePayer::Sender,
                FeePayerArg::Receiver => FeePayer::Receiver,
            }),
            decimals: DecimalsOptions {
                network_decimals: args.decimals,
                interest_rate_decimals: None,
            },
        }
    }
}

/// Gas overrides.
#[derive(Args, Debug)]
pub struct TxArgs {
    /// Gas price in gwei.
    #[arg(long)]
    pub gas_price: Option<String>,

    /// Gas limit.
    #[arg(long)]
    pub gas_limit: Option<u64>,
}

impl From<&TxArgs> for TxOptions {
    fn from(args: &TxArgs) -> Self {
        Self {
            gas_price: args.gas_price.clone(),
            gas_limit: args.gas_limit,
            value: None,
        }
    }
}
