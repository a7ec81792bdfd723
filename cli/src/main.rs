// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # CreditNet CLI
//!
//! Entry point for the `creditnet` binary. Parses CLI arguments, initializes
//! logging, connects to the relay and prepares one transaction.
//!
//! The prepared transaction is printed to stdout as JSON. Signing and
//! submission are left to the caller's wallet.
//!
//! - `path`            — find a payment path
//! - `pay`             — prepare a multi-hop payment
//! - `close`           — prepare closing a trustline
//! - `pay-eth`         — prepare a native-coin transfer
//! - `mint`            — prepare minting into a shield
//! - `shield-transfer` — prepare a shielded transfer
//! - `burn`            — prepare burning out of a shield
//! - `register-vk`     — prepare registering a verification key

mod cli;
mod logging;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use creditnet_client::{Account, ClientConfig, CreditNetClient, PathOptions, PaymentOptions, TxOptions};
use creditnet_contracts::AbiEncoder;

use cli::{Commands, CreditNetCli, PathArgs, TxArgs};

const DEFAULT_LOG_FILTER: &str = "creditnet=info,creditnet_client=info,creditnet_contracts=warn";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CreditNetCli::parse();
    logging::init_logging(DEFAULT_LOG_FILTER, cli.log_format);

    let address = cli
        .account
        .clone()
        .filter(|a| !a.is_empty())
        .context("no account given: pass --account or set CREDITNET_ACCOUNT")?;
    let account = Account {
        address,
        wallet_type: cli.wallet_type,
    };

    let config = ClientConfig {
        relay_api_url: cli.relay_url.clone(),
        request_timeout: Duration::from_secs(cli.timeout_secs),
        ..ClientConfig::default()
    };
    let encoder = AbiEncoder::new().context("failed to load contract interfaces")?;
    let client = CreditNetClient::from_config(&config, Arc::new(encoder), account)
        .with_context(|| format!("failed to connect to relay at {}", config.relay_api_url))?;

    tracing::info!(
        relay = %config.relay_api_url,
        account = %client.account().address,
        wallet_type = %client.account().wallet_type,
        "client ready"
    );

    run(&client, cli.command).await
}

async fn run(client: &CreditNetClient, command: Commands) -> Result<()> {
    match command {
        Commands::Path {
            network,
            receiver,
            value,
            path,
        } => {
            let result = client
                .payment()
                .get_path(&network, &receiver, &value, &PathOptions::from(&path))
                .await
                .context("path query failed")?;
            if result.is_empty() {
                tracing::warn!(%network, %receiver, %value, "no path found");
            }
            print_json(&result)
        }
        Commands::Pay {
            network,
            receiver,
            value,
            path,
            tx,
        } => {
            let prepared = client
                .payment()
                .prepare(&network, &receiver, &value, &payment_options(&path, &tx))
                .await
                .context("failed to prepare payment")?;
            print_json(&prepared)
        }
        Commands::Close {
            network,
            counterparty,
            path,
            tx,
        } => {
            let prepared = client
                .payment()
                .prepare_close(&network, &counterparty, &payment_options(&path, &tx))
                .await
                .context("failed to prepare trustline close")?;
            print_json(&prepared)
        }
        Commands::PayEth { to, value, tx } => {
            let prepared = client
                .payment()
                .prepare_eth(&to, &value, &TxOptions::from(&tx))
                .await
                .context("failed to prepare coin transfer")?;
            print_json(&prepared)
        }
        Commands::Mint {
            shield,
            proof,
            value,
            commitment,
            path,
            tx,
        } => {
            let prepared = client
                .shield()
                .prepare_mint_commitment(
                    &shield,
                    &proof.proof,
                    &proof.inputs,
                    &value,
                    &commitment,
                    &payment_options(&path, &tx),
                )
                .await
                .context("failed to prepare mint")?;
            print_json(&prepared)
        }
        Commands::ShieldTransfer {
            shield,
            proof,
            root,
            nullifier_c,
            nullifier_d,
            commitment_e,
            commitment_f,
            tx,
        } => {
            let prepared = client
                .shield()
                .prepare_transfer_commitment(
                    &shield,
                    &proof.proof,
                    &proof.inputs,
                    &root,
                    &nullifier_c,
                    &nullifier_d,
                    &commitment_e,
                    &commitment_f,
                    &TxOptions::from(&tx),
                )
                .await
                .context("failed to prepare shielded transfer")?;
            print_json(&prepared)
        }
        Commands::Burn {
            shield,
            proof,
            root,
            nullifier,
            value,
            pay_to,
            path,
            tx,
        } => {
            let prepared = client
                .shield()
                .prepare_burn_commitment(
                    &shield,
                    &proof.proof,
                    &proof.inputs,
                    &root,
                    &nullifier,
                    &value,
                    &pay_to,
                    &payment_options(&path, &tx),
                )
                .await
                .context("failed to prepare burn")?;
            print_json(&prepared)
        }
        Commands::RegisterVk {
            shield,
            vk_type,
            key,
            tx,
        } => {
            let prepared = client
                .shield()
                .prepare_register_vk(&shield, &key, vk_type, &TxOptions::from(&tx))
                .await
                .with_context(|| format!("failed to prepare {vk_type} key registration"))?;
            print_json(&prepared)
        }
    }
}

fn payment_options(path: &PathArgs, tx: &TxArgs) -> PaymentOptions {
    PaymentOptions {
        path: PathOptions::from(path),
        tx: TxOptions::from(tx),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}
