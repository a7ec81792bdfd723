//! Payment pipeline against a scripted relay.

mod common;

use std::sync::Arc;
use std::time::Duration;

use num_bigint::BigUint;

use common::*;
use creditnet_client::relay::RelayError;
use creditnet_client::{
    Account, CallArg, DecimalsCache, DecimalsOptions, FeePayer, PaymentOptions, PrepareError,
    Stage, TxOptions,
};

fn self_paid_relay() -> ScriptedRelay {
    ScriptedRelay::new()
        .with_network(NETWORK, 2)
        .with_path(NETWORK, &[ALICE, MEDIATOR, BOB], 1, 21_000)
        .with_tx_infos(7, "5000000000")
}

// ---------------------------------------------------------------------------
// Decimals
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn concurrent_lookups_share_one_fetch() {
    let relay = Arc::new(
        ScriptedRelay::new()
            .with_network(NETWORK, 2)
            .with_network_delay(Duration::from_millis(50)),
    );
    let cache = DecimalsCache::new(relay.clone());

    let lookups = (0..10).map(|_| cache.get(NETWORK));
    let results = futures::future::join_all(lookups).await;

    for result in results {
        assert_eq!(result.unwrap().network_decimals, 2);
    }
    assert_eq!(relay.count("network_details"), 1);
    assert!(cache.is_cached(NETWORK));

    cache.get(NETWORK).await.unwrap();
    assert_eq!(relay.count("network_details"), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_lookups_share_one_failure() {
    let relay = Arc::new(ScriptedRelay::new().with_network_delay(Duration::from_millis(50)));
    let cache = DecimalsCache::new(relay.clone());

    let lookups = (0..10).map(|_| cache.get(NETWORK));
    let results = futures::future::join_all(lookups).await;

    for result in results {
        assert!(matches!(
            result,
            Err(PrepareError::DecimalsUnavailable { .. })
        ));
    }
    assert_eq!(relay.count("network_details"), 1);
    assert!(!cache.is_cached(NETWORK));
}

#[tokio::test]
async fn unscripted_network_fails_every_caller_once() {
    let relay = Arc::new(ScriptedRelay::new());
    let cache = DecimalsCache::new(relay.clone());

    let lookups = (0..10).map(|_| cache.get(NETWORK));
    let results = futures::future::join_all(lookups).await;

    assert!(results.iter().all(Result::is_err));
    assert_eq!(relay.count("network_details"), 1);
}

#[tokio::test]
async fn failed_lookup_is_not_cached() {
    let relay = Arc::new(ScriptedRelay::new());
    let cache = DecimalsCache::new(relay.clone());

    let err = cache.get(NETWORK).await.unwrap_err();
    assert!(matches!(err, PrepareError::DecimalsUnavailable { .. }));
    assert!(!cache.is_cached(NETWORK));

    relay.add_network(NETWORK, 6);
    assert_eq!(cache.get(NETWORK).await.unwrap().network_decimals, 6);
    assert_eq!(relay.count("network_details"), 2);
}

#[tokio::test]
async fn explicit_decimals_skip_the_lookup() {
    let h = harness(self_paid_relay(), Account::ethers(ALICE));
    let options = PaymentOptions {
        path: creditnet_client::PathOptions {
            decimals: DecimalsOptions {
                network_decimals: Some(2),
                interest_rate_decimals: Some(2),
            },
            ..Default::default()
        },
        ..Default::default()
    };

    h.client
        .payment()
        .prepare(NETWORK, BOB, "1", &options)
        .await
        .unwrap();
    assert_eq!(h.relay.count("network_details"), 0);
}

// ---------------------------------------------------------------------------
// Self-paid payments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn self_paid_payment_along_path() {
    let h = harness(self_paid_relay(), Account::ethers(ALICE));

    let prepared = h
        .client
        .payment()
        .prepare(NETWORK, BOB, "12.5", &PaymentOptions::default())
        .await
        .unwrap();

    // Request carries the raw value.
    let requests = h.relay.path_requests.lock().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].1.value, "1250");
    assert_eq!(requests[0].1.from, ALICE);

    // Sender is stripped from the on-chain path.
    let call = h.encoder.last();
    assert_eq!(call.function(), "transfer");
    assert_eq!(
        call.args(),
        [
            CallArg::address(BOB),
            CallArg::uint(1250u32),
            CallArg::uint(1u32),
            CallArg::addresses([MEDIATOR, BOB]),
        ]
    );

    let raw = prepared.tx.raw_tx();
    assert_eq!(raw.from, ALICE);
    assert_eq!(raw.to, NETWORK);
    assert_eq!(raw.nonce, 7);
    assert_eq!(raw.gas_limit, 21_000);
    assert_eq!(raw.gas_price, BigUint::from(5_000_000_000u64));
    assert_eq!(raw.data, CALL_DATA);

    assert_eq!(prepared.tx.eth_fees().value(), "0.000105");
    assert!(prepared.tx.delegation_fees().is_none());
    assert_eq!(prepared.max_fees.value(), "0.01");
    assert_eq!(prepared.path, [ALICE, MEDIATOR, BOB]);
    assert_eq!(prepared.fee_payer, FeePayer::Sender);

    assert_eq!(h.relay.count("identity_infos"), 0);
    assert_eq!(h.relay.count("meta_transaction_fees"), 0);
}

#[tokio::test]
async fn caller_overrides_gas() {
    let h = harness(self_paid_relay(), Account::ethers(ALICE));
    let options = PaymentOptions {
        tx: TxOptions {
            gas_limit: Some(100_000),
            gas_price: Some("1".into()),
            value: None,
        },
        ..Default::default()
    };

    let prepared = h
        .client
        .payment()
        .prepare(NETWORK, BOB, "1", &options)
        .await
        .unwrap();
    assert_eq!(prepared.tx.raw_tx().gas_limit, 100_000);
    assert_eq!(prepared.tx.eth_fees().value(), "0.0001");
}

#[tokio::test]
async fn receiver_paid_path_calls_transfer_receiver_pays() {
    let relay = ScriptedRelay::new()
        .with_network(NETWORK, 2)
        .with_path_paid_by(NETWORK, &[ALICE, BOB], 0, 50_000, Some(FeePayer::Receiver))
        .with_tx_infos(0, "1000000000");
    let h = harness(relay, Account::ethers(ALICE));

    let prepared = h
        .client
        .payment()
        .prepare(NETWORK, BOB, "3", &PaymentOptions::default())
        .await
        .unwrap();

    let call = h.encoder.last();
    assert_eq!(call.function(), "transferReceiverPays");
    assert_eq!(call.args()[3], CallArg::addresses([BOB]));
    assert_eq!(prepared.fee_payer, FeePayer::Receiver);
}

#[tokio::test]
async fn relay_gas_price_is_taken_as_wei() {
    let relay = ScriptedRelay::new()
        .with_network(NETWORK, 2)
        .with_path(NETWORK, &[ALICE, BOB], 0, 21_000)
        .with_tx_infos(0, "20000000000");
    let h = harness(relay, Account::ethers(ALICE));

    let prepared = h
        .client
        .payment()
        .prepare(NETWORK, BOB, "3", &PaymentOptions::default())
        .await
        .unwrap();
    assert_eq!(prepared.tx.raw_tx().gas_price, BigUint::from(20_000_000_000u64));
    assert_eq!(prepared.tx.eth_fees().value(), "0.00042");
}

#[tokio::test]
async fn zero_relay_gas_price_is_a_fee_quote_failure() {
    let relay = ScriptedRelay::new()
        .with_network(NETWORK, 2)
        .with_path(NETWORK, &[ALICE, BOB], 0, 50_000)
        .with_tx_infos(0, "0");
    let h = harness(relay, Account::ethers(ALICE));

    let err = h
        .client
        .payment()
        .prepare(NETWORK, BOB, "3", &PaymentOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PrepareError::FeeQuoteFailed { .. }));
    assert_eq!(err.stage(), Stage::FeeQuote);
}

#[tokio::test]
async fn zero_gas_price_override_is_invalid_options() {
    let h = harness(self_paid_relay(), Account::ethers(ALICE));
    let options = PaymentOptions {
        tx: TxOptions {
            gas_price: Some("0".into()),
            ..Default::default()
        },
        ..Default::default()
    };

    let err = h
        .client
        .payment()
        .prepare(NETWORK, BOB, "3", &options)
        .await
        .unwrap_err();
    assert!(matches!(err, PrepareError::InvalidTxOptions(_)));
}

// ---------------------------------------------------------------------------
// Path failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_path_is_no_path_found() {
    let relay = ScriptedRelay::new()
        .with_network(NETWORK, 2)
        .with_path(NETWORK, &[], 0, 0)
        .with_tx_infos(7, "5000000000");
    let h = harness(relay, Account::ethers(ALICE));

    let err = h
        .client
        .payment()
        .prepare(NETWORK, BOB, "1", &PaymentOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PrepareError::NoPathFound { .. }));
    assert!(err.is_missing_path());
    assert!(err.to_string().contains(NETWORK));
    assert_eq!(h.encoder.count(), 0);
    assert_eq!(h.relay.count("tx_infos"), 0);
}

#[tokio::test]
async fn relay_outage_is_path_query_failed() {
    let relay = ScriptedRelay::new()
        .with_network(NETWORK, 2)
        .with_path_status(NETWORK, 503)
        .with_tx_infos(7, "5000000000");
    let h = harness(relay, Account::ethers(ALICE));

    let err = h
        .client
        .payment()
        .prepare(NETWORK, BOB, "1", &PaymentOptions::default())
        .await
        .unwrap_err();

    match &err {
        PrepareError::PathQueryFailed { network, source } => {
            assert_eq!(network, NETWORK);
            assert!(matches!(source, RelayError::Status { status: 503, .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_missing_path());
    assert_eq!(err.stage(), Stage::PathFinding);
}

#[tokio::test]
async fn get_path_returns_empty_path_as_is() {
    let relay = ScriptedRelay::new()
        .with_network(NETWORK, 2)
        .with_path(NETWORK, &[], 0, 0);
    let h = harness(relay, Account::ethers(ALICE));

    let path = h
        .client
        .payment()
        .get_path(NETWORK, BOB, "1", &Default::default())
        .await
        .unwrap();
    assert!(path.is_empty());
}

#[tokio::test]
async fn over_precise_value_fails_before_path_query() {
    let h = harness(self_paid_relay(), Account::ethers(ALICE));

    let err = h
        .client
        .payment()
        .prepare(NETWORK, BOB, "1.234", &PaymentOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PrepareError::InvalidAmountPrecision { .. }));
    assert_eq!(h.relay.count("path_info"), 0);
}

#[tokio::test]
async fn path_options_are_forwarded() {
    let h = harness(self_paid_relay(), Account::ethers(ALICE));
    let options = PaymentOptions {
        path: creditnet_client::PathOptions {
            max_hops: Some(3),
            max_fees: Some("0.5".into()),
            fee_payer: Some(FeePayer::Sender),
            ..Default::default()
        },
        ..Default::default()
    };

    h.client
        .payment()
        .prepare(NETWORK, BOB, "1", &options)
        .await
        .unwrap();

    let (_, request) = h.relay.path_requests.lock()[0].clone();
    assert_eq!(request.max_hops, Some(3));
    assert_eq!(request.max_fees.as_deref(), Some("0.5"));
    assert_eq!(request.fee_payer, Some(FeePayer::Sender));
}

// ---------------------------------------------------------------------------
// Relayer-paid payments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delegated_payment_takes_first_offer() {
    let relay = ScriptedRelay::new()
        .with_network(NETWORK, 2)
        .with_network(FEE_NETWORK, 2)
        .with_path(NETWORK, &[ALICE, BOB], 0, 60_000)
        .with_identity(ALICE, 4)
        .with_fee_offers(&[("2", FEE_NETWORK), ("1", NETWORK)]);
    let h = harness(relay, Account::identity(ALICE));

    let prepared = h
        .client
        .payment()
        .prepare(NETWORK, BOB, "1", &PaymentOptions::default())
        .await
        .unwrap();

    let fees = prepared.tx.delegation_fees().expect("delegated");
    assert_eq!(fees.raw(), &BigUint::from(2u32));
    assert_eq!(fees.value(), "0.02");
    assert_eq!(fees.currency_network_of_fees(), FEE_NETWORK);
    assert!(prepared.tx.eth_fees().is_zero());

    let raw = prepared.tx.raw_tx();
    assert_eq!(raw.nonce, 4);
    assert_eq!(raw.gas_price, BigUint::from(0u32));
    assert_eq!(raw.delegation_fees.as_deref(), Some("2"));
    assert_eq!(raw.currency_network_of_fees.as_deref(), Some(FEE_NETWORK));

    let quoted = h.relay.fee_requests.lock()[0].clone();
    assert_eq!(quoted.nonce, "4");
    assert_eq!(quoted.data, CALL_DATA);
    assert_eq!(quoted.to, NETWORK);

    assert_eq!(h.relay.count("tx_infos"), 0);
    assert_eq!(h.relay.count("identity_infos"), 1);
}

#[tokio::test]
async fn no_offer_means_zero_delegation_fee() {
    let relay = ScriptedRelay::new()
        .with_network(NETWORK, 2)
        .with_path(NETWORK, &[ALICE, BOB], 0, 60_000)
        .with_identity(ALICE, 0)
        .with_fee_offers(&[]);
    let h = harness(relay, Account::identity(ALICE));

    let prepared = h
        .client
        .payment()
        .prepare(NETWORK, BOB, "1", &PaymentOptions::default())
        .await
        .unwrap();

    let fees = prepared.tx.delegation_fees().expect("delegated");
    assert!(fees.amount().is_zero());
    assert!(prepared.tx.eth_fees().is_zero());
}

#[tokio::test]
async fn fee_quote_outage_is_fee_quote_failed() {
    let relay = ScriptedRelay::new()
        .with_network(NETWORK, 2)
        .with_path(NETWORK, &[ALICE, BOB], 0, 60_000)
        .with_identity(ALICE, 0);
    let h = harness(relay, Account::identity(ALICE));

    let err = h
        .client
        .payment()
        .prepare(NETWORK, BOB, "1", &PaymentOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Stage::FeeQuote);
}

#[tokio::test]
async fn nonce_outage_is_nonce_resolution_failed() {
    let relay = ScriptedRelay::new()
        .with_network(NETWORK, 2)
        .with_path(NETWORK, &[ALICE, BOB], 0, 60_000);
    let h = harness(relay, Account::ethers(ALICE));

    let err = h
        .client
        .payment()
        .prepare(NETWORK, BOB, "1", &PaymentOptions::default())
        .await
        .unwrap_err();
    match err {
        PrepareError::NonceResolutionFailed { address, .. } => assert_eq!(address, ALICE),
        other => panic!("unexpected error: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Close, native value, confirm
// ---------------------------------------------------------------------------

#[tokio::test]
async fn close_trustline_by_triangulation() {
    let relay = ScriptedRelay::new()
        .with_network(NETWORK, 2)
        .with_close_path(NETWORK, &[ALICE, MEDIATOR, BOB], 2, 300)
        .with_tx_infos(1, "2000000000");
    let h = harness(relay, Account::ethers(ALICE));

    let prepared = h
        .client
        .payment()
        .prepare_close(NETWORK, BOB, &PaymentOptions::default())
        .await
        .unwrap();

    let call = h.encoder.last();
    assert_eq!(call.function(), "closeTrustlineByTriangularTransfer");
    assert_eq!(
        call.args(),
        [
            CallArg::address(BOB),
            CallArg::uint(2u32),
            CallArg::addresses([MEDIATOR, BOB]),
        ]
    );
    assert_eq!(prepared.value.raw(), &BigUint::from(300u32));
    assert_eq!(prepared.value.value(), "3");
    assert_eq!(prepared.tx.raw_tx().gas_limit, 90_000);
    assert_eq!(h.relay.count("close_path_info"), 1);
    assert_eq!(h.relay.count("path_info"), 0);
}

#[tokio::test]
async fn native_value_transfer_skips_path_and_encoding() {
    let relay = ScriptedRelay::new().with_tx_infos(2, "1000000000");
    let h = harness(relay, Account::ethers(ALICE));

    let tx = h
        .client
        .payment()
        .prepare_eth(BOB, "1.5", &TxOptions::default())
        .await
        .unwrap();

    let raw = tx.raw_tx();
    assert_eq!(raw.to, BOB);
    assert_eq!(raw.data, "0x");
    assert_eq!(raw.gas_limit, 21_000);
    assert_eq!(raw.value, BigUint::from(1_500_000_000_000_000_000u64));
    assert_eq!(h.encoder.count(), 0);
    assert_eq!(h.relay.count("path_info"), 0);
}

#[tokio::test]
async fn confirm_relays_signed_transaction() {
    let h = harness(self_paid_relay(), Account::ethers(ALICE));
    let prepared = h
        .client
        .payment()
        .prepare(NETWORK, BOB, "1", &PaymentOptions::default())
        .await
        .unwrap();

    let hash = h
        .client
        .payment()
        .confirm(prepared.tx.raw_tx(), &MarkerSigner)
        .await
        .unwrap();
    assert_eq!(hash, "0xhash");
    assert_eq!(h.relay.sent.lock().as_slice(), ["0xsigned7"]);
}

#[tokio::test]
async fn confirm_relays_meta_transaction_for_identities() {
    let relay = ScriptedRelay::new()
        .with_network(NETWORK, 2)
        .with_path(NETWORK, &[ALICE, BOB], 0, 60_000)
        .with_identity(ALICE, 0)
        .with_fee_offers(&[]);
    let h = harness(relay, Account::identity(ALICE));
    let prepared = h
        .client
        .payment()
        .prepare(NETWORK, BOB, "1", &PaymentOptions::default())
        .await
        .unwrap();

    let hash = h
        .client
        .payment()
        .confirm(prepared.tx.raw_tx(), &MarkerSigner)
        .await
        .unwrap();
    assert_eq!(hash, "0xmetahash");
    assert_eq!(h.relay.count("send_signed_meta_transaction"), 1);
}
