//! Tests for amount conversion and payload generation

use crate::{
    config::{MintConfig, MissingMintPolicy},
    mint::MintCache,
    payload::{to_base_units, PayloadGenerator},
    types::{MintInfo, TransferRecord},
};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;

#[test]
fn test_whole_amounts_scale_by_decimals() {
    assert_eq!(to_base_units("1", 9).unwrap(), 1_000_000_000);
    assert_eq!(to_base_units("250", 6).unwrap(), 250_000_000);
    assert_eq!(to_base_units("0", 9).unwrap(), 0);
}

#[test]
fn test_fractional_amounts_are_exact() {
    assert_eq!(to_base_units("1.5", 9).unwrap(), 1_500_000_000);
    assert_eq!(to_base_units("0.000000001", 9).unwrap(), 1);
    assert_eq!(to_base_units(".25", 2).unwrap(), 25);
}

#[test]
fn test_commas_and_whitespace_are_stripped() {
    assert_eq!(to_base_units("1,250.5", 6).unwrap(), 1_250_500_000);
    assert_eq!(to_base_units(" 1,000,000 ", 0).unwrap(), 1_000_000);
}

#[test]
fn test_excess_precision_rounds_to_nearest() {
    // half rounds away from zero
    assert_eq!(to_base_units("1.0000000005", 9).unwrap(), 1_000_000_001);
    assert_eq!(to_base_units("1.0000000004", 9).unwrap(), 1_000_000_000);
    assert_eq!(to_base_units("0.129", 2).unwrap(), 13);
    assert_eq!(to_base_units("0.121", 2).unwrap(), 12);
}

#[test]
fn test_zero_decimals_rounds_the_fraction() {
    assert_eq!(to_base_units("2.5", 0).unwrap(), 3);
    assert_eq!(to_base_units("2.4", 0).unwrap(), 2);
}

#[test]
fn test_invalid_amounts_are_rejected() {
    assert!(to_base_units("", 9).is_err());
    assert!(to_base_units("-1", 9).is_err());
    assert!(to_base_units("1.2.3", 9).is_err());
    assert!(to_base_units("abc", 9).is_err());
    assert!(to_base_units(".", 9).is_err());
    // 2^64 lamports do not exist
    assert!(to_base_units("18446744073709.551616", 6).is_err());
}

#[test]
fn test_conversion_round_trips_within_one_base_unit() {
    // converting back (base / 10^decimals) recovers the original value
    // within one unit of rounding error
    let cases = [("123.456789", 6u8), ("0.1", 9), ("999999.999", 3), ("7", 0)];
    for (amount, decimals) in cases {
        let base = to_base_units(amount, decimals).unwrap();
        let scale = 10f64.powi(decimals as i32);
        let original: f64 = amount.parse().unwrap();
        let recovered = base as f64 / scale;
        assert!(
            (recovered - original).abs() * scale <= 1.0,
            "{amount} at {decimals} decimals: {recovered} vs {original}"
        );
    }
}

fn preloaded_cache(token: Pubkey, decimals: u8) -> MintCache {
    let mut cache = MintCache::new(
        Arc::new(RpcClient::new("http://localhost:8899".to_string())),
        MintConfig {
            missing_policy: MissingMintPolicy::Fail,
            default_decimals: 9,
        },
    );
    cache.insert(
        token,
        MintInfo {
            token_program: spl_token::id(),
            decimals,
        },
    );
    cache
}

#[tokio::test]
async fn test_operation_unit_orders_create_before_transfer() {
    let token = Pubkey::new_unique();
    let mut cache = preloaded_cache(token, 6);
    let generator = PayloadGenerator::new(Pubkey::new_unique());

    let record = TransferRecord {
        token,
        receiver: Pubkey::new_unique(),
        amount: "12.5".into(),
    };
    let unit = generator.build(&record, &mut cache).await.unwrap();

    assert_eq!(unit.instructions.len(), 2);
    // create-associated-account goes through the associated token program
    assert_eq!(
        unit.instructions[0].program_id,
        spl_associated_token_account::id()
    );
    // the transfer goes through the mint's owning program
    assert_eq!(unit.instructions[1].program_id, spl_token::id());
}

#[tokio::test]
async fn test_transfer_carries_checked_amount_and_decimals() {
    let token = Pubkey::new_unique();
    let mut cache = preloaded_cache(token, 6);
    let generator = PayloadGenerator::new(Pubkey::new_unique());

    let record = TransferRecord {
        token,
        receiver: Pubkey::new_unique(),
        amount: "12.5".into(),
    };
    let unit = generator.build(&record, &mut cache).await.unwrap();
    let data = &unit.instructions[1].data;

    // TransferChecked layout: tag, u64 amount (LE), u8 decimals
    assert_eq!(data[0], 12);
    assert_eq!(u64::from_le_bytes(data[1..9].try_into().unwrap()), 12_500_000);
    assert_eq!(data[9], 6);
}

#[tokio::test]
async fn test_bad_amount_names_the_receiver() {
    let token = Pubkey::new_unique();
    let mut cache = preloaded_cache(token, 6);
    let generator = PayloadGenerator::new(Pubkey::new_unique());

    let receiver = Pubkey::new_unique();
    let record = TransferRecord {
        token,
        receiver,
        amount: "not-a-number".into(),
    };
    let err = generator.build(&record, &mut cache).await.unwrap_err();
    assert!(err.to_string().contains(&receiver.to_string()));
}
