mod common;

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use sui_crypto::ed25519::Ed25519VerifyingKey;
use sui_crypto::SuiVerifier;
use sui_sdk_types::{Input, SignatureScheme, SimpleSignature, UserSignature};

use purple_sui_server::chain::{
    parse_address, Digest, Function, Identifier, ObjectInput, SuiKeypair, Transaction,
    TransactionBuilder,
};

/// Mainnet `cancel_order` on the DeepBook v2 CLOB, as BCS `TransactionData`.
const CANCEL_ORDER_TX: &str = "AAADAQFEBbUNeR/TNGdU6Bcaqra8LtJsLEbv3QM8FLMK5QesMyx96QEAAAAAAQAIVsakAAAAAAABALyyokbZ/8ynfWQer6UyP1DpeCnPU1NC7AyFNJSaTztnQF40BQAAAAAgffPXh5XuG6TWjHk6qC5w9k2a+41oTWfm0sC1FOYRqsEBAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAN7pB2Nsb2JfdjIMY2FuY2VsX29yZGVyAgcAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAgNzdWkDU1VJAAddSzAlBmRcN/8TO5jEtQpa4UhBZZc41tcz1Z0NIXqTvwRjb2luBENPSU4AAwEAAAEBAAECAPgh00g/x3Jeuvqlo9Ejc9SZAb384UhPIZ2qcGajDfd9ASXQjpFOD6mfycbzwD1wc+IOkCXQ8rHQo/Vi5SDOGMR/Jl40BQAAAAAgV7P1E0IMKon5uI82R/0arWLt+dc1ng/4VwKDqpTCxHT4IdNIP8dyXrr6paPRI3PUmQG9/OFITyGdqnBmow33fe4CAAAAAAAAAMqaOwAAAAAA";

fn cancel_order() -> Transaction {
    let pool = parse_address("0x4405b50d791fd3346754e8171aaab6bc2ed26c2c46efdd033c14b30ae507ac33")
        .unwrap();
    let account_cap =
        parse_address("0xbcb2a246d9ffcca77d641eafa5323f50e97829cf535342ec0c8534949a4f3b67")
            .unwrap();
    let gas_coin = parse_address("0x25d08e914e0fa99fc9c6f3c03d7073e20e9025d0f2b1d0a3f562e520ce18c47f")
        .unwrap();
    let sender = parse_address("0xf821d3483fc7725ebafaa5a3d12373d49901bdfce1484f219daa7066a30df77d")
        .unwrap();

    let mut tx = TransactionBuilder::new();
    let pool = tx.object(ObjectInput::shared(pool, 32_079_148, true));
    let order_id = tx.pure(&10_798_678u64);
    let account_cap = tx.object(ObjectInput::owned(
        account_cap,
        87_318_080,
        Digest::from_base58("9UfcoQg5KpjqzJYA591vTWVR9nfY3iFKPNFfvQxPnL5e").unwrap(),
    ));
    tx.move_call(
        Function::new(
            parse_address("0xdee9").unwrap(),
            Identifier::new("clob_v2").unwrap(),
            Identifier::new("cancel_order").unwrap(),
        )
        .with_type_args(vec![
            "0x2::sui::SUI".parse().unwrap(),
            "0x5d4b302506645c37ff133b98c4b50a5ae14841659738d6d733d59d0d217a93bf::coin::COIN"
                .parse()
                .unwrap(),
        ]),
        vec![pool, order_id, account_cap],
    );
    tx.set_sender(sender);
    tx.add_gas_objects([ObjectInput::owned(
        gas_coin,
        87_318_054,
        Digest::from_base58("6uMdF5mkBKNX5p1P2DK7xVqhwwPgkSLfvWUKYavsNaVq").unwrap(),
    )]);
    tx.set_gas_budget(1_000_000_000);
    tx.set_gas_price(750);
    tx.try_build().unwrap()
}

#[test]
fn built_transaction_matches_mainnet_bytes() {
    let expected = B64.decode(CANCEL_ORDER_TX).unwrap();
    let built = cancel_order();

    assert_eq!(bcs::to_bytes(&built).unwrap(), expected);

    let decoded: Transaction = bcs::from_bytes(&expected).unwrap();
    assert_eq!(decoded, built);
}

#[test]
fn pure_addresses_are_raw_bytes() {
    let kp = common::keypair();
    let mut tx = TransactionBuilder::new();
    let arg = tx.pure(&kp.address());
    tx.move_call(
        Function::new(
            common::package(),
            Identifier::new("bounty").unwrap(),
            Identifier::new("accept_bounty").unwrap(),
        ),
        vec![arg],
    );
    tx.set_sender(kp.address());
    tx.add_gas_objects([common::coin(1, 10).gas_input()]);
    tx.set_gas_budget(100);
    tx.set_gas_price(750);
    let tx = tx.try_build().unwrap();

    let bytes = bcs::to_bytes(&tx).unwrap();
    // V1 tag, then ProgrammableTransaction kind tag
    assert_eq!(&bytes[..2], &[0, 0]);
    match tx.kind {
        sui_sdk_types::TransactionKind::ProgrammableTransaction(pt) => {
            assert_eq!(pt.inputs[0], Input::Pure(kp.address().into_inner().to_vec()));
        }
        other => panic!("unexpected kind {other:?}"),
    }
}

#[test]
fn signature_verifies_over_the_transaction() {
    let kp = common::keypair();
    let tx = cancel_order();

    let sig = kp.sign_transaction(&tx).unwrap();
    let serialized = sig.to_bytes();
    assert_eq!(serialized.len(), 97);
    assert_eq!(serialized[0], SignatureScheme::Ed25519.to_u8());
    match &sig {
        UserSignature::Simple(SimpleSignature::Ed25519 { public_key, .. }) => {
            assert_eq!(*public_key, kp.public_key());
        }
        other => panic!("unexpected signature {other:?}"),
    }

    let vk = Ed25519VerifyingKey::new(&kp.public_key()).unwrap();
    vk.verify_transaction(&tx, &sig).unwrap();

    // round-trips through the base64 form sent to the node
    let wire = UserSignature::from_base64(&sig.to_base64()).unwrap();
    vk.verify_transaction(&tx, &wire).unwrap();

    let mut other = tx.clone();
    other.gas_payment.budget += 1;
    assert!(vk.verify_transaction(&other, &sig).is_err());
}

#[test]
fn address_is_derived_from_the_public_key() {
    let kp = common::keypair();
    assert_eq!(kp.address(), kp.public_key().derive_address());

    let other = SuiKeypair::from_secret_bytes(&[8; 32]);
    assert_ne!(kp.address(), other.address());
}

#[test]
fn base64_keys_with_and_without_flag() {
    let plain = SuiKeypair::from_base64(&B64.encode(common::SECRET)).unwrap();

    let mut flagged = vec![SignatureScheme::Ed25519.to_u8()];
    flagged.extend_from_slice(&common::SECRET);
    let flagged = SuiKeypair::from_base64(&B64.encode(flagged)).unwrap();

    assert_eq!(plain.address(), common::keypair().address());
    assert_eq!(flagged.address(), plain.address());

    let mut secp = vec![SignatureScheme::Secp256k1.to_u8()];
    secp.extend_from_slice(&common::SECRET);
    let err = SuiKeypair::from_base64(&B64.encode(secp)).unwrap_err();
    assert!(err.to_string().contains("ed25519"));

    let err = SuiKeypair::from_base64(&B64.encode([1u8; 16])).unwrap_err();
    assert_eq!(err.code(), "CONFIGURATION_ERROR");
    assert!(SuiKeypair::from_base64("%%%").is_err());
}

#[test]
fn debug_output_hides_the_secret() {
    let shown = format!("{:?}", common::keypair());
    assert!(shown.contains("address"));
    assert!(!shown.contains("key:"));
}
