//! End-to-end behavior of `KeyStore` across every supported algorithm.

#![allow(clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use inferadb_common_keystore::{
    GenerateOptions, KeyParams, KeyStore, KeyStoreConfig, KeyStoreError, KeyType, OkpCurve,
    OkpParams, RawJwk,
};
use rstest::rstest;
use serde_json::{Value, json};

const PRIVATE_MEMBERS: &[&str] = &["d", "p", "q", "dp", "dq", "qi"];

fn is_word_or_hyphen(kid: &str) -> bool {
    !kid.is_empty() && kid.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn public_okp(kid: Option<&str>, alg: Option<&str>) -> RawJwk {
    let mut raw = RawJwk::new(KeyParams::Okp(OkpParams {
        crv: "Ed25519".to_owned(),
        x: "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo".to_owned(),
        d: None,
    }));
    raw.kid = kid.map(str::to_owned);
    raw.alg = alg.map(str::to_owned);
    raw
}

fn kid_option(kid: &str) -> GenerateOptions {
    GenerateOptions::builder().kid(kid).build()
}

#[rstest]
#[case::rs256("RS256", KeyType::Rsa)]
#[case::rs384("RS384", KeyType::Rsa)]
#[case::rs512("RS512", KeyType::Rsa)]
#[case::ps256("PS256", KeyType::Rsa)]
#[case::ps384("PS384", KeyType::Rsa)]
#[case::ps512("PS512", KeyType::Rsa)]
#[case::es256("ES256", KeyType::Ec)]
#[case::es384("ES384", KeyType::Ec)]
#[case::es512("ES512", KeyType::Ec)]
#[case::eddsa("EdDSA", KeyType::Okp)]
fn generated_key_matches_algorithm_family(#[case] alg: &str, #[case] kty: KeyType) {
    let mut store = KeyStore::new();
    let key = store.generate(alg, GenerateOptions::default()).expect("generation should succeed");

    assert_eq!(key.key_type(), kty);
    assert_eq!(key.alg(), alg);
    assert!(is_word_or_hyphen(key.kid()), "kid '{}' has unexpected characters", key.kid());
    assert!(key.is_private());

    let value = serde_json::to_value(key.as_ref()).expect("key should serialize");
    assert_eq!(value["kty"], kty.as_str());
}

#[rstest]
#[case::ed25519("Ed25519", 43)]
#[case::ed448("Ed448", 76)]
fn eddsa_curves_supported(#[case] crv: &str, #[case] x_len: usize) {
    let mut store = KeyStore::new();
    let key = store
        .generate("EdDSA", GenerateOptions::builder().crv(crv).build())
        .expect("supported curve should generate");

    let KeyParams::Okp(okp) = key.params() else { panic!("expected OKP key") };
    assert_eq!(okp.crv, crv);
    assert_eq!(okp.x.len(), x_len);
}

#[rstest]
#[case::x25519("X25519")]
#[case::x448("X448")]
#[case::nist("P-256")]
fn eddsa_unsupported_curve_rejected(#[case] crv: &str) {
    let mut store = KeyStore::new();
    let result = store.generate("EdDSA", GenerateOptions::builder().crv(crv).build());
    assert!(matches!(result, Err(KeyStoreError::UnsupportedCurve { .. })), "got {result:?}");
    assert!(store.is_empty());
}

#[test]
fn configured_default_curve_used_without_crv() {
    let config = KeyStoreConfig::builder().default_curve(OkpCurve::Ed448).build().expect("config");
    let mut store = KeyStore::with_config(config).expect("store");
    let key = store.generate("EdDSA", GenerateOptions::default()).expect("generate");
    let KeyParams::Okp(okp) = key.params() else { panic!("expected OKP key") };
    assert_eq!(okp.crv, "Ed448");
}

#[rstest]
#[case::unknown_rsa("RS123")]
#[case::nonsense("dunno")]
#[case::symmetric("HS256")]
#[case::unsigned("none")]
fn unsupported_algorithm_rejected(#[case] alg: &str) {
    let mut store = KeyStore::new();
    let result = store.generate(alg, GenerateOptions::default());
    assert!(
        matches!(result, Err(KeyStoreError::UnsupportedAlgorithm { alg: ref rejected, .. }) if rejected == alg),
        "got {result:?}"
    );
}

#[test]
fn add_without_alg_fails() {
    let mut store = KeyStore::new();
    let result = store.add(&public_okp(Some("no-alg"), None));
    assert!(matches!(result, Err(KeyStoreError::MissingAlgorithm { .. })));
    assert!(store.is_empty());
}

#[test]
fn add_assigns_random_kid() {
    let mut store = KeyStore::new();
    let key = store.add(&public_okp(None, Some("EdDSA"))).expect("add");
    assert!(is_word_or_hyphen(key.kid()));
    assert!(!key.is_private());
}

#[test]
fn add_with_same_kid_replaces() {
    let mut store = KeyStore::new();
    store.add(&public_okp(Some("dup"), Some("EdDSA"))).expect("first add");
    let replacement =
        json!({"kty": "EC", "kid": "dup", "alg": "ES256", "crv": "P-256", "x": "eA", "y": "eQ"});
    store.add_json(&replacement.to_string()).expect("second add");

    assert_eq!(store.len(), 1);
    let key = store.get(Some("dup")).expect("key present");
    assert_eq!(key.key_type(), KeyType::Ec);
    assert_eq!(key.alg(), "ES256");
}

#[test]
fn generate_with_existing_kid_replaces() {
    let mut store = KeyStore::new();
    store.generate("ES256", kid_option("same")).expect("first");
    let second = store.generate("EdDSA", kid_option("same")).expect("second");

    assert_eq!(store.len(), 1);
    let fetched = store.get(Some("same")).expect("key present");
    assert!(Arc::ptr_eq(&fetched, &second));
}

#[test]
fn round_robin_over_generated_keys() {
    let mut store = KeyStore::new();
    for kid in ["a", "b", "c"] {
        store.generate("ES256", kid_option(kid)).expect("generate");
    }

    let served: Vec<String> =
        (0..4).map(|_| store.get(None).expect("non-empty").kid().to_owned()).collect();
    assert_eq!(served, ["a", "b", "c", "a"]);
}

#[test]
fn get_by_kid_moves_key_to_tail() {
    let mut store = KeyStore::new();
    for kid in ["a", "b", "c"] {
        store.generate("EdDSA", kid_option(kid)).expect("generate");
    }

    assert_eq!(store.get(Some("a")).expect("a").kid(), "a");
    let served: Vec<String> =
        (0..3).map(|_| store.get(None).expect("non-empty").kid().to_owned()).collect();
    assert_eq!(served, ["b", "c", "a"]);
}

#[test]
fn repeated_get_returns_identical_key() {
    let mut store = KeyStore::new();
    store.generate("EdDSA", kid_option("stable")).expect("generate");
    let first = store.get(Some("stable")).expect("first");
    let second = store.get(Some("stable")).expect("second");
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn get_on_empty_or_unknown_returns_none() {
    let mut store = KeyStore::new();
    assert!(store.get(None).is_none());
    assert!(store.get(Some("anything")).is_none());

    store.generate("EdDSA", kid_option("known")).expect("generate");
    assert!(store.get(Some("unknown")).is_none());
}

#[test]
fn public_jwk_set_has_no_private_members() {
    let mut store = KeyStore::new();
    for alg in ["RS256", "ES384", "EdDSA"] {
        store.generate(alg, GenerateOptions::default()).expect("generate");
    }

    let public = serde_json::to_value(store.to_jwk_set(false)).expect("serialize");
    let keys = public["keys"].as_array().expect("keys array");
    assert_eq!(keys.len(), 3);
    for key in keys {
        for member in PRIVATE_MEMBERS {
            assert!(key.get(member).is_none(), "public key leaked '{member}': {key}");
        }
        for member in ["kid", "kty", "alg"] {
            assert!(key.get(member).is_some(), "public key missing '{member}'");
        }
    }

    let private = serde_json::to_value(store.to_jwk_set(true)).expect("serialize");
    let private_keys = private["keys"].as_array().expect("keys array");
    assert_eq!(private_keys.len(), 3);
    for key in private_keys {
        assert!(key.get("d").is_some_and(Value::is_string), "private set dropped 'd': {key}");
    }
    let rsa = private_keys.iter().find(|key| key["kty"] == "RSA").expect("RSA key exported");
    for member in PRIVATE_MEMBERS {
        assert!(rsa.get(*member).is_some_and(Value::is_string), "private RSA key missing '{member}'");
    }
}

#[test]
fn jwk_set_has_expected_document_shape() {
    let mut store = KeyStore::new();
    store.generate("EdDSA", kid_option("only")).expect("generate");

    let document = serde_json::to_value(store.to_jwk_set(false)).expect("serialize");
    let object = document.as_object().expect("object");
    assert_eq!(object.len(), 1);
    assert_eq!(document["keys"][0]["kid"], "only");
    assert_eq!(document["keys"][0]["crv"], "Ed25519");
}

#[test]
fn jwk_set_round_trips_into_new_store() {
    let mut source = KeyStore::new();
    for (kid, alg) in [("r", "PS256"), ("e", "ES512"), ("o", "EdDSA")] {
        source.generate(alg, kid_option(kid)).expect("generate");
    }

    let exported = serde_json::to_string(&source.to_jwk_set(true)).expect("serialize");
    let mut target = KeyStore::new();
    let imported = target.add_jwk_set_json(&exported).expect("import");

    assert_eq!(imported.len(), 3);
    assert_eq!(target.kids().collect::<Vec<_>>(), ["r", "e", "o"]);
    assert_eq!(target.to_jwk_set(true), source.to_jwk_set(true));
}

#[test]
fn explicit_empty_kid_gets_random_kid() {
    let mut store = KeyStore::new();
    let key = store.generate("EdDSA", kid_option("")).expect("generate");
    assert!(is_word_or_hyphen(key.kid()));
    assert!(key.kid().len() >= 27);
}
