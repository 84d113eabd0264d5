//! Fuzz target for JWK and JWK Set ingestion.
//!
//! Feeds arbitrary byte strings to the JSON ingestion paths. Every result
//! must be either `Ok(...)` or `Err(KeyStoreError)`, and a stored key must
//! always satisfy the store's invariants.

#![no_main]

use inferadb_common_keystore::{KeyStore, RawJwk};
use libfuzzer_sys::fuzz_target;

const PRIVATE_MEMBERS: &[&str] = &["d", "p", "q", "dp", "dq", "qi"];

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    let _ = RawJwk::from_json(json);

    let mut store = KeyStore::new();
    if let Ok(key) = store.add_json(json) {
        assert!(!key.kid().is_empty());
        assert!(!key.alg().is_empty());
        assert_eq!(store.len(), 1);

        let public = serde_json::to_value(key.to_public()).unwrap_or_default();
        for member in PRIVATE_MEMBERS {
            assert!(public.get(member).is_none(), "public projection kept '{member}'");
        }
    }

    let before = store.len();
    if store.add_jwk_set_json(json).is_err() {
        assert_eq!(store.len(), before, "failed JWK Set ingestion changed the store");
    }
});
