//! The key store: generation, ingestion and rotating retrieval.

use std::{collections::HashSet, sync::Arc};

use crate::{
    algorithm::{SigningAlgorithm, validate_algorithm, validate_curve},
    config::KeyStoreConfig,
    error::{KeyStoreError, KeyStoreResult},
    generator::{KeyGenParams, KeyPairGenerator, RustCryptoGenerator},
    jwk::{Jwk, JwkSet, RawJwk, RawJwkSet},
    normalize::normalize,
    rotator::KeyRotator,
};

/// Options for [`KeyStore::generate`].
///
/// # Example
///
/// ```
/// use inferadb_common_keystore::GenerateOptions;
///
/// let options = GenerateOptions::builder().kid("signing-2024").crv("Ed448").build();
/// assert_eq!(options.kid.as_deref(), Some("signing-2024"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, bon::Builder)]
pub struct GenerateOptions {
    /// Identifier for the new key. A fresh random `kid` is drawn when absent
    /// or empty.
    #[builder(into)]
    pub kid: Option<String>,

    /// Curve for `EdDSA` keys (`Ed25519` or `Ed448`). Ignored for other
    /// algorithms.
    #[builder(into)]
    pub crv: Option<String>,
}

/// Validates the request, generates key material and normalizes it.
///
/// Touches no store state, so callers insert the result only once every
/// fallible step has passed.
pub(crate) fn prepare_generated<G: KeyPairGenerator + ?Sized>(
    generator: &G,
    config: &KeyStoreConfig,
    alg: &str,
    options: &GenerateOptions,
) -> KeyStoreResult<Jwk> {
    let params = resolve_params(config, alg, options)?;
    generate_normalized(generator, config, &params, options.kid.as_deref())
}

pub(crate) fn resolve_params(
    config: &KeyStoreConfig,
    alg: &str,
    options: &GenerateOptions,
) -> KeyStoreResult<KeyGenParams> {
    let alg = validate_algorithm(alg)?;
    let curve = match (alg, options.crv.as_deref()) {
        (SigningAlgorithm::EdDsa, Some(crv)) => validate_curve(crv)?,
        _ => config.default_curve(),
    };
    Ok(KeyGenParams { alg, curve, rsa_modulus_bits: config.rsa_modulus_bits() })
}

pub(crate) fn generate_normalized<G: KeyPairGenerator + ?Sized>(
    generator: &G,
    config: &KeyStoreConfig,
    params: &KeyGenParams,
    kid: Option<&str>,
) -> KeyStoreResult<Jwk> {
    let private_key = generator.generate_key_pair(params)?;
    let raw = generator.export_private_jwk(&private_key)?;
    normalize(raw, kid, Some(params.alg.as_str()), config.kid_length())
}

/// Parses a JWK Set document and normalizes every key.
///
/// Fails on the first key that does not normalize, before anything is
/// returned for insertion. When a `kid` repeats, only its last entry is
/// kept, at that entry's position.
pub(crate) fn normalize_jwk_set(json: &str, kid_length: usize) -> KeyStoreResult<Vec<Jwk>> {
    let set: RawJwkSet = serde_json::from_str(json)
        .map_err(|e| KeyStoreError::invalid_key_with_source("failed to parse JWK Set", e))?;
    let keys = set
        .keys
        .into_iter()
        .map(|raw| normalize(raw, None, None, kid_length))
        .collect::<KeyStoreResult<Vec<_>>>()?;

    let mut seen = HashSet::new();
    let mut unique: Vec<Jwk> =
        keys.into_iter().rev().filter(|key| seen.insert(key.kid().to_owned())).collect();
    unique.reverse();
    Ok(unique)
}

/// A rotating store of asymmetric signing keys.
///
/// Keys enter through [`generate`](Self::generate) or [`add`](Self::add) and
/// leave through [`get`](Self::get), which serves them round robin. Every
/// stored key has a unique, non-empty `kid` and a non-empty `alg`.
///
/// Mutating operations take `&mut self`. Wrap the store in
/// [`SharedKeyStore`](crate::SharedKeyStore) to share it between tasks.
///
/// # Example
///
/// ```
/// use inferadb_common_keystore::{GenerateOptions, KeyStore};
///
/// let mut store = KeyStore::new();
/// store.generate("ES256", GenerateOptions::builder().kid("a").build())?;
/// store.generate("EdDSA", GenerateOptions::builder().kid("b").build())?;
///
/// assert_eq!(store.get(None).map(|key| key.kid().to_owned()).as_deref(), Some("a"));
/// assert_eq!(store.get(None).map(|key| key.kid().to_owned()).as_deref(), Some("b"));
///
/// let public = serde_json::to_value(store.to_jwk_set(false))?;
/// assert!(public["keys"][0].get("d").is_none());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct KeyStore<G = RustCryptoGenerator> {
    rotator: KeyRotator,
    generator: G,
    config: KeyStoreConfig,
}

impl KeyStore<RustCryptoGenerator> {
    /// Creates an empty store with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rotator: KeyRotator::new(),
            generator: RustCryptoGenerator,
            config: KeyStoreConfig::default(),
        }
    }

    /// Creates an empty store with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::Config`] if the configuration is invalid.
    pub fn with_config(config: KeyStoreConfig) -> KeyStoreResult<Self> {
        Self::with_generator(RustCryptoGenerator, config)
    }
}

impl Default for KeyStore<RustCryptoGenerator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: KeyPairGenerator> KeyStore<G> {
    /// Creates an empty store that generates keys with `generator`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::Config`] if the configuration is invalid.
    pub fn with_generator(generator: G, config: KeyStoreConfig) -> KeyStoreResult<Self> {
        config.validate()?;
        Ok(Self { rotator: KeyRotator::new(), generator, config })
    }

    /// Generates a key for `alg` and stores it at the tail of the rotation.
    ///
    /// A key with the same `kid` is replaced.
    ///
    /// # Errors
    ///
    /// - [`KeyStoreError::UnsupportedAlgorithm`] if `alg` is not a supported signing algorithm
    /// - [`KeyStoreError::UnsupportedCurve`] if `alg` is `EdDSA` and `crv` is not `Ed25519` or
    ///   `Ed448`
    /// - [`KeyStoreError::KeyGeneration`] if the generator fails
    ///
    /// The store is unchanged on error.
    #[tracing::instrument(skip(self, options), fields(kid = options.kid.as_deref()))]
    pub fn generate(&mut self, alg: &str, options: GenerateOptions) -> KeyStoreResult<Arc<Jwk>> {
        let key = prepare_generated(&self.generator, &self.config, alg, &options)?;

        fail::fail_point!("keystore-before-insert", |_| {
            Err(KeyStoreError::key_generation("injected failure before insert"))
        });

        let key = Arc::new(key);
        self.rotator.add(Arc::clone(&key));
        tracing::info!(kid = key.kid(), alg = key.alg(), kty = %key.key_type(), "generated key");
        Ok(key)
    }

    /// Stores a copy of an externally supplied key.
    ///
    /// The key gets a random `kid` if it has none. Its key material is not
    /// checked against `kty` or `alg`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::MissingAlgorithm`] if the key has no `alg`.
    #[tracing::instrument(skip_all, fields(kid = key.kid.as_deref()))]
    pub fn add(&mut self, key: &RawJwk) -> KeyStoreResult<Arc<Jwk>> {
        let key = Arc::new(normalize(key.clone(), None, None, self.config.kid_length())?);
        self.rotator.add(Arc::clone(&key));
        tracing::debug!(kid = key.kid(), alg = key.alg(), "added key");
        Ok(key)
    }

    /// Parses a JSON JWK and stores it as [`add`](Self::add) does.
    ///
    /// # Errors
    ///
    /// - [`KeyStoreError::InvalidKey`] if the JSON is malformed or has an unknown `kty`
    /// - [`KeyStoreError::MissingAlgorithm`] if the key has no `alg`
    pub fn add_json(&mut self, json: &str) -> KeyStoreResult<Arc<Jwk>> {
        let raw = RawJwk::from_json(json)?;
        self.add(&raw)
    }

    /// Stores every key of a JWK Set document.
    ///
    /// Either every key is stored, in document order, or none is. A later
    /// entry replaces an earlier one with the same `kid`; the returned keys
    /// are exactly those left in the store.
    ///
    /// # Errors
    ///
    /// - [`KeyStoreError::InvalidKey`] if the document or any key fails to parse
    /// - [`KeyStoreError::MissingAlgorithm`] if any key has no `alg`
    #[tracing::instrument(skip_all)]
    pub fn add_jwk_set_json(&mut self, json: &str) -> KeyStoreResult<Vec<Arc<Jwk>>> {
        let keys = normalize_jwk_set(json, self.config.kid_length())?;
        let stored: Vec<Arc<Jwk>> = keys
            .into_iter()
            .map(|key| {
                let key = Arc::new(key);
                self.rotator.add(Arc::clone(&key));
                key
            })
            .collect();
        tracing::debug!(count = stored.len(), "added JWK Set");
        Ok(stored)
    }

    /// Returns the next key in rotation, or the key with `kid`, and moves
    /// it to the tail.
    ///
    /// Returns `None` if the store is empty or no key has that `kid`.
    pub fn get(&mut self, kid: Option<&str>) -> Option<Arc<Jwk>> {
        self.rotator.next(kid)
    }

    /// Exports the stored keys as a JWK Set without changing the rotation.
    ///
    /// Pass `false` for a set that is safe to publish.
    #[must_use]
    pub fn to_jwk_set(&self, include_private_fields: bool) -> JwkSet {
        self.rotator.to_jwk_set(include_private_fields)
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rotator.len()
    }

    /// Returns `true` if no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rotator.is_empty()
    }

    /// Returns `true` if a key with this `kid` is stored.
    #[must_use]
    pub fn contains(&self, kid: &str) -> bool {
        self.rotator.contains(kid)
    }

    /// Returns the stored `kid`s in rotation order.
    pub fn kids(&self) -> impl Iterator<Item = &str> {
        self.rotator.kids()
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &KeyStoreConfig {
        &self.config
    }

    pub(crate) fn into_parts(self) -> (KeyRotator, G, KeyStoreConfig) {
        (self.rotator, self.generator, self.config)
    }
}
