//! A key store shared between tasks.
//!
//! [`SharedKeyStore`] wraps the rotator in a [`parking_lot::Mutex`] and runs
//! key generation on Tokio's blocking pool. The lock is held only for the
//! final insertion and for the short synchronous operations, never while key
//! material is being produced.

use std::{fmt, sync::Arc};

use parking_lot::Mutex;

use crate::{
    config::KeyStoreConfig,
    error::{KeyStoreError, KeyStoreResult},
    generator::{KeyPairGenerator, RustCryptoGenerator},
    jwk::{Jwk, JwkSet, RawJwk},
    normalize::normalize,
    rotator::KeyRotator,
    store::{GenerateOptions, KeyStore, generate_normalized, normalize_jwk_set, resolve_params},
};

/// A cloneable handle to a key store usable from many tasks.
///
/// Clones share the same keys and rotation order.
///
/// # Example
///
/// ```no_run
/// use inferadb_common_keystore::{GenerateOptions, SharedKeyStore};
///
/// # async fn example() -> Result<(), inferadb_common_keystore::KeyStoreError> {
/// let store = SharedKeyStore::new();
/// let key = store.generate("RS256", GenerateOptions::default()).await?;
///
/// let handler_store = store.clone();
/// tokio::spawn(async move {
///     let jwks = handler_store.to_jwk_set(false);
///     assert!(!jwks.is_empty());
/// });
/// # let _ = key;
/// # Ok(())
/// # }
/// ```
pub struct SharedKeyStore<G = RustCryptoGenerator> {
    rotator: Arc<Mutex<KeyRotator>>,
    generator: Arc<G>,
    config: Arc<KeyStoreConfig>,
}

impl SharedKeyStore<RustCryptoGenerator> {
    /// Creates an empty store with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from(KeyStore::new())
    }

    /// Creates an empty store with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::Config`] if the configuration is invalid.
    pub fn with_config(config: KeyStoreConfig) -> KeyStoreResult<Self> {
        KeyStore::with_config(config).map(Self::from)
    }
}

impl Default for SharedKeyStore<RustCryptoGenerator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> Clone for SharedKeyStore<G> {
    fn clone(&self) -> Self {
        Self {
            rotator: Arc::clone(&self.rotator),
            generator: Arc::clone(&self.generator),
            config: Arc::clone(&self.config),
        }
    }
}

impl<G> fmt::Debug for SharedKeyStore<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedKeyStore")
            .field("len", &self.rotator.lock().len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<G: KeyPairGenerator> From<KeyStore<G>> for SharedKeyStore<G> {
    /// Shares an existing store, keeping its keys and rotation order.
    fn from(store: KeyStore<G>) -> Self {
        let (rotator, generator, config) = store.into_parts();
        Self {
            rotator: Arc::new(Mutex::new(rotator)),
            generator: Arc::new(generator),
            config: Arc::new(config),
        }
    }
}

impl<G: KeyPairGenerator + 'static> SharedKeyStore<G> {
    /// Creates an empty store that generates keys with `generator`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::Config`] if the configuration is invalid.
    pub fn with_generator(generator: G, config: KeyStoreConfig) -> KeyStoreResult<Self> {
        KeyStore::with_generator(generator, config).map(Self::from)
    }

    /// Generates a key for `alg` and stores it at the tail of the rotation.
    ///
    /// The algorithm and curve are validated before any work is scheduled.
    /// Generation runs on the blocking pool, bounded by
    /// [`KeyStoreConfig::generation_timeout`]. On timeout the blocking task
    /// runs to completion in the background and its key is discarded.
    ///
    /// # Errors
    ///
    /// - [`KeyStoreError::UnsupportedAlgorithm`] if `alg` is not a supported signing algorithm
    /// - [`KeyStoreError::UnsupportedCurve`] if the `EdDSA` curve is not supported
    /// - [`KeyStoreError::KeyGeneration`] if the generator fails or its task panics
    /// - [`KeyStoreError::GenerationTimeout`] if generation exceeds the configured limit
    ///
    /// The store is unchanged on error.
    #[tracing::instrument(skip(self, options), fields(kid = options.kid.as_deref()))]
    pub async fn generate(&self, alg: &str, options: GenerateOptions) -> KeyStoreResult<Arc<Jwk>> {
        let params = resolve_params(&self.config, alg, &options)?;
        let timeout = self.config.generation_timeout();

        let generator = Arc::clone(&self.generator);
        let config = Arc::clone(&self.config);
        let kid = options.kid;
        let task = tokio::task::spawn_blocking(move || {
            generate_normalized(generator.as_ref(), &config, &params, kid.as_deref())
        });

        let key = match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_error)) => {
                return Err(KeyStoreError::key_generation_with_source(
                    "key generation task failed",
                    join_error,
                ));
            },
            Err(_) => {
                tracing::warn!(alg = params.alg.as_str(), ?timeout, "key generation timed out");
                return Err(KeyStoreError::generation_timeout(params.alg.as_str(), timeout));
            },
        };

        fail::fail_point!("keystore-before-insert", |_| {
            Err(KeyStoreError::key_generation("injected failure before insert"))
        });

        let key = Arc::new(key);
        self.rotator.lock().add(Arc::clone(&key));
        tracing::info!(kid = key.kid(), alg = key.alg(), kty = %key.key_type(), "generated key");
        Ok(key)
    }
}

impl<G> SharedKeyStore<G> {
    /// Stores a copy of an externally supplied key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::MissingAlgorithm`] if the key has no `alg`.
    pub fn add(&self, key: &RawJwk) -> KeyStoreResult<Arc<Jwk>> {
        let key = Arc::new(normalize(key.clone(), None, None, self.config.kid_length())?);
        self.rotator.lock().add(Arc::clone(&key));
        tracing::debug!(kid = key.kid(), alg = key.alg(), "added key");
        Ok(key)
    }

    /// Parses a JSON JWK and stores it.
    ///
    /// # Errors
    ///
    /// - [`KeyStoreError::InvalidKey`] if the JSON is malformed or has an unknown `kty`
    /// - [`KeyStoreError::MissingAlgorithm`] if the key has no `alg`
    pub fn add_json(&self, json: &str) -> KeyStoreResult<Arc<Jwk>> {
        self.add(&RawJwk::from_json(json)?)
    }

    /// Stores every key of a JWK Set document, or none of them.
    ///
    /// A later entry replaces an earlier one with the same `kid`; the
    /// returned keys are exactly those left in the store.
    ///
    /// # Errors
    ///
    /// - [`KeyStoreError::InvalidKey`] if the document or any key fails to parse
    /// - [`KeyStoreError::MissingAlgorithm`] if any key has no `alg`
    pub fn add_jwk_set_json(&self, json: &str) -> KeyStoreResult<Vec<Arc<Jwk>>> {
        let keys: Vec<Arc<Jwk>> =
            normalize_jwk_set(json, self.config.kid_length())?.into_iter().map(Arc::new).collect();

        let mut rotator = self.rotator.lock();
        for key in &keys {
            rotator.add(Arc::clone(key));
        }
        drop(rotator);

        tracing::debug!(count = keys.len(), "added JWK Set");
        Ok(keys)
    }

    /// Returns the next key in rotation, or the key with `kid`, and moves it
    /// to the tail.
    pub fn get(&self, kid: Option<&str>) -> Option<Arc<Jwk>> {
        self.rotator.lock().next(kid)
    }

    /// Exports the stored keys as a JWK Set without changing the rotation.
    #[must_use]
    pub fn to_jwk_set(&self, include_private_fields: bool) -> JwkSet {
        self.rotator.lock().to_jwk_set(include_private_fields)
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rotator.lock().len()
    }

    /// Returns `true` if no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rotator.lock().is_empty()
    }

    /// Returns `true` if a key with this `kid` is stored.
    #[must_use]
    pub fn contains(&self, kid: &str) -> bool {
        self.rotator.lock().contains(kid)
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &KeyStoreConfig {
        &self.config
    }
}
