//! Shared test utilities for key store testing.
//!
//! Fixture keys in JWK JSON form, a `kid` shape check and an assertion
//! macro for [`KeyStoreError`](crate::KeyStoreError) variants. Feature-gated
//! behind `testutil` so none of it reaches production builds.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! inferadb-common-keystore = { path = "../keystore", features = ["testutil"] }
//! ```
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use inferadb_common_keystore::testutil::{is_valid_kid, sample_okp_jwk_json};
//! ```

use serde_json::json;

use crate::jwk::{KeyParams, OkpParams, RawJwk};

/// Private 2048-bit RSA key with `kid` `2011-04-29` and `alg` `RS256`.
pub fn sample_rsa_jwk_json() -> String {
    json!({
        "kty": "RSA",
        "kid": "2011-04-29",
        "alg": "RS256",
        "n": "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw",
        "e": "AQAB",
        "d": "X4cTteJY_gn4FYPsXB8rdXix5vwsg1FLN5E3EaG6RJoVH-HLLKD9M7dx5oo7GURknchnrRweUkC7hT5fJLM0WbFAKNLWY2vv7B6NqXSzUvxT0_YSfqijwp3RTzlBaCxWp4doFk5N2o8Gy_nHNKroADIkJ46pRUohsXywbReAdYaMwFs9tv8d_cPVY3i07a3t8MN6TNwm0dSawm9v47UiCl3Sk5ZiG7xojPLu4sbg1U2jx4IBTNBznbJSzFHK66jT8bgkuqsk0GjskDJk19Z4qwjwbsnn4j2WBii3RL-Us2lGVkY8fkFzme1z0HbIkfz0Y6mqnOYtqc0X4jfcKoAC8Q",
        "p": "83i-7IvMGXoMXCskv73TKr8637FiO7Z27zv8oj6pbWUQyLPQBQxtPVnwD20R-60eTDmD2ujnMt5PoqMrm8RfmNhVWDtjjMmCMjOpSXicFHj7XOuVIYQyqVWlWEh6dN36GVZYk93N8Bc9vY41xy8B9RzzOGVQzXvNEvn7O0nVbfs",
        "q": "3dfOR9cuYq-0S-mkFLzgItgMEfFzB2q3hWehMuG0oCuqnb3vobLyumqjVZQO1dIrdwgTnCdpYzBcOfW5r370AFXjiWft_NGEiovonizhKpo9VVS78TzFgxkIdrecRezsZ-1kYd_s1qDbxtkDEgfAITAG9LUnADun4vIcb6yelxk",
        "dp": "G4sPXkc6Ya9y8oJW9_ILj4xuppu0lzi_H7VTkS8xj5SdX3coE0oimYwxIi2emTAue0UOa5dpgFGyBJ4c8tQ2VF402XRugKDTP8akYhFo5tAA77Qe_NmtuYZc3C3m3I24G2GvR5sSDxUyAN2zq8Lfn9EUms6rY3Ob8YeiKkTiBj0",
        "dq": "s9lAH9fggBsoFR8Oac2R_E2gw282rT2kGOAhvIllETE1efrA6huUUvMfBcMpn8lqeW6vzznYY5SSQF7pMdC_agI3nG8Ibp1BUb0JUiraRNqUfLhcQb_d9GF4Dh7e74WbRsobRonujTYN1xCaP6TO61jvWrX-L18txXw494Q_cgk",
        "qi": "GyM_p6JrXySiz1toFgKbWV-JdI3jQ4ypu9rbMWx3rQJBfmt0FoYzgUIZEVFEcOqwemRN81zoDAaa-Bk0KWNGDjJHZDdDmFhW3AN7lI-puxk_mHZGJ11rxyR8O55XLSe3SPmRfKwZI6yU24ZxvQKFYItdldUKGzO6Ia6zTKhAVRU",
    })
    .to_string()
}

/// Private P-256 key from RFC 7517 Appendix A.2 with `kid` `1` and `alg`
/// `ES256`.
pub fn sample_ec_jwk_json() -> String {
    json!({
        "kty": "EC",
        "kid": "1",
        "alg": "ES256",
        "crv": "P-256",
        "x": "MKBCTNIcKUSDii11ySs3526iDZ8AiTo7Tu6KPAqv7D4",
        "y": "4Etl6SRW2YiLUrN5vfvVHuhp7x8PxltmWWlbbM4IFyM",
        "d": "870MB6gfuTJ4HtUnUvYMyJpr5eUZNP4Bk43bVdj3eAE",
    })
    .to_string()
}

/// Private Ed25519 key from RFC 8037 Appendix A.1. Carries no `kid` or
/// `alg`.
pub fn sample_okp_jwk_json() -> String {
    json!({
        "kty": "OKP",
        "crv": "Ed25519",
        "d": "nWGxne_9WmC6hEr0kuwsxERJxWl7MmkZcDusAxyuf2A",
        "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo",
    })
    .to_string()
}

/// Builds the public Ed25519 key of RFC 8037 Appendix A.1 as a [`RawJwk`]
/// with the given `kid` and `alg` `EdDSA`.
pub fn raw_okp_key(kid: &str) -> RawJwk {
    let mut raw = RawJwk::new(KeyParams::Okp(OkpParams {
        crv: "Ed25519".to_owned(),
        x: "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo".to_owned(),
        d: None,
    }));
    raw.kid = Some(kid.to_owned());
    raw.alg = Some("EdDSA".to_owned());
    raw
}

/// Returns `true` if `kid` is non-empty and only contains word characters
/// and hyphens (`^[\w-]+$`).
pub fn is_valid_kid(kid: &str) -> bool {
    !kid.is_empty() && kid.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Asserts that a [`Result<T, KeyStoreError>`](crate::KeyStoreResult) is an
/// `Err` matching the given [`KeyStoreError`](crate::KeyStoreError) variant.
///
/// # Examples
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use inferadb_common_keystore::{KeyStoreError, assert_keystore_error};
///
/// let result: Result<(), KeyStoreError> = Err(KeyStoreError::unsupported_curve("X25519"));
/// assert_keystore_error!(result, UnsupportedCurve);
/// ```
#[macro_export]
macro_rules! assert_keystore_error {
    ($result:expr, $variant:ident) => {
        assert!(
            matches!($result, Err($crate::KeyStoreError::$variant { .. })),
            "expected KeyStoreError::{}, got: {:?}",
            stringify!($variant),
            $result,
        );
    };
    ($result:expr, $variant:ident, $msg:expr) => {
        assert!(
            matches!($result, Err($crate::KeyStoreError::$variant { .. })),
            "{}: expected KeyStoreError::{}, got: {:?}",
            $msg,
            stringify!($variant),
            $result,
        );
    };
}
