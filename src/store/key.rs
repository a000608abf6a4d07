use std::fmt;

use argon2::{Algorithm, Argon2, Params, Version};
use secrecy::{ExposeSecret, SecretString};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::StoreError;

pub const KEY_LEN: usize = 32;

/// Application-embedded salt. Changing it invalidates every existing store.
const STORE_SALT: &[u8] = b"hkpass/store-key/v1";

/// Symmetric store key. Zeroized on drop, never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct StoreKey([u8; KEY_LEN]);

impl StoreKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoreKey([REDACTED])")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KdfParams {
    pub m_cost: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            m_cost: 65536, // 64 MB
            t_cost: 3,
            p_cost: 4,
        }
    }
}

/// Turns a passphrase into a [`StoreKey`] with Argon2id and the fixed salt.
///
/// Stores only open with the parameters they were created with, so production
/// code always uses `KeyDeriver::default()`.
#[derive(Clone, Debug, Default)]
pub struct KeyDeriver {
    params: KdfParams,
}

impl KeyDeriver {
    pub fn new(params: KdfParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    pub fn derive(&self, passphrase: &SecretString) -> Result<StoreKey, StoreError> {
        let passphrase = passphrase.expose_secret();
        if passphrase.is_empty() {
            return Err(StoreError::InvalidInput(
                "store password must not be empty".into(),
            ));
        }

        let params = Params::new(
            self.params.m_cost,
            self.params.t_cost,
            self.params.p_cost,
            Some(KEY_LEN),
        )
        .map_err(|e| StoreError::KeyDerivation(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = StoreKey([0u8; KEY_LEN]);
        argon2
            .hash_password_into(passphrase.as_bytes(), STORE_SALT, &mut key.0)
            .map_err(|e| StoreError::KeyDerivation(e.to_string()))?;

        Ok(key)
    }
}

#[cfg(test)]
pub(crate) fn test_deriver() -> KeyDeriver {
    // Very low cost for fast tests
    KeyDeriver::new(KdfParams {
        m_cost: 1024,
        t_cost: 1,
        p_cost: 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string())
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let deriver = test_deriver();
        let a = deriver.derive(&secret("correct horse")).unwrap();
        let b = deriver.derive(&secret("correct horse")).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_different_passphrases_give_different_keys() {
        let deriver = test_deriver();
        let passphrases = ["pw1", "pw2", "PW1", "pw1 ", "a much longer passphrase"];
        let keys: Vec<StoreKey> = passphrases
            .iter()
            .map(|p| deriver.derive(&secret(p)).unwrap())
            .collect();
        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                assert_ne!(keys[i].as_bytes(), keys[j].as_bytes(), "{:?} vs {:?}", passphrases[i], passphrases[j]);
            }
        }
    }

    #[test]
    fn test_params_change_the_key() {
        let cheap = test_deriver().derive(&secret("pw")).unwrap();
        let other = KeyDeriver::new(KdfParams {
            m_cost: 2048,
            t_cost: 1,
            p_cost: 1,
        })
        .derive(&secret("pw"))
        .unwrap();
        assert_ne!(cheap.as_bytes(), other.as_bytes());
    }

    #[test]
    fn test_empty_passphrase_rejected() {
        let err = test_deriver().derive(&secret("")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[test]
    fn test_invalid_params_reported() {
        let deriver = KeyDeriver::new(KdfParams {
            m_cost: 1,
            t_cost: 1,
            p_cost: 1,
        });
        let err = deriver.derive(&secret("pw")).unwrap_err();
        assert!(matches!(err, StoreError::KeyDerivation(_)));
    }

    #[test]
    fn test_default_params() {
        let params = KeyDeriver::default().params().clone();
        assert_eq!(params.m_cost, 65536);
        assert_eq!(params.t_cost, 3);
        assert_eq!(params.p_cost, 4);
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let key = StoreKey::from_bytes([0xAB; KEY_LEN]);
        assert_eq!(format!("{:?}", key), "StoreKey([REDACTED])");
    }
}
