use rand::RngCore;

use crate::config::KeySetConfig;
use crate::error::{CryptoError, Result};
use crate::keyset::{KeySet, KeySetId};

/// Length of the authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = blake3::OUT_LEN;

/// Reference key-set built entirely on BLAKE3.
///
/// Ciphertext layout:
/// ```text
/// [nonce_len bytes: random nonce]
/// [N bytes: plaintext XOR keyed-BLAKE3 XOF(nonce)]
/// [32 bytes: keyed-BLAKE3 MAC over nonce || body]
/// ```
///
/// Encryption and MAC keys are derived from one secret with
/// `blake3::derive_key`, so a secret never keys two roles. A fresh nonce is
/// drawn on every call: encrypting the same plaintext twice never yields the
/// same bytes.
pub struct Blake3KeySet {
    id: KeySetId,
    enc_key: [u8; 32],
    mac_key: [u8; 32],
    nonce_len: usize,
}

impl Blake3KeySet {
    /// Build a key-set from secret material.
    pub fn from_secret(secret: &[u8], config: &KeySetConfig) -> Result<Self> {
        config.validate()?;
        let derive = |role: &str| blake3::derive_key(&format!("{} {role}", config.context), secret);
        Ok(Self {
            id: KeySetId::from_bytes(derive("key-set id")),
            enc_key: derive("encryption"),
            mac_key: derive("authentication"),
            nonce_len: config.nonce_len,
        })
    }

    /// Build a key-set from a fresh random secret.
    pub fn generate(config: &KeySetConfig) -> Result<Self> {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self::from_secret(&secret, config)
    }

    fn apply_keystream(&self, nonce: &[u8], data: &mut [u8]) {
        let mut hasher = blake3::Hasher::new_keyed(&self.enc_key);
        hasher.update(nonce);
        let mut stream = vec![0u8; data.len()];
        hasher.finalize_xof().fill(&mut stream);
        for (byte, key) in data.iter_mut().zip(stream) {
            *byte ^= key;
        }
    }

    fn tag(&self, framed: &[u8]) -> blake3::Hash {
        blake3::keyed_hash(&self.mac_key, framed)
    }
}

impl KeySet for Blake3KeySet {
    fn id(&self) -> KeySetId {
        self.id
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut out = vec![0u8; self.nonce_len];
        rand::thread_rng().fill_bytes(&mut out);
        out.extend_from_slice(plaintext);

        let (nonce, body) = out.split_at_mut(self.nonce_len);
        self.apply_keystream(nonce, body);

        let tag = self.tag(&out);
        out.extend_from_slice(tag.as_bytes());
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let min = self.nonce_len + TAG_LEN;
        if ciphertext.len() < min {
            return Err(CryptoError::Truncated {
                len: ciphertext.len(),
                min,
            });
        }

        let (framed, tag) = ciphertext.split_at(ciphertext.len() - TAG_LEN);
        let tag: [u8; TAG_LEN] = tag.try_into().map_err(|_| CryptoError::Truncated {
            len: ciphertext.len(),
            min,
        })?;
        // blake3::Hash equality is constant time.
        if self.tag(framed) != blake3::Hash::from(tag) {
            return Err(CryptoError::AuthenticationFailed);
        }

        let (nonce, body) = framed.split_at(self.nonce_len);
        let mut plaintext = body.to_vec();
        self.apply_keystream(nonce, &mut plaintext);
        Ok(plaintext)
    }
}

impl std::fmt::Debug for Blake3KeySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Blake3KeySet({}, <redacted>)", self.id.short_hex())
    }
}
