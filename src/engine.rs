//! The narrow, closed block-cipher variant the REDESIGN FLAGS call for:
//! `CounterStream` and `F8Stream` only ever need `encrypt_block`, so there is
//! no reason to pay for a `Box<dyn Cipher>` the way the teacher's
//! `cipher::Cipher` trait object does for the whole encrypt/decrypt path.

use aes::cipher::{consts::U16, generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes256};
use twofish::Twofish;

use crate::error::{Error, Result};
use crate::policy::EncryptionKind;

pub(crate) type Block = GenericArray<u8, U16>;

/// A single keyed block cipher instance, one of the three primitives this
/// core supports. `F8Stream` needs two of these (outer + inner); `CM` mode
/// needs one.
#[derive(Clone)]
pub(crate) enum Engine {
    Aes128(Box<Aes128>),
    Aes256(Box<Aes256>),
    Twofish(Box<Twofish>),
}

impl Engine {
    /// Build the engine matching `kind`, keyed with `key`. `key.len()` must
    /// equal the engine's native key size: 16 for AES-128, 32 for AES-256
    /// and for Twofish (the `twofish` crate only implements the 256-bit key
    /// schedule).
    pub(crate) fn new(kind: EncryptionKind, key: &[u8]) -> Result<Self> {
        match (kind, key.len()) {
            (EncryptionKind::AesCm | EncryptionKind::AesF8, 16) => {
                Ok(Engine::Aes128(Box::new(Aes128::new(GenericArray::from_slice(key)))))
            }
            (EncryptionKind::AesCm | EncryptionKind::AesF8, 32) => {
                Ok(Engine::Aes256(Box::new(Aes256::new(GenericArray::from_slice(key)))))
            }
            (EncryptionKind::TwofishCm | EncryptionKind::TwofishF8, 32) => {
                Ok(Engine::Twofish(Box::new(Twofish::new(GenericArray::from_slice(key)))))
            }
            _ => Err(Error::UnsupportedEncryption),
        }
    }

    pub(crate) fn encrypt_block(&self, block: &mut Block) {
        match self {
            Engine::Aes128(c) => c.encrypt_block(block),
            Engine::Aes256(c) => c.encrypt_block(block),
            Engine::Twofish(c) => c.encrypt_block(block),
        }
    }
}
