//! SRTP key derivation function (RFC 3711 §4.3).

use zeroize::{Zeroize, Zeroizing};

use crate::counter::apply_keystream;
use crate::engine::Engine;
use crate::policy::EncryptionKind;

pub(crate) const LABEL_ENCRYPTION: u8 = 0x00;
pub(crate) const LABEL_AUTHENTICATION: u8 = 0x01;
pub(crate) const LABEL_SALT: u8 = 0x02;

/// Derive `out_len` bytes of session sub-key material for `label`, using
/// the counter-mode keystream generator keyed with the master key.
///
/// `master_key`/`master_salt` are the caller's still-unzeroized master
/// material; `kdr` is the key derivation rate (`0` means "derive once",
/// in which case `index` is ignored).
pub(crate) fn derive(
    kind: EncryptionKind,
    master_key: &[u8],
    master_salt: &[u8],
    kdr: u64,
    index: u64,
    label: u8,
    out_len: usize,
) -> Zeroizing<Vec<u8>> {
    let key_id: u64 = if kdr == 0 {
        (label as u64) << 48
    } else {
        ((label as u64) << 48) | (index / kdr)
    };

    // 16-byte IV: salt[0..7] unchanged, salt[7..14] XOR'd with key_id's low
    // 48 bits (big-endian, one byte per shift), salt[14..16] are zero.
    let mut iv = [0u8; 16];
    iv[..7].copy_from_slice(&master_salt[..7]);
    for i in 7..14 {
        let shift = 8 * (13 - i);
        iv[i] = master_salt[i] ^ (((key_id >> shift) & 0xff) as u8);
    }

    let mut engine_key = Zeroizing::new(master_key.to_vec());
    // The master key cipher is only ever AES-CM/Twofish-CM shaped for the
    // purpose of key derivation: RFC 3711 §4.3 always derives with the
    // counter-mode keystream regardless of which transform the policy
    // ultimately selects for the payload, so the engine kind only needs to
    // pick the right key-size branch, not the right IV-formation branch.
    let kind = match kind {
        EncryptionKind::TwofishCm | EncryptionKind::TwofishF8 => EncryptionKind::TwofishCm,
        _ => EncryptionKind::AesCm,
    };
    let engine = Engine::new(kind, &engine_key).expect("key-derivation engine key length mismatch");
    engine_key.zeroize();

    let mut out = Zeroizing::new(vec![0u8; out_len]);
    apply_keystream(&engine, &iv, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 3711 Appendix B.3 key derivation test vectors.
    const MASTER_KEY: [u8; 16] = [
        0xE1, 0xF9, 0x7A, 0x0D, 0x3E, 0x01, 0x8B, 0xE0, 0xD6, 0x4F, 0xA3, 0x2C, 0x06, 0xDE, 0x41,
        0x39,
    ];
    const MASTER_SALT: [u8; 14] = [
        0x0E, 0xC6, 0x75, 0xAD, 0x49, 0x8A, 0xFE, 0xEB, 0xB6, 0x96, 0x0B, 0x3A, 0xAB, 0xE6,
    ];

    #[test]
    fn session_encryption_key_matches_rfc3711() {
        let key = derive(
            EncryptionKind::AesCm,
            &MASTER_KEY,
            &MASTER_SALT,
            0,
            0,
            LABEL_ENCRYPTION,
            16,
        );
        assert_eq!(
            &key[..],
            &[
                0xC6, 0x1E, 0x7A, 0x93, 0x74, 0x4F, 0x39, 0xEE, 0x10, 0x73, 0x4A, 0xFE, 0x3F,
                0xF7, 0xA0, 0x87,
            ]
        );
    }

    #[test]
    fn session_salt_matches_rfc3711() {
        let salt = derive(
            EncryptionKind::AesCm,
            &MASTER_KEY,
            &MASTER_SALT,
            0,
            0,
            LABEL_SALT,
            14,
        );
        assert_eq!(
            &salt[..],
            &[
                0x30, 0xCB, 0xBC, 0x08, 0x86, 0x3D, 0x8C, 0x85, 0xD4, 0x9D, 0xB3, 0x4A, 0x9A, 0xE1,
            ]
        );
    }

    #[test]
    fn session_auth_key_matches_rfc3711() {
        let auth_key = derive(
            EncryptionKind::AesCm,
            &MASTER_KEY,
            &MASTER_SALT,
            0,
            0,
            LABEL_AUTHENTICATION,
            20,
        );
        assert_eq!(
            &auth_key[..],
            &[
                0xCE, 0xBE, 0x32, 0x1F, 0x6F, 0xF7, 0x71, 0x6B, 0x6F, 0xD4, 0xAB, 0x49, 0xAF,
                0x25, 0x6A, 0x15, 0x6D, 0x38, 0xBA, 0xA4,
            ]
        );
    }

    #[test]
    fn different_labels_derive_different_keys() {
        let enc = derive(
            EncryptionKind::AesCm,
            &MASTER_KEY,
            &MASTER_SALT,
            0,
            0,
            LABEL_ENCRYPTION,
            16,
        );
        let auth = derive(
            EncryptionKind::AesCm,
            &MASTER_KEY,
            &MASTER_SALT,
            0,
            0,
            LABEL_AUTHENTICATION,
            16,
        );
        assert_ne!(&enc[..], &auth[..]);
    }

    #[test]
    fn nonzero_kdr_changes_output_across_indices() {
        let k0 = derive(
            EncryptionKind::AesCm,
            &MASTER_KEY,
            &MASTER_SALT,
            1,
            0,
            LABEL_ENCRYPTION,
            16,
        );
        let k1 = derive(
            EncryptionKind::AesCm,
            &MASTER_KEY,
            &MASTER_SALT,
            1,
            1,
            LABEL_ENCRYPTION,
            16,
        );
        assert_ne!(&k0[..], &k1[..]);
    }
}
