//! SRTP F8-mode keystream (RFC 3711 §4.1.2), used by the AES-F8/Twofish-F8
//! encryption kinds.

use crate::engine::{Block, Engine};

/// Build the F8 masked key `m = k_e XOR (k_s padded with 0x55 to len(k_e))`.
/// This is the key used to construct the *inner* cipher instance; it only
/// needs to be computed once, at key derivation time, since it depends only
/// on session material that is fixed for the context's lifetime.
pub(crate) fn masked_key(session_encryption_key: &[u8], session_salt: &[u8]) -> Vec<u8> {
    let mut m = vec![0x55u8; session_encryption_key.len()];
    m[..session_salt.len()].copy_from_slice(session_salt);
    for (b, k) in m.iter_mut().zip(session_encryption_key.iter()) {
        *b ^= k;
    }
    m
}

/// XOR `dst.len()` bytes of F8-mode keystream into `dst`.
///
/// `outer` is keyed with the session encryption key and drives the actual
/// stream; `inner` is keyed with the masked key (`masked_key` above) and is
/// used once per call to mask this packet's IV (RFC 3711 §4.1.2.2: `IV' =
/// E(m, IV_F8)`, then `S(j) = E(k_e, IV' ^ S(j-1) ^ j)` with `S(-1) = 0`).
pub(crate) fn apply_keystream(outer: &Engine, inner: &Engine, iv_f8: &[u8; 16], dst: &mut [u8]) {
    let mut masked_iv = Block::clone_from_slice(iv_f8);
    inner.encrypt_block(&mut masked_iv);

    let mut prev_block = [0u8; 16];
    let mut counter: u32 = 0;

    for chunk in dst.chunks_mut(16) {
        let counter_bytes = counter.to_be_bytes();
        let mut block = [0u8; 16];
        for i in 0..16 {
            let counter_byte = if i < 12 { 0 } else { counter_bytes[i - 12] };
            block[i] = masked_iv[i] ^ prev_block[i] ^ counter_byte;
        }
        let mut block = Block::clone_from_slice(&block);
        outer.encrypt_block(&mut block);

        for (b, k) in chunk.iter_mut().zip(block.iter()) {
            *b ^= k;
        }

        prev_block.copy_from_slice(&block);
        counter = counter.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::EncryptionKind;

    #[test]
    fn masked_key_pads_salt_with_0x55_then_xors_with_enc_key() {
        let enc_key = [0u8; 16];
        let salt = [0u8; 14];
        let m = masked_key(&enc_key, &salt);
        assert_eq!(&m[..14], &[0u8; 14][..]);
        assert_eq!(&m[14..], &[0x55, 0x55]);
    }

    #[test]
    fn xor_is_its_own_inverse() {
        let outer = Engine::new(EncryptionKind::AesF8, &[0x11; 16]).unwrap();
        let inner = Engine::new(EncryptionKind::AesF8, &[0x22; 16]).unwrap();
        let iv = [0x33; 16];
        let original = b"f8 mode rtp payload here!!".to_vec();

        let mut buf = original.clone();
        apply_keystream(&outer, &inner, &iv, &mut buf);
        assert_ne!(buf, original);
        apply_keystream(&outer, &inner, &iv, &mut buf);
        assert_eq!(buf, original);
    }

    #[test]
    fn different_inner_keys_change_the_stream() {
        let outer = Engine::new(EncryptionKind::AesF8, &[0x11; 16]).unwrap();
        let inner_a = Engine::new(EncryptionKind::AesF8, &[0x22; 16]).unwrap();
        let inner_b = Engine::new(EncryptionKind::AesF8, &[0x23; 16]).unwrap();
        let iv = [0x33; 16];

        let mut buf_a = [0u8; 16];
        apply_keystream(&outer, &inner_a, &iv, &mut buf_a);
        let mut buf_b = [0u8; 16];
        apply_keystream(&outer, &inner_b, &iv, &mut buf_b);
        assert_ne!(buf_a, buf_b);
    }
}
