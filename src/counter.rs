//! SRTP counter-mode keystream (RFC 3711 §4.1.1), shared by AES-CM/Twofish-CM
//! encryption and by key derivation (§4.3).

use crate::engine::{Block, Engine};

/// XOR `L = dst.len()` bytes of counter-mode keystream into `dst`, using
/// `iv` as the starting 16-byte counter block. Bytes 14-15 of `iv` are the
/// big-endian 16-bit per-block counter; it increments after each 16-byte
/// block and wraps at `0xFFFF -> 0x0000` (RFC 3711 does not define behavior
/// beyond 2^16 blocks, which this transform never reaches for one packet).
///
/// Called with an all-zero `dst` during key derivation, where XOR reduces to
/// assignment, and with the packet payload during `protect`/`unprotect`.
pub(crate) fn apply_keystream(engine: &Engine, iv: &[u8; 16], dst: &mut [u8]) {
    let mut counter = u16::from_be_bytes([iv[14], iv[15]]);
    let mut block_iv = *iv;

    for chunk in dst.chunks_mut(16) {
        block_iv[14..16].copy_from_slice(&counter.to_be_bytes());
        let mut block = Block::clone_from_slice(&block_iv);
        engine.encrypt_block(&mut block);
        for (b, k) in chunk.iter_mut().zip(block.iter()) {
            *b ^= k;
        }
        counter = counter.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::EncryptionKind;

    // RFC 3711 Appendix B.3's exact keystream requires the full CM IV
    // formation (session salt XOR SSRC XOR index); that round trip is
    // exercised in context.rs. Here we only test the block-counter
    // machinery in isolation.

    #[test]
    fn xor_is_its_own_inverse() {
        let engine = Engine::new(EncryptionKind::AesCm, &[0x11; 16]).unwrap();
        let iv = [0x22; 16];
        let original = b"some rtp payload".to_vec();

        let mut buf = original.clone();
        apply_keystream(&engine, &iv, &mut buf);
        assert_ne!(buf, original);
        apply_keystream(&engine, &iv, &mut buf);
        assert_eq!(buf, original);
    }

    #[test]
    fn counter_advances_across_blocks() {
        let engine = Engine::new(EncryptionKind::AesCm, &[0x11; 16]).unwrap();
        let iv = [0u8; 16];

        let mut one_block = [0u8; 16];
        apply_keystream(&engine, &iv, &mut one_block);

        let mut two_blocks = [0u8; 32];
        apply_keystream(&engine, &iv, &mut two_blocks);

        // The first block of a 2-block run must match a 1-block run (same
        // starting counter value), and the second block must differ from
        // the first (the counter incremented).
        assert_eq!(&two_blocks[..16], &one_block[..]);
        assert_ne!(&two_blocks[16..], &two_blocks[..16]);
    }

    #[test]
    fn zero_length_is_noop() {
        let engine = Engine::new(EncryptionKind::AesCm, &[0u8; 16]).unwrap();
        let iv = [0u8; 16];
        let mut buf: [u8; 0] = [];
        apply_keystream(&engine, &iv, &mut buf);
        assert_eq!(buf.len(), 0);
    }
}
