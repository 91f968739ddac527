//! Uniform MAC wrapper over HMAC-SHA1 and Skein-MAC (§4.3).

use hmac::{Hmac, Mac as HmacMac};
use sha1::Sha1;
use skein::{
    consts::{U10, U16, U20, U32},
    Digest, Skein512,
};

use crate::policy::AuthenticationKind;

type HmacSha1 = Hmac<Sha1>;

const SKEIN_BLOCK_SIZE: usize = 64;

/// A one-shot HMAC construction (RFC 2104) over the `Skein512` digest,
/// generic over the digest's output width `N`.
///
/// `skein`'s config block bakes the output length (in bits) into the
/// chaining state itself (see its `Default` impl), so `Skein512<U10>` is not
/// a prefix of `Skein512<U32>` truncated to 10 bytes — the digest must be
/// parameterized at the tag length the policy actually wants, not a fixed
/// width truncated after the fact.
///
/// The `skein` crate implements Skein-512 only as an unkeyed [`Digest`]; it
/// does not expose Skein's own native keyed UBI mode. Wrapping it in the
/// standard HMAC construction is the only way to turn it into a keyed MAC
/// with the primitives this crate depends on (see DESIGN.md).
#[derive(Clone)]
pub(crate) struct SkeinHmac<N: skein::digest::generic_array::ArrayLength<u8> + 'static> {
    ipad_state: Skein512<N>,
    opad: [u8; SKEIN_BLOCK_SIZE],
}

impl<N: skein::digest::generic_array::ArrayLength<u8> + 'static> SkeinHmac<N> {
    fn new(key: &[u8]) -> Self {
        let mut block_key = [0u8; SKEIN_BLOCK_SIZE];
        if key.len() > SKEIN_BLOCK_SIZE {
            let digested = Skein512::<N>::digest(key);
            let n = digested.len().min(SKEIN_BLOCK_SIZE);
            block_key[..n].copy_from_slice(&digested[..n]);
        } else {
            block_key[..key.len()].copy_from_slice(key);
        }

        let mut ipad = [0u8; SKEIN_BLOCK_SIZE];
        let mut opad = [0u8; SKEIN_BLOCK_SIZE];
        for i in 0..SKEIN_BLOCK_SIZE {
            ipad[i] = block_key[i] ^ 0x36;
            opad[i] = block_key[i] ^ 0x5c;
        }

        let mut ipad_state = Skein512::<N>::new();
        ipad_state.update(ipad);

        SkeinHmac { ipad_state, opad }
    }

    fn update(&mut self, data: &[u8]) {
        self.ipad_state.update(data);
    }

    fn finalize(self) -> Vec<u8> {
        let inner = self.ipad_state.finalize();
        let mut outer = Skein512::<N>::new();
        outer.update(self.opad);
        outer.update(inner);
        outer.finalize().to_vec()
    }
}

/// The concrete Skein-MAC output widths this crate knows how to construct.
/// `policy.auth_tag_length` is a free-form byte count in principle, but a
/// Skein digest's width must be fixed at compile time; these four cover the
/// tag lengths RFC 3711-family crypto suites actually use (80/128/160/256
/// bits). A `Policy` requesting any other length with `SkeinMac` is a
/// construction error the caller must avoid, matching the teacher's own
/// pattern of rejecting unsupported profile combinations up front.
#[derive(Clone)]
pub(crate) enum SkeinVariant {
    Tag10(SkeinHmac<U10>),
    Tag16(SkeinHmac<U16>),
    Tag20(SkeinHmac<U20>),
    Tag32(SkeinHmac<U32>),
}

impl SkeinVariant {
    fn new(tag_len: usize, key: &[u8]) -> Self {
        match tag_len {
            10 => SkeinVariant::Tag10(SkeinHmac::new(key)),
            16 => SkeinVariant::Tag16(SkeinHmac::new(key)),
            20 => SkeinVariant::Tag20(SkeinHmac::new(key)),
            32 => SkeinVariant::Tag32(SkeinHmac::new(key)),
            other => panic!("unsupported Skein-MAC tag length: {other} bytes"),
        }
    }

    fn native_len(&self) -> usize {
        match self {
            SkeinVariant::Tag10(_) => 10,
            SkeinVariant::Tag16(_) => 16,
            SkeinVariant::Tag20(_) => 20,
            SkeinVariant::Tag32(_) => 32,
        }
    }

    fn compute(&self, data: &[u8], roc: u32) -> Vec<u8> {
        match self {
            SkeinVariant::Tag10(template) => {
                let mut signer = template.clone();
                signer.update(data);
                signer.update(&roc.to_be_bytes());
                signer.finalize()
            }
            SkeinVariant::Tag16(template) => {
                let mut signer = template.clone();
                signer.update(data);
                signer.update(&roc.to_be_bytes());
                signer.finalize()
            }
            SkeinVariant::Tag20(template) => {
                let mut signer = template.clone();
                signer.update(data);
                signer.update(&roc.to_be_bytes());
                signer.finalize()
            }
            SkeinVariant::Tag32(template) => {
                let mut signer = template.clone();
                signer.update(data);
                signer.update(&roc.to_be_bytes());
                signer.finalize()
            }
        }
    }
}

/// Closed variant over the two supported MAC transforms, holding a
/// per-packet signer cloned from a keyed template so re-keying the HMAC
/// inner/outer pads once per `derive_srtp_keys` is not repeated per packet.
pub(crate) enum MacAdapter {
    None,
    HmacSha1(HmacSha1),
    Skein(SkeinVariant),
}

impl MacAdapter {
    /// `tag_len` is `policy.auth_tag_length`; for `SkeinMac` it selects which
    /// `Skein512<N>` width is actually constructed (the digest's output
    /// width must match `tag_len` exactly, see `SkeinHmac`'s docs above). It
    /// is unused for `HmacSha1`, whose native width is the fixed 20-byte
    /// SHA-1 output regardless of the configured truncation.
    pub(crate) fn new(kind: AuthenticationKind, key: &[u8], tag_len: usize) -> Self {
        match kind {
            AuthenticationKind::None => MacAdapter::None,
            AuthenticationKind::HmacSha1 => {
                MacAdapter::HmacSha1(HmacSha1::new_from_slice(key).expect("HMAC accepts any key length"))
            }
            AuthenticationKind::SkeinMac => MacAdapter::Skein(SkeinVariant::new(tag_len, key)),
        }
    }

    /// Native (untruncated) output length: 20 for HMAC-SHA1, the
    /// digest-width the Skein variant was constructed with (they coincide
    /// with `policy.auth_tag_length` by construction).
    pub(crate) fn native_len(&self) -> usize {
        match self {
            MacAdapter::None => 0,
            MacAdapter::HmacSha1(_) => 20,
            MacAdapter::Skein(variant) => variant.native_len(),
        }
    }

    /// Compute the MAC over `data` followed by `roc` serialized big-endian,
    /// matching RFC 3711 §4.2's `M = Authenticated Portion || ROC`.
    pub(crate) fn compute(&self, data: &[u8], roc: u32) -> Vec<u8> {
        match self {
            MacAdapter::None => Vec::new(),
            MacAdapter::HmacSha1(template) => {
                let mut signer = template.clone();
                signer.update(data);
                signer.update(&roc.to_be_bytes());
                signer.finalize().into_bytes().to_vec()
            }
            MacAdapter::Skein(variant) => variant.compute(data, roc),
        }
    }
}
