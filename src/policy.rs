//! Immutable description of the algorithm choices and key/tag lengths for
//! one direction of one SSRC. See RFC 3711 §8.2 ("crypto suites").

/// Confidentiality transform. `None` leaves the payload in the clear, which
/// RFC 3711 permits (e.g. for policies that only want integrity).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum EncryptionKind {
    #[default]
    None,
    AesCm,
    AesF8,
    TwofishCm,
    TwofishF8,
}

/// Integrity transform.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthenticationKind {
    #[default]
    None,
    HmacSha1,
    SkeinMac,
}

/// Algorithm selectors and lengths for a `CryptoContext`. Shared, read-only,
/// and never mutated once a context exists.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Policy {
    pub encryption: EncryptionKind,
    pub authentication: AuthenticationKind,
    /// Session encryption key length in bytes. 16 for AES-128/Twofish-128,
    /// 32 for AES-256/Twofish-256. The `twofish` crate this core links
    /// against only implements the 256-bit key schedule, so `TwofishCm`/
    /// `TwofishF8` require `enc_key_length == 32` (see DESIGN.md).
    pub enc_key_length: usize,
    /// Session salt length in bytes. 14 for the CM/F8 profiles this core
    /// implements.
    pub salt_key_length: usize,
    /// Session authentication key length in bytes (20 for HMAC-SHA1 and
    /// Skein-MAC alike, per RFC 3711 §4.2.1).
    pub auth_key_length: usize,
    /// Length, in bytes, that the MAC output is truncated to when appended
    /// to or verified against the wire packet.
    pub auth_tag_length: usize,
}

impl Policy {
    /// The RFC 3711 Appendix B.3 default: AES-128 counter mode with
    /// HMAC-SHA1-80 (10-byte tag).
    pub fn aes_cm_hmac_sha1_80() -> Self {
        Policy {
            encryption: EncryptionKind::AesCm,
            authentication: AuthenticationKind::HmacSha1,
            enc_key_length: 16,
            salt_key_length: 14,
            auth_key_length: 20,
            auth_tag_length: 10,
        }
    }
}
