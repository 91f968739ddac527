use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by context construction and key derivation.
///
/// Replay rejection and authentication failure on receive are not part of
/// this enum: per RFC 3711 they are silent, recoverable outcomes reported
/// as `Ok(false)` from [`crate::context::CryptoContext::unprotect`], not raised.
#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("SRTP master key must be {0} bytes, got {1}")]
    MasterKeyLength(usize, usize),
    #[error("SRTP master salt must be {0} bytes, got {1}")]
    MasterSaltLength(usize, usize),
    #[error("policy names an unsupported encryption kind")]
    UnsupportedEncryption,
    #[error("policy names an unsupported authentication kind")]
    UnsupportedAuthentication,
    #[error("packet is too short to hold an RTP header and the configured auth tag")]
    PacketTooShort,
    #[error("context used before derive_srtp_keys was called")]
    ContextNotReady,
    #[error("{0}")]
    Rtp(#[from] util::Error),
}
