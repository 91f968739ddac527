//! The per-SSRC, per-direction SRTP cryptographic context (§4.7-4.8):
//! owns master/session key material, the rollover-counter index, the
//! replay window, and the cipher/MAC instances, and exposes `protect`/
//! `unprotect`. Collapsed from the teacher's multi-SSRC `Context` (a
//! `HashMap<u32, SrtpSsrcState>` behind one shared cipher) down to a single
//! SSRC's worth of that same state, grounded on `context/srtp.rs`'s
//! `encrypt_rtp_with_header`/`decrypt_rtp_with_header` shape.

use rtp::header::Header;
use subtle::ConstantTimeEq;
use util::marshal::{MarshalSize, Unmarshal};
use zeroize::{Zeroize, Zeroizing};

use crate::counter;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::f8;
use crate::index::{self, Guess};
use crate::key_derivation::{self, LABEL_AUTHENTICATION, LABEL_ENCRYPTION, LABEL_SALT};
use crate::mac::MacAdapter;
use crate::packet::Packet;
use crate::policy::{EncryptionKind, Policy};
use crate::replay::{ReplayCheck, ReplayWindow};

/// Session key material and keyed primitives produced by `derive_srtp_keys`.
/// `None` while the context is Fresh (§4.8).
struct SessionKeys {
    engine: Option<Engine>,
    f8_inner: Option<Engine>,
    mac: MacAdapter,
    session_salt: Zeroizing<Vec<u8>>,
}

/// One direction of one RTP SSRC. See §3/§4.7.
pub struct CryptoContext {
    ssrc: u32,
    policy: Policy,
    roc: u32,
    s_l: Option<u16>,
    kdr: u64,
    replay: ReplayWindow,
    master_key: Zeroizing<Vec<u8>>,
    master_salt: Zeroizing<Vec<u8>>,
    keys: Option<SessionKeys>,
}

impl CryptoContext {
    /// Construct a Fresh context. `master_key`/`master_salt` are copied in,
    /// not aliased; the caller must follow with `derive_srtp_keys` before
    /// `protect`/`unprotect` (§4.8).
    pub fn new(
        ssrc: u32,
        roc: u32,
        kdr: u64,
        master_key: &[u8],
        master_salt: &[u8],
        policy: Policy,
    ) -> Result<Self> {
        if master_key.len() != policy.enc_key_length {
            return Err(Error::MasterKeyLength(policy.enc_key_length, master_key.len()));
        }
        if master_salt.len() != policy.salt_key_length {
            return Err(Error::MasterSaltLength(policy.salt_key_length, master_salt.len()));
        }

        Ok(CryptoContext {
            ssrc,
            policy,
            roc,
            s_l: None,
            kdr,
            replay: ReplayWindow::default(),
            master_key: Zeroizing::new(master_key.to_vec()),
            master_salt: Zeroizing::new(master_salt.to_vec()),
            keys: None,
        })
    }

    /// Fork a new Fresh context for a different SSRC, sharing this
    /// context's master material (§4.7/§4.8). Must be called before this
    /// context's own `derive_srtp_keys`, since that call zeroizes the
    /// master key/salt this fork would otherwise copy — a documented
    /// precondition, not a guarded one (see DESIGN.md).
    pub fn derive_context(&self, ssrc: u32, roc: u32, kdr: u64) -> Result<Self> {
        Self::new(ssrc, roc, kdr, &self.master_key, &self.master_salt, self.policy)
    }

    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    pub fn roc(&self) -> u32 {
        self.roc
    }

    pub fn set_roc(&mut self, roc: u32) {
        self.roc = roc;
    }

    pub fn auth_tag_length(&self) -> usize {
        self.policy.auth_tag_length
    }

    /// MKI is not implemented by this core; the field is reserved (§6).
    pub fn mki_length(&self) -> usize {
        0
    }

    fn session_keys(&self) -> &SessionKeys {
        self.keys
            .as_ref()
            .expect("CryptoContext used before derive_srtp_keys (see MisuseInFreshState, §7)")
    }

    /// Derive session encryption/authentication/salt keys from the master
    /// material at `index` (RFC 3711 §4.3), transitioning Fresh → Ready, and
    /// zeroize the stored master key/salt (§4.6). Idempotent: calling it
    /// again is safe (it simply re-derives from the now-zeroed master
    /// material), but only the first call's derived keys are meaningful —
    /// see `derive_context`'s precondition for forking a sibling context
    /// before this call destroys the shared master material.
    pub fn derive_srtp_keys(&mut self, index: u64) -> Result<()> {
        let encryption = match self.policy.encryption {
            EncryptionKind::TwofishCm | EncryptionKind::TwofishF8 => EncryptionKind::TwofishCm,
            _ => EncryptionKind::AesCm,
        };

        let session_encryption_key = key_derivation::derive(
            encryption,
            &self.master_key,
            &self.master_salt,
            self.kdr,
            index,
            LABEL_ENCRYPTION,
            self.policy.enc_key_length,
        );
        let session_auth_key = key_derivation::derive(
            encryption,
            &self.master_key,
            &self.master_salt,
            self.kdr,
            index,
            LABEL_AUTHENTICATION,
            self.policy.auth_key_length,
        );
        let session_salt = key_derivation::derive(
            encryption,
            &self.master_key,
            &self.master_salt,
            self.kdr,
            index,
            LABEL_SALT,
            self.policy.salt_key_length,
        );

        log::debug!("derived SRTP session keys for ssrc {} at index {}", self.ssrc, index);

        let engine = match self.policy.encryption {
            EncryptionKind::None => None,
            kind => Some(Engine::new(kind, &session_encryption_key)?),
        };
        let f8_inner = match self.policy.encryption {
            EncryptionKind::AesF8 | EncryptionKind::TwofishF8 => {
                let m = f8::masked_key(&session_encryption_key, &session_salt);
                Some(Engine::new(self.policy.encryption, &m)?)
            }
            _ => None,
        };
        let mac = MacAdapter::new(self.policy.authentication, &session_auth_key, self.policy.auth_tag_length);

        self.keys = Some(SessionKeys {
            engine,
            f8_inner,
            mac,
            session_salt,
        });

        self.master_key.as_mut_slice().zeroize();
        self.master_salt.as_mut_slice().zeroize();

        Ok(())
    }

    fn cm_iv(&self, roc: u32, seq: u16, salt: &[u8]) -> [u8; 16] {
        let mut iv = [0u8; 16];
        iv[4..8].copy_from_slice(&self.ssrc.to_be_bytes());
        iv[8..12].copy_from_slice(&roc.to_be_bytes());
        iv[12..14].copy_from_slice(&seq.to_be_bytes());
        for (b, s) in iv.iter_mut().zip(salt.iter()) {
            *b ^= s;
        }
        iv
    }

    fn f8_iv(&self, header_bytes: &[u8], roc: u32) -> [u8; 16] {
        let mut iv = [0u8; 16];
        iv[..12].copy_from_slice(&header_bytes[..12]);
        iv[0] = 0x00;
        iv[12..16].copy_from_slice(&roc.to_be_bytes());
        iv
    }

    /// True only for the policies whose cipher actually needs the first 12
    /// raw header bytes (the F8 IV, RFC 3711 §4.1.2.2); every other policy
    /// never touches them.
    fn needs_header_prefix(&self) -> bool {
        matches!(self.policy.encryption, EncryptionKind::AesF8 | EncryptionKind::TwofishF8)
    }

    fn apply_cipher(&self, roc: u32, seq: u16, header_bytes: Option<&[u8; 12]>, payload: &mut [u8]) {
        let keys = self.session_keys();
        match (self.policy.encryption, &keys.engine) {
            (EncryptionKind::None, _) | (_, None) => {}
            (EncryptionKind::AesCm | EncryptionKind::TwofishCm, Some(engine)) => {
                let iv = self.cm_iv(roc, seq, &keys.session_salt);
                counter::apply_keystream(engine, &iv, payload);
            }
            (EncryptionKind::AesF8 | EncryptionKind::TwofishF8, Some(outer)) => {
                let inner = keys.f8_inner.as_ref().expect("F8 policy always derives an inner engine");
                let header_bytes = header_bytes.expect("F8 policy always supplies the header prefix");
                let iv = self.f8_iv(header_bytes, roc);
                f8::apply_keystream(outer, inner, &iv, payload);
            }
        }
    }

    /// Encrypt `packet` in place and append the authentication tag (§4.7).
    pub fn protect(&mut self, packet: &mut Packet) -> Result<()> {
        let header = parse_header(packet)?;
        let header_len = header.marshal_size();
        // Read the first 12 bytes straight off the wire rather than
        // re-marshaling the parsed `Header`: `Header::marshal_to` errors
        // into a fixed 12-byte buffer whenever the header carries CSRC
        // entries or an extension (marshal_size() > 12), which is ordinary,
        // legal RTP — and most policies never need these bytes at all.
        let header_bytes = if self.needs_header_prefix() {
            let mut buf = [0u8; 12];
            buf.copy_from_slice(&packet.buffer()[..12]);
            Some(buf)
        } else {
            None
        };

        {
            let payload = &mut packet.buffer_mut()[header_len..];
            self.apply_cipher(self.roc, header.sequence_number, header_bytes.as_ref(), payload);
        }

        let keys = self.session_keys();
        if !matches!(self.policy.authentication, crate::policy::AuthenticationKind::None) {
            let tag = keys.mac.compute(packet.buffer(), self.roc);
            packet.append(&tag[..self.policy.auth_tag_length]);
        }

        if header.sequence_number == 0xFFFF {
            self.roc = self.roc.wrapping_add(1);
        }

        Ok(())
    }

    /// Decrypt and authenticate `packet` in place. Returns `Ok(true)` if
    /// the packet was accepted (and is now plaintext); `Ok(false)` if it
    /// was rejected as a replay or failed authentication, in which case
    /// `packet` and context state are left unchanged (§7).
    pub fn unprotect(&mut self, packet: &mut Packet) -> Result<bool> {
        let header = parse_header(packet)?;
        let header_len = header.marshal_size();
        let header_bytes = if self.needs_header_prefix() {
            let mut buf = [0u8; 12];
            buf.copy_from_slice(&packet.buffer()[..12]);
            Some(buf)
        } else {
            None
        };

        let s = header.sequence_number;
        let stored_index = ((self.roc as u64) << 16) | self.s_l.unwrap_or(s) as u64;
        let Guess { roc: guessed_roc, index: guessed_index } = index::estimate(self.roc, self.s_l, s);

        match self.replay.check(stored_index, guessed_index) {
            ReplayCheck::TooOld | ReplayCheck::Duplicate => {
                log::debug!(
                    "rejected replayed/too-old SRTP packet ssrc {} index {}",
                    self.ssrc, guessed_index
                );
                return Ok(false);
            }
            ReplayCheck::Accept => {}
        }

        let tag_len = self.policy.auth_tag_length;
        let keys = self.session_keys();
        if !matches!(self.policy.authentication, crate::policy::AuthenticationKind::None) {
            if packet.len() < header_len + tag_len {
                return Err(Error::PacketTooShort);
            }
            let mut actual_tag = vec![0u8; tag_len];
            packet.read_region_to_buf(packet.len() - tag_len, tag_len, &mut actual_tag);
            packet.shrink(tag_len);

            let expected_tag = keys.mac.compute(packet.buffer(), guessed_roc);
            if actual_tag.ct_eq(&expected_tag[..tag_len]).unwrap_u8() != 1 {
                log::debug!(
                    "SRTP authentication failed ssrc {} index {}",
                    self.ssrc, guessed_index
                );
                return Ok(false);
            }
        }

        {
            let payload = &mut packet.buffer_mut()[header_len..];
            self.apply_cipher(guessed_roc, s, header_bytes.as_ref(), payload);
        }

        self.replay.update(stored_index, guessed_index);
        // A packet that belongs to an earlier roll-over (guessed_roc < roc)
        // is accepted into the replay window but must not move ROC/s_l
        // forward — doing so on raw numeric sequence comparison alone would
        // let a single late/reordered packet near a roll-over boundary
        // desync the receiver's ROC guess for every packet that follows.
        if guessed_roc >= self.roc {
            if self.s_l.map(|s_l| s > s_l).unwrap_or(true) {
                self.s_l = Some(s);
            }
            if guessed_roc > self.roc {
                self.roc = guessed_roc;
                self.s_l = Some(s);
            }
        }

        Ok(true)
    }
}

fn parse_header(packet: &Packet) -> Result<Header> {
    let mut buf = packet.buffer();
    Ok(Header::unmarshal(&mut buf)?)
}
