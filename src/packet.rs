//! Concrete realization of §6's "packet buffer interface": a growable byte
//! buffer with the handful of operations `protect`/`unprotect` need
//! (`append`, `shrink`, `read_region_to_buf`), backed by `bytes::BytesMut`
//! exactly as the teacher's `Context::encrypt_rtp`/`decrypt_rtp` operate on
//! `Bytes`/`BytesMut` rather than a raw `Vec<u8>`.

use bytes::BytesMut;

/// An RTP packet buffer: header and payload, plus room to grow for the
/// authentication tag `protect` appends.
#[derive(Debug, Clone)]
pub struct Packet {
    buf: BytesMut,
}

impl Packet {
    pub fn new(bytes: impl Into<BytesMut>) -> Self {
        Packet { buf: bytes.into() }
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buf
    }

    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Extend the logical length by `src.len()`.
    pub fn append(&mut self, src: &[u8]) {
        self.buf.extend_from_slice(src);
    }

    /// Reduce the logical length by `n` bytes, dropping them from the tail.
    pub fn shrink(&mut self, n: usize) {
        let new_len = self.buf.len().saturating_sub(n);
        self.buf.truncate(new_len);
    }

    /// Copy `n` bytes starting at `at` into `dst`, which must be at least
    /// `n` bytes long.
    pub fn read_region_to_buf(&self, at: usize, n: usize, dst: &mut [u8]) {
        dst[..n].copy_from_slice(&self.buf[at..at + n]);
    }

    pub fn into_bytes_mut(self) -> BytesMut {
        self.buf
    }
}

impl From<Vec<u8>> for Packet {
    fn from(v: Vec<u8>) -> Self {
        Packet::new(BytesMut::from(&v[..]))
    }
}
