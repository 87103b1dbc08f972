pub use bytes::Buf;

/// A [`Buf`] whose read position can also move backwards and whose tail can be cut.
pub trait PktBuf: Buf {
    /// Move the read position back by `cnt` bytes.
    ///
    /// # Panics
    /// Panics if `cnt` exceeds the number of bytes already consumed.
    fn move_back(&mut self, cnt: usize);

    /// Remove `cnt` trailing bytes.
    ///
    /// # Panics
    /// Panics if `cnt` exceeds the remaining length.
    fn trim_off(&mut self, cnt: usize);
}

/// A [`PktBuf`] whose bytes can be rewritten in place.
pub trait PktBufMut: PktBuf {
    /// Number of bytes in front of the current read position.
    fn chunk_headroom(&self) -> usize;

    /// The remaining bytes, mutably.
    fn chunk_mut(&mut self) -> &mut [u8];
}
