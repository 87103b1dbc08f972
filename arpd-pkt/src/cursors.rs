use crate::{Buf, PktBuf, PktBufMut};

/// A read-only window into a frame.
///
/// The window is kept as a pair of offsets into the borrowed frame, so moving back
/// over bytes that were already consumed never leaves the original slice.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    start: usize,
    end: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor positioned at the first byte of `buf`.
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        Cursor {
            buf,
            start: 0,
            end: buf.len(),
        }
    }

    /// The frame from its first byte up to the end of the current window.
    #[inline]
    pub fn buf(&self) -> &'a [u8] {
        &self.buf[..self.end]
    }

    /// Number of bytes consumed so far.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.start
    }
}

impl<'a> Buf for Cursor<'a> {
    #[inline]
    fn remaining(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    fn chunk(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    #[inline]
    fn advance(&mut self, cnt: usize) {
        assert!(cnt <= self.remaining());
        self.start += cnt;
    }
}

impl<'a> PktBuf for Cursor<'a> {
    #[inline]
    fn move_back(&mut self, cnt: usize) {
        assert!(cnt <= self.start);
        self.start -= cnt;
    }

    #[inline]
    fn trim_off(&mut self, cnt: usize) {
        assert!(cnt <= self.remaining());
        self.end -= cnt;
    }
}

/// A mutable window into a frame, used to rewrite headers in place.
#[derive(Debug)]
pub struct CursorMut<'a> {
    buf: &'a mut [u8],
    start: usize,
    end: usize,
}

impl<'a> CursorMut<'a> {
    /// Create a cursor positioned at the first byte of `buf`.
    #[inline]
    pub fn new(buf: &'a mut [u8]) -> Self {
        let end = buf.len();
        CursorMut { buf, start: 0, end }
    }

    /// The frame from its first byte up to the end of the current window.
    #[inline]
    pub fn buf(&self) -> &[u8] {
        &self.buf[..self.end]
    }

    /// Number of bytes consumed so far.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.start
    }
}

impl<'a> Buf for CursorMut<'a> {
    #[inline]
    fn remaining(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    fn chunk(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    #[inline]
    fn advance(&mut self, cnt: usize) {
        assert!(cnt <= self.remaining());
        self.start += cnt;
    }
}

impl<'a> PktBuf for CursorMut<'a> {
    #[inline]
    fn move_back(&mut self, cnt: usize) {
        assert!(cnt <= self.start);
        self.start -= cnt;
    }

    #[inline]
    fn trim_off(&mut self, cnt: usize) {
        assert!(cnt <= self.remaining());
        self.end -= cnt;
    }
}

impl<'a> PktBufMut for CursorMut<'a> {
    #[inline]
    fn chunk_headroom(&self) -> usize {
        self.start
    }

    #[inline]
    fn chunk_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.start..self.end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_advance_and_move_back() {
        let b = [10; 100];
        for c_pos in 0..101 {
            let mut cursor = Cursor::new(&b[..]);
            cursor.advance(c_pos);

            assert_eq!(cursor.cursor(), c_pos);
            assert_eq!(cursor.buf(), &b[..]);
            assert_eq!(cursor.remaining(), 100 - c_pos);
            assert_eq!(cursor.chunk(), &b[c_pos..]);

            cursor.move_back(c_pos);
            assert_eq!(cursor.cursor(), 0);
            assert_eq!(cursor.chunk(), &b[..]);
        }
    }

    #[test]
    fn cursor_trim_off() {
        let b = [10; 100];
        let n = 30;
        for cut in 0..(100 - n + 1) {
            let mut cursor = Cursor::new(&b[..]);
            cursor.advance(n);
            cursor.trim_off(cut);

            assert_eq!(cursor.remaining(), 100 - n - cut);
            assert_eq!(cursor.buf(), &b[..(100 - cut)]);
        }
    }

    #[test]
    #[should_panic]
    fn cursor_move_back_past_start() {
        let b = [0; 16];
        let mut cursor = Cursor::new(&b[..]);
        cursor.advance(4);
        cursor.move_back(5);
    }

    #[test]
    fn cursor_mut_headroom_tracks_position() {
        let mut b = [0u8; 64];
        let mut cursor = CursorMut::new(&mut b[..]);
        cursor.advance(42);
        assert_eq!(cursor.chunk_headroom(), 42);

        cursor.move_back(28);
        assert_eq!(cursor.chunk_headroom(), 14);
        cursor.chunk_mut()[0] = 0xab;
        assert_eq!(cursor.buf()[14], 0xab);
        assert_eq!(cursor.remaining(), 50);
        drop(cursor);
        assert_eq!(b[14], 0xab);
    }
}
