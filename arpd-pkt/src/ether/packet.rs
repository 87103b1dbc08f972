#![allow(missing_docs)]

use core::ops::Range;

use byteorder::{ByteOrder, NetworkEndian};

use crate::ether::{EtherAddr, EtherType};
use crate::{Buf, PktBuf, PktBufMut};

/// Byte length of an Ethernet II header.
pub const ETHER_HEADER_LEN: usize = 14;

/// A zeroed Ethernet II header whose ethertype is Ipv4.
pub const ETHER_HEADER_TEMPLATE: [u8; ETHER_HEADER_LEN] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x08, 0x00,
];

const DST_ADDR: Range<usize> = 0..6;
const SRC_ADDR: Range<usize> = 6..12;
const ETHERTYPE: Range<usize> = 12..14;

/// An Ethernet II frame over a buffer that holds at least [`ETHER_HEADER_LEN`] bytes.
#[derive(Debug, Clone, Copy)]
pub struct EtherPacket<T> {
    buf: T,
}

impl<T: Buf> EtherPacket<T> {
    /// Wrap `buf` without checking its length.
    ///
    /// Accessors panic instead of reading out of bounds if the buffer turns out
    /// to be too short.
    #[inline]
    pub fn parse_unchecked(buf: T) -> Self {
        Self { buf }
    }

    /// Wrap `buf`, handing it back if it cannot hold an Ethernet header.
    #[inline]
    pub fn parse(buf: T) -> Result<Self, T> {
        if buf.chunk().len() < ETHER_HEADER_LEN {
            return Err(buf);
        }
        Ok(Self { buf })
    }

    #[inline]
    pub fn buf(&self) -> &T {
        &self.buf
    }

    /// Give up the view and return the buffer, positioned at the header.
    #[inline]
    pub fn release(self) -> T {
        self.buf
    }

    #[inline]
    pub fn dst_addr(&self) -> EtherAddr {
        EtherAddr::from_bytes(&self.buf.chunk()[DST_ADDR])
    }

    #[inline]
    pub fn src_addr(&self) -> EtherAddr {
        EtherAddr::from_bytes(&self.buf.chunk()[SRC_ADDR])
    }

    #[inline]
    pub fn ethertype(&self) -> EtherType {
        EtherType::from(NetworkEndian::read_u16(&self.buf.chunk()[ETHERTYPE]))
    }
}

impl<T: PktBuf> EtherPacket<T> {
    /// Consume the view and return the buffer positioned at the payload.
    #[inline]
    pub fn payload(self) -> T {
        let mut buf = self.buf;
        buf.advance(ETHER_HEADER_LEN);
        buf
    }
}

impl<T: PktBufMut> EtherPacket<T> {
    /// Write `header` into the headroom in front of `buf`.
    ///
    /// # Panics
    /// Panics if the headroom is shorter than [`ETHER_HEADER_LEN`].
    #[inline]
    pub fn prepend_header(mut buf: T, header: &[u8; ETHER_HEADER_LEN]) -> Self {
        assert!(buf.chunk_headroom() >= ETHER_HEADER_LEN);
        buf.move_back(ETHER_HEADER_LEN);
        buf.chunk_mut()[..ETHER_HEADER_LEN].copy_from_slice(&header[..]);
        Self { buf }
    }

    #[inline]
    pub fn set_dst_addr(&mut self, value: EtherAddr) {
        self.buf.chunk_mut()[DST_ADDR].copy_from_slice(value.as_bytes());
    }

    #[inline]
    pub fn set_src_addr(&mut self, value: EtherAddr) {
        self.buf.chunk_mut()[SRC_ADDR].copy_from_slice(value.as_bytes());
    }

    #[inline]
    pub fn set_ethertype(&mut self, value: EtherType) {
        NetworkEndian::write_u16(&mut self.buf.chunk_mut()[ETHERTYPE], u16::from(value));
    }
}
