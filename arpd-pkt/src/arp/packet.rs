#![allow(missing_docs)]

use core::ops::Range;

use byteorder::{ByteOrder, NetworkEndian};

use crate::ether::{EtherAddr, EtherType};
use crate::{Buf, Ipv4Addr, PktBuf, PktBufMut};

use super::{Hardware, Operation};

/// Byte length of an Arp message for Ethernet/Ipv4.
pub const ARP_HEADER_LEN: usize = 28;

/// An Ethernet/Ipv4 Arp request with all addresses zeroed.
pub const ARP_HEADER_TEMPLATE: [u8; ARP_HEADER_LEN] = [
    0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

const HARDWARE_TYPE: Range<usize> = 0..2;
const PROTOCOL_TYPE: Range<usize> = 2..4;
const HARDWARE_ADDR_LEN: usize = 4;
const PROTOCOL_ADDR_LEN: usize = 5;
const OPERATION: Range<usize> = 6..8;
const SENDER_ETHER_ADDR: Range<usize> = 8..14;
const SENDER_IPV4_ADDR: Range<usize> = 14..18;
const TARGET_ETHER_ADDR: Range<usize> = 18..24;
const TARGET_IPV4_ADDR: Range<usize> = 24..28;

/// An Arp message over a buffer that holds at least [`ARP_HEADER_LEN`] bytes.
///
/// The address layout is fixed to 6-byte hardware and 4-byte protocol addresses. The
/// length fields in the message are reported as-is but never consulted.
#[derive(Debug, Clone, Copy)]
pub struct ArpPacket<T> {
    buf: T,
}

impl<T: Buf> ArpPacket<T> {
    #[inline]
    pub fn parse_unchecked(buf: T) -> Self {
        Self { buf }
    }

    /// Wrap `buf`, handing it back if it cannot hold a full Arp message.
    #[inline]
    pub fn parse(buf: T) -> Result<Self, T> {
        if buf.chunk().len() < ARP_HEADER_LEN {
            return Err(buf);
        }
        Ok(Self { buf })
    }

    #[inline]
    pub fn buf(&self) -> &T {
        &self.buf
    }

    #[inline]
    pub fn release(self) -> T {
        self.buf
    }

    #[inline]
    pub fn hardware_type(&self) -> Hardware {
        Hardware::from(NetworkEndian::read_u16(&self.buf.chunk()[HARDWARE_TYPE]))
    }

    #[inline]
    pub fn protocol_type(&self) -> EtherType {
        EtherType::from(NetworkEndian::read_u16(&self.buf.chunk()[PROTOCOL_TYPE]))
    }

    #[inline]
    pub fn hardware_addr_len(&self) -> u8 {
        self.buf.chunk()[HARDWARE_ADDR_LEN]
    }

    #[inline]
    pub fn protocol_addr_len(&self) -> u8 {
        self.buf.chunk()[PROTOCOL_ADDR_LEN]
    }

    #[inline]
    pub fn operation(&self) -> Operation {
        Operation::from(NetworkEndian::read_u16(&self.buf.chunk()[OPERATION]))
    }

    #[inline]
    pub fn sender_ether_addr(&self) -> EtherAddr {
        EtherAddr::from_bytes(&self.buf.chunk()[SENDER_ETHER_ADDR])
    }

    #[inline]
    pub fn sender_ipv4_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(NetworkEndian::read_u32(&self.buf.chunk()[SENDER_IPV4_ADDR]))
    }

    #[inline]
    pub fn target_ether_addr(&self) -> EtherAddr {
        EtherAddr::from_bytes(&self.buf.chunk()[TARGET_ETHER_ADDR])
    }

    #[inline]
    pub fn target_ipv4_addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(NetworkEndian::read_u32(&self.buf.chunk()[TARGET_IPV4_ADDR]))
    }
}

impl<T: PktBuf> ArpPacket<T> {
    /// Consume the view and return the buffer positioned after the Arp message.
    ///
    /// On Ethernet this is the padding up to the minimum frame size.
    #[inline]
    pub fn payload(self) -> T {
        let mut buf = self.buf;
        buf.advance(ARP_HEADER_LEN);
        buf
    }
}

impl<T: PktBufMut> ArpPacket<T> {
    /// Write `header` into the headroom in front of `buf`.
    ///
    /// # Panics
    /// Panics if the headroom is shorter than [`ARP_HEADER_LEN`].
    #[inline]
    pub fn prepend_header(mut buf: T, header: &[u8; ARP_HEADER_LEN]) -> Self {
        assert!(buf.chunk_headroom() >= ARP_HEADER_LEN);
        buf.move_back(ARP_HEADER_LEN);
        buf.chunk_mut()[..ARP_HEADER_LEN].copy_from_slice(&header[..]);
        Self { buf }
    }

    #[inline]
    pub fn set_hardware_type(&mut self, value: Hardware) {
        NetworkEndian::write_u16(&mut self.buf.chunk_mut()[HARDWARE_TYPE], u16::from(value));
    }

    #[inline]
    pub fn set_protocol_type(&mut self, value: EtherType) {
        NetworkEndian::write_u16(&mut self.buf.chunk_mut()[PROTOCOL_TYPE], u16::from(value));
    }

    #[inline]
    pub fn set_hardware_addr_len(&mut self, value: u8) {
        self.buf.chunk_mut()[HARDWARE_ADDR_LEN] = value;
    }

    #[inline]
    pub fn set_protocol_addr_len(&mut self, value: u8) {
        self.buf.chunk_mut()[PROTOCOL_ADDR_LEN] = value;
    }

    #[inline]
    pub fn set_operation(&mut self, value: Operation) {
        NetworkEndian::write_u16(&mut self.buf.chunk_mut()[OPERATION], u16::from(value));
    }

    #[inline]
    pub fn set_sender_ether_addr(&mut self, value: EtherAddr) {
        self.buf.chunk_mut()[SENDER_ETHER_ADDR].copy_from_slice(value.as_bytes());
    }

    #[inline]
    pub fn set_sender_ipv4_addr(&mut self, value: Ipv4Addr) {
        self.buf.chunk_mut()[SENDER_IPV4_ADDR].copy_from_slice(&value.octets());
    }

    #[inline]
    pub fn set_target_ether_addr(&mut self, value: EtherAddr) {
        self.buf.chunk_mut()[TARGET_ETHER_ADDR].copy_from_slice(value.as_bytes());
    }

    #[inline]
    pub fn set_target_ipv4_addr(&mut self, value: Ipv4Addr) {
        self.buf.chunk_mut()[TARGET_IPV4_ADDR].copy_from_slice(&value.octets());
    }
}
