use std::fmt;

use arpd_pkt::arp::{ArpPacket, Operation};
use arpd_pkt::ether::{EtherPacket, ETHER_HEADER_LEN};
use arpd_pkt::{CursorMut, PktBuf};
use log::debug;

use crate::Identity;

/// Why a frame was released instead of transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// Shorter than an Ethernet header.
    Truncated,
    /// The ethertype is not ARP.
    NotArp,
    /// Carries the ARP ethertype but is shorter than a full ARP message.
    ArpTruncated,
    /// An ARP message other than a request.
    NotRequest,
    /// An ARP request for some other protocol address.
    NotForUs,
}

impl DropReason {
    pub const COUNT: usize = 5;

    pub const ALL: [DropReason; DropReason::COUNT] = [
        DropReason::Truncated,
        DropReason::NotArp,
        DropReason::ArpTruncated,
        DropReason::NotRequest,
        DropReason::NotForUs,
    ];

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Whether the frame carried the ARP ethertype and so reached the responder.
    pub fn is_arp(&self) -> bool {
        matches!(
            self,
            DropReason::ArpTruncated | DropReason::NotRequest | DropReason::NotForUs
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::Truncated => "truncated",
            DropReason::NotArp => "not-arp",
            DropReason::ArpTruncated => "arp-truncated",
            DropReason::NotRequest => "not-request",
            DropReason::NotForUs => "not-for-us",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with a frame once it has been looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The frame now holds a reply and should be transmitted.
    Reply,
    /// The frame should be released.
    Drop(DropReason),
}

/// Answers ARP requests for the local [`Identity`].
#[derive(Debug, Clone, Copy)]
pub struct ArpResponder<'a> {
    identity: &'a Identity,
}

impl<'a> ArpResponder<'a> {
    pub fn new(identity: &'a Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        self.identity
    }

    /// Inspect a frame that carries the ARP ethertype and, if it is a request for
    /// the local address, turn it into the reply in place.
    ///
    /// The frame length never changes. Frames that are not answered are left
    /// untouched.
    pub fn respond(&self, frame: &mut [u8]) -> Action {
        let ethpkt = match EtherPacket::parse(CursorMut::new(frame)) {
            Ok(ethpkt) => ethpkt,
            Err(_) => return Action::Drop(DropReason::Truncated),
        };
        let requester = ethpkt.src_addr();

        let mut arppkt = match ArpPacket::parse(ethpkt.payload()) {
            Ok(arppkt) => arppkt,
            Err(_) => return Action::Drop(DropReason::ArpTruncated),
        };
        if arppkt.operation() != Operation::REQUEST {
            return Action::Drop(DropReason::NotRequest);
        }
        if arppkt.target_ipv4_addr() != self.identity.ipv4_addr() {
            return Action::Drop(DropReason::NotForUs);
        }

        let sender_ether_addr = arppkt.sender_ether_addr();
        let sender_ipv4_addr = arppkt.sender_ipv4_addr();
        arppkt.set_operation(Operation::REPLY);
        arppkt.set_target_ether_addr(sender_ether_addr);
        arppkt.set_target_ipv4_addr(sender_ipv4_addr);
        arppkt.set_sender_ether_addr(self.identity.ether_addr());
        arppkt.set_sender_ipv4_addr(self.identity.ipv4_addr());

        let mut buf = arppkt.release();
        buf.move_back(ETHER_HEADER_LEN);
        let mut ethpkt = EtherPacket::parse_unchecked(buf);
        ethpkt.set_dst_addr(requester);
        ethpkt.set_src_addr(self.identity.ether_addr());

        debug!(
            "reply to {} ({}): {}",
            sender_ipv4_addr, sender_ether_addr, self.identity
        );
        Action::Reply
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use arpd_pkt::arp::{ARP_HEADER_LEN, ARP_HEADER_TEMPLATE};
    use arpd_pkt::ether::{EtherAddr, EtherType, ETHER_HEADER_TEMPLATE};
    use arpd_pkt::{Buf, Cursor};

    use super::*;

    const LOCAL_MAC: EtherAddr = EtherAddr([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
    const PEER_MAC: EtherAddr = EtherAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);

    fn identity() -> Identity {
        Identity::new(LOCAL_MAC, Ipv4Addr::new(10, 0, 0, 1))
    }

    fn request(op: Operation, target: Ipv4Addr) -> [u8; 60] {
        let mut frame = [0u8; 60];
        let mut buf = CursorMut::new(&mut frame[..]);
        buf.advance(ETHER_HEADER_LEN + ARP_HEADER_LEN);

        let mut arppkt = ArpPacket::prepend_header(buf, &ARP_HEADER_TEMPLATE);
        arppkt.set_operation(op);
        arppkt.set_sender_ether_addr(PEER_MAC);
        arppkt.set_sender_ipv4_addr(Ipv4Addr::new(10, 0, 0, 5));
        arppkt.set_target_ipv4_addr(target);

        let mut ethpkt = EtherPacket::prepend_header(arppkt.release(), &ETHER_HEADER_TEMPLATE);
        ethpkt.set_dst_addr(EtherAddr::BROADCAST);
        ethpkt.set_src_addr(PEER_MAC);
        ethpkt.set_ethertype(EtherType::ARP);
        frame
    }

    #[test]
    fn reply_to_request_for_us() {
        let identity = identity();
        let responder = ArpResponder::new(&identity);
        let mut frame = request(Operation::REQUEST, Ipv4Addr::new(10, 0, 0, 1));

        assert_eq!(responder.respond(&mut frame), Action::Reply);

        let ethpkt = EtherPacket::parse(Cursor::new(&frame[..])).unwrap();
        assert_eq!(ethpkt.dst_addr(), PEER_MAC);
        assert_eq!(ethpkt.src_addr(), LOCAL_MAC);
        assert_eq!(ethpkt.ethertype(), EtherType::ARP);

        let arppkt = ArpPacket::parse(ethpkt.payload()).unwrap();
        assert_eq!(arppkt.operation(), Operation::REPLY);
        assert_eq!(arppkt.sender_ether_addr(), LOCAL_MAC);
        assert_eq!(arppkt.sender_ipv4_addr(), Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(arppkt.target_ether_addr(), PEER_MAC);
        assert_eq!(arppkt.target_ipv4_addr(), Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(arppkt.payload().remaining(), 60 - ETHER_HEADER_LEN - ARP_HEADER_LEN);
    }

    #[test]
    fn fixed_fields_are_reused() {
        let identity = identity();
        let responder = ArpResponder::new(&identity);
        let mut frame = request(Operation::REQUEST, Ipv4Addr::new(10, 0, 0, 1));
        // odd but tolerated length fields
        frame[18] = 0x07;
        frame[19] = 0x05;
        let before = frame;

        assert_eq!(responder.respond(&mut frame), Action::Reply);
        assert_eq!(&frame[12..20], &before[12..20]);
        assert_eq!(&frame[42..], &before[42..]);
    }

    #[test]
    fn ignore_request_for_other_address() {
        let identity = identity();
        let responder = ArpResponder::new(&identity);
        let mut frame = request(Operation::REQUEST, Ipv4Addr::new(10, 0, 0, 9));
        let before = frame;

        assert_eq!(
            responder.respond(&mut frame),
            Action::Drop(DropReason::NotForUs)
        );
        assert_eq!(frame, before);
    }

    #[test]
    fn ignore_replies_and_unknown_operations() {
        let identity = identity();
        let responder = ArpResponder::new(&identity);
        for op in [Operation::REPLY, Operation::from(0), Operation::from(0x0100)] {
            let mut frame = request(op, Ipv4Addr::new(10, 0, 0, 1));
            assert_eq!(
                responder.respond(&mut frame),
                Action::Drop(DropReason::NotRequest)
            );
        }
    }

    #[test]
    fn truncated_frames_are_dropped() {
        let identity = identity();
        let responder = ArpResponder::new(&identity);
        let frame = request(Operation::REQUEST, Ipv4Addr::new(10, 0, 0, 1));

        for len in 0..ETHER_HEADER_LEN {
            let mut short = frame[..len].to_vec();
            assert_eq!(
                responder.respond(&mut short),
                Action::Drop(DropReason::Truncated)
            );
        }
        for len in ETHER_HEADER_LEN..(ETHER_HEADER_LEN + ARP_HEADER_LEN) {
            let mut short = frame[..len].to_vec();
            assert_eq!(
                responder.respond(&mut short),
                Action::Drop(DropReason::ArpTruncated)
            );
            assert_eq!(&short[..], &frame[..len]);
        }

        let mut exact = frame[..ETHER_HEADER_LEN + ARP_HEADER_LEN].to_vec();
        assert_eq!(responder.respond(&mut exact), Action::Reply);
    }

    #[test]
    fn drop_reason_names() {
        for (i, reason) in DropReason::ALL.iter().enumerate() {
            assert_eq!(reason.index(), i);
        }
        assert_eq!(DropReason::NotForUs.to_string(), "not-for-us");
    }
}
