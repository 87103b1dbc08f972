//! Arp messages for Ethernet/Ipv4.

enum_sim! {
    /// Hardware type of the arp message.
    pub struct Hardware (u16) {
        /// The hardware addresses are Ethernet addresses.
        ETHERNET = 1
    }
}

enum_sim! {
    /// Operation code of the arp message.
    pub struct Operation (u16) {
        /// Arp request.
        REQUEST = 1,
        /// Arp reply.
        REPLY = 2
    }
}

mod packet;
pub use packet::{ArpPacket, ARP_HEADER_LEN, ARP_HEADER_TEMPLATE};
