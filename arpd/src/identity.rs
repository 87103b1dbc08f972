use std::fmt;
use std::net::Ipv4Addr;

use arpd_pkt::ether::EtherAddr;

/// The addresses this host answers for.
///
/// Built once at startup from the command line and the interface, then only read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity {
    ether_addr: EtherAddr,
    ipv4_addr: Ipv4Addr,
}

impl Identity {
    pub fn new(ether_addr: EtherAddr, ipv4_addr: Ipv4Addr) -> Self {
        Self {
            ether_addr,
            ipv4_addr,
        }
    }

    #[inline]
    pub fn ether_addr(&self) -> EtherAddr {
        self.ether_addr
    }

    #[inline]
    pub fn ipv4_addr(&self) -> Ipv4Addr {
        self.ipv4_addr
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is at {}", self.ipv4_addr, self.ether_addr)
    }
}
