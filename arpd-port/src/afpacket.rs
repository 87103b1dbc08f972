use std::ffi::CString;
use std::io;
use std::mem;
use std::os::raw::{c_int, c_void};
use std::sync::Arc;

use arrayvec::ArrayVec;
use log::{debug, info};

use crate::error::*;
use crate::port::PortCounters;
use crate::{Mbuf, Mempool, PortConf, RxQueue, StatsQuery, TxQueue};

struct Socket {
    fd: c_int,
}

impl Socket {
    fn open() -> Result<Self> {
        let fd = unsafe {
            libc::socket(
                libc::AF_PACKET,
                libc::SOCK_RAW | libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
                c_int::from((libc::ETH_P_ALL as u16).to_be()),
            )
        };
        if fd < 0 {
            return Error::last_os_err("fail to open packet socket").to_err();
        }
        Ok(Self { fd })
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}

/// A raw Ethernet port backed by a non-blocking `AF_PACKET` socket.
///
/// Received frames are copied into mbufs from the port's [`Mempool`]. The port has a
/// single rx queue and a single tx queue; each can be taken once at a time.
pub struct AfPacketPort {
    iface: String,
    ifindex: c_int,
    mac_addr: [u8; 6],
    socket: Arc<Socket>,
    mempool: Mempool,
    conf: PortConf,
    counters: Arc<PortCounters>,
    rxq_guard: Arc<()>,
    txq_guard: Arc<()>,
}

impl AfPacketPort {
    pub fn open<S: AsRef<str>>(iface: S, mempool: Mempool, conf: &PortConf) -> Result<Self> {
        let iface = iface.as_ref();
        let c_iface = iface_cstring(iface)?;

        let ifindex = unsafe { libc::if_nametoindex(c_iface.as_ptr()) };
        if ifindex == 0 {
            return Error::last_os_err(format!("fail to find interface {}", iface)).to_err();
        }
        let ifindex = ifindex as c_int;

        let socket = Socket::open()?;
        bind(&socket, ifindex)?;
        let mac_addr = hardware_addr(&socket, &c_iface)?;
        if conf.promiscuous {
            enable_promiscuous(&socket, ifindex)?;
        }

        info!(
            "port {} (index {}) up, mac {:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}, promiscuous {}",
            iface,
            ifindex,
            mac_addr[0],
            mac_addr[1],
            mac_addr[2],
            mac_addr[3],
            mac_addr[4],
            mac_addr[5],
            conf.promiscuous
        );

        Ok(Self {
            iface: iface.to_string(),
            ifindex,
            mac_addr,
            socket: Arc::new(socket),
            mempool,
            conf: conf.clone(),
            counters: Arc::new(PortCounters::default()),
            rxq_guard: Arc::new(()),
            txq_guard: Arc::new(()),
        })
    }

    pub fn iface(&self) -> &str {
        &self.iface
    }

    pub fn ifindex(&self) -> i32 {
        self.ifindex
    }

    /// The hardware address of the interface, read when the port was opened.
    pub fn mac_addr(&self) -> [u8; 6] {
        self.mac_addr
    }

    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    pub fn rx_queue(&self) -> Result<AfRxQueue> {
        if Arc::strong_count(&self.rxq_guard) != 1 {
            return Error::service_err("rx queue is in use").to_err();
        }
        Ok(AfRxQueue {
            socket: self.socket.clone(),
            mempool: self.mempool.clone(),
            ifindex: self.ifindex,
            skip_outgoing: self.conf.skip_outgoing,
            counters: self.counters.clone(),
            _guard: self.rxq_guard.clone(),
        })
    }

    pub fn tx_queue(&self) -> Result<AfTxQueue> {
        if Arc::strong_count(&self.txq_guard) != 1 {
            return Error::service_err("tx queue is in use").to_err();
        }
        Ok(AfTxQueue {
            socket: self.socket.clone(),
            addr: link_addr(self.ifindex),
            counters: self.counters.clone(),
            _guard: self.txq_guard.clone(),
        })
    }

    pub fn stats_query(&self) -> StatsQuery {
        StatsQuery::new(self.counters.clone())
    }
}

impl std::fmt::Debug for AfPacketPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AfPacketPort")
            .field("iface", &self.iface)
            .field("ifindex", &self.ifindex)
            .field("fd", &self.socket.fd)
            .finish()
    }
}

pub struct AfRxQueue {
    socket: Arc<Socket>,
    mempool: Mempool,
    ifindex: c_int,
    skip_outgoing: bool,
    counters: Arc<PortCounters>,
    _guard: Arc<()>,
}

impl RxQueue for AfRxQueue {
    fn rx<const N: usize>(&mut self, batch: &mut ArrayVec<Mbuf, N>) -> usize {
        let mut nb_rx = 0;
        while !batch.is_full() {
            let Some(mut mbuf) = self.mempool.try_alloc() else {
                PortCounters::add(&self.counters.imissed, 1);
                break;
            };

            let mut from = link_addr(0);
            let mut from_len = mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t;
            let room = mbuf.room_mut();
            let res = unsafe {
                libc::recvfrom(
                    self.socket.fd,
                    room.as_mut_ptr() as *mut c_void,
                    room.len(),
                    libc::MSG_DONTWAIT | libc::MSG_TRUNC,
                    &mut from as *mut libc::sockaddr_ll as *mut libc::sockaddr,
                    &mut from_len,
                )
            };
            if res < 0 {
                let err = io::Error::last_os_error();
                if err.kind() != io::ErrorKind::WouldBlock
                    && err.kind() != io::ErrorKind::Interrupted
                {
                    PortCounters::add(&self.counters.ierrors, 1);
                    debug!("recvfrom failed: {}", err);
                }
                break;
            }

            let frame_len = res as usize;
            if frame_len > room.len() {
                // MSG_TRUNC reports the length on the wire, the mbuf only holds a prefix.
                PortCounters::add(&self.counters.ierrors, 1);
                continue;
            }
            if !accept_frame(&from, self.ifindex, self.skip_outgoing) {
                continue;
            }

            mbuf.set_len(frame_len);
            PortCounters::add(&self.counters.ipackets, 1);
            PortCounters::add(&self.counters.ibytes, frame_len as u64);
            batch.push(mbuf);
            nb_rx += 1;
        }
        nb_rx
    }
}

pub struct AfTxQueue {
    socket: Arc<Socket>,
    addr: libc::sockaddr_ll,
    counters: Arc<PortCounters>,
    _guard: Arc<()>,
}

impl TxQueue for AfTxQueue {
    fn tx<const N: usize>(&mut self, batch: &mut ArrayVec<Mbuf, N>) -> usize {
        let mut nb_tx = 0;
        for mbuf in batch.iter() {
            let data = mbuf.data();
            let res = unsafe {
                libc::sendto(
                    self.socket.fd,
                    data.as_ptr() as *const c_void,
                    data.len(),
                    libc::MSG_DONTWAIT,
                    &self.addr as *const libc::sockaddr_ll as *const libc::sockaddr,
                    mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
                )
            };
            if res < 0 {
                PortCounters::add(&self.counters.oerrors, 1);
                debug!("sendto failed: {}", io::Error::last_os_error());
                break;
            }
            PortCounters::add(&self.counters.opackets, 1);
            PortCounters::add(&self.counters.obytes, data.len() as u64);
            nb_tx += 1;
        }

        // The kernel holds its own copy of every accepted frame.
        batch.drain(..nb_tx);
        nb_tx
    }
}

fn iface_cstring(iface: &str) -> Result<CString> {
    if iface.is_empty() || iface.len() >= libc::IFNAMSIZ {
        return Error::service_err(format!(
            "interface name {:?} must be 1 to {} bytes long",
            iface,
            libc::IFNAMSIZ - 1
        ))
        .to_err();
    }
    CString::new(iface).or_else(|_| {
        Error::service_err(format!("interface name {:?} contains a nul byte", iface)).to_err()
    })
}

fn link_addr(ifindex: c_int) -> libc::sockaddr_ll {
    let mut addr: libc::sockaddr_ll = unsafe { mem::zeroed() };
    addr.sll_family = libc::AF_PACKET as libc::c_ushort;
    addr.sll_protocol = (libc::ETH_P_ALL as u16).to_be();
    addr.sll_ifindex = ifindex;
    addr
}

// The socket is bound to one interface, but frames from other interfaces can be
// queued before the bind takes effect.
fn accept_frame(from: &libc::sockaddr_ll, ifindex: c_int, skip_outgoing: bool) -> bool {
    if from.sll_ifindex != ifindex {
        return false;
    }
    !(skip_outgoing && from.sll_pkttype == libc::PACKET_OUTGOING as libc::c_uchar)
}

fn bind(socket: &Socket, ifindex: c_int) -> Result<()> {
    let addr = link_addr(ifindex);
    let res = unsafe {
        libc::bind(
            socket.fd,
            &addr as *const libc::sockaddr_ll as *const libc::sockaddr,
            mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
        )
    };
    if res < 0 {
        return Error::last_os_err("fail to bind packet socket").to_err();
    }
    Ok(())
}

fn hardware_addr(socket: &Socket, iface: &CString) -> Result<[u8; 6]> {
    let mut ifr: libc::ifreq = unsafe { mem::zeroed() };
    for (dst, src) in ifr.ifr_name.iter_mut().zip(iface.as_bytes()) {
        *dst = *src as libc::c_char;
    }

    let res = unsafe { libc::ioctl(socket.fd, libc::SIOCGIFHWADDR as _, &mut ifr) };
    if res < 0 {
        return Error::last_os_err("fail to get the hardware address").to_err();
    }
    let hwaddr = unsafe { ifr.ifr_ifru.ifru_hwaddr };
    if hwaddr.sa_family != libc::ARPHRD_ETHER as libc::sa_family_t {
        return Error::service_err(format!(
            "{:?} is not an ethernet interface (hardware type {})",
            iface, hwaddr.sa_family
        ))
        .to_err();
    }

    let mut mac_addr = [0; 6];
    for (dst, src) in mac_addr.iter_mut().zip(hwaddr.sa_data.iter()) {
        *dst = *src as u8;
    }
    Ok(mac_addr)
}

fn enable_promiscuous(socket: &Socket, ifindex: c_int) -> Result<()> {
    let mreq = libc::packet_mreq {
        mr_ifindex: ifindex,
        mr_type: libc::PACKET_MR_PROMISC as libc::c_ushort,
        mr_alen: 0,
        mr_address: [0; 8],
    };
    let res = unsafe {
        libc::setsockopt(
            socket.fd,
            libc::SOL_PACKET,
            libc::PACKET_ADD_MEMBERSHIP,
            &mreq as *const libc::packet_mreq as *const c_void,
            mem::size_of::<libc::packet_mreq>() as libc::socklen_t,
        )
    };
    if res < 0 {
        return Error::last_os_err("fail to enable promiscuous mode").to_err();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::MempoolConf;

    fn pool() -> Mempool {
        let mut conf = MempoolConf::default();
        conf.set_nb_mbufs(1);
        Mempool::create("afpacket", &conf).unwrap()
    }

    #[test]
    fn reject_bad_interface_names() {
        for name in ["", "a-name-that-is-far-too-long", "eth\0"] {
            let err = AfPacketPort::open(name, pool(), &PortConf::default()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ServiceError);
        }
    }

    #[test]
    fn missing_interface_is_an_os_error() {
        let err = AfPacketPort::open("nosuchif0", pool(), &PortConf::default()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::OsError(_)));
        assert!(err.msg().contains("nosuchif0"));
    }

    #[test]
    fn link_addr_layout() {
        let addr = link_addr(7);
        assert_eq!(addr.sll_family, libc::AF_PACKET as libc::c_ushort);
        assert_eq!(addr.sll_protocol, 0x0003u16.to_be());
        assert_eq!(addr.sll_ifindex, 7);
        assert_eq!(addr.sll_halen, 0);
    }

    #[test]
    fn frames_from_other_interfaces_are_skipped() {
        let mut from = link_addr(3);
        from.sll_pkttype = libc::PACKET_HOST as libc::c_uchar;
        assert!(accept_frame(&from, 3, true));
        assert!(!accept_frame(&from, 4, true));
        assert!(!accept_frame(&from, 4, false));

        from.sll_ifindex = 0;
        assert!(!accept_frame(&from, 3, false));
    }

    #[test]
    fn outgoing_frames_follow_the_port_conf() {
        let mut from = link_addr(3);
        from.sll_pkttype = libc::PACKET_OUTGOING as libc::c_uchar;
        assert!(!accept_frame(&from, 3, true));
        assert!(accept_frame(&from, 3, false));

        from.sll_pkttype = libc::PACKET_BROADCAST as libc::c_uchar;
        assert!(accept_frame(&from, 3, true));
    }
}
