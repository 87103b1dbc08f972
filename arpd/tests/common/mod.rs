#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::Ipv4Addr;

use arpd::dump::DumpSink;
use arpd_pkt::arp::{ArpPacket, Operation, ARP_HEADER_LEN, ARP_HEADER_TEMPLATE};
use arpd_pkt::ether::{EtherAddr, EtherPacket, EtherType, ETHER_HEADER_LEN, ETHER_HEADER_TEMPLATE};
use arpd_pkt::{Buf, CursorMut};
use arpd_port::{Mbuf, Mempool, MempoolConf, RxQueue, TxQueue};
use arrayvec::ArrayVec;

pub const LOCAL_MAC: EtherAddr = EtherAddr([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
pub const LOCAL_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
pub const PEER_MAC: EtherAddr = EtherAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
pub const PEER_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 5);

/// Minimum Ethernet frame length without the frame check sequence.
pub const MIN_FRAME_LEN: usize = 60;

pub fn mempool(nb_mbufs: u32) -> Mempool {
    let mut conf = MempoolConf::new();
    conf.set_nb_mbufs(nb_mbufs);
    Mempool::create("test", &conf).unwrap()
}

/// An Ethernet frame with the given ethertype and a zeroed payload.
pub fn ether_frame(ethertype: EtherType, len: usize) -> Vec<u8> {
    assert!(len >= ETHER_HEADER_LEN);
    let mut frame = vec![0u8; len];
    let mut buf = CursorMut::new(&mut frame[..]);
    buf.advance(ETHER_HEADER_LEN);

    let mut ethpkt = EtherPacket::prepend_header(buf, &ETHER_HEADER_TEMPLATE);
    ethpkt.set_dst_addr(EtherAddr::BROADCAST);
    ethpkt.set_src_addr(PEER_MAC);
    ethpkt.set_ethertype(ethertype);
    frame
}

/// A broadcast Arp message from `sender_mac`/`sender_ip`, padded to the minimum frame length.
pub fn arp_frame(
    op: Operation,
    sender_mac: EtherAddr,
    sender_ip: Ipv4Addr,
    target_ip: Ipv4Addr,
) -> Vec<u8> {
    let mut frame = vec![0u8; MIN_FRAME_LEN];
    let mut buf = CursorMut::new(&mut frame[..]);
    buf.advance(ETHER_HEADER_LEN + ARP_HEADER_LEN);

    let mut arppkt = ArpPacket::prepend_header(buf, &ARP_HEADER_TEMPLATE);
    arppkt.set_operation(op);
    arppkt.set_sender_ether_addr(sender_mac);
    arppkt.set_sender_ipv4_addr(sender_ip);
    arppkt.set_target_ipv4_addr(target_ip);

    let mut ethpkt = EtherPacket::prepend_header(arppkt.release(), &ETHER_HEADER_TEMPLATE);
    ethpkt.set_dst_addr(EtherAddr::BROADCAST);
    ethpkt.set_src_addr(sender_mac);
    ethpkt.set_ethertype(EtherType::ARP);
    frame
}

pub fn request_for(target_ip: Ipv4Addr) -> Vec<u8> {
    arp_frame(Operation::REQUEST, PEER_MAC, PEER_IP, target_ip)
}

/// An rx queue fed from memory. Frames are copied into mbufs of `pool` as they are received.
pub struct MemRxQueue {
    pool: Mempool,
    frames: VecDeque<Vec<u8>>,
}

impl MemRxQueue {
    pub fn new(pool: Mempool) -> Self {
        Self {
            pool,
            frames: VecDeque::new(),
        }
    }

    pub fn push(&mut self, frame: Vec<u8>) {
        self.frames.push_back(frame);
    }

    pub fn pending(&self) -> usize {
        self.frames.len()
    }
}

impl RxQueue for MemRxQueue {
    fn rx<const N: usize>(&mut self, batch: &mut ArrayVec<Mbuf, N>) -> usize {
        let mut cnt = 0;
        while !batch.is_full() && !self.frames.is_empty() {
            let mut mbuf = match self.pool.try_alloc() {
                Some(mbuf) => mbuf,
                None => break,
            };
            let frame = self.frames.pop_front().unwrap();
            mbuf.extend_from_slice(&frame);
            batch.push(mbuf);
            cnt += 1;
        }
        cnt
    }
}

/// A tx queue that records the bytes of every accepted frame.
///
/// With a limit set, each `tx` call accepts at most that many frames.
#[derive(Default)]
pub struct MemTxQueue {
    pub sent: Vec<Vec<u8>>,
    limit: Option<usize>,
}

impl MemTxQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            sent: Vec::new(),
            limit: Some(limit),
        }
    }
}

impl TxQueue for MemTxQueue {
    fn tx<const N: usize>(&mut self, batch: &mut ArrayVec<Mbuf, N>) -> usize {
        let nb_tx = self.limit.map_or(batch.len(), |l| l.min(batch.len()));
        for mbuf in batch.drain(..nb_tx) {
            self.sent.push(mbuf.data().to_vec());
        }
        nb_tx
    }
}

/// Records the bytes of every dumped frame.
#[derive(Default)]
pub struct CaptureDump {
    pub frames: Vec<Vec<u8>>,
}

impl DumpSink for CaptureDump {
    fn dump(&mut self, frame: &[u8]) {
        self.frames.push(frame.to_vec());
    }
}
