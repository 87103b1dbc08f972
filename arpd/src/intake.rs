use std::sync::atomic::{AtomicBool, Ordering};

use arpd_pkt::ether::{EtherPacket, EtherType};
use arpd_pkt::Cursor;
use arpd_port::{Mbuf, Mempool, RxQueue, TxQueue};
use arrayvec::ArrayVec;
use log::{debug, info};

use crate::dump::DumpSink;
use crate::{Action, ArpResponder, DropReason, Stats};

/// Maximum number of frames fetched by one receive call.
pub const BURST_SIZE: usize = 32;

/// Classify a frame by its ethertype and hand ARP frames to the responder.
pub fn dispatch(responder: &ArpResponder<'_>, frame: &mut [u8]) -> Action {
    let ethertype = match EtherPacket::parse(Cursor::new(frame)) {
        Ok(ethpkt) => ethpkt.ethertype(),
        Err(_) => return Action::Drop(DropReason::Truncated),
    };

    if ethertype == EtherType::ARP {
        responder.respond(frame)
    } else {
        Action::Drop(DropReason::NotArp)
    }
}

/// The receive loop: polls an rx queue, answers ARP requests and releases the rest.
///
/// Every mbuf taken from the rx queue ends up either accepted by the tx queue or
/// dropped back into its mempool before `poll_once` returns.
pub struct Intake<'a, R, T> {
    rxq: R,
    txq: T,
    responder: ArpResponder<'a>,
    stats: &'a Stats,
}

impl<'a, R: RxQueue, T: TxQueue> Intake<'a, R, T> {
    pub fn new(rxq: R, txq: T, responder: ArpResponder<'a>, stats: &'a Stats) -> Self {
        Self {
            rxq,
            txq,
            responder,
            stats,
        }
    }

    /// Process one burst. Returns the number of frames received.
    pub fn poll_once<D: DumpSink>(&mut self, dump: &mut D) -> usize {
        let mut rx_batch = ArrayVec::<Mbuf, BURST_SIZE>::new();
        let nb_rx = self.rxq.rx(&mut rx_batch);
        if nb_rx == 0 {
            return 0;
        }
        debug!("got {} packets", nb_rx);
        self.stats.record_rx(nb_rx);

        let mut tx_batch = ArrayVec::<Mbuf, BURST_SIZE>::new();
        let mut nb_arp = 0;
        for mut mbuf in rx_batch.drain(..) {
            dump.dump(mbuf.data());
            match dispatch(&self.responder, mbuf.data_mut()) {
                Action::Reply => {
                    nb_arp += 1;
                    tx_batch.push(mbuf);
                }
                Action::Drop(reason) => {
                    if reason.is_arp() {
                        nb_arp += 1;
                    }
                    self.stats.record_drop(reason);
                    drop(mbuf);
                }
            }
        }
        self.stats.record_arp(nb_arp);

        if !tx_batch.is_empty() {
            let nb_reply = tx_batch.len();
            let nb_tx = self.txq.tx(&mut tx_batch);
            self.stats.record_tx(nb_tx, nb_reply - nb_tx);
            // Replies the tx queue refused are not retried.
            Mempool::free_batch(&mut tx_batch);
        }
        nb_rx
    }

    /// Busy-poll until `run` is cleared.
    pub fn run<D: DumpSink>(&mut self, dump: &mut D, run: &AtomicBool) {
        info!("answering arp requests: {}", self.responder.identity());
        while run.load(Ordering::Acquire) {
            self.poll_once(dump);
        }
        info!("receive loop stopped");
    }

    pub fn into_queues(self) -> (R, T) {
        (self.rxq, self.txq)
    }
}
