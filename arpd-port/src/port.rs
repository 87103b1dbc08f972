use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arrayvec::ArrayVec;

use crate::Mbuf;

/// The receive half of a poll-mode port.
pub trait RxQueue {
    /// Append up to `N - batch.len()` received frames to `batch` without blocking.
    ///
    /// Returns the number of frames appended, which may be zero.
    fn rx<const N: usize>(&mut self, batch: &mut ArrayVec<Mbuf, N>) -> usize;
}

/// The transmit half of a poll-mode port.
pub trait TxQueue {
    /// Enqueue a prefix of `batch` for transmission without blocking.
    ///
    /// Returns the number of frames that were accepted. Accepted frames are removed
    /// from the front of `batch`; the rest stay in `batch` in their original order
    /// and remain owned by the caller.
    fn tx<const N: usize>(&mut self, batch: &mut ArrayVec<Mbuf, N>) -> usize;
}

#[derive(Clone, Debug)]
pub struct PortConf {
    pub promiscuous: bool,
    pub skip_outgoing: bool,
}

impl PortConf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_promiscuous(&mut self, val: bool) {
        self.promiscuous = val;
    }

    /// Whether frames sent by this host are filtered out of the receive path.
    pub fn set_skip_outgoing(&mut self, val: bool) {
        self.skip_outgoing = val;
    }
}

impl Default for PortConf {
    fn default() -> Self {
        Self {
            promiscuous: true,
            skip_outgoing: true,
        }
    }
}

#[derive(Default, Debug)]
pub(crate) struct PortCounters {
    pub(crate) ipackets: AtomicU64,
    pub(crate) ibytes: AtomicU64,
    pub(crate) opackets: AtomicU64,
    pub(crate) obytes: AtomicU64,
    pub(crate) imissed: AtomicU64,
    pub(crate) ierrors: AtomicU64,
    pub(crate) oerrors: AtomicU64,
}

impl PortCounters {
    // Each counter has a single writer, the queue that owns it.
    #[inline]
    pub(crate) fn add(counter: &AtomicU64, val: u64) {
        counter.fetch_add(val, Ordering::Relaxed);
    }
}

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct PortStats {
    ipackets: u64,
    ibytes: u64,
    opackets: u64,
    obytes: u64,
    imissed: u64,
    ierrors: u64,
    oerrors: u64,
}

impl PortStats {
    pub fn ipackets(&self) -> u64 {
        self.ipackets
    }

    pub fn ibytes(&self) -> u64 {
        self.ibytes
    }

    pub fn opackets(&self) -> u64 {
        self.opackets
    }

    pub fn obytes(&self) -> u64 {
        self.obytes
    }

    /// Receive calls cut short because the mempool had no free mbuf.
    pub fn imissed(&self) -> u64 {
        self.imissed
    }

    pub fn ierrors(&self) -> u64 {
        self.ierrors
    }

    pub fn oerrors(&self) -> u64 {
        self.oerrors
    }
}

/// A read handle on the counters of a port, usable from a monitoring thread.
#[derive(Clone, Debug)]
pub struct StatsQuery {
    counters: Arc<PortCounters>,
}

impl StatsQuery {
    pub(crate) fn new(counters: Arc<PortCounters>) -> Self {
        Self { counters }
    }

    pub fn query(&self) -> PortStats {
        let mut stats = PortStats::default();
        self.update(&mut stats);
        stats
    }

    pub fn update(&self, port_stats: &mut PortStats) {
        let c = &self.counters;
        port_stats.ipackets = c.ipackets.load(Ordering::Relaxed);
        port_stats.ibytes = c.ibytes.load(Ordering::Relaxed);
        port_stats.opackets = c.opackets.load(Ordering::Relaxed);
        port_stats.obytes = c.obytes.load(Ordering::Relaxed);
        port_stats.imissed = c.imissed.load(Ordering::Relaxed);
        port_stats.ierrors = c.ierrors.load(Ordering::Relaxed);
        port_stats.oerrors = c.oerrors.load(Ordering::Relaxed);
    }
}
