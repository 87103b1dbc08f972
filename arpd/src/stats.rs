use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::DropReason;

/// Counters updated by the receive loop and read by a monitoring thread.
#[derive(Debug, Default)]
pub struct Stats {
    rx: AtomicU64,
    arp: AtomicU64,
    replied: AtomicU64,
    tx_dropped: AtomicU64,
    dropped: [AtomicU64; DropReason::COUNT],
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_rx(&self, cnt: usize) {
        self.rx.fetch_add(cnt as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_arp(&self, cnt: usize) {
        self.arp.fetch_add(cnt as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_drop(&self, reason: DropReason) {
        self.dropped[reason.index()].fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_tx(&self, sent: usize, refused: usize) {
        self.replied.fetch_add(sent as u64, Ordering::Relaxed);
        self.tx_dropped.fetch_add(refused as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let mut dropped = [0; DropReason::COUNT];
        for (dst, src) in dropped.iter_mut().zip(self.dropped.iter()) {
            *dst = src.load(Ordering::Relaxed);
        }
        StatsSnapshot {
            rx: self.rx.load(Ordering::Relaxed),
            arp: self.arp.load(Ordering::Relaxed),
            replied: self.replied.load(Ordering::Relaxed),
            tx_dropped: self.tx_dropped.load(Ordering::Relaxed),
            dropped,
        }
    }
}

/// A point-in-time copy of [`Stats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub rx: u64,
    pub arp: u64,
    pub replied: u64,
    pub tx_dropped: u64,
    dropped: [u64; DropReason::COUNT],
}

impl StatsSnapshot {
    pub fn dropped(&self, reason: DropReason) -> u64 {
        self.dropped[reason.index()]
    }

    /// All frames released without a reply being sent, including refused replies.
    pub fn released(&self) -> u64 {
        self.dropped.iter().sum::<u64>() + self.tx_dropped
    }

    /// Counter increments between `earlier` and `self`.
    pub fn since(&self, earlier: &StatsSnapshot) -> StatsSnapshot {
        let mut dropped = [0; DropReason::COUNT];
        for (i, d) in dropped.iter_mut().enumerate() {
            *d = self.dropped[i].wrapping_sub(earlier.dropped[i]);
        }
        StatsSnapshot {
            rx: self.rx.wrapping_sub(earlier.rx),
            arp: self.arp.wrapping_sub(earlier.arp),
            replied: self.replied.wrapping_sub(earlier.replied),
            tx_dropped: self.tx_dropped.wrapping_sub(earlier.tx_dropped),
            dropped,
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rx {} arp {} replied {} tx-dropped {}",
            self.rx, self.arp, self.replied, self.tx_dropped
        )?;
        for reason in DropReason::ALL {
            write!(f, " {} {}", reason, self.dropped(reason))?;
        }
        Ok(())
    }
}
