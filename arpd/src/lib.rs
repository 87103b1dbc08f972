//! A poll-mode ARP responder.
//!
//! Frames arrive in bursts from an [`RxQueue`](arpd_port::RxQueue). Each frame is
//! classified by its ethertype; ARP requests for the local Ipv4 address are rewritten
//! in place into replies and handed to a [`TxQueue`](arpd_port::TxQueue), everything
//! else is released back to its mempool.

mod identity;
pub use identity::Identity;

mod responder;
pub use responder::{Action, ArpResponder, DropReason};

mod intake;
pub use intake::{dispatch, Intake, BURST_SIZE};

pub mod dump;

mod stats;
pub use stats::{Stats, StatsSnapshot};

mod config;
pub use config::{Config, ConfigError};

pub mod logger;

pub mod monitor;
