#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]
#![no_std]

//! Zero-copy views over the link-layer headers that an ARP responder touches.
//!
//! Every view checks the length of its buffer once, in `parse`, and afterwards only
//! indexes inside the checked prefix. A truncated frame is handed back to the caller
//! as the `Err` value so that the buffer can still be released.

#[macro_use]
mod macros;

mod traits;
pub use traits::{Buf, PktBuf, PktBufMut};

mod cursors;
pub use cursors::{Cursor, CursorMut};

pub mod arp;
pub mod ether;

pub use core::net::Ipv4Addr;
