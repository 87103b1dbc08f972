fn _prevent_compilation() {
    #[cfg(any(not(target_pointer_width = "64"), not(target_os = "linux")))]
    compile_error!("This crate can only be used on 64-bit Linux system.");
}

pub mod error;

mod mempool;
pub use mempool::{Mempool, MempoolConf};

mod mbuf;
pub use mbuf::Mbuf;

mod port;
pub use port::{PortConf, PortStats, RxQueue, StatsQuery, TxQueue};

mod afpacket;
pub use afpacket::{AfPacketPort, AfRxQueue, AfTxQueue};
