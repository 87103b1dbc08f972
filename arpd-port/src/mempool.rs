use std::sync::{Arc, Mutex, MutexGuard};

use arrayvec::ArrayVec;

use crate::error::*;
use crate::Mbuf;

#[derive(Clone, Copy, Debug)]
pub struct MempoolConf {
    pub nb_mbufs: u32,
    pub dataroom: u16,
}

impl MempoolConf {
    pub const NB_MBUFS: u32 = 8191;
    pub const DATAROOM: u16 = 2048;
    // Room for the longest untagged Ethernet frame without its FCS.
    pub const MIN_DATAROOM: u16 = 1514;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_nb_mbufs(&mut self, val: u32) {
        self.nb_mbufs = val;
    }

    pub fn set_dataroom(&mut self, val: u16) {
        self.dataroom = val;
    }
}

impl Default for MempoolConf {
    fn default() -> Self {
        Self {
            nb_mbufs: Self::NB_MBUFS,
            dataroom: Self::DATAROOM,
        }
    }
}

pub(crate) struct PoolInner {
    name: String,
    nb_mbufs: u32,
    dataroom: u16,
    free: Mutex<Vec<Box<[u8]>>>,
}

impl PoolInner {
    #[inline]
    fn free_list(&self) -> MutexGuard<'_, Vec<Box<[u8]>>> {
        // The free list holds plain byte buffers, a panic elsewhere cannot leave it torn.
        self.free.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[inline]
    pub(crate) fn recycle(&self, data: Box<[u8]>) {
        self.free_list().push(data);
    }
}

/// A named pool of fixed-capacity frame buffers.
///
/// All buffers are allocated when the pool is created. An [`Mbuf`] handed out by
/// the pool goes back to it when dropped, so the number of buffers in flight never
/// exceeds `nb_mbufs`.
#[derive(Clone)]
pub struct Mempool {
    inner: Arc<PoolInner>,
}

impl Mempool {
    pub fn create<S: AsRef<str>>(name: S, conf: &MempoolConf) -> Result<Self> {
        if conf.nb_mbufs == 0 {
            return Error::service_err("mempool must hold at least one mbuf").to_err();
        }
        if conf.dataroom < MempoolConf::MIN_DATAROOM {
            return Error::service_err(format!(
                "mempool dataroom {} is smaller than {}",
                conf.dataroom,
                MempoolConf::MIN_DATAROOM
            ))
            .to_err();
        }

        let free = (0..conf.nb_mbufs)
            .map(|_| vec![0u8; usize::from(conf.dataroom)].into_boxed_slice())
            .collect();

        Ok(Self {
            inner: Arc::new(PoolInner {
                name: name.as_ref().to_string(),
                nb_mbufs: conf.nb_mbufs,
                dataroom: conf.dataroom,
                free: Mutex::new(free),
            }),
        })
    }

    #[inline]
    pub fn try_alloc(&self) -> Option<Mbuf> {
        let data = self.inner.free_list().pop()?;
        Some(Mbuf::new(data, self.inner.clone()))
    }

    /// Fill the remaining slots of `batch`, stopping early if the pool runs dry.
    #[inline]
    pub fn alloc_in_batch<const N: usize>(&self, batch: &mut ArrayVec<Mbuf, N>) {
        let mut free = self.inner.free_list();
        while !batch.is_full() {
            match free.pop() {
                Some(data) => batch.push(Mbuf::new(data, self.inner.clone())),
                None => break,
            }
        }
    }

    /// Release every mbuf left in `batch`.
    #[inline]
    pub fn free_batch<const N: usize>(batch: &mut ArrayVec<Mbuf, N>) {
        batch.clear();
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[inline]
    pub fn nb_mbufs(&self) -> u32 {
        self.inner.nb_mbufs
    }

    #[inline]
    pub fn dataroom(&self) -> u16 {
        self.inner.dataroom
    }

    /// Number of mbufs currently sitting in the pool.
    #[inline]
    pub fn available(&self) -> u32 {
        self.inner.free_list().len() as u32
    }

    /// Number of mbufs currently handed out.
    #[inline]
    pub fn in_use(&self) -> u32 {
        self.nb_mbufs() - self.available()
    }
}

impl std::fmt::Debug for Mempool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mempool")
            .field("name", &self.inner.name)
            .field("nb_mbufs", &self.inner.nb_mbufs)
            .field("dataroom", &self.inner.dataroom)
            .finish()
    }
}
