use std::sync::Arc;

use crate::mempool::PoolInner;

/// One frame buffer owned by the holder until it is transmitted or dropped.
///
/// Dropping an `Mbuf` returns its storage to the [`Mempool`](crate::Mempool) it
/// came from.
pub struct Mbuf {
    data: Box<[u8]>,
    len: usize,
    pool: Arc<PoolInner>,
}

impl Mbuf {
    #[inline]
    pub(crate) fn new(data: Box<[u8]>, pool: Arc<PoolInner>) -> Self {
        Self { data, len: 0, pool }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes that can still be appended.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len() - self.len
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data[..self.len]
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data[..self.len]
    }

    /// # Panic:
    /// This function panics if the length of the slice exceeds the capacity of the mbuf.
    #[inline]
    pub fn extend_from_slice(&mut self, slice: &[u8]) {
        assert!(self.capacity() >= slice.len());
        let old_len = self.len;
        self.len += slice.len();
        self.data[old_len..self.len].copy_from_slice(slice);
    }

    #[inline]
    pub fn truncate(&mut self, cnt: usize) {
        assert!(cnt <= self.len());
        self.len = cnt;
    }

    // The whole data room, for the receive path to fill before `set_len`.
    #[inline]
    pub(crate) fn room_mut(&mut self) -> &mut [u8] {
        &mut self.data[..]
    }

    #[inline]
    pub(crate) fn set_len(&mut self, len: usize) {
        assert!(len <= self.data.len());
        self.len = len;
    }
}

impl std::fmt::Debug for Mbuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mbuf")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl Drop for Mbuf {
    fn drop(&mut self) {
        let data = std::mem::take(&mut self.data);
        self.pool.recycle(data);
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn mbuf_data_append_remove() {
        let mut conf = MempoolConf::default();
        conf.set_nb_mbufs(2);
        let mp = Mempool::create("mbuf", &conf).unwrap();

        let mut content = [0u8; 1024];
        for (i, b) in content.iter_mut().enumerate() {
            *b = (i % u8::MAX as usize) as u8;
        }
        let mut mbuf = mp.try_alloc().unwrap();
        assert!(mbuf.is_empty());

        mbuf.extend_from_slice(&content[..512]);
        assert_eq!(mbuf.data(), &content[..512]);
        assert_eq!(mbuf.len(), 512);
        assert_eq!(mbuf.capacity(), MempoolConf::DATAROOM as usize - 512);

        mbuf.extend_from_slice(&content[512..]);
        assert_eq!(mbuf.data(), &content[..]);

        mbuf.data_mut()[0] = 0xee;
        assert_eq!(mbuf.data()[0], 0xee);

        mbuf.truncate(60);
        assert_eq!(mbuf.len(), 60);
        assert_eq!(mbuf.capacity(), MempoolConf::DATAROOM as usize - 60);
    }

    #[test]
    #[should_panic]
    fn mbuf_extend_past_capacity() {
        let mut conf = MempoolConf::default();
        conf.set_nb_mbufs(1);
        conf.set_dataroom(MempoolConf::MIN_DATAROOM);
        let mp = Mempool::create("mbuf", &conf).unwrap();

        let mut mbuf = mp.try_alloc().unwrap();
        mbuf.extend_from_slice(&[0; 1515]);
    }

    #[test]
    fn room_and_set_len() {
        let mut conf = MempoolConf::default();
        conf.set_nb_mbufs(1);
        let mp = Mempool::create("mbuf", &conf).unwrap();
        let mut mbuf = mp.try_alloc().unwrap();
        mbuf.room_mut()[..4].copy_from_slice(&[1, 2, 3, 4]);
        mbuf.set_len(4);
        assert_eq!(mbuf.data(), &[1, 2, 3, 4]);
    }
}
