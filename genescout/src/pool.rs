//! Reusable fixed-size scan buffers.
//!
//! Scanning a large file allocates one buffer per window. Buffers are
//! handed out as [`PooledBuffer`] guards which return themselves to the
//! pool when dropped, so a buffer goes back exactly once on every exit path
//! of a worker, including early returns and `?`.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{trace, warn};

use crate::metrics::ScanMetrics;

/// Default buffer size used by the finder: 16 MiB
pub const DEFAULT_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// A cache of buffers that all have exactly [`BufferPool::size`] bytes
pub struct BufferPool {
    size: usize,
    max_idle: usize,
    idle: Mutex<Vec<Vec<u8>>>,
    metrics: ScanMetrics,
}

impl BufferPool {
    /// Creates a pool of `size`-byte buffers retaining at most `max_idle`
    /// released buffers
    pub fn new(size: usize, max_idle: usize) -> Self {
        Self::with_metrics(size, max_idle, ScanMetrics::new())
    }

    /// Creates a pool that reports into existing metrics
    pub fn with_metrics(size: usize, max_idle: usize, metrics: ScanMetrics) -> Self {
        Self {
            size,
            max_idle,
            idle: Mutex::new(Vec::new()),
            metrics,
        }
    }

    /// The fixed size of every buffer in this pool
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of released buffers currently cached
    pub fn idle_count(&self) -> usize {
        self.idle().len()
    }

    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    /// Takes a cleared buffer from the cache or allocates a new one
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let cached = self.idle().pop();
        let buf = match cached {
            Some(buf) => {
                self.metrics.record_reuse();
                buf
            }
            None => {
                trace!("Allocating {} byte scan buffer", self.size);
                self.metrics.record_allocation(self.size as u64);
                vec![0; self.size]
            }
        };
        PooledBuffer { buf, pool: self }
    }

    /// Returns a buffer to the pool. Equivalent to dropping it.
    pub fn release(&self, buffer: PooledBuffer<'_>) {
        debug_assert!(std::ptr::eq(buffer.pool, self));
        drop(buffer);
    }

    fn put(&self, mut buf: Vec<u8>) {
        debug_assert_eq!(buf.len(), self.size);
        buf.fill(0);
        let mut idle = self.idle();
        if idle.len() < self.max_idle {
            idle.push(buf);
            return;
        }
        drop(idle);
        self.metrics.record_deallocation(buf.len() as u64);
    }

    /// Locks the idle list, recovering it if a holder panicked. Cached
    /// buffers are cleared before they are pushed.
    fn idle(&self) -> MutexGuard<'_, Vec<Vec<u8>>> {
        self.idle.lock().unwrap_or_else(|poisoned| {
            warn!("Buffer pool lock poisoned, recovering");
            self.idle.clear_poison();
            PoisonError::into_inner(poisoned)
        })
    }
}

impl fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPool")
            .field("size", &self.size)
            .field("max_idle", &self.max_idle)
            .field("idle", &self.idle_count())
            .finish()
    }
}

impl Drop for BufferPool {
    fn drop(&mut self) {
        let idle = self.idle.get_mut().unwrap_or_else(PoisonError::into_inner);
        for buf in idle.drain(..) {
            self.metrics.record_deallocation(buf.len() as u64);
        }
    }
}

/// A buffer on loan from a [`BufferPool`]
pub struct PooledBuffer<'a> {
    buf: Vec<u8>,
    pool: &'a BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.put(std::mem::take(&mut self.buf));
    }
}
