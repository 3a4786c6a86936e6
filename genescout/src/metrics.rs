use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Tracks buffer usage and scan progress
#[derive(Debug, Clone)]
pub struct ScanMetrics {
    // Buffer metrics
    buffers_allocated: Arc<AtomicU64>,
    buffers_reused: Arc<AtomicU64>,
    bytes_held: Arc<AtomicU64>,
    peak_bytes_held: Arc<AtomicU64>,

    // Window metrics
    windows_scanned: Arc<AtomicU64>,
    windows_skipped: Arc<AtomicU64>,
    bytes_read: Arc<AtomicU64>,
}

impl ScanMetrics {
    /// Creates a new ScanMetrics instance
    pub fn new() -> Self {
        Self {
            buffers_allocated: Arc::new(AtomicU64::new(0)),
            buffers_reused: Arc::new(AtomicU64::new(0)),
            bytes_held: Arc::new(AtomicU64::new(0)),
            peak_bytes_held: Arc::new(AtomicU64::new(0)),
            windows_scanned: Arc::new(AtomicU64::new(0)),
            windows_skipped: Arc::new(AtomicU64::new(0)),
            bytes_read: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records a freshly allocated buffer of `bytes` bytes
    pub fn record_allocation(&self, bytes: u64) {
        self.buffers_allocated.fetch_add(1, Ordering::Relaxed);
        let total = self.bytes_held.fetch_add(bytes, Ordering::Relaxed) + bytes;
        let mut peak = self.peak_bytes_held.load(Ordering::Relaxed);
        while total > peak {
            match self.peak_bytes_held.compare_exchange_weak(
                peak,
                total,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => peak = current,
            }
        }
        debug!("Buffer allocated: {} bytes, held: {} bytes", bytes, total);
    }

    /// Records a buffer of `bytes` bytes being freed instead of cached
    pub fn record_deallocation(&self, bytes: u64) {
        let total = self.bytes_held.fetch_sub(bytes, Ordering::Relaxed) - bytes;
        debug!("Buffer dropped: {} bytes, held: {} bytes", bytes, total);
    }

    /// Records a buffer handed out from the cache
    pub fn record_reuse(&self) {
        self.buffers_reused.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a completed window scan
    pub fn record_window(&self, bytes_read: usize) {
        self.windows_scanned.fetch_add(1, Ordering::Relaxed);
        self.bytes_read
            .fetch_add(bytes_read as u64, Ordering::Relaxed);
    }

    /// Records a window abandoned because the search was already decided
    pub fn record_skip(&self) {
        self.windows_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn buffers_allocated(&self) -> u64 {
        self.buffers_allocated.load(Ordering::Relaxed)
    }

    pub fn buffers_reused(&self) -> u64 {
        self.buffers_reused.load(Ordering::Relaxed)
    }

    /// Gets current statistics
    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            buffers_allocated: self.buffers_allocated.load(Ordering::Relaxed),
            buffers_reused: self.buffers_reused.load(Ordering::Relaxed),
            bytes_held: self.bytes_held.load(Ordering::Relaxed),
            peak_bytes_held: self.peak_bytes_held.load(Ordering::Relaxed),
            windows_scanned: self.windows_scanned.load(Ordering::Relaxed),
            windows_skipped: self.windows_skipped.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
        }
    }

    /// Logs current statistics
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        debug!(
            "Scan stats:\n\
             Buffers allocated/reused: {}/{}\n\
             Bytes held: {} (peak {})\n\
             Windows scanned/skipped: {}/{}\n\
             Bytes read: {}",
            stats.buffers_allocated,
            stats.buffers_reused,
            stats.bytes_held,
            stats.peak_bytes_held,
            stats.windows_scanned,
            stats.windows_skipped,
            stats.bytes_read
        );
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of [`ScanMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub buffers_allocated: u64,
    pub buffers_reused: u64,
    pub bytes_held: u64,
    pub peak_bytes_held: u64,
    pub windows_scanned: u64,
    pub windows_skipped: u64,
    pub bytes_read: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_tracking() {
        let metrics = ScanMetrics::new();

        metrics.record_allocation(1000);
        metrics.record_allocation(500);
        let stats = metrics.get_stats();
        assert_eq!(stats.buffers_allocated, 2);
        assert_eq!(stats.bytes_held, 1500);
        assert_eq!(stats.peak_bytes_held, 1500);

        metrics.record_deallocation(500);
        let stats = metrics.get_stats();
        assert_eq!(stats.bytes_held, 1000);
        assert_eq!(stats.peak_bytes_held, 1500); // Peak should remain unchanged
    }

    #[test]
    fn test_window_tracking() {
        let metrics = ScanMetrics::new();

        metrics.record_window(64);
        metrics.record_window(36);
        metrics.record_skip();
        let stats = metrics.get_stats();
        assert_eq!(stats.windows_scanned, 2);
        assert_eq!(stats.windows_skipped, 1);
        assert_eq!(stats.bytes_read, 100);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = ScanMetrics::new();
        let clone = metrics.clone();

        clone.record_reuse();
        assert_eq!(metrics.buffers_reused(), 1);
    }
}
