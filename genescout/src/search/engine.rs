use memchr::memmem::Finder;
use once_cell::sync::OnceCell;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fs::File;
use std::io;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use super::partition::{Partition, Window};
use super::validator::{validate_fits, validate_template};
use super::window::scan_window;
use crate::errors::{SearchError, SearchResult};
use crate::metrics::ScanMetrics;
use crate::pool::{BufferPool, DEFAULT_BUFFER_SIZE};

/// Tuning knobs for a [`GeneFinder`]
#[derive(Debug, Clone)]
pub struct FinderOptions {
    /// Size of the buffers in the shared pool, and so of each scan window
    pub buffer_size: usize,
    /// How many released buffers the shared pool keeps around
    pub max_idle_buffers: usize,
    /// Number of worker threads scanning windows
    pub thread_count: NonZeroUsize,
}

impl Default for FinderOptions {
    fn default() -> Self {
        let cpus = NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN);
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_idle_buffers: cpus.get(),
            thread_count: cpus,
        }
    }
}

/// Searches a single immutable DNA file for gene sequences.
///
/// The file is split into overlapping windows which are scanned in
/// parallel on the finder's own thread pool. Scan buffers come from a pool
/// shared by every call to [`GeneFinder::find`], so concurrent and repeated
/// searches do not pay for fresh multi-megabyte allocations.
///
/// The file length is captured once at construction; the file must not be
/// modified while the finder is alive.
#[derive(Debug)]
pub struct GeneFinder {
    file: File,
    file_len: u64,
    pool: BufferPool,
    max_idle: usize,
    workers: ThreadPool,
}

impl GeneFinder {
    /// Creates a finder over `file` with default options
    pub fn new(file: File) -> SearchResult<Self> {
        Self::with_options(file, FinderOptions::default())
    }

    /// Creates a finder over `file`
    pub fn with_options(file: File, options: FinderOptions) -> SearchResult<Self> {
        if options.buffer_size == 0 {
            return Err(SearchError::config_error("buffer size must be positive"));
        }

        let file_len = file.metadata()?.len();
        let workers = ThreadPoolBuilder::new()
            .num_threads(options.thread_count.get())
            .thread_name(|i| format!("genescout-worker-{}", i))
            .build()
            .map_err(|e| SearchError::config_error(e.to_string()))?;

        info!(
            "Gene finder ready: {} bytes, {} byte buffers, {} workers",
            file_len,
            options.buffer_size,
            options.thread_count
        );

        Ok(Self {
            file,
            file_len,
            pool: BufferPool::new(options.buffer_size, options.max_idle_buffers),
            max_idle: options.max_idle_buffers,
            workers,
        })
    }

    /// Opens the DNA file at `path` with default options
    pub fn open(path: impl AsRef<Path>) -> SearchResult<Self> {
        Self::open_with_options(path, FinderOptions::default())
    }

    /// Opens the DNA file at `path`
    pub fn open_with_options(path: impl AsRef<Path>, options: FinderOptions) -> SearchResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SearchError::from_open(path, e))?;
        Self::with_options(file, options)
    }

    /// Length of the DNA file in bytes
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Buffer size of the shared pool
    pub fn buffer_size(&self) -> usize {
        self.pool.size()
    }

    /// Metrics of the shared pool and the scans run through it
    pub fn metrics(&self) -> &ScanMetrics {
        self.pool.metrics()
    }

    /// Reports whether `gene` occurs anywhere in the DNA file.
    ///
    /// Malformed genes are rejected with [`SearchError::Validation`] before
    /// any I/O. Genes that do not fit in the shared buffers are scanned with
    /// a pool private to this call, sized to twice the gene length.
    ///
    /// When a read fails the error is returned even if another window
    /// matched at the same time.
    pub fn find(&self, gene: &str) -> SearchResult<bool> {
        if let Err(e) =
            validate_template(gene).and_then(|_| validate_fits(gene.len(), self.file_len))
        {
            debug!("Rejected gene of {} bytes: {}", gene.len(), e);
            return Err(e.into());
        }

        // A buffer must hold the gene plus at least one byte of lead room
        let scoped;
        let pool = if gene.len() < self.pool.size() {
            &self.pool
        } else {
            scoped = BufferPool::with_metrics(
                gene.len() * 2,
                self.max_idle,
                self.pool.metrics().clone(),
            );
            &scoped
        };

        let partition = Partition::new(self.file_len, pool.size(), gene.len())
            .ok_or_else(|| SearchError::config_error("buffer cannot hold gene"))?;

        debug!(
            "Searching {} byte gene in {} windows of {} bytes (stride {}, {} pool)",
            gene.len(),
            partition.len(),
            pool.size(),
            partition.stride(),
            if std::ptr::eq(pool, &self.pool) {
                "shared"
            } else {
                "call-scoped"
            }
        );

        let needle = Finder::new(gene.as_bytes());
        let signal = ScanSignal::default();

        self.workers.install(|| {
            (0..partition.len())
                .into_par_iter()
                .with_max_len(1)
                .filter_map(|i| partition.window(i))
                .for_each(|window| self.scan(window, pool, &needle, &signal));
        });

        pool.metrics().log_stats();
        signal.into_outcome().map_err(SearchError::IoError)
    }

    fn scan(&self, window: Window, pool: &BufferPool, needle: &Finder<'_>, signal: &ScanSignal) {
        if signal.is_cancelled() {
            pool.metrics().record_skip();
            return;
        }

        let mut buf = pool.acquire();
        let outcome = scan_window(&self.file, window, &mut buf, needle);
        pool.release(buf);

        // Reads can't be interrupted, so cancellation is observed afterwards
        if signal.is_cancelled() {
            pool.metrics().record_skip();
            return;
        }

        match outcome {
            Ok((found, n)) => {
                pool.metrics().record_window(n);
                if found {
                    signal.found();
                }
            }
            Err(e) => {
                warn!("Failed reading window at offset {}: {}", window.offset, e);
                signal.failed(e);
            }
        }
    }
}

/// Shared state between the workers of one `find` call
#[derive(Debug, Default)]
struct ScanSignal {
    cancelled: AtomicBool,
    found: AtomicBool,
    failure: OnceCell<io::Error>,
}

impl ScanSignal {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn found(&self) {
        self.found.store(true, Ordering::Release);
        self.cancelled.store(true, Ordering::Release);
    }

    /// Only the first failure is kept
    fn failed(&self, err: io::Error) {
        let _ = self.failure.set(err);
        self.cancelled.store(true, Ordering::Release);
    }

    fn into_outcome(self) -> io::Result<bool> {
        match self.failure.into_inner() {
            Some(err) => Err(err),
            None => Ok(self.found.into_inner()),
        }
    }
}
