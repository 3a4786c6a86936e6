pub mod config;
pub mod errors;
pub mod metrics;
pub mod pool;
pub mod search;

pub use config::FinderConfig;
pub use errors::{SearchError, SearchResult, ValidationError};
pub use pool::{BufferPool, PooledBuffer, DEFAULT_BUFFER_SIZE};
pub use search::{FinderOptions, GeneFinder};
