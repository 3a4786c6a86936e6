//! Concurrent gene search over a single flat file.
//!
//! A search runs in four stages:
//!
//! 1. **Validation** ([`validator`]): the gene must start with
//!    [`GENE_PREFIX`] and use only the bases `A`, `G`, `C` and `T`, and it
//!    must not be longer than the file. Nothing is read until this passes.
//! 2. **Buffer selection**: the finder's shared [`BufferPool`](crate::pool::BufferPool)
//!    is used when the gene fits in its buffers, otherwise a pool of twice
//!    the gene length is created for the one call.
//! 3. **Partitioning** ([`partition`]): the file is cut into windows of one
//!    buffer each, starting `buffer - gene` bytes apart so a match that
//!    straddles a boundary is still wholly inside the next window.
//! 4. **Scanning** ([`engine`]): every window becomes a Rayon task that
//!    reads its bytes with a positioned read and looks for the gene. The
//!    first match or the first read failure cancels the tasks that have not
//!    finished yet.
//!
//! ```rust,ignore
//! let finder = GeneFinder::open("genome.dna")?;
//! if finder.find("AAAAAAAAAAAGCT")? {
//!     println!("found");
//! }
//! ```
pub mod engine;
pub mod partition;
pub mod validator;
pub mod window;

pub use engine::{FinderOptions, GeneFinder};
pub use partition::{Partition, Window};
pub use validator::{validate_template, GENE_PREFIX, LEGAL_BASES};
