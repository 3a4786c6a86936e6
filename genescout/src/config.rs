use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::pool::DEFAULT_BUFFER_SIZE;
use crate::search::FinderOptions;

/// Environment variable naming the DNA file; overrides every config file
pub const DNA_FILE_PATH_ENV: &str = "DNA_FILE_PATH";

/// Configuration for the gene finder and the server in front of it.
///
/// # Configuration Locations
///
/// Sources are merged in order of precedence, lowest first:
/// 1. Global `$HOME/.config/genescout/config.yaml`
/// 2. Local `.genescout.yaml` in the current directory
/// 3. Custom config file specified via `--config`
/// 4. The `DNA_FILE_PATH` environment variable (only `dna_file_path`)
///
/// # Configuration Format
///
/// ```yaml
/// # File scanned for gene sequences (required)
/// dna_file_path: "/data/genome.dna"
///
/// # Scan buffer size in bytes (default: 16 MiB)
/// buffer_size: 16777216
///
/// # Released buffers kept for reuse (default: CPU cores)
/// max_idle_buffers: 8
///
/// # Worker threads (default: CPU cores)
/// thread_count: 8
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
///
/// # Address the HTTP server listens on
/// bind_addr: "0.0.0.0:8080"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Path to the DNA file
    #[serde(default)]
    pub dna_file_path: PathBuf,

    /// Size of each shared scan buffer in bytes
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Maximum number of released buffers kept for reuse
    #[serde(default = "default_max_idle_buffers")]
    pub max_idle_buffers: usize,

    /// Number of threads scanning windows
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Address the HTTP server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn default_max_idle_buffers() -> usize {
    num_cpus::get()
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Values supplied on the command line; `None` leaves the loaded value alone
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dna_file_path: Option<PathBuf>,
    pub buffer_size: Option<usize>,
    pub thread_count: Option<NonZeroUsize>,
    pub log_level: Option<String>,
    pub bind_addr: Option<SocketAddr>,
}

impl FinderConfig {
    /// Creates a configuration for `dna_file_path` with every other value
    /// at its default
    pub fn new(dna_file_path: impl Into<PathBuf>) -> Self {
        Self {
            dna_file_path: dna_file_path.into(),
            buffer_size: default_buffer_size(),
            max_idle_buffers: default_max_idle_buffers(),
            thread_count: default_thread_count(),
            log_level: default_log_level(),
            bind_addr: default_bind_addr(),
        }
    }

    /// Loads configuration from the default locations and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from a specific file plus the default locations
    /// and the environment
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var(DNA_FILE_PATH_ENV).ok();
        Self::load_with_env(config_path, env_path.as_deref())
    }

    /// Loads configuration with an explicit value standing in for the
    /// `DNA_FILE_PATH` environment variable
    pub fn load_with_env(
        config_path: Option<&Path>,
        env_path: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        // Default config locations
        let config_files = [
            // Global config
            dirs::config_dir().map(|p| p.join("genescout/config.yaml")),
            // Local config
            Some(PathBuf::from(".genescout.yaml")),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicit config file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        if let Some(path) = env_path.filter(|p| !p.is_empty()) {
            builder = builder.set_override("dna_file_path", path)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Rejects values the finder cannot work with. Call after merging CLI
    /// values, since the DNA file path may only be given there.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 {
            return Err(ConfigError::Message(
                "buffer_size must be greater than zero".to_string(),
            ));
        }
        if self.dna_file_path.as_os_str().is_empty() {
            return Err(ConfigError::Message(format!(
                "missing dna_file_path (set it in a config file or {})",
                DNA_FILE_PATH_ENV
            )));
        }
        Ok(())
    }

    /// Merges command line values into the loaded configuration
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        // CLI values take precedence over config file values
        if let Some(path) = cli.dna_file_path {
            self.dna_file_path = path;
        }
        if let Some(size) = cli.buffer_size {
            self.buffer_size = size;
        }
        if let Some(threads) = cli.thread_count {
            self.thread_count = threads;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        if let Some(addr) = cli.bind_addr {
            self.bind_addr = addr;
        }
        self
    }

    /// Finder options described by this configuration
    pub fn finder_options(&self) -> FinderOptions {
        FinderOptions {
            buffer_size: self.buffer_size,
            max_idle_buffers: self.max_idle_buffers,
            thread_count: self.thread_count,
        }
    }
}
