use log::warn;
use std::sync::OnceLock;

const ENV_PARALLEL: &str = "LINARUST_PARALLEL";
const ENV_MAX_CHUNK_BYTES: &str = "LINARUST_MAX_CHUNK_BYTES";
const ENV_MAX_SWEEPS: &str = "LINARUST_MAX_SWEEPS";

/// Execution policy for batched kernels.
///
/// Results never depend on these settings: they only decide how many batch
/// elements are processed together and whether they run on the rayon pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Run chunks on the rayon thread pool. Ignored without the `parallel` feature.
    pub parallel: bool,
    /// Chunks shorter than this run sequentially even when `parallel` is set.
    pub min_parallel_len: usize,
    /// Upper bound on the input bytes handled by one chunk.
    pub max_chunk_bytes: usize,
    /// Sweep limit for the Jacobi eigenvalue and singular value iterations.
    pub max_sweeps: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            parallel: cfg!(feature = "parallel"),
            min_parallel_len: 4,
            max_chunk_bytes: 64 << 20,
            max_sweeps: 60,
        }
    }
}

impl BatchConfig {
    /// Process-wide configuration, read from the environment on first use.
    pub fn global() -> &'static BatchConfig {
        static GLOBAL: OnceLock<BatchConfig> = OnceLock::new();
        GLOBAL.get_or_init(BatchConfig::from_env)
    }

    /// Defaults overridden by `LINARUST_PARALLEL`, `LINARUST_MAX_CHUNK_BYTES`
    /// and `LINARUST_MAX_SWEEPS`. Unparsable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = BatchConfig::default();
        if let Ok(raw) = std::env::var(ENV_PARALLEL) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.parallel = cfg!(feature = "parallel"),
                "0" | "false" | "no" | "off" => config.parallel = false,
                _ => warn!("Ignoring {}={:?}: expected a boolean", ENV_PARALLEL, raw),
            }
        }
        if let Some(v) = parse_positive(ENV_MAX_CHUNK_BYTES) {
            config.max_chunk_bytes = v;
        }
        if let Some(v) = parse_positive(ENV_MAX_SWEEPS) {
            config.max_sweeps = v;
        }
        config
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel && cfg!(feature = "parallel");
        self
    }

    pub fn with_max_chunk_bytes(mut self, bytes: usize) -> Self {
        self.max_chunk_bytes = bytes.max(1);
        self
    }

    pub fn with_max_sweeps(mut self, sweeps: usize) -> Self {
        self.max_sweeps = sweeps.max(1);
        self
    }

    /// Number of batch elements per chunk for elements of `element_bytes`.
    pub fn chunk_len(&self, element_bytes: usize) -> usize {
        (self.max_chunk_bytes / element_bytes.max(1)).max(1)
    }
}

fn parse_positive(key: &str) -> Option<usize> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(v) if v > 0 => Some(v),
        _ => {
            warn!("Ignoring {}={:?}: expected a positive integer", key, raw);
            None
        }
    }
}
