//! Configuration Module - Director Tuning Parameters
//!
//! Manages all tunables consumed by the director and its heuristics.
//! All values are read-only for the lifetime of a director instance.

/// Main configuration for the collection-scheduling director
///
/// Stores all parameters affecting GC-start and worker-sizing decisions.
/// Most parameters have sensible defaults.
///
/// # Examples
///
/// ```rust
/// use gc_director::DirectorConfig;
///
/// // Use default configuration
/// let config = DirectorConfig::default();
///
/// // Custom configuration for a fixed-interval deployment
/// let config = DirectorConfig {
///     collection_interval_major: 300.0,
///     collection_interval_only: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct DirectorConfig {
    /// Number of concurrent GC worker threads available to the collector
    ///
    /// Upper bound for the combined young+old worker budget.
    /// Default: 1/4 of the CPUs, at least 1
    pub conc_gc_threads: u32,

    /// Number of CPUs considered active at startup
    ///
    /// Used when sizing the initial parallel/concurrent worker counts.
    /// Default: auto-detected
    pub active_cpus: u32,

    /// Maximum heap size in bytes
    ///
    /// Used for page geometry and worker-count caps.
    /// Default: derived from physical memory
    pub max_heap_size: usize,

    /// Minor collection timer interval in seconds
    ///
    /// If > 0, a young collection is started whenever this much time has
    /// passed since the last young collection. 0 disables the timer.
    ///
    /// Default: 0 (disabled)
    pub collection_interval_minor: f64,

    /// Major collection timer interval in seconds
    ///
    /// If > 0, an old collection is started whenever this much time has
    /// passed since the last old collection. 0 disables the timer.
    ///
    /// Default: 0 (disabled)
    pub collection_interval_major: f64,

    /// Only collect on timer expiry
    ///
    /// Disables the warmup, proactive, allocation-rate and high-usage
    /// rules, leaving the timer rules as the only GC triggers.
    ///
    /// Default: false
    pub collection_interval_only: bool,

    /// Allocation spike tolerance factor
    ///
    /// The average allocation rate is multiplied by this factor before
    /// projecting time-until-OOM, guarding against phase changes in the
    /// allocation rate.
    ///
    /// Default: 2.0
    pub allocation_spike_tolerance: f64,

    /// Enable proactive major collections
    ///
    /// Default: true
    pub proactive: bool,

    /// Enable dynamic GC worker sizing
    ///
    /// When enabled, the number of young workers is derived from the
    /// projected time-until-OOM and the old worker count from young/old
    /// amortization. When disabled, worker counts use a static split and
    /// the director never issues resize requests.
    ///
    /// Default: true
    pub use_dynamic_gc_threads: bool,

    /// Maximum tenuring threshold
    ///
    /// Upper bound for the computed initial tenuring threshold.
    /// Default: 15
    pub max_tenuring_threshold: u32,

    /// Small page size in bytes
    ///
    /// Must be a power of two.
    /// Default: 2MB
    pub page_size_small: usize,

    /// Heap granule size in bytes
    ///
    /// Lower bound for the medium page size. Must be a power of two.
    /// Default: 2MB
    pub granule_size: usize,

    /// Decision frequency in Hz
    ///
    /// The director evaluates its rules every `1000 / decision_hz`
    /// milliseconds unless woken early.
    ///
    /// Default: 10
    pub decision_hz: u32,
}

impl Default for DirectorConfig {
    /// Default configuration for the director
    ///
    /// Balanced for general-purpose server applications.
    fn default() -> Self {
        let num_cpus = num_cpus::get() as u32;
        let total_memory = get_total_memory();
        let max_heap = calculate_max_heap(total_memory);

        DirectorConfig {
            conc_gc_threads: (num_cpus / 4).max(1),
            active_cpus: num_cpus.max(1),
            max_heap_size: max_heap,

            // Timers
            collection_interval_minor: 0.0,
            collection_interval_major: 0.0,
            collection_interval_only: false,

            // Rule tuning
            allocation_spike_tolerance: 2.0,
            proactive: true,
            use_dynamic_gc_threads: true,

            // Page geometry
            max_tenuring_threshold: 15,
            page_size_small: 2 * MB,
            granule_size: 2 * MB,

            // Cadence
            decision_hz: 10,
        }
    }
}

impl DirectorConfig {
    /// Validate configuration
    ///
    /// Checks if all values are in valid ranges.
    /// Returns error if configuration is invalid.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gc_director::DirectorConfig;
    ///
    /// let config = DirectorConfig {
    ///     max_heap_size: 0,  // Invalid!
    ///     ..Default::default()
    /// };
    ///
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_heap_size == 0 {
            return Err(ConfigError::InvalidHeapSize(
                "max_heap_size must be > 0".to_string(),
            ));
        }

        if self.conc_gc_threads == 0 {
            return Err(ConfigError::InvalidThreadCount(
                "conc_gc_threads must be > 0".to_string(),
            ));
        }

        if self.active_cpus == 0 {
            return Err(ConfigError::InvalidThreadCount(
                "active_cpus must be > 0".to_string(),
            ));
        }

        if self.page_size_small == 0 || !self.page_size_small.is_power_of_two() {
            return Err(ConfigError::InvalidPageSize(
                "page_size_small must be a nonzero power of two".to_string(),
            ));
        }

        if self.granule_size < self.page_size_small || !self.granule_size.is_power_of_two() {
            return Err(ConfigError::InvalidPageSize(
                "granule_size must be a power of two >= page_size_small".to_string(),
            ));
        }

        if !self.collection_interval_minor.is_finite() || self.collection_interval_minor < 0.0 {
            return Err(ConfigError::InvalidInterval(
                "collection_interval_minor must be finite and >= 0".to_string(),
            ));
        }

        if !self.collection_interval_major.is_finite() || self.collection_interval_major < 0.0 {
            return Err(ConfigError::InvalidInterval(
                "collection_interval_major must be finite and >= 0".to_string(),
            ));
        }

        if !self.allocation_spike_tolerance.is_finite() || self.allocation_spike_tolerance < 0.0 {
            return Err(ConfigError::InvalidSpikeTolerance(
                "allocation_spike_tolerance must be finite and >= 0".to_string(),
            ));
        }

        if self.decision_hz == 0 || self.decision_hz > 1000 {
            return Err(ConfigError::InvalidDecisionRate(
                "decision_hz must be between 1 and 1000".to_string(),
            ));
        }

        Ok(())
    }

    /// Build configuration from environment variables
    ///
    /// Overrides defaults with environment variables:
    /// - GC_DIRECTOR_MAX_HEAP
    /// - GC_DIRECTOR_CONC_GC_THREADS
    /// - GC_DIRECTOR_INTERVAL_MINOR (seconds)
    /// - GC_DIRECTOR_INTERVAL_MAJOR (seconds)
    /// - GC_DIRECTOR_INTERVAL_ONLY
    /// - GC_DIRECTOR_PROACTIVE
    /// - GC_DIRECTOR_DYNAMIC_THREADS
    /// - GC_DIRECTOR_DECISION_HZ
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GC_DIRECTOR_MAX_HEAP") {
            if let Ok(size) = val.parse::<usize>() {
                config.max_heap_size = size;
            }
        }

        if let Ok(val) = std::env::var("GC_DIRECTOR_CONC_GC_THREADS") {
            if let Ok(threads) = val.parse::<u32>() {
                config.conc_gc_threads = threads;
            }
        }

        if let Ok(val) = std::env::var("GC_DIRECTOR_INTERVAL_MINOR") {
            if let Ok(secs) = val.parse::<f64>() {
                config.collection_interval_minor = secs;
            }
        }

        if let Ok(val) = std::env::var("GC_DIRECTOR_INTERVAL_MAJOR") {
            if let Ok(secs) = val.parse::<f64>() {
                config.collection_interval_major = secs;
            }
        }

        if let Ok(val) = std::env::var("GC_DIRECTOR_INTERVAL_ONLY") {
            config.collection_interval_only = val == "1" || val.eq_ignore_ascii_case("true");
        }

        if let Ok(val) = std::env::var("GC_DIRECTOR_PROACTIVE") {
            config.proactive = val == "1" || val.eq_ignore_ascii_case("true");
        }

        if let Ok(val) = std::env::var("GC_DIRECTOR_DYNAMIC_THREADS") {
            config.use_dynamic_gc_threads = val == "1" || val.eq_ignore_ascii_case("true");
        }

        if let Ok(val) = std::env::var("GC_DIRECTOR_DECISION_HZ") {
            if let Ok(hz) = val.parse::<u32>() {
                config.decision_hz = hz;
            }
        }

        config
    }

    /// Duration of one decision quantum
    pub fn decision_quantum(&self) -> std::time::Duration {
        std::time::Duration::from_millis(1000 / self.decision_hz as u64)
    }
}

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid heap size: {0}")]
    InvalidHeapSize(String),

    #[error("Invalid page size: {0}")]
    InvalidPageSize(String),

    #[error("Invalid thread count: {0}")]
    InvalidThreadCount(String),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Invalid spike tolerance: {0}")]
    InvalidSpikeTolerance(String),

    #[error("Invalid decision rate: {0}")]
    InvalidDecisionRate(String),
}

// ============================================================================
// CONSTANTS & HELPERS
// ============================================================================

const KB: usize = 1024;
const MB: usize = 1024 * 1024;
const GB: usize = 1024 * 1024 * 1024;

/// Get total physical memory in bytes
fn get_total_memory() -> usize {
    #[cfg(target_os = "linux")]
    {
        if let Ok(meminfo) = std::fs::read_to_string("/proc/meminfo") {
            for line in meminfo.lines() {
                if line.starts_with("MemTotal:") {
                    let parts: Vec<&str> = line.split_whitespace().collect();
                    if parts.len() >= 2 {
                        if let Ok(kb) = parts[1].parse::<usize>() {
                            return kb * KB;
                        }
                    }
                }
            }
        }
    }

    8 * GB
}

/// Calculate max heap size based on available memory
fn calculate_max_heap(total_memory: usize) -> usize {
    let ratio = if total_memory < 4 * GB {
        0.5
    } else if total_memory < 16 * GB {
        0.4
    } else {
        0.3
    };

    let calculated = (total_memory as f32 * ratio) as usize;
    calculated.min(32 * GB)
}
