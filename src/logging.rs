//! Director Logging and Tracing
//!
//! Event logging for director decisions, useful for:
//! - Tuning GC trigger behavior
//! - Debugging stalls and over-collection
//! - Production monitoring
//!
//! Log Levels:
//! - ERROR: unused (the director has no failure events)
//! - WARN: unusual conditions
//! - INFO: service lifecycle, GC requests
//! - DEBUG: worker resize requests
//! - TRACE: per-tick details

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Log level for director events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

/// Director event types
#[derive(Debug, Clone)]
pub enum DirectorEvent {
    /// Service thread started
    ServiceStarted { decision_hz: u32 },

    /// Service thread stopped
    ServiceStopped { ticks: u64 },

    /// Initial configuration computed before the first tick
    InitialConfigurationChosen {
        parallel_workers: u32,
        concurrent_workers: u32,
        tenuring_threshold: u32,
        medium_page_size: usize,
    },

    /// A GC request was dispatched to the driver
    GcRequested {
        cause: String,
        young_workers: u32,
        old_workers: u32,
    },

    /// A worker resize request was dispatched to a pool
    WorkerResizeRequested {
        generation: String,
        requested_nworkers: u32,
    },
}

/// Director logger configuration
#[derive(Debug, Clone)]
pub struct DirectorLoggerConfig {
    /// Minimum log level
    pub level: LogLevel,

    /// Enable console output
    pub console: bool,

    /// Enable JSON format
    pub json: bool,

    /// Enable timestamps
    pub timestamps: bool,
}

impl Default for DirectorLoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            console: true,
            json: false,
            timestamps: true,
        }
    }
}

/// Director logger - centralized event log for scheduling decisions
pub struct DirectorLogger {
    config: DirectorLoggerConfig,
    events: Mutex<Vec<(Instant, DirectorEvent)>>,
    enabled: AtomicBool,
}

impl DirectorLogger {
    /// Create new director logger
    pub fn new(config: DirectorLoggerConfig) -> Self {
        Self {
            config,
            events: Mutex::new(Vec::new()),
            enabled: AtomicBool::new(true),
        }
    }

    /// Enable logging
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// Disable logging
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Log a director event
    pub fn log(&self, event: DirectorEvent) {
        if !self.is_enabled() {
            return;
        }

        let event_level = self.event_level(&event);
        if event_level > self.config.level {
            return;
        }

        let timestamp = Instant::now();

        // Store event
        if let Ok(mut events) = self.events.lock() {
            events.push((timestamp, event.clone()));
        }

        // Output to console
        if self.config.console {
            self.output_console(&event);
        }
    }

    /// Get log level for event
    fn event_level(&self, event: &DirectorEvent) -> LogLevel {
        match event {
            DirectorEvent::ServiceStarted { .. }
            | DirectorEvent::ServiceStopped { .. }
            | DirectorEvent::InitialConfigurationChosen { .. }
            | DirectorEvent::GcRequested { .. } => LogLevel::Info,
            DirectorEvent::WorkerResizeRequested { .. } => LogLevel::Debug,
        }
    }

    /// Output to console
    fn output_console(&self, event: &DirectorEvent) {
        if self.config.timestamps {
            let now = chrono::Local::now();
            print!("[{}] ", now.format("%Y-%m-%d %H:%M:%S%.3f"));
        }

        if self.config.json {
            self.output_json(event);
        } else {
            self.output_human(event);
        }
    }

    /// Output in human-readable format
    fn output_human(&self, event: &DirectorEvent) {
        match event {
            DirectorEvent::ServiceStarted { decision_hz } => {
                println!("[Director] Service started ({} Hz)", decision_hz);
            },
            DirectorEvent::ServiceStopped { ticks } => {
                println!("[Director] Service stopped after {} ticks", ticks);
            },
            DirectorEvent::InitialConfigurationChosen {
                parallel_workers,
                concurrent_workers,
                tenuring_threshold,
                medium_page_size,
            } => {
                println!(
                    "[Director] Initial configuration: {} parallel, {} concurrent, \
                     tenuring threshold {}, medium page size {} bytes",
                    parallel_workers, concurrent_workers, tenuring_threshold, medium_page_size
                );
            },
            DirectorEvent::GcRequested {
                cause,
                young_workers,
                old_workers,
            } => {
                println!(
                    "[Director] GC requested: {} ({} young workers, {} old workers)",
                    cause, young_workers, old_workers
                );
            },
            DirectorEvent::WorkerResizeRequested {
                generation,
                requested_nworkers,
            } => {
                println!(
                    "[Director] Worker resize requested: {} generation -> {} workers",
                    generation, requested_nworkers
                );
            },
        }
    }

    /// Output in JSON format
    fn output_json(&self, event: &DirectorEvent) {
        let json = match event {
            DirectorEvent::ServiceStarted { decision_hz } => serde_json::json!({
                "type": "service_started",
                "decision_hz": decision_hz
            }),
            DirectorEvent::ServiceStopped { ticks } => serde_json::json!({
                "type": "service_stopped",
                "ticks": ticks
            }),
            DirectorEvent::InitialConfigurationChosen {
                parallel_workers,
                concurrent_workers,
                tenuring_threshold,
                medium_page_size,
            } => serde_json::json!({
                "type": "initial_configuration",
                "parallel_workers": parallel_workers,
                "concurrent_workers": concurrent_workers,
                "tenuring_threshold": tenuring_threshold,
                "medium_page_size": medium_page_size
            }),
            DirectorEvent::GcRequested {
                cause,
                young_workers,
                old_workers,
            } => serde_json::json!({
                "type": "gc_requested",
                "cause": cause,
                "young_workers": young_workers,
                "old_workers": old_workers
            }),
            DirectorEvent::WorkerResizeRequested {
                generation,
                requested_nworkers,
            } => serde_json::json!({
                "type": "worker_resize_requested",
                "generation": generation,
                "requested_nworkers": requested_nworkers
            }),
        };

        if let Ok(json_str) = serde_json::to_string(&json) {
            println!("{}", json_str);
        }
    }

    /// Get all events
    pub fn get_events(&self) -> Vec<(Instant, DirectorEvent)> {
        if let Ok(events) = self.events.lock() {
            events.clone()
        } else {
            Vec::new()
        }
    }

    /// Clear all events
    pub fn clear_events(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        if let Ok(events) = self.events.lock() {
            events.len()
        } else {
            0
        }
    }
}

impl Default for DirectorLogger {
    fn default() -> Self {
        Self::new(DirectorLoggerConfig::default())
    }
}

/// Global director logger
lazy_static::lazy_static! {
    static ref GLOBAL_LOGGER: Mutex<DirectorLogger> = Mutex::new(DirectorLogger::default());
}

/// Log a director event to the global logger
pub fn log_event(event: DirectorEvent) {
    if let Ok(logger) = GLOBAL_LOGGER.lock() {
        logger.log(event);
    }
}

/// Configure the global logger
pub fn configure_logger(config: DirectorLoggerConfig) {
    if let Ok(mut logger) = GLOBAL_LOGGER.lock() {
        *logger = DirectorLogger::new(config);
    }
}

/// Get the global logger event count
pub fn get_event_count() -> usize {
    if let Ok(logger) = GLOBAL_LOGGER.lock() {
        logger.event_count()
    } else {
        0
    }
}
