// Pass context for partitioning passes
// Holds shared state accessible to all passes

use crate::PartitionConfig;

/// Configuration for debug output
#[derive(Debug, Clone, Default)]
pub struct DebugConfig {
    /// Dump the module after each pass that changed it
    pub dump_after_each: bool,
    /// Report timing information
    pub print_timing: bool,
    /// Report pass names as they run
    pub verbose: bool,
}

impl DebugConfig {
    pub fn quiet() -> Self {
        DebugConfig {
            dump_after_each: false,
            print_timing: false,
            verbose: false,
        }
    }

    pub fn verbose() -> Self {
        DebugConfig {
            dump_after_each: false,
            print_timing: true,
            verbose: true,
        }
    }
}

/// Context passed to all passes
#[derive(Debug, Default)]
pub struct PassContext {
    /// Debug configuration
    pub debug: DebugConfig,
    /// Attribute keys the passes read and write
    pub config: PartitionConfig,
}

impl PassContext {
    pub fn new() -> Self {
        PassContext {
            debug: DebugConfig::default(),
            config: PartitionConfig::default(),
        }
    }

    pub fn with_debug(debug: DebugConfig) -> Self {
        PassContext {
            debug,
            config: PartitionConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: PartitionConfig) -> Self {
        self.config = config;
        self
    }
}
