//! Attribute keys shared by the partitioning passes.

/// Attribute keys the passes read and write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionConfig {
    /// Marker naming the external compiler a function is destined for.
    pub compiler_attr: String,
    /// External name of an outlined unit.
    pub global_symbol_attr: String,
    /// Sole attribute left on a unit after externalization.
    pub extern_attr: String,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        PartitionConfig {
            compiler_attr: "Compiler".to_string(),
            global_symbol_attr: "global_symbol".to_string(),
            extern_attr: "Extern".to_string(),
        }
    }
}

impl PartitionConfig {
    /// Whether a unit marked for `compiler` is selected by `filter`.
    ///
    /// An empty filter selects every compiler.
    pub fn selects(filter: &str, compiler: &str) -> bool {
        filter.is_empty() || filter == compiler
    }
}
