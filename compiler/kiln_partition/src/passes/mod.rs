// Pass infrastructure for module partitioning
//
// Provides a framework for ordered module transformations with dependencies.
//
// Module structure:
// - mod.rs: Pass trait, PassResult and PassError
// - manager.rs: PassManager for running passes
// - context.rs: PassContext for shared state
// - outline.rs: hoisting marked function literals into top-level units
// - mark_extern.rs: turning outlined units into external declarations

mod context;
mod manager;
mod mark_extern;
mod outline;

pub use context::{DebugConfig, PassContext};
pub use manager::PassManager;
pub use mark_extern::{mark_compiler_functions_as_extern, MarkCompilerFunctionsAsExtern};
pub use outline::{
    outline_compiler_functions, outline_compiler_functions_with_existing_global_symbols,
    OutlineCompilerFunctions,
};

use std::time::Duration;

use kiln_ir::Module;
use thiserror::Error;

use crate::PartitionError;

/// Result of running a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassResult {
    /// Whether the pass made any changes
    pub changed: bool,
    /// Statistics about the pass execution
    pub stats: PassStats,
}

impl PassResult {
    pub fn unchanged() -> Self {
        PassResult {
            changed: false,
            stats: PassStats::default(),
        }
    }

    pub fn changed(items_transformed: usize) -> Self {
        PassResult {
            changed: true,
            stats: PassStats {
                duration: Duration::ZERO,
                items_transformed,
            },
        }
    }

    /// `changed` when anything was transformed, otherwise `unchanged`.
    pub fn from_count(items_transformed: usize) -> Self {
        if items_transformed == 0 {
            PassResult::unchanged()
        } else {
            PassResult::changed(items_transformed)
        }
    }
}

/// Statistics collected during pass execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Time taken by the pass
    pub duration: Duration,
    /// Number of items transformed
    pub items_transformed: usize,
}

/// What went wrong in a pass
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PassFailure {
    #[error(transparent)]
    Partition(#[from] PartitionError),
    #[error("required pass '{0}' not found in pipeline")]
    MissingDependency(&'static str),
    #[error("required pass '{0}' must run first")]
    DependencyOrder(&'static str),
    #[error("cannot disable required pass")]
    RequiredDisabled,
}

/// Error during pass execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pass '{pass_name}' failed: {source}")]
pub struct PassError {
    pub pass_name: String,
    pub source: PassFailure,
}

impl PassError {
    pub fn new(pass_name: &str, source: impl Into<PassFailure>) -> Self {
        PassError {
            pass_name: pass_name.to_string(),
            source: source.into(),
        }
    }

    /// The partitioning error, if that is what failed.
    pub fn partition_error(&self) -> Option<&PartitionError> {
        match &self.source {
            PassFailure::Partition(err) => Some(err),
            _ => None,
        }
    }
}

/// Trait for module passes
pub trait Pass {
    /// Name of this pass (for debugging and logging)
    fn name(&self) -> &'static str;

    /// Whether this pass is required (cannot be disabled)
    fn required(&self) -> bool {
        false
    }

    /// Run the pass on the module
    fn run(&mut self, module: &mut Module, ctx: &mut PassContext) -> Result<PassResult, PassError>;

    /// Names of passes that must run before this one
    fn requires(&self) -> &[&'static str] {
        &[]
    }
}

impl<T: Pass + ?Sized> Pass for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn required(&self) -> bool {
        (**self).required()
    }

    fn run(&mut self, module: &mut Module, ctx: &mut PassContext) -> Result<PassResult, PassError> {
        (**self).run(module, ctx)
    }

    fn requires(&self) -> &[&'static str] {
        (**self).requires()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_ir::GlobalVar;
    use kiln_path::Path;

    #[test]
    fn test_pass_result_unchanged() {
        let result = PassResult::unchanged();
        assert!(!result.changed);
        assert_eq!(result.stats.items_transformed, 0);
    }

    #[test]
    fn test_pass_result_changed() {
        let result = PassResult::changed(5);
        assert!(result.changed);
        assert_eq!(result.stats.items_transformed, 5);
    }

    #[test]
    fn test_pass_result_from_count() {
        assert_eq!(PassResult::from_count(0), PassResult::unchanged());
        assert_eq!(PassResult::from_count(2), PassResult::changed(2));
    }

    #[test]
    fn test_pass_error_wraps_partition_error() {
        let source = PartitionError::MissingGlobalSymbol {
            unit: GlobalVar::new("main"),
            path: Path::root().attr("body").attr("callee"),
            compiler: "dnnl".to_string(),
            key: "global_symbol".to_string(),
        };
        let err = PassError::new("outline_compiler_functions", source.clone());
        assert_eq!(err.pass_name, "outline_compiler_functions");
        assert_eq!(err.partition_error(), Some(&source));
        assert_eq!(
            err.to_string(),
            "pass 'outline_compiler_functions' failed: function at <root>.body.callee in @main \
             is marked for `dnnl` but has no `global_symbol` attribute"
        );
    }

    #[test]
    fn test_pass_error_without_partition_error() {
        let err = PassError::new("late", PassFailure::MissingDependency("early"));
        assert!(err.partition_error().is_none());
        assert!(err.to_string().contains("'early' not found"));
    }
}
