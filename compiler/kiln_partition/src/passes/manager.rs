// Pass manager for module partitioning
// Handles pass registration, ordering, and execution

use super::{OutlineCompilerFunctions, Pass, PassContext, PassError, PassFailure, PassResult};
use crate::GlobalSymbolCache;
use kiln_ir::Module;
use std::collections::HashSet;
use std::time::Instant;

/// Manages and runs passes
pub struct PassManager {
    pub(crate) passes: Vec<Box<dyn Pass>>,
    disabled: HashSet<String>,
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PassManager {
    pub fn new() -> Self {
        PassManager {
            passes: Vec::new(),
            disabled: HashSet::new(),
        }
    }

    /// Create a pass manager with the pre-lowering partitioning pipeline
    ///
    /// Externalization is not included: it runs after external lowering,
    /// usually in a separate manager.
    pub fn partitioning<C: GlobalSymbolCache + 'static>(cache: C, filter: &str) -> Self {
        let mut pm = PassManager::new();
        pm.add(OutlineCompilerFunctions::new(cache, filter));
        pm
    }

    /// Add a pass to the manager
    pub fn add<P: Pass + 'static>(&mut self, pass: P) {
        self.passes.push(Box::new(pass));
    }

    /// Disable a pass by name
    pub fn disable(&mut self, name: &str) {
        self.disabled.insert(name.to_string());
    }

    /// Enable a previously disabled pass
    pub fn enable(&mut self, name: &str) {
        self.disabled.remove(name);
    }

    /// Check if a pass is enabled
    pub fn is_enabled(&self, name: &str) -> bool {
        !self.disabled.contains(name)
    }

    /// Run all enabled passes on the module, in order
    ///
    /// Returns the result of every pass that ran.
    pub fn run(
        &mut self,
        module: &mut Module,
        ctx: &mut PassContext,
    ) -> Result<Vec<(&'static str, PassResult)>, PassError> {
        // Check pass dependencies
        self.verify_dependencies()?;

        let mut results = Vec::with_capacity(self.passes.len());
        for pass in &mut self.passes {
            let name = pass.name();

            // Skip disabled passes (unless required)
            if self.disabled.contains(name) {
                if pass.required() {
                    return Err(PassError::new(name, PassFailure::RequiredDisabled));
                }
                if ctx.debug.verbose {
                    tracing::debug!(pass = name, "skipping disabled pass");
                }
                continue;
            }

            if ctx.debug.verbose {
                tracing::debug!(pass = name, "running pass");
            }

            let start = Instant::now();
            let mut result = pass.run(module, ctx)?;
            result.stats.duration = start.elapsed();

            if ctx.debug.print_timing {
                tracing::info!(
                    pass = name,
                    duration = ?result.stats.duration,
                    changed = result.changed,
                    items = result.stats.items_transformed,
                    "pass completed"
                );
            }

            if ctx.debug.dump_after_each && result.changed {
                tracing::debug!(pass = name, "module after pass:\n{module}");
            }

            results.push((name, result));
        }

        Ok(results)
    }

    /// Verify that all pass dependencies are satisfied
    fn verify_dependencies(&self) -> Result<(), PassError> {
        let pass_names: HashSet<_> = self.passes.iter().map(|p| p.name()).collect();
        let mut seen = HashSet::new();

        for pass in &self.passes {
            for req in pass.requires() {
                // Check that required pass exists
                if !pass_names.contains(req) {
                    return Err(PassError::new(
                        pass.name(),
                        PassFailure::MissingDependency(*req),
                    ));
                }
                // Check that required pass comes before this one
                if !seen.contains(req) {
                    return Err(PassError::new(
                        pass.name(),
                        PassFailure::DependencyOrder(*req),
                    ));
                }
            }
            seen.insert(pass.name());
        }

        Ok(())
    }

    /// Get the number of passes
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Get pass names
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }
}
