//! Kiln Partition - hoisting offloaded regions into named external units.
//!
//! Frontends mark sub-graphs destined for an external compiler by wrapping
//! them in a function literal carrying a marker attribute
//! (`Compiler = "dnnl"`) and calling it in place. This crate turns those
//! regions into top-level units and, once an external compiler has lowered
//! them, into name-only declarations:
//!
//! ```text
//! main(x) = (fn(a) #[Compiler="dnnl"] { relu(a) })(x)
//!     │ OutlineCompilerFunctions
//!     ▼
//! main(x) = @dnnl_0(x)        @dnnl_0(a) #[Compiler="dnnl", global_symbol="dnnl_0"] = relu(a)
//!     │ (external lowering)
//!     │ MarkCompilerFunctionsAsExtern
//!     ▼
//! main(x) = call_lowered(@dnnl_0, x)        extern @dnnl_0(a) #[Extern=1]
//! ```
//!
//! # Crate Contents
//!
//! - [`GlobalSymbolCache`]: names candidates; [`ExistingGlobalSymbolCache`]
//!   trusts pre-assigned names, [`StructuralGlobalSymbolCache`] deduplicates
//!   structurally equal candidates
//! - [`OutlineCompilerFunctions`], [`MarkCompilerFunctionsAsExtern`]: the passes
//! - [`PassManager`], [`PassContext`]: running passes as a pipeline
//!
//! Both passes are idempotent.
//!
//! # Tracing
//!
//! Passes emit `tracing` events. Call [`init_tracing`] and set
//! `RUST_LOG=kiln_partition=debug` to see candidates, names and rewrites.

mod cache;
mod config;
mod error;
pub mod passes;

use std::sync::Once;

pub use cache::{
    Candidate, ExistingGlobalSymbolCache, GlobalSymbolCache, StructuralGlobalSymbolCache,
};
pub use config::PartitionConfig;
pub use error::PartitionError;
pub use passes::{
    mark_compiler_functions_as_extern, outline_compiler_functions,
    outline_compiler_functions_with_existing_global_symbols, DebugConfig,
    MarkCompilerFunctionsAsExtern, OutlineCompilerFunctions, Pass, PassContext, PassError, PassFailure,
    PassManager, PassResult, PassStats,
};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=kiln_partition=debug` or `RUST_LOG=kiln_partition=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
