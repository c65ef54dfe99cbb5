//! Stack growth guard for recursive IR traversals.
//!
//! Structural hashing, structural comparison and sub-graph extraction all
//! recurse once per nesting level of the IR. Computation graphs produced by
//! frontends routinely nest thousands of calls deep (one `Call` per layer of
//! a network), so every recursive step goes through
//! [`ensure_sufficient_stack`].
//!
//! On native targets the stack is grown with `stacker` once less than
//! [`RED_ZONE`] bytes remain. On WASM the closure is called directly.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

/// Run `f`, growing the stack first if the red zone has been reached.
///
/// ```text
/// fn hash_node(&mut self, id: ExprId) {
///     ensure_sufficient_stack(|| {
///         // ... hash `id`, then recurse into its children ...
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
