//! Global symbol caches.
//!
//! A cache decides which top-level name an outlined function is bound to.
//! The outlining pass asks once per candidate; a cache that returns the same
//! name for two candidates causes only the first to be inserted into the
//! module, so candidates sharing a name are lowered once.
//!
//! Two policies are provided:
//! - [`ExistingGlobalSymbolCache`]: the candidate's own `global_symbol`
//!   attribute is its name. Missing names and name clashes between
//!   different functions are errors.
//! - [`StructuralGlobalSymbolCache`]: structurally equal candidates share
//!   one freshly minted name.
//!
//! Both keep a snapshot of every function they have named (see
//! [`ExprArena::extract`]), so one cache can serve several modules.

use std::collections::hash_map::Entry;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use kiln_ir::{ExprArena, ExprId, Function, GlobalVar, Module, Structural};
use kiln_path::Path;

use crate::{PartitionConfig, PartitionError};

/// A function literal found in direct call position, about to be outlined.
#[derive(Clone, Copy, Debug)]
pub struct Candidate<'a> {
    /// Module being partitioned. The literal lives in its arena.
    pub module: &'a Module,
    /// The function literal node.
    pub id: ExprId,
    pub function: &'a Function,
    /// Top-level unit the literal was found in.
    pub unit: &'a GlobalVar,
    /// Position of the literal within `unit`.
    pub path: &'a Path,
    pub config: &'a PartitionConfig,
}

impl<'a> Candidate<'a> {
    #[inline]
    pub fn arena(&self) -> &'a ExprArena {
        &self.module.arena
    }

    /// Whether `name` already names a top-level unit of the module.
    pub fn is_taken(&self, name: &str) -> bool {
        self.module.contains(name)
    }

    /// Value of the compiler marker attribute.
    pub fn compiler(&self) -> Result<Option<&str>, PartitionError> {
        self.attr_str(&self.config.compiler_attr)
    }

    /// Value of the external name attribute.
    pub fn existing_global_symbol(&self) -> Result<Option<&str>, PartitionError> {
        self.attr_str(&self.config.global_symbol_attr)
    }

    fn attr_str(&self, key: &str) -> Result<Option<&str>, PartitionError> {
        self.function
            .attrs
            .get_str(key)
            .map_err(|err| PartitionError::malformed(self.unit, &self.path.attr("attrs"), err))
    }

    /// Comparison policy: the external name is not part of a function's
    /// structure.
    pub(crate) fn structural(&self) -> Structural {
        Structural::new().ignore_attr(&self.config.global_symbol_attr)
    }
}

/// Assigns top-level names to outlining candidates.
///
/// Must be idempotent: asking twice for the same candidate, or for one the
/// cache considers the same, yields the same name.
pub trait GlobalSymbolCache {
    fn global_symbol(&mut self, candidate: &Candidate<'_>) -> Result<GlobalVar, PartitionError>;
}

impl<C: GlobalSymbolCache + ?Sized> GlobalSymbolCache for &mut C {
    fn global_symbol(&mut self, candidate: &Candidate<'_>) -> Result<GlobalVar, PartitionError> {
        (**self).global_symbol(candidate)
    }
}

impl<C: GlobalSymbolCache + ?Sized> GlobalSymbolCache for Box<C> {
    fn global_symbol(&mut self, candidate: &Candidate<'_>) -> Result<GlobalVar, PartitionError> {
        (**self).global_symbol(candidate)
    }
}

/// One cache shared by several passes or pipelines.
///
/// The lock is held for the whole lookup-then-insert, so concurrent callers
/// never mint two names for one function.
impl<C: GlobalSymbolCache + ?Sized> GlobalSymbolCache for Arc<Mutex<C>> {
    fn global_symbol(&mut self, candidate: &Candidate<'_>) -> Result<GlobalVar, PartitionError> {
        self.lock().global_symbol(candidate)
    }
}

/// A named function, copied out of the module it was first seen in.
#[derive(Debug)]
struct Snapshot {
    gv: GlobalVar,
    arena: ExprArena,
    root: ExprId,
}

impl Snapshot {
    fn take(gv: GlobalVar, candidate: &Candidate<'_>) -> Self {
        let (arena, root) = candidate.arena().extract(candidate.id);
        Snapshot { gv, arena, root }
    }
}

/// Names every candidate by its pre-assigned external name attribute.
#[derive(Debug, Default)]
pub struct ExistingGlobalSymbolCache {
    symbols: FxHashMap<String, Snapshot>,
}

impl ExistingGlobalSymbolCache {
    pub fn new() -> Self {
        ExistingGlobalSymbolCache {
            symbols: FxHashMap::default(),
        }
    }

    /// Number of distinct names handed out.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl GlobalSymbolCache for ExistingGlobalSymbolCache {
    fn global_symbol(&mut self, candidate: &Candidate<'_>) -> Result<GlobalVar, PartitionError> {
        let Some(name) = candidate.existing_global_symbol()? else {
            return Err(PartitionError::MissingGlobalSymbol {
                unit: candidate.unit.clone(),
                path: candidate.path.clone(),
                compiler: candidate.compiler()?.unwrap_or_default().to_string(),
                key: candidate.config.global_symbol_attr.clone(),
            });
        };

        match self.symbols.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                let seen = entry.get();
                let mismatch = candidate.structural().first_mismatch(
                    &seen.arena,
                    seen.root,
                    candidate.arena(),
                    candidate.id,
                );
                if let Some(mismatch) = mismatch {
                    return Err(PartitionError::ConflictingGlobalSymbol {
                        name: name.to_string(),
                        unit: candidate.unit.clone(),
                        path: candidate.path.clone(),
                        mismatch,
                    });
                }
                tracing::trace!(name, "global symbol already seen");
                Ok(seen.gv.clone())
            }
            Entry::Vacant(entry) => {
                let gv = GlobalVar::new(name);
                tracing::trace!(name, "new global symbol");
                entry.insert(Snapshot::take(gv.clone(), candidate));
                Ok(gv)
            }
        }
    }
}

/// Deduplicates structurally equal candidates under minted names.
///
/// Names are `{prefix}_{n}` with `n` counting up from 0, skipping names
/// the candidate's module already uses. Bound variable names and the
/// external name attribute do not affect equality.
#[derive(Debug)]
pub struct StructuralGlobalSymbolCache {
    prefix: String,
    /// Structural hash -> functions with that hash.
    buckets: FxHashMap<u64, Vec<Snapshot>>,
    minted: usize,
    /// Next suffix to try.
    next: usize,
}

impl Default for StructuralGlobalSymbolCache {
    fn default() -> Self {
        StructuralGlobalSymbolCache::new("outlined")
    }
}

impl StructuralGlobalSymbolCache {
    pub fn new(prefix: &str) -> Self {
        StructuralGlobalSymbolCache {
            prefix: prefix.to_string(),
            buckets: FxHashMap::default(),
            minted: 0,
            next: 0,
        }
    }

    /// Number of names minted so far.
    pub fn len(&self) -> usize {
        self.minted
    }

    pub fn is_empty(&self) -> bool {
        self.minted == 0
    }
}

impl GlobalSymbolCache for StructuralGlobalSymbolCache {
    fn global_symbol(&mut self, candidate: &Candidate<'_>) -> Result<GlobalVar, PartitionError> {
        let structural = candidate.structural();
        let hash = structural.hash(candidate.arena(), candidate.id);
        let bucket = self.buckets.entry(hash).or_default();

        if let Some(seen) = bucket
            .iter()
            .find(|seen| structural.equal(&seen.arena, seen.root, candidate.arena(), candidate.id))
        {
            tracing::trace!(name = seen.gv.name(), "structurally equal function already named");
            return Ok(seen.gv.clone());
        }

        let gv = loop {
            let name = format!("{}_{}", self.prefix, self.next);
            self.next += 1;
            if !candidate.is_taken(&name) {
                break GlobalVar::new(&name);
            }
            tracing::trace!(name = %name, "skipping name taken by the module");
        };
        self.minted += 1;
        tracing::trace!(name = gv.name(), hash, "minted global symbol");
        bucket.push(Snapshot::take(gv.clone(), candidate));
        Ok(gv)
    }
}
