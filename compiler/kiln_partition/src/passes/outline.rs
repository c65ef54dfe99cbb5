// Outlining pass for module partitioning
// Hoists marked function literals in direct call position into top-level units
//
// Two phases: collect every call site first, then name, insert and rewrite.
// Sites are collected in post-order, so a literal nested inside another
// literal is outlined before the enclosing one is named and copied.
// The second phase runs on a copy of the module that replaces the original
// only once every site succeeded.

use super::{Pass, PassContext, PassError, PassResult};
use crate::{
    Candidate, ExistingGlobalSymbolCache, GlobalSymbolCache, PartitionConfig, PartitionError,
};
use kiln_ir::{free_vars, ExprId, ExprKind, GlobalVar, Module, PostOrder};
use kiln_path::Path;

/// Outlines function literals carrying the compiler marker attribute.
///
/// Every literal called in place whose marker matches the filter (any
/// marker when the filter is empty) is bound to the name the cache chooses.
/// The first literal bound to a name becomes that name's top-level unit,
/// with the name recorded in its `global_symbol` attribute. The call site
/// then calls the global instead of the literal.
///
/// Fails without changing the module when a literal uses a variable bound
/// outside of it, when the cache fails, or when the chosen name already
/// belongs to a structurally different unit.
pub struct OutlineCompilerFunctions<C> {
    cache: C,
    filter: String,
}

impl<C: GlobalSymbolCache> OutlineCompilerFunctions<C> {
    pub fn new(cache: C, filter: &str) -> Self {
        OutlineCompilerFunctions {
            cache,
            filter: filter.to_string(),
        }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn into_cache(self) -> C {
        self.cache
    }
}

impl OutlineCompilerFunctions<ExistingGlobalSymbolCache> {
    /// Outline under each literal's own `global_symbol` attribute.
    pub fn with_existing_global_symbols(filter: &str) -> Self {
        OutlineCompilerFunctions::new(ExistingGlobalSymbolCache::new(), filter)
    }
}

impl<C: GlobalSymbolCache> Pass for OutlineCompilerFunctions<C> {
    fn name(&self) -> &'static str {
        "outline_compiler_functions"
    }

    fn run(&mut self, module: &mut Module, ctx: &mut PassContext) -> Result<PassResult, PassError> {
        let outlined = outline(module, &mut self.cache, &self.filter, &ctx.config)
            .map_err(|err| PassError::new(self.name(), err))?;
        Ok(PassResult::from_count(outlined))
    }
}

/// Run [`OutlineCompilerFunctions`] once with default attribute keys.
///
/// Returns the number of call sites rewritten. Pass `&mut cache` to keep
/// using the cache afterwards.
pub fn outline_compiler_functions<C: GlobalSymbolCache>(
    module: &mut Module,
    mut cache: C,
    filter: &str,
) -> Result<usize, PartitionError> {
    outline(module, &mut cache, filter, &PartitionConfig::default())
}

/// Run [`OutlineCompilerFunctions::with_existing_global_symbols`] once.
pub fn outline_compiler_functions_with_existing_global_symbols(
    module: &mut Module,
    filter: &str,
) -> Result<usize, PartitionError> {
    outline_compiler_functions(module, ExistingGlobalSymbolCache::new(), filter)
}

/// A call whose callee is a marked literal.
struct Site {
    unit: GlobalVar,
    call: ExprId,
    callee: ExprId,
    /// Path of the literal within `unit`.
    path: Path,
}

#[tracing::instrument(level = "debug", skip_all, fields(filter = %filter, units = module.len()))]
fn outline<C: GlobalSymbolCache + ?Sized>(
    module: &mut Module,
    cache: &mut C,
    filter: &str,
    config: &PartitionConfig,
) -> Result<usize, PartitionError> {
    let sites = collect_sites(module, filter, config)?;
    tracing::debug!(candidates = sites.len(), "collected outlining candidates");
    if sites.is_empty() {
        return Ok(0);
    }

    let mut staged = module.clone();
    for site in &sites {
        outline_site(&mut staged, cache, site, config)?;
    }
    *module = staged;
    Ok(sites.len())
}

fn collect_sites(
    module: &Module,
    filter: &str,
    config: &PartitionConfig,
) -> Result<Vec<Site>, PartitionError> {
    let arena = &module.arena;
    let mut walker = PostOrder::new(arena);
    let mut sites = Vec::new();

    for (unit, function) in module.functions() {
        let Some(body) = function.body else {
            continue;
        };
        for visit in walker.visit(body, Path::root().attr("body")) {
            let ExprKind::Call { callee, .. } = arena.kind(visit.id) else {
                continue;
            };
            let Some(literal) = arena.as_function(*callee) else {
                continue;
            };

            let path = visit.path.attr("callee");
            let compiler = literal
                .attrs
                .get_str(&config.compiler_attr)
                .map_err(|err| PartitionError::malformed(unit, &path.attr("attrs"), err))?;

            match compiler {
                Some(compiler) if PartitionConfig::selects(filter, compiler) => {
                    for free in free_vars(arena, *callee, path.clone()) {
                        if let ExprKind::Var { name, .. } = arena.kind(free.id) {
                            return Err(PartitionError::CapturedVariable {
                                unit: unit.clone(),
                                path: free.path,
                                name: name.clone(),
                            });
                        }
                    }
                    tracing::trace!(unit = unit.name(), %path, compiler, "outlining candidate");
                    sites.push(Site {
                        unit: unit.clone(),
                        call: visit.id,
                        callee: *callee,
                        path,
                    });
                }
                Some(compiler) => tracing::trace!(%path, compiler, "filtered out"),
                None => {}
            }
        }
    }
    Ok(sites)
}

fn outline_site<C: GlobalSymbolCache + ?Sized>(
    module: &mut Module,
    cache: &mut C,
    site: &Site,
    config: &PartitionConfig,
) -> Result<(), PartitionError> {
    // literal nodes are never rewritten, only the calls to them
    let Some(function) = module.arena.as_function(site.callee) else {
        return Ok(());
    };
    let candidate = Candidate {
        module: &*module,
        id: site.callee,
        function,
        unit: &site.unit,
        path: &site.path,
        config,
    };
    let gv = cache.global_symbol(&candidate)?;

    if let Some(existing) = module.get(gv.name()) {
        let mismatch = candidate.structural().function_mismatch(
            &module.arena,
            existing,
            &module.arena,
            function,
        );
        if let Some(mismatch) = mismatch {
            return Err(PartitionError::ConflictingGlobalSymbol {
                name: gv.name().to_string(),
                unit: site.unit.clone(),
                path: site.path.clone(),
                mismatch,
            });
        }
        tracing::debug!(name = gv.name(), path = %site.path, "reusing outlined unit");
    } else {
        let mut outlined = function.clone();
        outlined.attrs.set(&config.global_symbol_attr, gv.name());
        tracing::debug!(
            name = gv.name(),
            unit = site.unit.name(),
            path = %site.path,
            "outlined function"
        );
        module.insert(gv.clone(), outlined);
    }

    let ExprKind::Call { args, .. } = module.arena.kind(site.call) else {
        return Ok(());
    };
    let args = args.clone();
    let callee = module.arena.global(gv);
    module.arena.replace(site.call, ExprKind::Call { callee, args });
    Ok(())
}
