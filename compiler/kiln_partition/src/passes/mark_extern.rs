// Externalization pass for module partitioning
// Reduces lowered units to declarations and switches their callers to
// the call_lowered convention

use std::collections::BTreeSet;

use super::{Pass, PassContext, PassError, PassResult};
use crate::{PartitionConfig, PartitionError};
use kiln_ir::{Attrs, ExprId, ExprKind, ExprList, GlobalVar, Module, PostOrder};
use kiln_path::Path;

/// Marks top-level units carrying the compiler marker as external.
///
/// A matching unit loses its body and all of its attributes, keeping only
/// `Extern = 1` and its signature. Every call to it becomes a
/// [`ExprKind::CallLowered`]. Units marked for other compilers, and calls
/// to them, are left alone.
pub struct MarkCompilerFunctionsAsExtern {
    filter: String,
}

impl MarkCompilerFunctionsAsExtern {
    pub fn new(filter: &str) -> Self {
        MarkCompilerFunctionsAsExtern {
            filter: filter.to_string(),
        }
    }
}

impl Pass for MarkCompilerFunctionsAsExtern {
    fn name(&self) -> &'static str {
        "mark_compiler_functions_as_extern"
    }

    fn run(&mut self, module: &mut Module, ctx: &mut PassContext) -> Result<PassResult, PassError> {
        let changed = mark_extern(module, &self.filter, &ctx.config)
            .map_err(|err| PassError::new(self.name(), err))?;
        Ok(PassResult::from_count(changed))
    }
}

/// Run [`MarkCompilerFunctionsAsExtern`] once with default attribute keys.
///
/// Returns the number of units externalized plus call sites rewritten.
pub fn mark_compiler_functions_as_extern(
    module: &mut Module,
    filter: &str,
) -> Result<usize, PartitionError> {
    mark_extern(module, filter, &PartitionConfig::default())
}

#[tracing::instrument(level = "debug", skip_all, fields(filter = %filter, units = module.len()))]
fn mark_extern(
    module: &mut Module,
    filter: &str,
    config: &PartitionConfig,
) -> Result<usize, PartitionError> {
    let mut externs = BTreeSet::new();
    for (gv, function) in module.functions() {
        let compiler = function
            .attrs
            .get_str(&config.compiler_attr)
            .map_err(|err| PartitionError::malformed(gv, &Path::root().attr("attrs"), err))?;
        if compiler.is_some_and(|compiler| PartitionConfig::selects(filter, compiler)) {
            externs.insert(gv.clone());
        }
    }

    for gv in &externs {
        if let Some(function) = module.get_mut(gv.name()) {
            function.body = None;
            function.attrs = Attrs::new().with(&config.extern_attr, 1_i64);
            tracing::debug!(name = gv.name(), "marked unit as extern");
        }
    }

    let calls = lowered_calls(module, &externs);
    for (call, target, args) in &calls {
        module.arena.replace(
            *call,
            ExprKind::CallLowered {
                target: target.clone(),
                args: args.clone(),
            },
        );
    }
    tracing::debug!(
        units = externs.len(),
        calls = calls.len(),
        "externalization complete"
    );

    Ok(externs.len() + calls.len())
}

/// Every call in a unit body whose callee is a reference to one of `externs`.
fn lowered_calls(module: &Module, externs: &BTreeSet<GlobalVar>) -> Vec<(ExprId, GlobalVar, ExprList)> {
    let arena = &module.arena;
    let mut walker = PostOrder::new(arena);
    let mut calls = Vec::new();

    for (unit, function) in module.functions() {
        let Some(body) = function.body else {
            continue;
        };
        for visit in walker.visit(body, Path::root().attr("body")) {
            let ExprKind::Call { callee, args } = arena.kind(visit.id) else {
                continue;
            };
            if let ExprKind::GlobalVar(target) = arena.kind(*callee) {
                if externs.contains(target) {
                    tracing::trace!(unit = unit.name(), path = %visit.path, %target, "lowering call");
                    calls.push((visit.id, target.clone(), args.clone()));
                }
            }
        }
    }
    calls
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_ir::Function;
    use pretty_assertions::assert_eq;

    /// `main(%x) = @f(@g(%x))` with `@f` marked for dnnl and `@g` for cmsis-nn.
    fn two_targets() -> Module {
        let mut module = Module::new();
        let arena = &mut module.arena;

        let a = arena.var("a", None);
        let relu = arena.op("nn.relu");
        let f_body = arena.call(relu, [a]);
        let b = arena.var("b", None);
        let tanh = arena.op("tanh");
        let g_body = arena.call(tanh, [b]);

        let x = arena.var("x", None);
        let g_ref = arena.global(GlobalVar::new("g"));
        let inner = arena.call(g_ref, [x]);
        let f_ref = arena.global(GlobalVar::new("f"));
        let outer = arena.call(f_ref, [inner]);

        module.add_function(
            "f",
            Function::new([a], f_body).with_attrs(
                Attrs::new()
                    .with("Compiler", "dnnl")
                    .with("global_symbol", "f"),
            ),
        );
        module.add_function(
            "g",
            Function::new([b], g_body).with_attrs(Attrs::new().with("Compiler", "cmsis-nn")),
        );
        module.add_function("main", Function::new([x], outer));
        module
    }

    #[test]
    fn test_mark_extern_pass_name() {
        let pass = MarkCompilerFunctionsAsExtern::new("dnnl");
        assert_eq!(pass.name(), "mark_compiler_functions_as_extern");
        assert!(!pass.required());
    }

    #[test]
    fn test_filter_selects_one_compiler() {
        let mut module = two_targets();
        assert_eq!(mark_compiler_functions_as_extern(&mut module, "dnnl"), Ok(2));

        let f = module.get("f");
        assert!(f.is_some_and(Function::is_declaration));
        assert_eq!(
            f.map(|f| f.attrs.clone()),
            Some(Attrs::new().with("Extern", 1_i64))
        );
        assert_eq!(f.map(|f| f.params.len()), Some(1));

        let g = module.get("g");
        assert!(g.is_some_and(|g| !g.is_declaration()));
        assert!(g.is_some_and(|g| g.attrs.contains("Compiler")));

        assert!(module
            .to_string()
            .contains("call_lowered(@f, @g(%x))"));
    }

    #[test]
    fn test_empty_filter_selects_all() {
        let mut module = two_targets();
        assert_eq!(mark_compiler_functions_as_extern(&mut module, ""), Ok(4));
        assert!(module
            .to_string()
            .contains("call_lowered(@f, call_lowered(@g, %x))"));
    }

    #[test]
    fn test_second_run_is_noop() {
        let mut module = two_targets();
        let mut pass = MarkCompilerFunctionsAsExtern::new("");
        let mut ctx = PassContext::new();
        assert_eq!(pass.run(&mut module, &mut ctx).map(|r| r.changed), Ok(true));
        let dump = module.to_string();
        assert_eq!(pass.run(&mut module, &mut ctx), Ok(PassResult::unchanged()));
        assert_eq!(module.to_string(), dump);
    }

    #[test]
    fn test_malformed_marker_names_the_unit() {
        let mut module = two_targets();
        if let Some(g) = module.get_mut("g") {
            g.attrs.set("Compiler", true);
        }
        let err = mark_compiler_functions_as_extern(&mut module, "dnnl");
        assert_eq!(
            err,
            Err(PartitionError::MalformedAttribute {
                unit: GlobalVar::new("g"),
                path: Path::root().attr("attrs").map_value("Compiler"),
                expected: "string",
                found: "bool",
            })
        );
    }
}
