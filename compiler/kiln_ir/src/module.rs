//! Top-level unit table.

use std::collections::BTreeMap;
use std::fmt;

use kiln_stack::ensure_sufficient_stack;

use crate::{ExprArena, ExprId, ExprKind, Function, GlobalVar};

/// A module: one expression arena plus the table of named top-level units.
///
/// Units are keyed by [`GlobalVar`] and iterate in name order. Expressions
/// of every unit live in [`Module::arena`].
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub arena: ExprArena,
    functions: BTreeMap<GlobalVar, Function>,
}

impl Module {
    pub fn new() -> Self {
        Module {
            arena: ExprArena::new(),
            functions: BTreeMap::new(),
        }
    }

    /// Bind `function` to `name`, replacing any existing unit.
    pub fn add_function(&mut self, name: &str, function: Function) -> GlobalVar {
        let gv = GlobalVar::new(name);
        self.functions.insert(gv.clone(), function);
        gv
    }

    /// Bind `function` to `gv`, returning the unit it replaced.
    pub fn insert(&mut self, gv: GlobalVar, function: Function) -> Option<Function> {
        self.functions.insert(gv, function)
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.functions.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// The table's own key for `name`.
    pub fn global_var(&self, name: &str) -> Option<&GlobalVar> {
        self.functions.get_key_value(name).map(|(gv, _)| gv)
    }

    /// Units in name order.
    pub fn functions(&self) -> impl Iterator<Item = (&GlobalVar, &Function)> {
        self.functions.iter()
    }

    /// The unit table itself.
    pub fn function_table(&self) -> &BTreeMap<GlobalVar, Function> {
        &self.functions
    }

    pub fn global_vars(&self) -> Vec<GlobalVar> {
        self.functions.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Text dump, one unit per block. Shared sub-expressions are printed at each
/// use. For debugging and tests only.
impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let printer = Printer { arena: &self.arena };
        for (i, (gv, function)) in self.functions.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            printer.unit(f, gv, function)?;
        }
        Ok(())
    }
}

struct Printer<'a> {
    arena: &'a ExprArena,
}

impl Printer<'_> {
    fn unit(&self, f: &mut fmt::Formatter<'_>, gv: &GlobalVar, function: &Function) -> fmt::Result {
        if function.is_declaration() {
            f.write_str("extern ")?;
        }
        write!(f, "def {gv}")?;
        self.signature(f, function)?;
        match function.body {
            Some(body) => {
                f.write_str(" {\n  ")?;
                self.expr(f, body)?;
                f.write_str("\n}\n")
            }
            None => f.write_str("\n"),
        }
    }

    fn signature(&self, f: &mut fmt::Formatter<'_>, function: &Function) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in function.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            self.expr(f, *param)?;
            if let ExprKind::Var { ty: Some(ty), .. } = self.arena.kind(*param) {
                write!(f, ": {ty}")?;
            }
        }
        f.write_str(")")?;
        if let Some(ret) = &function.ret_type {
            write!(f, " -> {ret}")?;
        }
        if !function.attrs.is_empty() {
            write!(f, " {}", function.attrs)?;
        }
        Ok(())
    }

    fn list(&self, f: &mut fmt::Formatter<'_>, ids: &[ExprId]) -> fmt::Result {
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            self.expr(f, *id)?;
        }
        Ok(())
    }

    fn expr(&self, f: &mut fmt::Formatter<'_>, id: ExprId) -> fmt::Result {
        ensure_sufficient_stack(|| match self.arena.kind(id) {
            ExprKind::Var { name, .. } => write!(f, "%{name}"),
            ExprKind::Constant(literal) => write!(f, "{literal}"),
            ExprKind::Op(name) => f.write_str(name),
            ExprKind::GlobalVar(gv) => write!(f, "{gv}"),
            ExprKind::Call { callee, args } => {
                let literal_callee = matches!(self.arena.kind(*callee), ExprKind::Function(_));
                if literal_callee {
                    f.write_str("(")?;
                }
                self.expr(f, *callee)?;
                if literal_callee {
                    f.write_str(")")?;
                }
                f.write_str("(")?;
                self.list(f, args)?;
                f.write_str(")")
            }
            ExprKind::CallLowered { target, args } => {
                write!(f, "call_lowered({target}")?;
                for arg in args {
                    f.write_str(", ")?;
                    self.expr(f, *arg)?;
                }
                f.write_str(")")
            }
            ExprKind::Tuple(fields) => {
                f.write_str("(")?;
                self.list(f, fields)?;
                if fields.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            ExprKind::TupleGet { tuple, index } => {
                self.expr(f, *tuple)?;
                write!(f, ".{index}")
            }
            ExprKind::Let { var, value, body } => {
                f.write_str("let ")?;
                self.expr(f, *var)?;
                f.write_str(" = ")?;
                self.expr(f, *value)?;
                f.write_str("; ")?;
                self.expr(f, *body)
            }
            ExprKind::Function(function) => {
                f.write_str("fn ")?;
                self.signature(f, function)?;
                match function.body {
                    Some(body) => {
                        f.write_str(" { ")?;
                        self.expr(f, body)?;
                        f.write_str(" }")
                    }
                    None => Ok(()),
                }
            }
        })
    }
}
