//! Modules and procedures
//!
//! A [`Module`] groups symbols under a named scope. A [`Proc`] ties a
//! procedure literal to its signature, parameter symbols, and body scope.
//! Both are cached in values owned by the phase that builds them; there is
//! no process-wide state here.

use std::collections::HashMap;

use crate::frontend::ast::ProcExpr;
use crate::frontend::pos::{Pos, NO_POS};
use crate::frontend::symbols::{ScopeId, SymbolId, SymbolTable, UNIVERSE};
use crate::frontend::types::TypeId;

pub type ModuleId = usize;
pub type ProcId = usize;

/// A named scope that groups symbols together.
#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub path: String,
    pub scope: ScopeId,
}

/// Cache of modules, keyed by import path.
#[derive(Debug, Default)]
pub struct ModuleMap {
    modules: Vec<Module>,
    by_path: HashMap<String, ModuleId>,
}

impl ModuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the module for `path`, creating it (with a fresh scope under
    /// the universe) on first sight. Registering one path under two
    /// different names is an internal error.
    pub fn intern(&mut self, table: &mut SymbolTable, name: &str, path: &str) -> ModuleId {
        if let Some(&id) = self.by_path.get(path) {
            let module = &self.modules[id];
            assert!(
                name.is_empty() || name == module.name,
                "conflicting module names {} and {} for path {:?}",
                name,
                module.name,
                path
            );
            return id;
        }

        let scope = table.new_scope(Some(UNIVERSE), NO_POS, NO_POS);
        let id = self.modules.len();
        self.modules.push(Module {
            name: name.to_string(),
            path: path.to_string(),
            scope,
        });
        self.by_path.insert(path.to_string(), id);
        id
    }

    pub fn get(&self, id: ModuleId) -> &Module {
        &self.modules[id]
    }
}

/// Procedure property flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcFlags(u32);

impl ProcFlags {
    pub const NONE: ProcFlags = ProcFlags(0);
    /// The procedure never returns.
    pub const NORETURN: ProcFlags = ProcFlags(1 << 0);
    /// The procedure may be evaluated at compile time.
    pub const CONST: ProcFlags = ProcFlags(1 << 1);
    /// The procedure has no observable side effects.
    pub const PURE: ProcFlags = ProcFlags(1 << 2);

    pub fn contains(self, other: ProcFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

/// A singular procedure, with its own type and body scope.
#[derive(Debug, Clone)]
pub struct Proc {
    /// Position of `proc`.
    pub pos: Pos,
    pub typ: TypeId,
    /// Scope covering the procedure body.
    pub body: ScopeId,
    /// Parameter symbols, in order.
    pub params: Vec<SymbolId>,
    pub flags: ProcFlags,
}

/// Per-checker cache of procedures, keyed by the position of the procedure
/// expression (AST nodes are immutable and token positions are unique).
#[derive(Debug, Default)]
pub struct ProcCache {
    procs: Vec<Proc>,
    by_pos: HashMap<Pos, ProcId>,
}

impl ProcCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the procedure for `node`, creating it (with a body scope
    /// spanning the block) on first sight.
    pub fn intern(
        &mut self,
        table: &mut SymbolTable,
        typ: TypeId,
        params: Vec<SymbolId>,
        parent: ScopeId,
        node: &ProcExpr,
    ) -> ProcId {
        if let Some(&id) = self.by_pos.get(&node.pos) {
            return id;
        }

        let body = table.new_scope(Some(parent), node.body.pos, node.body.closing);
        let id = self.procs.len();
        self.procs.push(Proc {
            pos: node.pos,
            typ,
            body,
            params,
            flags: ProcFlags::NONE,
        });
        self.by_pos.insert(node.pos, id);
        id
    }

    pub fn get(&self, id: ProcId) -> &Proc {
        &self.procs[id]
    }
}
