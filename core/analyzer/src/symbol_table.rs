//! Symbol Table
//!
//! The scope tree is an arena: every [`Scope`] lives in one `Vec` and refers
//! to its parent and children by [`ScopeId`]. Symbols refer to scopes by
//! [`ScopePath`], which stays meaningful when scopes of an included file are
//! merged into another file's tree.
//!
//! - Symbol tables and child tables are insertion-ordered, so completion lists
//!   and overload order are deterministic
//! - Function names accumulate into overload sets; any other duplicate is a
//!   conflict reported to the caller
//! - Child-scope creation is idempotent by key, so namespaces can be reopened
//! - Lookup walks from a scope up to the root, nearer scopes shadowing farther
//!   ones
//!
//! The root scope also owns file-wide context: the file path, the built-in
//! primitive types and the cached string type used by string literals.

use std::{cell::OnceCell, rc::Rc};

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::{
    symbol::{FunctionOverloadSet, FunctionSymbol, PrimitiveKind, ScopePath, Symbol, TypeSymbol},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    pub const ROOT: ScopeId = ScopeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The declaration that opened a scope.
#[derive(Debug, Clone)]
pub enum ScopeNode {
    Namespace,
    Class(Rc<TypeSymbol>),
    Interface(Rc<TypeSymbol>),
    Enum(Rc<TypeSymbol>),
    Function(Rc<FunctionSymbol>),
    /// A lambda body, with the funcdef it was checked against.
    Lambda(Option<Rc<FunctionSymbol>>),
}

#[derive(Debug)]
pub struct Scope {
    key: String,
    path: ScopePath,
    parent: Option<ScopeId>,
    children: IndexMap<String, ScopeId>,
    symbols: IndexMap<String, Symbol>,
    node: Option<ScopeNode>,
}

impl Scope {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn path(&self) -> &ScopePath {
        &self.path
    }

    #[must_use]
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    #[must_use]
    pub fn node(&self) -> Option<&ScopeNode> {
        self.node.as_ref()
    }

    pub fn symbols(&self) -> impl Iterator<Item = (&String, &Symbol)> {
        self.symbols.iter()
    }

    pub fn children(&self) -> impl Iterator<Item = (&String, &ScopeId)> {
        self.children.iter()
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.key.starts_with(ANONYMOUS_PREFIX)
    }
}

const ANONYMOUS_PREFIX: &str = "$anonymous_";

/// Outcome of inserting a name that is already taken.
#[derive(Debug, Clone)]
pub struct InsertConflict {
    pub existing: Symbol,
}

#[derive(Debug)]
pub struct SymbolTable {
    file_path: String,
    scopes: Vec<Scope>,
    builtins: FxHashMap<PrimitiveKind, Rc<TypeSymbol>>,
    string_type_name: String,
    string_type: OnceCell<Option<Rc<TypeSymbol>>>,
    anonymous_counter: u32,
}

impl SymbolTable {
    #[must_use]
    pub fn new(file_path: &str, string_type_name: &str) -> Self {
        let root = Scope {
            key: String::new(),
            path: ScopePath::root(),
            parent: None,
            children: IndexMap::new(),
            symbols: IndexMap::new(),
            node: Some(ScopeNode::Namespace),
        };
        let mut builtins = FxHashMap::default();
        for kind in PrimitiveKind::DECLARABLE
            .into_iter()
            .chain(std::iter::once(PrimitiveKind::Null))
        {
            builtins.insert(kind, Rc::new(TypeSymbol::primitive(kind)));
        }
        Self {
            file_path: file_path.to_string(),
            scopes: vec![root],
            builtins,
            string_type_name: string_type_name.to_string(),
            string_type: OnceCell::new(),
            anonymous_counter: 0,
        }
    }

    #[must_use]
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    #[must_use]
    pub fn root(&self) -> ScopeId {
        ScopeId::ROOT
    }

    #[must_use]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    #[must_use]
    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.scope(id).parent
    }

    pub fn scopes(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes
            .iter()
            .enumerate()
            .map(|(index, scope)| (ScopeId(index as u32), scope))
    }

    /// Built-in type for a primitive kind.
    #[must_use = "this is a pure lookup with no side effects"]
    pub fn builtin(&self, kind: PrimitiveKind) -> Rc<TypeSymbol> {
        self.builtins[&kind].clone()
    }

    #[must_use = "this is a pure lookup with no side effects"]
    pub fn builtin_by_token(&self, token: &str) -> Option<Rc<TypeSymbol>> {
        PrimitiveKind::from_token(token).map(|kind| self.builtin(kind))
    }

    /// The type string literals evaluate to, looked up once in the root scope.
    #[must_use = "this is a pure lookup with no side effects"]
    pub fn string_type(&self) -> Option<Rc<TypeSymbol>> {
        self.string_type
            .get_or_init(|| {
                self.lookup(ScopeId::ROOT, &self.string_type_name)
                    .and_then(Symbol::as_type)
                    .cloned()
            })
            .clone()
    }

    #[must_use = "this is a pure lookup with no side effects"]
    pub fn scope_by_path(&self, path: &ScopePath) -> Option<ScopeId> {
        path.segments()
            .iter()
            .try_fold(ScopeId::ROOT, |scope, segment| self.child(scope, segment))
    }

    #[must_use = "this is a pure lookup with no side effects"]
    pub fn child(&self, scope: ScopeId, key: &str) -> Option<ScopeId> {
        self.scope(scope).children.get(key).copied()
    }

    /// Returns the child scope named `key`, creating it if needed.
    ///
    /// An existing child keeps its node; `node` is only attached to a child
    /// that has none yet.
    pub fn create_child(&mut self, parent: ScopeId, key: &str, node: Option<ScopeNode>) -> ScopeId {
        if let Some(existing) = self.child(parent, key) {
            let scope = &mut self.scopes[existing.index()];
            if scope.node.is_none() {
                scope.node = node;
            }
            return existing;
        }
        let id = ScopeId(self.scopes.len() as u32);
        let path = self.scope(parent).path.child(key);
        self.scopes.push(Scope {
            key: key.to_string(),
            path,
            parent: Some(parent),
            children: IndexMap::new(),
            symbols: IndexMap::new(),
            node,
        });
        self.scopes[parent.index()]
            .children
            .insert(key.to_string(), id);
        id
    }

    /// Creates a scope without a name of its own (blocks, overload bodies).
    pub fn create_anonymous(&mut self, parent: ScopeId, node: Option<ScopeNode>) -> ScopeId {
        self.anonymous_counter += 1;
        let key = format!("{ANONYMOUS_PREFIX}{}", self.anonymous_counter);
        self.create_child(parent, &key, node)
    }

    pub fn set_node(&mut self, scope: ScopeId, node: ScopeNode) {
        self.scopes[scope.index()].node = Some(node);
    }

    /// Declares `symbol` under `name`.
    ///
    /// A function joins the overload set of an existing function with the
    /// same name.
    ///
    /// # Errors
    ///
    /// Returns the existing symbol when the name is taken by anything else.
    pub fn insert(&mut self, scope: ScopeId, name: &str, symbol: Symbol) -> Result<(), InsertConflict> {
        let symbols = &mut self.scopes[scope.index()].symbols;
        if let Some(existing) = symbols.get_mut(name) {
            return match (existing, symbol) {
                (Symbol::Functions(existing), Symbol::Functions(incoming)) => {
                    for overload in incoming.overloads() {
                        existing.push(overload.clone());
                    }
                    Ok(())
                }
                (existing, _) => Err(InsertConflict {
                    existing: existing.clone(),
                }),
            };
        }
        symbols.insert(name.to_string(), symbol);
        Ok(())
    }

    pub fn insert_function(&mut self, scope: ScopeId, function: Rc<FunctionSymbol>) -> Result<(), InsertConflict> {
        let name = function.identifier.clone();
        self.insert(scope, &name, Symbol::Functions(FunctionOverloadSet::new(function)))
    }

    /// Overwrites whatever `name` denotes in `scope`.
    pub fn replace(&mut self, scope: ScopeId, name: &str, symbol: Symbol) {
        self.scopes[scope.index()]
            .symbols
            .insert(name.to_string(), symbol);
    }

    /// Searches `scope` only.
    #[must_use = "this is a pure lookup with no side effects"]
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.scope(scope).symbols.get(name)
    }

    /// Searches `scope` and then its ancestors; the nearest declaration wins.
    #[must_use = "this is a pure lookup with no side effects"]
    pub fn lookup_with_parents(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, &Symbol)> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(symbol) = self.lookup(id, name) {
                return Some((id, symbol));
            }
            current = self.parent(id);
        }
        None
    }

    /// Member `name` declared in (or copied into) the members scope of `ty`.
    #[must_use = "this is a pure lookup with no side effects"]
    pub fn member(&self, ty: &TypeSymbol, name: &str) -> Option<&Symbol> {
        let scope = self.scope_by_path(ty.members_scope.as_ref()?)?;
        self.lookup(scope, name)
    }

    /// Overloads of the method `name` of `ty`, empty if there is none.
    #[must_use = "this is a pure lookup with no side effects"]
    pub fn member_functions(&self, ty: &TypeSymbol, name: &str) -> Vec<Rc<FunctionSymbol>> {
        self.member(ty, name)
            .and_then(Symbol::as_functions)
            .map(|functions| functions.overloads().to_vec())
            .unwrap_or_default()
    }

    /// Finds a child scope named `key` in `scope` or the nearest ancestor
    /// declaring one.
    #[must_use = "this is a pure lookup with no side effects"]
    pub fn child_with_parents(&self, scope: ScopeId, key: &str) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(child) = self.child(id, key) {
                return Some(child);
            }
            current = self.parent(id);
        }
        None
    }

    /// Whether `scope` groups the overloads of a function named like it.
    #[must_use]
    pub fn is_function_holder(&self, scope: ScopeId) -> bool {
        let Some(parent) = self.parent(scope) else {
            return false;
        };
        matches!(
            self.lookup(parent, self.scope(scope).key()),
            Some(Symbol::Functions(_))
        ) && !matches!(
            self.scope(scope).node,
            Some(ScopeNode::Class(_) | ScopeNode::Interface(_) | ScopeNode::Enum(_))
        )
    }

    /// Nearest enclosing class, mixin or interface scope.
    #[must_use = "this is a pure lookup with no side effects"]
    pub fn enclosing_type_scope(&self, scope: ScopeId) -> Option<(ScopeId, &Rc<TypeSymbol>)> {
        let mut current = Some(scope);
        while let Some(id) = current {
            match &self.scope(id).node {
                Some(ScopeNode::Class(symbol) | ScopeNode::Interface(symbol)) => {
                    return Some((id, symbol));
                }
                _ => current = self.parent(id),
            }
        }
        None
    }

    /// Nearest enclosing function or lambda scope.
    #[must_use = "this is a pure lookup with no side effects"]
    pub fn enclosing_function_scope(&self, scope: ScopeId) -> Option<(ScopeId, &ScopeNode)> {
        let mut current = Some(scope);
        while let Some(id) = current {
            match &self.scope(id).node {
                Some(node @ (ScopeNode::Function(_) | ScopeNode::Lambda(_))) => {
                    return Some((id, node));
                }
                _ => current = self.parent(id),
            }
        }
        None
    }

    /// Copies the named scopes and symbols of `other` into this table.
    ///
    /// Symbols are shared, not cloned. Anonymous scopes (function bodies,
    /// blocks) are private to the file that declared them and are skipped.
    pub fn merge(&mut self, other: &SymbolTable) {
        self.merge_scope(ScopeId::ROOT, other, ScopeId::ROOT);
    }

    fn merge_scope(&mut self, target: ScopeId, other: &SymbolTable, source: ScopeId) {
        let source_scope = other.scope(source);
        for (name, symbol) in &source_scope.symbols {
            // Conflicts keep the declaration that was merged first.
            let _ = self.insert(target, name, symbol.clone());
        }
        let children: Vec<(String, ScopeId)> = source_scope
            .children
            .iter()
            .filter(|(_, id)| !other.scope(**id).is_anonymous())
            .map(|(key, id)| (key.clone(), *id))
            .collect();
        for (key, child) in children {
            let node = other.scope(child).node.clone();
            let target_child = self.create_child(target, &key, node);
            self.merge_scope(target_child, other, child);
        }
    }

    /// A copy holding only what `keep` accepts, with the same scope shape.
    #[must_use]
    pub fn filtered(&self, keep: impl Fn(&Symbol) -> bool) -> SymbolTable {
        let mut table = SymbolTable::new(&self.file_path, &self.string_type_name);
        table.filter_scope(ScopeId::ROOT, self, ScopeId::ROOT, &keep);
        table
    }

    fn filter_scope(&mut self, target: ScopeId, other: &SymbolTable, source: ScopeId, keep: &impl Fn(&Symbol) -> bool) {
        let source_scope = other.scope(source);
        for (name, symbol) in &source_scope.symbols {
            if keep(symbol) {
                let _ = self.insert(target, name, symbol.clone());
            }
        }
        let children: Vec<(String, ScopeId)> = source_scope
            .children
            .iter()
            .filter(|(_, id)| !other.scope(**id).is_anonymous())
            .map(|(key, id)| (key.clone(), *id))
            .collect();
        for (key, child) in children {
            let node = other.scope(child).node.clone();
            let target_child = self.create_child(target, &key, node);
            self.filter_scope(target_child, other, child, keep);
        }
    }
}
