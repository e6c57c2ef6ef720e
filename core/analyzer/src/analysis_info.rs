//! Analysis Info - Read-only Views for Editor Tooling
//!
//! [`AnalysisInfo`] collects everything the analyzer learns about name uses
//! and expressions while walking function bodies. Editor services consume it
//! after analysis; the analyzer itself never reads it back.
//!
//! ```text
//! AnalysisInfo
//! ├─ references        name-use token → declared symbol (go-to-definition, rename)
//! ├─ scope_regions     source range → scope path ("which scope is the cursor in")
//! ├─ auto_types        `auto` token → inferred type (inlay hints)
//! ├─ call_sites        argument list → resolved callee (signature help)
//! └─ expression_types  expression node id → resolved type (hover)
//! ```
//!
//! Expressions whose type could not be determined have no entry in
//! `expression_types`; a diagnostic was reported for them instead.

use std::rc::Rc;

use angelscript_ast::nodes::{ArgumentList, Location};
use rustc_hash::FxHashMap;

use crate::{
    resolved_type::ResolvedType,
    symbol::{FunctionSymbol, ScopePath, SymbolRef},
};

#[derive(Debug, Clone)]
pub struct Reference {
    /// The name token at the use site.
    pub location: Location,
    pub symbol: SymbolRef,
}

#[derive(Debug, Clone)]
pub struct ScopeRegion {
    pub location: Location,
    pub scope: ScopePath,
}

#[derive(Debug, Clone)]
pub struct AutoTypeResolution {
    /// Name of the `auto` variable, where the inferred type is shown.
    pub location: Location,
    pub ty: ResolvedType,
}

#[derive(Debug, Clone)]
pub struct FunctionCallSite {
    pub arguments: Rc<ArgumentList>,
    pub callee: Rc<FunctionSymbol>,
}

#[derive(Debug, Default)]
pub struct AnalysisInfo {
    references: Vec<Reference>,
    scope_regions: Vec<ScopeRegion>,
    auto_types: Vec<AutoTypeResolution>,
    call_sites: Vec<FunctionCallSite>,
    expression_types: FxHashMap<u32, ResolvedType>,
}

impl AnalysisInfo {
    pub(crate) fn push_reference(&mut self, location: Location, symbol: SymbolRef) {
        self.references.push(Reference { location, symbol });
    }

    pub(crate) fn push_scope_region(&mut self, location: Location, scope: ScopePath) {
        self.scope_regions.push(ScopeRegion { location, scope });
    }

    pub(crate) fn push_auto_type(&mut self, location: Location, ty: ResolvedType) {
        self.auto_types.push(AutoTypeResolution { location, ty });
    }

    pub(crate) fn push_call_site(&mut self, arguments: Rc<ArgumentList>, callee: Rc<FunctionSymbol>) {
        self.call_sites.push(FunctionCallSite { arguments, callee });
    }

    pub(crate) fn set_expression_type(&mut self, node_id: u32, ty: ResolvedType) {
        self.expression_types.insert(node_id, ty);
    }

    #[must_use]
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    #[must_use]
    pub fn scope_regions(&self) -> &[ScopeRegion] {
        &self.scope_regions
    }

    #[must_use]
    pub fn auto_types(&self) -> &[AutoTypeResolution] {
        &self.auto_types
    }

    #[must_use]
    pub fn call_sites(&self) -> &[FunctionCallSite] {
        &self.call_sites
    }

    /// Type of the expression with the given node id.
    #[must_use = "this is a pure lookup with no side effects"]
    pub fn expression_type(&self, node_id: u32) -> Option<&ResolvedType> {
        self.expression_types.get(&node_id)
    }

    /// Symbol referenced by the name token at exactly `location`.
    #[must_use = "this is a pure lookup with no side effects"]
    pub fn reference_at(&self, location: &Location) -> Option<&SymbolRef> {
        self.references
            .iter()
            .rev()
            .find(|reference| &reference.location == location)
            .map(|reference| &reference.symbol)
    }

    /// Every use site of `symbol`.
    pub fn references_to<'a>(&'a self, symbol: &'a SymbolRef) -> impl Iterator<Item = &'a Reference> {
        self.references
            .iter()
            .filter(move |reference| reference.symbol.is_same(symbol))
    }

    /// Innermost recorded scope whose region contains `location`.
    #[must_use = "this is a pure lookup with no side effects"]
    pub fn scope_at(&self, location: &Location) -> Option<&ScopePath> {
        self.scope_regions
            .iter()
            .filter(|region| region.location.contains(location))
            .min_by_key(|region| region.location.offset_end - region.location.offset_start)
            .map(|region| &region.scope)
    }
}
