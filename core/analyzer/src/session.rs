use std::{collections::VecDeque, rc::Rc};

use angelscript_ast::nodes::{ClassMember, Expression, Location, StatementBlock, TypeRef, VariableInitializer};
use rustc_hash::FxHashSet;

use crate::{
    analysis_info::AnalysisInfo,
    config::AnalyzerConfig,
    conversion::{ConversionCost, evaluate_conversion},
    errors::{DiagnosticSink, SemanticError},
    resolved_type::ResolvedType,
    symbol::{FunctionSymbol, PrimitiveKind, ScopePath, Symbol, SymbolRef, TypeSymbol, VariableSymbol},
    symbol_table::{ScopeId, SymbolTable},
};

/// Deferred hoisting work, run in FIFO order once every name of the file has
/// been declared.
#[derive(Debug)]
pub(crate) enum HoistTask {
    ClassBases {
        scope: ScopeId,
        symbol: Rc<TypeSymbol>,
        bases: Vec<Rc<TypeRef>>,
    },
    ClassMembers {
        scope: ScopeId,
        members: Vec<ClassMember>,
        is_interface: bool,
    },
    FunctionSignature {
        scope: ScopeId,
        function: Rc<FunctionSymbol>,
    },
    VariableType {
        scope: ScopeId,
        variable: Rc<VariableSymbol>,
        ty: Rc<TypeRef>,
    },
}

/// Deferred body analysis, run after hoisting has completed.
#[derive(Debug)]
pub(crate) enum AnalyzeTask {
    FunctionBody {
        scope: ScopeId,
        function: Rc<FunctionSymbol>,
        body: Rc<StatementBlock>,
    },
    VariableInitializer {
        scope: ScopeId,
        variable: Rc<VariableSymbol>,
        ty: Rc<TypeRef>,
        initializer: Option<VariableInitializer>,
    },
    EnumValue {
        scope: ScopeId,
        value: Expression,
    },
}

/// State of one file's analysis, threaded through both phases.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) table: SymbolTable,
    pub(crate) diagnostics: DiagnosticSink,
    pub(crate) info: AnalysisInfo,
    pub(crate) config: AnalyzerConfig,
    pub(crate) hoist_queue: VecDeque<HoistTask>,
    /// Classes whose inherited members are copied once every signature of
    /// the file is resolved.
    pub(crate) base_copy_queue: VecDeque<Rc<TypeSymbol>>,
    pub(crate) analyze_queue: VecDeque<AnalyzeTask>,
    /// Definition ids of classes whose base members were already copied.
    pub(crate) copied_bases: FxHashSet<u32>,
}

impl Session {
    pub(crate) fn new(file_path: &str, config: &AnalyzerConfig) -> Self {
        Self {
            table: SymbolTable::new(file_path, &config.builtin_string_type),
            diagnostics: DiagnosticSink::new(),
            info: AnalysisInfo::default(),
            config: config.clone(),
            hoist_queue: VecDeque::new(),
            base_copy_queue: VecDeque::new(),
            analyze_queue: VecDeque::new(),
            copied_bases: FxHashSet::default(),
        }
    }

    pub(crate) fn error(&mut self, location: &Location, error: SemanticError) {
        self.diagnostics
            .report(location, &error, self.config.diagnostic_severity.semantic);
    }

    pub(crate) fn reference(&mut self, location: &Location, symbol: SymbolRef) {
        self.info.push_reference(location.clone(), symbol);
    }

    /// Declares `symbol`, reporting `AlreadyDeclared` at `location` on a
    /// conflict. Returns whether the symbol was added.
    pub(crate) fn declare(&mut self, scope: ScopeId, name: &str, location: &Location, symbol: Symbol) -> bool {
        if self.table.insert(scope, name, symbol).is_err() {
            self.error(location, SemanticError::AlreadyDeclared {
                name: name.to_string(),
            });
            return false;
        }
        true
    }

    pub(crate) fn scope_path(&self, scope: ScopeId) -> ScopePath {
        self.table.scope(scope).path().clone()
    }

    pub(crate) fn builtin_type(&self, kind: PrimitiveKind) -> ResolvedType {
        ResolvedType::from_type(self.table.builtin(kind))
    }

    pub(crate) fn conversion_cost(&self, src: &ResolvedType, dest: &ResolvedType) -> Option<ConversionCost> {
        evaluate_conversion(&self.table, src, dest)
    }

    pub(crate) fn is_convertible(&self, src: &ResolvedType, dest: &ResolvedType) -> bool {
        self.conversion_cost(src, dest).is_some()
    }

    /// Overloads of method `name` on values of type `ty`.
    pub(crate) fn member_overloads(&self, ty: &ResolvedType, name: &str) -> Vec<Rc<FunctionSymbol>> {
        ty.type_symbol()
            .map(|symbol| self.table.member_functions(symbol, name))
            .unwrap_or_default()
    }

    pub(crate) fn record_type(&mut self, node_id: u32, ty: Option<&ResolvedType>) {
        if let Some(ty) = ty {
            self.info.set_expression_type(node_id, ty.clone());
        }
    }
}
