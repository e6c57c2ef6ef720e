use std::fmt::{self, Display, Formatter};

use angelscript_ast::nodes::Location;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures of the analyzer itself rather than of the analyzed program.
///
/// These are never turned into user diagnostics: they abort the analysis of
/// the file and surface to the orchestration layer as a crash report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalyzerError {
    #[error("`{field}` of `{symbol}` was assigned twice")]
    AlreadyAssigned { field: &'static str, symbol: String },

    #[error("`{field}` of `{symbol}` was read before it was assigned")]
    NotAssigned { field: &'static str, symbol: String },

    #[error("operator `{operator}` has no overload category")]
    UnhandledOperator { operator: String },
}

/// Direction of a virtual property access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyAccessKind {
    Read,
    Write,
}

impl Display for PropertyAccessKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PropertyAccessKind::Read => write!(f, "read"),
            PropertyAccessKind::Write => write!(f, "written"),
        }
    }
}

/// Errors in the analyzed program. The `Display` text is the message shown
/// to the user; the location travels separately in [`Diagnostic`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SemanticError {
    #[error("`{name}` is not defined")]
    UndefinedSymbol { name: String },

    #[error("type `{name}` is not defined")]
    UndefinedType { name: String },

    #[error("namespace `{name}` is not defined")]
    UndefinedScope { name: String },

    #[error("`{name}` is already declared in this scope")]
    AlreadyDeclared { name: String },

    #[error("function `{name}` cannot be reopened as a namespace")]
    FunctionReusedAsNamespace { name: String },

    #[error("`{name}` is not a type")]
    NotAType { name: String },

    #[error("`{name}` is a type and cannot be used as a value")]
    TypeUsedAsValue { name: String },

    #[error("`{name}` takes {expected} template arguments, but {found} were supplied")]
    TooManyTemplateArguments {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("cannot implicitly convert `{found}` to `{expected}`")]
    TypeMismatch { expected: String, found: String },

    #[error("too many arguments for `{function}`: expected at most {expected}, found {found}")]
    TooManyArguments {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("too few arguments for `{function}`: missing a value for `{parameter}`")]
    TooFewArguments { function: String, parameter: String },

    #[error("`{function}` has no parameter named `{name}`")]
    NamedArgumentNotFound { function: String, name: String },

    #[error("parameter `{name}` of `{function}` is supplied more than once")]
    DuplicateNamedArgument { function: String, name: String },

    #[error("positional arguments cannot follow named arguments")]
    PositionalAfterNamed,

    #[error("argument {index} of `{function}`: cannot convert `{found}` to `{expected}`")]
    ArgumentMismatch {
        function: String,
        index: usize,
        expected: String,
        found: String,
    },

    #[error("no constructor of `{name}` accepts {arguments} argument(s)")]
    NoMatchingConstructor { name: String, arguments: usize },

    #[error("operator `{operator}` is not defined for `{left}` and `{right}`")]
    OperatorNotDefined {
        operator: String,
        left: String,
        right: String,
    },

    #[error("operator `{operator}` is not defined for `{operand}`")]
    UnaryOperatorNotDefined { operator: String, operand: String },

    #[error("condition must be `bool`, found `{found}`")]
    ConditionNotBool { found: String },

    #[error("operands of `{operator}` must be `bool`, and at least one must be exactly `bool`")]
    LogicalOperandsNotBool { operator: String },

    #[error("`{type_name}` has no member `{member}`")]
    NoSuchMember { type_name: String, member: String },

    #[error("`{member}` is {access} and cannot be accessed here")]
    InaccessibleMember { member: String, access: String },

    #[error("`{type_name}` cannot be indexed")]
    NotIndexable { type_name: String },

    #[error("indexed property `{property}` takes exactly one integer index")]
    IndexedPropertyArgument { property: String },

    #[error("`{type_name}` cannot be called")]
    NotCallable { type_name: String },

    #[error("cannot cast `{from}` to `{to}`")]
    InvalidCast { from: String, to: String },

    #[error("`{function}` must return a value of type `{expected}`")]
    MissingReturnValue { function: String, expected: String },

    #[error("`{function}` returns `void` and cannot return a value")]
    UnexpectedReturnValue { function: String },

    #[error("property `{name}` cannot be {kind}")]
    PropertyAccess {
        name: String,
        kind: PropertyAccessKind,
    },

    #[error("cannot infer the type of `auto` variable `{name}` without an initializer")]
    AutoWithoutInitializer { name: String },

    #[error("switch value must be an integer or enum, found `{found}`")]
    InvalidSwitchValue { found: String },

    #[error("initializer list needs an array destination, found `{found}`")]
    InitListWithoutArray { found: String },

    #[error("lambda needs a funcdef destination to infer its signature")]
    LambdaWithoutFuncdef,

    #[error("`{name}` is ambiguous between {candidates}")]
    AmbiguousEnumMember { name: String, candidates: String },

    #[error("included file `{path}` could not be found")]
    MissingInclude { path: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
    pub location: Location,
    pub message: String,
    pub severity: Severity,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.location.source, self.location, self.message)
    }
}

/// Session-owned collector for diagnostics.
///
/// The same message at the same location is reported once: re-analysis of
/// shared subtrees (default arguments, copied base members) would otherwise
/// repeat it.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    reported: FxHashSet<(Location, String)>,
}

impl DiagnosticSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, location: &Location, error: &SemanticError, severity: Severity) {
        self.push(Diagnostic {
            location: location.clone(),
            message: error.to_string(),
            severity,
        });
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        let key = (diagnostic.location.clone(), diagnostic.message.clone());
        if self.reported.contains(&key) {
            return;
        }
        self.reported.insert(key);
        self.diagnostics.push(diagnostic);
    }

    #[must_use = "this is a pure lookup with no side effects"]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Removes and returns everything collected so far.
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        self.reported.clear();
        std::mem::take(&mut self.diagnostics)
    }
}
