//! Symbols
//!
//! A scope maps names to [`Symbol`]s. Every declaration becomes exactly one of
//! three kinds:
//!
//! - [`TypeSymbol`] for classes, mixins, interfaces, enums, template
//!   parameters, and the built-in primitives
//! - [`VariableSymbol`] for globals, fields, locals, parameters, enum members
//!   and synthesized virtual properties
//! - [`FunctionSymbol`], grouped by name into a [`FunctionOverloadSet`]
//!
//! Symbols are shared through `Rc`: a symbol declared in one file can be
//! copied into the scope tree of a file that includes it, and base class
//! members are copied into derived class scopes, all without cloning the
//! declaration itself.
//!
//! Fields that are only known after the whole file has been hoisted (resolved
//! types, base lists) are [`AssignOnce`] cells written exactly once.

use std::{
    cell::OnceCell,
    fmt::{self, Display, Formatter},
    rc::Rc,
};

use angelscript_ast::nodes::{
    AccessModifier, ClassDefinition, EnumDefinition, FuncDefDefinition, FunctionDefinition,
    InterfaceDefinition, Location, MixinDefinition, VirtualPropertyDefinition,
};

use crate::{errors::AnalyzerError, resolved_type::ResolvedType};

/// Position of a scope from the root, one segment per nesting level.
///
/// Symbols name the scope they were declared in through a path instead of a
/// pointer, so scope trees of different files can be merged by re-resolving
/// the path in the consuming tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ScopePath(Vec<String>);

impl ScopePath {
    #[must_use]
    pub fn root() -> Self {
        Self(vec![])
    }

    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    #[must_use]
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        Self(segments)
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for ScopePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "::{}", self.0.join("::"))
    }
}

/// A value that starts unresolved and is resolved exactly once.
#[derive(Debug)]
pub struct AssignOnce<T> {
    cell: OnceCell<T>,
}

impl<T> Default for AssignOnce<T> {
    fn default() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }
}

impl<T> AssignOnce<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn resolved(value: T) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(value);
        Self { cell }
    }

    /// Resolves the value.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::AlreadyAssigned`] if the value was resolved before.
    pub fn assign(&self, value: T, field: &'static str, owner: &str) -> Result<(), AnalyzerError> {
        self.cell.set(value).map_err(|_| AnalyzerError::AlreadyAssigned {
            field,
            symbol: owner.to_string(),
        })
    }

    /// The resolved value, for readers that run strictly after resolution.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::NotAssigned`] if the value is still unresolved.
    pub fn expect_assigned(&self, field: &'static str, owner: &str) -> Result<&T, AnalyzerError> {
        self.cell.get().ok_or_else(|| AnalyzerError::NotAssigned {
            field,
            symbol: owner.to_string(),
        })
    }

    #[must_use = "this is a pure lookup with no side effects"]
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.cell.get().is_some()
    }
}

/// Built-in value types. `Auto` and `Any` (`?`) only appear as destinations,
/// `Null` only as the type of the `null` literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Void,
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
    Auto,
    Any,
    Null,
}

impl PrimitiveKind {
    /// Every kind that has a source token, in declaration order.
    pub const DECLARABLE: [PrimitiveKind; 14] = [
        PrimitiveKind::Void,
        PrimitiveKind::Bool,
        PrimitiveKind::Int8,
        PrimitiveKind::Int16,
        PrimitiveKind::Int32,
        PrimitiveKind::Int64,
        PrimitiveKind::UInt8,
        PrimitiveKind::UInt16,
        PrimitiveKind::UInt32,
        PrimitiveKind::UInt64,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Auto,
        PrimitiveKind::Any,
    ];

    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "void" => PrimitiveKind::Void,
            "bool" => PrimitiveKind::Bool,
            "int8" => PrimitiveKind::Int8,
            "int16" => PrimitiveKind::Int16,
            "int" | "int32" => PrimitiveKind::Int32,
            "int64" => PrimitiveKind::Int64,
            "uint8" => PrimitiveKind::UInt8,
            "uint16" => PrimitiveKind::UInt16,
            "uint" | "uint32" => PrimitiveKind::UInt32,
            "uint64" => PrimitiveKind::UInt64,
            "float" => PrimitiveKind::Float,
            "double" => PrimitiveKind::Double,
            "auto" => PrimitiveKind::Auto,
            "?" => PrimitiveKind::Any,
            _ => return None,
        })
    }

    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Int8 => "int8",
            PrimitiveKind::Int16 => "int16",
            PrimitiveKind::Int32 => "int",
            PrimitiveKind::Int64 => "int64",
            PrimitiveKind::UInt8 => "uint8",
            PrimitiveKind::UInt16 => "uint16",
            PrimitiveKind::UInt32 => "uint",
            PrimitiveKind::UInt64 => "uint64",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Auto => "auto",
            PrimitiveKind::Any => "?",
            PrimitiveKind::Null => "null",
        }
    }

    #[must_use]
    pub fn is_integer(self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    #[must_use]
    pub fn is_signed_integer(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Int8 | PrimitiveKind::Int16 | PrimitiveKind::Int32 | PrimitiveKind::Int64
        )
    }

    #[must_use]
    pub fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            PrimitiveKind::UInt8
                | PrimitiveKind::UInt16
                | PrimitiveKind::UInt32
                | PrimitiveKind::UInt64
        )
    }

    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(self, PrimitiveKind::Float | PrimitiveKind::Double)
    }

    #[must_use]
    pub fn is_number(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Storage size in bytes; zero for kinds without a runtime representation.
    #[must_use]
    pub fn size(self) -> u8 {
        match self {
            PrimitiveKind::Bool | PrimitiveKind::Int8 | PrimitiveKind::UInt8 => 1,
            PrimitiveKind::Int16 | PrimitiveKind::UInt16 => 2,
            PrimitiveKind::Int32 | PrimitiveKind::UInt32 | PrimitiveKind::Float => 4,
            PrimitiveKind::Int64 | PrimitiveKind::UInt64 | PrimitiveKind::Double => 8,
            PrimitiveKind::Void | PrimitiveKind::Auto | PrimitiveKind::Any | PrimitiveKind::Null => 0,
        }
    }
}

impl Display for PrimitiveKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// The declaration a non-primitive type comes from.
#[derive(Debug, Clone)]
pub enum TypeDefinition {
    Class(Rc<ClassDefinition>),
    Mixin(Rc<MixinDefinition>),
    Interface(Rc<InterfaceDefinition>),
    Enum(Rc<EnumDefinition>),
}

impl TypeDefinition {
    #[must_use]
    pub fn id(&self) -> u32 {
        match self {
            TypeDefinition::Class(class) => class.id,
            TypeDefinition::Mixin(mixin) => mixin.id,
            TypeDefinition::Interface(interface) => interface.id,
            TypeDefinition::Enum(enumeration) => enumeration.id,
        }
    }
}

#[derive(Debug)]
pub struct TypeSymbol {
    pub identifier: String,
    /// `None` for built-in types.
    pub location: Option<Location>,
    pub declared_scope: ScopePath,
    pub definition: Option<TypeDefinition>,
    /// Scope holding the type's members (fields, methods, enum values).
    pub members_scope: Option<ScopePath>,
    pub template_parameters: Vec<String>,
    pub base_list: AssignOnce<Vec<ResolvedType>>,
    pub is_type_parameter: bool,
    pub primitive: Option<PrimitiveKind>,
    /// Enums declaring a same-named member, for an ambiguous enum member.
    pub enum_candidates: Vec<Rc<TypeSymbol>>,
}

impl TypeSymbol {
    #[must_use]
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self {
            identifier: kind.token().to_string(),
            location: None,
            declared_scope: ScopePath::root(),
            definition: None,
            members_scope: None,
            template_parameters: vec![],
            base_list: AssignOnce::resolved(vec![]),
            is_type_parameter: false,
            primitive: Some(kind),
            enum_candidates: vec![],
        }
    }

    #[must_use]
    pub fn type_parameter(identifier: &str, location: Location, declared_scope: ScopePath) -> Self {
        Self {
            identifier: identifier.to_string(),
            location: Some(location),
            declared_scope,
            definition: None,
            members_scope: None,
            template_parameters: vec![],
            base_list: AssignOnce::resolved(vec![]),
            is_type_parameter: true,
            primitive: None,
            enum_candidates: vec![],
        }
    }

    /// Pseudo-type of an enum member name declared by several enums.
    #[must_use]
    pub fn ambiguous_enum_member(identifier: &str, candidates: Vec<Rc<TypeSymbol>>) -> Self {
        Self {
            identifier: identifier.to_string(),
            location: None,
            declared_scope: ScopePath::root(),
            definition: None,
            members_scope: None,
            template_parameters: vec![],
            base_list: AssignOnce::resolved(vec![]),
            is_type_parameter: false,
            primitive: None,
            enum_candidates: candidates,
        }
    }

    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.primitive.is_some()
    }

    #[must_use]
    pub fn is_primitive_kind(&self, kind: PrimitiveKind) -> bool {
        self.primitive == Some(kind)
    }

    #[must_use]
    pub fn is_enum(&self) -> bool {
        matches!(self.definition, Some(TypeDefinition::Enum(_)))
    }

    #[must_use]
    pub fn is_class(&self) -> bool {
        matches!(self.definition, Some(TypeDefinition::Class(_)))
    }

    #[must_use]
    pub fn is_mixin(&self) -> bool {
        matches!(self.definition, Some(TypeDefinition::Mixin(_)))
    }

    #[must_use]
    pub fn is_interface(&self) -> bool {
        matches!(self.definition, Some(TypeDefinition::Interface(_)))
    }

    #[must_use]
    pub fn is_ambiguous_enum_member(&self) -> bool {
        !self.enum_candidates.is_empty()
    }

    /// Values of the type are numbers, including enums promoted to `int`.
    #[must_use]
    pub fn numeric_kind(&self) -> Option<PrimitiveKind> {
        match self.primitive {
            Some(kind) if kind.is_number() => Some(kind),
            _ if self.is_enum() => Some(PrimitiveKind::Int32),
            _ => None,
        }
    }

    /// Whether both symbols denote the same type.
    #[must_use]
    pub fn is_same(&self, other: &TypeSymbol) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        match (&self.primitive, &other.primitive, &self.definition, &other.definition) {
            (Some(left), Some(right), _, _) => left == right,
            (None, None, Some(left), Some(right)) => left.id() == right.id(),
            _ => false,
        }
    }
}

/// Declaration node behind a function symbol.
#[derive(Debug, Clone)]
pub enum FunctionNode {
    Function(Rc<FunctionDefinition>),
    FuncDef(Rc<FuncDefDefinition>),
    Getter(Rc<VirtualPropertyDefinition>),
    Setter(Rc<VirtualPropertyDefinition>),
}

/// What overload resolution needs to know about a declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    pub name: Option<String>,
    pub has_default: bool,
    pub is_variadic: bool,
}

impl FunctionNode {
    #[must_use]
    pub fn parameters(&self) -> Vec<ParameterInfo> {
        let from_nodes = |parameters: &[Rc<angelscript_ast::nodes::Parameter>]| {
            parameters
                .iter()
                .map(|p| ParameterInfo {
                    name: p.name(),
                    has_default: p.has_default(),
                    is_variadic: p.is_variadic,
                })
                .collect::<Vec<_>>()
        };
        match self {
            FunctionNode::Function(function) => from_nodes(&function.parameters),
            FunctionNode::FuncDef(funcdef) => from_nodes(&funcdef.parameters),
            FunctionNode::Getter(_) => vec![],
            FunctionNode::Setter(_) => vec![ParameterInfo {
                name: Some("value".to_string()),
                has_default: false,
                is_variadic: false,
            }],
        }
    }

    #[must_use]
    pub fn is_constructor(&self) -> bool {
        matches!(self, FunctionNode::Function(function) if function.is_constructor())
    }

    #[must_use]
    pub fn is_funcdef(&self) -> bool {
        matches!(self, FunctionNode::FuncDef(_))
    }

    #[must_use]
    pub fn is_property_accessor(&self) -> bool {
        match self {
            FunctionNode::Function(function) => function.attributes.is_property,
            FunctionNode::Getter(_) | FunctionNode::Setter(_) => true,
            FunctionNode::FuncDef(_) => false,
        }
    }
}

#[derive(Debug)]
pub struct FunctionSymbol {
    pub identifier: String,
    pub location: Location,
    pub declared_scope: ScopePath,
    pub node: FunctionNode,
    /// Anonymous scope owning the parameter variables and the body.
    pub function_scope: Option<ScopePath>,
    pub return_type: AssignOnce<Option<ResolvedType>>,
    pub parameter_types: AssignOnce<Vec<Option<ResolvedType>>>,
    /// Named parameters as declared in the function scope, for named
    /// argument references.
    pub parameter_variables: AssignOnce<Vec<Rc<VariableSymbol>>>,
    pub template_parameters: Vec<String>,
    pub is_instance_member: bool,
    pub access: AccessModifier,
}

impl FunctionSymbol {
    #[must_use]
    pub fn parameters(&self) -> Vec<ParameterInfo> {
        self.node.parameters()
    }

    /// Resolved parameter types; unresolvable ones are `None`.
    ///
    /// # Errors
    ///
    /// Fails if read before the signature was hoisted.
    pub fn parameter_types(&self) -> Result<&[Option<ResolvedType>], AnalyzerError> {
        self.parameter_types
            .expect_assigned("parameter types", &self.identifier)
            .map(Vec::as_slice)
    }

    /// # Errors
    ///
    /// Fails if read before the signature was hoisted.
    pub fn return_type(&self) -> Result<Option<&ResolvedType>, AnalyzerError> {
        self.return_type
            .expect_assigned("return type", &self.identifier)
            .map(Option::as_ref)
    }

    /// The parameter named `name`, once the signature is hoisted.
    #[must_use = "this is a pure lookup with no side effects"]
    pub fn parameter_variable(&self, name: &str) -> Option<&Rc<VariableSymbol>> {
        self.parameter_variables
            .get()?
            .iter()
            .find(|variable| variable.identifier == name)
    }

    #[must_use]
    pub fn is_funcdef(&self) -> bool {
        self.node.is_funcdef()
    }
}

#[derive(Debug)]
pub struct VariableSymbol {
    pub identifier: String,
    /// `None` for variables synthesized from property accessors.
    pub location: Option<Location>,
    pub declared_scope: ScopePath,
    pub ty: AssignOnce<Option<ResolvedType>>,
    pub is_instance_member: bool,
    pub access: AccessModifier,
    /// Stands for a `get_x`/`set_x` pair rather than storage.
    pub is_virtual_property: bool,
    /// The accessors take an index: `obj.x[i]`.
    pub indexed_property_accessor: bool,
}

impl VariableSymbol {
    #[must_use]
    pub fn new(identifier: &str, location: Option<Location>, declared_scope: ScopePath) -> Self {
        Self {
            identifier: identifier.to_string(),
            location,
            declared_scope,
            ty: AssignOnce::new(),
            is_instance_member: false,
            access: AccessModifier::Public,
            is_virtual_property: false,
            indexed_property_accessor: false,
        }
    }

    #[must_use]
    pub fn with_type(mut self, ty: Option<ResolvedType>) -> Self {
        self.ty = AssignOnce::resolved(ty);
        self
    }

    /// The declared or inferred type; `None` while unknown.
    #[must_use]
    pub fn resolved_type(&self) -> Option<&ResolvedType> {
        self.ty.get().and_then(Option::as_ref)
    }
}

/// All functions sharing one name in one scope, in declaration order.
#[derive(Debug, Clone)]
pub struct FunctionOverloadSet {
    overloads: Vec<Rc<FunctionSymbol>>,
}

impl FunctionOverloadSet {
    #[must_use]
    pub fn new(first: Rc<FunctionSymbol>) -> Self {
        Self {
            overloads: vec![first],
        }
    }

    pub fn push(&mut self, overload: Rc<FunctionSymbol>) {
        if !self.overloads.iter().any(|o| Rc::ptr_eq(o, &overload)) {
            self.overloads.push(overload);
        }
    }

    #[must_use]
    pub fn first(&self) -> &Rc<FunctionSymbol> {
        &self.overloads[0]
    }

    #[must_use]
    pub fn overloads(&self) -> &[Rc<FunctionSymbol>] {
        &self.overloads
    }

    /// The funcdef, if this holder declares a delegate type.
    #[must_use]
    pub fn as_funcdef(&self) -> Option<&Rc<FunctionSymbol>> {
        match self.overloads.as_slice() {
            [only] if only.is_funcdef() => Some(only),
            _ => None,
        }
    }

    #[must_use]
    pub fn contains(&self, function: &Rc<FunctionSymbol>) -> bool {
        self.overloads.iter().any(|o| Rc::ptr_eq(o, function))
    }
}

#[derive(Debug, Clone)]
pub enum Symbol {
    Type(Rc<TypeSymbol>),
    Variable(Rc<VariableSymbol>),
    Functions(FunctionOverloadSet),
}

impl Symbol {
    #[must_use]
    pub fn as_type(&self) -> Option<&Rc<TypeSymbol>> {
        match self {
            Symbol::Type(ty) => Some(ty),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_variable(&self) -> Option<&Rc<VariableSymbol>> {
        match self {
            Symbol::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_functions(&self) -> Option<&FunctionOverloadSet> {
        match self {
            Symbol::Functions(functions) => Some(functions),
            _ => None,
        }
    }

    /// Source file of the declaration; built-ins have none.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        match self {
            Symbol::Type(ty) => ty.location.as_ref().map(|l| l.source.as_str()),
            Symbol::Variable(variable) => variable.location.as_ref().map(|l| l.source.as_str()),
            Symbol::Functions(functions) => Some(functions.first().location.source.as_str()),
        }
    }
}

/// A single declaration a name use resolved to.
#[derive(Debug, Clone)]
pub enum SymbolRef {
    Type(Rc<TypeSymbol>),
    Variable(Rc<VariableSymbol>),
    Function(Rc<FunctionSymbol>),
}

impl SymbolRef {
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            SymbolRef::Type(ty) => &ty.identifier,
            SymbolRef::Variable(variable) => &variable.identifier,
            SymbolRef::Function(function) => &function.identifier,
        }
    }

    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        match self {
            SymbolRef::Type(ty) => ty.location.as_ref(),
            SymbolRef::Variable(variable) => variable.location.as_ref(),
            SymbolRef::Function(function) => Some(&function.location),
        }
    }

    #[must_use]
    pub fn is_same(&self, other: &SymbolRef) -> bool {
        match (self, other) {
            (SymbolRef::Type(a), SymbolRef::Type(b)) => a.is_same(b),
            (SymbolRef::Variable(a), SymbolRef::Variable(b)) => Rc::ptr_eq(a, b),
            (SymbolRef::Function(a), SymbolRef::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}
