use core::fmt;
use std::{
    fmt::{Display, Formatter},
    rc::Rc,
};

#[derive(Clone, PartialEq, Eq, Debug, Default, Hash, serde::Serialize, serde::Deserialize)]
pub struct Location {
    pub offset_start: u32,
    pub offset_end: u32,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub source: String,
}

impl Location {
    #[must_use]
    pub fn new(
        offset_start: u32,
        offset_end: u32,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
        source: String,
    ) -> Self {
        Self {
            offset_start,
            offset_end,
            start_line,
            start_column,
            end_line,
            end_column,
            source,
        }
    }

    /// Whether `other` lies inside this range of the same source.
    #[must_use]
    pub fn contains(&self, other: &Location) -> bool {
        self.source == other.source
            && self.offset_start <= other.offset_start
            && other.offset_end <= self.offset_end
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_column)
    }
}

#[macro_export]
macro_rules! ast_node {
    (
        $(#[$outer:meta])*
        $struct_vis:vis struct $name:ident {
            $(
                $(#[$field_attr:meta])*
                $field_vis:vis $field_name:ident : $field_ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Clone, PartialEq, Debug)]
        $struct_vis struct $name {
            pub id: u32,
            pub location: $crate::nodes::Location,
            $(
                $(#[$field_attr])*
                $field_vis $field_name : $field_ty,
            )*
        }
    };
}

macro_rules! ast_nodes {
    (
        $(
            $(#[$outer:meta])*
            $struct_vis:vis struct $name:ident { $($fields:tt)* }
        )+
    ) => {
        $(
            ast_node! {
                $(#[$outer])*
                $struct_vis struct $name { $($fields)* }
            }
        )+
    };
}

macro_rules! ast_enum {
    (
        $(#[$outer:meta])*
        $enum_vis:vis enum $name:ident {
            $(
                $(#[$arm_attr:meta])*
                $(@$conv:ident)? $arm:ident $( ( $($tuple:tt)* ) )? ,
            )*
        }
    ) => {
        $(#[$outer])*
        #[derive(Clone, PartialEq, Debug)]
        $enum_vis enum $name {
            $(
                $(#[$arm_attr])*
                $arm $( ( $($tuple)* ) )? ,
            )*
        }

        impl $name {

            #[must_use]
            pub fn id(&self) -> u32 {
                match self {
                    $(
                        $name::$arm(n, ..) => { ast_enum!(@id_arm n, $($conv)?) }
                    )*
                }
            }

            #[must_use]
            pub fn location(&self) -> Location {
                match self {
                    $(
                        $name::$arm(n, ..) => { ast_enum!(@location_arm n, $($conv)?) }
                    )*
                }
            }
        }
    };

    (@id_arm $inner:ident, inner_enum) => {
        $inner.id()
    };

    (@id_arm $inner:ident, ) => {
        $inner.id
    };

    (@location_arm $inner:ident, inner_enum) => {
        $inner.location()
    };

    (@location_arm $inner:ident, ) => {
        $inner.location.clone()
    };
}

macro_rules! ast_enums {
    (
        $(
            $(#[$outer:meta])*
            $enum_vis:vis enum $name:ident { $($arms:tt)* }
        )+
    ) => {
        $(
            ast_enum! {
                $(#[$outer])*
                $enum_vis enum $name { $($arms)* }
            }
        )+
    };
}

ast_enums! {

    pub enum Definition {
        Namespace(Rc<NamespaceDefinition>),
        Enum(Rc<EnumDefinition>),
        Class(Rc<ClassDefinition>),
        Mixin(Rc<MixinDefinition>),
        Interface(Rc<InterfaceDefinition>),
        Typedef(Rc<TypedefDefinition>),
        FuncDef(Rc<FuncDefDefinition>),
        Function(Rc<FunctionDefinition>),
        Variable(Rc<VariableDefinition>),
        VirtualProperty(Rc<VirtualPropertyDefinition>),
        Import(Rc<ImportDefinition>),
    }

    /// Members allowed inside class and interface bodies.
    pub enum ClassMember {
        Function(Rc<FunctionDefinition>),
        Variable(Rc<VariableDefinition>),
        VirtualProperty(Rc<VirtualPropertyDefinition>),
        FuncDef(Rc<FuncDefDefinition>),
    }

    pub enum Statement {
        Block(Rc<StatementBlock>),
        Variable(Rc<VariableDefinition>),
        If(Rc<IfStatement>),
        For(Rc<ForStatement>),
        While(Rc<WhileStatement>),
        DoWhile(Rc<DoWhileStatement>),
        Switch(Rc<SwitchStatement>),
        Return(Rc<ReturnStatement>),
        Break(Rc<BreakStatement>),
        Continue(Rc<ContinueStatement>),
        Try(Rc<TryStatement>),
        Expression(Rc<ExpressionStatement>),
    }

    pub enum Expression {
        @inner_enum Literal(Literal),
        Variable(Rc<VariableAccessExpression>),
        FunctionCall(Rc<FunctionCallExpression>),
        ConstructorCall(Rc<ConstructorCallExpression>),
        Cast(Rc<CastExpression>),
        Lambda(Rc<LambdaExpression>),
        MemberAccess(Rc<MemberAccessExpression>),
        MethodCall(Rc<MethodCallExpression>),
        Index(Rc<IndexExpression>),
        Invoke(Rc<InvokeExpression>),
        PostfixUnary(Rc<PostfixUnaryExpression>),
        PrefixUnary(Rc<PrefixUnaryExpression>),
        Binary(Rc<BinaryExpression>),
        Assign(Rc<AssignExpression>),
        Ternary(Rc<TernaryExpression>),
        Parenthesized(Rc<ParenthesizedExpression>),
        InitList(Rc<InitListExpression>),
    }

    pub enum Literal {
        Number(Rc<NumberLiteral>),
        String(Rc<StringLiteral>),
        Bool(Rc<BoolLiteral>),
        Null(Rc<NullLiteral>),
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub enum AccessModifier {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FunctionAttributes {
    pub is_property: bool,
    pub is_const: bool,
    pub is_override: bool,
    pub is_final: bool,
    pub is_explicit: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ClassModifiers {
    pub is_shared: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_external: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ReferenceModifier {
    In,
    Out,
    InOut,
}

/// Suffix modifiers of a type reference, in source order (`A@[]` is `[Handle, Array]`).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TypeModifier {
    Handle,
    Array,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Xor,
    Is,
    NotIs,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum UnaryOperator {
    Neg,
    Plus,
    Not,
    BitNot,
    PreInc,
    PreDec,
    Handle,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PostfixOperator {
    Inc,
    Dec,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum AssignOperator {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
}

/// Initializer of a single declarator: `T x = expr;` or `T x(args);`.
#[derive(Clone, PartialEq, Debug)]
pub enum VariableInitializer {
    Expression(Expression),
    Arguments(Rc<ArgumentList>),
}

ast_nodes! {

    pub struct Script {
        pub definitions: Vec<Definition>,
    }

    pub struct Identifier {
        pub name: String,
    }

    /// `a::b::` in front of a name; `is_global` for a leading `::`.
    pub struct ScopeQualifier {
        pub is_global: bool,
        pub segments: Vec<Rc<Identifier>>,
    }

    pub struct TypeRef {
        pub is_const: bool,
        pub scope: Option<Rc<ScopeQualifier>>,
        pub name: Rc<Identifier>,
        pub template_arguments: Vec<Rc<TypeRef>>,
        pub modifiers: Vec<TypeModifier>,
    }

    pub struct NamespaceDefinition {
        pub names: Vec<Rc<Identifier>>,
        pub definitions: Vec<Definition>,
    }

    pub struct EnumDefinition {
        pub name: Rc<Identifier>,
        pub members: Vec<Rc<EnumMember>>,
    }

    pub struct EnumMember {
        pub name: Rc<Identifier>,
        pub value: Option<Expression>,
    }

    pub struct ClassDefinition {
        pub modifiers: ClassModifiers,
        pub name: Rc<Identifier>,
        pub template_parameters: Vec<Rc<Identifier>>,
        pub bases: Vec<Rc<TypeRef>>,
        pub members: Vec<ClassMember>,
    }

    pub struct MixinDefinition {
        pub class: Rc<ClassDefinition>,
    }

    pub struct InterfaceDefinition {
        pub name: Rc<Identifier>,
        pub bases: Vec<Rc<TypeRef>>,
        pub members: Vec<ClassMember>,
    }

    pub struct TypedefDefinition {
        pub ty: Rc<TypeRef>,
        pub name: Rc<Identifier>,
    }

    pub struct FuncDefDefinition {
        pub access: AccessModifier,
        pub return_type: Rc<TypeRef>,
        pub returns_reference: bool,
        pub name: Rc<Identifier>,
        pub parameters: Vec<Rc<Parameter>>,
    }

    pub struct FunctionDefinition {
        pub access: AccessModifier,
        pub attributes: FunctionAttributes,
        /// `None` for constructors and destructors.
        pub return_type: Option<Rc<TypeRef>>,
        pub returns_reference: bool,
        pub is_destructor: bool,
        pub name: Rc<Identifier>,
        pub template_parameters: Vec<Rc<Identifier>>,
        pub parameters: Vec<Rc<Parameter>>,
        pub body: Option<Rc<StatementBlock>>,
    }

    pub struct Parameter {
        pub ty: Rc<TypeRef>,
        pub reference: Option<ReferenceModifier>,
        pub name: Option<Rc<Identifier>>,
        pub default_value: Option<Expression>,
        pub is_variadic: bool,
    }

    pub struct VariableDefinition {
        pub access: AccessModifier,
        pub ty: Rc<TypeRef>,
        pub declarators: Vec<Rc<VariableDeclarator>>,
    }

    pub struct VariableDeclarator {
        pub name: Rc<Identifier>,
        pub initializer: Option<VariableInitializer>,
    }

    pub struct VirtualPropertyDefinition {
        pub access: AccessModifier,
        pub ty: Rc<TypeRef>,
        pub returns_reference: bool,
        pub name: Rc<Identifier>,
        pub getter: Option<Rc<PropertyAccessor>>,
        pub setter: Option<Rc<PropertyAccessor>>,
    }

    pub struct PropertyAccessor {
        pub is_const: bool,
        pub body: Option<Rc<StatementBlock>>,
    }

    pub struct ImportDefinition {
        pub function: Rc<FunctionDefinition>,
        pub from: String,
    }

    pub struct StatementBlock {
        pub statements: Vec<Statement>,
    }

    pub struct IfStatement {
        pub condition: Expression,
        pub then_branch: Statement,
        pub else_branch: Option<Statement>,
    }

    pub struct ForStatement {
        pub initializer: Option<Statement>,
        pub condition: Option<Expression>,
        pub increments: Vec<Expression>,
        pub body: Statement,
    }

    pub struct WhileStatement {
        pub condition: Expression,
        pub body: Statement,
    }

    pub struct DoWhileStatement {
        pub body: Statement,
        pub condition: Expression,
    }

    pub struct SwitchStatement {
        pub value: Expression,
        pub cases: Vec<Rc<SwitchCase>>,
    }

    /// `value` is `None` for the `default:` label.
    pub struct SwitchCase {
        pub value: Option<Expression>,
        pub statements: Vec<Statement>,
    }

    pub struct ReturnStatement {
        pub value: Option<Expression>,
    }

    pub struct BreakStatement {}

    pub struct ContinueStatement {}

    pub struct TryStatement {
        pub try_block: Rc<StatementBlock>,
        pub catch_block: Rc<StatementBlock>,
    }

    pub struct ExpressionStatement {
        pub expression: Option<Expression>,
    }

    pub struct NumberLiteral {
        pub value: String,
    }

    pub struct StringLiteral {
        pub value: String,
    }

    pub struct BoolLiteral {
        pub value: bool,
    }

    pub struct NullLiteral {}

    pub struct VariableAccessExpression {
        pub scope: Option<Rc<ScopeQualifier>>,
        pub name: Rc<Identifier>,
    }

    pub struct FunctionCallExpression {
        pub scope: Option<Rc<ScopeQualifier>>,
        pub name: Rc<Identifier>,
        pub template_arguments: Vec<Rc<TypeRef>>,
        pub arguments: Rc<ArgumentList>,
    }

    pub struct ConstructorCallExpression {
        pub ty: Rc<TypeRef>,
        pub arguments: Rc<ArgumentList>,
    }

    pub struct CastExpression {
        pub target: Rc<TypeRef>,
        pub expression: Expression,
    }

    pub struct LambdaExpression {
        pub parameters: Vec<Rc<LambdaParameter>>,
        pub body: Rc<StatementBlock>,
    }

    pub struct LambdaParameter {
        pub ty: Option<Rc<TypeRef>>,
        pub name: Option<Rc<Identifier>>,
    }

    pub struct MemberAccessExpression {
        pub expression: Expression,
        pub name: Rc<Identifier>,
    }

    pub struct MethodCallExpression {
        pub expression: Expression,
        pub name: Rc<Identifier>,
        pub arguments: Rc<ArgumentList>,
    }

    pub struct IndexExpression {
        pub expression: Expression,
        pub arguments: Rc<ArgumentList>,
    }

    pub struct InvokeExpression {
        pub expression: Expression,
        pub arguments: Rc<ArgumentList>,
    }

    pub struct PostfixUnaryExpression {
        pub expression: Expression,
        pub operator: PostfixOperator,
    }

    pub struct PrefixUnaryExpression {
        pub operator: UnaryOperator,
        pub expression: Expression,
    }

    pub struct BinaryExpression {
        pub left: Expression,
        pub operator: BinaryOperator,
        pub right: Expression,
    }

    pub struct AssignExpression {
        pub left: Expression,
        pub operator: AssignOperator,
        pub right: Expression,
    }

    pub struct TernaryExpression {
        pub condition: Expression,
        pub if_true: Expression,
        pub if_false: Expression,
    }

    pub struct ParenthesizedExpression {
        pub expression: Expression,
    }

    pub struct InitListExpression {
        pub elements: Vec<Expression>,
    }

    pub struct ArgumentList {
        pub arguments: Vec<Rc<Argument>>,
    }

    /// A call argument, optionally named (`name: value`).
    pub struct Argument {
        pub name: Option<Rc<Identifier>>,
        pub value: Expression,
    }
}
