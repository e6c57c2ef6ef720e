//! Programmatic construction of syntax trees.
//!
//! Tokenizing and parsing live outside the analyzer, so front-ends (and the
//! test-suite) hand it trees assembled through this `Builder`. The builder:
//!
//! - Assigns unique sequential IDs to each node
//! - Assigns every node a source range; a composite node's range covers the
//!   ranges of the children it was built from, so "which scope contains this
//!   position" queries behave as they would for parsed code
//! - Parses compact type strings such as `const ns::Wrapper<Entity>@[]`
//!
//! # Example
//!
//! ```
//! use angelscript_ast::builder::Builder;
//!
//! let b = Builder::new("main.as");
//! let body = vec![b.ret(Some(b.binary(b.var("a"), angelscript_ast::nodes::BinaryOperator::Add, b.var("b"))))];
//! let add = b.function("int", "add", vec![b.param("int", "a"), b.param("int", "b")], body);
//! let script = b.script(vec![angelscript_ast::nodes::Definition::Function(add)]);
//! assert_eq!(script.definitions.len(), 1);
//! ```
//!
//! # Node ID Assignment
//!
//! Node IDs are assigned sequentially starting from 1 using an atomic counter
//! shared by all builders, so trees of different files never share an ID.
//! Zero is reserved for "no node".

use std::{
    cell::Cell,
    rc::Rc,
    sync::atomic::{AtomicU32, Ordering},
};

use crate::nodes::{
    AccessModifier, Argument, ArgumentList, AssignExpression, AssignOperator, BinaryExpression,
    BinaryOperator, BoolLiteral, BreakStatement, CastExpression, ClassDefinition, ClassMember,
    ClassModifiers, ConstructorCallExpression, ContinueStatement, Definition, DoWhileStatement,
    EnumDefinition, EnumMember, Expression, ExpressionStatement, ForStatement, FuncDefDefinition,
    FunctionAttributes, FunctionCallExpression, FunctionDefinition, Identifier, IfStatement,
    ImportDefinition, IndexExpression, InitListExpression, InterfaceDefinition, InvokeExpression,
    LambdaExpression, LambdaParameter, Literal, Location, MemberAccessExpression,
    MethodCallExpression, MixinDefinition, NamespaceDefinition, NullLiteral, NumberLiteral,
    Parameter, ParenthesizedExpression, PostfixOperator, PostfixUnaryExpression,
    PrefixUnaryExpression, PropertyAccessor, ReferenceModifier, ReturnStatement, ScopeQualifier,
    Script, Statement, StatementBlock, StringLiteral, SwitchCase, SwitchStatement,
    TernaryExpression, TryStatement, TypeModifier, TypeRef, TypedefDefinition, UnaryOperator,
    VariableAccessExpression, VariableDeclarator, VariableDefinition, VariableInitializer,
    VirtualPropertyDefinition, WhileStatement,
};

pub struct Builder {
    source: String,
    offset: Cell<u32>,
}

impl Builder {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            offset: Cell::new(0),
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    fn get_node_id() -> u32 {
        static COUNTER: AtomicU32 = AtomicU32::new(1);
        COUNTER.fetch_add(1, Ordering::Relaxed)
    }

    fn bump(&self) -> u32 {
        let offset = self.offset.get();
        self.offset.set(offset + 1);
        offset
    }

    fn make_location(&self, offset_start: u32, offset_end: u32) -> Location {
        Location {
            offset_start,
            offset_end,
            start_line: offset_start + 1,
            start_column: 1,
            end_line: offset_end + 1,
            end_column: 1,
            source: self.source.clone(),
        }
    }

    fn leaf(&self) -> (u32, Location) {
        let start = self.bump();
        (Self::get_node_id(), self.make_location(start, start + 1))
    }

    fn composite(&self, children: &[Location]) -> (u32, Location) {
        let end = self.bump() + 1;
        let start = children
            .iter()
            .map(|l| l.offset_start)
            .min()
            .unwrap_or(end - 1);
        (Self::get_node_id(), self.make_location(start, end))
    }

    // Names and types

    #[must_use]
    pub fn ident(&self, name: &str) -> Rc<Identifier> {
        let (id, location) = self.leaf();
        Rc::new(Identifier {
            id,
            location,
            name: name.to_string(),
        })
    }

    #[must_use]
    pub fn scope_qualifier(&self, segments: &[&str]) -> Rc<ScopeQualifier> {
        let segments: Vec<_> = segments.iter().map(|s| self.ident(s)).collect();
        let (id, location) = self.composite(&locations(&segments));
        Rc::new(ScopeQualifier {
            id,
            location,
            is_global: false,
            segments,
        })
    }

    #[must_use]
    pub fn global_qualifier(&self) -> Rc<ScopeQualifier> {
        let (id, location) = self.leaf();
        Rc::new(ScopeQualifier {
            id,
            location,
            is_global: true,
            segments: vec![],
        })
    }

    /// Builds a type reference from its textual form.
    ///
    /// Accepts `const`, scope qualifiers (`::a::b::T`), template arguments
    /// (`array<Wrapper<T>>`), handles (`@`) and array suffixes (`[]`).
    ///
    /// # Panics
    ///
    /// Panics if `text` is not a well-formed type.
    #[must_use]
    pub fn ty(&self, text: &str) -> Rc<TypeRef> {
        let tokens = tokenize_type(text);
        let mut cursor = 0;
        let ty = self.parse_type(&tokens, &mut cursor);
        assert!(
            cursor == tokens.len(),
            "unexpected trailing input in type `{text}`"
        );
        ty
    }

    fn parse_type(&self, tokens: &[String], cursor: &mut usize) -> Rc<TypeRef> {
        let mut is_const = false;
        if tokens.get(*cursor).map(String::as_str) == Some("const") {
            is_const = true;
            *cursor += 1;
        }
        let mut is_global = false;
        if tokens.get(*cursor).map(String::as_str) == Some("::") {
            is_global = true;
            *cursor += 1;
        }
        let mut segments = vec![];
        let mut name = next_identifier(tokens, cursor);
        while tokens.get(*cursor).map(String::as_str) == Some("::") {
            *cursor += 1;
            segments.push(self.ident(&name));
            name = next_identifier(tokens, cursor);
        }
        let name = self.ident(&name);
        let mut template_arguments = vec![];
        if tokens.get(*cursor).map(String::as_str) == Some("<") {
            *cursor += 1;
            loop {
                template_arguments.push(self.parse_type(tokens, cursor));
                match tokens.get(*cursor).map(String::as_str) {
                    Some(",") => *cursor += 1,
                    Some(">") => {
                        *cursor += 1;
                        break;
                    }
                    other => panic!("expected `,` or `>` in template arguments, found {other:?}"),
                }
            }
        }
        let mut modifiers = vec![];
        loop {
            match tokens.get(*cursor).map(String::as_str) {
                Some("@") => modifiers.push(TypeModifier::Handle),
                Some("[]") => modifiers.push(TypeModifier::Array),
                _ => break,
            }
            *cursor += 1;
        }
        let scope = if is_global || !segments.is_empty() {
            let (id, location) = self.composite(&locations(&segments));
            Some(Rc::new(ScopeQualifier {
                id,
                location,
                is_global,
                segments,
            }))
        } else {
            None
        };
        let mut children = vec![name.location.clone()];
        children.extend(scope.iter().map(|s| s.location.clone()));
        children.extend(template_arguments.iter().map(|t| t.location.clone()));
        let (id, location) = self.composite(&children);
        Rc::new(TypeRef {
            id,
            location,
            is_const,
            scope,
            name,
            template_arguments,
            modifiers,
        })
    }

    // Literals and primary expressions

    #[must_use]
    pub fn int(&self, value: i64) -> Expression {
        self.number(&value.to_string())
    }

    /// A numeric literal exactly as written (`1`, `2.0`, `1.5f`, `0xff`).
    #[must_use]
    pub fn number(&self, text: &str) -> Expression {
        let (id, location) = self.leaf();
        Expression::Literal(Literal::Number(Rc::new(NumberLiteral {
            id,
            location,
            value: text.to_string(),
        })))
    }

    #[must_use]
    pub fn string(&self, value: &str) -> Expression {
        let (id, location) = self.leaf();
        Expression::Literal(Literal::String(Rc::new(StringLiteral {
            id,
            location,
            value: value.to_string(),
        })))
    }

    #[must_use]
    pub fn boolean(&self, value: bool) -> Expression {
        let (id, location) = self.leaf();
        Expression::Literal(Literal::Bool(Rc::new(BoolLiteral {
            id,
            location,
            value,
        })))
    }

    #[must_use]
    pub fn null(&self) -> Expression {
        let (id, location) = self.leaf();
        Expression::Literal(Literal::Null(Rc::new(NullLiteral { id, location })))
    }

    #[must_use]
    pub fn var(&self, name: &str) -> Expression {
        let name = self.ident(name);
        let (id, location) = self.composite(&[name.location.clone()]);
        Expression::Variable(Rc::new(VariableAccessExpression {
            id,
            location,
            scope: None,
            name,
        }))
    }

    #[must_use]
    pub fn scoped_var(&self, scope: Rc<ScopeQualifier>, name: &str) -> Expression {
        let name = self.ident(name);
        let (id, location) = self.composite(&[scope.location.clone(), name.location.clone()]);
        Expression::Variable(Rc::new(VariableAccessExpression {
            id,
            location,
            scope: Some(scope),
            name,
        }))
    }

    // Calls

    #[must_use]
    pub fn arg(&self, value: Expression) -> Rc<Argument> {
        let (id, location) = self.composite(&[value.location()]);
        Rc::new(Argument {
            id,
            location,
            name: None,
            value,
        })
    }

    #[must_use]
    pub fn named(&self, name: &str, value: Expression) -> Rc<Argument> {
        let name = self.ident(name);
        let (id, location) = self.composite(&[name.location.clone(), value.location()]);
        Rc::new(Argument {
            id,
            location,
            name: Some(name),
            value,
        })
    }

    /// Wraps plain expressions as positional arguments.
    #[must_use]
    pub fn positional(&self, values: Vec<Expression>) -> Vec<Rc<Argument>> {
        values.into_iter().map(|v| self.arg(v)).collect()
    }

    #[must_use]
    pub fn arguments(&self, arguments: Vec<Rc<Argument>>) -> Rc<ArgumentList> {
        let (id, location) = self.composite(&locations(&arguments));
        Rc::new(ArgumentList {
            id,
            location,
            arguments,
        })
    }

    #[must_use]
    pub fn call(&self, name: &str, arguments: Vec<Rc<Argument>>) -> Expression {
        self.call_full(None, name, &[], arguments)
    }

    #[must_use]
    pub fn scoped_call(
        &self,
        scope: Rc<ScopeQualifier>,
        name: &str,
        arguments: Vec<Rc<Argument>>,
    ) -> Expression {
        self.call_full(Some(scope), name, &[], arguments)
    }

    #[must_use]
    pub fn call_full(
        &self,
        scope: Option<Rc<ScopeQualifier>>,
        name: &str,
        template_arguments: &[&str],
        arguments: Vec<Rc<Argument>>,
    ) -> Expression {
        let name = self.ident(name);
        let template_arguments: Vec<_> = template_arguments.iter().map(|t| self.ty(t)).collect();
        let arguments = self.arguments(arguments);
        let mut children = vec![name.location.clone(), arguments.location.clone()];
        children.extend(scope.iter().map(|s| s.location.clone()));
        let (id, location) = self.composite(&children);
        Expression::FunctionCall(Rc::new(FunctionCallExpression {
            id,
            location,
            scope,
            name,
            template_arguments,
            arguments,
        }))
    }

    #[must_use]
    pub fn construct(&self, ty: &str, arguments: Vec<Rc<Argument>>) -> Expression {
        let ty = self.ty(ty);
        let arguments = self.arguments(arguments);
        let (id, location) = self.composite(&[ty.location.clone(), arguments.location.clone()]);
        Expression::ConstructorCall(Rc::new(ConstructorCallExpression {
            id,
            location,
            ty,
            arguments,
        }))
    }

    #[must_use]
    pub fn cast(&self, target: &str, expression: Expression) -> Expression {
        let target = self.ty(target);
        let (id, location) = self.composite(&[target.location.clone(), expression.location()]);
        Expression::Cast(Rc::new(CastExpression {
            id,
            location,
            target,
            expression,
        }))
    }

    /// A lambda whose parameters are `(type, name)` pairs; an empty type
    /// string leaves the parameter type to be inferred.
    #[must_use]
    pub fn lambda(&self, parameters: &[(&str, &str)], body: Vec<Statement>) -> Expression {
        let parameters: Vec<_> = parameters
            .iter()
            .map(|(ty, name)| {
                let ty = (!ty.is_empty()).then(|| self.ty(ty));
                let name = self.ident(name);
                let mut children = vec![name.location.clone()];
                children.extend(ty.iter().map(|t| t.location.clone()));
                let (id, location) = self.composite(&children);
                Rc::new(LambdaParameter {
                    id,
                    location,
                    ty,
                    name: Some(name),
                })
            })
            .collect();
        let body = self.statement_block(body);
        let mut children = locations(&parameters);
        children.push(body.location.clone());
        let (id, location) = self.composite(&children);
        Expression::Lambda(Rc::new(LambdaExpression {
            id,
            location,
            parameters,
            body,
        }))
    }

    // Postfix expressions

    #[must_use]
    pub fn member(&self, expression: Expression, name: &str) -> Expression {
        let name = self.ident(name);
        let (id, location) = self.composite(&[expression.location(), name.location.clone()]);
        Expression::MemberAccess(Rc::new(MemberAccessExpression {
            id,
            location,
            expression,
            name,
        }))
    }

    #[must_use]
    pub fn method(
        &self,
        expression: Expression,
        name: &str,
        arguments: Vec<Rc<Argument>>,
    ) -> Expression {
        let name = self.ident(name);
        let arguments = self.arguments(arguments);
        let (id, location) = self.composite(&[
            expression.location(),
            name.location.clone(),
            arguments.location.clone(),
        ]);
        Expression::MethodCall(Rc::new(MethodCallExpression {
            id,
            location,
            expression,
            name,
            arguments,
        }))
    }

    #[must_use]
    pub fn index(&self, expression: Expression, arguments: Vec<Rc<Argument>>) -> Expression {
        let arguments = self.arguments(arguments);
        let (id, location) =
            self.composite(&[expression.location(), arguments.location.clone()]);
        Expression::Index(Rc::new(IndexExpression {
            id,
            location,
            expression,
            arguments,
        }))
    }

    #[must_use]
    pub fn invoke(&self, expression: Expression, arguments: Vec<Rc<Argument>>) -> Expression {
        let arguments = self.arguments(arguments);
        let (id, location) =
            self.composite(&[expression.location(), arguments.location.clone()]);
        Expression::Invoke(Rc::new(InvokeExpression {
            id,
            location,
            expression,
            arguments,
        }))
    }

    #[must_use]
    pub fn postfix(&self, expression: Expression, operator: PostfixOperator) -> Expression {
        let (id, location) = self.composite(&[expression.location()]);
        Expression::PostfixUnary(Rc::new(PostfixUnaryExpression {
            id,
            location,
            expression,
            operator,
        }))
    }

    // Operators

    #[must_use]
    pub fn prefix(&self, operator: UnaryOperator, expression: Expression) -> Expression {
        let (id, location) = self.composite(&[expression.location()]);
        Expression::PrefixUnary(Rc::new(PrefixUnaryExpression {
            id,
            location,
            operator,
            expression,
        }))
    }

    #[must_use]
    pub fn binary(&self, left: Expression, operator: BinaryOperator, right: Expression) -> Expression {
        let (id, location) = self.composite(&[left.location(), right.location()]);
        Expression::Binary(Rc::new(BinaryExpression {
            id,
            location,
            left,
            operator,
            right,
        }))
    }

    #[must_use]
    pub fn assign(&self, left: Expression, right: Expression) -> Expression {
        self.compound_assign(left, AssignOperator::Assign, right)
    }

    #[must_use]
    pub fn compound_assign(
        &self,
        left: Expression,
        operator: AssignOperator,
        right: Expression,
    ) -> Expression {
        let (id, location) = self.composite(&[left.location(), right.location()]);
        Expression::Assign(Rc::new(AssignExpression {
            id,
            location,
            left,
            operator,
            right,
        }))
    }

    #[must_use]
    pub fn ternary(&self, condition: Expression, if_true: Expression, if_false: Expression) -> Expression {
        let (id, location) =
            self.composite(&[condition.location(), if_true.location(), if_false.location()]);
        Expression::Ternary(Rc::new(TernaryExpression {
            id,
            location,
            condition,
            if_true,
            if_false,
        }))
    }

    #[must_use]
    pub fn paren(&self, expression: Expression) -> Expression {
        let (id, location) = self.composite(&[expression.location()]);
        Expression::Parenthesized(Rc::new(ParenthesizedExpression {
            id,
            location,
            expression,
        }))
    }

    #[must_use]
    pub fn init_list(&self, elements: Vec<Expression>) -> Expression {
        let children: Vec<_> = elements.iter().map(Expression::location).collect();
        let (id, location) = self.composite(&children);
        Expression::InitList(Rc::new(InitListExpression {
            id,
            location,
            elements,
        }))
    }

    // Statements

    #[must_use]
    pub fn statement_block(&self, statements: Vec<Statement>) -> Rc<StatementBlock> {
        let children: Vec<_> = statements.iter().map(Statement::location).collect();
        let (id, location) = self.composite(&children);
        Rc::new(StatementBlock {
            id,
            location,
            statements,
        })
    }

    #[must_use]
    pub fn block(&self, statements: Vec<Statement>) -> Statement {
        Statement::Block(self.statement_block(statements))
    }

    #[must_use]
    pub fn expr_stmt(&self, expression: Expression) -> Statement {
        let (id, location) = self.composite(&[expression.location()]);
        Statement::Expression(Rc::new(ExpressionStatement {
            id,
            location,
            expression: Some(expression),
        }))
    }

    #[must_use]
    pub fn ret(&self, value: Option<Expression>) -> Statement {
        let children: Vec<_> = value.iter().map(Expression::location).collect();
        let (id, location) = self.composite(&children);
        Statement::Return(Rc::new(ReturnStatement {
            id,
            location,
            value,
        }))
    }

    #[must_use]
    pub fn brk(&self) -> Statement {
        let (id, location) = self.leaf();
        Statement::Break(Rc::new(BreakStatement { id, location }))
    }

    #[must_use]
    pub fn cont(&self) -> Statement {
        let (id, location) = self.leaf();
        Statement::Continue(Rc::new(ContinueStatement { id, location }))
    }

    /// `T name = value;` inside a function body.
    #[must_use]
    pub fn declare(&self, ty: &str, name: &str, value: Option<Expression>) -> Statement {
        Statement::Variable(self.variable(ty, name, value))
    }

    /// `T name(args);` inside a function body.
    #[must_use]
    pub fn declare_with_args(&self, ty: &str, name: &str, arguments: Vec<Rc<Argument>>) -> Statement {
        let arguments = self.arguments(arguments);
        Statement::Variable(self.variable_with_initializer(
            AccessModifier::Public,
            ty,
            name,
            Some(VariableInitializer::Arguments(arguments)),
        ))
    }

    #[must_use]
    pub fn if_(&self, condition: Expression, then_branch: Statement, else_branch: Option<Statement>) -> Statement {
        let mut children = vec![condition.location(), then_branch.location()];
        children.extend(else_branch.iter().map(Statement::location));
        let (id, location) = self.composite(&children);
        Statement::If(Rc::new(IfStatement {
            id,
            location,
            condition,
            then_branch,
            else_branch,
        }))
    }

    #[must_use]
    pub fn while_(&self, condition: Expression, body: Statement) -> Statement {
        let (id, location) = self.composite(&[condition.location(), body.location()]);
        Statement::While(Rc::new(WhileStatement {
            id,
            location,
            condition,
            body,
        }))
    }

    #[must_use]
    pub fn do_while(&self, body: Statement, condition: Expression) -> Statement {
        let (id, location) = self.composite(&[body.location(), condition.location()]);
        Statement::DoWhile(Rc::new(DoWhileStatement {
            id,
            location,
            body,
            condition,
        }))
    }

    #[must_use]
    pub fn for_(
        &self,
        initializer: Option<Statement>,
        condition: Option<Expression>,
        increments: Vec<Expression>,
        body: Statement,
    ) -> Statement {
        let mut children = vec![body.location()];
        children.extend(initializer.iter().map(Statement::location));
        children.extend(condition.iter().map(Expression::location));
        children.extend(increments.iter().map(Expression::location));
        let (id, location) = self.composite(&children);
        Statement::For(Rc::new(ForStatement {
            id,
            location,
            initializer,
            condition,
            increments,
            body,
        }))
    }

    /// `switch (value) { case ..: .. default: .. }`; a `None` case value is `default`.
    #[must_use]
    pub fn switch(&self, value: Expression, cases: Vec<(Option<Expression>, Vec<Statement>)>) -> Statement {
        let cases: Vec<_> = cases
            .into_iter()
            .map(|(value, statements)| {
                let mut children: Vec<_> = statements.iter().map(Statement::location).collect();
                children.extend(value.iter().map(Expression::location));
                let (id, location) = self.composite(&children);
                Rc::new(SwitchCase {
                    id,
                    location,
                    value,
                    statements,
                })
            })
            .collect();
        let mut children = locations(&cases);
        children.push(value.location());
        let (id, location) = self.composite(&children);
        Statement::Switch(Rc::new(SwitchStatement {
            id,
            location,
            value,
            cases,
        }))
    }

    #[must_use]
    pub fn try_catch(&self, try_body: Vec<Statement>, catch_body: Vec<Statement>) -> Statement {
        let try_block = self.statement_block(try_body);
        let catch_block = self.statement_block(catch_body);
        let (id, location) =
            self.composite(&[try_block.location.clone(), catch_block.location.clone()]);
        Statement::Try(Rc::new(TryStatement {
            id,
            location,
            try_block,
            catch_block,
        }))
    }

    // Declarations

    #[must_use]
    pub fn param(&self, ty: &str, name: &str) -> Rc<Parameter> {
        self.parameter(ty, None, Some(name), None, false)
    }

    #[must_use]
    pub fn param_default(&self, ty: &str, name: &str, default_value: Expression) -> Rc<Parameter> {
        self.parameter(ty, None, Some(name), Some(default_value), false)
    }

    #[must_use]
    pub fn param_ref(&self, ty: &str, reference: ReferenceModifier, name: &str) -> Rc<Parameter> {
        self.parameter(ty, Some(reference), Some(name), None, false)
    }

    /// Trailing `T ...` parameter.
    #[must_use]
    pub fn variadic(&self, ty: &str, reference: Option<ReferenceModifier>) -> Rc<Parameter> {
        self.parameter(ty, reference, None, None, true)
    }

    #[must_use]
    pub fn parameter(
        &self,
        ty: &str,
        reference: Option<ReferenceModifier>,
        name: Option<&str>,
        default_value: Option<Expression>,
        is_variadic: bool,
    ) -> Rc<Parameter> {
        let ty = self.ty(ty);
        let name = name.map(|n| self.ident(n));
        let mut children = vec![ty.location.clone()];
        children.extend(name.iter().map(|n| n.location.clone()));
        children.extend(default_value.iter().map(Expression::location));
        let (id, location) = self.composite(&children);
        Rc::new(Parameter {
            id,
            location,
            ty,
            reference,
            name,
            default_value,
            is_variadic,
        })
    }

    /// A function with a body; `return_type` of `""` builds a constructor.
    #[must_use]
    pub fn function(
        &self,
        return_type: &str,
        name: &str,
        parameters: Vec<Rc<Parameter>>,
        body: Vec<Statement>,
    ) -> Rc<FunctionDefinition> {
        let body = self.statement_block(body);
        self.function_definition(return_type, name, parameters, Some(body))
    }

    /// A body-less declaration (interface methods, imports, registered API).
    #[must_use]
    pub fn function_decl(&self, return_type: &str, name: &str, parameters: Vec<Rc<Parameter>>) -> Rc<FunctionDefinition> {
        self.function_definition(return_type, name, parameters, None)
    }

    #[must_use]
    pub fn constructor(&self, name: &str, parameters: Vec<Rc<Parameter>>, body: Vec<Statement>) -> Rc<FunctionDefinition> {
        self.function("", name, parameters, body)
    }

    fn function_definition(
        &self,
        return_type: &str,
        name: &str,
        parameters: Vec<Rc<Parameter>>,
        body: Option<Rc<StatementBlock>>,
    ) -> Rc<FunctionDefinition> {
        let (return_type, returns_reference) = split_reference(return_type);
        let return_type = (!return_type.is_empty()).then(|| self.ty(return_type));
        let name = self.ident(name);
        let mut children = vec![name.location.clone()];
        children.extend(return_type.iter().map(|t| t.location.clone()));
        children.extend(parameters.iter().map(|p| p.location.clone()));
        children.extend(body.iter().map(|b| b.location.clone()));
        let (id, location) = self.composite(&children);
        Rc::new(FunctionDefinition {
            id,
            location,
            access: AccessModifier::Public,
            attributes: FunctionAttributes::default(),
            return_type,
            returns_reference,
            is_destructor: false,
            name,
            template_parameters: vec![],
            parameters,
            body,
        })
    }

    #[must_use]
    pub fn with_access(&self, function: &Rc<FunctionDefinition>, access: AccessModifier) -> Rc<FunctionDefinition> {
        Rc::new(FunctionDefinition {
            access,
            ..(**function).clone()
        })
    }

    #[must_use]
    pub fn with_attributes(&self, function: &Rc<FunctionDefinition>, attributes: FunctionAttributes) -> Rc<FunctionDefinition> {
        Rc::new(FunctionDefinition {
            attributes,
            ..(**function).clone()
        })
    }

    #[must_use]
    pub fn with_template_parameters(&self, function: &Rc<FunctionDefinition>, parameters: &[&str]) -> Rc<FunctionDefinition> {
        Rc::new(FunctionDefinition {
            template_parameters: parameters.iter().map(|p| self.ident(p)).collect(),
            ..(**function).clone()
        })
    }

    #[must_use]
    pub fn variable(&self, ty: &str, name: &str, value: Option<Expression>) -> Rc<VariableDefinition> {
        self.variable_with_initializer(
            AccessModifier::Public,
            ty,
            name,
            value.map(VariableInitializer::Expression),
        )
    }

    #[must_use]
    pub fn field(&self, access: AccessModifier, ty: &str, name: &str) -> Rc<VariableDefinition> {
        self.variable_with_initializer(access, ty, name, None)
    }

    #[must_use]
    pub fn variable_with_initializer(
        &self,
        access: AccessModifier,
        ty: &str,
        name: &str,
        initializer: Option<VariableInitializer>,
    ) -> Rc<VariableDefinition> {
        let ty = self.ty(ty);
        let name = self.ident(name);
        let mut children = vec![name.location.clone()];
        if let Some(initializer) = &initializer {
            children.push(match initializer {
                VariableInitializer::Expression(e) => e.location(),
                VariableInitializer::Arguments(a) => a.location.clone(),
            });
        }
        let (declarator_id, declarator_location) = self.composite(&children);
        let declarator = Rc::new(VariableDeclarator {
            id: declarator_id,
            location: declarator_location,
            name,
            initializer,
        });
        let (id, location) =
            self.composite(&[ty.location.clone(), declarator.location.clone()]);
        Rc::new(VariableDefinition {
            id,
            location,
            access,
            ty,
            declarators: vec![declarator],
        })
    }

    #[must_use]
    pub fn class(&self, name: &str, bases: &[&str], members: Vec<ClassMember>) -> Rc<ClassDefinition> {
        self.template_class(name, &[], bases, members)
    }

    #[must_use]
    pub fn template_class(
        &self,
        name: &str,
        template_parameters: &[&str],
        bases: &[&str],
        members: Vec<ClassMember>,
    ) -> Rc<ClassDefinition> {
        let name = self.ident(name);
        let template_parameters: Vec<_> =
            template_parameters.iter().map(|p| self.ident(p)).collect();
        let bases: Vec<_> = bases.iter().map(|b| self.ty(b)).collect();
        let mut children = vec![name.location.clone()];
        children.extend(members.iter().map(ClassMember::location));
        children.extend(bases.iter().map(|b| b.location.clone()));
        let (id, location) = self.composite(&children);
        Rc::new(ClassDefinition {
            id,
            location,
            modifiers: ClassModifiers::default(),
            name,
            template_parameters,
            bases,
            members,
        })
    }

    #[must_use]
    pub fn mixin(&self, class: Rc<ClassDefinition>) -> Definition {
        let (id, location) = self.composite(&[class.location.clone()]);
        Definition::Mixin(Rc::new(MixinDefinition {
            id,
            location,
            class,
        }))
    }

    #[must_use]
    pub fn interface(&self, name: &str, bases: &[&str], members: Vec<ClassMember>) -> Rc<InterfaceDefinition> {
        let name = self.ident(name);
        let bases: Vec<_> = bases.iter().map(|b| self.ty(b)).collect();
        let mut children = vec![name.location.clone()];
        children.extend(members.iter().map(ClassMember::location));
        let (id, location) = self.composite(&children);
        Rc::new(InterfaceDefinition {
            id,
            location,
            name,
            bases,
            members,
        })
    }

    #[must_use]
    pub fn enumeration(&self, name: &str, members: &[&str]) -> Rc<EnumDefinition> {
        self.enumeration_with_values(name, members.iter().map(|m| (*m, None)).collect())
    }

    #[must_use]
    pub fn enumeration_with_values(&self, name: &str, members: Vec<(&str, Option<Expression>)>) -> Rc<EnumDefinition> {
        let name = self.ident(name);
        let members: Vec<_> = members
            .into_iter()
            .map(|(member, value)| {
                let member = self.ident(member);
                let mut children = vec![member.location.clone()];
                children.extend(value.iter().map(Expression::location));
                let (id, location) = self.composite(&children);
                Rc::new(EnumMember {
                    id,
                    location,
                    name: member,
                    value,
                })
            })
            .collect();
        let mut children = locations(&members);
        children.push(name.location.clone());
        let (id, location) = self.composite(&children);
        Rc::new(EnumDefinition {
            id,
            location,
            name,
            members,
        })
    }

    #[must_use]
    pub fn namespace(&self, names: &[&str], definitions: Vec<Definition>) -> Definition {
        let names: Vec<_> = names.iter().map(|n| self.ident(n)).collect();
        let mut children = locations(&names);
        children.extend(definitions.iter().map(Definition::location));
        let (id, location) = self.composite(&children);
        Definition::Namespace(Rc::new(NamespaceDefinition {
            id,
            location,
            names,
            definitions,
        }))
    }

    #[must_use]
    pub fn funcdef(&self, return_type: &str, name: &str, parameters: Vec<Rc<Parameter>>) -> Rc<FuncDefDefinition> {
        let (return_type, returns_reference) = split_reference(return_type);
        let return_type = self.ty(return_type);
        let name = self.ident(name);
        let mut children = vec![return_type.location.clone(), name.location.clone()];
        children.extend(parameters.iter().map(|p| p.location.clone()));
        let (id, location) = self.composite(&children);
        Rc::new(FuncDefDefinition {
            id,
            location,
            access: AccessModifier::Public,
            return_type,
            returns_reference,
            name,
            parameters,
        })
    }

    #[must_use]
    pub fn typedef(&self, ty: &str, name: &str) -> Definition {
        let ty = self.ty(ty);
        let name = self.ident(name);
        let (id, location) = self.composite(&[ty.location.clone(), name.location.clone()]);
        Definition::Typedef(Rc::new(TypedefDefinition {
            id,
            location,
            ty,
            name,
        }))
    }

    /// `T name { get { .. } set { .. } }`; a `None` accessor is omitted.
    #[must_use]
    pub fn virtual_property(
        &self,
        ty: &str,
        name: &str,
        getter: Option<Vec<Statement>>,
        setter: Option<Vec<Statement>>,
    ) -> Rc<VirtualPropertyDefinition> {
        let ty = self.ty(ty);
        let name = self.ident(name);
        let accessor = |body: Vec<Statement>| {
            let body = self.statement_block(body);
            let (id, location) = self.composite(&[body.location.clone()]);
            Rc::new(PropertyAccessor {
                id,
                location,
                is_const: false,
                body: Some(body),
            })
        };
        let getter = getter.map(accessor);
        let setter = setter.map(accessor);
        let mut children = vec![ty.location.clone(), name.location.clone()];
        children.extend(getter.iter().map(|g| g.location.clone()));
        children.extend(setter.iter().map(|s| s.location.clone()));
        let (id, location) = self.composite(&children);
        Rc::new(VirtualPropertyDefinition {
            id,
            location,
            access: AccessModifier::Public,
            ty,
            returns_reference: false,
            name,
            getter,
            setter,
        })
    }

    #[must_use]
    pub fn import(&self, function: Rc<FunctionDefinition>, from: &str) -> Definition {
        let (id, location) = self.composite(&[function.location.clone()]);
        Definition::Import(Rc::new(ImportDefinition {
            id,
            location,
            function,
            from: from.to_string(),
        }))
    }

    #[must_use]
    pub fn script(&self, definitions: Vec<Definition>) -> Rc<Script> {
        let children: Vec<_> = definitions.iter().map(Definition::location).collect();
        let (id, location) = self.composite(&children);
        Rc::new(Script {
            id,
            location,
            definitions,
        })
    }
}

trait HasLocation {
    fn node_location(&self) -> Location;
}

macro_rules! has_location {
    ($($name:ident),+ $(,)?) => {
        $(
            impl HasLocation for $name {
                fn node_location(&self) -> Location {
                    self.location.clone()
                }
            }
        )+
    };
}

has_location!(Identifier, Argument, LambdaParameter, SwitchCase, EnumMember);

fn locations<T: HasLocation>(items: &[Rc<T>]) -> Vec<Location> {
    items.iter().map(|item| item.node_location()).collect()
}

/// Splits a trailing `&` off a return type string.
fn split_reference(text: &str) -> (&str, bool) {
    let trimmed = text.trim();
    match trimmed.strip_suffix('&') {
        Some(rest) => (rest.trim_end(), true),
        None => (trimmed, false),
    }
}

fn tokenize_type(text: &str) -> Vec<String> {
    let mut tokens = vec![];
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c == ':' && chars.get(i + 1) == Some(&':') {
            tokens.push("::".to_string());
            i += 2;
        } else if c == '[' && chars.get(i + 1) == Some(&']') {
            tokens.push("[]".to_string());
            i += 2;
        } else if matches!(c, '<' | '>' | ',' | '@') {
            tokens.push(c.to_string());
            i += 1;
        } else if c.is_alphanumeric() || c == '_' || c == '?' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '?') {
                i += 1;
            }
            tokens.push(chars[start..i].iter().collect());
        } else {
            panic!("unexpected character `{c}` in type `{text}`");
        }
    }
    tokens
}

fn next_identifier(tokens: &[String], cursor: &mut usize) -> String {
    let token = tokens
        .get(*cursor)
        .unwrap_or_else(|| panic!("expected a type name at token {cursor}"));
    assert!(
        token.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '?'),
        "expected a type name, found `{token}`"
    );
    *cursor += 1;
    token.clone()
}
