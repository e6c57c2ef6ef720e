//! Expression analysis: every expression evaluates to an optional
//! [`ResolvedType`], `None` meaning "unknown, already reported".

use std::rc::Rc;

use angelscript_ast::nodes::{
    AccessModifier, ArgumentList, CastExpression, Expression, FunctionCallExpression, Identifier, IndexExpression,
    InitListExpression, InvokeExpression, LambdaExpression, Literal, Location, MemberAccessExpression,
    MethodCallExpression, TernaryExpression, VariableAccessExpression,
};

use crate::{
    conversion::derives_from,
    errors::{AnalyzerError, PropertyAccessKind, SemanticError},
    overload::CallSite,
    resolved_type::ResolvedType,
    session::Session,
    symbol::{FunctionSymbol, PrimitiveKind, Symbol, SymbolRef, VariableSymbol},
    symbol_table::{ScopeId, ScopeNode},
};

/// A name use: its type and, for variables, the symbol it denotes.
#[derive(Debug, Default)]
pub(crate) struct Accessed {
    pub(crate) ty: Option<ResolvedType>,
    pub(crate) variable: Option<Rc<VariableSymbol>>,
}

impl Accessed {
    fn value(ty: Option<ResolvedType>) -> Self {
        Self { ty, variable: None }
    }
}

/// Built-in type of a numeric literal's spelling.
pub(crate) fn number_literal_kind(text: &str) -> PrimitiveKind {
    let text = text.to_ascii_lowercase();
    let is_prefixed = ["0x", "0b", "0o", "0d"]
        .iter()
        .any(|prefix| text.starts_with(prefix));
    if is_prefixed {
        return PrimitiveKind::UInt32;
    }
    if text.ends_with('f') {
        return PrimitiveKind::Float;
    }
    if text.contains('.') || text.contains('e') {
        return PrimitiveKind::Double;
    }
    match text.parse::<i64>() {
        Ok(value) if i32::try_from(value).is_err() => PrimitiveKind::Int64,
        _ => PrimitiveKind::Int32,
    }
}

impl Session {
    /// Analyzes `expression`; `expected` is the destination type when the
    /// context has one, and only guides lambdas, init lists and enum
    /// members.
    ///
    /// # Errors
    ///
    /// Fails on analyzer bugs only; program errors become diagnostics.
    pub(crate) fn analyze_expression(
        &mut self,
        scope: ScopeId,
        expression: &Expression,
        expected: Option<&ResolvedType>,
    ) -> Result<Option<ResolvedType>, AnalyzerError> {
        let ty = match expression {
            Expression::Literal(literal) => self.literal_type(literal),
            Expression::Variable(access) => {
                self.analyze_variable_access(scope, access, &[PropertyAccessKind::Read], expected)?
                    .ty
            }
            Expression::FunctionCall(call) => self.analyze_function_call(scope, call)?,
            Expression::ConstructorCall(call) => match self.resolve_type(scope, &call.ty) {
                Some(ty) => self.check_constructor_call(scope, ty, &call.arguments, &call.location)?,
                None => {
                    self.evaluate_arguments(scope, &call.arguments)?;
                    None
                }
            },
            Expression::Cast(cast) => self.analyze_cast(scope, cast)?,
            Expression::Lambda(lambda) => self.analyze_lambda_value(scope, lambda, expected)?,
            Expression::MemberAccess(access) => {
                self.analyze_member_access(scope, access, &[PropertyAccessKind::Read])?
                    .ty
            }
            Expression::MethodCall(call) => self.analyze_method_call(scope, call)?,
            Expression::Index(index) => self.analyze_index(scope, index)?,
            Expression::Invoke(invoke) => self.analyze_invoke(scope, invoke)?,
            Expression::PostfixUnary(postfix) => self.analyze_postfix(scope, postfix)?,
            Expression::PrefixUnary(prefix) => self.analyze_prefix(scope, prefix)?,
            Expression::Binary(binary) => self.analyze_binary(scope, binary)?,
            Expression::Assign(assign) => self.analyze_assign(scope, assign)?,
            Expression::Ternary(ternary) => self.analyze_ternary(scope, ternary, expected)?,
            Expression::Parenthesized(inner) => self.analyze_expression(scope, &inner.expression, expected)?,
            Expression::InitList(list) => self.analyze_init_list(scope, list, expected)?,
        };
        self.record_type(expression.id(), ty.as_ref());
        Ok(ty)
    }

    /// Analyzes `expression` and reports it if it does not convert to
    /// `expected`.
    pub(crate) fn check_expression(
        &mut self,
        scope: ScopeId,
        expression: &Expression,
        expected: Option<&ResolvedType>,
    ) -> Result<Option<ResolvedType>, AnalyzerError> {
        let found = self.analyze_expression(scope, expression, expected)?;
        if let (Some(found), Some(expected)) = (&found, expected)
            && !self.is_convertible(found, expected)
        {
            let error = match found.type_symbol() {
                Some(symbol) if symbol.is_ambiguous_enum_member() => SemanticError::AmbiguousEnumMember {
                    name: symbol.identifier.clone(),
                    candidates: symbol
                        .enum_candidates
                        .iter()
                        .map(|candidate| format!("`{}`", candidate.identifier))
                        .collect::<Vec<_>>()
                        .join(", "),
                },
                _ => SemanticError::TypeMismatch {
                    expected: expected.signature(),
                    found: found.signature(),
                },
            };
            self.error(&expression.location(), error);
        }
        Ok(found)
    }

    pub(crate) fn check_condition(&mut self, scope: ScopeId, condition: &Expression) -> Result<(), AnalyzerError> {
        let boolean = self.builtin_type(PrimitiveKind::Bool);
        if let Some(found) = self.analyze_expression(scope, condition, Some(&boolean))?
            && !self.is_convertible(&found, &boolean)
        {
            self.error(&condition.location(), SemanticError::ConditionNotBool {
                found: found.signature(),
            });
        }
        Ok(())
    }

    fn literal_type(&self, literal: &Literal) -> Option<ResolvedType> {
        match literal {
            Literal::Number(number) => Some(self.builtin_type(number_literal_kind(&number.value))),
            Literal::String(_) => self.table.string_type().map(ResolvedType::from_type),
            Literal::Bool(_) => Some(self.builtin_type(PrimitiveKind::Bool)),
            Literal::Null(_) => Some(self.builtin_type(PrimitiveKind::Null)),
        }
    }

    pub(crate) fn analyze_variable_access(
        &mut self,
        scope: ScopeId,
        access: &VariableAccessExpression,
        kinds: &[PropertyAccessKind],
        expected: Option<&ResolvedType>,
    ) -> Result<Accessed, AnalyzerError> {
        let name = &access.name.name;
        let symbol = match &access.scope {
            Some(qualifier) => {
                let Some(qualified) = self.resolve_scope_qualifier(scope, qualifier) else {
                    return Ok(Accessed::default());
                };
                self.table.lookup(qualified, name).cloned()
            }
            None => self
                .table
                .lookup_with_parents(scope, name)
                .map(|(_, symbol)| symbol.clone()),
        };
        let symbol = self.prefer_expected_enum_member(symbol, name, expected);

        match symbol {
            None => {
                self.error(&access.name.location, SemanticError::UndefinedSymbol { name: name.clone() });
                Ok(Accessed::default())
            }
            Some(Symbol::Variable(variable)) => {
                self.reference(&access.name.location, SymbolRef::Variable(variable.clone()));
                if variable.is_virtual_property {
                    self.check_property_access(&variable, kinds, &access.name.location);
                }
                Ok(Accessed {
                    ty: variable.resolved_type().cloned(),
                    variable: Some(variable),
                })
            }
            Some(Symbol::Functions(functions)) => {
                let function = self.pick_function_value(functions.overloads(), expected);
                self.reference(&access.name.location, SymbolRef::Function(function.clone()));
                Ok(Accessed::value(Some(ResolvedType::from_function(function))))
            }
            Some(Symbol::Type(_)) => {
                self.error(&access.name.location, SemanticError::TypeUsedAsValue { name: name.clone() });
                Ok(Accessed::default())
            }
        }
    }

    /// Where an enum is expected, a bare member name also resolves to that
    /// enum's member, even if the name alone is ambiguous or unknown.
    fn prefer_expected_enum_member(&self, found: Option<Symbol>, name: &str, expected: Option<&ResolvedType>) -> Option<Symbol> {
        let is_ambiguous = |symbol: &Symbol| {
            symbol
                .as_variable()
                .and_then(|v| v.resolved_type())
                .and_then(ResolvedType::type_symbol)
                .is_some_and(|ty| ty.is_ambiguous_enum_member())
        };
        if found.as_ref().is_some_and(|symbol| !is_ambiguous(symbol)) {
            return found;
        }
        expected
            .and_then(ResolvedType::type_symbol)
            .filter(|ty| ty.is_enum())
            .and_then(|ty| self.table.member(ty, name))
            .cloned()
            .or(found)
    }

    /// A function used as a value: the overload matching the expected
    /// funcdef, or the first one.
    fn pick_function_value(&self, overloads: &[Rc<FunctionSymbol>], expected: Option<&ResolvedType>) -> Rc<FunctionSymbol> {
        expected
            .filter(|ty| ty.function_symbol().is_some())
            .and_then(|expected| {
                overloads
                    .iter()
                    .find(|f| self.is_convertible(&ResolvedType::from_function((*f).clone()), expected))
            })
            .unwrap_or(&overloads[0])
            .clone()
    }

    fn check_property_access(&mut self, property: &VariableSymbol, kinds: &[PropertyAccessKind], location: &Location) {
        let Some(scope) = self.table.scope_by_path(&property.declared_scope) else {
            return;
        };
        for kind in kinds {
            let prefix = match kind {
                PropertyAccessKind::Read => "get_",
                PropertyAccessKind::Write => "set_",
            };
            let accessor = format!("{prefix}{}", property.identifier);
            if self.table.lookup(scope, &accessor).is_none() {
                self.error(location, SemanticError::PropertyAccess {
                    name: property.identifier.clone(),
                    kind: *kind,
                });
            }
        }
    }

    /// Reports `name` if it is not public and the current class does not see
    /// the same declaration in its own members scope.
    fn check_member_access(&mut self, scope: ScopeId, name: &Identifier, member: &Symbol) {
        let access = match member {
            Symbol::Variable(variable) => variable.access,
            Symbol::Functions(functions) => functions
                .overloads()
                .iter()
                .map(|f| f.access)
                .min_by_key(|access| *access != AccessModifier::Public)
                .unwrap_or_default(),
            Symbol::Type(_) => return,
        };
        let access = match access {
            AccessModifier::Public => return,
            AccessModifier::Protected => "protected",
            AccessModifier::Private => "private",
        };
        let visible = self
            .table
            .enclosing_type_scope(scope)
            .and_then(|(class_scope, _)| self.table.lookup(class_scope, &name.name))
            .is_some_and(|own| match (own, member) {
                (Symbol::Variable(own), Symbol::Variable(member)) => Rc::ptr_eq(own, member),
                (Symbol::Functions(own), Symbol::Functions(member)) => own.contains(member.first()),
                _ => false,
            });
        if !visible {
            self.error(&name.location, SemanticError::InaccessibleMember {
                member: name.name.clone(),
                access: access.to_string(),
            });
        }
    }

    /// Type of `object`, or `None` if it has no members to look at. Reports
    /// values that cannot have members.
    fn member_owner(&mut self, object: Option<&ResolvedType>, name: &Identifier) -> Option<ResolvedType> {
        let object = object?;
        let symbol = object.type_symbol();
        if symbol.is_some_and(|s| s.is_type_parameter || s.is_ambiguous_enum_member()) {
            return None;
        }
        if symbol.is_none_or(|s| s.members_scope.is_none()) {
            self.error(&name.location, SemanticError::NoSuchMember {
                type_name: object.signature(),
                member: name.name.clone(),
            });
            return None;
        }
        Some(object.clone())
    }

    pub(crate) fn analyze_member_access(
        &mut self,
        scope: ScopeId,
        access: &MemberAccessExpression,
        kinds: &[PropertyAccessKind],
    ) -> Result<Accessed, AnalyzerError> {
        let object = self.analyze_expression(scope, &access.expression, None)?;
        let Some(object) = self.member_owner(object.as_ref(), &access.name) else {
            return Ok(Accessed::default());
        };
        let Some(owner) = object.type_symbol() else {
            return Ok(Accessed::default());
        };
        let Some(member) = self.table.member(owner, &access.name.name).cloned() else {
            self.error(&access.name.location, SemanticError::NoSuchMember {
                type_name: object.signature(),
                member: access.name.name.clone(),
            });
            return Ok(Accessed::default());
        };
        self.check_member_access(scope, &access.name, &member);
        match member {
            Symbol::Variable(variable) => {
                self.reference(&access.name.location, SymbolRef::Variable(variable.clone()));
                if variable.is_virtual_property {
                    self.check_property_access(&variable, kinds, &access.name.location);
                }
                let ty = variable
                    .resolved_type()
                    .and_then(|ty| ty.substitute(object.template_translator.as_ref()));
                Ok(Accessed {
                    ty,
                    variable: Some(variable),
                })
            }
            Symbol::Functions(functions) => {
                let function = functions.first().clone();
                self.reference(&access.name.location, SymbolRef::Function(function.clone()));
                Ok(Accessed::value(Some(ResolvedType::from_function(function))))
            }
            Symbol::Type(_) => {
                self.error(&access.name.location, SemanticError::NoSuchMember {
                    type_name: object.signature(),
                    member: access.name.name.clone(),
                });
                Ok(Accessed::default())
            }
        }
    }

    fn analyze_method_call(&mut self, scope: ScopeId, call: &MethodCallExpression) -> Result<Option<ResolvedType>, AnalyzerError> {
        let object = self.analyze_expression(scope, &call.expression, None)?;
        let Some(object) = self.member_owner(object.as_ref(), &call.name) else {
            self.evaluate_arguments(scope, &call.arguments)?;
            return Ok(None);
        };
        let Some(owner) = object.type_symbol().cloned() else {
            return Ok(None);
        };
        let member = self.table.member(&owner, &call.name.name).cloned();
        if let Some(member) = &member {
            self.check_member_access(scope, &call.name, member);
        }
        match member {
            Some(Symbol::Functions(functions)) => {
                let site = CallSite {
                    name: &call.name.name,
                    name_location: Some(&call.name.location),
                    location: &call.location,
                    arguments: &call.arguments,
                    delegate_cast: false,
                };
                self.check_call(scope, &site, functions.overloads(), object.template_translator.as_ref())
            }
            Some(Symbol::Variable(variable)) => {
                self.reference(&call.name.location, SymbolRef::Variable(variable.clone()));
                let ty = variable
                    .resolved_type()
                    .and_then(|ty| ty.substitute(object.template_translator.as_ref()));
                self.call_value(scope, ty, &call.arguments, &call.location)
            }
            Some(Symbol::Type(_)) | None => {
                self.error(&call.name.location, SemanticError::NoSuchMember {
                    type_name: object.signature(),
                    member: call.name.name.clone(),
                });
                self.evaluate_arguments(scope, &call.arguments)?;
                Ok(None)
            }
        }
    }

    fn analyze_function_call(&mut self, scope: ScopeId, call: &FunctionCallExpression) -> Result<Option<ResolvedType>, AnalyzerError> {
        let name = &call.name.name;
        let symbol = match &call.scope {
            Some(qualifier) => {
                let Some(qualified) = self.resolve_scope_qualifier(scope, qualifier) else {
                    self.evaluate_arguments(scope, &call.arguments)?;
                    return Ok(None);
                };
                self.table.lookup(qualified, name).cloned()
            }
            None => self
                .table
                .lookup_with_parents(scope, name)
                .map(|(_, symbol)| symbol.clone()),
        };

        match symbol {
            None if name == "super" && call.scope.is_none() => self.check_implicit_super(scope, call),
            None => {
                self.error(&call.name.location, SemanticError::UndefinedSymbol { name: name.clone() });
                self.evaluate_arguments(scope, &call.arguments)?;
                Ok(None)
            }
            Some(Symbol::Functions(functions)) => {
                let overloads = functions.overloads();
                let translator = if call.template_arguments.is_empty() {
                    None
                } else {
                    let Some(translator) = self.bind_template_parameters(
                        scope,
                        name,
                        &overloads[0].template_parameters,
                        &call.template_arguments,
                        &call.location,
                    ) else {
                        self.evaluate_arguments(scope, &call.arguments)?;
                        return Ok(None);
                    };
                    translator
                };
                let site = CallSite {
                    name,
                    name_location: Some(&call.name.location),
                    location: &call.location,
                    arguments: &call.arguments,
                    delegate_cast: true,
                };
                self.check_call(scope, &site, overloads, translator.as_ref())
            }
            Some(Symbol::Type(ty)) => {
                self.reference(&call.name.location, SymbolRef::Type(ty.clone()));
                let Some(translator) = self.template_translator(scope, &ty, &call.template_arguments, &call.location) else {
                    self.evaluate_arguments(scope, &call.arguments)?;
                    return Ok(None);
                };
                let resolved = ResolvedType::from_type(ty).with_translator(translator);
                self.check_constructor_call(scope, resolved, &call.arguments, &call.location)
            }
            Some(Symbol::Variable(variable)) => {
                self.reference(&call.name.location, SymbolRef::Variable(variable.clone()));
                let ty = variable.resolved_type().cloned();
                self.call_value(scope, ty, &call.arguments, &call.location)
            }
        }
    }

    /// `super(...)` in a class whose base declares no constructors.
    fn check_implicit_super(&mut self, scope: ScopeId, call: &FunctionCallExpression) -> Result<Option<ResolvedType>, AnalyzerError> {
        let base = self
            .table
            .enclosing_type_scope(scope)
            .and_then(|(_, class)| class.base_list.get())
            .and_then(|bases| {
                bases
                    .iter()
                    .find(|base| base.type_symbol().is_some_and(|s| s.is_class()))
                    .cloned()
            });
        let Some(base) = base else {
            self.error(&call.name.location, SemanticError::UndefinedSymbol {
                name: call.name.name.clone(),
            });
            self.evaluate_arguments(scope, &call.arguments)?;
            return Ok(None);
        };
        self.check_constructor_call(scope, base, &call.arguments, &call.location)
    }

    /// Calls a value: a function handle, or an object with `opCall`.
    fn call_value(
        &mut self,
        scope: ScopeId,
        callee: Option<ResolvedType>,
        arguments: &Rc<ArgumentList>,
        location: &Location,
    ) -> Result<Option<ResolvedType>, AnalyzerError> {
        let Some(callee) = callee else {
            self.evaluate_arguments(scope, arguments)?;
            return Ok(None);
        };
        let (name, overloads) = match callee.function_symbol() {
            Some(function) => (function.identifier.clone(), vec![function.clone()]),
            None => ("opCall".to_string(), self.member_overloads(&callee, "opCall")),
        };
        if overloads.is_empty() {
            self.error(location, SemanticError::NotCallable {
                type_name: callee.signature(),
            });
            self.evaluate_arguments(scope, arguments)?;
            return Ok(None);
        }
        let site = CallSite {
            name: &name,
            name_location: None,
            location,
            arguments,
            delegate_cast: false,
        };
        self.check_call(scope, &site, &overloads, callee.template_translator.as_ref())
    }

    fn analyze_invoke(&mut self, scope: ScopeId, invoke: &InvokeExpression) -> Result<Option<ResolvedType>, AnalyzerError> {
        let callee = self.analyze_expression(scope, &invoke.expression, None)?;
        self.call_value(scope, callee, &invoke.arguments, &invoke.location)
    }

    fn analyze_index(&mut self, scope: ScopeId, index: &IndexExpression) -> Result<Option<ResolvedType>, AnalyzerError> {
        let target = match index.expression.unparenthesized() {
            Expression::Variable(access) => self.analyze_variable_access(scope, access, &[PropertyAccessKind::Read], None)?,
            Expression::MemberAccess(access) => self.analyze_member_access(scope, access, &[PropertyAccessKind::Read])?,
            other => Accessed::value(self.analyze_expression(scope, other, None)?),
        };
        self.record_type(index.expression.id(), target.ty.as_ref());

        if let Some(property) = target.variable.as_ref().filter(|v| v.indexed_property_accessor) {
            let arguments = self.evaluate_arguments(scope, &index.arguments)?;
            let valid = match arguments.as_deref() {
                Some([argument]) => {
                    argument.name.is_none()
                        && argument.ty.as_ref().is_none_or(|ty| {
                            ty.type_symbol()
                                .and_then(|symbol| symbol.numeric_kind())
                                .is_some_and(PrimitiveKind::is_integer)
                        })
                }
                _ => false,
            };
            if !valid {
                self.error(&index.location, SemanticError::IndexedPropertyArgument {
                    property: property.identifier.clone(),
                });
            }
            return Ok(target.ty);
        }

        let Some(object) = target.ty else {
            self.evaluate_arguments(scope, &index.arguments)?;
            return Ok(None);
        };
        let overloads = self.member_overloads(&object, "opIndex");
        if overloads.is_empty() {
            self.error(&index.location, SemanticError::NotIndexable {
                type_name: object.signature(),
            });
            self.evaluate_arguments(scope, &index.arguments)?;
            return Ok(None);
        }
        let site = CallSite {
            name: "opIndex",
            name_location: None,
            location: &index.location,
            arguments: &index.arguments,
            delegate_cast: false,
        };
        self.check_call(scope, &site, &overloads, object.template_translator.as_ref())
    }

    fn analyze_cast(&mut self, scope: ScopeId, cast: &CastExpression) -> Result<Option<ResolvedType>, AnalyzerError> {
        let target = self.resolve_type(scope, &cast.target);
        let source = self.analyze_expression(scope, &cast.expression, None)?;
        let (Some(target), Some(source)) = (target, source) else {
            return Ok(None);
        };
        let related = match (source.type_symbol(), target.type_symbol()) {
            (Some(from), Some(to)) => {
                derives_from(from, to)
                    || derives_from(to, from)
                    || (from.is_interface() && !to.is_primitive())
                    || (to.is_interface() && !from.is_primitive())
            }
            _ => false,
        };
        let by_method = ["opCast", "opImplCast", "opConv", "opImplConv"]
            .iter()
            .flat_map(|name| self.member_overloads(&source, name))
            .filter_map(|method| method.return_type.get().cloned().flatten())
            .any(|result| result.is_same_type(&target));
        if !(related || by_method || self.is_explicitly_convertible(&source, &target)) {
            self.error(&cast.location, SemanticError::InvalidCast {
                from: source.signature(),
                to: target.signature(),
            });
        }
        Ok(Some(target))
    }

    fn analyze_lambda_value(
        &mut self,
        scope: ScopeId,
        lambda: &Rc<LambdaExpression>,
        expected: Option<&ResolvedType>,
    ) -> Result<Option<ResolvedType>, AnalyzerError> {
        let funcdef = expected
            .and_then(ResolvedType::function_symbol)
            .filter(|f| f.is_funcdef())
            .cloned();
        if funcdef.is_none() {
            self.error(&lambda.location, SemanticError::LambdaWithoutFuncdef);
        }
        self.analyze_lambda(scope, lambda, funcdef.clone())?;
        Ok(funcdef.map(ResolvedType::from_function))
    }

    /// Analyzes a lambda body; untyped parameters take the types of the
    /// funcdef the lambda is converted to.
    pub(crate) fn analyze_lambda(
        &mut self,
        scope: ScopeId,
        lambda: &LambdaExpression,
        funcdef: Option<Rc<FunctionSymbol>>,
    ) -> Result<(), AnalyzerError> {
        let parameter_types = match &funcdef {
            Some(funcdef) => funcdef.parameter_types()?.to_vec(),
            None => vec![],
        };
        let lambda_scope = self
            .table
            .create_anonymous(scope, Some(ScopeNode::Lambda(funcdef)));
        let path = self.scope_path(lambda_scope);
        self.info.push_scope_region(lambda.location.clone(), path.clone());

        for (index, parameter) in lambda.parameters.iter().enumerate() {
            let ty = match &parameter.ty {
                Some(ty) => self.resolve_type(lambda_scope, ty),
                None => parameter_types.get(index).cloned().flatten(),
            };
            if let Some(name) = &parameter.name {
                let variable = VariableSymbol::new(&name.name, Some(name.location.clone()), path.clone()).with_type(ty);
                self.declare(lambda_scope, &name.name, &name.location, Symbol::Variable(Rc::new(variable)));
            }
        }
        for statement in &lambda.body.statements {
            self.analyze_statement(lambda_scope, statement)?;
        }
        Ok(())
    }

    fn analyze_ternary(
        &mut self,
        scope: ScopeId,
        ternary: &TernaryExpression,
        expected: Option<&ResolvedType>,
    ) -> Result<Option<ResolvedType>, AnalyzerError> {
        self.check_condition(scope, &ternary.condition)?;
        let if_true = self.analyze_expression(scope, &ternary.if_true, expected)?;
        let if_false = self.analyze_expression(scope, &ternary.if_false, expected)?;
        Ok(match (if_true, if_false) {
            (Some(if_true), Some(if_false)) => {
                if self.is_convertible(&if_false, &if_true) {
                    Some(if_true)
                } else if self.is_convertible(&if_true, &if_false) {
                    Some(if_false)
                } else {
                    self.error(&ternary.if_false.location(), SemanticError::TypeMismatch {
                        expected: if_true.signature(),
                        found: if_false.signature(),
                    });
                    Some(if_true)
                }
            }
            (if_true, if_false) => if_true.or(if_false),
        })
    }

    fn analyze_init_list(
        &mut self,
        scope: ScopeId,
        list: &InitListExpression,
        expected: Option<&ResolvedType>,
    ) -> Result<Option<ResolvedType>, AnalyzerError> {
        let array_name = self.config.builtin_array_type.clone();
        let element = match expected {
            Some(expected) if expected.type_symbol().is_some_and(|s| s.identifier == array_name) => {
                let parameter = expected
                    .type_symbol()
                    .and_then(|s| s.template_parameters.first())
                    .cloned()
                    .unwrap_or_default();
                expected.template_argument(&parameter).cloned()
            }
            Some(expected) => {
                self.error(&list.location, SemanticError::InitListWithoutArray {
                    found: expected.signature(),
                });
                None
            }
            None => None,
        };
        for element_expression in &list.elements {
            self.check_expression(scope, element_expression, element.as_ref())?;
        }
        Ok(expected.cloned())
    }
}
