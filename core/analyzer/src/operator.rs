//! Operator Resolution
//!
//! Numeric operands never look at user methods: both sides are promoted
//! (enums count as `int`) and the result is the wider kind. Everything else
//! is an operator method on the left operand (`opAdd`), falling back to the
//! reversed method on the right operand (`opAdd_r`).
//!
//! Comparisons accept operands where either side converts to the other and
//! only then look for `opEquals` / `opCmp`.

use angelscript_ast::nodes::{
    AssignExpression, BinaryExpression, BinaryOperator, Expression, Location, PostfixOperator,
    PostfixUnaryExpression, PrefixUnaryExpression, UnaryOperator,
};

use crate::{
    errors::{AnalyzerError, PropertyAccessKind, SemanticError},
    overload::{CallArgument, Resolution, resolve_overload},
    resolved_type::ResolvedType,
    session::Session,
    symbol::PrimitiveKind,
    symbol_table::ScopeId,
};

/// Mixed numeric operands produce the first of these kinds that either
/// operand has.
const NUMERIC_PREFERENCE: [PrimitiveKind; 10] = [
    PrimitiveKind::Double,
    PrimitiveKind::Float,
    PrimitiveKind::Int64,
    PrimitiveKind::UInt64,
    PrimitiveKind::Int32,
    PrimitiveKind::UInt32,
    PrimitiveKind::Int16,
    PrimitiveKind::UInt16,
    PrimitiveKind::Int8,
    PrimitiveKind::UInt8,
];

fn wider(left: PrimitiveKind, right: PrimitiveKind) -> PrimitiveKind {
    NUMERIC_PREFERENCE
        .into_iter()
        .find(|kind| *kind == left || *kind == right)
        .unwrap_or(left)
}

/// Result kind of an arithmetic operator on two numbers; `None` for bitwise
/// operators on floating point values.
fn numeric_result(operator: BinaryOperator, left: PrimitiveKind, right: PrimitiveKind) -> Option<PrimitiveKind> {
    match operator {
        BinaryOperator::BitAnd
        | BinaryOperator::BitOr
        | BinaryOperator::BitXor
        | BinaryOperator::Shl
        | BinaryOperator::Shr
        | BinaryOperator::UShr
            if left.is_float() || right.is_float() =>
        {
            None
        }
        BinaryOperator::Shl | BinaryOperator::Shr | BinaryOperator::UShr => Some(left),
        _ => Some(wider(left, right)),
    }
}

/// Method name and reversed method name implementing an arithmetic operator.
///
/// # Errors
///
/// Comparison, logical and handle operators have no alias; asking for one is
/// an analyzer bug.
fn alias_names(operator: BinaryOperator) -> Result<(&'static str, Option<&'static str>), AnalyzerError> {
    Ok(match operator {
        BinaryOperator::Add => ("opAdd", Some("opAdd_r")),
        BinaryOperator::Sub => ("opSub", Some("opSub_r")),
        BinaryOperator::Mul => ("opMul", Some("opMul_r")),
        BinaryOperator::Div => ("opDiv", Some("opDiv_r")),
        BinaryOperator::Mod => ("opMod", Some("opMod_r")),
        BinaryOperator::Pow => ("opPow", Some("opPow_r")),
        BinaryOperator::BitAnd => ("opAnd", Some("opAnd_r")),
        BinaryOperator::BitOr => ("opOr", Some("opOr_r")),
        BinaryOperator::BitXor => ("opXor", Some("opXor_r")),
        BinaryOperator::Shl => ("opShl", Some("opShl_r")),
        BinaryOperator::Shr => ("opShr", Some("opShr_r")),
        BinaryOperator::UShr => ("opShrU", Some("opShrU_r")),
        BinaryOperator::Eq
        | BinaryOperator::Ne
        | BinaryOperator::Lt
        | BinaryOperator::Le
        | BinaryOperator::Gt
        | BinaryOperator::Ge
        | BinaryOperator::And
        | BinaryOperator::Or
        | BinaryOperator::Xor
        | BinaryOperator::Is
        | BinaryOperator::NotIs => {
            return Err(AnalyzerError::UnhandledOperator {
                operator: operator.as_str().to_string(),
            });
        }
    })
}

/// Outcome of looking for an operator method.
enum OperatorLookup {
    /// A method matched; its return type, if known.
    Found(Option<ResolvedType>),
    Missing,
}

fn numeric_kind(ty: &ResolvedType) -> Option<PrimitiveKind> {
    ty.type_symbol().and_then(|symbol| symbol.numeric_kind())
}

impl Session {
    /// Analyzes an expression that is written to, checking property
    /// accessors for each access in `kinds`.
    pub(crate) fn analyze_target(
        &mut self,
        scope: ScopeId,
        expression: &Expression,
        kinds: &[PropertyAccessKind],
    ) -> Result<Option<ResolvedType>, AnalyzerError> {
        let ty = match expression.unparenthesized() {
            Expression::Variable(access) => self.analyze_variable_access(scope, access, kinds, None)?.ty,
            Expression::MemberAccess(access) => self.analyze_member_access(scope, access, kinds)?.ty,
            _ => return self.analyze_expression(scope, expression, None),
        };
        self.record_type(expression.id(), ty.as_ref());
        Ok(ty)
    }

    /// Looks for method `name` on `receiver` accepting `operands`.
    fn find_operator(
        &self,
        receiver: &ResolvedType,
        name: &str,
        operands: &[CallArgument],
    ) -> Result<OperatorLookup, AnalyzerError> {
        let overloads = self.member_overloads(receiver, name);
        if overloads.is_empty() {
            return Ok(OperatorLookup::Missing);
        }
        let translator = receiver.template_translator.as_ref();
        Ok(match resolve_overload(&self.table, &overloads, operands, translator)? {
            Resolution::Matched(matched) => {
                OperatorLookup::Found(matched.function.return_type()?.and_then(|ty| ty.substitute(translator)))
            }
            Resolution::Failed(_) => OperatorLookup::Missing,
        })
    }

    /// `left op right` through `opX` on the left or `opX_r` on the right.
    fn find_binary_operator(
        &self,
        operator: BinaryOperator,
        left: &ResolvedType,
        right: &ResolvedType,
        location: &Location,
    ) -> Result<OperatorLookup, AnalyzerError> {
        let (alias, reverse) = alias_names(operator)?;
        let forward = [CallArgument::positional(Some(right.clone()), location.clone())];
        if let found @ OperatorLookup::Found(_) = self.find_operator(left, alias, &forward)? {
            return Ok(found);
        }
        let Some(reverse) = reverse else {
            return Ok(OperatorLookup::Missing);
        };
        let backward = [CallArgument::positional(Some(left.clone()), location.clone())];
        self.find_operator(right, reverse, &backward)
    }

    fn operator_not_defined(&mut self, location: &Location, operator: &str, left: &ResolvedType, right: &ResolvedType) {
        self.error(location, SemanticError::OperatorNotDefined {
            operator: operator.to_string(),
            left: left.signature(),
            right: right.signature(),
        });
    }

    pub(crate) fn analyze_binary(&mut self, scope: ScopeId, binary: &BinaryExpression) -> Result<Option<ResolvedType>, AnalyzerError> {
        let left = self.analyze_expression(scope, &binary.left, None)?;
        let right = self.analyze_expression(scope, &binary.right, left.as_ref())?;
        let boolean = self.builtin_type(PrimitiveKind::Bool);

        match binary.operator {
            BinaryOperator::And | BinaryOperator::Or | BinaryOperator::Xor => {
                self.check_logical_operands(binary, left.as_ref(), right.as_ref(), &boolean);
                Ok(Some(boolean))
            }
            BinaryOperator::Is | BinaryOperator::NotIs => {
                for (operand, ty) in [(&binary.left, &left), (&binary.right, &right)] {
                    if let Some(ty) = ty
                        && ty.type_symbol().is_some_and(|symbol| {
                            symbol.is_primitive() && !symbol.is_primitive_kind(PrimitiveKind::Null)
                        })
                    {
                        self.error(&operand.location(), SemanticError::UnaryOperatorNotDefined {
                            operator: binary.operator.as_str().to_string(),
                            operand: ty.signature(),
                        });
                    }
                }
                Ok(Some(boolean))
            }
            BinaryOperator::Eq
            | BinaryOperator::Ne
            | BinaryOperator::Lt
            | BinaryOperator::Le
            | BinaryOperator::Gt
            | BinaryOperator::Ge => {
                if let (Some(left), Some(right)) = (&left, &right) {
                    self.check_comparison(binary, left, right)?;
                }
                Ok(Some(boolean))
            }
            operator => {
                let (Some(left), Some(right)) = (left, right) else {
                    return Ok(None);
                };
                if let (Some(left_kind), Some(right_kind)) = (numeric_kind(&left), numeric_kind(&right)) {
                    return Ok(match numeric_result(operator, left_kind, right_kind) {
                        Some(kind) => Some(self.builtin_type(kind)),
                        None => {
                            self.operator_not_defined(&binary.location, operator.as_str(), &left, &right);
                            None
                        }
                    });
                }
                match self.find_binary_operator(operator, &left, &right, &binary.location)? {
                    OperatorLookup::Found(result) => Ok(result),
                    OperatorLookup::Missing => {
                        self.operator_not_defined(&binary.location, operator.as_str(), &left, &right);
                        Ok(None)
                    }
                }
            }
        }
    }

    /// Both operands must convert to `bool`, and at least one must already
    /// be a `bool`.
    fn check_logical_operands(
        &mut self,
        binary: &BinaryExpression,
        left: Option<&ResolvedType>,
        right: Option<&ResolvedType>,
        boolean: &ResolvedType,
    ) {
        let converts = |ty: Option<&ResolvedType>| ty.is_none_or(|ty| self.is_convertible(ty, boolean));
        let exact = |ty: Option<&ResolvedType>| ty.is_some_and(|ty| ty.is_primitive_kind(PrimitiveKind::Bool));
        let any_unknown = left.is_none() || right.is_none();
        if !converts(left) || !converts(right) || !(any_unknown || exact(left) || exact(right)) {
            self.error(&binary.location, SemanticError::LogicalOperandsNotBool {
                operator: binary.operator.as_str().to_string(),
            });
        }
    }

    fn check_comparison(&mut self, binary: &BinaryExpression, left: &ResolvedType, right: &ResolvedType) -> Result<(), AnalyzerError> {
        if numeric_kind(left).is_some() && numeric_kind(right).is_some() {
            return Ok(());
        }
        if self.is_convertible(left, right) || self.is_convertible(right, left) {
            return Ok(());
        }
        let method = match binary.operator {
            BinaryOperator::Eq | BinaryOperator::Ne => "opEquals",
            _ => "opCmp",
        };
        let forward = [CallArgument::positional(Some(right.clone()), binary.location.clone())];
        let backward = [CallArgument::positional(Some(left.clone()), binary.location.clone())];
        let found = matches!(self.find_operator(left, method, &forward)?, OperatorLookup::Found(_))
            || matches!(self.find_operator(right, method, &backward)?, OperatorLookup::Found(_));
        if !found {
            self.operator_not_defined(&binary.location, binary.operator.as_str(), left, right);
        }
        Ok(())
    }

    pub(crate) fn analyze_prefix(&mut self, scope: ScopeId, prefix: &PrefixUnaryExpression) -> Result<Option<ResolvedType>, AnalyzerError> {
        let operand = match prefix.operator {
            UnaryOperator::PreInc | UnaryOperator::PreDec => self.analyze_target(
                scope,
                &prefix.expression,
                &[PropertyAccessKind::Read, PropertyAccessKind::Write],
            )?,
            _ => self.analyze_expression(scope, &prefix.expression, None)?,
        };
        let Some(operand) = operand else {
            return Ok(match prefix.operator {
                UnaryOperator::Not => Some(self.builtin_type(PrimitiveKind::Bool)),
                _ => None,
            });
        };
        let kind = numeric_kind(&operand);

        let method = match prefix.operator {
            UnaryOperator::Not => {
                let boolean = self.builtin_type(PrimitiveKind::Bool);
                if !self.is_convertible(&operand, &boolean) {
                    self.unary_not_defined(&prefix.location, prefix.operator.as_str(), &operand);
                }
                return Ok(Some(boolean));
            }
            UnaryOperator::Handle => {
                if operand.type_symbol().is_some_and(|symbol| symbol.is_primitive()) {
                    self.unary_not_defined(&prefix.location, prefix.operator.as_str(), &operand);
                    return Ok(None);
                }
                return Ok(Some(operand.with_handle(true)));
            }
            UnaryOperator::Plus if kind.is_some() => return Ok(Some(self.promoted(&operand))),
            UnaryOperator::Plus => None,
            UnaryOperator::Neg if kind.is_some() => return Ok(Some(self.promoted(&operand))),
            UnaryOperator::Neg => Some("opNeg"),
            UnaryOperator::BitNot if kind.is_some_and(PrimitiveKind::is_integer) => {
                return Ok(Some(self.promoted(&operand)));
            }
            UnaryOperator::BitNot => Some("opCom"),
            UnaryOperator::PreInc | UnaryOperator::PreDec if kind.is_some() => return Ok(Some(operand)),
            UnaryOperator::PreInc => Some("opPreInc"),
            UnaryOperator::PreDec => Some("opPreDec"),
        };
        self.unary_method(&prefix.location, prefix.operator.as_str(), &operand, method)
    }

    pub(crate) fn analyze_postfix(&mut self, scope: ScopeId, postfix: &PostfixUnaryExpression) -> Result<Option<ResolvedType>, AnalyzerError> {
        let operand = self.analyze_target(
            scope,
            &postfix.expression,
            &[PropertyAccessKind::Read, PropertyAccessKind::Write],
        )?;
        let Some(operand) = operand else {
            return Ok(None);
        };
        if numeric_kind(&operand).is_some() {
            return Ok(Some(operand));
        }
        let method = match postfix.operator {
            PostfixOperator::Inc => "opPostInc",
            PostfixOperator::Dec => "opPostDec",
        };
        self.unary_method(&postfix.location, postfix.operator.as_str(), &operand, Some(method))
    }

    /// Enums lose their enum-ness under arithmetic.
    fn promoted(&self, operand: &ResolvedType) -> ResolvedType {
        match operand.type_symbol() {
            Some(symbol) if symbol.is_enum() => self.builtin_type(PrimitiveKind::Int32),
            _ => operand.clone(),
        }
    }

    fn unary_method(
        &mut self,
        location: &Location,
        operator: &str,
        operand: &ResolvedType,
        method: Option<&str>,
    ) -> Result<Option<ResolvedType>, AnalyzerError> {
        if let Some(method) = method
            && let OperatorLookup::Found(result) = self.find_operator(operand, method, &[])?
        {
            return Ok(result);
        }
        self.unary_not_defined(location, operator, operand);
        Ok(None)
    }

    fn unary_not_defined(&mut self, location: &Location, operator: &str, operand: &ResolvedType) {
        self.error(location, SemanticError::UnaryOperatorNotDefined {
            operator: operator.to_string(),
            operand: operand.signature(),
        });
    }

    pub(crate) fn analyze_assign(&mut self, scope: ScopeId, assign: &AssignExpression) -> Result<Option<ResolvedType>, AnalyzerError> {
        let compound = assign.operator.binary_operator();
        let kinds: &[PropertyAccessKind] = if compound.is_some() {
            &[PropertyAccessKind::Read, PropertyAccessKind::Write]
        } else {
            &[PropertyAccessKind::Write]
        };
        let target = self.analyze_target(scope, &assign.left, kinds)?;
        let value = self.analyze_expression(scope, &assign.right, target.as_ref())?;
        let (Some(target), Some(value)) = (target, value) else {
            return Ok(None);
        };

        let Some(operator) = compound else {
            if self.is_convertible(&value, &target) {
                return Ok(Some(target));
            }
            let argument = [CallArgument::positional(Some(value.clone()), assign.right.location())];
            if let OperatorLookup::Missing = self.find_operator(&target, "opAssign", &argument)? {
                self.error(&assign.right.location(), SemanticError::TypeMismatch {
                    expected: target.signature(),
                    found: value.signature(),
                });
            }
            return Ok(Some(target));
        };

        if let (Some(left_kind), Some(right_kind)) = (numeric_kind(&target), numeric_kind(&value)) {
            if numeric_result(operator, left_kind, right_kind).is_none() {
                self.operator_not_defined(&assign.location, assign.operator.as_str(), &target, &value);
            }
            return Ok(Some(target));
        }

        let (alias, _) = alias_names(operator)?;
        let argument = [CallArgument::positional(Some(value.clone()), assign.right.location())];
        if let OperatorLookup::Found(_) = self.find_operator(&target, &format!("{alias}Assign"), &argument)? {
            return Ok(Some(target));
        }
        let combined = match self.find_binary_operator(operator, &target, &value, &assign.location)? {
            OperatorLookup::Found(Some(result)) => self.is_convertible(&result, &target),
            OperatorLookup::Found(None) => true,
            OperatorLookup::Missing => false,
        };
        if !combined {
            self.operator_not_defined(&assign.location, assign.operator.as_str(), &target, &value);
        }
        Ok(Some(target))
    }
}
