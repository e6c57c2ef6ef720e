//! Overload Resolution
//!
//! A call is matched against every overload of the callee. Each candidate
//! either matches with a total [`ConversionCost`] or fails with a
//! [`Mismatch`]. The cheapest match wins, the first declared on a tie. When
//! nothing matches, the most informative mismatch is reported: a problem with
//! named arguments outranks a type mismatch, which outranks an arity problem.
//!
//! Arguments whose type could not be determined match any parameter for
//! free, so one undefined name does not cascade into "no matching overload".

use std::rc::Rc;

use angelscript_ast::nodes::{ArgumentList, Expression, Identifier, LambdaExpression, Location};
use tracing::trace;

use crate::{
    conversion::{ConversionCost, evaluate_conversion},
    errors::{AnalyzerError, SemanticError},
    resolved_type::{ResolvedType, TemplateTranslator},
    session::Session,
    symbol::{FunctionSymbol, PrimitiveKind, SymbolRef},
    symbol_table::{ScopeId, SymbolTable},
};

/// An evaluated call argument.
#[derive(Debug, Clone)]
pub(crate) struct CallArgument {
    pub(crate) name: Option<Rc<Identifier>>,
    pub(crate) ty: Option<ResolvedType>,
    /// Lambdas are typed against the parameter they bind to, after the
    /// overload is chosen.
    pub(crate) lambda: Option<Rc<LambdaExpression>>,
    pub(crate) location: Location,
}

impl CallArgument {
    pub(crate) fn positional(ty: Option<ResolvedType>, location: Location) -> Self {
        Self {
            name: None,
            ty,
            lambda: None,
            location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Mismatch {
    TooManyArguments { expected: usize, found: usize },
    TooFewArguments { parameter: String },
    NamedArgumentNotFound { name: String, location: Location },
    DuplicateNamedArgument { name: String, location: Location },
    ArgumentType {
        index: usize,
        expected: String,
        found: String,
        location: Location,
    },
}

impl Mismatch {
    fn priority(&self) -> u8 {
        match self {
            Mismatch::NamedArgumentNotFound { .. } | Mismatch::DuplicateNamedArgument { .. } => 3,
            Mismatch::ArgumentType { .. } => 2,
            Mismatch::TooManyArguments { .. } | Mismatch::TooFewArguments { .. } => 1,
        }
    }

    /// Location to report at, if more precise than the call itself.
    fn location(&self) -> Option<&Location> {
        match self {
            Mismatch::NamedArgumentNotFound { location, .. }
            | Mismatch::DuplicateNamedArgument { location, .. }
            | Mismatch::ArgumentType { location, .. } => Some(location),
            Mismatch::TooManyArguments { .. } | Mismatch::TooFewArguments { .. } => None,
        }
    }

    fn into_error(self, function: &str) -> SemanticError {
        let function = function.to_string();
        match self {
            Mismatch::TooManyArguments { expected, found } => SemanticError::TooManyArguments {
                function,
                expected,
                found,
            },
            Mismatch::TooFewArguments { parameter } => SemanticError::TooFewArguments { function, parameter },
            Mismatch::NamedArgumentNotFound { name, .. } => SemanticError::NamedArgumentNotFound { function, name },
            Mismatch::DuplicateNamedArgument { name, .. } => SemanticError::DuplicateNamedArgument { function, name },
            Mismatch::ArgumentType {
                index,
                expected,
                found,
                ..
            } => SemanticError::ArgumentMismatch {
                function,
                index,
                expected,
                found,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct OverloadMatch {
    pub(crate) function: Rc<FunctionSymbol>,
    pub(crate) cost: ConversionCost,
    /// Parameter index each argument binds to.
    pub(crate) bindings: Vec<usize>,
}

#[derive(Debug, Clone)]
pub(crate) enum Resolution {
    Matched(OverloadMatch),
    Failed(Option<Mismatch>),
}

/// Matches `arguments` against a single overload.
///
/// # Errors
///
/// Fails if the overload's signature has not been hoisted.
pub(crate) fn match_overload(
    table: &SymbolTable,
    function: &Rc<FunctionSymbol>,
    arguments: &[CallArgument],
    translator: Option<&TemplateTranslator>,
) -> Result<Result<OverloadMatch, Mismatch>, AnalyzerError> {
    let parameters = function.parameters();
    let parameter_types = function.parameter_types()?;
    let variadic = parameters.last().is_some_and(|p| p.is_variadic);
    let fixed = if variadic { parameters.len() - 1 } else { parameters.len() };

    let positional = arguments.iter().filter(|a| a.name.is_none()).count();
    if !variadic && positional > parameters.len() {
        return Ok(Err(Mismatch::TooManyArguments {
            expected: parameters.len(),
            found: positional,
        }));
    }

    let mut bound = vec![false; parameters.len()];
    let mut bindings = Vec::with_capacity(arguments.len());
    for (index, argument) in arguments.iter().enumerate() {
        let parameter = match &argument.name {
            None => index.min(fixed),
            Some(name) => {
                let Some(parameter) = parameters[..fixed]
                    .iter()
                    .position(|p| p.name.as_deref() == Some(name.name.as_str()))
                else {
                    return Ok(Err(Mismatch::NamedArgumentNotFound {
                        name: name.name.clone(),
                        location: name.location.clone(),
                    }));
                };
                if bound[parameter] {
                    return Ok(Err(Mismatch::DuplicateNamedArgument {
                        name: name.name.clone(),
                        location: name.location.clone(),
                    }));
                }
                parameter
            }
        };
        bound[parameter] = true;
        bindings.push(parameter);
    }

    if let Some((index, missing)) = parameters
        .iter()
        .enumerate()
        .find(|(index, p)| !bound[*index] && (p.is_variadic || !p.has_default))
    {
        return Ok(Err(Mismatch::TooFewArguments {
            parameter: missing.name.clone().unwrap_or_else(|| format!("#{}", index + 1)),
        }));
    }

    let mut cost = ConversionCost::NO_CONV;
    for (index, (argument, parameter)) in arguments.iter().zip(&bindings).enumerate() {
        let Some(expected) = parameter_types
            .get(*parameter)
            .cloned()
            .flatten()
            .and_then(|ty| ty.substitute(translator))
        else {
            continue;
        };
        if let Some(lambda) = &argument.lambda {
            let fits = expected
                .function_symbol()
                .is_some_and(|funcdef| funcdef.is_funcdef() && funcdef.parameters().len() == lambda.parameters.len());
            if !fits {
                return Ok(Err(Mismatch::ArgumentType {
                    index: index + 1,
                    expected: expected.signature(),
                    found: "lambda".to_string(),
                    location: argument.location.clone(),
                }));
            }
            cost = cost + ConversionCost::REF;
            continue;
        }
        let Some(found) = &argument.ty else {
            continue;
        };
        match evaluate_conversion(table, found, &expected) {
            Some(argument_cost) => cost = cost + argument_cost,
            None => {
                return Ok(Err(Mismatch::ArgumentType {
                    index: index + 1,
                    expected: expected.signature(),
                    found: found.signature(),
                    location: argument.location.clone(),
                }));
            }
        }
    }

    Ok(Ok(OverloadMatch {
        function: function.clone(),
        cost,
        bindings,
    }))
}

/// Picks the best of `overloads` for `arguments`.
///
/// # Errors
///
/// Fails if an overload's signature has not been hoisted.
pub(crate) fn resolve_overload(
    table: &SymbolTable,
    overloads: &[Rc<FunctionSymbol>],
    arguments: &[CallArgument],
    translator: Option<&TemplateTranslator>,
) -> Result<Resolution, AnalyzerError> {
    let mut best: Option<OverloadMatch> = None;
    let mut best_mismatch: Option<Mismatch> = None;
    for overload in overloads {
        match match_overload(table, overload, arguments, translator)? {
            Ok(candidate) => {
                if best.as_ref().is_none_or(|b| candidate.cost < b.cost) {
                    best = Some(candidate);
                }
            }
            Err(mismatch) => {
                if best_mismatch
                    .as_ref()
                    .is_none_or(|b| mismatch.priority() > b.priority())
                {
                    best_mismatch = Some(mismatch);
                }
            }
        }
    }
    Ok(match best {
        Some(best) => Resolution::Matched(best),
        None => Resolution::Failed(best_mismatch),
    })
}

/// A call being checked.
pub(crate) struct CallSite<'a> {
    pub(crate) name: &'a str,
    /// Name token, for references; `None` for calls without one.
    pub(crate) name_location: Option<&'a Location>,
    pub(crate) location: &'a Location,
    pub(crate) arguments: &'a Rc<ArgumentList>,
    /// Called by name: a lone funcdef callee converts its argument to a
    /// delegate instead of being invoked.
    pub(crate) delegate_cast: bool,
}

impl Session {
    /// Evaluates call arguments left to right.
    ///
    /// Returns `None` when a positional argument follows a named one; every
    /// argument is still analyzed for its own diagnostics.
    pub(crate) fn evaluate_arguments(
        &mut self,
        scope: ScopeId,
        arguments: &ArgumentList,
    ) -> Result<Option<Vec<CallArgument>>, AnalyzerError> {
        let mut evaluated = Vec::with_capacity(arguments.len());
        let mut seen_named = false;
        let mut valid = true;
        for argument in &arguments.arguments {
            if argument.name.is_some() {
                seen_named = true;
            } else if seen_named {
                self.error(&argument.location, SemanticError::PositionalAfterNamed);
                valid = false;
            }
            let (ty, lambda) = match argument.value.unparenthesized() {
                Expression::Lambda(lambda) => (None, Some(lambda.clone())),
                value => (self.analyze_expression(scope, value, None)?, None),
            };
            evaluated.push(CallArgument {
                name: argument.name.clone(),
                ty,
                lambda,
                location: argument.value.location(),
            });
        }
        Ok(valid.then_some(evaluated))
    }

    /// Checks a call against `overloads` and returns the call's type.
    ///
    /// # Errors
    ///
    /// Fails if a signature is read before it was hoisted.
    pub(crate) fn check_call(
        &mut self,
        scope: ScopeId,
        call: &CallSite<'_>,
        overloads: &[Rc<FunctionSymbol>],
        translator: Option<&TemplateTranslator>,
    ) -> Result<Option<ResolvedType>, AnalyzerError> {
        let Some(arguments) = self.evaluate_arguments(scope, call.arguments)? else {
            self.fallback_reference(call, overloads);
            return Ok(None);
        };

        if let (true, [funcdef]) = (call.delegate_cast, overloads)
            && funcdef.is_funcdef()
        {
            return self.check_delegate_cast(scope, call, funcdef, &arguments);
        }

        match resolve_overload(&self.table, overloads, &arguments, translator)? {
            Resolution::Matched(matched) => {
                trace!(
                    function = call.name,
                    cost = matched.cost.value(),
                    candidates = overloads.len(),
                    "overload resolved"
                );
                self.record_call(scope, call, &matched, &arguments, translator)?;
                Ok(matched
                    .function
                    .return_type()?
                    .and_then(|ty| ty.substitute(translator)))
            }
            Resolution::Failed(mismatch) => {
                trace!(function = call.name, candidates = overloads.len(), "no overload matched");
                self.fallback_reference(call, overloads);
                if let Some(mismatch) = mismatch {
                    let location = mismatch.location().unwrap_or(call.location).clone();
                    self.error(&location, mismatch.into_error(call.name));
                } else {
                    self.error(call.location, SemanticError::NotCallable {
                        type_name: call.name.to_string(),
                    });
                }
                Ok(None)
            }
        }
    }

    fn record_call(
        &mut self,
        scope: ScopeId,
        call: &CallSite<'_>,
        matched: &OverloadMatch,
        arguments: &[CallArgument],
        translator: Option<&TemplateTranslator>,
    ) -> Result<(), AnalyzerError> {
        if let Some(name_location) = call.name_location {
            self.reference(name_location, SymbolRef::Function(matched.function.clone()));
        }

        let parameter_types = matched.function.parameter_types()?.to_vec();
        for (argument, parameter) in arguments.iter().zip(&matched.bindings) {
            if let Some(name) = &argument.name
                && let Some(variable) = matched.function.parameter_variable(&name.name)
            {
                let variable = variable.clone();
                self.reference(&name.location, SymbolRef::Variable(variable));
            }
            if let Some(lambda) = &argument.lambda {
                let funcdef = parameter_types
                    .get(*parameter)
                    .cloned()
                    .flatten()
                    .and_then(|ty| ty.substitute(translator))
                    .and_then(|ty| ty.function_symbol().cloned());
                self.analyze_lambda(scope, lambda, funcdef)?;
            }
        }
        self.info
            .push_call_site(call.arguments.clone(), matched.function.clone());
        Ok(())
    }

    /// `Callback(f)`: a funcdef name called with one argument converts a
    /// function handle to the delegate type.
    fn check_delegate_cast(
        &mut self,
        scope: ScopeId,
        call: &CallSite<'_>,
        funcdef: &Rc<FunctionSymbol>,
        arguments: &[CallArgument],
    ) -> Result<Option<ResolvedType>, AnalyzerError> {
        if let Some(name_location) = call.name_location {
            self.reference(name_location, SymbolRef::Function(funcdef.clone()));
        }
        let delegate = ResolvedType::from_function(funcdef.clone());
        let [argument] = arguments else {
            self.error(call.location, SemanticError::NoMatchingConstructor {
                name: call.name.to_string(),
                arguments: arguments.len(),
            });
            return Ok(Some(delegate));
        };
        if let Some(lambda) = &argument.lambda {
            self.analyze_lambda(scope, lambda, Some(funcdef.clone()))?;
        } else if let Some(found) = &argument.ty
            && !self.is_convertible(found, &delegate)
        {
            self.error(&argument.location, SemanticError::TypeMismatch {
                expected: delegate.signature(),
                found: found.signature(),
            });
        }
        Ok(Some(delegate))
    }

    fn fallback_reference(&mut self, call: &CallSite<'_>, overloads: &[Rc<FunctionSymbol>]) {
        if let (Some(name_location), Some(first)) = (call.name_location, overloads.first()) {
            self.reference(name_location, SymbolRef::Function(first.clone()));
        }
    }

    /// Checks `T(args)`: primitive and enum conversions, or a constructor.
    ///
    /// # Errors
    ///
    /// Fails if a constructor signature is read before it was hoisted.
    pub(crate) fn check_constructor_call(
        &mut self,
        scope: ScopeId,
        ty: ResolvedType,
        arguments: &Rc<ArgumentList>,
        location: &Location,
    ) -> Result<Option<ResolvedType>, AnalyzerError> {
        let Some(symbol) = ty.type_symbol().cloned() else {
            let function = ty.function_symbol().cloned();
            if let Some(funcdef) = function {
                let call = CallSite {
                    name: &funcdef.identifier,
                    name_location: None,
                    location,
                    arguments,
                    delegate_cast: true,
                };
                return self.check_call(scope, &call, &[funcdef.clone()], None);
            }
            return Ok(None);
        };

        if symbol.is_primitive() || symbol.is_enum() {
            let Some(evaluated) = self.evaluate_arguments(scope, arguments)? else {
                return Ok(Some(ty));
            };
            let accepted = match (symbol.is_enum(), evaluated.as_slice()) {
                (false, []) => true,
                (_, [argument]) if argument.name.is_none() => argument.ty.as_ref().is_none_or(|found| {
                    let int = self.builtin_type(PrimitiveKind::Int32);
                    let target = if symbol.is_enum() { &int } else { &ty };
                    self.is_explicitly_convertible(found, target)
                }),
                _ => false,
            };
            if !accepted {
                self.error(location, SemanticError::NoMatchingConstructor {
                    name: symbol.identifier.clone(),
                    arguments: evaluated.len(),
                });
            }
            return Ok(Some(ty));
        }

        if !symbol.is_class() {
            self.evaluate_arguments(scope, arguments)?;
            return Ok(Some(ty));
        }

        let constructors = self.table.member_functions(&symbol, &symbol.identifier);
        if constructors.is_empty() {
            let Some(evaluated) = self.evaluate_arguments(scope, arguments)? else {
                return Ok(Some(ty));
            };
            let accepted = match evaluated.as_slice() {
                [] => true,
                [argument] => argument
                    .ty
                    .as_ref()
                    .is_none_or(|found| found.is_same_type(&ty)),
                _ => false,
            };
            if !accepted {
                self.error(location, SemanticError::NoMatchingConstructor {
                    name: symbol.identifier.clone(),
                    arguments: evaluated.len(),
                });
            }
            return Ok(Some(ty));
        }

        let translator = ty.template_translator.clone();
        let call = CallSite {
            name: &symbol.identifier,
            name_location: None,
            location,
            arguments,
            delegate_cast: false,
        };
        self.check_call(scope, &call, &constructors, translator.as_ref())?;
        Ok(Some(ty.with_handle(false)))
    }

    /// Conversions allowed by an explicit `T(x)` or `cast<T>(x)` of values:
    /// any implicit conversion, plus numbers and enums among each other.
    pub(crate) fn is_explicitly_convertible(&self, found: &ResolvedType, target: &ResolvedType) -> bool {
        if self.is_convertible(found, target) {
            return true;
        }
        let numeric = |ty: &ResolvedType| ty.type_symbol().and_then(|symbol| symbol.numeric_kind());
        numeric(found).is_some() && numeric(target).is_some()
    }
}
