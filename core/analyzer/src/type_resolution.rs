//! Resolution of type references (`const ns::Wrapper<T>@[]`) to
//! [`ResolvedType`]s.
//!
//! Resolution is fail-soft: an unknown name reports a diagnostic and yields
//! `None`, and every consumer treats `None` as "unknown, do not report
//! again".

use std::rc::Rc;

use angelscript_ast::nodes::{Location, ScopeQualifier, TypeModifier, TypeRef};
use indexmap::IndexMap;

use crate::{
    errors::SemanticError,
    resolved_type::{ResolvedType, TemplateTranslator},
    session::Session,
    symbol::{Symbol, SymbolRef, TypeSymbol},
    symbol_table::{ScopeId, ScopeNode},
};

impl Session {
    pub(crate) fn resolve_type(&mut self, scope: ScopeId, ty: &TypeRef) -> Option<ResolvedType> {
        self.resolve_with_modifiers(scope, ty, &ty.modifiers)
    }

    fn resolve_with_modifiers(&mut self, scope: ScopeId, ty: &TypeRef, modifiers: &[TypeModifier]) -> Option<ResolvedType> {
        if let Some(array) = modifiers.iter().rposition(|m| *m == TypeModifier::Array) {
            let element = self.resolve_with_modifiers(scope, ty, &modifiers[..array]);
            let is_handle = modifiers[array + 1..].contains(&TypeModifier::Handle);
            return self
                .array_of(scope, element, &ty.location)
                .map(|array| array.with_handle(is_handle));
        }
        let is_handle = modifiers.contains(&TypeModifier::Handle);
        self.resolve_named(scope, ty).map(|resolved| {
            let handle = is_handle || resolved.is_handle;
            resolved.with_handle(handle)
        })
    }

    fn resolve_named(&mut self, scope: ScopeId, ty: &TypeRef) -> Option<ResolvedType> {
        let name = &ty.name.name;
        if ty.scope.is_none()
            && let Some(builtin) = self.table.builtin_by_token(name)
        {
            return Some(ResolvedType::from_type(builtin));
        }

        let symbol = match &ty.scope {
            Some(qualifier) => {
                let qualified = self.resolve_scope_qualifier(scope, qualifier)?;
                self.table.lookup(qualified, name).cloned()
            }
            None => self.lookup_type_name(scope, name),
        };
        let Some(symbol) = symbol else {
            self.error(&ty.name.location, SemanticError::UndefinedType { name: name.clone() });
            return None;
        };

        match symbol {
            Symbol::Type(symbol) => {
                self.reference(&ty.name.location, SymbolRef::Type(symbol.clone()));
                let translator = self.template_translator(scope, &symbol, &ty.template_arguments, &ty.location)?;
                Some(ResolvedType::from_type(symbol).with_translator(translator))
            }
            Symbol::Functions(functions) => {
                let Some(funcdef) = functions.as_funcdef().cloned() else {
                    self.error(&ty.name.location, SemanticError::NotAType { name: name.clone() });
                    return None;
                };
                self.reference(&ty.name.location, SymbolRef::Function(funcdef.clone()));
                Some(ResolvedType::from_function(funcdef))
            }
            Symbol::Variable(_) => {
                self.error(&ty.name.location, SemanticError::NotAType { name: name.clone() });
                None
            }
        }
    }

    /// Binds the template parameters of `symbol` to `arguments`.
    ///
    /// Returns `Some(None)` for a non-template use, and `None` when there are
    /// more arguments than parameters.
    pub(crate) fn template_translator(
        &mut self,
        scope: ScopeId,
        symbol: &TypeSymbol,
        arguments: &[Rc<TypeRef>],
        location: &Location,
    ) -> Option<Option<TemplateTranslator>> {
        self.bind_template_parameters(scope, &symbol.identifier, &symbol.template_parameters, arguments, location)
    }

    pub(crate) fn bind_template_parameters(
        &mut self,
        scope: ScopeId,
        name: &str,
        parameters: &[String],
        arguments: &[Rc<TypeRef>],
        location: &Location,
    ) -> Option<Option<TemplateTranslator>> {
        if arguments.len() > parameters.len() {
            self.error(location, SemanticError::TooManyTemplateArguments {
                name: name.to_string(),
                expected: parameters.len(),
                found: arguments.len(),
            });
            return None;
        }
        if arguments.is_empty() {
            return Some(None);
        }
        let mut translator = IndexMap::new();
        for (index, parameter) in parameters.iter().enumerate() {
            let argument = arguments
                .get(index)
                .and_then(|argument| self.resolve_type(scope, argument));
            translator.insert(parameter.clone(), argument);
        }
        Some(Some(Rc::new(translator)))
    }

    /// Looks `name` up as a type, walking past constructors: inside a class
    /// the class name denotes the constructor overloads, not the type.
    pub(crate) fn lookup_type_name(&self, scope: ScopeId, name: &str) -> Option<Symbol> {
        let mut from = Some(scope);
        while let Some(current) = from {
            let (found, symbol) = self.table.lookup_with_parents(current, name)?;
            let is_constructor = matches!(symbol, Symbol::Functions(functions) if functions.as_funcdef().is_none())
                && matches!(self.table.scope(found).node(), Some(ScopeNode::Class(_)));
            if !is_constructor {
                return Some(symbol.clone());
            }
            from = self.table.parent(found);
        }
        None
    }

    /// Scope named by `a::b::`, searched from `scope` outward for the first
    /// segment and then descended.
    pub(crate) fn resolve_scope_qualifier(&mut self, scope: ScopeId, qualifier: &ScopeQualifier) -> Option<ScopeId> {
        let mut segments = qualifier.segments.iter();
        let mut current = if qualifier.is_global {
            self.table.root()
        } else {
            let first = segments.next()?;
            let Some(found) = self.table.child_with_parents(scope, &first.name) else {
                self.error(&first.location, SemanticError::UndefinedScope {
                    name: first.name.clone(),
                });
                return None;
            };
            found
        };
        for segment in segments {
            let Some(child) = self.table.child(current, &segment.name) else {
                self.error(&segment.location, SemanticError::UndefinedScope {
                    name: segment.name.clone(),
                });
                return None;
            };
            current = child;
        }
        Some(current)
    }

    /// `element[]`, an instance of the configured array template.
    pub(crate) fn array_of(&mut self, scope: ScopeId, element: Option<ResolvedType>, location: &Location) -> Option<ResolvedType> {
        let name = self.config.builtin_array_type.clone();
        let Some(Symbol::Type(array)) = self.lookup_type_name(scope, &name) else {
            self.error(location, SemanticError::UndefinedType { name });
            return None;
        };
        let parameter = array
            .template_parameters
            .first()
            .cloned()
            .unwrap_or_else(|| "T".to_string());
        let mut translator = IndexMap::new();
        translator.insert(parameter, element);
        Some(ResolvedType::from_type(array).with_translator(Some(Rc::new(translator))))
    }
}
