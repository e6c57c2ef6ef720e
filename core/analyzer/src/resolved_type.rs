use std::{
    fmt::{self, Display, Formatter},
    rc::Rc,
};

use indexmap::IndexMap;

use crate::symbol::{FunctionSymbol, PrimitiveKind, ScopePath, TypeSymbol};

/// Substitution from a template's own parameter names to concrete types.
/// An entry is `None` when the argument itself could not be resolved.
pub type TemplateTranslator = Rc<IndexMap<String, Option<ResolvedType>>>;

#[derive(Debug, Clone)]
pub enum TypeOrFunction {
    Type(Rc<TypeSymbol>),
    Function(Rc<FunctionSymbol>),
}

/// A fully resolved use of a type (or of a funcdef, for delegates).
///
/// Immutable: operations that change the handle flag or the template
/// translator return a new value.
#[derive(Debug, Clone)]
pub struct ResolvedType {
    pub symbol: TypeOrFunction,
    pub is_handle: bool,
    pub template_translator: Option<TemplateTranslator>,
}

impl ResolvedType {
    #[must_use]
    pub fn from_type(symbol: Rc<TypeSymbol>) -> Self {
        Self {
            symbol: TypeOrFunction::Type(symbol),
            is_handle: false,
            template_translator: None,
        }
    }

    /// Functions are only ever referred to through handles.
    #[must_use]
    pub fn from_function(symbol: Rc<FunctionSymbol>) -> Self {
        Self {
            symbol: TypeOrFunction::Function(symbol),
            is_handle: true,
            template_translator: None,
        }
    }

    #[must_use]
    pub fn with_handle(mut self, is_handle: bool) -> Self {
        self.is_handle = is_handle;
        self
    }

    #[must_use]
    pub fn with_translator(mut self, translator: Option<TemplateTranslator>) -> Self {
        self.template_translator = translator;
        self
    }

    #[must_use]
    pub fn type_symbol(&self) -> Option<&Rc<TypeSymbol>> {
        match &self.symbol {
            TypeOrFunction::Type(symbol) => Some(symbol),
            TypeOrFunction::Function(_) => None,
        }
    }

    #[must_use]
    pub fn function_symbol(&self) -> Option<&Rc<FunctionSymbol>> {
        match &self.symbol {
            TypeOrFunction::Function(symbol) => Some(symbol),
            TypeOrFunction::Type(_) => None,
        }
    }

    #[must_use]
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        self.type_symbol().and_then(|symbol| symbol.primitive)
    }

    #[must_use]
    pub fn is_primitive_kind(&self, kind: PrimitiveKind) -> bool {
        self.primitive() == Some(kind)
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        match &self.symbol {
            TypeOrFunction::Type(symbol) => &symbol.identifier,
            TypeOrFunction::Function(symbol) => &symbol.identifier,
        }
    }

    /// Scope the underlying declaration lives in.
    #[must_use]
    pub fn source_scope(&self) -> &ScopePath {
        match &self.symbol {
            TypeOrFunction::Type(symbol) => &symbol.declared_scope,
            TypeOrFunction::Function(symbol) => &symbol.declared_scope,
        }
    }

    #[must_use]
    pub fn members_scope(&self) -> Option<&ScopePath> {
        self.type_symbol()
            .and_then(|symbol| symbol.members_scope.as_ref())
    }

    #[must_use]
    pub fn template_argument(&self, parameter: &str) -> Option<&ResolvedType> {
        self.template_translator
            .as_ref()
            .and_then(|translator| translator.get(parameter))
            .and_then(Option::as_ref)
    }

    /// Same declaration and same template arguments; handle-ness is ignored.
    #[must_use]
    pub fn is_same_type(&self, other: &ResolvedType) -> bool {
        let same_symbol = match (&self.symbol, &other.symbol) {
            (TypeOrFunction::Type(left), TypeOrFunction::Type(right)) => left.is_same(right),
            (TypeOrFunction::Function(left), TypeOrFunction::Function(right)) => {
                Rc::ptr_eq(left, right) || left.location == right.location
            }
            _ => false,
        };
        same_symbol && same_translator(self.template_translator.as_ref(), other.template_translator.as_ref())
    }

    /// Replaces template parameters by the types `translator` binds them to.
    ///
    /// Returns `None` when the parameter is bound to an unresolved argument.
    #[must_use]
    pub fn substitute(&self, translator: Option<&TemplateTranslator>) -> Option<ResolvedType> {
        let Some(translator) = translator else {
            return Some(self.clone());
        };
        if let TypeOrFunction::Type(symbol) = &self.symbol
            && symbol.is_type_parameter
        {
            return match translator.get(&symbol.identifier) {
                Some(Some(bound)) => {
                    let is_handle = bound.is_handle || self.is_handle;
                    Some(bound.clone().with_handle(is_handle))
                }
                Some(None) => None,
                None => Some(self.clone()),
            };
        }
        let Some(own) = &self.template_translator else {
            return Some(self.clone());
        };
        let substituted: IndexMap<String, Option<ResolvedType>> = own
            .iter()
            .map(|(name, argument)| {
                let argument = argument
                    .as_ref()
                    .and_then(|argument| argument.substitute(Some(translator)));
                (name.clone(), argument)
            })
            .collect();
        Some(self.clone().with_translator(Some(Rc::new(substituted))))
    }

    /// Source-like spelling, e.g. `Wrapper<Wrapper<Entity>>@`.
    #[must_use]
    pub fn signature(&self) -> String {
        let mut signature = self.identifier().to_string();
        if let (TypeOrFunction::Type(symbol), Some(translator)) =
            (&self.symbol, &self.template_translator)
            && !symbol.template_parameters.is_empty()
        {
            let arguments: Vec<String> = symbol
                .template_parameters
                .iter()
                .map(|parameter| match translator.get(parameter) {
                    Some(Some(argument)) => argument.signature(),
                    Some(None) => "?".to_string(),
                    None => parameter.clone(),
                })
                .collect();
            signature.push('<');
            signature.push_str(&arguments.join(", "));
            signature.push('>');
        }
        if self.is_handle {
            signature.push('@');
        }
        signature
    }
}

fn same_translator(left: Option<&TemplateTranslator>, right: Option<&TemplateTranslator>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(left), Some(right)) => {
            left.len() == right.len()
                && left.iter().zip(right.iter()).all(|((ln, la), (rn, ra))| {
                    ln == rn
                        && match (la, ra) {
                            (Some(la), Some(ra)) => la.is_same_type(ra),
                            (None, None) => true,
                            _ => false,
                        }
                })
        }
        _ => false,
    }
}

impl Display for ResolvedType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature())
    }
}
