//! Implicit Conversions
//!
//! [`evaluate_conversion`] answers "can a value of type `src` be passed
//! where `dest` is expected, and how good a match is that?". The answer is a
//! [`ConversionCost`]; overload resolution sums the costs of all arguments
//! and picks the cheapest candidate.
//!
//! Costs form a strict order. Widening is always cheaper than the matching
//! narrowing, and anything that runs user code (conversion operators,
//! constructors) is more expensive than any primitive conversion:
//!
//! | cost | conversion                                              |
//! |------|---------------------------------------------------------|
//! | 0    | identical type, `void` source                           |
//! | 1    | same object type, only handle-ness differs              |
//! | 2    | enum to `int`                                           |
//! | 3    | enum to another integer                                 |
//! | 4    | integer or float widening                               |
//! | 5    | integer or float narrowing                              |
//! | 6    | signed to unsigned, destination not smaller             |
//! | 7    | unsigned to signed, destination not smaller             |
//! | 8    | sign change into a smaller destination                  |
//! | 9    | integer to float                                        |
//! | 10   | float to integer                                        |
//! | 11   | derived to base, `null` to object, compatible funcdefs  |
//! | 12+  | object to primitive through conversion methods, per hop |
//! | 14+  | to object through `opImplConv` or a constructor         |
//! | 16   | any value to `?`, `auto` or an unbound template parameter |

use std::{
    cell::RefCell,
    iter::Sum,
    ops::Add,
    rc::Rc,
};

use rustc_hash::FxHashSet;

use crate::{
    resolved_type::{ResolvedType, TypeOrFunction},
    symbol::{FunctionSymbol, PrimitiveKind, TypeSymbol},
    symbol_table::SymbolTable,
};

/// Cost of an implicit conversion; lower is a better match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ConversionCost(u32);

impl ConversionCost {
    pub const NO_CONV: Self = Self(0);
    pub const CONST: Self = Self(1);
    pub const ENUM_SAME_SIZE: Self = Self(2);
    pub const ENUM_DIFF_SIZE: Self = Self(3);
    pub const PRIMITIVE_SIZE_UP: Self = Self(4);
    pub const PRIMITIVE_SIZE_DOWN: Self = Self(5);
    pub const SIGNED_TO_UNSIGNED: Self = Self(6);
    pub const UNSIGNED_TO_SIGNED: Self = Self(7);
    pub const SIGN_CHANGE_NARROWING: Self = Self(8);
    pub const INT_TO_FLOAT: Self = Self(9);
    pub const FLOAT_TO_INT: Self = Self(10);
    pub const REF: Self = Self(11);
    pub const OBJ_TO_PRIMITIVE: Self = Self(12);
    pub const TO_OBJECT: Self = Self(14);
    pub const VARIABLE: Self = Self(16);

    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl Add for ConversionCost {
    type Output = ConversionCost;

    fn add(self, rhs: Self) -> Self::Output {
        ConversionCost(self.0.saturating_add(rhs.0))
    }
}

impl Sum for ConversionCost {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(ConversionCost::NO_CONV, Add::add)
    }
}

/// Cost of converting `src` to `dest`, or `None` if no implicit conversion
/// exists.
#[must_use = "this is a pure lookup with no side effects"]
pub fn evaluate_conversion(table: &SymbolTable, src: &ResolvedType, dest: &ResolvedType) -> Option<ConversionCost> {
    ConversionEvaluator::new(table).evaluate(src, dest)
}

/// Whether `derived` inherits from `base`, directly or transitively.
#[must_use = "this is a pure lookup with no side effects"]
pub fn derives_from(derived: &TypeSymbol, base: &TypeSymbol) -> bool {
    let mut visited = FxHashSet::default();
    derives_from_inner(derived, base, &mut visited)
}

fn derives_from_inner(derived: &TypeSymbol, base: &TypeSymbol, visited: &mut FxHashSet<usize>) -> bool {
    if !visited.insert(std::ptr::from_ref(derived) as usize) {
        return false;
    }
    derived
        .base_list
        .get()
        .into_iter()
        .flatten()
        .filter_map(ResolvedType::type_symbol)
        .any(|parent| parent.is_same(base) || derives_from_inner(parent, base, visited))
}

/// Primitive kinds an object may convert through to reach `dest`, best first.
fn conversion_preference(dest: PrimitiveKind) -> Vec<PrimitiveKind> {
    use PrimitiveKind::{Double, Float, Int8, Int16, Int32, Int64, UInt8, UInt16, UInt32, UInt64};
    const INTEGERS: [PrimitiveKind; 8] = [Int64, UInt64, Int32, UInt32, Int16, UInt16, Int8, UInt8];
    match dest {
        Double => [Double, Float].into_iter().chain(INTEGERS).collect(),
        Float => [Float, Double].into_iter().chain(INTEGERS).collect(),
        integer => std::iter::once(integer)
            .chain(INTEGERS)
            .chain([Double, Float])
            .collect(),
    }
}

struct ConversionEvaluator<'a> {
    table: &'a SymbolTable,
    /// (source, destination) pairs currently being tried through user code
    /// (a constructor or a chain of conversion methods); a nested attempt for
    /// the same pair fails.
    guard: RefCell<FxHashSet<(usize, usize)>>,
}

impl<'a> ConversionEvaluator<'a> {
    fn new(table: &'a SymbolTable) -> Self {
        Self {
            table,
            guard: RefCell::new(FxHashSet::default()),
        }
    }

    /// Runs `attempt` unless the same pair is already being tried further up.
    fn guarded(
        &self,
        src_type: &Rc<TypeSymbol>,
        dest_type: &Rc<TypeSymbol>,
        attempt: impl FnOnce() -> Option<ConversionCost>,
    ) -> Option<ConversionCost> {
        let key = (Rc::as_ptr(src_type) as usize, Rc::as_ptr(dest_type) as usize);
        if !self.guard.borrow_mut().insert(key) {
            return None;
        }
        let cost = attempt();
        self.guard.borrow_mut().remove(&key);
        cost
    }

    fn evaluate(&self, src: &ResolvedType, dest: &ResolvedType) -> Option<ConversionCost> {
        match (&src.symbol, &dest.symbol) {
            (TypeOrFunction::Function(src_function), TypeOrFunction::Function(dest_function)) => {
                compatible_signatures(src_function, dest_function).then_some(ConversionCost::REF)
            }
            (TypeOrFunction::Function(_), TypeOrFunction::Type(dest_type)) => {
                is_variable_destination(dest_type).then_some(ConversionCost::VARIABLE)
            }
            (TypeOrFunction::Type(src_type), TypeOrFunction::Function(_)) => src_type
                .is_primitive_kind(PrimitiveKind::Null)
                .then_some(ConversionCost::REF),
            (TypeOrFunction::Type(src_type), TypeOrFunction::Type(dest_type)) => {
                self.evaluate_types(src, src_type, dest, dest_type)
            }
        }
    }

    fn evaluate_types(
        &self,
        src: &ResolvedType,
        src_type: &Rc<TypeSymbol>,
        dest: &ResolvedType,
        dest_type: &Rc<TypeSymbol>,
    ) -> Option<ConversionCost> {
        if src_type.is_primitive_kind(PrimitiveKind::Void) {
            return Some(ConversionCost::NO_CONV);
        }
        if is_variable_destination(dest_type) {
            return Some(ConversionCost::VARIABLE);
        }
        if src_type.is_ambiguous_enum_member() {
            let resolves = dest_type.is_enum()
                && src_type
                    .enum_candidates
                    .iter()
                    .any(|candidate| candidate.is_same(dest_type));
            return resolves.then_some(ConversionCost::NO_CONV);
        }
        if src.is_same_type(dest) {
            return Some(if src.is_handle == dest.is_handle || src_type.is_primitive() {
                ConversionCost::NO_CONV
            } else {
                ConversionCost::CONST
            });
        }
        if src_type.is_primitive_kind(PrimitiveKind::Null) {
            return (!dest_type.is_primitive()).then_some(ConversionCost::REF);
        }
        if dest_type.is_ambiguous_enum_member() {
            return None;
        }
        if src_type.is_type_parameter || dest_type.is_type_parameter {
            return Some(ConversionCost::VARIABLE);
        }

        match (src_type.primitive, dest_type.primitive) {
            (Some(src_kind), Some(dest_kind)) => primitive_cost(src_kind, dest_kind),
            (None, Some(dest_kind)) if src_type.is_enum() => enum_to_primitive(dest_kind),
            (None, Some(dest_kind)) => self.object_to_primitive(src, src_type, dest, dest_type, dest_kind),
            (Some(_), None) if dest_type.is_enum() => None,
            (Some(_), None) => self.constructor_conversion(src, src_type, dest, dest_type),
            (None, None) => {
                if src_type.is_enum() || dest_type.is_enum() {
                    return None;
                }
                if derives_from(src_type, dest_type) {
                    return Some(ConversionCost::REF);
                }
                if self.converts_to_object(src, src_type, dest) {
                    return Some(ConversionCost::TO_OBJECT);
                }
                self.constructor_conversion(src, src_type, dest, dest_type)
            }
        }
    }

    /// Conversion methods of `src` taking no arguments, with their result
    /// types instantiated for `src`.
    fn conversion_results(&self, src: &ResolvedType, src_type: &TypeSymbol, names: &[&str]) -> Vec<ResolvedType> {
        names
            .iter()
            .flat_map(|name| self.table.member_functions(src_type, name))
            .filter(|function| function.parameters().is_empty())
            .filter_map(|function| {
                function
                    .return_type
                    .get()
                    .cloned()
                    .flatten()
                    .and_then(|ty| ty.substitute(src.template_translator.as_ref()))
            })
            .collect()
    }

    /// Conversion through `opImplConv`/`opConv`. A primitive result is
    /// preferred; otherwise an object result is converted further, each hop
    /// adding [`ConversionCost::OBJ_TO_PRIMITIVE`].
    fn object_to_primitive(
        &self,
        src: &ResolvedType,
        src_type: &Rc<TypeSymbol>,
        dest: &ResolvedType,
        dest_type: &Rc<TypeSymbol>,
        dest_kind: PrimitiveKind,
    ) -> Option<ConversionCost> {
        let results = self.conversion_results(src, src_type, &["opImplConv", "opConv"]);
        let direct = if dest_kind.is_number() {
            conversion_preference(dest_kind).into_iter().find_map(|kind| {
                results
                    .iter()
                    .any(|result| result.is_primitive_kind(kind))
                    .then(|| primitive_cost(kind, dest_kind))
                    .flatten()
            })
        } else {
            results
                .iter()
                .any(|result| result.is_primitive_kind(dest_kind))
                .then_some(ConversionCost::NO_CONV)
        };
        if let Some(cost) = direct {
            return Some(ConversionCost::OBJ_TO_PRIMITIVE + cost);
        }

        self.guarded(src_type, dest_type, || {
            results
                .iter()
                .filter(|result| result.type_symbol().is_some_and(|symbol| !symbol.is_primitive()))
                .filter_map(|result| self.evaluate(result, dest))
                .min()
                .map(|cost| ConversionCost::OBJ_TO_PRIMITIVE + cost)
        })
    }

    fn converts_to_object(&self, src: &ResolvedType, src_type: &TypeSymbol, dest: &ResolvedType) -> bool {
        let names: &[&str] = if dest.is_handle {
            &["opImplCast", "opImplConv", "opConv"]
        } else {
            &["opImplConv", "opConv"]
        };
        self.conversion_results(src, src_type, names)
            .iter()
            .any(|result| result.is_same_type(dest))
    }

    /// Conversion through a single-argument constructor of `dest`.
    fn constructor_conversion(
        &self,
        src: &ResolvedType,
        src_type: &Rc<TypeSymbol>,
        dest: &ResolvedType,
        dest_type: &Rc<TypeSymbol>,
    ) -> Option<ConversionCost> {
        if !dest_type.is_class() {
            return None;
        }
        self.guarded(src_type, dest_type, || {
            self.table
                .member_functions(dest_type, &dest_type.identifier)
                .iter()
                .filter(|constructor| accepts_single_argument(constructor))
                .filter_map(|constructor| {
                    let parameter = constructor
                        .parameter_types
                        .get()?
                        .first()?
                        .as_ref()?
                        .substitute(dest.template_translator.as_ref())?;
                    if parameter.is_same_type(dest) {
                        return None;
                    }
                    self.evaluate(src, &parameter)
                })
                .min()
                .map(|cost| ConversionCost::TO_OBJECT + cost)
        })
    }
}

fn is_variable_destination(ty: &TypeSymbol) -> bool {
    ty.is_primitive_kind(PrimitiveKind::Any) || ty.is_primitive_kind(PrimitiveKind::Auto)
}

fn accepts_single_argument(constructor: &FunctionSymbol) -> bool {
    let parameters = constructor.parameters();
    !parameters.is_empty()
        && !parameters[0].is_variadic
        && parameters[1..].iter().all(|p| p.has_default)
}

/// Funcdef-to-funcdef (or function-to-funcdef) compatibility: same arity,
/// same parameter types and same return type.
fn compatible_signatures(src: &FunctionSymbol, dest: &FunctionSymbol) -> bool {
    let (Some(src_parameters), Some(dest_parameters)) = (src.parameter_types.get(), dest.parameter_types.get()) else {
        return false;
    };
    let same = |a: Option<&ResolvedType>, b: Option<&ResolvedType>| match (a, b) {
        (Some(a), Some(b)) => a.is_same_type(b),
        (None, None) => true,
        _ => false,
    };
    src_parameters.len() == dest_parameters.len()
        && src_parameters
            .iter()
            .zip(dest_parameters)
            .all(|(a, b)| same(a.as_ref(), b.as_ref()))
        && same(
            src.return_type.get().and_then(Option::as_ref),
            dest.return_type.get().and_then(Option::as_ref),
        )
}

fn primitive_cost(src: PrimitiveKind, dest: PrimitiveKind) -> Option<ConversionCost> {
    if src == dest {
        return Some(ConversionCost::NO_CONV);
    }
    if !src.is_number() || !dest.is_number() {
        return None;
    }
    Some(match (src.is_float(), dest.is_float()) {
        (true, true) | (false, false) if src.is_signed_integer() == dest.is_signed_integer() => {
            if dest.size() > src.size() {
                ConversionCost::PRIMITIVE_SIZE_UP
            } else {
                ConversionCost::PRIMITIVE_SIZE_DOWN
            }
        }
        (false, true) => ConversionCost::INT_TO_FLOAT,
        (true, false) => ConversionCost::FLOAT_TO_INT,
        _ if dest.size() < src.size() => ConversionCost::SIGN_CHANGE_NARROWING,
        _ if src.is_signed_integer() => ConversionCost::SIGNED_TO_UNSIGNED,
        _ => ConversionCost::UNSIGNED_TO_SIGNED,
    })
}

fn enum_to_primitive(dest: PrimitiveKind) -> Option<ConversionCost> {
    match dest {
        PrimitiveKind::Int32 => Some(ConversionCost::ENUM_SAME_SIZE),
        kind if kind.is_integer() => Some(ConversionCost::ENUM_DIFF_SIZE),
        kind if kind.is_float() => Some(ConversionCost::INT_TO_FLOAT),
        _ => None,
    }
}
