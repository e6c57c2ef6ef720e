use std::rc::Rc;

use super::nodes::{
    ArgumentList, AssignOperator, BinaryOperator, ClassDefinition, ClassMember,
    Expression, FunctionDefinition, Identifier, Parameter, PostfixOperator,
    ScopeQualifier, TypeModifier, TypeRef, UnaryOperator, VirtualPropertyDefinition,
};

impl Identifier {
    #[must_use]
    pub fn name(&self) -> String {
        self.name.clone()
    }
}

impl ScopeQualifier {
    #[must_use]
    pub fn segment_names(&self) -> Vec<String> {
        self.segments.iter().map(|s| s.name()).collect()
    }
}

impl TypeRef {
    #[must_use]
    pub fn name(&self) -> String {
        self.name.name()
    }

    /// Whether the outermost modifier makes the type a handle.
    #[must_use]
    pub fn is_handle(&self) -> bool {
        self.modifiers.last() == Some(&TypeModifier::Handle)
    }

    #[must_use]
    pub fn is_auto(&self) -> bool {
        self.scope.is_none() && self.modifiers.is_empty() && self.name.name == "auto"
    }
}

impl ClassDefinition {
    #[must_use]
    pub fn name(&self) -> String {
        self.name.name()
    }

    /// Constructors declared in the class body, in declaration order.
    pub fn constructors(&self) -> impl Iterator<Item = &Rc<FunctionDefinition>> {
        self.members.iter().filter_map(|member| match member {
            ClassMember::Function(function) if function.is_constructor() => Some(function),
            _ => None,
        })
    }
}

impl FunctionDefinition {
    #[must_use]
    pub fn name(&self) -> String {
        self.name.name()
    }

    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none() && !self.is_destructor
    }
}

impl Parameter {
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default_value.is_some()
    }

    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.name.as_ref().map(|n| n.name())
    }
}

impl VirtualPropertyDefinition {
    #[must_use]
    pub fn name(&self) -> String {
        self.name.name()
    }
}

impl ArgumentList {
    #[must_use]
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }
}

impl Expression {
    /// Strips any number of enclosing parentheses.
    #[must_use]
    pub fn unparenthesized(&self) -> &Expression {
        let mut current = self;
        while let Expression::Parenthesized(inner) = current {
            current = &inner.expression;
        }
        current
    }
}

impl BinaryOperator {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Pow => "**",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::Shl => "<<",
            BinaryOperator::Shr => ">>",
            BinaryOperator::UShr => ">>>",
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::Xor => "^^",
            BinaryOperator::Is => "is",
            BinaryOperator::NotIs => "!is",
        }
    }
}

impl UnaryOperator {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Neg => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::Not => "!",
            UnaryOperator::BitNot => "~",
            UnaryOperator::PreInc => "++",
            UnaryOperator::PreDec => "--",
            UnaryOperator::Handle => "@",
        }
    }
}

impl PostfixOperator {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PostfixOperator::Inc => "++",
            PostfixOperator::Dec => "--",
        }
    }
}

impl AssignOperator {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOperator::Assign => "=",
            AssignOperator::Add => "+=",
            AssignOperator::Sub => "-=",
            AssignOperator::Mul => "*=",
            AssignOperator::Div => "/=",
            AssignOperator::Mod => "%=",
            AssignOperator::Pow => "**=",
            AssignOperator::BitAnd => "&=",
            AssignOperator::BitOr => "|=",
            AssignOperator::BitXor => "^=",
            AssignOperator::Shl => "<<=",
            AssignOperator::Shr => ">>=",
            AssignOperator::UShr => ">>>=",
        }
    }

    /// The arithmetic operator a compound assignment applies, `None` for plain `=`.
    #[must_use]
    pub fn binary_operator(&self) -> Option<BinaryOperator> {
        match self {
            AssignOperator::Assign => None,
            AssignOperator::Add => Some(BinaryOperator::Add),
            AssignOperator::Sub => Some(BinaryOperator::Sub),
            AssignOperator::Mul => Some(BinaryOperator::Mul),
            AssignOperator::Div => Some(BinaryOperator::Div),
            AssignOperator::Mod => Some(BinaryOperator::Mod),
            AssignOperator::Pow => Some(BinaryOperator::Pow),
            AssignOperator::BitAnd => Some(BinaryOperator::BitAnd),
            AssignOperator::BitOr => Some(BinaryOperator::BitOr),
            AssignOperator::BitXor => Some(BinaryOperator::BitXor),
            AssignOperator::Shl => Some(BinaryOperator::Shl),
            AssignOperator::Shr => Some(BinaryOperator::Shr),
            AssignOperator::UShr => Some(BinaryOperator::UShr),
        }
    }
}
