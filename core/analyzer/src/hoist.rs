//! Hoisting
//!
//! The first phase declares every name of a file before any body is looked
//! at, so declarations may be used before they appear in the source.
//!
//! The main pass walks the definitions top-down and creates symbols and
//! scopes only. Anything that needs to resolve a type name is queued as a
//! [`HoistTask`] and run after the main pass, in FIFO order:
//!
//! ```text
//! main pass            ClassBases, ClassMembers, VariableType ...
//!   ClassMembers  ──►  FunctionSignature, VariableType
//! queue drained   ──►  copy base members of every class
//! ```
//!
//! Base members are copied last, so an inherited method can be compared with
//! the resolved signatures of the methods the class declares itself.
//!
//! Bodies and initializers are queued as [`AnalyzeTask`]s for the second
//! phase.

use std::rc::Rc;

use angelscript_ast::nodes::{
    AccessModifier, ClassDefinition, ClassMember, Definition, EnumDefinition, FuncDefDefinition,
    FunctionDefinition, Identifier, InterfaceDefinition, MixinDefinition, NamespaceDefinition, Script,
    TypeRef, TypedefDefinition, VariableDefinition, VirtualPropertyDefinition,
};
use tracing::debug;

use crate::{
    errors::{AnalyzerError, SemanticError},
    resolved_type::ResolvedType,
    session::{AnalyzeTask, HoistTask, Session},
    symbol::{
        AssignOnce, FunctionNode, FunctionOverloadSet, FunctionSymbol, PrimitiveKind, Symbol, TypeDefinition,
        TypeSymbol, VariableSymbol,
    },
    symbol_table::{ScopeId, ScopeNode},
};

impl Session {
    pub(crate) fn hoist_script(&mut self, script: &Script) -> Result<(), AnalyzerError> {
        let root = self.table.root();
        self.info
            .push_scope_region(script.location.clone(), self.scope_path(root));
        self.hoist_definitions(root, &script.definitions);
        debug!(queued = self.hoist_queue.len(), "hoist main pass finished");

        let mut processed = 0usize;
        while let Some(task) = self.hoist_queue.pop_front() {
            self.run_hoist_task(task)?;
            processed += 1;
        }
        while let Some(symbol) = self.base_copy_queue.pop_front() {
            self.copy_base_members(&symbol)?;
            processed += 1;
        }
        debug!(processed, pending_analysis = self.analyze_queue.len(), "hoist queue drained");
        Ok(())
    }

    fn run_hoist_task(&mut self, task: HoistTask) -> Result<(), AnalyzerError> {
        match task {
            HoistTask::ClassBases { scope, symbol, bases } => self.hoist_class_bases(scope, &symbol, &bases),
            HoistTask::ClassMembers {
                scope,
                members,
                is_interface,
            } => {
                for member in &members {
                    self.hoist_class_member(scope, member, is_interface);
                }
                Ok(())
            }
            HoistTask::FunctionSignature { scope, function } => self.hoist_function_signature(scope, &function),
            HoistTask::VariableType { scope, variable, ty } => {
                let resolved = self.resolve_type(scope, &ty);
                variable.ty.assign(resolved, "type", &variable.identifier)
            }
        }
    }

    fn hoist_definitions(&mut self, scope: ScopeId, definitions: &[Definition]) {
        for definition in definitions {
            match definition {
                Definition::Namespace(namespace) => self.hoist_namespace(scope, namespace),
                Definition::Enum(enumeration) => self.hoist_enum(scope, enumeration),
                Definition::Class(class) => {
                    self.hoist_class(scope, class, TypeDefinition::Class(class.clone()));
                }
                Definition::Mixin(mixin) => self.hoist_mixin(scope, mixin),
                Definition::Interface(interface) => self.hoist_interface(scope, interface),
                Definition::Typedef(typedef) => self.hoist_typedef(scope, typedef),
                Definition::FuncDef(funcdef) => self.hoist_funcdef(scope, funcdef),
                Definition::Function(function) => self.hoist_function(scope, function, false),
                Definition::Variable(variable) => self.hoist_variable(scope, variable, false),
                Definition::VirtualProperty(property) => self.hoist_virtual_property(scope, property, false),
                Definition::Import(import) => self.hoist_function(scope, &import.function, false),
            }
        }
    }

    fn hoist_namespace(&mut self, scope: ScopeId, namespace: &NamespaceDefinition) {
        let mut current = scope;
        for name in &namespace.names {
            if matches!(self.table.lookup(current, &name.name), Some(Symbol::Functions(_))) {
                self.error(&name.location, SemanticError::FunctionReusedAsNamespace {
                    name: name.name.clone(),
                });
                return;
            }
            current = self
                .table
                .create_child(current, &name.name, Some(ScopeNode::Namespace));
        }
        self.info
            .push_scope_region(namespace.location.clone(), self.scope_path(current));
        self.hoist_definitions(current, &namespace.definitions);
    }

    fn hoist_enum(&mut self, scope: ScopeId, enumeration: &Rc<EnumDefinition>) {
        let name = enumeration.name.name();
        let declared_scope = self.scope_path(scope);
        let symbol = Rc::new(TypeSymbol {
            identifier: name.clone(),
            location: Some(enumeration.name.location.clone()),
            members_scope: Some(declared_scope.child(&name)),
            declared_scope,
            definition: Some(TypeDefinition::Enum(enumeration.clone())),
            template_parameters: vec![],
            base_list: AssignOnce::resolved(vec![]),
            is_type_parameter: false,
            primitive: None,
            enum_candidates: vec![],
        });
        if !self.declare(scope, &name, &enumeration.name.location, Symbol::Type(symbol.clone())) {
            return;
        }
        let enum_scope = self
            .table
            .create_child(scope, &name, Some(ScopeNode::Enum(symbol.clone())));
        let members_path = self.scope_path(enum_scope);
        let enum_type = ResolvedType::from_type(symbol.clone());

        for member in &enumeration.members {
            let variable = Rc::new(
                VariableSymbol::new(&member.name.name, Some(member.name.location.clone()), members_path.clone())
                    .with_type(Some(enum_type.clone())),
            );
            if !self.declare(
                enum_scope,
                &member.name.name,
                &member.name.location,
                Symbol::Variable(variable.clone()),
            ) {
                continue;
            }
            if let Some(value) = &member.value {
                self.analyze_queue.push_back(AnalyzeTask::EnumValue {
                    scope: enum_scope,
                    value: value.clone(),
                });
            }
            if self.config.hoist_enum_parent_scope {
                self.hoist_enum_member_into_parent(scope, &symbol, &member.name, variable);
            }
        }
    }

    /// Declares an enum member in the scope enclosing its enum. A name
    /// already taken by another enum's member becomes ambiguous and only
    /// resolves where an enum type is expected.
    fn hoist_enum_member_into_parent(
        &mut self,
        scope: ScopeId,
        enumeration: &Rc<TypeSymbol>,
        name: &Identifier,
        variable: Rc<VariableSymbol>,
    ) {
        let existing = self.table.lookup(scope, &name.name).cloned();
        let Some(existing) = existing else {
            self.declare(scope, &name.name, &name.location, Symbol::Variable(variable));
            return;
        };
        let candidates = existing
            .as_variable()
            .and_then(|v| v.resolved_type())
            .and_then(ResolvedType::type_symbol)
            .and_then(|ty| {
                if ty.is_enum() {
                    Some(vec![ty.clone()])
                } else if ty.is_ambiguous_enum_member() {
                    Some(ty.enum_candidates.clone())
                } else {
                    None
                }
            });
        let Some(mut candidates) = candidates else {
            self.error(&name.location, SemanticError::AlreadyDeclared {
                name: name.name.clone(),
            });
            return;
        };
        candidates.push(enumeration.clone());
        let pseudo = Rc::new(TypeSymbol::ambiguous_enum_member(&name.name, candidates));
        let merged = VariableSymbol::new(&name.name, None, self.scope_path(scope))
            .with_type(Some(ResolvedType::from_type(pseudo)));
        self.table
            .replace(scope, &name.name, Symbol::Variable(Rc::new(merged)));
    }

    fn hoist_mixin(&mut self, scope: ScopeId, mixin: &Rc<MixinDefinition>) {
        self.hoist_class(scope, &mixin.class, TypeDefinition::Mixin(mixin.clone()));
    }

    fn hoist_class(&mut self, scope: ScopeId, class: &Rc<ClassDefinition>, definition: TypeDefinition) {
        let name = class.name();
        let declared_scope = self.scope_path(scope);
        let symbol = Rc::new(TypeSymbol {
            identifier: name.clone(),
            location: Some(class.name.location.clone()),
            members_scope: Some(declared_scope.child(&name)),
            declared_scope,
            definition: Some(definition),
            template_parameters: class.template_parameters.iter().map(|p| p.name()).collect(),
            base_list: AssignOnce::new(),
            is_type_parameter: false,
            primitive: None,
            enum_candidates: vec![],
        });
        if !self.declare(scope, &name, &class.name.location, Symbol::Type(symbol.clone())) {
            return;
        }
        let class_scope = self
            .table
            .create_child(scope, &name, Some(ScopeNode::Class(symbol.clone())));
        let members_path = self.scope_path(class_scope);
        self.info
            .push_scope_region(class.location.clone(), members_path.clone());

        for parameter in &class.template_parameters {
            let parameter_type = TypeSymbol::type_parameter(&parameter.name, parameter.location.clone(), members_path.clone());
            self.declare(class_scope, &parameter.name, &parameter.location, Symbol::Type(Rc::new(parameter_type)));
        }
        let this = VariableSymbol::new("this", None, members_path)
            .with_type(Some(ResolvedType::from_type(symbol.clone()).with_handle(true)));
        self.declare(class_scope, "this", &class.name.location, Symbol::Variable(Rc::new(this)));

        self.hoist_queue.push_back(HoistTask::ClassBases {
            scope: class_scope,
            symbol,
            bases: class.bases.clone(),
        });
        self.hoist_queue.push_back(HoistTask::ClassMembers {
            scope: class_scope,
            members: class.members.clone(),
            is_interface: false,
        });
    }

    fn hoist_interface(&mut self, scope: ScopeId, interface: &Rc<InterfaceDefinition>) {
        let name = interface.name.name();
        let declared_scope = self.scope_path(scope);
        let symbol = Rc::new(TypeSymbol {
            identifier: name.clone(),
            location: Some(interface.name.location.clone()),
            members_scope: Some(declared_scope.child(&name)),
            declared_scope,
            definition: Some(TypeDefinition::Interface(interface.clone())),
            template_parameters: vec![],
            base_list: AssignOnce::new(),
            is_type_parameter: false,
            primitive: None,
            enum_candidates: vec![],
        });
        if !self.declare(scope, &name, &interface.name.location, Symbol::Type(symbol.clone())) {
            return;
        }
        let interface_scope = self
            .table
            .create_child(scope, &name, Some(ScopeNode::Interface(symbol.clone())));
        self.info
            .push_scope_region(interface.location.clone(), self.scope_path(interface_scope));
        self.hoist_queue.push_back(HoistTask::ClassBases {
            scope: interface_scope,
            symbol,
            bases: interface.bases.clone(),
        });
        self.hoist_queue.push_back(HoistTask::ClassMembers {
            scope: interface_scope,
            members: interface.members.clone(),
            is_interface: true,
        });
    }

    fn hoist_class_bases(
        &mut self,
        scope: ScopeId,
        symbol: &Rc<TypeSymbol>,
        bases: &[Rc<TypeRef>],
    ) -> Result<(), AnalyzerError> {
        let resolved = bases
            .iter()
            .filter_map(|base| self.resolve_type(scope, base))
            .collect();
        symbol
            .base_list
            .assign(resolved, "base list", &symbol.identifier)?;
        if symbol.is_class() {
            self.base_copy_queue.push_back(symbol.clone());
        }
        Ok(())
    }

    fn hoist_class_member(&mut self, scope: ScopeId, member: &ClassMember, is_interface: bool) {
        match member {
            ClassMember::Function(function) => self.hoist_function(scope, function, true),
            ClassMember::Variable(variable) if !is_interface => self.hoist_variable(scope, variable, true),
            ClassMember::Variable(_) => {}
            ClassMember::VirtualProperty(property) => self.hoist_virtual_property(scope, property, true),
            ClassMember::FuncDef(funcdef) => self.hoist_funcdef(scope, funcdef),
        }
    }

    /// Makes inherited members visible in the class scope.
    ///
    /// Bases are completed first, so members a base inherited itself are
    /// passed on. Private members of class bases stay behind; mixins give
    /// everything. Interface methods are not copied, and names the class
    /// declares itself are kept.
    fn copy_base_members(&mut self, symbol: &Rc<TypeSymbol>) -> Result<(), AnalyzerError> {
        let Some(definition) = &symbol.definition else {
            return Ok(());
        };
        if !self.copied_bases.insert(definition.id()) {
            return Ok(());
        }
        let Some(scope) = symbol
            .members_scope
            .as_ref()
            .and_then(|path| self.table.scope_by_path(path))
        else {
            return Ok(());
        };

        let bases = symbol.base_list.get().cloned().unwrap_or_default();
        let mut super_declared = false;
        for base in bases {
            let Some(base_symbol) = base.type_symbol().cloned() else {
                continue;
            };
            if !(base_symbol.is_class() || base_symbol.is_mixin()) {
                continue;
            }
            if base_symbol.is_class() {
                self.copy_base_members(&base_symbol)?;
            }
            let Some(base_scope) = base_symbol
                .members_scope
                .as_ref()
                .and_then(|path| self.table.scope_by_path(path))
            else {
                continue;
            };
            let is_mixin = base_symbol.is_mixin();
            let inherited: Vec<(String, Symbol)> = self
                .table
                .scope(base_scope)
                .symbols()
                .filter(|(name, _)| {
                    name.as_str() != "this"
                        && name.as_str() != "super"
                        && !base_symbol.template_parameters.contains(*name)
                })
                .map(|(name, symbol)| (name.clone(), symbol.clone()))
                .collect();

            for (name, inherited) in inherited {
                let copied = match inherited {
                    Symbol::Variable(variable) => {
                        (is_mixin || variable.access != AccessModifier::Private).then_some(Symbol::Variable(variable))
                    }
                    Symbol::Functions(functions) => {
                        let overloads: Vec<Rc<FunctionSymbol>> = functions
                            .overloads()
                            .iter()
                            .filter(|f| {
                                !f.node.is_constructor()
                                    && f.identifier != base_symbol.identifier
                                    && (is_mixin || f.access != AccessModifier::Private)
                            })
                            .filter(|f| !self.overrides_existing(scope, &name, f))
                            .cloned()
                            .collect();
                        for overload in overloads {
                            let _ = self.table.insert_function(scope, overload);
                        }
                        None
                    }
                    Symbol::Type(_) => None,
                };
                if let Some(copied) = copied {
                    // The class's own declaration of the same name wins.
                    let _ = self.table.insert(scope, &name, copied);
                }
            }

            if !super_declared && base_symbol.is_class() {
                super_declared = true;
                for constructor in self
                    .table
                    .member_functions(&base_symbol, &base_symbol.identifier)
                {
                    let _ = self.table.insert(
                        scope,
                        "super",
                        Symbol::Functions(FunctionOverloadSet::new(constructor)),
                    );
                }
            }
        }
        Ok(())
    }

    /// Whether the class already declares a method with the same parameter
    /// types as the inherited `function`.
    fn overrides_existing(&self, scope: ScopeId, name: &str, function: &FunctionSymbol) -> bool {
        let Some(Symbol::Functions(own)) = self.table.lookup(scope, name) else {
            return false;
        };
        let Some(inherited) = function.parameter_types.get() else {
            return false;
        };
        own.overloads().iter().any(|candidate| {
            candidate.parameter_types.get().is_some_and(|types| {
                types.len() == inherited.len()
                    && types.iter().zip(inherited).all(|(a, b)| match (a, b) {
                        (Some(a), Some(b)) => a.is_same_type(b),
                        (None, None) => true,
                        _ => false,
                    })
            })
        })
    }

    fn hoist_typedef(&mut self, scope: ScopeId, typedef: &TypedefDefinition) {
        let Some(aliased) = self.resolve_type(scope, &typedef.ty) else {
            return;
        };
        if let Some(symbol) = aliased.type_symbol() {
            self.declare(scope, &typedef.name.name, &typedef.name.location, Symbol::Type(symbol.clone()));
        }
    }

    fn hoist_funcdef(&mut self, scope: ScopeId, funcdef: &Rc<FuncDefDefinition>) {
        let symbol = Rc::new(FunctionSymbol {
            identifier: funcdef.name.name(),
            location: funcdef.name.location.clone(),
            declared_scope: self.scope_path(scope),
            node: FunctionNode::FuncDef(funcdef.clone()),
            function_scope: None,
            return_type: AssignOnce::new(),
            parameter_types: AssignOnce::new(),
            parameter_variables: AssignOnce::new(),
            template_parameters: vec![],
            is_instance_member: false,
            access: funcdef.access,
        });
        if self.table.insert_function(scope, symbol.clone()).is_err() {
            self.error(&funcdef.name.location, SemanticError::AlreadyDeclared {
                name: funcdef.name.name(),
            });
            return;
        }
        self.hoist_queue.push_back(HoistTask::FunctionSignature {
            scope,
            function: symbol,
        });
    }

    fn hoist_function(&mut self, scope: ScopeId, function: &Rc<FunctionDefinition>, is_instance_member: bool) {
        let name = if function.is_destructor {
            format!("~{}", function.name())
        } else {
            function.name()
        };
        if let Some(existing) = self.table.child(scope, &name)
            && matches!(self.table.scope(existing).node(), Some(ScopeNode::Namespace))
        {
            self.error(&function.name.location, SemanticError::FunctionReusedAsNamespace { name });
            return;
        }

        let holder = self.table.create_child(scope, &name, None);
        let function_scope = self.table.create_anonymous(holder, None);
        let function_path = self.scope_path(function_scope);
        let symbol = Rc::new(FunctionSymbol {
            identifier: name,
            location: function.name.location.clone(),
            declared_scope: self.scope_path(scope),
            node: FunctionNode::Function(function.clone()),
            function_scope: Some(function_path.clone()),
            return_type: AssignOnce::new(),
            parameter_types: AssignOnce::new(),
            parameter_variables: AssignOnce::new(),
            template_parameters: function.template_parameters.iter().map(|p| p.name()).collect(),
            is_instance_member,
            access: function.access,
        });
        self.table
            .set_node(function_scope, ScopeNode::Function(symbol.clone()));
        if self.table.insert_function(scope, symbol.clone()).is_err() {
            self.error(&function.name.location, SemanticError::AlreadyDeclared {
                name: symbol.identifier.clone(),
            });
            return;
        }

        for parameter in &function.template_parameters {
            let parameter_type = TypeSymbol::type_parameter(&parameter.name, parameter.location.clone(), function_path.clone());
            self.declare(function_scope, &parameter.name, &parameter.location, Symbol::Type(Rc::new(parameter_type)));
        }
        self.hoist_queue.push_back(HoistTask::FunctionSignature {
            scope: function_scope,
            function: symbol.clone(),
        });
        if let Some(body) = &function.body {
            self.analyze_queue.push_back(AnalyzeTask::FunctionBody {
                scope: function_scope,
                function: symbol.clone(),
                body: body.clone(),
            });
        }
        self.synthesize_property(scope, function, is_instance_member);
    }

    /// `get_x`/`set_x` accessors make `x` usable like a variable.
    fn synthesize_property(&mut self, scope: ScopeId, function: &FunctionDefinition, is_instance_member: bool) {
        if self.config.explicit_property_accessor && !function.attributes.is_property {
            return;
        }
        let name = function.name();
        let (property, is_getter) = if let Some(property) = name.strip_prefix("get_") {
            (property, true)
        } else if let Some(property) = name.strip_prefix("set_") {
            (property, false)
        } else {
            return;
        };
        let arity = function.parameters.len();
        let well_formed = if is_getter {
            arity <= 1 && function.return_type.as_ref().is_some_and(|ty| ty.name() != "void")
        } else {
            (1..=2).contains(&arity)
        };
        if property.is_empty() || !well_formed {
            return;
        }
        if self.table.lookup(scope, property).is_some() {
            return;
        }
        let variable = VariableSymbol {
            is_instance_member,
            access: function.access,
            is_virtual_property: true,
            indexed_property_accessor: if is_getter { arity == 1 } else { arity == 2 },
            ..VariableSymbol::new(property, None, self.scope_path(scope))
        };
        let _ = self
            .table
            .insert(scope, property, Symbol::Variable(Rc::new(variable)));
    }

    fn hoist_virtual_property(&mut self, scope: ScopeId, property: &Rc<VirtualPropertyDefinition>, is_instance_member: bool) {
        let name = property.name();
        let variable = Rc::new(VariableSymbol {
            is_instance_member,
            access: property.access,
            is_virtual_property: true,
            ..VariableSymbol::new(&name, Some(property.name.location.clone()), self.scope_path(scope))
        });
        if !self.declare(scope, &name, &property.name.location, Symbol::Variable(variable.clone())) {
            return;
        }
        self.hoist_queue.push_back(HoistTask::VariableType {
            scope,
            variable,
            ty: property.ty.clone(),
        });

        let accessors = [
            (&property.getter, "get_", FunctionNode::Getter(property.clone())),
            (&property.setter, "set_", FunctionNode::Setter(property.clone())),
        ];
        for (accessor, prefix, node) in accessors {
            let Some(accessor) = accessor else {
                continue;
            };
            let accessor_name = format!("{prefix}{name}");
            let holder = self.table.create_child(scope, &accessor_name, None);
            let function_scope = self.table.create_anonymous(holder, None);
            let symbol = Rc::new(FunctionSymbol {
                identifier: accessor_name,
                location: property.name.location.clone(),
                declared_scope: self.scope_path(scope),
                node,
                function_scope: Some(self.scope_path(function_scope)),
                return_type: AssignOnce::new(),
                parameter_types: AssignOnce::new(),
                parameter_variables: AssignOnce::new(),
                template_parameters: vec![],
                is_instance_member,
                access: property.access,
            });
            self.table
                .set_node(function_scope, ScopeNode::Function(symbol.clone()));
            if self.table.insert_function(scope, symbol.clone()).is_err() {
                self.error(&property.name.location, SemanticError::AlreadyDeclared {
                    name: symbol.identifier.clone(),
                });
                continue;
            }
            self.hoist_queue.push_back(HoistTask::FunctionSignature {
                scope: function_scope,
                function: symbol.clone(),
            });
            if let Some(body) = &accessor.body {
                self.analyze_queue.push_back(AnalyzeTask::FunctionBody {
                    scope: function_scope,
                    function: symbol,
                    body: body.clone(),
                });
            }
        }
    }

    fn hoist_variable(&mut self, scope: ScopeId, definition: &Rc<VariableDefinition>, is_instance_member: bool) {
        let is_auto = definition.ty.is_auto();
        for declarator in &definition.declarators {
            let variable = Rc::new(VariableSymbol {
                is_instance_member,
                access: definition.access,
                ..VariableSymbol::new(
                    &declarator.name.name,
                    Some(declarator.name.location.clone()),
                    self.scope_path(scope),
                )
            });
            if !self.declare(
                scope,
                &declarator.name.name,
                &declarator.name.location,
                Symbol::Variable(variable.clone()),
            ) {
                continue;
            }
            if !is_auto {
                self.hoist_queue.push_back(HoistTask::VariableType {
                    scope,
                    variable: variable.clone(),
                    ty: definition.ty.clone(),
                });
            }
            if is_auto || declarator.initializer.is_some() {
                self.analyze_queue.push_back(AnalyzeTask::VariableInitializer {
                    scope,
                    variable,
                    ty: definition.ty.clone(),
                    initializer: declarator.initializer.clone(),
                });
            }
        }
    }

    /// Resolves return and parameter types, and declares the parameters in
    /// the function scope.
    fn hoist_function_signature(&mut self, scope: ScopeId, function: &Rc<FunctionSymbol>) -> Result<(), AnalyzerError> {
        let (return_type, parameter_types, parameter_variables) = match &function.node {
            FunctionNode::Function(definition) => {
                let return_type = if definition.is_constructor() {
                    self.class_type_of(function)
                } else if definition.is_destructor {
                    Some(self.builtin_type(PrimitiveKind::Void))
                } else {
                    definition
                        .return_type
                        .as_ref()
                        .and_then(|ty| self.resolve_type(scope, ty))
                };
                let mut parameter_types = Vec::with_capacity(definition.parameters.len());
                let mut parameter_variables = Vec::with_capacity(definition.parameters.len());
                for parameter in &definition.parameters {
                    let ty = self.resolve_type(scope, &parameter.ty);
                    if let Some(name) = &parameter.name {
                        let variable = Rc::new(
                            VariableSymbol::new(&name.name, Some(name.location.clone()), self.scope_path(scope))
                                .with_type(ty.clone()),
                        );
                        if self.declare(scope, &name.name, &name.location, Symbol::Variable(variable.clone())) {
                            parameter_variables.push(variable);
                        }
                    }
                    parameter_types.push(ty);
                }
                (return_type, parameter_types, parameter_variables)
            }
            FunctionNode::FuncDef(definition) => {
                let return_type = self.resolve_type(scope, &definition.return_type);
                let parameter_types = definition
                    .parameters
                    .iter()
                    .map(|parameter| self.resolve_type(scope, &parameter.ty))
                    .collect();
                (return_type, parameter_types, vec![])
            }
            FunctionNode::Getter(property) => (self.resolve_type(scope, &property.ty), vec![], vec![]),
            FunctionNode::Setter(property) => {
                let ty = self.resolve_type(scope, &property.ty);
                let value = Rc::new(
                    VariableSymbol::new("value", Some(property.name.location.clone()), self.scope_path(scope))
                        .with_type(ty.clone()),
                );
                let declared = self.declare(scope, "value", &property.name.location, Symbol::Variable(value.clone()));
                let variables = if declared { vec![value] } else { vec![] };
                (Some(self.builtin_type(PrimitiveKind::Void)), vec![ty], variables)
            }
        };

        if let FunctionNode::Function(definition) = &function.node {
            self.assign_property_type(function, definition, return_type.as_ref(), &parameter_types)?;
        }
        function
            .return_type
            .assign(return_type, "return type", &function.identifier)?;
        function
            .parameter_variables
            .assign(parameter_variables, "parameter variables", &function.identifier)?;
        function
            .parameter_types
            .assign(parameter_types, "parameter types", &function.identifier)
    }

    /// Gives a synthesized property the type of whichever accessor is
    /// resolved first.
    fn assign_property_type(
        &mut self,
        function: &FunctionSymbol,
        definition: &FunctionDefinition,
        return_type: Option<&ResolvedType>,
        parameter_types: &[Option<ResolvedType>],
    ) -> Result<(), AnalyzerError> {
        let (property, ty) = if let Some(property) = function.identifier.strip_prefix("get_") {
            (property, return_type.cloned())
        } else if let Some(property) = function.identifier.strip_prefix("set_") {
            (property, parameter_types.last().cloned().flatten())
        } else {
            return Ok(());
        };
        let Some(scope) = self.table.scope_by_path(&function.declared_scope) else {
            return Ok(());
        };
        let Some(Symbol::Variable(variable)) = self.table.lookup(scope, property) else {
            return Ok(());
        };
        if !variable.is_virtual_property || variable.location.is_some() || variable.ty.is_assigned() {
            return Ok(());
        }
        if self.config.explicit_property_accessor && !definition.attributes.is_property {
            return Ok(());
        }
        variable.ty.assign(ty, "type", &variable.identifier)
    }

    /// Type a constructor of the enclosing class evaluates to.
    fn class_type_of(&self, function: &FunctionSymbol) -> Option<ResolvedType> {
        let scope = self.table.scope_by_path(&function.declared_scope)?;
        match self.table.scope(scope).node() {
            Some(ScopeNode::Class(symbol)) => Some(ResolvedType::from_type(symbol.clone())),
            _ => None,
        }
    }
}
