//! Body analysis: drains the analyze queue filled while hoisting and checks
//! statements. Every name of the file is declared by now, so bodies may use
//! anything regardless of declaration order.

use std::rc::Rc;

use angelscript_ast::nodes::{
    ReturnStatement, Statement, StatementBlock, SwitchStatement, TypeRef, VariableDefinition,
    VariableInitializer,
};
use tracing::debug;

use crate::{
    errors::{AnalyzerError, SemanticError},
    resolved_type::ResolvedType,
    session::{AnalyzeTask, Session},
    symbol::{FunctionNode, FunctionSymbol, PrimitiveKind, Symbol, VariableSymbol},
    symbol_table::{ScopeId, ScopeNode},
};

impl Session {
    /// Runs every queued body analysis in order.
    ///
    /// # Errors
    ///
    /// Fails on analyzer bugs only.
    pub(crate) fn run_analyze_tasks(&mut self) -> Result<(), AnalyzerError> {
        let mut processed = 0usize;
        while let Some(task) = self.analyze_queue.pop_front() {
            processed += 1;
            match task {
                AnalyzeTask::FunctionBody { scope, function, body } => {
                    self.analyze_function_body(scope, &function, &body)?;
                }
                AnalyzeTask::VariableInitializer {
                    scope,
                    variable,
                    ty,
                    initializer,
                } => self.analyze_variable_initializer(scope, &variable, &ty, initializer.as_ref())?,
                AnalyzeTask::EnumValue { scope, value } => {
                    let int = self.builtin_type(PrimitiveKind::Int32);
                    self.check_expression(scope, &value, Some(&int))?;
                }
            }
        }
        debug!(processed, diagnostics = self.diagnostics.len(), "analyze queue drained");
        Ok(())
    }

    fn analyze_function_body(
        &mut self,
        scope: ScopeId,
        function: &FunctionSymbol,
        body: &StatementBlock,
    ) -> Result<(), AnalyzerError> {
        self.info
            .push_scope_region(body.location.clone(), self.scope_path(scope));

        if let FunctionNode::Function(definition) = &function.node {
            // Defaults are evaluated where the function is declared.
            let outer = self.table.parent(scope).unwrap_or(scope);
            let parameter_types = function.parameter_types()?.to_vec();
            for (parameter, ty) in definition.parameters.iter().zip(parameter_types) {
                if let Some(default) = &parameter.default_value {
                    self.check_expression(outer, default, ty.as_ref())?;
                }
            }
        }

        for statement in &body.statements {
            self.analyze_statement(scope, statement)?;
        }
        Ok(())
    }

    /// Checks an initializer against the declared type, or infers the type
    /// of an `auto` variable from it.
    fn analyze_variable_initializer(
        &mut self,
        scope: ScopeId,
        variable: &VariableSymbol,
        ty: &TypeRef,
        initializer: Option<&VariableInitializer>,
    ) -> Result<(), AnalyzerError> {
        if ty.is_auto() {
            let inferred = match initializer {
                Some(VariableInitializer::Expression(value)) => self.analyze_expression(scope, value, None)?,
                Some(VariableInitializer::Arguments(arguments)) => {
                    self.evaluate_arguments(scope, arguments)?;
                    None
                }
                None => {
                    if let Some(location) = &variable.location {
                        self.error(location, SemanticError::AutoWithoutInitializer {
                            name: variable.identifier.clone(),
                        });
                    }
                    None
                }
            };
            if let (Some(inferred), Some(location)) = (&inferred, &variable.location) {
                self.info.push_auto_type(location.clone(), inferred.clone());
            }
            return variable.ty.assign(inferred, "type", &variable.identifier);
        }

        let declared = variable.resolved_type().cloned();
        match initializer {
            Some(VariableInitializer::Expression(value)) => {
                self.check_expression(scope, value, declared.as_ref())?;
            }
            Some(VariableInitializer::Arguments(arguments)) => match declared {
                Some(declared) => {
                    self.check_constructor_call(scope, declared, arguments, &arguments.location)?;
                }
                None => {
                    self.evaluate_arguments(scope, arguments)?;
                }
            },
            None => {}
        }
        Ok(())
    }

    fn analyze_local_variables(&mut self, scope: ScopeId, definition: &VariableDefinition) -> Result<(), AnalyzerError> {
        let declared = if definition.ty.is_auto() {
            None
        } else {
            Some(self.resolve_type(scope, &definition.ty))
        };
        for declarator in &definition.declarators {
            let mut variable = VariableSymbol::new(
                &declarator.name.name,
                Some(declarator.name.location.clone()),
                self.scope_path(scope),
            );
            if let Some(declared) = &declared {
                variable = variable.with_type(declared.clone());
            }
            let variable = Rc::new(variable);
            self.analyze_variable_initializer(scope, &variable, &definition.ty, declarator.initializer.as_ref())?;
            self.declare(
                scope,
                &declarator.name.name,
                &declarator.name.location,
                Symbol::Variable(variable),
            );
        }
        Ok(())
    }

    fn analyze_block(&mut self, scope: ScopeId, block: &StatementBlock) -> Result<(), AnalyzerError> {
        let block_scope = self.table.create_anonymous(scope, None);
        self.info
            .push_scope_region(block.location.clone(), self.scope_path(block_scope));
        for statement in &block.statements {
            self.analyze_statement(block_scope, statement)?;
        }
        Ok(())
    }

    pub(crate) fn analyze_statement(&mut self, scope: ScopeId, statement: &Statement) -> Result<(), AnalyzerError> {
        match statement {
            Statement::Block(block) => self.analyze_block(scope, block)?,
            Statement::Variable(definition) => self.analyze_local_variables(scope, definition)?,
            Statement::If(statement) => {
                self.check_condition(scope, &statement.condition)?;
                self.analyze_statement(scope, &statement.then_branch)?;
                if let Some(else_branch) = &statement.else_branch {
                    self.analyze_statement(scope, else_branch)?;
                }
            }
            Statement::For(statement) => {
                let for_scope = self.table.create_anonymous(scope, None);
                self.info
                    .push_scope_region(statement.location.clone(), self.scope_path(for_scope));
                if let Some(initializer) = &statement.initializer {
                    self.analyze_statement(for_scope, initializer)?;
                }
                if let Some(condition) = &statement.condition {
                    self.check_condition(for_scope, condition)?;
                }
                for increment in &statement.increments {
                    self.analyze_expression(for_scope, increment, None)?;
                }
                self.analyze_statement(for_scope, &statement.body)?;
            }
            Statement::While(statement) => {
                self.check_condition(scope, &statement.condition)?;
                self.analyze_statement(scope, &statement.body)?;
            }
            Statement::DoWhile(statement) => {
                self.analyze_statement(scope, &statement.body)?;
                self.check_condition(scope, &statement.condition)?;
            }
            Statement::Switch(statement) => self.analyze_switch(scope, statement)?,
            Statement::Return(statement) => self.analyze_return(scope, statement)?,
            Statement::Break(_) | Statement::Continue(_) => {}
            Statement::Try(statement) => {
                self.analyze_block(scope, &statement.try_block)?;
                self.analyze_block(scope, &statement.catch_block)?;
            }
            Statement::Expression(statement) => {
                if let Some(expression) = &statement.expression {
                    self.analyze_expression(scope, expression, None)?;
                }
            }
        }
        Ok(())
    }

    fn analyze_switch(&mut self, scope: ScopeId, switch: &SwitchStatement) -> Result<(), AnalyzerError> {
        let value = self.analyze_expression(scope, &switch.value, None)?;
        if let Some(found) = &value
            && !found
                .type_symbol()
                .and_then(|symbol| symbol.numeric_kind())
                .is_some_and(PrimitiveKind::is_integer)
        {
            self.error(&switch.value.location(), SemanticError::InvalidSwitchValue {
                found: found.signature(),
            });
        }

        let switch_scope = self.table.create_anonymous(scope, None);
        self.info
            .push_scope_region(switch.location.clone(), self.scope_path(switch_scope));
        for case in &switch.cases {
            if let Some(case_value) = &case.value {
                self.check_expression(switch_scope, case_value, value.as_ref())?;
            }
            for statement in &case.statements {
                self.analyze_statement(switch_scope, statement)?;
            }
        }
        Ok(())
    }

    /// Declared result of the function or lambda `scope` is in, with the
    /// name used in diagnostics. Constructors and destructors return nothing.
    fn expected_return(&self, scope: ScopeId) -> Result<Option<(String, Option<ResolvedType>)>, AnalyzerError> {
        let Some((_, node)) = self.table.enclosing_function_scope(scope) else {
            return Ok(None);
        };
        Ok(match node {
            ScopeNode::Function(function) => {
                let returns_nothing = match &function.node {
                    FunctionNode::Function(definition) => definition.return_type.is_none(),
                    FunctionNode::Setter(_) => true,
                    FunctionNode::FuncDef(_) | FunctionNode::Getter(_) => false,
                };
                let expected = if returns_nothing {
                    Some(self.builtin_type(PrimitiveKind::Void))
                } else {
                    function.return_type()?.cloned()
                };
                Some((function.identifier.clone(), expected))
            }
            ScopeNode::Lambda(Some(funcdef)) => Some(("lambda".to_string(), funcdef.return_type()?.cloned())),
            _ => None,
        })
    }

    fn analyze_return(&mut self, scope: ScopeId, statement: &ReturnStatement) -> Result<(), AnalyzerError> {
        let Some((function, expected)) = self.expected_return(scope)? else {
            if let Some(value) = &statement.value {
                self.analyze_expression(scope, value, None)?;
            }
            return Ok(());
        };
        let returns_void = expected
            .as_ref()
            .is_some_and(|ty| ty.is_primitive_kind(PrimitiveKind::Void));

        match (&statement.value, returns_void) {
            (Some(value), true) => {
                self.analyze_expression(scope, value, None)?;
                self.error(&value.location(), SemanticError::UnexpectedReturnValue { function });
            }
            (Some(value), false) => {
                self.check_expression(scope, value, expected.as_ref())?;
            }
            (None, false) => {
                if let Some(expected) = expected {
                    self.error(&statement.location, SemanticError::MissingReturnValue {
                        function,
                        expected: expected.signature(),
                    });
                }
            }
            (None, true) => {}
        }
        Ok(())
    }
}
