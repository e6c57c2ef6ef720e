/// Call checking: arity, named arguments, variadics and the choice between
/// overloads.
#[cfg(test)]
mod overload_tests {
    use angelscript_analyzer::{AnalyzedScope, resolved_type::ResolvedType, symbol::SymbolRef};
    use angelscript_ast::{
        builder::Builder,
        nodes::{ClassMember, Definition, Expression, ReferenceModifier},
    };

    use crate::utils::{analyze_script, assert_no_diagnostics, assert_single_diagnostic, main_function};

    /// Signature of the first parameter of the callee chosen at call site `index`.
    fn chosen_parameter(scope: &AnalyzedScope, index: usize) -> anyhow::Result<String> {
        let site = scope
            .info()
            .call_sites()
            .get(index)
            .ok_or_else(|| anyhow::anyhow!("no call site {index}"))?;
        let parameters = site.callee.parameter_types()?;
        Ok(parameters
            .first()
            .and_then(Option::as_ref)
            .map(ResolvedType::signature)
            .unwrap_or_default())
    }

    mod arguments {
        use std::rc::Rc;

        use angelscript_ast::nodes::Argument;

        use super::*;

        fn call_foo(b: &Builder, arguments: Vec<Rc<Argument>>) -> Definition {
            main_function(b, vec![b.expr_stmt(b.call("foo", arguments))])
        }

        fn declarations(b: &Builder) -> Vec<Definition> {
            vec![
                Definition::Class(b.class("B", &[], vec![])),
                Definition::Class(b.class("C", &[], vec![])),
                Definition::Function(b.function(
                    "void",
                    "foo",
                    vec![
                        b.param("int", "a"),
                        b.param_default("B", "b", b.call("B", vec![])),
                        b.param_default("C", "c", b.call("C", vec![])),
                        b.param_default("bool", "d", b.boolean(false)),
                        b.param_default("double", "e", b.int(0)),
                    ],
                    vec![],
                )),
            ]
        }

        #[test]
        fn test_named_arguments_in_any_order() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let mut definitions = declarations(&b);
            let call = vec![
                b.arg(b.int(1)),
                b.named("e", b.number("2.0")),
                b.named("b", b.call("B", vec![])),
                b.named("d", b.boolean(true)),
            ];
            definitions.push(call_foo(&b, call));
            let scope = analyze_script(&b.script(definitions))?;
            assert_no_diagnostics(&scope);
            Ok(())
        }

        #[test]
        fn test_positional_after_named() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let mut definitions = declarations(&b);
            let call = vec![b.named("d", b.boolean(true)), b.arg(b.int(1))];
            definitions.push(call_foo(&b, call));
            let scope = analyze_script(&b.script(definitions))?;
            assert_single_diagnostic(&scope, "positional arguments cannot follow named arguments");
            Ok(())
        }

        #[test]
        fn test_unknown_parameter_name() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let mut definitions = declarations(&b);
            definitions.push(call_foo(&b, vec![b.arg(b.int(1)), b.named("z", b.int(2))]));
            let scope = analyze_script(&b.script(definitions))?;
            assert_single_diagnostic(&scope, "`foo` has no parameter named `z`");
            Ok(())
        }

        #[test]
        fn test_parameter_named_twice() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let mut definitions = declarations(&b);
            let call = vec![b.arg(b.int(1)), b.named("d", b.boolean(true)), b.named("d", b.boolean(false))];
            definitions.push(call_foo(&b, call));
            let scope = analyze_script(&b.script(definitions))?;
            assert_single_diagnostic(&scope, "parameter `d` of `foo` is supplied more than once");
            Ok(())
        }

        #[test]
        fn test_named_argument_references_parameter() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let named = b.named("d", b.boolean(true));
            let name_location = named
                .name
                .as_ref()
                .map(|name| name.location.clone())
                .ok_or_else(|| anyhow::anyhow!("builder dropped the argument name"))?;
            let mut definitions = declarations(&b);
            definitions.push(call_foo(&b, vec![b.arg(b.int(1)), named]));
            let scope = analyze_script(&b.script(definitions))?;
            assert_no_diagnostics(&scope);

            let Some(SymbolRef::Variable(parameter)) = scope.info().reference_at(&name_location) else {
                anyhow::bail!("`d:` does not reference a variable");
            };
            assert_eq!(parameter.identifier, "d");
            assert_eq!(parameter.resolved_type().map(ResolvedType::signature).as_deref(), Some("bool"));
            Ok(())
        }

        #[test]
        fn test_too_many_counts_positional_arguments() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![
                Definition::Function(b.function("void", "one", vec![b.param("int", "a")], vec![])),
                main_function(&b, vec![b.expr_stmt(b.call("one", vec![
                    b.arg(b.int(1)),
                    b.arg(b.int(2)),
                    b.named("a", b.int(3)),
                ]))]),
            ]);
            let scope = analyze_script(&script)?;
            assert_single_diagnostic(&scope, "too many arguments for `one`: expected at most 1, found 2");
            Ok(())
        }

        #[test]
        fn test_too_many_arguments_for_constructor() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let a = b.class(
                "A",
                &[],
                vec![ClassMember::Function(b.constructor("A", vec![], vec![]))],
            );
            let script = b.script(vec![
                Definition::Class(a),
                main_function(&b, vec![b.declare(
                    "A",
                    "a",
                    Some(b.call("A", vec![b.arg(b.call("A", vec![]))])),
                )]),
            ]);
            let scope = analyze_script(&script)?;
            assert_single_diagnostic(&scope, "too many arguments for `A`: expected at most 0, found 1");
            Ok(())
        }

        #[test]
        fn test_primitive_constructor_arity() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let ok = b.script(vec![main_function(&b, vec![b.declare(
                "int",
                "n",
                Some(b.construct("int", b.positional(vec![b.int(1)]))),
            )])]);
            assert_no_diagnostics(&analyze_script(&ok)?);

            let b = Builder::new("main.as");
            let bad = b.script(vec![main_function(&b, vec![b.declare(
                "int",
                "n",
                Some(b.construct("int", b.positional(vec![b.int(1), b.int(1)]))),
            )])]);
            assert_single_diagnostic(&analyze_script(&bad)?, "no constructor of `int` accepts 2 argument(s)");
            Ok(())
        }

        #[test]
        fn test_enum_constructor_takes_one_value() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![
                Definition::Enum(b.enumeration("Kind", &["First", "Second"])),
                main_function(&b, vec![
                    b.declare("Kind", "k", Some(b.call("Kind", b.positional(vec![b.int(1)])))),
                    b.declare("Kind", "j", Some(b.call("Kind", vec![]))),
                ]),
            ]);
            let scope = analyze_script(&script)?;
            assert_single_diagnostic(&scope, "no constructor of `Kind` accepts 0 argument(s)");
            Ok(())
        }
    }

    mod variadics {
        use super::*;

        fn format_call(count: usize) -> anyhow::Result<AnalyzedScope> {
            let b = Builder::new("main.as");
            let format = b.function_decl("void", "format", vec![
                b.param_ref("const string", ReferenceModifier::In, "str"),
                b.variadic("const string", Some(ReferenceModifier::In)),
            ]);
            let arguments = (0..count).map(|i| b.arg(b.string(&format!("s{i}")))).collect();
            let script = b.script(vec![
                Definition::Function(format),
                main_function(&b, vec![b.expr_stmt(b.call("format", arguments))]),
            ]);
            analyze_script(&script)
        }

        #[test]
        fn test_variadic_accepts_any_count() -> anyhow::Result<()> {
            assert_no_diagnostics(&format_call(2)?);
            assert_no_diagnostics(&format_call(3)?);
            Ok(())
        }

        #[test]
        fn test_variadic_needs_one_value() -> anyhow::Result<()> {
            assert_single_diagnostic(&format_call(1)?, "too few arguments for `format`: missing a value for `#2`");
            Ok(())
        }
    }

    mod selection {
        use super::*;

        #[test]
        fn test_float_prefers_double_over_int() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![
                Definition::Function(b.function("void", "pick", vec![b.param("int", "v")], vec![])),
                Definition::Function(b.function("void", "pick", vec![b.param("double", "v")], vec![])),
                Definition::Function(b.function("void", "pick", vec![b.param("int8", "v")], vec![])),
                main_function(&b, vec![b.expr_stmt(b.call("pick", b.positional(vec![b.number("1.5f")])))]),
            ]);
            let scope = analyze_script(&script)?;
            assert_no_diagnostics(&scope);
            assert_eq!(chosen_parameter(&scope, 0)?, "double");
            Ok(())
        }

        #[test]
        fn test_tie_picks_first_declared() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![
                Definition::Function(b.function("void", "tie", vec![b.param("int8", "v")], vec![])),
                Definition::Function(b.function("void", "tie", vec![b.param("int16", "v")], vec![])),
                main_function(&b, vec![b.expr_stmt(b.call("tie", b.positional(vec![b.int(1)])))]),
            ]);
            let scope = analyze_script(&script)?;
            assert_no_diagnostics(&scope);
            assert_eq!(chosen_parameter(&scope, 0)?, "int8");
            Ok(())
        }

        #[test]
        fn test_enum_argument_prefers_enum_overload() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![
                Definition::Enum(b.enumeration("Color", &["Red", "Green"])),
                Definition::Function(b.function("void", "paint", vec![b.param("int", "v")], vec![])),
                Definition::Function(b.function("void", "paint", vec![b.param("Color", "v")], vec![])),
                main_function(&b, vec![b.expr_stmt(b.call(
                    "paint",
                    b.positional(vec![b.scoped_var(b.scope_qualifier(&["Color"]), "Red")]),
                ))]),
            ]);
            let scope = analyze_script(&script)?;
            assert_no_diagnostics(&scope);
            assert_eq!(chosen_parameter(&scope, 0)?, "Color");
            Ok(())
        }

        #[test]
        fn test_call_site_records_argument_list() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let call = b.call("pick", b.positional(vec![b.int(7)]));
            let Expression::FunctionCall(node) = &call else {
                anyhow::bail!("builder produced {call:?}");
            };
            let arguments_id = node.arguments.id;
            let script = b.script(vec![
                Definition::Function(b.function("void", "pick", vec![b.param("int", "v")], vec![])),
                main_function(&b, vec![b.expr_stmt(call.clone())]),
            ]);
            let scope = analyze_script(&script)?;
            let sites = scope.info().call_sites();
            assert_eq!(sites.len(), 1, "expected one call site, got: {}", sites.len());
            assert_eq!(sites[0].arguments.id, arguments_id);
            assert_eq!(sites[0].callee.identifier, "pick");
            Ok(())
        }
    }

    mod failures {
        use super::*;

        /// `mix(int a, int b)` then `mix(int a)`, called from `main`.
        fn mix_call(b: &Builder, call: Expression) -> anyhow::Result<AnalyzedScope> {
            let script = b.script(vec![
                Definition::Function(b.function("void", "mix", vec![b.param("int", "a"), b.param("int", "b")], vec![])),
                Definition::Function(b.function("void", "mix", vec![b.param("int", "a")], vec![])),
                main_function(b, vec![b.expr_stmt(call)]),
            ]);
            analyze_script(&script)
        }

        #[test]
        fn test_type_mismatch_outranks_arity() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let call = b.call("mix", b.positional(vec![b.boolean(true), b.boolean(true)]));
            let scope = mix_call(&b, call)?;
            assert_single_diagnostic(&scope, "argument 1 of `mix`: cannot convert `bool` to `int`");
            Ok(())
        }

        #[test]
        fn test_named_mismatch_outranks_type() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let call = b.call("mix", vec![b.arg(b.boolean(true)), b.named("b", b.int(1))]);
            let scope = mix_call(&b, call)?;
            assert_single_diagnostic(&scope, "`mix` has no parameter named `b`");
            Ok(())
        }

        #[test]
        fn test_failed_call_references_first_overload() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let call = b.call("mix", b.positional(vec![b.boolean(true), b.boolean(true)]));
            let Expression::FunctionCall(node) = &call else {
                anyhow::bail!("builder produced {call:?}");
            };
            let name_location = node.name.location.clone();
            let scope = mix_call(&b, call.clone())?;

            let Some(SymbolRef::Function(function)) = scope.info().reference_at(&name_location) else {
                anyhow::bail!("`mix` does not reference a function");
            };
            assert_eq!(function.parameters().len(), 2);
            assert!(scope.info().call_sites().is_empty());
            Ok(())
        }
    }
}
