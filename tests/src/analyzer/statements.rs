/// Statement level checks: returns, switches, `auto` inference, lambdas
/// and virtual properties.
#[cfg(test)]
mod statement_tests {
    use angelscript_ast::{
        builder::Builder,
        nodes::{BinaryOperator, ClassMember, Definition, Statement},
    };

    use crate::utils::{
        analyze_script, assert_no_diagnostics, assert_reports, assert_single_diagnostic, main_function,
    };

    mod returns {
        use super::*;

        #[test]
        fn test_missing_return_value() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![Definition::Function(b.function("int", "f", vec![], vec![b.ret(None)]))]);
            assert_single_diagnostic(&analyze_script(&script)?, "`f` must return a value of type `int`");
            Ok(())
        }

        #[test]
        fn test_void_function_returns_value() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![Definition::Function(b.function("void", "g", vec![], vec![b.ret(Some(b.int(1)))]))]);
            assert_single_diagnostic(&analyze_script(&script)?, "`g` returns `void` and cannot return a value");
            Ok(())
        }

        #[test]
        fn test_return_value_converts() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![Definition::Function(b.function("double", "h", vec![], vec![b.ret(Some(b.int(1)))]))]);
            assert_no_diagnostics(&analyze_script(&script)?);
            Ok(())
        }
    }

    mod switches {
        use super::*;

        #[test]
        fn test_switch_on_double() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![main_function(&b, vec![b.switch(b.number("1.5"), vec![(None, vec![b.brk()])])])]);
            assert_single_diagnostic(&analyze_script(&script)?, "switch value must be an integer or enum, found `double`");
            Ok(())
        }

        #[test]
        fn test_case_value_converts_to_switch_type() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![main_function(&b, vec![
                b.declare("int", "i", Some(b.int(0))),
                b.switch(b.var("i"), vec![
                    (Some(b.int(1)), vec![b.brk()]),
                    (Some(b.boolean(true)), vec![b.brk()]),
                ]),
            ])]);
            assert_single_diagnostic(&analyze_script(&script)?, "cannot implicitly convert `bool` to `int`");
            Ok(())
        }

        #[test]
        fn test_switch_on_enum() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let red = || b.scoped_var(b.scope_qualifier(&["Color"]), "Red");
            let script = b.script(vec![
                Definition::Enum(b.enumeration("Color", &["Red", "Green"])),
                main_function(&b, vec![
                    b.declare("Color", "c", Some(red())),
                    b.switch(b.var("c"), vec![(Some(red()), vec![b.brk()]), (None, vec![b.brk()])]),
                ]),
            ]);
            assert_no_diagnostics(&analyze_script(&script)?);
            Ok(())
        }
    }

    mod auto_variables {
        use super::*;

        #[test]
        fn test_auto_records_inferred_type() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![main_function(&b, vec![b.declare("auto", "n", Some(b.number("1.5")))])]);
            let scope = analyze_script(&script)?;
            assert_no_diagnostics(&scope);
            let inferred: Vec<String> = scope.info().auto_types().iter().map(|a| a.ty.signature()).collect();
            assert_eq!(inferred, vec!["double".to_string()]);
            Ok(())
        }

        #[test]
        fn test_auto_type_is_shown_at_variable_name() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let variable = b.variable("auto", "total", Some(b.int(2)));
            let name_location = variable.declarators[0].name.location.clone();
            let script = b.script(vec![main_function(&b, vec![Statement::Variable(variable)])]);
            let scope = analyze_script(&script)?;
            let [resolution] = scope.info().auto_types() else {
                anyhow::bail!("expected one inferred type, got {:?}", scope.info().auto_types());
            };
            assert_eq!(resolution.location, name_location);
            assert_eq!(resolution.ty.signature(), "int");
            Ok(())
        }

        #[test]
        fn test_auto_without_initializer() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![main_function(&b, vec![b.declare("auto", "x", None)])]);
            assert_single_diagnostic(
                &analyze_script(&script)?,
                "cannot infer the type of `auto` variable `x` without an initializer",
            );
            Ok(())
        }

        #[test]
        fn test_global_auto_used_by_later_function() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![
                Definition::Variable(b.variable("auto", "limit", Some(b.int(10)))),
                Definition::Function(b.function("int", "twice", vec![], vec![b.ret(Some(b.binary(
                    b.var("limit"),
                    BinaryOperator::Mul,
                    b.int(2),
                )))])),
            ]);
            assert_no_diagnostics(&analyze_script(&script)?);
            Ok(())
        }
    }

    mod lambdas {
        use super::*;

        /// `funcdef bool Predicate(int value);`, `bool any(Predicate@ check)`
        /// and `bool positive(int value)`.
        fn predicate_declarations(b: &Builder) -> Vec<Definition> {
            vec![
                Definition::FuncDef(b.funcdef("bool", "Predicate", vec![b.param("int", "value")])),
                Definition::Function(b.function("bool", "any", vec![b.param("Predicate@", "check")], vec![
                    b.ret(Some(b.call("check", b.positional(vec![b.int(1)])))),
                ])),
                Definition::Function(b.function("bool", "positive", vec![b.param("int", "value")], vec![
                    b.ret(Some(b.binary(b.var("value"), BinaryOperator::Gt, b.int(0)))),
                ])),
            ]
        }

        #[test]
        fn test_lambda_takes_funcdef_signature() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let lambda = b.lambda(&[("", "v")], vec![b.ret(Some(b.binary(b.var("v"), BinaryOperator::Gt, b.int(0))))]);
            let mut definitions = predicate_declarations(&b);
            definitions.push(main_function(&b, vec![b.declare(
                "bool",
                "found",
                Some(b.call("any", b.positional(vec![lambda]))),
            )]));
            assert_no_diagnostics(&analyze_script(&b.script(definitions))?);
            Ok(())
        }

        #[test]
        fn test_lambda_parameter_count_must_match() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let lambda = b.lambda(&[("", "a"), ("", "b")], vec![b.ret(Some(b.boolean(true)))]);
            let mut definitions = predicate_declarations(&b);
            definitions.push(main_function(&b, vec![b.expr_stmt(b.call("any", b.positional(vec![lambda])))]));
            assert_reports(
                &analyze_script(&b.script(definitions))?,
                "argument 1 of `any`: cannot convert `lambda` to `Predicate@`",
            );
            Ok(())
        }

        #[test]
        fn test_lambda_needs_funcdef_destination() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let lambda = b.lambda(&[("", "x")], vec![]);
            let script = b.script(vec![main_function(&b, vec![b.declare("auto", "f", Some(lambda))])]);
            assert_reports(&analyze_script(&script)?, "lambda needs a funcdef destination to infer its signature");
            Ok(())
        }

        #[test]
        fn test_function_converts_to_funcdef_handle() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let mut definitions = predicate_declarations(&b);
            definitions.push(main_function(&b, vec![
                b.declare("Predicate@", "p", Some(b.var("positive"))),
                b.declare("Predicate@", "q", Some(b.call("Predicate", b.positional(vec![b.var("positive")])))),
                b.declare("bool", "r", Some(b.call("any", b.positional(vec![b.var("p")])))),
            ]));
            assert_no_diagnostics(&analyze_script(&b.script(definitions))?);
            Ok(())
        }

        #[test]
        fn test_delegate_cast_checks_signature() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let mut definitions = predicate_declarations(&b);
            definitions.push(Definition::Function(b.function("bool", "wide", vec![b.param("double", "value")], vec![
                b.ret(Some(b.boolean(true))),
            ])));
            definitions.push(main_function(&b, vec![b.declare(
                "Predicate@",
                "p",
                Some(b.call("Predicate", b.positional(vec![b.var("wide")]))),
            )]));
            let scope = analyze_script(&b.script(definitions))?;
            let diagnostic = assert_single_diagnostic(&scope, "cannot implicitly convert");
            assert!(diagnostic.message.ends_with("to `Predicate@`"), "{}", diagnostic.message);
            Ok(())
        }
    }

    mod properties {
        use angelscript_ast::nodes::AccessModifier;

        use super::*;

        fn box_class(b: &Builder) -> Definition {
            Definition::Class(b.class(
                "Box",
                &[],
                vec![
                    ClassMember::Function(b.function("int", "get_size", vec![], vec![b.ret(Some(b.int(1)))])),
                    ClassMember::Function(b.function("void", "set_size", vec![b.param("int", "value")], vec![])),
                    ClassMember::Function(b.function("int", "get_readonly", vec![], vec![b.ret(Some(b.int(2)))])),
                    ClassMember::Function(b.function("int", "get_item", vec![b.param("uint", "index")], vec![
                        b.ret(Some(b.int(0))),
                    ])),
                    ClassMember::VirtualProperty(b.virtual_property(
                        "int",
                        "width",
                        Some(vec![b.ret(Some(b.int(3)))]),
                        None,
                    )),
                    ClassMember::Variable(b.field(AccessModifier::Public, "int", "depth")),
                ],
            ))
        }

        #[test]
        fn test_accessor_pair_is_read_write() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![box_class(&b), main_function(&b, vec![
                b.declare("Box", "b", None),
                b.expr_stmt(b.assign(b.member(b.var("b"), "size"), b.int(3))),
                b.declare("int", "s", Some(b.member(b.var("b"), "size"))),
                b.declare("int", "w", Some(b.member(b.var("b"), "width"))),
                b.declare("int", "first", Some(b.index(b.member(b.var("b"), "item"), b.positional(vec![b.int(0)])))),
            ])]);
            assert_no_diagnostics(&analyze_script(&script)?);
            Ok(())
        }

        #[test]
        fn test_getter_only_property_cannot_be_written() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![box_class(&b), main_function(&b, vec![
                b.declare("Box", "b", None),
                b.expr_stmt(b.assign(b.member(b.var("b"), "readonly"), b.int(4))),
            ])]);
            assert_single_diagnostic(&analyze_script(&script)?, "property `readonly` cannot be written");
            Ok(())
        }

        #[test]
        fn test_virtual_property_without_setter() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![box_class(&b), main_function(&b, vec![
                b.declare("Box", "b", None),
                b.expr_stmt(b.assign(b.member(b.var("b"), "width"), b.int(4))),
            ])]);
            assert_single_diagnostic(&analyze_script(&script)?, "property `width` cannot be written");
            Ok(())
        }

        #[test]
        fn test_indexed_property_needs_integer_index() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![box_class(&b), main_function(&b, vec![
                b.declare("Box", "b", None),
                b.declare("int", "n", Some(b.index(b.member(b.var("b"), "item"), b.positional(vec![b.boolean(true)])))),
            ])]);
            assert_single_diagnostic(&analyze_script(&script)?, "indexed property `item` takes exactly one integer index");
            Ok(())
        }
    }
}
