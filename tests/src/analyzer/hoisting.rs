/// Declaration hoisting: namespaces, duplicate names, forward references
/// and enum members hoisted into the parent scope.
#[cfg(test)]
mod hoisting_tests {
    use angelscript_analyzer::config::AnalyzerConfig;
    use angelscript_ast::{
        builder::Builder,
        nodes::{BinaryOperator, Definition},
    };

    use crate::utils::{
        analyze_script, analyze_script_with, assert_no_diagnostics, assert_single_diagnostic, main_function,
    };

    #[test]
    fn test_bodies_see_later_declarations() -> anyhow::Result<()> {
        let b = Builder::new("main.as");
        let script = b.script(vec![
            main_function(&b, vec![
                b.declare("int", "n", Some(b.call("helper", vec![]))),
                b.declare("Later", "later", None),
            ]),
            Definition::Function(b.function("int", "helper", vec![], vec![b.ret(Some(b.var("total")))])),
            Definition::Variable(b.variable("int", "total", Some(b.int(3)))),
            Definition::Class(b.class("Later", &[], vec![])),
        ]);
        assert_no_diagnostics(&analyze_script(&script)?);
        Ok(())
    }

    #[test]
    fn test_duplicate_global() -> anyhow::Result<()> {
        let b = Builder::new("main.as");
        let script = b.script(vec![
            Definition::Variable(b.variable("int", "counter", None)),
            Definition::Variable(b.variable("int", "counter", None)),
        ]);
        assert_single_diagnostic(&analyze_script(&script)?, "`counter` is already declared in this scope");
        Ok(())
    }

    #[test]
    fn test_typedef_names_a_primitive() -> anyhow::Result<()> {
        let b = Builder::new("main.as");
        let script = b.script(vec![
            main_function(&b, vec![
                b.declare("real", "r", Some(b.number("1.5"))),
                b.declare("double", "d", Some(b.var("r"))),
            ]),
            b.typedef("double", "real"),
        ]);
        assert_no_diagnostics(&analyze_script(&script)?);
        Ok(())
    }

    #[test]
    fn test_imported_function_is_callable() -> anyhow::Result<()> {
        let b = Builder::new("main.as");
        let remote = b.function_decl("int", "remote", vec![b.param("int", "v")]);
        let script = b.script(vec![
            b.import(remote, "other.as"),
            main_function(&b, vec![
                b.declare("int", "n", Some(b.call("remote", b.positional(vec![b.int(1)])))),
                b.expr_stmt(b.call("remote", b.positional(vec![b.string("one")]))),
            ]),
        ]);
        assert_single_diagnostic(&analyze_script(&script)?, "argument 1 of `remote`: cannot convert `string` to `int`");
        Ok(())
    }

    mod namespaces {
        use super::*;

        #[test]
        fn test_qualified_call() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let twice = b.function("int", "twice", vec![b.param("int", "v")], vec![b.ret(Some(b.binary(
                b.var("v"),
                BinaryOperator::Mul,
                b.int(2),
            )))]);
            let script = b.script(vec![
                b.namespace(&["math"], vec![Definition::Function(twice)]),
                b.namespace(&["outer", "inner"], vec![Definition::Variable(b.variable("int", "depth", Some(b.int(2))))]),
                main_function(&b, vec![
                    b.declare("int", "n", Some(b.scoped_call(b.scope_qualifier(&["math"]), "twice", b.positional(vec![b.int(2)])))),
                    b.declare("int", "d", Some(b.scoped_var(b.scope_qualifier(&["outer", "inner"]), "depth"))),
                ]),
            ]);
            assert_no_diagnostics(&analyze_script(&script)?);
            Ok(())
        }

        #[test]
        fn test_unknown_namespace() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![main_function(&b, vec![b.expr_stmt(b.scoped_call(
                b.scope_qualifier(&["geometry"]),
                "area",
                vec![],
            ))])]);
            assert_single_diagnostic(&analyze_script(&script)?, "namespace `geometry` is not defined");
            Ok(())
        }

        #[test]
        fn test_function_cannot_become_namespace() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![
                Definition::Function(b.function("void", "tools", vec![], vec![])),
                b.namespace(&["tools"], vec![Definition::Function(b.function("void", "hammer", vec![], vec![]))]),
            ]);
            assert_single_diagnostic(&analyze_script(&script)?, "function `tools` cannot be reopened as a namespace");
            Ok(())
        }
    }

    mod enums {
        use super::*;

        fn parent_scope_config() -> AnalyzerConfig {
            AnalyzerConfig {
                hoist_enum_parent_scope: true,
                ..AnalyzerConfig::default()
            }
        }

        fn two_reds(b: &Builder) -> Vec<Definition> {
            vec![
                Definition::Enum(b.enumeration("A", &["Red"])),
                Definition::Enum(b.enumeration("B", &["Red"])),
            ]
        }

        #[test]
        fn test_ambiguous_member_resolves_against_enum() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let mut definitions = two_reds(&b);
            definitions.push(main_function(&b, vec![b.declare("A", "a", Some(b.var("Red")))]));
            let scope = analyze_script_with(&b.script(definitions), &parent_scope_config())?;
            assert_no_diagnostics(&scope);
            Ok(())
        }

        #[test]
        fn test_ambiguous_member_without_enum_destination() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let mut definitions = two_reds(&b);
            definitions.push(main_function(&b, vec![b.declare("int", "n", Some(b.var("Red")))]));
            let scope = analyze_script_with(&b.script(definitions), &parent_scope_config())?;
            assert_single_diagnostic(&scope, "`Red` is ambiguous between `A`, `B`");
            Ok(())
        }

        #[test]
        fn test_enum_values_must_be_integers() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let flags = b.enumeration_with_values("Flags", vec![("On", Some(b.boolean(true))), ("Off", Some(b.int(0)))]);
            let scope = analyze_script(&b.script(vec![Definition::Enum(flags)]))?;
            assert_single_diagnostic(&scope, "cannot implicitly convert `bool` to `int`");
            Ok(())
        }
    }

    #[test]
    fn test_scope_at_reports_enclosing_function() -> anyhow::Result<()> {
        let b = Builder::new("main.as");
        let literal = b.int(7);
        let literal_location = literal.location();
        let script = b.script(vec![main_function(&b, vec![b.block(vec![b.declare("int", "n", Some(literal))])])]);
        let scope = analyze_script(&script)?;
        let path = scope
            .info()
            .scope_at(&literal_location)
            .ok_or_else(|| anyhow::anyhow!("no scope region covers the literal"))?;
        assert_eq!(path.segments().first().map(String::as_str), Some("main"));
        Ok(())
    }
}
