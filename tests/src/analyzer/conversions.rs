/// Implicit conversions at assignments, initializers and call arguments.
#[cfg(test)]
mod conversion_tests {
    use angelscript_analyzer::{
        conversion::{ConversionCost, evaluate_conversion},
        resolved_type::ResolvedType,
    };
    use angelscript_ast::{
        builder::Builder,
        nodes::{ClassMember, Definition},
    };

    use crate::utils::{analyze_script, assert_no_diagnostics, assert_single_diagnostic, main_function};

    #[test]
    fn test_null_is_not_a_primitive() -> anyhow::Result<()> {
        let b = Builder::new("main.as");
        let script = b.script(vec![main_function(&b, vec![b.declare("int", "n", Some(b.null()))])]);
        let scope = analyze_script(&script)?;
        assert_single_diagnostic(&scope, "`null` to `int`");
        Ok(())
    }

    #[test]
    fn test_primitive_to_handle_argument() -> anyhow::Result<()> {
        let b = Builder::new("main.as");
        let script = b.script(vec![
            Definition::Class(b.class("Base", &[], vec![])),
            Definition::Function(b.function("void", "take", vec![b.param("Base@", "value")], vec![])),
            main_function(&b, vec![b.expr_stmt(b.call("take", b.positional(vec![b.int(5)])))]),
        ]);
        let scope = analyze_script(&script)?;
        assert_single_diagnostic(&scope, "argument 1 of `take`: cannot convert `int` to `Base@`");
        Ok(())
    }

    #[test]
    fn test_single_argument_constructor_converts() -> anyhow::Result<()> {
        let b = Builder::new("main.as");
        let meters = b.class(
            "Meters",
            &[],
            vec![ClassMember::Function(b.constructor("Meters", vec![b.param("double", "value")], vec![]))],
        );
        let script = b.script(vec![
            Definition::Class(meters),
            Definition::Function(b.function("void", "walk", vec![b.param("Meters", "distance")], vec![])),
            main_function(&b, vec![b.expr_stmt(b.call("walk", b.positional(vec![b.int(3)])))]),
        ]);
        assert_no_diagnostics(&analyze_script(&script)?);
        Ok(())
    }

    mod implicit_conversion_operator {
        use super::*;

        fn celsius(b: &Builder) -> Definition {
            Definition::Class(b.class(
                "Celsius",
                &[],
                vec![ClassMember::Function(b.function(
                    "double",
                    "opImplConv",
                    vec![],
                    vec![b.ret(Some(b.number("0.0")))],
                ))],
            ))
        }

        #[test]
        fn test_converts_to_declared_result() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![
                celsius(&b),
                main_function(&b, vec![b.declare("double", "t", Some(b.call("Celsius", vec![])))]),
            ]);
            assert_no_diagnostics(&analyze_script(&script)?);
            Ok(())
        }

        #[test]
        fn test_does_not_chain_to_bool() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![
                celsius(&b),
                main_function(&b, vec![b.declare("bool", "flag", Some(b.call("Celsius", vec![])))]),
            ]);
            assert_single_diagnostic(&analyze_script(&script)?, "cannot implicitly convert `Celsius` to `bool`");
            Ok(())
        }

        /// `Kelvin` converts to `double`, `Fahrenheit` only to `Kelvin`.
        fn kelvin_and_fahrenheit(b: &Builder) -> Vec<Definition> {
            vec![
                Definition::Class(b.class(
                    "Kelvin",
                    &[],
                    vec![ClassMember::Function(b.function(
                        "double",
                        "opImplConv",
                        vec![],
                        vec![b.ret(Some(b.number("0.0")))],
                    ))],
                )),
                Definition::Class(b.class(
                    "Fahrenheit",
                    &[],
                    vec![ClassMember::Function(b.function(
                        "Kelvin",
                        "opImplConv",
                        vec![],
                        vec![b.ret(Some(b.call("Kelvin", vec![])))],
                    ))],
                )),
            ]
        }

        #[test]
        fn test_chains_through_object_result() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let mut definitions = kelvin_and_fahrenheit(&b);
            definitions.push(main_function(&b, vec![b.declare("double", "t", Some(b.call("Fahrenheit", vec![])))]));
            assert_no_diagnostics(&analyze_script(&b.script(definitions))?);
            Ok(())
        }

        #[test]
        fn test_chain_still_rejects_bool() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let mut definitions = kelvin_and_fahrenheit(&b);
            definitions.push(main_function(&b, vec![b.declare("bool", "hot", Some(b.call("Fahrenheit", vec![])))]));
            assert_single_diagnostic(
                &analyze_script(&b.script(definitions))?,
                "cannot implicitly convert `Fahrenheit` to `bool`",
            );
            Ok(())
        }
    }

    #[test]
    fn test_bool_is_not_assignable_to_int() -> anyhow::Result<()> {
        let b = Builder::new("main.as");
        let script = b.script(vec![main_function(&b, vec![
            b.declare("int", "i", Some(b.int(0))),
            b.expr_stmt(b.assign(b.var("i"), b.boolean(true))),
        ])]);
        assert_single_diagnostic(&analyze_script(&script)?, "cannot implicitly convert `bool` to `int`");
        Ok(())
    }

    #[test]
    fn test_conversion_costs_rank_primitives() -> anyhow::Result<()> {
        let b = Builder::new("main.as");
        let scope = analyze_script(&b.script(vec![]))?;
        let table = scope.global_scope();
        let ty = |token: &str| -> anyhow::Result<ResolvedType> {
            let symbol = table
                .builtin_by_token(token)
                .ok_or_else(|| anyhow::anyhow!("`{token}` is not a builtin"))?;
            Ok(ResolvedType::from_type(symbol))
        };

        assert_eq!(evaluate_conversion(table, &ty("int")?, &ty("int")?), Some(ConversionCost::NO_CONV));
        let widen = evaluate_conversion(table, &ty("int8")?, &ty("int")?);
        let to_float = evaluate_conversion(table, &ty("int")?, &ty("double")?);
        assert!(
            widen < to_float,
            "widening should be cheaper than int to float, got: {widen:?} and {to_float:?}"
        );
        let narrow = evaluate_conversion(table, &ty("int")?, &ty("int8")?);
        assert!(widen < narrow, "widening should be cheaper than narrowing, got: {widen:?} and {narrow:?}");
        assert_eq!(evaluate_conversion(table, &ty("bool")?, &ty("int")?), None);
        Ok(())
    }
}
