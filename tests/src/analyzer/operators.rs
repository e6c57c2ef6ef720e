/// Binary, unary, logical and compound assignment operators, including
/// operator overloads on script classes.
#[cfg(test)]
mod operator_tests {
    use angelscript_analyzer::AnalyzedScope;
    use angelscript_ast::{
        builder::Builder,
        nodes::{AssignOperator, BinaryOperator, ClassMember, Definition, Statement, UnaryOperator},
    };

    use crate::utils::{analyze_script, assert_no_diagnostics, assert_single_diagnostic, main_function};

    /// Analyzes `statements` as the body of `main`, after `Vec v;` and `int i;`.
    /// `Vec` only overloads `opMul_r(double)`.
    fn with_vec(b: &Builder, statements: Vec<Statement>) -> anyhow::Result<AnalyzedScope> {
        let vec_class = b.class(
            "Vec",
            &[],
            vec![ClassMember::Function(b.function(
                "Vec",
                "opMul_r",
                vec![b.param("double", "scale")],
                vec![b.ret(Some(b.call("Vec", vec![])))],
            ))],
        );
        let mut body = vec![b.declare("Vec", "v", None), b.declare("int", "i", Some(b.int(0)))];
        body.extend(statements);
        analyze_script(&b.script(vec![Definition::Class(vec_class), main_function(b, body)]))
    }

    mod primitives {
        use super::*;

        #[test]
        fn test_bitwise_rejects_floats() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let scope = with_vec(&b, vec![b.expr_stmt(b.binary(b.number("1.5"), BinaryOperator::BitAnd, b.int(2)))])?;
            assert_single_diagnostic(&scope, "operator `&` is not defined for `double` and `int`");
            Ok(())
        }

        #[test]
        fn test_logical_operands_must_be_bool() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let scope = with_vec(&b, vec![b.expr_stmt(b.binary(b.int(1), BinaryOperator::And, b.int(2)))])?;
            assert_single_diagnostic(
                &scope,
                "operands of `&&` must be `bool`, and at least one must be exactly `bool`",
            );
            Ok(())
        }

        #[test]
        fn test_compound_shift_rejects_double() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let scope = with_vec(&b, vec![b.expr_stmt(b.compound_assign(b.var("i"), AssignOperator::Shl, b.number("1.5")))])?;
            assert_single_diagnostic(&scope, "operator `<<=` is not defined for `int` and `double`");
            Ok(())
        }

        #[test]
        fn test_arithmetic_mix_is_clean() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let scope = with_vec(&b, vec![
                b.declare("double", "d", Some(b.binary(b.var("i"), BinaryOperator::Mul, b.number("2.5")))),
                b.declare("bool", "less", Some(b.binary(b.var("i"), BinaryOperator::Lt, b.var("d")))),
                b.expr_stmt(b.compound_assign(b.var("i"), AssignOperator::Add, b.int(1))),
                b.declare("int", "neg", Some(b.prefix(UnaryOperator::Neg, b.var("i")))),
            ])?;
            assert_no_diagnostics(&scope);
            Ok(())
        }
    }

    mod overloads {
        use super::*;

        #[test]
        fn test_string_concatenation() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let scope = with_vec(&b, vec![
                b.declare("string", "s", Some(b.binary(b.string("a"), BinaryOperator::Add, b.string("b")))),
                b.expr_stmt(b.compound_assign(b.var("s"), AssignOperator::Add, b.string("x"))),
                b.declare("bool", "same", Some(b.binary(b.var("s"), BinaryOperator::Eq, b.string("ab")))),
            ])?;
            assert_no_diagnostics(&scope);
            Ok(())
        }

        #[test]
        fn test_reversed_operand_overload() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let scope = with_vec(&b, vec![b.declare(
                "Vec",
                "w",
                Some(b.binary(b.number("2.0"), BinaryOperator::Mul, b.var("v"))),
            )])?;
            assert_no_diagnostics(&scope);
            Ok(())
        }

        #[test]
        fn test_missing_add_overload() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let scope = with_vec(&b, vec![b.expr_stmt(b.binary(b.var("v"), BinaryOperator::Add, b.var("v")))])?;
            assert_single_diagnostic(&scope, "operator `+` is not defined for `Vec` and `Vec`");
            Ok(())
        }

        #[test]
        fn test_missing_comparison_overload() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let scope = with_vec(&b, vec![b.expr_stmt(b.binary(b.var("v"), BinaryOperator::Lt, b.int(1)))])?;
            assert_single_diagnostic(&scope, "operator `<` is not defined for `Vec` and `int`");
            Ok(())
        }

        #[test]
        fn test_missing_unary_overload() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let scope = with_vec(&b, vec![b.expr_stmt(b.prefix(UnaryOperator::BitNot, b.var("v")))])?;
            assert_single_diagnostic(&scope, "operator `~` is not defined for `Vec`");
            Ok(())
        }
    }

    mod handles {
        use super::*;

        #[test]
        fn test_identity_comparison_with_null() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let scope = with_vec(&b, vec![
                b.declare("Vec@", "h", Some(b.prefix(UnaryOperator::Handle, b.var("v")))),
                b.declare("bool", "missing", Some(b.binary(b.var("h"), BinaryOperator::Is, b.null()))),
                b.declare("bool", "present", Some(b.binary(b.var("h"), BinaryOperator::NotIs, b.null()))),
            ])?;
            assert_no_diagnostics(&scope);
            Ok(())
        }

        #[test]
        fn test_identity_comparison_rejects_primitives() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let scope = with_vec(&b, vec![b.declare(
                "bool",
                "missing",
                Some(b.binary(b.var("i"), BinaryOperator::Is, b.null())),
            )])?;
            assert_single_diagnostic(&scope, "operator `is` is not defined for `int`");
            Ok(())
        }

        #[test]
        fn test_handle_of_primitive() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let scope = with_vec(&b, vec![b.expr_stmt(b.prefix(UnaryOperator::Handle, b.var("i")))])?;
            assert_single_diagnostic(&scope, "operator `@` is not defined for `int`");
            Ok(())
        }
    }

    mod casts {
        use super::*;

        #[test]
        fn test_cast_down_the_hierarchy() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![
                Definition::Class(b.class("Shape", &[], vec![])),
                Definition::Class(b.class("Circle", &["Shape"], vec![])),
                main_function(&b, vec![
                    b.declare("Shape@", "shape", None),
                    b.declare("Circle@", "circle", Some(b.cast("Circle@", b.var("shape")))),
                ]),
            ]);
            assert_no_diagnostics(&analyze_script(&script)?);
            Ok(())
        }

        #[test]
        fn test_cast_between_unrelated_types() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![main_function(&b, vec![b.declare(
                "int",
                "n",
                Some(b.cast("int", b.string("7"))),
            )])]);
            assert_single_diagnostic(&analyze_script(&script)?, "cannot cast `string` to `int`");
            Ok(())
        }
    }

    #[test]
    fn test_condition_must_be_bool() -> anyhow::Result<()> {
        let b = Builder::new("main.as");
        let scope = with_vec(&b, vec![b.if_(b.int(1), b.block(vec![]), None)])?;
        assert_single_diagnostic(&scope, "condition must be `bool`, found `int`");
        Ok(())
    }
}
