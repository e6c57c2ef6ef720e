/// Base classes, mixins and interfaces.
#[cfg(test)]
mod inheritance_tests {
    use angelscript_ast::{
        builder::Builder,
        nodes::{AccessModifier, ClassMember, Definition, PostfixOperator},
    };

    use crate::utils::{analyze_script, assert_no_diagnostics, assert_single_diagnostic, main_function};

    fn base_class(b: &Builder) -> Definition {
        Definition::Class(b.class(
            "Base",
            &[],
            vec![
                ClassMember::Variable(b.field(AccessModifier::Protected, "int", "hidden")),
                ClassMember::Variable(b.field(AccessModifier::Private, "int", "secret")),
                ClassMember::Function(b.constructor("Base", vec![b.param("int", "seed")], vec![])),
            ],
        ))
    }

    fn derived_class(b: &Builder, extra: Vec<ClassMember>) -> Definition {
        let mut members = vec![ClassMember::Function(b.constructor("Derived", vec![], vec![
            b.expr_stmt(b.call("super", b.positional(vec![b.int(1)]))),
        ]))];
        members.extend(extra);
        Definition::Class(b.class("Derived", &["Base"], members))
    }

    #[test]
    fn test_protected_member_visible_in_derived() -> anyhow::Result<()> {
        let b = Builder::new("main.as");
        let peek = b.function("int", "peek", vec![], vec![b.ret(Some(b.member(b.var("this"), "hidden")))]);
        let script = b.script(vec![base_class(&b), derived_class(&b, vec![ClassMember::Function(peek)])]);
        assert_no_diagnostics(&analyze_script(&script)?);
        Ok(())
    }

    #[test]
    fn test_protected_member_hidden_outside() -> anyhow::Result<()> {
        let b = Builder::new("main.as");
        let script = b.script(vec![
            base_class(&b),
            derived_class(&b, vec![]),
            main_function(&b, vec![
                b.declare("Derived", "d", None),
                b.declare("int", "n", Some(b.member(b.var("d"), "hidden"))),
            ]),
        ]);
        assert_single_diagnostic(&analyze_script(&script)?, "`hidden` is protected and cannot be accessed here");
        Ok(())
    }

    #[test]
    fn test_private_member_not_inherited() -> anyhow::Result<()> {
        let b = Builder::new("main.as");
        let leak = b.function("int", "leak", vec![], vec![b.ret(Some(b.var("secret")))]);
        let script = b.script(vec![base_class(&b), derived_class(&b, vec![ClassMember::Function(leak)])]);
        assert_single_diagnostic(&analyze_script(&script)?, "`secret` is not defined");
        Ok(())
    }

    #[test]
    fn test_inherited_member_shares_declaration() -> anyhow::Result<()> {
        let b = Builder::new("main.as");
        let script = b.script(vec![base_class(&b), derived_class(&b, vec![])]);
        let scope = analyze_script(&script)?;
        let table = scope.global_scope();
        let member = |class: &str| {
            table
                .scopes()
                .find(|(_, s)| s.key() == class)
                .and_then(|(id, _)| table.lookup(id, "hidden"))
                .and_then(|symbol| symbol.as_variable().cloned())
        };
        let (Some(own), Some(inherited)) = (member("Base"), member("Derived")) else {
            anyhow::bail!("`hidden` missing from the class scopes");
        };
        assert!(std::rc::Rc::ptr_eq(&own, &inherited));
        Ok(())
    }

    mod overrides {
        use super::*;

        fn returns_argument(b: &Builder, ty: &str) -> ClassMember {
            ClassMember::Function(b.function(ty, "f", vec![b.param(ty, "x")], vec![b.ret(Some(b.var("x")))]))
        }

        #[test]
        fn test_override_replaces_inherited_overload() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![
                Definition::Class(b.class("Base", &[], vec![returns_argument(&b, "int"), returns_argument(&b, "double")])),
                Definition::Class(b.class("Derived", &["Base"], vec![returns_argument(&b, "int")])),
            ]);
            let scope = analyze_script(&script)?;
            assert_no_diagnostics(&scope);

            let table = scope.global_scope();
            let overloads = table
                .scopes()
                .find(|(_, s)| s.key() == "Derived")
                .and_then(|(id, _)| table.lookup(id, "f"))
                .and_then(|symbol| symbol.as_functions())
                .map(|functions| functions.overloads().to_vec())
                .ok_or_else(|| anyhow::anyhow!("`f` missing from `Derived`"))?;
            assert_eq!(overloads.len(), 2, "own `f(int)` plus inherited `f(double)`");
            assert_eq!(overloads[0].declared_scope.last(), Some("Derived"));
            assert_eq!(overloads[1].declared_scope.last(), Some("Base"));
            Ok(())
        }

        #[test]
        fn test_call_through_derived_picks_override() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let script = b.script(vec![
                Definition::Class(b.class("Base", &[], vec![returns_argument(&b, "int")])),
                Definition::Class(b.class("Derived", &["Base"], vec![returns_argument(&b, "int")])),
                main_function(&b, vec![
                    b.declare("Derived", "d", None),
                    b.declare("int", "n", Some(b.method(b.var("d"), "f", b.positional(vec![b.int(1)])))),
                ]),
            ]);
            let scope = analyze_script(&script)?;
            assert_no_diagnostics(&scope);
            let site = scope
                .info()
                .call_sites()
                .first()
                .ok_or_else(|| anyhow::anyhow!("no call site recorded"))?;
            assert_eq!(site.callee.declared_scope.last(), Some("Derived"));
            Ok(())
        }
    }

    mod super_calls {
        use super::*;

        #[test]
        fn test_super_argument_is_checked() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let derived = b.class(
                "Derived",
                &["Base"],
                vec![ClassMember::Function(b.constructor("Derived", vec![], vec![
                    b.expr_stmt(b.call("super", b.positional(vec![b.boolean(true)]))),
                ]))],
            );
            let script = b.script(vec![base_class(&b), Definition::Class(derived)]);
            assert_single_diagnostic(&analyze_script(&script)?, "argument 1 of `super`: cannot convert `bool` to `int`");
            Ok(())
        }

        #[test]
        fn test_super_needs_a_base_class() -> anyhow::Result<()> {
            let b = Builder::new("main.as");
            let lone = b.class(
                "Lone",
                &[],
                vec![ClassMember::Function(b.constructor("Lone", vec![], vec![
                    b.expr_stmt(b.call("super", vec![])),
                ]))],
            );
            let script = b.script(vec![Definition::Class(lone)]);
            assert_single_diagnostic(&analyze_script(&script)?, "`super` is not defined");
            Ok(())
        }
    }

    #[test]
    fn test_mixin_members_are_copied() -> anyhow::Result<()> {
        let b = Builder::new("main.as");
        let tracker = b.class(
            "Tracker",
            &[],
            vec![
                ClassMember::Variable(b.field(AccessModifier::Public, "int", "ticks")),
                ClassMember::Function(b.function("void", "tick", vec![], vec![
                    b.expr_stmt(b.postfix(b.var("ticks"), PostfixOperator::Inc)),
                ])),
            ],
        );
        let run = b.function("void", "run", vec![], vec![
            b.expr_stmt(b.call("tick", vec![])),
            b.declare("int", "t", Some(b.var("ticks"))),
        ]);
        let script = b.script(vec![
            b.mixin(tracker),
            Definition::Class(b.class("Clock", &["Tracker"], vec![ClassMember::Function(run)])),
        ]);
        assert_no_diagnostics(&analyze_script(&script)?);
        Ok(())
    }

    #[test]
    fn test_interface_method_through_handle() -> anyhow::Result<()> {
        let b = Builder::new("main.as");
        let shape = b.interface("Shape", &[], vec![ClassMember::Function(b.function_decl("double", "area", vec![]))]);
        let square = b.class(
            "Square",
            &["Shape"],
            vec![ClassMember::Function(b.function("double", "area", vec![], vec![b.ret(Some(b.number("1.0")))]))],
        );
        let script = b.script(vec![
            Definition::Interface(shape),
            Definition::Class(square),
            main_function(&b, vec![
                b.declare("Shape@", "s", Some(b.call("Square", vec![]))),
                b.declare("double", "a", Some(b.method(b.var("s"), "area", vec![]))),
            ]),
        ]);
        assert_no_diagnostics(&analyze_script(&script)?);
        Ok(())
    }
}
