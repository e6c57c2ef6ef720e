/// Files that include other, already analyzed files.
#[cfg(test)]
mod include_tests {
    use angelscript_analyzer::{
        AnalyzedScope, analyze, config::AnalyzerConfig, errors::Severity, hoist, symbol::SymbolRef,
    };
    use angelscript_ast::{
        builder::Builder,
        nodes::{AccessModifier, ClassMember, Definition, Expression},
    };

    use crate::utils::{MAIN_FILE, assert_no_diagnostics, main_function, predefined_scope};

    /// `lib.as`: `class Shared { int value; }`, analyzed against the
    /// predefined declarations.
    fn library(predefined: &AnalyzedScope) -> anyhow::Result<AnalyzedScope> {
        let b = Builder::new("lib.as");
        let script = b.script(vec![Definition::Class(b.class(
            "Shared",
            &[],
            vec![ClassMember::Variable(b.field(AccessModifier::Public, "int", "value"))],
        ))]);
        let hoisted = hoist(&script, "lib.as", &[predefined], &AnalyzerConfig::default())?;
        Ok(analyze(hoisted)?)
    }

    #[test]
    fn test_included_declarations_resolve_to_their_file() -> anyhow::Result<()> {
        let predefined = predefined_scope()?;
        let lib = library(&predefined)?;
        assert_no_diagnostics(&lib);

        let b = Builder::new(MAIN_FILE);
        let access = b.member(b.var("s"), "value");
        let Expression::MemberAccess(node) = &access else {
            anyhow::bail!("builder produced {access:?}");
        };
        let member_location = node.name.location.clone();
        let script = b.script(vec![main_function(&b, vec![
            b.declare("Shared", "s", None),
            b.declare("int", "v", Some(access.clone())),
            b.declare("string", "label", Some(b.string("shared"))),
        ])]);

        // `lib` already carries the predefined symbols; merging both must not
        // report them twice.
        let hoisted = hoist(&script, MAIN_FILE, &[&predefined, &lib], &AnalyzerConfig::default())?;
        let main = analyze(hoisted)?;
        assert_no_diagnostics(&main);

        let Some(SymbolRef::Variable(value)) = main.info().reference_at(&member_location) else {
            anyhow::bail!("`s.value` does not reference a variable");
        };
        let source = value.location.as_ref().map(|location| location.source.as_str());
        assert_eq!(source, Some("lib.as"));
        Ok(())
    }

    #[test]
    fn test_named_argument_references_included_parameter() -> anyhow::Result<()> {
        let predefined = predefined_scope()?;
        let lib_builder = Builder::new("lib.as");
        let lib_script = lib_builder.script(vec![Definition::Function(lib_builder.function(
            "void",
            "g",
            vec![lib_builder.param("int", "v")],
            vec![],
        ))]);
        let lib = analyze(hoist(&lib_script, "lib.as", &[&predefined], &AnalyzerConfig::default())?)?;

        let b = Builder::new(MAIN_FILE);
        let named = b.named("v", b.int(1));
        let name_location = named
            .name
            .as_ref()
            .map(|name| name.location.clone())
            .ok_or_else(|| anyhow::anyhow!("builder dropped the argument name"))?;
        let script = b.script(vec![main_function(&b, vec![
            b.declare("int", "v", Some(b.int(0))),
            b.expr_stmt(b.call("g", vec![named])),
        ])]);
        let main = analyze(hoist(&script, MAIN_FILE, &[&predefined, &lib], &AnalyzerConfig::default())?)?;
        assert_no_diagnostics(&main);

        let Some(SymbolRef::Variable(parameter)) = main.info().reference_at(&name_location) else {
            anyhow::bail!("`v:` does not reference a variable");
        };
        let source = parameter.location.as_ref().map(|location| location.source.as_str());
        assert_eq!(source, Some("lib.as"));
        Ok(())
    }

    #[test]
    fn test_file_local_scope_drops_included_symbols() -> anyhow::Result<()> {
        let predefined = predefined_scope()?;
        let lib = library(&predefined)?;
        let local = lib.file_local_scope();
        assert!(local.lookup(local.root(), "Shared").is_some(), "`Shared` should be exported by lib.as");
        assert!(local.lookup(local.root(), "string").is_none(), "`string` belongs to the predefined file");
        assert!(lib.global_scope().lookup(lib.root(), "string").is_some());
        Ok(())
    }

    #[test]
    fn test_missing_include_is_a_warning() -> anyhow::Result<()> {
        let b = Builder::new(MAIN_FILE);
        let script = b.script(vec![]);
        let location = script.location.clone();
        let mut hoisted = hoist(&script, MAIN_FILE, &[], &AnalyzerConfig::default())?;
        hoisted.report_missing_include("missing.as", &location);
        assert_eq!(hoisted.diagnostics().len(), 1);

        let analyzed = analyze(hoisted)?;
        let diagnostic = &analyzed.diagnostics()[0];
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.message, "included file `missing.as` could not be found");
        Ok(())
    }
}
