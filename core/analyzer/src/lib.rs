#![warn(clippy::pedantic)]
//! Semantic Analyzer for AngelScript
//!
//! This crate is the semantic core behind the AngelScript editor tooling. It
//! receives a parsed [`Script`], declares every name it contains, resolves
//! types, checks conversions and resolves overloads, and leaves behind a
//! scope tree plus the [`AnalysisInfo`] that completion, hover and
//! go-to-definition read.
//!
//! ## Pipeline
//!
//! Analysis of one file runs in two phases:
//!
//! 1. **Hoist** ([`hoist`]) - merges the scopes of already analyzed included
//!    files, then walks the script once, creating every type, function,
//!    variable and scope. Work that needs the whole file declared (base
//!    lists, inherited members, signatures) is queued and drained before the
//!    phase ends.
//! 2. **Analyze** ([`analyze`]) - drains the second queue: function bodies,
//!    variable initializers and enum values. Because everything is declared
//!    by now, bodies may refer to names declared later in the file.
//!
//! ```ignore
//! use angelscript_analyzer::{analyze, config::AnalyzerConfig, hoist};
//!
//! let hoisted = hoist(&script, "main.as", &[&predefined], &AnalyzerConfig::default())?;
//! let analyzed = analyze(hoisted)?;
//! for diagnostic in analyzed.diagnostics() {
//!     println!("{diagnostic}");
//! }
//! ```
//!
//! ## Error Handling
//!
//! Mistakes in the analyzed program never stop the analysis. They become
//! [`Diagnostic`]s, the offending expression gets an unknown type, and
//! anything depending on an unknown type stays silent so one mistake is
//! reported once.
//!
//! [`AnalyzerError`] is reserved for broken analyzer invariants (a signature
//! read before it was hoisted, an operator without an overload category).
//! It aborts the analysis of the file.
//!
//! ## Public Modules
//!
//! - [`symbol`] / [`symbol_table`] - symbols and the scope arena
//! - [`resolved_type`] - resolved type uses with template substitution
//! - [`conversion`] - the conversion cost model
//! - [`analysis_info`] - references, scope regions, `auto` types, call sites
//! - [`errors`] - diagnostics and internal errors
//! - [`config`] - analyzer settings

use std::cell::OnceCell;

use angelscript_ast::nodes::{Location, Script};
use tracing::debug;

use crate::{
    analysis_info::AnalysisInfo,
    config::AnalyzerConfig,
    errors::{AnalyzerError, Diagnostic, SemanticError},
    session::Session,
    symbol_table::{ScopeId, SymbolTable},
};

pub mod analysis_info;
mod analyzer;
pub mod config;
pub mod conversion;
pub mod errors;
mod expression;
mod hoist;
mod operator;
mod overload;
pub mod resolved_type;
mod session;
pub mod symbol;
pub mod symbol_table;
mod type_resolution;

/// A file whose declarations are hoisted and whose bodies are waiting to be
/// analyzed.
#[derive(Debug)]
pub struct HoistResult {
    session: Session,
}

impl HoistResult {
    #[must_use]
    pub fn global_scope(&self) -> &SymbolTable {
        &self.session.table
    }

    /// Reports an `#include` the orchestration layer could not resolve.
    pub fn report_missing_include(&mut self, path: &str, location: &Location) {
        let message = SemanticError::MissingInclude {
            path: path.to_string(),
        };
        self.session.diagnostics.push(Diagnostic {
            location: location.clone(),
            message: message.to_string(),
            severity: self.session.config.diagnostic_severity.missing_include,
        });
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.session.diagnostics.diagnostics()
    }
}

/// The finished scope tree of one file.
#[derive(Debug)]
pub struct AnalyzedScope {
    table: SymbolTable,
    info: AnalysisInfo,
    diagnostics: Vec<Diagnostic>,
    file_local: OnceCell<SymbolTable>,
}

impl AnalyzedScope {
    /// Scope tree including everything merged in from included files.
    #[must_use]
    pub fn global_scope(&self) -> &SymbolTable {
        &self.table
    }

    #[must_use]
    pub fn root(&self) -> ScopeId {
        self.table.root()
    }

    #[must_use]
    pub fn info(&self) -> &AnalysisInfo {
        &self.info
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn file_path(&self) -> &str {
        self.table.file_path()
    }

    /// Only the symbols declared in this file, for re-export to files that
    /// include it. Computed on first use.
    pub fn file_local_scope(&self) -> &SymbolTable {
        self.file_local.get_or_init(|| {
            let path = self.table.file_path();
            self.table.filtered(|symbol| symbol.source() == Some(path))
        })
    }
}

/// Declares everything in `script`.
///
/// `included` are the analyzed scopes of the files `script` includes (and
/// any predefined declarations); their symbols are visible to the whole
/// file, including declarations that appear before the include.
///
/// # Errors
///
/// Returns an [`AnalyzerError`] if an analyzer invariant is broken.
pub fn hoist(
    script: &Script,
    file_path: &str,
    included: &[&AnalyzedScope],
    config: &AnalyzerConfig,
) -> Result<HoistResult, AnalyzerError> {
    let mut session = Session::new(file_path, config);
    for scope in included {
        session.table.merge(scope.global_scope());
    }
    debug!(file = file_path, included = included.len(), "hoisting");
    session.hoist_script(script)?;
    Ok(HoistResult { session })
}

/// Analyzes the bodies queued while hoisting.
///
/// # Errors
///
/// Returns an [`AnalyzerError`] if an analyzer invariant is broken.
pub fn analyze(hoisted: HoistResult) -> Result<AnalyzedScope, AnalyzerError> {
    let mut session = hoisted.session;
    debug!(
        file = session.table.file_path(),
        pending = session.analyze_queue.len(),
        "analyzing"
    );
    session.run_analyze_tasks()?;
    let diagnostics = session.diagnostics.drain();
    debug!(
        file = session.table.file_path(),
        diagnostics = diagnostics.len(),
        "analysis finished"
    );
    Ok(AnalyzedScope {
        table: session.table,
        info: session.info,
        diagnostics,
        file_local: OnceCell::new(),
    })
}
