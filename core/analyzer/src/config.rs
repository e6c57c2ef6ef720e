use serde::{Deserialize, Serialize};

use crate::errors::Severity;

/// Options that change how declarations are hoisted and how literals resolve.
///
/// The orchestration layer usually reads these from the editor settings, so
/// the serialized form uses camelCase keys and every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzerConfig {
    /// Also declare enum members in the scope enclosing the enum.
    pub hoist_enum_parent_scope: bool,
    /// Type that string literals resolve to.
    pub builtin_string_type: String,
    /// Template type that `T[]` is sugar for.
    pub builtin_array_type: String,
    /// Only functions marked `property` synthesize virtual property variables.
    pub explicit_property_accessor: bool,
    /// Severity of each kind of diagnostic.
    pub diagnostic_severity: DiagnosticSeverity,
}

/// Severities by diagnostic tier. Broken analyzer invariants are never
/// diagnostics and have no entry here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiagnosticSeverity {
    /// Mistakes in the analyzed program.
    pub semantic: Severity,
    /// Included files the orchestration layer could not find.
    pub missing_include: Severity,
}

impl Default for DiagnosticSeverity {
    fn default() -> Self {
        Self {
            semantic: Severity::Error,
            missing_include: Severity::Warning,
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            hoist_enum_parent_scope: false,
            builtin_string_type: "string".to_string(),
            builtin_array_type: "array".to_string(),
            explicit_property_accessor: false,
            diagnostic_severity: DiagnosticSeverity::default(),
        }
    }
}
