//! Structured Feedback Module
//!
//! Machine-readable analysis results:
//! - JSON diagnostics with source locations
//! - Per-class symbol and layout summaries

use serde::{Deserialize, Serialize};

use crate::semantic::{layout_of, ClassEntry, MethodEntry, SymbolTable};
use crate::utils::Error;

// ==================== Structured Error Report ====================

/// A single diagnostic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Error code (e.g., "E0200")
    pub code: String,

    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    pub location: Option<Location>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
}

/// 1-based line and column in a named file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl ErrorReport {
    /// Build a report for `error`, locating its span in `source`
    pub fn from_error(error: &Error, file_name: &str, source: &str) -> Self {
        let location = error.span().map(|span| {
            let (line, column) = span.line_col(source);
            Location {
                file: file_name.to_string(),
                line: line as u32,
                column: column as u32,
            }
        });

        Self {
            code: error.code().to_string(),
            severity: Severity::Error,
            message: error.to_string(),
            location,
        }
    }
}

// ==================== Class Summaries ====================

/// A field with its slot offset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldReport {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub offset: usize,
}

/// A method signature with its slot offset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodReport {
    pub name: String,
    pub return_type: String,
    pub params: Vec<String>,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassReport {
    pub name: String,
    pub parent: Option<String>,
    pub fields: Vec<FieldReport>,
    pub methods: Vec<MethodReport>,
}

impl ClassReport {
    pub fn from_entry(table: &SymbolTable, class: &ClassEntry) -> Self {
        let layout = layout_of(table, &class.name);
        let field_offset = |name: &str| layout.as_ref().and_then(|l| l.field_offset(name));
        let method_offset = |name: &str| layout.as_ref().and_then(|l| l.method_offset(name));

        let fields = class
            .fields
            .iter()
            .map(|(name, ty)| FieldReport {
                name: name.clone(),
                ty: ty.to_string(),
                offset: field_offset(name.as_str()).unwrap_or_default(),
            })
            .collect();

        let methods = class
            .methods
            .iter()
            .map(|method| MethodReport {
                name: method.name.clone(),
                return_type: method.return_type.to_string(),
                params: signature(method),
                offset: method_offset(method.name.as_str()).unwrap_or_default(),
            })
            .collect();

        Self {
            name: class.name.clone(),
            parent: class.parent.clone(),
            fields,
            methods,
        }
    }
}

fn signature(method: &MethodEntry) -> Vec<String> {
    method.param_types().map(|ty| ty.to_string()).collect()
}

// ==================== Analysis Report ====================

/// Outcome of analyzing one source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub source_file: String,
    pub success: bool,
    pub diagnostics: Vec<ErrorReport>,
    pub classes: Vec<ClassReport>,
}

impl AnalysisReport {
    /// Report for a program that passed both passes
    pub fn success(source_file: String, table: &SymbolTable) -> Self {
        Self {
            source_file,
            success: true,
            diagnostics: vec![],
            classes: table
                .classes()
                .map(|class| ClassReport::from_entry(table, class))
                .collect(),
        }
    }

    /// Report for a program that failed to parse or analyze
    pub fn failure(source_file: String, errors: Vec<ErrorReport>) -> Self {
        Self {
            success: false,
            source_file,
            diagnostics: errors,
            classes: vec![],
        }
    }

    /// Output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
