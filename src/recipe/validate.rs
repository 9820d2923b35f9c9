//! Policy checks run before a recipe is generated or built.

use std::collections::HashSet;
use std::fmt;

use crate::config::ValidateConfig;
use crate::parse::words::{checksums, source_filename};

use super::Recipe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "ERROR"),
            Self::Warning => write!(f, "WARNING"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// `>>> ERROR: foo: message`
    pub fn render(&self, pkgname: &str) -> String {
        format!(">>> {}: {pkgname}: {}", self.severity, self.message)
    }
}

/// Check `recipe` against `rules`. Errors come before warnings.
pub fn validate(recipe: &Recipe, rules: &ValidateConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for field in &rules.required {
        if !recipe.has_value(field) {
            diagnostics.push(Diagnostic::error(format!("Missing {field}")));
        }
    }

    if let Some(pkgdesc) = recipe.pkgdesc() {
        let length = pkgdesc.chars().count();
        if rules.pkgdesc_max_length > 0 && length > rules.pkgdesc_max_length {
            diagnostics.push(Diagnostic::error(format!(
                "pkgdesc is too long ({length} > {})",
                rules.pkgdesc_max_length
            )));
        }
    }

    if recipe.package().is_none() {
        diagnostics.push(Diagnostic::error("Missing package() function"));
    }

    if !recipe.has_value("maintainer") {
        diagnostics.push(Diagnostic::warning("Missing maintainer"));
    }

    if let Some(sums) = recipe.sha512sums() {
        let sums = checksums(sums);
        let sources = recipe.words("source");
        if sums.len() != sources.len() {
            diagnostics.push(Diagnostic::warning(format!(
                "sha512sums has {} entries but source has {}",
                sums.len(),
                sources.len()
            )));
        }

        let files: HashSet<&str> = sources.iter().map(|s| source_filename(s)).collect();
        for (_, file) in sums {
            if !file.is_empty() && !files.contains(file) {
                diagnostics.push(Diagnostic::warning(format!(
                    "sha512sums lists {file}, which is not in source"
                )));
            }
        }
    }

    diagnostics.sort_by_key(|d| d.severity != Severity::Error);
    diagnostics
}
