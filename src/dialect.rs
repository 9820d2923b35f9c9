//! Which variables are automatic and which are interpreter bookkeeping.

use std::collections::HashSet;

use crate::config::{Config, VariablesConfig};
use crate::quote::{AutomaticVariables, quote_literal};

/// Variable rules shared by the parser and the serializer.
#[derive(Debug, Clone)]
pub struct Dialect {
    pub automatic: AutomaticVariables,
    ignored: HashSet<String>,
}

impl Dialect {
    /// Build the dialect from configuration.
    pub fn from_config(config: &VariablesConfig) -> Self {
        Self {
            automatic: AutomaticVariables::new(config.automatic.iter().cloned()),
            ignored: config.ignored.iter().cloned().collect(),
        }
    }

    /// True for interpreter-internal names that never enter a table.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.contains(name)
    }

    /// True when `value` is just the automatic variable's own reference
    /// (`srcdir="$srcdir"`), which a recipe never needs to declare.
    pub fn is_redundant(&self, name: &str, value: &str) -> bool {
        self.automatic.canonical(name) == Some(value)
    }

    /// Assignments run before a recipe so that automatic variables expand to
    /// their own reference text instead of the empty string.
    pub fn prelude(&self) -> String {
        self.automatic
            .iter()
            .map(|(name, reference)| format!("{name}={}\n", quote_literal(reference)))
            .collect()
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::from_config(&Config::default_config().variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialect(automatic: &[&str], ignored: &[&str]) -> Dialect {
        Dialect::from_config(&VariablesConfig {
            automatic: automatic.iter().map(|s| s.to_string()).collect(),
            ignored: ignored.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn prelude_seeds_references() {
        let d = dialect(&["srcdir", "pkgdir"], &[]);
        assert_eq!(d.prelude(), "srcdir='$srcdir'\npkgdir='$pkgdir'\n");
    }

    #[test]
    fn redundant_only_for_own_reference() {
        let d = dialect(&["srcdir"], &[]);
        assert!(d.is_redundant("srcdir", "$srcdir"));
        assert!(!d.is_redundant("srcdir", "$srcdir/x"));
        assert!(!d.is_redundant("pkgname", "$pkgname"));
    }

    #[test]
    fn ignored_names() {
        let d = dialect(&[], &["BASH", "PATH"]);
        assert!(d.is_ignored("PATH"));
        assert!(!d.is_ignored("pkgname"));
    }

    #[test]
    fn default_dialect() {
        let d = Dialect::default();
        assert!(d.automatic.contains("srcdir"));
        assert!(d.is_ignored("BASH_VERSINFO"));
    }
}
