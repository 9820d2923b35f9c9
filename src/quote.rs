//! Shell quoting that keeps automatic-variable references live.
//!
//! Literal text is single-quoted; `$name` / `${name}` references to a
//! whitelisted variable are emitted unquoted as `$name` so that the build tool
//! substitutes its own value when it sources the generated recipe.

use indexmap::IndexMap;
use std::sync::LazyLock;

use crate::config::Config;
use crate::error::{Error, Result};

static DEFAULT_AUTOMATIC: LazyLock<AutomaticVariables> = LazyLock::new(AutomaticVariables::default);

/// Whitelist of variable name → canonical reference text (`srcdir` → `$srcdir`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomaticVariables {
    references: IndexMap<String, String>,
}

impl AutomaticVariables {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let references = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                let reference = format!("${name}");
                (name, reference)
            })
            .collect();
        Self { references }
    }

    /// The canonical `$name` text, if `name` is automatic.
    pub fn canonical(&self, name: &str) -> Option<&str> {
        self.references.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.references.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.references
            .iter()
            .map(|(name, reference)| (name.as_str(), reference.as_str()))
    }

    /// Quote `value` for use as shell source.
    ///
    /// Fails only on a `${` that is not closed right after the identifier.
    pub fn quote(&self, value: &str) -> Result<String> {
        let mut out = Quoted::default();
        let mut chars = value.char_indices().peekable();

        while let Some((start, c)) = chars.next() {
            if c != '$' {
                out.literal(c);
                continue;
            }

            let braced = chars.next_if(|&(_, c)| c == '{').is_some();
            let name_start = start + 1 + usize::from(braced);
            let mut name_end = name_start;
            while let Some((i, c)) = chars.next_if(|&(_, c)| c.is_ascii_alphanumeric() || c == '_')
            {
                name_end = i + c.len_utf8();
            }

            let end = if braced {
                match chars.next() {
                    Some((i, '}')) => i + 1,
                    Some((_, other)) => {
                        return Err(Error::syntax(
                            format!("Unexpected token: '{other}'. Expecting '}}'"),
                            value,
                            0,
                        ));
                    }
                    None => {
                        return Err(Error::syntax(
                            "Unexpected end of input. Expecting '}'",
                            value,
                            0,
                        ));
                    }
                }
            } else {
                name_end
            };

            match self.canonical(&value[name_start..name_end]) {
                Some(reference) => out.reference(reference),
                None => out.literal_str(&value[start..end]),
            }
        }

        Ok(out.finish())
    }
}

impl Default for AutomaticVariables {
    fn default() -> Self {
        Self::new(Config::default_config().variables.automatic)
    }
}

/// Quote `value` with the default automatic-variable whitelist.
pub fn quote(value: &str) -> Result<String> {
    DEFAULT_AUTOMATIC.quote(value)
}

/// Quote `value` as literal text; `$` is never treated as a reference.
pub fn quote_literal(value: &str) -> String {
    let mut out = Quoted::default();
    out.literal_str(value);
    out.finish()
}

/// Output buffer tracking whether a single-quoted segment is open.
#[derive(Default)]
struct Quoted {
    out: String,
    open: bool,
}

impl Quoted {
    fn literal(&mut self, c: char) {
        if c == '\'' {
            // No escaping inside '...': close, emit \', reopen lazily.
            self.close();
            self.out.push_str("\\'");
            return;
        }
        if !self.open {
            self.out.push('\'');
            self.open = true;
        }
        self.out.push(c);
    }

    fn literal_str(&mut self, s: &str) {
        for c in s.chars() {
            self.literal(c);
        }
    }

    fn reference(&mut self, reference: &str) {
        self.close();
        self.out.push_str(reference);
    }

    fn close(&mut self) {
        if self.open {
            self.out.push('\'');
            self.open = false;
        }
    }

    fn finish(mut self) -> String {
        self.close();
        if self.out.is_empty() {
            return "''".into();
        }
        self.out
    }
}
