//! APKBUILD-style recipes: typed access to the parsed tables.

pub mod serialize;
pub mod validate;
pub mod velbuild;

pub use serialize::serialize;
pub use validate::{Diagnostic, Severity, validate};
pub use velbuild::Velbuild;

use serde::Serialize;
use std::path::Path;

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::parse::{self, Functions, VariableValue, Variables};
use crate::shell::Shell;

/// A parsed recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Recipe {
    pub variables: Variables,
    pub functions: Functions,
}

macro_rules! scalar_fields {
    ($($field:ident),* $(,)?) => {
        impl Recipe {
            $(
                #[doc = concat!("`", stringify!($field), "`, if set to a plain string.")]
                pub fn $field(&self) -> Option<&str> {
                    self.scalar(stringify!($field))
                }
            )*
        }
    };
}

macro_rules! function_fields {
    ($($method:ident => $name:literal),* $(,)?) => {
        impl Recipe {
            $(
                #[doc = concat!("Body of `", $name, "()`, if defined.")]
                pub fn $method(&self) -> Option<&str> {
                    self.function($name)
                }
            )*
        }
    };
}

scalar_fields!(
    maintainer,
    arch,
    depends,
    depends_dev,
    depends_doc,
    depends_openrc,
    depends_libs,
    depends_static,
    checkdepends,
    giturl,
    install,
    install_if,
    license,
    makedepends,
    makedepends_build,
    makedepends_host,
    sha256sums,
    sha512sums,
    options,
    pkgdesc,
    pkggroups,
    pkgname,
    pkgrel,
    pkgusers,
    pkgver,
    provides,
    provider_priority,
    replaces,
    replaces_priority,
    source,
    subpackages,
    triggers,
    url,
    langdir,
    pcprefix,
    upstream_author,
    category,
    sonameprefix,
);

function_fields!(
    fetch => "fetch",
    unpack => "unpack",
    dev => "dev",
    doc => "doc",
    openrc => "openrc",
    static_ => "static",
    snapshot => "snapshot",
    default_prepare => "default_prepare",
    prepare => "prepare",
    build => "build",
    check => "check",
    package => "package",
);

impl Recipe {
    pub fn new(variables: Variables, functions: Functions) -> Self {
        Self {
            variables,
            functions,
        }
    }

    /// Evaluate `source` and collect what it declares.
    pub fn parse(source: &str, shell: &dyn Shell, dialect: &Dialect) -> Result<Self> {
        let (variables, functions) = parse::parse_recipe(source, shell, dialect)?;
        Ok(Self::new(variables, functions))
    }

    /// Read and parse the recipe file at `path`.
    pub fn from_path(path: &Path, shell: &dyn Shell, dialect: &Dialect) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::MissingRecipe(path.to_path_buf()));
        }
        log::debug!("reading {}", path.display());
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source, shell, dialect)
    }

    /// A variable's value when it is a plain string.
    pub fn scalar(&self, name: &str) -> Option<&str> {
        self.variables.get(name)?.as_ref()?.as_scalar()
    }

    pub fn function(&self, name: &str) -> Option<&str> {
        self.functions.get(name).map(String::as_str)
    }

    /// True if `name` is set to a non-empty string or a non-empty array.
    pub fn has_value(&self, name: &str) -> bool {
        match self.variables.get(name) {
            Some(Some(VariableValue::Scalar(s))) => !s.trim().is_empty(),
            Some(Some(VariableValue::Indexed(a))) => !a.is_empty(),
            Some(Some(VariableValue::Associative(m))) => !m.is_empty(),
            _ => false,
        }
    }

    /// The words of a list field such as `depends` or `source`. Array
    /// variables contribute their elements as-is.
    pub fn words(&self, name: &str) -> Vec<String> {
        match self.variables.get(name) {
            Some(Some(VariableValue::Scalar(s))) => parse::words(s),
            Some(Some(VariableValue::Indexed(a))) => a.iter().map(|(_, v)| v.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    /// Both tables as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Recipe source reproducing both tables.
    pub fn text(&self, dialect: &Dialect) -> Result<String> {
        serialize(&self.variables, &self.functions, dialect)
    }
}
