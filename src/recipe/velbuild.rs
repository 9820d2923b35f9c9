//! VELBUILD → APKBUILD generation.
//!
//! A VELBUILD is an APKBUILD whose install scripts are written inline as
//! functions (`postinstall() { ... }`). Generation moves each of those into
//! its own `<pkgname>.<suffix>` file and points `install=` at them.

use std::path::{Path, PathBuf};

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::parse::Functions;

use super::Recipe;
use super::serialize::{function_lines, variable_lines};

/// Install hook functions and the script suffix abuild expects, in the order
/// they are listed in `install=`.
pub const INSTALL_HOOKS: &[(&str, &str)] = &[
    ("preinstall", "pre-install"),
    ("postinstall", "post-install"),
    ("preupgrade", "pre-upgrade"),
    ("postupgrade", "post-upgrade"),
    ("predeinstall", "pre-deinstall"),
    ("postdeinstall", "post-deinstall"),
    ("postosupgrade", "post-os-upgrade"),
];

fn is_hook(name: &str) -> bool {
    INSTALL_HOOKS.iter().any(|(hook, _)| *hook == name)
}

/// A recipe with inline install hooks.
#[derive(Debug, Clone)]
pub struct Velbuild {
    pub recipe: Recipe,
}

impl Velbuild {
    pub fn new(recipe: Recipe) -> Self {
        Self { recipe }
    }

    fn pkgname(&self) -> Result<&str> {
        self.recipe
            .pkgname()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::MissingField("pkgname".into()))
    }

    /// `(file name, body)` of every hook the recipe defines, in hook order.
    pub fn install_scripts(&self) -> Result<Vec<(String, &str)>> {
        let pkgname = self.pkgname()?;
        Ok(INSTALL_HOOKS
            .iter()
            .filter_map(|(hook, suffix)| {
                let body = self.recipe.function(hook)?;
                Some((format!("{pkgname}.{suffix}"), body))
            })
            .collect())
    }

    /// Value of the generated `install=` variable, or `None` without hooks.
    pub fn install(&self) -> Result<Option<String>> {
        let scripts = self.install_scripts()?;
        if scripts.is_empty() {
            return Ok(None);
        }
        let mut value: String = scripts.iter().map(|(file, _)| format!("\n{file}")).collect();
        value.push('\n');
        Ok(Some(value))
    }

    /// The APKBUILD: variables, then `install=`, then the non-hook functions.
    pub fn apkbuild_text(&self, dialect: &Dialect) -> Result<String> {
        let mut variables = self.recipe.variables.clone();
        variables.shift_remove("install");
        let mut lines = variable_lines(&variables, dialect)?;

        if let Some(install) = self.install()? {
            lines.push(format!("install={}", dialect.automatic.quote(&install)?));
        }

        let functions: Functions = self
            .recipe
            .functions
            .iter()
            .filter(|(name, _)| !is_hook(name))
            .map(|(name, body)| (name.clone(), body.clone()))
            .collect();
        lines.extend(function_lines(&functions));
        Ok(lines.join("\n"))
    }

    /// Write `APKBUILD` and the install scripts into `dir`. Returns the paths
    /// written.
    pub fn save(&self, dir: &Path, dialect: &Dialect) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();

        let path = dir.join("APKBUILD");
        std::fs::write(&path, self.apkbuild_text(dialect)?)?;
        log::info!("wrote {}", path.display());
        written.push(path);

        for (file, body) in self.install_scripts()? {
            let path = dir.join(file);
            std::fs::write(&path, format!("#!/bin/sh{body}"))?;
            log::info!("wrote {}", path.display());
            written.push(path);
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Variables;

    fn velbuild(functions: &[(&str, &str)]) -> Velbuild {
        let mut variables = Variables::new();
        variables.insert("pkgname".into(), Some("foo".into()));
        variables.insert("install".into(), Some("stale.post-install".into()));
        variables.insert("builddir".into(), Some("$srcdir/foo".into()));
        let functions = functions
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Velbuild::new(Recipe::new(variables, functions))
    }

    #[test]
    fn install_lists_hooks_in_fixed_order() {
        let v = velbuild(&[
            ("postupgrade", "\n    b\n"),
            ("preinstall", "\n    a\n"),
            ("package", "\n    :\n"),
        ]);
        assert_eq!(
            v.install().unwrap().as_deref(),
            Some("\nfoo.pre-install\nfoo.post-upgrade\n")
        );
    }

    #[test]
    fn no_hooks_no_install_line() {
        let v = velbuild(&[("package", "\n    :\n")]);
        assert_eq!(v.install().unwrap(), None);
        assert_eq!(
            v.apkbuild_text(&Dialect::default()).unwrap(),
            "pkgname='foo'\nbuilddir=$srcdir'/foo'\npackage() {\n    :\n}"
        );
    }

    #[test]
    fn apkbuild_moves_hooks_out() {
        let v = velbuild(&[("post-free", "\n    x\n"), ("postinstall", "\n    echo hi\n")]);
        let text = v.apkbuild_text(&Dialect::default()).unwrap();
        assert_eq!(
            text,
            "pkgname='foo'\nbuilddir=$srcdir'/foo'\ninstall='\nfoo.post-install\n'\npost-free() {\n    x\n}"
        );
    }

    #[test]
    fn missing_pkgname_fails() {
        let mut v = velbuild(&[("postinstall", "\n    :\n")]);
        v.recipe.variables.shift_remove("pkgname");
        assert!(matches!(
            v.install_scripts(),
            Err(Error::MissingField(field)) if field == "pkgname"
        ));
    }

    #[test]
    fn save_writes_apkbuild_and_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let v = velbuild(&[
            ("package", "\n    :\n"),
            ("postinstall", "\n    echo hi\n"),
            ("predeinstall", "\n    echo bye\n"),
        ]);
        let written = v.save(dir.path(), &Dialect::default()).unwrap();
        assert_eq!(written.len(), 3);

        let apkbuild = std::fs::read_to_string(dir.path().join("APKBUILD")).unwrap();
        assert!(apkbuild.contains("install='\nfoo.post-install\nfoo.pre-deinstall\n'"));
        assert!(!apkbuild.contains("postinstall()"));

        let script = std::fs::read_to_string(dir.path().join("foo.post-install")).unwrap();
        assert_eq!(script, "#!/bin/sh\n    echo hi\n");
        assert!(dir.path().join("foo.pre-deinstall").is_file());
    }
}
