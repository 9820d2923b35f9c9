use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

/// Location of the user overlay.
const USER_CONFIG_PATH: &str = "~/.config/vbuild/config.toml";

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub variables: VariablesConfig,
    #[serde(default)]
    pub validate: ValidateConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ShellConfig {
    #[serde(default = "default_program")]
    pub program: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
        }
    }
}

fn default_program() -> String {
    "bash".into()
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct VariablesConfig {
    /// Variables whose references survive serialization unexpanded.
    #[serde(default)]
    pub automatic: Vec<String>,
    /// Interpreter-internal variables dropped from every table.
    #[serde(default)]
    pub ignored: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ValidateConfig {
    #[serde(default)]
    pub required: Vec<String>,
    /// 0 disables the length check.
    #[serde(default)]
    pub pkgdesc_max_length: usize,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub file: String,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    shell: ShellOverlay,
    #[serde(default)]
    variables: VariablesOverlay,
    #[serde(default)]
    validate: ValidateOverlay,
    #[serde(default)]
    logging: LoggingOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct ShellOverlay {
    program: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct VariablesOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    automatic: Vec<String>,
    #[serde(default)]
    ignored: Vec<String>,
    #[serde(default)]
    remove_automatic: Vec<String>,
    #[serde(default)]
    remove_ignored: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ValidateOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    required: Vec<String>,
    #[serde(default)]
    remove_required: Vec<String>,
    pkgdesc_max_length: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct LoggingOverlay {
    file: Option<String>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list(base: &mut Vec<String>, add: Vec<String>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/vbuild/config.toml (if exists)
    ///
    /// A user overlay that fails to parse is reported and skipped.
    pub fn load() -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_overlay() {
            config.apply_overlay(overlay);
        }
        config
    }

    /// Defaults merged with an explicitly named overlay file.
    ///
    /// Unlike [`Config::load`], a missing or malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        let overlay: ConfigOverlay = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        let mut config = Self::default_config();
        config.apply_overlay(overlay);
        Ok(config)
    }

    /// Try to load user overlay from ~/.config/vbuild/config.toml.
    fn load_overlay() -> Option<ConfigOverlay> {
        let path = shellexpand::tilde(USER_CONFIG_PATH);
        let content = std::fs::read_to_string(&*path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                eprintln!("vbuild: {path}: config parse error: {e}");
                None
            }
        }
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        // Shell: scalar override
        if let Some(program) = overlay.shell.program {
            self.shell.program = program;
        }

        // Variables
        let v = overlay.variables;
        merge_list(
            &mut self.variables.automatic,
            v.automatic,
            &v.remove_automatic,
            v.replace,
        );
        merge_list(
            &mut self.variables.ignored,
            v.ignored,
            &v.remove_ignored,
            v.replace,
        );

        // Validate
        let va = overlay.validate;
        merge_list(
            &mut self.validate.required,
            va.required,
            &va.remove_required,
            va.replace,
        );
        if let Some(max) = va.pkgdesc_max_length {
            self.validate.pkgdesc_max_length = max;
        }

        // Logging
        if let Some(file) = overlay.logging.file {
            self.logging.file = file;
        }
    }

    /// The debug log path with `~` expanded, or `None` when disabled.
    pub fn log_file(&self) -> Option<PathBuf> {
        if self.logging.file.is_empty() {
            return None;
        }
        Some(PathBuf::from(
            shellexpand::tilde(&self.logging.file).into_owned(),
        ))
    }

    /// The effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}
