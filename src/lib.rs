//! vbuild: turns VELBUILD recipes into APKBUILDs.
//!
//! A recipe is a bash script. It is evaluated by a real shell, which prints
//! every variable and function it defined (`declare -f`, `declare -p`); that
//! dump is parsed back into tables, and the tables are serialized as a new
//! recipe. Automatic variables such as `$srcdir` are seeded with their own
//! reference text before evaluation and quoted as live references afterwards,
//! so they still expand when the build tool sources the generated file.
//!
//! # Architecture
//!
//! - **[`parse`]**: dump lexer and declaration parser, the variable/function tables.
//! - **[`quote`]**: shell quoting that keeps automatic-variable references live.
//! - **[`recipe`]**: typed recipe access, serialization, validation, VELBUILD generation.
//! - **[`shell`]**: the external shell behind the [`Shell`](shell::Shell) trait.
//! - **[`dialect`]**: automatic and ignored variable sets.
//! - **[`config`]**: configuration loading: embedded defaults + user overlay merge.
//! - **[`logging`]**: stderr and file logging via simplelog.

/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Automatic and ignored variable rules.
pub mod dialect;
/// Crate error type.
pub mod error;
/// Logger setup.
pub mod logging;
/// Dump parsing: lexer, declaration parser, value tables.
pub mod parse;
/// Reference-preserving shell quoting.
pub mod quote;
/// Recipes: accessors, serializer, validation, VELBUILD generation.
pub mod recipe;
/// Shell collaborator.
pub mod shell;

pub use error::{Error, Result};
pub use quote::quote;
pub use recipe::Recipe;

/// Parse recipe source with the default configuration and system bash.
///
/// This is the main entry point for tests and simple usage.
/// The CLI builds its dialect and shell from the loaded configuration instead.
pub fn parse(source: &str) -> Result<Recipe> {
    let config = config::Config::default_config();
    let dialect = dialect::Dialect::from_config(&config.variables);
    let shell = shell::Bash::from_config(&config.shell);
    Recipe::parse(source, &shell, &dialect)
}
