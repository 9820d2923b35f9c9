pub mod declare;
pub mod lexer;
pub mod syntax;
pub mod types;
pub mod value;
pub mod words;

pub use declare::parse_dump;
pub use types::{AssociativeArray, Functions, IndexedArray, VariableValue, Variables};
pub use words::words;

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::shell::Shell;

/// Appended to the recipe so the shell prints everything it defined.
const DUMP_COMMANDS: &str = "\ndeclare -f\ndeclare -p\n";

/// Evaluate recipe `source` with `shell` and parse what it declared.
///
/// Automatic variables are seeded with their own reference text first, so
/// `builddir="$srcdir/foo"` survives evaluation as `$srcdir/foo`.
pub fn parse_recipe(
    source: &str,
    shell: &dyn Shell,
    dialect: &Dialect,
) -> Result<(Variables, Functions)> {
    let prelude = dialect.prelude();
    let script = format!("{prelude}{source}{DUMP_COMMANDS}");
    let dump = shell
        .evaluate(&script)
        .map_err(|e| relocate(e, source, prelude.lines().count()))?;
    parse_dump(&dump, shell, dialect)
}

/// Map a shell syntax error from script lines back to `source` lines.
fn relocate(error: Error, source: &str, prelude_lines: usize) -> Error {
    let Error::Syntax { message, line, .. } = error else {
        return error;
    };

    let line_count = source.lines().count().max(1);
    let reported = (line > 0).then(|| line.saturating_sub(prelude_lines).clamp(1, line_count));
    let located = syntax::locate_error(source).map(|l| l.line);
    let line = match (reported, located) {
        (Some(r), Some(l)) if l <= r => l,
        (Some(r), _) => r,
        (None, Some(l)) => l,
        (None, None) => 0,
    };

    let context = line
        .checked_sub(1)
        .and_then(|i| source.lines().nth(i))
        .unwrap_or("")
        .trim();
    log::debug!("syntax error relocated to source line {line}");
    Error::syntax(strip_shell_prefix(&message), context, line)
}

/// Drop the `bash: line N: ` prefix, whose line number counts the prelude.
fn strip_shell_prefix(message: &str) -> String {
    message
        .lines()
        .map(|l| match l.split_once("line ") {
            Some((_, rest)) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest
                .split_once(": ")
                .map_or(l, |(_, tail)| tail),
            _ => l,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
