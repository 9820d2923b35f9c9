//! Turns variable and function tables back into recipe source.

use crate::dialect::Dialect;
use crate::error::Result;
use crate::parse::{Functions, VariableValue, Variables};
use crate::quote::quote_literal;

/// Serialize both tables: variables first, then functions, joined by `\n`.
///
/// Unset variables, ignored names and automatic variables holding only their
/// own reference are left out.
pub fn serialize(variables: &Variables, functions: &Functions, dialect: &Dialect) -> Result<String> {
    let mut lines = variable_lines(variables, dialect)?;
    lines.extend(function_lines(functions));
    Ok(lines.join("\n"))
}

/// One or more lines per variable.
pub fn variable_lines(variables: &Variables, dialect: &Dialect) -> Result<Vec<String>> {
    let quote = |value: &str| dialect.automatic.quote(value);
    let mut lines = Vec::new();

    for (name, value) in variables {
        let Some(value) = value else {
            continue;
        };
        if dialect.is_ignored(name) {
            continue;
        }

        match value {
            VariableValue::Scalar(s) => {
                if dialect.is_redundant(name, s) {
                    log::trace!("{name}: automatic default, skipped");
                    continue;
                }
                lines.push(format!("{name}={}", quote(s)?));
            }
            VariableValue::Indexed(array) => {
                lines.push(format!("{name}=("));
                let holes = array.has_holes();
                for (index, element) in array.iter() {
                    if holes {
                        lines.push(format!("  [{index}]={}", quote(element)?));
                    } else {
                        lines.push(format!("  {}", quote(element)?));
                    }
                }
                lines.push(")".into());
            }
            VariableValue::Associative(map) => {
                lines.push(format!("declare -gA {name}=("));
                for (key, element) in map {
                    lines.push(format!("  [{}]={}", quote_literal(key), quote(element)?));
                }
                lines.push(")".into());
            }
        }
    }

    Ok(lines)
}

/// `name() {body}` per function.
pub fn function_lines(functions: &Functions) -> impl Iterator<Item = String> + '_ {
    functions
        .iter()
        .map(|(name, body)| format!("{name}() {{{body}}}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VariablesConfig;
    use crate::error::Error;
    use crate::parse::{AssociativeArray, IndexedArray};

    fn dialect() -> Dialect {
        Dialect::from_config(&VariablesConfig {
            automatic: vec!["srcdir".into(), "builddir".into()],
            ignored: vec!["PATH".into()],
        })
    }

    fn vars(entries: Vec<(&str, Option<VariableValue>)>) -> Variables {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn scalars_are_quoted() {
        let v = vars(vec![
            ("pkgname", Some("foo".into())),
            ("pkgdesc", Some("it's a tool".into())),
            ("empty", Some("".into())),
        ]);
        assert_eq!(
            serialize(&v, &Functions::new(), &dialect()).unwrap(),
            "pkgname='foo'\npkgdesc='it'\\''s a tool'\nempty=''"
        );
    }

    #[test]
    fn automatic_references_stay_live() {
        let v = vars(vec![("builddir", Some("$srcdir/foo-1.0".into()))]);
        assert_eq!(
            serialize(&v, &Functions::new(), &dialect()).unwrap(),
            "builddir=$srcdir'/foo-1.0'"
        );
    }

    #[test]
    fn skipped_entries() {
        let v = vars(vec![
            ("unset", None),
            ("PATH", Some("/bin".into())),
            ("srcdir", Some("$srcdir".into())),
            ("builddir", Some("$builddir".into())),
            ("kept", Some("1".into())),
        ]);
        assert_eq!(serialize(&v, &Functions::new(), &dialect()).unwrap(), "kept='1'");
    }

    #[test]
    fn dense_array() {
        let array: IndexedArray = ["a.tar.gz", "$srcdir/x", ""].into_iter().collect();
        let v = vars(vec![("source", Some(VariableValue::Indexed(array)))]);
        assert_eq!(
            serialize(&v, &Functions::new(), &dialect()).unwrap(),
            "source=(\n  'a.tar.gz'\n  $srcdir'/x'\n  ''\n)"
        );
    }

    #[test]
    fn array_with_holes_keeps_indices() {
        let mut array = IndexedArray::new();
        array.set(0, "a");
        array.set(2, "c");
        let v = vars(vec![("arr", Some(VariableValue::Indexed(array)))]);
        assert_eq!(
            serialize(&v, &Functions::new(), &dialect()).unwrap(),
            "arr=(\n  [0]='a'\n  [2]='c'\n)"
        );
    }

    #[test]
    fn associative_array() {
        let mut map = AssociativeArray::new();
        map.insert("two words".into(), "x".into());
        map.insert("$k".into(), "$srcdir".into());
        let v = vars(vec![("m", Some(VariableValue::Associative(map)))]);
        assert_eq!(
            serialize(&v, &Functions::new(), &dialect()).unwrap(),
            "declare -gA m=(\n  ['two words']='x'\n  ['$k']=$srcdir\n)"
        );
    }

    #[test]
    fn functions_follow_variables() {
        let v = vars(vec![("pkgname", Some("foo".into()))]);
        let mut f = Functions::new();
        f.insert("build".into(), "\n    make\n".into());
        f.insert("package".into(), "\n    make install\n".into());
        assert_eq!(
            serialize(&v, &f, &dialect()).unwrap(),
            "pkgname='foo'\nbuild() {\n    make\n}\npackage() {\n    make install\n}"
        );
    }

    #[test]
    fn unterminated_reference_fails() {
        let v = vars(vec![("x", Some("${srcdir".into()))]);
        let err = serialize(&v, &Functions::new(), &dialect()).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn empty_tables() {
        assert_eq!(
            serialize(&Variables::new(), &Functions::new(), &dialect()).unwrap(),
            ""
        );
    }
}
