//! Locates syntax errors in recipe source with tree-sitter-bash.
//!
//! bash only reports the line where it gave up (often end of file); the
//! tree-sitter parse points at the construct that is actually broken.

use tree_sitter::{Node, Parser};

/// 1-based position of a syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxLocation {
    pub line: usize,
    pub column: usize,
}

/// Position of the first ERROR or MISSING node, or `None` if the source parses.
pub fn locate_error(source: &str) -> Option<SyntaxLocation> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_bash::LANGUAGE.into()).ok()?;
    let tree = parser.parse(source, None)?;
    let root = tree.root_node();
    if !root.has_error() {
        return None;
    }

    let node = first_error(root).unwrap_or(root);
    let point = node.start_position();
    Some(SyntaxLocation {
        line: point.row + 1,
        column: point.column + 1,
    })
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_recipe_has_no_error() {
        let source = "pkgname=foo\nsource=\"a b\"\nbuild() {\n\tcd \"$srcdir\"\n\tmake\n}\n";
        assert_eq!(locate_error(source), None);
    }

    #[test]
    fn broken_if_is_located() {
        let location = locate_error("x=1\nif then\n").expect("error expected");
        assert!(location.line >= 1);
        assert!(location.column >= 1);
    }
}
