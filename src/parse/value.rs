/// Undo the `\$` escaping `declare -p` applies to literal dollar signs.
///
/// The lexer has already removed quotes; this is the only transformation left.
pub fn decode(token: &str) -> String {
    token.replace("\\$", "$")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescapes_dollar() {
        assert_eq!(decode(r"\$srcdir/x"), "$srcdir/x");
    }

    #[test]
    fn leaves_other_escapes() {
        assert_eq!(decode(r"a\nb\\"), r"a\nb\\");
    }

    #[test]
    fn escaped_backslash_before_dollar() {
        // declare -p renders the value `\$` as "\\\$", lexed to `\\$`.
        assert_eq!(decode(r"\\$"), r"\$");
    }

    #[test]
    fn plain_text_unchanged() {
        assert_eq!(decode("foo-1.0"), "foo-1.0");
    }
}
