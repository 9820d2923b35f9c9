/// Split a list-valued recipe field (`depends`, `source`, ...) into words
/// using shlex (POSIX word splitting).
pub fn words(text: &str) -> Vec<String> {
    shlex::split(text).unwrap_or_else(|| {
        // Fallback: simple whitespace splitting if shlex can't parse
        text.split_whitespace().map(String::from).collect()
    })
}

/// File name a `source` entry is saved under: the part before `::` when
/// renamed, else the last path component of the URL.
pub fn source_filename(entry: &str) -> &str {
    if let Some((name, _)) = entry.split_once("::") {
        return name;
    }
    match entry.rsplit_once('/') {
        Some((_, name)) if !name.is_empty() => name,
        _ => entry,
    }
}

/// `(hash, filename)` pairs from a `sha512sums`-style field, one per line.
pub fn checksums(text: &str) -> Vec<(&str, &str)> {
    text.lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let hash = parts.next()?;
            let file = parts.next().unwrap_or("");
            Some((hash, file))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_split_on_whitespace() {
        assert_eq!(words("musl-dev  zlib-dev\n\tpy3-foo"), vec!["musl-dev", "zlib-dev", "py3-foo"]);
    }

    #[test]
    fn words_respect_quotes() {
        assert_eq!(words("a 'b c' \"d\""), vec!["a", "b c", "d"]);
    }

    #[test]
    fn words_fallback_on_unbalanced_quote() {
        assert_eq!(words("a 'b c"), vec!["a", "'b", "c"]);
    }

    #[test]
    fn words_of_empty_text() {
        assert!(words("").is_empty());
        assert!(words(" \n ").is_empty());
    }

    #[test]
    fn source_filename_from_url() {
        assert_eq!(
            source_filename("https://example.org/dl/foo-1.0.tar.gz"),
            "foo-1.0.tar.gz"
        );
        assert_eq!(source_filename("fix-build.patch"), "fix-build.patch");
    }

    #[test]
    fn source_filename_renamed() {
        assert_eq!(
            source_filename("foo-1.0.tar.gz::https://example.org/archive/v1.0.tar.gz"),
            "foo-1.0.tar.gz"
        );
    }

    #[test]
    fn checksum_lines() {
        let text = "\nabc123  foo-1.0.tar.gz\ndef456  fix.patch\n";
        assert_eq!(
            checksums(text),
            vec![("abc123", "foo-1.0.tar.gz"), ("def456", "fix.patch")]
        );
    }
}
