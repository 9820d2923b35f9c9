//! Parser for the `declare -f` / `declare -p` dump bash prints for a recipe.
//!
//! Function bodies are sliced out of the dump verbatim; variable values go
//! through [`value::decode`](super::value::decode), and `$'...'` values are
//! handed back to the shell to resolve their escapes.

use crate::dialect::Dialect;
use crate::error::Result;
use crate::shell::Shell;

use super::lexer::{Lexer, Token, TokenKind};
use super::types::{AssociativeArray, Functions, IndexedArray, VariableValue, Variables};
use super::value::decode;

/// Parse a dump into its variable and function tables.
///
/// Names in the dialect's ignore list are dropped. Redeclared names keep their
/// first position and take the last value.
pub fn parse_dump(
    dump: &str,
    shell: &dyn Shell,
    dialect: &Dialect,
) -> Result<(Variables, Functions)> {
    DeclarationParser {
        lexer: Lexer::new(dump),
        shell,
        dialect,
        variables: Variables::new(),
        functions: Functions::new(),
    }
    .run()
}

struct DeclarationParser<'a> {
    lexer: Lexer<'a>,
    shell: &'a dyn Shell,
    dialect: &'a Dialect,
    variables: Variables,
    functions: Functions,
}

impl DeclarationParser<'_> {
    fn run(mut self) -> Result<(Variables, Functions)> {
        while let Some(name) = self.lexer.next_token()? {
            let next = self.expect_token("'('")?;
            if name.kind == TokenKind::Word && name.text == "declare" && next.text.starts_with('-')
            {
                self.lexer.push_back(next);
                self.declaration()?;
            } else {
                self.function(name, next)?;
            }
        }

        log::debug!(
            "parsed {} variables, {} functions",
            self.variables.len(),
            self.functions.len()
        );
        Ok((self.variables, self.functions))
    }

    /// `declare -FLAGS name[=value]`
    fn declaration(&mut self) -> Result<()> {
        let flags = self.expect_token("flags")?;
        let flags = flags.text.trim_start_matches('-').to_string();
        let name = self.expect_token("a variable name")?;
        if name.kind != TokenKind::Word || name.text.is_empty() {
            return Err(self.unexpected(&name, "a variable name"));
        }
        let name = name.text;
        let ignored = self.dialect.is_ignored(&name);

        let value = match self.lexer.next_token()? {
            Some(token) if token.is_punct('=') => Some(if flags.contains('a') {
                VariableValue::Indexed(self.indexed(ignored)?)
            } else if flags.contains('A') {
                VariableValue::Associative(self.associative(ignored)?)
            } else {
                VariableValue::Scalar(self.value(ignored)?)
            }),
            Some(token) => {
                self.lexer.push_back(token);
                None
            }
            None => None,
        };

        if ignored {
            log::trace!("declare -{flags} {name}: ignored");
            return Ok(());
        }
        log::trace!("declare -{flags} {name} = {value:?}");
        self.variables.insert(name, value);
        Ok(())
    }

    /// `( [index]=value ... )`
    fn indexed(&mut self, skip_shell: bool) -> Result<IndexedArray> {
        self.expect_punct('(')?;
        let mut array = IndexedArray::new();
        while let Some(index) = self.subscript(skip_shell)? {
            let slot: usize = index.text.parse().map_err(|_| {
                self.lexer
                    .error(format!("Invalid array index: '{}'", index.text), Some(&index))
            })?;
            let value = self.value(skip_shell)?;
            array.set(slot, value);
        }
        Ok(array)
    }

    /// `( [key]=value ... )`
    fn associative(&mut self, skip_shell: bool) -> Result<AssociativeArray> {
        self.expect_punct('(')?;
        let mut map = AssociativeArray::new();
        while let Some(key) = self.subscript(skip_shell)? {
            let value = self.value(skip_shell)?;
            map.insert(key.text, value);
        }
        Ok(map)
    }

    /// Read `[subscript]=` and return the decoded subscript, or `None` at the
    /// closing `)`. A subscript lexed as several tokens (`a.b`) is joined back
    /// up; a `$'...'` subscript is resolved like a value.
    fn subscript(&mut self, skip_shell: bool) -> Result<Option<Token>> {
        let open = self.expect_token("'['")?;
        if open.is_punct(')') {
            return Ok(None);
        }
        if !open.is_punct('[') {
            return Err(self.unexpected(&open, "'['"));
        }

        let mut subscript = self.expect_token("']'")?;
        if subscript.is_punct(']') {
            return Err(self.unexpected(&subscript, "a subscript"));
        }
        let mut text = if subscript.is_punct('$') {
            let quoted = self.expect_token("a quoted string")?;
            self.indirect(&quoted, skip_shell)?
        } else {
            decode(&subscript.text)
        };
        loop {
            let token = self.expect_token("']'")?;
            if token.is_punct(']') {
                break;
            }
            text.push_str(&decode(&token.text));
        }
        self.expect_punct('=')?;
        subscript.text = text;
        Ok(Some(subscript))
    }

    /// A single value. `$'...'` and `$name` are resolved by the shell unless
    /// `skip_shell`.
    fn value(&mut self, skip_shell: bool) -> Result<String> {
        let token = self.expect_token("a value")?;
        if !token.is_punct('$') {
            return Ok(decode(&token.text));
        }

        let quoted = self.expect_token("a quoted string")?;
        self.indirect(&quoted, skip_shell)
    }

    /// Ask the shell for the text of `$'...'` or `$name`; `token` follows the `$`.
    fn indirect(&self, token: &Token, skip_shell: bool) -> Result<String> {
        if skip_shell {
            return Ok(String::new());
        }
        let script = match token.kind {
            TokenKind::AnsiC => format!("printf %s $'{}'", token.text),
            _ if is_identifier(&token.text) => format!("printf %s \"${{{}}}\"", token.text),
            _ => return Err(self.unexpected(token, "a variable name")),
        };
        let resolved = self.shell.evaluate(&script)?;
        Ok(decode(&resolved))
    }

    /// `name () { body }`; `next` is the token after the name.
    fn function(&mut self, name: Token, next: Token) -> Result<()> {
        if name.kind != TokenKind::Word || name.text.is_empty() {
            return Err(self.unexpected(&name, "a name"));
        }
        if !next.is_punct('(') {
            return Err(self.unexpected(&next, "'('"));
        }
        self.expect_punct(')')?;
        let open = self.expect_punct('{')?;

        // Braces only group where a command can start; `echo }` is an argument.
        let mut depth = 1usize;
        let mut prev_end = self.lexer.offset();
        let mut can_open = true;
        let mut can_close = true;
        let close = loop {
            let token = self.expect_token("'}'")?;
            let new_line = self.lexer.input()[prev_end..token.start].contains('\n');
            prev_end = self.lexer.offset();

            let mut grouped = false;
            if token.is_punct('{') && (can_open || new_line) {
                depth += 1;
                grouped = true;
            } else if token.is_punct('}') && (can_close || new_line) {
                depth -= 1;
                if depth == 0 {
                    break token;
                }
                grouped = true;
            }

            can_close = grouped || token.is_punct(';') || token.is_punct('&');
            can_open = can_close || starts_command(&token);
        };

        let body = &self.lexer.input()[open.start + 1..close.start];
        let body = body.strip_prefix(' ').unwrap_or(body);
        let body = body.strip_suffix(' ').unwrap_or(body);
        log::trace!("function {}: {} bytes", name.text, body.len());
        self.functions.insert(name.text, body.to_string());
        Ok(())
    }

    /// Next token; end of input is an error naming what was `expecting`.
    fn expect_token(&mut self, expecting: &str) -> Result<Token> {
        match self.lexer.next_token()? {
            Some(token) => Ok(token),
            None => Err(self.lexer.error(
                format!("Unexpected end of input. Expecting {expecting}"),
                None,
            )),
        }
    }

    fn expect_punct(&mut self, c: char) -> Result<Token> {
        let token = self.expect_token(&format!("'{c}'"))?;
        if token.is_punct(c) {
            Ok(token)
        } else {
            Err(self.unexpected(&token, &format!("'{c}'")))
        }
    }

    fn unexpected(&self, token: &Token, expecting: &str) -> crate::error::Error {
        self.lexer.error(
            format!("Unexpected token: '{}'. Expecting {expecting}", token.text),
            Some(token),
        )
    }
}

/// Tokens after which `{` opens a group even on the same line.
fn starts_command(token: &Token) -> bool {
    match token.kind {
        TokenKind::Punct => matches!(token.text.as_str(), "|" | "(" | ")"),
        TokenKind::Word => matches!(token.text.as_str(), "then" | "do" | "else"),
        TokenKind::AnsiC => false,
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
